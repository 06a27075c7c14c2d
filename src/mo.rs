//! GNU MO compiler.
//!
//! Layout (all integers little-endian `u32`):
//!
//! ```text
//! 0   magic 0x950412de
//! 4   revision 0
//! 8   N, number of strings
//! 12  offset of the original strings table
//! 16  offset of the translated strings table
//! 20  hash table size (0, no hash table)
//! 24  hash table offset
//! ```
//!
//! Each table holds N `(length, offset)` pairs. Strings are NUL terminated
//! and sorted by original string so readers can binary search. A plural
//! entry is stored as `msgid NUL msgid_plural` with its forms joined by NUL.

use crate::catalog::Catalog;

pub const MO_MAGIC: u32 = 0x9504_12de;

const HEADER_SIZE: usize = 28;

/// Separator between `msgctxt` and `msgid` in a compiled key.
const CONTEXT_SEPARATOR: char = '\u{4}';

/// Compiled output plus how many messages (excluding the header) it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledCatalog {
    pub bytes: Vec<u8>,
    pub messages: usize,
}

/// Compile the header and every live, translated entry.
///
/// Fuzzy entries are only included when `use_fuzzy` is set.
pub fn compile(catalog: &Catalog, use_fuzzy: bool) -> CompiledCatalog {
    let mut pairs: Vec<(String, String)> = Vec::new();
    if !catalog.header.fields().is_empty() {
        pairs.push((String::new(), catalog.header.to_msgstr()));
    }
    for entry in catalog.entries() {
        if entry.obsolete || !entry.is_translated() || (entry.is_fuzzy() && !use_fuzzy) {
            continue;
        }
        let mut key = match entry.context() {
            Some(context) => format!("{}{}{}", context, CONTEXT_SEPARATOR, entry.msgid()),
            None => entry.msgid().to_string(),
        };
        let value = match entry.plural() {
            Some(plural) => {
                key.push('\0');
                key.push_str(&plural.msgid_plural);
                plural.translations.join("\0")
            }
            None => entry.translation().to_string(),
        };
        pairs.push((key, value));
    }
    pairs.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    let messages = pairs.iter().filter(|(key, _)| !key.is_empty()).count();
    CompiledCatalog {
        bytes: encode(&pairs),
        messages,
    }
}

fn encode(pairs: &[(String, String)]) -> Vec<u8> {
    let count = pairs.len();
    let originals_offset = HEADER_SIZE;
    let translations_offset = originals_offset + count * 8;
    let mut string_offset = translations_offset + count * 8;

    let mut originals = Vec::with_capacity(count);
    for (key, _) in pairs {
        originals.push((key.len(), string_offset));
        string_offset += key.len() + 1;
    }
    let mut translations = Vec::with_capacity(count);
    for (_, value) in pairs {
        translations.push((value.len(), string_offset));
        string_offset += value.len() + 1;
    }

    let mut out = Vec::with_capacity(string_offset);
    for value in [
        MO_MAGIC,
        0,
        count as u32,
        originals_offset as u32,
        translations_offset as u32,
        0,
        (translations_offset + count * 8) as u32,
    ] {
        out.extend_from_slice(&value.to_le_bytes());
    }
    for (len, offset) in originals.iter().chain(translations.iter()) {
        out.extend_from_slice(&(*len as u32).to_le_bytes());
        out.extend_from_slice(&(*offset as u32).to_le_bytes());
    }
    for (key, _) in pairs {
        out.extend_from_slice(key.as_bytes());
        out.push(0);
    }
    for (_, value) in pairs {
        out.extend_from_slice(value.as_bytes());
        out.push(0);
    }
    out
}
