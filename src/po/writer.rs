//! PO file writer.
//!
//! Output follows gettext conventions: the header entry first, one blank
//! line between entries, long or multi-line strings written as `""`
//! followed by continuation lines wrapped at the configured width.

use unicode_width::UnicodeWidthStr;

use super::parser::{FSI, PDI};
use crate::catalog::{Catalog, Location, MessageEntry};

const OBSOLETE_PREFIX: &str = "#~ ";

/// Render a catalog as PO text. `line_width` 0 disables wrapping.
pub fn write_po(catalog: &Catalog, line_width: usize) -> String {
    let mut out = String::new();

    for comment in &catalog.header.comments {
        push_comment(&mut out, "#", comment);
    }
    if !catalog.header.is_empty() {
        push_string(&mut out, "", "msgid", "", line_width);
        push_string(
            &mut out,
            "",
            "msgstr",
            &catalog.header.to_msgstr(),
            line_width,
        );
    }

    for entry in catalog.entries() {
        if !out.is_empty() {
            out.push('\n');
        }
        write_entry(&mut out, entry, line_width);
    }

    out
}

fn write_entry(out: &mut String, entry: &MessageEntry, line_width: usize) {
    for comment in &entry.translator_comments {
        push_comment(out, "#", comment);
    }
    for comment in &entry.extracted_comments {
        push_comment(out, "#.", comment);
    }
    if !entry.locations.is_empty() {
        let refs: Vec<String> = entry.locations.iter().map(reference).collect();
        for line in wrap_words(&refs, line_width.saturating_sub(3)) {
            out.push_str("#: ");
            out.push_str(&line);
            out.push('\n');
        }
    }
    let flags = entry.all_flags();
    if !flags.is_empty() {
        out.push_str("#, ");
        out.push_str(&flags.join(", "));
        out.push('\n');
    }

    let prefix = if entry.obsolete { OBSOLETE_PREFIX } else { "" };
    if let Some(context) = entry.context() {
        push_string(out, prefix, "msgctxt", context, line_width);
    }
    push_string(out, prefix, "msgid", entry.msgid(), line_width);
    match entry.plural() {
        Some(plural) => {
            push_string(out, prefix, "msgid_plural", &plural.msgid_plural, line_width);
            for (i, translation) in plural.translations.iter().enumerate() {
                push_string(out, prefix, &format!("msgstr[{}]", i), translation, line_width);
            }
        }
        None => push_string(out, prefix, "msgstr", entry.translation(), line_width),
    }
}

/// One `#:` reference. File names that would not read back as a single
/// token, or that look like `name:line` on their own, are isolated.
fn reference(location: &Location) -> String {
    let file = &location.file;
    let looks_numbered = file
        .rsplit_once(':')
        .is_some_and(|(_, tail)| !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()));
    let needs_isolate = file.is_empty()
        || file.chars().any(char::is_whitespace)
        || file.starts_with(FSI)
        || (location.line.is_none() && looks_numbered);

    let file = if needs_isolate {
        format!("{}{}{}", FSI, file, PDI)
    } else {
        file.clone()
    };
    match location.line {
        Some(line) => format!("{}:{}", file, line),
        None => file,
    }
}

fn push_comment(out: &mut String, marker: &str, text: &str) {
    out.push_str(marker);
    if !text.is_empty() {
        out.push(' ');
        out.push_str(text);
    }
    out.push('\n');
}

/// Write `keyword "value"`, switching to the multi-line form when the value
/// has inner newlines or does not fit on one line.
fn push_string(out: &mut String, prefix: &str, keyword: &str, value: &str, line_width: usize) {
    let escaped = escape(value);
    let single = format!("{}{} \"{}\"", prefix, keyword, escaped);

    let pieces: Vec<&str> = value.split_inclusive('\n').collect();
    let too_long = line_width > 0 && single.width() > line_width;
    if pieces.len() <= 1 && !too_long {
        out.push_str(&single);
        out.push('\n');
        return;
    }

    out.push_str(&format!("{}{} \"\"\n", prefix, keyword));
    // Room left for the text once the prefix and quotes are written.
    let room = line_width.saturating_sub(prefix.width() + 2);
    for piece in pieces {
        let escaped = escape(piece);
        for line in wrap_escaped(&escaped, room) {
            out.push_str(prefix);
            out.push('"');
            out.push_str(&line);
            out.push_str("\"\n");
        }
    }
}

/// Split escaped text after spaces so each chunk fits in `room` columns.
/// Chunks without a break opportunity are kept whole.
fn wrap_escaped(escaped: &str, room: usize) -> Vec<String> {
    if room == 0 || escaped.width() <= room {
        return vec![escaped.to_string()];
    }
    let words: Vec<&str> = escaped.split_inclusive(' ').collect();
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in words {
        if !current.is_empty() && current.width() + word.width() > room {
            lines.push(std::mem::take(&mut current));
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Join words with single spaces, breaking lines at `room` columns.
fn wrap_words(words: &[String], room: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in words {
        if !current.is_empty() && room > 0 && current.width() + 1 + word.width() > room {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub(crate) fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}
