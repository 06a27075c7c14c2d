//! PO file parser.
//!
//! Reads the subset of the gettext PO format this tool writes plus what
//! common editors produce: comments of every kind, flags, locations,
//! `msgctxt`, plural forms, multi-line strings and `#~` obsolete entries.
//! File names in `#:` lines may be wrapped in Unicode isolates (U+2068 and
//! U+2069), which is how names with spaces are written.

use thiserror::Error;

use crate::catalog::{Catalog, Header, InvalidState, Location, MessageEntry};

/// First strong isolate, opens a quoted file name in a `#:` line.
pub(crate) const FSI: char = '\u{2068}';
/// Pop directional isolate, closes it.
pub(crate) const PDI: char = '\u{2069}';

#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct PoParseError {
    pub line: usize,
    pub message: String,
}

impl PoParseError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    None,
    Context,
    MsgId,
    MsgIdPlural,
    MsgStr,
    /// `msgstr[n]`, by position in `Pending::plural_msgstr`.
    MsgStrPlural(usize),
}

/// Entry being assembled from consecutive lines.
#[derive(Debug, Default)]
struct Pending {
    start_line: usize,
    translator_comments: Vec<String>,
    extracted_comments: Vec<String>,
    locations: Vec<Location>,
    flags: Vec<String>,
    context: Option<String>,
    msgid: Option<String>,
    msgid_plural: Option<String>,
    msgstr: Option<String>,
    plural_msgstr: Vec<String>,
    obsolete: bool,
}

impl Pending {
    fn is_blank(&self) -> bool {
        self.msgid.is_none()
            && self.context.is_none()
            && self.translator_comments.is_empty()
            && self.extracted_comments.is_empty()
            && self.locations.is_empty()
            && self.flags.is_empty()
    }

    fn has_keywords(&self) -> bool {
        self.msgid.is_some() || self.context.is_some()
    }

    fn has_translation(&self) -> bool {
        self.msgstr.is_some() || !self.plural_msgstr.is_empty()
    }
}

struct Parser {
    catalog: Catalog,
    pending: Pending,
    field: Field,
    header_seen: bool,
}

/// Parse PO `content` into a catalog for `domain`/`language`.
pub fn parse_po(content: &str, domain: &str, language: &str) -> Result<Catalog, PoParseError> {
    let mut parser = Parser {
        catalog: Catalog::new(domain, language),
        pending: Pending::default(),
        field: Field::None,
        header_seen: false,
    };

    for (idx, raw) in content.lines().enumerate() {
        parser.line(idx + 1, raw.trim_end_matches('\r'))?;
    }
    parser.finish_entry(content.lines().count() + 1)?;

    Ok(parser.catalog)
}

impl Parser {
    fn line(&mut self, line_no: usize, raw: &str) -> Result<(), PoParseError> {
        // Comments keep trailing whitespace; everything else is trimmed.
        let line = raw.trim_start();
        if line.trim_end().is_empty() {
            return self.finish_entry(line_no);
        }

        if let Some(rest) = line.strip_prefix("#~") {
            let rest = rest.trim();
            // `#~|` previous-string lines carry no state we keep.
            if rest.starts_with('|') {
                return Ok(());
            }
            if !self.pending.obsolete && self.pending.has_keywords() {
                self.finish_entry(line_no)?;
            }
            self.pending.obsolete = true;
            return self.keyword_line(line_no, rest);
        }

        if line.starts_with('#') {
            // A comment after the strings starts the next entry.
            if self.pending.has_translation() {
                self.finish_entry(line_no)?;
            }
            self.mark_start(line_no);
            self.comment_line(line);
            return Ok(());
        }

        self.keyword_line(line_no, line.trim_end())
    }

    fn comment_line(&mut self, line: &str) {
        let pending = &mut self.pending;
        if let Some(flags) = line.strip_prefix("#,") {
            let flags = flags.trim_end();
            for flag in flags.split(',').map(str::trim).filter(|f| !f.is_empty()) {
                if !pending.flags.iter().any(|f| f == flag) {
                    pending.flags.push(flag.to_string());
                }
            }
        } else if let Some(refs) = line.strip_prefix("#:") {
            pending.locations.extend(parse_references(refs));
        } else if let Some(text) = line.strip_prefix("#.") {
            pending
                .extracted_comments
                .push(text.strip_prefix(' ').unwrap_or(text).to_string());
        } else if line.starts_with("#|") {
            // Previous msgid of a fuzzy entry; regenerated by merges, not kept.
        } else {
            let text = &line[1..];
            pending
                .translator_comments
                .push(text.strip_prefix(' ').unwrap_or(text).to_string());
        }
    }

    fn keyword_line(&mut self, line_no: usize, line: &str) -> Result<(), PoParseError> {
        if line.starts_with('"') {
            let value = parse_quoted(line).ok_or_else(|| bad_string(line_no))?;
            let target = match self.field {
                Field::Context => self.pending.context.as_mut(),
                Field::MsgId => self.pending.msgid.as_mut(),
                Field::MsgIdPlural => self.pending.msgid_plural.as_mut(),
                Field::MsgStr => self.pending.msgstr.as_mut(),
                Field::MsgStrPlural(n) => self.pending.plural_msgstr.get_mut(n),
                Field::None => None,
            }
            .ok_or_else(|| PoParseError::new(line_no, "string continuation without a keyword"))?;
            target.push_str(&value);
            return Ok(());
        }

        let (keyword, rest) = line
            .split_once(|c: char| c.is_whitespace())
            .map(|(k, r)| (k, r.trim_start()))
            .unwrap_or((line, ""));

        match keyword {
            "msgctxt" => {
                if self.pending.has_keywords() {
                    self.finish_entry(line_no)?;
                }
                self.mark_start(line_no);
                self.pending.context = Some(self.quoted(line_no, rest)?);
                self.field = Field::Context;
            }
            "msgid" => {
                if self.pending.msgid.is_some() {
                    self.finish_entry(line_no)?;
                }
                self.mark_start(line_no);
                self.pending.msgid = Some(self.quoted(line_no, rest)?);
                self.field = Field::MsgId;
            }
            "msgstr" => {
                if self.pending.msgid.is_none() {
                    return Err(PoParseError::new(line_no, "msgstr without msgid"));
                }
                if self.pending.msgid_plural.is_some() {
                    return Err(PoParseError::new(
                        line_no,
                        "plural entry needs msgstr[n], not msgstr",
                    ));
                }
                if self.pending.msgstr.is_some() {
                    return Err(PoParseError::new(line_no, "duplicate msgstr"));
                }
                self.pending.msgstr = Some(self.quoted(line_no, rest)?);
                self.field = Field::MsgStr;
            }
            "msgid_plural" => {
                if self.pending.msgid.is_none() || self.pending.has_translation() {
                    return Err(PoParseError::new(
                        line_no,
                        "msgid_plural must follow msgid",
                    ));
                }
                if self.pending.msgid_plural.is_some() {
                    return Err(PoParseError::new(line_no, "duplicate msgid_plural"));
                }
                self.pending.msgid_plural = Some(self.quoted(line_no, rest)?);
                self.field = Field::MsgIdPlural;
            }
            k if k.starts_with("msgstr[") => {
                if self.pending.msgid_plural.is_none() {
                    return Err(PoParseError::new(line_no, "msgstr[n] without msgid_plural"));
                }
                let index = k
                    .strip_prefix("msgstr[")
                    .and_then(|k| k.strip_suffix(']'))
                    .and_then(|n| n.parse::<usize>().ok())
                    .ok_or_else(|| {
                        PoParseError::new(line_no, format!("bad plural index \"{}\"", k))
                    })?;
                let expected = self.pending.plural_msgstr.len();
                if index != expected {
                    return Err(PoParseError::new(
                        line_no,
                        format!("expected msgstr[{}], found msgstr[{}]", expected, index),
                    ));
                }
                let value = self.quoted(line_no, rest)?;
                self.pending.plural_msgstr.push(value);
                self.field = Field::MsgStrPlural(index);
            }
            other => {
                return Err(PoParseError::new(
                    line_no,
                    format!("unexpected keyword \"{}\"", other),
                ));
            }
        }
        Ok(())
    }

    fn quoted(&self, line_no: usize, rest: &str) -> Result<String, PoParseError> {
        parse_quoted(rest).ok_or_else(|| bad_string(line_no))
    }

    fn mark_start(&mut self, line_no: usize) {
        if self.pending.is_blank() {
            self.pending.start_line = line_no;
        }
    }

    fn finish_entry(&mut self, line_no: usize) -> Result<(), PoParseError> {
        let pending = std::mem::take(&mut self.pending);
        self.field = Field::None;

        let Some(msgid) = pending.msgid else {
            if pending.context.is_some() {
                return Err(PoParseError::new(
                    pending.start_line,
                    "msgctxt without msgid",
                ));
            }
            // Comment block with no entry, e.g. a trailing note.
            return Ok(());
        };
        let start = pending.start_line.max(1).min(line_no);
        if pending.msgid_plural.is_some() && pending.plural_msgstr.is_empty() {
            return Err(PoParseError::new(start, "msgid_plural without msgstr[0]"));
        }
        let msgstr = match (&pending.msgid_plural, pending.msgstr) {
            (Some(_), _) => String::new(),
            (None, Some(msgstr)) => msgstr,
            (None, None) => return Err(PoParseError::new(start, "msgid without msgstr")),
        };

        if msgid.is_empty() && pending.context.is_none() && !pending.obsolete {
            if self.header_seen || !self.catalog.is_empty() {
                return Err(PoParseError::new(start, "header entry must come first"));
            }
            let mut header = Header::from_msgstr(&msgstr);
            header.comments = pending.translator_comments;
            self.catalog.header = header;
            self.header_seen = true;
            return Ok(());
        }

        let mut entry = MessageEntry::new(msgid, pending.context)
            .map_err(|e: InvalidState| PoParseError::new(start, e.to_string()))?
            .with_translation(msgstr)
            .with_locations(pending.locations);
        if let Some(msgid_plural) = pending.msgid_plural {
            entry = entry.with_plural(msgid_plural, pending.plural_msgstr);
        }
        for flag in &pending.flags {
            entry.apply_flag(flag);
        }
        entry.obsolete = pending.obsolete;
        entry.translator_comments = pending.translator_comments;
        entry.extracted_comments = pending.extracted_comments;

        if self.catalog.contains(entry.key()) {
            return Err(PoParseError::new(
                start,
                format!("duplicate message \"{}\"", entry.key()),
            ));
        }
        self.catalog.insert(entry);
        Ok(())
    }
}

fn bad_string(line_no: usize) -> PoParseError {
    PoParseError::new(line_no, "expected a quoted string")
}

/// Split the text of a `#:` line into locations. Whitespace separates
/// references except inside an isolated file name.
fn parse_references(refs: &str) -> Vec<Location> {
    let mut locations = Vec::new();
    let mut rest = refs.trim_start();
    while !rest.is_empty() {
        let end = if rest.starts_with(FSI) {
            rest.find(PDI)
                .map(|close| {
                    let after = close + PDI.len_utf8();
                    after + rest[after..].find(char::is_whitespace).unwrap_or(rest.len() - after)
                })
                .unwrap_or(rest.len())
        } else {
            rest.find(char::is_whitespace).unwrap_or(rest.len())
        };
        let (token, tail) = rest.split_at(end);
        locations.push(parse_location(token));
        rest = tail.trim_start();
    }
    locations
}

/// `file:line`, a bare `file`, or either with the file name isolated.
fn parse_location(token: &str) -> Location {
    if let Some(quoted) = token.strip_prefix(FSI) {
        let Some((file, suffix)) = quoted.split_once(PDI) else {
            return Location::file_only(quoted);
        };
        return match suffix.strip_prefix(':').map(str::parse::<usize>) {
            Some(Ok(line)) => Location::new(file, line),
            _ => Location::file_only(format!("{}{}", file, suffix)),
        };
    }
    match token.rsplit_once(':') {
        Some((file, line)) if !file.is_empty() => match line.parse::<usize>() {
            Ok(line) => Location::new(file, line),
            Err(_) => Location::file_only(token),
        },
        _ => Location::file_only(token),
    }
}

/// Decode one `"..."` PO string. Returns `None` if the quotes are unbalanced.
pub(crate) fn parse_quoted(text: &str) -> Option<String> {
    let mut chars = text.trim().chars();
    if chars.next() != Some('"') {
        return None;
    }
    let mut out = String::new();
    let mut escape = false;
    for ch in chars.by_ref() {
        if escape {
            match ch {
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                '"' => out.push('"'),
                '\\' => out.push('\\'),
                other => {
                    out.push('\\');
                    out.push(other);
                }
            }
            escape = false;
            continue;
        }
        match ch {
            '\\' => escape = true,
            '"' => {
                return chars.as_str().trim().is_empty().then_some(out);
            }
            other => out.push(other),
        }
    }
    None
}
