//! Keyword-based message extraction.
//!
//! Finds calls such as `_("text")` or `pgettext("ctx", "text")` with string
//! literal arguments. This is a pattern scan, not a language parser: calls
//! with computed arguments are simply not recognised.

use regex::Regex;

use crate::catalog::Location;

use super::ExtractedMessage;

/// Keywords recognised without any configuration.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "_",
    "gettext",
    "N_",
    "pgettext:1c,2",
    "ngettext:1,2",
    "npgettext:1c,2,3",
];

const STRING_LITERAL: &str = r#""(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'"#;

/// Argument layout of a keyword call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// `name(msgid)`
    Simple,
    /// `name(ctx, msgid)`
    Context,
    /// `name(msgid, plural)`
    Plural,
    /// `name(ctx, msgid, plural)`
    ContextPlural,
}

impl Shape {
    fn from_args(args: Option<&str>) -> Self {
        match args.map(|a| a.replace(' ', "")).as_deref() {
            Some("1c,2") => Shape::Context,
            Some("1,2") => Shape::Plural,
            Some("1c,2,3") => Shape::ContextPlural,
            _ => Shape::Simple,
        }
    }

    fn arguments(self) -> String {
        let lit = STRING_LITERAL;
        let sep = r"\s*,\s*";
        match self {
            Shape::Simple => format!(r"\(\s*(?P<msg>{lit})"),
            Shape::Context => format!(r"\(\s*(?P<ctx>{lit}){sep}(?P<msg>{lit})"),
            Shape::Plural => format!(r"\(\s*(?P<msg>{lit}){sep}(?P<plural>{lit})"),
            Shape::ContextPlural => format!(
                r"\(\s*(?P<ctx>{lit}){sep}(?P<msg>{lit}){sep}(?P<plural>{lit})"
            ),
        }
    }
}

const SHAPES: [Shape; 4] = [
    Shape::Simple,
    Shape::Context,
    Shape::Plural,
    Shape::ContextPlural,
];

/// Compiled keyword matchers, one regex per argument layout in use.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    matchers: Vec<Regex>,
}

impl KeywordMatcher {
    /// Build a matcher from keyword specs.
    ///
    /// A plain name (`_`) takes the message as first argument. The xgettext
    /// argument specs `:1c,2` (context, message), `:1,2` (message, plural)
    /// and `:1c,2,3` (context, message, plural) select the other layouts.
    /// Any other spec (`name:1`) is treated as a plain name.
    pub fn new<S: AsRef<str>>(specs: &[S]) -> Self {
        let mut names: Vec<(Shape, String)> = Vec::new();

        for spec in specs {
            let spec = spec.as_ref().trim();
            if spec.is_empty() {
                continue;
            }
            let (name, args) = match spec.split_once(':') {
                Some((name, args)) => (name, Some(args)),
                None => (spec, None),
            };
            let entry = (Shape::from_args(args), regex::escape(name));
            if !names.contains(&entry) {
                names.push(entry);
            }
        }

        let matchers = SHAPES
            .iter()
            .filter_map(|&shape| {
                let in_shape: Vec<String> = names
                    .iter()
                    .filter(|(s, _)| *s == shape)
                    .map(|(_, name)| name.clone())
                    .collect();
                build(&in_shape, &shape.arguments())
            })
            .collect();

        Self { matchers }
    }

    /// Extract messages from one file's content, in source order.
    pub fn extract(&self, content: &str, file: &str) -> Vec<ExtractedMessage> {
        let mut found: Vec<(usize, ExtractedMessage)> = Vec::new();

        for re in &self.matchers {
            for caps in re.captures_iter(content) {
                let start = caps.name("kw").map_or(0, |m| m.start());
                let context = caps.name("ctx").map(|m| unquote(m.as_str()));
                let location = Location::new(file, line_of(content, start));
                let mut message =
                    ExtractedMessage::new(unquote(&caps["msg"]), context, vec![location]);
                if let Some(plural) = caps.name("plural") {
                    message = message.with_plural(unquote(plural.as_str()));
                }
                found.push((start, message));
            }
        }

        found.sort_by_key(|(start, _)| *start);
        found.into_iter().map(|(_, message)| message).collect()
    }
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS)
    }
}

fn build(names: &[String], arguments: &str) -> Option<Regex> {
    if names.is_empty() {
        return None;
    }
    // Longest names first so `gettext` is not shadowed by a shorter prefix.
    let mut names = names.to_vec();
    names.sort_by_key(|n| std::cmp::Reverse(n.len()));
    let pattern = format!(r"(?:^|[^\w.])(?P<kw>{}){}", names.join("|"), arguments);
    Regex::new(&pattern).ok()
}

fn line_of(content: &str, offset: usize) -> usize {
    content[..offset].bytes().filter(|&b| b == b'\n').count() + 1
}

/// Strip the quotes of a string literal and resolve its escapes.
fn unquote(literal: &str) -> String {
    let inner = &literal[1..literal.len().saturating_sub(1).max(1)];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other @ ('\\' | '"' | '\'')) => out.push(other),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
