use std::sync::LazyLock;

use regex::Regex;

static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[^{}]*\}").unwrap());
static SPACES_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static SPACE_BEFORE_PUNCT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+([.,;:!?%)])").unwrap());
static SPACE_AFTER_PAREN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([ \t]+").unwrap());
static SPLIT_HYPHEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w)(?:-[ \t]+|[ \t]+-)(\w)").unwrap());

/// Repair the usual damage machine translation does to UI strings.
///
/// `{...}` placeholders are put back as they appear in `source`, in order,
/// since services tend to translate or re-case their names. Runs of spaces
/// collapse to one, stray spaces before closing punctuation and after `(`
/// are dropped, and `e- mail` style splits are joined. Leading and trailing
/// whitespace is taken from the source.
pub fn correct_translation(source: &str, translated: &str) -> String {
    let placeholders: Vec<&str> = PLACEHOLDER_REGEX
        .find_iter(source)
        .map(|m| m.as_str())
        .collect();
    let mut next = placeholders.iter();
    let text = PLACEHOLDER_REGEX.replace_all(translated.trim(), |caps: &regex::Captures| {
        next.next()
            .map(|p| p.to_string())
            .unwrap_or_else(|| caps[0].to_string())
    });

    let text = SPACES_REGEX.replace_all(&text, " ");
    let text = SPACE_BEFORE_PUNCT_REGEX.replace_all(&text, "$1");
    let text = SPACE_AFTER_PAREN_REGEX.replace_all(&text, "(");
    let text = SPLIT_HYPHEN_REGEX.replace_all(&text, "$1-$2");

    let leading = &source[..source.len() - source.trim_start().len()];
    let trailing = &source[source.trim_end().len()..];
    format!("{}{}{}", leading, text, trailing)
}
