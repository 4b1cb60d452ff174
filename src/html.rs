//! Best-effort HTML to plain text conversion

use regex::Regex;
use std::sync::LazyLock;

// Applied in order: the head and anchor rules must run before generic tag stripping.
static HTML_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"(?is)<head.*?>.*?</head>").unwrap(), ""),
        (Regex::new(r"(?is)<a\s.*?>").unwrap(), " HYPERLINK "),
        (Regex::new(r"(?s)<.*?>").unwrap(), ""),
        (Regex::new(r"(\s*\n)+").unwrap(), "\n"),
    ]
});

/// Convert HTML markup to plain text
///
/// Drops the `<head>` section, turns every `<a ...>` opening tag into the
/// word `HYPERLINK`, strips the remaining tags, collapses blank lines and
/// finally decodes HTML entities. Malformed markup degrades the output but
/// never fails.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let text = HTML_RULES
        .iter()
        .fold(html.to_string(), |text, (pattern, replacement)| {
            pattern.replace_all(&text, *replacement).into_owned()
        });

    decode_entities(&text)
}

/// Decode named and numeric character references
///
/// Follows the HTML5 rules for text content: every entity of the HTML5
/// table, legacy entities such as `&amp` without their semicolon,
/// `&#128;`-`&#159;` read as windows-1252, and invalid code points
/// replaced by U+FFFD. Anything else is left as written.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    htmlize::unescape(text).into_owned()
}
