//! Cosmetic clean-up of generated section text into a small HTML subset.
//!
//! Model output is unstructured prose with leftover markdown, so this is an
//! ordered list of independent rewrite rules rather than a parser. Later rules
//! assume earlier ones already ran. The output only uses `<br>`, `<strong>`,
//! `<h2>`, `<h3>`, `<img>`, `<ul>` and `<li>`, and never contains `*`, `#`,
//! markdown links or raw `http(s)://` URLs.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// A named text rewrite
pub type Rule = fn(&str) -> String;

/// Rules in the order `normalize` applies them
pub const RULES: [(&str, Rule); 9] = [
    ("heading_remnant", heading_remnant),
    ("bold_markers", bold_markers),
    ("line_labels", line_labels),
    ("links", links),
    ("prompt_echo", prompt_echo),
    ("list_markers", list_markers),
    ("stray_markup", stray_markup),
    ("line_breaks", line_breaks),
    ("heading_spacing", heading_spacing),
];

/// Run every rule over a section body
pub fn normalize(text: &str) -> String {
    RULES
        .iter()
        .fold(text.to_string(), |acc, (_, rule)| rule(&acc))
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Invalid normalizer regex")
}

static REMNANT_START: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)^(?:of|for|and)\b"));
static BOLD: LazyLock<Regex> = LazyLock::new(|| regex(r"\*\*([^*\n]+?)\*\*"));
static STRONG_THEN_COLON: LazyLock<Regex> = LazyLock::new(|| {
    regex(r"(?m)^([ \t]*(?:[-*•+][ \t]+|\d+[.)][ \t]+)?)<strong>([^<\n]+?)</strong>:")
});
// A colon only ends a label when whitespace or the line end follows it, so
// clock times like 7:30 AM stay intact.
static PLAIN_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    regex(
        r"(?m)^([ \t]*(?:[-*•+][ \t]+|\d+[.)][ \t]+)?)([A-Za-z](?:\d{1,2}:\d{2}|[^:\n<>*]){0,60}?):([ \t]|$)",
    )
});
static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| regex(r"!?\[([^\[\]\n]*)\]\([^()\n]*\)"));
static BARE_BRACKETS: LazyLock<Regex> = LazyLock::new(|| regex(r"\[([^\[\]\n]*)\]"));
static BARE_URL: LazyLock<Regex> = LazyLock::new(|| regex(r#"(?i)https?://[^\s<>"')\]]*"#));
static PROMPT_ECHO: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        regex(r"(?i)\band\s+powders\b[^\n<]*"),
        regex(r"(?i)\band\s+symptoms\s+of\s+[A-Za-z ]+"),
        regex(r"(?i)\bdetailed\b[ \t]*"),
        regex(r"(?i)\bayurvedic\b[ \t]*"),
        regex(r"(?i)[ \t]*\bexercises\b"),
    ]
});
static TRAILING_FOR: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?m)[ \t]+for[ \t]+[A-Za-z' ,-]+(:</strong>|:)[ \t]*$"));
static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?m)^[ \t]*\d+[.)](?:[ \t]+|$)"));
static NUMBERED_TAG: LazyLock<Regex> = LazyLock::new(|| regex(r"(?m)^[ \t]*\d+[.)](<)"));
static BULLET: LazyLock<Regex> = LazyLock::new(|| regex(r"(?m)^[ \t]*[-*•+][ \t]+"));
static RULE_LINE: LazyLock<Regex> = LazyLock::new(|| regex(r"(?m)^[ \t]*[-_=]{3,}[ \t]*$"));
static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| regex(r"\n[ \t]*(?:\n[ \t]*)+"));
static BR_RUN: LazyLock<Regex> = LazyLock::new(|| regex(r"(?:<br>\s*){3,}"));
static BR_EDGES: LazyLock<Regex> =
    LazyLock::new(|| regex(r"^(?:\s*<br>)+\s*|\s*(?:<br>\s*)+$"));
static BEFORE_H2: LazyLock<Regex> = LazyLock::new(|| regex(r"(?:<br>\s*)*<h2>"));

/// Drop a short first line that only continues the heading, e.g. the
/// `of Diabetes:` left after `Symptoms`, or `and Powders for Diabetes`.
pub fn heading_remnant(text: &str) -> String {
    let body = text.trim_start();
    let (first_line, rest) = match body.find('\n') {
        Some(index) => (&body[..index], &body[index + 1..]),
        None => (body, ""),
    };

    if REMNANT_START.is_match(first_line) && first_line.split_whitespace().count() <= 8 {
        rest.to_string()
    } else {
        text.to_string()
    }
}

/// `**text**` to `<strong>text</strong>`
pub fn bold_markers(text: &str) -> String {
    BOLD.replace_all(text, "<strong>$1</strong>").into_owned()
}

/// `Label:` at the start of a line to `<strong>Label:</strong>`
pub fn line_labels(text: &str) -> String {
    let folded = STRONG_THEN_COLON.replace_all(text, "$1<strong>$2:</strong>");
    PLAIN_LABEL
        .replace_all(&folded, "$1<strong>$2:</strong>$3")
        .into_owned()
}

/// Markdown links and images keep their text; bare URLs are removed
pub fn links(text: &str) -> String {
    let mut current = text.to_string();
    // Nested brackets resolve from the inside out
    while MARKDOWN_LINK.is_match(&current) {
        current = MARKDOWN_LINK.replace_all(&current, "$1").into_owned();
    }
    let current = BARE_BRACKETS.replace_all(&current, "$1");
    BARE_URL.replace_all(&current, "").into_owned()
}

/// Remove wording the model copies back from the prompt
pub fn prompt_echo(text: &str) -> String {
    let cleaned = PROMPT_ECHO
        .iter()
        .fold(text.to_string(), |acc, re| re.replace_all(&acc, "").into_owned());
    TRAILING_FOR.replace_all(&cleaned, "$1").into_owned()
}

/// Numbered and bulleted list markers at line start
pub fn list_markers(text: &str) -> String {
    let text = NUMBERED.replace_all(text, "");
    let text = NUMBERED_TAG.replace_all(&text, "$1");
    BULLET.replace_all(&text, "").into_owned()
}

/// Leftover emphasis, heading and rule markup.
///
/// Dropping these characters can join the pieces of a link or URL
/// (`http*s://`), so links are resolved again afterwards.
pub fn stray_markup(text: &str) -> String {
    let text = RULE_LINE.replace_all(text, "");
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '*' | '#' | '`'))
        .collect();
    links(&cleaned)
}

/// Newlines to `<br>`: blank-line runs become one paragraph break and no more
/// than two `<br>` ever follow each other
pub fn line_breaks(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let trimmed = text
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    let collapsed = BLANK_RUN.replace_all(trimmed.trim(), "\n\n");
    let html = collapsed.replace('\n', "<br>");
    let html = BR_RUN.replace_all(&html, "<br><br>");
    BR_EDGES.replace_all(&html, "").into_owned()
}

/// Exactly one `<br>` before every `<h2>` except at the very start
pub fn heading_spacing(text: &str) -> String {
    let spaced = BEFORE_H2.replace_all(text, |caps: &Captures| {
        if caps.get(0).map(|m| m.start()) == Some(0) {
            "<h2>".to_string()
        } else {
            "<br><h2>".to_string()
        }
    });
    spaced.into_owned()
}
