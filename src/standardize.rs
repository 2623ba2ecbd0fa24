use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// Full-width CJK punctuation and its canonical half-width form. Order matters:
/// multi-char sequences must precede their single-char prefixes in the
/// conversion alternation.
const PUNCTUATION_TABLE: &[(&str, &str)] = &[
    ("。", "."),
    ("、", ","),
    ("，", ","),
    ("～", "~"),
    ("：", ":"),
    ("；", ";"),
    ("？", "?"),
    ("！", "!"),
    ("——", "——"),
    ("—", "—"),
    ("……", "..."),
    ("…", "..."),
    ("“", "\""),
    ("”", "\""),
    ("‘", "'"),
    ("’", "'"),
    ("（", "("),
    ("）", ")"),
    ("〔", "("),
    ("〕", ")"),
    ("『", "("),
    ("』", ")"),
    ("「", "("),
    ("」", ")"),
    ("【", "("),
    ("】", ")"),
    ("〖", "("),
    ("〗", ")"),
    ("《", "("),
    ("》", ")"),
];

static PUNCTUATION_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| PUNCTUATION_TABLE.iter().copied().collect());

static CONVERT_RE: Lazy<Regex> = Lazy::new(|| {
    let alt = PUNCTUATION_TABLE
        .iter()
        .map(|(full, _)| regex::escape(full))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&alt).expect("punctuation convert regex")
});

// Every punctuation char, full-width and half-width, for whitespace collapsing.
static SPACING_RE: Lazy<Regex> = Lazy::new(|| {
    let mut chars: Vec<char> = Vec::new();
    for (full, half) in PUNCTUATION_TABLE {
        chars.extend(full.chars());
        chars.extend(half.chars());
    }
    chars.sort_unstable();
    chars.dedup();
    let class = chars
        .into_iter()
        .map(|c| regex::escape(&c.to_string()))
        .collect::<Vec<_>>()
        .join("");
    Regex::new(&format!("[ \\t]*([{class}])[ \\t]*")).expect("punctuation spacing regex")
});

/// Pre-pass before rule application and segmentation: collapse stray whitespace
/// around punctuation, then map full-width CJK punctuation to half-width.
/// Idempotent on already-standardized text.
pub fn standardize_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let spaced = SPACING_RE.replace_all(text, "$1");
    CONVERT_RE
        .replace_all(&spaced, |caps: &regex::Captures<'_>| {
            let m = caps.get(0).expect("whole match").as_str();
            (*PUNCTUATION_MAP.get(m).unwrap_or(&m)).to_string()
        })
        .into_owned()
}

/// Standardize only the key side of a dictionary line; the meaning side is kept
/// verbatim (it may legitimately contain `=` and target-language punctuation).
pub fn standardize_dictionary_line(line: &str) -> String {
    if line.starts_with('#') || line.trim().is_empty() {
        return line.to_string();
    }
    match line.split_once('=') {
        // No '=': the whole line is a key (blacklist-style files).
        None => standardize_text(line.trim()),
        Some((key, value)) => format!("{}={}", standardize_text(key), value),
    }
}

#[inline]
pub fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

pub fn is_cjk_str(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_cjk)
}
