use crate::segment::{Token, TokenSource};

/// Brackets/quotes that can only open. Includes the full-width forms even
/// though the standardizer normally folds them away.
const UNAMBIGUOUS_OPENING: &[char] = &[
    '(', '[', '{', '“', '‘', '『', '「', '《', '〈', '【', '〖', '〔',
];

/// Closers and sentence punctuation that never take a space before them.
const UNAMBIGUOUS_CLOSING: &[char] = &[
    ')', ']', '}', '”', '’', '』', '」', '》', '〉', '】', '〗', '〕', ',', '.', '!', '?', ';',
    ':', '。', '：', '；', '，', '、', '！', '？', '…', '～',
];

const AMBIGUOUS_QUOTES: &[char] = &['"', '\''];

#[inline]
pub fn is_opening(c: char) -> bool {
    UNAMBIGUOUS_OPENING.contains(&c)
}

#[inline]
pub fn is_closing(c: char) -> bool {
    UNAMBIGUOUS_CLOSING.contains(&c)
}

#[inline]
pub fn is_ambiguous_quote(c: char) -> bool {
    AMBIGUOUS_QUOTES.contains(&c)
}

/// Any punctuation the segmenter treats as an unmatched-run boundary.
#[inline]
pub fn is_punctuation(c: char) -> bool {
    is_opening(c) || is_closing(c) || is_ambiguous_quote(c)
}

/// Display mode: the canonical meaning, or every candidate parenthesized and
/// slash-joined (phrase mode).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Plain,
    AllMeanings,
}

/// One emitted unit: display text, the original source substring it maps back
/// to, and where it came from. `leading_space` records the machine's spacing
/// decision so consumers can re-assemble the line exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedSpan {
    pub text: String,
    pub original: String,
    pub source: TokenSource,
    pub leading_space: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedLine {
    pub spans: Vec<RenderedSpan>,
}

impl RenderedLine {
    /// Assemble the final line text.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for span in &self.spans {
            if span.leading_space {
                out.push(' ');
            }
            out.push_str(&span.text);
        }
        out.trim().to_string()
    }
}

/// Uppercase the first character of the trimmed text when a capitalization is
/// pending. Returns the (possibly rewritten) text and whether the pending flag
/// is consumed: an alphabetic start consumes it by capitalizing, a leading
/// digit consumes it silently, anything else leaves it pending.
fn apply_capitalization(text: String, should_capitalize: bool) -> (String, bool) {
    if !should_capitalize {
        return (text, false);
    }
    let trimmed = text.trim();
    let Some(first) = trimmed.chars().next() else {
        return (text, false);
    };
    if !first.is_ascii_digit() && trimmed.chars().any(char::is_alphabetic) {
        let leading: String = text.chars().take_while(|c| c.is_whitespace()).collect();
        let mut out = leading;
        out.extend(first.to_uppercase());
        out.extend(trimmed.chars().skip(1));
        return (out, true);
    }
    (text, first.is_ascii_digit())
}

/// Single-pass formatting state machine. Consumes the token stream of one
/// line and decides display text, capitalization, leading whitespace and
/// quote pairing per token. Never fails: malformed input degrades to literal
/// text.
pub fn render_line(tokens: &[Token], mode: Mode) -> RenderedLine {
    let mut line = RenderedLine::default();
    let mut inside_double_quote = false;
    let mut inside_single_quote = false;
    let mut capitalize_next = false;
    let mut last_char: Option<char> = None;
    let mut pos = 0usize;

    for token in tokens {
        let token_len = token.original.chars().count();

        // Suppressed tokens skip the state machine entirely, except for the
        // position/last-char bookkeeping.
        if matches!(
            token.source,
            TokenSource::Blacklisted | TokenSource::Untranslatable
        ) {
            line.spans.push(RenderedSpan {
                text: String::new(),
                original: token.original.clone(),
                source: token.source.clone(),
                leading_space: false,
            });
            last_char = token.original.chars().last();
            pos += token_len;
            continue;
        }

        let display = match token.source {
            TokenSource::Literal | TokenSource::RuleExpansion => token.original.clone(),
            _ => match &token.resolution {
                Some(r) if r.found => match mode {
                    Mode::AllMeanings => format!("({})", r.all.join("/")),
                    Mode::Plain => r.best.clone(),
                },
                _ => String::new(),
            },
        };

        let (display, capitalized) = apply_capitalization(display, capitalize_next);
        if capitalized || display.trim().is_empty() {
            capitalize_next = false;
        }
        if display
            .trim()
            .chars()
            .last()
            .is_some_and(|c| matches!(c, '.' | '!' | '?'))
        {
            capitalize_next = true;
        }
        if token_len == 1 && token.original.chars().next().is_some_and(is_opening) {
            capitalize_next = true;
        }

        let mut leading_space = true;
        let first_char = token.original.chars().next();
        if let Some(quote) = first_char.filter(|c| is_ambiguous_quote(*c)) {
            let is_double = quote == '"';
            let opening = (is_double && !inside_double_quote)
                || (!is_double && !inside_single_quote);
            if opening {
                if token_len == 1 {
                    capitalize_next = true;
                }
                if last_char.is_some_and(is_opening) {
                    leading_space = false;
                }
            } else {
                leading_space = false;
            }
            if is_double {
                inside_double_quote = !inside_double_quote;
            } else {
                inside_single_quote = !inside_single_quote;
            }
        } else {
            let after_opener = last_char.is_some_and(is_opening)
                || (inside_double_quote && last_char == Some('"'))
                || (inside_single_quote && last_char == Some('\''));
            if after_opener || first_char.is_some_and(is_closing) {
                leading_space = false;
            }
        }
        if pos == 0 || last_char.is_some_and(char::is_whitespace) || display.is_empty() {
            leading_space = false;
        }

        line.spans.push(RenderedSpan {
            text: display,
            original: token.original.clone(),
            source: token.source.clone(),
            leading_space,
        });
        last_char = token.original.chars().last();
        pos += token_len;
    }

    line
}
