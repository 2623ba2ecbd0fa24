use crate::context::{EngineContext, OverrideMap, Resolution};
use crate::dictionary::USER_DICT_ID;
use crate::render::is_punctuation;
use crate::rules::RuleSpan;
use crate::standardize::is_cjk_str;
use crate::trie::Match;

/// Where a token's translation (or its suppression) came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenSource {
    UserOverride,
    TemporaryOverride,
    Dictionary(String),
    RuleExpansion,
    Literal,
    Blacklisted,
    Untranslatable,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub original: String,
    pub resolution: Option<Resolution>,
    pub source: TokenSource,
}

fn longest_temp_key(temp: &OverrideMap, chars: &[char], start: usize) -> Option<String> {
    let mut longest: Option<&str> = None;
    for key in temp.keys() {
        let len = key.chars().count();
        if len == 0 || start + len > chars.len() {
            continue;
        }
        if longest.is_some_and(|l| l.chars().count() >= len) {
            continue;
        }
        if key.chars().zip(&chars[start..]).all(|(a, b)| a == *b) {
            longest = Some(key);
        }
    }
    longest.map(str::to_string)
}

fn has_match_at(ctx: &EngineContext, temp: &OverrideMap, chars: &[char], at: usize) -> bool {
    longest_temp_key(temp, chars, at).is_some() || ctx.trie().longest_match(chars, at).is_some()
}

/// Optimal-total-length disambiguation. The default candidate is the single
/// longest match; a strictly shorter match M wins when the longest match
/// starting right after M makes `len(M) + len(N)` exceed the default. The
/// first qualifying shorter match (shortest first) is taken. This keeps a
/// long compound entry from swallowing the head of a following, independently
/// long word.
fn choose_match(ctx: &EngineContext, chars: &[char], start: usize, matches: Vec<Match>) -> Match {
    debug_assert!(!matches.is_empty());
    let longest = matches.last().expect("non-empty matches").clone();
    if matches.len() == 1 {
        return longest;
    }
    let longest_len = longest.key.chars().count();
    for m in &matches[..matches.len() - 1] {
        let m_len = m.key.chars().count();
        if let Some(next) = ctx.trie().longest_match(chars, start + m_len) {
            if m_len + next.key.chars().count() > longest_len {
                return m.clone();
            }
        }
    }
    longest
}

fn source_for_dict(dict_id: &str) -> TokenSource {
    if dict_id == USER_DICT_ID {
        TokenSource::UserOverride
    } else {
        TokenSource::Dictionary(dict_id.to_string())
    }
}

/// Tokenize one (standardized, rule-expanded) line. `rule_spans` are byte
/// ranges of rule substitutions in `line`; unmatched runs starting inside one
/// are tagged `RuleExpansion` so the expanded text surfaces verbatim.
pub fn segment_line(
    ctx: &EngineContext,
    temp: &OverrideMap,
    line: &str,
    rule_spans: &[RuleSpan],
) -> Vec<Token> {
    let chars: Vec<char> = line.chars().collect();
    // Byte offset of each char, for rule-span tagging.
    let byte_offsets: Vec<usize> = line.char_indices().map(|(i, _)| i).collect();
    let in_rule_span = |char_idx: usize| -> bool {
        let byte = byte_offsets[char_idx];
        rule_spans.iter().any(|s| s.start <= byte && byte < s.end)
    };

    let mut tokens = Vec::new();
    let mut i = 0usize;
    while i < chars.len() {
        // Temporary overrides take absolute precedence, no lookahead policy.
        if let Some(key) = longest_temp_key(temp, &chars, i) {
            let len = key.chars().count();
            let resolution = ctx.resolve(&key, temp);
            let token = if resolution.best.is_empty() && resolution.all.is_empty() {
                Token {
                    original: key,
                    resolution: None,
                    source: TokenSource::Blacklisted,
                }
            } else {
                Token {
                    original: key,
                    resolution: Some(resolution),
                    source: TokenSource::TemporaryOverride,
                }
            };
            tokens.push(token);
            i += len;
            continue;
        }

        let matches = ctx.trie().all_matches(&chars, i);
        if !matches.is_empty() {
            let chosen = if matches.len() == 1 {
                matches.into_iter().next().expect("single match")
            } else {
                choose_match(ctx, &chars, i, matches)
            };
            let len = chosen.key.chars().count();
            if chosen.payload.meaning.is_empty() {
                tokens.push(Token {
                    original: chosen.key,
                    resolution: None,
                    source: TokenSource::Blacklisted,
                });
            } else {
                let resolution = ctx.resolve(&chosen.key, temp);
                tokens.push(Token {
                    original: chosen.key,
                    resolution: Some(resolution),
                    source: source_for_dict(&chosen.payload.dict_id),
                });
            }
            i += len;
            continue;
        }

        // Unmatched run: a punctuation char stands alone; anything else
        // extends until a dictionary word starts ahead or punctuation breaks
        // the run.
        let start = i;
        let mut end = i + 1;
        if !is_punctuation(chars[i]) {
            while end < chars.len() {
                if has_match_at(ctx, temp, &chars, end) || is_punctuation(chars[end]) {
                    break;
                }
                end += 1;
            }
        }
        let block: String = chars[start..end].iter().collect();
        let source = if in_rule_span(start) {
            TokenSource::RuleExpansion
        } else if is_cjk_str(&block) {
            TokenSource::Untranslatable
        } else {
            TokenSource::Literal
        };
        tokens.push(Token {
            original: block,
            resolution: None,
            source,
        });
        i = end;
    }
    tokens
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{segment_line, TokenSource};
    use crate::context::{EngineContext, OverrideMap};
    use crate::dictionary::NamedDictionary;

    fn ctx_with(pairs: &[(&str, &str)]) -> EngineContext {
        let mut d = NamedDictionary::new("Vietphrase", 40);
        for (k, v) in pairs {
            d.entries.insert((*k).to_string(), (*v).to_string());
        }
        EngineContext::build(vec![d], HashMap::new()).expect("context")
    }

    fn keys(ctx: &EngineContext, temp: &OverrideMap, line: &str) -> Vec<String> {
        segment_line(ctx, temp, line, &[])
            .into_iter()
            .map(|t| t.original)
            .collect()
    }

    #[test]
    fn prefers_the_compound_over_a_leading_fragment() {
        // "会" is not a standalone entry, so the longest match at 0 must not
        // be broken up.
        let ctx = ctx_with(&[("将会", "sẽ"), ("变得更强", "trở nên mạnh hơn"), ("将", "đem")]);
        let temp = OverrideMap::new();
        assert_eq!(keys(&ctx, &temp, "将会变得更强"), vec!["将会", "变得更强"]);
    }

    #[test]
    fn lookahead_overrides_the_greedy_longest_match() {
        // Greedy-longest would take 在劫 and strand 云中; the shorter 在 plus
        // the following 劫云中 cover more text in total.
        let ctx = ctx_with(&[("在", "ở"), ("在劫", "tại kiếp"), ("劫云中", "trong kiếp vân")]);
        let temp = OverrideMap::new();
        assert_eq!(keys(&ctx, &temp, "在劫云中"), vec!["在", "劫云中"]);
    }

    #[test]
    fn single_longest_match_wins_when_lookahead_does_not_beat_it() {
        let ctx = ctx_with(&[("你", "ngươi"), ("好", "tốt"), ("你好", "xin chào")]);
        let temp = OverrideMap::new();
        assert_eq!(keys(&ctx, &temp, "你好"), vec!["你好"]);
    }

    #[test]
    fn temporary_overrides_win_over_everything() {
        let ctx = ctx_with(&[("你好", "xin chào")]);
        let mut temp = OverrideMap::new();
        temp.insert("你好吗".to_string(), "khỏe chứ".to_string());
        let tokens = segment_line(&ctx, &temp, "你好吗", &[]);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].original, "你好吗");
        assert_eq!(tokens[0].source, TokenSource::TemporaryOverride);
    }

    #[test]
    fn unmatched_non_cjk_extends_to_one_literal_run() {
        let ctx = ctx_with(&[("你好", "xin chào")]);
        let temp = OverrideMap::new();
        let tokens = segment_line(&ctx, &temp, "ABC你好", &[]);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].original, "ABC");
        assert_eq!(tokens[0].source, TokenSource::Literal);
        assert_eq!(tokens[1].original, "你好");
    }

    #[test]
    fn unmatched_cjk_run_is_untranslatable_and_breaks_at_punctuation() {
        let ctx = ctx_with(&[("你好", "xin chào")]);
        let temp = OverrideMap::new();
        let tokens = segment_line(&ctx, &temp, "未知词汇!你好", &[]);
        assert_eq!(
            tokens
                .iter()
                .map(|t| t.original.as_str())
                .collect::<Vec<_>>(),
            vec!["未知词汇", "!", "你好"]
        );
        assert_eq!(tokens[0].source, TokenSource::Untranslatable);
        assert_eq!(tokens[1].source, TokenSource::Literal);
    }

    #[test]
    fn blacklisted_entry_matches_but_is_tagged_suppressed() {
        let mut blacklist = NamedDictionary::new("Blacklist", 99);
        blacklist.entries.insert("之".to_string(), String::new());
        let mut phrases = NamedDictionary::new("Vietphrase", 40);
        phrases.entries.insert("你好".to_string(), "xin chào".to_string());
        let ctx = EngineContext::build(vec![phrases, blacklist], HashMap::new()).expect("context");

        let tokens = segment_line(&ctx, &OverrideMap::new(), "你好之", &[]);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].original, "之");
        assert_eq!(tokens[1].source, TokenSource::Blacklisted);
        assert!(tokens[1].resolution.is_none());
    }

    #[test]
    fn user_override_matches_are_tagged_as_such() {
        let mut phrases = NamedDictionary::new("Vietphrase", 40);
        phrases.entries.insert("林飞".to_string(), "Lâm Phi".to_string());
        let mut overrides = HashMap::new();
        overrides.insert("林飞".to_string(), "Lâm Phàm".to_string());
        let ctx = EngineContext::build(vec![phrases], overrides).expect("context");

        let tokens = segment_line(&ctx, &OverrideMap::new(), "林飞", &[]);
        assert_eq!(tokens[0].source, TokenSource::UserOverride);
        assert_eq!(
            tokens[0].resolution.as_ref().expect("resolution").best,
            "Lâm Phàm"
        );
    }
}
