use std::collections::HashMap;

use regex::Regex;

use crate::context::{EngineContext, OverrideMap};

const PLACEHOLDER: &str = "{0}";

/// A pre-compiled template rule: the pattern is the raw key with its `{0}`
/// placeholder turned into a capturing group over one-or-more CJK chars.
#[derive(Debug)]
pub struct CompiledRule {
    pub key: String,
    pub template: String,
    regex: Regex,
}

/// Byte range in the rewritten line that came out of a rule substitution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleSpan {
    pub start: usize,
    pub end: usize,
    pub rule_key: String,
}

/// Compile every placeholder-bearing rule, most specific (longest key) first.
/// Keys without a placeholder, or whose pattern fails to compile, are
/// silently excluded.
pub fn compile_rules(entries: &HashMap<String, String>) -> Vec<CompiledRule> {
    let mut keyed: Vec<(&String, &String)> = entries
        .iter()
        .filter(|(key, _)| key.contains(PLACEHOLDER))
        .collect();
    keyed.sort_by(|a, b| {
        b.0.chars()
            .count()
            .cmp(&a.0.chars().count())
            .then_with(|| a.0.cmp(b.0))
    });

    let mut rules = Vec::with_capacity(keyed.len());
    for (key, template) in keyed {
        let escaped = regex::escape(key);
        let pattern = escaped.replace(&regex::escape(PLACEHOLDER), "([\u{4e00}-\u{9fa5}]+)");
        let Ok(regex) = Regex::new(&pattern) else {
            continue;
        };
        rules.push(CompiledRule {
            key: key.clone(),
            template: template.clone(),
            regex,
        });
    }
    rules
}

/// Apply every rule to `line` in compile order, globally. The captured CJK run
/// is translated through the resolver chain and falls back to its raw text;
/// the result is substituted into the rule's template. Overlapping rule
/// applications are not re-applied iteratively. Returns the rewritten line
/// plus the byte spans of the substituted regions, so the segmenter can tag
/// the tokens that came out of a rule.
pub fn apply_rules(
    ctx: &EngineContext,
    temp: &OverrideMap,
    line: &str,
) -> (String, Vec<RuleSpan>) {
    let rules = ctx.rules();
    if rules.is_empty() {
        return (line.to_string(), Vec::new());
    }

    let mut text = line.to_string();
    let mut spans: Vec<RuleSpan> = Vec::new();

    for rule in rules {
        let mut out = String::with_capacity(text.len());
        let mut new_spans: Vec<RuleSpan> = Vec::new();
        // (end offset in old text, cumulative byte delta up to that point)
        let mut deltas: Vec<(usize, isize)> = Vec::new();
        let mut cum: isize = 0;
        let mut pos = 0usize;

        for caps in rule.regex.captures_iter(&text) {
            let whole = caps.get(0).expect("whole match");
            out.push_str(&text[pos..whole.start()]);

            let captured = caps.get(1).map_or("", |g| g.as_str());
            let resolved = ctx.resolve(captured, temp);
            let translated = if resolved.found && !resolved.best.is_empty() {
                resolved.best
            } else {
                captured.to_string()
            };
            let replacement = rule.template.replace(PLACEHOLDER, &translated);

            let start = out.len();
            out.push_str(&replacement);
            new_spans.push(RuleSpan {
                start,
                end: out.len(),
                rule_key: rule.key.clone(),
            });

            cum += replacement.len() as isize - whole.len() as isize;
            deltas.push((whole.end(), cum));
            pos = whole.end();
        }
        if new_spans.is_empty() {
            continue;
        }
        out.push_str(&text[pos..]);

        // Shift spans recorded by earlier rules past this rule's edits.
        let shift = |offset: usize| -> usize {
            let mut delta = 0isize;
            for (end, cum) in &deltas {
                if *end <= offset {
                    delta = *cum;
                } else {
                    break;
                }
            }
            offset.saturating_add_signed(delta)
        };
        for span in &mut spans {
            span.start = shift(span.start);
            span.end = shift(span.end);
        }
        spans.extend(new_spans);
        text = out;
    }

    spans.sort_by_key(|s| s.start);
    (text, spans)
}
