use std::collections::{HashMap, HashSet};

use crate::context::{EngineContext, OverrideMap};

/// Bounded-cost knobs for compound synthesis. These caps are the only hard
/// limits in the engine; hitting one returns a sentinel, not an error.
#[derive(Clone, Copy, Debug)]
pub struct SynthesisLimits {
    /// Refuse spans that re-segment into more pieces than this.
    pub max_span_segments: usize,
    /// Cap on the enumerated Cartesian product before de-duplication.
    pub max_combinations: usize,
    /// Final suggestion list cap, after de-duplication.
    pub max_suggestions: usize,
}

impl Default for SynthesisLimits {
    fn default() -> Self {
        Self {
            max_span_segments: 7,
            max_combinations: 10_000,
            max_suggestions: 100,
        }
    }
}

/// Outcome of a synthesis request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Synthesis {
    /// Whole-phrase candidates, de-duplicated, capped. Empty when the span
    /// re-segments to at most one piece (nothing to combine).
    Suggestions(Vec<String>),
    /// Too many segments to enumerate.
    SpanTooLong,
    /// The per-segment candidate lists multiply out past the cap.
    TooManyCombinations,
}

/// Enumerates whole-phrase translations for a selected span by re-segmenting
/// it with the context's trie and walking the Cartesian product of each
/// segment's candidate meanings. Results are memoized per span text; the
/// cache is only valid for the context it was filled against, so drop the
/// synthesizer when the context is rebuilt.
pub struct Synthesizer {
    limits: SynthesisLimits,
    cache: HashMap<String, Synthesis>,
}

impl Synthesizer {
    #[must_use]
    pub fn new(limits: SynthesisLimits) -> Self {
        Self {
            limits,
            cache: HashMap::new(),
        }
    }

    pub fn suggest(&mut self, ctx: &EngineContext, temp: &OverrideMap, span: &str) -> Synthesis {
        if let Some(hit) = self.cache.get(span) {
            return hit.clone();
        }
        let result = self.compute(ctx, temp, span);
        self.cache.insert(span.to_string(), result.clone());
        result
    }

    fn compute(&self, ctx: &EngineContext, temp: &OverrideMap, span: &str) -> Synthesis {
        let chars: Vec<char> = span.chars().collect();
        let mut segments: Vec<String> = Vec::new();
        let mut i = 0usize;
        while i < chars.len() {
            match ctx.trie().longest_match(&chars, i) {
                Some(m) => {
                    i += m.key.chars().count();
                    segments.push(m.key);
                }
                None => {
                    segments.push(chars[i].to_string());
                    i += 1;
                }
            }
        }

        if segments.len() <= 1 {
            return Synthesis::Suggestions(Vec::new());
        }
        if segments.len() > self.limits.max_span_segments {
            return Synthesis::SpanTooLong;
        }

        // A segment without meanings contributes a single empty placeholder so
        // it drops out of the joined phrase without collapsing the product.
        let candidate_lists: Vec<Vec<String>> = segments
            .iter()
            .map(|seg| {
                let r = ctx.resolve(seg, temp);
                if r.found && !r.all.is_empty() {
                    r.all
                } else {
                    vec![String::new()]
                }
            })
            .collect();

        let mut total: usize = 1;
        for list in &candidate_lists {
            total = match total.checked_mul(list.len()) {
                Some(n) if n <= self.limits.max_combinations => n,
                _ => return Synthesis::TooManyCombinations,
            };
        }

        let mut suggestions: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut indices = vec![0usize; candidate_lists.len()];
        'outer: loop {
            let phrase = candidate_lists
                .iter()
                .zip(&indices)
                .map(|(list, &idx)| list[idx].as_str())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if seen.insert(phrase.clone()) {
                suggestions.push(phrase);
                if suggestions.len() >= self.limits.max_suggestions {
                    break;
                }
            }
            // Odometer step over the candidate lists.
            for pos in (0..indices.len()).rev() {
                indices[pos] += 1;
                if indices[pos] < candidate_lists[pos].len() {
                    continue 'outer;
                }
                indices[pos] = 0;
            }
            break;
        }
        Synthesis::Suggestions(suggestions)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{Synthesis, SynthesisLimits, Synthesizer};
    use crate::context::{EngineContext, OverrideMap};
    use crate::dictionary::NamedDictionary;

    fn ctx_with(pairs: &[(&str, &str)]) -> EngineContext {
        let mut d = NamedDictionary::new("Vietphrase", 40);
        for (k, v) in pairs {
            d.entries.insert((*k).to_string(), (*v).to_string());
        }
        EngineContext::build(vec![d], HashMap::new()).expect("context")
    }

    #[test]
    fn enumerates_the_full_product() {
        let ctx = ctx_with(&[("大", "to/lớn"), ("人", "người;nhân")]);
        let mut synth = Synthesizer::new(SynthesisLimits::default());
        let result = synth.suggest(&ctx, &OverrideMap::new(), "大人");
        let Synthesis::Suggestions(list) = result else {
            panic!("expected suggestions");
        };
        assert_eq!(list.len(), 4);
        assert_eq!(list[0], "to người");
        assert!(list.contains(&"lớn nhân".to_string()));
    }

    #[test]
    fn single_segment_has_nothing_to_combine() {
        let ctx = ctx_with(&[("你好", "xin chào")]);
        let mut synth = Synthesizer::new(SynthesisLimits::default());
        assert_eq!(
            synth.suggest(&ctx, &OverrideMap::new(), "你好"),
            Synthesis::Suggestions(Vec::new())
        );
    }

    #[test]
    fn meaningless_segments_contribute_nothing() {
        let ctx = ctx_with(&[("大", "to"), ("人", "người")]);
        let mut synth = Synthesizer::new(SynthesisLimits::default());
        let result = synth.suggest(&ctx, &OverrideMap::new(), "大哉人");
        assert_eq!(
            result,
            Synthesis::Suggestions(vec!["to người".to_string()])
        );
    }

    #[test]
    fn long_spans_are_refused() {
        let ctx = ctx_with(&[("大", "to")]);
        let mut synth = Synthesizer::new(SynthesisLimits {
            max_span_segments: 3,
            ..SynthesisLimits::default()
        });
        assert_eq!(
            synth.suggest(&ctx, &OverrideMap::new(), "一二三四五"),
            Synthesis::SpanTooLong
        );
    }

    #[test]
    fn oversized_products_are_refused_before_enumeration() {
        let ctx = ctx_with(&[("大", "a/b/c/d"), ("人", "e/f/g/h")]);
        let mut synth = Synthesizer::new(SynthesisLimits {
            max_combinations: 10,
            ..SynthesisLimits::default()
        });
        assert_eq!(
            synth.suggest(&ctx, &OverrideMap::new(), "大人"),
            Synthesis::TooManyCombinations
        );
    }

    #[test]
    fn duplicates_collapse_and_results_are_capped() {
        let ctx = ctx_with(&[("大", "to/to/lớn"), ("人", "người")]);
        let mut synth = Synthesizer::new(SynthesisLimits {
            max_suggestions: 1,
            ..SynthesisLimits::default()
        });
        assert_eq!(
            synth.suggest(&ctx, &OverrideMap::new(), "大人"),
            Synthesis::Suggestions(vec!["to người".to_string()])
        );
    }

    #[test]
    fn results_are_memoized_per_span_text() {
        let ctx = ctx_with(&[("大", "to"), ("人", "người")]);
        let mut synth = Synthesizer::new(SynthesisLimits::default());
        let first = synth.suggest(&ctx, &OverrideMap::new(), "大人");
        let second = synth.suggest(&ctx, &OverrideMap::new(), "大人");
        assert_eq!(first, second);
    }
}
