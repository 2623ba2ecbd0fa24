use crate::context::{split_candidates, EngineContext};
use crate::dictionary::HAN_VIET_DICT_ID;
use crate::standardize::is_cjk;

/// Longest candidate considered when re-segmenting with the flat master key
/// set (no trie walk, so bounded by hand).
const MASTER_KEY_MAX_LEN: usize = 10;

/// Sino-Vietnamese reading of a word: each CJK char mapped through the
/// phonetic dictionary (first meaning), chars joined with spaces, non-CJK
/// stretches passed through. `None` when the phonetic dictionary is absent.
#[must_use]
pub fn han_viet_reading(ctx: &EngineContext, word: &str) -> Option<String> {
    let dict = ctx.dictionary(HAN_VIET_DICT_ID)?;
    if word.is_empty() {
        return None;
    }
    let single = |c: char| -> Option<String> {
        let meaning = dict.entries.get(&c.to_string())?;
        let first = meaning
            .split('/')
            .next()
            .and_then(|m| m.split(';').next())
            .map(str::trim)
            .unwrap_or_default();
        (!first.is_empty()).then(|| first.to_string())
    };

    let mut parts: Vec<String> = Vec::new();
    let mut run = String::new();
    let mut run_is_cjk: Option<bool> = None;
    let mut flush = |run: &mut String, run_is_cjk: bool, parts: &mut Vec<String>| {
        if run.is_empty() {
            return;
        }
        if run_is_cjk {
            let readings: Vec<String> = run.chars().filter_map(|c| single(c)).collect();
            parts.push(readings.join(" "));
        } else {
            parts.push(run.clone());
        }
        run.clear();
    };
    for c in word.chars() {
        let cjk = is_cjk(c);
        if run_is_cjk != Some(cjk) {
            if let Some(prev) = run_is_cjk {
                flush(&mut run, prev, &mut parts);
            }
            run_is_cjk = Some(cjk);
        }
        run.push(c);
    }
    if let Some(prev) = run_is_cjk {
        flush(&mut run, prev, &mut parts);
    }
    Some(parts.join(" "))
}

/// Everything known about one key, for the quick-edit consumer: the user's
/// own override, each dictionary's candidates in priority order, and the
/// per-character phonetic reading.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WordReport {
    pub user_override: Option<String>,
    pub per_dictionary: Vec<(String, Vec<String>)>,
    pub han_viet: Option<String>,
}

#[must_use]
pub fn word_report(ctx: &EngineContext, key: &str) -> WordReport {
    let per_dictionary = ctx
        .dictionaries()
        .iter()
        .filter_map(|dict| {
            let meaning = dict.entries.get(key)?;
            let candidates = split_candidates(meaning);
            (!candidates.is_empty()).then(|| (dict.id.clone(), candidates))
        })
        .collect();
    WordReport {
        user_override: ctx.user_overrides().get(key).cloned(),
        per_dictionary,
        han_viet: han_viet_reading(ctx, key),
    }
}

/// Greedy longest-first segmentation against the flat master key set. Used by
/// the selection-expansion consumer, which needs key boundaries rather than
/// translations; non-CJK stretches stay whole.
#[must_use]
pub fn segment_with_master_keys(ctx: &EngineContext, text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let keys = ctx.master_keys();
    let mut segments = Vec::new();
    let mut i = 0usize;
    while i < chars.len() {
        if !is_cjk(chars[i]) {
            let start = i;
            while i < chars.len() && !is_cjk(chars[i]) {
                i += 1;
            }
            segments.push(chars[start..i].iter().collect());
            continue;
        }
        let max_len = MASTER_KEY_MAX_LEN.min(chars.len() - i);
        let mut found: Option<String> = None;
        for len in (1..=max_len).rev() {
            let candidate: String = chars[i..i + len].iter().collect();
            if keys.contains(&candidate) {
                found = Some(candidate);
                break;
            }
        }
        match found {
            Some(word) => {
                i += word.chars().count();
                segments.push(word);
            }
            None => {
                segments.push(chars[i].to_string());
                i += 1;
            }
        }
    }
    segments
}
