use std::collections::{HashMap, HashSet};

use anyhow::anyhow;

use crate::dictionary::{NamedDictionary, RULE_DICT_ID, USER_DICT_ID};
use crate::rules::{compile_rules, CompiledRule};
use crate::trie::{Payload, Trie};

/// Temporary, per-session overrides checked before everything else.
pub type OverrideMap = HashMap<String, String>;

/// Outcome of a key lookup. `best` is the canonical meaning (first candidate);
/// a found key whose meanings are all blank yields `found=true` with an empty
/// candidate list (blacklist semantics — the caller decides whether blank
/// means "suppress"). A miss keeps the key itself in `best`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub best: String,
    pub all: Vec<String>,
    pub found: bool,
}

impl Resolution {
    fn miss(key: &str) -> Self {
        Self {
            best: key.to_string(),
            all: Vec::new(),
            found: false,
        }
    }

    fn from_meaning(meaning: &str) -> Self {
        let all = split_candidates(meaning);
        let best = all.first().cloned().unwrap_or_default();
        Self {
            best,
            all,
            found: true,
        }
    }
}

/// Split a raw meaning string on `;` then `/` into trimmed, non-empty
/// candidates; the first is canonical.
pub fn split_candidates(meaning: &str) -> Vec<String> {
    meaning
        .split(';')
        .flat_map(|part| part.split('/'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Immutable snapshot of all lookup state: the priority-sorted dictionaries,
/// the user's permanent override list, the unified trie, the flat master key
/// set and the compiled template rules. Rebuilt wholesale on (re)import or
/// structural override changes; concurrent reads of one snapshot are safe.
#[derive(Debug)]
pub struct EngineContext {
    dictionaries: Vec<NamedDictionary>,
    user_overrides: HashMap<String, String>,
    trie: Trie,
    master_keys: HashSet<String>,
    rules: Vec<CompiledRule>,
}

impl EngineContext {
    /// Full rebuild from parsed dictionaries plus the permanent user override
    /// list. Refuses to build without any dictionary loaded. The trie is
    /// filled in priority order (user overrides first) with first-write-wins
    /// inserts, so the most authoritative definition of a key is the one that
    /// sticks.
    pub fn build(
        mut dictionaries: Vec<NamedDictionary>,
        user_overrides: HashMap<String, String>,
    ) -> anyhow::Result<Self> {
        if dictionaries.is_empty() {
            return Err(anyhow!("dictionaries_not_loaded"));
        }
        dictionaries.sort_by_key(|d| d.priority);

        let mut trie = Trie::new();
        let mut master_keys: HashSet<String> = HashSet::new();

        for (key, meaning) in &user_overrides {
            trie.insert(
                key,
                Some(Payload {
                    meaning: meaning.clone(),
                    dict_id: USER_DICT_ID.to_string(),
                    source_key: key.clone(),
                }),
                false,
            );
            master_keys.insert(key.clone());
        }
        for dict in &dictionaries {
            for (key, meaning) in &dict.entries {
                trie.insert(
                    key,
                    Some(Payload {
                        meaning: meaning.clone(),
                        dict_id: dict.id.clone(),
                        source_key: key.clone(),
                    }),
                    false,
                );
                master_keys.insert(key.clone());
            }
        }

        let rules = dictionaries
            .iter()
            .find(|d| d.id == RULE_DICT_ID)
            .map(|d| compile_rules(&d.entries))
            .unwrap_or_default();

        Ok(Self {
            dictionaries,
            user_overrides,
            trie,
            master_keys,
            rules,
        })
    }

    #[must_use]
    pub fn trie(&self) -> &Trie {
        &self.trie
    }

    #[must_use]
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    #[must_use]
    pub fn master_keys(&self) -> &HashSet<String> {
        &self.master_keys
    }

    #[must_use]
    pub fn user_overrides(&self) -> &HashMap<String, String> {
        &self.user_overrides
    }

    #[must_use]
    pub fn dictionary(&self, id: &str) -> Option<&NamedDictionary> {
        self.dictionaries.iter().find(|d| d.id == id)
    }

    /// Dictionaries in priority order, most authoritative first.
    #[must_use]
    pub fn dictionaries(&self) -> &[NamedDictionary] {
        &self.dictionaries
    }

    /// Resolve a key: temporary overrides, then the permanent user list, then
    /// the first dictionary (by priority) that defines the key.
    #[must_use]
    pub fn resolve(&self, key: &str, temp: &OverrideMap) -> Resolution {
        if let Some(meaning) = temp.get(key) {
            return Resolution::from_meaning(meaning);
        }
        if let Some(meaning) = self.user_overrides.get(key) {
            return Resolution::from_meaning(meaning);
        }
        for dict in &self.dictionaries {
            if let Some(meaning) = dict.entries.get(key) {
                return Resolution::from_meaning(meaning);
            }
        }
        Resolution::miss(key)
    }

    /// Point-deletion fast path: plant a tombstone instead of rebuilding.
    /// Incorrect when a lower-priority dictionary also defines `key` — the
    /// shadowed entry stays hidden until the next full rebuild. Callers that
    /// cannot rule that out should rebuild instead.
    pub fn patch_deletion(&mut self, key: &str) {
        self.user_overrides.remove(key);
        self.trie.insert(key, None, true);
        self.master_keys.remove(key);
    }

    /// Point-addition fast path for a new user override: a single
    /// overwriting insert, no rebuild needed.
    pub fn add_override(&mut self, key: &str, meaning: &str) {
        if key.is_empty() {
            return;
        }
        self.user_overrides
            .insert(key.to_string(), meaning.to_string());
        self.trie.insert(
            key,
            Some(Payload {
                meaning: meaning.to_string(),
                dict_id: USER_DICT_ID.to_string(),
                source_key: key.to_string(),
            }),
            true,
        );
        self.master_keys.insert(key.to_string());
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{split_candidates, EngineContext, OverrideMap};
    use crate::dictionary::NamedDictionary;

    fn dict(id: &str, priority: u32, pairs: &[(&str, &str)]) -> NamedDictionary {
        let mut d = NamedDictionary::new(id, priority);
        for (k, v) in pairs {
            d.entries.insert((*k).to_string(), (*v).to_string());
        }
        d
    }

    #[test]
    fn refuses_to_build_without_dictionaries() {
        let err = EngineContext::build(Vec::new(), HashMap::new()).unwrap_err();
        assert_eq!(err.to_string(), "dictionaries_not_loaded");
    }

    #[test]
    fn lower_priority_number_wins_key_collisions() {
        let ctx = EngineContext::build(
            vec![
                dict("D2", 20, &[("李白", "Li Bai")]),
                dict("D1", 10, &[("李白", "Lý Bạch")]),
            ],
            HashMap::new(),
        )
        .expect("context");
        let temp = OverrideMap::new();
        let r = ctx.resolve("李白", &temp);
        assert!(r.found);
        assert_eq!(r.best, "Lý Bạch");

        let text: Vec<char> = "李白".chars().collect();
        let m = ctx.trie().longest_match(&text, 0).expect("match");
        assert_eq!(m.payload.dict_id, "D1");
    }

    #[test]
    fn override_chain_temp_then_user_then_dicts() {
        let mut overrides = HashMap::new();
        overrides.insert("你".to_string(), "user".to_string());
        let ctx = EngineContext::build(vec![dict("D", 40, &[("你", "dict")])], overrides)
            .expect("context");

        let mut temp = OverrideMap::new();
        assert_eq!(ctx.resolve("你", &temp).best, "user");
        temp.insert("你".to_string(), "temp".to_string());
        assert_eq!(ctx.resolve("你", &temp).best, "temp");
    }

    #[test]
    fn blank_meaning_is_found_but_blank() {
        let ctx = EngineContext::build(vec![dict("Blacklist", 99, &[("之", "")])], HashMap::new())
            .expect("context");
        let r = ctx.resolve("之", &OverrideMap::new());
        assert!(r.found);
        assert!(r.all.is_empty());
        assert_eq!(r.best, "");
    }

    #[test]
    fn miss_keeps_the_key() {
        let ctx = EngineContext::build(vec![dict("D", 40, &[("你", "ngươi")])], HashMap::new())
            .expect("context");
        let r = ctx.resolve("没有", &OverrideMap::new());
        assert!(!r.found);
        assert_eq!(r.best, "没有");
        assert!(r.all.is_empty());
    }

    #[test]
    fn candidates_split_on_semicolon_then_slash() {
        assert_eq!(
            split_candidates("a; b/c ;/d"),
            vec!["a".to_string(), "b".to_string(), "c".to_string(), "d".to_string()]
        );
        assert!(split_candidates("  ;/ ").is_empty());
    }

    #[test]
    fn patch_deletion_tombstones_the_trie() {
        let mut overrides = HashMap::new();
        overrides.insert("林飞".to_string(), "Lâm Phi".to_string());
        let mut ctx = EngineContext::build(vec![dict("D", 40, &[("别", "đừng")])], overrides)
            .expect("context");

        let text: Vec<char> = "林飞".chars().collect();
        assert!(ctx.trie().longest_match(&text, 0).is_some());
        ctx.patch_deletion("林飞");
        assert!(ctx.trie().longest_match(&text, 0).is_none());
        assert!(!ctx.master_keys().contains("林飞"));
    }

    #[test]
    fn add_override_shadows_existing_dictionary_entry() {
        let mut ctx = EngineContext::build(vec![dict("D", 40, &[("你", "ngươi")])], HashMap::new())
            .expect("context");
        ctx.add_override("你", "mày");
        let text: Vec<char> = "你".chars().collect();
        let m = ctx.trie().longest_match(&text, 0).expect("match");
        assert_eq!(m.payload.meaning, "mày");
        assert_eq!(ctx.resolve("你", &OverrideMap::new()).best, "mày");
    }
}
