use std::collections::HashMap;

/// Value attached to a dictionary key in the unified trie. `meaning` keeps the
/// raw `;`/`/`-delimited meaning string; splitting into candidates happens at
/// resolve time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payload {
    pub meaning: String,
    pub dict_id: String,
    pub source_key: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    pub key: String,
    pub payload: Payload,
}

#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<char, TrieNode>,
    payload: Option<Payload>,
}

/// Prefix tree over CJK-keyed dictionary entries. One child per character;
/// only payload-bearing nodes count as matches. The root never carries a
/// payload.
#[derive(Debug, Default)]
pub struct Trie {
    root: TrieNode,
}

impl Trie {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extends a path for `key` and sets the leaf payload. With
    /// `overwrite=false` an existing payload wins (first-write-wins priority
    /// merge); `overwrite=true` replaces it and is how tombstones
    /// (`payload=None`) are planted. Empty keys are a no-op.
    pub fn insert(&mut self, key: &str, payload: Option<Payload>, overwrite: bool) {
        if key.is_empty() {
            return;
        }
        let mut node = &mut self.root;
        for c in key.chars() {
            node = node.children.entry(c).or_default();
        }
        if overwrite || node.payload.is_none() {
            node.payload = payload;
        }
    }

    /// Longest payload-bearing prefix of `text[start..]`, or `None`.
    /// `start` is a char offset into `text`'s char sequence.
    #[must_use]
    pub fn longest_match(&self, text: &[char], start: usize) -> Option<Match> {
        let mut node = &self.root;
        let mut longest: Option<Match> = None;
        for (i, c) in text.iter().enumerate().skip(start) {
            match node.children.get(c) {
                Some(child) => node = child,
                None => break,
            }
            if let Some(payload) = node.payload.as_ref() {
                longest = Some(Match {
                    key: text[start..=i].iter().collect(),
                    payload: payload.clone(),
                });
            }
        }
        longest
    }

    /// Every payload-bearing prefix of `text[start..]`, shortest first.
    #[must_use]
    pub fn all_matches(&self, text: &[char], start: usize) -> Vec<Match> {
        let mut node = &self.root;
        let mut matches = Vec::new();
        for (i, c) in text.iter().enumerate().skip(start) {
            match node.children.get(c) {
                Some(child) => node = child,
                None => break,
            }
            if let Some(payload) = node.payload.as_ref() {
                matches.push(Match {
                    key: text[start..=i].iter().collect(),
                    payload: payload.clone(),
                });
            }
        }
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::{Payload, Trie};

    fn payload(meaning: &str) -> Option<Payload> {
        Some(Payload {
            meaning: meaning.to_string(),
            dict_id: "Vietphrase".to_string(),
            source_key: meaning.to_string(),
        })
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn longest_match_picks_deepest_payload() {
        let mut trie = Trie::new();
        trie.insert("你", payload("ngươi"), false);
        trie.insert("你好", payload("xin chào"), false);
        let text = chars("你好吗");
        let m = trie.longest_match(&text, 0).expect("match");
        assert_eq!(m.key, "你好");
        assert_eq!(m.payload.meaning, "xin chào");
    }

    #[test]
    fn all_matches_is_shortest_to_longest() {
        let mut trie = Trie::new();
        trie.insert("你", payload("ngươi"), false);
        trie.insert("你好", payload("xin chào"), false);
        trie.insert("你好吗", payload("bạn khỏe không"), false);
        let text = chars("你好吗?");
        let keys: Vec<String> = trie
            .all_matches(&text, 0)
            .into_iter()
            .map(|m| m.key)
            .collect();
        assert_eq!(keys, vec!["你", "你好", "你好吗"]);
        assert!(trie.all_matches(&text, 3).is_empty());
    }

    #[test]
    fn matches_respect_start_offset() {
        let mut trie = Trie::new();
        trie.insert("好", payload("tốt"), false);
        let text = chars("你好");
        assert!(trie.longest_match(&text, 0).is_none());
        assert_eq!(trie.longest_match(&text, 1).expect("match").key, "好");
    }

    #[test]
    fn first_write_wins_unless_overwrite() {
        let mut trie = Trie::new();
        trie.insert("你", payload("first"), false);
        trie.insert("你", payload("second"), false);
        let text = chars("你");
        assert_eq!(
            trie.longest_match(&text, 0).expect("match").payload.meaning,
            "first"
        );

        trie.insert("你", payload("forced"), true);
        assert_eq!(
            trie.longest_match(&text, 0).expect("match").payload.meaning,
            "forced"
        );
    }

    #[test]
    fn tombstone_hides_an_entry() {
        let mut trie = Trie::new();
        trie.insert("你好", payload("xin chào"), false);
        trie.insert("你好", None, true);
        assert!(trie.longest_match(&chars("你好"), 0).is_none());
    }

    #[test]
    fn empty_key_is_a_noop() {
        let mut trie = Trie::new();
        trie.insert("", payload("nothing"), false);
        assert!(trie.longest_match(&chars("x"), 0).is_none());
    }
}
