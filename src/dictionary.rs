use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use encoding_rs::{GB18030, UTF_8};
use serde::{Deserialize, Serialize};

use crate::standardize::standardize_dictionary_line;

pub const USER_DICT_ID: &str = "NamesUser";
pub const RULE_DICT_ID: &str = "LuatNhan";
pub const HAN_VIET_DICT_ID: &str = "PhienAm";
pub const BLACKLIST_DICT_ID: &str = "Blacklist";

/// How a dictionary file's lines are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DictStyle {
    /// `key=value`, split on the first `=` (the value may contain `=`).
    KeyValue,
    /// Bare keys with an implicit empty meaning; matched but suppressed.
    Blacklist,
    /// `key=value` where keys may carry a `{0}` placeholder (template rules).
    Rule,
}

/// A known dictionary file: id, accepted filenames, merge priority
/// (lower = more authoritative) and line style.
pub struct DictionarySpec {
    pub id: &'static str,
    pub filenames: &'static [&'static str],
    pub priority: u32,
    pub style: DictStyle,
}

pub const DICTIONARY_FILES: &[DictionarySpec] = &[
    DictionarySpec {
        id: "Names2",
        filenames: &["Names2.txt", "Name2.txt", "Names3.txt", "Name3.txt"],
        priority: 20,
        style: DictStyle::KeyValue,
    },
    DictionarySpec {
        id: "Names",
        filenames: &["Names.txt", "Name.txt"],
        priority: 21,
        style: DictStyle::KeyValue,
    },
    DictionarySpec {
        id: RULE_DICT_ID,
        filenames: &["LuatNhan.txt", "Luat Nhan.txt"],
        priority: 30,
        style: DictStyle::Rule,
    },
    DictionarySpec {
        id: "Vietphrase",
        filenames: &["Vietphrase.txt", "VP.txt", "VietPhrase_hadesloki.txt"],
        priority: 40,
        style: DictStyle::KeyValue,
    },
    DictionarySpec {
        id: "Chapter",
        filenames: &["Chapter.txt", "X_Chapter.txt", "Vietphrase_Chapter.txt"],
        priority: 41,
        style: DictStyle::KeyValue,
    },
    DictionarySpec {
        id: "Number",
        filenames: &["Number.txt", "X_Number.txt", "Vietphrase_Number.txt"],
        priority: 42,
        style: DictStyle::KeyValue,
    },
    DictionarySpec {
        id: "Pronouns",
        filenames: &[
            "Pronouns.txt",
            "DaiTu.txt",
            "DaiTuNhanXung.txt",
            "dai-tu-nhan-xung.txt",
        ],
        priority: 50,
        style: DictStyle::KeyValue,
    },
    DictionarySpec {
        id: HAN_VIET_DICT_ID,
        filenames: &["ChinesePhienAmWords.txt", "PhienAm.txt", "HanViet.txt", "HV.txt"],
        priority: 60,
        style: DictStyle::KeyValue,
    },
    DictionarySpec {
        id: "English",
        filenames: &["English.txt", "Babylon.txt"],
        priority: 98,
        style: DictStyle::KeyValue,
    },
    DictionarySpec {
        id: BLACKLIST_DICT_ID,
        filenames: &["IgnoredChinesePhrases.txt", "IgnoreList.txt", "Blacklist.txt"],
        priority: 99,
        style: DictStyle::Blacklist,
    },
];

/// One parsed dictionary. Entries are key→meaning with keys already
/// standardized; keys are unique within a dictionary (last line wins).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NamedDictionary {
    pub id: String,
    pub priority: u32,
    pub entries: HashMap<String, String>,
}

impl NamedDictionary {
    #[must_use]
    pub fn new(id: impl Into<String>, priority: u32) -> Self {
        Self {
            id: id.into(),
            priority,
            entries: HashMap::new(),
        }
    }
}

/// Parse one dictionary text. Blank lines and `#` comments are ignored, keys
/// are standardized to half-width punctuation and a leading `$` marker is
/// stripped. `Blacklist` style treats the whole line as a key with an empty
/// meaning.
pub fn parse_dictionary(text: &str, style: DictStyle) -> HashMap<String, String> {
    let mut entries = HashMap::new();
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = standardize_dictionary_line(line);
        if style == DictStyle::Blacklist {
            entries.insert(line, String::new());
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().trim_start_matches('$').trim();
        if key.is_empty() {
            continue;
        }
        entries.insert(key.to_string(), value.trim().to_string());
    }
    entries
}

/// Decode a dictionary or input file. UTF-8 (with or without BOM) is the
/// documented format, but Vietphrase dictionaries circulate in legacy
/// encodings too, so fall back to GB18030 when UTF-8 decoding reports errors.
pub fn read_text_file(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path).with_context(|| format!("read file: {}", path.display()))?;
    let (text, had_errors) = UTF_8.decode_with_bom_removal(&bytes);
    if !had_errors {
        return Ok(text.into_owned());
    }
    let (text, _, _) = GB18030.decode(&bytes);
    Ok(text.into_owned())
}

/// Find a dictionary file in `dir` by its accepted names, case-insensitively.
fn find_dictionary_file(dir: &Path, spec: &DictionarySpec) -> Option<PathBuf> {
    let entries: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .collect();
    for wanted in spec.filenames {
        let wanted_lower = wanted.to_lowercase();
        for path in &entries {
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.to_lowercase() == wanted_lower);
            if matches {
                return Some(path.clone());
            }
        }
    }
    None
}

/// Load every known dictionary present in `dir`, in registry order. Missing
/// files are skipped; a dictionary directory with none of the known files
/// yields an empty vec (the context build will refuse it).
pub fn load_directory(dir: &Path) -> anyhow::Result<Vec<NamedDictionary>> {
    let mut dicts = Vec::new();
    for spec in DICTIONARY_FILES {
        let Some(path) = find_dictionary_file(dir, spec) else {
            continue;
        };
        let text = read_text_file(&path)?;
        dicts.push(NamedDictionary {
            id: spec.id.to_string(),
            priority: spec.priority,
            entries: parse_dictionary(&text, spec.style),
        });
    }
    Ok(dicts)
}

/// Parse a user override list (`key=value` lines, `$` markers allowed).
pub fn parse_override_list(text: &str) -> HashMap<String, String> {
    parse_dictionary(text, DictStyle::KeyValue)
}

#[cfg(test)]
mod tests {
    use super::{parse_dictionary, DictStyle};

    #[test]
    fn parses_key_value_lines() {
        let text = "# comment\n\n你好=xin chào\n你=ngươi\n";
        let dict = parse_dictionary(text, DictStyle::KeyValue);
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get("你好").map(String::as_str), Some("xin chào"));
    }

    #[test]
    fn splits_on_first_equals_only() {
        let dict = parse_dictionary("a=b=c", DictStyle::KeyValue);
        assert_eq!(dict.get("a").map(String::as_str), Some("b=c"));
    }

    #[test]
    fn strips_leading_marker_and_standardizes_keys() {
        let dict = parse_dictionary("$李白=Lý Bạch\n你好！=chào！", DictStyle::KeyValue);
        assert_eq!(dict.get("李白").map(String::as_str), Some("Lý Bạch"));
        // Key side converts full-width '！', the meaning keeps its own.
        assert_eq!(dict.get("你好!").map(String::as_str), Some("chào！"));
    }

    #[test]
    fn blacklist_style_keys_have_empty_meanings() {
        let dict = parse_dictionary("某某\n# note\n之\n", DictStyle::Blacklist);
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get("之").map(String::as_str), Some(""));
    }

    #[test]
    fn keyless_lines_are_dropped() {
        let dict = parse_dictionary("=orphan\nno_equals_here\n", DictStyle::KeyValue);
        assert!(dict.is_empty());
    }
}
