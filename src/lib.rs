pub mod config;
pub mod context;
pub mod dictionary;
pub mod lookup;
pub mod progress;
pub mod render;
pub mod rules;
pub mod segment;
pub mod snapshot;
pub mod standardize;
pub mod synthesize;
pub mod translate;
pub mod trie;

pub use context::{EngineContext, OverrideMap, Resolution};
pub use dictionary::{NamedDictionary, DICTIONARY_FILES};
pub use render::{Mode, RenderedLine, RenderedSpan};
pub use segment::{Token, TokenSource};
pub use synthesize::{Synthesis, SynthesisLimits};
pub use translate::{translate, Document, Session};
