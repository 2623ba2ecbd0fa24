use crate::context::{EngineContext, OverrideMap};
use crate::render::{render_line, Mode, RenderedLine};
use crate::rules::apply_rules;
use crate::segment::segment_line;
use crate::standardize::standardize_text;
use crate::synthesize::{Synthesis, SynthesisLimits, Synthesizer};

/// Per-session transient state: temporary overrides (absolute precedence,
/// never persisted) and the synthesis memo cache. Sessions are tied to one
/// context snapshot; start a fresh one after a rebuild.
pub struct Session {
    pub temp_overrides: OverrideMap,
    synthesizer: Synthesizer,
}

impl Session {
    #[must_use]
    pub fn new(limits: SynthesisLimits) -> Self {
        Self {
            temp_overrides: OverrideMap::new(),
            synthesizer: Synthesizer::new(limits),
        }
    }

    /// Whole-phrase suggestions for a selected span, memoized per span text.
    pub fn suggest(&mut self, ctx: &EngineContext, span: &str) -> Synthesis {
        self.synthesizer.suggest(ctx, &self.temp_overrides, span)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SynthesisLimits::default())
    }
}

/// A fully rendered document: one `RenderedLine` per input line, blank lines
/// preserved as empty lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    pub lines: Vec<RenderedLine>,
}

impl Document {
    #[must_use]
    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(RenderedLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Translate one line that has already been standardized.
fn translate_standardized_line(ctx: &EngineContext, session: &Session, line: &str, mode: Mode) -> RenderedLine {
    if line.trim().is_empty() {
        return RenderedLine::default();
    }
    let (expanded, rule_spans) = apply_rules(ctx, &session.temp_overrides, line);
    let tokens = segment_line(ctx, &session.temp_overrides, &expanded, &rule_spans);
    render_line(&tokens, mode)
}

/// One synchronous pass over a whole document: standardize, then per line
/// apply template rules, segment and render. The pass never fails on
/// malformed input — unknown text degrades to literal pass-through.
pub fn translate(ctx: &EngineContext, session: &Session, text: &str, mode: Mode) -> Document {
    let standardized = standardize_text(text);
    Document {
        lines: standardized
            .split('\n')
            .map(|line| translate_standardized_line(ctx, session, line.trim_end_matches('\r'), mode))
            .collect(),
    }
}
