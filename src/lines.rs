//! Greedy line wrapping over break opportunities.
//!
//! Both strategies fold the text code point by code point through a
//! `ScanState`: the current line buffer, the latest break candidate and the
//! lines emitted so far. The default strategy only splits at break candidates
//! and lets unbreakable runs overflow; break-all splits at any code point.

use core::iter;

use smallvec::SmallVec;

use crate::break_class::{classify, BreakClass};
use crate::error::MetricsError;
use crate::measure::MeasureContext;
use crate::spacing::SpacingModel;

/// Glyph appended to a line that breaks at a soft hyphen.
pub const RENDERED_HYPHEN: char = '-';

pub(crate) type LineBuf = SmallVec<[char; 64]>;

/// Line wrapping strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WrapStrategy {
    /// Break at word/class opportunities only.
    #[default]
    Default,
    /// Break between any two code points (`word-break: break-all`).
    BreakAll,
}

impl WrapStrategy {
    /// Strategy for a CSS `word-break` value.
    pub fn from_word_break(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("break-all") {
            Self::BreakAll
        } else {
            Self::Default
        }
    }
}

/// Latest break opportunity inside the line under construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineBreakCandidate {
    pub class: BreakClass,
    /// Code-point offset in the line buffer where the candidate sits.
    pub index: usize,
    pub ch: char,
}

impl LineBreakCandidate {
    // Soft hyphens are never stored in the line buffer.
    fn slot_len(&self) -> usize {
        usize::from(self.class != BreakClass::SHY)
    }
}

/// Result of splitting a line at a break candidate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitOutcome {
    /// Lines to emit, in order.
    pub emitted: SmallVec<[String; 2]>,
    /// Contents of the new line buffer.
    pub seed: LineBuf,
    /// Candidate that survives into the new line.
    pub candidate: Option<LineBreakCandidate>,
}

/// Split `line` at `candidate`.
///
/// `overflow` is the code point that did not fit, or `None` when that code
/// point is the candidate itself. `fits` reports whether a string stays
/// within the line budget.
pub fn resolve_split<F>(
    candidate: LineBreakCandidate,
    line: &[char],
    overflow: Option<char>,
    mut fits: F,
) -> Result<SplitOutcome, MetricsError>
where
    F: FnMut(&str) -> bool,
{
    let split = candidate.index.min(line.len());
    let head: String = line[..split].iter().collect();
    let tail_start = (candidate.index + candidate.slot_len()).min(line.len());
    let tail = if overflow.is_some() {
        &line[tail_start..]
    } else {
        &[][..]
    };

    let mut seed = LineBuf::new();
    let carry = |seed: &mut LineBuf, lead: Option<char>| {
        seed.extend(lead);
        seed.extend_from_slice(tail);
        seed.extend(overflow);
    };

    let mut out = SplitOutcome::default();
    match candidate.class {
        BreakClass::SHY => {
            out.emitted.push(with_suffix(head, RENDERED_HYPHEN));
            carry(&mut seed, None);
        }
        BreakClass::BA => {
            out.emitted.push(with_suffix(head, candidate.ch));
            carry(&mut seed, None);
        }
        BreakClass::BAI | BreakClass::BK => {
            out.emitted.push(head);
            carry(&mut seed, None);
        }
        BreakClass::BB => {
            out.emitted.push(without_hanging_space(head));
            carry(&mut seed, Some(candidate.ch));
        }
        BreakClass::B2 => {
            let after = with_suffix(head.clone(), candidate.ch);
            if head.is_empty() || fits(&after) {
                out.emitted.push(after);
                carry(&mut seed, None);
            } else {
                out.emitted.push(without_hanging_space(head));
                carry(&mut seed, Some(candidate.ch));
                out.candidate = Some(LineBreakCandidate {
                    class: BreakClass::B2,
                    index: 0,
                    ch: candidate.ch,
                });
            }
        }
        BreakClass::None => {
            return Err(MetricsError::UndefinedBreak {
                class: candidate.class,
            })
        }
    }
    out.emitted.retain(|line| !line.is_empty());
    out.seed = seed;
    Ok(out)
}

fn with_suffix(mut text: String, suffix: char) -> String {
    text.push(suffix);
    text
}

// A break before a character right after a space is a break at that space.
fn without_hanging_space(mut head: String) -> String {
    if head.chars().next_back().map(classify) == Some(BreakClass::BAI) {
        head.pop();
    }
    head
}

/// Width probe for one wrapping run.
struct Prober<'a> {
    ctx: MeasureContext<'a>,
    spacing: SpacingModel,
    max: f32,
    buf: String,
}

impl<'a> Prober<'a> {
    fn new(ctx: MeasureContext<'a>, spacing: SpacingModel, max: f32) -> Self {
        Self {
            ctx,
            spacing,
            max,
            buf: String::with_capacity(128),
        }
    }

    fn width<I>(&mut self, chars: I) -> f32
    where
        I: IntoIterator<Item = char>,
    {
        self.buf.clear();
        self.buf.extend(chars);
        line_width(&self.ctx, &self.spacing, &self.buf)
    }

    fn fits(&self, text: &str) -> bool {
        line_width(&self.ctx, &self.spacing, text) <= self.max
    }
}

/// Fold state threaded through a wrapping run.
#[derive(Debug, Default)]
pub(crate) struct ScanState {
    line: LineBuf,
    candidate: Option<LineBreakCandidate>,
    lines: Vec<String>,
}

impl ScanState {
    fn new() -> Self {
        Self {
            line: LineBuf::new(),
            candidate: None,
            lines: Vec::with_capacity(8),
        }
    }

    /// Offset of the next code point appended to the line.
    fn next_index(&self) -> usize {
        self.line.len()
    }

    fn take_line(&mut self) -> String {
        self.line.drain(..).collect()
    }

    fn mandatory_break(&mut self) {
        let line = self.take_line();
        self.lines.push(line);
        self.candidate = None;
    }

    fn emit(&mut self, line: String) {
        self.lines.push(line);
        self.candidate = None;
    }

    fn apply(&mut self, outcome: SplitOutcome) {
        self.lines.extend(outcome.emitted);
        self.line = outcome.seed;
        self.candidate = outcome.candidate;
    }

    fn step_default(&mut self, ch: char, prober: &mut Prober<'_>) -> Result<(), MetricsError> {
        let class = classify(ch);
        if class == BreakClass::BK {
            self.mandatory_break();
            return Ok(());
        }

        // An em dash opening a line can still break after itself.
        let is_candidate =
            class.is_breakable() && (!self.line.is_empty() || class == BreakClass::B2);
        if is_candidate {
            self.candidate = Some(LineBreakCandidate {
                class,
                index: self.next_index(),
                ch,
            });
        }
        // A soft hyphen adds no width; it only breaks once a later glyph
        // overflows.
        if is_candidate && class == BreakClass::SHY {
            return Ok(());
        }

        let width = prober.width(self.line.iter().copied().chain(iter::once(ch)));
        match self.candidate {
            Some(candidate) if width > prober.max && !self.line.is_empty() => {
                let overflow = (!is_candidate).then_some(ch);
                let outcome =
                    resolve_split(candidate, &self.line, overflow, |text| prober.fits(text))?;
                self.apply(outcome);
            }
            _ => {
                if class != BreakClass::SHY {
                    self.line.push(ch);
                }
            }
        }
        Ok(())
    }

    fn step_break_all(&mut self, ch: char, next: Option<char>, prober: &mut Prober<'_>) {
        let class = classify(ch);
        if class == BreakClass::BK {
            self.mandatory_break();
            return;
        }

        // A soft hyphen only breaks if the glyph after it would not fit.
        let lookahead = if class == BreakClass::SHY { next } else { None };
        if class == BreakClass::SHY && lookahead.is_none() {
            return;
        }
        let width = prober.width(
            self.line
                .iter()
                .copied()
                .chain(iter::once(ch))
                .chain(lookahead),
        );

        if width > prober.max && !self.line.is_empty() {
            let line = self.take_line();
            match class {
                BreakClass::SHY => self.emit(with_suffix(line, RENDERED_HYPHEN)),
                BreakClass::BA => self.emit(with_suffix(line, ch)),
                BreakClass::BAI => self.emit(line),
                _ => {
                    self.emit(line);
                    self.line.push(ch);
                }
            }
        } else if class != BreakClass::SHY {
            self.line.push(ch);
        }
    }

    fn finish(mut self) -> Vec<String> {
        if !self.line.is_empty() {
            let line = self.take_line();
            self.lines.push(line);
        }
        self.lines
    }
}

/// Measured width of `text` plus its spacing addon.
pub fn line_width(ctx: &MeasureContext<'_>, spacing: &SpacingModel, text: &str) -> f32 {
    ctx.measure(text) + spacing.extra_width(text)
}

fn has_budget(text: &str, max: f32) -> bool {
    !text.is_empty() && !max.is_nan() && max > 0.0
}

/// Wrap `text` at break opportunities into lines of at most `max` pixels.
///
/// Runs without a break opportunity overflow `max` instead of being split.
pub fn compute_lines_default(
    ctx: MeasureContext<'_>,
    text: &str,
    max: f32,
    spacing: SpacingModel,
) -> Result<Vec<String>, MetricsError> {
    if !has_budget(text, max) {
        return Ok(Vec::new());
    }
    let mut prober = Prober::new(ctx, spacing, max);
    let mut state = ScanState::new();
    for ch in text.chars() {
        state.step_default(ch, &mut prober)?;
    }
    Ok(state.finish())
}

/// Wrap `text` between any two code points into lines of at most `max` pixels.
pub fn compute_lines_break_all(
    ctx: MeasureContext<'_>,
    text: &str,
    max: f32,
    spacing: SpacingModel,
) -> Vec<String> {
    if !has_budget(text, max) {
        return Vec::new();
    }
    let mut prober = Prober::new(ctx, spacing, max);
    let mut state = ScanState::new();
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        state.step_break_all(ch, chars.peek().copied(), &mut prober);
    }
    state.finish()
}

/// Line wrapper bound to a measurement context, spacing model and strategy.
#[derive(Clone, Copy, Debug)]
pub struct LineEngine<'a> {
    ctx: MeasureContext<'a>,
    spacing: SpacingModel,
    strategy: WrapStrategy,
}

impl<'a> LineEngine<'a> {
    /// Engine using the default strategy and no spacing addon.
    pub fn new(ctx: MeasureContext<'a>) -> Self {
        Self {
            ctx,
            spacing: SpacingModel::NONE,
            strategy: WrapStrategy::Default,
        }
    }

    pub fn with_spacing(mut self, spacing: SpacingModel) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_strategy(mut self, strategy: WrapStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Width of one already-wrapped line.
    pub fn line_width(&self, text: &str) -> f32 {
        line_width(&self.ctx, &self.spacing, text)
    }

    /// Wrap `text` into lines of at most `max` pixels.
    pub fn compute_lines(&self, text: &str, max: f32) -> Result<Vec<String>, MetricsError> {
        match self.strategy {
            WrapStrategy::Default => compute_lines_default(self.ctx, text, max, self.spacing),
            WrapStrategy::BreakAll => Ok(compute_lines_break_all(
                self.ctx,
                text,
                max,
                self.spacing,
            )),
        }
    }
}
