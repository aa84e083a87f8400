//! Instruction templates.
//!
//! Templates are opaque lines of assembly text. The emitters never try to
//! understand them; they only repeat them inside a generated function and
//! reject sets which would break the surrounding structure.

use std::fmt;

use crate::error::TemplateDefect;

/// Identifies one block of lines in a [TemplateSet].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Block {
    Prologue,
    Primary,
    Secondary,
}
impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Prologue  => "prologue",
            Self::Primary   => "primary",
            Self::Secondary => "secondary",
        })
    }
}

/// The value loaded from the float array after each pointer-chasing load.
///
/// This is the only externally-supplied input for templates which operate
/// on floating-point/vector registers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChaseLoad {
    /// Only chase the integer array.
    #[default]
    None,

    /// Load a single float into the low lane of the payload register.
    Scalar,

    /// Broadcast a single float into a 256-bit payload register.
    /// On AArch64 this broadcasts into all four lanes of `v16`.
    Vector256,
}

/// The intended relationship between the lines of a template.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChainKind {
    /// Every line starts its own chain (throughput/capacity probes).
    #[default]
    Independent,

    /// Every line depends on the previous one (latency probes).
    Dependent,
}

/// Per-dialect template lines for a probe.
///
/// - `prologue` runs once before the measured loop (ie. for zeroing
///   accumulators)
/// - `primary` is repeated after the first pointer-chasing load
/// - `secondary` is repeated after the second pointer-chasing load; when
///   absent, `primary` is used for both
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemplateSet {
    pub prologue: Vec<String>,
    pub primary: Vec<String>,
    pub secondary: Option<Vec<String>>,
}
impl TemplateSet {
    pub fn new(primary: &[&str]) -> Self {
        Self {
            prologue: Vec::new(),
            primary: to_lines(primary),
            secondary: None,
        }
    }

    pub fn prologue(mut self, x: &[&str]) -> Self {
        self.prologue = to_lines(x);
        self
    }

    pub fn secondary(mut self, x: &[&str]) -> Self {
        self.secondary = Some(to_lines(x));
        self
    }

    /// Lines repeated after the second pointer-chasing load.
    pub fn second_block(&self) -> &[String] {
        self.secondary.as_deref().unwrap_or(&self.primary)
    }

    /// Iterate over all blocks which are actually present.
    pub fn blocks(&self) -> impl Iterator<Item=(Block, &[String])> {
        [
            Some((Block::Prologue, self.prologue.as_slice())),
            Some((Block::Primary, self.primary.as_slice())),
            self.secondary.as_deref().map(|s| (Block::Secondary, s)),
        ].into_iter().flatten()
    }

    /// Reject templates which would produce malformed output.
    ///
    /// The repeated blocks must not be empty. No line may be blank, contain
    /// a line break, or define a label (labels would collide once the line
    /// is repeated).
    pub fn check(&self) -> Result<(), TemplateDefect> {
        if self.primary.is_empty() {
            return Err(TemplateDefect::Empty(Block::Primary));
        }
        if matches!(&self.secondary, Some(s) if s.is_empty()) {
            return Err(TemplateDefect::Empty(Block::Secondary));
        }
        for (block, lines) in self.blocks() {
            for (line, text) in lines.iter().enumerate() {
                if text.contains(['\n', '\r']) {
                    return Err(TemplateDefect::LineBreak { block, line });
                }
                let first = match text.split_whitespace().next() {
                    Some(tok) => tok,
                    None => return Err(TemplateDefect::BlankLine { block, line }),
                };
                if first.ends_with(':') {
                    return Err(TemplateDefect::Label { block, line });
                }
            }
        }
        Ok(())
    }
}

fn to_lines(x: &[&str]) -> Vec<String> {
    x.iter().map(|s| s.to_string()).collect()
}

/// Produce exactly `count` lines by cycling through `lines`.
///
/// When `count` is not a multiple of `lines.len()`, the last repetition
/// stops partway through the template.
pub fn unroll(lines: &[String], count: usize) -> impl Iterator<Item=&str> {
    lines.iter().map(String::as_str).cycle().take(count)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unroll_remainder() {
        let t = TemplateSet::new(&["  a", "  b", "  c"]);
        let lines: Vec<&str> = unroll(&t.primary, 7).collect();
        assert_eq!(lines, ["  a", "  b", "  c", "  a", "  b", "  c", "  a"]);
        assert_eq!(unroll(&t.primary, 2).count(), 2);
    }

    #[test]
    fn second_block_defaults_to_primary() {
        let t = TemplateSet::new(&["  a"]);
        assert_eq!(t.second_block(), t.primary.as_slice());
        let t = t.secondary(&["  b"]);
        assert_eq!(t.second_block(), ["  b".to_string()]);
    }

    #[test]
    fn check_defects() {
        assert_eq!(TemplateSet::new(&[]).check(),
            Err(TemplateDefect::Empty(Block::Primary)));
        assert_eq!(TemplateSet::new(&["  a"]).secondary(&[]).check(),
            Err(TemplateDefect::Empty(Block::Secondary)));
        assert_eq!(TemplateSet::new(&["  a", "   "]).check(),
            Err(TemplateDefect::BlankLine { block: Block::Primary, line: 1 }));
        assert_eq!(TemplateSet::new(&["  a\n  b"]).check(),
            Err(TemplateDefect::LineBreak { block: Block::Primary, line: 0 }));
        assert_eq!(TemplateSet::new(&["  a"]).prologue(&["loop:"]).check(),
            Err(TemplateDefect::Label { block: Block::Prologue, line: 0 }));
        assert_eq!(TemplateSet::new(&["  add x11, x11, x9 // note:"]).check(),
            Ok(()));
    }
}
