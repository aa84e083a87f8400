//! Errors raised while generating benchmark code.
//!
//! Every error here describes an authoring defect in a probe (or in the
//! parameters used to build it). None of them are transient: generation for
//! the offending probe is aborted and nothing is appended to the output.

use crate::dialect::Dialect;
use crate::template::Block;

pub type Result<T> = std::result::Result<T, GenError>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GenError {
    /// Count sweep bounds are unusable (zero step, zero low bound, or an
    /// empty range).
    #[error("invalid count range: low={low} high={high} step={step}")]
    InvalidRange { low: usize, high: usize, step: usize },

    /// A single function was requested with a count of zero.
    #[error("probe '{0}' can't be generated with a count of zero")]
    ZeroCount(String),

    /// The probe has no templates for the requested dialect.
    #[error("probe '{probe}' has no templates for dialect {dialect}")]
    DialectUnsupported { probe: String, dialect: Dialect },

    /// The probe's templates can't be rendered for the requested dialect.
    #[error("malformed {dialect} template for probe '{probe}': {defect}")]
    MalformedTemplate {
        probe: String,
        dialect: Dialect,
        defect: TemplateDefect,
    },

    /// The probe name can't be used as a symbol prefix.
    #[error("'{0}' is not a valid probe name")]
    InvalidName(String),

    /// Two probes in the same suite share a name.
    #[error("probe name '{0}' is used more than once")]
    DuplicateProbe(String),

    /// Two different probes would generate the same symbol.
    #[error("{dialect} label '{label}' is generated by both '{first}' and '{second}'")]
    LabelCollision {
        label: String,
        first: String,
        second: String,
        dialect: Dialect,
    },

    /// An emitter-owned x86 instruction couldn't be constructed.
    #[error("x86 instruction: {0}")]
    Instruction(String),
}

impl From<iced_x86::IcedError> for GenError {
    fn from(e: iced_x86::IcedError) -> Self {
        Self::Instruction(e.to_string())
    }
}

/// The reason a [crate::TemplateSet] was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TemplateDefect {
    #[error("{0} block has no instructions")]
    Empty(Block),

    #[error("{block} line {line} is blank")]
    BlankLine { block: Block, line: usize },

    #[error("{block} line {line} contains a line break")]
    LineBreak { block: Block, line: usize },

    #[error("{block} line {line} defines a label")]
    Label { block: Block, line: usize },
}
