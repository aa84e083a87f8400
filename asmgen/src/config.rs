//! Generator configuration.

use std::path::{ Path, PathBuf };

use crate::dialect::Dialect;
use crate::emit::EmitOptions;
use crate::suite::FailurePolicy;
use crate::sweep::SweepBounds;

/// Configuration for one run of the generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenConfig {
    /// Sweep used by every probe
    pub bounds: SweepBounds,

    /// Dialects to render, in order
    pub dialects: Vec<Dialect>,

    pub emit: EmitOptions,

    /// What to do when a probe can't be rendered for some dialect
    pub policy: FailurePolicy,

    /// Common prefix for all output file names
    pub stem: String,

    /// Directory receiving the output files
    pub out_dir: PathBuf,
}

impl GenConfig {
    /// Counts 4, 8, .., 160.
    pub const DEFAULT_BOUNDS: SweepBounds = SweepBounds::new(4, 160, 4);

    /// Default prefix for output file names.
    pub const DEFAULT_STEM: &'static str = "benchmarks";
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            bounds: Self::DEFAULT_BOUNDS,
            dialects: Dialect::ALL.to_vec(),
            emit: EmitOptions::default(),
            policy: FailurePolicy::Halt,
            stem: Self::DEFAULT_STEM.to_string(),
            out_dir: PathBuf::from("."),
        }
    }
}

impl GenConfig {
    pub fn bounds(mut self, x: SweepBounds) -> Self {
        self.bounds = x;
        self
    }

    /// Replace the set of dialects. Duplicates are dropped and the order
    /// is normalized, so each output file is written once.
    pub fn dialects(mut self, x: &[Dialect]) -> Self {
        let mut x = x.to_vec();
        x.sort();
        x.dedup();
        self.dialects = x;
        self
    }

    pub fn loop_align(mut self, x: Option<u32>) -> Self {
        self.emit = self.emit.loop_align(x);
        self
    }

    pub fn policy(mut self, x: FailurePolicy) -> Self {
        self.policy = x;
        self
    }

    pub fn stem(mut self, x: impl Into<String>) -> Self {
        self.stem = x.into();
        self
    }

    pub fn out_dir(mut self, x: impl AsRef<Path>) -> Self {
        self.out_dir = x.as_ref().to_path_buf();
        self
    }
}

impl GenConfig {
    /// Path of the assembly source for `dialect`.
    pub fn output_path(&self, dialect: Dialect) -> PathBuf {
        self.out_dir.join(format!("{}{}", self.stem, dialect.source_suffix()))
    }

    /// Path of the C header for `dialect`.
    pub fn header_path(&self, dialect: Dialect) -> PathBuf {
        self.out_dir.join(format!("{}{}", self.stem, dialect.header_suffix()))
    }
}
