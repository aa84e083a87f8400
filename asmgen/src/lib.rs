//! Generator for scheduler-capacity microbenchmarks.
//!
//! A [Probe] describes one microarchitectural behavior under test with a
//! set of instruction templates for each [Dialect]. Each probe is rendered
//! into one assembly function per entry in its [CountSweep], and a [Suite]
//! concatenates the functions for many probes into a single source file
//! per dialect.
//!
//! Assembling, linking, running and timing the output is left to some
//! external harness (see [harness] for the declarations it needs).

pub mod config;
pub mod dialect;
pub mod emit;
pub mod error;
pub mod harness;
pub mod lint;
pub mod probe;
pub mod suite;
pub mod sweep;
pub mod template;

pub use crate::config::GenConfig;
pub use crate::dialect::Dialect;
pub use crate::emit::{
    emitter_for,
    DialectEmitter,
    EmitOptions,
};
pub use crate::error::{ GenError, Result, TemplateDefect };
pub use crate::probe::{ CallSignature, Probe };
pub use crate::suite::{ FailurePolicy, Rendered, Suite };
pub use crate::sweep::{ CountSweep, SweepBounds };
pub use crate::template::{ Block, ChainKind, ChaseLoad, TemplateSet };

#[cfg(test)]
pub(crate) mod testutil;
