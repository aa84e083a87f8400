//! Collections of probes rendered into one source file per dialect.

use std::collections::HashMap;

use itertools::Itertools;
use tracing::{ info, warn };

use crate::dialect::Dialect;
use crate::emit::{ emitter_for, EmitOptions };
use crate::error::{ GenError, Result };
use crate::lint::reused_destinations;
use crate::probe::{ check_name, Probe };
use crate::template::ChainKind;

/// What to do when a probe can't be rendered.
///
/// The generator never guesses: a failing probe contributes no output.
/// This only decides whether the remaining probes are still rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FailurePolicy {
    /// Stop at the first failing probe.
    #[default]
    Halt,
    /// Record the failure and continue with the next probe.
    Skip,
}

/// The output for one dialect.
#[derive(Debug)]
pub struct Rendered {
    pub dialect: Dialect,
    pub text: String,
    /// Probes which were left out (only with [FailurePolicy::Skip])
    pub skipped: Vec<(String, GenError)>,
}

/// An ordered collection of probes.
pub struct Suite {
    probes: Vec<Box<dyn Probe>>,
    opts: EmitOptions,
}
impl Suite {
    pub fn new(opts: EmitOptions) -> Self {
        Self { probes: Vec::new(), opts }
    }

    pub fn push(&mut self, probe: Box<dyn Probe>) {
        self.probes.push(probe);
    }

    pub fn probes(&self) -> impl Iterator<Item=&dyn Probe> {
        self.probes.iter().map(|p| &**p)
    }

    pub fn len(&self) -> usize { self.probes.len() }
    pub fn is_empty(&self) -> bool { self.probes.is_empty() }

    /// Probes which have templates for `dialect`.
    pub fn supporting(&self, dialect: Dialect) -> impl Iterator<Item=&dyn Probe> {
        self.probes().filter(move |p| p.supports(dialect))
    }

    /// Labels of every function generated for `dialect`, in output order.
    pub fn labels(&self, dialect: Dialect) -> Vec<String> {
        self.probes().flat_map(|p| p.labels(dialect)).collect()
    }

    /// Check that every probe name is valid and unique, and that no two
    /// probes generate the same label.
    ///
    /// Names alone aren't enough: `add1` at count 23 and `add12` at
    /// count 3 both produce `add123`.
    pub fn validate(&self) -> Result<()> {
        for p in self.probes() {
            check_name(p.name())?;
        }
        if let Some(dup) = self.probes().map(|p| p.name()).duplicates().next() {
            return Err(GenError::DuplicateProbe(dup.to_string()));
        }
        for dialect in Dialect::ALL {
            let mut owners: HashMap<String, &str> = HashMap::new();
            for p in self.supporting(dialect) {
                for label in p.labels(dialect) {
                    if let Some(first) = owners.get(&label) {
                        return Err(GenError::LabelCollision {
                            first: first.to_string(),
                            second: p.name().to_string(),
                            label,
                            dialect,
                        });
                    }
                    owners.insert(label, p.name());
                }
            }
        }
        Ok(())
    }

    /// Log template lines which break the independence of a probe declared
    /// with [ChainKind::Independent].
    fn lint(&self, probe: &dyn Probe, dialect: Dialect) {
        if probe.chain_kind() != ChainKind::Independent {
            return;
        }
        let Some(templates) = probe.templates(dialect) else { return };
        let blocks = [
            ("primary", Some(&templates.primary)),
            ("secondary", templates.secondary.as_ref()),
        ];
        for (block, lines) in blocks {
            let Some(lines) = lines else { continue };
            for r in reused_destinations(dialect, lines) {
                warn!(probe = probe.name(), %dialect, block,
                    line = r.line, first = r.first, register = %r.register,
                    "template line reuses a destination register");
            }
        }
    }

    /// Render every probe for `dialect`.
    ///
    /// Suite-level defects (see [Suite::validate]) are always fatal.
    pub fn render(&self, dialect: Dialect, policy: FailurePolicy)
        -> Result<Rendered>
    {
        self.validate()?;
        let emitter = emitter_for(dialect, self.opts);
        let mut text = String::new();
        let mut skipped = Vec::new();
        emitter.emit_header(&mut text);

        for probe in self.probes() {
            self.lint(probe, dialect);
            let mut buf = String::new();
            emitter.comment(&mut buf, &format!("{}: {}",
                probe.name(), probe.description()));
            match probe.generate_with(dialect, &mut buf, self.opts) {
                Ok(()) => text.push_str(&buf),
                Err(e) => match policy {
                    FailurePolicy::Halt => return Err(e),
                    FailurePolicy::Skip => {
                        warn!(probe = probe.name(), %dialect, error = %e,
                            "skipping probe");
                        skipped.push((probe.name().to_string(), e));
                    },
                },
            }
        }
        info!(%dialect, probes = self.len() - skipped.len(),
            skipped = skipped.len(), "rendered suite");
        Ok(Rendered { dialect, text, skipped })
    }
}
