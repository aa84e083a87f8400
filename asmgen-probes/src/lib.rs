//! Scheduler capacity probes.
//!
//! Each probe places a growing number of instructions behind a
//! pointer-chasing load which misses in cache, followed by a second,
//! independent chase. Once the dependent instructions no longer fit in the
//! scheduler, the second miss can't overlap with the first, and the time
//! per iteration jumps.

pub mod fp;
pub mod int;

use asmgen::{ GenConfig, Probe, Result, Suite, SweepBounds };

pub use fp::{ Fadd256Sched, FaddSched };
pub use int::{ AddSched, MulSched };

/// Identifies one of the probes shipped in this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ProbeId {
    #[value(name = "fadd256sched")]
    Fadd256Sched,
    #[value(name = "faddsched")]
    FaddSched,
    #[value(name = "addsched")]
    AddSched,
    #[value(name = "mulsched")]
    MulSched,
}
impl ProbeId {
    pub const ALL: [Self; 4] = [
        Self::Fadd256Sched, Self::FaddSched, Self::AddSched, Self::MulSched,
    ];

    /// Instantiate this probe over the sweep described by `b`.
    pub fn build(&self, b: SweepBounds) -> Result<Box<dyn Probe>> {
        let probe: Box<dyn Probe> = match self {
            Self::Fadd256Sched => Box::new(Fadd256Sched::new(b.low, b.high, b.step)?),
            Self::FaddSched    => Box::new(FaddSched::new(b.low, b.high, b.step)?),
            Self::AddSched     => Box::new(AddSched::new(b.low, b.high, b.step)?),
            Self::MulSched     => Box::new(MulSched::new(b.low, b.high, b.step)?),
        };
        Ok(probe)
    }
}

/// Build a [Suite] from some selection of probes.
pub fn build_suite(ids: &[ProbeId], cfg: &GenConfig) -> Result<Suite> {
    let mut suite = Suite::new(cfg.emit);
    for id in ids {
        suite.push(id.build(cfg.bounds)?);
    }
    suite.validate()?;
    Ok(suite)
}

#[cfg(test)]
mod test {
    use super::*;
    use asmgen::{ Dialect, FailurePolicy, GenError };
    use std::collections::HashSet;

    #[test]
    fn names_match_ids() {
        use clap::ValueEnum;
        for id in ProbeId::ALL {
            let p = id.build(SweepBounds::new(1, 1, 1)).unwrap();
            let value = id.to_possible_value().unwrap();
            assert_eq!(value.get_name(), p.name());
        }
    }

    #[test]
    fn invalid_bounds() {
        let res = ProbeId::AddSched.build(SweepBounds::new(0, 4, 1));
        assert_eq!(res.err(), Some(GenError::InvalidRange { low: 0, high: 4, step: 1 }));
    }

    #[test]
    fn full_suite() {
        let cfg = GenConfig::default().bounds(SweepBounds::new(2, 10, 3));
        let suite = build_suite(&ProbeId::ALL, &cfg).unwrap();
        assert_eq!(suite.len(), 4);

        for dialect in Dialect::ALL {
            let r = suite.render(dialect, FailurePolicy::Halt).unwrap();
            assert!(r.skipped.is_empty());
            let labels = suite.labels(dialect);
            assert_eq!(labels.len(), 12);
            let unique: HashSet<&String> = labels.iter().collect();
            assert_eq!(unique.len(), labels.len());
            for l in labels.iter() {
                assert_eq!(r.text.matches(&format!("\n{}:\n", l)).count(), 1, "{}", l);
            }
        }
    }

    #[test]
    fn duplicate_selection() {
        let cfg = GenConfig::default();
        let res = build_suite(&[ProbeId::AddSched, ProbeId::AddSched], &cfg);
        assert_eq!(res.err(), Some(GenError::DuplicateProbe("addsched".to_string())));
    }
}
