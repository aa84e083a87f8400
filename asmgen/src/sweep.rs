//! Count sweeps.

use std::fmt;
use std::str::FromStr;

use crate::error::{ GenError, Result };

/// An ordered list of counts a probe is generated for.
///
/// The list is never empty, strictly increasing, and starts at a value
/// greater than zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountSweep(Vec<usize>);
impl CountSweep {

    /// Produce `low, low + step, low + 2*step, ...` up to the last value
    /// which is `<= high`.
    ///
    /// The sweep never overshoots: with `(2, 10, 3)` the last count is 8.
    /// Out-of-range inputs are rejected rather than clamped.
    pub fn generate(low: usize, high: usize, step: usize) -> Result<Self> {
        if low == 0 || step == 0 || low > high {
            return Err(GenError::InvalidRange { low, high, step });
        }
        Ok(Self((low..=high).step_by(step).collect()))
    }

    pub fn iter(&self) -> impl Iterator<Item=usize> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false, a sweep has at least one count.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> usize {
        self.0[0]
    }

    pub fn last(&self) -> usize {
        self.0[self.0.len() - 1]
    }
}

impl <'a> IntoIterator for &'a CountSweep {
    type Item = &'a usize;
    type IntoIter = std::slice::Iter<'a, usize>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The `(low, high, step)` parameters for a [CountSweep].
///
/// Parses from `low:high:step` or `low:high` (with a step of 1).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SweepBounds {
    pub low: usize,
    pub high: usize,
    pub step: usize,
}
impl SweepBounds {
    pub const fn new(low: usize, high: usize, step: usize) -> Self {
        Self { low, high, step }
    }

    pub fn sweep(&self) -> Result<CountSweep> {
        CountSweep::generate(self.low, self.high, self.step)
    }
}

impl fmt::Display for SweepBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.low, self.high, self.step)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseBoundsError {
    #[error("expected 'low:high' or 'low:high:step', got '{0}'")]
    Shape(String),
    #[error("'{0}' is not a count")]
    Count(String),
}

impl FromStr for SweepBounds {
    type Err = ParseBoundsError;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parse = |x: &str| {
            x.trim().parse::<usize>()
                .map_err(|_| ParseBoundsError::Count(x.to_string()))
        };
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [low, high] => Ok(Self::new(parse(*low)?, parse(*high)?, 1)),
            [low, high, step] => {
                Ok(Self::new(parse(*low)?, parse(*high)?, parse(*step)?))
            },
            _ => Err(ParseBoundsError::Shape(s.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::Rng;

    #[test]
    fn single_element() {
        let s = CountSweep::generate(1, 1, 1).unwrap();
        assert_eq!(s.as_slice(), &[1]);
    }

    #[test]
    fn no_overshoot() {
        let s = CountSweep::generate(2, 10, 3).unwrap();
        assert_eq!(s.as_slice(), &[2, 5, 8]);
        assert_eq!(s.last(), 8);
    }

    #[test]
    fn exact_upper_bound() {
        let s = CountSweep::generate(4, 16, 4).unwrap();
        assert_eq!(s.as_slice(), &[4, 8, 12, 16]);
    }

    #[test]
    fn invalid_ranges() {
        for (low, high, step) in [(0, 4, 1), (5, 4, 1), (1, 4, 0)] {
            assert_eq!(CountSweep::generate(low, high, step),
                Err(GenError::InvalidRange { low, high, step })
            );
        }
    }

    #[test]
    fn random_bounds() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let low  = rng.gen_range(1..=64);
            let high = rng.gen_range(low..=512);
            let step = rng.gen_range(1..=32);
            let s = CountSweep::generate(low, high, step).unwrap();
            assert_eq!(s.first(), low);
            assert!(s.last() <= high && high < s.last() + step,
                "{:?} for {}:{}:{}", s, low, high, step
            );
            for (a, b) in s.iter().zip(s.iter().skip(1)) {
                assert_eq!(b - a, step);
            }
        }
    }

    #[test]
    fn parse_bounds() {
        assert_eq!("4:160:4".parse::<SweepBounds>(),
            Ok(SweepBounds::new(4, 160, 4)));
        assert_eq!("1:8".parse::<SweepBounds>(),
            Ok(SweepBounds::new(1, 8, 1)));
        assert!(matches!("1:x:2".parse::<SweepBounds>(),
            Err(ParseBoundsError::Count(_))));
        assert!(matches!("12".parse::<SweepBounds>(),
            Err(ParseBoundsError::Shape(_))));
        assert_eq!(SweepBounds::new(2, 10, 3).to_string(), "2:10:3");
    }
}
