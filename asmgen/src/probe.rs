//! Probe definitions.

use crate::dialect::Dialect;
use crate::emit::{ emitter_for, EmitOptions };
use crate::error::{ GenError, Result };
use crate::sweep::CountSweep;
use crate::template::{ ChainKind, ChaseLoad, TemplateSet };

/// The C-callable signature of every function generated for a probe,
/// and the arguments the harness passes at the call site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallSignature {
    /// Parameter list, ie. `uint64_t iterations, int *arr, float *floatArr`
    pub params: &'static str,

    /// Argument expressions used by the harness, ie. `structIterations, A, fpArr`
    pub args: &'static str,
}
impl CallSignature {
    /// The signature every emitter implements: an iteration count, the
    /// pointer-chasing array, and the float array.
    pub const DEFAULT: Self = Self {
        params: "uint64_t iterations, int *arr, float *floatArr",
        args: "structIterations, A, fpArr",
    };
}
impl Default for CallSignature {
    fn default() -> Self { Self::DEFAULT }
}

/// A single microarchitectural behavior under test.
///
/// Implementors only supply data: a name, a sweep, and templates for each
/// supported [Dialect]. Rendering is delegated to the shared emitters.
pub trait Probe {
    /// Symbol prefix for every generated function.
    fn name(&self) -> &str;

    /// Human-readable description of what is being measured.
    fn description(&self) -> &str;

    fn signature(&self) -> CallSignature { CallSignature::DEFAULT }

    /// Whether the harness should divide measured time by the count.
    /// This isn't used by the generator.
    fn normalize_by_count(&self) -> bool { false }

    fn counts(&self) -> &CountSweep;

    /// The payload loaded after each pointer-chasing load in `dialect`.
    fn chase_load(&self, _dialect: Dialect) -> ChaseLoad { ChaseLoad::None }

    fn chain_kind(&self) -> ChainKind { ChainKind::Independent }

    /// Templates for some dialect, or `None` if this probe can't be
    /// expressed there.
    fn templates(&self, dialect: Dialect) -> Option<TemplateSet>;

    fn supports(&self, dialect: Dialect) -> bool {
        self.templates(dialect).is_some()
    }

    /// Labels of all functions generated for `dialect`.
    fn labels(&self, dialect: Dialect) -> Vec<String> {
        if !self.supports(dialect) {
            return Vec::new();
        }
        self.counts().iter().map(|c| label(self.name(), c)).collect()
    }

    /// Render every function in the sweep for `dialect`.
    fn generate_with(&self, dialect: Dialect, out: &mut String,
        opts: EmitOptions) -> Result<()>
    {
        let templates = self.templates(dialect);
        emitter_for(dialect, opts).emit_sweep(out,
            self.name(),
            self.counts(),
            templates.as_ref(),
            self.chase_load(dialect),
        )
    }

    fn generate_x86_gcc(&self, out: &mut String) -> Result<()> {
        self.generate_with(Dialect::X86Gcc, out, EmitOptions::default())
    }

    fn generate_x86_nasm(&self, out: &mut String) -> Result<()> {
        self.generate_with(Dialect::X86Nasm, out, EmitOptions::default())
    }

    fn generate_arm(&self, out: &mut String) -> Result<()> {
        self.generate_with(Dialect::Arm, out, EmitOptions::default())
    }
}

/// The symbol for the function generated for `count`.
pub fn label(name: &str, count: usize) -> String {
    format!("{}{}", name, count)
}

/// Probe names must be usable as a symbol prefix in every dialect.
pub fn check_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let ok = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        },
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(GenError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testutil::TestProbe;

    #[test]
    fn names() {
        assert!(check_name("fadd256sched").is_ok());
        assert!(check_name("_x").is_ok());
        for bad in ["", "4fadd", "fadd-sched", "fadd.sched", "fädd"] {
            assert_eq!(check_name(bad), Err(GenError::InvalidName(bad.to_string())));
        }
    }

    #[test]
    fn arm_unsupported() {
        let p = TestProbe::x86_only("fadd256sched", 4, 12, 4);
        let mut out = String::new();
        let res = p.generate_arm(&mut out);
        assert_eq!(res, Err(GenError::DialectUnsupported {
            probe: "fadd256sched".to_string(),
            dialect: Dialect::Arm,
        }));
        assert!(out.is_empty());
        assert!(p.labels(Dialect::Arm).is_empty());

        p.generate_x86_gcc(&mut out).unwrap();
        p.generate_x86_nasm(&mut out).unwrap();
        assert_eq!(out.matches("fadd256sched8:").count(), 2);
    }

    #[test]
    fn labels_follow_sweep() {
        let p = TestProbe::all("addsched", 2, 10, 3);
        assert_eq!(p.labels(Dialect::Arm), ["addsched2", "addsched5", "addsched8"]);
        let mut out = String::new();
        p.generate_arm(&mut out).unwrap();
        for l in p.labels(Dialect::Arm) {
            assert_eq!(out.matches(&format!("\n{}:\n", l)).count(), 1);
        }
    }

    #[test]
    fn deterministic() {
        let p = TestProbe::all("addsched", 1, 32, 7);
        for dialect in Dialect::ALL {
            let mut a = String::new();
            let mut b = String::new();
            p.generate_with(dialect, &mut a, EmitOptions::default()).unwrap();
            p.generate_with(dialect, &mut b, EmitOptions::default()).unwrap();
            assert_eq!(a, b);
        }
    }
}
