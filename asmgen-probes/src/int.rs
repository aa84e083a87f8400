//! Integer scheduler capacity probes.
//!
//! These read the chased index directly (there's no payload load). The
//! primary block depends on chase A and the secondary block on chase B.

use asmgen::{ CountSweep, Dialect, Probe, Result, TemplateSet };

/// Integer ADD scheduler capacity.
pub struct AddSched {
    counts: CountSweep,
}
impl AddSched {
    pub fn new(low: usize, high: usize, step: usize) -> Result<Self> {
        Ok(Self { counts: CountSweep::generate(low, high, step)? })
    }
}
impl Probe for AddSched {
    fn name(&self) -> &str { "addsched" }
    fn description(&self) -> &str { "Integer ADD Scheduler Capacity Test" }
    fn counts(&self) -> &CountSweep { &self.counts }

    fn templates(&self, dialect: Dialect) -> Option<TemplateSet> {
        Some(match dialect {
            Dialect::X86Gcc => TemplateSet::new(&[
                "  add %r15, %r8",
                "  add %r15, %r9",
                "  add %r15, %r10",
                "  add %r15, %r11",
            ]).secondary(&[
                "  add %r14, %r8",
                "  add %r14, %r9",
                "  add %r14, %r10",
                "  add %r14, %r11",
            ]).prologue(GCC_ZERO),
            Dialect::X86Nasm => TemplateSet::new(&[
                "  add r8, r15",
                "  add r9, r15",
                "  add r10, r15",
                "  add r11, r15",
            ]).secondary(&[
                "  add r8, r14",
                "  add r9, r14",
                "  add r10, r14",
                "  add r11, r14",
            ]).prologue(NASM_ZERO),
            Dialect::Arm => TemplateSet::new(&[
                "  add x11, x11, x9",
                "  add x12, x12, x9",
                "  add x13, x13, x9",
                "  add x14, x14, x9",
            ]).secondary(&[
                "  add x11, x11, x10",
                "  add x12, x12, x10",
                "  add x13, x13, x10",
                "  add x14, x14, x10",
            ]).prologue(ARM_ZERO),
        })
    }
}

/// Integer multiply scheduler capacity.
pub struct MulSched {
    counts: CountSweep,
}
impl MulSched {
    pub fn new(low: usize, high: usize, step: usize) -> Result<Self> {
        Ok(Self { counts: CountSweep::generate(low, high, step)? })
    }
}
impl Probe for MulSched {
    fn name(&self) -> &str { "mulsched" }
    fn description(&self) -> &str { "Integer Multiply Scheduler Capacity Test" }
    fn counts(&self) -> &CountSweep { &self.counts }

    fn templates(&self, dialect: Dialect) -> Option<TemplateSet> {
        Some(match dialect {
            Dialect::X86Gcc => TemplateSet::new(&[
                "  imul %r15, %r8",
                "  imul %r15, %r9",
                "  imul %r15, %r10",
                "  imul %r15, %r11",
            ]).secondary(&[
                "  imul %r14, %r8",
                "  imul %r14, %r9",
                "  imul %r14, %r10",
                "  imul %r14, %r11",
            ]).prologue(GCC_ZERO),
            Dialect::X86Nasm => TemplateSet::new(&[
                "  imul r8, r15",
                "  imul r9, r15",
                "  imul r10, r15",
                "  imul r11, r15",
            ]).secondary(&[
                "  imul r8, r14",
                "  imul r9, r14",
                "  imul r10, r14",
                "  imul r11, r14",
            ]).prologue(NASM_ZERO),
            Dialect::Arm => TemplateSet::new(&[
                "  mul x11, x11, x9",
                "  mul x12, x12, x9",
                "  mul x13, x13, x9",
                "  mul x14, x14, x9",
            ]).secondary(&[
                "  mul x11, x11, x10",
                "  mul x12, x12, x10",
                "  mul x13, x13, x10",
                "  mul x14, x14, x10",
            ]).prologue(ARM_ZERO),
        })
    }
}

const GCC_ZERO: &[&str] = &[
    "  xor %r8d, %r8d",
    "  xor %r9d, %r9d",
    "  xor %r10d, %r10d",
    "  xor %r11d, %r11d",
];

const NASM_ZERO: &[&str] = &[
    "  xor r8d, r8d",
    "  xor r9d, r9d",
    "  xor r10d, r10d",
    "  xor r11d, r11d",
];

const ARM_ZERO: &[&str] = &[
    "  mov x11, xzr",
    "  mov x12, xzr",
    "  mov x13, xzr",
    "  mov x14, xzr",
];

#[cfg(test)]
mod test {
    use super::*;
    use asmgen::lint::reused_destinations;

    fn probes() -> Vec<Box<dyn Probe>> {
        vec![
            Box::new(AddSched::new(2, 10, 3).unwrap()),
            Box::new(MulSched::new(2, 10, 3).unwrap()),
        ]
    }

    #[test]
    fn templates_are_independent() {
        for p in probes() {
            for dialect in Dialect::ALL {
                let t = p.templates(dialect).unwrap();
                assert!(t.check().is_ok());
                for (_, lines) in t.blocks().skip(1) {
                    assert!(reused_destinations(dialect, lines).is_empty(),
                        "{} {}", p.name(), dialect);
                }
            }
        }
    }

    #[test]
    fn secondary_reads_chase_b() {
        let mut out = String::new();
        AddSched::new(5, 5, 1).unwrap().generate_x86_nasm(&mut out).unwrap();
        let body: Vec<&str> = out.lines()
            .skip_while(|l| *l != ".loop:")
            .collect();
        let split = body.iter()
            .position(|l| l.contains("r14d"))
            .unwrap();
        assert!(body[..split].iter().filter(|l| l.starts_with("  add"))
            .all(|l| l.ends_with("r15")));
        assert_eq!(body[split..].iter().filter(|l| l.ends_with(", r14")).count(), 5);
    }

    #[test]
    fn labels() {
        let p = MulSched::new(2, 10, 3).unwrap();
        for dialect in Dialect::ALL {
            assert_eq!(p.labels(dialect), ["mulsched2", "mulsched5", "mulsched8"]);
        }
    }
}
