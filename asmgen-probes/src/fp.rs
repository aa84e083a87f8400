//! Floating-point scheduler capacity probes.

use asmgen::{ ChaseLoad, CountSweep, Dialect, Probe, Result, TemplateSet };

/// 256-bit FADD scheduler capacity.
///
/// Every `vaddps` reads `ymm0`, which is broadcast from the float array
/// right after a pointer-chasing load. None of them can issue before the
/// load completes. On AArch64 the same structure is built from scalar
/// `fadd` on `s16`.
pub struct Fadd256Sched {
    counts: CountSweep,
}
impl Fadd256Sched {
    pub fn new(low: usize, high: usize, step: usize) -> Result<Self> {
        Ok(Self { counts: CountSweep::generate(low, high, step)? })
    }
}
impl Probe for Fadd256Sched {
    fn name(&self) -> &str { "fadd256sched" }
    fn description(&self) -> &str { "256-bit FADD Scheduler Capacity Test" }
    fn counts(&self) -> &CountSweep { &self.counts }

    fn chase_load(&self, dialect: Dialect) -> ChaseLoad {
        match dialect {
            Dialect::X86Gcc | Dialect::X86Nasm => ChaseLoad::Vector256,
            Dialect::Arm => ChaseLoad::Scalar,
        }
    }

    fn templates(&self, dialect: Dialect) -> Option<TemplateSet> {
        match dialect {
            // NOTE: The last line writes ymm3 (instead of ymm4), which ties
            // it to the third line. This is flagged by the lint.
            Dialect::X86Gcc => Some(TemplateSet::new(&[
                "  vaddps %ymm0, %ymm1, %ymm1",
                "  vaddps %ymm0, %ymm2, %ymm2",
                "  vaddps %ymm0, %ymm3, %ymm3",
                "  vaddps %ymm0, %ymm4, %ymm3",
            ]).prologue(&[
                "  vxorps %ymm1, %ymm1, %ymm1",
                "  vxorps %ymm2, %ymm2, %ymm2",
                "  vxorps %ymm3, %ymm3, %ymm3",
                "  vxorps %ymm4, %ymm4, %ymm4",
            ])),
            Dialect::X86Nasm => Some(TemplateSet::new(&[
                "  vaddps ymm1, ymm1, ymm0",
                "  vaddps ymm2, ymm2, ymm0",
                "  vaddps ymm3, ymm3, ymm0",
                "  vaddps ymm4, ymm4, ymm0",
            ]).prologue(&[
                "  vxorps ymm1, ymm1, ymm1",
                "  vxorps ymm2, ymm2, ymm2",
                "  vxorps ymm3, ymm3, ymm3",
                "  vxorps ymm4, ymm4, ymm4",
            ])),
            Dialect::Arm => Some(TemplateSet::new(&[
                "  fadd s17, s17, s16",
                "  fadd s18, s18, s16",
                "  fadd s19, s19, s16",
                "  fadd s20, s20, s16",
            ]).prologue(FP_ARM_ZERO)),
        }
    }
}

/// Scalar FADD scheduler capacity.
pub struct FaddSched {
    counts: CountSweep,
}
impl FaddSched {
    pub fn new(low: usize, high: usize, step: usize) -> Result<Self> {
        Ok(Self { counts: CountSweep::generate(low, high, step)? })
    }
}
impl Probe for FaddSched {
    fn name(&self) -> &str { "faddsched" }
    fn description(&self) -> &str { "FADD Scheduler Capacity Test" }
    fn counts(&self) -> &CountSweep { &self.counts }
    fn chase_load(&self, _dialect: Dialect) -> ChaseLoad { ChaseLoad::Scalar }

    fn templates(&self, dialect: Dialect) -> Option<TemplateSet> {
        Some(match dialect {
            Dialect::X86Gcc => TemplateSet::new(&[
                "  addss %xmm0, %xmm1",
                "  addss %xmm0, %xmm2",
                "  addss %xmm0, %xmm3",
                "  addss %xmm0, %xmm4",
            ]).prologue(&[
                "  xorps %xmm1, %xmm1",
                "  xorps %xmm2, %xmm2",
                "  xorps %xmm3, %xmm3",
                "  xorps %xmm4, %xmm4",
            ]),
            Dialect::X86Nasm => TemplateSet::new(&[
                "  addss xmm1, xmm0",
                "  addss xmm2, xmm0",
                "  addss xmm3, xmm0",
                "  addss xmm4, xmm0",
            ]).prologue(&[
                "  xorps xmm1, xmm1",
                "  xorps xmm2, xmm2",
                "  xorps xmm3, xmm3",
                "  xorps xmm4, xmm4",
            ]),
            Dialect::Arm => TemplateSet::new(&[
                "  fadd s17, s17, s16",
                "  fadd s18, s18, s16",
                "  fadd s19, s19, s16",
                "  fadd s20, s20, s16",
            ]).prologue(FP_ARM_ZERO),
        })
    }
}

const FP_ARM_ZERO: &[&str] = &[
    "  movi d17, #0",
    "  movi d18, #0",
    "  movi d19, #0",
    "  movi d20, #0",
];
