//! A probe with fixed templates, used by unit tests.

use crate::dialect::Dialect;
use crate::probe::Probe;
use crate::sweep::CountSweep;
use crate::template::{ ChaseLoad, TemplateSet };

pub struct TestProbe {
    pub name: String,
    pub counts: CountSweep,
    pub dialects: Vec<Dialect>,
    pub override_gcc: Option<TemplateSet>,
}
impl TestProbe {
    pub fn all(name: &str, low: usize, high: usize, step: usize) -> Self {
        Self {
            name: name.to_string(),
            counts: CountSweep::generate(low, high, step).unwrap(),
            dialects: Dialect::ALL.to_vec(),
            override_gcc: None,
        }
    }

    pub fn x86_only(name: &str, low: usize, high: usize, step: usize) -> Self {
        let mut res = Self::all(name, low, high, step);
        res.dialects = vec![Dialect::X86Gcc, Dialect::X86Nasm];
        res
    }

    pub fn gcc(mut self, t: TemplateSet) -> Self {
        self.override_gcc = Some(t);
        self
    }
}

impl Probe for TestProbe {
    fn name(&self) -> &str { &self.name }
    fn description(&self) -> &str { "test probe" }
    fn counts(&self) -> &CountSweep { &self.counts }
    fn chase_load(&self, _dialect: Dialect) -> ChaseLoad { ChaseLoad::Scalar }

    fn templates(&self, dialect: Dialect) -> Option<TemplateSet> {
        if !self.dialects.contains(&dialect) {
            return None;
        }
        Some(match dialect {
            Dialect::X86Gcc => match &self.override_gcc {
                Some(t) => t.clone(),
                None => TemplateSet::new(&[
                    "  addss %xmm0, %xmm1",
                    "  addss %xmm0, %xmm2",
                ]),
            },
            Dialect::X86Nasm => TemplateSet::new(&[
                "  addss xmm1, xmm0",
                "  addss xmm2, xmm0",
            ]),
            Dialect::Arm => TemplateSet::new(&[
                "  fadd s17, s17, s16",
                "  fadd s18, s18, s16",
            ]),
        })
    }
}
