//! AArch64 syntax for GNU as (AAPCS64 calling convention).
//!
//! Register Environment
//! ====================
//!
//! | Register     | Contents                                      |
//! |--------------|-----------------------------------------------|
//! | `x0`         | remaining iterations                          |
//! | `x1`         | `arr` (pointer-chasing array)                 |
//! | `x2`         | `floatArr`                                    |
//! | `x9`/`w9`    | chase A index (the last value loaded)         |
//! | `x10`/`w10`  | chase B index (the last value loaded)         |
//! | `s16`/`v16`  | payload loaded from `floatArr`                |
//!
//! Templates may clobber `x11`-`x15` and `v17`-`v31`. The emitter doesn't
//! touch any callee-saved register, so nothing is saved or restored.

use crate::dialect::Dialect;
use crate::emit::{ line, verbatim, DialectEmitter, EmitOptions, FunctionDesc };
use crate::error::Result;
use crate::template::{ unroll, ChaseLoad };

pub struct ArmEmitter {
    opts: EmitOptions,
}
impl ArmEmitter {
    pub fn new(opts: EmitOptions) -> Self {
        Self { opts }
    }

    fn emit_chase(&self, out: &mut String, idx: &str, load: ChaseLoad) {
        line(out, &format!("ldr {idx}, [x1, {idx}, uxtw #2]"));
        match load {
            ChaseLoad::None => {},
            ChaseLoad::Scalar => {
                line(out, &format!("ldr s16, [x2, {idx}, uxtw #2]"));
            },
            ChaseLoad::Vector256 => {
                line(out, &format!("ldr s16, [x2, {idx}, uxtw #2]"));
                line(out, "dup v16.4s, v16.s[0]");
            },
        }
    }
}

impl DialectEmitter for ArmEmitter {
    fn dialect(&self) -> Dialect { Dialect::Arm }

    fn emit_header(&self, out: &mut String) {
        out.push_str(".text\n\n");
    }

    fn render_function(&self, out: &mut String, desc: &FunctionDesc<'_>)
        -> Result<()>
    {
        let label = desc.label();
        line(out, &format!(".global {}", label));
        line(out, ".p2align 2");
        out.push_str(&label);
        out.push_str(":\n");

        line(out, "mov w9, wzr");
        line(out, "mov w10, #1");
        verbatim(out, desc.templates.prologue.iter().map(String::as_str));
        line(out, "cbz x0, 2f");

        if let Some(log2) = self.opts.loop_align {
            line(out, &format!(".p2align {}", log2));
        }
        out.push_str("1:\n");

        self.emit_chase(out, "w9", desc.chase);
        verbatim(out, unroll(&desc.templates.primary, desc.count));
        self.emit_chase(out, "w10", desc.chase);
        verbatim(out, unroll(desc.templates.second_block(), desc.count));

        line(out, "sub x0, x0, #1");
        line(out, "cbnz x0, 1b");
        out.push_str("2:\n");
        line(out, "ret");
        out.push('\n');
        Ok(())
    }
}
