//! Dialect emitters.
//!
//! Every emitter renders the same function shape (see [DialectEmitter]).
//! The differences between dialects are limited to the calling convention,
//! the syntax, and the loop/label idiom.

pub mod arm;
pub mod gas;
pub mod nasm;
pub mod x86;

use tracing::debug;

use crate::dialect::Dialect;
use crate::error::{ GenError, Result };
use crate::probe::check_name;
use crate::sweep::CountSweep;
use crate::template::{ ChaseLoad, TemplateSet };

pub use arm::ArmEmitter;
pub use gas::X86GccEmitter;
pub use nasm::X86NasmEmitter;

/// Options shared by all emitters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmitOptions {
    /// Align the top of the measured loop to a `1 << n` byte boundary.
    pub loop_align: Option<u32>,
}
impl EmitOptions {
    /// Align the loop to a 64B boundary.
    pub const DEFAULT_LOOP_ALIGN: u32 = 6;

    pub fn loop_align(mut self, x: Option<u32>) -> Self {
        self.loop_align = x;
        self
    }
}
impl Default for EmitOptions {
    fn default() -> Self {
        Self { loop_align: Some(Self::DEFAULT_LOOP_ALIGN) }
    }
}

/// Everything an emitter needs to render a single function.
#[derive(Clone, Copy, Debug)]
pub struct FunctionDesc<'a> {
    /// Probe name (used as the symbol prefix)
    pub name: &'a str,

    /// Number of template lines after each pointer-chasing load
    pub count: usize,

    pub templates: &'a TemplateSet,

    pub chase: ChaseLoad,
}
impl FunctionDesc<'_> {
    /// The exported symbol for this function.
    pub fn label(&self) -> String {
        crate::probe::label(self.name, self.count)
    }
}

/// Renders probes into assembly for one [Dialect].
///
/// Generated Function Shape
/// ========================
///
/// Each function is called with `(iterations, arr, floatArr)` and runs
/// `iterations` trips through a loop that looks like this:
///
/// ```text
/// loop:
///     idx_a = arr[idx_a]            ; chase A (starts at 0)
///     payload = floatArr[idx_a]     ; depending on [ChaseLoad]
///     <count lines of the primary template>
///     idx_b = arr[idx_b]            ; chase B (starts at 1)
///     payload = floatArr[idx_b]
///     <count lines of the secondary template>
/// ```
///
/// The loop is guarded: with `iterations == 0` the function returns
/// without running it.
///
/// The two chases are independent. When `arr` holds a random cycle which
/// doesn't fit in cache, both loads miss; the second miss can only overlap
/// with the first when every line dependent on the first load fits in the
/// scheduler.
///
/// Rendering never appends partial output. When an emitter returns an
/// error, the output buffer is left untouched.
pub trait DialectEmitter {
    fn dialect(&self) -> Dialect;

    /// Emit directives which must appear once at the top of a source file.
    fn emit_header(&self, out: &mut String);

    /// Render a single function without any validation.
    fn render_function(&self, out: &mut String, desc: &FunctionDesc<'_>)
        -> Result<()>;

    /// Append a line comment.
    fn comment(&self, out: &mut String, text: &str) {
        out.push_str(self.dialect().comment());
        out.push(' ');
        out.push_str(text);
        out.push('\n');
    }

    /// Render the function `<name><count>`.
    fn emit_function(&self,
        out: &mut String,
        name: &str,
        count: usize,
        templates: Option<&TemplateSet>,
        chase: ChaseLoad,
    ) -> Result<()>
    {
        let templates = self.check(name, templates)?;
        if count == 0 {
            return Err(GenError::ZeroCount(name.to_string()));
        }
        let mut buf = String::new();
        let desc = FunctionDesc { name, count, templates, chase };
        self.render_function(&mut buf, &desc)?;
        out.push_str(&buf);
        Ok(())
    }

    /// Render one function for every count in the sweep.
    fn emit_sweep(&self,
        out: &mut String,
        name: &str,
        counts: &CountSweep,
        templates: Option<&TemplateSet>,
        chase: ChaseLoad,
    ) -> Result<()>
    {
        let templates = self.check(name, templates)?;
        let mut buf = String::new();
        for count in counts.iter() {
            let desc = FunctionDesc { name, count, templates, chase };
            self.render_function(&mut buf, &desc)?;
            debug!(dialect = %self.dialect(), label = %desc.label(),
                "rendered function");
        }
        out.push_str(&buf);
        Ok(())
    }

    /// Common validation for [DialectEmitter::emit_function] and
    /// [DialectEmitter::emit_sweep].
    fn check<'a>(&self, name: &str, templates: Option<&'a TemplateSet>)
        -> Result<&'a TemplateSet>
    {
        check_name(name)?;
        let templates = templates.ok_or_else(|| GenError::DialectUnsupported {
            probe: name.to_string(),
            dialect: self.dialect(),
        })?;
        templates.check().map_err(|defect| GenError::MalformedTemplate {
            probe: name.to_string(),
            dialect: self.dialect(),
            defect,
        })?;
        Ok(templates)
    }
}

/// Return the emitter for some [Dialect].
pub fn emitter_for(dialect: Dialect, opts: EmitOptions)
    -> Box<dyn DialectEmitter>
{
    match dialect {
        Dialect::X86Gcc  => Box::new(X86GccEmitter::new(opts)),
        Dialect::X86Nasm => Box::new(X86NasmEmitter::new(opts)),
        Dialect::Arm     => Box::new(ArmEmitter::new(opts)),
    }
}

/// Append one indented line.
pub(crate) fn line(out: &mut String, text: &str) {
    out.push_str("  ");
    out.push_str(text);
    out.push('\n');
}

/// Append template lines verbatim.
pub(crate) fn verbatim<'a>(out: &mut String, lines: impl Iterator<Item=&'a str>) {
    for l in lines {
        out.push_str(l);
        out.push('\n');
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::TemplateDefect;
    use crate::template::Block;

    fn fadd() -> TemplateSet {
        TemplateSet::new(&[
            "  fadd s17, s17, s16",
            "  fadd s18, s18, s16",
        ])
    }

    #[test]
    fn unsupported_leaves_buffer() {
        for dialect in Dialect::ALL {
            let e = emitter_for(dialect, EmitOptions::default());
            let mut out = String::from("keep\n");
            let sweep = CountSweep::generate(1, 4, 1).unwrap();
            let res = e.emit_sweep(&mut out, "probe", &sweep, None, ChaseLoad::None);
            assert_eq!(res, Err(GenError::DialectUnsupported {
                probe: "probe".to_string(),
                dialect,
            }));
            assert_eq!(out, "keep\n");
        }
    }

    #[test]
    fn malformed_leaves_buffer() {
        let e = emitter_for(Dialect::Arm, EmitOptions::default());
        let mut out = String::new();
        let empty = TemplateSet::new(&[]);
        let res = e.emit_function(&mut out, "probe", 4, Some(&empty),
            ChaseLoad::None);
        assert!(matches!(res, Err(GenError::MalformedTemplate {
            defect: TemplateDefect::Empty(Block::Primary), ..
        })));
        assert!(out.is_empty());
    }

    #[test]
    fn zero_count() {
        let e = emitter_for(Dialect::Arm, EmitOptions::default());
        let mut out = String::new();
        let res = e.emit_function(&mut out, "faddsched", 0, Some(&fadd()),
            ChaseLoad::Scalar);
        assert_eq!(res, Err(GenError::ZeroCount("faddsched".to_string())));
        assert!(out.is_empty());
    }

    #[test]
    fn bad_name() {
        let e = emitter_for(Dialect::Arm, EmitOptions::default());
        let mut out = String::new();
        let res = e.emit_function(&mut out, "fadd sched", 4, Some(&fadd()),
            ChaseLoad::Scalar);
        assert_eq!(res, Err(GenError::InvalidName("fadd sched".to_string())));
    }

    #[test]
    fn sweep_matches_functions() {
        let e = emitter_for(Dialect::Arm, EmitOptions::default());
        let sweep = CountSweep::generate(2, 10, 3).unwrap();
        let mut all = String::new();
        e.emit_sweep(&mut all, "faddsched", &sweep, Some(&fadd()),
            ChaseLoad::Scalar).unwrap();
        let mut each = String::new();
        for count in sweep.iter() {
            e.emit_function(&mut each, "faddsched", count, Some(&fadd()),
                ChaseLoad::Scalar).unwrap();
        }
        assert_eq!(all, each);
    }
}
