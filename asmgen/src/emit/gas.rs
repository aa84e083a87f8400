//! x86-64 AT&T syntax for GNU as (System V calling convention).

use crate::dialect::Dialect;
use crate::emit::x86::{ self, X86Abi, X86Frame, X86Syntax };
use crate::emit::{ line, DialectEmitter, EmitOptions, FunctionDesc };
use crate::error::Result;

pub struct X86GccEmitter {
    opts: EmitOptions,
}
impl X86GccEmitter {
    pub fn new(opts: EmitOptions) -> Self {
        Self { opts }
    }
}

impl X86Frame for X86GccEmitter {
    fn syntax(&self) -> X86Syntax { X86Syntax::gas() }
    fn abi(&self) -> &'static X86Abi { &X86Abi::SYSV }
    fn opts(&self) -> &EmitOptions { &self.opts }

    fn emit_label(&self, out: &mut String, label: &str) {
        line(out, &format!(".global {}", label));
        out.push_str(label);
        out.push_str(":\n");
    }

    fn emit_align(&self, out: &mut String, log2: u32) {
        line(out, &format!(".p2align {}", log2));
    }

    // Numeric local labels can be redefined, so every function uses '1'.
    fn emit_loop_label(&self, out: &mut String) {
        out.push_str("1:\n");
    }

    fn emit_loop_branch(&self, out: &mut String) {
        line(out, "jne 1b");
    }

    fn emit_skip_branch(&self, out: &mut String) {
        line(out, "jz 2f");
    }

    fn emit_exit_label(&self, out: &mut String) {
        out.push_str("2:\n");
    }
}

impl DialectEmitter for X86GccEmitter {
    fn dialect(&self) -> Dialect { Dialect::X86Gcc }

    fn emit_header(&self, out: &mut String) {
        out.push_str(".text\n\n");
    }

    fn render_function(&self, out: &mut String, desc: &FunctionDesc<'_>)
        -> Result<()>
    {
        x86::render(self, out, desc)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::template::{ ChaseLoad, TemplateSet };

    fn render(count: usize, t: &TemplateSet, chase: ChaseLoad) -> String {
        let mut out = String::new();
        X86GccEmitter::new(EmitOptions::default())
            .emit_function(&mut out, "fadd256sched", count, Some(t), chase)
            .unwrap();
        out
    }

    fn adds() -> TemplateSet {
        TemplateSet::new(&[
            "  vaddps %ymm0, %ymm1, %ymm1",
            "  vaddps %ymm0, %ymm2, %ymm2",
            "  vaddps %ymm0, %ymm3, %ymm3",
        ])
    }

    #[test]
    fn function_shape() {
        let out = render(5, &adds(), ChaseLoad::Vector256);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "  .global fadd256sched5");
        assert_eq!(lines[1], "fadd256sched5:");
        assert!(lines.contains(&"  .p2align 6"));
        assert!(lines.contains(&"1:"));
        assert!(lines.contains(&"  jne 1b"));
        assert!(out.contains("vbroadcastss"));
        assert!(out.contains("vzeroupper"));
        assert_eq!(lines.iter().filter(|l| l.starts_with("  ret")).count(), 1);

        // Two blocks of five lines each, cycling through the template
        let fill: Vec<&str> = lines.iter().copied()
            .filter(|l| l.contains("vaddps")).collect();
        assert_eq!(fill.len(), 10);
        assert_eq!(fill[3], "  vaddps %ymm0, %ymm1, %ymm1");
        assert_eq!(fill[4], "  vaddps %ymm0, %ymm2, %ymm2");
        assert_eq!(fill[5], "  vaddps %ymm0, %ymm1, %ymm1");
    }

    #[test]
    fn saves_match_restores() {
        let out = render(1, &adds(), ChaseLoad::None);
        let pushes: Vec<&str> = out.lines()
            .filter_map(|l| l.trim().strip_prefix("push ")).collect();
        let mut pops: Vec<&str> = out.lines()
            .filter_map(|l| l.trim().strip_prefix("pop ")).collect();
        pops.reverse();
        assert_eq!(pushes.len(), X86Abi::SYSV.saved.len());
        assert_eq!(pushes, pops);
        assert!(!out.contains("vzeroupper"));
        assert!(!out.contains("vbroadcastss"));
    }

    #[test]
    fn no_alignment() {
        let mut out = String::new();
        X86GccEmitter::new(EmitOptions::default().loop_align(None))
            .emit_function(&mut out, "p", 1, Some(&adds()), ChaseLoad::None)
            .unwrap();
        assert!(!out.contains(".p2align"));
    }

    #[test]
    fn zero_iterations_skip_loop() {
        let out = render(2, &adds(), ChaseLoad::None);
        let lines: Vec<&str> = out.lines().collect();
        let pos = |x: &str| lines.iter().position(|l| *l == x).unwrap();
        assert!(lines[pos("  jz 2f") - 1].starts_with("  test %rdi, %rdi"));
        assert!(pos("  jz 2f") < pos("1:"));
        assert_eq!(pos("2:"), pos("  jne 1b") + 1);
        assert!(lines[pos("2:") + 1..].iter().any(|l| l.starts_with("  ret")));
    }

    #[test]
    fn deterministic() {
        let a = render(12, &adds(), ChaseLoad::Vector256);
        let b = render(12, &adds(), ChaseLoad::Vector256);
        assert_eq!(a, b);
    }
}
