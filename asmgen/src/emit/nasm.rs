//! x86-64 Intel syntax for NASM (Microsoft x64 calling convention).

use crate::dialect::Dialect;
use crate::emit::x86::{ self, X86Abi, X86Frame, X86Syntax };
use crate::emit::{ line, DialectEmitter, EmitOptions, FunctionDesc };
use crate::error::Result;

pub struct X86NasmEmitter {
    opts: EmitOptions,
}
impl X86NasmEmitter {
    pub fn new(opts: EmitOptions) -> Self {
        Self { opts }
    }
}

impl X86Frame for X86NasmEmitter {
    fn syntax(&self) -> X86Syntax { X86Syntax::nasm() }
    fn abi(&self) -> &'static X86Abi { &X86Abi::WIN64 }
    fn opts(&self) -> &EmitOptions { &self.opts }

    fn emit_label(&self, out: &mut String, label: &str) {
        out.push_str("global ");
        out.push_str(label);
        out.push('\n');
        out.push_str(label);
        out.push_str(":\n");
    }

    fn emit_align(&self, out: &mut String, log2: u32) {
        line(out, &format!("align {}", 1u64 << log2));
    }

    // '.loop' is scoped to the preceding non-local label.
    fn emit_loop_label(&self, out: &mut String) {
        out.push_str(".loop:\n");
    }

    fn emit_loop_branch(&self, out: &mut String) {
        line(out, "jnz .loop");
    }

    fn emit_skip_branch(&self, out: &mut String) {
        line(out, "jz .done");
    }

    fn emit_exit_label(&self, out: &mut String) {
        out.push_str(".done:\n");
    }
}

impl DialectEmitter for X86NasmEmitter {
    fn dialect(&self) -> Dialect { Dialect::X86Nasm }

    fn emit_header(&self, out: &mut String) {
        out.push_str("bits 64\n");
        out.push_str("default rel\n\n");
        out.push_str("section .text\n\n");
    }

    fn render_function(&self, out: &mut String, desc: &FunctionDesc<'_>)
        -> Result<()>
    {
        x86::render(self, out, desc)
    }
}
