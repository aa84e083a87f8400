//! Shared x86-64 rendering for the GAS and NASM emitters.
//!
//! Instructions owned by the emitter (register saves, argument moves,
//! pointer-chasing loads, loop control) are built as [Instruction] values
//! and printed with an iced-x86 formatter. Both x86 dialects therefore
//! produce the same machine code around the probe's templates.
//!
//! Register Environment
//! ====================
//!
//! After the prologue, both x86 dialects see the same registers:
//!
//! | Register       | Contents                                     |
//! |----------------|----------------------------------------------|
//! | `rdi`          | remaining iterations                         |
//! | `rsi`          | `arr` (pointer-chasing array)                |
//! | `rdx`          | `floatArr`                                   |
//! | `r15`          | chase A index (the last value loaded)        |
//! | `r14`          | chase B index (the last value loaded)        |
//! | `xmm0`/`ymm0`  | payload loaded from `floatArr`               |
//!
//! Templates may clobber `rax`, `rbx`, `rcx`, `r8`-`r13` and vector
//! registers 1-5. Anything else must be preserved by the template.

use iced_x86::{
    Code,
    Formatter,
    GasFormatter,
    Instruction,
    MemoryOperand,
    NasmFormatter,
    Register,
};

use crate::emit::{ line, verbatim, EmitOptions, FunctionDesc };
use crate::error::Result;
use crate::template::{ unroll, ChaseLoad };

pub const ITERATIONS: Register = Register::RDI;
pub const ARR: Register        = Register::RSI;
pub const FLOAT_ARR: Register  = Register::RDX;
pub const CHASE_A: Register    = Register::R15;
pub const CHASE_B: Register    = Register::R14;

const CHASE_A_32: Register     = Register::R15D;
const CHASE_B_32: Register     = Register::R14D;

/// Which x86 syntax to print emitter-owned instructions with.
pub enum X86Syntax {
    Gas(GasFormatter),
    Nasm(NasmFormatter),
}
impl X86Syntax {
    pub fn gas() -> Self {
        let mut f = GasFormatter::new();
        f.options_mut().set_space_after_operand_separator(true);
        Self::Gas(f)
    }

    pub fn nasm() -> Self {
        let mut f = NasmFormatter::new();
        f.options_mut().set_space_after_operand_separator(true);
        Self::Nasm(f)
    }

    /// Append one formatted instruction.
    pub fn emit(&mut self, out: &mut String, instr: &Instruction) {
        let mut text = String::new();
        match self {
            Self::Gas(f)  => f.format(instr, &mut text),
            Self::Nasm(f) => f.format(instr, &mut text),
        }
        line(out, &text);
    }

    pub fn emit_all(&mut self, out: &mut String, instrs: &[Instruction]) {
        for instr in instrs {
            self.emit(out, instr);
        }
    }
}

/// Calling-convention details which differ between the x86 dialects.
pub struct X86Abi {
    /// Callee-saved registers which are pushed on entry (and popped in
    /// reverse order before returning).
    pub saved: &'static [Register],

    /// Moves placing the arguments into [ITERATIONS], [ARR] and
    /// [FLOAT_ARR], in order.
    pub arg_moves: &'static [(Register, Register)],
}
impl X86Abi {
    /// System V AMD64: arguments already arrive in `rdi`, `rsi`, `rdx`.
    pub const SYSV: Self = Self {
        saved: &[
            Register::RBX, Register::R12, Register::R13,
            Register::R14, Register::R15,
        ],
        arg_moves: &[],
    };

    /// Microsoft x64: arguments arrive in `rcx`, `rdx`, `r8`.
    pub const WIN64: Self = Self {
        saved: &[
            Register::RBX, Register::RSI, Register::RDI, Register::R12,
            Register::R13, Register::R14, Register::R15,
        ],
        arg_moves: &[
            (ITERATIONS, Register::RCX),
            (ARR, Register::RDX),
            (FLOAT_ARR, Register::R8),
        ],
    };
}

/// Dialect-specific text around the shared instruction sequence.
pub trait X86Frame {
    fn syntax(&self) -> X86Syntax;
    fn abi(&self) -> &'static X86Abi;
    fn opts(&self) -> &EmitOptions;

    /// Export and define the function label.
    fn emit_label(&self, out: &mut String, label: &str);

    /// Alignment directive for the top of the loop.
    fn emit_align(&self, out: &mut String, log2: u32);

    /// Define the loop label.
    fn emit_loop_label(&self, out: &mut String);

    /// Branch back to the loop label while the last result was non-zero.
    fn emit_loop_branch(&self, out: &mut String);

    /// Branch to the exit label when the last result was zero.
    fn emit_skip_branch(&self, out: &mut String);

    /// Define the exit label (right after the loop).
    fn emit_exit_label(&self, out: &mut String);
}

/// Instructions run once before entering the loop.
fn prologue(abi: &X86Abi) -> Result<Vec<Instruction>> {
    let mut res = Vec::new();
    for reg in abi.saved {
        res.push(Instruction::with1(Code::Push_r64, *reg)?);
    }
    for (dst, src) in abi.arg_moves {
        res.push(Instruction::with2(Code::Mov_r64_rm64, *dst, *src)?);
    }
    res.push(Instruction::with2(Code::Xor_r32_rm32, CHASE_A_32, CHASE_A_32)?);
    res.push(Instruction::with2(Code::Mov_r32_imm32, CHASE_B_32, 1i32)?);
    Ok(res)
}

/// A pointer-chasing load, followed by the payload load.
fn chase(idx32: Register, idx: Register, load: ChaseLoad)
    -> Result<Vec<Instruction>>
{
    let mut res = vec![
        Instruction::with2(Code::Mov_r32_rm32, idx32,
            MemoryOperand::with_base_index_scale(ARR, idx, 4))?,
    ];
    let payload = MemoryOperand::with_base_index_scale(FLOAT_ARR, idx, 4);
    match load {
        ChaseLoad::None => {},
        ChaseLoad::Scalar => {
            res.push(Instruction::with2(Code::Movss_xmm_xmmm32,
                Register::XMM0, payload)?);
        },
        ChaseLoad::Vector256 => {
            res.push(Instruction::with2(Code::VEX_Vbroadcastss_ymm_m32,
                Register::YMM0, payload)?);
        },
    }
    Ok(res)
}

/// Instructions run once after leaving the loop.
fn epilogue(abi: &X86Abi, load: ChaseLoad) -> Result<Vec<Instruction>> {
    let mut res = Vec::new();
    for reg in abi.saved.iter().rev() {
        res.push(Instruction::with1(Code::Pop_r64, *reg)?);
    }
    if load == ChaseLoad::Vector256 {
        res.push(Instruction::with(Code::VEX_Vzeroupper));
    }
    res.push(Instruction::with(Code::Retnq));
    Ok(res)
}

/// Render one function in the shape described by
/// [crate::emit::DialectEmitter].
pub fn render<F: X86Frame + ?Sized>(frame: &F, out: &mut String,
    desc: &FunctionDesc<'_>) -> Result<()>
{
    let mut syntax = frame.syntax();
    let abi = frame.abi();

    frame.emit_label(out, &desc.label());
    syntax.emit_all(out, &prologue(abi)?);
    verbatim(out, desc.templates.prologue.iter().map(String::as_str));

    // Zero iterations never enter the loop
    syntax.emit(out, &Instruction::with2(Code::Test_rm64_r64, ITERATIONS,
        ITERATIONS)?);
    frame.emit_skip_branch(out);

    if let Some(log2) = frame.opts().loop_align {
        frame.emit_align(out, log2);
    }
    frame.emit_loop_label(out);

    syntax.emit_all(out, &chase(CHASE_A_32, CHASE_A, desc.chase)?);
    verbatim(out, unroll(&desc.templates.primary, desc.count));
    syntax.emit_all(out, &chase(CHASE_B_32, CHASE_B, desc.chase)?);
    verbatim(out, unroll(desc.templates.second_block(), desc.count));

    syntax.emit(out, &Instruction::with1(Code::Dec_rm64, ITERATIONS)?);
    frame.emit_loop_branch(out);
    frame.emit_exit_label(out);

    syntax.emit_all(out, &epilogue(abi, desc.chase)?);
    out.push('\n');
    Ok(())
}
