//! Target assembler dialects.

use std::fmt;

/// A target syntax/toolchain combination.
///
/// Each dialect implies a calling convention for the generated functions:
///
/// | Dialect   | Toolchain         | Syntax | ABI            |
/// |-----------|-------------------|--------|----------------|
/// | `X86Gcc`  | GNU as / gcc      | AT&T   | System V AMD64 |
/// | `X86Nasm` | NASM              | Intel  | Microsoft x64  |
/// | `Arm`     | GNU as (aarch64)  | ARM    | AAPCS64        |
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, clap::ValueEnum)]
pub enum Dialect {
    /// x86-64 AT&T syntax for GNU as
    X86Gcc,
    /// x86-64 Intel syntax for NASM
    X86Nasm,
    /// AArch64 syntax for GNU as
    Arm,
}
impl Dialect {
    pub const ALL: [Self; 3] = [ Self::X86Gcc, Self::X86Nasm, Self::Arm ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::X86Gcc  => "x86-gcc",
            Self::X86Nasm => "x86-nasm",
            Self::Arm     => "arm",
        }
    }

    /// Line comment marker.
    pub fn comment(&self) -> &'static str {
        match self {
            Self::X86Gcc  => "#",
            Self::X86Nasm => ";",
            Self::Arm     => "//",
        }
    }

    /// Suffix for the generated assembly source file.
    pub fn source_suffix(&self) -> &'static str {
        match self {
            Self::X86Gcc  => "_x86.s",
            Self::X86Nasm => "_x86.asm",
            Self::Arm     => "_arm.s",
        }
    }

    /// Suffix for the generated harness declarations.
    pub fn header_suffix(&self) -> &'static str {
        match self {
            Self::X86Gcc  => "_x86_gcc.h",
            Self::X86Nasm => "_x86_nasm.h",
            Self::Arm     => "_arm.h",
        }
    }

    pub fn is_x86(&self) -> bool {
        matches!(self, Self::X86Gcc | Self::X86Nasm)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
