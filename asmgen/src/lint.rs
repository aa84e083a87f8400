//! Review helpers for probe templates.
//!
//! Nothing here affects generated code. A template meant to express
//! independent chains should never write the same register twice; this
//! module finds the lines which do, so they can be flagged for review.

use std::collections::HashMap;

use crate::dialect::Dialect;

/// A line writing a register which an earlier line already wrote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReusedDestination {
    /// Index of the offending line
    pub line: usize,
    /// Index of the line which first wrote the register
    pub first: usize,
    /// Normalized register name
    pub register: String,
}

/// Split operands on top-level commas (ignoring commas inside memory
/// operands and register lists).
fn split_operands(s: &str) -> Vec<&str> {
    let mut res = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (idx, c) in s.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ',' if depth == 0 => {
                res.push(s[start..idx].trim());
                start = idx + 1;
            },
            _ => {},
        }
    }
    res.push(s[start..].trim());
    res
}

/// Legacy x86 general-purpose registers and their narrower forms.
const X86_LEGACY: [(&str, &[&str]); 8] = [
    ("rax", &["rax", "eax", "ax", "al", "ah"]),
    ("rbx", &["rbx", "ebx", "bx", "bl", "bh"]),
    ("rcx", &["rcx", "ecx", "cx", "cl", "ch"]),
    ("rdx", &["rdx", "edx", "dx", "dl", "dh"]),
    ("rsi", &["rsi", "esi", "si", "sil"]),
    ("rdi", &["rdi", "edi", "di", "dil"]),
    ("rbp", &["rbp", "ebp", "bp", "bpl"]),
    ("rsp", &["rsp", "esp", "sp", "spl"]),
];

/// Instructions which only write flags.
const COMPARES: &[&str] = &[
    "cmp", "test", "bt", "ptest", "vptest",
    "comiss", "comisd", "ucomiss", "ucomisd",
    "vcomiss", "vcomisd", "vucomiss", "vucomisd",
    "cmn", "tst", "ccmp", "ccmn", "fcmp", "fcmpe", "fccmp", "fccmpe",
];

fn is_compare(dialect: Dialect, mnemonic: &str) -> bool {
    let m = mnemonic.to_ascii_lowercase();
    if COMPARES.contains(&m.as_str()) {
        return true;
    }
    // AT&T operand size suffix, ie. 'cmpq'
    dialect == Dialect::X86Gcc && m.strip_suffix(['b', 'w', 'l', 'q'])
        .is_some_and(|m| COMPARES.contains(&m))
}

/// Fold an x86 general-purpose register onto its 64-bit name
/// (`r8d` -> `r8`, `ecx` -> `rcx`).
fn x86_gpr(reg: &str) -> Option<&'static str> {
    if let Some(rest) = reg.strip_prefix('r') {
        let num = rest.trim_end_matches(['d', 'w', 'b']);
        let suffix = &rest[num.len()..];
        if matches!(suffix, "" | "d" | "w" | "b") {
            const EXT: [&str; 8] = [
                "r8", "r9", "r10", "r11", "r12", "r13", "r14", "r15",
            ];
            if let Ok(n @ 8..=15) = num.parse::<usize>() {
                return Some(EXT[n - 8]);
            }
        }
    }
    X86_LEGACY.iter()
        .find(|(_, names)| names.contains(&reg))
        .map(|(full, _)| *full)
}

/// Map register aliases onto one name (`ymm3`/`xmm3` -> `v3`,
/// `s17`/`d17`/`q17` -> `v17`, `w11` -> `x11`, `r8d` -> `r8`,
/// `eax` -> `rax`).
fn normalize(reg: &str) -> String {
    let reg = reg.trim_start_matches('%').to_ascii_lowercase();
    let num = |prefix: &str| {
        reg.strip_prefix(prefix)
            .filter(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
            .map(str::to_string)
    };
    for p in ["xmm", "ymm", "zmm"] {
        if let Some(n) = num(p) { return format!("v{}", n); }
    }
    for p in ["b", "h", "s", "d", "q", "v"] {
        if let Some(n) = num(p) { return format!("v{}", n); }
    }
    if let Some(n) = num("w") {
        return format!("x{}", n);
    }
    if let Some(full) = x86_gpr(&reg) {
        return full.to_string();
    }
    // AArch64 vector arrangement, ie. 'v16.4s'
    if let Some((base, _)) = reg.split_once('.') {
        return normalize(base);
    }
    reg
}

/// Return the register written by a template line, if any.
///
/// AT&T syntax writes the last operand; NASM and AArch64 write the first.
/// Stores and compares are ignored.
pub fn destination(dialect: Dialect, text: &str) -> Option<String> {
    let text = match text.split_once(dialect.comment()) {
        Some((code, _)) => code,
        None => text,
    };
    let (mnemonic, operands) = text.trim().split_once(char::is_whitespace)?;
    if dialect == Dialect::Arm && mnemonic.starts_with("st") {
        return None;
    }
    if is_compare(dialect, mnemonic) {
        return None;
    }
    let ops = split_operands(operands);
    let dst = match dialect {
        Dialect::X86Gcc => ops.last()?,
        Dialect::X86Nasm | Dialect::Arm => ops.first()?,
    };
    if dst.is_empty() || dst.contains(['(', '[', '{']) {
        return None;
    }
    Some(normalize(dst))
}

/// Find every line writing a register already written by an earlier line.
pub fn reused_destinations(dialect: Dialect, lines: &[String])
    -> Vec<ReusedDestination>
{
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut res = Vec::new();
    for (idx, text) in lines.iter().enumerate() {
        let Some(register) = destination(dialect, text) else { continue };
        match seen.get(&register) {
            Some(&first) => res.push(ReusedDestination { line: idx, first, register }),
            None => { seen.insert(register, idx); },
        }
    }
    res
}
