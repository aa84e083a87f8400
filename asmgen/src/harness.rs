//! Declarations for the external C harness.
//!
//! The harness calls each generated function with the probe's
//! [crate::CallSignature], and decides whether to divide measured time by
//! the count. This module renders a header so the call site can't drift
//! from what the emitters generate.
//!
//! For each probe rendered for the dialect, the header contains:
//!
//! - an `extern` prototype for every generated function
//! - `<name>_counts[]`, the sweep
//! - `<name>_funcs[]`, a table of function pointers (parallel to the sweep)
//! - `<name>_normalize_by_count`
//! - `<NAME>_CALL(fn)`, which expands to a call with the harness arguments
//!
//! A function called with `iterations == 0` returns without entering the
//! measured loop.

use std::fmt::Write;

use itertools::Itertools;

use crate::dialect::Dialect;
use crate::suite::Suite;

/// Render the harness header for all probes in `suite` supporting
/// `dialect`.
pub fn render_c_header(suite: &Suite, dialect: Dialect) -> String {
    let guard = format!("ASMGEN_{}_H",
        dialect.name().replace('-', "_").to_ascii_uppercase());
    let mut out = String::new();
    let _ = writeln!(out, "// Generated by asmgen for dialect {}", dialect);
    let _ = writeln!(out, "#ifndef {}", guard);
    let _ = writeln!(out, "#define {}", guard);
    let _ = writeln!(out);
    let _ = writeln!(out, "#include <stdint.h>");
    let _ = writeln!(out);

    // Probes with malformed templates are never rendered
    let probes = suite.supporting(dialect).filter(|p| {
        p.templates(dialect).is_some_and(|t| t.check().is_ok())
    });
    for probe in probes {
        let name = probe.name();
        let sig = probe.signature();
        let labels = probe.labels(dialect);

        let _ = writeln!(out, "// {}", probe.description());
        for label in labels.iter() {
            let _ = writeln!(out, "extern void {}({});", label, sig.params);
        }
        let _ = writeln!(out, "static const int {}_counts[] = {{ {} }};",
            name, probe.counts().iter().join(", "));
        let _ = writeln!(out, "static void (*const {}_funcs[])({}) = {{",
            name, sig.params);
        for label in labels.iter() {
            let _ = writeln!(out, "    {},", label);
        }
        let _ = writeln!(out, "}};");
        let _ = writeln!(out, "static const int {}_normalize_by_count = {};",
            name, probe.normalize_by_count() as u8);
        let _ = writeln!(out, "#define {}_CALL(fn) fn({})",
            name.to_ascii_uppercase(), sig.args);
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "#endif // {}", guard);
    out
}
