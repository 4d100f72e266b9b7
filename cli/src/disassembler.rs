//! Human-readable listings of lowered declarations.
use std::fmt::Write;

use scenic_core::InstructionSequence;
use scenic_core::ir::Step;

/// Renders a sequence as numbered steps, with the stack program of every
/// binding indented below it.
pub fn disassemble(sequence: &InstructionSequence) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} @ line {} ({} vars, {} steps)",
        sequence.name(),
        sequence.line(),
        sequence.var_count(),
        sequence.len()
    );
    if let Some(doc) = sequence.doc() {
        let _ = writeln!(out, "  ; {}", doc);
    }
    for (index, step) in sequence.steps().iter().enumerate() {
        let _ = writeln!(out, "{:04}  {}", index, step);
        if let Step::Bind { compiled, .. } = step {
            for (pc, op) in compiled.ops.iter().enumerate() {
                let _ = writeln!(out, "        {:02}  {}", pc, op);
            }
        }
    }
    out
}
