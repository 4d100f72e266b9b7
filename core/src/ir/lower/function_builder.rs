use crate::ir::op::{Step, Var};
use crate::ir::sequence::InstructionSequence;

/// A per-declaration lowering helper: a monotonic synthetic-variable
/// allocator, the stack of objects currently under construction, and the
/// step buffer. `finish` seals it into an `InstructionSequence`.
pub struct FunctionBuilder {
    next_var: usize,
    name_stack: Vec<Var>,
    steps: Vec<Step>,
}

impl Default for FunctionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionBuilder {
    pub fn new() -> Self {
        FunctionBuilder {
            next_var: 0,
            name_stack: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Allocates a fresh variable; numbers are never reused within one builder.
    pub fn alloc_var(&mut self) -> Var {
        let v = Var(self.next_var);
        self.next_var += 1;
        v
    }

    pub fn push_target(&mut self, var: Var) {
        self.name_stack.push(var);
    }

    pub fn pop_target(&mut self) -> Option<Var> {
        self.name_stack.pop()
    }

    /// The object currently under construction.
    pub fn current_target(&self) -> Option<Var> {
        self.name_stack.last().copied()
    }

    pub fn emit(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn finish(self, name: &str, line: usize, doc: Option<String>) -> InstructionSequence {
        InstructionSequence::new(name.to_string(), line, doc, self.next_var, self.steps)
    }
}
