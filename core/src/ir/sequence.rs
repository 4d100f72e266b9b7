use serde::{Deserialize, Serialize};

use super::op::{Step, Var};

/// The lowered body of one declaration: an ordered list of build steps with
/// a single entry and a single trailing `Return` of the root object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionSequence {
    name: String,
    line: usize,
    doc: Option<String>,
    var_count: usize,
    steps: Vec<Step>,
}

impl InstructionSequence {
    pub(crate) fn new(name: String, line: usize, doc: Option<String>, var_count: usize, steps: Vec<Step>) -> Self {
        InstructionSequence {
            name,
            line,
            doc,
            var_count,
            steps,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Number of synthetic variables the sequence uses.
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The variable returned by the trailing `Return`.
    pub fn root(&self) -> Option<Var> {
        match self.steps.last() {
            Some(Step::Return { src }) => Some(*src),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl std::fmt::Display for InstructionSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}(identifiers, toolkit) @{} [{} vars]", self.name, self.line, self.var_count)?;
        for (i, step) in self.steps.iter().enumerate() {
            writeln!(f, "  {:>3}: {}", i, step)?;
        }
        Ok(())
    }
}
