use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Location {
    /// The file (or module name) the location points into.
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self { file: file.into(), line, column }
    }

    /// A location that only knows its line, used for synthesized nodes.
    pub fn at_line(line: usize) -> Self {
        Self { file: String::new(), line, column: 0 }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.file.is_empty(), self.column) {
            (true, 0) => write!(f, "line {}", self.line),
            (true, col) => write!(f, "{}:{}", self.line, col),
            (false, 0) => write!(f, "{}:{}", self.file, self.line),
            (false, col) => write!(f, "{}:{}:{}", self.file, self.line, col),
        }
    }
}
