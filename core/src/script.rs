use std::path::{Path, PathBuf};

use crate::error::{Level, ScenicErrorExt};
use crate::location::Location;

/// A `.scn` source file loaded into memory.
#[derive(Debug, Clone)]
pub struct Script {
    pub name: String,
    pub path: PathBuf,
    pub content: String,
}

impl Script {
    pub fn new(path: PathBuf) -> Result<Self, ScriptError> {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let content = std::fs::read_to_string(&path).map_err(|e| ScriptError::Missing {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Script { name, path, content })
    }

    /// Wraps in-memory source, e.g. for tests or sources fetched elsewhere.
    pub fn from_source(name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        Script {
            path: PathBuf::from(&name),
            name,
            content: content.into(),
        }
    }

    /// Expands a glob pattern (or plain path) into loaded scripts, sorted by path.
    pub fn discover(pattern: &str) -> Result<Vec<Script>, ScriptError> {
        let paths = glob::glob(pattern).map_err(|e| ScriptError::Pattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        let mut found: Vec<PathBuf> = paths.filter_map(Result::ok).filter(|p| p.is_file()).collect();
        if found.is_empty() {
            return Err(ScriptError::Missing {
                path: PathBuf::from(pattern),
                reason: "no file matches".to_string(),
            });
        }
        found.sort();
        found.into_iter().map(Script::new).collect()
    }

    /// Dotted module name derived from the file stem (`views/main.scn` -> `main`).
    pub fn module_name(&self) -> String {
        Path::new(&self.name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.name.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Script: {} at {:?}", self.name, self.path)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ScriptError {
    #[error("Missing script at {path:?}: {reason}")]
    Missing { path: PathBuf, reason: String },
    #[error("Invalid script pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },
}

impl ScenicErrorExt for ScriptError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        "scenic.script".to_string()
    }

    fn location(&self) -> Option<Location> {
        match self {
            ScriptError::Missing { path, .. } => Some(Location::new(path.display().to_string(), 0, 0)),
            ScriptError::Pattern { .. } => None,
        }
    }
}
