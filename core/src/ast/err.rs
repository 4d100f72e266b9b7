use crate::error::{Level, ScenicErrorExt};
use crate::location::Location;

use super::Rule;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} (at {location})")]
pub struct SyntaxError {
    message: String,
    location: Location,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, location: Location) -> Self {
        SyntaxError {
            message: message.into(),
            location,
        }
    }

    pub(crate) fn from_pest(err: pest::error::Error<Rule>, file: &str) -> Self {
        let (line, column) = match err.line_col {
            pest::error::LineColLocation::Pos(pos) => pos,
            pest::error::LineColLocation::Span(start, _) => start,
        };
        SyntaxError {
            message: err.variant.message().to_string(),
            location: Location::new(file, line, column),
        }
    }

    pub fn line(&self) -> usize {
        self.location.line
    }
}

impl ScenicErrorExt for SyntaxError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn issuer(&self) -> String {
        "scenic.ast".to_string()
    }

    fn location(&self) -> Option<Location> {
        Some(self.location.clone())
    }
}
