use std::fmt;

use serde::{Deserialize, Serialize};

use crate::location::Location;

use super::kind::AstNodeKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstNode {
    pub kind: AstNodeKind,
    pub location: Option<Location>,
}

impl AstNode {
    pub fn new(kind: AstNodeKind, location: Option<Location>) -> Self {
        AstNode { kind, location }
    }

    /// Shorthand for nodes built by hand, which only carry a line number.
    pub fn at_line(kind: AstNodeKind, line: usize) -> Self {
        AstNode {
            kind,
            location: Some(Location::at_line(line)),
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn get_kind(&self) -> &AstNodeKind {
        &self.kind
    }

    pub fn get_location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Source line of the node, 0 when unknown.
    pub fn line(&self) -> usize {
        self.location.as_ref().map(|l| l.line).unwrap_or(0)
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_node(f: &mut fmt::Formatter<'_>, node: &AstNode, indent: usize) -> fmt::Result {
            for _ in 0..indent {
                write!(f, "  ")?;
            }
            match &node.kind {
                AstNodeKind::Module { doc, .. } => write!(f, "Module doc={:?}", doc)?,
                AstNodeKind::HostBlock { code } => write!(f, "HostBlock ({} bytes)", code.len())?,
                AstNodeKind::Import { code } => write!(f, "Import {}", code.trim())?,
                AstNodeKind::Declaration { name, base, identifier, .. } => {
                    write!(f, "Declaration {}({})", name, base)?;
                    if let Some(id) = identifier {
                        write!(f, " id={}", id)?;
                    }
                }
                AstNodeKind::Instantiation { name, identifier, .. } => {
                    write!(f, "Instantiation {}", name)?;
                    if let Some(id) = identifier {
                        write!(f, " id={}", id)?;
                    }
                }
                AstNodeKind::AttributeDeclaration { name, type_name, is_event, .. } => {
                    let keyword = if *is_event { "event" } else { "attr" };
                    write!(f, "{} {}", keyword, name)?;
                    if let Some(ty) = type_name {
                        write!(f, ": {}", ty)?;
                    }
                }
                AstNodeKind::AttributeBinding { name, binding } => {
                    write!(f, "{} {} {}", name, binding.op, binding.expr.source)?
                }
            }
            writeln!(f, " @{}", node.line())?;

            if let AstNodeKind::AttributeDeclaration { default: Some(default), .. } = &node.kind {
                write_node(f, default, indent + 1)?;
            }
            if let Some(body) = node.kind.body() {
                for child in body {
                    write_node(f, child, indent + 1)?;
                }
            }
            Ok(())
        }

        write_node(f, self, 0)
    }
}
