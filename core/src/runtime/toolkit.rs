use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::ast::SymbolPath;

use super::err::BuildError;
use super::scope::Namespace;
use super::value::Value;

/// The read-only symbol table builds resolve class, type and operator
/// symbols against. Cheap to clone and shareable across threads.
#[derive(Clone, Default)]
pub struct Toolkit {
    symbols: Arc<HashMap<String, Value>>,
}

impl Toolkit {
    pub fn new(symbols: HashMap<String, Value>) -> Self {
        Toolkit {
            symbols: Arc::new(symbols),
        }
    }

    pub fn builder() -> ToolkitBuilder {
        ToolkitBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.symbols.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.symbols.keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolves a possibly dotted symbol: the head is looked up in the
    /// toolkit first, then in `fallback`; every remaining part is an
    /// attribute access on the previous value.
    pub fn resolve(&self, symbol: &SymbolPath, fallback: &Namespace) -> Result<Value, BuildError> {
        let unresolved = || BuildError::UnresolvedSymbol {
            name: symbol.to_string(),
            line: None,
        };
        let head = symbol.head().ok_or_else(unresolved)?;
        let mut value = self
            .get(head)
            .or_else(|| fallback.get(head))
            .ok_or_else(unresolved)?;
        for part in &symbol.parts[1..] {
            value = value.attribute(part).ok_or_else(unresolved)?;
        }
        Ok(value)
    }
}

impl fmt::Debug for Toolkit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Toolkit").field(&self.names()).finish()
    }
}

#[derive(Default)]
pub struct ToolkitBuilder {
    symbols: HashMap<String, Value>,
}

impl ToolkitBuilder {
    pub fn symbol(mut self, name: impl Into<String>, value: Value) -> Self {
        self.symbols.insert(name.into(), value);
        self
    }

    pub fn build(self) -> Toolkit {
        Toolkit::new(self.symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toolkit_shadows_namespace() {
        let toolkit = Toolkit::builder().symbol("x", Value::Int(1)).build();
        let ns = Namespace::new("m");
        ns.set("x", Value::Int(2));
        ns.set("y", Value::Int(3));
        assert_eq!(toolkit.resolve(&SymbolPath::parse("x"), &ns).ok(), Some(Value::Int(1)));
        assert_eq!(toolkit.resolve(&SymbolPath::parse("y"), &ns).ok(), Some(Value::Int(3)));
    }

    #[test]
    fn dotted_symbol_walks_modules() {
        let inner = Namespace::new("widgets");
        inner.set("Size", Value::Int(4));
        let ns = Namespace::new("m");
        ns.set("widgets", Value::Module(inner));
        let toolkit = Toolkit::default();
        assert_eq!(
            toolkit.resolve(&SymbolPath::parse("widgets.Size"), &ns).ok(),
            Some(Value::Int(4))
        );
        let err = toolkit.resolve(&SymbolPath::parse("widgets.Missing"), &ns).unwrap_err();
        assert!(matches!(err, BuildError::UnresolvedSymbol { ref name, .. } if name == "widgets.Missing"));
    }
}
