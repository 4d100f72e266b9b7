use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::value::Value;

/// The id space of one top-level build: `id:` names to the objects that
/// carry them. Cloning yields another handle to the same map.
#[derive(Clone, Default)]
pub struct IdentifierScope {
    inner: Arc<Mutex<HashMap<String, Value>>>,
}

impl IdentifierScope {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Value>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, name: impl Into<String>, value: Value) {
        self.lock().insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.lock().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Stored names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether both handles point at the same scope.
    pub fn ptr_eq(&self, other: &IdentifierScope) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for IdentifierScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IdentifierScope").field(&self.names()).finish()
    }
}

/// A module namespace: what host code, imports and compiled declarations
/// write into, and the fallback for toolkit resolution.
///
/// Declaration wrappers hold a handle to the namespace they were compiled
/// into while the namespace holds the wrappers, so a namespace that is no
/// longer needed should be `clear`ed to release both.
#[derive(Clone)]
pub struct Namespace {
    inner: Arc<RwLock<HashMap<String, Value>>>,
}

impl Namespace {
    pub const NAME: &'static str = "__name__";
    pub const DOC: &'static str = "__doc__";

    pub fn new(name: impl Into<String>) -> Self {
        let mut symbols = HashMap::new();
        symbols.insert(Self::NAME.to_string(), Value::Str(name.into()));
        Namespace {
            inner: Arc::new(RwLock::new(symbols)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Value>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Value>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn name(&self) -> String {
        self.get(Self::NAME)
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default()
    }

    pub fn doc(&self) -> Option<String> {
        self.get(Self::DOC).and_then(|v| v.as_str().map(str::to_string))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.read().get(name).cloned()
    }

    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.write().insert(name.into(), value);
    }

    pub fn remove(&self, name: &str) -> Option<Value> {
        self.write().remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// All names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Buildable values in the namespace, sorted by name.
    pub fn factories(&self) -> Vec<(String, Value)> {
        let mut found: Vec<(String, Value)> = self
            .read()
            .iter()
            .filter(|(_, v)| matches!(v, Value::Factory(_)))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        found.sort_by(|a, b| a.0.cmp(&b.0));
        found
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn ptr_eq(&self, other: &Namespace) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("name", &self.name())
            .field("symbols", &self.names())
            .finish()
    }
}
