//! Build-time machinery: values, scopes, the toolkit, the component
//! protocols, the step interpreter and the host runtime.
pub mod basic;
pub mod builtins;
pub mod component;
pub mod declaration;
pub mod err;
pub mod eval;
pub mod exec;
pub mod host;
pub mod scope;
pub mod toolkit;
pub mod value;

pub use self::basic::{Element, ElementClass, EqualOperator, basic_toolkit};
pub use self::component::{BindingOperator, Component, ComponentError, ComponentRef, ComponentSnapshot, Factory};
pub use self::declaration::DeclarationWrapper;
pub use self::err::{BuildError, EvalError};
pub use self::eval::{BindingScope, Lookup, evaluate};
pub use self::exec::run_sequence;
pub use self::host::{HostError, HostErrorKind, HostRuntime, ImportHooks, ScriptHost, import_hooks, import_hooks_active};
pub use self::scope::{IdentifierScope, Namespace};
pub use self::toolkit::{Toolkit, ToolkitBuilder};
pub use self::value::{NativeFunction, TypeTag, Value};
