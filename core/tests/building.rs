use std::any::Any;
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use scenic_core::ast::BoundExpr;
use scenic_core::ast::kind::OP_EQUAL;
use scenic_core::ir::CompiledExpr;
use scenic_core::runtime::{
    BindingOperator, BuildError, Component, ComponentError, ComponentRef, DeclarationWrapper, Factory, IdentifierScope,
    Namespace, ScriptHost, Toolkit, TypeTag, Value, basic_toolkit,
};
use scenic_core::{Script, compile_script};

/// What a build did to a recording component, in call order.
#[derive(Debug, Clone, PartialEq)]
enum Call {
    Declare {
        name: String,
        type_value: Option<String>,
        is_event: bool,
    },
    AddChild(String),
}

struct Recorder {
    class: String,
    calls: Mutex<Vec<Call>>,
    children: Mutex<Vec<ComponentRef>>,
}

impl Component for Recorder {
    fn type_name(&self) -> String {
        self.class.clone()
    }

    fn declare_attribute(&self, name: &str, type_value: Option<Value>, is_event: bool) -> Result<(), ComponentError> {
        self.calls.lock().unwrap().push(Call::Declare {
            name: name.to_string(),
            type_value: type_value.map(|v| format!("{:?}", v)),
            is_event,
        });
        Ok(())
    }

    fn add_child(&self, child: ComponentRef) -> Result<(), ComponentError> {
        self.calls.lock().unwrap().push(Call::AddChild(child.type_name()));
        self.children.lock().unwrap().push(child);
        Ok(())
    }

    fn set_attribute(&self, _name: &str, _value: Value) -> Result<(), ComponentError> {
        Ok(())
    }

    fn attribute(&self, _name: &str) -> Option<Value> {
        None
    }

    fn attribute_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn children(&self) -> Vec<ComponentRef> {
        self.children.lock().unwrap().clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn calls_of(component: &ComponentRef) -> Vec<Call> {
    let recorder = component.as_any().downcast_ref::<Recorder>().expect("a recorder");
    recorder.calls.lock().unwrap().clone()
}

/// A primitive class that remembers the identifier scopes it was built in.
struct RecordingClass {
    name: &'static str,
    scopes: Mutex<Vec<IdentifierScope>>,
}

impl RecordingClass {
    fn new(name: &'static str) -> Arc<Self> {
        Arc::new(RecordingClass {
            name,
            scopes: Mutex::new(Vec::new()),
        })
    }
}

impl Factory for RecordingClass {
    fn name(&self) -> String {
        self.name.to_string()
    }

    fn build_in(&self, identifiers: &IdentifierScope, _toolkit: &Toolkit) -> Result<ComponentRef, BuildError> {
        self.scopes.lock().unwrap().push(identifiers.clone());
        Ok(Arc::new(Recorder {
            class: self.name.to_string(),
            calls: Mutex::new(Vec::new()),
            children: Mutex::new(Vec::new()),
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
struct BindCall {
    target: String,
    attribute: String,
    source: String,
    ops: usize,
    identifiers: IdentifierScope,
    namespace: Namespace,
    toolkit_names: Vec<String>,
}

#[derive(Default)]
struct RecordingOperator {
    calls: Mutex<Vec<BindCall>>,
}

impl BindingOperator for RecordingOperator {
    fn name(&self) -> String {
        "recording".to_string()
    }

    fn bind(
        &self,
        target: &ComponentRef,
        attribute: &str,
        expr: &BoundExpr,
        compiled: &CompiledExpr,
        identifiers: &IdentifierScope,
        namespace: &Namespace,
        toolkit: &Toolkit,
    ) -> Result<(), BuildError> {
        self.calls.lock().unwrap().push(BindCall {
            target: target.type_name(),
            attribute: attribute.to_string(),
            source: expr.source.clone(),
            ops: compiled.len(),
            identifiers: identifiers.clone(),
            namespace: namespace.clone(),
            toolkit_names: toolkit.names(),
        });
        Ok(())
    }
}

struct Fixture {
    base: Arc<RecordingClass>,
    child: Arc<RecordingClass>,
    operator: Arc<RecordingOperator>,
    toolkit: Toolkit,
}

fn fixture() -> Fixture {
    let base = RecordingClass::new("Base");
    let child = RecordingClass::new("Child");
    let operator = Arc::new(RecordingOperator::default());
    let toolkit = Toolkit::builder()
        .symbol("Base", Value::Factory(base.clone()))
        .symbol("Child", Value::Factory(child.clone()))
        .symbol("int", Value::Type(TypeTag::Int))
        .symbol(OP_EQUAL, Value::Operator(operator.clone()))
        .build();
    Fixture {
        base,
        child,
        operator,
        toolkit,
    }
}

fn compile(src: &str) -> Namespace {
    let namespace = Namespace::new("views");
    compile_script(&Script::from_source("views.scn", src), &namespace, &ScriptHost::default()).expect("compile");
    namespace
}

fn factory(namespace: &Namespace, name: &str) -> Arc<dyn Factory> {
    match namespace.get(name) {
        Some(Value::Factory(f)) => f,
        other => panic!("{} is not a factory: {:?}", name, other),
    }
}

#[test]
fn empty_declaration_leaves_scope_untouched() {
    let fx = fixture();
    let ns = compile("Foo(Base) {}");
    let scope = IdentifierScope::new();
    let built = factory(&ns, "Foo").build_in(&scope, &fx.toolkit).expect("build");
    assert_eq!(built.type_name(), "Base");
    assert!(scope.is_empty());
    assert!(calls_of(&built).is_empty());
}

#[test]
fn identifier_maps_to_root_object() {
    let fx = fixture();
    let ns = compile("Foo(Base) { id: foo; }");
    let scope = IdentifierScope::new();
    let built = factory(&ns, "Foo").build_in(&scope, &fx.toolkit).expect("build");
    assert_eq!(scope.names(), vec!["foo".to_string()]);
    let stored = scope.get("foo").expect("foo");
    assert!(Arc::ptr_eq(stored.as_component().expect("component"), &built));
}

#[test]
fn synthetic_variables_never_reach_the_scope() {
    let fx = fixture();
    let ns = compile("Foo(Base) { Child {} Child { id: second; } }");
    let scope = IdentifierScope::new();
    factory(&ns, "Foo").build_in(&scope, &fx.toolkit).expect("build");
    assert_eq!(scope.names(), vec!["second".to_string()]);
}

#[test]
fn base_shares_scope_children_get_fresh_ones() {
    let fx = fixture();
    let ns = compile("Foo(Base) { Child { id: c; } }");
    let scope = IdentifierScope::new();
    let built = factory(&ns, "Foo").build_in(&scope, &fx.toolkit).expect("build");

    let base_scopes = fx.base.scopes.lock().unwrap();
    assert_eq!(base_scopes.len(), 1);
    assert!(base_scopes[0].ptr_eq(&scope));

    let child_scopes = fx.child.scopes.lock().unwrap();
    assert_eq!(child_scopes.len(), 1);
    assert!(!child_scopes[0].ptr_eq(&scope));

    // the child's id lands in the enclosing scope
    assert!(scope.contains("c"));
    assert_eq!(calls_of(&built), vec![Call::AddChild("Child".to_string())]);
}

#[test]
fn derived_declaration_shares_ids_with_its_base() {
    let fx = fixture();
    let ns = compile(
        r#"
Panel(Base) {
    id: panel;
    Child { id: caption; }
}

Fancy(Panel) {
    id: fancy;
}
"#,
    );
    let scope = IdentifierScope::new();
    let built = factory(&ns, "Fancy").build_in(&scope, &fx.toolkit).expect("build");
    assert_eq!(scope.names(), vec!["caption".to_string(), "fancy".to_string(), "panel".to_string()]);
    assert_eq!(scope.get("fancy"), scope.get("panel"));
    assert_eq!(scope.get("fancy"), Some(Value::Component(built)));
}

#[test]
fn instantiated_declaration_keeps_its_ids_private() {
    let fx = fixture();
    let ns = compile(
        r#"
Panel(Base) {
    id: panel;
    Child { id: caption; }
}

Page(Base) {
    Panel { id: first; }
}
"#,
    );
    let scope = IdentifierScope::new();
    factory(&ns, "Page").build_in(&scope, &fx.toolkit).expect("build");
    assert_eq!(scope.names(), vec!["first".to_string()]);

    // Page's root, then Panel's root in the scope Panel received
    let scopes = fx.base.scopes.lock().unwrap().clone();
    assert_eq!(scopes.len(), 2);
    assert!(scopes[0].ptr_eq(&scope));
    let inner = &scopes[1];
    assert!(!inner.ptr_eq(&scope));
    assert_eq!(inner.names(), vec!["caption".to_string(), "panel".to_string()]);
    assert_eq!(scope.get("first"), inner.get("panel"));
}

#[test]
fn untyped_and_typed_attributes() {
    let fx = fixture();
    let ns = compile("Foo(Base) { attr a; attr b: int; event c; }");
    let built = factory(&ns, "Foo").build(None, &fx.toolkit).expect("build");
    assert_eq!(
        calls_of(&built),
        vec![
            Call::Declare {
                name: "a".into(),
                type_value: None,
                is_event: false,
            },
            Call::Declare {
                name: "b".into(),
                type_value: Some(format!("{:?}", Value::Type(TypeTag::Int))),
                is_event: false,
            },
            Call::Declare {
                name: "c".into(),
                type_value: None,
                is_event: true,
            },
        ]
    );
}

#[test]
fn binding_operator_receives_every_argument() {
    let fx = fixture();
    let ns = compile("Foo(Base) { id: f; Child { text = f.name + \"!\"; } }");
    let scope = IdentifierScope::new();
    factory(&ns, "Foo").build_in(&scope, &fx.toolkit).expect("build");

    let calls = fx.operator.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.target, "Child");
    assert_eq!(call.attribute, "text");
    assert_eq!(call.source, "f.name + \"!\"");
    assert_eq!(call.ops, 4);
    assert!(call.identifiers.ptr_eq(&scope));
    assert!(call.namespace.ptr_eq(&ns));
    assert_eq!(call.toolkit_names, fx.toolkit.names());
}

#[test]
fn module_round_trip() {
    let fx = fixture();
    let ns = compile("Foo(Base) {\n    \"Doc.\"\n    id: f;\n    attr x = 1;\n}\n");

    let Some(Value::Factory(foo)) = ns.get("Foo") else {
        panic!("Foo missing");
    };
    let wrapper = foo.as_any().downcast_ref::<DeclarationWrapper>().expect("a wrapper");
    assert_eq!(wrapper.base(), "Base");
    assert_eq!(wrapper.module(), "views");
    assert_eq!(wrapper.declaration_name(), "Foo");
    assert_eq!(wrapper.doc(), Some("Doc."));
    assert_eq!(wrapper.to_string(), "views.Foo");

    let scope = IdentifierScope::new();
    let built = foo.build_in(&scope, &fx.toolkit).expect("build");
    assert!(scope.contains("f"));
    assert_eq!(
        calls_of(&built),
        vec![Call::Declare {
            name: "x".into(),
            type_value: None,
            is_event: false,
        }]
    );
    let binds = fx.operator.calls.lock().unwrap();
    assert_eq!(binds.len(), 1);
    assert_eq!(binds[0].attribute, "x");
    assert_eq!(binds[0].source, "1");
}

#[test]
fn unresolved_symbol_reports_line() {
    let fx = fixture();
    let ns = compile("Foo(Base) {\n    Missing {}\n}\n");
    let err = factory(&ns, "Foo").build(None, &fx.toolkit).unwrap_err();
    assert_eq!(
        err,
        BuildError::UnresolvedSymbol {
            name: "Missing".into(),
            line: Some(2),
        }
    );
}

#[test]
fn unresolved_type_and_operator() {
    let fx = fixture();
    let ns = compile("Typed(Base) {\n    attr a: Nope;\n}\nBound(Base) {\n    a := 1;\n}\n");
    assert!(matches!(
        factory(&ns, "Typed").build(None, &fx.toolkit),
        Err(BuildError::UnresolvedSymbol { ref name, line: Some(2) }) if name == "Nope"
    ));
    assert!(matches!(
        factory(&ns, "Bound").build(None, &fx.toolkit),
        Err(BuildError::UnresolvedSymbol { ref name, line: Some(5) }) if name == "__op_colon_equal__"
    ));
}

#[test]
fn resolution_is_deferred_to_build_time() {
    let fx = fixture();
    let ns = compile("Foo(Helper) {}");
    assert!(factory(&ns, "Foo").build(None, &fx.toolkit).is_err());

    ns.set("Helper", Value::Factory(fx.child.clone()));
    let built = factory(&ns, "Foo").build(None, &fx.toolkit).expect("build");
    assert_eq!(built.type_name(), "Child");
}

#[test]
fn component_errors_propagate_unmodified() {
    let ns = compile("Foo(Label) { Label {} }");
    let err = factory(&ns, "Foo").build(None, &basic_toolkit()).unwrap_err();
    assert_eq!(
        err,
        BuildError::Component(ComponentError::ChildrenNotAllowed {
            type_name: "Label".into(),
        })
    );
}

#[test]
fn basic_toolkit_builds_a_tree() {
    let ns = compile(
        r#"
Main(Window) {
    id: main;
    title = "Demo";
    attr count: int = 2;
    Container {
        Label { id: caption; text = "n = " + str(main.count * 3); }
        PushButton { text = caption.text; }
    }
}
"#,
    );
    let scope = IdentifierScope::new();
    let built = factory(&ns, "Main").build_in(&scope, &basic_toolkit()).expect("build");
    assert_eq!(built.attribute("title"), Some(Value::Str("Demo".into())));
    assert_eq!(built.attribute("count"), Some(Value::Int(2)));

    let container = built.children().remove(0);
    let leaves = container.children();
    let (label, button) = (&leaves[0], &leaves[1]);
    assert_eq!(label.attribute("text"), Some(Value::Str("n = 6".into())));
    assert_eq!(button.attribute("text"), Some(Value::Str("n = 6".into())));
    assert_eq!(scope.names(), vec!["caption".to_string(), "main".to_string()]);
}

#[test]
fn type_mismatch_in_binding() {
    let ns = compile("Main(Window) { attr count: int = \"three\"; }");
    let err = factory(&ns, "Main").build(None, &basic_toolkit()).unwrap_err();
    assert!(matches!(err, BuildError::Component(ComponentError::TypeMismatch { .. })));
}
