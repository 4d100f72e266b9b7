use std::sync::Mutex;

use pretty_assertions::assert_eq;
use scenic_core::ast::{AstNode, AstNodeKind, SymbolPath};
use scenic_core::runtime::{
    DeclarationWrapper, HostError, HostErrorKind, HostRuntime, Namespace, ScriptHost, Value, import_hooks_active,
};
use scenic_core::{CompileError, ScenicErrorExt, Script, compile_module, compile_script};

/// Host double recording every call it receives.
#[derive(Default)]
struct RecordingHost {
    events: Mutex<Vec<String>>,
    fail_exec: Option<HostError>,
}

impl HostRuntime for RecordingHost {
    fn prepare(&self, namespace: &Namespace) -> Result<(), HostError> {
        self.events.lock().unwrap().push(format!("prepare {}", namespace.name()));
        Ok(())
    }

    fn exec(&self, code: &str, _namespace: &Namespace) -> Result<(), HostError> {
        self.events.lock().unwrap().push(format!("exec {}", code.trim()));
        match &self.fail_exec {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn import(&self, statement: &str, _namespace: &Namespace) -> Result<(), HostError> {
        self.events
            .lock()
            .unwrap()
            .push(format!("import {} hooks={}", statement.trim(), import_hooks_active()));
        Ok(())
    }
}

fn module_of(items: Vec<AstNode>) -> AstNode {
    AstNode::at_line(AstNodeKind::Module { doc: None, body: items }, 1)
}

#[test]
fn items_reach_the_host_in_source_order() {
    let host = RecordingHost::default();
    let ns = Namespace::new("app");
    let src = r#"
"App module."
import widgets;
::host::
a = 1;
::end::
Main(Window) {}
"#;
    compile_script(&Script::from_source("app.scn", src), &ns, &host).expect("compile");

    assert_eq!(
        *host.events.lock().unwrap(),
        vec![
            "prepare app".to_string(),
            "import import widgets; hooks=true".to_string(),
            "exec a = 1;".to_string(),
        ]
    );
    assert_eq!(ns.doc().as_deref(), Some("App module."));
    assert!(matches!(ns.get("Main"), Some(Value::Factory(_))));
}

#[test]
fn every_declaration_gets_a_wrapper() {
    let ns = Namespace::new("app");
    let src = "A(Window) {}\nB(A) {}\nC(B) { id: c; }\n";
    compile_script(&Script::from_source("app.scn", src), &ns, &ScriptHost::default()).expect("compile");

    let names: Vec<String> = ns.factories().into_iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["A".to_string(), "B".to_string(), "C".to_string()]);
    let Some(Value::Factory(c)) = ns.get("C") else {
        panic!("C missing");
    };
    let wrapper = c.as_any().downcast_ref::<DeclarationWrapper>().expect("wrapper");
    assert_eq!(wrapper.base(), "B");
    assert!(wrapper.namespace().ptr_eq(&ns));
    assert_eq!(wrapper.sequence().len(), 3);
}

#[test]
fn module_without_docstring_has_no_doc() {
    let ns = Namespace::new("app");
    compile_module(&module_of(vec![]), &ns, &ScriptHost::default()).expect("compile");
    assert_eq!(ns.get("__doc__"), None);
    assert_eq!(ns.get("__name__"), Some(Value::Str("app".into())));
}

#[test]
fn host_failure_keeps_kind_and_line() {
    let ns = Namespace::new("app");
    let src = "\"Doc\";\n::host::\nx = 1;\ny = missing;\n::end::\n";
    let err = compile_script(&Script::from_source("app.scn", src), &ns, &ScriptHost::default()).unwrap_err();

    let CompileError::HostCode(host_err) = &err else {
        panic!("expected a host code error, got {:?}", err);
    };
    assert_eq!(host_err.kind, HostErrorKind::Name);
    assert_eq!(host_err.line, 4);
    assert!(err.to_string().contains("line 4"), "{}", err);
    assert_eq!(err.location().map(|l| l.line), Some(4));
    // statements before the failure already ran
    assert_eq!(ns.get("x"), Some(Value::Int(1)));
}

#[test]
fn host_failure_without_line_uses_node_line() {
    let host = RecordingHost {
        fail_exec: Some(HostError::new(HostErrorKind::Runtime, "boom")),
        ..Default::default()
    };
    let ns = Namespace::new("app");
    let src = "A(Window) {}\n\n::host::\nz = 1;\n::end::\nB(Window) {}\n";
    let err = compile_script(&Script::from_source("app.scn", src), &ns, &host).unwrap_err();
    match err {
        CompileError::HostCode(e) => {
            assert_eq!(e.kind, HostErrorKind::Runtime);
            assert_eq!(e.line, 3);
            assert_eq!(e.message, "boom");
        }
        other => panic!("unexpected {:?}", other),
    }
    // the module stops at the failing item
    assert!(ns.contains("A"));
    assert!(!ns.contains("B"));
}

#[test]
fn failed_import_is_a_host_code_error() {
    let ns = Namespace::new("app");
    let src = "import does.not.exist;\n";
    let err = compile_script(&Script::from_source("app.scn", src), &ns, &ScriptHost::default()).unwrap_err();
    assert!(matches!(
        err,
        CompileError::HostCode(ref e) if e.kind == HostErrorKind::Import && e.line == 1
    ));
}

#[test]
fn unexpected_top_level_node_is_unhandled() {
    let stray = AstNode::at_line(
        AstNodeKind::Instantiation {
            name: SymbolPath::parse("Label"),
            identifier: None,
            body: vec![],
        },
        7,
    );
    let ns = Namespace::new("app");
    let err = compile_module(&module_of(vec![stray]), &ns, &ScriptHost::default()).unwrap_err();
    match err {
        CompileError::Unhandled(e) => assert_eq!(e.kind(), "Instantiation"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn failing_declaration_is_not_installed() {
    let nested = AstNode::at_line(
        AstNodeKind::Declaration {
            name: "Inner".into(),
            base: SymbolPath::parse("Window"),
            identifier: None,
            doc: None,
            body: vec![],
        },
        2,
    );
    let outer = AstNode::at_line(
        AstNodeKind::Declaration {
            name: "Outer".into(),
            base: SymbolPath::parse("Window"),
            identifier: None,
            doc: None,
            body: vec![nested],
        },
        1,
    );
    let ns = Namespace::new("app");
    let err = compile_module(&module_of(vec![outer]), &ns, &ScriptHost::default()).unwrap_err();
    assert!(matches!(err, CompileError::Unhandled(ref e) if e.kind() == "Declaration"));
    assert!(!ns.contains("Outer"));
}

#[test]
fn syntax_errors_surface_from_compile_script() {
    let ns = Namespace::new("app");
    let err = compile_script(&Script::from_source("app.scn", "Main(Window {}"), &ns, &ScriptHost::default())
        .unwrap_err();
    assert!(matches!(err, CompileError::Syntax(_)));
    assert_eq!(err.issuer(), "scenic.ast");
}
