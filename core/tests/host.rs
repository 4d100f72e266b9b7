use std::fs;

use pretty_assertions::assert_eq;
use scenic_core::runtime::{
    Factory, HostErrorKind, HostRuntime, IdentifierScope, Namespace, ScriptHost, Value, basic_toolkit, import_hooks,
};
use scenic_core::{CompileError, Script, compile_script, load_script};

fn prepared(host: &ScriptHost, name: &str) -> Namespace {
    let ns = Namespace::new(name);
    host.prepare(&ns).expect("prepare");
    ns
}

#[test]
fn exec_assigns_into_the_namespace() {
    let host = ScriptHost::default();
    let ns = prepared(&host, "m");
    host.exec("greeting = \"hi\";\nsize = len(greeting) * 2 + 1;\nratio = float(\"1.5\") / 2;", &ns)
        .expect("exec");
    assert_eq!(ns.get("greeting"), Some(Value::Str("hi".into())));
    assert_eq!(ns.get("size"), Some(Value::Int(5)));
    assert_eq!(ns.get("ratio"), Some(Value::Float(0.75)));
}

#[test]
fn exec_errors_carry_kind_and_relative_line() {
    let host = ScriptHost::default();
    let ns = prepared(&host, "m");

    let err = host.exec("a = 1;\nb = a / 0;", &ns).unwrap_err();
    assert_eq!(err.kind, HostErrorKind::Arithmetic);
    assert_eq!(err.line, Some(2));

    let err = host.exec("c = int(\"x\");", &ns).unwrap_err();
    assert_eq!(err.kind, HostErrorKind::Value);

    let err = host.exec("d = 1 +;", &ns).unwrap_err();
    assert_eq!(err.kind, HostErrorKind::Syntax);
}

#[test]
fn integer_overflow_is_an_arithmetic_error() {
    let host = ScriptHost::default();
    let ns = prepared(&host, "m");
    for code in [
        "x = -(-9223372036854775807 - 1);",
        "y = (-9223372036854775807 - 1) % -1;",
        "z = 9223372036854775807 + 1;",
    ] {
        let err = host.exec(code, &ns).unwrap_err();
        assert_eq!(err.kind, HostErrorKind::Arithmetic, "{}", code);
    }
    assert!(!ns.contains("z"));
}

#[test]
fn builtins_are_only_visible_after_prepare() {
    let host = ScriptHost::default();
    let bare = Namespace::new("bare");
    let err = host.exec("n = len(\"abc\");", &bare).unwrap_err();
    assert_eq!(err.kind, HostErrorKind::Name);
}

#[test]
fn imports_from_registered_modules() {
    let host = ScriptHost::default();
    let widgets = Namespace::new("widgets");
    widgets.set("Size", Value::Int(3));
    host.register_module("ui.widgets", widgets.clone());

    let ns = prepared(&host, "m");
    host.import("import ui.widgets;", &ns).expect("import");
    assert_eq!(ns.get("widgets"), Some(Value::Module(widgets.clone())));

    host.import("import ui.widgets as w;", &ns).expect("import");
    assert!(ns.contains("w"));

    host.import("from ui.widgets import Size as S;", &ns).expect("import");
    assert_eq!(ns.get("S"), Some(Value::Int(3)));

    let err = host.import("from ui.widgets import Nope;", &ns).unwrap_err();
    assert_eq!(err.kind, HostErrorKind::Import);
}

#[test]
fn file_modules_load_while_hooks_are_active() {
    let td = tempfile::tempdir().expect("tempdir");
    let pkg = td.path().join("ui");
    fs::create_dir_all(&pkg).expect("mkdir");
    fs::write(
        pkg.join("panels.scn"),
        "\"Panels.\"\n::host::\nheading = \"Panel\";\n::end::\nPanel(Container) {\n    Label { text = heading; }\n}\n",
    )
    .expect("write module");

    let host = ScriptHost::new(vec![td.path().to_path_buf()]);
    let ns = prepared(&host, "main");
    {
        let _hooks = import_hooks();
        host.import("import ui.panels;", &ns).expect("import");
    }
    let Some(Value::Module(panels)) = ns.get("panels") else {
        panic!("panels not bound");
    };
    assert_eq!(panels.doc().as_deref(), Some("Panels."));
    assert!(host.module("ui.panels").is_some());

    // dotted bases resolve through the imported module
    let main = Namespace::new("main");
    let src = "import ui.panels;\nMain(Window) {\n    panels.Panel { id: p; }\n}\n";
    compile_script(&Script::from_source("main.scn", src), &main, &host).expect("compile");
    let Some(Value::Factory(factory)) = main.get("Main") else {
        panic!("Main missing");
    };
    let scope = IdentifierScope::new();
    let window = factory.build_in(&scope, &basic_toolkit()).expect("build");
    let panel = window.children().remove(0);
    let label = panel.children().remove(0);
    assert_eq!(label.attribute("text"), Some(Value::Str("Panel".into())));
    assert_eq!(scope.names(), vec!["p".to_string()]);
}

#[test]
fn cyclic_imports_terminate() {
    let td = tempfile::tempdir().expect("tempdir");
    fs::write(td.path().join("a.scn"), "import b;\n::host::\nname = \"a\";\n::end::\n").expect("write a");
    fs::write(td.path().join("b.scn"), "import a;\n::host::\nname = \"b\";\n::end::\n").expect("write b");

    let host = ScriptHost::new(vec![td.path().to_path_buf()]);
    let main = load_script(&Script::from_source("main.scn", "import a;\n"), &host).expect("load");
    let Some(Value::Module(a)) = main.get("a") else {
        panic!("a not bound");
    };
    assert_eq!(a.get("name"), Some(Value::Str("a".into())));
    let Some(Value::Module(b)) = a.get("b") else {
        panic!("b not bound");
    };
    assert_eq!(b.get("name"), Some(Value::Str("b".into())));
}

#[test]
fn broken_module_is_not_cached() {
    let td = tempfile::tempdir().expect("tempdir");
    fs::write(td.path().join("broken.scn"), "Oops(Window {\n").expect("write");

    let host = ScriptHost::new(vec![td.path().to_path_buf()]);
    let ns = Namespace::new("main");
    let err = compile_script(&Script::from_source("main.scn", "import broken;"), &ns, &host).unwrap_err();
    match err {
        CompileError::HostCode(e) => {
            assert_eq!(e.kind, HostErrorKind::Import);
            assert!(e.message.contains("broken"), "{}", e.message);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(host.module("broken").is_none());
}

#[test]
fn search_paths_come_from_the_environment() {
    let td = tempfile::tempdir().expect("tempdir");
    let joined = std::env::join_paths([td.path()]).expect("join");
    // SAFETY: no other test in this binary reads or writes SCENIC_PATH.
    unsafe { std::env::set_var(ScriptHost::PATH_VAR, &joined) };
    let host = ScriptHost::from_env();
    unsafe { std::env::remove_var(ScriptHost::PATH_VAR) };
    assert_eq!(host.search_paths(), &[td.path().to_path_buf()]);
}

#[test]
fn wrapper_builds_through_factory_trait() {
    let host = ScriptHost::default();
    let ns = load_script(&Script::from_source("m.scn", "Card(Container) { Label { text = \"x\"; } }"), &host)
        .expect("load");
    let Some(Value::Factory(card)) = ns.get("Card") else {
        panic!("Card missing");
    };
    assert_eq!(card.name(), "Card");
    let built = card.build(None, &basic_toolkit()).expect("build");
    assert_eq!(built.type_name(), "Container");
    assert_eq!(built.children().len(), 1);
}
