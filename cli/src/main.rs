mod disassembler;
mod output;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Arg, ArgAction, ArgMatches, Command};
use log::{debug, info};
use serde_json::json;

use scenic_core::runtime::ComponentSnapshot;
use scenic_core::{
    AstNode, AstNodeKind, DeclarationWrapper, Factory, IdentifierScope, Level, Location, ModuleCompiler, Namespace,
    ScenicErrorExt, Script, ScriptHost, Value, basic_toolkit, generate_ast_from_source,
};

use output::Reporter;

fn main() -> ExitCode {
    let cli = Command::new("scenic")
        .version("0.1.0")
        .about("Compiles and builds scenic UI declarations");

    let cli = setup_cli(cli);
    let matches = cli.get_matches();
    init_logging(matches.get_flag("verbose"));
    dispatch_commands(&matches)
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn path_arg() -> Arg {
    Arg::new("path")
        .help("Additional module search directory")
        .short('p')
        .long("path")
        .action(ArgAction::Append)
        .value_parser(clap::value_parser!(PathBuf))
        .value_name("DIR")
}

fn file_arg(help: &'static str) -> Arg {
    Arg::new("file").help(help).required(true).index(1)
}

/// Sets up the CLI with subcommands and arguments.
fn setup_cli(cli: Command) -> Command {
    cli.arg(
        Arg::new("verbose")
            .help("Enable debug logging")
            .short('v')
            .long("verbose")
            .global(true)
            .action(ArgAction::SetTrue),
    )
    .subcommand(
        Command::new("build")
            .about("Compile the given modules (glob patterns allowed)")
            .arg(
                Arg::new("file")
                    .help("The module files to compile")
                    .required(true)
                    .num_args(1..)
                    .index(1),
            )
            .arg(
                Arg::new("dump")
                    .help("Dump a compilation stage")
                    .short('d')
                    .long("dump")
                    .value_parser(["ast", "steps", "json"])
                    .value_name("STAGE"),
            )
            .arg(
                Arg::new("output")
                    .help("Write the dump to a file instead of stdout")
                    .short('o')
                    .long("output")
                    .value_parser(clap::value_parser!(PathBuf))
                    .value_name("FILE"),
            )
            .arg(path_arg()),
    )
    .subcommand(
        Command::new("inspect")
            .about("List the declarations of a module")
            .arg(file_arg("The module file to inspect"))
            .arg(path_arg()),
    )
    .subcommand(
        Command::new("run")
            .about("Build a declaration with the basic toolkit and print the tree")
            .arg(file_arg("The module file to run"))
            .arg(
                Arg::new("declaration")
                    .help("Declaration to build (defaults to the last one)")
                    .short('d')
                    .long("declaration")
                    .value_name("NAME"),
            )
            .arg(
                Arg::new("format")
                    .help("Output format")
                    .short('f')
                    .long("format")
                    .value_parser(["text", "json"])
                    .default_value("text"),
            )
            .arg(path_arg()),
    )
}

type CliResult = Result<(), Box<dyn ScenicErrorExt>>;

/// Dispatches the command based on the parsed arguments.
fn dispatch_commands(matches: &ArgMatches) -> ExitCode {
    let result = match matches.subcommand() {
        Some(("build", sub_m)) => build_command(sub_m),
        Some(("inspect", sub_m)) => inspect_command(sub_m),
        Some(("run", sub_m)) => run_command(sub_m),
        _ => {
            eprintln!("No valid subcommand was used. Use --help for more information.");
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let mut reporter = Reporter::new(io::stderr());
            let _ = reporter.report(err.as_ref());
            ExitCode::FAILURE
        }
    }
}

/// Failures of the CLI itself (reading inputs, writing outputs).
struct CliError {
    message: String,
    location: Option<Location>,
}

impl CliError {
    fn boxed(message: impl Into<String>, file: Option<&Path>) -> Box<dyn ScenicErrorExt> {
        Box::new(CliError {
            message: message.into(),
            location: file.map(|f| Location::new(f.display().to_string(), 0, 0)),
        })
    }
}

impl ScenicErrorExt for CliError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn issuer(&self) -> String {
        "scenic.cli".to_string()
    }

    fn location(&self) -> Option<Location> {
        self.location.clone()
    }
}

fn boxed<E: ScenicErrorExt + 'static>(err: E) -> Box<dyn ScenicErrorExt> {
    Box::new(err)
}

fn collect_scripts(patterns: &[&String]) -> Result<Vec<Script>, Box<dyn ScenicErrorExt>> {
    let mut scripts = Vec::new();
    for pattern in patterns {
        scripts.extend(Script::discover(pattern).map_err(boxed)?);
    }
    Ok(scripts)
}

fn make_host(matches: &ArgMatches, scripts: &[Script]) -> ScriptHost {
    let mut host = ScriptHost::from_env();
    if let Some(paths) = matches.get_many::<PathBuf>("path") {
        for path in paths {
            host.add_search_path(path.clone());
        }
    }
    // sibling modules of the inputs are importable
    for script in scripts {
        if let Some(parent) = script.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !host.search_paths().iter().any(|p| p == parent) {
                host.add_search_path(parent.to_path_buf());
            }
        }
    }
    debug!("module search paths: {:?}", host.search_paths());
    host
}

struct CompiledModule {
    ast: AstNode,
    namespace: Namespace,
}

impl CompiledModule {
    /// Declaration factories in source order.
    fn declarations(&self) -> Vec<(String, Arc<dyn Factory>)> {
        let body = self.ast.kind.body().unwrap_or_default();
        body.iter()
            .filter_map(|node| match &node.kind {
                AstNodeKind::Declaration { name, .. } => match self.namespace.get(name) {
                    Some(Value::Factory(factory)) => Some((name.clone(), factory)),
                    _ => None,
                },
                _ => None,
            })
            .collect()
    }
}

fn wrappers(declarations: &[(String, Arc<dyn Factory>)]) -> Vec<(String, &DeclarationWrapper)> {
    declarations
        .iter()
        .filter_map(|(name, factory)| {
            factory
                .as_any()
                .downcast_ref::<DeclarationWrapper>()
                .map(|wrapper| (name.clone(), wrapper))
        })
        .collect()
}

fn compile(script: &Script, host: &ScriptHost) -> Result<CompiledModule, Box<dyn ScenicErrorExt>> {
    let ast = generate_ast_from_source(script).map_err(boxed)?;
    let namespace = Namespace::new(script.module_name());
    ModuleCompiler::new(&namespace, host)
        .with_file(script.name.clone())
        .compile(&ast)
        .map_err(boxed)?;
    Ok(CompiledModule { ast, namespace })
}

fn required_file(matches: &ArgMatches) -> Result<&String, Box<dyn ScenicErrorExt>> {
    matches
        .get_one::<String>("file")
        .ok_or_else(|| CliError::boxed("No input file given", None))
}

fn write_dump(text: &str, output: Option<&PathBuf>) -> CliResult {
    match output {
        Some(path) => {
            fs::write(path, text).map_err(|e| CliError::boxed(e.to_string(), Some(path.as_path())))?;
            info!("wrote dump to {}", path.display());
            Ok(())
        }
        None => {
            let mut stdout = io::stdout();
            stdout
                .write_all(text.as_bytes())
                .map_err(|e| CliError::boxed(e.to_string(), None))
        }
    }
}

fn build_command(matches: &ArgMatches) -> CliResult {
    let patterns: Vec<&String> = matches.get_many::<String>("file").map(|v| v.collect()).unwrap_or_default();
    let scripts = collect_scripts(&patterns)?;
    let host = make_host(matches, &scripts);
    let dump = matches.get_one::<String>("dump").map(String::as_str);

    let progress = output::build_progress(scripts.len());
    let mut dumped = String::new();
    let mut sequences = Vec::new();
    let mut reporter = Reporter::new(io::stderr());

    for script in &scripts {
        progress.set_message(script.name.clone());
        let module = compile(script, &host)?;
        let factories = module.declarations();
        let declarations = wrappers(&factories);
        match dump {
            Some("ast") => dumped.push_str(&format!("{}\n", module.ast)),
            Some("steps") => {
                for (_, wrapper) in &declarations {
                    dumped.push_str(&disassembler::disassemble(wrapper.sequence()));
                    dumped.push('\n');
                }
            }
            Some("json") => {
                for (_, wrapper) in &declarations {
                    sequences.push(json!({
                        "module": wrapper.module(),
                        "base": wrapper.base(),
                        "sequence": wrapper.sequence(),
                    }));
                }
            }
            _ => {}
        }
        progress.inc(1);
        progress.suspend(|| {
            let _ = reporter.success(&format!("{}: {} declaration(s)", script.name, declarations.len()));
        });
        module.namespace.clear();
    }
    progress.finish_and_clear();

    if dump == Some("json") {
        dumped = serde_json::to_string_pretty(&sequences).map_err(|e| CliError::boxed(e.to_string(), None))?;
        dumped.push('\n');
    }
    if dump.is_some() {
        write_dump(&dumped, matches.get_one::<PathBuf>("output"))?;
    }
    Ok(())
}

fn inspect_command(matches: &ArgMatches) -> CliResult {
    let file = required_file(matches)?;
    let scripts = collect_scripts(&[file])?;
    let host = make_host(matches, &scripts);
    let mut reporter = Reporter::new(io::stdout());

    for script in &scripts {
        let module = compile(script, &host)?;
        let _ = reporter.title(&format!("module {}", module.namespace.name()));
        if let Some(doc) = module.namespace.doc() {
            let _ = reporter.info(&doc);
        }
        let factories = module.declarations();
        let declarations = wrappers(&factories);
        if declarations.is_empty() {
            let _ = reporter.warning("no declarations");
        } else {
            let _ = reporter.raw(&format!("{}\n", output::declaration_table(&declarations)));
        }
        module.namespace.clear();
    }
    Ok(())
}

fn run_command(matches: &ArgMatches) -> CliResult {
    let file = required_file(matches)?;
    let scripts = collect_scripts(&[file])?;
    let host = make_host(matches, &scripts);
    let script = scripts
        .first()
        .ok_or_else(|| CliError::boxed(format!("No script at '{}'", file), None))?;
    let module = compile(script, &host)?;

    let factories = module.declarations();
    let declarations = wrappers(&factories);
    let wrapper = match matches.get_one::<String>("declaration") {
        Some(name) => declarations.iter().find(|(n, _)| n == name).map(|(_, w)| *w),
        None => declarations.last().map(|(_, w)| *w),
    }
    .ok_or_else(|| {
        let name = matches.get_one::<String>("declaration").cloned().unwrap_or_default();
        CliError::boxed(format!("No declaration '{}' in {}", name, script.name), Some(script.path.as_path()))
    })?;

    let scope = IdentifierScope::new();
    let root = Factory::build_in(wrapper, &scope, &basic_toolkit()).map_err(boxed)?;
    let snapshot = ComponentSnapshot::capture(&root);

    let text = match matches.get_one::<String>("format").map(String::as_str) {
        Some("json") => {
            let value = json!({
                "declaration": wrapper.to_string(),
                "identifiers": scope.names(),
                "tree": snapshot,
            });
            let mut text = serde_json::to_string_pretty(&value).map_err(|e| CliError::boxed(e.to_string(), None))?;
            text.push('\n');
            text
        }
        _ => format!("{}identifiers: {}\n", snapshot, scope.names().join(", ")),
    };
    module.namespace.clear();
    write_dump(&text, None)
}
