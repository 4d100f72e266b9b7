//! Lowering of a `Declaration` node into an `InstructionSequence`.
//!
//! Given
//!
//! ```text
//! FooWindow(Window) {
//!     id: foo;
//!     attr a = "12";
//!     PushButton {
//!         id: btn;
//!         text = "click me";
//!     }
//! }
//! ```
//!
//! the lowered sequence reads
//!
//! ```text
//! Construct _var_0 <- Window(identifiers)
//! StoreIdentifier identifiers["foo"] <- _var_0
//! DeclareAttribute _var_0.a is_event=false
//! Bind __op_equal__(_var_0, "a", `"12"`)
//! Construct _var_1 <- PushButton(None)
//! StoreIdentifier identifiers["btn"] <- _var_1
//! Bind __op_equal__(_var_1, "text", `"click me"`)
//! AddChild _var_0 <- _var_1
//! Return _var_0
//! ```
//!
//! Symbols are kept unresolved; the runtime resolves them through the
//! toolkit when the sequence is executed.
pub mod function_builder;
pub mod lower_expr;

use log::debug;

use crate::ast::{AstNode, AstNodeKind, Binding, SymbolPath};
use crate::ir::err::UnhandledNodeError;
use crate::ir::op::{ScopeMode, Step};
use crate::ir::sequence::InstructionSequence;

use self::function_builder::FunctionBuilder;
use self::lower_expr::compile_expr;

/// Lowers one `Declaration` node. Any other node kind is rejected.
pub fn lower_declaration(node: &AstNode) -> Result<InstructionSequence, UnhandledNodeError> {
    let AstNodeKind::Declaration {
        name,
        base,
        identifier,
        doc,
        body,
    } = &node.kind
    else {
        return Err(unhandled(node));
    };

    let mut lowering = DeclarationLowering::new();
    lowering.lower_root(node, base, identifier.as_deref(), body)?;
    let sequence = lowering.builder.finish(name, node.line(), doc.clone());
    debug!("lowered declaration {} into {} steps", name, sequence.len());
    Ok(sequence)
}

fn unhandled(node: &AstNode) -> UnhandledNodeError {
    UnhandledNodeError::new(node.kind.kind_name(), node.location.clone())
}

struct DeclarationLowering {
    builder: FunctionBuilder,
}

impl DeclarationLowering {
    fn new() -> Self {
        DeclarationLowering {
            builder: FunctionBuilder::new(),
        }
    }

    fn lower_root(
        &mut self,
        node: &AstNode,
        base: &SymbolPath,
        identifier: Option<&str>,
        body: &[AstNode],
    ) -> Result<(), UnhandledNodeError> {
        let var = self.builder.alloc_var();
        self.builder.push_target(var);

        // The base shares the caller's identifiers, so ids declared by a
        // base declaration land in the same scope as ours.
        self.builder.emit(Step::Construct {
            dest: var,
            class: base.clone(),
            scope: ScopeMode::Shared,
            line: node.line(),
        });
        if let Some(name) = identifier {
            self.builder.emit(Step::StoreIdentifier {
                src: var,
                name: name.to_string(),
            });
        }

        for child in body {
            self.lower_body_item(child)?;
        }

        self.builder.emit(Step::Return { src: var });
        self.builder.pop_target();
        Ok(())
    }

    fn lower_body_item(&mut self, node: &AstNode) -> Result<(), UnhandledNodeError> {
        match &node.kind {
            AstNodeKind::Instantiation { name, identifier, body } => {
                self.lower_instantiation(node, name, identifier.as_deref(), body)
            }
            AstNodeKind::AttributeDeclaration {
                name,
                type_name,
                is_event,
                default,
            } => {
                let target = self.builder.current_target().ok_or_else(|| unhandled(node))?;
                self.builder.emit(Step::DeclareAttribute {
                    target,
                    name: name.clone(),
                    type_name: type_name.clone(),
                    is_event: *is_event,
                    line: node.line(),
                });
                if let Some(default) = default {
                    self.lower_body_item(default)?;
                }
                Ok(())
            }
            AstNodeKind::AttributeBinding { name, binding } => self.lower_binding(node, name, binding),
            AstNodeKind::Module { .. }
            | AstNodeKind::HostBlock { .. }
            | AstNodeKind::Import { .. }
            | AstNodeKind::Declaration { .. } => Err(unhandled(node)),
        }
    }

    fn lower_instantiation(
        &mut self,
        node: &AstNode,
        name: &SymbolPath,
        identifier: Option<&str>,
        body: &[AstNode],
    ) -> Result<(), UnhandledNodeError> {
        let var = self.builder.alloc_var();
        self.builder.push_target(var);

        // Children are built without our identifiers: a composed component
        // gets an isolated id space of its own.
        self.builder.emit(Step::Construct {
            dest: var,
            class: name.clone(),
            scope: ScopeMode::Isolated,
            line: node.line(),
        });
        if let Some(id) = identifier {
            self.builder.emit(Step::StoreIdentifier {
                src: var,
                name: id.to_string(),
            });
        }

        for child in body {
            self.lower_body_item(child)?;
        }

        self.builder.pop_target();
        let parent = self.builder.current_target().ok_or_else(|| unhandled(node))?;
        self.builder.emit(Step::AddChild { parent, child: var });
        Ok(())
    }

    fn lower_binding(&mut self, node: &AstNode, name: &str, binding: &Binding) -> Result<(), UnhandledNodeError> {
        let target = self.builder.current_target().ok_or_else(|| unhandled(node))?;
        // TODO: bound code blocks need a second Bind form once the grammar
        // accepts statement bodies on the right-hand side.
        self.builder.emit(Step::Bind {
            target,
            attribute: name.to_string(),
            operator: SymbolPath::parse(&binding.op),
            expr: binding.expr.clone(),
            compiled: compile_expr(&binding.expr.expr),
            line: node.line(),
        });
        Ok(())
    }
}
