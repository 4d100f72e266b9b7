//! Runs an `InstructionSequence` against a live identifier scope, namespace
//! and toolkit.
use log::debug;

use crate::ir::{InstructionSequence, ScopeMode, Step, Var};

use super::component::ComponentRef;
use super::err::BuildError;
use super::scope::{IdentifierScope, Namespace};
use super::toolkit::Toolkit;
use super::value::Value;

struct Frame {
    vars: Vec<Option<ComponentRef>>,
}

impl Frame {
    fn load(&self, var: Var) -> Result<ComponentRef, BuildError> {
        self.vars
            .get(var.0)
            .and_then(Clone::clone)
            .ok_or_else(|| BuildError::UnboundVariable { var: var.to_string() })
    }

    fn store(&mut self, var: Var, component: ComponentRef) {
        if var.0 >= self.vars.len() {
            self.vars.resize(var.0 + 1, None);
        }
        self.vars[var.0] = Some(component);
    }
}

pub fn run_sequence(
    sequence: &InstructionSequence,
    identifiers: &IdentifierScope,
    namespace: &Namespace,
    toolkit: &Toolkit,
) -> Result<ComponentRef, BuildError> {
    let mut frame = Frame {
        vars: vec![None; sequence.var_count()],
    };

    for step in sequence.steps() {
        debug!("{}: {}", sequence.name(), step);
        match step {
            Step::Construct { dest, class, scope, line } => {
                let factory = match toolkit.resolve(class, namespace).map_err(|e| e.at_line(*line))? {
                    Value::Factory(factory) => factory,
                    other => {
                        return Err(BuildError::NotBuildable {
                            name: class.to_string(),
                            type_name: other.type_name(),
                            line: *line,
                        });
                    }
                };
                let scope = match scope {
                    ScopeMode::Shared => Some(identifiers.clone()),
                    ScopeMode::Isolated => None,
                };
                frame.store(*dest, factory.build(scope, toolkit)?);
            }
            Step::StoreIdentifier { src, name } => {
                identifiers.insert(name.clone(), Value::Component(frame.load(*src)?));
            }
            Step::DeclareAttribute {
                target,
                name,
                type_name,
                is_event,
                line,
            } => {
                let type_value = match type_name {
                    Some(symbol) => Some(toolkit.resolve(symbol, namespace).map_err(|e| e.at_line(*line))?),
                    None => None,
                };
                frame.load(*target)?.declare_attribute(name, type_value, *is_event)?;
            }
            Step::Bind {
                target,
                attribute,
                operator,
                expr,
                compiled,
                line,
            } => {
                let binder = match toolkit.resolve(operator, namespace).map_err(|e| e.at_line(*line))? {
                    Value::Operator(binder) => binder,
                    other => {
                        return Err(BuildError::NotAnOperator {
                            name: operator.to_string(),
                            type_name: other.type_name(),
                            line: *line,
                        });
                    }
                };
                let target = frame.load(*target)?;
                binder.bind(&target, attribute, expr, compiled, identifiers, namespace, toolkit)?;
            }
            Step::AddChild { parent, child } => {
                frame.load(*parent)?.add_child(frame.load(*child)?)?;
            }
            Step::Return { src } => return frame.load(*src),
        }
    }

    Err(BuildError::MissingReturn {
        name: sequence.name().to_string(),
    })
}
