pub mod err;
pub mod lower;
pub mod op;
pub mod sequence;

pub use self::err::UnhandledNodeError;
pub use self::lower::lower_declaration;
pub use self::lower::lower_expr::compile_expr;
pub use self::op::{CompiledExpr, ExprOp, ScopeMode, Step, Var};
pub use self::sequence::InstructionSequence;
