//! Lowers binding expressions into the stack program evaluated at build time.
use crate::ast::{BinaryOperator, Expr};
use crate::ir::op::{CompiledExpr, ExprOp};

pub fn compile_expr(expr: &Expr) -> CompiledExpr {
    let mut ops = Vec::new();
    lower_expr(expr, &mut ops);
    CompiledExpr { ops }
}

fn lower_expr(expr: &Expr, ops: &mut Vec<ExprOp>) {
    match expr {
        Expr::Literal(lit) => ops.push(ExprOp::Const(lit.clone())),
        Expr::Name(name) => ops.push(ExprOp::Load(name.clone())),
        Expr::Attribute { value, attr } => {
            lower_expr(value, ops);
            ops.push(ExprOp::GetAttr(attr.clone()));
        }
        Expr::Call { func, args } => {
            lower_expr(func, ops);
            for arg in args {
                lower_expr(arg, ops);
            }
            ops.push(ExprOp::Call(args.len()));
        }
        Expr::List(items) => {
            for item in items {
                lower_expr(item, ops);
            }
            ops.push(ExprOp::BuildList(items.len()));
        }
        Expr::Unary { op, expr } => {
            lower_expr(expr, ops);
            ops.push(ExprOp::Unary(*op));
        }
        Expr::Binary { left, op: op @ (BinaryOperator::And | BinaryOperator::Or), right } => {
            lower_expr(left, ops);
            let jump_at = ops.len();
            // placeholder, patched once the right operand's length is known
            ops.push(ExprOp::JumpIfFalseOrPop(0));
            lower_expr(right, ops);
            let end = ops.len();
            ops[jump_at] = match op {
                BinaryOperator::And => ExprOp::JumpIfFalseOrPop(end),
                _ => ExprOp::JumpIfTrueOrPop(end),
            };
        }
        Expr::Binary { left, op, right } => {
            lower_expr(left, ops);
            lower_expr(right, ops);
            ops.push(ExprOp::Binary(*op));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Literal, UnaryOperator};

    #[test]
    fn attribute_call_is_postfix() {
        let expr = Expr::Call {
            func: Box::new(Expr::Attribute {
                value: Box::new(Expr::Name("f".into())),
                attr: "size".into(),
            }),
            args: vec![Expr::Literal(Literal::Int(2))],
        };
        let compiled = compile_expr(&expr);
        assert_eq!(
            compiled.ops,
            vec![
                ExprOp::Load("f".into()),
                ExprOp::GetAttr("size".into()),
                ExprOp::Const(Literal::Int(2)),
                ExprOp::Call(1),
            ]
        );
    }

    #[test]
    fn short_circuit_jumps_past_right_operand() {
        let expr = Expr::Binary {
            left: Box::new(Expr::Name("a".into())),
            op: BinaryOperator::Or,
            right: Box::new(Expr::Unary {
                op: UnaryOperator::Not,
                expr: Box::new(Expr::Name("b".into())),
            }),
        };
        let compiled = compile_expr(&expr);
        assert_eq!(compiled.ops[1], ExprOp::JumpIfTrueOrPop(4));
        assert_eq!(compiled.len(), 4);
    }
}
