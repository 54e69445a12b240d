use contin_ast::{Context, Expr, ExprId};

/// Exact substitution of `value` for the free variable `var`.
///
/// Single-variable expressions have no capture concerns; unchanged subtrees
/// re-intern to their existing ids.
pub fn substitute(ctx: &mut Context, expr: ExprId, var: &str, value: ExprId) -> ExprId {
    match ctx.get(expr).clone() {
        Expr::Number(_) | Expr::Constant(_) => expr,
        Expr::Variable(name) => {
            if name == var {
                value
            } else {
                expr
            }
        }
        Expr::Add(a, b) => {
            let (a2, b2) = (
                substitute(ctx, a, var, value),
                substitute(ctx, b, var, value),
            );
            ctx.add(Expr::Add(a2, b2))
        }
        Expr::Sub(a, b) => {
            let (a2, b2) = (
                substitute(ctx, a, var, value),
                substitute(ctx, b, var, value),
            );
            ctx.add(Expr::Sub(a2, b2))
        }
        Expr::Mul(a, b) => {
            let (a2, b2) = (
                substitute(ctx, a, var, value),
                substitute(ctx, b, var, value),
            );
            ctx.add(Expr::Mul(a2, b2))
        }
        Expr::Div(a, b) => {
            let (a2, b2) = (
                substitute(ctx, a, var, value),
                substitute(ctx, b, var, value),
            );
            ctx.add(Expr::Div(a2, b2))
        }
        Expr::Pow(a, b) => {
            let (a2, b2) = (
                substitute(ctx, a, var, value),
                substitute(ctx, b, var, value),
            );
            ctx.add(Expr::Pow(a2, b2))
        }
        Expr::Neg(a) => {
            let a2 = substitute(ctx, a, var, value);
            ctx.add(Expr::Neg(a2))
        }
        Expr::Function(name, args) => {
            let new_args = args
                .into_iter()
                .map(|a| substitute(ctx, a, var, value))
                .collect();
            ctx.add(Expr::Function(name, new_args))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contin_ast::ordering::get_number;
    use num_rational::BigRational;

    #[test]
    fn test_substitute_variable() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let one = ctx.num(1);
        let e = ctx.add(Expr::Add(x, one));
        let three = ctx.num(3);
        let out = substitute(&mut ctx, e, "x", three);
        match ctx.get(out) {
            Expr::Add(a, b) => {
                assert_eq!(
                    get_number(&ctx, *a),
                    Some(BigRational::from_integer(3.into()))
                );
                assert_eq!(
                    get_number(&ctx, *b),
                    Some(BigRational::from_integer(1.into()))
                );
            }
            other => panic!("expected Add, got {:?}", other),
        }
    }

    #[test]
    fn test_substitute_leaves_other_variables() {
        let mut ctx = Context::new();
        let y = ctx.var("y");
        let zero = ctx.num(0);
        let out = substitute(&mut ctx, y, "x", zero);
        assert_eq!(out, y);
    }
}
