//! Real zero sets of expressions.
//!
//! Conservative policy: a zero set is either computed exactly or the
//! operation fails with `Unsupported`. Nothing is guessed.

use contin_ast::{Context, Expr, ExprId, PointSet};
use num_traits::Signed;

use crate::budget::{Budget, Operation};
use crate::error::EngineError;
use crate::polynomial::Poly;

/// Exact real solutions of `expr = 0` in `var`.
pub fn solve_real(
    ctx: &mut Context,
    expr: ExprId,
    var: &str,
    budget: &mut Budget,
) -> Result<PointSet, EngineError> {
    budget.charge(Operation::Solve, 1)?;

    if let Some(p) = Poly::from_expr(ctx, expr, var) {
        if p.is_zero() {
            return Err(EngineError::Unsupported(
                "zero set of an identically zero expression is not discrete".into(),
            ));
        }
        let roots = p.real_roots(ctx, budget)?;
        return Ok(PointSet::from_points(ctx, roots));
    }

    match ctx.get(expr).clone() {
        Expr::Constant(_) => Ok(PointSet::empty()),
        Expr::Neg(a) => solve_real(ctx, a, var, budget),
        Expr::Mul(a, b) => {
            let za = solve_real(ctx, a, var, budget)?;
            let zb = solve_real(ctx, b, var, budget)?;
            Ok(za.union(ctx, &zb))
        }
        Expr::Div(n, d) => {
            // Zeros of a quotient: zeros of the numerator that are not
            // zeros of the denominator.
            let zn = solve_real(ctx, n, var, budget)?;
            let zd = solve_real(ctx, d, var, budget)?;
            Ok(zn.difference(ctx, &zd))
        }
        Expr::Pow(b, e) => {
            // b^e = 0 only where b = 0 (positive exponent).
            let positive_exp =
                matches!(ctx.get(e), Expr::Number(n) if n.is_positive());
            if positive_exp {
                solve_real(ctx, b, var, budget)
            } else {
                Err(EngineError::Unsupported(
                    "zero set of a power with a non-constant or non-positive exponent".into(),
                ))
            }
        }
        Expr::Function(name, args) => {
            if args.len() != 1 {
                return Err(EngineError::UnknownFunction(name));
            }
            let u = args[0];
            match name.as_str() {
                // exp is nowhere zero on the reals
                "exp" => Ok(PointSet::empty()),
                "sqrt" | "abs" | "sign" => solve_real(ctx, u, var, budget),
                "ln" => {
                    // ln(u) = 0 iff u = 1
                    let one = ctx.num(1);
                    let shifted = ctx.add(Expr::Sub(u, one));
                    solve_real(ctx, shifted, var, budget)
                }
                "sin" | "cos" => Err(EngineError::Unsupported(format!(
                    "zero set of {name} is not finite"
                ))),
                _ => Err(EngineError::UnknownFunction(name)),
            }
        }
        _ => Err(EngineError::Unsupported(
            "no solving strategy for this expression form".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_linear() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let two = ctx.num(2);
        let e = ctx.add(Expr::Sub(x, two));
        let mut budget = Budget::with_defaults();
        let zeros = solve_real(&mut ctx, e, "x", &mut budget).unwrap();
        assert_eq!(zeros.len(), 1);
        assert!(zeros.contains(&ctx, two));
    }

    #[test]
    fn test_solve_product_unions_factors() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let one = ctx.num(1);
        let sin_x = ctx.call("sin", vec![x]);
        // sin(x) is unsupported, but abs(x) * (x - 1) works factor-wise
        let abs_x = ctx.call("abs", vec![x]);
        let lin = ctx.add(Expr::Sub(x, one));
        let prod = ctx.add(Expr::Mul(abs_x, lin));
        let mut budget = Budget::with_defaults();
        let zeros = solve_real(&mut ctx, prod, "x", &mut budget).unwrap();
        assert_eq!(zeros.len(), 2);

        let sin_prod = ctx.add(Expr::Mul(sin_x, lin));
        assert!(matches!(
            solve_real(&mut ctx, sin_prod, "x", &mut budget),
            Err(EngineError::Unsupported(_))
        ));
    }

    #[test]
    fn test_solve_exp_has_no_zeros() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let e = ctx.call("exp", vec![x]);
        let mut budget = Budget::with_defaults();
        assert!(solve_real(&mut ctx, e, "x", &mut budget)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_solve_ln_shifts_to_one() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let e = ctx.call("ln", vec![x]);
        let mut budget = Budget::with_defaults();
        let zeros = solve_real(&mut ctx, e, "x", &mut budget).unwrap();
        let one = ctx.num(1);
        assert!(zeros.contains(&ctx, one));
        assert_eq!(zeros.len(), 1);
    }

    #[test]
    fn test_solve_identically_zero_is_unsupported() {
        let mut ctx = Context::new();
        let zero = ctx.num(0);
        let mut budget = Budget::with_defaults();
        assert!(matches!(
            solve_real(&mut ctx, zero, "x", &mut budget),
            Err(EngineError::Unsupported(_))
        ));
    }
}
