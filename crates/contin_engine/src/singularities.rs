//! Singularity scan and defined-region computation.
//!
//! `singularities` collects the exact points where an expression is
//! undefined or blows up: zeros of every denominator, poles of `ln`,
//! bases of negative powers. `defined_region` captures the interval
//! constraints that are not point-shaped (`ln(u)` needs `u > 0`,
//! `sqrt(u)` needs `u >= 0`).

use contin_ast::{BoundType, Context, Expr, ExprId, Interval, PointSet, RealSet};
use num_traits::Signed;
use tracing::debug;

use crate::budget::{Budget, Operation};
use crate::error::EngineError;
use crate::polynomial::Poly;
use crate::solve::solve_real;

/// Exact singular points of `expr` with respect to `var`.
pub fn singularities(
    ctx: &mut Context,
    expr: ExprId,
    var: &str,
    budget: &mut Budget,
) -> Result<PointSet, EngineError> {
    budget.charge(Operation::Solve, 1)?;
    let set = match ctx.get(expr).clone() {
        Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) => PointSet::empty(),
        Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) => {
            let sa = singularities(ctx, a, var, budget)?;
            let sb = singularities(ctx, b, var, budget)?;
            sa.union(ctx, &sb)
        }
        Expr::Neg(a) => singularities(ctx, a, var, budget)?,
        Expr::Div(n, d) => {
            let sn = singularities(ctx, n, var, budget)?;
            let sd = singularities(ctx, d, var, budget)?;
            let zeros = if ctx.contains_var(d, var) {
                solve_real(ctx, d, var, budget)?
            } else {
                // Constant denominator: 1/0 is undefined everywhere it
                // appears, which the region/evaluation layers report.
                PointSet::empty()
            };
            sn.union(ctx, &sd).union(ctx, &zeros)
        }
        Expr::Pow(b, e) => {
            let sb = singularities(ctx, b, var, budget)?;
            let se = singularities(ctx, e, var, budget)?;
            let negative_exp = matches!(ctx.get(e), Expr::Number(n) if n.is_negative());
            let extra = if negative_exp && ctx.contains_var(b, var) {
                solve_real(ctx, b, var, budget)?
            } else if ctx.contains_var(b, var) && ctx.contains_var(e, var) {
                return Err(EngineError::Unsupported(
                    "singularities of a variable-base, variable-exponent power".into(),
                ));
            } else {
                PointSet::empty()
            };
            sb.union(ctx, &se).union(ctx, &extra)
        }
        Expr::Function(name, args) => {
            if args.len() != 1 {
                return Err(EngineError::UnknownFunction(name));
            }
            let u = args[0];
            let su = singularities(ctx, u, var, budget)?;
            match name.as_str() {
                // ln has a pole wherever its argument vanishes
                "ln" if ctx.contains_var(u, var) => {
                    let zeros = solve_real(ctx, u, var, budget)?;
                    su.union(ctx, &zeros)
                }
                "ln" | "sin" | "cos" | "exp" | "sqrt" | "abs" | "sign" => su,
                _ => return Err(EngineError::UnknownFunction(name)),
            }
        }
    };
    Ok(set)
}

/// The region where every function application in `expr` is real-valued:
/// the constrained-solving leg of domain resolution. Point-shaped
/// exclusions are `singularities`' concern, not this one's.
pub fn defined_region(
    ctx: &mut Context,
    expr: ExprId,
    var: &str,
    budget: &mut Budget,
) -> Result<RealSet, EngineError> {
    budget.charge(Operation::Solve, 1)?;
    let region = match ctx.get(expr).clone() {
        Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) => RealSet::AllReals,
        Expr::Add(a, b)
        | Expr::Sub(a, b)
        | Expr::Mul(a, b)
        | Expr::Div(a, b)
        | Expr::Pow(a, b) => {
            let ra = defined_region(ctx, a, var, budget)?;
            let rb = defined_region(ctx, b, var, budget)?;
            ra.intersect(ctx, rb)
        }
        Expr::Neg(a) => defined_region(ctx, a, var, budget)?,
        Expr::Function(name, args) => {
            if args.len() != 1 {
                return Err(EngineError::UnknownFunction(name));
            }
            let u = args[0];
            let ru = defined_region(ctx, u, var, budget)?;
            let constraint = match name.as_str() {
                "ln" => sign_region(ctx, u, var, true)?,
                "sqrt" => sign_region(ctx, u, var, false)?,
                "sin" | "cos" | "exp" | "abs" | "sign" => RealSet::AllReals,
                _ => return Err(EngineError::UnknownFunction(name)),
            };
            ru.intersect(ctx, constraint)
        }
    };
    debug!(region = ?region, "defined region computed");
    Ok(region)
}

/// Solve `u > 0` (strict) or `u >= 0` for constant and linear `u`.
fn sign_region(
    ctx: &mut Context,
    u: ExprId,
    var: &str,
    strict: bool,
) -> Result<RealSet, EngineError> {
    let Some(p) = Poly::from_expr(ctx, u, var) else {
        return Err(EngineError::Unsupported(
            "sign constraint on a non-polynomial argument".into(),
        ));
    };
    if p.is_constant() {
        let c = p.coeff(0);
        let ok = if strict {
            c.is_positive()
        } else {
            !c.is_negative()
        };
        return Ok(if ok { RealSet::AllReals } else { RealSet::Empty });
    }
    if p.degree() > 1 {
        return Err(EngineError::Unsupported(
            "sign constraint on a higher-degree argument".into(),
        ));
    }
    // a*x + b compared with 0 flips direction with the sign of a.
    let a = p.coeff(1);
    let b = p.coeff(0);
    let root = ctx.rational(-b / &a);
    let bound = if strict {
        BoundType::Open
    } else {
        BoundType::Closed
    };
    let interval = if a.is_positive() {
        let max = ctx.pos_inf();
        Interval {
            min: root,
            min_type: bound,
            max,
            max_type: BoundType::Open,
        }
    } else {
        let min = ctx.neg_inf();
        Interval {
            min,
            min_type: BoundType::Open,
            max: root,
            max_type: bound,
        }
    };
    Ok(RealSet::Continuous(interval))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_over_x_singular_at_zero() {
        let mut ctx = Context::new();
        let one = ctx.num(1);
        let x = ctx.var("x");
        let e = ctx.add(Expr::Div(one, x));
        let mut budget = Budget::with_defaults();
        let sing = singularities(&mut ctx, e, "x", &mut budget).unwrap();
        let zero = ctx.num(0);
        assert_eq!(sing.len(), 1);
        assert!(sing.contains(&ctx, zero));
    }

    #[test]
    fn test_nested_denominators_all_collected() {
        // 1 / (x - 1) + 1 / (x + 2)
        let mut ctx = Context::new();
        let one = ctx.num(1);
        let two = ctx.num(2);
        let x = ctx.var("x");
        let d1 = ctx.add(Expr::Sub(x, one));
        let d2 = ctx.add(Expr::Add(x, two));
        let f1 = ctx.add(Expr::Div(one, d1));
        let f2 = ctx.add(Expr::Div(one, d2));
        let e = ctx.add(Expr::Add(f1, f2));
        let mut budget = Budget::with_defaults();
        let sing = singularities(&mut ctx, e, "x", &mut budget).unwrap();
        assert_eq!(sing.len(), 2);
        let minus_two = ctx.num(-2);
        assert!(sing.contains(&ctx, one));
        assert!(sing.contains(&ctx, minus_two));
    }

    #[test]
    fn test_negative_power_is_a_pole() {
        // x^(-2) is singular at 0
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let minus_two = ctx.num(-2);
        let e = ctx.add(Expr::Pow(x, minus_two));
        let mut budget = Budget::with_defaults();
        let sing = singularities(&mut ctx, e, "x", &mut budget).unwrap();
        let zero = ctx.num(0);
        assert!(sing.contains(&ctx, zero));
    }

    #[test]
    fn test_ln_pole_at_argument_zero() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let e = ctx.call("ln", vec![x]);
        let mut budget = Budget::with_defaults();
        let sing = singularities(&mut ctx, e, "x", &mut budget).unwrap();
        let zero = ctx.num(0);
        assert!(sing.contains(&ctx, zero));
    }

    #[test]
    fn test_sign_has_no_singularities() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let e = ctx.call("sign", vec![x]);
        let mut budget = Budget::with_defaults();
        assert!(singularities(&mut ctx, e, "x", &mut budget)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_defined_region_of_ln() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let e = ctx.call("ln", vec![x]);
        let mut budget = Budget::with_defaults();
        let region = defined_region(&mut ctx, e, "x", &mut budget).unwrap();
        let one = ctx.num(1);
        let zero = ctx.num(0);
        let minus_one = ctx.num(-1);
        assert!(region.contains(&ctx, one));
        assert!(!region.contains(&ctx, zero));
        assert!(!region.contains(&ctx, minus_one));
    }

    #[test]
    fn test_defined_region_of_sqrt_is_closed_at_zero() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let e = ctx.call("sqrt", vec![x]);
        let mut budget = Budget::with_defaults();
        let region = defined_region(&mut ctx, e, "x", &mut budget).unwrap();
        let zero = ctx.num(0);
        let minus_one = ctx.num(-1);
        assert!(region.contains(&ctx, zero));
        assert!(!region.contains(&ctx, minus_one));
    }

    #[test]
    fn test_defined_region_of_rational_function_is_all_reals() {
        let mut ctx = Context::new();
        let one = ctx.num(1);
        let x = ctx.var("x");
        let e = ctx.add(Expr::Div(one, x));
        let mut budget = Budget::with_defaults();
        assert_eq!(
            defined_region(&mut ctx, e, "x", &mut budget).unwrap(),
            RealSet::AllReals
        );
    }

    #[test]
    fn test_unknown_function_is_an_error() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let e = ctx.call("gamma", vec![x]);
        let mut budget = Budget::with_defaults();
        assert!(matches!(
            singularities(&mut ctx, e, "x", &mut budget),
            Err(EngineError::UnknownFunction(_))
        ));
    }
}
