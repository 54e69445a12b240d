//! One-sided limits at a finite point.
//!
//! Two strategies, tried in order:
//!
//! 1. **Exact rational path**: polynomials and polynomial fractions.
//!    Common root orders at the point are deflated away, so removable
//!    forms evaluate exactly and poles get a signed infinity from the
//!    approach side and the residual sign.
//! 2. **Numeric probe**: a geometric ladder of one-sided sample points
//!    with one step of Richardson extrapolation. Conservative policy: a
//!    ladder that neither converges nor cleanly diverges is `Unresolved`,
//!    never a guess.

use contin_ast::{Context, Expr, ExprId};
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive};
use tracing::debug;

use crate::budget::{Budget, Operation};
use crate::error::EngineError;
use crate::numeric::eval_f64;
use crate::polynomial::Poly;
use crate::substitute::substitute;

/// Direction of approach to the point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approach {
    /// x -> a⁻
    Below,
    /// x -> a⁺
    Above,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LimitValue {
    Finite(f64),
    PosInfinity,
    NegInfinity,
    Unresolved,
}

/// Probe offsets are 10^-2 .. 10^-8.
const PROBE_MIN_EXP: i32 = 2;
const PROBE_MAX_EXP: i32 = 8;
/// Convergence tolerance on the extrapolated ladder, relative to
/// max(1, |limit|).
const CONVERGENCE_RTOL: f64 = 1e-8;
/// Magnitude past which a growing ladder is read as a signed infinity.
const DIVERGENCE_MAGNITUDE: f64 = 1e8;

/// One-sided limit of `expr` at `point`.
pub fn limit(
    ctx: &mut Context,
    expr: ExprId,
    var: &str,
    point: &BigRational,
    approach: Approach,
    budget: &mut Budget,
) -> Result<LimitValue, EngineError> {
    if let Some(v) = rational_limit(ctx, expr, var, point, approach)? {
        debug!(?approach, ?v, "limit resolved exactly");
        return Ok(v);
    }
    let v = probe_limit(ctx, expr, var, point, approach, budget)?;
    debug!(?approach, ?v, "limit resolved by probing");
    Ok(v)
}

fn to_finite(v: BigRational) -> Result<LimitValue, EngineError> {
    v.to_f64()
        .filter(|x| x.is_finite())
        .map(LimitValue::Finite)
        .ok_or_else(|| EngineError::NonFinite("limit value overflows f64".into()))
}

/// Exact path for polynomials and polynomial fractions. `Ok(None)` means
/// the expression is not rational in `var`.
fn rational_limit(
    ctx: &Context,
    expr: ExprId,
    var: &str,
    point: &BigRational,
    approach: Approach,
) -> Result<Option<LimitValue>, EngineError> {
    if let Some(p) = Poly::from_expr(ctx, expr, var) {
        return to_finite(p.eval(point)).map(Some);
    }
    let Expr::Div(n, d) = ctx.get(expr) else {
        return Ok(None);
    };
    let (Some(pn), Some(pd)) = (
        Poly::from_expr(ctx, *n, var),
        Poly::from_expr(ctx, *d, var),
    ) else {
        return Ok(None);
    };
    if pd.is_zero() {
        return Err(EngineError::Undefined(
            "division by the zero polynomial".into(),
        ));
    }
    if pn.is_zero() {
        return Ok(Some(LimitValue::Finite(0.0)));
    }

    let den_order = pd.root_order(point);
    if den_order == 0 {
        return to_finite(pn.eval(point) / pd.eval(point)).map(Some);
    }
    let num_order = pn.root_order(point);
    if num_order >= den_order {
        // Removable: deflate the shared order and evaluate.
        let mut a = pn;
        let mut b = pd;
        for _ in 0..den_order {
            a = a.deflate(point);
            b = b.deflate(point);
        }
        return to_finite(a.eval(point) / b.eval(point)).map(Some);
    }

    // Pole of order k: f ~ c * (x - a)^(-k) near a.
    let k = den_order - num_order;
    let mut a = pn;
    for _ in 0..num_order {
        a = a.deflate(point);
    }
    let mut b = pd;
    for _ in 0..den_order {
        b = b.deflate(point);
    }
    let residual = a.eval(point) / b.eval(point);
    let mut positive = residual.is_positive();
    if approach == Approach::Below && k % 2 == 1 {
        positive = !positive;
    }
    Ok(Some(if positive {
        LimitValue::PosInfinity
    } else {
        LimitValue::NegInfinity
    }))
}

/// Numeric one-sided probe with Richardson extrapolation.
fn probe_limit(
    ctx: &mut Context,
    expr: ExprId,
    var: &str,
    point: &BigRational,
    approach: Approach,
    budget: &mut Budget,
) -> Result<LimitValue, EngineError> {
    let mut samples: Vec<Option<f64>> = Vec::new();
    for k in PROBE_MIN_EXP..=PROBE_MAX_EXP {
        budget.charge(Operation::Limit, 1)?;
        let h = 10f64.powi(-k);
        let offset = BigRational::from_float(h)
            .ok_or_else(|| EngineError::NonFinite("probe offset".into()))?;
        let x = match approach {
            Approach::Above => point + offset,
            Approach::Below => point - offset,
        };
        let xid = ctx.rational(x);
        let at = substitute(ctx, expr, var, xid);
        samples.push(eval_f64(ctx, at).ok());
    }

    // Use the trailing run of defined samples, closest to the point.
    let tail: Vec<f64> = samples
        .iter()
        .rev()
        .take_while(|s| s.is_some())
        .filter_map(|s| *s)
        .collect();
    let tail: Vec<f64> = tail.into_iter().rev().collect();
    if tail.is_empty() {
        return Err(EngineError::Undefined(
            "expression is undefined arbitrarily close to the point on this side".into(),
        ));
    }
    if tail.len() < 3 {
        return Ok(LimitValue::Unresolved);
    }

    let last = tail[tail.len() - 1];
    let prev = tail[tail.len() - 2];
    if last.abs() > DIVERGENCE_MAGNITUDE && last.abs() >= 3.0 * prev.abs() {
        return Ok(if last > 0.0 {
            LimitValue::PosInfinity
        } else {
            LimitValue::NegInfinity
        });
    }

    // First-order Richardson on the geometric ladder: with h shrinking by
    // 10 each step, L_i = (10 v_i - v_{i-1}) / 9 cancels the O(h) term.
    let extrapolated: Vec<f64> = tail
        .windows(2)
        .map(|w| (10.0 * w[1] - w[0]) / 9.0)
        .collect();
    let l_last = extrapolated[extrapolated.len() - 1];
    let l_prev = extrapolated[extrapolated.len() - 2];
    let scale = l_last.abs().max(1.0);
    if (l_last - l_prev).abs() <= CONVERGENCE_RTOL * scale {
        Ok(LimitValue::Finite(l_last))
    } else {
        Ok(LimitValue::Unresolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rat(n: i64, d: i64) -> BigRational {
        BigRational::new(n.into(), d.into())
    }

    #[test]
    fn test_polynomial_limit_is_exact() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let one = ctx.num(1);
        let e = ctx.add(Expr::Add(x, one));
        let mut budget = Budget::with_defaults();
        let v = limit(&mut ctx, e, "x", &rat(2, 1), Approach::Above, &mut budget).unwrap();
        assert_eq!(v, LimitValue::Finite(3.0));
    }

    #[test]
    fn test_pole_signs_of_one_over_x() {
        let mut ctx = Context::new();
        let one = ctx.num(1);
        let x = ctx.var("x");
        let e = ctx.add(Expr::Div(one, x));
        let mut budget = Budget::with_defaults();
        let above = limit(&mut ctx, e, "x", &rat(0, 1), Approach::Above, &mut budget).unwrap();
        let below = limit(&mut ctx, e, "x", &rat(0, 1), Approach::Below, &mut budget).unwrap();
        assert_eq!(above, LimitValue::PosInfinity);
        assert_eq!(below, LimitValue::NegInfinity);
    }

    #[test]
    fn test_even_pole_is_positive_on_both_sides() {
        let mut ctx = Context::new();
        let one = ctx.num(1);
        let x = ctx.var("x");
        let two = ctx.num(2);
        let x2 = ctx.add(Expr::Pow(x, two));
        let e = ctx.add(Expr::Div(one, x2));
        let mut budget = Budget::with_defaults();
        let above = limit(&mut ctx, e, "x", &rat(0, 1), Approach::Above, &mut budget).unwrap();
        let below = limit(&mut ctx, e, "x", &rat(0, 1), Approach::Below, &mut budget).unwrap();
        assert_eq!(above, LimitValue::PosInfinity);
        assert_eq!(below, LimitValue::PosInfinity);
    }

    #[test]
    fn test_removable_fraction_limit() {
        // (x^2 - 1) / (x - 1) -> 2 at x = 1, without simplification
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let one = ctx.num(1);
        let two = ctx.num(2);
        let x2 = ctx.add(Expr::Pow(x, two));
        let num = ctx.add(Expr::Sub(x2, one));
        let den = ctx.add(Expr::Sub(x, one));
        let e = ctx.add(Expr::Div(num, den));
        let mut budget = Budget::with_defaults();
        let v = limit(&mut ctx, e, "x", &rat(1, 1), Approach::Below, &mut budget).unwrap();
        assert_eq!(v, LimitValue::Finite(2.0));
    }

    #[test]
    fn test_probe_converges_on_sin_x_over_x() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let sin_x = ctx.call("sin", vec![x]);
        let e = ctx.add(Expr::Div(sin_x, x));
        let mut budget = Budget::with_defaults();
        let v = limit(&mut ctx, e, "x", &rat(0, 1), Approach::Above, &mut budget).unwrap();
        match v {
            LimitValue::Finite(l) => assert!((l - 1.0).abs() < 1e-9),
            other => panic!("expected finite limit, got {:?}", other),
        }
    }

    #[test]
    fn test_probe_sees_jump_sides_differently() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let e = ctx.call("sign", vec![x]);
        let mut budget = Budget::with_defaults();
        let above = limit(&mut ctx, e, "x", &rat(0, 1), Approach::Above, &mut budget).unwrap();
        let below = limit(&mut ctx, e, "x", &rat(0, 1), Approach::Below, &mut budget).unwrap();
        assert_eq!(above, LimitValue::Finite(1.0));
        assert_eq!(below, LimitValue::Finite(-1.0));
    }

    #[test]
    fn test_probe_of_undefined_side_errors() {
        // ln(x) has no real values left of 0
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let e = ctx.call("ln", vec![x]);
        let mut budget = Budget::with_defaults();
        let minus_one = rat(-1, 1);
        assert!(matches!(
            limit(&mut ctx, e, "x", &minus_one, Approach::Above, &mut budget),
            Err(EngineError::Undefined(_))
        ));
    }

    #[test]
    fn test_probe_budget_is_charged() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let e = ctx.call("sin", vec![x]);
        let mut budget = Budget::unlimited();
        budget.set_limit(Operation::Limit, 2);
        assert!(matches!(
            limit(&mut ctx, e, "x", &rat(0, 1), Approach::Above, &mut budget),
            Err(EngineError::Budget(_))
        ));
    }
}
