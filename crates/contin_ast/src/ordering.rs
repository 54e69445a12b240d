use std::cmp::Ordering;

use num_rational::BigRational;
use num_traits::ToPrimitive;

use crate::expression::{Constant, Context, Expr, ExprId};

/// Extract an exact rational value, looking through `Neg`.
pub fn get_number(ctx: &Context, expr: ExprId) -> Option<BigRational> {
    match ctx.get(expr) {
        Expr::Number(n) => Some(n.clone()),
        Expr::Neg(inner) => get_number(ctx, *inner).map(|n| -n),
        _ => None,
    }
}

pub fn is_infinity(ctx: &Context, expr: ExprId) -> bool {
    matches!(ctx.get(expr), Expr::Constant(Constant::Infinity))
}

pub fn is_neg_infinity(ctx: &Context, expr: ExprId) -> bool {
    match ctx.get(expr) {
        Expr::Neg(inner) => is_infinity(ctx, *inner),
        _ => false,
    }
}

/// Approximate a closed (variable-free) expression as `f64`, for ordering
/// exact points that are not plain rationals (e.g. `sqrt(2)`).
///
/// Returns `None` for free variables, undefined operations, or non-finite
/// intermediate values. Exact-set membership never relies on this; it is
/// used only to order points along the real line.
pub fn approx_value(ctx: &Context, expr: ExprId) -> Option<f64> {
    let v = match ctx.get(expr) {
        Expr::Number(n) => n.to_f64()?,
        Expr::Constant(Constant::Pi) => std::f64::consts::PI,
        Expr::Constant(Constant::E) => std::f64::consts::E,
        Expr::Constant(Constant::Infinity) => return None,
        Expr::Variable(_) => return None,
        Expr::Add(a, b) => approx_value(ctx, *a)? + approx_value(ctx, *b)?,
        Expr::Sub(a, b) => approx_value(ctx, *a)? - approx_value(ctx, *b)?,
        Expr::Mul(a, b) => approx_value(ctx, *a)? * approx_value(ctx, *b)?,
        Expr::Div(a, b) => approx_value(ctx, *a)? / approx_value(ctx, *b)?,
        Expr::Pow(a, b) => approx_value(ctx, *a)?.powf(approx_value(ctx, *b)?),
        Expr::Neg(a) => -approx_value(ctx, *a)?,
        Expr::Function(name, args) => {
            if args.len() != 1 {
                return None;
            }
            let a = approx_value(ctx, args[0])?;
            match name.as_str() {
                "sin" => a.sin(),
                "cos" => a.cos(),
                "exp" => a.exp(),
                "ln" => a.ln(),
                "sqrt" => a.sqrt(),
                "abs" => a.abs(),
                "sign" => {
                    if a == 0.0 {
                        0.0
                    } else {
                        a.signum()
                    }
                }
                _ => return None,
            }
        }
    };
    v.is_finite().then_some(v)
}

fn constant_rank(c: Constant) -> u8 {
    match c {
        Constant::Pi => 0,
        Constant::E => 1,
        Constant::Infinity => 2,
    }
}

fn variant_rank(expr: &Expr) -> u8 {
    match expr {
        Expr::Number(_) => 0,
        Expr::Constant(_) => 1,
        Expr::Variable(_) => 2,
        Expr::Add(_, _) => 3,
        Expr::Sub(_, _) => 4,
        Expr::Mul(_, _) => 5,
        Expr::Div(_, _) => 6,
        Expr::Pow(_, _) => 7,
        Expr::Neg(_) => 8,
        Expr::Function(_, _) => 9,
    }
}

/// Canonical structural order over expressions. Stable across calls for a
/// given arena; used as the fallback when values cannot be compared.
pub fn compare_expr(ctx: &Context, a: ExprId, b: ExprId) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    let ea = ctx.get(a);
    let eb = ctx.get(b);
    match (ea, eb) {
        (Expr::Number(x), Expr::Number(y)) => x.cmp(y),
        (Expr::Constant(x), Expr::Constant(y)) => constant_rank(*x).cmp(&constant_rank(*y)),
        (Expr::Variable(x), Expr::Variable(y)) => x.cmp(y),
        (Expr::Function(nx, ax), Expr::Function(ny, ay)) => nx
            .cmp(ny)
            .then_with(|| ax.len().cmp(&ay.len()))
            .then_with(|| {
                for (x, y) in ax.iter().zip(ay.iter()) {
                    let ord = compare_expr(ctx, *x, *y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            }),
        (Expr::Neg(x), Expr::Neg(y)) => compare_expr(ctx, *x, *y),
        (Expr::Add(xa, xb), Expr::Add(ya, yb))
        | (Expr::Sub(xa, xb), Expr::Sub(ya, yb))
        | (Expr::Mul(xa, xb), Expr::Mul(ya, yb))
        | (Expr::Div(xa, xb), Expr::Div(ya, yb))
        | (Expr::Pow(xa, xb), Expr::Pow(ya, yb)) => {
            compare_expr(ctx, *xa, *ya).then_with(|| compare_expr(ctx, *xb, *yb))
        }
        _ => variant_rank(ea).cmp(&variant_rank(eb)),
    }
}

/// Order two exact points along the real line.
///
/// ±∞ sorts to the ends, exact rationals compare exactly, other closed
/// forms compare through their `f64` approximation, and anything left falls
/// back to the structural order.
pub fn compare_values(ctx: &Context, a: ExprId, b: ExprId) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    let a_neg_inf = is_neg_infinity(ctx, a);
    let b_neg_inf = is_neg_infinity(ctx, b);
    if a_neg_inf || b_neg_inf {
        return match (a_neg_inf, b_neg_inf) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            _ => Ordering::Greater,
        };
    }
    let a_inf = is_infinity(ctx, a);
    let b_inf = is_infinity(ctx, b);
    if a_inf || b_inf {
        return match (a_inf, b_inf) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            _ => Ordering::Less,
        };
    }

    if let (Some(x), Some(y)) = (get_number(ctx, a), get_number(ctx, b)) {
        return x.cmp(&y);
    }

    if let (Some(x), Some(y)) = (approx_value(ctx, a), approx_value(ctx, b)) {
        if let Some(ord) = x.partial_cmp(&y) {
            if ord != Ordering::Equal {
                return ord;
            }
        }
    }

    compare_expr(ctx, a, b)
}

/// Sort exact points along the real line and drop duplicates.
pub fn sort_and_dedup_points(ctx: &Context, points: &mut Vec<ExprId>) {
    points.sort_by(|a, b| compare_values(ctx, *a, *b));
    points.dedup_by(|a, b| compare_values(ctx, *a, *b) == Ordering::Equal);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_values_numbers_and_infinities() {
        let mut ctx = Context::new();
        let one = ctx.num(1);
        let two = ctx.num(2);
        let pos = ctx.pos_inf();
        let neg = ctx.neg_inf();

        assert_eq!(compare_values(&ctx, one, two), Ordering::Less);
        assert_eq!(compare_values(&ctx, neg, one), Ordering::Less);
        assert_eq!(compare_values(&ctx, pos, two), Ordering::Greater);
        assert_eq!(compare_values(&ctx, neg, pos), Ordering::Less);
    }

    #[test]
    fn test_compare_values_irrational_point() {
        let mut ctx = Context::new();
        let two = ctx.num(2);
        let sqrt2 = ctx.call("sqrt", vec![two]);
        let one = ctx.num(1);
        let three = ctx.num(3);

        assert_eq!(compare_values(&ctx, one, sqrt2), Ordering::Less);
        assert_eq!(compare_values(&ctx, sqrt2, three), Ordering::Less);
    }

    #[test]
    fn test_sort_and_dedup() {
        let mut ctx = Context::new();
        let one = ctx.num(1);
        let two = ctx.num(2);
        let mut points = vec![two, one, two];
        sort_and_dedup_points(&ctx, &mut points);
        assert_eq!(points, vec![one, two]);
    }

    #[test]
    fn test_get_number_through_neg() {
        let mut ctx = Context::new();
        let three = ctx.num(3);
        let neg = ctx.add(Expr::Neg(three));
        assert_eq!(
            get_number(&ctx, neg),
            Some(BigRational::from_integer((-3).into()))
        );
    }
}
