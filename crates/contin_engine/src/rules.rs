//! Rewrite rules for algebraic simplification.
//!
//! All rules are strictly size- or degree-reducing, so the fixpoint loop
//! terminates without cycle detection; the budget still guards the loop.

use contin_ast::{Context, Expr, ExprId};
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::define_rule;
use crate::polynomial::Poly;
use crate::rule::Rewrite;
use crate::simplify::Simplifier;

pub fn register(simplifier: &mut Simplifier) {
    simplifier.add_rule(Box::new(CombineConstantsRule));
    simplifier.add_rule(Box::new(AddZeroRule));
    simplifier.add_rule(Box::new(SubZeroRule));
    simplifier.add_rule(Box::new(SubSelfRule));
    simplifier.add_rule(Box::new(MulOneRule));
    simplifier.add_rule(Box::new(MulZeroRule));
    simplifier.add_rule(Box::new(DivOneRule));
    simplifier.add_rule(Box::new(PowOneRule));
    simplifier.add_rule(Box::new(PowZeroRule));
    simplifier.add_rule(Box::new(DoubleNegRule));
    simplifier.add_rule(Box::new(EvalConstFunctionRule));
    simplifier.add_rule(Box::new(CancelCommonFactorsRule));
}

fn number(ctx: &Context, id: ExprId) -> Option<BigRational> {
    match ctx.get(id) {
        Expr::Number(n) => Some(n.clone()),
        _ => None,
    }
}

fn is_zero_number(ctx: &Context, id: ExprId) -> bool {
    matches!(ctx.get(id), Expr::Number(n) if n.is_zero())
}

define_rule!(
    /// Exact constant folding over every arithmetic node.
    CombineConstantsRule,
    "Combine Constants",
    |ctx, expr| {
        let node = ctx.get(expr).clone();
        let folded = match node {
            Expr::Add(a, b) => Some(number(ctx, a)? + number(ctx, b)?),
            Expr::Sub(a, b) => Some(number(ctx, a)? - number(ctx, b)?),
            Expr::Mul(a, b) => Some(number(ctx, a)? * number(ctx, b)?),
            Expr::Div(a, b) => {
                let d = number(ctx, b)?;
                // k/0 is a singular form, not a rewrite target.
                if d.is_zero() {
                    return None;
                }
                Some(number(ctx, a)? / d)
            }
            Expr::Neg(a) => Some(-number(ctx, a)?),
            Expr::Pow(a, b) => {
                let base = number(ctx, a)?;
                let exp = number(ctx, b)?;
                if !exp.is_integer() {
                    return None;
                }
                let e = exp.to_integer().to_i32()?;
                if e.unsigned_abs() > 64 {
                    return None;
                }
                if base.is_zero() && e <= 0 {
                    return None;
                }
                let pow = base.pow(e.unsigned_abs() as i32);
                Some(if e < 0 { BigRational::one() / pow } else { pow })
            }
            _ => None,
        }?;
        let new_expr = ctx.rational(folded);
        Some(Rewrite::simple(new_expr, "evaluate constant arithmetic"))
    }
);

define_rule!(AddZeroRule, "Identity Property of Addition", |ctx, expr| {
    if let Expr::Add(lhs, rhs) = ctx.get(expr).clone() {
        if is_zero_number(ctx, rhs) {
            return Some(Rewrite::simple(lhs, "x + 0 = x"));
        }
        if is_zero_number(ctx, lhs) {
            return Some(Rewrite::simple(rhs, "0 + x = x"));
        }
    }
    None
});

define_rule!(SubZeroRule, "Subtracting Zero", |ctx, expr| {
    if let Expr::Sub(lhs, rhs) = ctx.get(expr).clone() {
        if is_zero_number(ctx, rhs) {
            return Some(Rewrite::simple(lhs, "x - 0 = x"));
        }
        if is_zero_number(ctx, lhs) {
            let neg = ctx.add(Expr::Neg(rhs));
            return Some(Rewrite::simple(neg, "0 - x = -x"));
        }
    }
    None
});

define_rule!(SubSelfRule, "Subtracting Self", |ctx, expr| {
    // Interned arena: identical subtrees share one id.
    if let Expr::Sub(lhs, rhs) = ctx.get(expr).clone() {
        if lhs == rhs {
            let zero = ctx.num(0);
            return Some(Rewrite::simple(zero, "x - x = 0"));
        }
    }
    None
});

define_rule!(
    MulOneRule,
    "Identity Property of Multiplication",
    |ctx, expr| {
        if let Expr::Mul(lhs, rhs) = ctx.get(expr).clone() {
            if matches!(ctx.get(rhs), Expr::Number(n) if n.is_one()) {
                return Some(Rewrite::simple(lhs, "x * 1 = x"));
            }
            if matches!(ctx.get(lhs), Expr::Number(n) if n.is_one()) {
                return Some(Rewrite::simple(rhs, "1 * x = x"));
            }
        }
        None
    }
);

define_rule!(
    MulZeroRule,
    "Zero Property of Multiplication",
    |ctx, expr| {
        if let Expr::Mul(lhs, rhs) = ctx.get(expr).clone() {
            if is_zero_number(ctx, lhs) || is_zero_number(ctx, rhs) {
                let zero = ctx.num(0);
                return Some(Rewrite::simple(zero, "x * 0 = 0"));
            }
        }
        None
    }
);

define_rule!(DivOneRule, "Dividing by One", |ctx, expr| {
    if let Expr::Div(lhs, rhs) = ctx.get(expr).clone() {
        if matches!(ctx.get(rhs), Expr::Number(n) if n.is_one()) {
            return Some(Rewrite::simple(lhs, "x / 1 = x"));
        }
    }
    None
});

define_rule!(PowOneRule, "First Power", |ctx, expr| {
    if let Expr::Pow(base, exp) = ctx.get(expr).clone() {
        if matches!(ctx.get(exp), Expr::Number(n) if n.is_one()) {
            return Some(Rewrite::simple(base, "x^1 = x"));
        }
    }
    None
});

define_rule!(PowZeroRule, "Zeroth Power", |ctx, expr| {
    if let Expr::Pow(base, exp) = ctx.get(expr).clone() {
        if matches!(ctx.get(exp), Expr::Number(n) if n.is_zero())
            && !is_zero_number(ctx, base)
        {
            let one = ctx.num(1);
            return Some(Rewrite::simple(one, "x^0 = 1"));
        }
    }
    None
});

define_rule!(DoubleNegRule, "Double Negation", |ctx, expr| {
    if let Expr::Neg(inner) = ctx.get(expr) {
        if let Expr::Neg(x) = ctx.get(*inner) {
            return Some(Rewrite::simple(*x, "-(-x) = x"));
        }
    }
    None
});

define_rule!(
    /// Fold function applications with known exact values.
    EvalConstFunctionRule,
    "Evaluate Function of Constant",
    |ctx, expr| {
        let Expr::Function(name, args) = ctx.get(expr).clone() else {
            return None;
        };
        if args.len() != 1 {
            return None;
        }
        let arg = number(ctx, args[0]);
        let folded = match (name.as_str(), arg) {
            ("abs", Some(n)) => Some((n.abs(), "abs of a constant")),
            ("sign", Some(n)) => {
                let s = if n.is_zero() {
                    BigRational::zero()
                } else if n.is_negative() {
                    -BigRational::one()
                } else {
                    BigRational::one()
                };
                Some((s, "sign of a constant"))
            }
            ("sqrt", Some(n)) if !n.is_negative() => {
                let ns = n.numer().sqrt();
                let ds = n.denom().sqrt();
                (&ns * &ns == *n.numer() && &ds * &ds == *n.denom())
                    .then(|| (BigRational::new(ns, ds), "sqrt of a perfect square"))
            }
            ("ln", Some(n)) if n.is_one() => Some((BigRational::zero(), "ln(1) = 0")),
            ("exp", Some(n)) if n.is_zero() => Some((BigRational::one(), "exp(0) = 1")),
            ("sin", Some(n)) if n.is_zero() => Some((BigRational::zero(), "sin(0) = 0")),
            ("cos", Some(n)) if n.is_zero() => Some((BigRational::one(), "cos(0) = 1")),
            _ => None,
        };
        let (value, description) = folded?;
        let new_expr = ctx.rational(value);
        Some(Rewrite::simple(new_expr, description))
    }
);

define_rule!(
    /// Divide numerator and denominator of a polynomial fraction by their
    /// gcd. This is the rewrite that removes algebraically removable
    /// singular factors, e.g. `(x^2 - 1) / (x - 1)` → `x + 1`.
    CancelCommonFactorsRule,
    "Cancel Common Polynomial Factors",
    |ctx, expr| {
        let Expr::Div(num, den) = ctx.get(expr).clone() else {
            return None;
        };
        let var = single_variable(ctx, expr)?;
        let pn = Poly::from_expr(ctx, num, &var)?;
        let pd = Poly::from_expr(ctx, den, &var)?;
        if pd.is_zero() {
            return None;
        }
        let g = Poly::gcd(&pn, &pd);
        if g.degree() < 1 {
            return None;
        }
        let (qn, _) = pn.div_rem(&g)?;
        let (qd, _) = pd.div_rem(&g)?;
        let new_num = qn.to_expr(ctx, &var);
        let new_expr = if qd.is_constant() && qd.coeff(0).is_one() {
            new_num
        } else {
            let new_den = qd.to_expr(ctx, &var);
            ctx.add(Expr::Div(new_num, new_den))
        };
        Some(Rewrite::simple(
            new_expr,
            "cancelled the common polynomial factor",
        ))
    }
);

/// The single free variable of `expr`, when there is exactly one.
fn single_variable(ctx: &Context, expr: ExprId) -> Option<String> {
    let mut found: Option<String> = None;
    collect_single(ctx, expr, &mut found).then_some(())?;
    found
}

fn collect_single(ctx: &Context, expr: ExprId, found: &mut Option<String>) -> bool {
    match ctx.get(expr) {
        Expr::Number(_) | Expr::Constant(_) => true,
        Expr::Variable(name) => match found {
            Some(existing) => existing == name,
            None => {
                *found = Some(name.clone());
                true
            }
        },
        Expr::Add(a, b)
        | Expr::Sub(a, b)
        | Expr::Mul(a, b)
        | Expr::Div(a, b)
        | Expr::Pow(a, b) => {
            let (a, b) = (*a, *b);
            collect_single(ctx, a, found) && collect_single(ctx, b, found)
        }
        Expr::Neg(a) => collect_single(ctx, *a, found),
        Expr::Function(_, args) => {
            let args = args.clone();
            args.iter().all(|a| collect_single(ctx, *a, found))
        }
    }
}
