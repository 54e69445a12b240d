//! The `Numeric` boundary: reduce a closed exact expression to `f64`.
//!
//! This is the only place finite precision enters the engine. Undefined
//! forms are reported as errors, never leaked as NaN or ±∞.

use contin_ast::{Constant, Context, DisplayExpr, Expr, ExprId};
use num_rational::BigRational;
use num_traits::ToPrimitive;

use crate::error::EngineError;

/// Borrow the exact rational value of a `Number` node.
pub fn as_number(ctx: &Context, id: ExprId) -> Option<&BigRational> {
    match ctx.get(id) {
        Expr::Number(n) => Some(n),
        _ => None,
    }
}

fn non_finite(ctx: &Context, id: ExprId) -> EngineError {
    EngineError::NonFinite(format!("{}", DisplayExpr { context: ctx, id }))
}

/// Evaluate a closed (variable-free) expression to a finite `f64`.
pub fn eval_f64(ctx: &Context, id: ExprId) -> Result<f64, EngineError> {
    let v = match ctx.get(id) {
        Expr::Number(n) => n.to_f64().ok_or_else(|| non_finite(ctx, id))?,
        Expr::Constant(Constant::Pi) => std::f64::consts::PI,
        Expr::Constant(Constant::E) => std::f64::consts::E,
        Expr::Constant(Constant::Infinity) => {
            return Err(non_finite(ctx, id));
        }
        Expr::Variable(name) => return Err(EngineError::FreeVariable(name.clone())),
        Expr::Add(a, b) => eval_f64(ctx, *a)? + eval_f64(ctx, *b)?,
        Expr::Sub(a, b) => eval_f64(ctx, *a)? - eval_f64(ctx, *b)?,
        Expr::Mul(a, b) => eval_f64(ctx, *a)? * eval_f64(ctx, *b)?,
        Expr::Div(a, b) => {
            let denom = eval_f64(ctx, *b)?;
            if denom == 0.0 {
                return Err(EngineError::Undefined("division by zero".into()));
            }
            eval_f64(ctx, *a)? / denom
        }
        Expr::Pow(a, b) => {
            let base = eval_f64(ctx, *a)?;
            let exp = eval_f64(ctx, *b)?;
            if base == 0.0 && exp < 0.0 {
                return Err(EngineError::Undefined("zero to a negative power".into()));
            }
            base.powf(exp)
        }
        Expr::Neg(a) => -eval_f64(ctx, *a)?,
        Expr::Function(name, args) => {
            if args.len() != 1 {
                return Err(EngineError::UnknownFunction(name.clone()));
            }
            let x = eval_f64(ctx, args[0])?;
            match name.as_str() {
                "sin" => x.sin(),
                "cos" => x.cos(),
                "exp" => x.exp(),
                "ln" => {
                    if x <= 0.0 {
                        return Err(EngineError::Undefined(
                            "ln of a non-positive argument".into(),
                        ));
                    }
                    x.ln()
                }
                "sqrt" => {
                    if x < 0.0 {
                        return Err(EngineError::Undefined(
                            "sqrt of a negative argument".into(),
                        ));
                    }
                    x.sqrt()
                }
                "abs" => x.abs(),
                "sign" => {
                    if x == 0.0 {
                        0.0
                    } else {
                        x.signum()
                    }
                }
                _ => return Err(EngineError::UnknownFunction(name.clone())),
            }
        }
    };
    if !v.is_finite() {
        return Err(non_finite(ctx, id));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_arithmetic() {
        let mut ctx = Context::new();
        let two = ctx.num(2);
        let seven = ctx.num(7);
        let e = ctx.add(Expr::Mul(two, seven));
        assert_eq!(eval_f64(&ctx, e).unwrap(), 14.0);
    }

    #[test]
    fn test_eval_sign_of_zero() {
        let mut ctx = Context::new();
        let zero = ctx.num(0);
        let e = ctx.call("sign", vec![zero]);
        assert_eq!(eval_f64(&ctx, e).unwrap(), 0.0);
    }

    #[test]
    fn test_division_by_zero_is_undefined() {
        let mut ctx = Context::new();
        let one = ctx.num(1);
        let zero = ctx.num(0);
        let e = ctx.add(Expr::Div(one, zero));
        assert!(matches!(
            eval_f64(&ctx, e),
            Err(EngineError::Undefined(_))
        ));
    }

    #[test]
    fn test_ln_of_negative_is_undefined() {
        let mut ctx = Context::new();
        let neg = ctx.num(-1);
        let e = ctx.call("ln", vec![neg]);
        assert!(matches!(
            eval_f64(&ctx, e),
            Err(EngineError::Undefined(_))
        ));
    }

    #[test]
    fn test_free_variable_is_an_error() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        assert!(matches!(
            eval_f64(&ctx, x),
            Err(EngineError::FreeVariable(_))
        ));
    }

    #[test]
    fn test_exact_sqrt_point_evaluates() {
        let mut ctx = Context::new();
        let two = ctx.num(2);
        let e = ctx.call("sqrt", vec![two]);
        let v = eval_f64(&ctx, e).unwrap();
        assert!((v - std::f64::consts::SQRT_2).abs() < 1e-15);
    }
}
