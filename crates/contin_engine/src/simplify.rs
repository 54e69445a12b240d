//! Fixpoint simplifier driving the rewrite rules bottom-up.

use contin_ast::{Context, DisplayExpr, Expr, ExprId};
use tracing::trace;

use crate::budget::{Budget, Operation};
use crate::error::EngineError;
use crate::rule::SimpleRule;
use crate::rules;

/// One applied rewrite, for didactic inspection of a simplification.
#[derive(Debug, Clone)]
pub struct Step {
    pub rule_name: String,
    pub description: String,
    pub before: ExprId,
    pub after: ExprId,
}

pub struct Simplifier {
    pub context: Context,
    rules: Vec<Box<dyn SimpleRule>>,
}

impl Default for Simplifier {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

impl Simplifier {
    /// An empty simplifier; rules must be added before it does anything.
    pub fn new() -> Self {
        Self {
            context: Context::new(),
            rules: Vec::new(),
        }
    }

    pub fn with_default_rules() -> Self {
        let mut s = Self::new();
        rules::register(&mut s);
        s
    }

    /// Default rules over an existing arena (expressions already built by
    /// the caller stay valid).
    pub fn with_context(context: Context) -> Self {
        let mut s = Self::with_default_rules();
        s.context = context;
        s
    }

    pub fn add_rule(&mut self, rule: Box<dyn SimpleRule>) {
        self.rules.push(rule);
    }

    /// Simplify to a fixpoint. Every rewrite charges the budget, so a
    /// pathological input fails with `BudgetExceeded` instead of spinning.
    pub fn simplify(
        &mut self,
        expr: ExprId,
        budget: &mut Budget,
    ) -> Result<(ExprId, Vec<Step>), EngineError> {
        let mut steps = Vec::new();
        let out = self.simplify_node(expr, budget, &mut steps)?;
        Ok((out, steps))
    }

    fn simplify_node(
        &mut self,
        id: ExprId,
        budget: &mut Budget,
        steps: &mut Vec<Step>,
    ) -> Result<ExprId, EngineError> {
        // Children first, rebuilding only when something changed
        // (interning makes the unchanged rebuild free).
        let rebuilt = match self.context.get(id).clone() {
            Expr::Add(a, b) => {
                let (a2, b2) = (
                    self.simplify_node(a, budget, steps)?,
                    self.simplify_node(b, budget, steps)?,
                );
                self.context.add(Expr::Add(a2, b2))
            }
            Expr::Sub(a, b) => {
                let (a2, b2) = (
                    self.simplify_node(a, budget, steps)?,
                    self.simplify_node(b, budget, steps)?,
                );
                self.context.add(Expr::Sub(a2, b2))
            }
            Expr::Mul(a, b) => {
                let (a2, b2) = (
                    self.simplify_node(a, budget, steps)?,
                    self.simplify_node(b, budget, steps)?,
                );
                self.context.add(Expr::Mul(a2, b2))
            }
            Expr::Div(a, b) => {
                let (a2, b2) = (
                    self.simplify_node(a, budget, steps)?,
                    self.simplify_node(b, budget, steps)?,
                );
                self.context.add(Expr::Div(a2, b2))
            }
            Expr::Pow(a, b) => {
                let (a2, b2) = (
                    self.simplify_node(a, budget, steps)?,
                    self.simplify_node(b, budget, steps)?,
                );
                self.context.add(Expr::Pow(a2, b2))
            }
            Expr::Neg(a) => {
                let a2 = self.simplify_node(a, budget, steps)?;
                self.context.add(Expr::Neg(a2))
            }
            Expr::Function(name, args) => {
                let mut new_args = Vec::with_capacity(args.len());
                for arg in args {
                    new_args.push(self.simplify_node(arg, budget, steps)?);
                }
                self.context.add(Expr::Function(name, new_args))
            }
            Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) => id,
        };

        let mut current = rebuilt;
        loop {
            let mut applied: Option<(ExprId, String, String)> = None;
            for rule in &self.rules {
                if let Some(rw) = rule.apply(&mut self.context, current) {
                    if rw.new_expr != current {
                        applied = Some((rw.new_expr, rule.name().to_string(), rw.description));
                        break;
                    }
                }
            }
            let Some((new_expr, rule_name, description)) = applied else {
                break;
            };
            budget.charge(Operation::Simplify, 1)?;
            trace!(
                rule = %rule_name,
                before = %DisplayExpr { context: &self.context, id: current },
                after = %DisplayExpr { context: &self.context, id: new_expr },
                "rewrite"
            );
            steps.push(Step {
                rule_name,
                description,
                before: current,
                after: new_expr,
            });
            // The rewrite may expose new opportunities below this node.
            current = self.simplify_node(new_expr, budget, steps)?;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contin_ast::ordering::get_number;
    use num_rational::BigRational;

    fn simplify(ctx_build: impl FnOnce(&mut Context) -> ExprId) -> (Simplifier, ExprId) {
        let mut ctx = Context::new();
        let expr = ctx_build(&mut ctx);
        let mut s = Simplifier::with_context(ctx);
        let mut budget = Budget::with_defaults();
        let (out, _) = s.simplify(expr, &mut budget).unwrap();
        (s, out)
    }

    #[test]
    fn test_end_to_end_constant_arithmetic() {
        // 2 * 3 + 0 -> 6
        let (s, out) = simplify(|ctx| {
            let two = ctx.num(2);
            let three = ctx.num(3);
            let zero = ctx.num(0);
            let mul = ctx.add(Expr::Mul(two, three));
            ctx.add(Expr::Add(mul, zero))
        });
        assert_eq!(
            get_number(&s.context, out),
            Some(BigRational::from_integer(6.into()))
        );
    }

    #[test]
    fn test_nested_constant_folding() {
        // (1 + 2) * (3 + 4) -> 21
        let (s, out) = simplify(|ctx| {
            let one = ctx.num(1);
            let two = ctx.num(2);
            let three = ctx.num(3);
            let four = ctx.num(4);
            let l = ctx.add(Expr::Add(one, two));
            let r = ctx.add(Expr::Add(three, four));
            ctx.add(Expr::Mul(l, r))
        });
        assert_eq!(
            get_number(&s.context, out),
            Some(BigRational::from_integer(21.into()))
        );
    }

    #[test]
    fn test_removable_factor_cancels() {
        // (x^2 - 1) / (x - 1) -> x + 1
        let (s, out) = simplify(|ctx| {
            let x = ctx.var("x");
            let one = ctx.num(1);
            let two = ctx.num(2);
            let x2 = ctx.add(Expr::Pow(x, two));
            let num = ctx.add(Expr::Sub(x2, one));
            let den = ctx.add(Expr::Sub(x, one));
            ctx.add(Expr::Div(num, den))
        });
        let p = crate::polynomial::Poly::from_expr(&s.context, out, "x").unwrap();
        assert_eq!(p.degree(), 1);
        assert_eq!(p.coeff(0), BigRational::from_integer(1.into()));
    }

    #[test]
    fn test_sin_x_over_x_is_stable() {
        // No trig expansion: sin(x)/x stays put.
        let (s, out) = simplify(|ctx| {
            let x = ctx.var("x");
            let sin_x = ctx.call("sin", vec![x]);
            ctx.add(Expr::Div(sin_x, x))
        });
        assert!(matches!(s.context.get(out), Expr::Div(_, _)));
    }

    #[test]
    fn test_simplify_is_idempotent() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let one = ctx.num(1);
        let two = ctx.num(2);
        let x2 = ctx.add(Expr::Pow(x, two));
        let num = ctx.add(Expr::Sub(x2, one));
        let den = ctx.add(Expr::Sub(x, one));
        let frac = ctx.add(Expr::Div(num, den));

        let mut s = Simplifier::with_context(ctx);
        let mut budget = Budget::with_defaults();
        let (once, _) = s.simplify(frac, &mut budget).unwrap();
        let (twice, _) = s.simplify(once, &mut budget).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_budget_exhaustion_is_an_error() {
        let mut ctx = Context::new();
        let one = ctx.num(1);
        let two = ctx.num(2);
        let mut expr = ctx.add(Expr::Add(one, two));
        for _ in 0..20 {
            expr = ctx.add(Expr::Add(expr, expr));
        }
        let mut s = Simplifier::with_context(ctx);
        let mut budget = Budget::unlimited();
        budget.set_limit(Operation::Simplify, 1);
        let err = s.simplify(expr, &mut budget).unwrap_err();
        assert!(matches!(err, EngineError::Budget(_)));
    }
}
