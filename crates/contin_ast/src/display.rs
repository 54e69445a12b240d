use std::fmt;

use num_traits::Signed;

use crate::expression::{Constant, Context, Expr, ExprId};

/// Borrow-pair for rendering an arena expression with `format!`/`{}`.
pub struct DisplayExpr<'a> {
    pub context: &'a Context,
    pub id: ExprId,
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Add(_, _) | Expr::Sub(_, _) => 1,
        Expr::Mul(_, _) | Expr::Div(_, _) => 2,
        Expr::Pow(_, _) => 3,
        Expr::Neg(_) => 4,
        Expr::Number(n) if n.is_negative() => 4,
        Expr::Function(_, _) | Expr::Number(_) | Expr::Variable(_) | Expr::Constant(_) => 5,
    }
}

fn write_child(
    f: &mut fmt::Formatter<'_>,
    ctx: &Context,
    child: ExprId,
    parent_prec: u8,
    parens_on_equal: bool,
) -> fmt::Result {
    let child_prec = precedence(ctx.get(child));
    let needs_parens = if parens_on_equal {
        child_prec <= parent_prec
    } else {
        child_prec < parent_prec
    };
    if needs_parens {
        write!(
            f,
            "({})",
            DisplayExpr {
                context: ctx,
                id: child
            }
        )
    } else {
        write!(
            f,
            "{}",
            DisplayExpr {
                context: ctx,
                id: child
            }
        )
    }
}

impl fmt::Display for DisplayExpr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctx = self.context;
        let my_prec = precedence(ctx.get(self.id));
        match ctx.get(self.id) {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Constant(Constant::Pi) => write!(f, "pi"),
            Expr::Constant(Constant::E) => write!(f, "e"),
            Expr::Constant(Constant::Infinity) => write!(f, "oo"),
            Expr::Variable(name) => write!(f, "{}", name),
            Expr::Add(l, r) => {
                write_child(f, ctx, *l, my_prec, false)?;
                write!(f, " + ")?;
                write_child(f, ctx, *r, my_prec, false)
            }
            Expr::Sub(l, r) => {
                write_child(f, ctx, *l, my_prec, false)?;
                write!(f, " - ")?;
                // Subtraction is left-associative: a - (b - c) keeps parens.
                write_child(f, ctx, *r, my_prec, true)
            }
            Expr::Mul(l, r) => {
                write_child(f, ctx, *l, my_prec, false)?;
                write!(f, " * ")?;
                write_child(f, ctx, *r, my_prec, false)
            }
            Expr::Div(l, r) => {
                write_child(f, ctx, *l, my_prec, false)?;
                write!(f, " / ")?;
                write_child(f, ctx, *r, my_prec, true)
            }
            Expr::Pow(b, e) => {
                write_child(f, ctx, *b, my_prec, false)?;
                write!(f, "^")?;
                write_child(f, ctx, *e, my_prec, false)
            }
            Expr::Neg(e) => {
                write!(f, "-")?;
                write_child(f, ctx, *e, my_prec, false)
            }
            Expr::Function(name, args) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(
                        f,
                        "{}",
                        DisplayExpr {
                            context: ctx,
                            id: *arg
                        }
                    )?;
                }
                write!(f, ")")
            }
        }
    }
}
