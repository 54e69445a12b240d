//! Dense univariate polynomials over exact rationals.
//!
//! Backs fraction cancellation (gcd), real solving (roots) and the exact
//! limit path (root orders at a point). Coefficients are `BigRational`;
//! `coeffs[i]` is the coefficient of `x^i` and trailing zeros are stripped.

use contin_ast::{Context, Expr, ExprId};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::budget::{Budget, Operation};
use crate::error::EngineError;

/// Exponents above this are refused during expr→poly conversion.
const MAX_POW: i64 = 64;

/// Divisor enumeration gives up past this trial bound; root finding then
/// only sees the trivial divisors and may report `Unsupported`.
const DIVISOR_TRIAL_CAP: u32 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poly {
    coeffs: Vec<BigRational>,
}

impl Poly {
    fn normalize(mut coeffs: Vec<BigRational>) -> Self {
        while coeffs.last().is_some_and(Zero::is_zero) {
            coeffs.pop();
        }
        Poly { coeffs }
    }

    pub fn zero() -> Self {
        Poly { coeffs: Vec::new() }
    }

    pub fn constant(c: BigRational) -> Self {
        Self::normalize(vec![c])
    }

    pub fn var() -> Self {
        Poly {
            coeffs: vec![BigRational::zero(), BigRational::one()],
        }
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn is_constant(&self) -> bool {
        self.coeffs.len() <= 1
    }

    /// Degree, with the zero polynomial reported as degree 0.
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn coeff(&self, i: usize) -> BigRational {
        self.coeffs.get(i).cloned().unwrap_or_else(BigRational::zero)
    }

    pub fn leading(&self) -> Option<&BigRational> {
        self.coeffs.last()
    }

    pub fn add(&self, other: &Poly) -> Poly {
        let n = self.coeffs.len().max(other.coeffs.len());
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            out.push(self.coeff(i) + other.coeff(i));
        }
        Self::normalize(out)
    }

    pub fn sub(&self, other: &Poly) -> Poly {
        self.add(&other.neg())
    }

    pub fn neg(&self) -> Poly {
        Poly {
            coeffs: self.coeffs.iter().map(|c| -c).collect(),
        }
    }

    pub fn mul(&self, other: &Poly) -> Poly {
        if self.is_zero() || other.is_zero() {
            return Poly::zero();
        }
        let mut out = vec![BigRational::zero(); self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                out[i + j] = &out[i + j] + &(a * b);
            }
        }
        Self::normalize(out)
    }

    pub fn scale(&self, k: &BigRational) -> Poly {
        Self::normalize(self.coeffs.iter().map(|c| c * k).collect())
    }

    pub fn pow(&self, mut n: u32) -> Poly {
        let mut base = self.clone();
        let mut acc = Poly::constant(BigRational::one());
        while n > 0 {
            if n & 1 == 1 {
                acc = acc.mul(&base);
            }
            base = base.mul(&base);
            n >>= 1;
        }
        acc
    }

    /// Horner evaluation.
    pub fn eval(&self, x: &BigRational) -> BigRational {
        let mut acc = BigRational::zero();
        for c in self.coeffs.iter().rev() {
            acc = acc * x + c;
        }
        acc
    }

    /// Euclidean division. `None` only when `divisor` is zero.
    pub fn div_rem(&self, divisor: &Poly) -> Option<(Poly, Poly)> {
        if divisor.is_zero() {
            return None;
        }
        if self.is_zero() || self.degree() < divisor.degree() {
            return Some((Poly::zero(), self.clone()));
        }
        let dd = divisor.degree();
        let dl = divisor.coeffs[dd].clone();
        let mut r = self.clone();
        let mut q = vec![BigRational::zero(); self.degree() - dd + 1];
        while !r.is_zero() && r.degree() >= dd {
            let k = r.degree() - dd;
            let f = &r.coeffs[r.degree()] / &dl;
            for (i, dc) in divisor.coeffs.iter().enumerate() {
                r.coeffs[i + k] = &r.coeffs[i + k] - &(&f * dc);
            }
            q[k] = f;
            r = Self::normalize(r.coeffs);
            if k == 0 {
                break;
            }
        }
        Some((Self::normalize(q), r))
    }

    pub fn make_monic(&self) -> Poly {
        match self.leading() {
            Some(l) if !l.is_one() => {
                let inv = BigRational::one() / l;
                self.scale(&inv)
            }
            _ => self.clone(),
        }
    }

    /// Monic gcd by the Euclidean algorithm.
    pub fn gcd(a: &Poly, b: &Poly) -> Poly {
        let mut x = a.clone();
        let mut y = b.clone();
        while !y.is_zero() {
            let Some((_, r)) = x.div_rem(&y) else {
                break;
            };
            x = y;
            y = r;
        }
        x.make_monic()
    }

    /// Synthetic division by `(x - a)`, discarding the remainder.
    pub fn deflate(&self, a: &BigRational) -> Poly {
        let deg = self.degree();
        if self.coeffs.len() <= 1 {
            return Poly::zero();
        }
        let mut q = vec![BigRational::zero(); deg];
        q[deg - 1] = self.coeffs[deg].clone();
        for i in (0..deg - 1).rev() {
            q[i] = &self.coeffs[i + 1] + &(a * &q[i + 1]);
        }
        Self::normalize(q)
    }

    /// Multiplicity of `a` as a root (0 when `a` is not a root).
    pub fn root_order(&self, a: &BigRational) -> usize {
        let mut p = self.clone();
        let mut order = 0;
        while !p.is_zero() && p.eval(a).is_zero() {
            p = p.deflate(a);
            order += 1;
        }
        order
    }

    /// Interpret an expression as a polynomial in `var`. `None` when the
    /// expression is not polynomial (other variables, non-integer powers,
    /// functions, symbolic constants, variable denominators).
    pub fn from_expr(ctx: &Context, expr: ExprId, var: &str) -> Option<Poly> {
        match ctx.get(expr) {
            Expr::Number(n) => Some(Poly::constant(n.clone())),
            Expr::Variable(name) if name == var => Some(Poly::var()),
            Expr::Variable(_) | Expr::Constant(_) | Expr::Function(_, _) => None,
            Expr::Add(a, b) => {
                Some(Self::from_expr(ctx, *a, var)?.add(&Self::from_expr(ctx, *b, var)?))
            }
            Expr::Sub(a, b) => {
                Some(Self::from_expr(ctx, *a, var)?.sub(&Self::from_expr(ctx, *b, var)?))
            }
            Expr::Mul(a, b) => {
                Some(Self::from_expr(ctx, *a, var)?.mul(&Self::from_expr(ctx, *b, var)?))
            }
            Expr::Div(a, b) => {
                let denom = Self::from_expr(ctx, *b, var)?;
                if !denom.is_constant() || denom.is_zero() {
                    return None;
                }
                let inv = BigRational::one() / denom.coeff(0);
                Some(Self::from_expr(ctx, *a, var)?.scale(&inv))
            }
            Expr::Pow(b, e) => {
                let exp = match ctx.get(*e) {
                    Expr::Number(n) if n.is_integer() => n.to_integer().to_i64()?,
                    _ => return None,
                };
                if !(0..=MAX_POW).contains(&exp) {
                    return None;
                }
                Some(Self::from_expr(ctx, *b, var)?.pow(exp as u32))
            }
            Expr::Neg(a) => Some(Self::from_expr(ctx, *a, var)?.neg()),
        }
    }

    /// Rebuild as an expression in `var`, highest degree first.
    pub fn to_expr(&self, ctx: &mut Context, var: &str) -> ExprId {
        if self.is_zero() {
            return ctx.num(0);
        }
        let x = ctx.var(var);
        let mut acc: Option<ExprId> = None;
        for i in (0..=self.degree()).rev() {
            let c = self.coeff(i);
            if c.is_zero() {
                continue;
            }
            let negative = c.is_negative();
            let abs_c = if negative { -c } else { c };
            let base = match i {
                0 => None,
                1 => Some(x),
                k => {
                    let e = ctx.num(k as i64);
                    Some(ctx.add(Expr::Pow(x, e)))
                }
            };
            let term = match base {
                None => ctx.rational(abs_c),
                Some(p) if abs_c.is_one() => p,
                Some(p) => {
                    let cid = ctx.rational(abs_c);
                    ctx.add(Expr::Mul(cid, p))
                }
            };
            acc = Some(match acc {
                None if negative => ctx.add(Expr::Neg(term)),
                None => term,
                Some(a) if negative => ctx.add(Expr::Sub(a, term)),
                Some(a) => ctx.add(Expr::Add(a, term)),
            });
        }
        acc.unwrap_or_else(|| ctx.num(0))
    }

    /// Exact real roots as point expressions: rational roots directly,
    /// quadratic irrationals as `(-b ± sqrt(disc)) / (2a)`. Factors with no
    /// closed form here are an explicit `Unsupported` error, never a guess.
    pub fn real_roots(
        &self,
        ctx: &mut Context,
        budget: &mut Budget,
    ) -> Result<Vec<ExprId>, EngineError> {
        if self.is_zero() {
            return Err(EngineError::Unsupported(
                "zero set of the zero polynomial is not discrete".into(),
            ));
        }
        let mut p = self.clone();
        let mut roots = Vec::new();

        while p.degree() > 2 {
            match p.find_rational_root(budget)? {
                Some(r) => {
                    p = p.deflate(&r);
                    roots.push(ctx.rational(r));
                }
                None => {
                    return Err(EngineError::Unsupported(
                        "no closed form for roots of a higher-degree factor".into(),
                    ))
                }
            }
        }

        match p.degree() {
            0 => {}
            1 => {
                let root = -p.coeff(0) / p.coeff(1);
                roots.push(ctx.rational(root));
            }
            _ => {
                let a = p.coeff(2);
                let b = p.coeff(1);
                let c = p.coeff(0);
                let disc = &b * &b - BigRational::from_integer(4.into()) * &a * &c;
                if disc.is_negative() {
                    // no real roots from this factor
                } else if disc.is_zero() {
                    let root = -&b / (BigRational::from_integer(2.into()) * &a);
                    roots.push(ctx.rational(root));
                } else if let Some(s) = exact_sqrt(&disc) {
                    let two_a = BigRational::from_integer(2.into()) * &a;
                    roots.push(ctx.rational((-&b - &s) / &two_a));
                    roots.push(ctx.rational((-&b + &s) / &two_a));
                } else {
                    // (-b ± sqrt(disc)) / (2a), kept exact
                    let disc_id = ctx.rational(disc);
                    let sqrt_d = ctx.call("sqrt", vec![disc_id]);
                    let neg_b = ctx.rational(-&b);
                    let two_a = ctx.rational(BigRational::from_integer(2.into()) * &a);
                    let lo_num = ctx.add(Expr::Sub(neg_b, sqrt_d));
                    let hi_num = ctx.add(Expr::Add(neg_b, sqrt_d));
                    roots.push(ctx.add(Expr::Div(lo_num, two_a)));
                    roots.push(ctx.add(Expr::Div(hi_num, two_a)));
                }
            }
        }
        Ok(roots)
    }

    /// Rational root search over `±p/q` with `p | a0`, `q | an`, after
    /// clearing coefficient denominators.
    fn find_rational_root(&self, budget: &mut Budget) -> Result<Option<BigRational>, EngineError> {
        let mut lcm = BigInt::one();
        for c in &self.coeffs {
            lcm = lcm.lcm(c.denom());
        }
        let ints: Vec<BigInt> = self
            .coeffs
            .iter()
            .map(|c| (c * BigRational::from_integer(lcm.clone())).to_integer())
            .collect();

        let a0 = &ints[0];
        let an = &ints[ints.len() - 1];
        if a0.is_zero() {
            return Ok(Some(BigRational::zero()));
        }
        for p in divisors_capped(a0) {
            for q in divisors_capped(an) {
                for sign in [1, -1] {
                    budget.charge(Operation::Solve, 1)?;
                    let cand = BigRational::new(&p * BigInt::from(sign), q.clone());
                    if self.eval(&cand).is_zero() {
                        return Ok(Some(cand));
                    }
                }
            }
        }
        Ok(None)
    }
}

/// `sqrt(r)` when `r` is a perfect square of a rational.
fn exact_sqrt(r: &BigRational) -> Option<BigRational> {
    if r.is_negative() {
        return None;
    }
    let ns = r.numer().sqrt();
    let ds = r.denom().sqrt();
    (&ns * &ns == *r.numer() && &ds * &ds == *r.denom()).then(|| BigRational::new(ns, ds))
}

/// Positive divisors of `n`, complete when `sqrt(|n|)` is within the trial
/// cap, otherwise the pairs found plus the trivial divisors.
fn divisors_capped(n: &BigInt) -> Vec<BigInt> {
    let n = n.abs();
    if n.is_zero() {
        return Vec::new();
    }
    let mut divs = vec![BigInt::one(), n.clone()];
    let mut i = BigInt::from(2u32);
    let cap = BigInt::from(DIVISOR_TRIAL_CAP);
    while i <= cap && &i * &i <= n {
        if (&n % &i).is_zero() {
            divs.push(i.clone());
            divs.push(&n / &i);
        }
        i += 1;
    }
    divs.sort();
    divs.dedup();
    divs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(coeffs: &[i64]) -> Poly {
        Poly::normalize(
            coeffs
                .iter()
                .map(|&c| BigRational::from_integer(c.into()))
                .collect(),
        )
    }

    fn rat(n: i64, d: i64) -> BigRational {
        BigRational::new(n.into(), d.into())
    }

    #[test]
    fn test_gcd_common_linear_factor() {
        // x^2 - 1 and x - 1 share x - 1
        let num = poly(&[-1, 0, 1]);
        let den = poly(&[-1, 1]);
        let g = Poly::gcd(&num, &den);
        assert_eq!(g, poly(&[-1, 1]));
    }

    #[test]
    fn test_div_rem_exact() {
        let num = poly(&[-1, 0, 1]);
        let den = poly(&[-1, 1]);
        let (q, r) = num.div_rem(&den).unwrap();
        assert_eq!(q, poly(&[1, 1])); // x + 1
        assert!(r.is_zero());
    }

    #[test]
    fn test_from_expr_expands_products() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let one = ctx.num(1);
        let lhs = ctx.add(Expr::Sub(x, one));
        let rhs = ctx.add(Expr::Add(x, one));
        let prod = ctx.add(Expr::Mul(lhs, rhs));
        let p = Poly::from_expr(&ctx, prod, "x").unwrap();
        assert_eq!(p, poly(&[-1, 0, 1]));
    }

    #[test]
    fn test_from_expr_rejects_functions() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let sin_x = ctx.call("sin", vec![x]);
        assert!(Poly::from_expr(&ctx, sin_x, "x").is_none());
    }

    #[test]
    fn test_roots_linear() {
        let mut ctx = Context::new();
        let mut budget = Budget::unlimited();
        // 2x + 3 = 0 -> x = -3/2
        let p = poly(&[3, 2]);
        let roots = p.real_roots(&mut ctx, &mut budget).unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(
            contin_ast::ordering::get_number(&ctx, roots[0]),
            Some(rat(-3, 2))
        );
    }

    #[test]
    fn test_roots_quadratic_rational() {
        let mut ctx = Context::new();
        let mut budget = Budget::unlimited();
        // x^2 - 1 -> ±1
        let p = poly(&[-1, 0, 1]);
        let roots = p.real_roots(&mut ctx, &mut budget).unwrap();
        assert_eq!(roots.len(), 2);
    }

    #[test]
    fn test_roots_quadratic_irrational() {
        let mut ctx = Context::new();
        let mut budget = Budget::unlimited();
        // x^2 - 2 -> ±sqrt(2), kept symbolic
        let p = poly(&[-2, 0, 1]);
        let roots = p.real_roots(&mut ctx, &mut budget).unwrap();
        assert_eq!(roots.len(), 2);
        for r in roots {
            assert!(contin_ast::ordering::get_number(&ctx, r).is_none());
            let v = contin_ast::ordering::approx_value(&ctx, r).unwrap();
            assert!((v.abs() - std::f64::consts::SQRT_2).abs() < 1e-12);
        }
    }

    #[test]
    fn test_roots_quadratic_complex_pair_is_empty() {
        let mut ctx = Context::new();
        let mut budget = Budget::unlimited();
        // x^2 + 1 has no real roots
        let p = poly(&[1, 0, 1]);
        let roots = p.real_roots(&mut ctx, &mut budget).unwrap();
        assert!(roots.is_empty());
    }

    #[test]
    fn test_roots_cubic_by_deflation() {
        let mut ctx = Context::new();
        let mut budget = Budget::unlimited();
        // (x - 1)(x^2 + 1) = x^3 - x^2 + x - 1
        let p = poly(&[-1, 1, -1, 1]);
        let roots = p.real_roots(&mut ctx, &mut budget).unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(
            contin_ast::ordering::get_number(&ctx, roots[0]),
            Some(rat(1, 1))
        );
    }

    #[test]
    fn test_root_order() {
        // (x - 1)^2 * (x + 2)
        let p = poly(&[-1, 1]).pow(2).mul(&poly(&[2, 1]));
        assert_eq!(p.root_order(&rat(1, 1)), 2);
        assert_eq!(p.root_order(&rat(-2, 1)), 1);
        assert_eq!(p.root_order(&rat(5, 1)), 0);
    }

    #[test]
    fn test_eval_horner() {
        let p = poly(&[1, 2, 3]); // 3x^2 + 2x + 1
        assert_eq!(p.eval(&rat(2, 1)), rat(17, 1));
    }

    #[test]
    fn test_to_expr_round_trip() {
        let mut ctx = Context::new();
        let p = poly(&[-1, 0, 1]);
        let e = p.to_expr(&mut ctx, "x");
        let back = Poly::from_expr(&ctx, e, "x").unwrap();
        assert_eq!(back, p);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashSet;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(128))]

            #[test]
            fn prop_roots_of_a_built_product_are_recovered(
                a in -20i64..20,
                b in -20i64..20,
            ) {
                let mut ctx = Context::new();
                let mut budget = Budget::unlimited();
                // (x - a)(x - b)
                let p = poly(&[-a, 1]).mul(&poly(&[-b, 1]));
                let roots = p.real_roots(&mut ctx, &mut budget).unwrap();
                let expected: HashSet<i64> = [a, b].into_iter().collect();
                prop_assert_eq!(roots.len(), expected.len());
                for r in roots {
                    let n = contin_ast::ordering::get_number(&ctx, r).unwrap();
                    prop_assert!(n.is_integer());
                    prop_assert!(expected.contains(&n.to_integer().to_i64().unwrap()));
                }
            }

            #[test]
            fn prop_gcd_divides_both(a in -10i64..10, b in -10i64..10, c in -10i64..10) {
                // p = (x - a)(x - b), q = (x - a)(x - c): gcd contains x - a
                let shared = poly(&[-a, 1]);
                let p = shared.mul(&poly(&[-b, 1]));
                let q = shared.mul(&poly(&[-c, 1]));
                let g = Poly::gcd(&p, &q);
                prop_assert!(g.degree() >= 1);
                let (_, rp) = p.div_rem(&g).unwrap();
                let (_, rq) = q.div_rem(&g).unwrap();
                prop_assert!(rp.is_zero());
                prop_assert!(rq.is_zero());
            }
        }
    }
}
