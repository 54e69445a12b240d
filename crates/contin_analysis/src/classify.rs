//! Point-wise continuity classification.

use contin_ast::sets::points_equal;
use contin_ast::DisplayExpr;
use contin_engine::{eval_f64, limit, substitute, Approach};
use num_rational::BigRational;
use tracing::debug;

use crate::analyzer::ContinuityAnalyzer;
use crate::verdict::{LimitSummary, Verdict};

/// Comparison tolerance for the limit/value agreement check: relative
/// 1e-9 with an absolute floor of 1e-12. Raw `==` on floats would turn
/// the engine's finite-precision reduction into spurious discontinuities.
const RTOL: f64 = 1e-9;
const ATOL: f64 = 1e-12;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= ATOL.max(RTOL * a.abs().max(b.abs()))
}

impl ContinuityAnalyzer {
    /// Decide whether the expression is continuous at `x0`.
    ///
    /// Checks run in order and short-circuit: input validation, exact
    /// singularity membership, one-sided limits of the simplified form,
    /// value of the simplified form, agreement. Engine failures past the
    /// singularity check become `Verdict::EvaluationError`; nothing
    /// panics or propagates out of this method.
    pub fn classify(&mut self, x0: f64) -> Verdict {
        // NaN and ±∞ never reach the engine.
        if !x0.is_finite() {
            return Verdict::InvalidInput {
                reason: format!("evaluation point must be a finite real number, got {x0}"),
            };
        }
        let Some(exact) = BigRational::from_float(x0) else {
            return Verdict::InvalidInput {
                reason: format!("evaluation point {x0} has no exact representation"),
            };
        };

        let analysis = match self.resolve_domain() {
            Ok(analysis) => analysis,
            Err(e) => {
                return Verdict::EvaluationError {
                    reason: format!("domain resolution failed: {e}"),
                }
            }
        };

        let simplified = self.simplified();
        let var = self.variable().to_string();
        let (ctx, budget) = self.parts();
        let x0_id = ctx.rational(exact.clone());

        if let Some(s) = analysis
            .singularities
            .iter()
            .find(|s| points_equal(ctx, s.point, x0_id))
        {
            let location = format!(
                "{}",
                DisplayExpr {
                    context: ctx,
                    id: s.point
                }
            );
            debug!(point = x0, %location, kind = ?s.kind, "singularity hit");
            return Verdict::DiscontinuousSingularity {
                point: x0,
                kind: s.kind,
                location,
            };
        }

        let left = match limit(ctx, simplified, &var, &exact, Approach::Below, budget) {
            Ok(v) => v,
            Err(e) => {
                return Verdict::EvaluationError {
                    reason: format!("left-hand limit failed: {e}"),
                }
            }
        };
        let right = match limit(ctx, simplified, &var, &exact, Approach::Above, budget) {
            Ok(v) => v,
            Err(e) => {
                return Verdict::EvaluationError {
                    reason: format!("right-hand limit failed: {e}"),
                }
            }
        };

        let at_x0 = substitute(ctx, simplified, &var, x0_id);
        let value = match eval_f64(ctx, at_x0) {
            Ok(v) => v,
            Err(e) => {
                // Possible only when the singularity scan and the value
                // disagree; reported, not propagated.
                return Verdict::EvaluationError {
                    reason: format!("value at the point failed: {e}"),
                };
            }
        };

        let (Some(left), Some(right)) = (
            LimitSummary::from_limit(left),
            LimitSummary::from_limit(right),
        ) else {
            return Verdict::EvaluationError {
                reason: "a one-sided limit could not be determined".into(),
            };
        };

        debug!(point = x0, ?left, ?right, value, "comparing limits and value");
        match (left, right) {
            (LimitSummary::Finite(l), LimitSummary::Finite(r))
                if approx_eq(l, r) && approx_eq(l, value) && approx_eq(r, value) =>
            {
                Verdict::Continuous { point: x0 }
            }
            _ => Verdict::DiscontinuousLimitMismatch {
                point: x0,
                left,
                right,
                value,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::approx_eq;

    #[test]
    fn test_approx_eq_tolerates_reduction_noise() {
        assert!(approx_eq(2.0, 2.0 + 1e-13));
        assert!(approx_eq(1e9, 1e9 + 0.5));
        assert!(!approx_eq(1.0, 1.0001));
        assert!(!approx_eq(-1.0, 1.0));
    }
}
