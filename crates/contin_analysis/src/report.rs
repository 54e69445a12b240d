//! Human-readable rendering of verdicts.
//!
//! Decision logic produces pure [`Verdict`] data; turning that into prose
//! lives here, so callers that want structured output never pay for (or
//! depend on) the text.

use std::fmt;

use crate::verdict::{LimitSummary, SingularityKind, Verdict};

fn limit_text(l: &LimitSummary) -> String {
    match l {
        LimitSummary::Finite(v) => format!("{v}"),
        LimitSummary::PosInfinity => "+oo".to_string(),
        LimitSummary::NegInfinity => "-oo".to_string(),
    }
}

/// One-paragraph explanation of a verdict.
pub fn explain(verdict: &Verdict) -> String {
    match verdict {
        Verdict::Continuous { point } => {
            format!("The function is continuous at {point}.")
        }
        Verdict::DiscontinuousSingularity {
            point,
            kind,
            location,
        } => {
            let kind = match kind {
                SingularityKind::Removable => "removable",
                SingularityKind::Essential => "essential",
            };
            format!(
                "The function is not continuous at {point}: {location} is a {kind} singularity."
            )
        }
        Verdict::DiscontinuousLimitMismatch {
            point,
            left,
            right,
            value,
        } => format!(
            "The function is not continuous at {point}: the left-hand limit ({}), \
             right-hand limit ({}) and value ({value}) do not all agree.",
            limit_text(left),
            limit_text(right),
        ),
        Verdict::InvalidInput { reason } => {
            format!("Invalid evaluation point: {reason}.")
        }
        Verdict::EvaluationError { reason } => {
            format!("Could not evaluate continuity: {reason}.")
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", explain(self))
    }
}
