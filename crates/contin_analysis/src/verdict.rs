use contin_engine::LimitValue;
use serde::Serialize;

/// How a singular point relates to the algebraic simplification of the
/// expression it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SingularityKind {
    /// Singular in the original form only; simplification removes it
    /// (e.g. the cancelled factor of `(x^2 - 1) / (x - 1)` at 1).
    Removable,
    /// Singular in the simplified form as well.
    Essential,
}

/// A one-sided limit reduced for comparison and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LimitSummary {
    Finite(f64),
    PosInfinity,
    NegInfinity,
}

impl LimitSummary {
    /// `None` for unresolved limits; callers treat those as evaluation
    /// failures before a summary is ever built.
    pub(crate) fn from_limit(v: LimitValue) -> Option<Self> {
        match v {
            LimitValue::Finite(x) => Some(LimitSummary::Finite(x)),
            LimitValue::PosInfinity => Some(LimitSummary::PosInfinity),
            LimitValue::NegInfinity => Some(LimitSummary::NegInfinity),
            LimitValue::Unresolved => None,
        }
    }
}

/// Outcome of a continuity query. Pure data; rendering lives in
/// [`crate::report`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Verdict {
    Continuous {
        point: f64,
    },
    /// The point is in the singularity set; limits are never consulted.
    DiscontinuousSingularity {
        point: f64,
        kind: SingularityKind,
        /// Exact display form of the matching singular point.
        location: String,
    },
    /// Defined at the point, but the one-sided limits and the value do
    /// not all agree.
    DiscontinuousLimitMismatch {
        point: f64,
        left: LimitSummary,
        right: LimitSummary,
        value: f64,
    },
    /// The evaluation point is not a finite real number. Detected before
    /// any engine work.
    InvalidInput {
        reason: String,
    },
    /// The engine could not produce a limit or value for an apparently
    /// non-singular point, or domain resolution itself failed. Recovered,
    /// never a panic.
    EvaluationError {
        reason: String,
    },
}
