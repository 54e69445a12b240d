//! Domain resolution: where is the expression defined?

use contin_ast::{DisplayExpr, ExprId, RealSet};
use contin_engine::{defined_region, singularities};
use tracing::debug;

use crate::analyzer::{AnalysisError, ContinuityAnalyzer};
use crate::verdict::SingularityKind;

/// A singular point tagged with what simplification says about it.
#[derive(Debug, Clone, PartialEq)]
pub struct Singularity {
    pub point: ExprId,
    pub kind: SingularityKind,
}

/// Result of domain resolution. `domain` and the singular points are
/// disjoint by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainAnalysis {
    pub singularities: Vec<Singularity>,
    pub domain: RealSet,
}

impl ContinuityAnalyzer {
    /// Compute the singularity set and the domain.
    ///
    /// The singularity sets of the raw and the simplified form are
    /// unioned: simplification can both remove spurious singular factors
    /// and reveal masked ones, so neither set alone is authoritative and
    /// the union is the safe-to-flag choice. The domain is the defined
    /// region of the raw form minus that union.
    ///
    /// Failures surface as `Err`; an empty result always means a provably
    /// empty set, never a swallowed engine error.
    pub fn resolve_domain(&mut self) -> Result<DomainAnalysis, AnalysisError> {
        let expr = self.expression();
        let simplified = self.simplified();
        let var = self.variable().to_string();
        let (ctx, budget) = self.parts();
        budget.reset();

        let raw = singularities(ctx, expr, &var, budget)?;
        let from_simplified = singularities(ctx, simplified, &var, budget)?;
        let union = raw.union(ctx, &from_simplified);

        let tagged = union
            .iter()
            .map(|point| {
                let kind = if from_simplified.contains(ctx, point) {
                    SingularityKind::Essential
                } else {
                    SingularityKind::Removable
                };
                Singularity { point, kind }
            })
            .collect::<Vec<_>>();

        let region = defined_region(ctx, expr, &var, budget)?;
        let domain = region.without_points(ctx, &union);

        debug!(
            expr = %DisplayExpr { context: ctx, id: expr },
            singular_points = tagged.len(),
            "domain resolved"
        );
        Ok(DomainAnalysis {
            singularities: tagged,
            domain,
        })
    }
}
