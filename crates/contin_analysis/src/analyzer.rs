use contin_ast::{Context, DisplayExpr, ExprId};
use contin_engine::{Budget, EngineError, Simplifier};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("symbolic engine failed: {0}")]
    Engine(#[from] EngineError),
}

/// Analysis context for one `(expression, variable)` pair.
///
/// The simplified form is computed once at construction and reused for
/// every query; the triple never changes afterwards. Holds its own arena,
/// so separate analyzers are fully independent.
pub struct ContinuityAnalyzer {
    simplifier: Simplifier,
    budget: Budget,
    expr: ExprId,
    var: String,
    simplified: ExprId,
}

impl ContinuityAnalyzer {
    /// Take ownership of the arena the expression was built in and
    /// pre-simplify. Engine failures during simplification surface here
    /// rather than being masked.
    pub fn new(
        context: Context,
        expr: ExprId,
        var: impl Into<String>,
    ) -> Result<Self, AnalysisError> {
        let var = var.into();
        let mut simplifier = Simplifier::with_context(context);
        let mut budget = Budget::with_defaults();
        let (simplified, steps) = simplifier.simplify(expr, &mut budget)?;
        debug!(
            expr = %DisplayExpr { context: &simplifier.context, id: expr },
            simplified = %DisplayExpr { context: &simplifier.context, id: simplified },
            rewrites = steps.len(),
            "analyzer constructed"
        );
        Ok(Self {
            simplifier,
            budget,
            expr,
            var,
            simplified,
        })
    }

    pub fn context(&self) -> &Context {
        &self.simplifier.context
    }

    pub fn expression(&self) -> ExprId {
        self.expr
    }

    pub fn variable(&self) -> &str {
        &self.var
    }

    /// The cached simplified form used for limit and value queries.
    pub fn simplified(&self) -> ExprId {
        self.simplified
    }

    pub(crate) fn parts(&mut self) -> (&mut Context, &mut Budget) {
        (&mut self.simplifier.context, &mut self.budget)
    }
}
