//! Continuity analysis for single-variable real expressions.
//!
//! Build an expression in a [`contin_ast::Context`], hand it to a
//! [`ContinuityAnalyzer`], then ask where it is defined
//! ([`ContinuityAnalyzer::resolve_domain`]) and whether it is continuous
//! at a point ([`ContinuityAnalyzer::classify`]).
//!
//! ```
//! use contin_analysis::{ContinuityAnalyzer, Verdict};
//! use contin_ast::{Context, Expr};
//!
//! let mut ctx = Context::new();
//! let one = ctx.num(1);
//! let x = ctx.var("x");
//! let expr = ctx.add(Expr::Div(one, x));
//!
//! let mut analyzer = ContinuityAnalyzer::new(ctx, expr, "x").unwrap();
//! assert!(matches!(
//!     analyzer.classify(0.0),
//!     Verdict::DiscontinuousSingularity { .. }
//! ));
//! assert!(matches!(analyzer.classify(2.0), Verdict::Continuous { .. }));
//! ```

pub mod analyzer;
pub mod classify;
pub mod domain;
pub mod report;
pub mod verdict;

pub use analyzer::{AnalysisError, ContinuityAnalyzer};
pub use domain::{DomainAnalysis, Singularity};
pub use report::explain;
pub use verdict::{LimitSummary, SingularityKind, Verdict};
