pub mod budget;
pub mod error;
pub mod limit;
pub mod numeric;
pub mod polynomial;
pub mod rule;
pub mod rules;
pub mod simplify;
pub mod singularities;
pub mod solve;
pub mod substitute;

pub use budget::{Budget, BudgetExceeded, Operation};
pub use error::EngineError;
pub use limit::{limit, Approach, LimitValue};
pub use numeric::{as_number, eval_f64};
pub use rule::{Rewrite, SimpleRule};
pub use simplify::{Simplifier, Step};
pub use singularities::{defined_region, singularities};
pub use solve::solve_real;
pub use substitute::substitute;
