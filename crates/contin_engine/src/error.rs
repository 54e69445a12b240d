use thiserror::Error;

use crate::budget::BudgetExceeded;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Unknown function '{0}'")]
    UnknownFunction(String),
    #[error("Expression is undefined: {0}")]
    Undefined(String),
    #[error("Free variable '{0}' in numeric evaluation")]
    FreeVariable(String),
    #[error("Result is not a finite real number: {0}")]
    NonFinite(String),
    #[error("Unsupported construct: {0}")]
    Unsupported(String),
    #[error(transparent)]
    Budget(#[from] BudgetExceeded),
}
