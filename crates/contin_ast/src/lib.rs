pub mod display;
pub mod expression;
pub mod ordering;
pub mod sets;

pub use display::DisplayExpr;
pub use expression::{Constant, Context, Expr, ExprId};
pub use sets::{BoundType, Interval, PointSet, RealSet};
