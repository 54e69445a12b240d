use contin_ast::{Context, ExprId};

/// Result of a rule application.
pub struct Rewrite {
    /// The transformed expression.
    pub new_expr: ExprId,
    /// Human-readable description of the transformation.
    pub description: String,
}

impl Rewrite {
    pub fn simple(new_expr: ExprId, description: impl Into<String>) -> Self {
        Rewrite {
            new_expr,
            description: description.into(),
        }
    }
}

/// A local rewrite rule. Rules see one node at a time; the simplifier
/// drives them bottom-up to a fixpoint.
pub trait SimpleRule {
    fn name(&self) -> &str;
    fn apply(&self, ctx: &mut Context, expr: ExprId) -> Option<Rewrite>;
}

/// Declare a unit-struct rule with its display name and body.
#[macro_export]
macro_rules! define_rule {
    (
        $(#[$meta:meta])*
        $struct_name:ident,
        $name_str:expr,
        | $ctx:ident, $arg:ident | $body:block
    ) => {
        $(#[$meta])*
        pub struct $struct_name;

        impl $crate::rule::SimpleRule for $struct_name {
            fn name(&self) -> &str {
                $name_str
            }

            fn apply(
                &self,
                $ctx: &mut contin_ast::Context,
                $arg: contin_ast::ExprId,
            ) -> Option<$crate::rule::Rewrite> {
                $body
            }
        }
    };
}
