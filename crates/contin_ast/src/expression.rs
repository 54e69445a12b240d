use num_bigint::BigInt;
use num_rational::BigRational;
use rustc_hash::FxHashMap;

/// Handle into a [`Context`] arena. Because nodes are hash-consed,
/// two ids are equal iff the subtrees they denote are structurally equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(u32);

impl ExprId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Named mathematical constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
    Pi,
    E,
    Infinity,
}

/// A symbolic expression node. Children are [`ExprId`] handles into the
/// owning [`Context`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Number(BigRational),
    Constant(Constant),
    Variable(String),
    Add(ExprId, ExprId),
    Sub(ExprId, ExprId),
    Mul(ExprId, ExprId),
    Div(ExprId, ExprId),
    Pow(ExprId, ExprId),
    Neg(ExprId),
    Function(String, Vec<ExprId>),
}

/// Interning arena for expressions.
///
/// Nodes are deduplicated on insertion, so structural equality of subtrees
/// reduces to `ExprId` equality and rebuilt-but-unchanged expressions do not
/// grow the arena.
#[derive(Debug, Clone, Default)]
pub struct Context {
    nodes: Vec<Expr>,
    interned: FxHashMap<Expr, ExprId>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a node, returning the existing id when an identical node is
    /// already present.
    pub fn add(&mut self, expr: Expr) -> ExprId {
        if let Some(&id) = self.interned.get(&expr) {
            return id;
        }
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(expr.clone());
        self.interned.insert(expr, id);
        id
    }

    pub fn get(&self, id: ExprId) -> &Expr {
        &self.nodes[id.index()]
    }

    /// Number of distinct nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn num(&mut self, n: i64) -> ExprId {
        self.add(Expr::Number(BigRational::from_integer(BigInt::from(n))))
    }

    pub fn rational(&mut self, r: BigRational) -> ExprId {
        self.add(Expr::Number(r))
    }

    pub fn var(&mut self, name: &str) -> ExprId {
        self.add(Expr::Variable(name.to_string()))
    }

    pub fn constant(&mut self, c: Constant) -> ExprId {
        self.add(Expr::Constant(c))
    }

    pub fn call(&mut self, name: &str, args: Vec<ExprId>) -> ExprId {
        self.add(Expr::Function(name.to_string(), args))
    }

    /// `+Infinity` as an expression.
    pub fn pos_inf(&mut self) -> ExprId {
        self.add(Expr::Constant(Constant::Infinity))
    }

    /// `-Infinity` as an expression.
    pub fn neg_inf(&mut self) -> ExprId {
        let inf = self.pos_inf();
        self.add(Expr::Neg(inf))
    }

    /// Does `expr` mention the free variable `var` anywhere?
    pub fn contains_var(&self, expr: ExprId, var: &str) -> bool {
        match self.get(expr) {
            Expr::Number(_) | Expr::Constant(_) => false,
            Expr::Variable(name) => name == var,
            Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Mul(a, b)
            | Expr::Div(a, b)
            | Expr::Pow(a, b) => self.contains_var(*a, var) || self.contains_var(*b, var),
            Expr::Neg(a) => self.contains_var(*a, var),
            Expr::Function(_, args) => args.iter().any(|a| self.contains_var(*a, var)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_dedups_nodes() {
        let mut ctx = Context::new();
        let a = ctx.num(2);
        let b = ctx.num(2);
        assert_eq!(a, b);

        let x1 = ctx.var("x");
        let x2 = ctx.var("x");
        assert_eq!(x1, x2);

        let e1 = ctx.add(Expr::Add(a, x1));
        let e2 = ctx.add(Expr::Add(b, x2));
        assert_eq!(e1, e2);
        assert_eq!(ctx.len(), 3);
    }

    #[test]
    fn contains_var_walks_functions() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let sin_x = ctx.call("sin", vec![x]);
        let e = ctx.add(Expr::Div(sin_x, x));
        assert!(ctx.contains_var(e, "x"));
        assert!(!ctx.contains_var(e, "y"));
    }
}
