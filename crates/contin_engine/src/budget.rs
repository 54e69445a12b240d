//! Anti-explosion budget for symbolic operations.
//!
//! Symbolic cost is not bounded by input size in any simple way, so every
//! engine operation charges a per-operation counter and stops with an error
//! when its limit is reached. A limit of 0 means unlimited.

use std::fmt;

use thiserror::Error;

/// Operations that consume budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Operation {
    /// Rewrite steps in the simplifier fixpoint loop.
    Simplify = 0,
    /// Nodes visited while solving / scanning for singularities.
    Solve = 1,
    /// Numeric probes during one-sided limit evaluation.
    Limit = 2,
}

impl Operation {
    pub const COUNT: usize = 3;

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simplify => write!(f, "Simplify"),
            Self::Solve => write!(f, "Solve"),
            Self::Limit => write!(f, "Limit"),
        }
    }
}

/// Error returned when an operation exhausts its budget.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("budget exceeded during {op}: used {used} (limit {limit})")]
pub struct BudgetExceeded {
    pub op: Operation,
    pub used: u64,
    pub limit: u64,
}

#[derive(Debug, Clone)]
pub struct Budget {
    limits: [u64; Operation::COUNT],
    used: [u64; Operation::COUNT],
}

impl Default for Budget {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Budget {
    /// Unlimited budget.
    pub fn unlimited() -> Self {
        Self {
            limits: [0; Operation::COUNT],
            used: [0; Operation::COUNT],
        }
    }

    /// Production defaults: generous for well-behaved inputs, small enough
    /// that a pathological expression fails fast instead of hanging.
    pub fn with_defaults() -> Self {
        let mut b = Self::unlimited();
        b.set_limit(Operation::Simplify, 2_000);
        b.set_limit(Operation::Solve, 1_000);
        b.set_limit(Operation::Limit, 256);
        b
    }

    pub fn set_limit(&mut self, op: Operation, limit: u64) {
        self.limits[op.index()] = limit;
    }

    pub fn limit(&self, op: Operation) -> u64 {
        self.limits[op.index()]
    }

    pub fn used(&self, op: Operation) -> u64 {
        self.used[op.index()]
    }

    pub fn reset(&mut self) {
        self.used = [0; Operation::COUNT];
    }

    #[inline]
    pub fn charge(&mut self, op: Operation, amount: u64) -> Result<(), BudgetExceeded> {
        let used = &mut self.used[op.index()];
        *used = used.saturating_add(amount);
        let limit = self.limits[op.index()];
        if limit > 0 && *used > limit {
            return Err(BudgetExceeded {
                op,
                used: *used,
                limit,
            });
        }
        Ok(())
    }
}
