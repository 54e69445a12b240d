//! Exact sets over the real line.
//!
//! [`PointSet`] is a finite set of exact symbolic points (possibly
//! irrational, e.g. `sqrt(2)`). [`RealSet`] describes the regions a
//! domain computation works with: everything, nothing, a finite point set,
//! or intervals. Neither is ever enumerated numerically; membership is
//! exact and ordering falls back to approximation only to place points
//! along the line.

use std::cmp::Ordering;

use crate::expression::{Context, ExprId};
use crate::ordering::{compare_values, get_number, sort_and_dedup_points};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundType {
    Open,
    Closed,
}

/// An interval with exact symbolic endpoints. ±∞ endpoints are encoded as
/// `Constant::Infinity` / its negation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub min: ExprId,
    pub min_type: BoundType,
    pub max: ExprId,
    pub max_type: BoundType,
}

impl Interval {
    pub fn open(min: ExprId, max: ExprId) -> Self {
        Interval {
            min,
            min_type: BoundType::Open,
            max,
            max_type: BoundType::Open,
        }
    }

    pub fn contains(&self, ctx: &Context, p: ExprId) -> bool {
        let above_min = match compare_values(ctx, p, self.min) {
            Ordering::Greater => true,
            Ordering::Equal => self.min_type == BoundType::Closed,
            Ordering::Less => false,
        };
        if !above_min {
            return false;
        }
        match compare_values(ctx, p, self.max) {
            Ordering::Less => true,
            Ordering::Equal => self.max_type == BoundType::Closed,
            Ordering::Greater => false,
        }
    }
}

/// A finite set of exact points, kept sorted and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PointSet {
    points: Vec<ExprId>,
}

impl PointSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_points(ctx: &Context, mut points: Vec<ExprId>) -> Self {
        sort_and_dedup_points(ctx, &mut points);
        PointSet { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = ExprId> + '_ {
        self.points.iter().copied()
    }

    /// Exact membership: interned-id equality or exact rational equality.
    /// Never decided by floating-point proximity.
    pub fn contains(&self, ctx: &Context, p: ExprId) -> bool {
        self.points.iter().any(|&q| points_equal(ctx, p, q))
    }

    pub fn union(&self, ctx: &Context, other: &PointSet) -> PointSet {
        let mut points = self.points.clone();
        points.extend_from_slice(&other.points);
        Self::from_points(ctx, points)
    }

    pub fn difference(&self, ctx: &Context, other: &PointSet) -> PointSet {
        let points = self
            .points
            .iter()
            .copied()
            .filter(|&p| !other.contains(ctx, p))
            .collect();
        PointSet { points }
    }
}

/// Exact equality of two point expressions: interned-id equality or exact
/// rational equality, never floating-point proximity.
pub fn points_equal(ctx: &Context, a: ExprId, b: ExprId) -> bool {
    if a == b {
        return true;
    }
    match (get_number(ctx, a), get_number(ctx, b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// A region of the real line, as produced by domain resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealSet {
    Empty,
    AllReals,
    Points(PointSet),
    Continuous(Interval),
    Union(Vec<Interval>),
}

impl RealSet {
    pub fn is_empty(&self) -> bool {
        match self {
            RealSet::Empty => true,
            RealSet::Points(ps) => ps.is_empty(),
            RealSet::Union(intervals) => intervals.is_empty(),
            _ => false,
        }
    }

    pub fn contains(&self, ctx: &Context, p: ExprId) -> bool {
        match self {
            RealSet::Empty => false,
            RealSet::AllReals => true,
            RealSet::Points(ps) => ps.contains(ctx, p),
            RealSet::Continuous(i) => i.contains(ctx, p),
            RealSet::Union(intervals) => intervals.iter().any(|i| i.contains(ctx, p)),
        }
    }

    pub fn intersect(self, ctx: &Context, other: RealSet) -> RealSet {
        match (self, other) {
            (RealSet::Empty, _) | (_, RealSet::Empty) => RealSet::Empty,
            (RealSet::AllReals, s) | (s, RealSet::AllReals) => s,
            (RealSet::Points(ps), s) | (s, RealSet::Points(ps)) => {
                let kept = ps.iter().filter(|&p| s.contains(ctx, p)).collect();
                RealSet::Points(PointSet { points: kept })
            }
            (RealSet::Continuous(i1), RealSet::Continuous(i2)) => {
                intersect_intervals(ctx, &i1, &i2)
            }
            (RealSet::Continuous(i), RealSet::Union(u)) | (RealSet::Union(u), RealSet::Continuous(i)) => {
                collect_union(
                    u.iter()
                        .filter_map(|j| match intersect_intervals(ctx, &i, j) {
                            RealSet::Continuous(k) => Some(k),
                            _ => None,
                        })
                        .collect(),
                )
            }
            (RealSet::Union(u1), RealSet::Union(u2)) => {
                // (A ∪ B) ∩ (C ∪ D) distributes pairwise.
                let mut out = Vec::new();
                for i1 in &u1 {
                    for i2 in &u2 {
                        if let RealSet::Continuous(k) = intersect_intervals(ctx, i1, i2) {
                            out.push(k);
                        }
                    }
                }
                collect_union(out)
            }
        }
    }

    /// The set with a finite collection of points removed: `Reals \ S`
    /// and its constrained-region variant in one operation.
    pub fn without_points(self, ctx: &mut Context, points: &PointSet) -> RealSet {
        if points.is_empty() {
            return self;
        }
        match self {
            RealSet::Empty => RealSet::Empty,
            RealSet::Points(ps) => {
                let kept = ps.difference(ctx, points);
                if kept.is_empty() {
                    RealSet::Empty
                } else {
                    RealSet::Points(kept)
                }
            }
            RealSet::AllReals => {
                let min = ctx.neg_inf();
                let max = ctx.pos_inf();
                let full = Interval::open(min, max);
                collect_union(split_interval(ctx, full, points))
            }
            RealSet::Continuous(i) => collect_union(split_interval(ctx, i, points)),
            RealSet::Union(intervals) => {
                let mut out = Vec::new();
                for i in intervals {
                    out.extend(split_interval(ctx, i, points));
                }
                collect_union(out)
            }
        }
    }
}

fn collect_union(mut intervals: Vec<Interval>) -> RealSet {
    match intervals.len() {
        0 => RealSet::Empty,
        1 => RealSet::Continuous(intervals.remove(0)),
        _ => RealSet::Union(intervals),
    }
}

/// Split an interval at every point strictly inside it, leaving the cut
/// points out (open bounds on both sides of each cut).
fn split_interval(ctx: &Context, interval: Interval, points: &PointSet) -> Vec<Interval> {
    let mut inside: Vec<ExprId> = points
        .iter()
        .filter(|&p| {
            compare_values(ctx, p, interval.min) == Ordering::Greater
                && compare_values(ctx, p, interval.max) == Ordering::Less
        })
        .collect();
    // Closed endpoints that coincide with an excluded point become open.
    let mut interval = interval;
    if interval.min_type == BoundType::Closed && points.contains(ctx, interval.min) {
        interval.min_type = BoundType::Open;
    }
    if interval.max_type == BoundType::Closed && points.contains(ctx, interval.max) {
        interval.max_type = BoundType::Open;
    }
    if inside.is_empty() {
        return vec![interval];
    }
    inside.sort_by(|a, b| compare_values(ctx, *a, *b));

    let mut out = Vec::with_capacity(inside.len() + 1);
    let mut lo = interval.min;
    let mut lo_type = interval.min_type;
    for p in inside {
        out.push(Interval {
            min: lo,
            min_type: lo_type,
            max: p,
            max_type: BoundType::Open,
        });
        lo = p;
        lo_type = BoundType::Open;
    }
    out.push(Interval {
        min: lo,
        min_type: lo_type,
        max: interval.max,
        max_type: interval.max_type,
    });
    out
}

fn intersect_intervals(ctx: &Context, i1: &Interval, i2: &Interval) -> RealSet {
    let (min, min_type) = match compare_values(ctx, i1.min, i2.min) {
        Ordering::Less => (i2.min, i2.min_type),
        Ordering::Greater => (i1.min, i1.min_type),
        Ordering::Equal => {
            let t = if i1.min_type == BoundType::Open || i2.min_type == BoundType::Open {
                BoundType::Open
            } else {
                BoundType::Closed
            };
            (i1.min, t)
        }
    };
    let (max, max_type) = match compare_values(ctx, i1.max, i2.max) {
        Ordering::Less => (i1.max, i1.max_type),
        Ordering::Greater => (i2.max, i2.max_type),
        Ordering::Equal => {
            let t = if i1.max_type == BoundType::Open || i2.max_type == BoundType::Open {
                BoundType::Open
            } else {
                BoundType::Closed
            };
            (i1.max, t)
        }
    };
    match compare_values(ctx, min, max) {
        Ordering::Less => RealSet::Continuous(Interval {
            min,
            min_type,
            max,
            max_type,
        }),
        Ordering::Equal if min_type == BoundType::Closed && max_type == BoundType::Closed => {
            RealSet::Points(PointSet {
                points: vec![min],
            })
        }
        _ => RealSet::Empty,
    }
}
