use std::{fmt::Display, sync::Arc};

use crate::problem::node::NodeIdx;

/// Per-arc transit function over frozen problem data.
pub type Evaluator = Arc<dyn Fn(NodeIdx, NodeIdx) -> f64 + Send + Sync>;

/// Stand-in for an unbounded capacity.
pub const UNBOUNDED: f64 = f64::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionKind {
    Distance,
    Parcels,
    /// Parcels picked up along the route, never decreases.
    Collected,
    Cod,
}

impl Display for DimensionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DimensionKind::Distance => "Distance",
                DimensionKind::Parcels => "Parcels",
                DimensionKind::Collected => "Collected",
                DimensionKind::Cod => "COD",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoftBound {
    pub value: f64,
    /// Cost per unit beyond `value`.
    pub penalty: f64,
}

impl SoftBound {
    pub fn excess_cost(&self, cumul: f64) -> f64 {
        (cumul - self.value).max(0.0) * self.penalty
    }

    pub fn deficit_cost(&self, cumul: f64) -> f64 {
        (self.value - cumul).max(0.0) * self.penalty
    }
}

/// Lower bound on the cumul at the route end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EndLowerBound {
    Hard(f64),
    Soft(SoftBound),
}

/// Cumul values observed along a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CumulTrace {
    pub start: f64,
    pub end: f64,
    pub peak: f64,
    pub lowest: f64,
}

#[derive(Clone)]
pub struct Dimension {
    kind: DimensionKind,
    evaluator: Evaluator,
    slack: f64,
    capacity: f64,
    start_cumul_at_zero: bool,
    soft_upper_bound: Option<SoftBound>,
    end_lower_bound: Option<EndLowerBound>,
}

impl std::fmt::Debug for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dimension")
            .field("kind", &self.kind)
            .field("slack", &self.slack)
            .field("capacity", &self.capacity)
            .field("start_cumul_at_zero", &self.start_cumul_at_zero)
            .field("soft_upper_bound", &self.soft_upper_bound)
            .field("end_lower_bound", &self.end_lower_bound)
            .finish()
    }
}

impl Dimension {
    /// Zero slack and a cumul starting at zero on every route.
    pub fn new(kind: DimensionKind, evaluator: Evaluator, capacity: f64) -> Self {
        Dimension {
            kind,
            evaluator,
            slack: 0.0,
            capacity,
            start_cumul_at_zero: true,
            soft_upper_bound: None,
            end_lower_bound: None,
        }
    }

    pub fn with_soft_upper_bound(mut self, bound: SoftBound) -> Self {
        self.soft_upper_bound = Some(bound);
        self
    }

    pub fn with_end_lower_bound(mut self, bound: EndLowerBound) -> Self {
        self.end_lower_bound = Some(bound);
        self
    }

    pub fn with_free_start(mut self) -> Self {
        self.start_cumul_at_zero = false;
        self
    }

    pub fn kind(&self) -> DimensionKind {
        self.kind
    }

    pub fn slack(&self) -> f64 {
        self.slack
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn start_cumul_at_zero(&self) -> bool {
        self.start_cumul_at_zero
    }

    pub fn soft_upper_bound(&self) -> Option<SoftBound> {
        self.soft_upper_bound
    }

    pub fn end_lower_bound(&self) -> Option<EndLowerBound> {
        self.end_lower_bound
    }

    #[inline]
    pub fn transit(&self, from: NodeIdx, to: NodeIdx) -> f64 {
        (self.evaluator)(from, to)
    }

    /// Walks `path` (depot to depot) and records the cumul values.
    /// A free start begins at the smallest value that keeps every cumul non-negative.
    pub fn trace(&self, path: &[NodeIdx]) -> CumulTrace {
        let mut cumul = 0.0;
        let mut peak: f64 = 0.0;
        let mut lowest: f64 = 0.0;

        for arc in path.windows(2) {
            cumul += self.transit(arc[0], arc[1]);
            peak = peak.max(cumul);
            lowest = lowest.min(cumul);
        }

        let start = if self.start_cumul_at_zero {
            0.0
        } else {
            -lowest
        };

        CumulTrace {
            start,
            end: start + cumul,
            peak: start + peak,
            lowest: start + lowest,
        }
    }

    /// Whether the cumul stays within `[0, capacity]` along the whole path.
    pub fn within_capacity(&self, trace: &CumulTrace) -> bool {
        trace.lowest >= 0.0 && trace.peak <= self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_evaluator(deltas: Vec<f64>) -> Evaluator {
        Arc::new(move |from: NodeIdx, _to: NodeIdx| deltas[from.get()])
    }

    fn path(indices: &[usize]) -> Vec<NodeIdx> {
        indices.iter().map(|&index| NodeIdx::new(index)).collect()
    }

    #[test]
    fn test_trace_from_zero() {
        let dimension = Dimension::new(
            DimensionKind::Parcels,
            signed_evaluator(vec![0.0, 2.0, -2.0, 3.0, -3.0]),
            4.0,
        );

        let trace = dimension.trace(&path(&[0, 1, 3, 2, 4, 0]));

        assert_eq!(trace.start, 0.0);
        assert_eq!(trace.peak, 5.0);
        assert_eq!(trace.end, 0.0);
        assert!(!dimension.within_capacity(&trace));

        let trace = dimension.trace(&path(&[0, 1, 2, 3, 4, 0]));
        assert_eq!(trace.peak, 3.0);
        assert!(dimension.within_capacity(&trace));
    }

    #[test]
    fn test_trace_with_free_start() {
        let dimension = Dimension::new(
            DimensionKind::Cod,
            signed_evaluator(vec![0.0, -5.0, 2.0]),
            10.0,
        )
        .with_free_start();

        let trace = dimension.trace(&path(&[0, 1, 2, 0]));

        assert_eq!(trace.start, 5.0);
        assert_eq!(trace.lowest, 0.0);
        assert_eq!(trace.end, 2.0);
        assert!(dimension.within_capacity(&trace));
    }

    #[test]
    fn test_soft_bound_costs() {
        let bound = SoftBound {
            value: 10.0,
            penalty: 100.0,
        };

        assert_eq!(bound.excess_cost(12.5), 250.0);
        assert_eq!(bound.excess_cost(8.0), 0.0);
        assert_eq!(bound.deficit_cost(8.0), 200.0);
        assert_eq!(bound.deficit_cost(11.0), 0.0);
    }
}
