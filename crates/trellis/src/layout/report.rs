use crate::{NodeId, geom::Axis};

/// Where a reference cycle was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// While resolving anchors in the parent's content box.
    Resolve,
    /// While measuring a wrapping parent along an axis.
    Measure(Axis),
}

/// A broken anchor reference cycle.
///
/// Cycles never fail a pass. The node that closed the loop is treated as
/// already resolved (or, during measurement, as a leaf with zero insets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// The node whose resolution was requested while already in progress.
    pub node: NodeId,
    /// The node that asked for it.
    pub requested_by: NodeId,
    /// Phase of the pass.
    pub phase: CyclePhase,
}

/// Counters for the most recent layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutStats {
    /// Calls into the per-node resolver, including cycle short-circuits.
    pub resolve_steps: usize,
    /// Nodes whose subtree layout ran.
    pub nodes_updated: usize,
    /// Wrapping measurements performed.
    pub measurements: usize,
    /// Generation-check retries.
    pub retries: usize,
    /// Reference cycles broken.
    pub cycles: usize,
    /// Frames committed by the apply phase.
    pub commits: usize,
}
