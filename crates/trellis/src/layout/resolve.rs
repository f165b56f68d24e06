use super::constraint::{Anchor, SizeMode};
use crate::{NodeId, error::Result, geom::Span};

/// Everything needed to place one axis of a node inside its parent.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AxisInput {
    /// Size mode on this axis.
    pub mode: SizeMode,
    /// Start and end anchors, after exclusivity rules.
    pub anchors: (Anchor, Anchor),
    /// Parent content box along this axis.
    pub parent: Span,
    /// Resolved start and end margins.
    pub margins: (i32, i32),
    /// Start coordinate before this pass.
    pub current_start: i32,
    /// Provisional size, already restricted to bounds.
    pub size: i32,
    /// False when the parent only wants the node kept at its current size.
    pub requested: bool,
}

/// Looks up another node's frame along the same axis, translated into the
/// resolving node's parent space. `None` means the reference is stale.
pub(crate) type Refer<'a> = dyn FnMut(NodeId) -> Result<Option<Span>> + 'a;

/// Start coordinate that centers `size` within `bound` after margins.
fn center(bound: Span, (ms, me): (i32, i32), size: i32) -> i32 {
    (bound.start + ms + bound.end - me - size) / 2
}

/// Position of the start edge, or `None` when unconstrained.
fn start_edge(input: &AxisInput, refer: &mut Refer<'_>) -> Result<Option<i32>> {
    let (ms, _) = input.margins;
    Ok(match input.anchors.0 {
        Anchor::Free => None,
        Anchor::ParentEdge => Some(input.parent.start + ms),
        Anchor::ToStart(r) => refer(r)?.map(|s| s.start + ms),
        Anchor::ToEnd(r) => refer(r)?.map(|s| s.end + ms),
        Anchor::CenterInParent => Some(center(input.parent, input.margins, input.size)),
        Anchor::CenterIn(r) => refer(r)?.map(|s| center(s, input.margins, input.size)),
    })
}

/// Position of the end edge, or `None` when unconstrained.
fn end_edge(input: &AxisInput, refer: &mut Refer<'_>) -> Result<Option<i32>> {
    let (_, me) = input.margins;
    Ok(match input.anchors.1 {
        Anchor::Free => None,
        Anchor::ParentEdge => Some(input.parent.end - me),
        Anchor::ToStart(r) => refer(r)?.map(|s| s.start - me),
        Anchor::ToEnd(r) => refer(r)?.map(|s| s.end - me),
        Anchor::CenterInParent => {
            Some(center(input.parent, input.margins, input.size) + input.size)
        }
        Anchor::CenterIn(r) => refer(r)?.map(|s| center(s, input.margins, input.size) + input.size),
    })
}

/// Resolve one axis.
///
/// The start edge is resolved before the end edge. A filling axis with both
/// edges constrained spans them; every other case places the provisional
/// size against whichever edge is constrained, preferring the start.
pub(crate) fn resolve_axis(input: &AxisInput, refer: &mut Refer<'_>) -> Result<Span> {
    if !input.requested {
        return Ok(Span::sized(input.current_start, input.size));
    }
    let start = start_edge(input, refer)?;
    let end = end_edge(input, refer)?;
    Ok(match (start, end) {
        (Some(s), Some(e)) if input.mode == SizeMode::Filling => Span::new(s, e.max(s)),
        (Some(s), _) => Span::sized(s, input.size),
        (None, Some(e)) => Span::new(e - input.size, e),
        (None, None) => Span::sized(input.current_start, input.size),
    })
}
