use std::collections::{HashMap, HashSet};

use super::{
    constraint::{Anchor, SizeMode},
    report::{CyclePhase, CycleReport},
};
use crate::{
    NodeId,
    core::{Core, node::Visibility},
    error::{Error, Result},
    geom::{Axis, Expanse},
};

/// Space a child needs before and after its own box.
type Insets = (i32, i32);

/// Measures the extent of a wrapping node's children along one axis.
///
/// Each child contributes its size plus a pair of insets: the room its
/// anchors and margins require between it and the parent's content edges.
/// Children anchored to siblings derive their insets from the sibling's, so
/// results are memoized per node for the lifetime of one measurement.
struct WrapMeasure<'a> {
    /// Tree being measured.
    core: &'a Core,
    /// Axis under measurement.
    axis: Axis,
    /// Parent's fixed padding at the start and end of the axis.
    pad: Insets,
    /// Insets for children that anchor to other nodes.
    memo: HashMap<NodeId, Insets>,
    /// Children whose insets are being computed.
    active: HashSet<NodeId>,
    /// Cycles broken during measurement.
    cycles: Vec<CycleReport>,
}

impl<'a> WrapMeasure<'a> {
    /// Start a measurement along `axis`.
    fn new(core: &'a Core, axis: Axis, pad: Insets) -> Self {
        Self {
            core,
            axis,
            pad,
            memo: HashMap::new(),
            active: HashSet::new(),
            cycles: Vec::new(),
        }
    }

    /// Referenced node if it is still alive.
    fn live(&self, anchor: Anchor) -> Option<NodeId> {
        anchor
            .reference()
            .filter(|id| self.core.nodes.contains_key(*id))
    }

    /// Size and insets of one child. `from` is the node that asked, for
    /// cycle reports.
    fn child(&mut self, id: NodeId, from: NodeId) -> (i32, Insets) {
        let (core, axis) = (self.core, self.axis);
        let Some(node) = core.nodes.get(id) else {
            return (0, (0, 0));
        };
        let Some(layout) = node.layout.as_deref() else {
            return (node.frame.extent(axis), (node.frame.span(axis).start, 0));
        };
        let rules = *layout.axis(axis);
        let (start, end) = rules.anchors();
        let frame = layout.layout_frame;
        let size = frame.extent(axis);
        let margins = layout.margins.pair(axis);

        let refers = self.live(start).is_some()
            || (matches!(end, Anchor::ToStart(_) | Anchor::ToEnd(_)) && self.live(end).is_some());

        let insets = if !refers {
            if start.is_free() && end.is_free() {
                (frame.span(axis).start, 0)
            } else {
                (self.pad.0 + margins.0, self.pad.1 + margins.1)
            }
        } else if let Some(insets) = self.memo.get(&id) {
            *insets
        } else if self.active.contains(&id) {
            self.cycles.push(CycleReport {
                node: id,
                requested_by: from,
                phase: CyclePhase::Measure(axis),
            });
            return (size, (0, 0));
        } else {
            self.active.insert(id);
            let insets = self.referenced_insets(id, rules.mode, (start, end), size, margins);
            self.active.remove(&id);
            self.memo.insert(id, insets);
            insets
        };

        if rules.mode == SizeMode::Filling {
            (0, insets)
        } else {
            (size, insets)
        }
    }

    /// Insets for a child whose anchors refer to other nodes.
    fn referenced_insets(
        &mut self,
        id: NodeId,
        mode: SizeMode,
        (start, end): (Anchor, Anchor),
        size: i32,
        (margin_start, margin_end): Insets,
    ) -> Insets {
        let mut insets = (self.pad.0 + margin_start, self.pad.1 + margin_end);

        if let Anchor::CenterIn(_) = start {
            if mode != SizeMode::Filling
                && let Some(r) = self.live(start)
            {
                let (rsize, rinsets) = self.child(r, id);
                let diff = rsize / 2 - size / 2;
                insets.0 = insets.0.max(rinsets.0 + diff);
                insets.1 = insets.1.max(rinsets.1 + diff);
            }
            return insets;
        }

        if let Some(r) = self.live(start) {
            let (rsize, rinsets) = self.child(r, id);
            let after = matches!(start, Anchor::ToEnd(_));
            insets.0 = rinsets.0 + margin_start + if after { rsize } else { 0 };
            if end.is_free() {
                let t = rinsets.1 - size + if after { 0 } else { rsize };
                insets.1 = insets.1.max(t);
            }
        }

        if matches!(end, Anchor::ToStart(_) | Anchor::ToEnd(_))
            && let Some(r) = self.live(end)
        {
            let (rsize, rinsets) = self.child(r, id);
            let before = matches!(end, Anchor::ToStart(_));
            insets.1 = rinsets.1 + margin_end + if before { rsize } else { 0 };
            if start.is_free() {
                let t = rinsets.0 - size + if before { 0 } else { rsize };
                insets.0 = insets.0.max(t);
            }
        }
        insets
    }
}

/// Measure the minimal size that contains every non-gone child of `id`,
/// including the node's own padding.
///
/// Returns the measured size along with any reference cycles that had to be
/// broken.
pub(crate) fn measure_children(core: &Core, id: NodeId) -> Result<(Expanse, Vec<CycleReport>)> {
    let node = core.nodes.get(id).ok_or(Error::NodeNotFound(id))?;
    let padding = node.padding.as_deref();
    let fixed = padding.map(|p| p.fixed()).unwrap_or_default();

    let mut cycles = Vec::new();
    let mut size = Expanse::default();
    for axis in Axis::ALL {
        let pad = fixed.pair(axis);
        let mut m = WrapMeasure::new(core, axis, pad);
        let mut measured = pad.0 + pad.1;
        for child in &node.children {
            let gone = core
                .nodes
                .get(*child)
                .is_none_or(|c| c.visibility == Visibility::Gone);
            if gone {
                continue;
            }
            let (extent, (before, after)) = m.child(*child, id);
            measured = measured.max(before + extent + after);
        }
        if let Some(share) = padding.and_then(|p| p.content_share(axis)) {
            measured = (measured as f32 / share) as i32;
        }
        match axis {
            Axis::Horizontal => size.w = measured,
            Axis::Vertical => size.h = measured,
        }
        cycles.append(&mut m.cycles);
    }
    Ok((size, cycles))
}

/// Size a wrapping node's layout frame to its children on the wrapping axes.
///
/// A childless node takes its padding plus the configured empty size.
pub(crate) fn wrap_to_children(core: &mut Core, id: NodeId, wrapping: (bool, bool)) -> Result<()> {
    if !wrapping.0 && !wrapping.1 {
        return Ok(());
    }
    let (mut size, cycles) = measure_children(core, id)?;
    core.stats.measurements += 1;
    for report in cycles {
        core.report_cycle(report);
    }

    let node = core.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))?;
    if node.children.is_empty() {
        size.w += core.config.empty_wrap_width;
        size.h += core.config.empty_wrap_height;
    }
    let frame = node.layout_frame();
    let w = if wrapping.0 { size.w } else { frame.w };
    let h = if wrapping.1 { size.h } else { frame.h };
    node.set_layout_frame(frame.with_size(w, h));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        UpdateMode,
        geom::{Edges, Rect},
        layout::Length,
    };

    fn wrapping_parent(core: &mut Core) -> Result<NodeId> {
        let parent = core.add_child(core.root())?;
        core.constrain(parent)?
            .width(SizeMode::Wrapping)
            .height(SizeMode::Wrapping)
            .apply(UpdateMode::Init)?;
        Ok(parent)
    }

    #[test]
    fn leaf_children_use_frame_extent() -> Result<()> {
        let mut core = Core::new();
        let parent = wrapping_parent(&mut core)?;
        let a = core.add_child(parent)?;
        core.set_frame(a, Rect::new(5, 7, 20, 10), UpdateMode::Init)?;
        let b = core.add_child(parent)?;
        core.set_frame(b, Rect::new(0, 30, 8, 4), UpdateMode::Init)?;

        let (size, cycles) = measure_children(&core, parent)?;
        assert_eq!(size, Expanse::new(25, 34));
        assert!(cycles.is_empty());
        Ok(())
    }

    #[test]
    fn parent_edge_children_add_padding_and_margins() -> Result<()> {
        let mut core = Core::new();
        let parent = wrapping_parent(&mut core)?;
        core.set_padding(parent, Edges::all(Length::Fixed(3)), UpdateMode::Init)?;
        let a = core.add_child(parent)?;
        core.set_size(a, 40, 10, UpdateMode::Init)?;
        core.constrain(a)?
            .align_parent_left()
            .align_parent_top()
            .margin_left(5)
            .apply(UpdateMode::Init)?;

        let (size, _) = measure_children(&core, parent)?;
        assert_eq!(size, Expanse::new(3 + 5 + 40 + 3, 3 + 10 + 3));
        Ok(())
    }

    #[test]
    fn chained_siblings_accumulate() -> Result<()> {
        let mut core = Core::new();
        let parent = wrapping_parent(&mut core)?;
        let a = core.add_child(parent)?;
        core.set_size(a, 30, 10, UpdateMode::Init)?;
        core.constrain(a)?.align_parent_left().apply(UpdateMode::Init)?;
        let b = core.add_child(parent)?;
        core.set_size(b, 20, 10, UpdateMode::Init)?;
        core.constrain(b)?
            .right_of(a)
            .margin_left(4)
            .apply(UpdateMode::Init)?;
        let c = core.add_child(parent)?;
        core.set_size(c, 10, 10, UpdateMode::Init)?;
        core.constrain(c)?.right_of(b).apply(UpdateMode::Init)?;

        let (size, _) = measure_children(&core, parent)?;
        assert_eq!(size.w, 30 + 4 + 20 + 10);
        Ok(())
    }

    #[test]
    fn gone_children_are_skipped() -> Result<()> {
        let mut core = Core::new();
        let parent = wrapping_parent(&mut core)?;
        let a = core.add_child(parent)?;
        core.set_frame(a, Rect::new(0, 0, 100, 100), UpdateMode::Init)?;
        core.set_visibility(a, Visibility::Gone, UpdateMode::Init)?;
        let b = core.add_child(parent)?;
        core.set_frame(b, Rect::new(0, 0, 10, 10), UpdateMode::Init)?;

        let (size, _) = measure_children(&core, parent)?;
        assert_eq!(size, Expanse::new(10, 10));
        Ok(())
    }

    #[test]
    fn weighted_padding_scales_result() -> Result<()> {
        let mut core = Core::new();
        let parent = wrapping_parent(&mut core)?;
        core.set_padding(
            parent,
            Edges::new(
                Length::Weight(0.25),
                Length::Fixed(0),
                Length::Weight(0.25),
                Length::Fixed(0),
            ),
            UpdateMode::Init,
        )?;
        let a = core.add_child(parent)?;
        core.set_frame(a, Rect::new(0, 0, 50, 10), UpdateMode::Init)?;

        let (size, _) = measure_children(&core, parent)?;
        assert_eq!(size.w, 100);
        Ok(())
    }

    #[test]
    fn mutual_references_terminate() -> Result<()> {
        let mut core = Core::new();
        let parent = wrapping_parent(&mut core)?;
        let a = core.add_child(parent)?;
        let b = core.add_child(parent)?;
        core.set_size(a, 10, 10, UpdateMode::Init)?;
        core.set_size(b, 10, 10, UpdateMode::Init)?;
        core.constrain(a)?.right_of(b).apply(UpdateMode::Init)?;
        core.constrain(b)?.right_of(a).apply(UpdateMode::Init)?;

        let (_, cycles) = measure_children(&core, parent)?;
        assert!(!cycles.is_empty());
        assert!(
            cycles
                .iter()
                .all(|c| c.phase == CyclePhase::Measure(Axis::Horizontal))
        );
        Ok(())
    }
}
