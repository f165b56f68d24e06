use tracing::{debug, trace, warn};

use super::{
    measure,
    report::{CyclePhase, CycleReport},
    resolve::{AxisInput, resolve_axis},
};
use crate::{
    NodeId,
    core::{
        Core,
        hook::HookContext,
        node::Node,
        update::{LayoutState, UpdateMode},
    },
    error::{Error, Result},
    geom::{Axis, Point, Rect, Span},
    layout::{
        Layout,
        constraint::{ResolveMark, SizeMode, scale},
    },
};

/// What a parent asks of a child it is laying out.
#[derive(Debug, Clone, Copy)]
struct ParentParams {
    /// Parent content box in parent-local coordinates.
    content: Rect,
    /// When false, children keep their requested frames.
    use_layout: bool,
    /// Resolve the child's width.
    horizontal: bool,
    /// Resolve the child's height.
    vertical: bool,
}

/// A single top-down layout pass followed by a bottom-up apply.
///
/// The pass resolves every dirty node reachable from its target. Resolution
/// writes only `layout_frame`; committed frames change only in [`apply`],
/// children before parents.
///
/// [`apply`]: LayoutPass::apply
pub(crate) struct LayoutPass<'a> {
    /// Tree being laid out.
    core: &'a mut Core,
}

impl<'a> LayoutPass<'a> {
    /// Create a pass over `core`.
    pub(crate) fn new(core: &'a mut Core) -> Self {
        Self { core }
    }

    /// Recompute `target`'s subtree and commit the results.
    ///
    /// A valid target only requests a redraw. Otherwise the target starts
    /// from its requested frame, if one is outstanding, and keeps its
    /// position: only its descendants are placed by this pass.
    pub(crate) fn run(&mut self, target: NodeId) -> Result<()> {
        let node = self.node_mut(target)?;
        if node.state == LayoutState::Valid {
            self.core.redraw = true;
            return Ok(());
        }
        if let Some(layout) = node.layout.as_deref_mut()
            && let Some(requested) = layout.take_request()
        {
            layout.layout_frame = requested;
        }

        debug!(?target, "layout pass");
        let max_rounds = self.core.config.max_relayout_retries;
        let mut rounds = 0;
        loop {
            self.update_node(target)?;
            let stale = self.stale_followers()?;
            if stale.is_empty() {
                break;
            }
            rounds += 1;
            if rounds > max_rounds {
                warn!(?target, followers = stale.len(), "cross references did not settle");
                break;
            }
            self.core.stats.retries += 1;
            trace!(?stale, "cross references moved, placing followers again");
            for follower in stale {
                self.redirty(target, follower)?;
            }
        }

        let node = self.node_mut(target)?;
        if node.layout.is_some() && node.layout_frame() != node.frame {
            node.need_apply = true;
        }
        self.apply(target)?;
        self.core.redraw = true;
        Ok(())
    }

    /// Followers whose non-sibling reference has moved since they last read
    /// it. The recorded frame is refreshed, so each move is reported once.
    /// Entries whose follower no longer refers to the node are dropped.
    fn stale_followers(&mut self) -> Result<Vec<NodeId>> {
        let entries: Vec<_> = self.core.cross_refs.iter().map(|(k, v)| (*k, *v)).collect();
        let mut stale = Vec::new();
        for ((follower, refer), seen) in entries {
            let live = self
                .core
                .nodes
                .get(follower)
                .and_then(|n| n.layout.as_deref())
                .is_some_and(|l| l.refers_to(refer));
            let current = if live {
                self.translated_frame(follower, refer)?
            } else {
                None
            };
            match current {
                None => {
                    self.core.cross_refs.remove(&(follower, refer));
                }
                Some(frame) if frame != seen => {
                    self.core.cross_refs.insert((follower, refer), frame);
                    if !stale.contains(&follower) {
                        stale.push(follower);
                    }
                }
                Some(_) => {}
            }
        }
        Ok(stale)
    }

    /// Dirty a follower and every ancestor up to the pass target, so the
    /// next round places it again. A follower outside the target's subtree,
    /// or the target itself, is queued for its parent to place instead.
    fn redirty(&mut self, target: NodeId, follower: NodeId) -> Result<()> {
        if follower == target || !self.core.is_ancestor(target, follower) {
            return self
                .core
                .invalidate_self_and_parent_layout(follower, UpdateMode::Deferred);
        }
        let mut current = Some(follower);
        while let Some(id) = current {
            let node = self.node_mut(id)?;
            node.mark_dirty();
            if id == target {
                break;
            }
            current = node.parent;
        }
        Ok(())
    }

    /// Node lookup.
    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.core.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))
    }

    /// Layout frame of a node, or its committed frame if unconstrained.
    fn layout_frame(&self, id: NodeId) -> Result<Rect> {
        self.core
            .nodes
            .get(id)
            .map(|n| n.layout_frame())
            .ok_or(Error::NodeNotFound(id))
    }

    /// Lay out the children of a dirty node and run its sizing, repeating
    /// from the top if the node is invalidated again while this runs.
    fn update_node(&mut self, id: NodeId) -> Result<()> {
        let mut retries = 0;
        loop {
            let node = self.node_mut(id)?;
            if node.state != LayoutState::Dirty {
                return Ok(());
            }
            node.state = LayoutState::Computing;
            let generation = node.generation;

            self.core.stats.nodes_updated += 1;
            self.update_children_and_size(id)?;

            let max_retries = self.core.config.max_relayout_retries;
            let node = self.node_mut(id)?;
            if node.generation == generation {
                node.state = LayoutState::Valid;
                return Ok(());
            }
            retries += 1;
            if retries > max_retries {
                warn!(?id, retries, "layout did not settle; keeping last result");
                node.state = LayoutState::Valid;
                return Ok(());
            }
            node.state = LayoutState::Dirty;
            self.core.stats.retries += 1;
            debug!(?id, retries, "node invalidated during layout, repeating");
        }
    }

    /// The body of [`update_node`](Self::update_node): resolve children in the
    /// content box, then size the node itself. If sizing changes the frame, the
    /// children are resolved once more against the new content box.
    fn update_children_and_size(&mut self, id: NodeId) -> Result<()> {
        let mut frame = self.layout_frame(id)?;
        for step in 0..2 {
            let node = self.node_mut(id)?;
            if let Some(padding) = node.padding.as_deref_mut() {
                padding.apply_weights(frame.size());
            }
            let children = node.children.clone();
            let custom = node.layout.as_ref().is_some_and(|l| l.custom_layout);
            let using_child_layouts = node.using_child_layouts;
            let wrapping = node.wrapping();
            let sized = custom || wrapping.0 || wrapping.1 || node.hook.is_some();

            if !children.is_empty() && !custom {
                let content = node
                    .padding
                    .as_deref()
                    .map_or_else(|| frame.size().rect(), |p| p.content(frame.size()));
                let params = ParentParams {
                    content,
                    use_layout: using_child_layouts,
                    horizontal: true,
                    vertical: true,
                };
                self.resolve_children(id, &children, &params)?;
            }

            if !sized {
                break;
            }

            self.run_sizing(id, wrapping)?;
            let child_moved = children
                .iter()
                .any(|c| self.core.nodes.get(*c).is_some_and(|n| n.need_apply));
            let node = self.node_mut(id)?;
            if child_moved {
                node.need_apply = true;
            }
            if let Some(layout) = node.layout.as_deref_mut() {
                layout.layout_frame = layout.restrict(layout.layout_frame);
            }

            let resized = self.layout_frame(id)?;
            if !using_child_layouts || step != 0 || resized == frame || children.is_empty() {
                break;
            }
            trace!(?id, ?frame, ?resized, "sized, relaying children");
            frame = resized;
        }
        Ok(())
    }

    /// Resolve every child of `id` in order. Children are marked pending first
    /// so that sibling references resolve on demand.
    fn resolve_children(
        &mut self,
        id: NodeId,
        children: &[NodeId],
        params: &ParentParams,
    ) -> Result<()> {
        for child in children {
            if let Some(layout) = self
                .core
                .nodes
                .get_mut(*child)
                .and_then(|n| n.layout.as_deref_mut())
            {
                layout.mark = ResolveMark::Pending;
            }
        }
        for child in children {
            self.resolve_in_parent(*child, id, params)?;
            if self.node_mut(*child)?.need_apply {
                self.node_mut(id)?.need_apply = true;
            }
        }
        Ok(())
    }

    /// Run the node's sizing hook, or size a wrapping node to its children.
    fn run_sizing(&mut self, id: NodeId, wrapping: (bool, bool)) -> Result<()> {
        let Some(mut hook) = self.node_mut(id)?.hook.take() else {
            return measure::wrap_to_children(self.core, id, wrapping);
        };
        let mut cx = HookContext::new(self.core, id, wrapping);
        hook.update_layout(&mut cx);
        if let Some(node) = self.core.nodes.get_mut(id)
            && node.hook.is_none()
        {
            node.hook = Some(hook);
        }
        Ok(())
    }

    /// Place a node inside its parent's content box.
    ///
    /// Each axis is resolved from the node's anchors, margins and size mode.
    /// The node's own subtree is then updated; if that changes its size on a
    /// requested axis the placement runs once more with the new size.
    fn resolve_in_parent(&mut self, id: NodeId, from: NodeId, params: &ParentParams) -> Result<()> {
        self.core.stats.resolve_steps += 1;
        let node = self.node_mut(id)?;
        let committed = node.frame;
        let Some(layout) = node.layout.as_deref_mut() else {
            return self.update_node(id);
        };
        match layout.mark {
            ResolveMark::Done => return Ok(()),
            ResolveMark::Resolving => {
                self.core.report_cycle(CycleReport {
                    node: id,
                    requested_by: from,
                    phase: CyclePhase::Resolve,
                });
                return Ok(());
            }
            ResolveMark::Pending => layout.mark = ResolveMark::Resolving,
        }

        let mut previous = layout.layout_frame;
        let mut frame = layout.take_request().unwrap_or(previous);

        if !params.use_layout {
            layout.layout_frame = frame;
            if previous.size() != frame.size() {
                node.mark_dirty();
            }
            self.update_node(id)?;
            return self.finish_resolve(id, committed);
        }

        layout.resolve_margins(params.content.size());
        let layout = layout.clone();

        for step in 0..2 {
            frame = self.place(id, &layout, frame, params)?;
            if step != 0 {
                break;
            }
            let node = self.node_mut(id)?;
            if previous.size() != frame.size() {
                node.mark_dirty();
            }
            previous = frame;
            node.set_layout_frame(frame);
            self.update_node(id)?;

            frame = self.layout_frame(id)?;
            let relayout = (params.horizontal && previous.w != frame.w)
                || (params.vertical && previous.h != frame.h);
            if !relayout {
                break;
            }
        }
        self.node_mut(id)?.set_layout_frame(frame);
        trace!(?id, ?frame, "resolved");
        self.finish_resolve(id, committed)
    }

    /// Mark a resolved node done and flag it for apply if it moved.
    fn finish_resolve(&mut self, id: NodeId, committed: Rect) -> Result<()> {
        let node = self.node_mut(id)?;
        if let Some(layout) = node.layout.as_deref_mut() {
            layout.mark = ResolveMark::Done;
            if layout.layout_frame != committed {
                node.need_apply = true;
            }
        }
        Ok(())
    }

    /// One placement step: provisional size, then both axes, then bounds.
    fn place(
        &mut self,
        id: NodeId,
        layout: &Layout,
        frame: Rect,
        params: &ParentParams,
    ) -> Result<Rect> {
        let parent = params.content;
        let mut w = frame.w;
        let mut h = frame.h;
        if layout.horizontal.mode == SizeMode::Weighted {
            w = scale(parent.w, layout.horizontal.weight);
        }
        if layout.vertical.mode == SizeMode::Weighted {
            h = scale(parent.h, layout.vertical.weight);
        }
        let size = layout.restrict_size(w, h);

        let mut spans = [Span::default(); 2];
        for (i, axis) in Axis::ALL.into_iter().enumerate() {
            let rules = layout.axis(axis);
            let input = AxisInput {
                mode: rules.mode,
                anchors: rules.anchors(),
                parent: parent.span(axis),
                margins: layout.margins.pair(axis),
                current_start: frame.span(axis).start,
                size: size.along(axis),
                requested: match axis {
                    Axis::Horizontal => params.horizontal,
                    Axis::Vertical => params.vertical,
                },
            };
            let mut refer = |r: NodeId| -> Result<Option<Span>> {
                Ok(self.refer_frame(id, r, params)?.map(|f| f.span(axis)))
            };
            spans[i] = resolve_axis(&input, &mut refer)?;
        }
        Ok(layout.restrict(Rect::from_spans(spans[0], spans[1])))
    }

    /// Frame of `refer` in the coordinate space of `id`'s parent.
    ///
    /// Siblings are resolved on demand. Other nodes are read as they stand
    /// and the value read is recorded; [`run`](Self::run) places the
    /// follower again if the reference moves later in the pass. Returns
    /// `None` for removed nodes or nodes in a different tree.
    fn refer_frame(&mut self, id: NodeId, refer: NodeId, params: &ParentParams) -> Result<Option<Rect>> {
        let Some(refer_parent) = self.core.nodes.get(refer).map(|n| n.parent) else {
            return Ok(None);
        };
        let parent = self.node_mut(id)?.parent;
        if parent == refer_parent {
            if parent.is_some() {
                self.resolve_in_parent(refer, id, params)?;
            }
            return self.layout_frame(refer).map(Some);
        }
        let frame = self.translated_frame(id, refer)?;
        match frame {
            Some(f) => {
                self.core.cross_refs.insert((id, refer), f);
            }
            None => {
                self.core.cross_refs.remove(&(id, refer));
            }
        }
        Ok(frame)
    }

    /// Current layout frame of `refer`, translated into `id`'s parent space
    /// through their common ancestor.
    fn translated_frame(&self, id: NodeId, refer: NodeId) -> Result<Option<Rect>> {
        let parent = self.core.nodes.get(id).and_then(|n| n.parent);
        let refer_parent = self.core.nodes.get(refer).and_then(|n| n.parent);
        let (Some(parent), Some(refer_parent)) = (parent, refer_parent) else {
            return Ok(None);
        };
        let frame = self.layout_frame(refer)?;
        let mut d = Point::zero();
        let mut view = Some(parent);
        while let Some(v) = view {
            let mut r = Point::zero();
            let mut other = Some(refer_parent);
            while let Some(o) = other {
                if o == v {
                    return Ok(Some(frame.translate(r - d)));
                }
                r += self.layout_frame(o)?.tl;
                other = self.core.nodes.get(o).and_then(|n| n.parent);
            }
            d += self.layout_frame(v)?.tl;
            view = self.core.nodes.get(v).and_then(|n| n.parent);
        }
        Ok(None)
    }

    /// Commit layout frames bottom-up, firing notifications for changes.
    fn apply(&mut self, id: NodeId) -> Result<()> {
        let node = self.node_mut(id)?;
        if !node.need_apply {
            return Ok(());
        }
        node.need_apply = false;
        let children = node.children.clone();
        let target = node.layout.as_ref().map(|l| l.layout_frame);
        for child in children {
            self.apply(child)?;
        }
        if let Some(frame) = target {
            self.core.stats.commits += 1;
            self.core.commit_frame(id, frame)?;
        }
        Ok(())
    }
}
