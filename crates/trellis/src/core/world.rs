use std::{
    collections::{HashMap, HashSet},
    mem,
};

use scopeguard::guard;
use slotmap::SlotMap;
use tracing::{debug, warn};

use crate::{
    core::{
        config::LayoutConfig,
        dispatch::{LayoutHandle, RequestQueue},
        hook::{FrameObserver, SizeHook},
        id::NodeId,
        node::{Node, Visibility},
        update::{LayoutState, UpdateMode},
    },
    error::{Error, Result},
    geom::{Edges, Point, Rect, Side},
    layout::{
        ConstraintBuilder, Layout, Length, Padding,
        pass::LayoutPass,
        report::{CycleReport, LayoutStats},
    },
};

/// Callback invoked for each broken reference cycle.
pub type CycleHook = Box<dyn FnMut(&CycleReport)>;

/// The node arena and layout scheduler.
///
/// All tree mutation, invalidation and layout happens through `&mut Core` on
/// the thread that owns it. Other threads reach it through a
/// [`LayoutHandle`].
pub struct Core {
    /// Node arena.
    pub(crate) nodes: SlotMap<NodeId, Node>,
    /// Root node.
    pub(crate) root: NodeId,
    /// Scheduler tunables.
    pub(crate) config: LayoutConfig,
    /// Nesting depth of running passes; non-zero while a pass is active.
    pub(crate) pass_depth: usize,
    /// Pass targets waiting for the next flush.
    pub(crate) pending: Vec<NodeId>,
    /// Set when something visible changed.
    pub(crate) redraw: bool,
    /// Counters for the current or most recent flush.
    pub(crate) stats: LayoutStats,
    /// Optional cycle diagnostic.
    pub(crate) cycle_hook: Option<CycleHook>,
    /// Requests from other threads.
    pub(crate) requests: RequestQueue,
    /// Frames of non-sibling references as last read by their followers,
    /// keyed by `(follower, reference)` and in the follower's parent space.
    pub(crate) cross_refs: HashMap<(NodeId, NodeId), Rect>,
}

impl Default for Core {
    fn default() -> Self {
        Self::new()
    }
}

impl Core {
    /// Construct a tree holding only a root node.
    pub fn new() -> Self {
        Self::with_config(LayoutConfig::default())
    }

    /// Construct a tree with explicit scheduler settings.
    pub fn with_config(config: LayoutConfig) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(Rect::default()));
        Self {
            nodes,
            root,
            config,
            pass_depth: 0,
            pending: Vec::new(),
            redraw: false,
            stats: LayoutStats::default(),
            cycle_hook: None,
            requests: RequestQueue::new(),
            cross_refs: HashMap::new(),
        }
    }

    /// The scheduler settings.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Return the root node id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Return a node by id.
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    /// Does the arena hold this node?
    pub fn contains(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(node_id)
    }

    /// Return a node or a not-found error.
    fn get(&self, node_id: NodeId) -> Result<&Node> {
        self.nodes.get(node_id).ok_or(Error::NodeNotFound(node_id))
    }

    /// Return a node mutably or a not-found error.
    fn get_mut(&mut self, node_id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(node_id).ok_or(Error::NodeNotFound(node_id))
    }

    /// Return a node's parent.
    pub fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes.get(node_id).and_then(|n| n.parent)
    }

    /// Return a node's children in order.
    pub fn children(&self, node_id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.get(node_id)?.children)
    }

    /// Create a detached node.
    pub fn add(&mut self) -> NodeId {
        self.nodes.insert(Node::new(Rect::default()))
    }

    /// Create a node and attach it as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId) -> Result<NodeId> {
        self.get(parent)?;
        let child = self.add();
        self.attach(parent, child)?;
        Ok(child)
    }

    /// Attach a detached node as the last child of `parent`.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_attachable(parent, child)?;
        if self.get(child)?.parent.is_some() {
            return Err(Error::AlreadyAttached(child));
        }
        self.get_mut(child)?.parent = Some(parent);
        self.get_mut(parent)?.children.push(child);
        self.structure_changed(parent)?;
        self.debug_assert_tree_invariants();
        Ok(())
    }

    /// Check that `child` may be placed under `parent`.
    fn check_attachable(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get(parent)?;
        let node = self.get(child)?;
        if child == self.root {
            return Err(Error::InvalidOperation("cannot attach the root".into()));
        }
        if self.is_ancestor(child, parent) {
            return Err(Error::WouldCreateCycle { parent, child });
        }
        if node.parent.is_some_and(|p| p != parent) {
            return Err(Error::AlreadyAttached(child));
        }
        Ok(())
    }

    /// Detach a node from its parent, keeping its subtree alive.
    pub fn detach(&mut self, child: NodeId) -> Result<()> {
        let Some(parent) = self.get(child)?.parent else {
            return Ok(());
        };
        self.get_mut(parent)?.children.retain(|id| *id != child);
        self.get_mut(child)?.parent = None;
        self.structure_changed(parent)?;
        self.debug_assert_tree_invariants();
        Ok(())
    }

    /// Replace a node's children. Children dropped from the list are
    /// detached, not removed.
    pub fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) -> Result<()> {
        let mut seen = HashSet::with_capacity(children.len());
        for child in &children {
            if !seen.insert(*child) {
                return Err(Error::InvalidOperation(format!(
                    "duplicate child {child:?}"
                )));
            }
            self.check_attachable(parent, *child)?;
        }
        let old = mem::take(&mut self.get_mut(parent)?.children);
        for child in old {
            if !seen.contains(&child)
                && let Some(node) = self.nodes.get_mut(child)
            {
                node.parent = None;
            }
        }
        for child in &children {
            self.get_mut(*child)?.parent = Some(parent);
        }
        self.get_mut(parent)?.children = children;
        self.structure_changed(parent)?;
        self.debug_assert_tree_invariants();
        Ok(())
    }

    /// Remove a node and all descendants from the arena.
    ///
    /// Anchors elsewhere that refer to removed nodes behave as free edges
    /// from then on.
    pub fn remove_subtree(&mut self, root_id: NodeId) -> Result<()> {
        if root_id == self.root {
            return Err(Error::InvalidOperation("cannot remove root".into()));
        }
        let parent = self.get(root_id)?.parent;
        if let Some(parent) = parent {
            self.get_mut(parent)?.children.retain(|id| *id != root_id);
        }
        let removed = self.subtree_post_order(root_id);
        for node_id in &removed {
            self.nodes.remove(*node_id);
        }
        self.pending.retain(|id| !removed.contains(id));
        self.cross_refs
            .retain(|(follower, refer), _| !removed.contains(follower) && !removed.contains(refer));
        if let Some(parent) = parent {
            self.structure_changed(parent)?;
        }
        self.debug_assert_tree_invariants();
        Ok(())
    }

    /// Mark a parent whose child list changed, for the next pass.
    fn structure_changed(&mut self, parent: NodeId) -> Result<()> {
        let top = self.mark_wrapping_chain(parent)?;
        self.queue(top);
        Ok(())
    }

    /// Collect a subtree in post-order, including the root.
    fn subtree_post_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![(root, false)];
        while let Some((node_id, visited)) = stack.pop() {
            let Some(node) = self.nodes.get(node_id) else {
                continue;
            };
            if visited {
                out.push(node_id);
                continue;
            }
            stack.push((node_id, true));
            for child in node.children.iter().rev() {
                stack.push((*child, false));
            }
        }
        out
    }

    /// Return true if `ancestor` appears in the parent chain of `node`
    /// (including `node` itself).
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    /// Return the constraint record for a node, if it has one.
    pub fn layout(&self, node_id: NodeId) -> Option<&Layout> {
        self.nodes.get(node_id).and_then(|n| n.layout.as_deref())
    }

    /// Edit a node's constraints. The record is created on first use,
    /// seeded from the node's committed frame.
    pub fn constrain(&mut self, node_id: NodeId) -> Result<ConstraintBuilder<'_>> {
        let node = self.get(node_id)?;
        let layout = node
            .layout
            .as_deref()
            .cloned()
            .unwrap_or_else(|| Layout::new(node.frame));
        Ok(ConstraintBuilder::new(self, node_id, layout))
    }

    /// Store an edited record, keeping pass-owned state from the live copy.
    pub(crate) fn store_layout(&mut self, node_id: NodeId, mut layout: Layout) -> Result<()> {
        let node = self.get_mut(node_id)?;
        if let Some(current) = node.layout.as_deref() {
            layout.layout_frame = current.layout_frame;
            layout.requested_frame = current.requested_frame;
            layout.requested = current.requested;
            layout.mark = current.mark;
        }
        node.layout = Some(Box::new(layout));
        Ok(())
    }

    /// Replace a node's padding.
    pub fn set_padding(&mut self, node_id: NodeId, padding: Edges<Length>, mode: UpdateMode) -> Result<()> {
        let node = self.get_mut(node_id)?;
        let mut p = Padding::new(padding);
        p.apply_weights(node.layout_frame().size());
        node.padding = Some(Box::new(p));
        self.invalidate_self_and_parent_layout(node_id, mode)
    }

    /// Replace the padding on one side.
    pub fn set_padding_side(
        &mut self,
        node_id: NodeId,
        side: Side,
        length: Length,
        mode: UpdateMode,
    ) -> Result<()> {
        let node = self.get_mut(node_id)?;
        let size = node.layout_frame().size();
        let padding = node.padding.get_or_insert_with(Box::default);
        padding.set(side, length);
        padding.apply_weights(size);
        self.invalidate_self_and_parent_layout(node_id, mode)
    }

    /// Set a node's visibility. Changes to or from [`Visibility::Gone`]
    /// affect a wrapping parent's measurement.
    pub fn set_visibility(&mut self, node_id: NodeId, visibility: Visibility, mode: UpdateMode) -> Result<()> {
        let node = self.get_mut(node_id)?;
        let before = node.visibility;
        if before == visibility {
            return Ok(());
        }
        node.visibility = visibility;
        if before == Visibility::Gone || visibility == Visibility::Gone {
            self.invalidate_parent_layout(node_id, mode)
        } else {
            if !mode.is_init() {
                self.redraw = true;
            }
            Ok(())
        }
    }

    /// Choose whether children are placed by their constraints or keep their
    /// requested frames.
    pub fn set_using_child_layouts(&mut self, node_id: NodeId, using: bool, mode: UpdateMode) -> Result<()> {
        self.get_mut(node_id)?.using_child_layouts = using;
        self.invalidate_layout(node_id, mode)
    }

    /// Install a sizing hook, replacing any existing one.
    pub fn set_hook(&mut self, node_id: NodeId, hook: impl SizeHook + 'static, mode: UpdateMode) -> Result<()> {
        self.get_mut(node_id)?.hook = Some(Box::new(hook));
        self.invalidate_self_and_parent_layout(node_id, mode)
    }

    /// Remove a node's sizing hook.
    pub fn clear_hook(&mut self, node_id: NodeId, mode: UpdateMode) -> Result<()> {
        self.get_mut(node_id)?.hook = None;
        self.invalidate_self_and_parent_layout(node_id, mode)
    }

    /// Install a frame observer, replacing any existing one.
    pub fn set_observer(&mut self, node_id: NodeId, observer: impl FrameObserver + 'static) -> Result<()> {
        self.get_mut(node_id)?.observer = Some(Box::new(observer));
        Ok(())
    }

    /// Install a callback for broken reference cycles.
    pub fn set_cycle_hook(&mut self, hook: impl FnMut(&CycleReport) + 'static) {
        self.cycle_hook = Some(Box::new(hook));
    }

    /// Committed frame of a node.
    pub fn frame(&self, node_id: NodeId) -> Result<Rect> {
        Ok(self.get(node_id)?.frame)
    }

    /// Output of the last layout pass for a node.
    pub fn layout_frame(&self, node_id: NodeId) -> Result<Rect> {
        Ok(self.get(node_id)?.layout_frame())
    }

    /// Last frame explicitly requested for a node.
    pub fn requested_frame(&self, node_id: NodeId) -> Result<Rect> {
        let node = self.get(node_id)?;
        Ok(node.layout.as_ref().map_or(node.frame, |l| l.requested_frame))
    }

    /// Content box of a node in its own coordinates: the committed size
    /// minus padding.
    pub fn content_box(&self, node_id: NodeId) -> Result<Rect> {
        let node = self.get(node_id)?;
        Ok(node.frame.size().rect().inset(node.padding_px()))
    }

    /// Request a frame for a node.
    ///
    /// A constrained child in [`UpdateMode::Layout`] or
    /// [`UpdateMode::Deferred`] stores the request, clamped to its bounds,
    /// for the next pass to resolve from. Anything else commits the frame
    /// directly.
    pub fn set_frame(&mut self, node_id: NodeId, frame: Rect, mode: UpdateMode) -> Result<()> {
        let node = self.get_mut(node_id)?;
        let constrained_child = node.parent.is_some() && node.layout.is_some();
        if constrained_child && matches!(mode, UpdateMode::Layout | UpdateMode::Deferred) {
            if let Some(layout) = node.layout.as_deref_mut() {
                layout.request(frame);
            }
            return self.invalidate_self_and_parent_layout(node_id, mode);
        }

        let frame = node.layout.as_ref().map_or(frame, |l| l.restrict(frame));
        let resized = node.frame.size() != frame.size();
        self.commit(node_id, frame, !mode.is_init())?;
        match mode {
            UpdateMode::Layout | UpdateMode::Deferred if resized => {
                self.invalidate_self_and_parent_layout(node_id, mode)
            }
            UpdateMode::Init => Ok(()),
            _ => {
                self.redraw = true;
                Ok(())
            }
        }
    }

    /// Request a size, keeping the requested origin.
    pub fn set_size(&mut self, node_id: NodeId, w: i32, h: i32, mode: UpdateMode) -> Result<()> {
        let frame = self.requested_frame(node_id)?.with_size(w, h);
        self.set_frame(node_id, frame, mode)
    }

    /// Request a width.
    pub fn set_width(&mut self, node_id: NodeId, w: i32, mode: UpdateMode) -> Result<()> {
        let frame = self.requested_frame(node_id)?;
        self.set_frame(node_id, frame.with_size(w, frame.h), mode)
    }

    /// Request a height.
    pub fn set_height(&mut self, node_id: NodeId, h: i32, mode: UpdateMode) -> Result<()> {
        let frame = self.requested_frame(node_id)?;
        self.set_frame(node_id, frame.with_size(frame.w, h), mode)
    }

    /// Request an origin, keeping the requested size.
    pub fn set_position(&mut self, node_id: NodeId, x: i32, y: i32, mode: UpdateMode) -> Result<()> {
        let frame = self.requested_frame(node_id)?.at(Point::new(x, y));
        self.set_frame(node_id, frame, mode)
    }

    /// Set a node's layout frame directly. The next apply commits it. Meant
    /// for custom layouts that place children themselves.
    pub fn set_layout_frame(&mut self, node_id: NodeId, frame: Rect) -> Result<()> {
        self.get_mut(node_id)?.set_layout_frame(frame);
        Ok(())
    }

    /// Commit a frame, firing observer notifications for what changed.
    pub(crate) fn commit_frame(&mut self, node_id: NodeId, frame: Rect) -> Result<()> {
        self.commit(node_id, frame, true)
    }

    /// Commit a frame, optionally notifying the observer.
    fn commit(&mut self, node_id: NodeId, frame: Rect, notify: bool) -> Result<()> {
        let node = self.get_mut(node_id)?;
        let old = node.frame;
        node.frame = frame;
        if let Some(layout) = node.layout.as_deref_mut() {
            layout.layout_frame = frame;
            layout.requested_frame = frame;
        }
        let moved = old.tl != frame.tl;
        let resized = old.size() != frame.size();
        if resized && let Some(padding) = node.padding.as_deref_mut() {
            padding.apply_weights(frame.size());
        }
        if !notify || !(moved || resized) {
            return Ok(());
        }
        if let Some(observer) = node.observer.as_mut() {
            if moved {
                observer.moved(node_id, frame.tl.x, frame.tl.y);
            }
            if resized {
                observer.resized(node_id, frame.w, frame.h);
            }
        }
        Ok(())
    }

    /// Mark a node dirty, then climb while the node below can change size
    /// and its parent must see that. A wrapping node always climbs into its
    /// parent; a node with a sizing hook climbs only into a wrapping parent.
    /// Returns the topmost node marked, which is where a pass must start.
    fn mark_wrapping_chain(&mut self, node_id: NodeId) -> Result<NodeId> {
        let mut current = node_id;
        loop {
            let node = self.get_mut(current)?;
            node.mark_dirty();
            let wraps = node.layout.as_ref().is_some_and(|l| l.wraps_any());
            let hooked = node.hook.is_some();
            let Some(parent) = node.parent else {
                return Ok(current);
            };
            let parent_wraps = self
                .get(parent)?
                .layout
                .as_ref()
                .is_some_and(|l| l.wraps_any());
            if wraps || (hooked && parent_wraps) {
                current = parent;
            } else {
                return Ok(current);
            }
        }
    }

    /// Invalidate a node's own layout: its children are placed again and, if
    /// it wraps them, its size is measured again, propagating to wrapping
    /// ancestors.
    pub fn invalidate_layout(&mut self, node_id: NodeId, mode: UpdateMode) -> Result<()> {
        match mode {
            UpdateMode::Init => Ok(()),
            UpdateMode::Redraw => {
                self.get_mut(node_id)?.mark_dirty();
                self.redraw = true;
                Ok(())
            }
            UpdateMode::Deferred => {
                let top = self.mark_wrapping_chain(node_id)?;
                self.queue(top);
                Ok(())
            }
            UpdateMode::Layout => {
                let top = self.mark_wrapping_chain(node_id)?;
                self.schedule(top)
            }
        }
    }

    /// Invalidate a node and its parent's placement of it.
    pub fn invalidate_self_and_parent_layout(&mut self, node_id: NodeId, mode: UpdateMode) -> Result<()> {
        if mode.is_init() {
            return Ok(());
        }
        let node = self.get_mut(node_id)?;
        node.mark_dirty();
        let parent = node.parent;
        match mode {
            UpdateMode::Redraw => {
                if let Some(parent) = parent {
                    self.get_mut(parent)?.mark_dirty();
                }
                self.redraw = true;
                Ok(())
            }
            _ => {
                let top = match parent {
                    Some(parent) => self.mark_wrapping_chain(parent)?,
                    None => node_id,
                };
                if mode.is_layout() {
                    self.schedule(top)
                } else {
                    self.queue(top);
                    Ok(())
                }
            }
        }
    }

    /// Invalidate the parent's layout, so the node is placed again.
    pub fn invalidate_parent_layout(&mut self, node_id: NodeId, mode: UpdateMode) -> Result<()> {
        match self.get(node_id)?.parent {
            Some(parent) => self.invalidate_layout(parent, mode),
            None => Ok(()),
        }
    }

    /// Queue a pass target for the next flush.
    fn queue(&mut self, target: NodeId) {
        if !self.pending.contains(&target) {
            self.pending.push(target);
        }
    }

    /// Queue a pass target and flush, unless a pass is already running, in
    /// which case the running pass picks it up.
    fn schedule(&mut self, target: NodeId) -> Result<()> {
        self.queue(target);
        self.update_layout()
    }

    /// Run every queued layout pass.
    ///
    /// Passes queued while this runs (from sizing hooks) are run too, up to
    /// the configured retry limit. Called while a pass is already running,
    /// this does nothing.
    pub fn update_layout(&mut self) -> Result<()> {
        if self.pass_depth > 0 || self.pending.is_empty() {
            return Ok(());
        }
        let mut core = guard(self, |core| core.pass_depth -= 1);
        core.pass_depth += 1;
        core.stats = LayoutStats::default();

        let mut rounds = 0;
        while !core.pending.is_empty() {
            rounds += 1;
            if rounds > core.config.max_relayout_retries {
                warn!(
                    pending = core.pending.len(),
                    "layout kept requesting passes; giving up for now"
                );
                core.pending.clear();
                break;
            }
            let batch = mem::take(&mut core.pending);
            for target in batch {
                if core.nodes.contains_key(target) {
                    LayoutPass::new(&mut **core).run(target)?;
                }
            }
        }
        debug!(stats = ?core.stats, "layout flushed");
        Ok(())
    }

    /// Statistics from the most recent flush.
    pub fn last_stats(&self) -> LayoutStats {
        self.stats
    }

    /// True if anything needs layout.
    pub fn has_pending_layout(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Return and clear the redraw request flag.
    pub fn take_redraw_request(&mut self) -> bool {
        mem::take(&mut self.redraw)
    }

    /// Record a broken reference cycle.
    pub(crate) fn report_cycle(&mut self, report: CycleReport) {
        self.stats.cycles += 1;
        if self.config.log_cycles {
            warn!(
                node = ?report.node,
                requested_by = ?report.requested_by,
                phase = ?report.phase,
                "anchor reference cycle broken"
            );
        }
        if let Some(hook) = self.cycle_hook.as_mut() {
            hook(&report);
        }
    }

    /// A `Send` handle for queueing work from other threads.
    pub fn handle(&self) -> LayoutHandle {
        self.requests.handle()
    }

    /// Run queued cross-thread requests in arrival order, then any layout
    /// they requested. Returns the number of requests run.
    ///
    /// A failing request is logged and skipped; the sender has no way to
    /// receive the error.
    pub fn process_requests(&mut self) -> Result<usize> {
        let mut count = 0;
        while let Some(request) = self.requests.try_next() {
            if let Err(e) = request(self) {
                warn!(error = %e, "layout request failed");
            }
            count += 1;
        }
        self.update_layout()?;
        Ok(count)
    }

    /// True when the node and all its descendants are laid out.
    pub fn is_layout_valid(&self, node_id: NodeId) -> bool {
        self.subtree_post_order(node_id)
            .iter()
            .all(|id| self.nodes.get(*id).is_some_and(|n| n.state == LayoutState::Valid))
    }

    /// Assert structural invariants on the node tree in debug builds.
    #[cfg(debug_assertions)]
    pub(crate) fn debug_assert_tree_invariants(&self) {
        debug_assert!(self.nodes.contains_key(self.root), "root node missing");
        for (id, node) in self.nodes.iter() {
            let mut seen = HashSet::with_capacity(node.children.len());
            for child in &node.children {
                debug_assert!(seen.insert(*child), "duplicate child {child:?} under {id:?}");
                debug_assert!(
                    self.nodes.get(*child).is_some_and(|c| c.parent == Some(id)),
                    "child {child:?} parent mismatch under {id:?}"
                );
            }
            if let Some(parent) = node.parent {
                debug_assert!(
                    self.nodes.get(parent).is_some_and(|p| p.children.contains(&id)),
                    "parent {parent:?} missing child {id:?}"
                );
            }
        }
    }

    /// Assert structural invariants on the node tree in debug builds.
    #[cfg(not(debug_assertions))]
    pub(crate) fn debug_assert_tree_invariants(&self) {}
}
