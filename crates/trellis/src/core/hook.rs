use crate::{
    NodeId,
    core::Core,
    error::{Error, Result},
    geom::{Expanse, Rect},
    layout::measure,
};

/// Custom sizing behavior for a node.
///
/// The hook runs during a layout pass after the node's children have been
/// placed, for nodes that wrap their content, use custom layout, or simply
/// carry a hook. It sees the tentative layout frame and may resize it. Bounds
/// are applied to whatever it leaves behind.
pub trait SizeHook {
    /// Adjust the node's tentative frame.
    fn update_layout(&mut self, cx: &mut HookContext<'_>);
}

impl<F> SizeHook for F
where
    F: FnMut(&mut HookContext<'_>),
{
    fn update_layout(&mut self, cx: &mut HookContext<'_>) {
        self(cx)
    }
}

/// Receives committed frame changes for a node.
///
/// Notifications fire from the apply phase, only when the committed value
/// actually changed, and always for children before their parent.
pub trait FrameObserver {
    /// The node's origin changed.
    fn moved(&mut self, _node: NodeId, _x: i32, _y: i32) {}
    /// The node's size changed.
    fn resized(&mut self, _node: NodeId, _w: i32, _h: i32) {}
}

/// Access handed to a [`SizeHook`] while it runs.
pub struct HookContext<'a> {
    /// The tree. Mutations that request layout are queued behind the
    /// running pass.
    core: &'a mut Core,
    /// Node being sized.
    node: NodeId,
    /// Wrapping flags as `(horizontal, vertical)`.
    wrapping: (bool, bool),
}

impl<'a> HookContext<'a> {
    /// Construct a context for `node`.
    pub(crate) fn new(core: &'a mut Core, node: NodeId, wrapping: (bool, bool)) -> Self {
        Self {
            core,
            node,
            wrapping,
        }
    }

    /// The node being sized.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Wrapping flags as `(horizontal, vertical)`.
    pub fn wrapping(&self) -> (bool, bool) {
        self.wrapping
    }

    /// The tentative frame.
    pub fn frame(&self) -> Rect {
        self.core
            .nodes
            .get(self.node)
            .map(|n| n.layout_frame())
            .unwrap_or_default()
    }

    /// Children of the node being sized.
    pub fn children(&self) -> Vec<NodeId> {
        self.core
            .nodes
            .get(self.node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Resize the tentative frame, keeping its origin.
    pub fn set_size(&mut self, w: i32, h: i32) {
        if let Some(node) = self.core.nodes.get_mut(self.node) {
            let frame = node.layout_frame().with_size(w, h);
            node.set_layout_frame(frame);
        }
    }

    /// Resize the tentative frame's width.
    pub fn set_width(&mut self, w: i32) {
        let h = self.frame().h;
        self.set_size(w, h);
    }

    /// Resize the tentative frame's height.
    pub fn set_height(&mut self, h: i32) {
        let w = self.frame().w;
        self.set_size(w, h);
    }

    /// Measure the extent of the children, padding included, without
    /// changing anything.
    pub fn measure_children(&mut self) -> Result<Expanse> {
        let (size, cycles) = measure::measure_children(self.core, self.node)?;
        self.core.stats.measurements += 1;
        for report in cycles {
            self.core.report_cycle(report);
        }
        Ok(size)
    }

    /// The default sizing: wrap the frame to the children on each wrapping
    /// axis.
    pub fn wrap_to_children(&mut self) -> Result<()> {
        measure::wrap_to_children(self.core, self.node, self.wrapping)
    }

    /// Place a child directly, bypassing the resolver. Used by custom
    /// layouts.
    pub fn place_child(&mut self, child: NodeId, frame: Rect) -> Result<()> {
        let parent = self.core.nodes.get(child).and_then(|n| n.parent);
        if parent != Some(self.node) {
            return Err(Error::InvalidOperation(format!(
                "{child:?} is not a child of {:?}",
                self.node
            )));
        }
        self.core.set_layout_frame(child, frame)?;
        if let Some(node) = self.core.nodes.get_mut(self.node) {
            node.need_apply = true;
        }
        Ok(())
    }

    /// The whole tree. Layout requests made through it while the pass runs
    /// mark nodes dirty and are picked up by the pass's generation check or
    /// by a follow-up pass.
    pub fn core(&mut self) -> &mut Core {
        self.core
    }
}
