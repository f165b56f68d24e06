use crate::{
    core::{
        hook::{FrameObserver, SizeHook},
        id::NodeId,
        update::LayoutState,
    },
    geom::{Edges, Rect},
    layout::{Layout, Padding},
};

/// Node visibility, as far as layout is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Visible and occupying space.
    #[default]
    Visible,
    /// Not drawn, but still occupies space.
    Hidden,
    /// Not drawn and ignored when a wrapping parent measures its children.
    Gone,
}

/// Core node data stored in the arena.
pub struct Node {
    /// Parent in the arena tree.
    pub(crate) parent: Option<NodeId>,
    /// Children in the arena tree, in layout and paint order.
    pub(crate) children: Vec<NodeId>,

    /// Committed frame relative to the parent's origin.
    pub(crate) frame: Rect,
    /// Constraint record, created on first use.
    pub(crate) layout: Option<Box<Layout>>,
    /// Padding, created on first use.
    pub(crate) padding: Option<Box<Padding>>,
    /// Visibility.
    pub(crate) visibility: Visibility,

    /// Custom sizing behavior.
    pub(crate) hook: Option<Box<dyn SizeHook>>,
    /// Receiver for committed move/resize notifications.
    pub(crate) observer: Option<Box<dyn FrameObserver>>,

    /// Scheduler state.
    pub(crate) state: LayoutState,
    /// Bumped on every transition to dirty.
    pub(crate) generation: u32,
    /// The layout frame of this node or a descendant differs from its
    /// committed frame.
    pub(crate) need_apply: bool,
    /// When false, children keep their requested frames.
    pub(crate) using_child_layouts: bool,
}

impl Node {
    /// Construct a detached node with a frame.
    pub(crate) fn new(frame: Rect) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            frame,
            layout: None,
            padding: None,
            visibility: Visibility::Visible,
            hook: None,
            observer: None,
            state: LayoutState::Dirty,
            generation: 0,
            need_apply: false,
            using_child_layouts: true,
        }
    }

    /// Return the node's parent, if any.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Return the node's children.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Return the committed frame.
    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Return the constraint record, if one has been created.
    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_deref()
    }

    /// Return the padding, if any has been set.
    pub fn padding(&self) -> Option<&Padding> {
        self.padding.as_deref()
    }

    /// Return the visibility.
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Return the scheduler state.
    pub fn state(&self) -> LayoutState {
        self.state
    }

    /// Return the generation counter.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Does this node have a sizing hook?
    pub fn has_hook(&self) -> bool {
        self.hook.is_some()
    }

    /// Output of the last pass; the committed frame for unconstrained nodes.
    pub fn layout_frame(&self) -> Rect {
        self.layout.as_ref().map_or(self.frame, |l| l.layout_frame)
    }

    /// Resolved padding in pixels.
    pub(crate) fn padding_px(&self) -> Edges<i32> {
        self.padding.as_ref().map(|p| p.applied).unwrap_or_default()
    }

    /// Wrapping flags as `(horizontal, vertical)`.
    pub(crate) fn wrapping(&self) -> (bool, bool) {
        self.layout.as_ref().map_or((false, false), |l| l.wrapping())
    }

    /// Mark the node dirty and bump its generation.
    pub(crate) fn mark_dirty(&mut self) {
        self.state = LayoutState::Dirty;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Set the layout frame, creating the record if needed.
    pub(crate) fn set_layout_frame(&mut self, frame: Rect) {
        let committed = self.frame;
        self.layout
            .get_or_insert_with(|| Box::new(Layout::new(committed)))
            .layout_frame = frame;
        if frame != committed {
            self.need_apply = true;
        }
    }
}
