/// How a mutation should be propagated to the layout scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Mark dirty and run the layout pass now.
    #[default]
    Layout,
    /// Mark dirty but leave the pass for a later `update_layout` call.
    Deferred,
    /// Store the value and request a redraw only.
    Redraw,
    /// Store the value with no side effects. Used while building a tree.
    Init,
}

impl UpdateMode {
    /// True if this mode runs a layout pass synchronously.
    pub fn is_layout(self) -> bool {
        self == Self::Layout
    }

    /// True if this mode suppresses all side effects.
    pub fn is_init(self) -> bool {
        self == Self::Init
    }
}

/// Scheduling state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutState {
    /// Layout output matches the current constraints.
    Valid,
    /// Constraints or content changed since the last pass.
    #[default]
    Dirty,
    /// The pass driver is resolving this node's subtree.
    Computing,
}
