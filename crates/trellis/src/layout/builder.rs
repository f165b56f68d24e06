use super::constraint::{Anchor, AspectRatioMode, Layout, Length, SizeMode};
use crate::{
    NodeId,
    core::{Core, update::UpdateMode},
    error::Result,
    geom::{Axis, Edges, Side},
};

/// Which nodes a batch of constraint edits invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Scope {
    /// Nothing changed.
    None,
    /// Only the node's placement changed; the parent re-resolves it.
    Parent,
    /// The node's own size rules changed.
    SelfAndParent,
}

/// Fluent editor for a node's constraint record.
///
/// Edits are made on a copy and written back, with a single invalidation,
/// by [`apply`](Self::apply).
///
/// ```
/// use trellis::{Core, UpdateMode, layout::SizeMode};
///
/// let mut core = Core::new();
/// let root = core.root();
/// let child = core.add_child(root).unwrap();
/// core.constrain(child)
///     .unwrap()
///     .width(SizeMode::Filling)
///     .align_parent_top()
///     .margin_left(10)
///     .apply(UpdateMode::Deferred)
///     .unwrap();
/// ```
#[must_use = "constraint edits take effect only when applied"]
pub struct ConstraintBuilder<'a> {
    /// Tree owning the node.
    core: &'a mut Core,
    /// Node being edited.
    node: NodeId,
    /// Working copy of the record.
    layout: Layout,
    /// Widest invalidation needed by the edits so far.
    scope: Scope,
}

impl<'a> ConstraintBuilder<'a> {
    /// Start editing a node's record.
    pub(crate) fn new(core: &'a mut Core, node: NodeId, layout: Layout) -> Self {
        Self {
            core,
            node,
            layout,
            scope: Scope::None,
        }
    }

    /// Record an edit and widen the invalidation scope.
    fn edit(mut self, scope: Scope, f: impl FnOnce(&mut Layout)) -> Self {
        f(&mut self.layout);
        self.scope = self.scope.max(scope);
        self
    }

    /// Scope for a size mode change: wrapping nodes measure themselves.
    fn size_scope(mode: SizeMode) -> Scope {
        if mode == SizeMode::Wrapping {
            Scope::SelfAndParent
        } else {
            Scope::Parent
        }
    }

    /// Set the width mode.
    pub fn width(self, mode: SizeMode) -> Self {
        self.edit(Self::size_scope(mode), |l| {
            l.set_size_mode(Axis::Horizontal, mode);
        })
    }

    /// Set the height mode.
    pub fn height(self, mode: SizeMode) -> Self {
        self.edit(Self::size_scope(mode), |l| {
            l.set_size_mode(Axis::Vertical, mode);
        })
    }

    /// Width as a fraction of the parent's content width.
    pub fn width_weight(self, weight: f32) -> Self {
        self.edit(Scope::Parent, |l| {
            l.set_size_mode(Axis::Horizontal, SizeMode::Weighted);
            l.set_weight(Axis::Horizontal, weight);
        })
    }

    /// Height as a fraction of the parent's content height.
    pub fn height_weight(self, weight: f32) -> Self {
        self.edit(Scope::Parent, |l| {
            l.set_size_mode(Axis::Vertical, SizeMode::Weighted);
            l.set_weight(Axis::Vertical, weight);
        })
    }

    /// Fill the parent on both axes.
    pub fn fill(self) -> Self {
        self.width(SizeMode::Filling).height(SizeMode::Filling)
    }

    /// Wrap the children on both axes.
    pub fn wrap(self) -> Self {
        self.width(SizeMode::Wrapping).height(SizeMode::Wrapping)
    }

    /// Set the anchor for one side.
    pub fn anchor(self, side: Side, anchor: Anchor) -> Self {
        self.edit(Scope::SelfAndParent, |l| l.set_anchor(side, anchor))
    }

    /// Set the left anchor.
    pub fn left(self, anchor: Anchor) -> Self {
        self.anchor(Side::Left, anchor)
    }

    /// Set the top anchor.
    pub fn top(self, anchor: Anchor) -> Self {
        self.anchor(Side::Top, anchor)
    }

    /// Set the right anchor.
    pub fn right(self, anchor: Anchor) -> Self {
        self.anchor(Side::Right, anchor)
    }

    /// Set the bottom anchor.
    pub fn bottom(self, anchor: Anchor) -> Self {
        self.anchor(Side::Bottom, anchor)
    }

    /// Place this node's right edge at the left edge of `other`.
    pub fn left_of(self, other: NodeId) -> Self {
        self.right(Anchor::ToStart(other))
    }

    /// Place this node's left edge at the right edge of `other`.
    pub fn right_of(self, other: NodeId) -> Self {
        self.left(Anchor::ToEnd(other))
    }

    /// Place this node's bottom edge at the top edge of `other`.
    pub fn above(self, other: NodeId) -> Self {
        self.bottom(Anchor::ToStart(other))
    }

    /// Place this node's top edge at the bottom edge of `other`.
    pub fn below(self, other: NodeId) -> Self {
        self.top(Anchor::ToEnd(other))
    }

    /// Align left edges with `other`.
    pub fn align_left(self, other: NodeId) -> Self {
        self.left(Anchor::ToStart(other))
    }

    /// Align right edges with `other`.
    pub fn align_right(self, other: NodeId) -> Self {
        self.right(Anchor::ToEnd(other))
    }

    /// Align top edges with `other`.
    pub fn align_top(self, other: NodeId) -> Self {
        self.top(Anchor::ToStart(other))
    }

    /// Align bottom edges with `other`.
    pub fn align_bottom(self, other: NodeId) -> Self {
        self.bottom(Anchor::ToEnd(other))
    }

    /// Align to the parent's left content edge.
    pub fn align_parent_left(self) -> Self {
        self.left(Anchor::ParentEdge)
    }

    /// Align to the parent's top content edge.
    pub fn align_parent_top(self) -> Self {
        self.top(Anchor::ParentEdge)
    }

    /// Align to the parent's right content edge.
    pub fn align_parent_right(self) -> Self {
        self.right(Anchor::ParentEdge)
    }

    /// Align to the parent's bottom content edge.
    pub fn align_parent_bottom(self) -> Self {
        self.bottom(Anchor::ParentEdge)
    }

    /// Center horizontally in the parent.
    pub fn center_horizontal(self) -> Self {
        self.edit(Scope::Parent, |l| {
            l.set_anchor(Side::Left, Anchor::CenterInParent);
        })
    }

    /// Center vertically in the parent.
    pub fn center_vertical(self) -> Self {
        self.edit(Scope::Parent, |l| {
            l.set_anchor(Side::Top, Anchor::CenterInParent);
        })
    }

    /// Center on both axes in the parent.
    pub fn center_in_parent(self) -> Self {
        self.center_horizontal().center_vertical()
    }

    /// Share a vertical center line with `other`.
    pub fn align_center_horizontal(self, other: NodeId) -> Self {
        self.edit(Scope::Parent, |l| {
            l.set_anchor(Side::Left, Anchor::CenterIn(other));
        })
    }

    /// Share a horizontal center line with `other`.
    pub fn align_center_vertical(self, other: NodeId) -> Self {
        self.edit(Scope::Parent, |l| {
            l.set_anchor(Side::Top, Anchor::CenterIn(other));
        })
    }

    /// Set one margin.
    pub fn margin(self, side: Side, margin: impl Into<Length>) -> Self {
        let margin = margin.into();
        self.edit(Scope::SelfAndParent, |l| l.set_margin(side, margin))
    }

    /// Set all four margins in pixels.
    pub fn margins(self, e: Edges<i32>) -> Self {
        self.margin(Side::Left, e.left)
            .margin(Side::Top, e.top)
            .margin(Side::Right, e.right)
            .margin(Side::Bottom, e.bottom)
    }

    /// Set the left margin in pixels.
    pub fn margin_left(self, v: i32) -> Self {
        self.margin(Side::Left, v)
    }

    /// Set the top margin in pixels.
    pub fn margin_top(self, v: i32) -> Self {
        self.margin(Side::Top, v)
    }

    /// Set the right margin in pixels.
    pub fn margin_right(self, v: i32) -> Self {
        self.margin(Side::Right, v)
    }

    /// Set the bottom margin in pixels.
    pub fn margin_bottom(self, v: i32) -> Self {
        self.margin(Side::Bottom, v)
    }

    /// Set the minimum width.
    pub fn min_width(self, v: i32) -> Self {
        self.edit(Scope::SelfAndParent, |l| l.set_min(Axis::Horizontal, v))
    }

    /// Set the maximum width.
    pub fn max_width(self, v: i32) -> Self {
        self.edit(Scope::SelfAndParent, |l| l.set_max(Axis::Horizontal, v))
    }

    /// Set the minimum height.
    pub fn min_height(self, v: i32) -> Self {
        self.edit(Scope::SelfAndParent, |l| l.set_min(Axis::Vertical, v))
    }

    /// Set the maximum height.
    pub fn max_height(self, v: i32) -> Self {
        self.edit(Scope::SelfAndParent, |l| l.set_max(Axis::Vertical, v))
    }

    /// Set the aspect-ratio policy.
    pub fn aspect_ratio_mode(self, mode: AspectRatioMode) -> Self {
        self.edit(Scope::SelfAndParent, |l| l.set_aspect_mode(mode))
    }

    /// Set the aspect ratio (width / height).
    pub fn aspect_ratio(self, ratio: f32) -> Self {
        self.edit(Scope::SelfAndParent, |l| l.set_aspect_ratio(ratio))
    }

    /// Let the sizing hook position the children instead of the resolver.
    pub fn custom_layout(self, custom: bool) -> Self {
        self.edit(Scope::SelfAndParent, |l| l.custom_layout = custom)
    }

    /// Write the record back and invalidate according to `mode`.
    pub fn apply(self, mode: UpdateMode) -> Result<()> {
        let Self {
            core,
            node,
            layout,
            scope,
        } = self;
        core.store_layout(node, layout)?;
        match scope {
            Scope::None => Ok(()),
            Scope::Parent => core.invalidate_parent_layout(node, mode),
            Scope::SelfAndParent => core.invalidate_self_and_parent_layout(node, mode),
        }
    }
}
