use crate::{
    NodeId,
    geom::{Axis, Edges, Expanse, Rect, Side},
};

/// Largest size a node may take when no explicit maximum is set.
pub const DEFAULT_MAX_SIZE: i32 = 0x3fff_ffff;

/// How a node's extent along one axis is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeMode {
    /// Keep the requested size.
    #[default]
    Fixed,
    /// Size to the measured extent of the children.
    Wrapping,
    /// Span the distance between the start and end anchors.
    Filling,
    /// A fraction of the parent's content box.
    Weighted,
}

/// How one edge of a node is positioned.
///
/// Variants carrying a [`NodeId`] refer to another node without owning it.
/// If that node is removed the edge behaves as [`Anchor::Free`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    /// Position comes from the requested frame.
    #[default]
    Free,
    /// Aligned to the matching edge of the parent's content box.
    ParentEdge,
    /// Aligned to the start edge (left or top) of another node.
    ToStart(NodeId),
    /// Aligned to the end edge (right or bottom) of another node.
    ToEnd(NodeId),
    /// Centered within the parent's content box.
    CenterInParent,
    /// Centered on another node.
    CenterIn(NodeId),
}

impl Anchor {
    /// The referenced node, if any.
    pub fn reference(self) -> Option<NodeId> {
        match self {
            Self::ToStart(id) | Self::ToEnd(id) | Self::CenterIn(id) => Some(id),
            Self::Free | Self::ParentEdge | Self::CenterInParent => None,
        }
    }

    /// True for both centering modes.
    pub fn is_center(self) -> bool {
        matches!(self, Self::CenterInParent | Self::CenterIn(_))
    }

    /// True for [`Anchor::Free`].
    pub fn is_free(self) -> bool {
        self == Self::Free
    }
}

/// A margin or padding value: either pixels or a fraction of a base length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    /// A fixed pixel value.
    Fixed(i32),
    /// A fraction of the base length, re-derived on every pass.
    Weight(f32),
}

impl Default for Length {
    fn default() -> Self {
        Self::Fixed(0)
    }
}

impl Length {
    /// Resolve against a base length.
    pub fn resolve(self, base: i32) -> i32 {
        match self {
            Self::Fixed(v) => v,
            Self::Weight(w) => scale(base, w),
        }
    }

    /// True for the weighted form.
    pub fn is_weight(self) -> bool {
        matches!(self, Self::Weight(_))
    }

    /// Weight value, or zero for fixed lengths.
    pub fn weight(self) -> f32 {
        match self {
            Self::Fixed(_) => 0.0,
            Self::Weight(w) => w,
        }
    }

    /// Replace a negative or non-finite weight with zero.
    pub(crate) fn sanitized(self) -> Self {
        match self {
            Self::Fixed(v) => Self::Fixed(v),
            Self::Weight(w) => Self::Weight(sanitize_weight(w)),
        }
    }
}

impl From<i32> for Length {
    fn from(v: i32) -> Self {
        Self::Fixed(v)
    }
}

/// Aspect-ratio policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectRatioMode {
    /// No aspect constraint.
    #[default]
    None,
    /// Width is derived from height.
    AdjustWidth,
    /// Height is derived from width.
    AdjustHeight,
}

/// Per-pass resolution marker, used to break anchor reference cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ResolveMark {
    /// Must be resolved before its frame is read this pass.
    Pending,
    /// Resolution is in progress further up the stack.
    Resolving,
    /// Resolved; `layout_frame` is current.
    #[default]
    Done,
}

/// Scale a length by a weight, truncating toward zero.
pub(crate) fn scale(base: i32, weight: f32) -> i32 {
    (base as f32 * weight) as i32
}

/// Clamp a value to `[min, max]`. An inverted range resolves to `max`.
pub(crate) fn clamp_axis(value: i32, min: i32, max: i32) -> i32 {
    if min > max {
        max
    } else {
        value.clamp(min, max)
    }
}

/// Replace a negative or non-finite weight with zero.
pub(crate) fn sanitize_weight(w: f32) -> f32 {
    if w.is_finite() { w.max(0.0) } else { 0.0 }
}

/// Sizing and anchoring rules for one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRules {
    /// Size mode.
    pub mode: SizeMode,
    /// Fraction of the parent content box used by [`SizeMode::Weighted`].
    pub weight: f32,
    /// Start edge anchor (left or top).
    pub start: Anchor,
    /// End edge anchor (right or bottom).
    pub end: Anchor,
    /// Start margin.
    pub margin_start: Length,
    /// End margin.
    pub margin_end: Length,
    /// Minimum size.
    pub min: i32,
    /// Maximum size.
    pub max: i32,
}

impl Default for AxisRules {
    fn default() -> Self {
        Self {
            mode: SizeMode::Fixed,
            weight: 1.0,
            start: Anchor::Free,
            end: Anchor::Free,
            margin_start: Length::Fixed(0),
            margin_end: Length::Fixed(0),
            min: 0,
            max: DEFAULT_MAX_SIZE,
        }
    }
}

impl AxisRules {
    /// The anchor pair after applying the exclusivity rules.
    ///
    /// A filling axis cannot also be centered, so centering becomes parent
    /// edges on both ends. A non-filling axis takes its position from one
    /// anchor only: when the start is set, the end is ignored.
    pub fn anchors(&self) -> (Anchor, Anchor) {
        if self.mode == SizeMode::Filling {
            if self.start.is_center() || self.end.is_center() {
                (Anchor::ParentEdge, Anchor::ParentEdge)
            } else {
                (self.start, self.end)
            }
        } else if !self.start.is_free() {
            (self.start, Anchor::Free)
        } else {
            (self.start, self.end)
        }
    }

    /// Clamp a size to this axis's bounds.
    pub fn clamp(&self, v: i32) -> i32 {
        clamp_axis(v, self.min, self.max)
    }

    /// Resolve both margins against the parent's content extent.
    pub fn margins(&self, parent: i32) -> (i32, i32) {
        (self.margin_start.resolve(parent), self.margin_end.resolve(parent))
    }

    /// True when the size comes from the children.
    pub fn is_wrapping(&self) -> bool {
        self.mode == SizeMode::Wrapping
    }

    /// Every node this axis refers to.
    pub fn references(&self) -> impl Iterator<Item = NodeId> + '_ {
        [self.start, self.end].into_iter().filter_map(Anchor::reference)
    }
}

/// The constraint record attached to a node.
///
/// Created on the first constraint mutation and seeded from the node's frame.
/// Holds the rules, the output of the last layout pass (`layout_frame`) and
/// the last explicitly requested frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Horizontal rules.
    pub(crate) horizontal: AxisRules,
    /// Vertical rules.
    pub(crate) vertical: AxisRules,
    /// Aspect-ratio policy.
    pub(crate) aspect_mode: AspectRatioMode,
    /// Width divided by height.
    pub(crate) aspect_ratio: f32,
    /// Output of the last pass.
    pub(crate) layout_frame: Rect,
    /// Last frame set explicitly by a caller.
    pub(crate) requested_frame: Rect,
    /// True when `requested_frame` has not been consumed by a pass yet.
    pub(crate) requested: bool,
    /// Children are positioned by the sizing hook rather than the resolver.
    pub(crate) custom_layout: bool,
    /// Margins as resolved by the last pass.
    pub(crate) margins: Edges<i32>,
    /// Per-pass resolution marker.
    pub(crate) mark: ResolveMark,
}

impl Layout {
    /// A default record seeded from a frame.
    pub(crate) fn new(frame: Rect) -> Self {
        Self {
            horizontal: AxisRules::default(),
            vertical: AxisRules::default(),
            aspect_mode: AspectRatioMode::None,
            aspect_ratio: 1.0,
            layout_frame: frame,
            requested_frame: frame,
            requested: false,
            custom_layout: false,
            margins: Edges::default(),
            mark: ResolveMark::Done,
        }
    }

    /// True when an anchor on either axis names `node`.
    pub(crate) fn refers_to(&self, node: NodeId) -> bool {
        self.horizontal
            .references()
            .chain(self.vertical.references())
            .any(|r| r == node)
    }

    /// Rules for one axis.
    pub fn axis(&self, axis: Axis) -> &AxisRules {
        match axis {
            Axis::Horizontal => &self.horizontal,
            Axis::Vertical => &self.vertical,
        }
    }

    /// Mutable rules for one axis.
    pub(crate) fn axis_mut(&mut self, axis: Axis) -> &mut AxisRules {
        match axis {
            Axis::Horizontal => &mut self.horizontal,
            Axis::Vertical => &mut self.vertical,
        }
    }

    /// Width mode.
    pub fn width_mode(&self) -> SizeMode {
        self.horizontal.mode
    }

    /// Height mode.
    pub fn height_mode(&self) -> SizeMode {
        self.vertical.mode
    }

    /// Anchor on one side, as configured (before exclusivity rules).
    pub fn anchor(&self, side: Side) -> Anchor {
        let rules = self.axis(side.axis());
        if side.is_start() { rules.start } else { rules.end }
    }

    /// Margin on one side, as configured.
    pub fn margin(&self, side: Side) -> Length {
        let rules = self.axis(side.axis());
        if side.is_start() {
            rules.margin_start
        } else {
            rules.margin_end
        }
    }

    /// Aspect-ratio policy.
    pub fn aspect_ratio_mode(&self) -> AspectRatioMode {
        self.aspect_mode
    }

    /// Aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Output of the last layout pass.
    pub fn layout_frame(&self) -> Rect {
        self.layout_frame
    }

    /// Last frame requested by a caller.
    pub fn requested_frame(&self) -> Rect {
        self.requested_frame
    }

    /// True when children are positioned by the sizing hook.
    pub fn is_custom_layout(&self) -> bool {
        self.custom_layout
    }

    /// Wrapping flags as `(horizontal, vertical)`.
    pub fn wrapping(&self) -> (bool, bool) {
        (self.horizontal.is_wrapping(), self.vertical.is_wrapping())
    }

    /// True when either axis wraps its children.
    pub fn wraps_any(&self) -> bool {
        self.horizontal.is_wrapping() || self.vertical.is_wrapping()
    }

    /// Apply the aspect ratio, then clamp both extents to their bounds.
    pub(crate) fn restrict_size(&self, w: i32, h: i32) -> Expanse {
        let (w, h) = match self.aspect_mode {
            AspectRatioMode::None => (w, h),
            AspectRatioMode::AdjustWidth => ((h as f32 * self.aspect_ratio) as i32, h),
            AspectRatioMode::AdjustHeight => (w, (w as f32 / self.aspect_ratio) as i32),
        };
        Expanse::new(self.horizontal.clamp(w), self.vertical.clamp(h))
    }

    /// Restrict a frame's size in place, keeping its origin.
    pub(crate) fn restrict(&self, r: Rect) -> Rect {
        let sz = self.restrict_size(r.w, r.h);
        r.with_size(sz.w, sz.h)
    }

    /// Re-derive margins from the parent's content size.
    pub(crate) fn resolve_margins(&mut self, parent: Expanse) {
        let (l, r) = self.horizontal.margins(parent.w);
        let (t, b) = self.vertical.margins(parent.h);
        self.margins = Edges::new(l, t, r, b);
    }

    /// Set the size mode for an axis.
    ///
    /// Filling needs both edges, so free anchors on that axis become parent
    /// edges.
    pub(crate) fn set_size_mode(&mut self, axis: Axis, mode: SizeMode) {
        let rules = self.axis_mut(axis);
        rules.mode = mode;
        if mode == SizeMode::Filling {
            if rules.start.is_free() {
                rules.start = Anchor::ParentEdge;
            }
            if rules.end.is_free() {
                rules.end = Anchor::ParentEdge;
            }
        }
    }

    /// Set the weight used by weighted sizing.
    pub(crate) fn set_weight(&mut self, axis: Axis, weight: f32) {
        self.axis_mut(axis).weight = sanitize_weight(weight);
    }

    /// Set the anchor for one side.
    pub(crate) fn set_anchor(&mut self, side: Side, anchor: Anchor) {
        let rules = self.axis_mut(side.axis());
        if side.is_start() {
            rules.start = anchor;
        } else {
            rules.end = anchor;
        }
    }

    /// Set the margin for one side.
    pub(crate) fn set_margin(&mut self, side: Side, margin: Length) {
        let margin = margin.sanitized();
        if let Length::Fixed(v) = margin {
            self.margins.set(side, v);
        }
        let rules = self.axis_mut(side.axis());
        if side.is_start() {
            rules.margin_start = margin;
        } else {
            rules.margin_end = margin;
        }
    }

    /// Set the minimum size on an axis. Negative values become zero.
    pub(crate) fn set_min(&mut self, axis: Axis, v: i32) {
        self.axis_mut(axis).min = v.max(0);
    }

    /// Set the maximum size on an axis. Negative values restore the default.
    pub(crate) fn set_max(&mut self, axis: Axis, v: i32) {
        self.axis_mut(axis).max = if v < 0 { DEFAULT_MAX_SIZE } else { v };
    }

    /// Set the aspect-ratio policy. The adjusted axis becomes fixed.
    pub(crate) fn set_aspect_mode(&mut self, mode: AspectRatioMode) {
        self.aspect_mode = mode;
        match mode {
            AspectRatioMode::AdjustWidth => self.horizontal.mode = SizeMode::Fixed,
            AspectRatioMode::AdjustHeight => self.vertical.mode = SizeMode::Fixed,
            AspectRatioMode::None => {}
        }
    }

    /// Set the aspect ratio. Non-positive or non-finite ratios reset to 1.
    pub(crate) fn set_aspect_ratio(&mut self, ratio: f32) {
        self.aspect_ratio = if ratio.is_finite() && ratio > 0.0 {
            ratio
        } else {
            1.0
        };
    }

    /// Store a caller-requested frame for the next pass to consume.
    pub(crate) fn request(&mut self, frame: Rect) {
        self.requested_frame = self.restrict(frame);
        self.requested = true;
    }

    /// Take the requested frame if one is outstanding.
    pub(crate) fn take_request(&mut self) -> Option<Rect> {
        if self.requested {
            self.requested = false;
            Some(self.requested_frame)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    #[test]
    fn clamp_axis_inverted_range_uses_max() {
        assert_eq!(clamp_axis(5, 10, 20), 10);
        assert_eq!(clamp_axis(25, 10, 20), 20);
        assert_eq!(clamp_axis(15, 30, 20), 20);
    }

    #[test]
    fn filling_converts_free_anchors() {
        let mut l = Layout::new(Rect::default());
        l.set_anchor(Side::Left, Anchor::CenterInParent);
        l.set_size_mode(Axis::Horizontal, SizeMode::Filling);
        assert_eq!(l.anchor(Side::Left), Anchor::CenterInParent);
        assert_eq!(l.anchor(Side::Right), Anchor::ParentEdge);
        // Filling cannot be centered.
        assert_eq!(
            l.horizontal.anchors(),
            (Anchor::ParentEdge, Anchor::ParentEdge)
        );

        // A centered end edge is normalized the same way.
        let mut l = Layout::new(Rect::default());
        l.set_size_mode(Axis::Vertical, SizeMode::Filling);
        l.set_anchor(Side::Bottom, Anchor::CenterInParent);
        assert_eq!(l.anchor(Side::Top), Anchor::ParentEdge);
        assert_eq!(
            l.vertical.anchors(),
            (Anchor::ParentEdge, Anchor::ParentEdge)
        );
    }

    #[test]
    fn single_anchor_rule() {
        let mut ids: SlotMap<NodeId, ()> = SlotMap::with_key();
        let other = ids.insert(());
        let mut l = Layout::new(Rect::default());
        l.set_anchor(Side::Top, Anchor::ParentEdge);
        l.set_anchor(Side::Bottom, Anchor::ToStart(other));
        assert_eq!(l.vertical.anchors(), (Anchor::ParentEdge, Anchor::Free));
        l.set_anchor(Side::Top, Anchor::Free);
        assert_eq!(l.vertical.anchors(), (Anchor::Free, Anchor::ToStart(other)));
        assert_eq!(l.vertical.references().collect::<Vec<_>>(), vec![other]);
    }

    #[test]
    fn setters_clamp_bad_values() {
        let mut l = Layout::new(Rect::default());
        l.set_min(Axis::Horizontal, -5);
        l.set_max(Axis::Horizontal, -1);
        l.set_weight(Axis::Vertical, -0.5);
        l.set_aspect_ratio(0.0);
        l.set_margin(Side::Left, Length::Weight(f32::NAN));
        assert_eq!(l.horizontal.min, 0);
        assert_eq!(l.horizontal.max, DEFAULT_MAX_SIZE);
        assert_eq!(l.vertical.weight, 0.0);
        assert_eq!(l.aspect_ratio, 1.0);
        assert_eq!(l.margin(Side::Left), Length::Weight(0.0));
    }

    #[test]
    fn aspect_mode_fixes_adjusted_axis() {
        let mut l = Layout::new(Rect::default());
        l.set_size_mode(Axis::Horizontal, SizeMode::Wrapping);
        l.set_aspect_mode(AspectRatioMode::AdjustWidth);
        assert_eq!(l.width_mode(), SizeMode::Fixed);
        l.set_aspect_ratio(2.0);
        assert_eq!(l.restrict_size(0, 30), Expanse::new(60, 30));
        l.set_aspect_mode(AspectRatioMode::AdjustHeight);
        assert_eq!(l.restrict_size(50, 0), Expanse::new(50, 25));
    }

    #[test]
    fn restrict_applies_bounds_after_ratio() {
        let mut l = Layout::new(Rect::default());
        l.set_aspect_mode(AspectRatioMode::AdjustWidth);
        l.set_aspect_ratio(4.0);
        l.set_max(Axis::Horizontal, 100);
        l.set_min(Axis::Vertical, 10);
        assert_eq!(l.restrict(Rect::new(3, 4, 0, 50)), Rect::new(3, 4, 100, 50));
        assert_eq!(l.restrict(Rect::new(0, 0, 0, 2)), Rect::new(0, 0, 8, 10));
    }

    #[test]
    fn weighted_margins_track_parent() {
        let mut l = Layout::new(Rect::default());
        l.set_margin(Side::Left, Length::Weight(0.1));
        l.set_margin(Side::Bottom, Length::Fixed(7));
        l.resolve_margins(Expanse::new(200, 100));
        assert_eq!(l.margins, Edges::new(20, 0, 0, 7));
        l.resolve_margins(Expanse::new(400, 100));
        assert_eq!(l.margins.left, 40);
    }
}
