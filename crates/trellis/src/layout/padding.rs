use super::constraint::{Length, scale};
use crate::geom::{Axis, Edges, Expanse, Rect, Side};

/// Smallest share of a node's extent left for content when padding is weighted.
const MIN_CONTENT_SHARE: f32 = 0.001;

/// Per-side padding for a node.
///
/// Weighted sides are fractions of the node's own extent on that axis and are
/// re-derived whenever the node's size changes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Padding {
    /// Configured values.
    pub(crate) lengths: Edges<Length>,
    /// Pixel values as of the last size change.
    pub(crate) applied: Edges<i32>,
}

impl Padding {
    /// Construct padding from per-side lengths.
    pub fn new(lengths: Edges<Length>) -> Self {
        let lengths = lengths.map(Length::sanitized);
        Self {
            lengths,
            applied: lengths.map(|l| l.resolve(0)),
        }
    }

    /// Configured per-side lengths.
    pub fn lengths(&self) -> Edges<Length> {
        self.lengths
    }

    /// Resolved pixel values.
    pub fn applied(&self) -> Edges<i32> {
        self.applied
    }

    /// Replace one side.
    pub(crate) fn set(&mut self, side: Side, length: Length) {
        let length = length.sanitized();
        self.lengths.set(side, length);
        if let Length::Fixed(v) = length {
            self.applied.set(side, v);
        }
    }

    /// Re-derive weighted sides from the node's size.
    pub(crate) fn apply_weights(&mut self, size: Expanse) {
        for side in [Side::Left, Side::Top, Side::Right, Side::Bottom] {
            if let Length::Weight(w) = self.lengths.get(side) {
                self.applied.set(side, scale(size.along(side.axis()), w));
            }
        }
    }

    /// Fixed sides only; weighted sides read as zero.
    ///
    /// The wrap measurer works from these and scales the result afterwards,
    /// since weighted padding depends on the size being measured.
    pub(crate) fn fixed(&self) -> Edges<i32> {
        self.lengths.map(|l| match l {
            Length::Fixed(v) => v,
            Length::Weight(_) => 0,
        })
    }

    /// Fraction of the extent left for content when either side on `axis` is
    /// weighted.
    pub(crate) fn content_share(&self, axis: Axis) -> Option<f32> {
        let (s, e) = self.lengths.pair(axis);
        if !s.is_weight() && !e.is_weight() {
            return None;
        }
        Some((1.0 - s.weight() - e.weight()).max(MIN_CONTENT_SHARE))
    }

    /// Content box in node-local coordinates for a node of `size`.
    pub(crate) fn content(&self, size: Expanse) -> Rect {
        size.rect().inset(self.applied)
    }
}
