use super::{Axis, Edges, Expanse, Point, Span};

/// A rectangle with a signed origin and size, in parent-local pixels.
///
/// Layout works in edges (`left`, `top`, `right`, `bottom`) far more than in
/// origin/size terms, so both views are provided. `right` and `bottom` are
/// exclusive.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Rect {
    /// Top-left corner.
    pub tl: Point,
    /// Width.
    pub w: i32,
    /// Height.
    pub h: i32,
}

impl Rect {
    /// Construct a rectangle from coordinates and size.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            tl: Point { x, y },
            w,
            h,
        }
    }

    /// Construct a rectangle from its four edges.
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Construct a rectangle from a horizontal and a vertical span.
    pub fn from_spans(horizontal: Span, vertical: Span) -> Self {
        Self::from_edges(horizontal.start, vertical.start, horizontal.end, vertical.end)
    }

    /// Left edge.
    pub fn left(&self) -> i32 {
        self.tl.x
    }

    /// Top edge.
    pub fn top(&self) -> i32 {
        self.tl.y
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> i32 {
        self.tl.x + self.w
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> i32 {
        self.tl.y + self.h
    }

    /// Size of the rectangle.
    pub fn size(&self) -> Expanse {
        Expanse::new(self.w, self.h)
    }

    /// Does this rect have a zero or negative area?
    pub fn is_zero(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// The interval covered along an axis.
    pub fn span(&self, axis: Axis) -> Span {
        match axis {
            Axis::Horizontal => Span::new(self.left(), self.right()),
            Axis::Vertical => Span::new(self.top(), self.bottom()),
        }
    }

    /// Extent along an axis.
    pub fn extent(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.w,
            Axis::Vertical => self.h,
        }
    }

    /// Return a copy with one axis replaced by `span`.
    pub fn with_span(&self, axis: Axis, span: Span) -> Self {
        match axis {
            Axis::Horizontal => Self::new(span.start, self.tl.y, span.len(), self.h),
            Axis::Vertical => Self::new(self.tl.x, span.start, self.w, span.len()),
        }
    }

    /// Return a copy with the same origin and a new size.
    pub fn with_size(&self, w: i32, h: i32) -> Self {
        Self::new(self.tl.x, self.tl.y, w, h)
    }

    /// Return a copy with the same size moved to `tl`.
    pub fn at(&self, tl: Point) -> Self {
        Self { tl, ..*self }
    }

    /// Shift the rectangle by an offset.
    pub fn translate(&self, d: Point) -> Self {
        self.at(self.tl + d)
    }

    /// Shrink the rectangle by per-side insets. Extents never go below zero.
    pub fn inset(&self, e: Edges<i32>) -> Self {
        Self::new(
            self.tl.x + e.left,
            self.tl.y + e.top,
            (self.w - e.left - e.right).max(0),
            (self.h - e.top - e.bottom).max(0),
        )
    }
}

impl From<Expanse> for Rect {
    fn from(e: Expanse) -> Self {
        e.rect()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn edges() {
        let r = Rect::new(10, 10, 100, 50);
        assert_eq!((r.left(), r.top(), r.right(), r.bottom()), (10, 10, 110, 60));
        assert_eq!(Rect::from_edges(10, 10, 110, 60), r);
        assert_eq!(r.span(Axis::Vertical), Span::new(10, 60));
        assert_eq!(r.extent(Axis::Horizontal), 100);
    }

    #[test]
    fn with_span_replaces_one_axis() {
        let r = Rect::new(0, 5, 10, 20);
        let h = r.with_span(Axis::Horizontal, Span::new(3, 9));
        assert_eq!(h, Rect::new(3, 5, 6, 20));
        let v = r.with_span(Axis::Vertical, Span::new(-2, 2));
        assert_eq!(v, Rect::new(0, -2, 10, 4));
    }

    #[test]
    fn inset_clamps() {
        let r = Rect::new(0, 0, 10, 10);
        assert_eq!(r.inset(Edges::new(2, 3, 4, 5)), Rect::new(2, 3, 4, 2));
        assert_eq!(r.inset(Edges::all(8)), Rect::new(8, 8, 0, 0));
    }

    #[test]
    fn translate() {
        let r = Rect::new(1, 2, 3, 4).translate(Point::new(-5, 5));
        assert_eq!(r, Rect::new(-4, 7, 3, 4));
        assert_eq!(r.size(), Expanse::new(3, 4));
    }

    proptest! {
        #[test]
        fn spans_roundtrip_edges(x in -500i32..500, y in -500i32..500, w in 0i32..500, h in 0i32..500) {
            let r = Rect::new(x, y, w, h);
            let rebuilt = Rect::from_spans(r.span(Axis::Horizontal), r.span(Axis::Vertical));
            prop_assert_eq!(rebuilt, r);
        }
    }
}
