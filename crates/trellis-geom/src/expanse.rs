use super::{Axis, Rect};

/// An `Expanse` is a width and height with no location.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Expanse {
    /// Width.
    pub w: i32,
    /// Height.
    pub h: i32,
}

impl Expanse {
    /// Construct an expanse.
    pub fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    /// Extent along one axis.
    pub fn along(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.w,
            Axis::Vertical => self.h,
        }
    }

    /// Return a `Rect` with the same dimensions, located at (0, 0).
    pub fn rect(&self) -> Rect {
        Rect::new(0, 0, self.w, self.h)
    }
}

impl From<Rect> for Expanse {
    fn from(r: Rect) -> Self {
        Self { w: r.w, h: r.h }
    }
}

impl From<(i32, i32)> for Expanse {
    fn from(v: (i32, i32)) -> Self {
        Self { w: v.0, h: v.1 }
    }
}
