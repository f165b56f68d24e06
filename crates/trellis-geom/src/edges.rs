use super::Axis;

/// A rectangle side.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Side {
    /// Left side.
    Left,
    /// Top side.
    Top,
    /// Right side.
    Right,
    /// Bottom side.
    Bottom,
}

impl Side {
    /// The axis this side sits on.
    pub fn axis(self) -> Axis {
        match self {
            Self::Left | Self::Right => Axis::Horizontal,
            Self::Top | Self::Bottom => Axis::Vertical,
        }
    }

    /// True for the left and top sides.
    pub fn is_start(self) -> bool {
        matches!(self, Self::Left | Self::Top)
    }
}

/// A value for each of the four sides of a box. Used for margins and padding.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Edges<T = i32> {
    /// Left value.
    pub left: T,
    /// Top value.
    pub top: T,
    /// Right value.
    pub right: T,
    /// Bottom value.
    pub bottom: T,
}

impl<T: Copy> Edges<T> {
    /// Construct edges from explicit values.
    pub fn new(left: T, top: T, right: T, bottom: T) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The same value on every side.
    pub fn all(v: T) -> Self {
        Self::new(v, v, v, v)
    }

    /// Value on one side.
    pub fn get(&self, side: Side) -> T {
        match side {
            Side::Left => self.left,
            Side::Top => self.top,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
        }
    }

    /// Replace the value on one side.
    pub fn set(&mut self, side: Side, v: T) {
        match side {
            Side::Left => self.left = v,
            Side::Top => self.top = v,
            Side::Right => self.right = v,
            Side::Bottom => self.bottom = v,
        }
    }

    /// The `(start, end)` pair for an axis.
    pub fn pair(&self, axis: Axis) -> (T, T) {
        (self.get(axis.start_side()), self.get(axis.end_side()))
    }

    /// Map every side through `f`.
    pub fn map<U: Copy>(&self, mut f: impl FnMut(T) -> U) -> Edges<U> {
        Edges::new(f(self.left), f(self.top), f(self.right), f(self.bottom))
    }
}

impl Edges<i32> {
    /// Sum of the start and end values along an axis.
    pub fn along(&self, axis: Axis) -> i32 {
        let (s, e) = self.pair(axis);
        s + e
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_access() {
        let mut e = Edges::new(1, 2, 3, 4);
        assert_eq!(e.pair(Axis::Horizontal), (1, 3));
        assert_eq!(e.pair(Axis::Vertical), (2, 4));
        assert_eq!(e.along(Axis::Vertical), 6);
        e.set(Side::Bottom, 10);
        assert_eq!(e.get(Side::Bottom), 10);
        assert_eq!(e.map(|v| v * 2), Edges::new(2, 4, 6, 20));
    }

    #[test]
    fn side_axis() {
        assert_eq!(Side::Top.axis(), Axis::Vertical);
        assert!(Side::Left.is_start());
        assert!(!Side::Bottom.is_start());
    }
}
