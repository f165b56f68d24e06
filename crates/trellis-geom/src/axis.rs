use super::Side;

/// One of the two layout axes.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Axis {
    /// The x axis: left and right edges, width.
    Horizontal,
    /// The y axis: top and bottom edges, height.
    Vertical,
}

impl Axis {
    /// Both axes, horizontal first.
    pub const ALL: [Self; 2] = [Self::Horizontal, Self::Vertical];

    /// The perpendicular axis.
    pub fn other(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// The side at the start of this axis.
    pub fn start_side(self) -> Side {
        match self {
            Self::Horizontal => Side::Left,
            Self::Vertical => Side::Top,
        }
    }

    /// The side at the end of this axis.
    pub fn end_side(self) -> Side {
        match self {
            Self::Horizontal => Side::Right,
            Self::Vertical => Side::Bottom,
        }
    }
}
