//! Integer geometry primitives for the trellis layout engine.
//!
//! All coordinates are signed pixels. A frame may sit at a negative offset
//! inside its parent, and intermediate edge arithmetic may briefly produce
//! negative extents before bounds are applied.

#![warn(missing_docs)]

/// Axis selector.
mod axis;
/// Per-side values.
mod edges;
/// Width/height size type.
mod expanse;
/// Point helpers.
mod point;
/// Rectangle operations.
mod rect;
/// One-dimensional intervals.
mod span;

pub use axis::Axis;
pub use edges::{Edges, Side};
pub use expanse::Expanse;
pub use point::Point;
pub use rect::Rect;
pub use span::Span;
