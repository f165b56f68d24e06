//! Constraint records and the layout pass.
//!
//! A node's [`Layout`] describes, per axis, how its extent is derived
//! ([`SizeMode`]) and what each edge is attached to ([`Anchor`]). The pass
//! driver resolves dirty subtrees top-down, sizes wrapping nodes bottom-up from
//! their children, and finally commits frames children-first.

mod builder;
pub mod constraint;
pub(crate) mod measure;
mod padding;
pub(crate) mod pass;
pub mod report;
pub(crate) mod resolve;

pub use builder::ConstraintBuilder;
pub use constraint::{Anchor, AspectRatioMode, AxisRules, DEFAULT_MAX_SIZE, Layout, Length, SizeMode};
pub use padding::Padding;
pub use report::{CyclePhase, CycleReport, LayoutStats};
