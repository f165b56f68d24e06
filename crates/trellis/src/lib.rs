//! Trellis: constraint layout and invalidation for retained-mode view trees.
//!
//! Nodes live in an arena owned by [`Core`]. Each node may carry a constraint
//! record describing how it is sized and where its edges attach: to the
//! parent's content box, to a sibling, or centered in either. Mutations mark
//! nodes dirty according to an [`UpdateMode`]; a layout pass then resolves
//! the smallest affected subtree and commits the new frames bottom-up,
//! notifying [`FrameObserver`]s of every change.
//!
//! # Quick Start
//!
//! ```
//! use trellis::{Core, UpdateMode, geom::Rect};
//!
//! # fn main() -> trellis::error::Result<()> {
//! let mut core = Core::new();
//! let root = core.root();
//! core.set_frame(root, Rect::new(0, 0, 320, 200), UpdateMode::Layout)?;
//!
//! let title = core.add_child(root)?;
//! core.set_size(title, 100, 20, UpdateMode::Init)?;
//! core.constrain(title)?
//!     .center_horizontal()
//!     .align_parent_top()
//!     .margin_top(8)
//!     .apply(UpdateMode::Layout)?;
//!
//! assert_eq!(core.frame(title)?, Rect::new(110, 8, 100, 20));
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`geom`] - Geometry primitives (Rect, Point, Expanse, etc.)
//! - [`layout`] - Constraint records, padding and the pass driver

#![warn(missing_docs)]

mod core;

pub mod layout;

pub use trellis_geom as geom;

#[cfg(any(test, feature = "testing"))]
pub use core::testing;
pub use core::{
    Core, CycleHook, FrameObserver, HookContext, LayoutConfig, LayoutHandle, LayoutState, Node,
    NodeId, Request, SizeHook, UpdateMode, Visibility,
};
pub use core::{dump, error};
