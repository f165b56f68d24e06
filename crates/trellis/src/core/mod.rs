//! The node arena, update modes and the layout scheduler.

/// Scheduler configuration.
pub mod config;
/// Cross-thread request dispatch.
pub mod dispatch;
/// Debug dump utilities.
pub mod dump;
/// Core error types.
pub mod error;
/// Sizing hooks and frame observers.
pub mod hook;
/// Node ID types.
pub mod id;
/// Node data stored in the arena.
pub mod node;
/// Testing utilities.
#[cfg(any(test, feature = "testing"))]
pub mod testing;
/// Update modes and scheduling state.
pub mod update;
/// The arena and scheduler.
pub mod world;

pub use config::LayoutConfig;
pub use dispatch::{LayoutHandle, Request};
pub use hook::{FrameObserver, HookContext, SizeHook};
pub use id::NodeId;
pub use node::{Node, Visibility};
pub use update::{LayoutState, UpdateMode};
pub use world::{Core, CycleHook};
