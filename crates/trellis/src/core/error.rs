use std::{io, result::Result as StdResult};

use thiserror::Error;

use crate::core::id::NodeId;

/// Result type for trellis operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type.
///
/// Layout itself never fails on malformed constraints: bad values are clamped
/// and reference cycles are broken. Errors here cover tree ownership and
/// configuration.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    /// A node id did not resolve to a live node.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),
    /// Attempted to attach a node that already has a parent.
    #[error("node already attached: {0:?}")]
    AlreadyAttached(NodeId),
    /// Attaching would make a node its own ancestor.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle {
        /// Prospective parent.
        parent: NodeId,
        /// Prospective child.
        child: NodeId,
    },
    #[error("invalid operation: {0}")]
    /// Operation not permitted on this node.
    InvalidOperation(String),
    #[error("config: {0}")]
    /// Configuration could not be parsed.
    Config(String),
    #[error("io: {0}")]
    /// Writing diagnostic output failed.
    Io(String),
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}
