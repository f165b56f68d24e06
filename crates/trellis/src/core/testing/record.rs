use std::{
    mem,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{NodeId, core::hook::FrameObserver};

/// A committed frame change, as seen by an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// The node's origin changed.
    Moved {
        /// Node that moved.
        node: NodeId,
        /// New x coordinate.
        x: i32,
        /// New y coordinate.
        y: i32,
    },
    /// The node's size changed.
    Resized {
        /// Node that was resized.
        node: NodeId,
        /// New width.
        w: i32,
        /// New height.
        h: i32,
    },
}

impl FrameEvent {
    /// The node the event concerns.
    pub fn node(&self) -> NodeId {
        match self {
            Self::Moved { node, .. } | Self::Resized { node, .. } => *node,
        }
    }
}

/// A shared, ordered log of frame events. Clones share the same log, so one
/// log can record events from many nodes in commit order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    /// Recorded events.
    events: Arc<Mutex<Vec<FrameEvent>>>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the event list, recovering from poisoning.
    fn lock(&self) -> MutexGuard<'_, Vec<FrameEvent>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append an event.
    fn push(&self, event: FrameEvent) {
        self.lock().push(event);
    }

    /// A snapshot of the events so far.
    pub fn events(&self) -> Vec<FrameEvent> {
        self.lock().clone()
    }

    /// Return the events so far and clear the log.
    pub fn take(&self) -> Vec<FrameEvent> {
        mem::take(&mut *self.lock())
    }

    /// Nodes in the order their first event was recorded.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = Vec::new();
        for event in self.lock().iter() {
            if !out.contains(&event.node()) {
                out.push(event.node());
            }
        }
        out
    }
}

/// A [`FrameObserver`] that appends every notification to an [`EventLog`].
#[derive(Debug, Clone)]
pub struct RecordingObserver {
    /// Destination log.
    log: EventLog,
}

impl RecordingObserver {
    /// Record into `log`.
    pub fn new(log: &EventLog) -> Self {
        Self { log: log.clone() }
    }
}

impl FrameObserver for RecordingObserver {
    fn moved(&mut self, node: NodeId, x: i32, y: i32) {
        self.log.push(FrameEvent::Moved { node, x, y });
    }

    fn resized(&mut self, node: NodeId, w: i32, h: i32) {
        self.log.push(FrameEvent::Resized { node, w, h });
    }
}
