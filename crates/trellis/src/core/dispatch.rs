use std::sync::mpsc;

use tracing::debug;

use crate::{
    NodeId,
    core::{Core, update::UpdateMode},
    error::Result,
};

/// A unit of work marshaled onto the thread that owns the tree.
pub type Request = Box<dyn FnOnce(&mut Core) -> Result<()> + Send>;

/// The receiving end of the request channel, held by [`Core`].
pub(crate) struct RequestQueue {
    /// Sender cloned into handles.
    tx: mpsc::Sender<Request>,
    /// Receiver drained by [`Core::process_requests`].
    rx: mpsc::Receiver<Request>,
}

impl RequestQueue {
    /// Create an empty queue.
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// A new handle feeding this queue.
    pub(crate) fn handle(&self) -> LayoutHandle {
        LayoutHandle {
            tx: self.tx.clone(),
        }
    }

    /// Pop the next request without blocking.
    pub(crate) fn try_next(&self) -> Option<Request> {
        self.rx.try_recv().ok()
    }
}

/// A `Send` handle for requesting layout work from other threads.
///
/// Requests are fire-and-continue: they are queued and run, in order, the
/// next time the owning thread calls [`Core::process_requests`]. Nothing is
/// returned to the caller. Requests sent after the tree is gone are dropped.
#[derive(Clone)]
pub struct LayoutHandle {
    /// Channel into the owning core.
    tx: mpsc::Sender<Request>,
}

impl LayoutHandle {
    /// Queue an arbitrary mutation.
    pub fn post(&self, f: impl FnOnce(&mut Core) -> Result<()> + Send + 'static) {
        if self.tx.send(Box::new(f)).is_err() {
            debug!("layout request dropped: tree is gone");
        }
    }

    /// Queue a relayout of `node`.
    pub fn invalidate(&self, node: NodeId) {
        self.post(move |core| core.invalidate_layout(node, UpdateMode::Deferred));
    }

    /// Queue a requested width change.
    pub fn set_width(&self, node: NodeId, w: i32) {
        self.post(move |core| core.set_width(node, w, UpdateMode::Deferred));
    }

    /// Queue a requested height change.
    pub fn set_height(&self, node: NodeId, h: i32) {
        self.post(move |core| core.set_height(node, h, UpdateMode::Deferred));
    }
}
