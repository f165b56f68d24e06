use tracing::Level;
use tracing_subscriber::fmt;

use super::record::{EventLog, RecordingObserver};
use crate::{
    NodeId, UpdateMode,
    core::{Core, config::LayoutConfig},
    error::Result,
    geom::{Expanse, Rect},
};

/// A simple harness that holds a [`Core`] with a sized root. Tests build a
/// tree under the root, mutate it, and inspect committed frames and observer
/// logs.
pub struct Harness {
    /// The tree under test.
    pub core: Core,
    /// The root node.
    pub root: NodeId,
    /// Shared log for nodes added with [`Harness::observe`].
    pub log: EventLog,
}

/// Builder for creating a test harness with a fluent API.
pub struct HarnessBuilder {
    /// Root size.
    size: Expanse,
    /// Scheduler settings.
    config: LayoutConfig,
    /// Install a test log subscriber.
    trace: bool,
}

impl HarnessBuilder {
    /// Create a new harness builder with a 100x100 root.
    fn new() -> Self {
        Self {
            size: Expanse::new(100, 100),
            config: LayoutConfig::default(),
            trace: false,
        }
    }

    /// Set the root size.
    pub fn size(mut self, width: i32, height: i32) -> Self {
        self.size = Expanse::new(width, height);
        self
    }

    /// Use explicit scheduler settings.
    pub fn config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    /// Print layout tracing to the test output.
    pub fn trace(mut self) -> Self {
        self.trace = true;
        self
    }

    /// Build the harness with the configured settings.
    pub fn build(self) -> Result<Harness> {
        if self.trace {
            let format = fmt::format()
                .with_level(true)
                .with_line_number(true)
                .with_ansi(false)
                .without_time()
                .compact();
            // Another test may already have installed one.
            fmt()
                .with_max_level(Level::TRACE)
                .with_test_writer()
                .event_format(format)
                .try_init()
                .ok();
        }

        let mut core = Core::with_config(self.config);
        let root = core.root();
        core.set_frame(root, self.size.rect(), UpdateMode::Layout)?;
        core.take_redraw_request();
        Ok(Harness {
            core,
            root,
            log: EventLog::new(),
        })
    }
}

impl Harness {
    /// Create a harness builder for constructing a test harness with a fluent API.
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder::new()
    }

    /// Create a harness with a default root size of 100x100.
    pub fn new() -> Result<Self> {
        HarnessBuilder::new().build()
    }

    /// Add an unconstrained child with an initial frame.
    pub fn child(&mut self, parent: NodeId, frame: Rect) -> Result<NodeId> {
        let id = self.core.add_child(parent)?;
        self.core.set_frame(id, frame, UpdateMode::Init)?;
        Ok(id)
    }

    /// Add an unconstrained child of `size` at the origin.
    pub fn sized(&mut self, parent: NodeId, w: i32, h: i32) -> Result<NodeId> {
        self.child(parent, Rect::new(0, 0, w, h))
    }

    /// Record frame changes for `node` into the shared log.
    pub fn observe(&mut self, node: NodeId) -> Result<()> {
        self.core.set_observer(node, RecordingObserver::new(&self.log))
    }

    /// Run any pending layout.
    pub fn layout(&mut self) -> Result<()> {
        self.core.update_layout()
    }

    /// Resize the root and lay out.
    pub fn resize(&mut self, width: i32, height: i32) -> Result<()> {
        self.core
            .set_size(self.root, width, height, UpdateMode::Layout)
    }

    /// Committed frame of a node.
    pub fn frame(&self, node: NodeId) -> Result<Rect> {
        self.core.frame(node)
    }
}
