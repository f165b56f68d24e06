/// Harness for layout testing.
pub mod harness;
/// Recording frame observers.
pub mod record;

pub use harness::{Harness, HarnessBuilder};
pub use record::{EventLog, FrameEvent, RecordingObserver};
