//! Client lifecycle telemetry.
//!
//! Telemetry is a write-only side channel: nothing in the reactor reads it back to make a
//! decision. Events carry modes, codes, sequence numbers and session kinds only, never
//! credentials, note text or summaries.

pub mod event;
pub mod metrics;
pub mod recorder;

pub use event::{DiscardReason, TelemetryEvent};
pub use metrics::TelemetrySnapshot;
pub use recorder::TelemetryRecorder;
