//! Processing core for `envflow`.
//!
//! Turns irregular batches of environmental readings into a regular,
//! gap-filled, smoothed and anomaly-flagged series, and answers read-time
//! statistical queries over stored series. Nothing here does I/O beyond
//! decoding an input stream; storage and HTTP live in the binary.

pub mod batch;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod query;
pub mod window;

pub use batch::parse_csv_batch;
pub use error::{PipelineError, Result};
pub use models::{Channel, Channels, ProcessedReading, RawRecord, Reading};
pub use pipeline::{process, AnomalyMethod, PipelineConfig, VisualSummary};
pub use window::Window;
