//! Outbound delivery for the leadgate relay.
//!
//! A lead submission fans out to two sinks in strict order: the
//! TrackDrive lead API first, then a Google spreadsheet for
//! record-keeping. The pipeline in this crate owns that sequencing, the
//! one-time spreadsheet setup, and the error taxonomy that the HTTP
//! layer translates into response envelopes.
//!
//! There is deliberately no retry, queueing, or rollback here: a failed
//! append after a successful upstream submission is reported as a
//! partial delivery and otherwise exists only in the logs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod pipeline;
pub mod sheets;
pub mod trackdrive;

pub use error::{DeliveryError, Result};
pub use pipeline::{DeliveryPipeline, RelayOutcome, RelaySeeds};
pub use sheets::{GoogleSheetsClient, SheetSink, SheetsConfig};
pub use trackdrive::{TrackdriveClient, TrackdriveConfig, UpstreamResponse};

/// Default timeout for lead API submissions, in seconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECONDS: u64 = 10;
