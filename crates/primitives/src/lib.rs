//! Text buffer primitives: spans, change sets, versioned snapshots, and
//! span tracking across snapshots.

/// Edit validation errors.
pub mod edit;
/// Character spans and line ranges.
pub mod range;
/// Rope line arithmetic.
pub mod rope;
/// Buffers and their immutable snapshots.
pub mod snapshot;
/// Spans re-resolvable onto newer snapshots.
pub mod tracking;
/// Change sets recorded between snapshots.
pub mod transaction;

pub use edit::EditError;
pub use range::{CharIdx, CharLen, LineRange, Span};
pub use ropey::{Rope, RopeSlice};
pub use snapshot::{Buffer, BufferId, Snapshot, SnapshotSpan, Version};
pub use tracking::{SpanTrackingMode, TrackingSpan};
pub use transaction::{Bias, ChangeSet, Edit};
