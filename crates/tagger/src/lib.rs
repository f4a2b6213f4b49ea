//! Incremental tag cache with a background fill scheduler.
//!
//! A [`BackgroundTagger`] answers tag queries over versioned buffer
//! snapshots without ever blocking:
//!
//! * a [`TagSource`] may answer synchronously through its prompt path;
//! * otherwise the [`TagCache`] answers with exact data for the query's
//!   snapshot, or with tracked data carried forward from an older one;
//! * whatever the cache cannot answer exactly is filled by one cancellable
//!   background request that walks the target in line chunks, visible
//!   region first.
//!
//! Worker results only reach the cache when the owner pumps the tagger.
//! Regions whose tags changed are reported as [`TagsChanged`] events.

mod cache;
mod config;
mod error;
mod handle;
mod registry;
mod scheduler;
mod source;
mod stats;
mod tagger;
#[cfg(test)]
mod test_support;

pub use cache::{ExactEntry, Lookup, LookupKind, TagCache, TrackedEntry, TrackedTag};
pub use config::{DEFAULT_CHUNK_LINES, TaggerCfg};
pub use error::{ConfigError, SourceError};
pub use handle::TaggerHandle;
pub use registry::{Lease, SharedTaggers};
pub use source::{TagSource, TagSpan};
pub use stats::TaggerStats;
pub use tagger::{BackgroundTagger, TagsChanged};
