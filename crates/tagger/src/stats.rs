/// Counters describing tagger activity since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaggerStats {
	/// Background requests started.
	pub requests_started: u64,
	/// In-flight requests cancelled because a new one replaced them.
	pub requests_superseded: u64,
	/// Progress reports applied to the cache.
	pub chunks_processed: u64,
	/// Chunks whose source call failed or panicked.
	pub chunk_failures: u64,
	/// Worker messages dropped because their request was superseded.
	pub stale_messages: u64,
	pub notifications_sent: u64,
	/// Progress reports that matched what tracking already predicted.
	pub notifications_suppressed: u64,
	/// Visible-range updates injected into a live request.
	pub reprioritizations: u64,
	pub invalidations: u64,
}
