//! Spans that can be re-resolved onto newer snapshots of the same buffer.

use std::sync::Arc;

use crate::range::Span;
use crate::snapshot::{BufferId, History, Snapshot, SnapshotSpan, Version};
use crate::transaction::Bias;

/// How a tracked span's edges react to insertions exactly at those edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpanTrackingMode {
	/// Text inserted at either edge ends up outside the span.
	#[default]
	EdgeExclusive,
	/// Text inserted at either edge ends up inside the span.
	EdgeInclusive,
}

impl SpanTrackingMode {
	fn biases(self) -> (Bias, Bias) {
		match self {
			Self::EdgeExclusive => (Bias::Right, Bias::Left),
			Self::EdgeInclusive => (Bias::Left, Bias::Right),
		}
	}
}

/// A span captured on one snapshot that can be mapped forward through later edits.
#[derive(Clone)]
pub struct TrackingSpan {
	buffer: BufferId,
	origin: Version,
	span: Span,
	mode: SpanTrackingMode,
	history: Arc<History>,
}

impl TrackingSpan {
	pub fn new(at: &SnapshotSpan, mode: SpanTrackingMode) -> Self {
		Self {
			buffer: at.snapshot.buffer_id(),
			origin: at.snapshot.version(),
			span: at.span,
			mode,
			history: Arc::clone(&at.snapshot.history),
		}
	}

	/// Captures `span` on `snapshot` with edge-exclusive tracking.
	pub fn exclusive(snapshot: &Snapshot, span: Span) -> Self {
		Self {
			buffer: snapshot.buffer_id(),
			origin: snapshot.version(),
			span: span.clamp_to(snapshot.len_chars()),
			mode: SpanTrackingMode::EdgeExclusive,
			history: Arc::clone(&snapshot.history),
		}
	}

	/// Version of the snapshot the span was captured on.
	pub fn origin(&self) -> Version {
		self.origin
	}

	/// The span as captured on the origin snapshot.
	pub fn origin_span(&self) -> Span {
		self.span
	}

	pub fn mode(&self) -> SpanTrackingMode {
		self.mode
	}

	/// Maps the captured span onto `target`.
	///
	/// Returns `None` if `target` belongs to another buffer, predates the
	/// origin, or if the captured (non-empty) content was deleted.
	pub fn resolve(&self, target: &Snapshot) -> Option<Span> {
		if target.buffer_id() != self.buffer || target.version() < self.origin {
			return None;
		}
		if target.version() == self.origin {
			return Some(self.span);
		}

		let to = target.version();
		if self.span.is_empty() {
			let pos = self.history.map_pos(self.span.start, Bias::Left, self.origin, to);
			return Some(Span::empty_at(pos));
		}

		let (start_bias, end_bias) = self.mode.biases();
		let start = self.history.map_pos(self.span.start, start_bias, self.origin, to);
		let end = self.history.map_pos(self.span.end, end_bias, self.origin, to);
		(start < end).then_some(Span { start, end })
	}

	/// Like [`Self::resolve`], bound to the target snapshot.
	pub fn resolve_on(&self, target: &Snapshot) -> Option<SnapshotSpan> {
		self.resolve(target).map(|span| SnapshotSpan {
			snapshot: target.clone(),
			span,
		})
	}
}

impl std::fmt::Debug for TrackingSpan {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TrackingSpan")
			.field("origin", &self.origin)
			.field("span", &self.span)
			.field("mode", &self.mode)
			.finish()
	}
}
