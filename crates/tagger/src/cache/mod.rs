//! Cache store and lookup engine.
//!
//! The cache holds at most one exact entry (computed against one snapshot)
//! and at most one tracked entry (carried across snapshots). Queries first
//! reconcile the cache to their snapshot, then classify the answer as
//! none, partial, or complete.

mod entry;

use tagline_primitives::{Snapshot, SnapshotSpan, Span};

pub use entry::{ExactEntry, TrackedEntry, TrackedTag};

use crate::scheduler::chunk_owns;
use crate::source::TagSpan;

/// How much of a requested span the cache could answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
	/// Nothing known for the requested span.
	None,
	/// Some tags are known, or the known tags are approximate.
	Partial,
	/// Exact data covers the whole requested span.
	Complete,
}

/// Transient per-query lookup result.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup<T> {
	pub kind: LookupKind,
	pub tags: Vec<TagSpan<T>>,
}

impl<T> Lookup<T> {
	pub fn none() -> Self {
		Self {
			kind: LookupKind::None,
			tags: Vec::new(),
		}
	}

	fn partial(tags: Vec<TagSpan<T>>) -> Self {
		Self {
			kind: LookupKind::Partial,
			tags,
		}
	}

	fn complete(tags: Vec<TagSpan<T>>) -> Self {
		Self {
			kind: LookupKind::Complete,
			tags,
		}
	}
}

/// The cache, one variant per combination of entries.
#[derive(Debug, Clone)]
pub enum TagCache<T> {
	Empty,
	Exact(ExactEntry<T>),
	Tracked(TrackedEntry<T>),
	/// Exact data for the current snapshot plus tracked data filling the gaps.
	Both {
		exact: ExactEntry<T>,
		tracked: TrackedEntry<T>,
	},
}

impl<T> Default for TagCache<T> {
	fn default() -> Self {
		Self::Empty
	}
}

impl<T: Clone> TagCache<T> {
	pub fn is_empty(&self) -> bool {
		matches!(self, Self::Empty)
	}

	pub fn exact(&self) -> Option<&ExactEntry<T>> {
		match self {
			Self::Exact(exact) | Self::Both { exact, .. } => Some(exact),
			_ => None,
		}
	}

	pub fn tracked(&self) -> Option<&TrackedEntry<T>> {
		match self {
			Self::Tracked(tracked) | Self::Both { tracked, .. } => Some(tracked),
			_ => None,
		}
	}

	pub(crate) fn state_name(&self) -> &'static str {
		match self {
			Self::Empty => "empty",
			Self::Exact(_) => "exact",
			Self::Tracked(_) => "tracked",
			Self::Both { .. } => "both",
		}
	}

	pub fn clear(&mut self) {
		*self = Self::Empty;
	}

	/// Degrades an exact entry older than `snapshot` into tracked data.
	///
	/// An existing tracked entry is merged with the converted one on
	/// `snapshot`. Exact data for `snapshot` itself (or a newer one) is left
	/// alone.
	pub fn reconcile(&mut self, snapshot: &Snapshot) {
		let Some(exact) = self.exact() else {
			return;
		};
		if !exact.snapshot().same_buffer(snapshot) {
			self.clear();
			return;
		}
		if exact.snapshot().version() >= snapshot.version() {
			return;
		}

		let from = exact.snapshot().version();
		*self = match std::mem::take(self) {
			Self::Exact(exact) => Self::Tracked(exact.into_tracked()),
			Self::Both { exact, tracked } => match TrackedEntry::merge(exact.into_tracked(), tracked, snapshot) {
				Some(merged) => Self::Tracked(merged),
				None => Self::Empty,
			},
			other => other,
		};
		tracing::trace!(from = %from, to = %snapshot.version(), state = self.state_name(), "tag_cache.reconcile");
	}

	/// Classifies `requested` against the cache after reconciling to its snapshot.
	///
	/// Complete answers return the full exact tag list; callers filter.
	/// Partial answers list exact tags before tracked ones, and tracked tags
	/// only fill regions the exact entry has not computed.
	pub fn lookup(&mut self, requested: &SnapshotSpan) -> Lookup<T> {
		self.reconcile(&requested.snapshot);
		match self {
			Self::Empty => Lookup::none(),
			Self::Exact(exact) => lookup_exact(exact, None, requested),
			Self::Tracked(tracked) => lookup_tracked(tracked, requested),
			Self::Both { exact, tracked } => lookup_exact(exact, Some(&*tracked), requested),
		}
	}

	/// Tags a tracked-only lookup would report for `chunk` on `snapshot`.
	///
	/// Uses the same ownership rule as background chunks so the two lists
	/// are directly comparable.
	pub fn tracked_prediction(&self, snapshot: &Snapshot, chunk: &Span) -> Vec<TagSpan<T>> {
		let Some(tracked) = self.tracked() else {
			return Vec::new();
		};
		let len = snapshot.len_chars();
		let mut tags = tracked.resolve_tags(snapshot);
		tags.retain(|t| chunk_owns(chunk, t.span.start, len));
		tags
	}

	/// Merges one background progress report computed on `snapshot`.
	///
	/// `computed` is the region the source actually processed; `tags` are
	/// the tags starting in it and may extend past its end. Returns false if
	/// the cache already holds exact data for a newer snapshot, in which case
	/// the report is discarded.
	pub fn apply_progress(&mut self, snapshot: &Snapshot, computed: Span, tags: Vec<TagSpan<T>>) -> bool {
		self.reconcile(snapshot);
		match self {
			Self::Exact(exact) | Self::Both { exact, .. } if exact.snapshot() == snapshot => {
				exact.extend(computed, tags);
				return true;
			}
			Self::Exact(_) | Self::Both { .. } => return false,
			Self::Empty | Self::Tracked(_) => {}
		}

		let exact = ExactEntry::new(snapshot.clone(), computed, tags);
		*self = match std::mem::take(self) {
			Self::Tracked(tracked) => Self::Both { exact, tracked },
			_ => Self::Exact(exact),
		};
		true
	}

	/// Drops tracked data once exact data for the current snapshot is complete.
	pub fn collapse_to_exact(&mut self) {
		if let Self::Both { .. } = self {
			*self = match std::mem::take(self) {
				Self::Both { exact, .. } => Self::Exact(exact),
				other => other,
			};
		}
	}
}

fn lookup_exact<T: Clone>(exact: &ExactEntry<T>, tracked: Option<&TrackedEntry<T>>, requested: &SnapshotSpan) -> Lookup<T> {
	if exact.snapshot() == &requested.snapshot {
		if exact.covers(&requested.span) {
			return Lookup::complete(exact.tags().to_vec());
		}
		if exact.span().intersects(&requested.span) {
			let mut tags = exact.tags().to_vec();
			if let Some(approx) = tracked.and_then(|t| t.lookup(requested)) {
				tags.extend(approx.into_iter().filter(|t| !exact.covers_any(&t.span)));
			}
			return Lookup::partial(tags);
		}
	}
	match tracked {
		Some(tracked) => lookup_tracked(tracked, requested),
		None => Lookup::none(),
	}
}

fn lookup_tracked<T: Clone>(tracked: &TrackedEntry<T>, requested: &SnapshotSpan) -> Lookup<T> {
	match tracked.lookup(requested) {
		Some(tags) => Lookup::partial(tags),
		None => Lookup::none(),
	}
}
