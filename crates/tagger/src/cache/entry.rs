use tagline_primitives::{Snapshot, SnapshotSpan, Span, TrackingSpan};

use crate::source::TagSpan;

/// Tags computed directly against one snapshot.
///
/// `coverage` holds the disjoint, sorted regions the source actually
/// computed. Tags are owned by the region holding their start but may run
/// past its end, so `span()` is the hull of the coverage and every tag.
#[derive(Debug, Clone)]
pub struct ExactEntry<T> {
	snapshot: Snapshot,
	hull: Span,
	coverage: Vec<Span>,
	tags: Vec<TagSpan<T>>,
}

impl<T: Clone> ExactEntry<T> {
	/// Creates an entry for the `computed` region and the tags it owns.
	pub fn new(snapshot: Snapshot, computed: Span, tags: Vec<TagSpan<T>>) -> Self {
		debug_assert!(tags.iter().all(|t| owned_by(&computed, &t.span)), "exact tags must start within the computed region");
		Self {
			snapshot,
			hull: tags.iter().fold(computed, |acc, t| acc.cover(&t.span)),
			coverage: vec![computed],
			tags,
		}
	}

	pub fn snapshot(&self) -> &Snapshot {
		&self.snapshot
	}

	/// Hull of every computed region and every tag.
	pub fn span(&self) -> Span {
		self.hull
	}

	/// Disjoint computed regions, sorted by position.
	pub fn coverage(&self) -> &[Span] {
		&self.coverage
	}

	pub fn tags(&self) -> &[TagSpan<T>] {
		&self.tags
	}

	/// Returns true if one computed region contains `span`.
	pub fn covers(&self, span: &Span) -> bool {
		self.coverage.iter().any(|c| c.contains(span))
	}

	/// Returns true if any computed region shares a character with `span`,
	/// or an empty `span` sits inside one.
	pub fn covers_any(&self, span: &Span) -> bool {
		self.coverage.iter().any(|c| c.overlaps(span) || (span.is_empty() && c.contains(span)))
	}

	/// Merges another computed region and the tags it owns into this entry.
	pub fn extend(&mut self, computed: Span, tags: Vec<TagSpan<T>>) {
		debug_assert!(tags.iter().all(|t| owned_by(&computed, &t.span)));
		self.hull = tags.iter().fold(self.hull.cover(&computed), |acc, t| acc.cover(&t.span));
		self.coverage.push(computed);
		self.coverage.sort_by_key(|s| s.start);
		let mut merged: Vec<Span> = Vec::with_capacity(self.coverage.len());
		for s in self.coverage.drain(..) {
			match merged.last_mut() {
				Some(last) if last.intersects(&s) => *last = last.cover(&s),
				_ => merged.push(s),
			}
		}
		self.coverage = merged;
		self.tags.extend(tags);
	}

	/// Wraps every span as a tracking reference on this entry's snapshot.
	pub fn into_tracked(self) -> TrackedEntry<T> {
		let hull = self.span();
		let snapshot = self.snapshot;
		TrackedEntry {
			tracking: TrackingSpan::exclusive(&snapshot, hull),
			tags: self
				.tags
				.into_iter()
				.map(|t| TrackedTag {
					span: TrackingSpan::exclusive(&snapshot, t.span),
					tag: t.tag,
				})
				.collect(),
		}
	}
}

#[derive(Debug, Clone)]
pub struct TrackedTag<T> {
	pub span: TrackingSpan,
	pub tag: T,
}

/// Tags carried forward across snapshots by span tracking.
///
/// Always approximate: entries whose text was deleted silently disappear on
/// resolution.
#[derive(Debug, Clone)]
pub struct TrackedEntry<T> {
	tracking: TrackingSpan,
	tags: Vec<TrackedTag<T>>,
}

impl<T: Clone> TrackedEntry<T> {
	pub fn tracking_span(&self) -> &TrackingSpan {
		&self.tracking
	}

	pub fn len(&self) -> usize {
		self.tags.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tags.is_empty()
	}

	/// Resolves the entry's overall span onto `target`.
	pub fn resolve_span(&self, target: &Snapshot) -> Option<Span> {
		self.tracking.resolve(target)
	}

	/// Resolves every tag onto `target`, dropping tags that no longer exist.
	pub fn resolve_tags(&self, target: &Snapshot) -> Vec<TagSpan<T>> {
		self.tags
			.iter()
			.filter_map(|t| {
				t.span.resolve(target).map(|span| TagSpan {
					span,
					tag: t.tag.clone(),
				})
			})
			.collect()
	}

	/// Tags intersecting `requested`, or `None` if the entry as a whole no
	/// longer intersects it.
	pub fn lookup(&self, requested: &SnapshotSpan) -> Option<Vec<TagSpan<T>>> {
		let span = self.resolve_span(&requested.snapshot)?;
		if !span.intersects(&requested.span) {
			return None;
		}
		let mut tags = self.resolve_tags(&requested.snapshot);
		tags.retain(|t| t.span.intersects(&requested.span));
		Some(tags)
	}

	/// Merges two tracked entries onto `on`.
	///
	/// Spans are unioned; tags from `second` whose resolved span already
	/// appears in `first` are dropped. The result is re-captured on `on`.
	/// Returns `None` if neither entry survives resolution.
	pub fn merge(first: TrackedEntry<T>, second: TrackedEntry<T>, on: &Snapshot) -> Option<TrackedEntry<T>> {
		let span = match (first.resolve_span(on), second.resolve_span(on)) {
			(Some(a), Some(b)) => a.cover(&b),
			(Some(a), None) => a,
			(None, Some(b)) => b,
			(None, None) => return None,
		};

		let mut tags = first.resolve_tags(on);
		let seen: Vec<Span> = tags.iter().map(|t| t.span).collect();
		tags.extend(second.resolve_tags(on).into_iter().filter(|t| !seen.contains(&t.span)));

		Some(TrackedEntry {
			tracking: TrackingSpan::exclusive(on, span),
			tags: tags
				.into_iter()
				.map(|t| TrackedTag {
					span: TrackingSpan::exclusive(on, t.span),
					tag: t.tag,
				})
				.collect(),
		})
	}
}

fn owned_by(computed: &Span, tag: &Span) -> bool {
	computed.start <= tag.start && tag.start <= computed.end
}
