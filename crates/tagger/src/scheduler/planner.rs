use std::collections::VecDeque;

use tagline_primitives::LineRange;
use tagline_worker::LatestSlot;

/// Disjoint, sorted set of line ranges already processed by one request.
#[derive(Debug, Clone, Default)]
pub(crate) struct VisitedLines {
	ranges: Vec<LineRange>,
}

impl VisitedLines {
	pub(crate) fn insert(&mut self, range: LineRange) {
		if range.is_empty() {
			return;
		}
		self.ranges.push(range);
		self.ranges.sort_by_key(|r| r.start);
		let mut merged: Vec<LineRange> = Vec::with_capacity(self.ranges.len());
		for r in self.ranges.drain(..) {
			match merged.last_mut() {
				Some(last) if last.end >= r.start => last.end = last.end.max(r.end),
				_ => merged.push(r),
			}
		}
		self.ranges = merged;
	}

	/// Parts of `range` not yet visited, in order.
	pub(crate) fn gaps(&self, range: LineRange) -> Vec<LineRange> {
		let mut gaps = Vec::new();
		let mut cursor = range.start;
		for r in &self.ranges {
			if r.end <= cursor {
				continue;
			}
			if r.start >= range.end {
				break;
			}
			if r.start > cursor {
				gaps.push(LineRange::new(cursor, r.start));
			}
			cursor = cursor.max(r.end);
		}
		if cursor < range.end {
			gaps.push(LineRange::new(cursor, range.end));
		}
		gaps
	}

	pub(crate) fn contains(&self, range: &LineRange) -> bool {
		self.gaps(*range).is_empty()
	}
}

/// Decides which line range a background request computes next.
///
/// Priority ranges injected through the request's slot win over the
/// sequential cursor. A newer priority range replaces the unprocessed pieces
/// of an older one. Every line of the target is handed out exactly once.
#[derive(Debug)]
pub(crate) struct ChunkPlanner {
	target: LineRange,
	chunk_lines: usize,
	cursor: usize,
	visited: VisitedLines,
	pending: VecDeque<LineRange>,
}

impl ChunkPlanner {
	/// Creates a planner over `target`, treating `done` as already visited.
	pub(crate) fn new(target: LineRange, chunk_lines: usize, done: impl IntoIterator<Item = LineRange>) -> Self {
		let mut visited = VisitedLines::default();
		for range in done {
			if let Some(range) = range.intersect(&target) {
				visited.insert(range);
			}
		}
		Self {
			target,
			chunk_lines: chunk_lines.max(1),
			cursor: target.start,
			visited,
			pending: VecDeque::new(),
		}
	}

	/// Returns the next range to compute, or `None` once the target is exhausted.
	pub(crate) fn next_chunk(&mut self, priority: &LatestSlot<LineRange>) -> Option<LineRange> {
		if let Some(range) = priority.take() {
			self.pending.clear();
			if let Some(range) = range.intersect(&self.target) {
				for gap in self.visited.gaps(range) {
					self.pending.extend(split(gap, self.chunk_lines));
				}
			}
		}

		while let Some(piece) = self.pending.pop_front() {
			if !self.visited.contains(&piece) {
				return Some(piece);
			}
		}

		let gap = self.visited.gaps(LineRange::new(self.cursor, self.target.end)).into_iter().next()?;
		let chunk = LineRange::new(gap.start, gap.end.min(gap.start + self.chunk_lines));
		self.cursor = chunk.end;
		Some(chunk)
	}

	pub(crate) fn mark_visited(&mut self, range: LineRange) {
		self.visited.insert(range);
	}
}

fn split(range: LineRange, chunk_lines: usize) -> impl Iterator<Item = LineRange> {
	(range.start..range.end)
		.step_by(chunk_lines)
		.map(move |start| LineRange::new(start, (start + chunk_lines).min(range.end)))
}
