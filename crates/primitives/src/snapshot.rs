//! Versioned buffer snapshots.
//!
//! A [`Buffer`] is the only mutable handle; every edit produces a new
//! immutable [`Snapshot`] with the next [`Version`]. The change sets between
//! versions are kept in a shared history so spans captured on an old snapshot
//! can be tracked forward (see [`crate::TrackingSpan`]).

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use ropey::{Rope, RopeSlice};

use crate::edit::EditError;
use crate::range::{CharIdx, LineRange, Span};
use crate::rope;
use crate::transaction::{Bias, ChangeSet, Edit};

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one buffer, shared by all of its snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(u64);

/// Monotonic snapshot version within one buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version(pub(crate) u64);

impl Version {
	pub fn get(self) -> u64 {
		self.0
	}

	fn next(self) -> Self {
		Self(self.0 + 1)
	}
}

impl fmt::Display for Version {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "v{}", self.0)
	}
}

/// Append-only edit history. `changes[i]` takes version `i` to `i + 1`.
///
/// Entries are never dropped: any snapshot or tracking span still alive may
/// map from its own version, and the history does not know which origins are
/// live. Memory therefore grows with the number of edits over the buffer's
/// lifetime.
#[derive(Debug, Default)]
pub(crate) struct History {
	changes: RwLock<Vec<ChangeSet>>,
}

impl History {
	fn push(&self, cs: ChangeSet) {
		self.changes.write().push(cs);
	}

	/// Maps `pos` from version `from` to version `to` (`from <= to`).
	pub(crate) fn map_pos(&self, pos: CharIdx, bias: Bias, from: Version, to: Version) -> CharIdx {
		let changes = self.changes.read();
		let from = from.0 as usize;
		let to = (to.0 as usize).min(changes.len());
		changes[from.min(to)..to].iter().fold(pos, |p, cs| cs.map_pos(p, bias))
	}
}

/// One immutable state of a buffer.
///
/// Cloning is cheap: the text is a rope and the history is shared.
#[derive(Clone)]
pub struct Snapshot {
	id: BufferId,
	version: Version,
	text: Rope,
	pub(crate) history: Arc<History>,
}

impl Snapshot {
	pub fn buffer_id(&self) -> BufferId {
		self.id
	}

	pub fn version(&self) -> Version {
		self.version
	}

	pub fn text(&self) -> RopeSlice<'_> {
		self.text.slice(..)
	}

	pub fn len_chars(&self) -> usize {
		self.text.len_chars()
	}

	pub fn len_lines(&self) -> usize {
		self.text.len_lines()
	}

	/// Returns true if both snapshots belong to the same buffer.
	pub fn same_buffer(&self, other: &Snapshot) -> bool {
		self.id == other.id
	}

	/// Returns the line containing `pos` (clamped to the text).
	pub fn line_of(&self, pos: CharIdx) -> usize {
		self.text.char_to_line(pos.min(self.len_chars()))
	}

	/// Returns the first character index of `line` (clamped to the text).
	pub fn line_start(&self, line: usize) -> CharIdx {
		self.text.line_to_char(line.min(self.len_lines()))
	}

	/// Span covering whole `lines`, terminators included.
	pub fn line_span(&self, lines: LineRange) -> Span {
		rope::line_span(self.text(), lines)
	}

	/// Smallest whole-line range containing `span`.
	pub fn line_range_of(&self, span: Span) -> LineRange {
		rope::line_range_of(self.text(), span)
	}

	pub fn full_span(&self) -> Span {
		Span::new(0, self.len_chars())
	}

	/// Returns the whole-line range of the snapshot.
	pub fn all_lines(&self) -> LineRange {
		LineRange::new(0, self.len_lines())
	}
}

impl PartialEq for Snapshot {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id && self.version == other.version
	}
}

impl Eq for Snapshot {}

impl std::hash::Hash for Snapshot {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		self.id.hash(state);
		self.version.hash(state);
	}
}

impl fmt::Debug for Snapshot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Snapshot")
			.field("buffer", &self.id.0)
			.field("version", &self.version.0)
			.field("len_chars", &self.len_chars())
			.finish()
	}
}

/// A span bound to the snapshot it was measured against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotSpan {
	pub snapshot: Snapshot,
	pub span: Span,
}

impl SnapshotSpan {
	/// Creates a snapshot span, clamping `span` to the snapshot's text.
	pub fn new(snapshot: Snapshot, span: impl Into<Span>) -> Self {
		let span: Span = span.into();
		let span = span.clamp_to(snapshot.len_chars());
		Self { snapshot, span }
	}

	/// Span covering the whole snapshot.
	pub fn full(snapshot: Snapshot) -> Self {
		let span = snapshot.full_span();
		Self { snapshot, span }
	}

	pub fn start(&self) -> CharIdx {
		self.span.start
	}

	pub fn end(&self) -> CharIdx {
		self.span.end
	}

	pub fn version(&self) -> Version {
		self.snapshot.version()
	}

	/// Whole-line range containing this span.
	pub fn line_range(&self) -> LineRange {
		self.snapshot.line_range_of(self.span)
	}

	/// Expands this span to whole lines.
	pub fn to_line_span(&self) -> SnapshotSpan {
		let span = self.snapshot.line_span(self.line_range());
		SnapshotSpan {
			snapshot: self.snapshot.clone(),
			span,
		}
	}

	/// Returns the text covered by this span.
	pub fn text(&self) -> RopeSlice<'_> {
		self.snapshot.text().slice(self.span.start..self.span.end)
	}
}

/// The mutable owner of a text buffer.
///
/// Every edit is recorded in a history shared by all snapshots and kept for
/// the buffer's lifetime.
pub struct Buffer {
	current: Snapshot,
}

impl Buffer {
	pub fn new(text: &str) -> Self {
		let id = BufferId(NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed));
		Self {
			current: Snapshot {
				id,
				version: Version::default(),
				text: Rope::from_str(text),
				history: Arc::new(History::default()),
			},
		}
	}

	/// Returns the latest snapshot.
	pub fn current(&self) -> Snapshot {
		self.current.clone()
	}

	pub fn version(&self) -> Version {
		self.current.version
	}

	/// Applies a batch of sorted, non-overlapping edits as one new snapshot.
	pub fn edit(&mut self, edits: &[Edit]) -> Result<Snapshot, EditError> {
		let cs = ChangeSet::from_edits(self.current.len_chars(), edits)?;
		let text = cs.applied(&self.current.text);
		self.current.history.push(cs);
		self.current = Snapshot {
			id: self.current.id,
			version: self.current.version.next(),
			text,
			history: Arc::clone(&self.current.history),
		};
		tracing::trace!(version = self.current.version.0, edits = edits.len(), "buffer.edit");
		Ok(self.current())
	}

	pub fn insert(&mut self, at: CharIdx, text: &str) -> Result<Snapshot, EditError> {
		self.edit(&[Edit::insert(at, text)])
	}

	pub fn delete(&mut self, start: CharIdx, end: CharIdx) -> Result<Snapshot, EditError> {
		self.edit(&[Edit::delete(start, end)])
	}

	pub fn replace(&mut self, start: CharIdx, end: CharIdx, text: &str) -> Result<Snapshot, EditError> {
		self.edit(&[Edit::replace(start, end, text)])
	}
}
