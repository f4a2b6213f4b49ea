/// A position in the text, measured in characters (not bytes).
///
/// This is the canonical coordinate space for tagline.
pub type CharIdx = usize;

/// A length or count in the text, measured in characters (not bytes).
///
/// This is distinct from CharIdx to avoid accidentally passing an index
/// where a length is expected or vice versa.
pub type CharLen = usize;

/// A half-open character range `[start, end)`.
///
/// Spans carry no snapshot identity on their own; pair them with a
/// [`crate::Snapshot`] through [`crate::SnapshotSpan`] when the snapshot matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Span {
	/// Inclusive start.
	pub start: CharIdx,
	/// Exclusive end.
	pub end: CharIdx,
}

impl Span {
	/// Creates a span, swapping the endpoints if they are reversed.
	pub fn new(start: CharIdx, end: CharIdx) -> Self {
		if end < start { Self { start: end, end: start } } else { Self { start, end } }
	}

	/// Creates a zero-width span at `pos`.
	pub fn empty_at(pos: CharIdx) -> Self {
		Self { start: pos, end: pos }
	}

	#[inline]
	pub fn len(&self) -> CharLen {
		self.end - self.start
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}

	/// Returns true if `pos` lies in `[start, end)`.
	#[inline]
	pub fn contains_pos(&self, pos: CharIdx) -> bool {
		pos >= self.start && pos < self.end
	}

	/// Returns true if `other` lies entirely within this span.
	#[inline]
	pub fn contains(&self, other: &Span) -> bool {
		other.start >= self.start && other.end <= self.end
	}

	/// Closed-interval intersection test.
	///
	/// Spans that merely touch intersect, and an empty span sitting on either
	/// boundary intersects the span it touches.
	#[inline]
	pub fn intersects(&self, other: &Span) -> bool {
		self.start <= other.end && other.start <= self.end
	}

	/// Returns true if the spans share at least one character.
	#[inline]
	pub fn overlaps(&self, other: &Span) -> bool {
		self.start.max(other.start) < self.end.min(other.end)
	}

	/// Returns the non-empty shared region, if any.
	pub fn overlap(&self, other: &Span) -> Option<Span> {
		let start = self.start.max(other.start);
		let end = self.end.min(other.end);
		(start < end).then_some(Span { start, end })
	}

	/// Returns the smallest span covering both spans.
	pub fn cover(&self, other: &Span) -> Span {
		Span {
			start: self.start.min(other.start),
			end: self.end.max(other.end),
		}
	}

	/// Returns the smallest span covering every span in `spans`.
	pub fn cover_all<'a>(spans: impl IntoIterator<Item = &'a Span>) -> Option<Span> {
		spans.into_iter().fold(None, |acc: Option<Span>, s| Some(acc.map_or(*s, |a| a.cover(s))))
	}

	/// Clamps both endpoints to `[0, max_char]`.
	pub fn clamp_to(self, max_char: CharIdx) -> Self {
		Self {
			start: self.start.min(max_char),
			end: self.end.min(max_char),
		}
	}
}

impl From<std::ops::Range<CharIdx>> for Span {
	fn from(r: std::ops::Range<CharIdx>) -> Self {
		Span::new(r.start, r.end)
	}
}

/// A half-open range of line indices `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LineRange {
	pub start: usize,
	pub end: usize,
}

impl LineRange {
	pub fn new(start: usize, end: usize) -> Self {
		debug_assert!(start <= end, "line range reversed: {start}..{end}");
		Self { start, end }
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.end - self.start
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.start >= self.end
	}

	/// Returns true if `other` lies entirely within this range.
	#[inline]
	pub fn contains(&self, other: &LineRange) -> bool {
		other.start >= self.start && other.end <= self.end
	}

	#[inline]
	pub fn contains_line(&self, line: usize) -> bool {
		line >= self.start && line < self.end
	}

	/// Returns the non-empty shared range, if any.
	pub fn intersect(&self, other: &LineRange) -> Option<LineRange> {
		let start = self.start.max(other.start);
		let end = self.end.min(other.end);
		(start < end).then_some(LineRange { start, end })
	}

	pub fn cover(&self, other: &LineRange) -> LineRange {
		LineRange {
			start: self.start.min(other.start),
			end: self.end.max(other.end),
		}
	}
}
