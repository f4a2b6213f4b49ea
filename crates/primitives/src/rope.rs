//! Rope utilities for line-granular span arithmetic.

use ropey::RopeSlice;

use crate::range::{LineRange, Span};

/// Returns the number of lines, including the empty line after a trailing newline.
#[inline]
pub fn visible_line_count(text: RopeSlice) -> usize {
	text.len_lines()
}

/// Returns the span covering `lines`, including each line's terminator.
///
/// Line indices past the end of the text are clamped.
pub fn line_span(text: RopeSlice, lines: LineRange) -> Span {
	let total = text.len_lines();
	let start = text.line_to_char(lines.start.min(total));
	let end = text.line_to_char(lines.end.min(total));
	Span::new(start, end)
}

/// Returns the smallest whole-line range containing `span`.
///
/// An empty span still occupies the line it sits on.
pub fn line_range_of(text: RopeSlice, span: Span) -> LineRange {
	let span = span.clamp_to(text.len_chars());
	let start = text.char_to_line(span.start);
	let end = if span.is_empty() {
		start + 1
	} else {
		text.char_to_line(span.end - 1) + 1
	};
	LineRange::new(start, end)
}
