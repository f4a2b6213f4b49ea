use crate::range::{CharIdx, CharLen};

/// A single replacement of the text range `[start, end)`.
///
/// An empty `replacement` turns the edit into a pure deletion; an empty range
/// with a non-empty replacement is a pure insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
	/// The starting character index of the edit.
	pub start: CharIdx,
	/// The ending character index of the edit (exclusive).
	pub end: CharIdx,
	/// The replacement text.
	pub replacement: String,
}

impl Edit {
	pub fn insert(at: CharIdx, text: impl Into<String>) -> Self {
		Self {
			start: at,
			end: at,
			replacement: text.into(),
		}
	}

	pub fn delete(start: CharIdx, end: CharIdx) -> Self {
		Self {
			start,
			end,
			replacement: String::new(),
		}
	}

	pub fn replace(start: CharIdx, end: CharIdx, text: impl Into<String>) -> Self {
		Self {
			start,
			end,
			replacement: text.into(),
		}
	}
}

/// Bias determines how positions at change boundaries are mapped.
///
/// When mapping a position through a change, bias determines whether the position
/// moves with insertions or stays before them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
	/// Position stays before insertions at the same location.
	Left,
	/// Position moves after insertions at the same location.
	Right,
}

/// A text insertion with cached character length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
	text: String,
	char_len: CharLen,
}

impl Insertion {
	#[inline]
	pub fn new(text: String) -> Self {
		let char_len = text.chars().count();
		Self { text, char_len }
	}

	#[inline]
	pub fn text(&self) -> &str {
		&self.text
	}

	#[inline]
	pub fn char_len(&self) -> CharLen {
		self.char_len
	}

	pub(super) fn push_str(&mut self, other: &Insertion) {
		self.text.push_str(&other.text);
		self.char_len += other.char_len;
	}
}

/// A single operation in a changeset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
	/// Retain the next N characters from the source document.
	Retain(CharLen),
	/// Delete the next N characters from the source document.
	Delete(CharLen),
	/// Insert new text at the current position.
	Insert(Insertion),
}
