use thiserror::Error;

use crate::range::CharIdx;

/// Reasons an edit batch is rejected before it touches the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
	#[error("edit end {end} is past the end of the document ({len} chars)")]
	OutOfBounds { end: CharIdx, len: usize },
	#[error("edit range {start}..{end} is reversed")]
	Reversed { start: CharIdx, end: CharIdx },
	#[error("edit at {at} overlaps or precedes the previous edit")]
	Overlapping { at: CharIdx },
}
