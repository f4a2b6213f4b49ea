use std::fmt;

use tagline_primitives::{Span, SnapshotSpan};
use tagline_worker::GenerationToken;

use crate::error::SourceError;

/// An opaque tag payload attached to the span it annotates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagSpan<T> {
	pub span: Span,
	pub tag: T,
}

impl<T> TagSpan<T> {
	pub fn new(span: impl Into<Span>, tag: T) -> Self {
		Self { span: span.into(), tag }
	}
}

/// Producer of tags for a snapshot.
///
/// `try_get_prompt` and `data_for_span` run on the owning context;
/// `tags_in_background` runs on a worker thread and should poll `cancel`.
pub trait TagSource: Send + Sync + 'static {
	type Tag: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;
	/// State captured on the owning context and handed to the worker.
	type Data: Send + 'static;

	/// Synchronous fast path. Returning `None` is always valid.
	fn try_get_prompt(&self, _span: &SnapshotSpan) -> Option<Vec<TagSpan<Self::Tag>>> {
		None
	}

	fn data_for_span(&self, span: &SnapshotSpan) -> Self::Data;

	/// Computes tags for `span`. May take arbitrarily long, may fail.
	fn tags_in_background(&self, data: &Self::Data, span: &SnapshotSpan, cancel: &GenerationToken) -> Result<Vec<TagSpan<Self::Tag>>, SourceError>;
}
