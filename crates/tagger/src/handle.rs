use tagline_primitives::SnapshotSpan;
use tokio::sync::mpsc;

/// External event delivered to a tagger through its [`TaggerHandle`].
#[derive(Debug, Clone)]
pub(crate) enum Signal {
	/// The source's underlying data went stale.
	Changed,
	/// The consumer's visible region moved.
	Visible(SnapshotSpan),
}

/// Cloneable, thread-safe sender for source and layout events.
///
/// Events are applied the next time the owning context pumps the tagger.
/// Once the tagger is disposed, sends are silently dropped.
#[derive(Debug, Clone)]
pub struct TaggerHandle {
	tx: mpsc::UnboundedSender<Signal>,
}

impl TaggerHandle {
	pub(crate) fn new(tx: mpsc::UnboundedSender<Signal>) -> Self {
		Self { tx }
	}

	/// Reports that the source's data changed and every cached tag is suspect.
	pub fn notify_changed(&self) {
		let _ = self.tx.send(Signal::Changed);
	}

	/// Reports the region the consumer currently shows.
	pub fn notify_visible(&self, span: SnapshotSpan) {
		let _ = self.tx.send(Signal::Visible(span));
	}

	/// Returns true once the tagger stopped listening.
	pub fn is_closed(&self) -> bool {
		self.tx.is_closed()
	}
}
