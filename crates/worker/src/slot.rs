use std::sync::Arc;

use parking_lot::Mutex;

/// Thread-safe single-slot queue where the newest value always wins.
///
/// This is the blocking-thread counterpart of a `LatestWins` mailbox: the
/// owner puts values, a worker takes them, and an unconsumed value is
/// replaced rather than queued behind.
#[derive(Debug)]
pub struct LatestSlot<T> {
	inner: Arc<Mutex<Option<T>>>,
}

impl<T> Clone for LatestSlot<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T> Default for LatestSlot<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> LatestSlot<T> {
	pub fn new() -> Self {
		Self {
			inner: Arc::new(Mutex::new(None)),
		}
	}

	/// Stores `value`, returning true if an unconsumed value was replaced.
	pub fn put(&self, value: T) -> bool {
		self.inner.lock().replace(value).is_some()
	}

	/// Removes and returns the current value.
	pub fn take(&self) -> Option<T> {
		self.inner.lock().take()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.lock().is_none()
	}
}

impl<T: Clone> LatestSlot<T> {
	/// Returns a copy of the current value without consuming it.
	pub fn peek(&self) -> Option<T> {
		self.inner.lock().clone()
	}
}
