//! Reference-counted shared instances.
//!
//! Several consumers of one buffer usually want one tagger between them.
//! [`SharedTaggers`] hands out [`Lease`]s keyed by an identity; the value is
//! created on first acquire and dropped when the last lease goes away.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

struct Slot<V> {
	value: Arc<Mutex<V>>,
	count: usize,
}

type Slots<K, V> = Arc<Mutex<HashMap<K, Slot<V>>>>;

/// Registry of shared values keyed by identity.
pub struct SharedTaggers<K, V> {
	slots: Slots<K, V>,
}

impl<K, V> Clone for SharedTaggers<K, V> {
	fn clone(&self) -> Self {
		Self {
			slots: Arc::clone(&self.slots),
		}
	}
}

impl<K, V> Default for SharedTaggers<K, V> {
	fn default() -> Self {
		Self {
			slots: Arc::new(Mutex::new(HashMap::new())),
		}
	}
}

impl<K: Eq + Hash + Clone, V> SharedTaggers<K, V> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a lease on the value for `key`, creating it with `make` if absent.
	pub fn acquire(&self, key: K, make: impl FnOnce() -> V) -> Lease<K, V> {
		let mut slots = self.slots.lock();
		let slot = slots.entry(key.clone()).or_insert_with(|| Slot {
			value: Arc::new(Mutex::new(make())),
			count: 0,
		});
		slot.count += 1;
		let value = Arc::clone(&slot.value);
		tracing::trace!(refs = slot.count, "shared_taggers.acquire");
		Lease {
			key: Some(key),
			value,
			slots: Arc::clone(&self.slots),
		}
	}

	/// Number of leases currently held for `key`.
	pub fn ref_count(&self, key: &K) -> usize {
		self.slots.lock().get(key).map_or(0, |s| s.count)
	}

	pub fn len(&self) -> usize {
		self.slots.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.lock().is_empty()
	}
}

/// A counted reference to a shared value. Releases on drop.
pub struct Lease<K: Eq + Hash, V> {
	key: Option<K>,
	value: Arc<Mutex<V>>,
	slots: Slots<K, V>,
}

impl<K: Eq + Hash, V> Lease<K, V> {
	pub fn lock(&self) -> MutexGuard<'_, V> {
		self.value.lock()
	}

	pub fn value(&self) -> &Arc<Mutex<V>> {
		&self.value
	}
}

impl<K: Eq + Hash, V> Drop for Lease<K, V> {
	fn drop(&mut self) {
		let Some(key) = self.key.take() else {
			return;
		};
		let released = {
			let mut slots = self.slots.lock();
			match slots.get_mut(&key) {
				Some(slot) if slot.count > 1 => {
					slot.count -= 1;
					None
				}
				Some(_) => slots.remove(&key),
				None => None,
			}
		};
		// Dropped outside the registry lock.
		if released.is_some() {
			tracing::trace!("shared_taggers.release_last");
		}
		drop(released);
	}
}
