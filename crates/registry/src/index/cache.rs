use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use ows_codec::Key;
use parking_lot::Mutex;

/// Memoized lookup outcomes. `None` records a query no codec answers.
pub(super) struct LookupCache {
	entries: Mutex<LruCache<Key, Option<usize>>>,
	hits: AtomicU64,
	misses: AtomicU64,
}

/// Counters of one registry's memo cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
	pub hits: u64,
	pub misses: u64,
	pub entries: usize,
	pub capacity: usize,
}

impl LookupCache {
	pub(super) fn new(capacity: usize) -> Self {
		let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
		Self {
			entries: Mutex::new(LruCache::new(capacity)),
			hits: AtomicU64::new(0),
			misses: AtomicU64::new(0),
		}
	}

	/// Outer `None` means the query was never resolved.
	pub(super) fn get(&self, key: &Key) -> Option<Option<usize>> {
		let cached = self.entries.lock().get(key).copied();
		let counter = if cached.is_some() { &self.hits } else { &self.misses };
		counter.fetch_add(1, Ordering::Relaxed);
		cached
	}

	pub(super) fn put(&self, key: Key, slot: Option<usize>) {
		self.entries.lock().put(key, slot);
	}

	pub(super) fn stats(&self) -> CacheStats {
		let entries = self.entries.lock();
		CacheStats {
			hits: self.hits.load(Ordering::Relaxed),
			misses: self.misses.load(Ordering::Relaxed),
			entries: entries.len(),
			capacity: entries.cap().get(),
		}
	}
}
