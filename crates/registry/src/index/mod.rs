//! Per-generation codec index.
//!
//! # Purpose
//!
//! A [`CodecIndex`] holds one immutable set of codecs of a single family
//! (encoders or decoders), the static `Key -> slots` map built from their
//! declared keys, and a bounded memo cache for similarity lookups.
//!
//! # Mental Model
//!
//! 1. **Build:** codecs arrive in discovery order; the slot of a codec is its
//!    position in that order. Every declared key is bound to every codec that
//!    declares it; keys declared by several codecs are kept as [`KeyCollision`]
//!    diagnostics.
//! 2. **Exact hit:** a non-composite query equal to a declared key resolves to the
//!    lowest slot bound to it. Equal keys are the only pairs at distance zero, so
//!    no other codec can be more specific.
//! 3. **Scan:** otherwise every codec is a candidate when one of its keys is
//!    compatible with the query. The resolver picks the smallest distance, ties
//!    going to the lower slot.
//! 4. **Memoize:** the outcome, including "no codec", is stored in the LRU cache.
//!
//! # Concurrency
//!
//! - The codec list and static map are read without locks.
//! - The scan runs outside the cache lock; only the LRU get and put take it.
//!   Racing scans for one key compute the same answer, so the second insert is a
//!   no-op in effect.
//!
//! # Invariants
//!
//! - Every codec declaring key K is bound under K.
//!   - Enforced in: [`CodecIndex::build`].
//!   - Tested by: `index::tests::every_declaring_codec_is_bound`
//! - The cache never yields a slot outside this index's codec list. The cache is
//!   owned by the index and dropped with it when a reload publishes a new generation.
//!   - Tested by: `reload::excluded_codec_is_never_returned_after_reload`
//! - Winners are deterministic: (distance, slot) ordering.
//!   - Enforced in: [`resolve::choose_winner`].
//!   - Tested by: `index::tests::closer_match_wins`, `index::tests::ties_go_to_discovery_order`

mod build;
mod cache;
mod lookup;
mod resolve;


use std::sync::Arc;

pub use build::KeyCollision;
pub use cache::CacheStats;
use cache::LookupCache;
use ows_codec::Key;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Immutable codec set of one family with its static key map and memo cache.
pub struct CodecIndex<C: ?Sized> {
	label: &'static str,
	codecs: Vec<Arc<C>>,
	by_key: FxHashMap<Key, SmallVec<[usize; 2]>>,
	collisions: Vec<KeyCollision>,
	cache: LookupCache,
}

impl<C: ?Sized> CodecIndex<C> {
	/// Codecs in discovery order.
	pub fn codecs(&self) -> &[Arc<C>] {
		&self.codecs
	}

	pub fn get(&self, slot: usize) -> Option<&Arc<C>> {
		self.codecs.get(slot)
	}

	pub fn len(&self) -> usize {
		self.codecs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.codecs.is_empty()
	}

	pub fn label(&self) -> &'static str {
		self.label
	}

	/// Keys declared by more than one codec.
	pub fn collisions(&self) -> &[KeyCollision] {
		&self.collisions
	}

	/// Every declared key, sorted.
	pub fn keys(&self) -> Vec<Key> {
		let mut keys: Vec<Key> = self.by_key.keys().cloned().collect();
		keys.sort();
		keys
	}

	/// Codecs declaring exactly `key`, in discovery order.
	pub fn codecs_for(&self, key: &Key) -> Vec<Arc<C>> {
		self.by_key
			.get(key)
			.map(|slots| slots.iter().map(|&slot| Arc::clone(&self.codecs[slot])).collect())
			.unwrap_or_default()
	}

	pub fn cache_stats(&self) -> CacheStats {
		self.cache.stats()
	}
}

impl<C: ?Sized> std::fmt::Debug for CodecIndex<C> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CodecIndex")
			.field("label", &self.label)
			.field("codecs", &self.codecs.len())
			.field("keys", &self.by_key.len())
			.field("collisions", &self.collisions.len())
			.finish()
	}
}
