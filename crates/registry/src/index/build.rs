use std::sync::Arc;

use ows_codec::Key;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::CodecIndex;
use super::cache::LookupCache;
use crate::discovery::CodecFamily;

/// A key declared by several codecs of one registry.
///
/// Not an error: lookups of the key resolve to the first declaring codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCollision {
	pub registry: &'static str,
	pub key: Key,
	/// Names of the declaring codecs in discovery order.
	pub codecs: Vec<String>,
}

impl<C: CodecFamily + ?Sized> CodecIndex<C> {
	/// Indexes `codecs`, whose order is the discovery order.
	pub fn build(codecs: Vec<Arc<C>>, cache_capacity: usize) -> Self {
		let mut by_key: FxHashMap<Key, SmallVec<[usize; 2]>> = FxHashMap::default();
		for (slot, codec) in codecs.iter().enumerate() {
			for key in codec.keys() {
				let slots = by_key.entry(key.clone()).or_default();
				if slots.last() != Some(&slot) {
					slots.push(slot);
				}
			}
		}

		let mut collisions: Vec<KeyCollision> = by_key
			.iter()
			.filter(|(_, slots)| slots.len() > 1)
			.map(|(key, slots)| KeyCollision {
				registry: C::LABEL,
				key: key.clone(),
				codecs: slots.iter().map(|&slot| codecs[slot].name().to_string()).collect(),
			})
			.collect();
		collisions.sort_by(|a, b| a.key.cmp(&b.key));

		for collision in &collisions {
			tracing::debug!(
				registry = C::LABEL,
				key = %collision.key,
				codecs = ?collision.codecs,
				"key declared by several codecs"
			);
		}

		Self {
			label: C::LABEL,
			codecs,
			by_key,
			collisions,
			cache: LookupCache::new(cache_capacity),
		}
	}
}
