use std::sync::Arc;

use ows_codec::key::best_distance;
use ows_codec::{CompositeKey, Key};

use super::CodecIndex;
use super::resolve::{self, Candidate};
use crate::discovery::CodecFamily;

impl<C: CodecFamily + ?Sized> CodecIndex<C> {
	/// Most specific codec compatible with `key`.
	///
	/// Composite keys are delegated to [`Self::lookup_composite`].
	pub fn lookup(&self, key: &Key) -> Option<Arc<C>> {
		if let Key::Composite(composite) = key {
			return self.lookup_composite(composite);
		}
		let slot = self.memoized(key, || {
			let exact = self.by_key.get(key).and_then(|slots| slots.first()).copied();
			self.resolve(key, exact, |declared| best_distance(declared, key))
		});
		slot.map(|slot| Arc::clone(&self.codecs[slot]))
	}

	/// Most specific codec whose declared keys cover every member of `composite`.
	///
	/// A codec is also a candidate when it declares a composite key compatible
	/// with the query as a whole.
	pub fn lookup_composite(&self, composite: &CompositeKey) -> Option<Arc<C>> {
		let whole = Key::Composite(composite.clone());
		let slot = self.memoized(&whole, || self.resolve(&whole, None, |declared| composite_distance(composite, &whole, declared)));
		slot.map(|slot| Arc::clone(&self.codecs[slot]))
	}

	/// Every codec compatible with `key`, most specific first. Not memoized.
	pub fn lookup_all(&self, key: &Key) -> Vec<Arc<C>> {
		let mut candidates = match key {
			Key::Composite(composite) => self.candidates(|declared| composite_distance(composite, key, declared)),
			_ => self.candidates(|declared| best_distance(declared, key)),
		};
		resolve::rank(&mut candidates);
		candidates.into_iter().map(|candidate| Arc::clone(&self.codecs[candidate.slot])).collect()
	}

	fn memoized(&self, key: &Key, compute: impl FnOnce() -> Option<usize>) -> Option<usize> {
		if let Some(cached) = self.cache.get(key) {
			return cached;
		}
		let slot = compute();
		self.cache.put(key.clone(), slot);
		slot
	}

	fn candidates(&self, distance: impl Fn(&[Key]) -> Option<u32>) -> Vec<Candidate> {
		self.codecs
			.iter()
			.enumerate()
			.filter_map(|(slot, codec)| distance(codec.keys()).map(|distance| Candidate { slot, distance }))
			.collect()
	}

	/// Picks the winner among all compatible codecs. `exact` is the first codec
	/// declaring `key` itself and wins outright when present.
	fn resolve(&self, key: &Key, exact: Option<usize>, distance: impl Fn(&[Key]) -> Option<u32>) -> Option<usize> {
		let candidates = self.candidates(distance);
		let winner = match exact {
			Some(slot) => Candidate { slot, distance: 0 },
			None => resolve::choose_winner(&candidates)?,
		};
		if candidates.len() > 1 {
			let names: Vec<&str> = candidates.iter().map(|candidate| self.codecs[candidate.slot].name()).collect();
			tracing::debug!(
				registry = self.label,
				key = %key,
				candidates = ?names,
				winner = self.codecs[winner.slot].name(),
				distance = winner.distance,
				"resolved ambiguous lookup"
			);
		}
		Some(winner.slot)
	}
}

fn composite_distance(composite: &CompositeKey, whole: &Key, declared: &[Key]) -> Option<u32> {
	let spread = composite.distance(declared);
	let direct = best_distance(declared, whole);
	match (spread, direct) {
		(Some(spread), Some(direct)) => Some(spread.min(direct)),
		(spread, direct) => spread.or(direct),
	}
}
