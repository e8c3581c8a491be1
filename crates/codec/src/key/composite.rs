use std::fmt;
use std::sync::Arc;

use super::Key;

/// Ordered aggregate of keys for multi-criterion dispatch.
///
/// Member order only affects equality and hashing (and therefore cache slots);
/// matching and distance are computed per member and are order independent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey {
	members: Arc<[Key]>,
}

impl CompositeKey {
	pub fn new(members: impl IntoIterator<Item = Key>) -> Self {
		Self {
			members: members.into_iter().collect(),
		}
	}

	pub fn members(&self) -> &[Key] {
		&self.members
	}

	pub fn len(&self) -> usize {
		self.members.len()
	}

	pub fn is_empty(&self) -> bool {
		self.members.is_empty()
	}

	/// True iff every member has at least one candidate at non-negative similarity.
	pub fn matches(&self, candidates: &[Key]) -> bool {
		self.distance(candidates).is_some()
	}

	/// Sum over members of the best candidate distance, or `None` when some
	/// member matches no candidate.
	pub fn distance(&self, candidates: &[Key]) -> Option<u32> {
		self.members.iter().try_fold(0u32, |total, member| {
			let best = best_distance(candidates, member)?;
			Some(total.saturating_add(best))
		})
	}
}

/// Smallest non-negative similarity of any declared key to `query`.
pub fn best_distance(declared: &[Key], query: &Key) -> Option<u32> {
	declared
		.iter()
		.filter_map(|key| u32::try_from(key.similarity(query)).ok())
		.min()
}

impl FromIterator<Key> for CompositeKey {
	fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
		Self::new(iter)
	}
}

impl fmt::Display for CompositeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("(")?;
		for (i, member) in self.members.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{member}")?;
		}
		f.write_str(")")
	}
}
