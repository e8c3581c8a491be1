//! Ambiguity resolution between compatible codecs.

/// A compatible codec and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
	pub slot: usize,
	pub distance: u32,
}

impl Candidate {
	fn rank(&self) -> (u32, usize) {
		(self.distance, self.slot)
	}
}

/// Smallest distance wins; equal distances go to the codec discovered first.
pub(crate) fn choose_winner(candidates: &[Candidate]) -> Option<Candidate> {
	candidates.iter().copied().min_by_key(Candidate::rank)
}

/// Orders `candidates` from most to least specific.
pub(crate) fn rank(candidates: &mut [Candidate]) {
	candidates.sort_by_key(Candidate::rank);
}
