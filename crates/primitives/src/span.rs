/// A position in the document, measured in characters (not bytes).
///
/// Every text character, every atomic node, and every boundary between two
/// consecutive blocks occupies exactly one position. This is the canonical
/// coordinate space for anchors.
pub type CharIdx = usize;

/// A length or count in the document, measured in characters (not bytes).
///
/// This is distinct from CharIdx to avoid accidentally passing an index
/// where a length is expected or vice versa.
pub type CharLen = usize;

/// A half-open range `[from, to)` of document positions.
///
/// Spans are only meaningful against the document revision they were computed
/// from. They are never persisted; anchors are re-derived from marks on every
/// revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Span {
	/// Inclusive start position.
	pub from: CharIdx,
	/// Exclusive end position.
	pub to: CharIdx,
}

impl Span {
	/// Creates a span covering both positions, in whichever order they are given.
	pub fn new(a: CharIdx, b: CharIdx) -> Self {
		Self {
			from: a.min(b),
			to: a.max(b),
		}
	}

	/// Creates a zero-width span at the given position.
	pub fn point(pos: CharIdx) -> Self {
		Self::new(pos, pos)
	}

	/// Returns the number of positions covered.
	#[inline]
	pub fn len(&self) -> CharLen {
		self.to - self.from
	}

	/// Returns true if the span is degenerate (`from == to`).
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.from == self.to
	}

	/// Returns true if the position is within the span (exclusive of `to`).
	pub fn contains(&self, pos: CharIdx) -> bool {
		pos >= self.from && pos < self.to
	}

	/// Returns true if this span overlaps with another.
	pub fn overlaps(&self, other: &Span) -> bool {
		self.from < other.to && other.from < self.to
	}

	/// Returns the smallest span covering both spans.
	pub fn union(&self, other: &Span) -> Self {
		Self {
			from: self.from.min(other.from),
			to: self.to.max(other.to),
		}
	}

	/// Clamps both ends to `[0, max]`.
	pub fn clamp_to(&self, max: CharIdx) -> Self {
		Self {
			from: self.from.min(max),
			to: self.to.min(max),
		}
	}

	/// Applies a function to both ends, restoring `from <= to` afterwards.
	pub fn map(self, mut f: impl FnMut(CharIdx) -> CharIdx) -> Self {
		Self::new(f(self.from), f(self.to))
	}
}

impl From<std::ops::Range<CharIdx>> for Span {
	fn from(range: std::ops::Range<CharIdx>) -> Self {
		Self::new(range.start, range.end)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_span_basics() {
		let s = Span::new(10, 5);
		assert_eq!(s.from, 5);
		assert_eq!(s.to, 10);
		assert_eq!(s.len(), 5);
		assert!(!s.is_empty());
		assert!(Span::point(3).is_empty());
	}

	#[test]
	fn test_span_contains() {
		let s = Span::new(5, 10);
		assert!(!s.contains(4));
		assert!(s.contains(5));
		assert!(s.contains(9));
		assert!(!s.contains(10));
	}

	#[test]
	fn test_span_overlap_and_union() {
		let a = Span::new(0, 5);
		let b = Span::new(4, 8);
		let c = Span::new(5, 8);
		assert!(a.overlaps(&b));
		assert!(!a.overlaps(&c));
		assert_eq!(a.union(&c), Span::new(0, 8));
	}

	#[test]
	fn test_span_clamp_to() {
		assert_eq!(Span::new(3, 9).clamp_to(5), Span::new(3, 5));
		assert_eq!(Span::new(7, 9).clamp_to(5), Span::point(5));
	}

	#[test]
	fn test_span_map_restores_order() {
		let s = Span::new(2, 6).map(|p| 10 - p);
		assert_eq!(s, Span::new(4, 8));
	}
}
