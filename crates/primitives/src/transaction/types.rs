use crate::span::CharLen;

/// Bias determines how positions at change boundaries are mapped.
///
/// When mapping a position through a change, bias determines whether the position
/// moves with insertions or stays before them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
	/// Position stays before insertions at the same location.
	Left,
	/// Position moves after insertions at the same location.
	Right,
}

/// An insertion with cached character length.
///
/// The text is the projection of the inserted content, so applying a
/// changeset to a document's projection yields the new projection.
///
/// Storing the character count avoids repeated O(n) `.chars().count()` calls
/// in `map_pos()` and `compose()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
	pub(super) text: String,
	pub(super) char_len: CharLen,
}

impl Insertion {
	/// Creates a new insertion, computing the character length once.
	#[inline]
	pub fn new(text: String) -> Self {
		let char_len = text.chars().count();
		Self { text, char_len }
	}

	/// Creates an insertion from a substring with pre-computed length.
	///
	/// # Debug Assertions
	/// In debug builds, asserts that `char_len` matches the actual character count.
	#[inline]
	pub fn from_chars(text: String, char_len: CharLen) -> Self {
		debug_assert_eq!(text.chars().count(), char_len);
		Self { text, char_len }
	}

	/// Returns the inserted text.
	#[inline]
	pub fn text(&self) -> &str {
		&self.text
	}

	/// Returns the cached character length.
	#[inline]
	pub fn char_len(&self) -> CharLen {
		self.char_len
	}

	/// Splits off the first `n` characters.
	///
	/// Returns the prefix text and the remaining insertion.
	pub(super) fn split_at(self, n: CharLen) -> (String, Insertion) {
		debug_assert!(n <= self.char_len);
		let prefix: String = self.text.chars().take(n).collect();
		let suffix: String = self.text.chars().skip(n).collect();
		let suffix_ins = Insertion::from_chars(suffix, self.char_len - n);
		(prefix, suffix_ins)
	}
}

/// A single operation in a changeset.
///
/// Operations are the atomic units that make up a `ChangeSet`: retaining
/// existing positions, deleting positions, or inserting new content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
	/// Retain the next N positions from the source document.
	Retain(CharLen),
	/// Delete the next N positions from the source document.
	Delete(CharLen),
	/// Insert new content at the current position.
	Insert(Insertion),
}
