use ropey::Rope;

use super::types::{Bias, Insertion, Operation};
use crate::span::{CharIdx, CharLen};

/// A sequence of operations describing how one document revision becomes the next.
///
/// Positions are retained, deleted, or inserted in order. Mark-only steps
/// produce an identity changeset; replace steps delete and insert. The
/// representation supports composition across the steps of a transaction and
/// mapping positions from the old coordinate space to the new one.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
	/// Sequence of retain/delete/insert operations.
	pub(super) changes: Vec<Operation>,
	/// Length of the source document before changes.
	pub(super) len: usize,
	/// Length of the document after applying changes.
	pub(super) len_after: usize,
}

impl ChangeSet {
	/// Creates a changeset that leaves a document of `len` positions untouched.
	pub fn identity(len: CharLen) -> Self {
		let mut cs = Self::default();
		cs.retain(len);
		cs
	}

	/// Creates the changeset for replacing `[from, to)` of a `len`-position
	/// document with content whose projection is `text`.
	pub(crate) fn replace(len: CharLen, from: CharIdx, to: CharIdx, text: String) -> Self {
		let mut cs = Self::default();
		cs.retain(from);
		cs.delete(to - from);
		cs.insert(text);
		cs.retain(len - to);
		cs
	}

	/// Returns the length of the source document (before changes).
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns the length of the document after applying changes.
	pub fn len_after(&self) -> usize {
		self.len_after
	}

	/// Returns true if this changeset contains no operations.
	pub fn is_empty(&self) -> bool {
		self.changes.is_empty()
	}

	/// Returns true if applying this changeset moves no position.
	pub fn is_identity(&self) -> bool {
		self.changes.iter().all(|op| matches!(op, Operation::Retain(_)))
	}

	/// Returns a slice of all operations in this changeset.
	pub fn changes(&self) -> &[Operation] {
		&self.changes
	}

	/// Adds a retain operation, preserving N positions from the source.
	///
	/// Consecutive retain operations are automatically merged for efficiency.
	pub(crate) fn retain(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}

		self.len += n;
		self.len_after += n;

		if let Some(Operation::Retain(count)) = self.changes.last_mut() {
			*count += n;
		} else {
			self.changes.push(Operation::Retain(n));
		}
	}

	/// Adds a delete operation, removing N positions from the source.
	///
	/// Consecutive delete operations are automatically merged for efficiency.
	pub(crate) fn delete(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}

		self.len += n;

		if let Some(Operation::Delete(count)) = self.changes.last_mut() {
			*count += n;
		} else {
			self.changes.push(Operation::Delete(n));
		}
	}

	/// Adds an insert operation, inserting content at the current position.
	///
	/// Insert operations are merged with adjacent inserts when possible. The insertion
	/// order relative to deletes is preserved to maintain correct semantics.
	pub(crate) fn insert(&mut self, text: String) {
		if text.is_empty() {
			return;
		}

		let ins = Insertion::new(text);
		self.len_after += ins.char_len;

		match self.changes.as_mut_slice() {
			[.., Operation::Insert(prev)] | [.., Operation::Insert(prev), Operation::Delete(_)] => {
				prev.text.push_str(&ins.text);
				prev.char_len += ins.char_len;
			}
			[.., last @ Operation::Delete(_)] => {
				let del = std::mem::replace(last, Operation::Insert(ins));
				self.changes.push(del);
			}
			_ => {
				self.changes.push(Operation::Insert(ins));
			}
		}
	}

	/// Applies this changeset to a document projection, modifying it in place.
	pub fn apply(&self, text: &mut Rope) {
		if self.changes.is_empty() {
			return;
		}

		let mut pos = 0;
		for op in &self.changes {
			match op {
				Operation::Retain(n) => {
					pos += n;
				}
				Operation::Delete(n) => {
					text.remove(pos..pos + n);
				}
				Operation::Insert(ins) => {
					text.insert(pos, &ins.text);
					pos += ins.char_len;
				}
			}
		}
	}

	/// Maps a position through this changeset using the specified bias.
	///
	/// Positions inside a deleted range collapse to the deletion point.
	pub fn map_pos(&self, pos: CharIdx, bias: Bias) -> CharIdx {
		let mut old_pos = 0;
		let mut new_pos = 0;

		for op in &self.changes {
			if old_pos > pos {
				break;
			}

			match op {
				Operation::Retain(n) => {
					if old_pos + n > pos {
						return new_pos + (pos - old_pos);
					}
					old_pos += n;
					new_pos += n;
				}
				Operation::Delete(n) => {
					if old_pos + n > pos {
						return new_pos;
					}
					old_pos += n;
				}
				Operation::Insert(ins) => {
					if old_pos == pos && bias == Bias::Left {
						// Position is exactly at insert point, stay before
					} else {
						new_pos += ins.char_len;
					}
				}
			}
		}

		new_pos + (pos - old_pos)
	}

	/// Composes two changesets into a single equivalent changeset.
	///
	/// The result is equivalent to applying `self` then `other`.
	///
	/// # Debug Assertions
	/// Asserts that `self.len_after == other.len` (the changesets must be compatible).
	pub fn compose(self, other: ChangeSet) -> ChangeSet {
		debug_assert_eq!(self.len_after, other.len);

		let (len, len_after) = (self.len, other.len_after);
		let mut result = ChangeSet::default();

		let mut a_iter = self.changes.into_iter();
		let mut b_iter = other.changes.into_iter();
		let mut a = a_iter.next();
		let mut b = b_iter.next();

		loop {
			match (a.take(), b.take()) {
				(None, None) => break,
				// Deletions in `self` are invisible to `other`.
				(Some(Operation::Delete(n)), b_op) => {
					result.delete(n);
					a = a_iter.next();
					b = b_op;
				}
				// Insertions in `other` consume nothing from `self`.
				(a_op, Some(Operation::Insert(ins))) => {
					result.insert(ins.text);
					a = a_op;
					b = b_iter.next();
				}
				(Some(Operation::Retain(n)), Some(Operation::Retain(m))) => {
					let step = n.min(m);
					result.retain(step);
					a = rest(Operation::Retain(n - step)).or_else(|| a_iter.next());
					b = rest(Operation::Retain(m - step)).or_else(|| b_iter.next());
				}
				(Some(Operation::Retain(n)), Some(Operation::Delete(m))) => {
					let step = n.min(m);
					result.delete(step);
					a = rest(Operation::Retain(n - step)).or_else(|| a_iter.next());
					b = rest(Operation::Delete(m - step)).or_else(|| b_iter.next());
				}
				(Some(Operation::Insert(ins)), Some(Operation::Retain(m))) => {
					let step = ins.char_len.min(m);
					let (head, tail) = ins.split_at(step);
					result.insert(head);
					a = rest(Operation::Insert(tail)).or_else(|| a_iter.next());
					b = rest(Operation::Retain(m - step)).or_else(|| b_iter.next());
				}
				(Some(Operation::Insert(ins)), Some(Operation::Delete(m))) => {
					let step = ins.char_len.min(m);
					let (_, tail) = ins.split_at(step);
					a = rest(Operation::Insert(tail)).or_else(|| a_iter.next());
					b = rest(Operation::Delete(m - step)).or_else(|| b_iter.next());
				}
				(a_op, b_op) => {
					debug_assert!(false, "mismatched changeset lengths: {a_op:?} / {b_op:?}");
					break;
				}
			}
		}

		debug_assert_eq!(result.len, len);
		debug_assert_eq!(result.len_after, len_after);
		result
	}
}

/// Returns the operation if it still covers any positions.
fn rest(op: Operation) -> Option<Operation> {
	match &op {
		Operation::Retain(0) | Operation::Delete(0) => None,
		Operation::Insert(ins) if ins.char_len == 0 => None,
		_ => Some(op),
	}
}
