use smallvec::SmallVec;

use crate::ids::ThreadId;

/// An inline mark carried by text characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mark {
	/// Binds the character to a comment thread.
	Comment(ThreadId),
	/// Any other inline formatting, identified by name (`bold`, `link`, ...).
	Style(String),
}

impl Mark {
	/// Returns the thread id if this is a comment mark.
	pub fn thread(&self) -> Option<&ThreadId> {
		match self {
			Mark::Comment(id) => Some(id),
			Mark::Style(_) => None,
		}
	}

	/// Returns the schema name of this mark's type.
	pub fn type_name(&self) -> &str {
		match self {
			Mark::Comment(_) => crate::schema::COMMENT_MARK,
			Mark::Style(name) => name,
		}
	}
}

/// A sorted, deduplicated set of marks.
///
/// Most characters carry zero or one mark, so the set stays inline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MarkSet(SmallVec<[Mark; 2]>);

impl MarkSet {
	/// Creates an empty mark set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns true if the set holds no marks.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns the number of marks.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if the mark is present.
	pub fn contains(&self, mark: &Mark) -> bool {
		self.0.binary_search(mark).is_ok()
	}

	/// Inserts a mark, returning false if it was already present.
	pub fn insert(&mut self, mark: Mark) -> bool {
		match self.0.binary_search(&mark) {
			Ok(_) => false,
			Err(idx) => {
				self.0.insert(idx, mark);
				true
			}
		}
	}

	/// Removes a mark, returning false if it was not present.
	pub fn remove(&mut self, mark: &Mark) -> bool {
		match self.0.binary_search(mark) {
			Ok(idx) => {
				self.0.remove(idx);
				true
			}
			Err(_) => false,
		}
	}

	/// Iterates marks in sorted order.
	pub fn iter(&self) -> impl Iterator<Item = &Mark> {
		self.0.iter()
	}

	/// Iterates the threads of all comment marks in the set.
	pub fn threads(&self) -> impl Iterator<Item = &ThreadId> {
		self.0.iter().filter_map(Mark::thread)
	}

	/// Returns true if the set carries a comment mark for `thread`.
	pub fn has_thread(&self, thread: &ThreadId) -> bool {
		self.threads().any(|t| t == thread)
	}

	/// Returns a copy of the set with every comment mark removed.
	pub fn without_comments(&self) -> Self {
		Self(self.0.iter().filter(|m| m.thread().is_none()).cloned().collect())
	}
}

impl FromIterator<Mark> for MarkSet {
	fn from_iter<I: IntoIterator<Item = Mark>>(iter: I) -> Self {
		let mut set = Self::new();
		for mark in iter {
			set.insert(mark);
		}
		set
	}
}
