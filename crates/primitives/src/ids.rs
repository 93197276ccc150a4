use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of an annotation thread.
///
/// The same id appears in the document (as a comment mark or an atomic node
/// attribute) and in the thread's root comment record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
	/// Wraps an existing identifier.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// Generates a fresh random identifier.
	pub fn generate() -> Self {
		Self(uuid::Uuid::new_v4().to_string())
	}

	/// Returns the identifier as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ThreadId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for ThreadId {
	fn from(s: &str) -> Self {
		Self::new(s)
	}
}

/// Identity of a single comment record (root or reply).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(String);

impl CommentId {
	/// Wraps an existing identifier.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// Generates a fresh random identifier.
	pub fn generate() -> Self {
		Self(uuid::Uuid::new_v4().to_string())
	}

	/// Returns the identifier as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for CommentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for CommentId {
	fn from(s: &str) -> Self {
		Self::new(s)
	}
}
