//! Error types for step application.

use thiserror::Error;

use crate::span::{CharIdx, CharLen};

/// Errors produced when a step cannot be applied to a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
	/// The step addresses positions outside the document.
	#[error("range {from}..{to} is out of bounds for document of length {len}")]
	OutOfBounds {
		/// Start of the offending range.
		from: CharIdx,
		/// End of the offending range.
		to: CharIdx,
		/// Length of the document the step was applied to.
		len: CharLen,
	},

	/// An atom attribute step targets a position that holds no atomic node.
	#[error("no atomic node at position {pos}")]
	NotAnAtom {
		/// The offending position.
		pos: CharIdx,
	},
}
