//! Position context fingerprints.
//!
//! A [`PositionContext`] records the text immediately around an anchor so a
//! later recovery can tell repeated occurrences of the same text apart. It is
//! a similarity signal only, never ground truth.

use anchorage_primitives::{CharIdx, Document};
use serde::{Deserialize, Serialize};

/// Text surrounding an anchor at capture time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionContext {
	/// Up to `radius` characters immediately before the anchor.
	pub text_before: String,
	/// Up to `radius` characters immediately after the anchor.
	pub text_after: String,
	/// Index of the block containing the anchor start.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub block_index: Option<usize>,
	/// Character offset of the anchor start within its block.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub offset_in_block: Option<usize>,
}

impl PositionContext {
	/// Creates a context without block information.
	pub fn new(text_before: impl Into<String>, text_after: impl Into<String>) -> Self {
		Self {
			text_before: text_before.into(),
			text_after: text_after.into(),
			block_index: None,
			offset_in_block: None,
		}
	}

	/// Returns the context with its block index set.
	pub fn in_block(mut self, block_index: usize) -> Self {
		self.block_index = Some(block_index);
		self
	}

	/// Returns the context with its in-block offset set.
	pub fn with_offset(mut self, offset_in_block: usize) -> Self {
		self.offset_in_block = Some(offset_in_block);
		self
	}
}

/// Captures the context around `[from, to)`.
///
/// Out-of-range positions are clamped; near the document edges the captured
/// text is simply shorter.
pub fn capture_context(doc: &Document, from: CharIdx, to: CharIdx, radius: usize) -> PositionContext {
	let len = doc.len();
	let from = from.min(len);
	let to = to.clamp(from, len);
	let text = doc.projection();

	let text_before = text.slice(from.saturating_sub(radius)..from).to_string();
	let text_after = text.slice(to..(to + radius).min(len)).to_string();

	let block_index = doc.block_index_at(from);
	let offset_in_block = doc.block_start(block_index).map(|start| from - start);

	PositionContext {
		text_before,
		text_after,
		block_index: Some(block_index),
		offset_in_block,
	}
}
