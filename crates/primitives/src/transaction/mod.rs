//! Steps, changesets, and transactions.
//!
//! A [`Transaction`] is built against a base [`Document`] by applying
//! [`Step`]s one at a time. It keeps every intermediate snapshot, the
//! per-step [`ChangeSet`]s, and their composition, so consumers can inspect
//! the document before any step and map positions from any step onwards into
//! the final revision.

mod changeset;
mod step;
mod types;


pub use changeset::ChangeSet;
pub use step::Step;
pub use types::{Bias, Insertion, Operation};

use crate::document::Document;
use crate::error::DocumentError;
use crate::ids::ThreadId;
use crate::mark::Mark;
use crate::node::Slice;
use crate::span::CharIdx;

/// Where a transaction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Origin {
	/// Produced by this client's user.
	#[default]
	Local,
	/// Merged in from another collaborator.
	Remote,
}

/// Metadata attached to a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TxMeta {
	/// Where the transaction came from.
	pub origin: Origin,
	/// The transaction inserts pasted, externally sourced content.
	pub paste: bool,
	/// The transaction is an undo or redo.
	pub history: bool,
	/// The transaction was emitted by the anchor engine as a fix-up.
	pub corrective: bool,
}

impl TxMeta {
	/// Metadata for a transaction merged in from a collaborator.
	pub fn remote() -> Self {
		Self {
			origin: Origin::Remote,
			..Self::default()
		}
	}

	/// Metadata for a local paste.
	pub fn paste() -> Self {
		Self {
			paste: true,
			..Self::default()
		}
	}

	/// Metadata for a local undo or redo.
	pub fn history() -> Self {
		Self {
			history: true,
			..Self::default()
		}
	}

	/// Metadata for an engine fix-up.
	pub fn corrective() -> Self {
		Self {
			corrective: true,
			..Self::default()
		}
	}
}

/// An ordered group of steps applied to a document as one revision.
#[derive(Debug, Clone)]
pub struct Transaction {
	before: Document,
	/// Snapshot before each step; `docs[i]` is the input of `steps[i]`.
	docs: Vec<Document>,
	doc: Document,
	steps: Vec<Step>,
	maps: Vec<ChangeSet>,
	changes: ChangeSet,
	meta: TxMeta,
}

impl Transaction {
	/// Starts an empty transaction against `doc`.
	pub fn new(doc: &Document) -> Self {
		Self {
			before: doc.clone(),
			docs: Vec::new(),
			doc: doc.clone(),
			steps: Vec::new(),
			maps: Vec::new(),
			changes: ChangeSet::identity(doc.len()),
			meta: TxMeta::default(),
		}
	}

	/// Replaces the transaction's metadata.
	pub fn with_meta(mut self, meta: TxMeta) -> Self {
		self.meta = meta;
		self
	}

	/// Returns the transaction's metadata.
	pub fn meta(&self) -> &TxMeta {
		&self.meta
	}

	/// Returns the document the transaction started from.
	pub fn before(&self) -> &Document {
		&self.before
	}

	/// Returns the document after all steps so far.
	pub fn doc(&self) -> &Document {
		&self.doc
	}

	/// Consumes the transaction, returning the resulting document.
	pub fn into_doc(self) -> Document {
		self.doc
	}

	/// Returns the applied steps.
	pub fn steps(&self) -> &[Step] {
		&self.steps
	}

	/// Returns the document `steps()[index]` was applied to.
	pub fn doc_before(&self, index: usize) -> &Document {
		self.docs.get(index).unwrap_or(&self.doc)
	}

	/// Returns the composed changeset of every step.
	pub fn changes(&self) -> &ChangeSet {
		&self.changes
	}

	/// Returns true if any step was applied.
	pub fn doc_changed(&self) -> bool {
		!self.steps.is_empty()
	}

	/// Returns true if any step inserted or deleted content.
	pub fn structure_changed(&self) -> bool {
		self.steps.iter().any(Step::is_structural)
	}

	/// Maps a position in [`Self::before`] to the resulting document.
	pub fn map_pos(&self, pos: CharIdx, bias: Bias) -> CharIdx {
		self.changes.map_pos(pos, bias)
	}

	/// Maps a position in `doc_before(index)` to the resulting document.
	pub fn map_pos_from(&self, index: usize, pos: CharIdx, bias: Bias) -> CharIdx {
		self.maps.iter().skip(index).fold(pos, |pos, cs| cs.map_pos(pos, bias))
	}

	/// Applies a step.
	///
	/// On error the transaction is left unchanged.
	pub fn step(&mut self, step: Step) -> Result<&mut Self, DocumentError> {
		let (doc, cs) = step.apply(&self.doc)?;
		let prev = std::mem::replace(&mut self.doc, doc);
		self.docs.push(prev);
		self.changes = std::mem::take(&mut self.changes).compose(cs.clone());
		self.maps.push(cs);
		self.steps.push(step);
		Ok(self)
	}

	/// Replaces `[from, to)` with `slice`.
	pub fn replace(&mut self, from: CharIdx, to: CharIdx, slice: Slice) -> Result<&mut Self, DocumentError> {
		self.step(Step::Replace { from, to, slice })
	}

	/// Inserts unmarked text at `pos`.
	pub fn insert_text(&mut self, pos: CharIdx, text: &str) -> Result<&mut Self, DocumentError> {
		self.replace(pos, pos, Slice::text(text))
	}

	/// Deletes `[from, to)`.
	pub fn delete(&mut self, from: CharIdx, to: CharIdx) -> Result<&mut Self, DocumentError> {
		self.replace(from, to, Slice::empty())
	}

	/// Adds `mark` to the text in `[from, to)`.
	pub fn add_mark(&mut self, from: CharIdx, to: CharIdx, mark: Mark) -> Result<&mut Self, DocumentError> {
		self.step(Step::AddMark { from, to, mark })
	}

	/// Removes `mark` from the text in `[from, to)`.
	pub fn remove_mark(&mut self, from: CharIdx, to: CharIdx, mark: Mark) -> Result<&mut Self, DocumentError> {
		self.step(Step::RemoveMark { from, to, mark })
	}

	/// Sets or clears the annotation attribute of the atomic node at `pos`.
	pub fn set_atom_annotation(&mut self, pos: CharIdx, thread: Option<ThreadId>) -> Result<&mut Self, DocumentError> {
		self.step(Step::SetAtomAnnotation { pos, thread })
	}
}
