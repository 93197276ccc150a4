use super::changeset::ChangeSet;
use crate::document::{Cell, Document};
use crate::error::DocumentError;
use crate::ids::ThreadId;
use crate::mark::Mark;
use crate::node::{Fragment, Inline, Slice};
use crate::span::CharIdx;

/// An atomic document edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
	/// Deletes `[from, to)` and inserts `slice` in its place.
	Replace {
		/// Start of the replaced range.
		from: CharIdx,
		/// End of the replaced range.
		to: CharIdx,
		/// Inserted content.
		slice: Slice,
	},
	/// Adds `mark` to every text character in `[from, to)`.
	AddMark {
		/// Start of the range.
		from: CharIdx,
		/// End of the range.
		to: CharIdx,
		/// The mark to add.
		mark: Mark,
	},
	/// Removes `mark` from every text character in `[from, to)`.
	RemoveMark {
		/// Start of the range.
		from: CharIdx,
		/// End of the range.
		to: CharIdx,
		/// The mark to remove.
		mark: Mark,
	},
	/// Sets or clears the annotation attribute of the atomic node at `pos`.
	SetAtomAnnotation {
		/// Position of the atomic node.
		pos: CharIdx,
		/// New attribute value.
		thread: Option<ThreadId>,
	},
}

impl Step {
	/// Returns true if the step inserts content.
	pub fn inserts(&self) -> bool {
		matches!(self, Step::Replace { slice, .. } if !slice.is_empty())
	}

	/// Returns true if the step changes the document's structure (not just marks).
	pub fn is_structural(&self) -> bool {
		matches!(self, Step::Replace { .. })
	}

	/// Applies the step, returning the new document and the step's changeset.
	pub fn apply(&self, doc: &Document) -> Result<(Document, ChangeSet), DocumentError> {
		let len = doc.len();
		match self {
			Step::Replace { from, to, slice } => {
				check_range(*from, *to, len)?;
				let mut cells = doc.cells();
				cells.splice(*from..*to, slice_cells(slice));
				let changes = ChangeSet::replace(len, *from, *to, slice.projection());
				Ok((Document::from_cells(cells), changes))
			}
			Step::AddMark { from, to, mark } => {
				check_range(*from, *to, len)?;
				let mut cells = doc.cells();
				for cell in &mut cells[*from..*to] {
					if let Cell::Char(_, marks) = cell {
						marks.insert(mark.clone());
					}
				}
				Ok((Document::from_cells(cells), ChangeSet::identity(len)))
			}
			Step::RemoveMark { from, to, mark } => {
				check_range(*from, *to, len)?;
				let mut cells = doc.cells();
				for cell in &mut cells[*from..*to] {
					if let Cell::Char(_, marks) = cell {
						marks.remove(mark);
					}
				}
				Ok((Document::from_cells(cells), ChangeSet::identity(len)))
			}
			Step::SetAtomAnnotation { pos, thread } => {
				let mut cells = doc.cells();
				match cells.get_mut(*pos) {
					Some(Cell::Atom(node)) => node.annotation = thread.clone(),
					_ => return Err(DocumentError::NotAnAtom { pos: *pos }),
				}
				Ok((Document::from_cells(cells), ChangeSet::identity(len)))
			}
		}
	}
}

fn check_range(from: CharIdx, to: CharIdx, len: usize) -> Result<(), DocumentError> {
	if from > to || to > len {
		return Err(DocumentError::OutOfBounds { from, to, len });
	}
	Ok(())
}

fn slice_cells(slice: &Slice) -> Vec<Cell> {
	let mut cells = Vec::with_capacity(slice.len());
	for fragment in slice.fragments() {
		match fragment {
			Fragment::Inline(Inline::Text(run)) => {
				cells.extend(run.text.chars().map(|ch| if ch == '\n' { Cell::Break } else { Cell::Char(ch, run.marks.clone()) }));
			}
			Fragment::Inline(Inline::Atom(node)) => cells.push(Cell::Atom(node.clone())),
			Fragment::Break => cells.push(Cell::Break),
		}
	}
	cells
}
