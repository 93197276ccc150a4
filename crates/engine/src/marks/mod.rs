//! Mark store: the live span-to-thread bindings materialised on the document.
//!
//! Text is bound through [`Mark::Comment`]; atomic nodes through their
//! annotation attribute. The document is the ground truth for which threads
//! are live. Every mutation here is returned as a single [`Transaction`] for
//! the host to dispatch.

use std::collections::BTreeSet;

use anchorage_primitives::{CharIdx, Document, DocumentError, Inline, Mark, Span, ThreadId, Transaction};
use tracing::warn;

use crate::capability::CommentMarkType;

#[cfg(test)]
mod tests;

/// What the user selected to comment on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTarget {
	/// A text range.
	Text(Span),
	/// A node selection on the atomic node at this position.
	Atom(CharIdx),
}

impl SelectionTarget {
	/// Creates a text selection covering both positions.
	pub fn text(from: CharIdx, to: CharIdx) -> Self {
		SelectionTarget::Text(Span::new(from, to))
	}

	/// Returns the positions covered by the selection.
	pub fn span(&self) -> Span {
		match *self {
			SelectionTarget::Text(span) => span,
			SelectionTarget::Atom(pos) => Span::new(pos, pos + 1),
		}
	}
}

/// Returns every thread bound to a live mark or atom attribute.
pub fn all_annotated_thread_ids(doc: &Document) -> BTreeSet<ThreadId> {
	let mut ids = BTreeSet::new();
	for node in doc.nodes() {
		match node.inline {
			Inline::Text(run) => ids.extend(run.marks.threads().cloned()),
			Inline::Atom(atom) => ids.extend(atom.annotation.clone()),
		}
	}
	ids
}

/// Returns the smallest span covering everything bound to `thread`.
///
/// Marked text split across differently formatted runs yields the union of
/// those runs.
pub fn find_mark_range(doc: &Document, thread: &ThreadId) -> Option<Span> {
	doc.nodes()
		.filter(|node| match node.inline {
			Inline::Text(run) => run.marks.has_thread(thread),
			Inline::Atom(atom) => atom.annotation.as_ref() == Some(thread),
		})
		.map(|node| node.span())
		.reduce(|a, b| a.union(&b))
}

/// Returns the contiguous text ranges carrying `thread`'s mark.
pub fn mark_runs(doc: &Document, thread: &ThreadId) -> Vec<Span> {
	let mut runs: Vec<Span> = Vec::new();
	for node in doc.nodes() {
		let Inline::Text(run) = node.inline else {
			continue;
		};
		if !run.marks.has_thread(thread) {
			continue;
		}
		let span = node.span();
		match runs.last_mut() {
			Some(last) if last.to == span.from => last.to = span.to,
			_ => runs.push(span),
		}
	}
	runs
}

/// Returns the positions of atomic nodes annotated with `thread`.
pub fn annotated_atoms(doc: &Document, thread: &ThreadId) -> Vec<CharIdx> {
	doc.nodes()
		.filter(|node| matches!(node.inline, Inline::Atom(atom) if atom.annotation.as_ref() == Some(thread)))
		.map(|node| node.pos)
		.collect()
}

/// Returns the text currently bound to `thread`.
///
/// Marked text wins; a thread bound only to an atomic node yields its label.
pub fn live_text(doc: &Document, thread: &ThreadId) -> Option<String> {
	let runs = mark_runs(doc, thread);
	if let (Some(first), Some(last)) = (runs.first(), runs.last()) {
		return Some(doc.text_between(first.from, last.to));
	}
	let pos = *annotated_atoms(doc, thread).first()?;
	doc.atom_at(pos).map(|atom| atom.label.clone())
}

/// Returns true if the selection can anchor a new thread.
///
/// Text selections must be non-empty and contain something besides
/// whitespace; node selections must target an annotatable atomic node.
pub fn has_valid_selection(doc: &Document, selection: &SelectionTarget, mark_type: &CommentMarkType) -> bool {
	match *selection {
		SelectionTarget::Text(span) => !span.is_empty() && span.to <= doc.len() && !doc.text_between(span.from, span.to).trim().is_empty(),
		SelectionTarget::Atom(pos) => doc.atom_at(pos).is_some_and(|atom| mark_type.annotates_atom(&atom.kind)),
	}
}

/// Builds the transaction binding `thread` to `target`.
///
/// Any existing binding for the thread is cleared in the same transaction, so
/// a thread never holds two live spans. Returns `None` for a degenerate,
/// out-of-range, or whitespace-only target.
pub fn apply_mark(doc: &Document, thread: &ThreadId, target: &SelectionTarget, mark_type: &CommentMarkType) -> Option<Transaction> {
	if !has_valid_selection(doc, target, mark_type) {
		return None;
	}
	build_apply(doc, thread, target)
		.inspect_err(|error| warn!(%thread, %error, "anchor.mark.apply_failed"))
		.ok()
}

fn build_apply(doc: &Document, thread: &ThreadId, target: &SelectionTarget) -> Result<Transaction, DocumentError> {
	let mut tx = Transaction::new(doc);
	strip_thread(&mut tx, doc, thread)?;
	match *target {
		SelectionTarget::Text(span) => tx.add_mark(span.from, span.to, Mark::Comment(thread.clone()))?,
		SelectionTarget::Atom(pos) => tx.set_atom_annotation(pos, Some(thread.clone()))?,
	};
	Ok(tx)
}

/// Builds the transaction clearing every binding of `thread`.
///
/// Returns `None` if nothing in the document carries the thread.
pub fn remove_mark(doc: &Document, thread: &ThreadId) -> Option<Transaction> {
	let mut tx = Transaction::new(doc);
	if let Err(error) = strip_thread(&mut tx, doc, thread) {
		warn!(%thread, %error, "anchor.mark.remove_failed");
		return None;
	}
	tx.doc_changed().then_some(tx)
}

fn strip_thread(tx: &mut Transaction, doc: &Document, thread: &ThreadId) -> Result<(), DocumentError> {
	for run in mark_runs(doc, thread) {
		tx.remove_mark(run.from, run.to, Mark::Comment(thread.clone()))?;
	}
	for pos in annotated_atoms(doc, thread) {
		tx.set_atom_annotation(pos, None)?;
	}
	Ok(())
}
