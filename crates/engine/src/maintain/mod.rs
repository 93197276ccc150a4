//! Transactional mark maintenance.
//!
//! Runs after every document-changing transaction the engine did not emit
//! itself and returns at most one corrective transaction that:
//!
//! * strips marks whose thread has no record at all (ghosts), unless the
//!   stability gate is still pending and records may yet arrive,
//! * strips comment marks carried by locally inserted content, re-deriving
//!   them from the pre-edit neighbours unless the insertion is a paste,
//! * leaves remote and undo/redo insertions alone so re-inserted marked text
//!   restores its thread.
//!
//! The corrective transaction holds only mark and atom-annotation steps and
//! never changes document structure.

use std::collections::BTreeMap;

use anchorage_primitives::{
	Bias, CharIdx, Document, DocumentError, Inline, Mark, Origin, Span, Step, ThreadId, Transaction, TxMeta,
};
use tracing::{debug, error, trace};

use crate::capability::AnnotationCapability;
use crate::comments::CommentStore;
use crate::marks::all_annotated_thread_ids;
use crate::state::AnchorEngineState;


/// Comment bindings at one position.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
	Text(Vec<ThreadId>),
	Atom(Option<ThreadId>),
	Break,
}

/// Returns the corrective transaction for `tx`, if one is needed.
pub fn append_transaction(
	tx: &Transaction,
	capability: &AnnotationCapability,
	store: &CommentStore,
	state: &AnchorEngineState,
) -> Option<Transaction> {
	if !capability.is_supported() || tx.meta().corrective || !tx.doc_changed() {
		return None;
	}

	let doc = tx.doc();
	let actual = slots(doc);
	let mut desired = actual.clone();

	if state.gate.is_pending() {
		trace!("anchor.maintain.ghost_deferred");
	} else {
		strip_ghosts(doc, store, &mut desired);
	}

	let meta = tx.meta();
	if meta.origin == Origin::Local && !meta.history {
		let is_valid = |thread: &ThreadId| store.root(thread).is_some_and(|r| !r.resolved) && !state.is_suppressed(thread);
		for (index, step) in tx.steps().iter().enumerate() {
			let Step::Replace { from, to, slice } = step else {
				continue;
			};
			if slice.is_empty() {
				continue;
			}
			let start = tx.map_pos_from(index + 1, *from, Bias::Right);
			let end = tx.map_pos_from(index + 1, from + slice.len(), Bias::Left);
			if start >= end {
				continue;
			}
			let inserted = &mut desired[start..end];
			for slot in inserted.iter_mut() {
				slot.clear();
			}
			if meta.paste {
				trace!(start, end, "anchor.maintain.paste_strip");
				continue;
			}

			let threads = inherited_threads(tx.doc_before(index), *from, *to, &is_valid);
			if threads.is_empty() {
				continue;
			}
			debug!(?threads, start, end, "anchor.maintain.propagate");
			for slot in inserted.iter_mut() {
				if let Slot::Text(set) = slot {
					for thread in &threads {
						insert_sorted(set, thread.clone());
					}
				}
			}
		}
	}

	finish(doc, &actual, &desired)
}

/// Returns the transaction removing every mark whose thread has no record.
///
/// Run once when the stability gate opens, to catch ghosts that arrived
/// while their removal was deferred.
pub fn sweep_ghosts(doc: &Document, capability: &AnnotationCapability, store: &CommentStore) -> Option<Transaction> {
	if !capability.is_supported() {
		return None;
	}
	let actual = slots(doc);
	let mut desired = actual.clone();
	strip_ghosts(doc, store, &mut desired);
	finish(doc, &actual, &desired)
}

fn strip_ghosts(doc: &Document, store: &CommentStore, desired: &mut [Slot]) {
	for thread in all_annotated_thread_ids(doc) {
		if !store.has_thread(&thread) {
			debug!(%thread, "anchor.maintain.ghost");
			for slot in desired.iter_mut() {
				slot.remove(&thread);
			}
		}
	}
}

fn finish(doc: &Document, actual: &[Slot], desired: &[Slot]) -> Option<Transaction> {
	if desired == actual {
		return None;
	}
	match corrective(doc, actual, desired) {
		Ok(fix) => {
			debug!(steps = fix.steps().len(), "anchor.maintain.corrective");
			Some(fix)
		}
		Err(err) => {
			error!(error = %err, "anchor.maintain.failed");
			None
		}
	}
}

/// Threads an insertion at `[from, to)` of `before` picks up from its neighbours.
///
/// The character preceding the insertion wins; the one following the
/// replaced range is consulted only when the preceding one has no valid
/// thread.
fn inherited_threads(before: &Document, from: CharIdx, to: CharIdx, is_valid: &impl Fn(&ThreadId) -> bool) -> Vec<ThreadId> {
	let valid_at = |pos: CharIdx| -> Vec<ThreadId> {
		before
			.marks_at(pos)
			.map(|marks| marks.threads().filter(|t| is_valid(t)).cloned().collect())
			.unwrap_or_default()
	};
	let preceding = from.checked_sub(1).map(&valid_at).unwrap_or_default();
	if !preceding.is_empty() {
		return preceding;
	}
	valid_at(to)
}

fn slots(doc: &Document) -> Vec<Slot> {
	let mut slots = vec![Slot::Break; doc.len()];
	for node in doc.nodes() {
		let span = node.span();
		match node.inline {
			Inline::Text(run) => {
				let threads: Vec<ThreadId> = run.marks.threads().cloned().collect();
				slots[span.from..span.to].fill(Slot::Text(threads));
			}
			Inline::Atom(atom) => slots[span.from] = Slot::Atom(atom.annotation.clone()),
		}
	}
	slots
}

impl Slot {
	fn remove(&mut self, thread: &ThreadId) {
		match self {
			Slot::Text(set) => set.retain(|t| t != thread),
			Slot::Atom(annotation) if annotation.as_ref() == Some(thread) => *annotation = None,
			_ => {}
		}
	}

	fn clear(&mut self) {
		match self {
			Slot::Text(set) => set.clear(),
			Slot::Atom(annotation) => *annotation = None,
			Slot::Break => {}
		}
	}
}

fn insert_sorted(set: &mut Vec<ThreadId>, thread: ThreadId) {
	if let Err(idx) = set.binary_search(&thread) {
		set.insert(idx, thread);
	}
}

/// Records `pos` against `thread`, extending the last span when adjacent.
fn push_pos(ranges: &mut BTreeMap<ThreadId, Vec<Span>>, thread: &ThreadId, pos: CharIdx) {
	let spans = ranges.entry(thread.clone()).or_default();
	match spans.last_mut() {
		Some(last) if last.to == pos => last.to = pos + 1,
		_ => spans.push(Span::new(pos, pos + 1)),
	}
}

/// Builds the fewest mark steps turning `actual` into `desired`.
fn corrective(doc: &Document, actual: &[Slot], desired: &[Slot]) -> Result<Transaction, DocumentError> {
	let mut added = BTreeMap::new();
	let mut removed = BTreeMap::new();
	let mut atoms = Vec::new();
	for (pos, (have, want)) in actual.iter().zip(desired).enumerate() {
		match (have, want) {
			(Slot::Text(have), Slot::Text(want)) => {
				for thread in want.iter().filter(|t| !have.contains(t)) {
					push_pos(&mut added, thread, pos);
				}
				for thread in have.iter().filter(|t| !want.contains(t)) {
					push_pos(&mut removed, thread, pos);
				}
			}
			(Slot::Atom(have), Slot::Atom(want)) if have != want => atoms.push((pos, want.clone())),
			_ => {}
		}
	}

	let mut fix = Transaction::new(doc).with_meta(TxMeta::corrective());
	for (thread, spans) in removed {
		for span in spans {
			fix.remove_mark(span.from, span.to, Mark::Comment(thread.clone()))?;
		}
	}
	for (thread, spans) in added {
		for span in spans {
			fix.add_mark(span.from, span.to, Mark::Comment(thread.clone()))?;
		}
	}
	for (pos, annotation) in atoms {
		fix.set_atom_annotation(pos, annotation)?;
	}
	Ok(fix)
}
