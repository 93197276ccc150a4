//! Anchor lifecycle: orphaning, restoration, refresh, and the explicit
//! create/resolve/reopen/delete actions.
//!
//! The document is the ground truth for liveness. A pass compares the set of
//! threads carrying live marks with the store's root records and updates the
//! records; it never edits the document.

use anchorage_primitives::{CommentId, Document, Inline, ThreadId, Transaction};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::comments::{AnchorKind, CommentRecord, CommentStore};
use crate::engine::AnchorEngine;
use crate::events::{AnchorEvent, AnchorEvents};
use crate::marks::{self, SelectionTarget, all_annotated_thread_ids, find_mark_range, live_text};
use crate::state::AnchorEngineState;


/// Threads whose records a pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
	pub orphaned: Vec<ThreadId>,
	pub restored: Vec<ThreadId>,
	/// Live threads whose selected text and context were recaptured.
	pub refreshed: Vec<ThreadId>,
}

impl PassReport {
	pub fn is_empty(&self) -> bool {
		self.orphaned.is_empty() && self.restored.is_empty() && self.refreshed.is_empty()
	}
}

/// A freshly created thread.
#[derive(Debug, Clone)]
pub struct CreatedThread {
	pub thread_id: ThreadId,
	pub comment_id: CommentId,
	/// Binds the thread's mark; dispatch it.
	pub transaction: Transaction,
}

/// Result of reopening a resolved thread.
#[derive(Debug, Clone)]
pub enum UnresolveOutcome {
	/// The text was found again; dispatch the transaction to re-apply the mark.
	Reopened(Transaction),
	/// The thread still had a live mark.
	AlreadyAnchored,
	/// No match exists; the thread is open but orphaned.
	Detached,
	/// No such thread, or annotations are unsupported.
	NotFound,
}

/// What a new thread is about to be bound to, read before the mark exists.
struct Binding {
	selected_text: String,
	kind: AnchorKind,
}

impl AnchorEngine {
	/// Reconciles every root record with the marks in `doc`.
	///
	/// Orphans and restorations are queued on `events` as one batch each.
	/// Running a second pass without an intervening change does nothing.
	pub fn run_pass(
		&self,
		doc: &Document,
		store: &mut CommentStore,
		state: &mut AnchorEngineState,
		events: &mut AnchorEvents,
		now: DateTime<Utc>,
	) -> PassReport {
		let mut report = PassReport::default();
		if !self.capability.is_supported() {
			return report;
		}

		let live = all_annotated_thread_ids(doc);
		let roots: Vec<(ThreadId, bool, String)> = store
			.roots()
			.filter(|r| !r.resolved)
			.map(|r| (r.thread_id.clone(), r.orphaned, r.selected_text.clone()))
			.collect();

		for (thread, orphaned, selected_text) in roots {
			if !live.contains(&thread) {
				if !orphaned {
					store.update_anchor(&thread, |r| {
						r.orphaned = true;
						r.orphaned_at = Some(now);
					});
					state.invalidate_thread(&thread);
					report.orphaned.push(thread);
				}
				continue;
			}

			if orphaned {
				store.update_anchor(&thread, |r| {
					r.orphaned = false;
					r.orphaned_at = None;
				});
				state.lift_suppression(&thread);
				report.restored.push(thread.clone());
			}

			let Some(text) = live_text(doc, &thread) else {
				continue;
			};
			if text != selected_text {
				let context = find_mark_range(doc, &thread).map(|span| self.capture_context(doc, span));
				let kind = bound_kind(doc, &thread);
				store.update_anchor(&thread, |r| {
					r.selected_text = text;
					r.position_context = context;
					if kind.is_some() {
						r.anchor_kind = kind;
					}
				});
				report.refreshed.push(thread);
			}
		}

		if !report.orphaned.is_empty() {
			info!(count = report.orphaned.len(), threads = ?report.orphaned, "anchor.pass.orphaned");
			events.push(AnchorEvent::Orphaned {
				thread_ids: report.orphaned.clone(),
			});
		}
		if !report.restored.is_empty() {
			info!(count = report.restored.len(), threads = ?report.restored, "anchor.pass.restored");
			events.push(AnchorEvent::Restored {
				thread_ids: report.restored.clone(),
			});
		}
		if !report.refreshed.is_empty() {
			debug!(count = report.refreshed.len(), "anchor.pass.refreshed");
		}
		report
	}

	/// Starts a thread on `target`.
	///
	/// The root record is stored before the mark transaction is returned, so
	/// the mark never appears without its record. Returns `None` if the
	/// selection cannot carry a mark.
	pub fn create_thread(
		&self,
		doc: &Document,
		store: &mut CommentStore,
		target: &SelectionTarget,
		author: &str,
		body: &str,
		now: DateTime<Utc>,
	) -> Option<CreatedThread> {
		let thread_id = ThreadId::generate();
		let transaction = self.apply_mark(doc, &thread_id, target)?;
		let binding = binding_of(doc, target)?;
		let span = target.span();
		let record = CommentRecord::root(thread_id.clone(), author, body, now).anchored(
			binding.selected_text,
			self.capture_context(doc, span),
			binding.kind,
		);
		let comment_id = record.id.clone();
		store.insert(record);
		info!(thread = %thread_id, from = span.from, to = span.to, "anchor.thread.created");
		Some(CreatedThread {
			thread_id,
			comment_id,
			transaction,
		})
	}

	/// Marks `thread` resolved and returns the transaction removing its mark.
	///
	/// The record is updated first so the pass triggered by the removal does
	/// not see the thread as orphaned.
	pub fn resolve_thread(&self, doc: &Document, store: &mut CommentStore, thread: &ThreadId) -> Option<Transaction> {
		if !store.update_anchor(thread, |r| r.resolved = true) {
			return None;
		}
		info!(%thread, "anchor.thread.resolved");
		self.remove_mark(doc, thread)
	}

	/// Reopens a resolved thread, trying to find its text again.
	///
	/// Atom-bound threads look for the first unannotated atom with the same
	/// kind and label. A failed recovery leaves the thread open but orphaned
	/// and queues [`AnchorEvent::RecoveryFailed`].
	pub fn unresolve_thread(
		&self,
		doc: &Document,
		store: &mut CommentStore,
		state: &mut AnchorEngineState,
		events: &mut AnchorEvents,
		thread: &ThreadId,
		now: DateTime<Utc>,
	) -> UnresolveOutcome {
		let Some(mark_type) = self.capability.mark_type() else {
			return UnresolveOutcome::NotFound;
		};
		let Some(root) = store.root(thread) else {
			return UnresolveOutcome::NotFound;
		};
		let target = match &root.anchor_kind {
			Some(AnchorKind::Atom { kind }) => first_free_atom(doc, kind, &root.selected_text).map(SelectionTarget::Atom),
			_ => self
				.find_best_match(doc, &root.selected_text, root.position_context.as_ref())
				.map(SelectionTarget::Text),
		};
		store.update_anchor(thread, |r| r.resolved = false);

		if find_mark_range(doc, thread).is_some() {
			return UnresolveOutcome::AlreadyAnchored;
		}

		match target.and_then(|target| marks::apply_mark(doc, thread, &target, mark_type)) {
			Some(tx) => {
				store.update_anchor(thread, |r| {
					r.orphaned = false;
					r.orphaned_at = None;
				});
				state.lift_suppression(thread);
				info!(%thread, "anchor.thread.reopened");
				UnresolveOutcome::Reopened(tx)
			}
			None => {
				store.update_anchor(thread, |r| {
					if !r.orphaned {
						r.orphaned = true;
						r.orphaned_at = Some(now);
					}
				});
				state.invalidate_thread(thread);
				warn!(%thread, "anchor.thread.recovery_failed");
				events.push(AnchorEvent::RecoveryFailed { thread_id: thread.clone() });
				UnresolveOutcome::Detached
			}
		}
	}

	/// Deletes `thread`'s root record and all its replies.
	///
	/// Apply the transaction from [`AnchorEngine::remove_mark`] first; the
	/// mark goes before its record. Returns the number of records removed.
	pub fn delete_thread(&self, store: &mut CommentStore, state: &mut AnchorEngineState, thread: &ThreadId) -> usize {
		let removed = store.delete_thread(thread);
		if state.active_thread() == Some(thread) {
			state.set_active_thread(None);
		}
		state.lift_suppression(thread);
		info!(%thread, removed, "anchor.thread.deleted");
		removed
	}
}

fn binding_of(doc: &Document, target: &SelectionTarget) -> Option<Binding> {
	match *target {
		SelectionTarget::Text(span) => Some(Binding {
			selected_text: doc.text_between(span.from, span.to),
			kind: AnchorKind::Text,
		}),
		SelectionTarget::Atom(pos) => doc.atom_at(pos).map(|atom| Binding {
			selected_text: atom.label.clone(),
			kind: AnchorKind::Atom { kind: atom.kind.clone() },
		}),
	}
}

/// Returns what kind of content currently carries `thread`.
fn bound_kind(doc: &Document, thread: &ThreadId) -> Option<AnchorKind> {
	if !marks::mark_runs(doc, thread).is_empty() {
		return Some(AnchorKind::Text);
	}
	let pos = *marks::annotated_atoms(doc, thread).first()?;
	doc.atom_at(pos).map(|atom| AnchorKind::Atom { kind: atom.kind.clone() })
}

fn first_free_atom(doc: &Document, kind: &str, label: &str) -> Option<usize> {
	doc.nodes().find_map(|node| match node.inline {
		Inline::Atom(atom) if atom.annotation.is_none() && atom.kind == kind && atom.label == label => Some(node.pos),
		_ => None,
	})
}
