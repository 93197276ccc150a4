//! Single-writer editing session.
//!
//! [`EditorSession`] owns the current document, the comment store, and the
//! engine state, and is the only path through which transactions are applied.
//! Each dispatched transaction is followed immediately by its corrective
//! transaction, if any, before the next one is accepted.

use std::sync::Arc;

use anchorage_primitives::{CommentId, Document, Schema, Span, ThreadId, Transaction};
use tracing::{debug, trace, warn};

use crate::clock::Clock;
use crate::comments::{CommentRecord, CommentStore, StoreChange};
use crate::config::AnchorConfig;
use crate::context::PositionContext;
use crate::engine::AnchorEngine;
use crate::events::{AnchorEvent, AnchorEvents};
use crate::lifecycle::{PassReport, UnresolveOutcome};
use crate::marks::SelectionTarget;
use crate::state::AnchorEngineState;

/// A document, its comment store, and the engine that keeps them consistent.
pub struct EditorSession {
	doc: Document,
	store: CommentStore,
	engine: AnchorEngine,
	state: AnchorEngineState,
	events: AnchorEvents,
	clock: Arc<dyn Clock>,
}

impl EditorSession {
	/// Opens a session on `doc` and arms the stability gate.
	pub fn new(doc: Document, schema: &Schema, config: AnchorConfig, clock: Arc<dyn Clock>) -> Self {
		let mut state = AnchorEngineState::new(&config);
		state.gate.arm(clock.now());
		Self {
			doc,
			store: CommentStore::new(),
			engine: AnchorEngine::new(config, schema),
			state,
			events: AnchorEvents::new(),
			clock,
		}
	}

	/// Replaces the comment store, e.g. with records loaded from disk.
	pub fn with_store(mut self, store: CommentStore) -> Self {
		self.store = store;
		self
	}

	pub fn doc(&self) -> &Document {
		&self.doc
	}

	pub fn store(&self) -> &CommentStore {
		&self.store
	}

	pub fn engine(&self) -> &AnchorEngine {
		&self.engine
	}

	pub fn state(&self) -> &AnchorEngineState {
		&self.state
	}

	/// Applies `tx` and its corrective followup.
	///
	/// Returns false if `tx` was built against a different document revision.
	pub fn dispatch(&mut self, tx: Transaction) -> bool {
		if tx.before() != &self.doc {
			warn!(origin = ?tx.meta().origin, "anchor.session.stale_transaction");
			return false;
		}
		if self.apply(tx) {
			self.after_change();
		}
		true
	}

	/// Applies `tx` and its corrective followup without running a pass.
	///
	/// Returns true if the document changed.
	fn apply(&mut self, tx: Transaction) -> bool {
		let changed = tx.doc_changed();
		let fix = self.engine.append_transaction(&tx, &self.store, &self.state);
		self.state.remap(&tx);
		self.doc = tx.into_doc();
		if let Some(fix) = fix {
			trace!(steps = fix.steps().len(), "anchor.session.corrective");
			self.doc = fix.into_doc();
		}
		changed
	}

	/// Advances the time-driven machinery.
	///
	/// Once the document has been quiet for the stability window, strips marks
	/// whose records never arrived and runs the first lifecycle pass. Also
	/// reports a settled selection.
	pub fn poll(&mut self) -> Option<PassReport> {
		let now = self.clock.now();
		if let Some(target) = self.state.debounce.poll(now)
			&& self.engine.has_valid_selection(&self.doc, &target)
		{
			self.events.push(AnchorEvent::SelectionSettled { target });
		}
		if self.state.gate.poll(now) {
			debug!("anchor.session.stable");
			if let Some(fix) = self.engine.sweep_ghosts(&self.doc, &self.store) {
				trace!(steps = fix.steps().len(), "anchor.session.ghost_sweep");
				self.doc = fix.into_doc();
			}
			return Some(self.run_pass());
		}
		None
	}

	/// Runs a lifecycle pass now, regardless of the stability gate.
	pub fn run_pass(&mut self) -> PassReport {
		let now = self.clock.utc_now();
		self.engine
			.run_pass(&self.doc, &mut self.store, &mut self.state, &mut self.events, now)
	}

	fn after_change(&mut self) {
		if self.state.gate.is_stable() {
			self.run_pass();
		} else {
			self.state.gate.note_mutation(self.clock.now());
		}
	}

	/// Drains queued anchor events.
	pub fn take_events(&mut self) -> Vec<AnchorEvent> {
		self.events.take_pending()
	}

	/// Drains the comment store's change log.
	pub fn take_store_changes(&mut self) -> Vec<StoreChange> {
		self.store.take_changes()
	}

	pub fn has_valid_selection(&self, target: &SelectionTarget) -> bool {
		self.engine.has_valid_selection(&self.doc, target)
	}

	pub fn find_mark_range(&self, thread: &ThreadId) -> Option<Span> {
		self.engine.find_mark_range(&self.doc, thread)
	}

	pub fn find_best_match(&self, target: &str, context: Option<&PositionContext>) -> Option<Span> {
		self.engine.find_best_match(&self.doc, target, context)
	}

	/// Binds `thread` to `target` in the current document.
	pub fn apply_mark(&mut self, thread: &ThreadId, target: &SelectionTarget) -> bool {
		match self.engine.apply_mark(&self.doc, thread, target) {
			Some(tx) => self.dispatch(tx),
			None => false,
		}
	}

	/// Clears every binding of `thread` in the current document.
	pub fn remove_mark(&mut self, thread: &ThreadId) -> bool {
		match self.engine.remove_mark(&self.doc, thread) {
			Some(tx) => self.dispatch(tx),
			None => false,
		}
	}

	/// Tracks the editor selection for the "add comment" affordance.
	pub fn set_selection(&mut self, target: Option<SelectionTarget>) {
		match target {
			Some(target) if self.has_valid_selection(&target) => self.state.debounce.note(target, self.clock.now()),
			_ => self.state.debounce.cancel(),
		}
	}

	/// Remembers `target` while the user composes a comment for it.
	///
	/// The selection follows later edits until the comment is submitted.
	pub fn begin_comment(&mut self, target: SelectionTarget) -> bool {
		if !self.has_valid_selection(&target) {
			return false;
		}
		self.state.set_pending_selection(Some(target));
		true
	}

	pub fn cancel_comment(&mut self) {
		self.state.set_pending_selection(None);
	}

	/// Creates a thread on the selection passed to [`Self::begin_comment`].
	pub fn submit_comment(&mut self, author: &str, body: &str) -> Option<ThreadId> {
		let target = self.state.take_pending_selection()?;
		self.create_thread(&target, author, body)
	}

	/// Creates a thread on `target` and makes it the active thread.
	pub fn create_thread(&mut self, target: &SelectionTarget, author: &str, body: &str) -> Option<ThreadId> {
		let now = self.clock.utc_now();
		let created = self.engine.create_thread(&self.doc, &mut self.store, target, author, body, now)?;
		self.dispatch(created.transaction);
		self.state.set_active_thread(Some(created.thread_id.clone()));
		Some(created.thread_id)
	}

	pub fn reply(&mut self, thread: &ThreadId, author: &str, body: &str) -> Option<CommentId> {
		let now = self.clock.utc_now();
		self.store.add_reply(thread, author, body, now)
	}

	pub fn set_active_thread(&mut self, thread: Option<ThreadId>) {
		self.state.set_active_thread(thread);
	}

	/// Resolves `thread`, removing its mark. Returns false for an unknown thread.
	pub fn resolve_thread(&mut self, thread: &ThreadId) -> bool {
		if self.store.root(thread).is_none() {
			return false;
		}
		if let Some(tx) = self.engine.resolve_thread(&self.doc, &mut self.store, thread) {
			self.dispatch(tx);
		}
		if self.state.active_thread() == Some(thread) {
			self.state.set_active_thread(None);
		}
		true
	}

	/// Reopens `thread`. Returns true if it is anchored afterwards.
	pub fn unresolve_thread(&mut self, thread: &ThreadId) -> bool {
		let now = self.clock.utc_now();
		let outcome = self
			.engine
			.unresolve_thread(&self.doc, &mut self.store, &mut self.state, &mut self.events, thread, now);
		match outcome {
			UnresolveOutcome::Reopened(tx) => self.dispatch(tx),
			UnresolveOutcome::AlreadyAnchored => true,
			UnresolveOutcome::Detached | UnresolveOutcome::NotFound => false,
		}
	}

	/// Deletes `thread`'s mark, then its root record and replies.
	pub fn delete_thread(&mut self, thread: &ThreadId) -> bool {
		if !self.store.has_thread(thread) {
			return false;
		}
		let changed = match self.engine.remove_mark(&self.doc, thread) {
			Some(tx) => self.apply(tx),
			None => false,
		};
		self.engine.delete_thread(&mut self.store, &mut self.state, thread);
		if changed {
			self.after_change();
		}
		true
	}

	/// Merges a record received from another client.
	pub fn apply_remote_record(&mut self, record: CommentRecord) {
		self.store.apply_remote(record);
		if self.state.gate.is_stable() {
			self.run_pass();
		}
	}

	/// Drops a record deleted by another client.
	pub fn remove_remote_record(&mut self, id: &CommentId) -> Option<CommentRecord> {
		self.store.remove_remote(id)
	}
}
