//! Per-session engine state.

use std::collections::HashSet;

use anchorage_primitives::{Bias, Span, ThreadId, Transaction};

use crate::config::AnchorConfig;
use crate::gate::{SelectionDebounce, StabilityGate};
use crate::marks::SelectionTarget;

/// Mutable state the engine carries between transactions.
///
/// Owned by the session; nothing here is global.
#[derive(Debug, Clone)]
pub struct AnchorEngineState {
	active_thread: Option<ThreadId>,
	pending_selection: Option<SelectionTarget>,
	/// Threads whose marks no longer extend over typed text.
	suppressed: HashSet<ThreadId>,
	pub gate: StabilityGate,
	pub debounce: SelectionDebounce,
}

impl AnchorEngineState {
	pub fn new(config: &AnchorConfig) -> Self {
		Self {
			active_thread: None,
			pending_selection: None,
			suppressed: HashSet::new(),
			gate: StabilityGate::new(config.stability_window()),
			debounce: SelectionDebounce::new(config.selection_debounce()),
		}
	}

	/// Returns the thread currently focused in the comments panel.
	pub fn active_thread(&self) -> Option<&ThreadId> {
		self.active_thread.as_ref()
	}

	pub fn set_active_thread(&mut self, thread: Option<ThreadId>) {
		self.active_thread = thread;
	}

	/// Returns the selection a comment is being composed for.
	pub fn pending_selection(&self) -> Option<&SelectionTarget> {
		self.pending_selection.as_ref()
	}

	pub fn set_pending_selection(&mut self, target: Option<SelectionTarget>) {
		self.pending_selection = target;
	}

	pub fn take_pending_selection(&mut self) -> Option<SelectionTarget> {
		self.pending_selection.take()
	}

	pub fn is_suppressed(&self, thread: &ThreadId) -> bool {
		self.suppressed.contains(thread)
	}

	/// Lifts typing suppression. Returns true if the thread was suppressed.
	pub fn lift_suppression(&mut self, thread: &ThreadId) -> bool {
		self.suppressed.remove(thread)
	}

	/// Drops every piece of state referring to an orphaned thread.
	pub fn invalidate_thread(&mut self, thread: &ThreadId) {
		if self.active_thread.as_ref() == Some(thread) {
			self.active_thread = None;
		}
		self.suppressed.insert(thread.clone());
	}

	/// Maps stored selections through `tx`.
	///
	/// A selection whose content was deleted is dropped.
	pub fn remap(&mut self, tx: &Transaction) {
		if !tx.structure_changed() {
			return;
		}
		self.pending_selection = self.pending_selection.and_then(|target| map_target(tx, target));
		self.debounce.remap(|target| map_target(tx, target));
	}
}

/// Maps a selection from `tx.before()` into `tx.doc()`.
pub fn map_target(tx: &Transaction, target: SelectionTarget) -> Option<SelectionTarget> {
	match target {
		SelectionTarget::Text(span) => {
			let from = tx.map_pos(span.from, Bias::Right);
			let to = tx.map_pos(span.to, Bias::Left);
			(from < to).then(|| SelectionTarget::Text(Span::new(from, to)))
		}
		SelectionTarget::Atom(pos) => {
			let from = tx.map_pos(pos, Bias::Right);
			let to = tx.map_pos(pos + 1, Bias::Left);
			(to == from + 1 && tx.doc().atom_at(from).is_some()).then_some(SelectionTarget::Atom(from))
		}
	}
}
