//! Anchor event queue.
//!
//! Liveness changes and transient notifications are queued here for the
//! comments panel to drain after each dispatch or pass.

use std::collections::VecDeque;

use anchorage_primitives::ThreadId;

use crate::marks::SelectionTarget;

/// A change the comments panel should reflect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorEvent {
	/// Threads whose anchored content disappeared in one pass.
	Orphaned { thread_ids: Vec<ThreadId> },
	/// Threads whose marks reappeared in one pass.
	Restored { thread_ids: Vec<ThreadId> },
	/// Reopening a resolved thread could not find its text.
	RecoveryFailed { thread_id: ThreadId },
	/// The selection has been stable long enough to offer "add comment".
	SelectionSettled { target: SelectionTarget },
}

/// Queue of anchor events waiting for the host to drain them.
pub struct AnchorEvents {
	pending: VecDeque<AnchorEvent>,
}

impl Default for AnchorEvents {
	fn default() -> Self {
		Self::new()
	}
}

impl AnchorEvents {
	pub fn new() -> Self {
		Self { pending: VecDeque::new() }
	}

	pub fn is_empty(&self) -> bool {
		self.pending.is_empty()
	}

	pub fn push(&mut self, event: AnchorEvent) {
		self.pending.push_back(event);
	}

	pub fn take_pending(&mut self) -> Vec<AnchorEvent> {
		self.pending.drain(..).collect()
	}
}
