//! Time-driven state machines.
//!
//! Neither machine owns a timer. The session feeds them the current instant on
//! every dispatch and poll, which keeps them deterministic under a
//! [`ManualClock`](crate::clock::ManualClock).

use std::time::{Duration, Instant};

use crate::marks::SelectionTarget;

/// Phase of a [`StabilityGate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
	/// Not armed yet.
	#[default]
	Idle,
	/// Waiting for a quiet period ending at `deadline`.
	Pending { deadline: Instant },
	/// The quiet period elapsed. Terminal.
	Stable,
}

/// Holds back orphan detection until the document stops churning.
///
/// Freshly loaded collaborative documents stream in remote steps for a while;
/// running a lifecycle pass during that window would orphan threads whose
/// text simply has not arrived yet.
#[derive(Debug, Clone)]
pub struct StabilityGate {
	window: Duration,
	state: GateState,
}

impl StabilityGate {
	pub fn new(window: Duration) -> Self {
		Self {
			window,
			state: GateState::Idle,
		}
	}

	pub fn state(&self) -> GateState {
		self.state
	}

	pub fn is_stable(&self) -> bool {
		self.state == GateState::Stable
	}

	/// Returns true while the quiet window is running.
	pub fn is_pending(&self) -> bool {
		matches!(self.state, GateState::Pending { .. })
	}

	/// Starts the quiet window. Has no effect once armed.
	pub fn arm(&mut self, now: Instant) {
		if self.state == GateState::Idle {
			self.state = GateState::Pending { deadline: now + self.window };
		}
	}

	/// Restarts the quiet window unless the gate is already stable.
	pub fn note_mutation(&mut self, now: Instant) {
		if self.state != GateState::Stable {
			self.state = GateState::Pending { deadline: now + self.window };
		}
	}

	/// Returns true exactly once: on the first poll at or past the deadline.
	pub fn poll(&mut self, now: Instant) -> bool {
		match self.state {
			GateState::Pending { deadline } if now >= deadline => {
				self.state = GateState::Stable;
				true
			}
			_ => false,
		}
	}
}

/// Reports a selection once it has stopped changing for a while.
#[derive(Debug, Clone)]
pub struct SelectionDebounce {
	window: Duration,
	pending: Option<(SelectionTarget, Instant)>,
}

impl SelectionDebounce {
	pub fn new(window: Duration) -> Self {
		Self { window, pending: None }
	}

	/// Records the current selection. An unchanged selection keeps its deadline.
	pub fn note(&mut self, target: SelectionTarget, now: Instant) {
		if self.pending.as_ref().is_some_and(|(current, _)| *current == target) {
			return;
		}
		self.pending = Some((target, now + self.window));
	}

	pub fn cancel(&mut self) {
		self.pending = None;
	}

	pub fn pending(&self) -> Option<&SelectionTarget> {
		self.pending.as_ref().map(|(target, _)| target)
	}

	/// Rewrites the pending selection in place without touching its deadline.
	pub fn remap(&mut self, f: impl FnOnce(SelectionTarget) -> Option<SelectionTarget>) {
		if let Some((target, deadline)) = self.pending.take() {
			self.pending = f(target).map(|target| (target, deadline));
		}
	}

	/// Yields the selection once its quiet period has elapsed.
	pub fn poll(&mut self, now: Instant) -> Option<SelectionTarget> {
		match self.pending {
			Some((target, deadline)) if now >= deadline => {
				self.pending = None;
				Some(target)
			}
			_ => None,
		}
	}
}
