//! Common utilities for engine integration tests.

use std::sync::Arc;
use std::time::Duration;

use anchorage_engine::{AnchorConfig, EditorSession, ManualClock, SelectionTarget};
use anchorage_primitives::{Document, Schema, ThreadId};
use chrono::{TimeZone, Utc};

/// Stability window used by every test session.
pub const WINDOW: Duration = Duration::from_millis(500);

pub struct Harness {
	pub session: EditorSession,
	pub clock: Arc<ManualClock>,
}

impl Harness {
	/// Opens a session on `text`; each line becomes a block.
	pub fn new(text: &str) -> Self {
		Self::with_doc(Document::from_text(text))
	}

	pub fn with_doc(doc: Document) -> Self {
		let _ = tracing_subscriber::fmt::try_init();
		let clock = Arc::new(ManualClock::starting_at(Utc.timestamp_opt(1_700_000_000, 0).unwrap()));
		let session = EditorSession::new(doc, &Schema::rich_text(), AnchorConfig::default(), clock.clone());
		Self { session, clock }
	}

	/// Lets the stability window elapse and drains the resulting events.
	pub fn settle(&mut self) {
		self.clock.advance(WINDOW);
		self.session.poll();
		self.session.take_events();
	}

	/// Creates a thread on `[from, to)`.
	pub fn comment(&mut self, from: usize, to: usize) -> ThreadId {
		self.session
			.create_thread(&SelectionTarget::text(from, to), "ana", "note")
			.expect("selection should accept a comment")
	}

	/// Returns the text currently bound to `thread`.
	pub fn anchored_text(&self, thread: &ThreadId) -> Option<String> {
		let span = self.session.find_mark_range(thread)?;
		Some(self.session.doc().text_between(span.from, span.to))
	}
}
