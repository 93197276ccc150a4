//! The engine facade.
//!
//! [`AnchorEngine`] bundles configuration with the schema capability probed
//! at construction. It holds no per-document state; every operation takes the
//! document, store, and [`AnchorEngineState`] it works on.

use anchorage_primitives::{Document, Schema, Span, ThreadId, Transaction};

use crate::capability::AnnotationCapability;
use crate::comments::CommentStore;
use crate::config::AnchorConfig;
use crate::context::{PositionContext, capture_context};
use crate::maintain::{append_transaction, sweep_ghosts};
use crate::marks::{self, SelectionTarget};
use crate::matcher;
use crate::state::AnchorEngineState;

/// Anchoring operations bound to one configuration and schema.
#[derive(Debug, Clone)]
pub struct AnchorEngine {
	pub(crate) config: AnchorConfig,
	pub(crate) capability: AnnotationCapability,
}

impl AnchorEngine {
	/// Creates an engine, probing `schema` for annotation support.
	pub fn new(config: AnchorConfig, schema: &Schema) -> Self {
		Self {
			config,
			capability: AnnotationCapability::probe(schema),
		}
	}

	pub fn config(&self) -> &AnchorConfig {
		&self.config
	}

	pub fn capability(&self) -> &AnnotationCapability {
		&self.capability
	}

	/// Builds the transaction binding `thread` to `target`.
	pub fn apply_mark(&self, doc: &Document, thread: &ThreadId, target: &SelectionTarget) -> Option<Transaction> {
		marks::apply_mark(doc, thread, target, self.capability.mark_type()?)
	}

	/// Builds the transaction clearing every binding of `thread`.
	pub fn remove_mark(&self, doc: &Document, thread: &ThreadId) -> Option<Transaction> {
		self.capability.mark_type()?;
		marks::remove_mark(doc, thread)
	}

	pub fn has_valid_selection(&self, doc: &Document, target: &SelectionTarget) -> bool {
		self.capability
			.mark_type()
			.is_some_and(|mark_type| marks::has_valid_selection(doc, target, mark_type))
	}

	pub fn find_mark_range(&self, doc: &Document, thread: &ThreadId) -> Option<Span> {
		marks::find_mark_range(doc, thread)
	}

	/// Resolves `target` to its most plausible span using the configured weights.
	pub fn find_best_match(&self, doc: &Document, target: &str, context: Option<&PositionContext>) -> Option<Span> {
		matcher::find_best_match(doc, target, context, &self.config.weights)
	}

	/// Captures the context around `span` with the configured radius.
	pub fn capture_context(&self, doc: &Document, span: Span) -> PositionContext {
		capture_context(doc, span.from, span.to, self.config.context_radius)
	}

	/// Runs the mark maintainer on a dispatched transaction.
	pub fn append_transaction(&self, tx: &Transaction, store: &CommentStore, state: &AnchorEngineState) -> Option<Transaction> {
		append_transaction(tx, &self.capability, store, state)
	}

	/// Builds the transaction stripping marks of threads the store does not know.
	pub fn sweep_ghosts(&self, doc: &Document, store: &CommentStore) -> Option<Transaction> {
		sweep_ghosts(doc, &self.capability, store)
	}
}
