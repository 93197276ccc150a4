#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Core types for annotated rich text: positions, marks, documents, and transactions.

/// Document snapshots and their query surface.
pub mod document;
/// Error types for step application.
pub mod error;
/// Identifier types for threads and comments.
pub mod ids;
/// Inline marks and mark sets.
pub mod mark;
/// Block and inline node types.
pub mod node;
/// Schema description of supported marks and atomic nodes.
pub mod schema;
/// Position and span types.
pub mod span;
/// Steps, change sets, and transactions.
pub mod transaction;

pub use document::{Document, NodeAt, NodeRef, SearchText};
pub use error::DocumentError;
pub use ids::{CommentId, ThreadId};
pub use mark::{Mark, MarkSet};
pub use node::{AtomNode, Block, Fragment, Inline, OBJECT_REPLACEMENT, Slice, TextRun};
pub use ropey::{Rope, RopeSlice};
pub use schema::{AtomSpec, COMMENT_MARK, Schema};
pub use span::{CharIdx, CharLen, Span};
pub use transaction::{Bias, ChangeSet, Origin, Step, Transaction, TxMeta};
