//! Comment records and the store that holds them.
//!
//! A thread is one root record plus any number of replies sharing its
//! [`ThreadId`]. Anchor state (selected text, context, orphaned, resolved)
//! lives on the root record only.

use anchorage_primitives::{CommentId, ThreadId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::PositionContext;

mod store;

pub use store::{CommentStore, StoreChange};

/// What kind of content a thread is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum AnchorKind {
	/// A text range carrying the comment mark.
	Text,
	/// An atomic node carrying the annotation attribute.
	Atom {
		/// Node type of the annotated atom.
		kind: String,
	},
}

/// Liveness of a thread's anchor, derived from its root record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorState {
	/// A live mark exists in the document.
	Anchored,
	/// The anchored text was deleted; the thread awaits recovery.
	Orphaned,
	/// Closed by the user; excluded from orphan detection and recovery.
	Resolved,
}

/// A single comment, either a thread root or a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
	pub id: CommentId,
	pub thread_id: ThreadId,
	/// `None` for the root record.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parent_id: Option<CommentId>,
	pub author: String,
	pub body: String,
	pub created_at: DateTime<Utc>,
	/// Text bound to the thread when it was last live.
	#[serde(default)]
	pub selected_text: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub position_context: Option<PositionContext>,
	#[serde(default)]
	pub orphaned: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub orphaned_at: Option<DateTime<Utc>>,
	#[serde(default)]
	pub resolved: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub anchor_kind: Option<AnchorKind>,
}

impl CommentRecord {
	/// Creates the root record of a new thread.
	pub fn root(thread_id: ThreadId, author: impl Into<String>, body: impl Into<String>, created_at: DateTime<Utc>) -> Self {
		Self {
			id: CommentId::generate(),
			thread_id,
			parent_id: None,
			author: author.into(),
			body: body.into(),
			created_at,
			selected_text: String::new(),
			position_context: None,
			orphaned: false,
			orphaned_at: None,
			resolved: false,
			anchor_kind: None,
		}
	}

	/// Creates a reply to `parent`'s thread.
	pub fn reply(parent: &CommentRecord, author: impl Into<String>, body: impl Into<String>, created_at: DateTime<Utc>) -> Self {
		Self {
			parent_id: Some(parent.id.clone()),
			..Self::root(parent.thread_id.clone(), author, body, created_at)
		}
	}

	/// Returns the record with its anchor fields filled in.
	pub fn anchored(mut self, selected_text: impl Into<String>, context: PositionContext, kind: AnchorKind) -> Self {
		self.selected_text = selected_text.into();
		self.position_context = Some(context);
		self.anchor_kind = Some(kind);
		self
	}

	/// Returns true for the thread's root record.
	pub fn is_root(&self) -> bool {
		self.parent_id.is_none()
	}

	/// Derives the anchor state. Resolution takes precedence over orphaning.
	pub fn state(&self) -> AnchorState {
		if self.resolved {
			AnchorState::Resolved
		} else if self.orphaned {
			AnchorState::Orphaned
		} else {
			AnchorState::Anchored
		}
	}
}
