use anchorage_primitives::{CommentId, ThreadId};
use indexmap::IndexMap;
use tracing::debug;

use super::CommentRecord;

/// A change made to the store since the last [`CommentStore::take_changes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
	Created(CommentId),
	Updated(CommentId),
	Deleted(CommentId),
}

/// Insertion-ordered collection of comment records.
///
/// Every mutation is appended to a change log the host drains to persist or
/// broadcast records.
#[derive(Debug, Default)]
pub struct CommentStore {
	records: IndexMap<CommentId, CommentRecord>,
	changes: Vec<StoreChange>,
	revision: u64,
}

impl CommentStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the number of records.
	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Returns a counter bumped by every mutation.
	pub fn revision(&self) -> u64 {
		self.revision
	}

	pub fn get(&self, id: &CommentId) -> Option<&CommentRecord> {
		self.records.get(id)
	}

	/// Iterates every record in insertion order.
	pub fn records(&self) -> impl Iterator<Item = &CommentRecord> {
		self.records.values()
	}

	/// Iterates root records in insertion order.
	pub fn roots(&self) -> impl Iterator<Item = &CommentRecord> {
		self.records.values().filter(|r| r.is_root())
	}

	/// Returns the root record of `thread`.
	pub fn root(&self, thread: &ThreadId) -> Option<&CommentRecord> {
		self.roots().find(|r| &r.thread_id == thread)
	}

	/// Returns true if any record, root or reply, belongs to `thread`.
	pub fn has_thread(&self, thread: &ThreadId) -> bool {
		self.records.values().any(|r| &r.thread_id == thread)
	}

	/// Iterates the records of `thread`, root first when it was inserted first.
	pub fn thread_records<'a>(&'a self, thread: &'a ThreadId) -> impl Iterator<Item = &'a CommentRecord> + 'a {
		self.records.values().filter(move |r| &r.thread_id == thread)
	}

	/// Inserts a new record. Returns false if the id is already taken.
	pub fn insert(&mut self, record: CommentRecord) -> bool {
		if self.records.contains_key(&record.id) {
			return false;
		}
		let id = record.id.clone();
		self.records.insert(id.clone(), record);
		self.log(StoreChange::Created(id));
		true
	}

	/// Appends a reply to `thread`. Returns `None` if the thread has no root.
	pub fn add_reply(&mut self, thread: &ThreadId, author: &str, body: &str, created_at: chrono::DateTime<chrono::Utc>) -> Option<CommentId> {
		let reply = CommentRecord::reply(self.root(thread)?, author, body, created_at);
		let id = reply.id.clone();
		self.insert(reply).then_some(id)
	}

	/// Applies `update` to the root record of `thread`.
	///
	/// Replies never carry anchor state, so only the root is touched. Returns
	/// true if the record changed.
	pub fn update_anchor(&mut self, thread: &ThreadId, update: impl FnOnce(&mut CommentRecord)) -> bool {
		let Some(root) = self.records.values_mut().find(|r| r.is_root() && &r.thread_id == thread) else {
			return false;
		};
		let before = root.clone();
		update(root);
		// Identity and thread membership are not anchor state.
		root.id = before.id.clone();
		root.thread_id = before.thread_id.clone();
		root.parent_id = None;
		if *root == before {
			return false;
		}
		self.log(StoreChange::Updated(before.id));
		true
	}

	/// Removes the root and every reply of `thread`, returning how many went.
	pub fn delete_thread(&mut self, thread: &ThreadId) -> usize {
		let ids: Vec<CommentId> = self.thread_records(thread).map(|r| r.id.clone()).collect();
		for id in &ids {
			self.records.shift_remove(id);
			self.log(StoreChange::Deleted(id.clone()));
		}
		ids.len()
	}

	/// Upserts a record received from another client.
	///
	/// The incoming record replaces any local copy wholesale.
	pub fn apply_remote(&mut self, record: CommentRecord) {
		let id = record.id.clone();
		match self.records.get_mut(&id) {
			Some(existing) if *existing == record => {}
			Some(existing) => {
				*existing = record;
				self.log(StoreChange::Updated(id));
			}
			None => {
				self.records.insert(id.clone(), record);
				self.log(StoreChange::Created(id));
			}
		}
	}

	/// Removes a record deleted by another client.
	pub fn remove_remote(&mut self, id: &CommentId) -> Option<CommentRecord> {
		let record = self.records.shift_remove(id)?;
		self.log(StoreChange::Deleted(id.clone()));
		Some(record)
	}

	/// Drains the change log.
	pub fn take_changes(&mut self) -> Vec<StoreChange> {
		std::mem::take(&mut self.changes)
	}

	/// Serialises every record, in insertion order, as a JSON array.
	pub fn to_json(&self) -> serde_json::Result<String> {
		serde_json::to_string(&self.records.values().collect::<Vec<_>>())
	}

	/// Loads records from a JSON array. The change log starts empty.
	pub fn from_json(input: &str) -> serde_json::Result<Self> {
		let records: Vec<CommentRecord> = serde_json::from_str(input)?;
		Ok(Self {
			records: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
			changes: Vec::new(),
			revision: 0,
		})
	}

	fn log(&mut self, change: StoreChange) {
		debug!(?change, "anchor.store.change");
		self.revision += 1;
		self.changes.push(change);
	}
}
