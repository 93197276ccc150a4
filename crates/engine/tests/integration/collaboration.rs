//! Remote steps, remote records, and persisted stores.

use std::sync::Arc;

use anchorage_engine::{
	AnchorConfig, AnchorEvent, AnchorKind, AnchorState, CommentRecord, CommentStore, EditorSession, ManualClock, PositionContext,
	SelectionTarget,
};
use anchorage_primitives::{AtomNode, Block, Document, Inline, Mark, Schema, Slice, Span, ThreadId, Transaction, TxMeta};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

use crate::common::{Harness, WINDOW};

fn remote(doc: &Document) -> Transaction {
	Transaction::new(doc).with_meta(TxMeta::remote())
}

#[test]
fn remote_reinsertion_restores_thread() {
	let mut h = Harness::new("shared paragraph text");
	let thread = h.comment(7, 16);
	h.settle();

	let doc = h.session.doc().clone();
	let mut tx = remote(&doc);
	tx.delete(7, 16).unwrap();
	h.session.dispatch(tx);
	assert_eq!(h.session.take_events(), vec![AnchorEvent::Orphaned { thread_ids: vec![thread.clone()] }]);

	let doc = h.session.doc().clone();
	let mut tx = remote(&doc);
	tx.replace(7, 7, Slice::marked("paragraph", [Mark::Comment(thread.clone())]))
		.unwrap();
	h.session.dispatch(tx);
	assert_eq!(h.session.take_events(), vec![AnchorEvent::Restored { thread_ids: vec![thread.clone()] }]);
	assert_eq!(h.anchored_text(&thread).as_deref(), Some("paragraph"));
}

#[test]
fn ghost_marks_are_stripped_silently() {
	let mut h = Harness::new("clean text");
	h.settle();

	let doc = h.session.doc().clone();
	let mut tx = remote(&doc);
	tx.replace(6, 6, Slice::marked("ghostly ", [Mark::Comment(ThreadId::new("deleted-elsewhere"))]))
		.unwrap();
	h.session.dispatch(tx);

	assert_eq!(h.session.doc().text(), "clean ghostly text");
	assert_eq!(h.session.find_mark_range(&ThreadId::new("deleted-elsewhere")), None);
	assert!(h.session.take_events().is_empty());
}

#[test]
fn marks_arriving_before_their_records_survive_sync() {
	let mut h = Harness::new("clean text");
	let thread = ThreadId::new("from-peer");

	let doc = h.session.doc().clone();
	let mut tx = remote(&doc);
	tx.replace(6, 6, Slice::marked("shared ", [Mark::Comment(thread.clone())]))
		.unwrap();
	h.session.dispatch(tx);
	assert!(!h.session.state().gate.is_stable());
	assert_eq!(h.session.find_mark_range(&thread), Some(Span::new(6, 13)));

	let record = CommentRecord::root(thread.clone(), "bo", "look", Utc.timestamp_opt(1_700_000_000, 0).unwrap()).anchored(
		"shared ",
		PositionContext::new("clean ", "text"),
		AnchorKind::Text,
	);
	h.session.apply_remote_record(record);
	h.settle();

	assert_eq!(h.anchored_text(&thread).as_deref(), Some("shared "));
	assert_eq!(h.session.store().root(&thread).unwrap().state(), AnchorState::Anchored);
}

#[test]
fn unclaimed_marks_are_swept_when_sync_settles() {
	let mut h = Harness::new("clean text");
	let doc = h.session.doc().clone();
	let mut tx = remote(&doc);
	tx.replace(6, 6, Slice::marked("stale ", [Mark::Comment(ThreadId::new("never-arrives"))]))
		.unwrap();
	h.session.dispatch(tx);
	assert!(h.session.find_mark_range(&ThreadId::new("never-arrives")).is_some());

	h.clock.advance(WINDOW);
	let report = h.session.poll().expect("gate should open");
	assert!(report.is_empty());
	assert_eq!(h.session.doc().text(), "clean stale text");
	assert_eq!(h.session.find_mark_range(&ThreadId::new("never-arrives")), None);
	assert!(h.session.take_events().is_empty());
}

#[test]
fn remote_resolution_is_not_an_orphan() {
	let mut h = Harness::new("resolved by a peer");
	let thread = h.comment(12, 18);
	h.settle();

	let mut record = h.session.store().root(&thread).unwrap().clone();
	record.resolved = true;
	h.session.apply_remote_record(record);

	let doc = h.session.doc().clone();
	let mut tx = remote(&doc);
	tx.remove_mark(12, 18, Mark::Comment(thread.clone())).unwrap();
	h.session.dispatch(tx);

	assert!(h.session.take_events().is_empty());
	assert!(h.session.store().root(&thread).unwrap().resolved);
}

#[test]
fn reloaded_store_matches_document() {
	let mut h = Harness::new("persist me\nacross sessions");
	let first = h.comment(0, 7);
	let second = h.comment(11, 17);
	h.settle();

	let json = h.session.store().to_json().unwrap();
	let doc = h.session.doc().clone();

	let store = CommentStore::from_json(&json).unwrap();
	let clock = Arc::new(ManualClock::new());
	let mut reloaded = EditorSession::new(doc, &Schema::rich_text(), AnchorConfig::default(), clock.clone()).with_store(store);
	clock.advance(std::time::Duration::from_millis(500));
	let report = reloaded.poll().expect("gate should open");
	assert!(report.is_empty());
	assert!(reloaded.take_events().is_empty());
	assert_eq!(reloaded.find_mark_range(&first), Some(Span::new(0, 7)));
	assert_eq!(reloaded.find_mark_range(&second), Some(Span::new(11, 17)));
}

#[test]
fn atom_thread_orphans_and_returns_with_its_node() {
	let doc = Document::new(vec![Block::new(vec![Inline::text("look: "), Inline::atom("image", "sunset")])]);
	let mut h = Harness::with_doc(doc);
	let thread = h
		.session
		.create_thread(&SelectionTarget::Atom(6), "ana", "nice colours")
		.unwrap();
	h.settle();
	assert_eq!(h.session.find_mark_range(&thread), Some(Span::new(6, 7)));

	let doc = h.session.doc().clone();
	let mut tx = Transaction::new(&doc);
	tx.delete(6, 7).unwrap();
	h.session.dispatch(tx);
	assert_eq!(h.session.take_events(), vec![AnchorEvent::Orphaned { thread_ids: vec![thread.clone()] }]);

	let doc = h.session.doc().clone();
	let mut undo = Transaction::new(&doc).with_meta(TxMeta::history());
	undo.replace(6, 6, Slice::atom(AtomNode::new("image", "sunset").annotated(thread.clone())))
		.unwrap();
	h.session.dispatch(undo);
	assert_eq!(h.session.take_events(), vec![AnchorEvent::Restored { thread_ids: vec![thread.clone()] }]);
	assert_eq!(h.session.store().root(&thread).unwrap().selected_text, "sunset");
}

#[test]
fn unsupported_schema_disables_annotations() {
	let clock = Arc::new(ManualClock::new());
	let mut session = EditorSession::new(
		Document::from_text("plain"),
		&Schema::new().with_mark("bold"),
		AnchorConfig::default(),
		clock,
	);
	let target = SelectionTarget::text(0, 5);
	assert!(!session.has_valid_selection(&target));
	assert_eq!(session.create_thread(&target, "ana", "x"), None);
	assert!(!session.apply_mark(&ThreadId::new("t"), &target));
}
