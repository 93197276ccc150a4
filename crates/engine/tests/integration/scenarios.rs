//! Local editing scenarios driven through [`EditorSession`].

use std::time::Duration;

use anchorage_engine::{AnchorEvent, AnchorState, PositionContext, SelectionTarget, StoreChange, score_occurrences};
use anchorage_primitives::{Mark, Slice, Span, Transaction, TxMeta};
use pretty_assertions::assert_eq;

use crate::common::{Harness, WINDOW};

#[test]
fn fox_scenario_prefers_matching_context() {
	let h = Harness::new("The quick fox jumps. The quick fox runs.");
	let ctx = PositionContext::new("The ", " jumps");
	let scores: Vec<u32> = score_occurrences(h.session.doc(), "quick fox", &ctx, &Default::default())
		.iter()
		.map(|s| s.score)
		.collect();
	assert_eq!(scores, vec![100, 50]);
	assert_eq!(h.session.find_best_match("quick fox", Some(&ctx)), Some(Span::new(4, 13)));
}

#[test]
fn gate_holds_orphaning_until_quiet() {
	let mut h = Harness::new("load then edit");
	let thread = h.comment(5, 9);

	h.clock.advance(Duration::from_millis(300));
	let doc = h.session.doc().clone();
	let mut tx = Transaction::new(&doc);
	tx.delete(5, 10).unwrap();
	assert!(h.session.dispatch(tx));

	h.clock.advance(Duration::from_millis(300));
	assert_eq!(h.session.poll(), None);
	assert!(h.session.take_events().is_empty());

	h.clock.advance(Duration::from_millis(200));
	let report = h.session.poll().expect("gate should open");
	assert_eq!(report.orphaned, vec![thread.clone()]);
	assert_eq!(h.session.take_events(), vec![AnchorEvent::Orphaned { thread_ids: vec![thread] }]);

	h.clock.advance(WINDOW * 2);
	assert_eq!(h.session.poll(), None);
	assert!(h.session.take_events().is_empty());
}

#[test]
fn typing_inside_comment_grows_it() {
	let mut h = Harness::new("The quick fox jumps.");
	let thread = h.comment(4, 13);
	h.settle();

	let doc = h.session.doc().clone();
	let mut tx = Transaction::new(&doc);
	tx.insert_text(10, "brown ").unwrap();
	h.session.dispatch(tx);

	assert_eq!(h.anchored_text(&thread).as_deref(), Some("quick brown fox"));
	assert_eq!(h.session.store().root(&thread).unwrap().selected_text, "quick brown fox");
	assert!(h.session.take_events().is_empty());
}

#[test]
fn delete_then_undo_restores_thread() {
	let mut h = Harness::new("The quick fox jumps.");
	let thread = h.comment(4, 13);
	h.settle();

	let doc = h.session.doc().clone();
	let mut tx = Transaction::new(&doc);
	tx.delete(4, 13).unwrap();
	h.session.dispatch(tx);
	assert_eq!(h.session.take_events(), vec![AnchorEvent::Orphaned { thread_ids: vec![thread.clone()] }]);
	assert_eq!(h.session.store().root(&thread).unwrap().state(), AnchorState::Orphaned);

	let doc = h.session.doc().clone();
	let mut undo = Transaction::new(&doc).with_meta(TxMeta::history());
	undo.replace(4, 4, Slice::marked("quick fox", [Mark::Comment(thread.clone())]))
		.unwrap();
	h.session.dispatch(undo);

	assert_eq!(h.session.take_events(), vec![AnchorEvent::Restored { thread_ids: vec![thread.clone()] }]);
	assert_eq!(h.anchored_text(&thread).as_deref(), Some("quick fox"));
	assert_eq!(h.session.store().root(&thread).unwrap().state(), AnchorState::Anchored);
}

#[test]
fn typing_after_deletion_does_not_revive() {
	let mut h = Harness::new("The quick fox jumps.");
	let thread = h.comment(4, 13);
	h.settle();

	let doc = h.session.doc().clone();
	let mut tx = Transaction::new(&doc);
	tx.delete(4, 13).unwrap();
	h.session.dispatch(tx);
	h.session.take_events();

	// An editor carrying "stored marks" re-applies the deleted mark to typed text.
	let doc = h.session.doc().clone();
	let mut tx = Transaction::new(&doc);
	tx.replace(4, 4, Slice::marked("slow dog", [Mark::Comment(thread.clone())]))
		.unwrap();
	h.session.dispatch(tx);

	assert_eq!(h.session.find_mark_range(&thread), None);
	assert!(h.session.take_events().is_empty());
	assert_eq!(h.session.doc().text(), "The slow dog jumps.");
}

#[test]
fn pasted_comment_text_stays_unbound() {
	let mut h = Harness::new("The quick fox jumps.\n");
	let thread = h.comment(4, 13);
	h.settle();

	let doc = h.session.doc().clone();
	let mut paste = Transaction::new(&doc).with_meta(TxMeta::paste());
	paste
		.replace(21, 21, Slice::marked("quick fox", [Mark::Comment(thread.clone())]))
		.unwrap();
	h.session.dispatch(paste);

	assert_eq!(h.session.find_mark_range(&thread), Some(Span::new(4, 13)));
	assert_eq!(h.session.doc().text(), "The quick fox jumps.\nquick fox");
	assert!(h.session.take_events().is_empty());
}

#[test]
fn resolve_and_reopen() {
	let mut h = Harness::new("The quick fox jumps. The quick fox runs.");
	let thread = h.comment(25, 34);
	h.settle();

	assert!(h.session.resolve_thread(&thread));
	assert_eq!(h.session.find_mark_range(&thread), None);
	assert!(h.session.take_events().is_empty());

	assert!(h.session.unresolve_thread(&thread));
	assert_eq!(h.session.find_mark_range(&thread), Some(Span::new(25, 34)));
	assert_eq!(h.session.store().root(&thread).unwrap().state(), AnchorState::Anchored);
}

#[test]
fn reopen_after_text_vanished_reports_failure() {
	let mut h = Harness::new("fleeting words here");
	let thread = h.comment(0, 8);
	h.settle();
	assert!(h.session.resolve_thread(&thread));

	let doc = h.session.doc().clone();
	let mut tx = Transaction::new(&doc);
	tx.delete(0, 9).unwrap();
	h.session.dispatch(tx);

	assert!(!h.session.unresolve_thread(&thread));
	assert_eq!(h.session.take_events(), vec![AnchorEvent::RecoveryFailed { thread_id: thread.clone() }]);
	assert_eq!(h.session.store().root(&thread).unwrap().state(), AnchorState::Orphaned);
}

#[test]
fn deleting_a_thread_is_not_an_orphan() {
	let mut h = Harness::new("remove this note");
	let thread = h.comment(7, 11);
	h.session.reply(&thread, "bo", "agreed").unwrap();
	h.settle();
	h.session.take_store_changes();

	assert!(h.session.delete_thread(&thread));
	assert_eq!(h.session.find_mark_range(&thread), None);
	assert!(!h.session.store().has_thread(&thread));
	assert!(h.session.take_events().is_empty());
	let changes = h.session.take_store_changes();
	assert_eq!(changes.len(), 2);
	assert!(changes.iter().all(|change| matches!(change, StoreChange::Deleted(_))));
	assert!(!h.session.delete_thread(&thread));
}

#[test]
fn pending_selection_follows_edits() {
	let mut h = Harness::new("comment on fox");
	assert!(h.session.begin_comment(SelectionTarget::text(11, 14)));

	let doc = h.session.doc().clone();
	let mut tx = Transaction::new(&doc);
	tx.insert_text(0, "Please ").unwrap();
	h.session.dispatch(tx);

	let thread = h.session.submit_comment("ana", "which fox?").unwrap();
	assert_eq!(h.session.find_mark_range(&thread), Some(Span::new(18, 21)));
	assert_eq!(h.session.state().active_thread(), Some(&thread));
	assert_eq!(h.session.submit_comment("ana", "again"), None);
}

#[test]
fn selection_settles_after_debounce() {
	let mut h = Harness::new("select some words");
	h.session.set_selection(Some(SelectionTarget::text(0, 6)));
	h.clock.advance(Duration::from_millis(200));
	h.session.set_selection(Some(SelectionTarget::text(0, 11)));
	h.clock.advance(Duration::from_millis(200));
	h.session.poll();
	assert!(h.session.take_events().is_empty());

	h.clock.advance(Duration::from_millis(100));
	h.session.poll();
	assert_eq!(
		h.session.take_events(),
		vec![AnchorEvent::SelectionSettled {
			target: SelectionTarget::text(0, 11)
		}]
	);

	h.session.set_selection(Some(SelectionTarget::text(6, 7)));
	h.clock.advance(Duration::from_secs(1));
	h.session.poll();
	assert!(h.session.take_events().is_empty());
}

#[test]
fn stale_transactions_are_rejected() {
	let mut h = Harness::new("one two");
	let stale = h.session.doc().clone();
	let mut first = Transaction::new(&stale);
	first.insert_text(0, "zero ").unwrap();
	assert!(h.session.dispatch(first));

	let mut second = Transaction::new(&stale);
	second.delete(0, 3).unwrap();
	assert!(!h.session.dispatch(second));
	assert_eq!(h.session.doc().text(), "zero one two");
}
