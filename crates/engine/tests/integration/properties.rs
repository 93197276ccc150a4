//! Property tests over random documents and edit sequences.

use anchorage_engine::marks::all_annotated_thread_ids;
use anchorage_engine::{AnchorConfig, AnchorEngine, SelectionTarget};
use anchorage_primitives::{Document, Mark, Schema, Slice, Span, ThreadId, Transaction, TxMeta};
use proptest::prelude::*;

use crate::common::Harness;

/// A local edit: replace `[a, b)` (seeds reduced modulo the length) with text.
fn arb_edit() -> impl Strategy<Value = (u8, u8, String)> {
	(any::<u8>(), any::<u8>(), "[a-z ]{0,4}")
}

fn apply_edit(h: &mut Harness, (a, b, text): &(u8, u8, String)) {
	let doc = h.session.doc().clone();
	let len = doc.len();
	let a = *a as usize % (len + 1);
	let b = *b as usize % (len + 1);
	let mut tx = Transaction::new(&doc);
	tx.delete(a.min(b), a.max(b)).unwrap();
	if !text.is_empty() {
		tx.insert_text(a.min(b), text).unwrap();
	}
	assert!(h.session.dispatch(tx));
}

proptest! {
	/// A mark applied to a valid selection is found again over identical text.
	#[test]
	fn prop_apply_then_find(text in "[a-z ]{1,40}", a in any::<u8>(), b in any::<u8>()) {
		let doc = Document::from_text(&text);
		let len = doc.len();
		let span = Span::new(a as usize % (len + 1), b as usize % (len + 1));
		let engine = AnchorEngine::new(AnchorConfig::default(), &Schema::rich_text());
		let thread = ThreadId::new("p");
		match engine.apply_mark(&doc, &thread, &SelectionTarget::Text(span)) {
			Some(tx) => {
				let marked = tx.doc();
				prop_assert_eq!(engine.find_mark_range(marked, &thread), Some(span));
				prop_assert_eq!(marked.text_between(span.from, span.to), doc.text_between(span.from, span.to));
			}
			None => prop_assert!(doc.text_between(span.from, span.to).trim().is_empty()),
		}
	}

	/// After any edit sequence a second pass changes nothing.
	#[test]
	fn prop_pass_is_idempotent(
		spans in prop::collection::vec((any::<u8>(), any::<u8>()), 1..4),
		edits in prop::collection::vec(arb_edit(), 0..8),
	) {
		let mut h = Harness::new("alpha beta gamma delta\nepsilon zeta eta theta");
		let len = h.session.doc().len();
		for (a, b) in spans {
			let target = SelectionTarget::text(a as usize % (len + 1), b as usize % (len + 1));
			if h.session.has_valid_selection(&target) {
				h.comment(target.span().from, target.span().to);
			}
		}
		h.settle();
		for edit in &edits {
			apply_edit(&mut h, edit);
		}
		h.session.take_events();

		prop_assert!(h.session.run_pass().is_empty());
		prop_assert!(h.session.take_events().is_empty());
	}

	/// Every live mark belongs to a thread with a record.
	#[test]
	fn prop_no_ghost_survives(edits in prop::collection::vec(arb_edit(), 1..8)) {
		let mut h = Harness::new("one two three four five");
		let thread = h.comment(4, 13);
		h.settle();
		h.session.delete_thread(&thread);
		for (a, _, text) in &edits {
			// A peer that never saw the deletion keeps writing marked text.
			let doc = h.session.doc().clone();
			let pos = *a as usize % (doc.len() + 1);
			let mut tx = Transaction::new(&doc).with_meta(TxMeta::remote());
			tx.replace(pos, pos, Slice::marked(text, [Mark::Comment(thread.clone())])).unwrap();
			prop_assert!(h.session.dispatch(tx));
		}
		for live in all_annotated_thread_ids(h.session.doc()) {
			prop_assert!(h.session.store().has_thread(&live));
		}
	}
}
