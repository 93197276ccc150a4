use anchorage_primitives::{AtomNode, Block, Inline, Mark, Schema, Span, ThreadId};
use pretty_assertions::assert_eq;

use super::*;
use crate::capability::AnnotationCapability;

fn mark_type() -> CommentMarkType {
	AnnotationCapability::probe(&Schema::rich_text()).mark_type().cloned().unwrap()
}

fn t(id: &str) -> ThreadId {
	ThreadId::new(id)
}

/// `"see "`, an image at 4, `" here"`, and a hard break at 10.
fn doc_with_atoms() -> Document {
	Document::new(vec![Block::new(vec![
		Inline::text("see "),
		Inline::atom("image", "a cat"),
		Inline::text(" here"),
		Inline::atom("hard_break", ""),
	])])
}

fn applied(doc: &Document, thread: &str, target: SelectionTarget) -> Document {
	apply_mark(doc, &t(thread), &target, &mark_type()).unwrap().into_doc()
}

#[test]
fn test_apply_then_find_covers_same_text() {
	let doc = Document::from_text("The quick fox jumps.");
	let doc = applied(&doc, "t1", SelectionTarget::text(4, 13));
	let range = find_mark_range(&doc, &t("t1")).unwrap();
	assert_eq!(range, Span::new(4, 13));
	assert_eq!(doc.text_between(range.from, range.to), "quick fox");
	assert_eq!(live_text(&doc, &t("t1")).as_deref(), Some("quick fox"));
}

#[test]
fn test_apply_refuses_degenerate_and_whitespace() {
	let doc = Document::from_text("a   b");
	let mt = mark_type();
	assert!(apply_mark(&doc, &t("t1"), &SelectionTarget::text(2, 2), &mt).is_none());
	assert!(apply_mark(&doc, &t("t1"), &SelectionTarget::text(1, 4), &mt).is_none());
	assert!(apply_mark(&doc, &t("t1"), &SelectionTarget::text(3, 40), &mt).is_none());
	assert!(apply_mark(&doc, &t("t1"), &SelectionTarget::text(0, 2), &mt).is_some());
}

#[test]
fn test_apply_moves_existing_binding() {
	let doc = Document::from_text("alpha beta gamma");
	let doc = applied(&doc, "t1", SelectionTarget::text(0, 5));
	let doc = applied(&doc, "t1", SelectionTarget::text(11, 16));
	assert_eq!(mark_runs(&doc, &t("t1")), vec![Span::new(11, 16)]);
	assert_eq!(live_text(&doc, &t("t1")).as_deref(), Some("gamma"));
}

#[test]
fn test_range_unions_across_formatting() {
	let doc = Document::new(vec![Block::new(vec![
		Inline::marked("quick ", [Mark::Comment(t("t1"))]),
		Inline::marked("fox", [Mark::Comment(t("t1")), Mark::Style("bold".into())]),
		Inline::text(" jumps"),
	])]);
	assert_eq!(find_mark_range(&doc, &t("t1")), Some(Span::new(0, 9)));
	assert_eq!(mark_runs(&doc, &t("t1")), vec![Span::new(0, 9)]);
}

#[test]
fn test_mark_across_blocks_keeps_separate_runs() {
	let doc = Document::from_text("one\ntwo");
	let doc = applied(&doc, "t1", SelectionTarget::text(1, 6));
	assert_eq!(mark_runs(&doc, &t("t1")), vec![Span::new(1, 3), Span::new(4, 6)]);
	assert_eq!(find_mark_range(&doc, &t("t1")), Some(Span::new(1, 6)));
	assert_eq!(live_text(&doc, &t("t1")).as_deref(), Some("ne\ntw"));
}

#[test]
fn test_atom_binding() {
	let doc = doc_with_atoms();
	let doc = applied(&doc, "img", SelectionTarget::Atom(4));
	assert_eq!(doc.atom_at(4).and_then(|a| a.annotation.clone()), Some(t("img")));
	assert_eq!(find_mark_range(&doc, &t("img")), Some(Span::new(4, 5)));
	assert_eq!(live_text(&doc, &t("img")).as_deref(), Some("a cat"));
	assert_eq!(annotated_atoms(&doc, &t("img")), vec![4]);
}

#[test]
fn test_atom_selection_validity() {
	let doc = doc_with_atoms();
	let mt = mark_type();
	assert!(has_valid_selection(&doc, &SelectionTarget::Atom(4), &mt));
	assert!(!has_valid_selection(&doc, &SelectionTarget::Atom(10), &mt));
	assert!(!has_valid_selection(&doc, &SelectionTarget::Atom(2), &mt));
	assert!(apply_mark(&doc, &t("t1"), &SelectionTarget::Atom(10), &mt).is_none());
}

#[test]
fn test_text_selection_over_atom_marks_only_text() {
	let doc = doc_with_atoms();
	let doc = applied(&doc, "t1", SelectionTarget::text(0, 10));
	assert_eq!(mark_runs(&doc, &t("t1")), vec![Span::new(0, 4), Span::new(5, 10)]);
	assert!(annotated_atoms(&doc, &t("t1")).is_empty());
	assert_eq!(live_text(&doc, &t("t1")).as_deref(), Some("see  here"));
}

#[test]
fn test_remove_clears_text_and_atoms() {
	let doc = Document::new(vec![Block::new(vec![
		Inline::marked("x", [Mark::Comment(t("t1"))]),
		Inline::text("y"),
		Inline::Atom(AtomNode::new("image", "cat").annotated(t("t1"))),
	])]);
	let tx = remove_mark(&doc, &t("t1")).unwrap();
	assert_eq!(tx.steps().len(), 2);
	let doc = tx.into_doc();
	assert!(find_mark_range(&doc, &t("t1")).is_none());
	assert!(remove_mark(&doc, &t("t1")).is_none());
}

#[test]
fn test_all_annotated_thread_ids() {
	let doc = Document::new(vec![
		Block::new(vec![Inline::marked("a", [Mark::Comment(t("b"))]), Inline::marked("c", [Mark::Comment(t("a"))])]),
		Block::new(vec![Inline::Atom(AtomNode::new("image", "x").annotated(t("c"))), Inline::text("plain")]),
	]);
	let ids: Vec<_> = all_annotated_thread_ids(&doc).into_iter().collect();
	assert_eq!(ids, vec![t("a"), t("b"), t("c")]);
	assert!(all_annotated_thread_ids(&Document::from_text("none")).is_empty());
}
