//! Best-position resolver.
//!
//! Recovers a span for previously anchored text by scanning the document for
//! exact occurrences and, when there are several, ranking them by how well
//! their surroundings match a captured [`PositionContext`]. This is a
//! heuristic disambiguator: highly repetitive text combined with a drifted
//! context can pick the wrong occurrence.

use anchorage_primitives::{Document, Span};
use tracing::debug;

use crate::config::ScoreWeights;
use crate::context::PositionContext;


/// One exact occurrence of the target text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
	/// Positions covered by the occurrence.
	pub span: Span,
	/// Index of the containing block.
	pub block: usize,
}

/// An occurrence together with its context score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredOccurrence {
	/// The occurrence.
	pub occurrence: Occurrence,
	/// Context similarity score; higher is better.
	pub score: u32,
}

/// Enumerates every occurrence of `target`, in document order.
///
/// The document is searched in the form stored anchor text takes: block
/// boundaries read as `'\n'` and atomic nodes are skipped. Matches are
/// non-overlapping and leftmost-first, and may cross formatting, atoms, and
/// block boundaries.
pub fn find_occurrences(doc: &Document, target: &str) -> Vec<Occurrence> {
	if target.is_empty() {
		return Vec::new();
	}
	let target_len = target.chars().count();
	let search = doc.search_text();
	let mut out = Vec::new();
	let mut char_pos = 0;
	let mut last_byte = 0;
	for (byte, _) in search.text.match_indices(target) {
		char_pos += search.text[last_byte..byte].chars().count();
		if let Some(span) = search.span(char_pos, target_len) {
			out.push(Occurrence {
				span,
				block: doc.block_index_at(span.from),
			});
		}
		char_pos += target_len;
		last_byte = byte + target.len();
	}
	out
}

/// Scores how well the surroundings of `occurrence` match `context`.
pub fn score_occurrence(doc: &Document, occurrence: &Occurrence, context: &PositionContext, weights: &ScoreWeights) -> u32 {
	let text = doc.projection();
	let len = doc.len();
	let span = occurrence.span;
	let mut score = 0;

	let before_len = context.text_before.chars().count();
	if before_len > 0 {
		let actual = text.slice(span.from.saturating_sub(before_len)..span.from).to_string();
		if actual == context.text_before {
			score += weights.exact_before;
		} else if actual.contains(&tail(&context.text_before, weights.probe_len)) {
			score += weights.partial_before;
		}
	}

	let after_len = context.text_after.chars().count();
	if after_len > 0 {
		let end = span.to.min(len);
		let actual = text.slice(end..(end + after_len).min(len)).to_string();
		if actual == context.text_after {
			score += weights.exact_after;
		} else if actual.contains(&head(&context.text_after, weights.probe_len)) {
			score += weights.partial_after;
		}
	}

	if let Some(block_index) = context.block_index {
		let distance = occurrence.block.abs_diff(block_index);
		if distance == 0 {
			score += weights.same_block;
		} else if distance <= weights.near_block_distance {
			score += weights.near_block;
		}
	}

	score
}

/// Scores every occurrence of `target` against `context`.
pub fn score_occurrences(doc: &Document, target: &str, context: &PositionContext, weights: &ScoreWeights) -> Vec<ScoredOccurrence> {
	find_occurrences(doc, target)
		.into_iter()
		.map(|occurrence| ScoredOccurrence {
			score: score_occurrence(doc, &occurrence, context, weights),
			occurrence,
		})
		.collect()
}

/// Finds the occurrence of `target` most likely to be the original anchor.
///
/// - no occurrence: `None`
/// - one occurrence: that occurrence, whatever the context says
/// - several and no context: the earliest
/// - several with context: the highest score, ties keeping the earliest
pub fn find_best_match(doc: &Document, target: &str, context: Option<&PositionContext>, weights: &ScoreWeights) -> Option<Span> {
	let occurrences = find_occurrences(doc, target);
	let first = *occurrences.first()?;
	if occurrences.len() == 1 {
		return Some(first.span);
	}
	let Some(context) = context else {
		debug!(candidates = occurrences.len(), from = first.span.from, "anchor.match.no_context");
		return Some(first.span);
	};

	let mut best = ScoredOccurrence {
		occurrence: first,
		score: score_occurrence(doc, &first, context, weights),
	};
	for occurrence in occurrences.iter().skip(1) {
		let score = score_occurrence(doc, occurrence, context, weights);
		if score > best.score {
			best = ScoredOccurrence { occurrence: *occurrence, score };
		}
	}

	debug!(
		candidates = occurrences.len(),
		score = best.score,
		from = best.occurrence.span.from,
		"anchor.match.ambiguous"
	);
	Some(best.occurrence.span)
}

/// Returns the last `n` characters of `s`.
fn tail(s: &str, n: usize) -> String {
	let skip = s.chars().count().saturating_sub(n);
	s.chars().skip(skip).collect()
}

/// Returns the first `n` characters of `s`.
fn head(s: &str, n: usize) -> String {
	s.chars().take(n).collect()
}
