//! Immutable document snapshots and their query surface.
//!
//! A [`Document`] is an ordered list of [`Block`]s, each holding inline text
//! runs and atomic nodes. Positions form a flat character space in which every
//! character, every atomic node, and every block boundary occupies one slot.
//! The flattened text projection (a [`Rope`]) uses the same coordinates:
//! block boundaries render as `'\n'` and atomic nodes as
//! [`OBJECT_REPLACEMENT`], so projection index == document position.

use ropey::Rope;

use crate::mark::MarkSet;
use crate::node::{AtomNode, Block, Inline, OBJECT_REPLACEMENT, TextRun};
use crate::span::{CharIdx, CharLen, Span};


/// One position's worth of content, used while rewriting a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Cell {
	Char(char, MarkSet),
	Atom(AtomNode),
	Break,
}

/// Borrowed view of the content occupying a single position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAt<'a> {
	/// A text character and the marks it carries.
	Char {
		/// The character.
		ch: char,
		/// Marks on the character's run.
		marks: &'a MarkSet,
	},
	/// An atomic node.
	Atom(&'a AtomNode),
	/// The boundary between two blocks.
	Break,
}

/// An inline node together with its position.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
	/// Position of the node's first character.
	pub pos: CharIdx,
	/// Index of the containing block.
	pub block: usize,
	/// The node itself.
	pub inline: &'a Inline,
}

impl NodeRef<'_> {
	/// Returns the positions the node occupies.
	pub fn span(&self) -> Span {
		Span::new(self.pos, self.pos + self.inline.len())
	}
}

/// The document's text in the form [`Document::text_between`] renders it,
/// with the position of every character.
///
/// Blocks are joined by `'\n'` and atomic nodes contribute nothing, so any
/// substring maps back to a span whose `text_between` is that substring.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchText {
	/// Rendered text of the whole document.
	pub text: String,
	/// Document position of each character of `text`.
	pub positions: Vec<CharIdx>,
}

impl SearchText {
	/// Returns the span covered by `count` characters starting at character
	/// `index` of the rendered text.
	pub fn span(&self, index: usize, count: CharLen) -> Option<Span> {
		let first = *self.positions.get(index)?;
		let last = *self.positions.get((index + count).checked_sub(1)?)?;
		Some(Span::new(first, last + 1))
	}
}

/// An immutable snapshot of a rich-text document.
#[derive(Debug, Clone)]
pub struct Document {
	blocks: Vec<Block>,
	block_starts: Vec<CharIdx>,
	projection: Rope,
}

impl PartialEq for Document {
	fn eq(&self, other: &Self) -> bool {
		self.blocks == other.blocks
	}
}

impl Eq for Document {}

impl Default for Document {
	fn default() -> Self {
		Self::empty()
	}
}

impl Document {
	/// Creates a document from blocks, normalising their content.
	pub fn new(blocks: Vec<Block>) -> Self {
		Self::from_cells(cells_of(&blocks))
	}

	/// Creates a document holding a single empty block.
	pub fn empty() -> Self {
		Self::from_cells(Vec::new())
	}

	/// Creates an unmarked document; each line becomes a block.
	pub fn from_text(text: &str) -> Self {
		Self::new(text.split('\n').map(|line| Block::new(vec![Inline::text(line)])).collect())
	}

	/// Rebuilds a document from per-position cells.
	///
	/// Adjacent characters with equal marks merge into one run; empty runs
	/// never appear. There is always at least one block.
	pub(crate) fn from_cells(cells: Vec<Cell>) -> Self {
		let mut blocks = vec![Block::default()];
		for cell in cells {
			match cell {
				Cell::Break => blocks.push(Block::default()),
				Cell::Atom(node) => {
					if let Some(block) = blocks.last_mut() {
						block.inlines.push(Inline::Atom(node));
					}
				}
				Cell::Char(ch, marks) => {
					let Some(block) = blocks.last_mut() else {
						continue;
					};
					match block.inlines.last_mut() {
						Some(Inline::Text(run)) if run.marks == marks => run.text.push(ch),
						_ => block.inlines.push(Inline::Text(TextRun {
							text: ch.to_string(),
							marks,
						})),
					}
				}
			}
		}

		let mut block_starts = Vec::with_capacity(blocks.len());
		let mut projection = String::new();
		let mut pos = 0;
		for (i, block) in blocks.iter().enumerate() {
			if i > 0 {
				projection.push('\n');
				pos += 1;
			}
			block_starts.push(pos);
			for inline in &block.inlines {
				match inline {
					Inline::Text(run) => projection.push_str(&run.text),
					Inline::Atom(_) => projection.push(OBJECT_REPLACEMENT),
				}
				pos += inline.len();
			}
		}

		Self {
			blocks,
			block_starts,
			projection: Rope::from(projection.as_str()),
		}
	}

	/// Flattens the document into per-position cells.
	pub(crate) fn cells(&self) -> Vec<Cell> {
		cells_of(&self.blocks)
	}

	/// Returns the number of positions in the document.
	#[inline]
	pub fn len(&self) -> CharLen {
		self.projection.len_chars()
	}

	/// Returns true if the document holds no content at all.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns the flattened text projection.
	pub fn projection(&self) -> &Rope {
		&self.projection
	}

	/// Returns the flattened text projection as a string.
	pub fn text(&self) -> String {
		self.projection.to_string()
	}

	/// Returns the document's blocks.
	pub fn blocks(&self) -> &[Block] {
		&self.blocks
	}

	/// Returns the index of the block containing `pos`.
	///
	/// A block boundary position belongs to the block it ends.
	pub fn block_index_at(&self, pos: CharIdx) -> usize {
		self.block_starts.partition_point(|&start| start <= pos).saturating_sub(1)
	}

	/// Returns the position of a block's first character.
	pub fn block_start(&self, index: usize) -> Option<CharIdx> {
		self.block_starts.get(index).copied()
	}

	/// Returns the content occupying position `pos`.
	pub fn node_at(&self, pos: CharIdx) -> Option<NodeAt<'_>> {
		if pos >= self.len() {
			return None;
		}
		let index = self.block_index_at(pos);
		let block = self.blocks.get(index)?;
		let mut offset = pos - self.block_starts[index];
		for inline in &block.inlines {
			let len = inline.len();
			if offset < len {
				return match inline {
					Inline::Text(run) => run.text.chars().nth(offset).map(|ch| NodeAt::Char { ch, marks: &run.marks }),
					Inline::Atom(node) => Some(NodeAt::Atom(node)),
				};
			}
			offset -= len;
		}
		Some(NodeAt::Break)
	}

	/// Returns the marks of the text character at `pos`, if it is one.
	pub fn marks_at(&self, pos: CharIdx) -> Option<&MarkSet> {
		match self.node_at(pos)? {
			NodeAt::Char { marks, .. } => Some(marks),
			_ => None,
		}
	}

	/// Returns the atomic node at `pos`, if there is one.
	pub fn atom_at(&self, pos: CharIdx) -> Option<&AtomNode> {
		match self.node_at(pos)? {
			NodeAt::Atom(node) => Some(node),
			_ => None,
		}
	}

	/// Iterates every inline node with its position, in document order.
	pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> {
		self.blocks.iter().enumerate().flat_map(move |(block, b)| {
			let mut pos = self.block_starts[block];
			b.inlines.iter().map(move |inline| {
				let node = NodeRef { pos, block, inline };
				pos += inline.len();
				node
			})
		})
	}

	/// Renders the whole document for text search.
	pub fn search_text(&self) -> SearchText {
		let mut out = SearchText::default();
		for (index, block) in self.blocks.iter().enumerate() {
			let start = self.block_starts[index];
			if index > 0 {
				out.text.push('\n');
				out.positions.push(start - 1);
			}
			let mut pos = start;
			for inline in &block.inlines {
				if let Inline::Text(run) = inline {
					for (offset, ch) in run.text.chars().enumerate() {
						out.text.push(ch);
						out.positions.push(pos + offset);
					}
				}
				pos += inline.len();
			}
		}
		out
	}

	/// Returns the text between two positions.
	///
	/// Block boundaries render as `'\n'`; atomic nodes contribute no text.
	pub fn text_between(&self, from: CharIdx, to: CharIdx) -> String {
		let span = Span::new(from, to).clamp_to(self.len());
		let mut out = String::new();
		for (index, block) in self.blocks.iter().enumerate() {
			let start = self.block_starts[index];
			if index > 0 && span.contains(start - 1) {
				out.push('\n');
			}
			let mut pos = start;
			for inline in &block.inlines {
				let len = inline.len();
				if let Inline::Text(run) = inline {
					let lo = span.from.max(pos);
					let hi = span.to.min(pos + len);
					if lo < hi {
						out.extend(run.text.chars().skip(lo - pos).take(hi - lo));
					}
				}
				pos += len;
			}
		}
		out
	}
}

fn cells_of(blocks: &[Block]) -> Vec<Cell> {
	let mut cells = Vec::new();
	for (i, block) in blocks.iter().enumerate() {
		if i > 0 {
			cells.push(Cell::Break);
		}
		for inline in &block.inlines {
			match inline {
				Inline::Text(run) => {
					cells.extend(run.text.chars().map(|ch| if ch == '\n' { Cell::Break } else { Cell::Char(ch, run.marks.clone()) }));
				}
				Inline::Atom(node) => cells.push(Cell::Atom(node.clone())),
			}
		}
	}
	cells
}
