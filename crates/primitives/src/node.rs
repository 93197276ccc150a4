use crate::ids::ThreadId;
use crate::mark::{Mark, MarkSet};
use crate::span::CharLen;

/// Character used for atomic nodes in the flattened text projection.
pub const OBJECT_REPLACEMENT: char = '\u{FFFC}';

/// A run of text sharing one mark set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
	/// The run's text. Never contains `'\n'`; newlines are block boundaries.
	pub text: String,
	/// Marks carried by every character of the run.
	pub marks: MarkSet,
}

impl TextRun {
	/// Returns the run length in characters.
	pub fn len(&self) -> CharLen {
		self.text.chars().count()
	}

	/// Returns true if the run holds no text.
	pub fn is_empty(&self) -> bool {
		self.text.is_empty()
	}
}

/// A leaf node that occupies a single position (an image, an embed).
///
/// Atomic nodes cannot carry inline marks; a thread binds to them through the
/// `annotation` attribute instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomNode {
	/// Node type name, checked against the schema.
	pub kind: String,
	/// Human-readable label (alt text), used as the anchored text of a thread.
	pub label: String,
	/// Thread bound to this node, if any.
	pub annotation: Option<ThreadId>,
}

impl AtomNode {
	/// Creates an unannotated atomic node.
	pub fn new(kind: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			label: label.into(),
			annotation: None,
		}
	}

	/// Returns the node with its annotation attribute set.
	pub fn annotated(mut self, thread: ThreadId) -> Self {
		self.annotation = Some(thread);
		self
	}
}

/// An inline node inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
	/// A run of marked text.
	Text(TextRun),
	/// An atomic leaf node.
	Atom(AtomNode),
}

impl Inline {
	/// Creates an unmarked text node.
	pub fn text(text: impl Into<String>) -> Self {
		Self::marked(text, [])
	}

	/// Creates a text node carrying the given marks.
	pub fn marked(text: impl Into<String>, marks: impl IntoIterator<Item = Mark>) -> Self {
		Inline::Text(TextRun {
			text: text.into(),
			marks: marks.into_iter().collect(),
		})
	}

	/// Creates an atomic node.
	pub fn atom(kind: impl Into<String>, label: impl Into<String>) -> Self {
		Inline::Atom(AtomNode::new(kind, label))
	}

	/// Returns the number of positions the node occupies.
	pub fn len(&self) -> CharLen {
		match self {
			Inline::Text(run) => run.len(),
			Inline::Atom(_) => 1,
		}
	}

	/// Returns true if the node occupies no positions.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// A block-level node (paragraph) holding inline content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
	pub(crate) inlines: Vec<Inline>,
}

impl Block {
	/// Creates a block from inline content.
	///
	/// Content is normalised when the block becomes part of a document.
	pub fn new(inlines: Vec<Inline>) -> Self {
		Self { inlines }
	}

	/// Returns the block's inline nodes.
	pub fn inlines(&self) -> &[Inline] {
		&self.inlines
	}

	/// Returns the number of positions the block content occupies.
	pub fn len(&self) -> CharLen {
		self.inlines.iter().map(Inline::len).sum()
	}

	/// Returns true if the block has no content.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// A piece of inserted content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
	/// Inline content.
	Inline(Inline),
	/// A block boundary; splits the block the slice is inserted into.
	Break,
}

/// Content inserted by a replace step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Slice {
	fragments: Vec<Fragment>,
}

impl Slice {
	/// Creates an empty slice (a pure deletion).
	pub fn empty() -> Self {
		Self::default()
	}

	/// Creates a slice of unmarked text; `'\n'` becomes a block boundary.
	pub fn text(text: &str) -> Self {
		Self::marked(text, [])
	}

	/// Creates a slice of text carrying the given marks.
	pub fn marked(text: &str, marks: impl IntoIterator<Item = Mark>) -> Self {
		let marks: MarkSet = marks.into_iter().collect();
		let mut fragments = Vec::new();
		for (i, line) in text.split('\n').enumerate() {
			if i > 0 {
				fragments.push(Fragment::Break);
			}
			if !line.is_empty() {
				fragments.push(Fragment::Inline(Inline::Text(TextRun {
					text: line.to_string(),
					marks: marks.clone(),
				})));
			}
		}
		Self { fragments }
	}

	/// Creates a slice from explicit fragments.
	pub fn from_fragments(fragments: Vec<Fragment>) -> Self {
		Self { fragments }
	}

	/// Creates a slice holding a single atomic node.
	pub fn atom(node: AtomNode) -> Self {
		Self {
			fragments: vec![Fragment::Inline(Inline::Atom(node))],
		}
	}

	/// Returns the slice's fragments.
	pub fn fragments(&self) -> &[Fragment] {
		&self.fragments
	}

	/// Returns the number of positions the slice occupies once inserted.
	pub fn len(&self) -> CharLen {
		self.fragments
			.iter()
			.map(|f| match f {
				Fragment::Inline(inline) => inline.len(),
				Fragment::Break => 1,
			})
			.sum()
	}

	/// Returns true if inserting the slice adds nothing.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Renders the slice the way the document projection would.
	pub fn projection(&self) -> String {
		let mut out = String::new();
		for fragment in &self.fragments {
			match fragment {
				Fragment::Inline(Inline::Text(run)) => out.push_str(&run.text),
				Fragment::Inline(Inline::Atom(_)) => out.push(OBJECT_REPLACEMENT),
				Fragment::Break => out.push('\n'),
			}
		}
		out
	}
}
