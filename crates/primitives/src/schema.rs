//! Schema description of supported marks and atomic nodes.
//!
//! The document model itself accepts any mark; the schema exists so that
//! consumers can probe, once, whether a document kind supports annotations.

/// Name of the comment mark type.
pub const COMMENT_MARK: &str = "comment";

/// Description of an atomic node type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomSpec {
	/// Node type name.
	pub kind: String,
	/// Whether the node accepts the annotation attribute.
	pub annotatable: bool,
}

/// The set of mark types and atomic node types a document may use.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
	marks: Vec<String>,
	atoms: Vec<AtomSpec>,
}

impl Schema {
	/// Creates an empty schema.
	pub fn new() -> Self {
		Self::default()
	}

	/// The schema used by the collaborative editor: basic formatting, comments,
	/// and annotatable images.
	pub fn rich_text() -> Self {
		Self::new()
			.with_mark(COMMENT_MARK)
			.with_mark("bold")
			.with_mark("italic")
			.with_mark("code")
			.with_mark("link")
			.with_atom("image", true)
			.with_atom("hard_break", false)
	}

	/// Adds a mark type.
	pub fn with_mark(mut self, name: impl Into<String>) -> Self {
		let name = name.into();
		if !self.marks.contains(&name) {
			self.marks.push(name);
		}
		self
	}

	/// Adds an atomic node type.
	pub fn with_atom(mut self, kind: impl Into<String>, annotatable: bool) -> Self {
		let kind = kind.into();
		self.atoms.retain(|spec| spec.kind != kind);
		self.atoms.push(AtomSpec { kind, annotatable });
		self
	}

	/// Returns true if the mark type is declared.
	pub fn has_mark(&self, name: &str) -> bool {
		self.marks.iter().any(|m| m == name)
	}

	/// Returns the spec for an atomic node type.
	pub fn atom(&self, kind: &str) -> Option<&AtomSpec> {
		self.atoms.iter().find(|spec| spec.kind == kind)
	}

	/// Iterates all atomic node specs.
	pub fn atoms(&self) -> impl Iterator<Item = &AtomSpec> {
		self.atoms.iter()
	}
}
