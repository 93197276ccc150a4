//! One-time probe of a schema's annotation support.

use anchorage_primitives::{COMMENT_MARK, Schema};
use tracing::warn;

/// Proof that a schema can carry comment annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentMarkType {
	annotatable_atoms: Vec<String>,
}

impl CommentMarkType {
	/// Returns true if atomic nodes of `kind` accept the annotation attribute.
	pub fn annotates_atom(&self, kind: &str) -> bool {
		self.annotatable_atoms.iter().any(|k| k == kind)
	}
}

/// Result of probing a schema for annotation support.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationCapability {
	/// The schema declares the comment mark.
	Supported(CommentMarkType),
	/// The schema has no comment mark; every annotation operation is a no-op.
	Unsupported,
}

impl AnnotationCapability {
	/// Probes `schema` once. An unsupported schema is logged here and never again.
	pub fn probe(schema: &Schema) -> Self {
		if !schema.has_mark(COMMENT_MARK) {
			warn!(mark = COMMENT_MARK, "anchor.capability.unsupported");
			return AnnotationCapability::Unsupported;
		}
		AnnotationCapability::Supported(CommentMarkType {
			annotatable_atoms: schema.atoms().filter(|spec| spec.annotatable).map(|spec| spec.kind.clone()).collect(),
		})
	}

	/// Returns the comment mark handle if annotations are supported.
	pub fn mark_type(&self) -> Option<&CommentMarkType> {
		match self {
			AnnotationCapability::Supported(handle) => Some(handle),
			AnnotationCapability::Unsupported => None,
		}
	}

	/// Returns true if annotations are supported.
	pub fn is_supported(&self) -> bool {
		self.mark_type().is_some()
	}
}
