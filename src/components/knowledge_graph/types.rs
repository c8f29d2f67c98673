//! Graph data structures shared by the builder, simulator and renderer.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A research publication as supplied by the host dashboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
	/// Corpus-wide identity.
	pub id: u32,
	/// Full title.
	pub title: String,
	/// Link to the article.
	pub link: String,
	/// Inferred research category (e.g. "Radiation Biology").
	pub category: String,
	/// Inferred model organism (e.g. "Mouse").
	pub organism: String,
}

/// Node ids are derived from semantic identity: `pub_<id>`, `author_<slug>`, `concept_<label>`.
pub type NodeId = String;

/// Discriminant of [`GraphNode`], used for filtering and legends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
	/// A publication node.
	Publication,
	/// A synthesized author node.
	Author,
	/// A topical concept node.
	Concept,
}

impl NodeKind {
	/// All kinds, in legend order.
	pub const ALL: [NodeKind; 3] = [NodeKind::Publication, NodeKind::Author, NodeKind::Concept];

	/// Plural display name.
	pub fn plural(self) -> &'static str {
		match self {
			NodeKind::Publication => "Publications",
			NodeKind::Author => "Authors",
			NodeKind::Concept => "Concepts",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicationNode {
	pub id: NodeId,
	pub publication_id: u32,
	/// Truncated title for display.
	pub label: String,
	pub full_title: String,
	pub category: String,
	pub organism: String,
	pub link: String,
	pub is_central: bool,
}

impl PublicationNode {
	/// Reconstruct the source publication, for selection events.
	pub fn publication(&self) -> Publication {
		Publication {
			id: self.publication_id,
			title: self.full_title.clone(),
			link: self.link.clone(),
			category: self.category.clone(),
			organism: self.organism.clone(),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorNode {
	pub id: NodeId,
	pub label: String,
	pub linked_publication_ids: BTreeSet<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConceptNode {
	pub id: NodeId,
	pub label: String,
}

/// A node in the knowledge graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphNode {
	/// A publication, central or related.
	Publication(PublicationNode),
	/// An author inferred from a publication.
	Author(AuthorNode),
	/// A concept shared by publications.
	Concept(ConceptNode),
}

impl GraphNode {
	/// The node's unique id.
	pub fn id(&self) -> &str {
		match self {
			GraphNode::Publication(n) => &n.id,
			GraphNode::Author(n) => &n.id,
			GraphNode::Concept(n) => &n.id,
		}
	}

	/// Display label.
	pub fn label(&self) -> &str {
		match self {
			GraphNode::Publication(n) => &n.label,
			GraphNode::Author(n) => &n.label,
			GraphNode::Concept(n) => &n.label,
		}
	}

	/// Discriminant.
	pub fn kind(&self) -> NodeKind {
		match self {
			GraphNode::Publication(_) => NodeKind::Publication,
			GraphNode::Author(_) => NodeKind::Author,
			GraphNode::Concept(_) => NodeKind::Concept,
		}
	}

	/// True only for the focused publication.
	pub fn is_central(&self) -> bool {
		matches!(self, GraphNode::Publication(n) if n.is_central)
	}

	/// Case-insensitive search match. Publications also match on their full title,
	/// since the label may be truncated.
	pub fn matches(&self, needle_lower: &str) -> bool {
		if needle_lower.is_empty() {
			return true;
		}
		if self.label().to_lowercase().contains(needle_lower) {
			return true;
		}
		match self {
			GraphNode::Publication(n) => n.full_title.to_lowercase().contains(needle_lower),
			_ => false,
		}
	}
}

/// Semantic relation carried by an edge. Layout treats all edges as undirected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeKind {
	/// Publication → concept.
	Studies,
	/// Author → publication.
	Authored,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphEdge {
	pub source: NodeId,
	pub target: NodeId,
	pub kind: EdgeKind,
	/// Edges attached to related (non-focused) publications.
	pub is_secondary: bool,
}

impl GraphEdge {
	/// True if either endpoint is `id`.
	pub fn touches(&self, id: &str) -> bool {
		self.source == id || self.target == id
	}

	/// The endpoint opposite `id`, if the edge touches it.
	pub fn other(&self, id: &str) -> Option<&str> {
		if self.source == id {
			Some(&self.target)
		} else if self.target == id {
			Some(&self.source)
		} else {
			None
		}
	}
}

/// Per-kind node counts over the full graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TypeCounts {
	pub publications: usize,
	pub authors: usize,
	pub concepts: usize,
}

impl TypeCounts {
	/// Count for one kind.
	pub fn get(&self, kind: NodeKind) -> usize {
		match kind {
			NodeKind::Publication => self.publications,
			NodeKind::Author => self.authors,
			NodeKind::Concept => self.concepts,
		}
	}
}

/// A built knowledge graph. Node ids are unique and every edge endpoint
/// resolves to a node in `nodes`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
	pub nodes: BTreeMap<NodeId, GraphNode>,
	pub edges: Vec<GraphEdge>,
}

impl Graph {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.get(id)
	}

	/// The focused publication node, if any.
	pub fn central(&self) -> Option<&PublicationNode> {
		self.nodes.values().find_map(|n| match n {
			GraphNode::Publication(p) if p.is_central => Some(p),
			_ => None,
		})
	}

	pub fn type_counts(&self) -> TypeCounts {
		let mut counts = TypeCounts::default();
		for node in self.nodes.values() {
			match node.kind() {
				NodeKind::Publication => counts.publications += 1,
				NodeKind::Author => counts.authors += 1,
				NodeKind::Concept => counts.concepts += 1,
			}
		}
		counts
	}
}
