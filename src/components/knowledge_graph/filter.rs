//! Visible-subgraph derivation and hover emphasis.

use std::collections::{BTreeMap, BTreeSet};

use super::types::{Graph, GraphEdge, GraphNode, NodeId, NodeKind};

/// Opacity applied to nodes and edges outside the hover neighbourhood.
pub const DIMMED_OPACITY: f64 = 0.2;

/// Per-kind visibility toggles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeVisibility {
	pub publications: bool,
	pub authors: bool,
	pub concepts: bool,
}

impl Default for TypeVisibility {
	fn default() -> Self {
		Self {
			publications: true,
			authors: true,
			concepts: true,
		}
	}
}

impl TypeVisibility {
	pub fn allows(&self, kind: NodeKind) -> bool {
		match kind {
			NodeKind::Publication => self.publications,
			NodeKind::Author => self.authors,
			NodeKind::Concept => self.concepts,
		}
	}

	pub fn set(&mut self, kind: NodeKind, visible: bool) {
		match kind {
			NodeKind::Publication => self.publications = visible,
			NodeKind::Author => self.authors = visible,
			NodeKind::Concept => self.concepts = visible,
		}
	}
}

/// User-controlled view state, owned by the interaction surface.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InteractionState {
	pub hovered: Option<NodeId>,
	pub selected: Option<NodeId>,
	pub search_term: String,
	pub type_visibility: TypeVisibility,
}

/// How strongly an element is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
	/// No hover active, or part of the hovered neighbourhood.
	Normal,
	/// The hovered node itself.
	Hovered,
	/// Outside the hovered neighbourhood.
	Dimmed,
}

impl Emphasis {
	pub fn opacity(self) -> f64 {
		match self {
			Emphasis::Normal | Emphasis::Hovered => 1.0,
			Emphasis::Dimmed => DIMMED_OPACITY,
		}
	}
}

/// Read-only projection of a [`Graph`] under an [`InteractionState`].
#[derive(Clone, Debug, PartialEq)]
pub struct VisibleGraph<'g> {
	pub nodes: BTreeMap<&'g str, (&'g GraphNode, Emphasis)>,
	pub edges: Vec<(&'g GraphEdge, Emphasis)>,
	/// Neighbours of the hovered node over visible edges; empty without hover.
	pub highlighted: BTreeSet<&'g str>,
}

impl<'g> VisibleGraph<'g> {
	pub fn contains(&self, id: &str) -> bool {
		self.nodes.contains_key(id)
	}

	pub fn emphasis(&self, id: &str) -> Option<Emphasis> {
		self.nodes.get(id).map(|(_, e)| *e)
	}
}

/// Neighbours of `id` over the given edges, ignoring direction.
pub fn neighbors_over<'g>(
	edges: impl IntoIterator<Item = &'g GraphEdge>,
	id: &str,
) -> BTreeSet<&'g str> {
	edges.into_iter().filter_map(|e| e.other(id)).collect()
}

/// Derive the visible subgraph and hover emphasis.
///
/// A node is visible iff its kind is enabled and it matches the search term;
/// an edge is visible iff both endpoints are. Hover only applies when the
/// hovered node is itself visible.
pub fn derive<'g>(graph: &'g Graph, state: &InteractionState) -> VisibleGraph<'g> {
	let needle = state.search_term.trim().to_lowercase();
	let visible: BTreeSet<&str> = graph
		.nodes
		.values()
		.filter(|n| state.type_visibility.allows(n.kind()) && n.matches(&needle))
		.map(GraphNode::id)
		.collect();

	let edges: Vec<&GraphEdge> = graph
		.edges
		.iter()
		.filter(|e| visible.contains(e.source.as_str()) && visible.contains(e.target.as_str()))
		.collect();

	let hovered = state
		.hovered
		.as_deref()
		.filter(|id| visible.contains(id));
	let highlighted = match hovered {
		Some(id) => neighbors_over(edges.iter().copied(), id),
		None => BTreeSet::new(),
	};

	let nodes = graph
		.nodes
		.values()
		.filter(|n| visible.contains(n.id()))
		.map(|n| {
			let emphasis = match hovered {
				None => Emphasis::Normal,
				Some(h) if h == n.id() => Emphasis::Hovered,
				Some(_) if highlighted.contains(n.id()) => Emphasis::Normal,
				Some(_) => Emphasis::Dimmed,
			};
			(n.id(), (n, emphasis))
		})
		.collect();

	let edges = edges
		.into_iter()
		.map(|e| {
			let emphasis = match hovered {
				Some(h) if !e.touches(h) => Emphasis::Dimmed,
				_ => Emphasis::Normal,
			};
			(e, emphasis)
		})
		.collect();

	VisibleGraph {
		nodes,
		edges,
		highlighted,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::knowledge_graph::builder::build;
	use crate::components::knowledge_graph::extract::Vocabulary;
	use crate::components::knowledge_graph::types::{EdgeKind, Publication};

	fn graph() -> Graph {
		let corpus = vec![
			Publication {
				id: 1,
				title: "Bone Density in Microgravity".into(),
				link: String::new(),
				category: "Bone & Musculoskeletal".into(),
				organism: "Human".into(),
			},
			Publication {
				id: 2,
				title: "Bone marrow stem cells".into(),
				link: String::new(),
				category: "Bone & Musculoskeletal".into(),
				organism: "Mouse".into(),
			},
		];
		build(&corpus, corpus.first(), &Vocabulary::default())
	}

	#[test]
	fn everything_visible_by_default() {
		let g = graph();
		let view = derive(&g, &InteractionState::default());
		assert_eq!(view.nodes.len(), g.nodes.len());
		assert_eq!(view.edges.len(), g.edges.len());
		assert!(view.nodes.values().all(|(_, e)| *e == Emphasis::Normal));
	}

	#[test]
	fn hiding_authors_drops_authored_edges() {
		let g = graph();
		let mut state = InteractionState::default();
		state.type_visibility.set(NodeKind::Author, false);
		let view = derive(&g, &state);
		assert!(view.nodes.values().all(|(n, _)| n.kind() != NodeKind::Author));
		assert!(view.edges.iter().all(|(e, _)| e.kind != EdgeKind::Authored));
	}

	#[test]
	fn search_is_case_insensitive() {
		let g = graph();
		let state = InteractionState {
			search_term: "MICROgravity".into(),
			..Default::default()
		};
		let view = derive(&g, &state);
		assert!(view.contains("pub_1"));
		assert!(view.contains("concept_microgravity"));
		assert!(!view.contains("pub_2"));
		assert!(view.edges.iter().all(|(e, _)| view.contains(&e.source) && view.contains(&e.target)));
	}

	#[test]
	fn hover_dims_outside_neighbourhood() {
		let g = graph();
		let state = InteractionState {
			hovered: Some("concept_microgravity".into()),
			..Default::default()
		};
		let view = derive(&g, &state);
		assert_eq!(view.emphasis("concept_microgravity"), Some(Emphasis::Hovered));
		assert_eq!(view.emphasis("pub_1"), Some(Emphasis::Normal));
		assert_eq!(view.emphasis("pub_2"), Some(Emphasis::Dimmed));
		assert!(view.highlighted.contains("pub_1"));
		for (edge, emphasis) in &view.edges {
			assert_eq!(*emphasis == Emphasis::Normal, edge.touches("concept_microgravity"));
		}
	}

	#[test]
	fn hover_on_hidden_node_is_ignored() {
		let g = graph();
		let mut state = InteractionState {
			hovered: Some("concept_microgravity".into()),
			..Default::default()
		};
		state.type_visibility.concepts = false;
		let view = derive(&g, &state);
		assert!(view.highlighted.is_empty());
		assert!(view.nodes.values().all(|(_, e)| *e == Emphasis::Normal));
	}
}
