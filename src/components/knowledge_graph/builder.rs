//! Builds the focused knowledge graph from a corpus.

use std::collections::BTreeMap;

use log::info;

use super::extract::{Vocabulary, slugify};
use super::types::{
	AuthorNode, ConceptNode, EdgeKind, Graph, GraphEdge, GraphNode, NodeId, Publication,
	PublicationNode,
};

/// Upper bound on related publications attached to the focus.
pub const MAX_RELATED: usize = 8;
pub const CENTRAL_LABEL_LEN: usize = 50;
pub const RELATED_LABEL_LEN: usize = 40;

pub fn publication_id(id: u32) -> NodeId {
	format!("pub_{id}")
}

pub fn author_id(name: &str) -> NodeId {
	format!("author_{}", slugify(name))
}

pub fn concept_id(label: &str) -> NodeId {
	format!("concept_{}", label.to_lowercase())
}

/// Truncate to `max` characters, appending an ellipsis when shortened.
pub fn truncate(title: &str, max: usize) -> String {
	if title.chars().count() <= max {
		return title.to_string();
	}
	let mut out: String = title.chars().take(max).collect();
	out.push_str("...");
	out
}

/// Id-keyed node arena. Reuse is always by computed id, never by reference.
struct GraphBuilder<'v> {
	vocab: &'v Vocabulary,
	nodes: BTreeMap<NodeId, GraphNode>,
	edges: Vec<GraphEdge>,
}

impl<'v> GraphBuilder<'v> {
	fn new(vocab: &'v Vocabulary) -> Self {
		Self {
			vocab,
			nodes: BTreeMap::new(),
			edges: Vec::new(),
		}
	}

	/// Returns the node id, or `None` if the publication was already present.
	fn add_publication(&mut self, publication: &Publication, is_central: bool) -> Option<NodeId> {
		let id = publication_id(publication.id);
		if self.nodes.contains_key(&id) {
			return None;
		}
		let max = if is_central {
			CENTRAL_LABEL_LEN
		} else {
			RELATED_LABEL_LEN
		};
		let node = PublicationNode {
			id: id.clone(),
			publication_id: publication.id,
			label: truncate(&publication.title, max),
			full_title: publication.title.clone(),
			category: publication.category.clone(),
			organism: publication.organism.clone(),
			link: publication.link.clone(),
			is_central,
		};
		self.nodes.insert(id.clone(), GraphNode::Publication(node));
		Some(id)
	}

	fn upsert_concept(&mut self, label: &str) -> NodeId {
		let id = concept_id(label);
		self.nodes.entry(id.clone()).or_insert_with(|| {
			GraphNode::Concept(ConceptNode {
				id: id.clone(),
				label: label.to_string(),
			})
		});
		id
	}

	/// Creates or extends the author node. Returns `None` if the author was
	/// already linked to this publication.
	fn upsert_author(&mut self, name: &str, publication: u32) -> Option<NodeId> {
		let id = author_id(name);
		let node = self.nodes.entry(id.clone()).or_insert_with(|| {
			GraphNode::Author(AuthorNode {
				id: id.clone(),
				label: name.to_string(),
				linked_publication_ids: Default::default(),
			})
		});
		match node {
			GraphNode::Author(author) => author.linked_publication_ids.insert(publication).then_some(id),
			_ => None,
		}
	}

	fn link(&mut self, source: NodeId, target: NodeId, kind: EdgeKind, is_secondary: bool) {
		self.edges.push(GraphEdge {
			source,
			target,
			kind,
			is_secondary,
		});
	}

	fn attach_authors(&mut self, publication: &Publication, node: &NodeId, is_secondary: bool) {
		for name in self.vocab.authors(publication) {
			if let Some(author) = self.upsert_author(&name, publication.id) {
				self.link(author, node.clone(), EdgeKind::Authored, is_secondary);
			}
		}
	}

	fn finish(self) -> Graph {
		Graph {
			nodes: self.nodes,
			edges: self.edges,
		}
	}
}

fn is_blank(publication: &Publication) -> bool {
	publication.title.trim().is_empty()
}

/// Build the graph anchored at `focus`.
///
/// The focus gets its concepts and authors as primary edges. Up to
/// [`MAX_RELATED`] other publications sharing its category or a concept are
/// attached through the focus's concept nodes and their own authors, all as
/// secondary edges. A missing or blank focus yields an empty graph.
pub fn build(corpus: &[Publication], focus: Option<&Publication>, vocab: &Vocabulary) -> Graph {
	let Some(focus) = focus.filter(|f| !is_blank(f)) else {
		return Graph::default();
	};

	let mut builder = GraphBuilder::new(vocab);
	let central = publication_id(focus.id);
	builder.add_publication(focus, true);

	let concepts = vocab.concepts(&focus.title, &focus.category);
	let mut concept_ids = Vec::with_capacity(concepts.len());
	for label in &concepts {
		let id = builder.upsert_concept(label);
		builder.link(central.clone(), id.clone(), EdgeKind::Studies, false);
		concept_ids.push(id);
	}
	builder.attach_authors(focus, &central, false);

	let related = corpus
		.iter()
		.filter(|p| p.id != focus.id && !is_blank(p))
		.filter(|p| {
			p.category == focus.category
				|| vocab
					.concepts(&p.title, &p.category)
					.iter()
					.any(|c| concept_ids.contains(&concept_id(c)))
		})
		.take(MAX_RELATED);

	for publication in related {
		let Some(node) = builder.add_publication(publication, false) else {
			continue;
		};
		for label in vocab.concepts(&publication.title, &publication.category) {
			let id = concept_id(&label);
			if concept_ids.contains(&id) {
				builder.link(node.clone(), id, EdgeKind::Studies, true);
			}
		}
		builder.attach_authors(publication, &node, true);
	}

	let graph = builder.finish();
	info!(
		"knowledge graph built for pub {}: {} nodes, {} edges",
		focus.id,
		graph.nodes.len(),
		graph.edges.len()
	);
	graph
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;
	use crate::components::knowledge_graph::types::NodeKind;

	fn publication(id: u32, title: &str, category: &str) -> Publication {
		Publication {
			id,
			title: title.into(),
			link: format!("https://example.org/{id}"),
			category: category.into(),
			organism: "Human".into(),
		}
	}

	#[test]
	fn truncate_appends_ellipsis() {
		assert_eq!(truncate("short", 10), "short");
		assert_eq!(truncate("abcdefghij", 4), "abcd...");
		assert_eq!(truncate("ééééé", 3), "ééé...");
	}

	#[test]
	fn missing_focus_is_empty() {
		let corpus = vec![publication(1, "Bone", "Bone & Musculoskeletal")];
		let vocab = Vocabulary::default();
		assert!(build(&corpus, None, &vocab).is_empty());
		let blank = publication(2, "   ", "x");
		assert!(build(&corpus, Some(&blank), &vocab).is_empty());
	}

	#[test]
	fn central_label_truncated_to_fifty() {
		let title = "A".repeat(80);
		let focus = publication(1, &title, "General Space Biology");
		let graph = build(&[focus.clone()], Some(&focus), &Vocabulary::default());
		let central = graph.central().unwrap();
		assert_eq!(central.label.chars().count(), 53);
		assert_eq!(central.full_title, title);
	}

	#[test]
	fn related_share_concept_not_category() {
		let focus = publication(1, "Radiation damage", "Radiation Biology");
		let other = publication(2, "Cosmic radiation in plants", "Plant Biology");
		let unrelated = publication(3, "Sleep cycles", "Neuroscience & Behavior");
		let corpus = vec![focus.clone(), other, unrelated];
		let graph = build(&corpus, Some(&focus), &Vocabulary::default());

		assert!(graph.node("pub_2").is_some());
		assert!(graph.node("pub_3").is_none());
		// Plant Biology is not one of the focus concepts, so no node for it.
		assert!(graph.node("concept_plant biology").is_none());
		assert!(graph.edges.iter().any(|e| e.source == "pub_2"
			&& e.target == "concept_radiation"
			&& e.is_secondary));
	}

	#[test]
	fn case_variant_concepts_get_one_edge() {
		let vocab = Vocabulary {
			keywords: vec!["ökologie".into()],
			..Vocabulary::default()
		};
		let focus = publication(1, "Ökologie im All", "ökologie");
		let other = publication(2, "Ökologie der Wurzeln", "Ökologie");
		let graph = build(&[focus.clone(), other], Some(&focus), &vocab);

		let studies: Vec<_> = graph
			.edges
			.iter()
			.filter(|e| e.target == "concept_ökologie")
			.map(|e| (e.source.as_str(), e.is_secondary))
			.collect();
		assert_eq!(studies, vec![("pub_1", false), ("pub_2", true)]);
	}

	#[test]
	fn shared_authors_are_reused() {
		// Ids 1 and 9 both start at pool index 1 for first and last names.
		let focus = publication(1, "Bone loss", "Bone & Musculoskeletal");
		let other = publication(9, "Bone repair", "Bone & Musculoskeletal");
		let graph = build(&[focus.clone(), other], Some(&focus), &Vocabulary::default());

		let shared = author_id("Michael Rodriguez");
		match graph.node(&shared) {
			Some(GraphNode::Author(a)) => {
				assert_eq!(a.linked_publication_ids.iter().copied().collect::<Vec<_>>(), vec![1, 9]);
			}
			other => panic!("expected author node, got {other:?}"),
		}
		let ids: HashSet<_> = graph.nodes.keys().collect();
		assert_eq!(ids.len(), graph.nodes.len());
	}

	#[test]
	fn duplicate_corpus_ids_do_not_duplicate_nodes() {
		let focus = publication(1, "Cell growth", "Cell & Tissue Biology");
		let twin = publication(2, "Cell growth", "Cell & Tissue Biology");
		let corpus = vec![focus.clone(), twin.clone(), twin];
		let graph = build(&corpus, Some(&focus), &Vocabulary::default());
		let pubs = graph
			.nodes
			.values()
			.filter(|n| n.kind() == NodeKind::Publication)
			.count();
		assert_eq!(pubs, 2);
	}
}
