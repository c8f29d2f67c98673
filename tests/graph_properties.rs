//! Property-based tests for the knowledge graph.
//!
//! These verify invariants that hold for any corpus and focus:
//! - Deterministic topology across rebuilds
//! - Node id uniqueness and edge validity
//! - Bounded relatedness
//! - Visibility monotonicity and hover symmetry

use std::collections::{BTreeMap, HashSet};

use proptest::prelude::*;
use publication_graph::components::knowledge_graph::{
	Graph, InteractionState, MAX_RELATED, NodeKind, Publication, Vocabulary, build, derive,
};

const CATEGORIES: &[&str] = &[
	"Radiation Biology",
	"Plant Biology",
	"Immunology",
	"Bone & Musculoskeletal",
];

const WORDS: &[&str] = &[
	"microgravity", "radiation", "bone", "muscle", "plant", "cell", "gene", "immune", "orbit",
	"sleep", "mice", "effects", "space", "",
];

fn arb_title() -> impl Strategy<Value = String> {
	prop::collection::vec(prop::sample::select(WORDS), 0..6).prop_map(|ws| ws.join(" "))
}

fn arb_publication() -> impl Strategy<Value = Publication> {
	(0u32..40, arb_title(), prop::sample::select(CATEGORIES)).prop_map(|(id, title, category)| {
		Publication {
			id,
			title,
			link: format!("https://example.org/{id}"),
			category: category.to_string(),
			organism: "Mouse".to_string(),
		}
	})
}

fn arb_corpus_and_focus() -> impl Strategy<Value = (Vec<Publication>, usize)> {
	prop::collection::vec(arb_publication(), 1..25)
		.prop_flat_map(|corpus| {
			let n = corpus.len();
			(Just(corpus), 0..n)
		})
}

fn arb_visibility() -> impl Strategy<Value = (bool, bool, bool)> {
	(any::<bool>(), any::<bool>(), any::<bool>())
}

fn edge_multiset(graph: &Graph) -> BTreeMap<(String, String, String, bool), usize> {
	let mut out = BTreeMap::new();
	for e in &graph.edges {
		*out
			.entry((e.source.clone(), e.target.clone(), format!("{:?}", e.kind), e.is_secondary))
			.or_insert(0) += 1;
	}
	out
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(200))]

	#[test]
	fn rebuild_is_deterministic((corpus, focus) in arb_corpus_and_focus()) {
		let vocab = Vocabulary::default();
		let a = build(&corpus, corpus.get(focus), &vocab);
		let b = build(&corpus, corpus.get(focus), &vocab);
		prop_assert_eq!(a.nodes.keys().collect::<Vec<_>>(), b.nodes.keys().collect::<Vec<_>>());
		prop_assert_eq!(edge_multiset(&a), edge_multiset(&b));
	}

	#[test]
	fn ids_unique_and_edges_valid((corpus, focus) in arb_corpus_and_focus()) {
		let graph = build(&corpus, corpus.get(focus), &Vocabulary::default());
		let ids: HashSet<&str> = graph.nodes.values().map(|n| n.id()).collect();
		prop_assert_eq!(ids.len(), graph.nodes.len());
		for (key, node) in &graph.nodes {
			prop_assert_eq!(key.as_str(), node.id());
		}
		for e in &graph.edges {
			prop_assert!(graph.nodes.contains_key(&e.source), "dangling source {}", e.source);
			prop_assert!(graph.nodes.contains_key(&e.target), "dangling target {}", e.target);
		}
	}

	#[test]
	fn related_publications_bounded((corpus, focus) in arb_corpus_and_focus()) {
		let graph = build(&corpus, corpus.get(focus), &Vocabulary::default());
		let related = graph
			.nodes
			.values()
			.filter(|n| n.kind() == NodeKind::Publication && !n.is_central())
			.count();
		prop_assert!(related <= MAX_RELATED);
		prop_assert!(graph.nodes.values().filter(|n| n.is_central()).count() <= 1);
	}

	#[test]
	fn disabling_a_type_only_removes(
		(corpus, focus) in arb_corpus_and_focus(),
		(p, a, c) in arb_visibility(),
		kind in prop::sample::select(NodeKind::ALL.to_vec()),
		term in prop::sample::select(vec!["", "bone", "radiation", "pub", "a"]),
	) {
		let graph = build(&corpus, corpus.get(focus), &Vocabulary::default());
		let mut state = InteractionState {
			search_term: term.to_string(),
			..Default::default()
		};
		state.type_visibility.publications = p;
		state.type_visibility.authors = a;
		state.type_visibility.concepts = c;
		let before = derive(&graph, &state);

		state.type_visibility.set(kind, false);
		let after = derive(&graph, &state);

		for id in after.nodes.keys() {
			prop_assert!(before.contains(id));
		}
		prop_assert!(after.nodes.values().all(|(n, _)| n.kind() != kind));
		prop_assert!(after.edges.len() <= before.edges.len());
		for (e, _) in &after.edges {
			prop_assert!(after.contains(&e.source) && after.contains(&e.target));
		}
	}

	#[test]
	fn hover_neighbourhood_is_symmetric(
		(corpus, focus) in arb_corpus_and_focus(),
		(p, a, c) in arb_visibility(),
	) {
		let graph = build(&corpus, corpus.get(focus), &Vocabulary::default());
		let mut state = InteractionState::default();
		state.type_visibility.publications = p;
		state.type_visibility.authors = a;
		state.type_visibility.concepts = c;

		let neighbourhoods: BTreeMap<&str, Vec<String>> = graph
			.nodes
			.keys()
			.map(|id| {
				state.hovered = Some(id.clone());
				let view = derive(&graph, &state);
				let highlighted = view.highlighted.iter().map(|s| s.to_string()).collect();
				(id.as_str(), highlighted)
			})
			.collect();

		for (a, highlighted) in &neighbourhoods {
			for b in highlighted {
				prop_assert!(
					neighbourhoods[b.as_str()].iter().any(|x| x.as_str() == *a),
					"{} highlights {} but not the reverse", a, b
				);
			}
		}
	}
}
