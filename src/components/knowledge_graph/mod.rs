//! Knowledge graph of a focused publication: construction, layout, filtering
//! and the canvas that ties them together.

mod builder;
mod component;
mod extract;
mod filter;
mod layout;
mod render;
mod state;
mod types;

pub use builder::{MAX_RELATED, author_id, build, concept_id, publication_id, truncate};
pub use component::KnowledgeGraphCanvas;
pub use extract::{Vocabulary, slugify};
pub use filter::{DIMMED_OPACITY, Emphasis, InteractionState, TypeVisibility, VisibleGraph, derive};
pub use layout::{Body, Bounds, LayoutParams, Simulation};
pub use render::kind_color;
pub use state::{MAX_ZOOM, MIN_ZOOM, SurfaceEvent, SurfaceState};
pub use types::{
	AuthorNode, ConceptNode, EdgeKind, Graph, GraphEdge, GraphNode, NodeId, NodeKind, Publication,
	PublicationNode, TypeCounts,
};
