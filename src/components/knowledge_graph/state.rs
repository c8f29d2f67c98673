use super::filter::{InteractionState, TypeVisibility, VisibleGraph, derive};
use super::layout::{Bounds, LayoutParams, Simulation};
use super::types::{Graph, GraphNode, NodeId, Publication};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 4.0;
/// Extra world-space slack around a node's radius for hit testing.
pub const HIT_SLOP: f64 = 2.0;
/// Pointer travel (screen px) below which a press-release counts as a click.
pub const CLICK_TOLERANCE: f64 = 4.0;

#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<NodeId>,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverFade {
	pub highlight_t: f64,
	/// Last hovered node, kept while the emphasis fades out.
	pub prev_node: Option<NodeId>,
}

/// Messages from the surface to the host.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceEvent {
	/// A publication node was clicked.
	PublicationSelected(Publication),
}

/// Everything the canvas needs between frames: topology, layout, view and
/// pointer state. Free of browser types so it can be driven from tests.
pub struct SurfaceState {
	pub graph: Graph,
	pub simulation: Simulation,
	pub interaction: InteractionState,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverFade,
	pub width: f64,
	pub height: f64,
}

impl SurfaceState {
	pub fn new(graph: Graph, width: f64, height: f64) -> Self {
		let simulation = Simulation::new(&graph, Bounds { width, height }, LayoutParams::default());
		Self {
			graph,
			simulation,
			interaction: InteractionState::default(),
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverFade::default(),
			width,
			height,
		}
	}

	/// The visible subgraph; a fading hover keeps its emphasis until faded out.
	pub fn visible(&self) -> VisibleGraph<'_> {
		if self.interaction.hovered.is_none() && self.hover.prev_node.is_some() {
			let fading = InteractionState {
				hovered: self.hover.prev_node.clone(),
				..self.interaction.clone()
			};
			return derive(&self.graph, &fading);
		}
		derive(&self.graph, &self.interaction)
	}

	pub fn set_search(&mut self, term: &str) {
		self.interaction.search_term = term.to_string();
	}

	pub fn set_visibility(&mut self, visibility: TypeVisibility) {
		self.interaction.type_visibility = visibility;
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Closest visible node under the pointer.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<NodeId> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let params = self.simulation.params();
		let view = self.visible();
		let mut found: Option<(&str, f64)> = None;
		for (id, (node, _)) in &view.nodes {
			let Some((x, y)) = self.simulation.position(id) else {
				continue;
			};
			let d = ((x - gx).powi(2) + (y - gy).powi(2)).sqrt();
			if d <= params.radius(node) + HIT_SLOP && found.is_none_or(|(_, best)| d < best) {
				found = Some((*id, d));
			}
		}
		found.map(|(id, _)| id.to_string())
	}

	pub fn set_hover(&mut self, node: Option<NodeId>) {
		if self.interaction.hovered == node {
			return;
		}
		// Keep the outgoing node around so its emphasis can fade out.
		self.hover.prev_node = if node.is_none() {
			self.interaction.hovered.take()
		} else {
			None
		};
		self.interaction.hovered = node;
	}

	pub fn has_active_highlight(&self) -> bool {
		self.interaction.hovered.is_some() || self.hover.prev_node.is_some()
	}

	/// Start a drag on a node, or a pan on empty canvas. The node is pinned
	/// only once the pointer leaves the click tolerance.
	pub fn pointer_down(&mut self, x: f64, y: f64) {
		if let Some(id) = self.node_at_position(x, y) {
			let (nx, ny) = self.simulation.position(&id).unwrap_or_else(|| self.screen_to_graph(x, y));
			self.drag = DragState {
				node: Some(id),
				moved: false,
				start_x: x,
				start_y: y,
				node_start_x: nx,
				node_start_y: ny,
			};
		} else {
			self.pan = PanState {
				active: true,
				start_x: x,
				start_y: y,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		if let Some(id) = self.drag.node.clone() {
			let (dx, dy) = (x - self.drag.start_x, y - self.drag.start_y);
			if (dx * dx + dy * dy).sqrt() > CLICK_TOLERANCE {
				self.drag.moved = true;
			}
			if self.drag.moved {
				let k = self.transform.k;
				self.simulation
					.pin(&id, self.drag.node_start_x + dx / k, self.drag.node_start_y + dy / k);
			}
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		} else {
			let hovered = self.node_at_position(x, y);
			self.set_hover(hovered);
		}
	}

	/// End the gesture. A press-release on a publication node without moving
	/// selects it.
	pub fn pointer_up(&mut self) -> Option<SurfaceEvent> {
		self.pan.active = false;
		let drag = std::mem::take(&mut self.drag);
		let id = drag.node?;
		if drag.moved {
			self.simulation.unpin(&id);
			return None;
		}
		self.interaction.selected = Some(id.clone());
		match self.graph.node(&id) {
			Some(GraphNode::Publication(p)) => Some(SurfaceEvent::PublicationSelected(p.publication())),
			_ => None,
		}
	}

	pub fn pointer_leave(&mut self) {
		let drag = std::mem::take(&mut self.drag);
		if let (Some(id), true) = (drag.node, drag.moved) {
			self.simulation.unpin(&id);
		}
		self.pan.active = false;
		self.set_hover(None);
	}

	/// Zoom about a screen point, clamped to [`MIN_ZOOM`, `MAX_ZOOM`].
	pub fn zoom(&mut self, x: f64, y: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Advance the layout (only while hot) and the hover fade.
	pub fn tick(&mut self, dt: f64) {
		self.simulation.tick();

		let (target, speed) = if self.interaction.hovered.is_some() {
			(1.0, 9.0)
		} else {
			(0.0, 6.0)
		};
		self.hover.highlight_t += (target - self.hover.highlight_t) * (speed * dt).min(1.0);
		if self.interaction.hovered.is_none() && self.hover.highlight_t < 0.01 {
			self.hover.highlight_t = 0.0;
			self.hover.prev_node = None;
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.simulation.resize(Bounds { width, height });
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::knowledge_graph::builder::build;
	use crate::components::knowledge_graph::extract::Vocabulary;

	fn corpus() -> Vec<Publication> {
		vec![
			Publication {
				id: 1,
				title: "Muscle atrophy in astronaut crews".into(),
				link: "https://example.org/1".into(),
				category: "Cardiovascular & Muscle".into(),
				organism: "Human".into(),
			},
			Publication {
				id: 2,
				title: "Cardiac muscle remodeling".into(),
				link: "https://example.org/2".into(),
				category: "Cardiovascular & Muscle".into(),
				organism: "Mouse".into(),
			},
		]
	}

	fn surface() -> SurfaceState {
		let corpus = corpus();
		let graph = build(&corpus, corpus.first(), &Vocabulary::default());
		SurfaceState::new(graph, 800.0, 600.0)
	}

	fn screen_position(s: &SurfaceState, id: &str) -> (f64, f64) {
		let (x, y) = s.simulation.position(id).unwrap();
		(x * s.transform.k + s.transform.x, y * s.transform.k + s.transform.y)
	}

	#[test]
	fn click_on_publication_emits_selection() {
		let mut s = surface();
		for _ in 0..50 {
			s.tick(0.016);
		}
		let (x, y) = screen_position(&s, "pub_2");
		s.pointer_down(x, y);
		let event = s.pointer_up();
		assert_eq!(event, Some(SurfaceEvent::PublicationSelected(corpus()[1].clone())));
		assert_eq!(s.interaction.selected.as_deref(), Some("pub_2"));
	}

	#[test]
	fn click_on_concept_selects_without_event() {
		let mut s = surface();
		let (x, y) = screen_position(&s, "concept_muscle");
		s.pointer_down(x, y);
		assert_eq!(s.pointer_up(), None);
		assert_eq!(s.interaction.selected.as_deref(), Some("concept_muscle"));
	}

	#[test]
	fn drag_moves_and_releases_node() {
		let mut s = surface();
		let (x, y) = screen_position(&s, "pub_1");
		s.pointer_down(x, y);
		s.pointer_move(x + 50.0, y + 20.0);
		assert_eq!(s.simulation.body("pub_1").unwrap().pinned, Some((400.0 + 50.0, 300.0 + 20.0)));
		assert_eq!(s.pointer_up(), None);
		assert!(s.simulation.body("pub_1").unwrap().pinned.is_none());
		assert!(s.simulation.is_hot());
	}

	#[test]
	fn click_does_not_reheat_settled_layout() {
		let mut s = surface();
		for _ in 0..2000 {
			if !s.simulation.is_hot() {
				break;
			}
			s.tick(0.016);
		}
		assert!(!s.simulation.is_hot());

		let (x, y) = screen_position(&s, "pub_2");
		s.pointer_down(x, y);
		s.pointer_move(x + 1.0, y + 1.0);
		assert!(!s.simulation.is_hot());
		assert!(s.simulation.body("pub_2").unwrap().pinned.is_none());
		assert!(s.pointer_up().is_some());
		assert!(!s.simulation.is_hot());
	}

	#[test]
	fn empty_canvas_pans() {
		let mut s = surface();
		s.pointer_down(5.0, 5.0);
		s.pointer_move(25.0, 15.0);
		assert_eq!((s.transform.x, s.transform.y), (20.0, 10.0));
		assert_eq!(s.pointer_up(), None);
		assert!(!s.pan.active);
	}

	#[test]
	fn zoom_is_clamped() {
		let mut s = surface();
		for _ in 0..100 {
			s.zoom(400.0, 300.0, -1.0);
		}
		assert_eq!(s.transform.k, MAX_ZOOM);
		for _ in 0..100 {
			s.zoom(400.0, 300.0, 1.0);
		}
		assert_eq!(s.transform.k, MIN_ZOOM);
	}

	#[test]
	fn hidden_nodes_cannot_be_hit() {
		let mut s = surface();
		let (x, y) = screen_position(&s, "pub_1");
		assert_eq!(s.node_at_position(x, y).as_deref(), Some("pub_1"));
		s.set_search("no such label");
		assert_eq!(s.node_at_position(x, y), None);
	}

	#[test]
	fn hover_fades_out_after_clear() {
		let mut s = surface();
		s.set_hover(Some("pub_1".into()));
		for _ in 0..30 {
			s.tick(0.016);
		}
		assert!(s.hover.highlight_t > 0.9);
		s.set_hover(None);
		assert!(s.has_active_highlight());
		for _ in 0..200 {
			s.tick(0.016);
		}
		assert!(!s.has_active_highlight());
		assert!(s.visible().highlighted.is_empty());
	}
}
