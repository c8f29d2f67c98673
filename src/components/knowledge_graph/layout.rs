//! Force-directed layout over a built [`Graph`].
//!
//! Positions live in a [`Simulation`] table indexed by node id, separate from
//! the graph topology. Each [`Simulation::tick`] applies many-body repulsion,
//! link springs, collision and centering, then integrates velocities. The
//! simulation cools as `alpha` decays and stops ticking once it settles.

use std::collections::HashMap;
use std::f64::consts::PI;

use log::{debug, warn};

use super::types::{EdgeKind, Graph, GraphNode, NodeId};

/// Canvas size the layout is centered in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub width: f64,
	pub height: f64,
}

/// Tunable force constants.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutParams {
	pub charge_central: f64,
	pub charge_other: f64,
	pub distance_studies: f64,
	pub distance_authored: f64,
	pub strength_primary: f64,
	pub strength_secondary: f64,
	pub radius_central: f64,
	pub radius_publication: f64,
	pub radius_concept: f64,
	pub radius_author: f64,
	pub collide_strength: f64,
	pub center_strength: f64,
	/// Below this the simulation is settled.
	pub alpha_min: f64,
	pub alpha_decay: f64,
	/// Alpha held while a node is dragged.
	pub alpha_drag: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
}

impl Default for LayoutParams {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			charge_central: -400.0,
			charge_other: -200.0,
			distance_studies: 120.0,
			distance_authored: 80.0,
			strength_primary: 0.5,
			strength_secondary: 0.2,
			radius_central: 35.0,
			radius_publication: 25.0,
			radius_concept: 20.0,
			radius_author: 15.0,
			collide_strength: 0.7,
			center_strength: 0.05,
			alpha_min,
			// Settles in roughly 300 ticks from alpha = 1.
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			alpha_drag: 0.3,
			velocity_decay: 0.4,
		}
	}
}

impl LayoutParams {
	/// Collision radius for a node; also used for drawing and hit testing.
	pub fn radius(&self, node: &GraphNode) -> f64 {
		match node {
			GraphNode::Publication(p) if p.is_central => self.radius_central,
			GraphNode::Publication(_) => self.radius_publication,
			GraphNode::Concept(_) => self.radius_concept,
			GraphNode::Author(_) => self.radius_author,
		}
	}
}

/// Simulation state of one node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Body {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Set only while the node is being dragged.
	pub pinned: Option<(f64, f64)>,
	last_finite: (f64, f64),
	charge: f64,
	radius: f64,
}

#[derive(Clone, Debug)]
struct Link {
	source: usize,
	target: usize,
	distance: f64,
	strength: f64,
	bias: f64,
}

/// A running layout. Owns every node position; the graph is never mutated.
#[derive(Clone, Debug)]
pub struct Simulation {
	params: LayoutParams,
	center: (f64, f64),
	ids: Vec<NodeId>,
	index: HashMap<NodeId, usize>,
	bodies: Vec<Body>,
	links: Vec<Link>,
	alpha: f64,
	alpha_target: f64,
	ticks: u64,
}

impl Simulation {
	/// Place nodes on a phyllotaxis spiral around the center, central node first.
	pub fn new(graph: &Graph, bounds: Bounds, params: LayoutParams) -> Self {
		let center = (bounds.width / 2.0, bounds.height / 2.0);
		let mut ordered: Vec<&GraphNode> = graph.nodes.values().collect();
		ordered.sort_by_key(|n| !n.is_central());

		let golden = PI * (3.0 - 5f64.sqrt());
		let mut ids = Vec::with_capacity(ordered.len());
		let mut index = HashMap::with_capacity(ordered.len());
		let mut bodies = Vec::with_capacity(ordered.len());
		for (i, node) in ordered.iter().enumerate() {
			let (x, y) = if node.is_central() {
				center
			} else {
				let r = 10.0 * (0.5 + i as f64).sqrt();
				let a = i as f64 * golden;
				(center.0 + r * a.cos(), center.1 + r * a.sin())
			};
			let charge = if node.is_central() {
				params.charge_central
			} else {
				params.charge_other
			};
			index.insert(node.id().to_string(), i);
			ids.push(node.id().to_string());
			bodies.push(Body {
				x,
				y,
				last_finite: (x, y),
				charge,
				radius: params.radius(node),
				..Body::default()
			});
		}

		let mut degree = vec![0usize; bodies.len()];
		let mut links = Vec::with_capacity(graph.edges.len());
		for edge in &graph.edges {
			let (Some(&source), Some(&target)) = (index.get(&edge.source), index.get(&edge.target))
			else {
				continue;
			};
			degree[source] += 1;
			degree[target] += 1;
			links.push(Link {
				source,
				target,
				distance: match edge.kind {
					EdgeKind::Studies => params.distance_studies,
					EdgeKind::Authored => params.distance_authored,
				},
				strength: if edge.is_secondary {
					params.strength_secondary
				} else {
					params.strength_primary
				},
				bias: 0.0,
			});
		}
		for link in &mut links {
			link.bias = degree[link.source] as f64 / (degree[link.source] + degree[link.target]) as f64;
		}

		Self {
			params,
			center,
			ids,
			index,
			bodies,
			links,
			alpha: 1.0,
			alpha_target: 0.0,
			ticks: 0,
		}
	}

	pub fn ticks(&self) -> u64 {
		self.ticks
	}

	pub fn params(&self) -> &LayoutParams {
		&self.params
	}

	/// True while the simulation still needs ticking.
	pub fn is_hot(&self) -> bool {
		self.alpha >= self.params.alpha_min || self.alpha_target > 0.0
	}

	pub fn position(&self, id: &str) -> Option<(f64, f64)> {
		self.index.get(id).map(|&i| (self.bodies[i].x, self.bodies[i].y))
	}

	pub fn body(&self, id: &str) -> Option<&Body> {
		self.index.get(id).map(|&i| &self.bodies[i])
	}

	/// Iterate `(id, body)` pairs.
	pub fn bodies(&self) -> impl Iterator<Item = (&str, &Body)> {
		self.ids.iter().map(String::as_str).zip(self.bodies.iter())
	}

	/// Pin a node at a position and reheat, as when a drag starts or moves.
	pub fn pin(&mut self, id: &str, x: f64, y: f64) {
		let Some(&i) = self.index.get(id) else {
			return;
		};
		if self.alpha_target == 0.0 {
			debug!("layout reheated by drag on {id}");
		}
		let body = &mut self.bodies[i];
		body.pinned = Some((x, y));
		body.x = x;
		body.y = y;
		body.vx = 0.0;
		body.vy = 0.0;
		self.alpha_target = self.params.alpha_drag;
		self.alpha = self.alpha.max(self.params.alpha_drag);
	}

	/// Release a pinned node back to the physics and let the layout cool.
	pub fn unpin(&mut self, id: &str) {
		if let Some(&i) = self.index.get(id) {
			self.bodies[i].pinned = None;
		}
		self.alpha_target = 0.0;
	}

	/// Advance one step. Returns `false` without doing anything once settled.
	pub fn tick(&mut self) -> bool {
		if !self.is_hot() {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
		self.ticks += 1;

		self.apply_links();
		self.apply_charge();
		self.apply_collision();
		self.integrate();
		self.apply_center();

		if !self.is_hot() {
			debug!("layout settled after {} ticks", self.ticks);
		}
		true
	}

	fn apply_links(&mut self) {
		let alpha = self.alpha;
		for (n, link) in self.links.iter().enumerate() {
			let (s, t) = (&self.bodies[link.source], &self.bodies[link.target]);
			let mut dx = t.x + t.vx - s.x - s.vx;
			let mut dy = t.y + t.vy - s.y - s.vy;
			if dx == 0.0 && dy == 0.0 {
				(dx, dy) = jiggle(n);
			}
			let l = (dx * dx + dy * dy).sqrt();
			let f = (l - link.distance) / l * alpha * link.strength;
			let (fx, fy) = (dx * f, dy * f);
			let t = &mut self.bodies[link.target];
			t.vx -= fx * link.bias;
			t.vy -= fy * link.bias;
			let s = &mut self.bodies[link.source];
			s.vx += fx * (1.0 - link.bias);
			s.vy += fy * (1.0 - link.bias);
		}
	}

	fn apply_charge(&mut self) {
		let alpha = self.alpha;
		let n = self.bodies.len();
		for i in 0..n {
			let (mut ax, mut ay) = (0.0, 0.0);
			for j in 0..n {
				if i == j {
					continue;
				}
				let (bi, bj) = (&self.bodies[i], &self.bodies[j]);
				let (mut dx, mut dy) = (bj.x - bi.x, bj.y - bi.y);
				if dx == 0.0 && dy == 0.0 {
					(dx, dy) = jiggle(i * n + j);
				}
				let l = (dx * dx + dy * dy).max(1.0);
				let w = bj.charge * alpha / l;
				ax += dx * w;
				ay += dy * w;
			}
			self.bodies[i].vx += ax;
			self.bodies[i].vy += ay;
		}
	}

	fn apply_collision(&mut self) {
		let strength = self.params.collide_strength;
		let n = self.bodies.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let (bi, bj) = (&self.bodies[i], &self.bodies[j]);
				let r = bi.radius + bj.radius;
				let mut dx = (bi.x + bi.vx) - (bj.x + bj.vx);
				let mut dy = (bi.y + bi.vy) - (bj.y + bj.vy);
				let mut l = dx * dx + dy * dy;
				if l >= r * r {
					continue;
				}
				if l == 0.0 {
					(dx, dy) = jiggle(i * n + j);
					l = dx * dx + dy * dy;
				}
				let l = l.sqrt();
				let push = (r - l) / l * strength;
				let (ri2, rj2) = (bi.radius * bi.radius, bj.radius * bj.radius);
				let share = rj2 / (ri2 + rj2);
				let (px, py) = (dx * push, dy * push);
				self.bodies[i].vx += px * share;
				self.bodies[i].vy += py * share;
				self.bodies[j].vx -= px * (1.0 - share);
				self.bodies[j].vy -= py * (1.0 - share);
			}
		}
	}

	fn integrate(&mut self) {
		let keep = 1.0 - self.params.velocity_decay;
		for (id, body) in self.ids.iter().zip(self.bodies.iter_mut()) {
			if let Some((px, py)) = body.pinned {
				body.x = px;
				body.y = py;
				body.vx = 0.0;
				body.vy = 0.0;
			} else {
				body.vx *= keep;
				body.vy *= keep;
				body.x += body.vx;
				body.y += body.vy;
			}
			if body.x.is_finite() && body.y.is_finite() {
				body.last_finite = (body.x, body.y);
			} else {
				warn!("non-finite position for {id}, restoring last finite position");
				(body.x, body.y) = body.last_finite;
				body.vx = 0.0;
				body.vy = 0.0;
			}
		}
	}

	/// Shift free nodes so the layout's mean drifts toward the canvas center.
	fn apply_center(&mut self) {
		let n = self.bodies.len();
		if n == 0 {
			return;
		}
		let (sx, sy) = self
			.bodies
			.iter()
			.fold((0.0, 0.0), |(sx, sy), b| (sx + b.x, sy + b.y));
		let dx = (self.center.0 - sx / n as f64) * self.params.center_strength;
		let dy = (self.center.1 - sy / n as f64) * self.params.center_strength;
		for body in self.bodies.iter_mut().filter(|b| b.pinned.is_none()) {
			body.x += dx;
			body.y += dy;
			body.last_finite = (body.x, body.y);
		}
	}

	/// Recenter after a canvas resize.
	pub fn resize(&mut self, bounds: Bounds) {
		self.center = (bounds.width / 2.0, bounds.height / 2.0);
	}

	#[cfg(test)]
	fn corrupt(&mut self, id: &str) {
		let i = self.index[id];
		self.bodies[i].vx = f64::NAN;
	}
}

/// Tiny deterministic offset used to separate coincident points.
fn jiggle(seed: usize) -> (f64, f64) {
	let a = seed as f64 * 2.399_963;
	(a.cos() * 1e-6, a.sin() * 1e-6)
}
