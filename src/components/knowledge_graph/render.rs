use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::filter::{Emphasis, VisibleGraph};
use super::state::SurfaceState;
use super::types::{EdgeKind, GraphNode, NodeKind};

const BACKGROUND: &str = "#0f172a";
const CENTRAL_COLOR: &str = "#f59e0b";

/// Legend color for a node kind.
pub fn kind_color(kind: NodeKind) -> &'static str {
	match kind {
		NodeKind::Publication => "#3b82f6",
		NodeKind::Author => "#10b981",
		NodeKind::Concept => "#a855f7",
	}
}

fn node_color(node: &GraphNode) -> &'static str {
	if node.is_central() {
		CENTRAL_COLOR
	} else {
		kind_color(node.kind())
	}
}

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Opacity for an element, blended in by the hover fade.
fn alpha(emphasis: Emphasis, t: f64) -> f64 {
	1.0 - (1.0 - emphasis.opacity()) * t
}

pub fn render(state: &SurfaceState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	if state.graph.is_empty() {
		draw_placeholder(state, ctx);
		return;
	}

	let view = state.visible();
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, &view, ctx);
	draw_nodes(state, &view, ctx);
	ctx.restore();
}

fn draw_placeholder(state: &SurfaceState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("rgba(148, 163, 184, 0.8)");
	ctx.set_font("14px sans-serif");
	ctx.set_text_align("center");
	let _ = ctx.fill_text(
		"Select a publication to explore its knowledge graph",
		state.width / 2.0,
		state.height / 2.0,
	);
	ctx.set_text_align("start");
}

fn draw_edges(state: &SurfaceState, view: &VisibleGraph<'_>, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let t = ease_out_cubic(state.hover.highlight_t);
	let params = state.simulation.params();
	let arrow_size = 6.0 / k;

	for (edge, emphasis) in &view.edges {
		let (Some((x1, y1)), Some((x2, y2))) = (
			state.simulation.position(&edge.source),
			state.simulation.position(&edge.target),
		) else {
			continue;
		};
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let (r1, r2) = match (view.nodes.get(edge.source.as_str()), view.nodes.get(edge.target.as_str())) {
			(Some((a, _)), Some((b, _))) => (params.radius(a), params.radius(b)),
			_ => continue,
		};

		let base = if edge.is_secondary { 0.35 } else { 0.7 };
		let a = base * alpha(*emphasis, t);
		let rgb = match edge.kind {
			EdgeKind::Studies => "168, 85, 247",
			EdgeKind::Authored => "16, 185, 129",
		};
		ctx.set_stroke_style_str(&format!("rgba({rgb}, {a})"));
		ctx.set_line_width(if edge.is_secondary { 1.0 / k } else { 2.0 / k });
		if edge.is_secondary {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(6.0 / k),
				&JsValue::from_f64(4.0 / k),
			));
		}

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(x1 + ux * r1, y1 + uy * r1);
		ctx.line_to(x2 - ux * (r2 + arrow_size), y2 - uy * (r2 + arrow_size));
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		ctx.set_fill_style_str(&format!("rgba({rgb}, {a})"));
		let (tip_x, tip_y) = (x2 - ux * r2, y2 - uy * r2);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
}

fn draw_nodes(state: &SurfaceState, view: &VisibleGraph<'_>, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let t = ease_out_cubic(state.hover.highlight_t);
	let params = state.simulation.params();
	let font_px = 11.0 / k.max(0.5);

	// Dimmed nodes first so emphasized ones draw on top.
	let mut ordered: Vec<_> = view.nodes.values().collect();
	ordered.sort_by_key(|(_, e)| *e != Emphasis::Dimmed);

	for (node, emphasis) in ordered {
		let Some((x, y)) = state.simulation.position(node.id()) else {
			continue;
		};
		let a = alpha(*emphasis, t);
		let radius = match emphasis {
			Emphasis::Hovered => params.radius(node) * (1.0 + 0.15 * t),
			_ => params.radius(node),
		};

		ctx.set_global_alpha(a);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(node_color(node));
		ctx.fill();

		let selected = state.interaction.selected.as_deref() == Some(node.id());
		if selected || *emphasis == Emphasis::Hovered {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 3.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str("rgba(255, 255, 255, 0.85)");
			ctx.set_line_width(2.0 / k);
			ctx.stroke();
		}

		let size = match node.kind() {
			NodeKind::Author => font_px * 0.85,
			_ => font_px,
		};
		ctx.set_fill_style_str("white");
		ctx.set_font(&format!("{size}px sans-serif"));
		let _ = ctx.fill_text(node.label(), x + radius + 4.0, y + 4.0);
		ctx.set_global_alpha(1.0);
	}
}
