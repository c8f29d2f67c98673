use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::filter::TypeVisibility;
use super::render;
use super::state::{SurfaceEvent, SurfaceState};
use super::types::{Graph, Publication};
use crate::error::SurfaceError;

type Shared<T> = Rc<RefCell<Option<T>>>;

/// A cancellable `requestAnimationFrame` chain.
///
/// Each frame reschedules itself; [`AnimationLoop::cancel`] stops the chain and
/// drops the frame closure, so a replaced graph never receives another tick.
#[derive(Clone, Default)]
struct AnimationLoop {
	frame: Rc<Cell<Option<i32>>>,
	callback: Shared<Closure<dyn FnMut()>>,
}

impl AnimationLoop {
	fn start(window: &Window, mut on_frame: impl FnMut() + 'static) -> Self {
		let handle = Self::default();
		let (frame, callback) = (handle.frame.clone(), handle.callback.clone());
		*handle.callback.borrow_mut() = Some(Closure::new(move || {
			on_frame();
			// Cancelled from inside the frame callback.
			if frame.get().is_none() {
				return;
			}
			if let Some(ref cb) = *callback.borrow() {
				let id = web_sys::window()
					.and_then(|w| w.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
				frame.set(id);
			}
		}));
		if let Some(ref cb) = *handle.callback.borrow() {
			handle
				.frame
				.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
		handle
	}

	fn cancel(&self) {
		if let Some(id) = self.frame.take() {
			if let Some(window) = web_sys::window() {
				let _ = window.cancel_animation_frame(id);
			}
			debug!("animation loop {id} cancelled");
		}
		self.callback.borrow_mut().take();
	}
}

fn canvas_size(
	window: &Window,
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> (f64, f64) {
	if fullscreen {
		let dim = |v: Result<JsValue, JsValue>, fallback| v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback);
		return (dim(window.inner_width(), 800.0), dim(window.inner_height(), 600.0));
	}
	(
		width.unwrap_or_else(|| {
			canvas
				.parent_element()
				.map(|p| p.client_width() as f64)
				.unwrap_or(800.0)
		}),
		height.unwrap_or_else(|| {
			canvas
				.parent_element()
				.map(|p| p.client_height() as f64)
				.unwrap_or(600.0)
		}),
	)
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, SurfaceError> {
	canvas
		.get_context("2d")
		.ok()
		.flatten()
		.and_then(|ctx| ctx.dyn_into().ok())
		.ok_or(SurfaceError::NoContext)
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Canvas view of the knowledge graph.
///
/// Rebuilds the surface whenever `graph` changes, cancelling the previous
/// animation loop first. `search` and `visibility` are applied live. Clicking a
/// publication node calls `on_select`.
#[component]
pub fn KnowledgeGraphCanvas(
	#[prop(into)] graph: Signal<Graph>,
	#[prop(into)] search: Signal<String>,
	#[prop(into)] visibility: Signal<TypeVisibility>,
	#[prop(into)] on_select: Callback<Publication>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Shared<SurfaceState> = Rc::new(RefCell::new(None));
	let animation: Rc<RefCell<AnimationLoop>> = Rc::default();
	let (state_init, animation_init) = (state.clone(), animation.clone());

	Effect::new(move |_| {
		let graph = graph.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			warn!("{}", SurfaceError::NoWindow);
			return;
		};

		animation_init.borrow().cancel();

		let (w, h) = canvas_size(&window, &canvas, fullscreen, width, height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		let ctx = match context_2d(&canvas) {
			Ok(ctx) => ctx,
			Err(e) => {
				warn!("{e}");
				return;
			}
		};

		let mut surface = SurfaceState::new(graph, w, h);
		surface.set_search(&search.get_untracked());
		surface.set_visibility(visibility.get_untracked());
		*state_init.borrow_mut() = Some(surface);

		let state_anim = state_init.clone();
		*animation_init.borrow_mut() = AnimationLoop::start(&window, move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(0.016);
				render::render(s, &ctx);
			}
		});
	});

	let state_filter = state.clone();
	Effect::new(move |_| {
		let (term, types) = (search.get(), visibility.get());
		if let Some(ref mut s) = *state_filter.borrow_mut() {
			s.set_search(&term);
			s.set_visibility(types);
			if s.interaction.hovered.as_deref().is_some_and(|id| !s.visible().contains(id)) {
				s.set_hover(None);
			}
		}
	});

	if fullscreen {
		let state_resize = state.clone();
		let resize = window_event_listener(leptos::ev::resize, move |_| {
			let (Some(window), Some(canvas)) = (web_sys::window(), canvas_ref.get()) else {
				return;
			};
			let canvas: HtmlCanvasElement = canvas.into();
			let (w, h) = canvas_size(&window, &canvas, true, None, None);
			canvas.set_width(w as u32);
			canvas.set_height(h as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(w, h);
			}
		});
		on_cleanup(move || resize.remove());
	}

	let animation_cleanup = StoredValue::new_local(animation);
	on_cleanup(move || {
		animation_cleanup.try_with_value(|a| a.borrow().cancel());
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		// Release the borrow before notifying the host, which rebuilds the surface.
		let event = state_mu.borrow_mut().as_mut().and_then(|s| s.pointer_up());
		if let Some(SurfaceEvent::PublicationSelected(publication)) = event {
			on_select.run(publication);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_leave();
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.zoom(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="knowledge-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
