//! Leptos component wrapping the tree graph canvas.
//!
//! The component creates an HTML canvas element and wires mouse/wheel event
//! handlers to [`CanvasState`]: press/release on a node toggles it, dragging
//! a node pins it, dragging the background pans and the wheel zooms. A
//! `requestAnimationFrame` loop repaints each frame.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::scale::ScaleConfig;
use super::state::CanvasState;
use super::theme::Theme;
use crate::engine::{GraphDocument, Orientation, TreeGraph};

/// Canvas state plus the visual configuration it is painted with.
struct GraphContext {
	state: CanvasState,
	scale: ScaleConfig,
	theme: Theme,
}

type JsCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Renders an interactive collapsible tree on a canvas element.
///
/// The graph comes from the reactive `document` signal; a change reloads it.
/// `orientation` flips the layout axes without recomputing positions. The
/// component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the viewport and follow window resizes.
/// Explicit `width`/`height` override automatic sizing.
#[component]
pub fn TreeGraphCanvas(
	#[prop(into)] document: Signal<GraphDocument>,
	#[prop(into, default = Signal::stored(Orientation::Vertical))] orientation: Signal<Orientation>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional)] theme: Option<Theme>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<GraphContext>>> = Rc::new(RefCell::new(None));
	let animate: JsCallback = Rc::new(RefCell::new(None));
	let resize_cb: JsCallback = Rc::new(RefCell::new(None));
	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if context_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			viewport_size(&window).unwrap_or((800.0, 600.0))
		} else {
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
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("tree-graph: canvas 2d context unavailable");
			return;
		};

		let mut graph = match TreeGraph::from_document(document.get_untracked()) {
			Ok(graph) => graph,
			Err(e) => {
				warn!("tree-graph: cannot display graph: {}", e);
				return;
			}
		};
		graph.set_orientation(orientation.get_untracked());
		info!("tree-graph: canvas {}x{}", w, h);

		*context_init.borrow_mut() = Some(GraphContext {
			state: CanvasState::new(graph, w, h),
			scale: ScaleConfig::default(),
			theme: theme.clone().unwrap_or_default(),
		});

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().and_then(|win| viewport_size(&win)) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.state.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref c) = *context_anim.borrow() {
				render::render(&c.state, &ctx, &c.scale, &c.theme);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_doc = context.clone();
	Effect::new(move |first_run: Option<()>| {
		let doc = document.get();
		// The initial document is loaded by the mount effect.
		if first_run.is_none() {
			return;
		}
		if let Some(ref mut c) = *context_doc.borrow_mut() {
			match c.state.reload(doc) {
				Ok(()) => info!("tree-graph: document reloaded"),
				Err(e) => warn!("tree-graph: reload rejected, keeping current graph: {}", e),
			}
		}
	});

	let context_orient = context.clone();
	Effect::new(move |_| {
		let orientation = orientation.get();
		if let Some(ref mut c) = *context_orient.borrow_mut() {
			c.state.set_orientation(orientation);
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_md.borrow_mut() {
			c.state.press(x, y, &c.scale);
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		let over_node = match *context_mm.borrow_mut() {
			Some(ref mut c) => c.state.pointer_moved(x, y, &c.scale),
			None => false,
		};
		set_cursor(canvas_ref, if over_node { "pointer" } else { "grab" });
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_mu.borrow_mut() {
			if let Err(e) = c.state.release() {
				warn!("tree-graph: {}", e);
			}
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.state.cancel();
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			c.state.zoom_at(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="tree-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

/// Pointer position relative to the canvas' top-left corner.
fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn set_cursor(canvas_ref: NodeRef<leptos::html::Canvas>, cursor: &str) {
	if let Some(canvas) = canvas_ref.get() {
		let canvas: HtmlCanvasElement = canvas.into();
		let _ = web_sys::HtmlElement::style(&canvas).set_property("cursor", cursor);
	}
}

fn viewport_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}
