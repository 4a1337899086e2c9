//! tree-graph: collapsible, deterministically laid out tree graphs.
//!
//! [`engine`] holds the rendering-agnostic core (store, adjacency index,
//! layout, visibility pruning, hover highlighting). [`components`] paints it
//! on a canvas as a Leptos component.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;
pub mod engine;

pub use components::tree_graph::TreeGraphCanvas;
pub use engine::{GraphDocument, GraphError, GraphInput, Orientation, TreeGraph};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("tree-graph: logging initialized");
}

/// Load the graph document from a script element with id="graph-data".
///
/// Accepts `{ graph, layout?, collapse? }` or a bare graph, either flat
/// (`{ nodes, links, root? }`) or nested (`{ id, children, _children }`).
fn load_graph_document() -> Option<GraphDocument> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("graph-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match GraphDocument::from_json(&json_text) {
		Ok(doc) => {
			info!("tree-graph: loaded graph document ({} bytes)", json_text.len());
			Some(doc)
		}
		Err(e) => {
			warn!("tree-graph: failed to parse graph data: {}", e);
			None
		}
	}
}

/// Main application component.
/// Loads the graph document from the DOM and renders the tree view.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let document = load_graph_document().unwrap_or_default();
	let initial = document.layout.orientation;
	let document = Signal::derive(move || document.clone());
	let orientation = RwSignal::new(initial);
	let toggle = move |_| orientation.update(|o| *o = o.toggled());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Tree Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<TreeGraphCanvas document=document orientation=orientation fullscreen=true />
			<div class="graph-overlay">
				<h1>"Tree Graph"</h1>
				<p class="subtitle">
					"Click a node to collapse or expand it. Drag nodes to pin them. Scroll to zoom. Drag background to pan."
				</p>
				<button class="orientation-toggle" on:click=toggle>
					{move || match orientation.get() {
						Orientation::Vertical => "Horizontal layout",
						Orientation::Horizontal => "Vertical layout",
					}}
				</button>
			</div>
		</div>
	}
}
