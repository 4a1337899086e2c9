//! Canvas interaction state.
//!
//! Wraps a [`TreeGraph`] with the pan/zoom transform and the pointer
//! gestures the canvas turns into engine events: a press and release in
//! place is a click, a press and move on a node is a drag, a press on the
//! background pans.

use log::{debug, warn};

use super::scale::{ScaleConfig, ScaledValues};
use crate::engine::{
	GraphDocument, HoverTarget, LinkId, NodeId, Orientation, RenderGraph, Result, TreeGraph,
};

/// Pointer travel in screen pixels below which a press counts as a click.
const CLICK_TOLERANCE: f64 = 3.0;

/// Margin in screen pixels kept around the tree by [`CanvasState::fit_view`].
const FIT_MARGIN: f64 = 60.0;

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0).
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

/// Tracks a press on a node that may become a click or a drag.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node: Option<NodeId>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
	/// Set once the pointer leaves the click tolerance.
	pub moved: bool,
	/// Where the dragged node is drawn until release, in world space.
	pub preview: Option<(f64, f64)>,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Engine session plus everything the canvas needs to map pointer input
/// onto it.
pub struct CanvasState {
	pub graph: TreeGraph,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
}

impl CanvasState {
	pub fn new(graph: TreeGraph, width: f64, height: f64) -> Self {
		let mut state = Self {
			graph,
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			width,
			height,
		};
		state.fit_view();
		state
	}

	/// Swap in a new document. The current graph stays loaded on error.
	pub fn reload(&mut self, document: GraphDocument) -> Result<()> {
		let orientation = self.graph.orientation();
		let mut graph = TreeGraph::from_document(document)?;
		graph.set_orientation(orientation);
		self.graph = graph;
		self.drag = DragState::default();
		self.fit_view();
		Ok(())
	}

	pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// World position a node is drawn at, honoring an in-progress drag.
	pub fn node_position(&self, id: &str) -> Option<(f64, f64)> {
		match (&self.drag.node, self.drag.preview) {
			(Some(dragged), Some(preview)) if dragged.as_str() == id => Some(preview),
			_ => self.graph.screen_position(id),
		}
	}

	/// Topmost visible node under the pointer.
	pub fn node_at(&self, sx: f64, sy: f64, config: &ScaleConfig) -> Option<NodeId> {
		let (gx, gy) = self.screen_to_world(sx, sy);
		let scale = ScaledValues::new(config, self.transform.k);
		self.graph
			.visible()
			.nodes
			.iter()
			.rev()
			.find(|id| {
				self.node_position(id).is_some_and(|(x, y)| {
					let (dx, dy) = (x - gx, y - gy);
					(dx * dx + dy * dy).sqrt() < scale.hit_radius
				})
			})
			.cloned()
	}

	/// Closest visible link within hit distance of the pointer.
	pub fn link_at(&self, sx: f64, sy: f64, config: &ScaleConfig) -> Option<LinkId> {
		let (gx, gy) = self.screen_to_world(sx, sy);
		let scale = ScaledValues::new(config, self.transform.k);
		let store = self.graph.store();
		self.graph
			.visible()
			.links
			.iter()
			.filter_map(|&link_id| {
				let link = store.link(link_id).ok()?;
				let a = self.node_position(&link.source)?;
				let b = self.node_position(&link.target)?;
				let dist = segment_distance((gx, gy), a, b);
				(dist < scale.link_hit_width).then_some((link_id, dist))
			})
			.min_by(|(_, a), (_, b)| a.total_cmp(b))
			.map(|(link_id, _)| link_id)
	}

	/// Re-run hover hit testing. Returns true when the pointer is over a node.
	pub fn hover_at(&mut self, sx: f64, sy: f64, config: &ScaleConfig) -> bool {
		let target = self
			.node_at(sx, sy, config)
			.map(HoverTarget::Node)
			.or_else(|| self.link_at(sx, sy, config).map(HoverTarget::Link));
		let over_node = matches!(target, Some(HoverTarget::Node(_)));
		if self.graph.highlight().hovered() == target.as_ref() {
			return over_node;
		}

		let result = match target {
			Some(HoverTarget::Node(id)) => self.graph.node_hovered(Some(&id)),
			Some(HoverTarget::Link(link)) => self.graph.link_hovered(Some(link)),
			None => self.graph.node_hovered(None),
		};
		if let Err(e) = result {
			warn!("tree-graph: hover ignored: {}", e);
		}
		over_node
	}

	/// Pointer pressed: start a node gesture or a pan.
	pub fn press(&mut self, sx: f64, sy: f64, config: &ScaleConfig) {
		if let Some(id) = self.node_at(sx, sy, config) {
			let Some((nx, ny)) = self.node_position(&id) else {
				return;
			};
			self.drag = DragState {
				active: true,
				node: Some(id),
				start_x: sx,
				start_y: sy,
				node_start_x: nx,
				node_start_y: ny,
				moved: false,
				preview: None,
			};
		} else {
			self.pan = PanState {
				active: true,
				start_x: sx,
				start_y: sy,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	/// Pointer moved: advance a drag or pan, otherwise update hover.
	/// Returns true when the pointer is over a node.
	pub fn pointer_moved(&mut self, sx: f64, sy: f64, config: &ScaleConfig) -> bool {
		if self.drag.active {
			let (dx, dy) = (sx - self.drag.start_x, sy - self.drag.start_y);
			if !self.drag.moved && dx.hypot(dy) > CLICK_TOLERANCE {
				self.drag.moved = true;
			}
			if self.drag.moved {
				self.drag.preview = Some((
					self.drag.node_start_x + dx / self.transform.k,
					self.drag.node_start_y + dy / self.transform.k,
				));
			}
			true
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
			false
		} else {
			self.hover_at(sx, sy, config)
		}
	}

	/// Pointer released: finish the gesture.
	///
	/// A node press that stayed within the click tolerance toggles the node;
	/// one that moved pins the node where it was dropped.
	pub fn release(&mut self) -> Result<()> {
		let drag = std::mem::take(&mut self.drag);
		self.pan.active = false;
		let Some(id) = drag.node.filter(|_| drag.active) else {
			return Ok(());
		};

		match drag.preview {
			Some((x, y)) if drag.moved => {
				let position = self.graph.orientation().from_screen(x, y);
				self.graph
					.node_drag_ended(&id, position.primary, position.depth)
			}
			_ => {
				let collapsed = self.graph.node_clicked(&id)?;
				debug!("tree-graph: `{}` collapsed = {}", id, collapsed);
				Ok(())
			}
		}
	}

	/// Pointer left the canvas: abandon gestures and clear the highlight.
	pub fn cancel(&mut self) {
		self.drag = DragState::default();
		self.pan.active = false;
		if self.graph.highlight().is_active() {
			if let Err(e) = self.graph.node_hovered(None) {
				warn!("tree-graph: failed to clear hover: {}", e);
			}
		}
	}

	/// Zoom around the pointer. `delta_y > 0` zooms out.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Center the computed layout in the viewport, shrinking to fit but
	/// never zooming in past 100%.
	pub fn fit_view(&mut self) {
		let Some(bounds) = self.graph.layout().bounds() else {
			self.transform = ViewTransform {
				x: self.width / 2.0,
				y: self.height / 2.0,
				k: 1.0,
			};
			return;
		};
		let orientation = self.graph.orientation();
		let (x0, y0) = orientation.to_screen(bounds.min);
		let (x1, y1) = orientation.to_screen(bounds.max);
		let (cx, cy) = orientation.to_screen(bounds.center());

		let fit = |extent: f64, available: f64| {
			if extent > 0.0 {
				((available - 2.0 * FIT_MARGIN).max(1.0) / extent).min(1.0)
			} else {
				1.0
			}
		};
		let k = fit(x1 - x0, self.width)
			.min(fit(y1 - y0, self.height))
			.clamp(0.1, 10.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}

	pub fn set_orientation(&mut self, orientation: Orientation) {
		if self.graph.orientation() != orientation {
			self.graph.set_orientation(orientation);
			self.fit_view();
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// What to paint this frame: the engine's render graph with the dragged
	/// node moved to its preview position.
	pub fn render_graph(&self) -> RenderGraph {
		let mut render = self.graph.render_graph();
		if let (Some(id), Some((x, y))) = (&self.drag.node, self.drag.preview) {
			if let Some(node) = render.nodes.iter_mut().find(|n| &n.id == id) {
				node.x = x;
				node.y = y;
			}
		}
		render
	}
}

/// Distance from `p` to the segment `a`-`b`.
fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (dx, dy) = (b.0 - a.0, b.1 - a.1);
	let len_sq = dx * dx + dy * dy;
	let t = if len_sq > 0.0 {
		(((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
	} else {
		0.0
	};
	(p.0 - (a.0 + t * dx)).hypot(p.1 - (a.1 + t * dy))
}
