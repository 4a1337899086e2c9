//! One interactive tree graph: store, index, layout, visible subset and
//! highlight, kept consistent across interaction events.
//!
//! Every call runs to completion synchronously. A failed call leaves the
//! session exactly as it was.

use log::{debug, info};
use serde::Serialize;

use super::adjacency::AdjacencyIndex;
use super::error::{InvalidGraphReason, Result};
use super::highlight::{HighlightController, HoverTarget};
use super::layout::{self, Layout, LayoutConfig, Orientation};
use super::prune::{self, VisibleGraph};
use super::store::{CollapsePolicy, GraphStore, Node, Position, Relayout};
use super::types::{GraphDocument, GraphInput, LinkId, LinkQuality, NodeId};

/// A loaded, laid out and pruned graph that reacts to interaction events.
#[derive(Clone, Debug)]
pub struct TreeGraph {
	store: GraphStore,
	index: AdjacencyIndex,
	config: LayoutConfig,
	layout: Layout,
	visible: VisibleGraph,
	highlight: HighlightController,
}

impl TreeGraph {
	/// Load `input`, lay it out and compute the initial visible subset.
	pub fn new(input: GraphInput, config: LayoutConfig, policy: &CollapsePolicy) -> Result<Self> {
		Self::from_store(GraphStore::from_input(input, policy)?, config)
	}

	/// Like [`TreeGraph::new`] with an arbitrary initial-collapse function.
	pub fn with_initializer(
		input: GraphInput,
		config: LayoutConfig,
		initially_collapsed: impl Fn(&Node) -> bool,
	) -> Result<Self> {
		let graph = input.normalize()?;
		let mut store = GraphStore::new();
		store.load(graph.nodes, graph.links, graph.root, initially_collapsed)?;
		Self::from_store(store, config)
	}

	/// Build from a parsed [`GraphDocument`].
	pub fn from_document(document: GraphDocument) -> Result<Self> {
		Self::new(document.graph, document.layout, &document.collapse)
	}

	fn from_store(mut store: GraphStore, config: LayoutConfig) -> Result<Self> {
		let index = AdjacencyIndex::from_store(&store)?;
		let root = root_of(&store)?;
		let layout = layout::layout(&store, &index, &root, &config)?;
		store.apply_layout(&layout, Relayout::Full);
		let visible = prune::prune(&store, &index, &root)?;
		info!(
			"tree-graph: {} of {} nodes visible",
			visible.nodes.len(),
			store.nodes().len()
		);
		Ok(Self {
			store,
			index,
			config,
			layout,
			visible,
			highlight: HighlightController::new(),
		})
	}

	/// Replace the whole graph. On error the current graph stays loaded.
	///
	/// A hovered node or link that still exists stays hovered, with its
	/// highlight rebuilt from the new adjacency index.
	pub fn reload(&mut self, input: GraphInput, policy: &CollapsePolicy) -> Result<()> {
		let mut next = Self::new(input, self.config.clone(), policy)?;
		let rebuilt = match self.highlight.hovered() {
			Some(HoverTarget::Node(id)) => next.node_hovered(Some(id.as_str())),
			Some(HoverTarget::Link(link)) => next.link_hovered(Some(*link)),
			None => Ok(()),
		};
		if let Err(e) = rebuilt {
			debug!("tree-graph: hover dropped on reload: {}", e);
		}
		*self = next;
		Ok(())
	}

	pub fn store(&self) -> &GraphStore {
		&self.store
	}

	pub fn index(&self) -> &AdjacencyIndex {
		&self.index
	}

	pub fn layout(&self) -> &Layout {
		&self.layout
	}

	pub fn visible(&self) -> &VisibleGraph {
		&self.visible
	}

	pub fn highlight(&self) -> &HighlightController {
		&self.highlight
	}

	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	pub fn orientation(&self) -> Orientation {
		self.config.orientation
	}

	/// Screen coordinates of a node under the current orientation.
	pub fn screen_position(&self, id: &str) -> Option<(f64, f64)> {
		let node = self.store.node(id).ok()?;
		node.position.map(|p| self.config.orientation.to_screen(p))
	}

	/// Re-derive the visible subset from the current collapsed flags.
	pub fn refresh(&mut self) -> Result<&VisibleGraph> {
		let root = root_of(&self.store)?;
		self.visible = prune::prune(&self.store, &self.index, &root)?;
		Ok(&self.visible)
	}

	/// Click on a node: flip its collapsed flag and re-prune.
	///
	/// Returns the node's new collapsed state.
	pub fn node_clicked(&mut self, id: &str) -> Result<bool> {
		let collapsed = self.store.toggle_collapsed(id)?;
		self.refresh()?;
		Ok(collapsed)
	}

	/// Pointer entered a node, or left every node (`None`).
	pub fn node_hovered(&mut self, id: Option<&str>) -> Result<()> {
		self.highlight.on_hover_node(id, &self.store, &self.index)
	}

	/// Pointer entered a link, or left every link (`None`).
	pub fn link_hovered(&mut self, link: Option<LinkId>) -> Result<()> {
		self.highlight.on_hover_link(link, &self.store)
	}

	/// The user dropped a node at `(primary, depth)`.
	///
	/// The placement survives pruning and ordinary re-layouts; only
	/// [`Relayout::Full`] puts the node back in its computed slot.
	pub fn node_drag_ended(&mut self, id: &str, primary: f64, depth: f64) -> Result<()> {
		self.store
			.set_manual_position(id, Position::new(primary, depth))?;
		debug!("tree-graph: `{}` pinned at ({}, {})", id, primary, depth);
		Ok(())
	}

	/// Recompute coordinates with the current configuration.
	pub fn relayout(&mut self, mode: Relayout) -> Result<()> {
		let root = root_of(&self.store)?;
		let layout = layout::layout(&self.store, &self.index, &root, &self.config)?;
		self.store.apply_layout(&layout, mode);
		self.layout = layout;
		Ok(())
	}

	/// Swap in new layout parameters, keeping manual placements.
	pub fn set_layout_config(&mut self, config: LayoutConfig) -> Result<()> {
		let previous = std::mem::replace(&mut self.config, config);
		if let Err(err) = self.relayout(Relayout::PreserveManual) {
			self.config = previous;
			return Err(err);
		}
		Ok(())
	}

	/// Change orientation. Layout coordinates are unchanged; only their
	/// mapping to the screen flips.
	pub fn set_orientation(&mut self, orientation: Orientation) {
		self.config.orientation = orientation;
	}

	pub fn expand_all(&mut self) -> Result<&VisibleGraph> {
		self.store.expand_all();
		self.refresh()
	}

	pub fn collapse_all(&mut self) -> Result<&VisibleGraph> {
		self.store.collapse_all();
		self.refresh()
	}

	/// The renderer-facing view of the visible subset.
	///
	/// Nodes without coordinates are left out; after a successful layout
	/// every visible node has them.
	pub fn render_graph(&self) -> RenderGraph {
		let orientation = self.config.orientation;
		let nodes = self
			.visible
			.nodes
			.iter()
			.filter_map(|id| {
				let node = self.store.node(id).ok()?;
				let position = node.position?;
				let (x, y) = orientation.to_screen(position);
				Some(RenderNode {
					id: node.id.clone(),
					label: node.label.clone(),
					primary_coord: position.primary,
					depth_coord: position.depth,
					x,
					y,
					collapsed: node.collapsed,
					has_children: self.index.has_children(&node.id),
					pinned: true,
					manual: node.manual,
					highlighted: self.highlight.is_node_highlighted(&node.id),
					hovered: self.highlight.is_hovered_node(&node.id),
				})
			})
			.collect();
		let links = self
			.visible
			.links
			.iter()
			.filter_map(|&link_id| {
				let link = self.store.link(link_id).ok()?;
				Some(RenderLink {
					index: link_id,
					source_id: link.source.clone(),
					target_id: link.target.clone(),
					quality: link.quality,
					label: link.label.clone(),
					tree_link: self.layout.is_tree_link(link_id, &link.target),
					highlighted: self.highlight.is_link_highlighted(link_id),
				})
			})
			.collect();
		RenderGraph { nodes, links }
	}
}

fn root_of(store: &GraphStore) -> Result<NodeId> {
	store
		.root()
		.cloned()
		.ok_or_else(|| InvalidGraphReason::Empty.into())
}

/// Positioned, pruned graph handed to a renderer.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RenderGraph {
	pub nodes: Vec<RenderNode>,
	pub links: Vec<RenderLink>,
}

/// A visible node with its coordinates and display flags.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
	pub id: NodeId,
	pub label: String,
	/// Layout coordinate along the sibling axis.
	pub primary_coord: f64,
	/// Layout coordinate along the level axis.
	pub depth_coord: f64,
	/// Screen-space `x` under the current orientation.
	pub x: f64,
	/// Screen-space `y` under the current orientation.
	pub y: f64,
	pub collapsed: bool,
	pub has_children: bool,
	/// Renderers must hold the node at `(x, y)` rather than simulate it.
	pub pinned: bool,
	/// Placed by the user rather than the layout.
	pub manual: bool,
	pub highlighted: bool,
	pub hovered: bool,
}

/// A visible link.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderLink {
	pub index: LinkId,
	pub source_id: NodeId,
	pub target_id: NodeId,
	pub quality: Option<LinkQuality>,
	pub label: Option<String>,
	/// False for cross-links into a subtree placed through another parent.
	pub tree_link: bool,
	pub highlighted: bool,
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::types::TreeData;

	fn sample() -> GraphInput {
		GraphInput::Nested(
			TreeData::leaf("root")
				.with_child(
					TreeData::leaf("child-1")
						.with_child(TreeData::leaf("grandchild-1-1"))
						.with_child(TreeData::leaf("grandchild-1-2")),
				)
				.with_child(TreeData::leaf("child-2")),
		)
	}

	fn graph() -> TreeGraph {
		TreeGraph::new(sample(), LayoutConfig::default(), &CollapsePolicy::AllExpanded).unwrap()
	}

	#[test]
	fn click_toggles_and_reprunes() {
		let mut g = graph();
		assert_eq!(g.visible().nodes.len(), 5);
		assert_eq!(g.node_clicked("child-1"), Ok(true));
		assert_eq!(g.visible().nodes.len(), 3);
		assert_eq!(g.node_clicked("child-1"), Ok(false));
		assert_eq!(g.visible().nodes.len(), 5);
	}

	#[test]
	fn failed_click_changes_nothing() {
		let mut g = graph();
		let before = g.visible().clone();
		assert!(g.node_clicked("nobody").is_err());
		assert_eq!(g.visible(), &before);
	}

	#[test]
	fn drag_survives_relayout_until_full() {
		let mut g = graph();
		g.node_drag_ended("child-2", 999.0, 5.0).unwrap();
		g.refresh().unwrap();
		g.relayout(Relayout::PreserveManual).unwrap();
		let node = g.store().node("child-2").unwrap();
		assert_eq!(node.position, Some(Position::new(999.0, 5.0)));
		assert!(node.manual);

		g.relayout(Relayout::Full).unwrap();
		let node = g.store().node("child-2").unwrap();
		assert_eq!(node.position, Some(Position::new(300.0, 100.0)));
		assert!(!node.manual);
	}

	#[test]
	fn config_change_respects_manual_placements() {
		let mut g = graph();
		g.node_drag_ended("root", -1.0, -1.0).unwrap();
		g.set_layout_config(LayoutConfig {
			sibling_spacing: 10.0,
			..LayoutConfig::default()
		})
		.unwrap();
		assert_eq!(g.store().node("child-2").unwrap().position, Some(Position::new(20.0, 100.0)));
		assert_eq!(g.store().node("root").unwrap().position, Some(Position::new(-1.0, -1.0)));
	}

	#[test]
	fn orientation_relabels_render_coordinates() {
		let mut g = graph();
		let vertical = g.render_graph();
		g.set_orientation(Orientation::Horizontal);
		let horizontal = g.render_graph();
		for (v, h) in vertical.nodes.iter().zip(&horizontal.nodes) {
			assert_eq!((v.x, v.y), (h.y, h.x));
			assert_eq!((v.primary_coord, v.depth_coord), (h.primary_coord, h.depth_coord));
		}
	}

	#[test]
	fn render_graph_carries_highlight_flags() {
		let mut g = graph();
		g.node_hovered(Some("child-1")).unwrap();
		let render = g.render_graph();
		let hovered: Vec<&str> = render
			.nodes
			.iter()
			.filter(|n| n.hovered)
			.map(|n| n.id.as_str())
			.collect();
		assert_eq!(hovered, ["child-1"]);
		assert_eq!(render.nodes.iter().filter(|n| n.highlighted).count(), 4);
		assert_eq!(render.links.iter().filter(|l| l.highlighted).count(), 3);
		assert!(render.nodes.iter().all(|n| n.pinned));
	}

	#[test]
	fn render_graph_serializes_camel_case() {
		let g = graph();
		let value = serde_json::to_value(g.render_graph()).unwrap();
		assert_eq!(value["nodes"][0]["id"], "root");
		assert_eq!(value["nodes"][0]["hasChildren"], true);
		assert_eq!(value["nodes"][0]["primaryCoord"], 187.5);
		assert_eq!(value["nodes"][0]["depthCoord"], 0.0);
		assert!(value["nodes"][0].get("primary").is_none());
		assert_eq!(value["links"][0]["targetId"], "child-1");
		assert_eq!(value["links"][0]["sourceId"], "root");
	}

	#[test]
	fn reload_keeps_old_graph_on_error() {
		let mut g = graph();
		let bad = GraphInput::Flat(crate::engine::types::GraphData::default());
		assert!(g.reload(bad, &CollapsePolicy::AllExpanded).is_err());
		assert_eq!(g.store().nodes().len(), 5);
	}

	fn ids(set: &std::collections::HashSet<NodeId>) -> Vec<&str> {
		let mut v: Vec<&str> = set.iter().map(NodeId::as_str).collect();
		v.sort_unstable();
		v
	}

	#[test]
	fn reload_rebuilds_hover_from_the_new_graph() {
		let before = TreeData::leaf("root")
			.with_child(TreeData::leaf("a").with_child(TreeData::leaf("x")))
			.with_child(TreeData::leaf("b"));
		let after = TreeData::leaf("root")
			.with_child(TreeData::leaf("b"))
			.with_child(TreeData::leaf("a").with_child(TreeData::leaf("y")));
		let mut g = TreeGraph::new(
			GraphInput::Nested(before),
			LayoutConfig::default(),
			&CollapsePolicy::AllExpanded,
		)
		.unwrap();
		g.node_hovered(Some("a")).unwrap();
		assert_eq!(ids(g.highlight().highlighted_nodes()), ["a", "root", "x"]);

		g.reload(GraphInput::Nested(after), &CollapsePolicy::AllExpanded).unwrap();
		assert!(g.highlight().is_hovered_node("a"));
		assert_eq!(ids(g.highlight().highlighted_nodes()), ["a", "root", "y"]);
		let mut links: Vec<LinkId> = g.highlight().highlighted_links().iter().copied().collect();
		links.sort_unstable_by_key(|l| l.0);
		assert_eq!(links, [LinkId(1), LinkId(2)]);
	}

	#[test]
	fn reload_drops_hover_on_vanished_targets() {
		let mut g = graph();
		g.node_hovered(Some("grandchild-1-2")).unwrap();
		let smaller =
			GraphInput::Nested(TreeData::leaf("root").with_child(TreeData::leaf("child-1")));
		g.reload(smaller.clone(), &CollapsePolicy::AllExpanded).unwrap();
		assert!(!g.highlight().is_active());
		assert!(g.highlight().highlighted_nodes().is_empty());

		let mut g = graph();
		g.link_hovered(Some(LinkId(3))).unwrap();
		g.reload(smaller, &CollapsePolicy::AllExpanded).unwrap();
		assert!(g.highlight().hovered().is_none());
		assert!(g.highlight().highlighted_links().is_empty());
	}

	#[test]
	fn deep_chain_loads_lays_out_and_prunes() {
		let mut tree = TreeData::leaf("leaf");
		for depth in (0..30_000).rev() {
			tree = TreeData::leaf(format!("d{depth}")).with_child(tree);
		}
		let mut g = TreeGraph::new(
			GraphInput::Nested(tree),
			LayoutConfig::default(),
			&CollapsePolicy::AllExpanded,
		)
		.unwrap();
		assert_eq!(g.visible().nodes.len(), 30_001);
		assert_eq!(g.screen_position("leaf"), Some((0.0, 3_000_000.0)));

		g.node_clicked("d2").unwrap();
		assert_eq!(g.visible().nodes.len(), 3);
	}

	#[test]
	fn initializer_controls_default_state() {
		let g = TreeGraph::with_initializer(sample(), LayoutConfig::default(), |n| {
			n.id.as_str() == "child-1"
		})
		.unwrap();
		assert_eq!(g.visible().nodes.len(), 3);
	}
}
