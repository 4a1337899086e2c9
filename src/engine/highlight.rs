//! Hover highlight state.
//!
//! Each hover event replaces the previous highlight completely: the sets are
//! cleared and rebuilt from the adjacency index, and `None` leaves them empty.

use std::collections::HashSet;

use super::adjacency::AdjacencyIndex;
use super::error::Result;
use super::store::GraphStore;
use super::types::{LinkId, NodeId};

/// What the pointer is currently over.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HoverTarget {
	Node(NodeId),
	Link(LinkId),
}

/// Hovered element plus the nodes and links to emphasize around it.
#[derive(Clone, Debug, Default)]
pub struct HighlightController {
	hovered: Option<HoverTarget>,
	nodes: HashSet<NodeId>,
	links: HashSet<LinkId>,
}

impl HighlightController {
	pub fn new() -> Self {
		Self::default()
	}

	/// Hover a node (or nothing).
	///
	/// Highlights the node, its neighbors and its incident links. An unknown
	/// id is rejected and the previous highlight is kept.
	pub fn on_hover_node(
		&mut self,
		node: Option<&str>,
		store: &GraphStore,
		index: &AdjacencyIndex,
	) -> Result<()> {
		let Some(id) = node else {
			self.clear();
			return Ok(());
		};
		let node = store.node(id)?;

		self.clear();
		self.nodes.insert(node.id.clone());
		self.nodes.extend(index.neighbors_of(&node.id).cloned());
		self.links.extend(index.incident_links_of(&node.id).iter().copied());
		self.hovered = Some(HoverTarget::Node(node.id.clone()));
		Ok(())
	}

	/// Hover a link (or nothing).
	///
	/// Highlights the link and both of its endpoints. An unknown link is
	/// rejected and the previous highlight is kept.
	pub fn on_hover_link(&mut self, link: Option<LinkId>, store: &GraphStore) -> Result<()> {
		let Some(link_id) = link else {
			self.clear();
			return Ok(());
		};
		let link = store.link(link_id)?;

		self.clear();
		self.links.insert(link_id);
		self.nodes.insert(link.source.clone());
		self.nodes.insert(link.target.clone());
		self.hovered = Some(HoverTarget::Link(link_id));
		Ok(())
	}

	/// Drop all highlighting.
	pub fn clear(&mut self) {
		self.hovered = None;
		self.nodes.clear();
		self.links.clear();
	}

	pub fn hovered(&self) -> Option<&HoverTarget> {
		self.hovered.as_ref()
	}

	/// Whether `id` is the hovered node itself (not just a neighbor).
	pub fn is_hovered_node(&self, id: &str) -> bool {
		matches!(&self.hovered, Some(HoverTarget::Node(n)) if n.as_str() == id)
	}

	pub fn is_node_highlighted(&self, id: &str) -> bool {
		self.nodes.contains(id)
	}

	pub fn is_link_highlighted(&self, link: LinkId) -> bool {
		self.links.contains(&link)
	}

	pub fn highlighted_nodes(&self) -> &HashSet<NodeId> {
		&self.nodes
	}

	pub fn highlighted_links(&self) -> &HashSet<LinkId> {
		&self.links
	}

	/// True when anything is highlighted; renderers dim the rest.
	pub fn is_active(&self) -> bool {
		self.hovered.is_some()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::error::GraphError;
	use crate::engine::store::CollapsePolicy;
	use crate::engine::types::{GraphData, GraphInput, GraphLink, GraphNode};

	fn fixture() -> (GraphStore, AdjacencyIndex) {
		let input = GraphInput::Flat(GraphData {
			nodes: ["r", "a", "b", "a1"].into_iter().map(GraphNode::new).collect(),
			links: vec![
				GraphLink::new("r", "a"),
				GraphLink::new("r", "b"),
				GraphLink::new("a", "a1"),
			],
			root: None,
		});
		let store = GraphStore::from_input(input, &CollapsePolicy::AllExpanded).unwrap();
		let index = AdjacencyIndex::from_store(&store).unwrap();
		(store, index)
	}

	fn sorted(ids: &HashSet<NodeId>) -> Vec<&str> {
		let mut v: Vec<&str> = ids.iter().map(NodeId::as_str).collect();
		v.sort_unstable();
		v
	}

	#[test]
	fn node_hover_highlights_neighborhood() {
		let (store, index) = fixture();
		let mut hl = HighlightController::new();
		hl.on_hover_node(Some("a"), &store, &index).unwrap();
		assert_eq!(sorted(hl.highlighted_nodes()), ["a", "a1", "r"]);
		assert!(hl.is_link_highlighted(LinkId(0)));
		assert!(hl.is_link_highlighted(LinkId(2)));
		assert!(!hl.is_link_highlighted(LinkId(1)));
		assert!(hl.is_hovered_node("a"));
		assert!(!hl.is_hovered_node("r"));
	}

	#[test]
	fn hover_none_clears_everything() {
		let (store, index) = fixture();
		let mut hl = HighlightController::new();
		hl.on_hover_node(Some("a"), &store, &index).unwrap();
		hl.on_hover_node(None, &store, &index).unwrap();
		assert!(hl.highlighted_nodes().is_empty());
		assert!(hl.highlighted_links().is_empty());
		assert!(hl.hovered().is_none());
	}

	#[test]
	fn successive_hovers_do_not_merge() {
		let (store, index) = fixture();
		let mut hl = HighlightController::new();
		hl.on_hover_node(Some("a1"), &store, &index).unwrap();
		hl.on_hover_node(Some("b"), &store, &index).unwrap();
		assert_eq!(sorted(hl.highlighted_nodes()), ["b", "r"]);
		assert_eq!(hl.highlighted_links().len(), 1);
	}

	#[test]
	fn link_hover_highlights_endpoints() {
		let (store, index) = fixture();
		let mut hl = HighlightController::new();
		hl.on_hover_node(Some("r"), &store, &index).unwrap();
		hl.on_hover_link(Some(LinkId(2)), &store).unwrap();
		assert_eq!(sorted(hl.highlighted_nodes()), ["a", "a1"]);
		assert_eq!(hl.highlighted_links().iter().collect::<Vec<_>>(), [&LinkId(2)]);
		assert_eq!(hl.hovered(), Some(&HoverTarget::Link(LinkId(2))));
	}

	#[test]
	fn unknown_target_keeps_previous_state() {
		let (store, index) = fixture();
		let mut hl = HighlightController::new();
		hl.on_hover_node(Some("b"), &store, &index).unwrap();
		let err = hl.on_hover_node(Some("ghost"), &store, &index).unwrap_err();
		assert_eq!(err, GraphError::NodeNotFound(NodeId::new("ghost")));
		assert!(hl.is_hovered_node("b"));
		assert_eq!(
			hl.on_hover_link(Some(LinkId(42)), &store),
			Err(GraphError::LinkNotFound(LinkId(42)))
		);
		assert!(hl.is_hovered_node("b"));
	}
}
