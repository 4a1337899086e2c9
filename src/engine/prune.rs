//! Visibility pruning.
//!
//! Depth-first descent from the root that stops at collapsed nodes. A
//! collapsed node is itself visible; nothing below it is touched.

use std::collections::HashSet;

use log::debug;
use serde::Serialize;

use super::adjacency::AdjacencyIndex;
use super::error::Result;
use super::store::{GraphStore, Node};
use super::types::{LinkId, NodeId};

/// The node and link subset currently on screen, in traversal order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VisibleGraph {
	pub nodes: Vec<NodeId>,
	pub links: Vec<LinkId>,
}

impl VisibleGraph {
	pub fn contains_node(&self, id: &str) -> bool {
		self.nodes.iter().any(|n| n.as_str() == id)
	}

	pub fn contains_link(&self, link: LinkId) -> bool {
		self.links.contains(&link)
	}
}

/// Derive the visible subgraph below `root`.
///
/// The root is always emitted. A node's outgoing links, and the nodes they
/// lead to, are emitted only when the node is expanded. A node reachable
/// along several expanded paths is emitted once; every expanded path's link
/// to it is still emitted.
///
/// Fails with [`GraphError::NodeNotFound`](super::GraphError::NodeNotFound)
/// when `root` is not in the store.
pub fn prune(store: &GraphStore, index: &AdjacencyIndex, root: &str) -> Result<VisibleGraph> {
	let root = store.node(root)?;
	let mut pruner = Pruner {
		store,
		index,
		seen: HashSet::from([root.id.clone()]),
		visible: VisibleGraph::default(),
	};
	pruner.descend(root);

	debug!(
		"tree-graph: {} nodes, {} links visible",
		pruner.visible.nodes.len(),
		pruner.visible.links.len()
	);
	Ok(pruner.visible)
}

struct Pruner<'a> {
	store: &'a GraphStore,
	index: &'a AdjacencyIndex,
	seen: HashSet<NodeId>,
	visible: VisibleGraph,
}

impl<'a> Pruner<'a> {
	/// Pre-order walk with an explicit stack of pending child links, one
	/// entry per expanded node on the current path.
	fn descend(&mut self, root: &'a Node) {
		let mut stack = Vec::new();
		stack.extend(self.emit(root));

		let store = self.store;
		while let Some(children) = stack.last_mut() {
			let Some(&link_id) = children.next() else {
				stack.pop();
				continue;
			};
			let Ok(link) = store.link(link_id) else {
				continue;
			};
			self.visible.links.push(link_id);
			if !self.seen.insert(link.target.clone()) {
				continue;
			}
			if let Ok(child) = store.node(&link.target) {
				stack.extend(self.emit(child));
			}
		}
	}

	/// Emit `node`; its child links are pending only when it is expanded.
	fn emit(&mut self, node: &'a Node) -> Option<std::slice::Iter<'a, LinkId>> {
		self.visible.nodes.push(node.id.clone());
		let index = self.index;
		(!node.collapsed).then(|| index.children_of(&node.id).iter())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::error::GraphError;
	use crate::engine::store::CollapsePolicy;
	use crate::engine::types::{GraphData, GraphInput, GraphLink, GraphNode};

	fn build(links: &[(&str, &str)], policy: CollapsePolicy) -> (GraphStore, AdjacencyIndex) {
		let mut nodes: Vec<GraphNode> = vec![GraphNode::new("r")];
		for &(_, t) in links {
			if !nodes.iter().any(|n| n.id.as_str() == t) {
				nodes.push(GraphNode::new(t));
			}
		}
		let input = GraphInput::Flat(GraphData {
			nodes,
			links: links.iter().map(|&(s, t)| GraphLink::new(s, t)).collect(),
			root: None,
		});
		let store = GraphStore::from_input(input, &policy).unwrap();
		let index = AdjacencyIndex::from_store(&store).unwrap();
		(store, index)
	}

	fn ids(visible: &VisibleGraph) -> Vec<&str> {
		visible.nodes.iter().map(NodeId::as_str).collect()
	}

	#[test]
	fn expanded_tree_is_fully_visible_in_dfs_order() {
		let (store, index) = build(
			&[("r", "a"), ("a", "a1"), ("r", "b")],
			CollapsePolicy::AllExpanded,
		);
		let visible = prune(&store, &index, "r").unwrap();
		assert_eq!(ids(&visible), ["r", "a", "a1", "b"]);
		assert_eq!(visible.links, [LinkId(0), LinkId(1), LinkId(2)]);
	}

	#[test]
	fn collapsed_root_shows_only_root() {
		let (mut store, index) = build(&[("r", "a")], CollapsePolicy::AllExpanded);
		store.toggle_collapsed("r").unwrap();
		let visible = prune(&store, &index, "r").unwrap();
		assert_eq!(ids(&visible), ["r"]);
		assert!(visible.links.is_empty());
	}

	#[test]
	fn root_only_policy_reveals_one_level() {
		let (store, index) = build(
			&[("r", "a"), ("a", "a1"), ("r", "b")],
			CollapsePolicy::RootOnlyExpanded,
		);
		let visible = prune(&store, &index, "r").unwrap();
		assert_eq!(ids(&visible), ["r", "a", "b"]);
	}

	#[test]
	fn grandchild_flag_survives_parent_toggle() {
		let (mut store, index) = build(
			&[("r", "a"), ("a", "a1"), ("a1", "deep")],
			CollapsePolicy::AllExpanded,
		);
		store.toggle_collapsed("a1").unwrap();
		store.toggle_collapsed("a").unwrap();
		assert_eq!(ids(&prune(&store, &index, "r").unwrap()), ["r", "a"]);
		store.toggle_collapsed("a").unwrap();
		assert_eq!(ids(&prune(&store, &index, "r").unwrap()), ["r", "a", "a1"]);
	}

	#[test]
	fn shared_child_is_emitted_once_with_both_links() {
		let (store, index) = build(
			&[("r", "p"), ("r", "q"), ("p", "x"), ("q", "x")],
			CollapsePolicy::AllExpanded,
		);
		let visible = prune(&store, &index, "r").unwrap();
		assert_eq!(ids(&visible), ["r", "p", "x", "q"]);
		assert_eq!(visible.links.len(), 4);
	}

	#[test]
	fn deep_chain_prunes_iteratively() {
		let ids: Vec<String> = std::iter::once("r".to_owned())
			.chain((0..100_000).map(|i| format!("n{i}")))
			.collect();
		let input = GraphInput::Flat(GraphData {
			nodes: ids.iter().map(|id| GraphNode::new(id.as_str())).collect(),
			links: ids.windows(2).map(|p| GraphLink::new(p[0].as_str(), p[1].as_str())).collect(),
			root: None,
		});
		let mut store = GraphStore::from_input(input, &CollapsePolicy::AllExpanded).unwrap();
		let index = AdjacencyIndex::from_store(&store).unwrap();

		let visible = prune(&store, &index, "r").unwrap();
		assert_eq!(visible.nodes.len(), 100_001);
		assert_eq!(visible.links.len(), 100_000);
		assert_eq!(visible.nodes.last().map(NodeId::as_str), Some("n99999"));

		store.toggle_collapsed("n10").unwrap();
		let visible = prune(&store, &index, "r").unwrap();
		assert_eq!(visible.nodes.len(), 12);
		assert_eq!(visible.links.len(), 11);
	}

	#[test]
	fn cycles_terminate() {
		let (store, index) = build(&[("r", "a"), ("a", "r")], CollapsePolicy::AllExpanded);
		let visible = prune(&store, &index, "r").unwrap();
		assert_eq!(ids(&visible), ["r", "a"]);
		assert_eq!(visible.links.len(), 2);
	}

	#[test]
	fn unknown_root_is_rejected() {
		let (store, index) = build(&[("r", "a")], CollapsePolicy::AllExpanded);
		assert_eq!(
			prune(&store, &index, "zz"),
			Err(GraphError::NodeNotFound(NodeId::new("zz")))
		);
	}
}
