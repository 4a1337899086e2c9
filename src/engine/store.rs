//! Graph store: the canonical node and link collections.
//!
//! The store owns node identity and collapsed flags. Coordinates are only
//! written through [`GraphStore::apply_layout`] and the drag-end override
//! [`GraphStore::set_manual_position`]; everything else reads.

use std::collections::{HashMap, HashSet};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::error::{GraphError, InvalidGraphReason, Result};
use super::layout::Layout;
use super::types::{GraphInput, GraphLink, GraphNode, LinkId, LinkQuality, NodeId};

/// Node coordinates in layout space.
///
/// `primary` spreads siblings apart, `depth` grows with hierarchy level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	pub primary: f64,
	pub depth: f64,
}

impl Position {
	pub const fn new(primary: f64, depth: f64) -> Self {
		Self { primary, depth }
	}
}

/// A node held by the store.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: NodeId,
	pub label: String,
	/// Depth below the root along the first path that reaches this node.
	/// `None` when the node is not reachable from the root.
	pub level: Option<usize>,
	/// Computed (or manually placed) coordinates. `None` until laid out.
	pub position: Option<Position>,
	pub collapsed: bool,
	/// Set when the user dragged the node to its current position.
	pub manual: bool,
}

/// A directed parent-to-child link held by the store.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
	pub source: NodeId,
	pub target: NodeId,
	pub quality: Option<LinkQuality>,
	pub label: Option<String>,
}

/// Initial collapsed state for nodes that don't specify one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum CollapsePolicy {
	/// Every node starts expanded.
	#[default]
	AllExpanded,
	/// Only the root starts expanded, so just its children are visible.
	RootOnlyExpanded,
	/// Nodes at `level >= depth` start collapsed.
	DepthThreshold { depth: usize },
}

impl CollapsePolicy {
	/// Whether `node` starts collapsed under this policy.
	///
	/// Nodes unreachable from the root start collapsed under every policy
	/// except [`CollapsePolicy::AllExpanded`].
	pub fn initially_collapsed(&self, node: &Node) -> bool {
		match self {
			CollapsePolicy::AllExpanded => false,
			CollapsePolicy::RootOnlyExpanded => node.level != Some(0),
			CollapsePolicy::DepthThreshold { depth } => node.level.is_none_or(|l| l >= *depth),
		}
	}
}

/// How a re-layout treats nodes the user placed by hand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Relayout {
	/// Keep manually placed nodes where the user left them.
	#[default]
	PreserveManual,
	/// Overwrite every coordinate with the computed one.
	Full,
}

/// Node and link collections indexed by identifier.
#[derive(Clone, Debug, Default)]
pub struct GraphStore {
	nodes: Vec<Node>,
	by_id: HashMap<NodeId, usize>,
	links: Vec<Link>,
	root: Option<NodeId>,
}

impl GraphStore {
	/// An empty store. Populate it with [`GraphStore::load`].
	pub fn new() -> Self {
		Self::default()
	}

	/// Build a store from either input shape.
	pub fn from_input(input: GraphInput, policy: &CollapsePolicy) -> Result<Self> {
		let mut store = Self::new();
		store.load_input(input, policy)?;
		Ok(store)
	}

	/// Normalize `input` and load it with a collapse policy.
	pub fn load_input(&mut self, input: GraphInput, policy: &CollapsePolicy) -> Result<()> {
		let graph = input.normalize()?;
		self.load(graph.nodes, graph.links, graph.root, |node| {
			policy.initially_collapsed(node)
		})
	}

	/// Replace the store's content with `nodes`/`links` rooted at `root`.
	///
	/// `initially_collapsed` decides the starting state of every node whose
	/// input doesn't carry an explicit `collapsed` value; it sees the node
	/// with its `level` already derived.
	///
	/// Fails with [`GraphError::InvalidGraph`] on duplicate ids, dangling
	/// link endpoints or a missing root. Validation happens before anything
	/// is committed, so on error the store keeps its previous content.
	pub fn load(
		&mut self,
		nodes: Vec<GraphNode>,
		links: Vec<GraphLink>,
		root: NodeId,
		initially_collapsed: impl Fn(&Node) -> bool,
	) -> Result<()> {
		if nodes.is_empty() {
			return Err(InvalidGraphReason::Empty.into());
		}

		let mut by_id = HashMap::with_capacity(nodes.len());
		for (i, node) in nodes.iter().enumerate() {
			if by_id.insert(node.id.clone(), i).is_some() {
				return Err(InvalidGraphReason::DuplicateNode(node.id.clone()).into());
			}
		}
		let Some(&root_idx) = by_id.get(&root) else {
			return Err(InvalidGraphReason::MissingRoot(root).into());
		};

		let mut children = vec![Vec::new(); nodes.len()];
		for (i, link) in links.iter().enumerate() {
			let endpoint_idx = |endpoint: &NodeId| {
				by_id.get(endpoint).copied().ok_or_else(|| {
					GraphError::from(InvalidGraphReason::DanglingLink {
						link: LinkId(i),
						endpoint: endpoint.clone(),
					})
				})
			};
			let src = endpoint_idx(&link.source)?;
			let tgt = endpoint_idx(&link.target)?;
			children[src].push(tgt);
		}

		let levels = first_visit_levels(root_idx, &children);
		let mut loaded: Vec<Node> = Vec::with_capacity(nodes.len());
		for (seed, level) in nodes.into_iter().zip(levels) {
			let mut node = Node {
				label: seed.label.unwrap_or_else(|| seed.id.to_string()),
				id: seed.id,
				level,
				position: None,
				collapsed: false,
				manual: false,
			};
			node.collapsed = seed.collapsed.unwrap_or_else(|| initially_collapsed(&node));
			loaded.push(node);
		}

		self.nodes = loaded;
		self.by_id = by_id;
		self.links = links
			.into_iter()
			.map(|l| Link {
				source: l.source,
				target: l.target,
				quality: l.quality,
				label: l.label,
			})
			.collect();
		self.root = Some(root);

		info!(
			"tree-graph: loaded {} nodes, {} links",
			self.nodes.len(),
			self.links.len()
		);
		Ok(())
	}

	/// The declared root, once a graph is loaded.
	pub fn root(&self) -> Option<&NodeId> {
		self.root.as_ref()
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn links(&self) -> &[Link] {
		&self.links
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn contains(&self, id: &str) -> bool {
		self.by_id.contains_key(id)
	}

	/// Look up a node by id.
	pub fn node(&self, id: &str) -> Result<&Node> {
		self.by_id
			.get(id)
			.map(|&i| &self.nodes[i])
			.ok_or_else(|| GraphError::NodeNotFound(NodeId::from(id)))
	}

	/// Look up a link by index.
	pub fn link(&self, id: LinkId) -> Result<&Link> {
		self.links.get(id.0).ok_or(GraphError::LinkNotFound(id))
	}

	fn node_mut(&mut self, id: &str) -> Result<&mut Node> {
		match self.by_id.get(id) {
			Some(&i) => Ok(&mut self.nodes[i]),
			None => Err(GraphError::NodeNotFound(NodeId::from(id))),
		}
	}

	/// Flip a node's collapsed flag and return the new value.
	///
	/// Re-pruning is the caller's job, so several toggles can be batched.
	pub fn toggle_collapsed(&mut self, id: &str) -> Result<bool> {
		let node = self.node_mut(id)?;
		node.collapsed = !node.collapsed;
		debug!("tree-graph: `{}` collapsed = {}", node.id, node.collapsed);
		Ok(node.collapsed)
	}

	/// Set a node's collapsed flag explicitly.
	pub fn set_collapsed(&mut self, id: &str, collapsed: bool) -> Result<()> {
		self.node_mut(id)?.collapsed = collapsed;
		Ok(())
	}

	/// Expand every node.
	pub fn expand_all(&mut self) {
		for node in &mut self.nodes {
			node.collapsed = false;
		}
	}

	/// Collapse every node that has at least one outgoing link.
	pub fn collapse_all(&mut self) {
		let parents: HashSet<&NodeId> = self.links.iter().map(|l| &l.source).collect();
		for node in &mut self.nodes {
			node.collapsed = parents.contains(&node.id);
		}
	}

	/// Record a user placement (drag end). The node keeps it across
	/// [`Relayout::PreserveManual`] re-layouts.
	pub fn set_manual_position(&mut self, id: &str, position: Position) -> Result<()> {
		let node = self.node_mut(id)?;
		node.position = Some(position);
		node.manual = true;
		Ok(())
	}

	/// Write computed coordinates into the nodes.
	///
	/// Nodes absent from `layout` lose their computed position unless they
	/// were placed by hand and `mode` preserves manual placements.
	pub fn apply_layout(&mut self, layout: &Layout, mode: Relayout) {
		for node in &mut self.nodes {
			if node.manual && mode == Relayout::PreserveManual {
				continue;
			}
			node.manual = false;
			node.position = layout.get(&node.id).map(|p| p.position);
		}
	}
}

/// Depth of every node along the first root path found by a pre-order walk
/// over `children` in order. Matches the levels the layout assigns.
fn first_visit_levels(root: usize, children: &[Vec<usize>]) -> Vec<Option<usize>> {
	let mut levels = vec![None; children.len()];
	let mut stack = vec![(root, 0usize)];
	while let Some((idx, level)) = stack.pop() {
		if levels[idx].is_some() {
			continue;
		}
		levels[idx] = Some(level);
		for &child in children[idx].iter().rev() {
			if levels[child].is_none() {
				stack.push((child, level + 1));
			}
		}
	}
	levels
}
