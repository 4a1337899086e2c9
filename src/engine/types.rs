//! Input data structures for the tree graph engine.
//!
//! Graphs arrive either as a nested hierarchy (`{ id, children: [...] }`) or
//! as a flat `{ nodes, links, root }` triple. Both shapes normalize into the
//! same node/link lists before the [`GraphStore`](super::GraphStore) sees them.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::error::{InvalidGraphReason, Result};
use super::layout::LayoutConfig;
use super::store::CollapsePolicy;

/// Unique, immutable node identifier.
///
/// Deserializes from either a JSON string or a JSON integer; integers are
/// kept in their decimal form so `7` and `"7"` name the same node.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "RawNodeId", into = "String")]
pub struct NodeId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNodeId {
	Text(String),
	Integer(i64),
}

impl From<RawNodeId> for NodeId {
	fn from(raw: RawNodeId) -> Self {
		match raw {
			RawNodeId::Text(s) => Self(s),
			RawNodeId::Integer(n) => Self(n.to_string()),
		}
	}
}

impl NodeId {
	/// Create an identifier from anything string-like.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// Borrow the identifier as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Deref for NodeId {
	type Target = str;

	fn deref(&self) -> &str {
		&self.0
	}
}

impl Borrow<str> for NodeId {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for NodeId {
	fn from(s: &str) -> Self {
		Self(s.to_string())
	}
}

impl From<String> for NodeId {
	fn from(s: String) -> Self {
		Self(s)
	}
}

impl From<i64> for NodeId {
	fn from(n: i64) -> Self {
		Self(n.to_string())
	}
}

impl From<NodeId> for String {
	fn from(id: NodeId) -> Self {
		id.0
	}
}

/// Position of a link in the store's link list.
///
/// Links are not unique per `(source, target)` pair, so parallel links are
/// told apart by index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(pub usize);

impl fmt::Display for LinkId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Qualitative link category, used only when painting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkQuality {
	Good,
	Fair,
	Poor,
}

/// A node in the flat input format.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphNode {
	/// Unique identifier. Used to reference nodes in links.
	pub id: NodeId,
	/// Optional display label. Falls back to the id when absent.
	#[serde(default, alias = "name")]
	pub label: Option<String>,
	/// Explicit initial collapsed state. Overrides the load-time policy.
	#[serde(default)]
	pub collapsed: Option<bool>,
}

impl GraphNode {
	/// A node with no label and no explicit collapsed state.
	pub fn new(id: impl Into<NodeId>) -> Self {
		Self {
			id: id.into(),
			label: None,
			collapsed: None,
		}
	}
}

/// A directed parent-to-child edge in the flat input format.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphLink {
	/// Source (parent) node ID.
	pub source: NodeId,
	/// Target (child) node ID.
	pub target: NodeId,
	#[serde(default, alias = "type")]
	pub quality: Option<LinkQuality>,
	#[serde(default)]
	pub label: Option<String>,
}

impl GraphLink {
	/// An untagged, unlabeled link.
	pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			quality: None,
			label: None,
		}
	}
}

/// Flat graph data: nodes, links and an optional declared root.
///
/// When `root` is omitted the first node is the root.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	#[serde(default)]
	pub links: Vec<GraphLink>,
	#[serde(default)]
	pub root: Option<NodeId>,
}

/// Nested hierarchy: a node and, recursively, its children.
///
/// Children listed under `_children` exist in the graph but their parent
/// starts collapsed.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TreeData {
	pub id: NodeId,
	#[serde(default, alias = "name")]
	pub label: Option<String>,
	#[serde(default)]
	pub collapsed: Option<bool>,
	#[serde(default)]
	pub children: Vec<TreeData>,
	#[serde(default, rename = "_children")]
	pub hidden_children: Vec<TreeData>,
}

impl TreeData {
	/// A leaf with the given id.
	pub fn leaf(id: impl Into<NodeId>) -> Self {
		Self {
			id: id.into(),
			label: None,
			collapsed: None,
			children: Vec::new(),
			hidden_children: Vec::new(),
		}
	}

	/// Append a visible child, builder style.
	pub fn with_child(mut self, child: TreeData) -> Self {
		self.children.push(child);
		self
	}
}

/// Either accepted input shape.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum GraphInput {
	Flat(GraphData),
	Nested(TreeData),
}

/// Node and link lists with a resolved root, ready for loading.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedGraph {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
	pub root: NodeId,
}

impl GraphInput {
	/// Flatten either input shape into node and link lists.
	///
	/// Nested input is walked in pre-order; each parent's links keep the
	/// order of its `children` (then `_children`) list.
	pub fn normalize(self) -> Result<NormalizedGraph> {
		match self {
			GraphInput::Flat(data) => {
				let root = match data.root {
					Some(root) => root,
					None => data
						.nodes
						.first()
						.map(|n| n.id.clone())
						.ok_or(InvalidGraphReason::Empty)?,
				};
				Ok(NormalizedGraph {
					nodes: data.nodes,
					links: data.links,
					root,
				})
			}
			GraphInput::Nested(tree) => {
				let root = tree.id.clone();
				let mut nodes = Vec::new();
				let mut links = Vec::new();
				flatten_tree(tree, &mut nodes, &mut links);
				Ok(NormalizedGraph { nodes, links, root })
			}
		}
	}
}

/// Pre-order walk with an explicit stack; each entry carries its parent so
/// the link into it is emitted right before the node itself.
fn flatten_tree(tree: TreeData, nodes: &mut Vec<GraphNode>, links: &mut Vec<GraphLink>) {
	let mut stack: Vec<(Option<NodeId>, TreeData)> = vec![(None, tree)];
	while let Some((parent, tree)) = stack.pop() {
		if let Some(parent) = parent {
			links.push(GraphLink::new(parent, tree.id.clone()));
		}
		let collapsed = match tree.collapsed {
			Some(c) => Some(c),
			None if !tree.hidden_children.is_empty() => Some(true),
			None => None,
		};
		nodes.push(GraphNode {
			id: tree.id.clone(),
			label: tree.label,
			collapsed,
		});
		let mut children = tree.children;
		children.extend(tree.hidden_children);
		stack.extend(
			children
				.into_iter()
				.rev()
				.map(|child| (Some(tree.id.clone()), child)),
		);
	}
}

/// Everything the embedding page can hand to the component: the graph plus
/// optional layout parameters and load-time collapse policy.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphDocument {
	pub graph: GraphInput,
	#[serde(default)]
	pub layout: LayoutConfig,
	#[serde(default)]
	pub collapse: CollapsePolicy,
}

impl From<GraphInput> for GraphDocument {
	fn from(graph: GraphInput) -> Self {
		Self {
			graph,
			layout: LayoutConfig::default(),
			collapse: CollapsePolicy::default(),
		}
	}
}

impl Default for GraphDocument {
	fn default() -> Self {
		GraphInput::Flat(GraphData::default()).into()
	}
}

impl GraphDocument {
	/// Parse a document, accepting either the full `{ graph, layout, collapse }`
	/// wrapper or a bare graph in either input shape.
	///
	/// An object with a `graph` key is always read as the wrapper, so its
	/// errors (a bad `layout` field, say) are reported as such.
	pub fn from_json(text: &str) -> serde_json::Result<Self> {
		let value: serde_json::Value = serde_json::from_str(text)?;
		if value.get("graph").is_some() {
			serde_json::from_value(value)
		} else {
			serde_json::from_value::<GraphInput>(value).map(GraphDocument::from)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn node_ids_accept_strings_and_integers() {
		let ids: Vec<NodeId> = serde_json::from_value(json!(["a", 7, -2])).unwrap();
		assert_eq!(ids, vec![NodeId::new("a"), NodeId::new("7"), NodeId::new("-2")]);
		assert_eq!(serde_json::to_value(&ids[1]).unwrap(), json!("7"));
	}

	#[test]
	fn flat_input_defaults_root_to_first_node() {
		let input: GraphInput = serde_json::from_value(json!({
			"nodes": [{ "id": "parent" }, { "id": "child" }],
			"links": [{ "source": "parent", "target": "child", "type": "good" }]
		}))
		.unwrap();
		let graph = input.normalize().unwrap();
		assert_eq!(graph.root, NodeId::new("parent"));
		assert_eq!(graph.links[0].quality, Some(LinkQuality::Good));
	}

	#[test]
	fn flat_input_without_nodes_is_empty_error() {
		let input = GraphInput::Flat(GraphData::default());
		assert!(input.normalize().is_err());
	}

	#[test]
	fn nested_input_flattens_in_pre_order() {
		let input: GraphInput = serde_json::from_value(json!({
			"id": "root",
			"children": [
				{ "id": "a", "children": [{ "id": "a1" }] },
				{ "id": "b", "_children": [{ "id": "b1" }] }
			]
		}))
		.unwrap();
		let graph = input.normalize().unwrap();
		let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["root", "a", "a1", "b", "b1"]);
		let pairs: Vec<(&str, &str)> = graph
			.links
			.iter()
			.map(|l| (l.source.as_str(), l.target.as_str()))
			.collect();
		assert_eq!(pairs, [("root", "a"), ("a", "a1"), ("root", "b"), ("b", "b1")]);
		assert_eq!(graph.nodes[3].collapsed, Some(true));
		assert_eq!(graph.nodes[1].collapsed, None);
	}

	#[test]
	fn document_accepts_bare_graph() {
		let doc = GraphDocument::from_json(r#"{ "id": "solo" }"#).unwrap();
		assert_eq!(doc.layout, LayoutConfig::default());
		assert!(matches!(doc.graph, GraphInput::Nested(_)));

		let doc = GraphDocument::from_json(
			r#"{ "graph": { "nodes": [{ "id": 1 }] }, "layout": { "siblingSpacing": 40 } }"#,
		)
		.unwrap();
		assert_eq!(doc.layout.sibling_spacing, 40.0);
		assert_eq!(doc.layout.level_spacing, LayoutConfig::default().level_spacing);
	}

	#[test]
	fn wrapper_errors_are_not_masked_by_the_bare_graph_fallback() {
		let err = GraphDocument::from_json(
			r#"{ "graph": { "id": "root" }, "layout": { "levelSpacing": "x" } }"#,
		)
		.unwrap_err();
		assert!(err.to_string().contains("invalid type"), "{err}");
	}

	#[test]
	fn deeply_nested_tree_flattens() {
		let mut tree = TreeData::leaf("d0");
		for depth in 1..50_000 {
			tree = TreeData::leaf(format!("d{depth}")).with_child(tree);
		}
		let graph = GraphInput::Nested(tree).normalize().unwrap();
		assert_eq!(graph.root, NodeId::new("d49999"));
		assert_eq!(graph.nodes.len(), 50_000);
		assert_eq!(graph.links.len(), 49_999);
		assert_eq!(graph.nodes.last().map(|n| n.id.as_str()), Some("d0"));
	}
}
