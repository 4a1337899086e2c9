//! Adjacency index derived from the store's node and link lists.
//!
//! The index is rebuilt from scratch whenever structure changes, never
//! patched in place. Every node gets an (possibly empty) entry up front.

use std::collections::{HashMap, HashSet};

use log::debug;

use super::error::{InvalidGraphReason, Result};
use super::store::{GraphStore, Link, Node};
use super::types::{LinkId, NodeId};

/// Child-link, neighbor and incident-link lookups keyed by node id.
#[derive(Clone, Debug, Default)]
pub struct AdjacencyIndex {
	children_of: HashMap<NodeId, Vec<LinkId>>,
	neighbors_of: HashMap<NodeId, HashSet<NodeId>>,
	incident_links_of: HashMap<NodeId, Vec<LinkId>>,
}

impl AdjacencyIndex {
	/// Index `links` over `nodes`.
	///
	/// `children_of` keeps links in the order they were supplied; the layout
	/// relies on that order to place siblings. A link naming an id outside
	/// `nodes` is an [`InvalidGraphReason::DanglingLink`].
	pub fn build(nodes: &[Node], links: &[Link]) -> Result<Self> {
		let mut index = Self {
			children_of: HashMap::with_capacity(nodes.len()),
			neighbors_of: HashMap::with_capacity(nodes.len()),
			incident_links_of: HashMap::with_capacity(nodes.len()),
		};
		for node in nodes {
			index.children_of.insert(node.id.clone(), Vec::new());
			index.neighbors_of.insert(node.id.clone(), HashSet::new());
			index.incident_links_of.insert(node.id.clone(), Vec::new());
		}

		for (i, link) in links.iter().enumerate() {
			let id = LinkId(i);
			for endpoint in [&link.source, &link.target] {
				if !index.children_of.contains_key(endpoint) {
					return Err(InvalidGraphReason::DanglingLink {
						link: id,
						endpoint: endpoint.clone(),
					}
					.into());
				}
			}

			index
				.children_of
				.entry(link.source.clone())
				.or_default()
				.push(id);
			index
				.neighbors_of
				.entry(link.source.clone())
				.or_default()
				.insert(link.target.clone());
			index
				.neighbors_of
				.entry(link.target.clone())
				.or_default()
				.insert(link.source.clone());
			index
				.incident_links_of
				.entry(link.source.clone())
				.or_default()
				.push(id);
			if link.target != link.source {
				index
					.incident_links_of
					.entry(link.target.clone())
					.or_default()
					.push(id);
			}
		}

		debug!(
			"tree-graph: indexed {} nodes, {} links",
			nodes.len(),
			links.len()
		);
		Ok(index)
	}

	/// Index the store's current content.
	pub fn from_store(store: &GraphStore) -> Result<Self> {
		Self::build(store.nodes(), store.links())
	}

	/// Outgoing links of `id`, in input order. Empty for leaves and unknown ids.
	pub fn children_of(&self, id: &str) -> &[LinkId] {
		self.children_of.get(id).map(Vec::as_slice).unwrap_or(&[])
	}

	/// Nodes sharing a link with `id`, in either direction.
	pub fn neighbors_of(&self, id: &str) -> impl Iterator<Item = &NodeId> + '_ {
		self.neighbors_of.get(id).into_iter().flatten()
	}

	/// Links with `id` as source or target. A self-loop is listed once.
	pub fn incident_links_of(&self, id: &str) -> &[LinkId] {
		self.incident_links_of.get(id).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn has_children(&self, id: &str) -> bool {
		!self.children_of(id).is_empty()
	}

	/// Whether `id` was part of the node set this index was built over.
	pub fn contains(&self, id: &str) -> bool {
		self.children_of.contains_key(id)
	}
}
