//! Deterministic tree layout.
//!
//! Post-order placement over the adjacency index: leaves take the next free
//! slot on the primary axis, parents sit at the midpoint of the span of their
//! children. The slot cursor threads through the whole traversal, so
//! subtrees never overlap regardless of depth.
//!
//! # Axes
//!
//! - **Primary axis**: siblings are spread along it.
//! - **Depth axis**: `depth_origin + level * level_spacing`.
//!
//! [`Orientation`] only relabels the axes onto screen `x`/`y`; the
//! arithmetic is the same either way.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use super::adjacency::AdjacencyIndex;
use super::error::{GraphError, Result};
use super::store::{GraphStore, Position};
use super::types::{LinkId, NodeId};

/// How layout axes map onto the screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
	/// Root at the top; siblings spread horizontally.
	#[default]
	Vertical,
	/// Root at the left; siblings spread vertically.
	Horizontal,
}

impl Orientation {
	/// The other orientation.
	pub fn toggled(self) -> Self {
		match self {
			Orientation::Vertical => Orientation::Horizontal,
			Orientation::Horizontal => Orientation::Vertical,
		}
	}

	/// Layout coordinates to screen `(x, y)`.
	pub fn to_screen(self, position: Position) -> (f64, f64) {
		match self {
			Orientation::Vertical => (position.primary, position.depth),
			Orientation::Horizontal => (position.depth, position.primary),
		}
	}

	/// Screen `(x, y)` back to layout coordinates.
	pub fn from_screen(self, x: f64, y: f64) -> Position {
		match self {
			Orientation::Vertical => Position::new(x, y),
			Orientation::Horizontal => Position::new(y, x),
		}
	}
}

/// Spacing and orientation parameters for [`layout`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
	/// Distance between consecutive levels on the depth axis.
	pub level_spacing: f64,
	/// Distance between consecutive leaf slots on the primary axis.
	pub sibling_spacing: f64,
	pub orientation: Orientation,
	/// Primary coordinate of the first leaf slot.
	pub primary_origin: f64,
	/// Depth coordinate of the root.
	pub depth_origin: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			level_spacing: 100.0,
			sibling_spacing: 150.0,
			orientation: Orientation::Vertical,
			primary_origin: 0.0,
			depth_origin: 0.0,
		}
	}
}

/// Where a single node was placed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
	pub position: Position,
	pub level: usize,
	/// The link the layout followed to reach this node. `None` for the root.
	pub via: Option<LinkId>,
}

/// Extents of a layout along both axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min: Position,
	pub max: Position,
}

impl Bounds {
	pub fn center(&self) -> Position {
		Position::new(
			(self.min.primary + self.max.primary) / 2.0,
			(self.min.depth + self.max.depth) / 2.0,
		)
	}
}

/// Computed coordinates keyed by node id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
	placements: HashMap<NodeId, Placement>,
}

impl Layout {
	pub fn get(&self, id: &str) -> Option<&Placement> {
		self.placements.get(id)
	}

	pub fn len(&self) -> usize {
		self.placements.len()
	}

	pub fn is_empty(&self) -> bool {
		self.placements.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &Placement)> {
		self.placements.iter()
	}

	/// Whether `link` is the edge the layout used to reach its target,
	/// as opposed to a cross-link into an already placed subtree.
	pub fn is_tree_link(&self, link: LinkId, target: &str) -> bool {
		self.get(target).is_some_and(|p| p.via == Some(link))
	}

	/// Bounding box of every placement, or `None` for an empty layout.
	pub fn bounds(&self) -> Option<Bounds> {
		let mut positions = self.placements.values().map(|p| p.position);
		let first = positions.next()?;
		Some(positions.fold(
			Bounds {
				min: first,
				max: first,
			},
			|b, p| Bounds {
				min: Position::new(b.min.primary.min(p.primary), b.min.depth.min(p.depth)),
				max: Position::new(b.max.primary.max(p.primary), b.max.depth.max(p.depth)),
			},
		))
	}
}

/// Lay out the hierarchy below `root`.
///
/// Every node reachable from `root` is placed exactly once, by the first
/// parent that reaches it in child-link order; later links into an already
/// placed node are cross-links and do not move it. A parent is centered on
/// the children it placed; a parent whose links all lead to placed nodes is
/// treated as a leaf.
///
/// Fails with [`GraphError::LayoutPrecondition`] when `root` is not in the
/// graph, in which case nothing is placed.
pub fn layout(
	store: &GraphStore,
	index: &AdjacencyIndex,
	root: &str,
	config: &LayoutConfig,
) -> Result<Layout> {
	let root = match store.node(root) {
		Ok(node) if index.contains(root) => &node.id,
		_ => return Err(GraphError::LayoutPrecondition(NodeId::from(root))),
	};

	let mut placer = Placer {
		store,
		index,
		config,
		placements: HashMap::with_capacity(store.nodes().len()),
	};
	placer.place(root, config.primary_origin);

	debug!(
		"tree-graph: placed {} of {} nodes",
		placer.placements.len(),
		store.nodes().len()
	);
	Ok(Layout {
		placements: placer.placements,
	})
}

struct Placer<'a> {
	store: &'a GraphStore,
	index: &'a AdjacencyIndex,
	config: &'a LayoutConfig,
	placements: HashMap<NodeId, Placement>,
}

/// A node whose children are being placed.
struct Frame<'a> {
	id: &'a NodeId,
	children: std::slice::Iter<'a, LinkId>,
	offset: f64,
	cursor: f64,
	span: Option<(f64, f64)>,
}

impl<'a> Placer<'a> {
	/// Place `root` and its unplaced descendants starting at slot `offset`.
	///
	/// Returns `(next_offset, primary)` for `root`. Each finished node hands
	/// the same pair to its parent frame: the cursor for the next sibling
	/// and the primary coordinate it was assigned. Uses an explicit stack,
	/// so depth is bounded by memory rather than the call stack.
	fn place(&mut self, root: &'a NodeId, offset: f64) -> (f64, f64) {
		let mut stack = vec![self.enter(root, 0, None, offset)];
		loop {
			let Some(frame) = stack.last_mut() else {
				return (offset, offset);
			};
			if let Some((target, link_id)) = self.next_unplaced(&mut frame.children) {
				let cursor = frame.cursor;
				let level = stack.len();
				let child = self.enter(target, level, Some(link_id), cursor);
				stack.push(child);
				continue;
			}

			let Some(done) = stack.pop() else {
				return (offset, offset);
			};
			let (next, primary) = match done.span {
				None => (done.offset + self.config.sibling_spacing, done.offset),
				Some((lo, hi)) => (done.cursor, (lo + hi) / 2.0),
			};
			if let Some(placement) = self.placements.get_mut(done.id) {
				placement.position.primary = primary;
			}
			let Some(parent) = stack.last_mut() else {
				return (next, primary);
			};
			parent.cursor = next;
			parent.span = Some(match parent.span {
				None => (primary, primary),
				Some((lo, hi)) => (lo.min(primary), hi.max(primary)),
			});
		}
	}

	/// Reserve a slot for `id` before its children are visited, so cycles
	/// and shared children stop here.
	fn enter(
		&mut self,
		id: &'a NodeId,
		level: usize,
		via: Option<LinkId>,
		offset: f64,
	) -> Frame<'a> {
		let index = self.index;
		let depth = self.config.depth_origin + level as f64 * self.config.level_spacing;
		self.placements.insert(
			id.clone(),
			Placement {
				position: Position::new(offset, depth),
				level,
				via,
			},
		);
		Frame {
			id,
			children: index.children_of(id).iter(),
			offset,
			cursor: offset,
			span: None,
		}
	}

	/// Next child link whose target has not been placed yet.
	fn next_unplaced(
		&self,
		children: &mut std::slice::Iter<'a, LinkId>,
	) -> Option<(&'a NodeId, LinkId)> {
		let store = self.store;
		children.find_map(|&link_id| {
			let link = store.link(link_id).ok()?;
			(!self.placements.contains_key(&link.target)).then_some((&link.target, link_id))
		})
	}
}
