//! Rendering-agnostic layout and visibility engine.
//!
//! Data flows leaves-first through the submodules:
//!
//! 1. [`GraphStore`] holds nodes, links and per-node collapsed flags.
//! 2. [`AdjacencyIndex`] derives child-link, neighbor and incident-link lookups.
//! 3. [`layout()`] assigns primary/depth coordinates to everything below the root.
//! 4. [`prune()`] derives the visible subset from the collapsed flags.
//! 5. [`HighlightController`] tracks the hovered element and its neighborhood.
//!
//! [`TreeGraph`] wires these together and consumes interaction events
//! (click, hover, drag end), producing a [`RenderGraph`] any renderer can
//! paint.
//!
//! # Example
//!
//! ```
//! use tree_graph::engine::{CollapsePolicy, GraphInput, LayoutConfig, TreeData, TreeGraph};
//!
//! let input = GraphInput::Nested(
//!     TreeData::leaf("root")
//!         .with_child(TreeData::leaf("a"))
//!         .with_child(TreeData::leaf("b")),
//! );
//! let mut graph = TreeGraph::new(input, LayoutConfig::default(), &CollapsePolicy::AllExpanded)?;
//! assert_eq!(graph.visible().nodes.len(), 3);
//!
//! graph.node_clicked("root")?;
//! assert_eq!(graph.visible().nodes.len(), 1);
//! # Ok::<(), tree_graph::engine::GraphError>(())
//! ```

mod adjacency;
mod error;
mod highlight;
mod layout;
mod prune;
mod session;
mod store;
mod types;

pub use adjacency::AdjacencyIndex;
pub use error::{GraphError, InvalidGraphReason, Result};
pub use highlight::{HighlightController, HoverTarget};
pub use layout::{Bounds, Layout, LayoutConfig, Orientation, Placement, layout};
pub use prune::{VisibleGraph, prune};
pub use session::{RenderGraph, RenderLink, RenderNode, TreeGraph};
pub use store::{CollapsePolicy, GraphStore, Link, Node, Position, Relayout};
pub use types::{
	GraphData, GraphDocument, GraphInput, GraphLink, GraphNode, LinkId, LinkQuality, NodeId,
	NormalizedGraph, TreeData,
};
