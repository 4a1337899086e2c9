//! Collapsible tree graph visualization component.
//!
//! Renders a [`TreeGraph`](crate::engine::TreeGraph) on an HTML canvas with:
//! - Click to collapse or expand a node's subtree
//! - Node dragging that pins the node where it is dropped
//! - Pan, zoom, and hover highlighting of nodes and links
//! - Configurable theming and visual scaling
//!
//! # Example
//!
//! ```ignore
//! use tree_graph::components::tree_graph::TreeGraphCanvas;
//! use tree_graph::engine::{GraphDocument, GraphInput, TreeData};
//!
//! let tree = TreeData::leaf("root").with_child(TreeData::leaf("child"));
//! let document = GraphDocument::from(GraphInput::Nested(tree));
//!
//! view! { <TreeGraphCanvas document=Signal::stored(document) fullscreen=true /> }
//! ```

mod component;
mod render;
pub mod scale;
mod state;
pub mod theme;

pub use component::TreeGraphCanvas;
pub use theme::Theme;
