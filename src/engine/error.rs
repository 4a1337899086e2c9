//! Engine error taxonomy.
//!
//! Every engine error is returned synchronously to the caller of the
//! operation that failed, and a failed operation leaves engine state exactly
//! as it was before the call.

use thiserror::Error;

use super::types::{LinkId, NodeId};

/// Result alias used throughout the engine.
pub type Result<T, E = GraphError> = std::result::Result<T, E>;

/// Errors raised by the graph engine.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GraphError {
	/// Malformed input. Fatal to `load`; nothing is committed.
	#[error("invalid graph: {0}")]
	InvalidGraph(#[from] InvalidGraphReason),
	/// An operation named a node that is not in the store.
	#[error("node `{0}` not found")]
	NodeNotFound(NodeId),
	/// An operation named a link index that is not in the store.
	#[error("link #{0} not found")]
	LinkNotFound(LinkId),
	/// The layout root is not part of the graph; no coordinates were assigned.
	#[error("cannot lay out graph: root `{0}` is not in the graph")]
	LayoutPrecondition(NodeId),
}

impl GraphError {
	/// Whether the caller can retry the same operation with a corrected id.
	///
	/// Lookup failures are recoverable. Malformed graphs and layout
	/// preconditions are configuration errors.
	pub fn is_recoverable(&self) -> bool {
		matches!(self, GraphError::NodeNotFound(_) | GraphError::LinkNotFound(_))
	}
}

/// Why a graph was rejected at load time.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidGraphReason {
	#[error("graph has no nodes")]
	Empty,
	#[error("duplicate node id `{0}`")]
	DuplicateNode(NodeId),
	#[error("link #{link} references unknown node `{endpoint}`")]
	DanglingLink { link: LinkId, endpoint: NodeId },
	#[error("declared root `{0}` is not a node")]
	MissingRoot(NodeId),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn messages_name_the_offending_id() {
		let err = GraphError::from(InvalidGraphReason::DanglingLink {
			link: LinkId(3),
			endpoint: NodeId::new("ghost"),
		});
		assert_eq!(
			err.to_string(),
			"invalid graph: link #3 references unknown node `ghost`"
		);
		assert_eq!(
			GraphError::NodeNotFound(NodeId::new("x")).to_string(),
			"node `x` not found"
		);
	}

	#[test]
	fn only_lookups_are_recoverable() {
		assert!(GraphError::NodeNotFound(NodeId::new("x")).is_recoverable());
		assert!(GraphError::LinkNotFound(LinkId(0)).is_recoverable());
		assert!(!GraphError::LayoutPrecondition(NodeId::new("r")).is_recoverable());
		assert!(!GraphError::from(InvalidGraphReason::Empty).is_recoverable());
	}
}
