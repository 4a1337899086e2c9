//! Visual theming for the tree graph.
//!
//! Node fill encodes structure (leaf, collapsed, expanded), link stroke
//! encodes quality, and rings mark the hovered node and its neighbors.

use crate::engine::{LinkQuality, RenderLink, RenderNode};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Primary background color
	pub color: Color,
	/// Secondary color for gradients
	pub color_secondary: Color,
	/// Whether to use radial gradient
	pub use_gradient: bool,
	/// Vignette intensity (0.0 = none, 1.0 = strong)
	pub vignette: f64,
}

/// Link stroke colors.
#[derive(Clone, Debug)]
pub struct LinkStyle {
	/// Links without a quality tag
	pub color: Color,
	pub good: Color,
	pub fair: Color,
	pub poor: Color,
	/// Links touching the hovered element
	pub highlight: Color,
	/// Alpha multiplier for links outside the highlight while something is hovered
	pub dim_alpha: f64,
	/// Label text color for highlighted links
	pub label_color: Color,
}

impl LinkStyle {
	/// Stroke color for a link, before dimming.
	pub fn color_for(&self, link: &RenderLink) -> Color {
		if link.highlighted {
			return self.highlight;
		}
		match link.quality {
			Some(LinkQuality::Good) => self.good,
			Some(LinkQuality::Fair) => self.fair,
			Some(LinkQuality::Poor) => self.poor,
			None => self.color,
		}
	}
}

/// Node fill and ring colors.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Nodes with no outgoing links
	pub leaf: Color,
	/// Nodes whose children are hidden
	pub collapsed: Color,
	/// Nodes whose children are shown
	pub expanded: Color,
	/// Whether nodes have inner gradients
	pub use_gradient: bool,
	/// Ring around the hovered node
	pub hovered_ring: Color,
	/// Ring around the hovered node's neighbors
	pub neighbor_ring: Color,
	/// Border drawn around user-placed nodes (alpha 0 disables it)
	pub manual_border: Color,
	/// Alpha multiplier for nodes outside the highlight while something is hovered
	pub dim_alpha: f64,
	pub label_color: Color,
}

impl NodeStyle {
	/// Fill color for a node.
	pub fn fill_for(&self, node: &RenderNode) -> Color {
		if !node.has_children {
			self.leaf
		} else if node.collapsed {
			self.collapsed
		} else {
			self.expanded
		}
	}
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub name: &'static str,
	pub background: BackgroundStyle,
	pub link: LinkStyle,
	pub node: NodeStyle,
}

impl Theme {
	/// Dark theme with the traffic-light node and link colors (default)
	pub fn default_theme() -> Self {
		Self {
			name: "default",
			background: BackgroundStyle {
				color: Color::rgb(22, 27, 34),
				color_secondary: Color::rgb(30, 35, 42),
				use_gradient: true,
				vignette: 0.15,
			},
			link: LinkStyle {
				color: Color::rgba(140, 160, 180, 0.6),
				good: Color::rgb(76, 175, 80),
				fair: Color::rgb(255, 193, 7),
				poor: Color::rgb(244, 67, 54),
				highlight: Color::rgb(255, 255, 255),
				dim_alpha: 0.25,
				label_color: Color::rgba(255, 255, 255, 0.85),
			},
			node: NodeStyle {
				leaf: Color::rgb(76, 175, 80),
				collapsed: Color::rgb(244, 67, 54),
				expanded: Color::rgb(255, 193, 7),
				use_gradient: true,
				hovered_ring: Color::rgb(244, 67, 54),
				neighbor_ring: Color::rgb(255, 152, 0),
				manual_border: Color::rgba(255, 255, 255, 0.6),
				dim_alpha: 0.35,
				label_color: Color::rgba(255, 255, 255, 0.85),
			},
		}
	}

	/// Light theme for embedding in bright pages
	pub fn paper() -> Self {
		Self {
			name: "paper",
			background: BackgroundStyle {
				color: Color::rgb(250, 250, 247),
				color_secondary: Color::rgb(250, 250, 247),
				use_gradient: false,
				vignette: 0.0,
			},
			link: LinkStyle {
				color: Color::rgba(90, 100, 115, 0.6),
				good: Color::rgb(56, 142, 60),
				fair: Color::rgb(230, 160, 0),
				poor: Color::rgb(211, 47, 47),
				highlight: Color::rgb(33, 33, 33),
				dim_alpha: 0.3,
				label_color: Color::rgba(33, 33, 33, 0.9),
			},
			node: NodeStyle {
				leaf: Color::rgb(56, 142, 60),
				collapsed: Color::rgb(211, 47, 47),
				expanded: Color::rgb(230, 160, 0),
				use_gradient: false,
				hovered_ring: Color::rgb(211, 47, 47),
				neighbor_ring: Color::rgb(239, 108, 0),
				manual_border: Color::rgba(33, 33, 33, 0.5),
				dim_alpha: 0.4,
				label_color: Color::rgba(33, 33, 33, 0.9),
			},
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::{LinkId, NodeId};

	fn node(has_children: bool, collapsed: bool) -> RenderNode {
		RenderNode {
			id: NodeId::new("n"),
			label: "n".into(),
			primary_coord: 0.0,
			depth_coord: 0.0,
			x: 0.0,
			y: 0.0,
			collapsed,
			has_children,
			pinned: true,
			manual: false,
			highlighted: false,
			hovered: false,
		}
	}

	#[test]
	fn node_fill_follows_structure() {
		let style = Theme::default().node;
		assert_eq!(style.fill_for(&node(false, false)), style.leaf);
		assert_eq!(style.fill_for(&node(false, true)), style.leaf);
		assert_eq!(style.fill_for(&node(true, true)), style.collapsed);
		assert_eq!(style.fill_for(&node(true, false)), style.expanded);
	}

	#[test]
	fn highlight_overrides_quality() {
		let style = Theme::default().link;
		let mut link = RenderLink {
			index: LinkId(0),
			source_id: NodeId::new("a"),
			target_id: NodeId::new("b"),
			quality: Some(LinkQuality::Poor),
			label: None,
			tree_link: true,
			highlighted: false,
		};
		assert_eq!(style.color_for(&link), style.poor);
		link.highlighted = true;
		assert_eq!(style.color_for(&link), style.highlight);
	}

	#[test]
	fn css_output() {
		assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
		assert_eq!(Color::rgb(10, 20, 30).with_alpha(0.5).to_css(), "rgba(10, 20, 30, 0.5)");
	}
}
