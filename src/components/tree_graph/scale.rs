//! Zoom-dependent sizing for canvas visuals.
//!
//! Drawing happens in world space (after the pan/zoom transform is applied),
//! so a size that should stay fixed on screen is divided by the zoom factor
//! `k`, and a size that should grow with zoom is left alone.

/// How a visual property scales with zoom level.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant world-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// World-space value for `base` at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Node sizing.
#[derive(Clone, Debug)]
pub struct NodeScaleConfig {
	/// Base node radius in world units.
	pub radius: f64,
	pub radius_behavior: ScaleBehavior,
	/// Hit detection radius in world units.
	pub hit_radius: f64,
	pub hit_behavior: ScaleBehavior,
	/// Label font size in screen pixels.
	pub label_size: f64,
	/// Below this zoom level labels stop growing on screen.
	pub label_min_k: f64,
}

/// Link sizing.
#[derive(Clone, Debug)]
pub struct LinkScaleConfig {
	/// Line width in screen pixels.
	pub line_width: f64,
	/// Width multiplier for highlighted links.
	pub highlight_width: f64,
	/// Pointer distance in screen pixels that still counts as over a link.
	pub hit_width: f64,
	/// Dash pattern (dash, gap) for cross-links, in world units.
	pub dash_pattern: (f64, f64),
	/// Arrowhead size in world units.
	pub arrow_size: f64,
	pub arrow_behavior: ScaleBehavior,
}

/// Hover ring sizing, in screen pixels.
#[derive(Clone, Debug)]
pub struct RingScaleConfig {
	pub width: f64,
	pub offset: f64,
}

/// Complete scale configuration.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	pub node: NodeScaleConfig,
	pub link: LinkScaleConfig,
	pub ring: RingScaleConfig,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node: NodeScaleConfig {
				radius: 10.0,
				radius_behavior: ScaleBehavior::Clamped {
					min_screen: 4.0,
					max_screen: f64::INFINITY,
				},
				hit_radius: 14.0,
				hit_behavior: ScaleBehavior::Clamped {
					min_screen: 6.0,
					max_screen: f64::INFINITY,
				},
				label_size: 12.0,
				label_min_k: 0.5,
			},
			link: LinkScaleConfig {
				line_width: 1.5,
				highlight_width: 2.0,
				hit_width: 5.0,
				dash_pattern: (6.0, 4.0),
				arrow_size: 7.0,
				arrow_behavior: ScaleBehavior::World,
			},
			ring: RingScaleConfig {
				width: 2.0,
				offset: 3.0,
			},
		}
	}
}

/// Scale values resolved for one zoom level.
///
/// Computed once per frame (and per hit test). All sizes are world-space.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	pub k: f64,
	pub node_radius: f64,
	pub hit_radius: f64,
	/// CSS font string, e.g. `"12px sans-serif"`.
	pub label_font: String,
	pub link_width: f64,
	pub highlight_link_width: f64,
	pub link_hit_width: f64,
	pub dash_pattern: (f64, f64),
	pub arrow_size: f64,
	pub ring_width: f64,
	pub ring_offset: f64,
}

impl ScaledValues {
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let link_width = ScaleBehavior::Screen.apply(config.link.line_width, k);
		Self {
			k,
			node_radius: config.node.radius_behavior.apply(config.node.radius, k),
			hit_radius: config.node.hit_behavior.apply(config.node.hit_radius, k),
			label_font: format!(
				"{}px sans-serif",
				config.node.label_size / k.max(config.node.label_min_k)
			),
			link_width,
			highlight_link_width: link_width * config.link.highlight_width,
			link_hit_width: ScaleBehavior::Screen.apply(config.link.hit_width, k),
			dash_pattern: config.link.dash_pattern,
			arrow_size: config.link.arrow_behavior.apply(config.link.arrow_size, k),
			ring_width: ScaleBehavior::Screen.apply(config.ring.width, k),
			ring_offset: ScaleBehavior::Screen.apply(config.ring.offset, k),
		}
	}
}
