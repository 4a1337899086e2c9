//! Canvas rendering for the tree graph.
//!
//! Draws in passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Links, then link labels for highlighted links (world space)
//! 3. Nodes with their hover rings and labels
//! 4. Vignette (screen space)

use std::collections::HashMap;
use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::scale::{ScaleConfig, ScaledValues};
use super::state::CanvasState;
use super::theme::{Color, Theme};
use crate::engine::{RenderGraph, RenderLink, RenderNode};

/// Renders the complete graph to the canvas.
pub fn render(
	state: &CanvasState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let scale = ScaledValues::new(config, state.transform.k);
	let graph = state.render_graph();
	let dimming = state.graph.highlight().is_active();

	draw_background(state, ctx, theme);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	draw_links(&graph, ctx, &scale, theme, dimming);
	draw_nodes(&graph, ctx, &scale, theme, dimming);

	ctx.restore();

	if theme.background.vignette > 0.0 {
		draw_vignette(state, ctx, theme);
	}
}

fn draw_background(state: &CanvasState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let (w, h) = (state.width, state.height);
	let gradient = theme
		.background
		.use_gradient
		.then(|| ctx.create_radial_gradient(w / 2.0, h / 2.0, 0.0, w / 2.0, h / 2.0, w.max(h) * 0.8))
		.and_then(Result::ok);

	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &theme.background.color_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background.color.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&theme.background.color.to_css()),
	}
	ctx.fill_rect(0.0, 0.0, w, h);
}

fn draw_vignette(state: &CanvasState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let (w, h) = (state.width, state.height);
	let Ok(gradient) = ctx.create_radial_gradient(
		w / 2.0,
		h / 2.0,
		w.min(h) * 0.3,
		w / 2.0,
		h / 2.0,
		w.max(h) * 0.7,
	) else {
		return;
	};

	let _ = gradient.add_color_stop(0.0, "rgba(0, 0, 0, 0)");
	let _ = gradient.add_color_stop(
		1.0,
		&format!("rgba(0, 0, 0, {})", theme.background.vignette),
	);

	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill_rect(0.0, 0.0, w, h);
}

fn draw_links(
	graph: &RenderGraph,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	dimming: bool,
) {
	let positions: HashMap<&str, (f64, f64)> = graph
		.nodes
		.iter()
		.map(|n| (n.id.as_str(), (n.x, n.y)))
		.collect();
	let position = |id: &str| positions.get(id).copied();

	// Highlighted links last so they sit on top.
	let (highlighted, rest): (Vec<&RenderLink>, Vec<&RenderLink>) =
		graph.links.iter().partition(|l| l.highlighted);
	for link in rest.into_iter().chain(highlighted.iter().copied()) {
		let (Some(from), Some(to)) = (
			position(link.source_id.as_str()),
			position(link.target_id.as_str()),
		) else {
			continue;
		};
		let alpha = if dimming && !link.highlighted {
			theme.link.dim_alpha
		} else {
			1.0
		};
		draw_link(ctx, scale, theme.link.color_for(link).with_alpha(alpha), link, from, to);
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	ctx.set_font(&scale.label_font);
	ctx.set_fill_style_str(&theme.link.label_color.to_css());
	for link in highlighted {
		let (Some(label), Some(from), Some(to)) = (
			link.label.as_deref(),
			position(link.source_id.as_str()),
			position(link.target_id.as_str()),
		) else {
			continue;
		};
		let _ = ctx.fill_text(label, (from.0 + to.0) / 2.0 + 4.0, (from.1 + to.1) / 2.0 - 4.0);
	}
}

fn draw_link(
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	color: Color,
	link: &RenderLink,
	(x1, y1): (f64, f64),
	(x2, y2): (f64, f64),
) {
	let (dx, dy) = (x2 - x1, y2 - y1);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < scale.node_radius * 2.0 {
		return;
	}
	let (ux, uy) = (dx / dist, dy / dist);

	ctx.set_stroke_style_str(&color.to_css());
	ctx.set_line_width(if link.highlighted {
		scale.highlight_link_width
	} else {
		scale.link_width
	});
	// Cross-links into a subtree placed under another parent are dashed.
	if link.tree_link {
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	} else {
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(scale.dash_pattern.0),
			&JsValue::from_f64(scale.dash_pattern.1),
		));
	}

	let (tip_x, tip_y) = (x2 - ux * scale.node_radius, y2 - uy * scale.node_radius);
	ctx.begin_path();
	ctx.move_to(x1 + ux * scale.node_radius, y1 + uy * scale.node_radius);
	ctx.line_to(tip_x - ux * scale.arrow_size, tip_y - uy * scale.arrow_size);
	ctx.stroke();

	let (back_x, back_y) = (tip_x - ux * scale.arrow_size, tip_y - uy * scale.arrow_size);
	let (px, py) = (-uy * scale.arrow_size * 0.5, ux * scale.arrow_size * 0.5);
	ctx.set_fill_style_str(&color.to_css());
	ctx.begin_path();
	ctx.move_to(tip_x, tip_y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_nodes(
	graph: &RenderGraph,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	dimming: bool,
) {
	// Highlighted nodes on top of the dimmed rest.
	let (highlighted, rest): (Vec<&RenderNode>, Vec<&RenderNode>) =
		graph.nodes.iter().partition(|n| n.highlighted);
	for node in rest.into_iter().chain(highlighted) {
		let alpha = if dimming && !node.highlighted {
			theme.node.dim_alpha
		} else {
			1.0
		};
		draw_node(ctx, node, scale, theme, alpha);
	}
}

fn draw_node(
	ctx: &CanvasRenderingContext2d,
	node: &RenderNode,
	scale: &ScaledValues,
	theme: &Theme,
	alpha: f64,
) {
	let (x, y, radius) = (node.x, node.y, scale.node_radius);
	let fill = theme.node.fill_for(node);

	ctx.set_global_alpha(alpha);

	let gradient = theme
		.node
		.use_gradient
		.then(|| ctx.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius))
		.and_then(Result::ok);
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &fill.lighten(0.4).to_css());
			let _ = gradient.add_color_stop(0.7, &fill.to_css());
			let _ = gradient.add_color_stop(1.0, &fill.darken(0.2).to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&fill.to_css()),
	}
	ctx.fill();

	if node.manual && theme.node.manual_border.a > 0.0 {
		ctx.set_stroke_style_str(&theme.node.manual_border.to_css());
		ctx.set_line_width(scale.ring_width * 0.5);
		ctx.stroke();
	}

	if node.highlighted {
		let ring = if node.hovered {
			theme.node.hovered_ring
		} else {
			theme.node.neighbor_ring
		};
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius + scale.ring_offset, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(&ring.to_css());
		ctx.set_line_width(scale.ring_width);
		ctx.stroke();
	}

	ctx.set_fill_style_str(&theme.node.label_color.to_css());
	ctx.set_font(&scale.label_font);
	let _ = ctx.fill_text(&node.label, x + radius + 4.0, y + 3.0);

	ctx.set_global_alpha(1.0);
}
