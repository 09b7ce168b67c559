use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::palette::RenderStyle;
use super::state::{LayoutEngine, ViewTransform};

const ARROW_SIZE: f64 = 15.0;
const LABEL_GAP: f64 = 12.0;
const HIGHLIGHT_WIDTH: f64 = 2.0;

/// Minimal 2D drawing target the renderer paints onto.
pub trait Surface {
	/// Fill the whole surface with `color`, ignoring any transform.
	fn clear(&mut self, width: f64, height: f64, color: &str);
	/// Apply pan and zoom to everything drawn until [`Surface::restore`].
	fn apply(&mut self, transform: &ViewTransform);
	/// Drop the transform set by [`Surface::apply`].
	fn restore(&mut self);
	/// Straight stroked segment.
	fn line(&mut self, from: (f64, f64), to: (f64, f64), color: &str, width: f64);
	/// Filled triangle.
	fn triangle(&mut self, points: [(f64, f64); 3], color: &str);
	/// Filled circle.
	fn circle(&mut self, center: (f64, f64), radius: f64, color: &str);
	/// Stroked circle.
	fn ring(&mut self, center: (f64, f64), radius: f64, color: &str, width: f64);
	/// Text centered horizontally on `at`.
	fn text(&mut self, at: (f64, f64), text: &str, color: &str, px: f64);
}

/// Paint the engine's current positions. Reads state only.
pub fn render(engine: &LayoutEngine, surface: &mut impl Surface, style: &RenderStyle) {
	let (width, height) = engine.size();
	surface.clear(width, height, &style.background);
	if engine.is_empty() {
		return;
	}
	surface.apply(&engine.transform);
	draw_edges(engine, surface, style);
	draw_nodes(engine, surface, style);
	surface.restore();
}

fn draw_edges(engine: &LayoutEngine, surface: &mut impl Surface, style: &RenderStyle) {
	let k = engine.transform.k;
	let nodes = engine.nodes();

	for &(source, target) in engine.edges() {
		let (from, to) = (&nodes[source], &nodes[target]);
		if !from.visible || !to.visible {
			continue;
		}
		surface.line(
			(from.x, from.y),
			(to.x, to.y),
			&style.edge_color,
			style.edge_width / k,
		);

		if style.arrows {
			let (dx, dy) = (to.x - from.x, to.y - from.y);
			let dist = (dx * dx + dy * dy).sqrt();
			if dist < 0.001 {
				continue;
			}
			let (ux, uy) = (dx / dist, dy / dist);
			let size = ARROW_SIZE / k;
			let (tip_x, tip_y) = (to.x - ux * to.radius, to.y - uy * to.radius);
			let (back_x, back_y) = (tip_x - ux * size, tip_y - uy * size);
			let (px, py) = (-uy * size * 0.5, ux * size * 0.5);
			surface.triangle(
				[
					(tip_x, tip_y),
					(back_x + px, back_y + py),
					(back_x - px, back_y - py),
				],
				&style.arrow_color,
			);
		}
	}
}

fn draw_nodes(engine: &LayoutEngine, surface: &mut impl Surface, style: &RenderStyle) {
	let k = engine.transform.k;
	let highlighted = |idx| engine.selected() == Some(idx) || engine.dragged() == Some(idx);

	for (idx, node) in engine.nodes().iter().enumerate() {
		if !node.visible {
			continue;
		}
		surface.circle((node.x, node.y), node.radius, &node.color);
		if highlighted(idx) {
			surface.ring(
				(node.x, node.y),
				node.radius,
				&style.highlight_color,
				HIGHLIGHT_WIDTH / k,
			);
		}
		surface.text(
			(node.x, node.y + node.radius + LABEL_GAP),
			node.label(),
			&style.label_color,
			style.label_px,
		);
	}
}

/// [`Surface`] over a browser 2d context.
pub struct CanvasSurface<'a> {
	ctx: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasSurface<'a> {
	/// Wrap a context for one frame.
	pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
		Self { ctx }
	}
}

impl Surface for CanvasSurface<'_> {
	fn clear(&mut self, width: f64, height: f64, color: &str) {
		self.ctx.set_fill_style_str(color);
		self.ctx.fill_rect(0.0, 0.0, width, height);
	}

	fn apply(&mut self, transform: &ViewTransform) {
		self.ctx.save();
		let _ = self.ctx.translate(transform.x, transform.y);
		let _ = self.ctx.scale(transform.k, transform.k);
	}

	fn restore(&mut self) {
		self.ctx.restore();
	}

	fn line(&mut self, from: (f64, f64), to: (f64, f64), color: &str, width: f64) {
		self.ctx.set_stroke_style_str(color);
		self.ctx.set_line_width(width);
		self.ctx.begin_path();
		self.ctx.move_to(from.0, from.1);
		self.ctx.line_to(to.0, to.1);
		self.ctx.stroke();
	}

	fn triangle(&mut self, points: [(f64, f64); 3], color: &str) {
		self.ctx.set_fill_style_str(color);
		self.ctx.begin_path();
		self.ctx.move_to(points[0].0, points[0].1);
		self.ctx.line_to(points[1].0, points[1].1);
		self.ctx.line_to(points[2].0, points[2].1);
		self.ctx.close_path();
		self.ctx.fill();
	}

	fn circle(&mut self, center: (f64, f64), radius: f64, color: &str) {
		self.ctx.begin_path();
		let _ = self.ctx.arc(center.0, center.1, radius, 0.0, 2.0 * PI);
		self.ctx.set_fill_style_str(color);
		self.ctx.fill();
	}

	fn ring(&mut self, center: (f64, f64), radius: f64, color: &str, width: f64) {
		self.ctx.begin_path();
		let _ = self.ctx.arc(center.0, center.1, radius, 0.0, 2.0 * PI);
		self.ctx.set_stroke_style_str(color);
		self.ctx.set_line_width(width);
		self.ctx.stroke();
	}

	fn text(&mut self, at: (f64, f64), text: &str, color: &str, px: f64) {
		self.ctx.set_fill_style_str(color);
		self.ctx.set_font(&format!("{px}px sans-serif"));
		self.ctx.set_text_align("center");
		let _ = self.ctx.fill_text(text, at.0, at.1);
	}
}
