//! Fixed-budget force-directed relaxation.
//!
//! - Visible nodes repel each other with a Coulomb-like `k / d^2` force
//! - Edges pull their endpoints together like springs with no rest length
//! - Velocities are rebuilt every step and damped on integration
//! - Positions are clamped into a fixed working rectangle

use super::state::LayoutNode;

/// Axis-aligned rectangle in graph space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	/// Left edge.
	pub min_x: f64,
	/// Top edge.
	pub min_y: f64,
	/// Right edge.
	pub max_x: f64,
	/// Bottom edge.
	pub max_y: f64,
}

impl Bounds {
	/// Rectangle from its corners.
	pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
		Self {
			min_x,
			min_y,
			max_x,
			max_y,
		}
	}

	/// Clamp a point into the rectangle.
	pub fn clamp(&self, x: f64, y: f64) -> (f64, f64) {
		(
			x.clamp(self.min_x, self.max_x),
			y.clamp(self.min_y, self.max_y),
		)
	}

	/// True if the point lies inside or on the border.
	pub fn contains(&self, x: f64, y: f64) -> bool {
		(self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
	}
}

/// Tuning of the relaxation.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
	/// Repulsion constant `k` in `k / d^2`.
	pub repulsion: f64,
	/// Spring constant; the pull is `attraction * d`.
	pub attraction: f64,
	/// Velocity multiplier on integration, below 1.
	pub damping: f64,
	/// Pairs closer than this exert no repulsion at all.
	pub min_distance: f64,
	/// Number of steps after which physics stops.
	pub max_iterations: u32,
	/// Working rectangle every position is clamped into.
	pub bounds: Bounds,
	/// Rectangle random seeds are drawn from.
	pub seed_area: Bounds,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			repulsion: 5000.0,
			attraction: 0.01,
			damping: 0.8,
			min_distance: 50.0,
			max_iterations: 300,
			bounds: Bounds::new(50.0, 50.0, 1150.0, 650.0),
			seed_area: Bounds::new(200.0, 100.0, 1000.0, 600.0),
		}
	}
}

/// Run one relaxation step over the visible nodes.
///
/// `pinned` is the node currently held by the pointer: it still pushes and
/// pulls the others but does not move.
pub(super) fn relax(
	nodes: &mut [LayoutNode],
	edges: &[(usize, usize)],
	pinned: Option<usize>,
	config: &SimulationConfig,
) {
	let visible: Vec<usize> = (0..nodes.len()).filter(|&i| nodes[i].visible).collect();

	for &i in &visible {
		nodes[i].vx = 0.0;
		nodes[i].vy = 0.0;
	}

	for (n, &a) in visible.iter().enumerate() {
		for &b in &visible[n + 1..] {
			let dx = nodes[b].x - nodes[a].x;
			let dy = nodes[b].y - nodes[a].y;
			let mut distance = (dx * dx + dy * dy).sqrt();
			if distance == 0.0 {
				distance = 1.0;
			}
			if distance < config.min_distance {
				continue;
			}

			let force = config.repulsion / (distance * distance);
			let (fx, fy) = ((dx / distance) * force, (dy / distance) * force);

			nodes[a].vx -= fx;
			nodes[a].vy -= fy;
			nodes[b].vx += fx;
			nodes[b].vy += fy;
		}
	}

	for &(source, target) in edges {
		if !nodes[source].visible || !nodes[target].visible {
			continue;
		}

		// Hooke with zero rest length: (dx / d) * (k * d) == k * dx
		let fx = config.attraction * (nodes[target].x - nodes[source].x);
		let fy = config.attraction * (nodes[target].y - nodes[source].y);

		nodes[source].vx += fx;
		nodes[source].vy += fy;
		nodes[target].vx -= fx;
		nodes[target].vy -= fy;
	}

	for &i in &visible {
		if Some(i) == pinned {
			continue;
		}
		let node = &mut nodes[i];
		let (x, y) = config.bounds.clamp(
			node.x + node.vx * config.damping,
			node.y + node.vy * config.damping,
		);
		node.x = x;
		node.y = y;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::GraphNode;

	fn create_test_node(id: &str, x: f64, y: f64) -> LayoutNode {
		LayoutNode::new(GraphNode::new(id, "concept"), x, y, 8.0, "#95a5a6".into())
	}

	#[test]
	fn test_relax_repulsion() {
		let mut nodes = vec![
			create_test_node("a", 500.0, 300.0),
			create_test_node("b", 600.0, 300.0),
		];
		relax(&mut nodes, &[], None, &SimulationConfig::default());

		// 5000 / 100^2 = 0.5, damped by 0.8
		assert!((nodes[0].x - 499.6).abs() < 1e-9);
		assert!((nodes[1].x - 600.4).abs() < 1e-9);
		assert_eq!(nodes[0].y, 300.0);
	}

	#[test]
	fn test_relax_skips_pairs_below_min_distance() {
		let mut nodes = vec![
			create_test_node("a", 500.0, 300.0),
			create_test_node("b", 520.0, 300.0),
		];
		relax(&mut nodes, &[], None, &SimulationConfig::default());

		assert_eq!(nodes[0].x, 500.0);
		assert_eq!(nodes[1].x, 520.0);
	}

	#[test]
	fn test_relax_coincident_nodes_are_finite() {
		let mut nodes = vec![
			create_test_node("a", 400.0, 400.0),
			create_test_node("b", 400.0, 400.0),
		];
		let config = SimulationConfig {
			min_distance: 0.0,
			..SimulationConfig::default()
		};
		relax(&mut nodes, &[(0, 1)], None, &config);

		for node in &nodes {
			assert!(node.x.is_finite() && node.y.is_finite());
		}
	}

	#[test]
	fn test_relax_spring_pulls_endpoints() {
		let mut nodes = vec![
			create_test_node("a", 200.0, 300.0),
			create_test_node("b", 1000.0, 300.0),
		];
		let config = SimulationConfig {
			repulsion: 0.0,
			..SimulationConfig::default()
		};
		relax(&mut nodes, &[(0, 1)], None, &config);

		// 0.01 * 800 = 8, damped by 0.8
		assert!((nodes[0].x - 206.4).abs() < 1e-9);
		assert!((nodes[1].x - 993.6).abs() < 1e-9);
	}

	#[test]
	fn test_relax_clamps_into_bounds() {
		let mut nodes = vec![
			create_test_node("a", 50.0, 50.0),
			create_test_node("b", 110.0, 50.0),
		];
		let config = SimulationConfig {
			repulsion: 1.0e7,
			..SimulationConfig::default()
		};
		relax(&mut nodes, &[], None, &config);

		assert_eq!(nodes[0].x, 50.0);
		assert_eq!(nodes[1].x, 1150.0);
		assert!(nodes.iter().all(|n| config.bounds.contains(n.x, n.y)));
	}

	#[test]
	fn test_relax_ignores_invisible_nodes() {
		let mut nodes = vec![
			create_test_node("a", 500.0, 300.0),
			create_test_node("b", 600.0, 300.0),
		];
		nodes[1].visible = false;
		relax(&mut nodes, &[(0, 1)], None, &SimulationConfig::default());

		assert_eq!((nodes[0].x, nodes[0].y), (500.0, 300.0));
		assert_eq!((nodes[1].x, nodes[1].y), (600.0, 300.0));
	}

	#[test]
	fn test_relax_pinned_node_still_pushes() {
		let mut nodes = vec![
			create_test_node("a", 500.0, 300.0),
			create_test_node("b", 600.0, 300.0),
		];
		relax(&mut nodes, &[], Some(0), &SimulationConfig::default());

		assert_eq!(nodes[0].x, 500.0);
		assert!(nodes[1].x > 600.0);
	}
}
