use std::collections::{BTreeMap, HashMap};

use log::{debug, info};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::palette::TypeStyles;
use super::physics::{self, SimulationConfig};
use super::types::{GraphNode, GraphPayload};

/// Smallest zoom factor.
pub const MIN_ZOOM: f64 = 0.5;
/// Largest zoom factor.
pub const MAX_ZOOM: f64 = 3.0;
/// Extra pick radius around a node, in graph units.
pub const PICK_SLOP: f64 = 5.0;
/// A press released within this many pixels of where it started is a click.
pub const CLICK_SLOP: f64 = 3.0;
/// Rendered labels are cut to this many characters.
pub const LABEL_MAX_CHARS: usize = 15;
const ID_LABEL_CHARS: usize = 7;

/// Index of a node inside the engine's current snapshot.
pub type NodeIndex = usize;

/// A node being laid out.
#[derive(Clone, Debug)]
pub struct LayoutNode {
	/// The payload node this was built from.
	pub data: GraphNode,
	/// Graph-space x.
	pub x: f64,
	/// Graph-space y.
	pub y: f64,
	/// Velocity accumulator, rebuilt every step.
	pub vx: f64,
	/// Velocity accumulator, rebuilt every step.
	pub vy: f64,
	/// Circle radius from the type table.
	pub radius: f64,
	/// Fill color from the type table.
	pub color: String,
	/// Hidden nodes are skipped by physics, rendering and picking.
	pub visible: bool,
	label: String,
}

impl LayoutNode {
	/// Wrap a payload node at a position with its style.
	pub fn new(data: GraphNode, x: f64, y: f64, radius: f64, color: String) -> Self {
		let label = if data.label.is_empty() {
			data.id.to_string().chars().take(ID_LABEL_CHARS).collect()
		} else {
			data.label.chars().take(LABEL_MAX_CHARS).collect()
		};
		Self {
			data,
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			radius,
			color,
			visible: true,
			label,
		}
	}

	/// Truncated display label.
	pub fn label(&self) -> &str {
		&self.label
	}
}

/// Pan offset and zoom between graph space and screen space.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal pan in screen pixels.
	pub x: f64,
	/// Vertical pan in screen pixels.
	pub y: f64,
	/// Zoom factor.
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	/// Screen point to graph point.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Graph point to screen point.
	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(gx * self.k + self.x, gy * self.k + self.y)
	}
}

#[derive(Clone, Debug)]
struct DragState {
	node: NodeIndex,
	press_x: f64,
	press_y: f64,
	moved: bool,
}

#[derive(Clone, Debug)]
struct PanState {
	last_x: f64,
	last_y: f64,
}

/// Counters shown next to the graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphStats {
	/// Nodes currently shown.
	pub visible_nodes: usize,
	/// Edges kept at load time.
	pub edges: usize,
	/// Edges with both endpoints shown.
	pub visible_edges: usize,
	/// Shown nodes per type tag.
	pub by_type: BTreeMap<String, usize>,
}

/// Force-directed layout of one graph snapshot plus its view state.
///
/// One engine per canvas; nothing is shared between instances.
pub struct LayoutEngine {
	/// Physics tuning.
	pub config: SimulationConfig,
	/// Current pan and zoom.
	pub transform: ViewTransform,
	styles: TypeStyles,
	nodes: Vec<LayoutNode>,
	edges: Vec<(NodeIndex, NodeIndex)>,
	iteration: u32,
	selected: Option<NodeIndex>,
	drag: Option<DragState>,
	pan: Option<PanState>,
	width: f64,
	height: f64,
	rng: SmallRng,
}

impl LayoutEngine {
	/// Empty engine. `seed` drives random placement.
	pub fn new(config: SimulationConfig, styles: TypeStyles, seed: u64) -> Self {
		Self {
			config,
			transform: ViewTransform::default(),
			styles,
			nodes: Vec::new(),
			edges: Vec::new(),
			iteration: 0,
			selected: None,
			drag: None,
			pan: None,
			width: 800.0,
			height: 600.0,
			rng: SmallRng::seed_from_u64(seed),
		}
	}

	/// Replace the snapshot and restart the simulation.
	///
	/// Edges whose endpoints are not in `payload.nodes` are dropped.
	pub fn load(&mut self, payload: &GraphPayload) {
		let mut id_to_idx = HashMap::with_capacity(payload.nodes.len());
		let mut nodes = Vec::with_capacity(payload.nodes.len());

		for node in &payload.nodes {
			let style = self.styles.lookup(&node.node_type);
			let area = self.config.seed_area;
			// The life-graph backend reports unset coordinates as 0.
			let x = match node.x {
				Some(x) if x != 0.0 && x.is_finite() => x,
				_ => self.rng.random_range(area.min_x..=area.max_x),
			};
			let y = match node.y {
				Some(y) if y != 0.0 && y.is_finite() => y,
				_ => self.rng.random_range(area.min_y..=area.max_y),
			};
			let (x, y) = self.config.bounds.clamp(x, y);

			id_to_idx.entry(node.id.clone()).or_insert(nodes.len());
			nodes.push(LayoutNode::new(
				node.clone(),
				x,
				y,
				style.radius,
				style.color.clone(),
			));
		}

		let edges: Vec<_> = payload
			.edges
			.iter()
			.filter_map(|edge| {
				let source = id_to_idx.get(edge.source.as_ref()?)?;
				let target = id_to_idx.get(edge.target.as_ref()?)?;
				Some((*source, *target))
			})
			.collect();

		let dropped = payload.edges.len() - edges.len();
		if dropped > 0 {
			debug!("Dropped {dropped} edges with endpoints outside the snapshot");
		}
		info!("Loaded {} nodes, {} edges", nodes.len(), edges.len());

		self.nodes = nodes;
		self.edges = edges;
		self.selected = None;
		self.drag = None;
		self.iteration = 0;
	}

	/// Nodes in draw order.
	pub fn nodes(&self) -> &[LayoutNode] {
		&self.nodes
	}

	/// Edges that survived loading, as node index pairs.
	pub fn edges(&self) -> &[(NodeIndex, NodeIndex)] {
		&self.edges
	}

	/// Node by index.
	pub fn node(&self, idx: NodeIndex) -> Option<&LayoutNode> {
		self.nodes.get(idx)
	}

	/// True when the snapshot has no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Steps run since the last load or reset.
	pub fn iteration(&self) -> u32 {
		self.iteration
	}

	/// True once the iteration budget is spent or there is nothing to move.
	pub fn is_settled(&self) -> bool {
		self.nodes.is_empty() || self.iteration >= self.config.max_iterations
	}

	/// Advance the simulation by one step. Does nothing once settled.
	pub fn step(&mut self) -> bool {
		if self.is_settled() {
			return false;
		}
		let pinned = self.drag.as_ref().map(|d| d.node);
		physics::relax(&mut self.nodes, &self.edges, pinned, &self.config);
		self.iteration += 1;
		if self.is_settled() {
			info!("Simulation settled after {} steps", self.iteration);
		}
		true
	}

	/// Frame callback for the host scheduler; returns whether physics ran.
	pub fn tick(&mut self) -> bool {
		self.step()
	}

	/// Run steps until the budget is spent.
	pub fn run_to_completion(&mut self) {
		while self.step() {}
	}

	/// Re-seed every node at random and restart the simulation.
	pub fn reset_layout(&mut self) {
		let area = self.config.seed_area;
		for node in &mut self.nodes {
			node.x = self.rng.random_range(area.min_x..=area.max_x);
			node.y = self.rng.random_range(area.min_y..=area.max_y);
			node.vx = 0.0;
			node.vy = 0.0;
		}
		self.iteration = 0;
	}

	/// Topmost visible node under a screen point.
	pub fn pick(&self, sx: f64, sy: f64) -> Option<NodeIndex> {
		let (gx, gy) = self.transform.screen_to_graph(sx, sy);
		self.nodes
			.iter()
			.enumerate()
			.rev()
			.find(|(_, node)| {
				let (dx, dy) = (node.x - gx, node.y - gy);
				node.visible && (dx * dx + dy * dy).sqrt() < node.radius + PICK_SLOP
			})
			.map(|(idx, _)| idx)
	}

	/// Currently selected node.
	pub fn selected(&self) -> Option<NodeIndex> {
		self.selected
	}

	/// Select a node, or clear the selection.
	pub fn select(&mut self, idx: Option<NodeIndex>) {
		self.selected = idx.filter(|&i| i < self.nodes.len());
	}

	/// Node currently held by the pointer.
	pub fn dragged(&self) -> Option<NodeIndex> {
		self.drag.as_ref().map(|d| d.node)
	}

	/// Start holding a node at a screen point.
	pub fn begin_drag(&mut self, idx: NodeIndex, sx: f64, sy: f64) {
		if idx >= self.nodes.len() {
			return;
		}
		self.pan = None;
		self.drag = Some(DragState {
			node: idx,
			press_x: sx,
			press_y: sy,
			moved: false,
		});
	}

	/// Move the held node to a screen point, bypassing physics.
	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		let Some(drag) = self.drag.as_mut() else {
			return;
		};
		if (sx - drag.press_x).hypot(sy - drag.press_y) >= CLICK_SLOP {
			drag.moved = true;
		}
		let (gx, gy) = self.transform.screen_to_graph(sx, sy);
		let (x, y) = self.config.bounds.clamp(gx, gy);
		let node = &mut self.nodes[drag.node];
		node.x = x;
		node.y = y;
	}

	/// Start panning from a screen point.
	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.drag = None;
		self.pan = Some(PanState {
			last_x: sx,
			last_y: sy,
		});
	}

	/// True while a background press is panning the view.
	pub fn is_panning(&self) -> bool {
		self.pan.is_some()
	}

	/// Continue a pan started with [`begin_pan`](Self::begin_pan).
	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		let Some((dx, dy)) = self.pan.as_ref().map(|p| (sx - p.last_x, sy - p.last_y)) else {
			return;
		};
		self.pan_by(dx, dy);
		self.pan = Some(PanState {
			last_x: sx,
			last_y: sy,
		});
	}

	/// Shift the view by a screen-space delta.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.transform.x += dx;
		self.transform.y += dy;
	}

	/// Release the pointer. Returns the node if the press was a click on it.
	pub fn end_interaction(&mut self) -> Option<NodeIndex> {
		self.pan = None;
		self.drag.take().filter(|d| !d.moved).map(|d| d.node)
	}

	/// Scale the view about the graph origin.
	pub fn zoom(&mut self, factor: f64) {
		self.transform.k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
	}

	/// Scale the view keeping the graph point under `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, factor: f64, sx: f64, sy: f64) {
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Reset pan and zoom.
	pub fn center(&mut self) {
		self.transform = ViewTransform::default();
	}

	/// Show or hide nodes by type. Positions and the simulation are untouched.
	pub fn set_visibility(&mut self, mut is_visible: impl FnMut(&str) -> bool) {
		for node in &mut self.nodes {
			node.visible = is_visible(&node.data.node_type);
		}
		if self.selected.is_some_and(|i| !self.nodes[i].visible) {
			self.selected = None;
		}
		debug!(
			"{} of {} nodes visible",
			self.nodes.iter().filter(|n| n.visible).count(),
			self.nodes.len()
		);
	}

	/// Counters for the visible part of the graph.
	pub fn stats(&self) -> GraphStats {
		let mut stats = GraphStats {
			edges: self.edges.len(),
			..GraphStats::default()
		};
		for node in self.nodes.iter().filter(|n| n.visible) {
			stats.visible_nodes += 1;
			*stats
				.by_type
				.entry(node.data.node_type.clone())
				.or_default() += 1;
		}
		stats.visible_edges = self
			.edges
			.iter()
			.filter(|&&(s, t)| self.nodes[s].visible && self.nodes[t].visible)
			.count();
		stats
	}

	/// Viewport size in screen pixels.
	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	/// Record a new viewport size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}
