//! Type-tag driven styling.

use std::collections::HashMap;

/// Radius and fill color for one node type.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
	/// Circle radius in graph units.
	pub radius: f64,
	/// CSS color.
	pub color: String,
}

impl NodeStyle {
	/// Style from a radius and a CSS color.
	pub fn new(radius: f64, color: &str) -> Self {
		Self {
			radius,
			color: color.to_owned(),
		}
	}
}

/// Closed lookup table from type tag to style, with an explicit default.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeStyles {
	entries: HashMap<String, NodeStyle>,
	fallback: NodeStyle,
}

impl Default for TypeStyles {
	fn default() -> Self {
		Self::new(NodeStyle::new(8.0, "#95a5a6"))
	}
}

impl TypeStyles {
	/// Empty table answering every lookup with `fallback`.
	pub fn new(fallback: NodeStyle) -> Self {
		Self {
			entries: HashMap::new(),
			fallback,
		}
	}

	/// Register a type.
	pub fn with(mut self, node_type: &str, radius: f64, color: &str) -> Self {
		self.entries
			.insert(node_type.to_owned(), NodeStyle::new(radius, color));
		self
	}

	/// Style for a type, or the default entry for unknown types.
	pub fn lookup(&self, node_type: &str) -> &NodeStyle {
		self.entries.get(node_type).unwrap_or(&self.fallback)
	}

	/// Missions, classes and projects of the life view.
	pub fn life() -> Self {
		Self::default()
			.with("mission", 12.0, "#667eea")
			.with("mission_box", 8.0, "#3498db")
			.with("mission_artifact", 6.0, "#2ecc71")
			.with("class", 14.0, "#e74c3c")
			.with("project", 12.0, "#f39c12")
			.with("study_pack", 10.0, "#9b59b6")
			.with("artifact", 8.0, "#1abc9c")
	}

	/// Documents and the concepts extracted from them.
	pub fn knowledge() -> Self {
		Self::new(NodeStyle::new(4.0, "#00e6ff")).with("document", 6.0, "#7c00ff")
	}

	/// Repository history: commits, branches, tags.
	pub fn history() -> Self {
		Self::new(NodeStyle::new(15.0, "#667eea"))
			.with("commit", 15.0, "#27ae60")
			.with("branch", 15.0, "#f39c12")
			.with("tag", 15.0, "#e74c3c")
	}
}

/// Colors and decorations used by the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderStyle {
	/// Canvas clear color.
	pub background: String,
	/// Edge stroke color.
	pub edge_color: String,
	/// Edge stroke width in screen pixels.
	pub edge_width: f64,
	/// Arrow head fill color.
	pub arrow_color: String,
	/// Draw an arrow head at each edge target.
	pub arrows: bool,
	/// Label fill color.
	pub label_color: String,
	/// Label font size in graph units.
	pub label_px: f64,
	/// Ring drawn around the selected or dragged node.
	pub highlight_color: String,
}

impl Default for RenderStyle {
	fn default() -> Self {
		Self {
			background: "#0a0a0a".into(),
			edge_color: "#333".into(),
			edge_width: 1.0,
			arrow_color: "#667eea".into(),
			arrows: false,
			label_color: "#e0e0e0".into(),
			label_px: 10.0,
			highlight_color: "#fff".into(),
		}
	}
}

/// Styling bundle for one kind of graph view.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphPreset {
	/// Per-type node styles.
	pub types: TypeStyles,
	/// Renderer colors.
	pub render: RenderStyle,
}

impl GraphPreset {
	/// Life graph (missions, classes, projects).
	pub fn life() -> Self {
		Self {
			types: TypeStyles::life(),
			render: RenderStyle::default(),
		}
	}

	/// Knowledge graph (documents, concepts).
	pub fn knowledge() -> Self {
		Self {
			types: TypeStyles::knowledge(),
			render: RenderStyle {
				background: "#0a0e27".into(),
				edge_color: "rgba(0, 230, 255, 0.2)".into(),
				..RenderStyle::default()
			},
		}
	}

	/// Repository history with directed edges.
	pub fn history() -> Self {
		Self {
			types: TypeStyles::history(),
			render: RenderStyle {
				arrows: true,
				label_px: 12.0,
				..RenderStyle::default()
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_known_types_resolve() {
		let styles = TypeStyles::life();
		assert_eq!(styles.lookup("class"), &NodeStyle::new(14.0, "#e74c3c"));
		assert_eq!(styles.lookup("mission_artifact").radius, 6.0);
	}

	#[test]
	fn test_unknown_type_uses_default() {
		let styles = TypeStyles::life();
		assert_eq!(styles.lookup("assignment"), &NodeStyle::new(8.0, "#95a5a6"));
		assert_eq!(styles.lookup(""), &NodeStyle::new(8.0, "#95a5a6"));
	}

	#[test]
	fn test_knowledge_splits_documents_from_concepts() {
		let styles = TypeStyles::knowledge();
		assert_eq!(styles.lookup("document").color, "#7c00ff");
		assert_eq!(styles.lookup("concept").color, "#00e6ff");
	}

	#[test]
	fn test_history_preset_draws_arrows() {
		assert!(GraphPreset::history().render.arrows);
		assert!(!GraphPreset::life().render.arrows);
	}
}
