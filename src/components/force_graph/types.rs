use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::GraphError;

/// Node identifier as sent by the backend: either numeric or textual.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
	/// Integer id (database primary keys).
	Number(i64),
	/// Opaque string id (commit hashes, slugs).
	Text(String),
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NodeId::Number(n) => write!(f, "{n}"),
			NodeId::Text(s) => f.write_str(s),
		}
	}
}

impl From<&str> for NodeId {
	fn from(value: &str) -> Self {
		NodeId::Text(value.to_owned())
	}
}

impl From<i32> for NodeId {
	fn from(value: i32) -> Self {
		NodeId::Number(value.into())
	}
}

impl From<i64> for NodeId {
	fn from(value: i64) -> Self {
		NodeId::Number(value)
	}
}

/// A node of a graph snapshot. Unknown fields are kept in `extra`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	/// Stable id, unique within one snapshot.
	pub id: NodeId,
	/// Category tag, only used for styling and filtering.
	#[serde(default, rename = "type", alias = "node_type")]
	pub node_type: String,
	/// Display label.
	#[serde(default)]
	pub label: String,
	/// Seed x coordinate.
	#[serde(default)]
	pub x: Option<f64>,
	/// Seed y coordinate.
	#[serde(default)]
	pub y: Option<f64>,
	/// Free-form payload forwarded to the host on selection.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<Value>,
	/// Everything else the backend sent.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl GraphNode {
	/// Bare node with an id and a type.
	pub fn new(id: impl Into<NodeId>, node_type: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			node_type: node_type.into(),
			label: String::new(),
			x: None,
			y: None,
			metadata: None,
			extra: Map::new(),
		}
	}

	/// Builder-style label setter.
	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = label.into();
		self
	}

	/// Builder-style seed position setter.
	pub fn at(mut self, x: f64, y: f64) -> Self {
		self.x = Some(x);
		self.y = Some(y);
		self
	}
}

/// A relation between two nodes, referenced by id.
///
/// An endpoint may be missing; such edges never resolve and are dropped on load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
	/// Source node id.
	#[serde(default, alias = "source_node_id", alias = "from")]
	pub source: Option<NodeId>,
	/// Target node id.
	#[serde(default, alias = "target_node_id", alias = "to")]
	pub target: Option<NodeId>,
	/// Everything else the backend sent.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl GraphEdge {
	/// Edge between two ids.
	pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
		Self {
			source: Some(source.into()),
			target: Some(target.into()),
			extra: Map::new(),
		}
	}
}

/// Graph endpoint response body.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphPayload {
	/// Nodes of the snapshot.
	pub nodes: Vec<GraphNode>,
	/// Edges of the snapshot; may reference nodes outside `nodes`.
	#[serde(deserialize_with = "lenient_edges")]
	pub edges: Vec<GraphEdge>,
}

/// Skip edge entries that are not edge objects instead of failing the snapshot.
fn lenient_edges<'de, D>(deserializer: D) -> Result<Vec<GraphEdge>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Vec::<Value>::deserialize(deserializer)?;
	let total = raw.len();
	let edges: Vec<GraphEdge> = raw
		.into_iter()
		.filter_map(|value| serde_json::from_value(value).ok())
		.collect();
	if edges.len() < total {
		debug!("Skipped {} malformed edges", total - edges.len());
	}
	Ok(edges)
}

impl GraphPayload {
	/// Parse a response body. Both `nodes` and `edges` must be present.
	pub fn from_json(body: &str) -> Result<Self, GraphError> {
		Ok(serde_json::from_str(body)?)
	}

	/// Parse a response body, falling back to an empty graph.
	pub fn from_json_or_empty(body: &str) -> Self {
		Self::from_json(body).unwrap_or_else(|err| {
			warn!("Graph payload unusable, showing empty graph: {err}");
			Self::default()
		})
	}

	/// True when there is nothing to lay out.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_knowledge_payload() {
		let body = r#"{
			"nodes": [
				{"id": "doc-1", "type": "document", "label": "Notes", "metadata": {"pages": 3}},
				{"id": "c-1", "type": "concept", "label": "Entropy", "x": 120.0, "y": 80.5}
			],
			"edges": [{"source": "doc-1", "target": "c-1", "weight": 0.4}]
		}"#;
		let payload = GraphPayload::from_json(body).unwrap();

		assert_eq!(payload.nodes.len(), 2);
		assert_eq!(payload.nodes[0].id, NodeId::from("doc-1"));
		assert_eq!(payload.nodes[0].node_type, "document");
		assert_eq!(payload.nodes[0].x, None);
		assert_eq!(payload.nodes[1].x, Some(120.0));
		assert!(payload.nodes[0].metadata.is_some());
		assert_eq!(payload.edges[0].extra.get("weight"), Some(&Value::from(0.4)));
	}

	#[test]
	fn test_parse_life_graph_aliases() {
		let body = r#"{
			"nodes": [
				{"id": 1, "node_type": "mission", "entity_id": 42, "label": "Thesis", "x": 0, "y": 0, "z": 0},
				{"id": 2, "node_type": "mission_box", "entity_id": 7, "label": "Research"}
			],
			"edges": [{"id": 9, "source_node_id": 1, "target_node_id": 2, "edge_type": "contains"}],
			"node_count": 2,
			"edge_count": 1
		}"#;
		let payload = GraphPayload::from_json(body).unwrap();

		assert_eq!(payload.nodes[0].id, NodeId::Number(1));
		assert_eq!(payload.nodes[0].node_type, "mission");
		assert_eq!(payload.nodes[0].extra.get("entity_id"), Some(&Value::from(42)));
		assert_eq!(payload.edges[0].source, Some(NodeId::Number(1)));
		assert_eq!(payload.edges[0].target, Some(NodeId::Number(2)));
	}

	#[test]
	fn test_parse_from_to_edges() {
		let body = r#"{
			"nodes": [
				{"id": "task:3", "type": "task", "label": "CS101 essay", "due": null},
				{"id": "class:1", "type": "class", "label": "Intro to CS"}
			],
			"edges": [{"from": "task:3", "to": "class:1", "kind": "assignment_of"}]
		}"#;
		let payload = GraphPayload::from_json(body).unwrap();

		assert_eq!(payload.nodes.len(), 2);
		assert_eq!(payload.edges[0].source, Some(NodeId::from("task:3")));
		assert_eq!(payload.edges[0].target, Some(NodeId::from("class:1")));
	}

	#[test]
	fn test_broken_edges_keep_nodes() {
		let body = r#"{
			"nodes": [{"id": "a", "type": "class"}, {"id": "b", "type": "class"}],
			"edges": [
				{"source": "a"},
				{"source": "a", "target": 2.5},
				"a->b",
				{"source": "a", "target": "b"}
			]
		}"#;
		let payload = GraphPayload::from_json(body).unwrap();

		assert_eq!(payload.nodes.len(), 2);
		assert_eq!(payload.edges.len(), 2);
		assert_eq!(payload.edges[0].target, None);
		assert_eq!(payload.edges[1], GraphEdge::new("a", "b"));
	}

	#[test]
	fn test_missing_arrays_degrade_to_empty() {
		assert!(GraphPayload::from_json(r#"{"nodes": []}"#).is_err());
		assert!(GraphPayload::from_json_or_empty(r#"{"nodes": []}"#).is_empty());
		assert!(GraphPayload::from_json_or_empty(r#"{"edges": []}"#).is_empty());
		assert!(GraphPayload::from_json_or_empty("null").is_empty());
		assert!(GraphPayload::from_json_or_empty("<html>").is_empty());
	}

	#[test]
	fn test_node_id_display() {
		assert_eq!(NodeId::Number(17).to_string(), "17");
		assert_eq!(NodeId::from("a1b2c3d4e5").to_string(), "a1b2c3d4e5");
	}
}
