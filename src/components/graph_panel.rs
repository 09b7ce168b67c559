//! A graph view wired to its backend endpoint, with toolbar and filters.

use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, error};

use crate::api::{GraphSource, fetch_graph};
use crate::components::force_graph::{
	ForceGraphCanvas, GraphHandle, GraphNode, GraphPayload, GraphStats, LayoutEngine,
	SimulationConfig, palette::GraphPreset,
};
use crate::error::GraphError;

/// Node types toggled together by one checkbox.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeFilter {
	/// Checkbox caption, also the filter's key.
	pub label: &'static str,
	/// Type tags shown or hidden by this checkbox.
	pub types: &'static [&'static str],
}

impl TypeFilter {
	/// No checkboxes; every type stays visible.
	pub const NONE: &'static [TypeFilter] = &[];

	/// Filters of the life view.
	pub const LIFE: &'static [TypeFilter] = &[
		TypeFilter {
			label: "Missions",
			types: &["mission"],
		},
		TypeFilter {
			label: "Boxes",
			types: &["mission_box"],
		},
		TypeFilter {
			label: "Artifacts",
			types: &["mission_artifact"],
		},
		TypeFilter {
			label: "Classes",
			types: &["class", "project", "study_pack", "artifact"],
		},
	];
}

/// Types not covered by any filter stay visible.
fn is_type_visible(filters: &[TypeFilter], hidden: &HashSet<&'static str>, node_type: &str) -> bool {
	!filters
		.iter()
		.any(|f| hidden.contains(f.label) && f.types.contains(&node_type))
}

fn stats_line(stats: &GraphStats) -> String {
	let by_type = stats
		.by_type
		.iter()
		.map(|(t, n)| format!("{t}: {n}"))
		.collect::<Vec<_>>()
		.join(", ");
	let line = format!("{} nodes, {} edges", stats.visible_nodes, stats.edges);
	if by_type.is_empty() {
		line
	} else {
		format!("{line} | {by_type}")
	}
}

fn detail_rows(node: &GraphNode) -> Vec<(String, String)> {
	let mut rows = vec![
		("Id".to_owned(), node.id.to_string()),
		("Type".to_owned(), node.node_type.clone()),
	];
	rows.extend(node.extra.iter().map(|(key, value)| {
		let value = value
			.as_str()
			.map(str::to_owned)
			.unwrap_or_else(|| value.to_string());
		(key.clone(), value)
	}));
	if let Some(metadata) = &node.metadata {
		rows.push((
			"Data".to_owned(),
			serde_json::to_string_pretty(metadata).unwrap_or_default(),
		));
	}
	rows
}

#[derive(Clone, Debug, PartialEq)]
enum LoadStatus {
	Loading,
	Ready,
	Empty,
	Failed,
}

impl LoadStatus {
	fn placeholder(&self) -> Option<&'static str> {
		match self {
			LoadStatus::Loading => Some("Loading graph..."),
			LoadStatus::Ready => None,
			LoadStatus::Empty => Some("Nothing to show yet. The graph will appear here."),
			LoadStatus::Failed => Some("Failed to load graph."),
		}
	}

	fn after(result: &Result<GraphPayload, GraphError>) -> Self {
		match result {
			Ok(payload) if payload.is_empty() => LoadStatus::Empty,
			Ok(_) => LoadStatus::Ready,
			Err(_) => LoadStatus::Failed,
		}
	}
}

/// Numbers requests so only the latest one may apply its response.
#[derive(Clone, Debug, Default)]
struct RequestGate(Rc<Cell<u64>>);

impl RequestGate {
	fn begin(&self) -> u64 {
		let ticket = self.0.get() + 1;
		self.0.set(ticket);
		ticket
	}

	fn is_current(&self, ticket: u64) -> bool {
		self.0.get() == ticket
	}
}

fn browser_seed() -> u64 {
	(js_sys::Math::random() * u64::MAX as f64) as u64
}

struct Loader {
	source: GraphSource,
	filters: &'static [TypeFilter],
	handle: GraphHandle,
	gate: RequestGate,
	hidden: RwSignal<HashSet<&'static str>>,
	stats: RwSignal<GraphStats>,
	status: RwSignal<LoadStatus>,
}

impl Loader {
	fn apply_filters(&self) {
		let hidden = self.hidden.get_untracked();
		let filters = self.filters;
		self.handle
			.update(|e| e.set_visibility(|t| is_type_visible(filters, &hidden, t)));
		self.stats.set(self.handle.with(LayoutEngine::stats));
	}

	fn refresh(&self) {
		let ticket = self.gate.begin();
		self.status.set(LoadStatus::Loading);
		let loader = Loader {
			handle: self.handle.clone(),
			gate: self.gate.clone(),
			..*self
		};
		spawn_local(async move {
			let result = fetch_graph(loader.source).await;
			if !loader.gate.is_current(ticket) {
				debug!("Ignoring superseded response from {}", loader.source.url);
				return;
			}
			loader.status.set(LoadStatus::after(&result));
			let payload = result.unwrap_or_else(|err| {
				error!("Failed to load graph from {}: {err}", loader.source.url);
				GraphPayload::default()
			});
			loader.handle.update(|e| e.load(&payload));
			loader.apply_filters();
		});
	}
}

/// Fetches a graph, lays it out and offers filter, reset and center controls.
#[component]
pub fn GraphPanel(
	#[prop(into)] title: String,
	source: GraphSource,
	preset: GraphPreset,
	#[prop(default = TypeFilter::NONE)] filters: &'static [TypeFilter],
) -> impl IntoView {
	let GraphPreset { types, render } = preset;
	let handle = GraphHandle::new(LayoutEngine::new(
		SimulationConfig::default(),
		types,
		browser_seed(),
	));
	let selected = RwSignal::new(None::<GraphNode>);
	let loader = Rc::new(Loader {
		source,
		filters,
		handle: handle.clone(),
		gate: RequestGate::default(),
		hidden: RwSignal::new(HashSet::new()),
		stats: RwSignal::new(GraphStats::default()),
		status: RwSignal::new(LoadStatus::Loading),
	});
	loader.refresh();

	let (stats, status, hidden) = (loader.stats, loader.status, loader.hidden);
	let on_select = Callback::new(move |node: GraphNode| selected.set(Some(node)));

	let loader_refresh = loader.clone();
	let on_refresh = move |_| {
		selected.set(None);
		loader_refresh.refresh();
	};
	let handle_reset = handle.clone();
	let on_reset = move |_| handle_reset.update(LayoutEngine::reset_layout);
	let handle_center = handle.clone();
	let on_center = move |_| handle_center.update(LayoutEngine::center);

	let filter_views = filters
		.iter()
		.map(|filter| {
			let label = filter.label;
			let loader = loader.clone();
			view! {
				<label class="graph-filter">
					<input
						type="checkbox"
						prop:checked=move || !hidden.with(|h| h.contains(label))
						on:change=move |ev| {
							let checked = event_target_checked(&ev);
							hidden
								.update(|h| {
									if checked {
										h.remove(label);
									} else {
										h.insert(label);
									}
								});
							loader.apply_filters();
						}
					/>
					{label}
				</label>
			}
		})
		.collect_view();

	view! {
		<section class="graph-panel">
			<header class="graph-toolbar">
				<h2>{title}</h2>
				<span class="graph-stats">{move || stats.with(stats_line)}</span>
				<button on:click=on_refresh>"Refresh"</button>
				<button on:click=on_reset>"Reset layout"</button>
				<button on:click=on_center>"Center"</button>
			</header>
			<div class="graph-filters">{filter_views}</div>
			<div class="graph-canvas">
				<ForceGraphCanvas handle=handle render_style=render on_select=on_select />
				<Show when=move || status.with(|s| s.placeholder().is_some())>
					<p class="graph-placeholder">
						{move || status.with(|s| s.placeholder().unwrap_or_default())}
					</p>
				</Show>
			</div>
			{move || selected.get().map(|node| view! { <NodeDetails node=node /> })}
		</section>
	}
}

#[component]
fn NodeDetails(node: GraphNode) -> impl IntoView {
	let title = if node.label.is_empty() {
		node.id.to_string()
	} else {
		node.label.clone()
	};
	let rows = detail_rows(&node)
		.into_iter()
		.map(|(key, value)| {
			view! {
				<dt>{key}</dt>
				<dd>{value}</dd>
			}
		})
		.collect_view();

	view! {
		<aside class="graph-details">
			<h3>{title}</h3>
			<dl>{rows}</dl>
		</aside>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_filters_hide_grouped_types() {
		let hidden = HashSet::from(["Classes"]);
		let filters = TypeFilter::LIFE;

		assert!(!is_type_visible(filters, &hidden, "class"));
		assert!(!is_type_visible(filters, &hidden, "study_pack"));
		assert!(is_type_visible(filters, &hidden, "mission"));
		assert!(is_type_visible(filters, &hidden, "assignment"));
		assert!(is_type_visible(&[], &hidden, "class"));
	}

	#[test]
	fn test_stats_line() {
		let mut stats = GraphStats {
			visible_nodes: 3,
			edges: 2,
			..GraphStats::default()
		};
		assert_eq!(stats_line(&stats), "3 nodes, 2 edges");

		stats.by_type.insert("mission".into(), 1);
		stats.by_type.insert("class".into(), 2);
		assert_eq!(stats_line(&stats), "3 nodes, 2 edges | class: 2, mission: 1");
	}

	#[test]
	fn test_detail_rows_show_backend_fields() {
		let mut node = GraphNode::new(12, "mission").with_label("Thesis");
		node.extra.insert("entity_id".into(), json!(42));
		node.extra.insert("description".into(), json!("Final year"));
		node.metadata = Some(json!({"due": "2026-05-01"}));
		let rows = detail_rows(&node);

		assert_eq!(rows[0], ("Id".into(), "12".into()));
		assert_eq!(rows[1], ("Type".into(), "mission".into()));
		assert!(rows.contains(&("entity_id".into(), "42".into())));
		assert!(rows.contains(&("description".into(), "Final year".into())));
		assert_eq!(rows.last().map(|r| r.0.as_str()), Some("Data"));
	}

	#[test]
	fn test_placeholder_only_when_not_ready() {
		assert!(LoadStatus::Ready.placeholder().is_none());
		assert!(LoadStatus::Empty.placeholder().is_some());
		assert!(LoadStatus::Failed.placeholder().is_some());
	}

	#[test]
	fn test_status_follows_own_result() {
		let loaded = GraphPayload {
			nodes: vec![GraphNode::new("a", "class")],
			edges: vec![],
		};
		assert_eq!(LoadStatus::after(&Ok(loaded)), LoadStatus::Ready);
		assert_eq!(
			LoadStatus::after(&Ok(GraphPayload::default())),
			LoadStatus::Empty
		);
		assert_eq!(
			LoadStatus::after(&Err(GraphError::Status(500))),
			LoadStatus::Failed
		);
	}

	#[test]
	fn test_only_latest_request_applies() {
		let gate = RequestGate::default();
		let first = gate.begin();
		assert!(gate.is_current(first));

		let second = gate.clone().begin();
		assert!(!gate.is_current(first), "an older refresh must not land");
		assert!(gate.is_current(second));
	}
}
