use leptos::prelude::*;

use crate::api::GraphSource;
use crate::components::force_graph::palette::GraphPreset;
use crate::components::graph_panel::GraphPanel;

/// Commits, branches and tags of the developer-mode repository
#[component]
pub fn History() -> impl IntoView {
	view! {
		<GraphPanel
			title="Repository History"
			source=GraphSource::HISTORY
			preset=GraphPreset::history()
		/>
	}
}
