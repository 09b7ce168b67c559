use leptos::prelude::*;

use crate::api::GraphSource;
use crate::components::force_graph::palette::GraphPreset;
use crate::components::graph_panel::GraphPanel;

/// Documents and the concepts extracted from them
#[component]
pub fn Knowledge() -> impl IntoView {
	view! {
		<GraphPanel
			title="Knowledge Graph"
			source=GraphSource::KNOWLEDGE
			preset=GraphPreset::knowledge()
		/>
	}
}
