use leptos::prelude::*;

use crate::api::GraphSource;
use crate::components::force_graph::palette::GraphPreset;
use crate::components::graph_panel::{GraphPanel, TypeFilter};

/// Life graph of missions, classes and projects
#[component]
pub fn Home() -> impl IntoView {
	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<GraphPanel
				title="Life Graph"
				source=GraphSource::LIFE
				preset=GraphPreset::life()
				filters=TypeFilter::LIFE
			/>
			<p class="subtitle">"Drag nodes to reposition. Scroll to zoom. Drag background to pan."</p>
		</ErrorBoundary>
	}
}
