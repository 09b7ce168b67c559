//! Leptos client-side graph views and the force-directed layout engine behind them.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
pub mod api;
mod components;
pub mod error;
mod pages;

pub use components::force_graph::{
	Bounds, CanvasSurface, ForceGraphCanvas, GraphEdge, GraphHandle, GraphNode, GraphPayload,
	GraphStats, LayoutEngine, LayoutNode, NodeId, NodeIndex, SimulationConfig, Surface,
	ViewTransform, palette, render,
};
pub use components::graph_panel::{GraphPanel, TypeFilter};

// Top-Level pages
use crate::pages::history::History;
use crate::pages::home::Home;
use crate::pages::knowledge::Knowledge;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router for the life, knowledge and history graphs, and 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />

		// sets the document title
		<Title text="Marcus Graphs" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<nav class="graph-nav">
				<A href="/">"Life"</A>
				<A href="/knowledge">"Knowledge"</A>
				<A href="/history">"History"</A>
			</nav>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
				<Route path=path!("/knowledge") view=Knowledge />
				<Route path=path!("/history") view=History />
			</Routes>
		</Router>
	}
}
