//! Backend client for graph snapshots.

use log::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

use crate::components::force_graph::GraphPayload;
use crate::error::GraphError;

/// Where a view gets its graph from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphSource {
	/// `GET` endpoint returning `{ "nodes": [...], "edges": [...] }`.
	pub url: &'static str,
	/// Feature switch `POST`ed before every fetch, if the backend gates the view.
	pub enable_url: Option<&'static str>,
}

impl GraphSource {
	/// Life graph of missions, classes and projects.
	pub const LIFE: Self = Self {
		url: "/api/life-graph",
		enable_url: Some("/api/life-graph/enable"),
	};

	/// Knowledge graph of documents and concepts.
	pub const KNOWLEDGE: Self = Self {
		url: "/api/graph",
		enable_url: None,
	};

	/// Commit history of the developer-mode repository.
	pub const HISTORY: Self = Self {
		url: "/api/dev/graph",
		enable_url: None,
	};
}

fn js_error(err: JsValue) -> GraphError {
	GraphError::Request(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

async fn send(url: &str, method: &str) -> Result<Response, GraphError> {
	let window = web_sys::window().ok_or_else(|| GraphError::Request("no window".into()))?;
	let init = RequestInit::new();
	init.set_method(method);
	let request = Request::new_with_str_and_init(url, &init).map_err(js_error)?;
	let response = JsFuture::from(window.fetch_with_request(&request))
		.await
		.map_err(js_error)?;
	response.dyn_into::<Response>().map_err(js_error)
}

/// Fetch one graph snapshot. A body that is not a graph yields an empty one.
pub async fn fetch_graph(source: GraphSource) -> Result<GraphPayload, GraphError> {
	if let Some(enable_url) = source.enable_url {
		match send(enable_url, "POST").await {
			Ok(resp) if resp.ok() => debug!("Enabled graph view at {enable_url}"),
			Ok(resp) => warn!("Enabling graph view returned HTTP {}", resp.status()),
			Err(err) => warn!("Enabling graph view failed: {err}"),
		}
	}

	let response = send(source.url, "GET").await?;
	if !response.ok() {
		return Err(GraphError::Status(response.status()));
	}
	let body = JsFuture::from(response.text().map_err(js_error)?)
		.await
		.map_err(js_error)?
		.as_string()
		.ok_or(GraphError::Body)?;

	Ok(GraphPayload::from_json_or_empty(&body))
}
