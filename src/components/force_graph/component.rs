use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use leptos::ev;
use leptos::prelude::*;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::palette::RenderStyle;
use super::render::{self, CanvasSurface};
use super::state::LayoutEngine;
use super::types::GraphNode;

/// Shared handle to the engine behind one canvas.
///
/// The canvas and its surrounding controls all run on the browser's single
/// thread, so a `RefCell` is enough.
#[derive(Clone)]
pub struct GraphHandle(Rc<RefCell<LayoutEngine>>);

impl GraphHandle {
	/// Wrap a fresh engine.
	pub fn new(engine: LayoutEngine) -> Self {
		Self(Rc::new(RefCell::new(engine)))
	}

	/// Mutate the engine.
	pub fn update<R>(&self, f: impl FnOnce(&mut LayoutEngine) -> R) -> R {
		f(&mut self.0.borrow_mut())
	}

	/// Read the engine.
	pub fn with<R>(&self, f: impl FnOnce(&LayoutEngine) -> R) -> R {
		f(&self.0.borrow())
	}
}

/// Stop switch shared by a frame loop and its cleanup hook.
#[derive(Clone, Default)]
struct FrameGuard {
	stopped: Arc<AtomicBool>,
	frame: Arc<AtomicI32>,
}

impl FrameGuard {
	fn is_stopped(&self) -> bool {
		self.stopped.load(Ordering::Relaxed)
	}

	/// Remember the latest frame request, unless already stopped.
	fn record(&self, id: i32) {
		if !self.is_stopped() {
			self.frame.store(id, Ordering::Relaxed);
		}
	}

	/// Stop the loop and return the frame request left to cancel.
	fn stop(&self) -> i32 {
		self.stopped.store(true, Ordering::Relaxed);
		self.frame.load(Ordering::Relaxed)
	}
}

fn pointer_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> (f64, f64) {
	let Some(canvas) = canvas_ref.get_untracked() else {
		return (ev.offset_x() as f64, ev.offset_y() as f64);
	};
	let canvas: HtmlCanvasElement = canvas.into();
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

fn window_size(window: &Window) -> (f64, f64) {
	let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64());
	(
		dim(window.inner_width()).unwrap_or(800.0),
		dim(window.inner_height()).unwrap_or(600.0),
	)
}

/// Canvas that animates and paints a [`LayoutEngine`].
///
/// The component is the host frame scheduler: each animation frame it ticks
/// the engine once (physics stops by itself after its step budget) and
/// repaints. Pointer input is applied to the engine as it arrives. The frame
/// loop and the resize listener stop when the component unmounts.
#[component]
pub fn ForceGraphCanvas(
	handle: GraphHandle,
	#[prop(default = RenderStyle::default())] render_style: RenderStyle,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional)] on_select: Option<Callback<GraphNode>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let handle_init = handle.clone();

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("No window to draw the graph in");
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		handle_init.update(|e| e.resize(w, h));

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => {
					error!("Canvas context is not a 2d context");
					return;
				}
			},
			_ => {
				error!("Canvas has no 2d context");
				return;
			}
		};

		let resize_listener = fullscreen.then(|| {
			let (handle_resize, canvas_resize) = (handle_init.clone(), canvas.clone());
			window_event_listener(ev::resize, move |_| {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				handle_resize.update(|e| e.resize(nw, nh));
			})
		});

		// The loop only holds itself weakly; the effect owns the closure.
		let guard = FrameGuard::default();
		let guard_anim = guard.clone();
		let (handle_anim, animate_inner, style) = (
			handle_init.clone(),
			Rc::downgrade(&animate),
			render_style.clone(),
		);
		*animate.borrow_mut() = Some(Closure::new(move || {
			if guard_anim.is_stopped() {
				return;
			}
			handle_anim.update(|engine| {
				engine.tick();
				render::render(engine, &mut CanvasSurface::new(&ctx), &style);
			});
			let (Some(next), Some(win)) = (animate_inner.upgrade(), web_sys::window()) else {
				return;
			};
			if let Some(cb) = next.borrow().as_ref() {
				if let Ok(id) = win.request_animation_frame(cb.as_ref().unchecked_ref()) {
					guard_anim.record(id);
				}
			}
		}));
		if let Some(ref cb) = *animate.borrow() {
			if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
				guard.record(id);
			}
		}

		on_cleanup(move || {
			let pending = guard.stop();
			if let Some(win) = web_sys::window() {
				let _ = win.cancel_animation_frame(pending);
			}
			if let Some(listener) = resize_listener {
				listener.remove();
			}
		});
	});

	let handle_md = handle.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let (x, y) = pointer_position(canvas_ref, &ev);
		handle_md.update(|s| {
			if let Some(idx) = s.pick(x, y) {
				s.select(Some(idx));
				s.begin_drag(idx, x, y);
			} else {
				s.select(None);
				s.begin_pan(x, y);
			}
		});
	};

	let handle_mm = handle.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let (x, y) = pointer_position(canvas_ref, &ev);
		handle_mm.update(|s| {
			if s.dragged().is_some() {
				s.drag_to(x, y);
			} else if s.is_panning() {
				s.pan_to(x, y);
			}
		});
	};

	let handle_mu = handle.clone();
	let on_mouseup = move |_: MouseEvent| {
		let clicked = handle_mu.update(|s| {
			s.end_interaction()
				.and_then(|idx| s.node(idx))
				.map(|node| node.data.clone())
		});
		if let (Some(node), Some(cb)) = (clicked, on_select) {
			cb.run(node);
		}
	};

	let handle_ml = handle.clone();
	let on_mouseleave = move |_: MouseEvent| {
		handle_ml.update(|s| {
			s.end_interaction();
		});
	};

	let handle_wh = handle;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let (x, y) = pointer_position(canvas_ref, &ev);
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		handle_wh.update(|s| s.zoom_at(factor, x, y));
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_frame_guard_stops_loop_and_keeps_pending_frame() {
		let guard = FrameGuard::default();
		let in_loop = guard.clone();
		assert!(!in_loop.is_stopped());

		in_loop.record(4);
		in_loop.record(5);
		assert_eq!(guard.stop(), 5);
		assert!(in_loop.is_stopped());

		in_loop.record(9);
		assert_eq!(guard.stop(), 5, "no frames recorded after stopping");
	}
}
