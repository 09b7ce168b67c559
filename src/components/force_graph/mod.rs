mod component;
pub mod palette;
mod physics;
mod render;
mod state;
mod types;

pub use component::{ForceGraphCanvas, GraphHandle};
pub use physics::{Bounds, SimulationConfig};
pub use render::{CanvasSurface, Surface, render};
pub use state::{GraphStats, LayoutEngine, LayoutNode, NodeIndex, ViewTransform};
pub use types::{GraphEdge, GraphNode, GraphPayload, NodeId};
