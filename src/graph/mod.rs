//! Graph rendering model
//!
//! Triples collapse into a deduplicated node/edge view; the renderer pairs it with
//! a force layout and handles click and drag interaction.

pub mod layout;
pub mod renderer;
pub mod view;

pub use layout::{ForceLayout, LayoutSettings, Point};
pub use renderer::{GraphPayload, RenderedNode, Renderer, SelectCallback, SelectedNode};
pub use view::{GraphEdge, GraphNode, GraphView};
