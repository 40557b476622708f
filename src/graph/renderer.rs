//! Renderer: graph view + layout + pointer interaction

use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::debug;

use super::layout::{ForceLayout, LayoutSettings, Point};
use super::view::{GraphEdge, GraphView};
use crate::rdf::{EntityKind, EntityUri, Triple};

/// Alpha target while any node is being dragged
const DRAG_ALPHA_TARGET: f64 = 0.3;

/// Identity and label of a clicked node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedNode {
    #[serde(rename = "id")]
    pub uri: EntityUri,
    pub label: String,
    pub group: EntityKind,
}

/// Called on every successful click
pub type SelectCallback = Box<dyn Fn(&SelectedNode) + Send + Sync>;

/// Node as sent to the page: view data plus display hints and position
#[derive(Debug, Clone, Serialize)]
pub struct RenderedNode<'a> {
    #[serde(flatten)]
    pub node: &'a super::view::GraphNode,
    pub radius: u32,
    pub color: &'static str,
    pub x: f64,
    pub y: f64,
}

/// Full frame for the page
#[derive(Debug, Clone, Serialize)]
pub struct GraphPayload<'a> {
    pub nodes: Vec<RenderedNode<'a>>,
    pub edges: &'a [GraphEdge],
}

/// Owns the current view and its layout; every `render` replaces both
pub struct Renderer {
    view: GraphView,
    layout: ForceLayout,
    settings: LayoutSettings,
    dragging: FxHashSet<usize>,
    on_select: Option<SelectCallback>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::with_settings(LayoutSettings::default())
    }

    pub fn with_settings(settings: LayoutSettings) -> Self {
        Self {
            view: GraphView::new(),
            layout: ForceLayout::new(0, &[], settings.clone()),
            settings,
            dragging: FxHashSet::default(),
            on_select: None,
        }
    }

    /// Register the selection callback
    pub fn on_select(&mut self, callback: SelectCallback) {
        self.on_select = Some(callback);
    }

    /// Replace everything with a view of `triples`
    pub fn render(&mut self, triples: &[Triple]) {
        self.view = GraphView::from_triples(triples);
        self.layout = ForceLayout::new(
            self.view.node_count(),
            &self.view.edge_indices(),
            self.settings.clone(),
        );
        self.dragging.clear();
        debug!(
            "Rendered {} nodes, {} edges from {} triples",
            self.view.node_count(),
            self.view.edge_count(),
            triples.len()
        );
    }

    pub fn view(&self) -> &GraphView {
        &self.view
    }

    pub fn layout(&self) -> &ForceLayout {
        &self.layout
    }

    /// Run the layout until settled, bounded
    pub fn settle(&mut self, max_ticks: usize) -> usize {
        self.layout.settle(max_ticks)
    }

    pub fn tick(&mut self) {
        self.layout.tick();
    }

    pub fn position(&self, uri: &EntityUri) -> Option<Point> {
        self.view.index_of(uri).and_then(|i| self.layout.position(i))
    }

    /// Select a node; `None` when the URI is not in the view
    pub fn click(&self, uri: &EntityUri) -> Option<SelectedNode> {
        let node = self.view.node(uri)?;
        let selected = SelectedNode {
            uri: node.uri.clone(),
            label: node.label.clone(),
            group: node.group,
        };
        if let Some(callback) = &self.on_select {
            callback(&selected);
        }
        Some(selected)
    }

    /// Pin the node where it is and re-heat the layout
    pub fn drag_start(&mut self, uri: &EntityUri) -> bool {
        let Some(index) = self.view.index_of(uri) else {
            return false;
        };
        if !self.dragging.insert(index) {
            return true;
        }
        if self.dragging.len() == 1 {
            self.layout.set_alpha_target(DRAG_ALPHA_TARGET);
        }
        if let Some(at) = self.layout.position(index) {
            self.layout.pin(index, at);
        }
        true
    }

    /// Move the pin of a dragged node
    pub fn drag_to(&mut self, uri: &EntityUri, at: Point) -> bool {
        match self.view.index_of(uri) {
            Some(index) if self.layout.is_pinned(index) => {
                self.layout.pin(index, at);
                true
            }
            _ => false,
        }
    }

    /// Release the node and let the layout cool once no drag remains
    pub fn drag_end(&mut self, uri: &EntityUri) -> bool {
        let Some(index) = self.view.index_of(uri) else {
            return false;
        };
        if !self.dragging.remove(&index) {
            return false;
        }
        if self.dragging.is_empty() {
            self.layout.set_alpha_target(0.0);
        }
        self.layout.unpin(index);
        true
    }

    /// Snapshot for the page
    pub fn payload(&self) -> GraphPayload<'_> {
        let nodes = self.view
            .nodes()
            .enumerate()
            .map(|(i, node)| {
                let at = self.layout.position(i).unwrap_or_default();
                RenderedNode {
                    node,
                    radius: node.radius(),
                    color: node.color(),
                    x: at.x,
                    y: at.y,
                }
            })
            .collect();
        GraphPayload {
            nodes,
            edges: self.view.edges(),
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ArticleRecord;
    use crate::rdf::build_triples;
    use std::sync::{Arc, Mutex};

    fn rendered() -> Renderer {
        let mut renderer = Renderer::new();
        renderer.render(&build_triples(&[
            ArticleRecord::new("A", "X", "a"),
            ArticleRecord::new("B", "X", "b"),
        ]));
        renderer
    }

    #[test]
    fn test_click_emits_selection() {
        let clicks = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&clicks);

        let mut renderer = rendered();
        renderer.on_select(Box::new(move |node| sink.lock().unwrap().push(node.clone())));

        let selected = renderer.click(&EntityUri::article("a")).unwrap();
        assert_eq!(selected.label, "A");
        assert_eq!(selected.group, EntityKind::Article);
        assert!(renderer.click(&EntityUri::article("zzz")).is_none());

        let clicks = clicks.lock().unwrap();
        assert_eq!(clicks.len(), 1);
        assert_eq!(clicks[0].uri.to_string(), "article:a");
    }

    #[test]
    fn test_drag_pins_and_releases() {
        let mut renderer = rendered();
        renderer.settle(1000);
        let author = EntityUri::author("X");

        assert!(renderer.drag_start(&author));
        assert_eq!(renderer.layout().alpha_target(), 0.3);

        let to = Point::new(120.0, 80.0);
        assert!(renderer.drag_to(&author, to));
        for _ in 0..20 {
            renderer.tick();
        }
        assert_eq!(renderer.position(&author), Some(to));

        assert!(renderer.drag_end(&author));
        assert_eq!(renderer.layout().alpha_target(), 0.0);
        renderer.tick();
        assert_ne!(renderer.position(&author), Some(to));
    }

    #[test]
    fn test_overlapping_drags_keep_heat() {
        let mut renderer = rendered();
        let a = EntityUri::article("a");
        let b = EntityUri::article("b");

        renderer.drag_start(&a);
        renderer.drag_start(&b);
        renderer.drag_end(&a);
        assert_eq!(renderer.layout().alpha_target(), 0.3);
        renderer.drag_end(&b);
        assert_eq!(renderer.layout().alpha_target(), 0.0);
    }

    #[test]
    fn test_repeated_drag_start_cools_after_release() {
        let mut renderer = rendered();
        let author = EntityUri::author("X");

        assert!(renderer.drag_start(&author));
        assert!(renderer.drag_start(&author));
        assert!(renderer.drag_end(&author));
        assert!(!renderer.drag_end(&author));
        assert_eq!(renderer.layout().alpha_target(), 0.0);
        assert!(!renderer.layout().is_pinned(1));
    }

    #[test]
    fn test_drag_unknown_or_unpinned() {
        let mut renderer = rendered();
        assert!(!renderer.drag_start(&EntityUri::author("nobody")));
        assert!(!renderer.drag_to(&EntityUri::author("X"), Point::new(1.0, 1.0)));
        assert!(!renderer.drag_end(&EntityUri::author("X")));
    }

    #[test]
    fn test_render_replaces() {
        let mut renderer = rendered();
        assert_eq!(renderer.view().node_count(), 3);
        renderer.render(&[]);
        assert_eq!(renderer.view().node_count(), 0);
        assert!(renderer.payload().nodes.is_empty());
    }

    #[test]
    fn test_payload_json() {
        let renderer = rendered();
        let json = serde_json::to_value(renderer.payload()).unwrap();
        assert_eq!(json["nodes"].as_array().unwrap().len(), 3);
        assert_eq!(json["nodes"][1]["id"], "author:X");
        assert_eq!(json["nodes"][1]["radius"], 8);
        assert!(json["nodes"][0]["x"].is_number());
        assert_eq!(json["edges"].as_array().unwrap().len(), 2);
    }
}
