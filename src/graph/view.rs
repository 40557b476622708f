//! Deduplicated node/edge view over a triple sequence

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::rdf::{EntityKind, EntityUri, Predicate, Triple, TripleObject};

/// A rendered entity. One per distinct URI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    #[serde(rename = "id")]
    pub uri: EntityUri,
    pub group: EntityKind,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl GraphNode {
    fn new(uri: EntityUri) -> Self {
        Self {
            group: uri.kind(),
            label: uri.id().to_string(),
            title: None,
            uri,
        }
    }

    /// Circle radius on the page
    pub fn radius(&self) -> u32 {
        match self.group {
            EntityKind::Author => 8,
            _ => 6,
        }
    }

    /// Fill color on the page
    pub fn color(&self) -> &'static str {
        match self.group {
            EntityKind::Author => "#2196F3",
            EntityKind::Article => "#4CAF50",
            EntityKind::Section => "#9C27B0",
            EntityKind::Institution => "#FF9800",
            EntityKind::Keyword => "#607D8B",
        }
    }
}

/// A relationship between two rendered entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: EntityUri,
    pub target: EntityUri,
    #[serde(rename = "type")]
    pub predicate: Predicate,
}

/// Nodes in first-seen order plus edges in triple order
#[derive(Debug, Clone, Default)]
pub struct GraphView {
    nodes: IndexMap<EntityUri, GraphNode>,
    edges: Vec<GraphEdge>,
}

impl GraphView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a triple sequence. Type assertions add nodes but no edges;
    /// an article's title becomes its label.
    pub fn from_triples(triples: &[Triple]) -> Self {
        let mut view = Self::new();

        for triple in triples {
            let subject = view.ensure_node(&triple.subject);
            if triple.predicate.is_type() {
                if let Some(title) = triple.title.as_deref().filter(|t| !t.is_empty()) {
                    subject.label = title.to_string();
                    subject.title = Some(title.to_string());
                }
            }

            if let TripleObject::Entity(object) = &triple.object {
                view.ensure_node(object);
                view.edges.push(GraphEdge {
                    source: triple.subject.clone(),
                    target: object.clone(),
                    predicate: triple.predicate,
                });
            }
        }

        view
    }

    fn ensure_node(&mut self, uri: &EntityUri) -> &mut GraphNode {
        self.nodes
            .entry(uri.clone())
            .or_insert_with(|| GraphNode::new(uri.clone()))
    }

    pub fn node(&self, uri: &EntityUri) -> Option<&GraphNode> {
        self.nodes.get(uri)
    }

    /// Position of a node in first-seen order
    pub fn index_of(&self, uri: &EntityUri) -> Option<usize> {
        self.nodes.get_index_of(uri)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes of one group
    pub fn nodes_in(&self, group: EntityKind) -> Vec<&GraphNode> {
        self.nodes.values().filter(|n| n.group == group).collect()
    }

    /// Distinct nodes adjacent to `uri`, in either direction
    pub fn neighbors(&self, uri: &EntityUri) -> Vec<&GraphNode> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for edge in &self.edges {
            let other = if &edge.source == uri {
                &edge.target
            } else if &edge.target == uri {
                &edge.source
            } else {
                continue;
            };
            if seen.insert(other) {
                if let Some(node) = self.nodes.get(other) {
                    out.push(node);
                }
            }
        }
        out
    }

    /// Edge endpoints as node indices, for the layout
    pub fn edge_indices(&self) -> Vec<(usize, usize)> {
        self.edges
            .iter()
            .filter_map(|e| Some((self.index_of(&e.source)?, self.index_of(&e.target)?)))
            .collect()
    }
}
