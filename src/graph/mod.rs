//! Relationship graph construction.
//!
//! Projects a subject record onto a directed star graph: the subject sits in
//! the center and every discovered fact hangs off it by a single edge.

pub mod svg;

pub use svg::{render_svg, svg_data_uri};

use crate::models::SubjectRecord;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::fmt;

/// Kind of fact a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Subject,
    Profile,
    Username,
    Email,
    Organization,
    Location,
}

impl NodeKind {
    /// Fill color used when rendering.
    pub fn color(&self) -> &'static str {
        match self {
            NodeKind::Subject => "#e53935",
            NodeKind::Profile => "#1e88e5",
            NodeKind::Username => "#43a047",
            NodeKind::Email => "#8e24aa",
            NodeKind::Organization => "#fb8c00",
            NodeKind::Location => "#fdd835",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Subject => write!(f, "subject"),
            NodeKind::Profile => write!(f, "profile"),
            NodeKind::Username => write!(f, "username"),
            NodeKind::Email => write!(f, "email"),
            NodeKind::Organization => write!(f, "organization"),
            NodeKind::Location => write!(f, "location"),
        }
    }
}

/// A node of the relationship graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub kind: NodeKind,
    /// Identity within its kind (profiles use `<platform>_<index>`).
    pub id: String,
    /// Text shown next to the node.
    pub label: String,
}

/// Star graph centered on the investigated subject.
#[derive(Debug, Clone)]
pub struct RelationGraph {
    graph: DiGraph<GraphNode, ()>,
    center: NodeIndex,
    index: HashMap<(NodeKind, String), NodeIndex>,
}

impl RelationGraph {
    /// Build the graph for a record.
    ///
    /// Leaves are added in a fixed order (profiles, usernames, emails,
    /// organizations, locations) so the layout is reproducible.
    pub fn from_record(record: &SubjectRecord) -> Self {
        let mut graph = DiGraph::new();
        let center = graph.add_node(GraphNode {
            kind: NodeKind::Subject,
            id: record.name.clone(),
            label: record.name.clone(),
        });

        let mut built = Self {
            graph,
            center,
            index: HashMap::new(),
        };

        for (platform, profiles) in &record.social_profiles {
            for (i, profile) in profiles.iter().enumerate() {
                let label = if profile.name.is_empty() {
                    platform.clone()
                } else {
                    profile.name.clone()
                };
                built.add_leaf(NodeKind::Profile, format!("{}_{}", platform, i), label);
            }
        }

        for username in &record.possible_usernames {
            built.add_leaf(NodeKind::Username, username.clone(), username.clone());
        }

        for email in record.emails.iter().filter(|e| !e.address.is_empty()) {
            built.add_leaf(NodeKind::Email, email.address.clone(), email.address.clone());
        }

        for organization in &record.organizations {
            built.add_leaf(
                NodeKind::Organization,
                organization.clone(),
                organization.clone(),
            );
        }

        for location in &record.locations {
            built.add_leaf(NodeKind::Location, location.clone(), location.clone());
        }

        built
    }

    /// Attach a leaf to the center unless the same (kind, id) already exists.
    fn add_leaf(&mut self, kind: NodeKind, id: String, label: String) {
        let key = (kind, id);
        if self.index.contains_key(&key) {
            return;
        }

        let node = self.graph.add_node(GraphNode {
            kind,
            id: key.1.clone(),
            label,
        });
        self.graph.add_edge(self.center, node, ());
        self.index.insert(key, node);
    }

    pub fn center(&self) -> &GraphNode {
        &self.graph[self.center]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Leaves in insertion order.
    pub fn leaves(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph
            .node_indices()
            .filter(move |&idx| idx != self.center)
            .map(move |idx| &self.graph[idx])
    }
}

#[cfg(test)]
impl RelationGraph {
    /// Number of leaves of a given kind.
    pub fn count_of(&self, kind: NodeKind) -> usize {
        self.leaves().filter(|node| node.kind == kind).count()
    }

    /// Whether the graph has the node `(kind, id)`.
    pub fn contains(&self, kind: NodeKind, id: &str) -> bool {
        self.index.contains_key(&(kind, id.to_string()))
    }

    /// Whether every edge starts at the center and every leaf has exactly
    /// one incoming edge.
    pub fn is_star(&self) -> bool {
        use petgraph::Direction::{Incoming, Outgoing};

        let edges_from_center = self.graph.edge_indices().all(|edge| {
            self.graph
                .edge_endpoints(edge)
                .is_some_and(|(source, _)| source == self.center)
        });

        let leaves_have_one_parent = self
            .graph
            .node_indices()
            .filter(|&idx| idx != self.center)
            .all(|idx| {
                self.graph.neighbors_directed(idx, Incoming).count() == 1
                    && self.graph.neighbors_directed(idx, Outgoing).count() == 0
            });

        edges_from_center && leaves_have_one_parent
    }
}
