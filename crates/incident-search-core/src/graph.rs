//! Workflow diagram model.
//!
//! A fixed seven-node graph: the user input feeds query expansion, which
//! fans out to the four sources, which all feed the results node. Nodes
//! carry a mutable status the pipeline updates while searching.
//!
//! ```text
//!                 ┌─▶ confluence ─┐
//!                 ├─▶ teams ──────┤
//! input ─▶ llm ───┤               ├─▶ results
//!                 ├─▶ outlook ────┤
//!                 └─▶ local ──────┘
//! ```

use serde::Serialize;

use crate::models::Source;

/// Node role, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    Input,
    Processing,
    Source(Source),
    Results,
}

/// Per-node activity state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Idle,
    Processing,
    Completed,
}

impl NodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::Idle => "idle",
            NodeStatus::Processing => "processing",
            NodeStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: &'static str,
    pub name: &'static str,
    pub category: NodeCategory,
    /// Horizontal position as a fraction of the canvas width.
    pub x: f64,
    /// Vertical position as a fraction of the canvas height.
    pub y: f64,
    pub status: NodeStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: &'static str,
    pub target: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

pub const INPUT_NODE: &str = "input";
pub const EXPANSION_NODE: &str = "llm";
pub const RESULTS_NODE: &str = "results";

fn node(id: &'static str, name: &'static str, category: NodeCategory, x: f64, y: f64) -> GraphNode {
    GraphNode {
        id,
        name,
        category,
        x,
        y,
        status: NodeStatus::Idle,
    }
}

/// Diagram display name for a source node.
pub fn source_node_name(source: Source) -> &'static str {
    match source {
        Source::Local => "Local Disk",
        other => other.label(),
    }
}

impl WorkflowGraph {
    /// The fixed search workflow.
    pub fn search_workflow() -> Self {
        let mut nodes = vec![
            node(INPUT_NODE, "User Input", NodeCategory::Input, 0.1, 0.5),
            node(EXPANSION_NODE, "AI Expansion", NodeCategory::Processing, 0.3, 0.5),
        ];
        let mut edges = vec![GraphEdge {
            source: INPUT_NODE,
            target: EXPANSION_NODE,
        }];

        for (i, source) in Source::ALL.into_iter().enumerate() {
            let y = 0.2 * (i as f64 + 1.0);
            nodes.push(node(
                source.id(),
                source_node_name(source),
                NodeCategory::Source(source),
                0.6,
                y,
            ));
            edges.push(GraphEdge {
                source: EXPANSION_NODE,
                target: source.id(),
            });
        }

        nodes.push(node(RESULTS_NODE, "Results", NodeCategory::Results, 0.9, 0.5));
        edges.extend(Source::ALL.into_iter().map(|source| GraphEdge {
            source: source.id(),
            target: RESULTS_NODE,
        }));

        Self { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Set a node's status. Returns `false` if no node has this id.
    pub fn set_status(&mut self, id: &str, status: NodeStatus) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.status = status;
                true
            }
            None => false,
        }
    }

    /// Hover text for a node, falling back to its display name.
    pub fn tooltip(&self, id: &str) -> Option<&'static str> {
        tooltip_for(id).or_else(|| self.node(id).map(|n| n.name))
    }
}

fn tooltip_for(id: &str) -> Option<&'static str> {
    let text = match id {
        "input" => "User provides error details and context",
        "llm" => "AI expands query with relevant terms and synonyms",
        "confluence" => "Search corporate documentation and wikis",
        "teams" => "Search team chat messages and discussions",
        "outlook" => "Search email communications and threads",
        "local" => "Search local documents and files",
        "results" => "Aggregate and rank all search results",
        _ => return None,
    };
    Some(text)
}

/// Tooltip for a source node.
pub fn source_tooltip(source: Source) -> &'static str {
    tooltip_for(source.id()).unwrap_or_else(|| source_node_name(source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_shape() {
        let g = WorkflowGraph::search_workflow();
        assert_eq!(g.nodes.len(), 7);
        assert_eq!(g.edges.len(), 9);
        for edge in &g.edges {
            assert!(g.node(edge.source).is_some());
            assert!(g.node(edge.target).is_some());
        }
    }

    #[test]
    fn every_source_between_expansion_and_results() {
        let g = WorkflowGraph::search_workflow();
        for source in Source::ALL {
            assert!(g.edges.contains(&GraphEdge {
                source: EXPANSION_NODE,
                target: source.id()
            }));
            assert!(g.edges.contains(&GraphEdge {
                source: source.id(),
                target: RESULTS_NODE
            }));
        }
        assert_eq!(g.node("local").unwrap().name, "Local Disk");
    }

    #[test]
    fn status_updates() {
        let mut g = WorkflowGraph::search_workflow();
        assert!(g.set_status("teams", NodeStatus::Processing));
        assert_eq!(g.node("teams").unwrap().status, NodeStatus::Processing);
        assert!(!g.set_status("jira", NodeStatus::Completed));
    }

    #[test]
    fn tooltips() {
        let g = WorkflowGraph::search_workflow();
        assert_eq!(g.tooltip("llm"), Some("AI expands query with relevant terms and synonyms"));
        assert_eq!(g.tooltip("nope"), None);
        for n in &g.nodes {
            assert!(g.tooltip(n.id).is_some());
        }
        assert_eq!(source_tooltip(Source::Outlook), "Search email communications and threads");
    }
}
