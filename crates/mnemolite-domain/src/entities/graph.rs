//! Symbol graph entities
//!
//! Nodes and edges form an arena + identifier model (§9 DESIGN NOTES): the
//! graph lives entirely in the store, and traversal walks identifiers with a
//! visited-set guard rather than following object references, so cycles in
//! the underlying `calls`/`imports` relations cannot cause unbounded
//! traversal.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// A symbol derived 1-to-1 from a structural `CodeChunk`.
    Symbol,
    /// A synthetic module node for a barrel or config file.
    Module,
    /// A whole source file.
    File,
    /// A non-code concept node (reserved for future extractors).
    Concept,
}

impl NodeType {
    /// Canonical lower-case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Symbol => "symbol",
            NodeType::Module => "module",
            NodeType::File => "file",
            NodeType::Concept => "concept",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A node in the symbol graph.
///
/// Invariant: `id` is globally unique; every non-synthetic node references
/// an existing `CodeChunk` by sharing its identifier; a `Module` node with
/// `is_barrel=true` must have at least one outbound `re_exports` edge
/// (enforced by the Graph Builder, not by this type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    /// Identifier, equal to the originating chunk identifier where applicable.
    pub id: String,
    /// Node kind.
    pub node_type: NodeType,
    /// Display label.
    pub label: String,
    /// Free-form properties: repository, name, qualified name, `is_barrel`, etc.
    pub properties: Value,
}

impl GraphNode {
    /// Whether this node's `properties.is_barrel` flag is set.
    #[must_use]
    pub fn is_barrel(&self) -> bool {
        self.properties
            .get("is_barrel")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// The closed vocabulary of edge relation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// Caller invokes callee.
    Calls,
    /// Module imports another module or symbol.
    Imports,
    /// Type inherits from / implements another type.
    Inherits,
    /// Barrel module re-exports a symbol.
    ReExports,
    /// File or module contains a symbol (never a self-loop).
    Contains,
}

impl EdgeType {
    /// Canonical lower-case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Calls => "calls",
            EdgeType::Imports => "imports",
            EdgeType::Inherits => "inherits",
            EdgeType::ReExports => "re_exports",
            EdgeType::Contains => "contains",
        }
    }

    /// Parse from the stored lower-case string; unknown strings fall outside
    /// the closed vocabulary and are rejected by the Graph Builder.
    #[must_use]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "calls" => Some(EdgeType::Calls),
            "imports" => Some(EdgeType::Imports),
            "inherits" => Some(EdgeType::Inherits),
            "re_exports" => Some(EdgeType::ReExports),
            "contains" => Some(EdgeType::Contains),
            _ => None,
        }
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A directed relation between two nodes.
///
/// Invariant: duplicate `(source, target, type)` tuples are coalesced on
/// upsert (max-weight rule, §4.7); `Contains` edges never self-loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Identifier.
    pub id: String,
    /// Source node identifier.
    pub source_node_id: String,
    /// Target node identifier.
    pub target_node_id: String,
    /// Relation type.
    pub edge_type: EdgeType,
    /// Free-form properties: weight, location, `is_type` flag.
    pub properties: Value,
}

impl GraphEdge {
    /// The `(source, target, type)` identity used for upsert coalescing.
    #[must_use]
    pub fn identity(&self) -> (&str, &str, EdgeType) {
        (&self.source_node_id, &self.target_node_id, self.edge_type)
    }

    /// Whether this edge would be a disallowed self-loop.
    #[must_use]
    pub fn is_invalid_self_loop(&self) -> bool {
        self.edge_type == EdgeType::Contains && self.source_node_id == self.target_node_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn contains_self_loop_is_invalid() {
        let edge = GraphEdge {
            id: "e1".into(),
            source_node_id: "n1".into(),
            target_node_id: "n1".into(),
            edge_type: EdgeType::Contains,
            properties: json!({}),
        };
        assert!(edge.is_invalid_self_loop());
    }

    #[test]
    fn calls_self_loop_is_allowed() {
        let edge = GraphEdge {
            id: "e1".into(),
            source_node_id: "n1".into(),
            target_node_id: "n1".into(),
            edge_type: EdgeType::Calls,
            properties: json!({}),
        };
        assert!(!edge.is_invalid_self_loop());
    }

    #[test]
    fn edge_type_round_trips_through_str() {
        for et in [
            EdgeType::Calls,
            EdgeType::Imports,
            EdgeType::Inherits,
            EdgeType::ReExports,
            EdgeType::Contains,
        ] {
            assert_eq!(EdgeType::from_str_opt(et.as_str()), Some(et));
        }
        assert_eq!(EdgeType::from_str_opt("unknown"), None);
    }
}
