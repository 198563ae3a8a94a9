//! Graph Builder (C7) implementation.
//!
//! Turns a file's chunks and their [`ExtractedMetadata`] into a
//! [`GraphDelta`]: one [`GraphNode`] per chunk (plus a module node for
//! barrel/config chunks), and one [`GraphEdge`] per [`SymbolReference`],
//! deduplicated within the delta by `(source, target, type)` using the
//! max-weight rule the Store Gateway also applies across deltas (§4.7).

use std::collections::HashMap;

use mnemolite_domain::entities::{CodeChunk, EdgeType, GraphEdge, GraphNode, NodeType};
use mnemolite_domain::ports::{ExtractedMetadata, GraphBuilder as GraphBuilderPort, GraphDelta};
use serde_json::json;

/// Builds node/edge deltas from chunks and their extracted metadata.
#[derive(Debug, Default)]
pub struct SymbolGraphBuilder;

impl SymbolGraphBuilder {
    /// Construct a builder. Stateless: all inputs are per-call.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn node_for_chunk(chunk: &CodeChunk) -> GraphNode {
        let node_type = if chunk.chunk_type.is_synthetic() {
            NodeType::Module
        } else {
            NodeType::Symbol
        };
        let label = chunk.name_path.last().cloned().unwrap_or_else(|| chunk.file_path.clone());
        GraphNode {
            id: chunk.id.clone(),
            node_type,
            label,
            properties: json!({
                "repository": chunk.repository,
                "file_path": chunk.file_path,
                "language": chunk.language,
                "chunk_type": chunk.chunk_type.as_str(),
                "is_barrel": chunk.chunk_type == mnemolite_domain::entities::ChunkType::Barrel,
            }),
        }
    }

    fn edge_id(source: &str, target: &str, edge_type: EdgeType) -> String {
        format!("{source}\0{target}\0{}", edge_type.as_str())
    }

    /// A placeholder node for a reference target that has no chunk of its
    /// own in this delta (e.g. a re-export target in a sibling file not yet
    /// indexed in this run). Keeps every `GraphEdge`'s endpoints resolvable
    /// among this delta's `GraphNode`s (§8).
    fn stub_node(target_id: &str, target_name: &str, repository: &str) -> GraphNode {
        GraphNode {
            id: target_id.to_string(),
            node_type: NodeType::Symbol,
            label: target_name.to_string(),
            properties: json!({
                "repository": repository,
                "unresolved": true,
            }),
        }
    }
}

impl GraphBuilderPort for SymbolGraphBuilder {
    fn build_delta(&self, repository: &str, chunks: &[CodeChunk], metadata: &[ExtractedMetadata]) -> GraphDelta {
        let mut nodes: HashMap<String, GraphNode> = HashMap::with_capacity(chunks.len());
        let mut edges: HashMap<(String, String, EdgeType), GraphEdge> = HashMap::new();

        for chunk in chunks {
            nodes.insert(chunk.id.clone(), Self::node_for_chunk(chunk));
        }

        for (chunk, meta) in chunks.iter().zip(metadata.iter()) {
            let all_refs = meta.references.iter().chain(meta.re_exports.iter());
            for reference in all_refs {
                let source_id = chunk.id.clone();
                let target_id = format!("{repository}::{}", reference.target_name);
                if reference.edge_type == EdgeType::Contains && source_id == target_id {
                    continue;
                }
                nodes
                    .entry(target_id.clone())
                    .or_insert_with(|| Self::stub_node(&target_id, &reference.target_name, repository));
                let id = Self::edge_id(&source_id, &target_id, reference.edge_type);
                edges
                    .entry((source_id.clone(), target_id.clone(), reference.edge_type))
                    .and_modify(|existing| {
                        let existing_weight = existing.properties.get("weight").and_then(|v| v.as_f64()).unwrap_or(0.0);
                        existing
                            .properties
                            .as_object_mut()
                            .expect("built as object")
                            .insert("weight".to_string(), json!(existing_weight + 1.0));
                    })
                    .or_insert_with(|| GraphEdge {
                        id,
                        source_node_id: source_id,
                        target_node_id: target_id,
                        edge_type: reference.edge_type,
                        properties: json!({
                            "weight": 1.0,
                            "is_type": reference.is_type_only,
                        }),
                    });
            }
        }

        GraphDelta {
            nodes: nodes.into_values().collect(),
            edges: edges.into_values().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemolite_domain::entities::{ChunkType, SourceSpan};
    use mnemolite_domain::ports::SymbolReference;

    fn chunk(id: &str) -> CodeChunk {
        CodeChunk {
            id: id.to_string(),
            repository: "repo".into(),
            file_path: "src/lib.rs".into(),
            language: "rust".into(),
            chunk_type: ChunkType::Function,
            content: "fn f() {}".into(),
            content_hash: "hash".into(),
            embedding_text: None,
            embedding_code: None,
            name_path: vec!["f".into()],
            span: SourceSpan { line_start: 1, line_end: 1 },
            metadata: serde_json::Value::Null,
        }
    }

    #[test]
    fn builds_one_node_per_chunk() {
        let builder = SymbolGraphBuilder::new();
        let chunks = vec![chunk("c1"), chunk("c2")];
        let metadata = vec![ExtractedMetadata::default(), ExtractedMetadata::default()];
        let delta = builder.build_delta("repo", &chunks, &metadata);
        assert_eq!(delta.nodes.len(), 2);
        assert!(delta.edges.is_empty());
    }

    #[test]
    fn duplicate_references_coalesce_into_one_weighted_edge() {
        let builder = SymbolGraphBuilder::new();
        let chunks = vec![chunk("c1")];
        let reference = SymbolReference {
            target_name: "helper".into(),
            edge_type: EdgeType::Calls,
            is_type_only: false,
        };
        let metadata = vec![ExtractedMetadata {
            signature: None,
            re_exports: vec![],
            references: vec![reference.clone(), reference],
        }];
        let delta = builder.build_delta("repo", &chunks, &metadata);
        assert_eq!(delta.edges.len(), 1);
        let weight = delta.edges[0].properties.get("weight").and_then(|v| v.as_f64()).unwrap();
        assert!(weight >= 1.0);
    }

    #[test]
    fn barrel_re_export_targets_materialize_as_nodes() {
        let builder = SymbolGraphBuilder::new();
        let barrel = chunk("barrel");
        let re_exports: Vec<SymbolReference> = (0..10)
            .map(|i| SymbolReference {
                target_name: format!("sym{i}"),
                edge_type: EdgeType::ReExports,
                is_type_only: false,
            })
            .collect();
        let metadata = vec![ExtractedMetadata {
            signature: None,
            re_exports,
            references: vec![],
        }];
        let delta = builder.build_delta("repo", &[barrel], &metadata);
        assert_eq!(delta.edges.len(), 10);
        let node_ids: std::collections::HashSet<&str> = delta.nodes.iter().map(|n| n.id.as_str()).collect();
        for edge in &delta.edges {
            assert!(node_ids.contains(edge.source_node_id.as_str()));
            assert!(
                node_ids.contains(edge.target_node_id.as_str()),
                "edge target {} has no materialized node",
                edge.target_node_id
            );
        }
        // one node per re-export target plus the barrel chunk's own node
        assert_eq!(delta.nodes.len(), 11);
    }
}
