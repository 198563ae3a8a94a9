//! CLI command handlers (§6's operation surface)
//!
//! Each handler takes the already-built [`AppContext`] and prints a single
//! JSON document to stdout — this binary has no other consumer, so there is
//! no separate wire format to keep in sync. `anyhow` is used here and only
//! here (§11.3): every handler attaches context before bubbling a failure
//! up to `main`.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use mnemolite_domain::entities::EdgeType;
use mnemolite_domain::ports::{Direction, SearchFilters};
use mnemolite_infrastructure::AppContext;
use tokio_util::sync::CancellationToken;

/// Run `index <repository> <root>`: drive the full seven-stage pipeline
/// over `root` and print the resulting [`mnemolite_application::IndexingSummary`].
pub async fn index(ctx: &AppContext, repository: &str, root: &Path) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let summary = ctx
        .indexing
        .index_repository(repository, root, cancel)
        .await
        .with_context(|| format!("indexing repository '{repository}' at {}", root.display()))?;

    metrics::counter!("mnemolite_indexed_files_total").increment(summary.indexed_files as u64);
    for (reason, count) in &summary.skipped_by_reason {
        metrics::counter!("mnemolite_indexing_skipped_total", "reason" => (*reason)).increment(*count as u64);
    }
    for (kind, count) in &summary.errors_by_kind {
        metrics::counter!("mnemolite_indexing_errors_total", "kind" => (*kind)).increment(*count as u64);
    }

    println!("{}", serde_json::to_string_pretty(&summary_to_json(&summary))?);
    Ok(())
}

fn summary_to_json(summary: &mnemolite_application::IndexingSummary) -> serde_json::Value {
    serde_json::json!({
        "indexed_files": summary.indexed_files,
        "chunks": summary.chunks,
        "nodes": summary.nodes,
        "edges": summary.edges,
        "skipped_by_reason": summary.skipped_by_reason,
        "errors_by_kind": summary.errors_by_kind,
    })
}

/// Run `purge <repository>`: remove every chunk, node, and edge it owns.
pub async fn purge(ctx: &AppContext, repository: &str) -> anyhow::Result<()> {
    ctx.indexing
        .purge_repository(repository)
        .await
        .with_context(|| format!("purging repository '{repository}'"))?;
    println!("{{\"repository\": \"{repository}\", \"purged\": true}}");
    Ok(())
}

/// Run `search <query>`: hybrid code search (§4.9), filtered and bounded by
/// `limit`, printed as the full response envelope (results, degraded,
/// partial, per-channel status).
pub async fn search(
    ctx: &AppContext,
    query: &str,
    repository: Option<String>,
    language: Option<String>,
    chunk_type: Option<String>,
    limit: usize,
) -> anyhow::Result<()> {
    let filters = SearchFilters {
        repository,
        language,
        chunk_type,
        since: None,
        until: None,
        memory_type: None,
        tags: Vec::new(),
        project: None,
    };
    let deadline = Instant::now() + Duration::from_millis(ctx.settings.deadline_ms);
    let response = ctx
        .search
        .search_code(query, &filters, limit, deadline)
        .await
        .context("running hybrid code search")?;

    metrics::counter!("mnemolite_search_requests_total", "channel" => "lexical").increment(1);
    if response.degraded {
        metrics::counter!("mnemolite_search_degraded_total").increment(1);
    }

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Run `neighbors <node> [--depth] [--edge-types] [--direction]`: bounded
/// BFS over the symbol graph (§4.10).
pub async fn neighbors(
    ctx: &AppContext,
    node: &str,
    depth: usize,
    edge_types: &[String],
    direction: &str,
) -> anyhow::Result<()> {
    let edge_types: Vec<EdgeType> = edge_types
        .iter()
        .map(|s| EdgeType::from_str_opt(s).with_context(|| format!("unknown edge type '{s}'")))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let direction = parse_direction(direction)?;

    let result = ctx
        .traversal
        .neighbors(node, depth, &edge_types, direction)
        .await
        .with_context(|| format!("traversing neighbors of '{node}'"))?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Run the supplemented `reconcile` subcommand (§12): re-derive every
/// edge's endpoints and report any whose endpoints no longer exist. Does
/// not delete anything; the operator decides.
pub async fn reconcile(ctx: &AppContext) -> anyhow::Result<()> {
    let dangling = ctx
        .store
        .reconcile_graph_integrity()
        .await
        .context("reconciling graph integrity")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({ "dangling_edges": dangling }))?
    );
    Ok(())
}

fn parse_direction(s: &str) -> anyhow::Result<Direction> {
    match s {
        "out" => Ok(Direction::Out),
        "in" => Ok(Direction::In),
        "both" => Ok(Direction::Both),
        other => anyhow::bail!("unknown direction '{other}', expected one of out|in|both"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("out", Direction::Out)]
    #[case("in", Direction::In)]
    #[case("both", Direction::Both)]
    fn parse_direction_accepts_every_named_value(#[case] input: &str, #[case] expected: Direction) {
        assert_eq!(parse_direction(input).unwrap(), expected);
    }

    #[test]
    fn parse_direction_rejects_unknown_value() {
        assert!(parse_direction("sideways").is_err());
    }
}
