//! # MnemoLite server
//!
//! CLI entry point over the operation surface named in §6, plus a
//! liveness/readiness/metrics HTTP surface for `serve`. The business
//! surface (tool/resource protocol) is out of scope here; this binary only
//! drives indexing, search, and traversal from the command line, and keeps
//! the process observable while it runs as a long-lived service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use mnemolite_infrastructure::{config, AppContext};

#[derive(Parser)]
#[command(name = "mnemolite", about = "Self-hosted cognitive memory and code intelligence", version)]
struct Cli {
    /// Path to an optional TOML configuration file, layered under env vars.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the liveness/readiness/metrics HTTP surface.
    Serve {
        /// Address to bind the HTTP surface to.
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
    },

    /// Index a repository's source tree (C8).
    Index {
        /// Logical repository name chunks/nodes/edges are grouped under.
        repository: String,
        /// Filesystem root to walk.
        root: PathBuf,
    },

    /// Remove every chunk, node, and edge owned by a repository.
    Purge {
        /// Logical repository name to purge.
        repository: String,
    },

    /// Hybrid code search (C9).
    Search {
        /// Free-text query.
        query: String,
        /// Restrict to a repository.
        #[arg(long)]
        repository: Option<String>,
        /// Restrict to a language tag.
        #[arg(long)]
        language: Option<String>,
        /// Restrict to a chunk type.
        #[arg(long)]
        chunk_type: Option<String>,
        /// Maximum number of fused results.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Bounded BFS over the symbol graph (C10).
    Neighbors {
        /// Starting node identifier.
        node: String,
        /// Maximum traversal depth.
        #[arg(long, default_value_t = 5)]
        depth: usize,
        /// Edge type whitelist; empty means every edge type.
        #[arg(long = "edge-type")]
        edge_types: Vec<String>,
        /// Traversal direction: out, in, or both.
        #[arg(long, default_value = "out")]
        direction: String,
    },

    /// Re-derive every edge's endpoints and report dangling ones (§12).
    Reconcile,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let settings = config::load(cli.config.as_deref()).context("loading configuration")?;

    let ctx = AppContext::build(settings).await.context("building application context")?;

    match cli.command {
        Commands::Serve { bind } => run_serve(ctx, &bind).await,
        Commands::Index { repository, root } => mnemolite_server::commands::index(&ctx, &repository, &root).await,
        Commands::Purge { repository } => mnemolite_server::commands::purge(&ctx, &repository).await,
        Commands::Search { query, repository, language, chunk_type, limit } => {
            mnemolite_server::commands::search(&ctx, &query, repository, language, chunk_type, limit).await
        }
        Commands::Neighbors { node, depth, edge_types, direction } => {
            mnemolite_server::commands::neighbors(&ctx, &node, depth, &edge_types, &direction).await
        }
        Commands::Reconcile => mnemolite_server::commands::reconcile(&ctx).await,
    }
}

async fn run_serve(ctx: AppContext, bind: &str) -> anyhow::Result<()> {
    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("installing the Prometheus metrics recorder")?;

    let app = mnemolite_server::http::build_router(Arc::new(ctx), metrics_handle);

    tracing::info!(bind, "starting HTTP surface");
    let listener = tokio::net::TcpListener::bind(bind).await.with_context(|| format!("binding {bind}"))?;
    axum::serve(listener, app).await.context("serving HTTP")?;
    Ok(())
}
