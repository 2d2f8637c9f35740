// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ciro - answer questions by retrieval or by running analysis code.
//!
//! This is the binary entry point for the Ciro query engine.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod ask;
mod health;
mod route;
mod show_config;

use std::path::PathBuf;

use ciro_config::CiroConfig;
use ciro_engine::PathOverride;
use clap::{Parser, Subcommand};

/// Ciro - answer questions by retrieval or by running analysis code.
#[derive(Parser, Debug)]
#[command(name = "ciro", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the usual locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a question.
    Ask {
        query: String,
        /// Sandbox session for analytical questions.
        #[arg(long)]
        session: Option<String>,
        /// Collection to search instead of the configured default.
        #[arg(long)]
        collection: Option<String>,
        /// Number of documents to retrieve.
        #[arg(long)]
        top_k: Option<usize>,
        /// Skip reranking.
        #[arg(long)]
        no_rerank: bool,
        /// Force a pipeline: auto, retrieval, or analytical.
        #[arg(long, default_value = "auto")]
        path: PathOverride,
        /// Extra context for the analytical loop.
        #[arg(long)]
        context: Option<String>,
        /// Print the full response envelope as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show how a question would be routed, without answering it.
    Route {
        query: String,
        #[arg(long)]
        json: bool,
    },
    /// Check connectivity to every collaborator.
    Health {
        #[arg(long)]
        plain: bool,
    },
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            ciro_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.engine.log_level);

    let result = match cli.command {
        Some(Commands::Ask {
            query,
            session,
            collection,
            top_k,
            no_rerank,
            path,
            context,
            json,
        }) => {
            let options = ask::AskOptions {
                session,
                collection,
                top_k,
                no_rerank,
                path,
                context,
                json,
            };
            ask::run_ask(&config, &query, options).await
        }
        Some(Commands::Route { query, json }) => route::run_route(&config, &query, json),
        Some(Commands::Health { plain }) => health::run_health(&config, plain).await,
        Some(Commands::Config) => show_config::run_show_config(&config),
        None => {
            println!("ciro: use --help for available commands");
            Ok(true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("ciro: {e}");
            std::process::exit(1);
        }
    }
}

fn load_config(
    path: Option<&std::path::Path>,
) -> Result<CiroConfig, Vec<ciro_config::ConfigError>> {
    match path {
        Some(path) => ciro_config::load_and_validate_path(path),
        None => ciro_config::load_and_validate(),
    }
}

/// Logs go to stderr so `--json` output stays parseable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ciro={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn ask_flags_parse() {
        let cli = Cli::try_parse_from([
            "ciro", "ask", "how many funds?", "--top-k", "3", "--no-rerank", "--path", "retrieval",
        ])
        .unwrap();
        let Some(Commands::Ask {
            top_k,
            no_rerank,
            path,
            ..
        }) = cli.command
        else {
            panic!("expected ask");
        };
        assert_eq!(top_k, Some(3));
        assert!(no_rerank);
        assert_eq!(path, PathOverride::Retrieval);
    }

    #[test]
    fn unknown_path_is_rejected() {
        assert!(Cli::try_parse_from(["ciro", "ask", "q", "--path", "sideways"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
