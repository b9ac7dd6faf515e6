// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The tocsin CLI: search and inspect documentation corpora.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tocsin::{Corpus, FallbackMode, Query, SearchConfig, SearchEngine};

mod cli;
use cli::{display, Cli, Commands};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> tocsin::Result<()> {
    match cli.command {
        Commands::Search {
            corpus,
            query,
            collections,
            parallel_fallback,
            rerank_threshold,
            json,
        } => {
            let corpus = Corpus::load(&corpus)?;

            let mut config = SearchConfig::new(rerank_threshold);
            if !collections.is_empty() {
                config = config.with_collections(collections);
            }
            if parallel_fallback {
                config = config.with_fallback_mode(FallbackMode::Parallel);
            }

            let engine = SearchEngine::new(&corpus, config)?;
            let response = engine.search(&Query::from_variants(query));

            if json {
                // Serialization of the response types cannot fail.
                let rendered = serde_json::to_string_pretty(&response)
                    .expect("SearchResponse serializes");
                println!("{rendered}");
            } else {
                display::print_response(&response);
            }
            Ok(())
        }
        Commands::Inspect { corpus } => {
            let corpus = Corpus::load(&corpus)?;
            if corpus.is_empty() {
                println!("empty corpus");
                return Ok(());
            }
            for doc_set in corpus.doc_sets() {
                println!(
                    "{}: {} pages, {} headings, {} toc files",
                    doc_set.id(),
                    doc_set.pages().len(),
                    doc_set.heading_count(),
                    doc_set.tocs().len()
                );
            }
            Ok(())
        }
    }
}
