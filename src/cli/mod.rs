// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the tocsin command-line interface.
//!
//! Two subcommands: `search` runs a query against a corpus directory,
//! `inspect` prints what a corpus contains. The search command is
//! lexical-only - the semantic capability is injected by library callers,
//! not shipped with the binary - so its rerank threshold flag only matters
//! for config validation.

pub mod display;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tocsin",
    about = "Fallback-escalating heading retrieval over documentation sets",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search a corpus directory and display matching headings
    Search {
        /// Corpus directory containing name@version doc-set folders
        #[arg(short, long)]
        corpus: PathBuf,

        /// Query text; repeat the argument to supply rewritten variants
        #[arg(required = true)]
        query: Vec<String>,

        /// Explicit target collection(s); bypasses collection inference
        #[arg(short = 'C', long = "collection")]
        collections: Vec<String>,

        /// Run the two fallback strategies concurrently instead of serially
        #[arg(long)]
        parallel_fallback: bool,

        /// Semantic rerank threshold. The engine refuses to default this;
        /// the CLI picks 0.5 as its own caller-side choice.
        #[arg(long, default_value = "0.5")]
        rerank_threshold: f64,

        /// Emit the raw response as JSON instead of the human display
        #[arg(long)]
        json: bool,
    },

    /// Show corpus statistics: doc-sets, pages, headings
    Inspect {
        /// Corpus directory containing name@version doc-set folders
        #[arg(short, long)]
        corpus: PathBuf,
    },
}
