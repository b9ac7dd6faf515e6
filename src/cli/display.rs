// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Terminal display for search results.
//!
//! Color only when it makes sense: a real TTY, no `NO_COLOR` in the
//! environment. Scores get a traffic-light treatment (precision matches
//! green, basic matches yellow) and provenance stays dim so the heading
//! text carries the line.

use std::sync::OnceLock;

use tocsin::types::{SearchPath, SearchResponse};

/// Whether to emit ANSI colors, decided once.
fn use_color() -> bool {
    static USE_COLOR: OnceLock<bool> = OnceLock::new();
    *USE_COLOR.get_or_init(|| {
        if std::env::var_os("NO_COLOR").is_some() {
            return false;
        }
        atty::is(atty::Stream::Stdout)
    })
}

fn paint(text: &str, code: &str) -> String {
    if use_color() {
        format!("\x1b[{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

fn green(text: &str) -> String {
    paint(text, "32")
}

fn yellow(text: &str) -> String {
    paint(text, "33")
}

fn dim(text: &str) -> String {
    paint(text, "2")
}

fn bold(text: &str) -> String {
    paint(text, "1")
}

/// Render a search response to stdout.
pub fn print_response(response: &SearchResponse) {
    if !response.success {
        println!("{}", yellow("no matching headings"));
        print_stats(response);
        return;
    }

    for hit in &response.results {
        println!(
            "{}  {}",
            bold(&hit.page_title),
            dim(&format!("[{} · {}]", hit.doc_set, hit.toc_reference))
        );
        for heading in &hit.headings {
            let indent = "  ".repeat(heading.level as usize);
            let score = format!("{:.2}", heading.lexical_score);
            let score = if heading.precision {
                green(&score)
            } else {
                yellow(&score)
            };
            let semantic = heading
                .semantic_score
                .map(|s| dim(&format!(" ~{s:.2}")))
                .unwrap_or_default();
            println!("{indent}{} {}{}", score, heading.text, semantic);
        }
    }
    print_stats(response);
}

fn print_stats(response: &SearchResponse) {
    let stats = &response.stats;
    let path = match stats.path {
        SearchPath::Primary => "primary".to_string(),
        SearchPath::Fallback => {
            let attempted: Vec<String> = stats
                .strategies_attempted
                .iter()
                .map(ToString::to_string)
                .collect();
            format!("fallback ({})", attempted.join(", "))
        }
        SearchPath::NoMatch => {
            if stats.strategies_attempted.is_empty() {
                "no match".to_string()
            } else {
                let attempted: Vec<String> = stats
                    .strategies_attempted
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                format!("no match (tried {})", attempted.join(", "))
            }
        }
    };
    println!(
        "{}",
        dim(&format!(
            "{} pages · {} headings scored · {} · {}µs",
            stats.pages_scored, stats.headings_scored, path, stats.elapsed_micros
        ))
    );
}
