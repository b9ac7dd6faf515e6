//! Shared test utilities and fixtures.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

// Re-export canonical fixtures from tocsin::testing
pub use tocsin::testing::{docs_corpus, page, two_collection_corpus, StubEmbedder};

/// Write a doc-set folder with one TOC file into `root`.
pub fn write_doc_set(root: &Path, dir_name: &str, toc: &str) {
    let set_dir = root.join(dir_name);
    fs::create_dir_all(&set_dir).expect("create doc-set dir");
    fs::write(set_dir.join("toc.md"), toc).expect("write toc file");
}

/// The standard on-disk corpus used by loader tests.
pub fn write_standard_corpus(root: &Path) {
    write_doc_set(
        root,
        "docs@latest",
        "\
# Hooks reference
## Configure hooks
### Hook ordering
## Disable hooks
# Operations guide
## Production Considerations
## Local development
",
    );
}
