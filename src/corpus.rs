// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The read-only corpus: doc-sets, pages, and their TOC files.
//!
//! A corpus is loaded once per search and never mutated. Each doc-set keeps
//! both views of its tables of contents: the parsed one (pages with ordered
//! headings) that the matcher pipeline walks, and the raw text that the
//! fallback engine greps. The two views are built from the same parse, so
//! they cannot drift apart.
//!
//! Attribution from a raw line number back to "whose heading is this?" goes
//! through [`HeadingIndex`], an ordered array of (line, page, heading)
//! entries. Nearest-preceding lookup is a binary search over that array,
//! not a re-scan of the text.
//!
//! # Directory layout
//!
//! ```text
//! corpus/
//!   react@19.2/
//!     hooks.md      <- TOC file: "# Page" opens a page, "##".."######"
//!     rendering.md     lines are its headings
//!   fastify@5/
//!     toc.md
//! ```

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Result, SearchError};
use crate::text::parse_heading_line;
use crate::types::{DocSetId, Heading};

// =============================================================================
// HEADING INDEX
// =============================================================================

/// One entry of the pre-parsed heading index: a line that carries structure.
///
/// `heading` is `None` for page-title lines (`# Title`), `Some(i)` for the
/// i-th heading of that page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Zero-based line number in the TOC file.
    pub line: u32,
    /// Index of the owning page within the doc-set.
    pub page: usize,
    /// Index of the heading within the page, or `None` for the title line.
    pub heading: Option<usize>,
}

/// Ordered array of structural lines in one TOC file.
///
/// Entries are sorted by line number (they are appended during a single
/// top-to-bottom parse), so "nearest preceding entry to line N" is a
/// `partition_point` binary search.
#[derive(Debug, Clone, Default)]
pub struct HeadingIndex {
    entries: Vec<IndexEntry>,
}

impl HeadingIndex {
    /// The nearest entry at or before `line`, if any.
    pub fn nearest_preceding(&self, line: u32) -> Option<IndexEntry> {
        let idx = self.entries.partition_point(|e| e.line <= line);
        if idx == 0 {
            None
        } else {
            Some(self.entries[idx - 1])
        }
    }

    /// Like [`nearest_preceding`](Self::nearest_preceding), but only
    /// entries within `window` lines before `line` qualify.
    pub fn nearest_preceding_within(&self, line: u32, window: u32) -> Option<IndexEntry> {
        let entry = self.nearest_preceding(line)?;
        if line - entry.line <= window {
            Some(entry)
        } else {
            None
        }
    }

    /// The nearest *heading* entry at or before `line`, within `window`
    /// lines. Page-title entries are skipped - callers that want "the
    /// nearest heading", not "the nearest structural line", use this.
    pub fn nearest_heading_within(&self, line: u32, window: u32) -> Option<IndexEntry> {
        let low = line.saturating_sub(window);
        let idx = self.entries.partition_point(|e| e.line <= line);
        self.entries[..idx]
            .iter()
            .rev()
            .take_while(|e| e.line >= low)
            .find(|e| e.heading.is_some())
            .copied()
    }

    /// The entry exactly at `line`, if that line carries structure.
    pub fn at(&self, line: u32) -> Option<IndexEntry> {
        let idx = self.entries.partition_point(|e| e.line < line);
        self.entries
            .get(idx)
            .filter(|e| e.line == line)
            .copied()
    }

    /// All entries, in line order.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }
}

// =============================================================================
// PAGES AND TOC FILES
// =============================================================================

/// One documentation page: a title plus its ordered table of contents.
#[derive(Debug, Clone)]
pub struct Page {
    /// Page title, from the `# Title` marker line.
    pub title: String,
    /// Relative path of the TOC file this page was parsed from.
    pub toc_reference: String,
    /// Zero-based line of the title marker.
    pub title_line: u32,
    /// Headings in document order.
    pub headings: Vec<Heading>,
    /// Line number of each heading, parallel to `headings`.
    pub heading_lines: Vec<u32>,
    /// Opaque reference to the page body. Never read by this engine.
    pub body_ref: String,
}

/// One raw TOC file: its text for grepping plus its structural index.
#[derive(Debug, Clone)]
pub struct TocFile {
    /// Relative path, used as provenance in results.
    pub reference: String,
    /// Raw file text. Fallback strategies scan this.
    pub raw: String,
    /// Pre-parsed structural index over `raw`.
    pub index: HeadingIndex,
}

// =============================================================================
// DOC SET
// =============================================================================

/// A named, versioned collection of pages.
#[derive(Debug, Clone)]
pub struct DocSet {
    id: DocSetId,
    pages: Vec<Page>,
    tocs: Vec<TocFile>,
}

impl DocSet {
    /// An empty doc-set; populate with [`add_toc`](Self::add_toc).
    pub fn new(id: DocSetId) -> Self {
        DocSet {
            id,
            pages: Vec::new(),
            tocs: Vec::new(),
        }
    }

    /// Parse one TOC file's text and append its pages.
    ///
    /// Lines before the first `# Title` marker cannot be attributed to a
    /// page and are skipped with a warning.
    pub fn add_toc(&mut self, reference: impl Into<String>, raw: impl Into<String>) {
        let reference = reference.into();
        let raw = raw.into();
        let mut index = HeadingIndex::default();
        let mut current_page: Option<usize> = None;

        for (line_no, line) in raw.lines().enumerate() {
            let line_no = line_no as u32;
            let Some(heading) = parse_heading_line(line) else {
                continue;
            };

            if heading.level == 1 {
                // A level-1 marker opens a new page.
                let page_idx = self.pages.len();
                self.pages.push(Page {
                    body_ref: format!("{}#{}", reference, heading.text),
                    title: heading.text,
                    toc_reference: reference.clone(),
                    title_line: line_no,
                    headings: Vec::new(),
                    heading_lines: Vec::new(),
                });
                index.entries.push(IndexEntry {
                    line: line_no,
                    page: page_idx,
                    heading: None,
                });
                current_page = Some(page_idx);
            } else {
                let Some(page_idx) = current_page else {
                    warn!(
                        toc = %reference,
                        line = line_no,
                        "heading before first page marker, skipping"
                    );
                    continue;
                };
                let page = &mut self.pages[page_idx];
                index.entries.push(IndexEntry {
                    line: line_no,
                    page: page_idx,
                    heading: Some(page.headings.len()),
                });
                page.headings.push(heading);
                page.heading_lines.push(line_no);
            }
        }

        self.tocs.push(TocFile {
            reference,
            raw,
            index,
        });
    }

    /// Build a doc-set from structured pages, synthesizing the TOC text.
    ///
    /// The generated text round-trips through the same parser the loader
    /// uses, so the grep view and the parsed view stay consistent. Meant
    /// for in-memory corpora (tests, embedders).
    pub fn from_pages<T, H>(id: DocSetId, reference: &str, pages: Vec<(T, Vec<H>)>) -> Self
    where
        T: AsRef<str>,
        H: Into<Heading>,
    {
        let mut raw = String::new();
        for (title, headings) in pages {
            raw.push_str("# ");
            raw.push_str(title.as_ref());
            raw.push('\n');
            for heading in headings {
                let heading = heading.into();
                // Clamp synthesized levels to 2-6: level 1 is the page marker.
                let level = heading.level.clamp(2, 6);
                for _ in 0..level {
                    raw.push('#');
                }
                raw.push(' ');
                raw.push_str(&heading.text);
                raw.push('\n');
            }
        }
        let mut set = DocSet::new(id);
        set.add_toc(reference, raw);
        set
    }

    /// Doc-set identity.
    pub fn id(&self) -> &DocSetId {
        &self.id
    }

    /// Pages in corpus order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Raw TOC files with their structural indexes.
    pub fn tocs(&self) -> &[TocFile] {
        &self.tocs
    }

    /// Total heading count across all pages.
    pub fn heading_count(&self) -> usize {
        self.pages.iter().map(|p| p.headings.len()).sum()
    }
}

// =============================================================================
// CORPUS
// =============================================================================

/// An immutable set of doc-sets. The unit a search call runs against.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    doc_sets: Vec<DocSet>,
}

impl Corpus {
    /// A corpus from pre-built doc-sets.
    pub fn from_doc_sets(doc_sets: Vec<DocSet>) -> Self {
        Corpus { doc_sets }
    }

    /// Load a corpus from a directory of `name@version` doc-set folders.
    ///
    /// Within each doc-set folder, every `.md` and `.txt` file is parsed
    /// as a TOC file. Files and folders are visited in sorted order so
    /// page indices are stable across runs.
    pub fn load(dir: &Path) -> Result<Self> {
        let read_dir = fs::read_dir(dir).map_err(|source| SearchError::CorpusIo {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut set_dirs: Vec<_> = read_dir
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_dir())
            .collect();
        set_dirs.sort();

        let mut doc_sets = Vec::new();
        for set_dir in set_dirs {
            let dir_name = set_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let id = DocSetId::parse(&dir_name)
                .ok_or_else(|| SearchError::InvalidDocSetName(dir_name.clone()))?;

            let mut doc_set = DocSet::new(id);
            let mut toc_paths: Vec<_> = fs::read_dir(&set_dir)
                .map_err(|source| SearchError::CorpusIo {
                    path: set_dir.clone(),
                    source,
                })?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| {
                    matches!(
                        p.extension().and_then(|e| e.to_str()),
                        Some("md") | Some("txt")
                    )
                })
                .collect();
            toc_paths.sort();

            for toc_path in toc_paths {
                let raw = fs::read_to_string(&toc_path).map_err(|source| {
                    SearchError::CorpusIo {
                        path: toc_path.clone(),
                        source,
                    }
                })?;
                let reference = toc_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                doc_set.add_toc(format!("{}/{}", dir_name, reference), raw);
            }

            debug!(
                doc_set = %doc_set.id,
                pages = doc_set.pages.len(),
                headings = doc_set.heading_count(),
                "loaded doc-set"
            );
            doc_sets.push(doc_set);
        }

        Ok(Corpus { doc_sets })
    }

    /// Doc-sets in corpus order.
    pub fn doc_sets(&self) -> &[DocSet] {
        &self.doc_sets
    }

    /// Whether the corpus has no doc-sets at all.
    pub fn is_empty(&self) -> bool {
        self.doc_sets.is_empty()
    }

    /// Look up a doc-set by `name@version`, or by bare name (first match).
    pub fn find(&self, name: &str) -> Option<&DocSet> {
        self.doc_sets
            .iter()
            .find(|d| d.id.to_string() == name)
            .or_else(|| self.doc_sets.iter().find(|d| d.id.name == name))
    }
}
