//! Text-run sources: the boundary between layout extraction and segmentation.

use super::{PageRuns, TextRun};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

const RUNS_SUFFIX: &str = ".runs.json";

/// Errors raised while loading a document's text runs.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No runs are available for the requested document.
    #[error("document not found: {0}")]
    NotFound(String),
    /// The backing file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File we attempted to read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The backing file was not valid text-run JSON.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File we attempted to parse.
        path: PathBuf,
        /// Underlying decode failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Yields a document's runs page by page, preserving line and span order within each page.
pub trait TextRunSource {
    /// Load all pages of `document_id` in page order.
    fn load(&self, document_id: &str) -> Result<Vec<PageRuns>, SourceError>;
}

/// Reads pre-extracted runs from `<stem>.runs.json` files in a directory.
#[derive(Debug, Clone)]
pub struct JsonRunSource {
    root: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RunsFile {
    #[serde(default)]
    pages: Vec<RawPage>,
}

#[derive(Debug, Deserialize)]
struct RawPage {
    page: u32,
    #[serde(default)]
    runs: Vec<RawRun>,
}

#[derive(Debug, Deserialize)]
struct RawRun {
    text: String,
    font_size: f32,
    #[serde(default)]
    is_bold: bool,
    #[serde(default)]
    font: Option<String>,
    left_x: f32,
    #[serde(default)]
    line_index: u32,
    #[serde(default)]
    span_index: u32,
}

impl JsonRunSource {
    /// Serve runs from files stored directly under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the runs file backing `document_id` (`guide.pdf` and `guide` both map to
    /// `guide.runs.json`).
    pub fn runs_path(&self, document_id: &str) -> PathBuf {
        let path = Path::new(document_id);
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        let stem = match path.file_stem() {
            Some(stem) if is_pdf => stem.to_string_lossy().into_owned(),
            _ => document_id.to_string(),
        };
        self.root.join(format!("{stem}{RUNS_SUFFIX}"))
    }

    /// List the documents available in the directory, sorted by name.
    pub fn discover(&self) -> Vec<String> {
        let mut documents: Vec<String> = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .and_then(|name| name.strip_suffix(RUNS_SUFFIX))
                    .map(str::to_string)
            })
            .collect();
        documents.sort();
        documents
    }
}

impl TextRunSource for JsonRunSource {
    fn load(&self, document_id: &str) -> Result<Vec<PageRuns>, SourceError> {
        let path = self.runs_path(document_id);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::NotFound(document_id.to_string()));
            }
            Err(source) => return Err(SourceError::Io { path, source }),
        };
        let file: RunsFile =
            serde_json::from_str(&content).map_err(|source| SourceError::Parse {
                path: path.clone(),
                source,
            })?;

        let mut pages: Vec<PageRuns> = file
            .pages
            .into_iter()
            .map(|raw| {
                let runs = raw.runs.into_iter().filter_map(normalize_run).collect();
                PageRuns::new(raw.page, runs)
            })
            .collect();
        pages.sort_by_key(|page| page.page);
        tracing::debug!(
            document = document_id,
            path = %path.display(),
            pages = pages.len(),
            "Loaded text runs"
        );
        Ok(pages)
    }
}

/// Trim run text, drop empty runs, and infer boldness from the font name.
fn normalize_run(raw: RawRun) -> Option<TextRun> {
    let text = raw.text.trim();
    if text.is_empty() {
        return None;
    }
    let bold_font = raw
        .font
        .as_deref()
        .map(|font| font.to_lowercase().contains("bold"))
        .unwrap_or(false);
    Some(TextRun {
        text: text.to_string(),
        font_size: raw.font_size,
        is_bold: raw.is_bold || bold_font,
        left_x: raw.left_x,
        page: 0,
        line_index: raw.line_index,
        span_index: raw.span_index,
    })
}

/// Serves documents whose pages were built in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRunSource {
    documents: HashMap<String, Vec<PageRuns>>,
}

impl InMemoryRunSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the pages of a document.
    pub fn insert(&mut self, document_id: impl Into<String>, pages: Vec<PageRuns>) {
        self.documents.insert(document_id.into(), pages);
    }

    /// Builder-style variant of [`InMemoryRunSource::insert`].
    pub fn with_document(mut self, document_id: impl Into<String>, pages: Vec<PageRuns>) -> Self {
        self.insert(document_id, pages);
        self
    }
}

impl TextRunSource for InMemoryRunSource {
    fn load(&self, document_id: &str) -> Result<Vec<PageRuns>, SourceError> {
        self.documents
            .get(document_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(document_id.to_string()))
    }
}
