//! Positioned text runs and the sources that produce them.
//!
//! A text run is the smallest styled fragment the layout extractor hands us: a string with its
//! font size, weight, and left edge. Runs arrive grouped by page and must keep their line/span
//! encounter order, because the segmenter's heuristics depend on it.

mod source;

pub use source::{InMemoryRunSource, JsonRunSource, SourceError, TextRunSource};

use serde::{Deserialize, Serialize};

/// A single styled fragment of text emitted by the layout extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// Text content of the run.
    pub text: String,
    /// Font size in points.
    pub font_size: f32,
    /// Whether the run is set in a bold face.
    #[serde(default)]
    pub is_bold: bool,
    /// Left edge of the run's bounding box.
    pub left_x: f32,
    /// One-based page number the run belongs to.
    #[serde(default)]
    pub page: u32,
    /// Index of the line within its block.
    #[serde(default)]
    pub line_index: u32,
    /// Index of the span within its line.
    #[serde(default)]
    pub span_index: u32,
}

impl TextRun {
    /// Build a run with positional indices left at zero.
    pub fn new(text: impl Into<String>, font_size: f32, is_bold: bool, left_x: f32, page: u32) -> Self {
        Self {
            text: text.into(),
            font_size,
            is_bold,
            left_x,
            page,
            line_index: 0,
            span_index: 0,
        }
    }
}

/// All runs of one page, in encounter order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRuns {
    /// One-based page number.
    pub page: u32,
    /// Runs in line-then-span order.
    pub runs: Vec<TextRun>,
}

impl PageRuns {
    /// Group runs under a page, stamping each run with the page number.
    pub fn new(page: u32, runs: Vec<TextRun>) -> Self {
        let runs = runs
            .into_iter()
            .map(|run| TextRun { page, ..run })
            .collect();
        Self { page, runs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_runs_stamps_page_numbers() {
        let page = PageRuns::new(
            3,
            vec![
                TextRun::new("a", 10.0, false, 0.0, 0),
                TextRun::new("b", 10.0, false, 0.0, 7),
            ],
        );
        assert!(page.runs.iter().all(|run| run.page == 3));
    }
}
