//! First pass: split a document's runs into top-level sections.

use super::{HeadingLevel, HeadingThresholds, Section};
use crate::layout::{PageRuns, TextRun};

/// A section whose heading has been seen but which has not been emitted yet.
#[derive(Debug)]
struct OpenSection {
    title: String,
    level: HeadingLevel,
    page: u32,
    lines: Vec<String>,
}

impl OpenSection {
    /// Emit the section, or `None` when it has no title or no body lines.
    fn close(self) -> Option<Section> {
        let title = self.title.trim();
        let text = self.lines.join("\n");
        let text = text.trim();
        if title.is_empty() || text.is_empty() {
            tracing::trace!(title = %self.title, page = self.page, "Dropping section without body");
            return None;
        }
        Some(Section {
            title: title.to_string(),
            level: self.level,
            page: self.page,
            text: text.to_string(),
            subsections: Vec::new(),
        })
    }
}

#[derive(Debug)]
enum SectionState {
    NoSection,
    InSection(OpenSection),
}

/// Pass-1 state machine. Feed runs in encounter order, then call [`SectionScanner::finish`].
pub(crate) struct SectionScanner {
    thresholds: HeadingThresholds,
    state: SectionState,
    /// First page of the document; only runs there may be the document title.
    title_page: Option<u32>,
    opened_any: bool,
    sections: Vec<Section>,
}

impl SectionScanner {
    pub(crate) fn new(thresholds: HeadingThresholds) -> Self {
        Self {
            thresholds,
            state: SectionState::NoSection,
            title_page: None,
            opened_any: false,
            sections: Vec::new(),
        }
    }

    pub(crate) fn scan(mut self, pages: &[PageRuns]) -> Vec<Section> {
        self.title_page = pages.first().map(|page| page.page);
        for page in pages {
            for run in &page.runs {
                self.accept(page.page, run);
            }
        }
        self.finish()
    }

    fn accept(&mut self, page: u32, run: &TextRun) {
        let text = run.text.trim();
        if text.is_empty() {
            return;
        }

        if self.title_page == Some(page)
            && !self.opened_any
            && run.font_size >= self.thresholds.title
        {
            tracing::trace!(text, "Skipping document title run");
            return;
        }

        if let Some(level) = self.heading_level(run) {
            self.open(text, level, page);
            return;
        }

        if let SectionState::InSection(open) = &mut self.state {
            open.lines.push(text.to_string());
        }
    }

    fn heading_level(&self, run: &TextRun) -> Option<HeadingLevel> {
        if !run.is_bold {
            return None;
        }
        let t = &self.thresholds;
        if run.font_size >= t.h1 && run.left_x < t.h1_max_left_x {
            Some(HeadingLevel::H1)
        } else if run.font_size >= t.h2 && run.left_x < t.h2_max_left_x {
            Some(HeadingLevel::H2)
        } else {
            None
        }
    }

    fn open(&mut self, title: &str, level: HeadingLevel, page: u32) {
        self.close_current();
        self.opened_any = true;
        self.state = SectionState::InSection(OpenSection {
            title: title.to_string(),
            level,
            page,
            lines: Vec::new(),
        });
    }

    fn close_current(&mut self) {
        let state = std::mem::replace(&mut self.state, SectionState::NoSection);
        if let SectionState::InSection(open) = state {
            self.sections.extend(open.close());
        }
    }

    fn finish(mut self) -> Vec<Section> {
        self.close_current();
        self.sections
    }
}
