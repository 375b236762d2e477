//! Layout-heuristic structural segmentation.
//!
//! Sections are recovered from typography alone: a bold run that is large enough and close
//! enough to the left margin opens a heading. A second pass then splits every section's body
//! into subsections at bulleted or colon-terminated lines. Both passes are pure functions of
//! the runs and the thresholds, so identical input always produces an identical tree.

mod sections;
mod subsections;
mod thresholds;

pub use thresholds::{
    DEFAULT_H1_SIZE, DEFAULT_H2_SIZE, DEFAULT_TITLE_SIZE, H1_MAX_LEFT_X, H2_MAX_LEFT_X,
    HeadingThresholds, ThresholdStrategy,
};

use crate::layout::PageRuns;
use sections::SectionScanner;
use serde::Serialize;

/// Level of a recovered top-level heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeadingLevel {
    /// Large, bold, flush-left heading.
    H1,
    /// Smaller or slightly indented bold heading.
    H2,
}

/// Bullet or phrase-level heading inside a section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubSection {
    /// Text before the first colon of the boundary line, bullet removed.
    pub title: String,
    /// Boundary line followed by the lines under it.
    pub text: String,
    /// Page of the parent section.
    pub page: u32,
}

/// Top-level heading together with its body and subsections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// Heading text.
    pub title: String,
    /// Heading level.
    pub level: HeadingLevel,
    /// Page on which the heading appeared.
    pub page: u32,
    /// Body lines joined by newlines.
    pub text: String,
    /// Subsections in document order.
    pub subsections: Vec<SubSection>,
}

/// Runs both segmentation passes with a fixed threshold configuration.
#[derive(Debug, Clone, Copy)]
pub struct Segmenter {
    thresholds: HeadingThresholds,
    strategy: ThresholdStrategy,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(HeadingThresholds::default(), ThresholdStrategy::Fixed)
    }
}

impl Segmenter {
    /// Build a segmenter. Under [`ThresholdStrategy::Distribution`] the given thresholds are
    /// the fallback for sizes a document does not provide.
    pub fn new(thresholds: HeadingThresholds, strategy: ThresholdStrategy) -> Self {
        Self {
            thresholds,
            strategy,
        }
    }

    /// Thresholds used when no document-specific inference applies.
    pub fn thresholds(&self) -> HeadingThresholds {
        self.thresholds
    }

    /// Recover the section tree of one document.
    pub fn segment(&self, pages: &[PageRuns]) -> Vec<Section> {
        let thresholds = self.thresholds.resolve(self.strategy, pages);
        let mut sections = SectionScanner::new(thresholds).scan(pages);
        for section in &mut sections {
            section.subsections = subsections::split_subsections(&section.text, section.page);
        }
        tracing::debug!(
            sections = sections.len(),
            subsections = sections.iter().map(|s| s.subsections.len()).sum::<usize>(),
            "Segmented document"
        );
        sections
    }
}

/// Segment a document with the default fixed thresholds.
pub fn segment(pages: &[PageRuns]) -> Vec<Section> {
    Segmenter::default().segment(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::TextRun;

    fn travel_guide() -> Vec<PageRuns> {
        vec![
            PageRuns::new(
                1,
                vec![
                    TextRun::new("Guide to the Coast", 24.0, true, 40.0, 1),
                    TextRun::new("Where to Eat", 16.0, true, 20.0, 1),
                    TextRun::new("The harbour has many options.", 10.0, false, 72.0, 1),
                    TextRun::new("• Cafe A: great coffee", 10.0, false, 72.0, 1),
                    TextRun::new("very busy at noon", 10.0, false, 72.0, 1),
                    TextRun::new("• Bistro B: set lunch menu", 10.0, false, 72.0, 1),
                ],
            ),
            PageRuns::new(
                2,
                vec![
                    TextRun::new("Nightlife", 13.0, true, 60.0, 2),
                    TextRun::new("Bars open late.", 10.0, false, 72.0, 2),
                ],
            ),
        ]
    }

    #[test]
    fn builds_nested_tree() {
        let sections = segment(&travel_guide());
        assert_eq!(sections.len(), 2);

        let eat = &sections[0];
        assert_eq!(eat.title, "Where to Eat");
        assert_eq!(eat.level, HeadingLevel::H1);
        assert_eq!(eat.subsections.len(), 2);
        assert_eq!(eat.subsections[0].title, "Cafe A");
        assert_eq!(
            eat.subsections[0].text,
            "• Cafe A: great coffee\nvery busy at noon"
        );
        assert_eq!(eat.subsections[1].title, "Bistro B");

        let night = &sections[1];
        assert_eq!(night.level, HeadingLevel::H2);
        assert_eq!(night.page, 2);
        assert!(night.subsections.is_empty());
    }

    #[test]
    fn overview_scenario() {
        let pages = vec![PageRuns::new(
            1,
            vec![
                TextRun::new("Overview", 18.0, true, 10.0, 1),
                TextRun::new("First plain line", 10.0, false, 72.0, 1),
                TextRun::new("Second plain line", 10.0, false, 72.0, 1),
            ],
        )];
        let sections = segment(&pages);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Overview");
        assert_eq!(sections[0].level, HeadingLevel::H1);
        assert_eq!(sections[0].text, "First plain line\nSecond plain line");
        assert!(sections[0].subsections.is_empty());
    }

    #[test]
    fn segmentation_is_deterministic() {
        let pages = travel_guide();
        assert_eq!(segment(&pages), segment(&pages));
    }

    #[test]
    fn every_section_has_title_and_text() {
        for section in segment(&travel_guide()) {
            assert!(!section.title.is_empty());
            assert!(!section.text.is_empty());
        }
    }

    #[test]
    fn distribution_strategy_adapts_to_small_fonts() {
        let pages = vec![PageRuns::new(
            1,
            vec![
                TextRun::new("Small Title", 14.0, true, 10.0, 1),
                TextRun::new("Heading", 11.0, true, 10.0, 1),
                TextRun::new("body", 9.0, false, 72.0, 1),
                TextRun::new("more body", 8.0, false, 72.0, 1),
            ],
        )];
        let fixed = segment(&pages);
        assert_eq!(fixed.len(), 1);
        assert_eq!(fixed[0].title, "Small Title");
        assert_eq!(fixed[0].level, HeadingLevel::H2);

        let adaptive = Segmenter::new(HeadingThresholds::default(), ThresholdStrategy::Distribution);
        let sections = adaptive.segment(&pages);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Heading");
        assert_eq!(sections[0].text, "body\nmore body");
    }
}
