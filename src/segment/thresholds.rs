//! Font-size thresholds that decide which runs open a heading.

use crate::layout::PageRuns;

/// Fixed title size used when no other value is configured.
pub const DEFAULT_TITLE_SIZE: f32 = 20.0;
/// Fixed H1 size used when no other value is configured.
pub const DEFAULT_H1_SIZE: f32 = 16.0;
/// Fixed H2 size used when no other value is configured.
pub const DEFAULT_H2_SIZE: f32 = 12.0;
/// H1 headings must start left of this offset.
pub const H1_MAX_LEFT_X: f32 = 50.0;
/// H2 headings must start left of this offset.
pub const H2_MAX_LEFT_X: f32 = 100.0;

/// Histogram bucket width in points.
const SIZE_BUCKET: f32 = 0.5;

/// Size and offset limits applied by the first segmentation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingThresholds {
    /// Minimum size of the document title on the first page.
    pub title: f32,
    /// Minimum size of a bold H1 heading.
    pub h1: f32,
    /// Minimum size of a bold H2 heading.
    pub h2: f32,
    /// Exclusive upper bound on an H1 heading's left edge.
    pub h1_max_left_x: f32,
    /// Exclusive upper bound on an H2 heading's left edge.
    pub h2_max_left_x: f32,
}

impl Default for HeadingThresholds {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE_SIZE,
            h1: DEFAULT_H1_SIZE,
            h2: DEFAULT_H2_SIZE,
            h1_max_left_x: H1_MAX_LEFT_X,
            h2_max_left_x: H2_MAX_LEFT_X,
        }
    }
}

/// How thresholds are chosen for each document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdStrategy {
    /// Use the configured thresholds for every document.
    Fixed,
    /// Infer title/H1/H2 sizes from the document's own size distribution.
    Distribution,
}

impl std::str::FromStr for ThresholdStrategy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "distribution" => Ok(Self::Distribution),
            _ => Err(()),
        }
    }
}

impl HeadingThresholds {
    /// Resolve the thresholds for one document under `strategy`.
    pub fn resolve(&self, strategy: ThresholdStrategy, pages: &[PageRuns]) -> Self {
        match strategy {
            ThresholdStrategy::Fixed => *self,
            ThresholdStrategy::Distribution => self.infer_from(pages),
        }
    }

    /// Assign the three largest distinct (bucketed) sizes to title, H1 and H2.
    ///
    /// Ranks the document does not have keep the configured value.
    pub fn infer_from(&self, pages: &[PageRuns]) -> Self {
        let mut buckets: Vec<i32> = pages
            .iter()
            .flat_map(|page| page.runs.iter())
            .filter(|run| run.font_size.is_finite() && run.font_size > 0.0)
            .map(|run| bucket(run.font_size))
            .collect();
        buckets.sort_unstable_by(|a, b| b.cmp(a));
        buckets.dedup();

        let size_at = |idx: usize, fallback: f32| {
            buckets
                .get(idx)
                .map(|key| *key as f32 * SIZE_BUCKET)
                .unwrap_or(fallback)
        };

        let inferred = Self {
            title: size_at(0, self.title),
            h1: size_at(1, self.h1),
            h2: size_at(2, self.h2),
            ..*self
        };
        tracing::debug!(
            title = inferred.title,
            h1 = inferred.h1,
            h2 = inferred.h2,
            distinct_sizes = buckets.len(),
            "Inferred heading thresholds"
        );
        inferred
    }
}

fn bucket(size: f32) -> i32 {
    (size / SIZE_BUCKET).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::TextRun;

    fn pages_with_sizes(sizes: &[f32]) -> Vec<PageRuns> {
        let runs = sizes
            .iter()
            .map(|size| TextRun::new("x", *size, false, 0.0, 1))
            .collect();
        vec![PageRuns::new(1, runs)]
    }

    #[test]
    fn fixed_strategy_ignores_document() {
        let thresholds = HeadingThresholds::default();
        let pages = pages_with_sizes(&[40.0, 30.0, 25.0]);
        assert_eq!(
            thresholds.resolve(ThresholdStrategy::Fixed, &pages),
            thresholds
        );
    }

    #[test]
    fn distribution_strategy_uses_largest_distinct_sizes() {
        let pages = pages_with_sizes(&[10.0, 24.0, 14.1, 18.0, 10.0, 13.9, 24.0]);
        let inferred = HeadingThresholds::default().resolve(ThresholdStrategy::Distribution, &pages);
        assert_eq!(inferred.title, 24.0);
        assert_eq!(inferred.h1, 18.0);
        assert_eq!(inferred.h2, 14.0);
        assert_eq!(inferred.h1_max_left_x, H1_MAX_LEFT_X);
    }

    #[test]
    fn distribution_strategy_falls_back_for_missing_ranks() {
        let pages = pages_with_sizes(&[11.0]);
        let inferred = HeadingThresholds::default().infer_from(&pages);
        assert_eq!(inferred.title, 11.0);
        assert_eq!(inferred.h1, DEFAULT_H1_SIZE);
        assert_eq!(inferred.h2, DEFAULT_H2_SIZE);
    }

    #[test]
    fn strategy_parses_case_insensitively() {
        assert_eq!("Distribution".parse(), Ok(ThresholdStrategy::Distribution));
        assert_eq!(" fixed ".parse(), Ok(ThresholdStrategy::Fixed));
        assert!("adaptive".parse::<ThresholdStrategy>().is_err());
    }
}
