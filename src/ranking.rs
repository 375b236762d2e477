//! Global ranking: merge scored units from every document into a dense top-K list.
//!
//! Ordering is by score alone, descending. The sort is stable, so items with equal scores keep
//! their accumulation order (document-processing order, then in-document order). Ranking runs
//! once, after all documents have contributed to the pool.

use serde::Serialize;

/// A unit of text and its relevance, tagged with the document it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredItem<U> {
    /// Identifier of the source document.
    pub document_id: String,
    /// The scored unit (section or subsection entry).
    pub unit: U,
    /// Relevance in `[0, 1]`.
    pub score: f32,
}

/// A unit placed in the final ordering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult<U> {
    /// Identifier of the source document.
    pub document_id: String,
    /// The ranked unit.
    pub unit: U,
    /// Relevance that determined the placement.
    pub score: f32,
    /// One-based position in the ranking.
    pub rank: usize,
}

/// Accumulates scored items in encounter order until ranking.
#[derive(Debug, Clone)]
pub struct RankingPool<U> {
    items: Vec<ScoredItem<U>>,
}

impl<U> Default for RankingPool<U> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<U> RankingPool<U> {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append items, preserving their order.
    pub fn extend(&mut self, items: impl IntoIterator<Item = ScoredItem<U>>) {
        self.items.extend(items);
    }

    /// Number of items accumulated so far.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume the pool and rank it.
    pub fn rank(self, top_k: usize) -> Vec<RankedResult<U>> {
        rank(self.items, top_k)
    }
}

/// Stable-sort by score descending, keep the first `top_k`, and number them from 1.
pub fn rank<U>(mut items: Vec<ScoredItem<U>>, top_k: usize) -> Vec<RankedResult<U>> {
    items.sort_by(|a, b| b.score.total_cmp(&a.score));
    items
        .into_iter()
        .take(top_k)
        .enumerate()
        .map(|(idx, item)| RankedResult {
            document_id: item.document_id,
            unit: item.unit,
            score: item.score,
            rank: idx + 1,
        })
        .collect()
}
