//! Persona-relevance scoring.
//!
//! A run embeds the persona and task once into a [`Query`]; every section, subsection, and
//! sentence is then scored by cosine similarity against that fixed vector. Scores are clamped
//! into `[0, 1]` and degrade to `0.0` whenever text or embeddings are missing.

mod refine;

pub use refine::{ExcerptRefiner, split_sentences};

use crate::embedding::{Embedded, EmbeddingService};
use std::sync::Arc;

/// Embedded persona + task, fixed for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct Query {
    text: String,
    vector: Embedded<Vec<f32>>,
}

impl Query {
    /// Text embedded for a persona and task.
    pub fn text_for(persona: &str, job: &str) -> String {
        format!("Persona: {}. Task: {}.", persona.trim(), job.trim())
    }

    /// Embed the persona and task. An unavailable provider yields an unavailable query.
    pub async fn build(embeddings: &EmbeddingService, persona: &str, job: &str) -> Self {
        let text = Self::text_for(persona, job);
        let vector = embeddings.embed(&text).await;
        if !vector.is_ready() {
            tracing::warn!("Could not embed query; relevance scores will be neutral");
        }
        Self { text, vector }
    }

    /// Query text that was embedded.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Query vector, when the provider produced one.
    pub fn vector(&self) -> Option<&[f32]> {
        self.vector.as_ready().map(Vec::as_slice)
    }
}

/// Cosine similarity; `0.0` for mismatched lengths or zero-norm vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }
    dot / denom
}

/// Map a raw similarity into `[0, 1]`; negative and non-finite values become `0.0`.
pub(crate) fn clamp_score(similarity: f32) -> f32 {
    if similarity.is_finite() {
        similarity.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Scores arbitrary text against the run's query.
#[derive(Clone)]
pub struct RelevanceScorer {
    embeddings: Arc<EmbeddingService>,
    query: Arc<Query>,
}

impl RelevanceScorer {
    /// Build a scorer sharing the run's embedding service and query.
    pub fn new(embeddings: Arc<EmbeddingService>, query: Arc<Query>) -> Self {
        Self { embeddings, query }
    }

    /// Query this scorer compares against.
    pub fn query(&self) -> &Arc<Query> {
        &self.query
    }

    /// Relevance of `text` in `[0, 1]`; `0.0` for empty text or when embeddings are unavailable.
    pub async fn score(&self, text: &str) -> f32 {
        let Some(query) = self.query.vector() else {
            return 0.0;
        };
        if text.trim().is_empty() {
            return 0.0;
        }
        match self.embeddings.embed(text).await {
            Embedded::Ready(vector) => clamp_score(cosine_similarity(query, &vector)),
            Embedded::Unavailable { reason } => {
                tracing::debug!(%reason, "Scoring degraded to neutral");
                0.0
            }
        }
    }

    /// Score many texts with a single provider call. Output order matches input order.
    pub async fn score_batch(&self, texts: &[String]) -> Vec<f32> {
        let mut scores = vec![0.0; texts.len()];
        let Some(query) = self.query.vector() else {
            return scores;
        };

        let (positions, pending): (Vec<usize>, Vec<String>) = texts
            .iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(idx, text)| (idx, text.clone()))
            .unzip();

        match self.embeddings.embed_batch(&pending).await {
            Embedded::Ready(vectors) => {
                for (idx, vector) in positions.into_iter().zip(vectors) {
                    scores[idx] = clamp_score(cosine_similarity(query, &vector));
                }
            }
            Embedded::Unavailable { reason } => {
                tracing::debug!(%reason, inputs = pending.len(), "Batch scoring degraded to neutral");
            }
        }
        scores
    }
}
