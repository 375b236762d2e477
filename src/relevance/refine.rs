//! Sentence-level excerpt refinement.

use super::{Query, clamp_score, cosine_similarity};
use crate::embedding::{Embedded, EmbeddingService};
use regex::Regex;
use std::sync::{Arc, LazyLock};

/// Terminal punctuation (plus closing quotes/brackets) followed by whitespace.
static SENTENCE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([.!?]+["'”’)\]]*)\s+"#).expect("sentence break pattern is valid")
});

/// Split text into sentences at terminal punctuation.
///
/// Sentences keep their punctuation, have internal whitespace collapsed to single spaces, and
/// empty fragments are dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for captures in SENTENCE_BREAK.captures_iter(text) {
        let (Some(whole), Some(terminal)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        push_sentence(&mut sentences, &text[start..terminal.end()]);
        start = whole.end();
    }
    push_sentence(&mut sentences, &text[start..]);
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, fragment: &str) {
    let normalized = fragment.split_whitespace().collect::<Vec<_>>().join(" ");
    if !normalized.is_empty() {
        sentences.push(normalized);
    }
}

/// Condenses a text block to its sentences most relevant to the query.
#[derive(Clone)]
pub struct ExcerptRefiner {
    embeddings: Arc<EmbeddingService>,
    query: Arc<Query>,
    max_sentences: usize,
}

impl ExcerptRefiner {
    /// Build a refiner keeping at most `max_sentences` sentences per excerpt.
    pub fn new(embeddings: Arc<EmbeddingService>, query: Arc<Query>, max_sentences: usize) -> Self {
        Self {
            embeddings,
            query,
            max_sentences: max_sentences.max(1),
        }
    }

    /// Keep the top-scoring sentences of `text`, restored to their original order.
    ///
    /// - Provider or query unavailable: `text` is returned unchanged.
    /// - No sentences: empty string.
    /// - No sentence scores above zero: the first sentence.
    pub async fn refine(&self, text: &str) -> String {
        let Some(query) = self.query.vector() else {
            return text.to_string();
        };

        let mut sentences = split_sentences(text);
        if sentences.is_empty() {
            return String::new();
        }

        let vectors = match self.embeddings.embed_batch(&sentences).await {
            Embedded::Ready(vectors) => vectors,
            Embedded::Unavailable { reason } => {
                tracing::debug!(%reason, "Refinement skipped; returning text unchanged");
                return text.to_string();
            }
        };
        let scores: Vec<f32> = vectors
            .iter()
            .map(|vector| clamp_score(cosine_similarity(query, vector)))
            .collect();

        if scores.iter().all(|score| *score <= 0.0) {
            return sentences.swap_remove(0);
        }

        // Stable sort: equal scores keep the earlier sentence first.
        let mut selected: Vec<usize> = (0..sentences.len()).collect();
        selected.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        selected.truncate(self.max_sentences);
        selected.sort_unstable();

        tracing::trace!(
            sentences = sentences.len(),
            kept = selected.len(),
            "Refined excerpt"
        );
        selected
            .into_iter()
            .map(|idx| sentences[idx].as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{
        DisabledEmbeddingClient, EmbeddingClient, EmbeddingClientError, HashingEmbeddingClient,
    };
    use async_trait::async_trait;

    /// Query points along x; sentences mentioning "food" align with it, "museum" opposes it.
    struct KeywordClient;

    #[async_trait]
    impl EmbeddingClient for KeywordClient {
        async fn generate_embeddings(
            &self,
            texts: Vec<String>,
        ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
            Ok(texts
                .iter()
                .map(|text| {
                    if text.starts_with("Persona:") {
                        vec![1.0, 0.0]
                    } else if text.contains("food") {
                        let weight = text.matches("food").count() as f32;
                        vec![weight, 1.0]
                    } else if text.contains("museum") {
                        vec![-1.0, 0.2]
                    } else {
                        vec![0.0, 1.0]
                    }
                })
                .collect())
        }
    }

    async fn refiner_with(client: Box<dyn EmbeddingClient + Send + Sync>) -> ExcerptRefiner {
        let embeddings = Arc::new(EmbeddingService::new(client));
        let query = Query::build(&embeddings, "Budget traveler", "find cheap food").await;
        ExcerptRefiner::new(embeddings, Arc::new(query), 3)
    }

    #[test]
    fn splits_on_terminal_punctuation() {
        let sentences = split_sentences("One. Two!  Three?\nFour \"quoted.\" Five");
        assert_eq!(
            sentences,
            vec!["One.", "Two!", "Three?", "Four \"quoted.\"", "Five"]
        );
        assert!(split_sentences("  \n ").is_empty());
        assert_eq!(split_sentences("v1.2 is out"), vec!["v1.2 is out"]);
    }

    #[test]
    fn sentences_collapse_internal_whitespace() {
        assert_eq!(
            split_sentences("• Cafe A: great\ncoffee. Busy"),
            vec!["• Cafe A: great coffee.", "Busy"]
        );
    }

    #[tokio::test]
    async fn keeps_top_sentences_in_document_order() {
        let refiner = refiner_with(Box::new(KeywordClient)).await;
        let text = "Intro here. Street food food is cheap. A museum opens. \
                    Local food markets. Parks are green. Food food food trucks.";
        let refined = refiner.refine(text).await;
        assert_eq!(
            refined,
            "Street food food is cheap. Local food markets. Food food food trucks."
        );
    }

    #[tokio::test]
    async fn falls_back_to_first_sentence_when_nothing_scores() {
        let refiner = refiner_with(Box::new(KeywordClient)).await;
        let refined = refiner.refine("A museum opens. Another museum closes.").await;
        assert_eq!(refined, "A museum opens.");
    }

    #[tokio::test]
    async fn empty_and_whitespace_text_yield_empty() {
        let refiner = refiner_with(Box::new(KeywordClient)).await;
        assert_eq!(refiner.refine("").await, "");
        assert_eq!(refiner.refine(" \n ").await, "");
    }

    #[tokio::test]
    async fn unavailable_provider_returns_input() {
        let refiner = refiner_with(Box::new(DisabledEmbeddingClient)).await;
        let text = "Some text.\nWith lines.";
        assert_eq!(refiner.refine(text).await, text);
    }

    #[tokio::test]
    async fn refining_twice_keeps_a_subset_in_order() {
        let refiner = refiner_with(Box::new(HashingEmbeddingClient::new(64))).await;
        let text = "Cheap food stalls line the harbour. The castle dates from 1200. \
                    Students find cheap food near campus. Trains leave hourly. \
                    Budget travelers love the night market food.";
        let original = split_sentences(text);
        let once = refiner.refine(text).await;
        let twice = refiner.refine(&once).await;

        let mut cursor = 0;
        for sentence in split_sentences(&twice) {
            let found = original[cursor..]
                .iter()
                .position(|candidate| *candidate == sentence)
                .expect("refined sentence comes from the original");
            cursor += found + 1;
        }
        assert!(split_sentences(&once).len() <= 3);
    }
}
