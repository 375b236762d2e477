//! Processing service coordinating segmentation, scoring, refinement, and ranking.

use crate::{
    embedding::EmbeddingService,
    layout::TextRunSource,
    metrics::RunMetrics,
    processing::types::{
        AnalysisOutcome, PersonaJob, ProcessingError, RankingSettings, SectionEntry,
        SubSectionEntry,
    },
    ranking::{RankingPool, ScoredItem},
    relevance::{ExcerptRefiner, Query, RelevanceScorer},
    segment::Segmenter,
};
use std::sync::Arc;

/// Runs the full pipeline over a persona/job input.
///
/// The service owns the embedding service and segmenter so a single instance can serve many
/// runs. Each run embeds its own query, processes documents strictly in input order, and ranks
/// the two pools only after every document has been handled.
pub struct ProcessingService {
    embeddings: Arc<EmbeddingService>,
    segmenter: Segmenter,
    settings: RankingSettings,
}

/// Everything one document adds to the pools.
struct DocumentContribution {
    sections: Vec<ScoredItem<SectionEntry>>,
    subsections: Vec<ScoredItem<SubSectionEntry>>,
}

/// Run-scoped components built from the query.
struct RunContext {
    scorer: RelevanceScorer,
    refiner: ExcerptRefiner,
}

impl ProcessingService {
    /// Build a service over an embedding service and segmenter.
    pub fn new(
        embeddings: Arc<EmbeddingService>,
        segmenter: Segmenter,
        settings: RankingSettings,
    ) -> Self {
        Self {
            embeddings,
            segmenter,
            settings,
        }
    }

    /// Segment, score, and rank every document named by `request`.
    ///
    /// A document that fails to load is logged and skipped; it contributes nothing to either
    /// pool. Scoring never fails: an unavailable provider yields neutral scores and unrefined
    /// excerpts.
    pub async fn analyze<S>(&self, request: &PersonaJob, source: &S) -> AnalysisOutcome
    where
        S: TextRunSource + ?Sized,
    {
        tracing::info!(
            persona = %request.persona,
            job = %request.job,
            documents = request.documents.len(),
            "Starting ranking run"
        );
        let query = Arc::new(Query::build(&self.embeddings, &request.persona, &request.job).await);
        let context = RunContext {
            scorer: RelevanceScorer::new(self.embeddings.clone(), query.clone()),
            refiner: ExcerptRefiner::new(
                self.embeddings.clone(),
                query,
                self.settings.excerpt_max_sentences,
            ),
        };

        let metrics = RunMetrics::new();
        let mut section_pool = RankingPool::new();
        let mut subsection_pool = RankingPool::new();
        let mut failed_documents = Vec::new();

        for document_id in &request.documents {
            match self.process_document(document_id, source, &context).await {
                Ok(contribution) => {
                    metrics.record_document(
                        contribution.sections.len() as u64,
                        contribution.subsections.len() as u64,
                    );
                    section_pool.extend(contribution.sections);
                    subsection_pool.extend(contribution.subsections);
                }
                Err(error) => {
                    tracing::warn!(document = %document_id, error = %error, "Skipping document");
                    metrics.record_failure();
                    failed_documents.push(document_id.clone());
                }
            }
        }

        let pooled_sections = section_pool.len();
        let pooled_subsections = subsection_pool.len();
        let sections = section_pool.rank(self.settings.section_top_k);
        let subsections = subsection_pool.rank(self.settings.subsection_top_k);
        let snapshot = metrics.snapshot();

        tracing::info!(
            documents_processed = snapshot.documents_processed,
            documents_failed = snapshot.documents_failed,
            pooled_sections,
            pooled_subsections,
            ranked_sections = sections.len(),
            ranked_subsections = subsections.len(),
            "Ranking run complete"
        );

        AnalysisOutcome {
            sections,
            subsections,
            failed_documents,
            metrics: snapshot,
        }
    }

    async fn process_document<S>(
        &self,
        document_id: &str,
        source: &S,
        context: &RunContext,
    ) -> Result<DocumentContribution, ProcessingError>
    where
        S: TextRunSource + ?Sized,
    {
        tracing::info!(document = document_id, "Processing document");
        let pages = source.load(document_id)?;
        let sections = self.segmenter.segment(&pages);

        let section_texts: Vec<String> = sections.iter().map(|s| s.text.clone()).collect();
        let section_scores = context.scorer.score_batch(&section_texts).await;

        let subsection_texts: Vec<String> = sections
            .iter()
            .flat_map(|section| section.subsections.iter().map(|sub| sub.text.clone()))
            .collect();
        let subsection_scores = context.scorer.score_batch(&subsection_texts).await;

        let mut subsections = Vec::with_capacity(subsection_texts.len());
        let flattened = sections.iter().flat_map(|section| section.subsections.iter());
        for (sub, score) in flattened.zip(subsection_scores) {
            let refined_text = context.refiner.refine(&sub.text).await;
            subsections.push(ScoredItem {
                document_id: document_id.to_string(),
                unit: SubSectionEntry {
                    title: sub.title.clone(),
                    refined_text,
                    page: sub.page,
                },
                score,
            });
        }

        let sections: Vec<ScoredItem<SectionEntry>> = sections
            .into_iter()
            .zip(section_scores)
            .map(|(section, score)| ScoredItem {
                document_id: document_id.to_string(),
                unit: SectionEntry {
                    title: section.title,
                    level: section.level,
                    page: section.page,
                },
                score,
            })
            .collect();

        tracing::debug!(
            document = document_id,
            sections = sections.len(),
            subsections = subsections.len(),
            "Document scored"
        );
        Ok(DocumentContribution {
            sections,
            subsections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{DisabledEmbeddingClient, HashingEmbeddingClient};
    use crate::layout::{InMemoryRunSource, PageRuns, TextRun};

    fn guide(heading: &str, body: &[&str]) -> Vec<PageRuns> {
        let mut runs = vec![TextRun::new(heading, 16.0, true, 20.0, 1)];
        runs.extend(body.iter().map(|line| TextRun::new(*line, 10.0, false, 72.0, 1)));
        vec![PageRuns::new(1, runs)]
    }

    fn service(client: Box<dyn crate::embedding::EmbeddingClient + Send + Sync>) -> ProcessingService {
        ProcessingService::new(
            Arc::new(EmbeddingService::new(client)),
            Segmenter::default(),
            RankingSettings::default(),
        )
    }

    #[tokio::test]
    async fn failing_document_contributes_nothing() {
        let source = InMemoryRunSource::new().with_document(
            "food.pdf",
            guide("Eating Out", &["• Market: cheap food stalls", "open daily."]),
        );
        let request = PersonaJob::new(
            "Budget traveler",
            "find cheap food",
            vec!["missing.pdf".into(), "food.pdf".into()],
        );

        let outcome = service(Box::new(HashingEmbeddingClient::new(64)))
            .analyze(&request, &source)
            .await;

        assert_eq!(outcome.failed_documents, vec!["missing.pdf".to_string()]);
        assert_eq!(outcome.metrics.documents_processed, 1);
        assert_eq!(outcome.metrics.documents_failed, 1);
        assert!(outcome.sections.iter().all(|r| r.document_id == "food.pdf"));
        assert_eq!(outcome.sections.len(), 1);
        assert_eq!(outcome.subsections.len(), 1);
        assert_eq!(outcome.subsections[0].unit.title, "Market");
    }

    #[tokio::test]
    async fn unavailable_embeddings_keep_encounter_order() {
        let source = InMemoryRunSource::new()
            .with_document("a.pdf", guide("Alpha", &["first body."]))
            .with_document("b.pdf", guide("Beta", &["• Tip: second body. More detail."]));
        let request = PersonaJob::new("p", "j", vec!["a.pdf".into(), "b.pdf".into()]);

        let outcome = service(Box::new(DisabledEmbeddingClient))
            .analyze(&request, &source)
            .await;

        let titles: Vec<_> = outcome.sections.iter().map(|r| r.unit.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Beta"]);
        assert!(outcome.sections.iter().all(|r| r.score == 0.0));
        assert_eq!(
            outcome.subsections[0].unit.refined_text,
            "• Tip: second body. More detail."
        );
    }

    #[tokio::test]
    async fn empty_document_yields_no_units() {
        let source = InMemoryRunSource::new().with_document("blank.pdf", Vec::new());
        let request = PersonaJob::new("p", "j", vec!["blank.pdf".into()]);
        let outcome = service(Box::new(HashingEmbeddingClient::new(16)))
            .analyze(&request, &source)
            .await;
        assert!(outcome.sections.is_empty());
        assert!(outcome.subsections.is_empty());
        assert!(outcome.failed_documents.is_empty());
        assert_eq!(outcome.metrics.documents_processed, 1);
    }
}
