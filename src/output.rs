//! JSON report describing a ranking run.

use crate::processing::{AnalysisOutcome, PersonaJob};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Errors raised while writing a report.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The report could not be serialized.
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The report file could not be written.
    #[error("failed to write report {path}: {source}")]
    Write {
        /// Destination we attempted to write.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// Consolidated run report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Run inputs and timestamp.
    pub metadata: ReportMetadata,
    /// Globally ranked sections.
    pub extracted_sections: Vec<ExtractedSection>,
    /// Globally ranked subsections with refined excerpts.
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

/// Inputs the report was produced from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetadata {
    /// Documents named by the persona/job input, in processing order.
    pub input_documents: Vec<String>,
    /// Persona description.
    pub persona: String,
    /// Job to be done.
    pub job_to_be_done: String,
    /// RFC 3339 UTC time the report was built.
    pub processing_timestamp: String,
}

/// One entry of `extracted_sections`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedSection {
    /// Source document.
    pub document: String,
    /// Section heading.
    pub section_title: String,
    /// One-based global rank.
    pub importance_rank: usize,
    /// Page of the heading.
    pub page_number: u32,
}

/// One entry of `subsection_analysis`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubsectionAnalysis {
    /// Source document.
    pub document: String,
    /// Refined excerpt.
    pub refined_text: String,
    /// Page inherited from the parent section.
    pub page_number: u32,
}

impl AnalysisReport {
    /// Build a report stamped with the current time.
    pub fn new(request: &PersonaJob, outcome: &AnalysisOutcome) -> Self {
        Self::with_timestamp(request, outcome, current_timestamp_rfc3339())
    }

    /// Build a report with an explicit timestamp.
    pub fn with_timestamp(
        request: &PersonaJob,
        outcome: &AnalysisOutcome,
        processing_timestamp: String,
    ) -> Self {
        let extracted_sections = outcome
            .sections
            .iter()
            .map(|ranked| ExtractedSection {
                document: ranked.document_id.clone(),
                section_title: ranked.unit.title.clone(),
                importance_rank: ranked.rank,
                page_number: ranked.unit.page,
            })
            .collect();
        let subsection_analysis = outcome
            .subsections
            .iter()
            .map(|ranked| SubsectionAnalysis {
                document: ranked.document_id.clone(),
                refined_text: ranked.unit.refined_text.clone(),
                page_number: ranked.unit.page,
            })
            .collect();

        Self {
            metadata: ReportMetadata {
                input_documents: request.documents.clone(),
                persona: request.persona.clone(),
                job_to_be_done: request.job.clone(),
                processing_timestamp,
            },
            extracted_sections,
            subsection_analysis,
        }
    }

    /// Pretty-printed JSON rendering.
    pub fn to_json_pretty(&self) -> Result<String, OutputError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report to `path`, creating parent directories as needed.
    pub fn write_to(&self, path: &Path) -> Result<(), OutputError> {
        let json = self.to_json_pretty()?;
        let write_error = |source| OutputError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(path, json).map_err(write_error)?;
        tracing::info!(path = %path.display(), "Report written");
        Ok(())
    }
}

fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
