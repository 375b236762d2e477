//! Core data types and error definitions for the ranking pipeline.

use crate::{
    config::Config,
    layout::SourceError,
    metrics::MetricsSnapshot,
    ranking::RankedResult,
    segment::HeadingLevel,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors emitted by the ranking pipeline.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// A document's text runs could not be loaded.
    #[error("Failed to load document: {0}")]
    Source(#[from] SourceError),
    /// The persona/job file could not be read.
    #[error("failed to read persona/job input {path}: {source}")]
    ReadInput {
        /// File we attempted to read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The persona/job input was not valid JSON in a supported shape.
    #[error("Invalid persona/job input: {0}")]
    InvalidInput(#[from] serde_json::Error),
    /// Neither a persona nor a job was supplied.
    #[error("persona/job input names neither a persona nor a job")]
    EmptyPersonaJob,
}

/// Who the ranking is for, what they need, and which documents to read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonaJob {
    /// Persona description (role).
    pub persona: String,
    /// Job to be done (task).
    pub job: String,
    /// Documents in processing order.
    pub documents: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PersonaJobFile {
    Structured {
        persona: RoleField,
        job_to_be_done: TaskField,
        #[serde(default)]
        documents: Vec<DocumentName>,
    },
    Flat {
        #[serde(default)]
        persona: String,
        #[serde(default)]
        job: String,
        #[serde(default)]
        documents: Vec<DocumentName>,
    },
}

#[derive(Deserialize)]
struct RoleField {
    #[serde(default)]
    role: String,
}

#[derive(Deserialize)]
struct TaskField {
    #[serde(default)]
    task: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentName {
    Name(String),
    Entry { filename: String },
}

impl DocumentName {
    fn into_name(self) -> String {
        match self {
            Self::Name(name) | Self::Entry { filename: name } => name,
        }
    }
}

impl PersonaJob {
    /// Build an input directly.
    pub fn new(persona: impl Into<String>, job: impl Into<String>, documents: Vec<String>) -> Self {
        Self {
            persona: persona.into(),
            job: job.into(),
            documents,
        }
    }

    /// Parse either `{"persona": {"role"}, "job_to_be_done": {"task"}, "documents": [{"filename"}]}`
    /// or the flat `{"persona", "job", "documents": [..]}` form.
    pub fn from_json_str(content: &str) -> Result<Self, ProcessingError> {
        let file: PersonaJobFile = serde_json::from_str(content)?;
        let (persona, job, documents) = match file {
            PersonaJobFile::Structured {
                persona,
                job_to_be_done,
                documents,
            } => (persona.role, job_to_be_done.task, documents),
            PersonaJobFile::Flat {
                persona,
                job,
                documents,
            } => (persona, job, documents),
        };

        let persona = persona.trim().to_string();
        let job = job.trim().to_string();
        if persona.is_empty() && job.is_empty() {
            return Err(ProcessingError::EmptyPersonaJob);
        }
        let documents = documents
            .into_iter()
            .map(DocumentName::into_name)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        Ok(Self {
            persona,
            job,
            documents,
        })
    }

    /// Read and parse a persona/job file.
    pub fn load(path: &Path) -> Result<Self, ProcessingError> {
        let content = std::fs::read_to_string(path).map_err(|source| ProcessingError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }
}

/// Pool sizes and excerpt length for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingSettings {
    /// Sections kept in the global ranking.
    pub section_top_k: usize,
    /// Subsections kept in the global ranking.
    pub subsection_top_k: usize,
    /// Maximum sentences per refined excerpt.
    pub excerpt_max_sentences: usize,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            section_top_k: 5,
            subsection_top_k: 5,
            excerpt_max_sentences: 3,
        }
    }
}

impl From<&Config> for RankingSettings {
    fn from(config: &Config) -> Self {
        Self {
            section_top_k: config.section_top_k,
            subsection_top_k: config.subsection_top_k,
            excerpt_max_sentences: config.excerpt_max_sentences,
        }
    }
}

/// Section as it enters the section pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionEntry {
    /// Heading text.
    pub title: String,
    /// Heading level.
    pub level: HeadingLevel,
    /// Page of the heading.
    pub page: u32,
}

/// Subsection as it enters the subsection pool, carrying its refined excerpt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubSectionEntry {
    /// Subsection title.
    pub title: String,
    /// Excerpt produced by the refiner.
    pub refined_text: String,
    /// Page inherited from the parent section.
    pub page: u32,
}

/// Result of a full run over all documents.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// Global top-K sections.
    pub sections: Vec<RankedResult<SectionEntry>>,
    /// Global top-K subsections.
    pub subsections: Vec<RankedResult<SubSectionEntry>>,
    /// Documents skipped because they failed to load.
    pub failed_documents: Vec<String>,
    /// Counters for the run.
    pub metrics: MetricsSnapshot,
}
