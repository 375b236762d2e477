//! Ranking pipeline: segmentation, relevance scoring, excerpt refinement, and global ranking.

mod service;
pub mod types;

pub use service::ProcessingService;
pub use types::{
    AnalysisOutcome, PersonaJob, ProcessingError, RankingSettings, SectionEntry, SubSectionEntry,
};
