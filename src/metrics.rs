use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing a ranking run.
#[derive(Default)]
pub struct RunMetrics {
    documents_processed: AtomicU64,
    documents_failed: AtomicU64,
    sections_extracted: AtomicU64,
    subsections_extracted: AtomicU64,
}

impl RunMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a segmented document and the units it contributed.
    pub fn record_document(&self, sections: u64, subsections: u64) {
        self.documents_processed.fetch_add(1, Ordering::Relaxed);
        self.sections_extracted
            .fetch_add(sections, Ordering::Relaxed);
        self.subsections_extracted
            .fetch_add(subsections, Ordering::Relaxed);
    }

    /// Record a document that could not be loaded.
    pub fn record_failure(&self) {
        self.documents_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_processed: self.documents_processed.load(Ordering::Relaxed),
            documents_failed: self.documents_failed.load(Ordering::Relaxed),
            sections_extracted: self.sections_extracted.load(Ordering::Relaxed),
            subsections_extracted: self.subsections_extracted.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of run counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents segmented and scored.
    pub documents_processed: u64,
    /// Documents skipped because their runs could not be loaded.
    pub documents_failed: u64,
    /// Sections added to the ranking pool.
    pub sections_extracted: u64,
    /// Subsections added to the ranking pool.
    pub subsections_extracted: u64,
}
