use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use sectionrank::{
    config, embedding,
    layout::JsonRunSource,
    logging,
    output::AnalysisReport,
    processing::{PersonaJob, ProcessingService, RankingSettings},
    segment::Segmenter,
};

#[derive(Parser)]
#[command(
    name = "sectionrank",
    about = "Rank document sections and excerpts for a persona and task"
)]
struct Cli {
    /// Directory holding the persona/job file and `<stem>.runs.json` files.
    #[arg(long)]
    input_dir: Option<PathBuf>,
    /// Directory receiving the report.
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Persona/job file; defaults to `<input-dir>/persona_job.json`.
    #[arg(long)]
    persona_job: Option<PathBuf>,
    /// Report file name inside the output directory.
    #[arg(long, default_value = "consolidated_output.json")]
    output_file: String,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    config::init_config().context("failed to load configuration")?;
    logging::init_tracing();
    let config = config::get_config();

    let input_dir = cli.input_dir.unwrap_or_else(|| config.input_dir.clone());
    let output_dir = cli.output_dir.unwrap_or_else(|| config.output_dir.clone());
    let persona_job_path = cli
        .persona_job
        .unwrap_or_else(|| input_dir.join("persona_job.json"));

    let mut request = PersonaJob::load(&persona_job_path)
        .with_context(|| format!("failed to load {}", persona_job_path.display()))?;
    let source = JsonRunSource::new(input_dir.clone());
    if request.documents.is_empty() {
        request.documents = source.discover();
        tracing::info!(
            documents = request.documents.len(),
            input_dir = %input_dir.display(),
            "No documents listed; using discovered text-run files"
        );
    }

    let client = embedding::get_embedding_client(config)
        .context("failed to build embedding client")?;
    let service = ProcessingService::new(
        Arc::new(embedding::EmbeddingService::new(client)),
        Segmenter::new(config.heading_thresholds(), config.heading_strategy),
        RankingSettings::from(config),
    );

    let outcome = service.analyze(&request, &source).await;
    let report = AnalysisReport::new(&request, &outcome);
    let output_path = output_dir.join(&cli.output_file);
    report
        .write_to(&output_path)
        .with_context(|| format!("failed to write {}", output_path.display()))?;

    tracing::info!(
        sections = report.extracted_sections.len(),
        subsections = report.subsection_analysis.len(),
        failed = outcome.failed_documents.len(),
        output = %output_path.display(),
        "Ranking report complete"
    );
    Ok(())
}
