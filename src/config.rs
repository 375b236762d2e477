use crate::segment::{
    DEFAULT_H1_SIZE, DEFAULT_H2_SIZE, DEFAULT_TITLE_SIZE, HeadingThresholds, ThresholdStrategy,
};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";
const DEFAULT_EMBEDDING_DIMENSION: usize = 384;
const DEFAULT_TOP_K: usize = 5;
const DEFAULT_EXCERPT_SENTENCES: usize = 3;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for a ranking run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Embedding provider used to vectorize the query and every text unit.
    pub embedding_provider: EmbeddingProvider,
    /// Embedding model identifier passed to the provider.
    pub embedding_model: String,
    /// Dimensionality of vectors produced by the hashing provider.
    pub embedding_dimension: usize,
    /// Base URL of the Ollama runtime.
    pub ollama_url: String,
    /// Directory holding the persona/job file and text-run files.
    pub input_dir: PathBuf,
    /// Directory receiving the report.
    pub output_dir: PathBuf,
    /// How heading thresholds are chosen per document.
    pub heading_strategy: ThresholdStrategy,
    /// Minimum font size of the first-page document title.
    pub title_font_size: f32,
    /// Minimum font size of an H1 heading.
    pub h1_font_size: f32,
    /// Minimum font size of an H2 heading.
    pub h2_font_size: f32,
    /// Number of sections kept in the global ranking.
    pub section_top_k: usize,
    /// Number of subsections kept in the global ranking.
    pub subsection_top_k: usize,
    /// Maximum number of sentences in a refined excerpt.
    pub excerpt_max_sentences: usize,
}

/// Supported embedding backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// Offline feature-hashing embeddings.
    Hashing,
    /// Local Ollama runtime.
    Ollama,
    /// No provider; scoring degrades to neutral.
    None,
}

impl FromStr for EmbeddingProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hashing" => Ok(Self::Hashing),
            "ollama" => Ok(Self::Ollama),
            "none" | "disabled" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            embedding_provider: EmbeddingProvider::Hashing,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            heading_strategy: ThresholdStrategy::Fixed,
            title_font_size: DEFAULT_TITLE_SIZE,
            h1_font_size: DEFAULT_H1_SIZE,
            h2_font_size: DEFAULT_H2_SIZE,
            section_top_k: DEFAULT_TOP_K,
            subsection_top_k: DEFAULT_TOP_K,
            excerpt_max_sentences: DEFAULT_EXCERPT_SENTENCES,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let config = Self {
            embedding_provider: parse_or(&get, "EMBEDDING_PROVIDER", defaults.embedding_provider)?,
            embedding_model: get("EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            embedding_dimension: parse_or(&get, "EMBEDDING_DIMENSION", defaults.embedding_dimension)?,
            ollama_url: get("OLLAMA_URL").unwrap_or(defaults.ollama_url),
            input_dir: get("INPUT_DIR").map(PathBuf::from).unwrap_or(defaults.input_dir),
            output_dir: get("OUTPUT_DIR").map(PathBuf::from).unwrap_or(defaults.output_dir),
            heading_strategy: parse_or(&get, "HEADING_STRATEGY", defaults.heading_strategy)?,
            title_font_size: parse_or(&get, "TITLE_FONT_SIZE", defaults.title_font_size)?,
            h1_font_size: parse_or(&get, "H1_FONT_SIZE", defaults.h1_font_size)?,
            h2_font_size: parse_or(&get, "H2_FONT_SIZE", defaults.h2_font_size)?,
            section_top_k: parse_or(&get, "SECTION_TOP_K", defaults.section_top_k)?,
            subsection_top_k: parse_or(&get, "SUBSECTION_TOP_K", defaults.subsection_top_k)?,
            excerpt_max_sentences: parse_or(
                &get,
                "EXCERPT_MAX_SENTENCES",
                defaults.excerpt_max_sentences,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("EMBEDDING_DIMENSION", self.embedding_dimension),
            ("SECTION_TOP_K", self.section_top_k),
            ("SUBSECTION_TOP_K", self.subsection_top_k),
            ("EXCERPT_MAX_SENTENCES", self.excerpt_max_sentences),
        ];
        if let Some((key, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::InvalidValue((*key).to_string()));
        }
        let sizes = [
            ("TITLE_FONT_SIZE", self.title_font_size),
            ("H1_FONT_SIZE", self.h1_font_size),
            ("H2_FONT_SIZE", self.h2_font_size),
        ];
        if let Some((key, _)) = sizes
            .iter()
            .find(|(_, value)| !value.is_finite() || *value <= 0.0)
        {
            return Err(ConfigError::InvalidValue((*key).to_string()));
        }
        Ok(())
    }

    /// Heading thresholds described by the configured font sizes.
    pub fn heading_thresholds(&self) -> HeadingThresholds {
        HeadingThresholds {
            title: self.title_font_size,
            h1: self.h1_font_size,
            h2: self.h2_font_size,
            ..HeadingThresholds::default()
        }
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        embedding_provider = ?config.embedding_provider,
        model = %config.embedding_model,
        input_dir = %config.input_dir.display(),
        output_dir = %config.output_dir.display(),
        heading_strategy = ?config.heading_strategy,
        "Loaded configuration"
    );
    Ok(CONFIG.get_or_init(|| config))
}
