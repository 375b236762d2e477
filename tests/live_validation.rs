use std::sync::Arc;

use sectionrank::{
    config::{Config, EmbeddingProvider},
    embedding::{self, EmbeddingService},
    relevance::{Query, RelevanceScorer},
};

fn live_config() -> Config {
    let config = Config::from_env().expect("valid environment");
    Config {
        embedding_provider: EmbeddingProvider::Ollama,
        ..config
    }
}

#[tokio::test]
#[ignore = "Requires live Ollama embeddings"]
async fn live_ollama_embedding_roundtrip() {
    let config = live_config();
    let client = embedding::get_embedding_client(&config).expect("client");
    let vectors = client
        .generate_embeddings(vec!["sectionrank live embedding".to_string()])
        .await
        .expect("failed to request embeddings from provider");
    assert_eq!(vectors.len(), 1, "expected embedding per input text");
    assert!(!vectors[0].is_empty(), "embedding should not be empty");
}

#[tokio::test]
#[ignore = "Requires live Ollama embeddings"]
async fn live_ollama_scores_related_text_higher() {
    let config = live_config();
    let client = embedding::get_embedding_client(&config).expect("client");
    let embeddings = Arc::new(EmbeddingService::new(client));
    let query = Query::build(&embeddings, "Budget traveler", "find cheap food").await;
    assert!(query.vector().is_some(), "query should embed against a live provider");

    let scorer = RelevanceScorer::new(embeddings, Arc::new(query));
    let scores = scorer
        .score_batch(&[
            "Street stalls sell inexpensive local dishes.".to_string(),
            "The cathedral organ has four manuals.".to_string(),
        ])
        .await;
    assert!(scores[0] > scores[1], "unexpected scores: {scores:?}");
}
