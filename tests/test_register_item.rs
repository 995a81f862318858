mod common;

use common::{record, RecordingIndex, StubEmbedder};
use image_register::application::register_item::RegisterItemUseCase;
use image_register::domain::error::DomainError;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::test]
async fn test_register_item_embeds_once_and_upserts_once() {
    let embedder = Arc::new(StubEmbedder::new());
    let index = Arc::new(RecordingIndex::new());
    let uc = RegisterItemUseCase::new(embedder.clone(), index.clone());

    let item = record(
        "./images/test_image.jpg",
        "test_image_001",
        json!({
            "title": "Test image",
            "category": "Test category",
            "tags": ["test", "sample"],
            "description": "Image used in tests"
        }),
    );
    uc.execute(&item).await.unwrap();

    let calls = embedder.calls.lock().unwrap().clone();
    assert_eq!(calls, vec![PathBuf::from("./images/test_image.jpg")]);

    let upserts = index.upserts.lock().unwrap().clone();
    assert_eq!(upserts.len(), 1);
    assert_eq!(upserts[0].id, "test_image_001");
    assert_eq!(upserts[0].vector, StubEmbedder::default_vector());
    assert_eq!(upserts[0].metadata, item.metadata);
}

#[tokio::test]
async fn test_embedding_failure_skips_upsert() {
    let embedder = Arc::new(StubEmbedder::new().failing_on("missing.png"));
    let index = Arc::new(RecordingIndex::new());
    let uc = RegisterItemUseCase::new(embedder.clone(), index.clone());

    let err = uc.execute(&record("missing.png", "missing", json!({}))).await.unwrap_err();
    assert!(matches!(err, DomainError::Decode(_)));
    assert_eq!(embedder.call_count(), 1);
    assert!(index.upserted_ids().is_empty());
}

#[tokio::test]
async fn test_upsert_failure_is_returned_after_embedding() {
    let embedder = Arc::new(StubEmbedder::new());
    let index = Arc::new(RecordingIndex::new().failing_on("item_1"));
    let uc = RegisterItemUseCase::new(embedder.clone(), index.clone());

    let err = uc.execute(&record("a.png", "item_1", json!({}))).await.unwrap_err();
    assert!(matches!(err, DomainError::RemoteService(_)));
    // The vector was computed but nothing is kept or rolled back.
    assert_eq!(embedder.call_count(), 1);
    assert!(index.upserted_ids().is_empty());
}

#[tokio::test]
async fn test_zero_feature_vector_is_reported_as_normalization_error() {
    let embedder = Arc::new(StubEmbedder::new().with_vector("blank.png", vec![0.0, 0.0, 0.0]));
    let index = Arc::new(RecordingIndex::new());
    let uc = RegisterItemUseCase::new(embedder, index.clone());

    let err = uc.execute(&record("blank.png", "blank", json!({}))).await.unwrap_err();
    assert!(matches!(err, DomainError::Normalization(_)));
    assert!(index.upserted_ids().is_empty());
}
