//! Retrieval-and-answer pipeline against a real store file and fake models

mod common;

use common::*;
use docseer::config::RetrievalConfig;
use docseer::rag::{ask, DocumentChunk, ImageCollection, ImageSearch, ResourceBundle, TextRetriever};
use docseer::store::{Record, VectorStore};
use docseer::DocseerError;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_grounding_scenario() {
    let site_name = DocumentChunk::new(
        "Set `site_name` in mkdocs.yml to change the title.",
        "config.md",
    );
    let mut chunks = vec![
        DocumentChunk::new("Run `mkdocs serve` to preview locally.", "serve.md"),
        DocumentChunk::new("Deploy with `mkdocs gh-deploy`.", "deploy.md"),
    ];
    chunks.push(site_name.clone());
    let text = TextFixture::with_chunks(chunks);

    let llm = Arc::new(RecordingModel::replying("Edit `site_name` in mkdocs.yml."));
    let resources = bundle(
        text.store.clone(),
        llm.clone(),
        Arc::new(CountingEncoder::default()),
        None,
    );

    let answer = ask("How do I change the site title?", &resources)
        .await
        .unwrap();

    assert!(answer.docs.contains(&site_name));
    assert_eq!(answer.text, "Edit `site_name` in mkdocs.yml.");

    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Set `site_name` in mkdocs.yml to change the title."));
    assert!(prompts[0].contains("How do I change the site title?"));
}

#[tokio::test]
async fn test_top_k_caps_at_fifteen_in_store_order() {
    let text = TextFixture::with_chunks(numbered_chunks(20));
    let resources = bundle(
        text.store.clone(),
        Arc::new(RecordingModel::replying("ok")),
        Arc::new(CountingEncoder::default()),
        None,
    );

    let question = "Which page explains option_3 of the theme?";
    let answer = ask(question, &resources).await.unwrap();
    assert_eq!(answer.docs.len(), 15);

    let direct = text.store.similarity_search(question, 15).unwrap();
    assert_eq!(answer.docs, direct);
}

#[tokio::test]
async fn test_top_k_with_small_store() {
    let text = TextFixture::with_chunks(numbered_chunks(4));
    let resources = bundle(
        text.store.clone(),
        Arc::new(RecordingModel::replying("ok")),
        Arc::new(CountingEncoder::default()),
        None,
    );

    let answer = ask("theme options", &resources).await.unwrap();
    assert_eq!(answer.docs.len(), 4);
}

#[tokio::test]
async fn test_context_joined_with_blank_lines() {
    let text = TextFixture::with_chunks(vec![
        DocumentChunk::new("alpha", "a.md"),
        DocumentChunk::new("beta", "b.md"),
    ]);
    let llm = Arc::new(RecordingModel::replying("ok"));
    let resources = bundle(
        text.store.clone(),
        llm.clone(),
        Arc::new(CountingEncoder::default()),
        None,
    );

    let answer = ask("alpha", &resources).await.unwrap();
    let expected = format!("{}\n\n{}", answer.docs[0].content, answer.docs[1].content);
    assert!(llm.prompts()[0].contains(&expected));
}

#[tokio::test]
async fn test_fragmented_reply_is_joined() {
    let text = TextFixture::with_chunks(numbered_chunks(2));
    let resources = bundle(
        text.store.clone(),
        Arc::new(RecordingModel::with_fragments(&["Hello", "world"])),
        Arc::new(CountingEncoder::default()),
        None,
    );

    let answer = ask("greeting", &resources).await.unwrap();
    assert_eq!(answer.text, "Hello world");
}

#[tokio::test]
async fn test_absent_image_collection_skips_lookup() {
    let text = TextFixture::with_chunks(numbered_chunks(3));
    let encoder = Arc::new(CountingEncoder::default());
    let resources = bundle(
        text.store.clone(),
        Arc::new(RecordingModel::replying("ok")),
        encoder.clone(),
        None,
    );

    for question in ["show me the navigation screenshot", "logo", ""] {
        let answer = ask(question, &resources).await.unwrap();
        assert_eq!(answer.image, None);
    }
    assert_eq!(encoder.text_calls(), 0);
}

async fn image_for_distance(distance: f32) -> Option<PathBuf> {
    let text = TextFixture::with_chunks(numbered_chunks(1));
    let images: Arc<dyn ImageSearch> = Arc::new(FixedImage {
        distance: Some(distance),
    });
    let resources = bundle(
        text.store.clone(),
        Arc::new(RecordingModel::replying("ok")),
        Arc::new(CountingEncoder::default()),
        Some(images),
    );

    ask("navigation", &resources).await.unwrap().image
}

#[tokio::test]
async fn test_threshold_boundary() {
    let expected = Some(PathBuf::from("docs/img/nav.png"));

    assert_eq!(image_for_distance(0.0).await, expected);
    assert_eq!(image_for_distance(1.5).await, expected);
    assert_eq!(image_for_distance(1.999).await, expected);
    assert_eq!(image_for_distance(2.0).await, None);
    assert_eq!(image_for_distance(2.001).await, None);
    assert_eq!(image_for_distance(4.0).await, None);
}

#[tokio::test]
async fn test_custom_threshold() {
    let text = TextFixture::with_chunks(numbered_chunks(1));
    let images: Arc<dyn ImageSearch> = Arc::new(FixedImage {
        distance: Some(0.8),
    });
    let resources = ResourceBundle::new(
        text.store.clone(),
        Arc::new(RecordingModel::replying("ok")),
        Arc::new(CountingEncoder::default()),
        Some(images),
        RetrievalConfig {
            top_k: 15,
            image_distance_threshold: 0.5,
        },
    );

    assert_eq!(ask("navigation", &resources).await.unwrap().image, None);
}

#[tokio::test]
async fn test_unit_vector_images_through_store() {
    let text = TextFixture::with_chunks(numbered_chunks(1));
    let temp = TempDir::new().unwrap();
    let store = VectorStore::open(&temp.path().join("images.sqlite")).unwrap();
    let collection = store.create_collection("mkdocs_images").unwrap();
    collection
        .add(vec![
            Record::new("unrelated.png", vec![-1.0, 0.0])
                .with_metadata("path", "docs/unrelated.png"),
        ])
        .unwrap();
    let images: Arc<dyn ImageSearch> = Arc::new(ImageCollection::new(collection.clone()));

    let resources = bundle(
        text.store.clone(),
        Arc::new(RecordingModel::replying("ok")),
        Arc::new(QueryEncoder(vec![1.0, 0.0])),
        Some(images),
    );

    // Opposite direction: the largest possible distance between unit vectors
    assert_eq!(ask("theme colours", &resources).await.unwrap().image, None);

    collection
        .add(vec![
            Record::new("palette.png", vec![0.8, 0.6]).with_metadata("path", "docs/img/palette.png"),
        ])
        .unwrap();
    assert_eq!(
        ask("theme colours", &resources).await.unwrap().image,
        Some(PathBuf::from("docs/img/palette.png"))
    );
}

#[tokio::test]
async fn test_empty_image_collection_gives_no_image() {
    let text = TextFixture::with_chunks(numbered_chunks(1));
    let images: Arc<dyn ImageSearch> = Arc::new(FixedImage { distance: None });
    let resources = bundle(
        text.store.clone(),
        Arc::new(RecordingModel::replying("ok")),
        Arc::new(CountingEncoder::default()),
        Some(images),
    );

    assert_eq!(ask("navigation", &resources).await.unwrap().image, None);
}

#[tokio::test]
async fn test_image_failure_degrades_to_no_image() {
    let text = TextFixture::with_chunks(numbered_chunks(2));
    let images: Arc<dyn ImageSearch> = Arc::new(FixedImage {
        distance: Some(1.0),
    });
    let llm = Arc::new(RecordingModel::replying("still answered"));
    let resources = bundle(
        text.store.clone(),
        llm.clone(),
        Arc::new(CountingEncoder::failing()),
        Some(images),
    );

    let answer = ask("navigation", &resources).await.unwrap();
    assert_eq!(answer.text, "still answered");
    assert_eq!(answer.image, None);
    assert_eq!(llm.prompts().len(), 1);
}

#[tokio::test]
async fn test_llm_failure_propagates() {
    let text = TextFixture::with_chunks(numbered_chunks(2));
    let resources = bundle(
        text.store.clone(),
        Arc::new(RecordingModel::failing("quota exceeded")),
        Arc::new(CountingEncoder::default()),
        None,
    );

    let result = ask("anything", &resources).await;
    assert!(matches!(result, Err(DocseerError::Llm(_))));
}

#[tokio::test]
async fn test_empty_text_store() {
    let text = TextFixture::with_chunks(Vec::new());
    let llm = Arc::new(RecordingModel::replying("I don't know."));
    let resources = bundle(
        text.store.clone(),
        llm.clone(),
        Arc::new(CountingEncoder::default()),
        None,
    );

    let answer = ask("anything", &resources).await.unwrap();
    assert!(answer.docs.is_empty());
    assert!(llm.prompts()[0].contains("Context:\n\n"));
}
