mod mocks;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use medicast_common::{config::AppConfig, PodcastStudio, Summarizer};
use medicast_gateway::{create_router, AppState};
use mocks::{
    completion::MockModel,
    extractor::MockExtractor,
    speech::MockSpeech,
    store::{MemoryStore, PUBLIC_BASE},
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const LISTING_URL: &str = "https://journal.test/cardiology/recent";
const REPLY: &str = "Today on the show, three new trials.";

struct TestApp {
    router: Router,
    extractor: MockExtractor,
    model: MockModel,
    speech: MockSpeech,
    store: MemoryStore,
    dir: TempDir,
}

fn three_papers() -> MockExtractor {
    MockExtractor::new(LISTING_URL)
        .with_paper("Statins in the elderly", "10.1101/2024.01.01.111", "Statin trial text.")
        .with_paper("Beta blockers after MI", "10.1101/2024.01.02.222", "Beta blocker text.")
        .with_paper("SGLT2 and heart failure", "https://doi.org/10.1101/2024.01.03.333", "SGLT2 text.")
}

fn config_in(dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.sources.listing_url = LISTING_URL.to_string();
    config.sources.paper_list_path = dir.join("paper_list.json");
    config.sources.papers_dir = dir.join("papers");
    config.sources.summaries_dir = dir.join("summaries");
    config
}

fn build_app(extractor: MockExtractor, model: MockModel, speech: MockSpeech) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::default();

    let state = AppState {
        config: Arc::new(config_in(dir.path())),
        extractor: Arc::new(extractor.clone()),
        summarizer: Summarizer::new(Arc::new(model.clone()), "test-model"),
        studio: PodcastStudio::new(Arc::new(speech.clone()), Arc::new(store.clone())),
    };

    TestApp {
        router: create_router(state),
        extractor,
        model,
        speech,
        store,
        dir,
    }
}

fn default_app() -> TestApp {
    build_app(three_papers(), MockModel::new(REPLY), MockSpeech::new(&[b"ID3", b"frame-1", b"frame-2"]))
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn post_raw(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.post_raw(uri, &body.to_string()).await
    }

    fn write(&self, relative: &str, content: &str) {
        let path = self.dir.path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
}

// ─── Health ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_and_ready() {
    let app = default_app();

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["extraction"], false);

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

// ─── Papers ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_papers_uses_configured_source() {
    let app = default_app();

    let (status, body) = app.get("/papers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["papers"].as_array().unwrap().len(), 3);
    assert_eq!(body["papers"][0]["title"], "Statins in the elderly");

    let calls = app.extractor.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].urls, vec![LISTING_URL.to_string()]);
    assert!(calls[0].prompt.contains("3 most recent"));
}

#[tokio::test]
async fn test_list_papers_query_overrides() {
    let app = default_app();

    let uri = format!("/papers?url={}&count=5", "https%3A%2F%2Fother.test%2Flist");
    let (status, body) = app.get(&uri).await;

    // The mock only knows the configured listing page
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);

    let calls = app.extractor.calls.lock().unwrap();
    assert_eq!(calls[0].urls, vec!["https://other.test/list".to_string()]);
    assert!(calls[0].prompt.contains("5 most recent"));
}

#[tokio::test]
async fn test_first_paper_full_text() {
    let app = default_app();

    let (status, body) = app.get("/paper-full-text").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["doi"], "10.1101/2024.01.01.111");
    assert_eq!(body["extractedText"], "Statin trial text.");
    assert_eq!(
        body["source_url"],
        "https://www.medrxiv.org/content/10.1101/2024.01.01.111.full.pdf"
    );
}

#[tokio::test]
async fn test_paper_by_index_strips_resolver_prefix() {
    let app = default_app();

    let (status, body) = app.get("/paper/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["metadata"]["title"], "SGLT2 and heart failure");
    assert_eq!(body["full_text"]["success"], true);
    assert_eq!(body["full_text"]["doi"], "10.1101/2024.01.03.333");

    // One listing call, one content call
    assert_eq!(app.extractor.urls().len(), 2);
}

#[tokio::test]
async fn test_paper_without_doi_reports_in_body() {
    let extractor = MockExtractor::new(LISTING_URL).with_paper_without_doi("Untraceable preprint");
    let app = build_app(extractor, MockModel::new(REPLY), MockSpeech::new(&[b"ID3"]));

    let (status, body) = app.get("/paper/0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["full_text"]["success"], false);
    assert_eq!(body["full_text"]["code"], "MISSING_DOI");

    assert_eq!(app.extractor.urls(), vec![LISTING_URL.to_string()]);
}

// ─── Analysis ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_analyze_paper() {
    let app = default_app();

    let (status, body) = app.get("/analyze-paper/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["analysis"], REPLY);
    assert_eq!(body["model_used"], "test-model");

    let prompts = app.model.calls();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].ends_with("Beta blocker text."));
    assert!(prompts[0].contains("250 words"));
}

#[tokio::test]
async fn test_analyze_out_of_range_index() {
    let app = default_app();

    let (status, body) = app.get("/analyze-paper/7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Paper index 7 is out of range");
    assert!(app.model.calls().is_empty());
}

#[tokio::test]
async fn test_malformed_index_is_reported_in_body() {
    let app = default_app();

    for uri in ["/paper/-1", "/paper/abc", "/analyze-paper/-1", "/analyze-paper/abc"] {
        let response = app
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json",
            "{}",
            uri
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["error"].as_str().unwrap().contains("Invalid paper index"));
    }

    assert!(app.extractor.urls().is_empty());
    assert!(app.model.calls().is_empty());
}

#[tokio::test]
async fn test_podcast_summaries_keeps_failed_paper_in_place() {
    let extractor = MockExtractor::new(LISTING_URL)
        .with_paper("First", "10.1101/first", "Alpha text.")
        .with_paper("Second", "10.1101/second", "OVERLOAD text.")
        .with_paper("Third", "10.1101/third", "Gamma text.");
    let model = MockModel::new(REPLY).failing_on("OVERLOAD");
    let app = build_app(extractor, model, MockSpeech::new(&[b"ID3"]));

    let (status, body) = app.get("/podcast-summaries").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let summaries = body["individual_summaries"].as_array().unwrap();
    assert_eq!(summaries.len(), 3);
    assert_eq!(summaries[0]["summary"]["success"], true);
    assert_eq!(summaries[1]["summary"]["success"], false);
    assert_eq!(summaries[2]["summary"]["success"], true);
    assert_eq!(body["podcast_transcript"]["analysis"], REPLY);

    let prompts = app.model.calls();
    assert_eq!(prompts.len(), 4);
    let transcript_prompt = prompts.last().unwrap();
    let first = transcript_prompt.find("PAPER 1: First").unwrap();
    let second = transcript_prompt.find("PAPER 2: Second").unwrap();
    let third = transcript_prompt.find("PAPER 3: Third").unwrap();
    assert!(first < second && second < third);
    assert!(transcript_prompt.contains("SUMMARY: No summary available"));
}

#[tokio::test]
async fn test_podcast_summaries_without_listing() {
    let app = build_app(
        three_papers().failing_listing(),
        MockModel::new(REPLY),
        MockSpeech::new(&[b"ID3"]),
    );

    let (status, body) = app.get("/podcast-summaries").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(app.model.calls().is_empty());
}

// ─── Local files ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_local_paper_text_uses_first_entry() {
    let app = default_app();
    app.write(
        "paper_list.json",
        &json!({
            "success": true,
            "data": {
                "papers": [
                    { "title": "Beta blockers after MI", "doi": "10.1101/2024.01.02.222" },
                    { "title": "Statins in the elderly", "doi": "10.1101/2024.01.01.111" }
                ]
            }
        })
        .to_string(),
    );

    let (status, body) = app.get("/local-paper-text").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["paper_title"], "Beta blockers after MI");
    assert_eq!(body["paper_doi"], "10.1101/2024.01.02.222");
    assert_eq!(body["full_text"]["extractedText"], "Beta blocker text.");

    let urls = app.extractor.urls();
    assert_eq!(urls.len(), 1);
    assert!(urls[0].ends_with("10.1101/2024.01.02.222.full.pdf"));
}

#[tokio::test]
async fn test_local_paper_text_without_list() {
    let app = default_app();

    let (status, body) = app.get("/local-paper-text").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "LOCAL_FILE_ERROR");
    assert!(app.extractor.urls().is_empty());
}

#[tokio::test]
async fn test_summarize_local_papers_writes_summaries() {
    let app = default_app();
    app.write(
        "papers/paper1.json",
        &json!({ "metadata": { "title": "Local one", "authors": ["Ada", "Grace"] }, "body": "..." }).to_string(),
    );
    app.write("papers/paper2.json", &json!({ "body": "no metadata" }).to_string());
    app.write("papers/paper3.json", "Plain text paper");

    let (status, body) = app.get("/summarize-local-papers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["files_processed"], json!(["paper1.json", "paper2.json", "paper3.json"]));
    assert_eq!(body["podcast_transcript"]["analysis"], REPLY);

    let transcript_prompt = app.model.calls().pop().unwrap();
    assert!(transcript_prompt.contains("PAPER 1: Local one"));
    assert!(transcript_prompt.contains("AUTHORS: Ada, Grace"));
    assert!(transcript_prompt.contains("PAPER 2: Paper 2"));
    assert!(transcript_prompt.contains("PAPER 3: paper3.json"));

    let summaries = app.dir.path().join("summaries");
    for file in ["paper1.json", "paper2.json", "paper3.json"] {
        let stored: Value = serde_json::from_slice(&std::fs::read(summaries.join(file)).unwrap()).unwrap();
        assert_eq!(stored["filename"], file);
        assert_eq!(stored["success"], true);
    }
}

#[tokio::test]
async fn test_summarize_local_papers_stops_on_missing_file() {
    let app = default_app();
    app.write("papers/paper1.json", "First");
    app.write("papers/paper2.json", "Second");

    let (status, body) = app.get("/summarize-local-papers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("paper3.json"));
    assert!(!app.dir.path().join("summaries").exists());
}

// ─── Podcasts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_generate_podcast_requires_parameters() {
    let app = default_app();

    for body in [
        json!({ "specialty": "cardiology" }),
        json!({ "duration": 15 }),
        json!({ "specialty": "  ", "duration": 15 }),
        json!({ "specialty": "cardiology", "duration": "" }),
        json!({ "specialty": "cardiology", "duration": -5 }),
    ] {
        let (status, body) = app.post_json("/generate-podcast", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Missing required parameters");
    }

    assert!(app.extractor.urls().is_empty());
    assert!(app.model.calls().is_empty());
    assert!(app.speech.texts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_generate_podcast_rejects_unreadable_body() {
    let app = default_app();

    let (status, body) = app.post_raw("/generate-podcast", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required parameters");
    assert!(app.extractor.urls().is_empty());
}

#[tokio::test]
async fn test_generate_podcast() {
    let app = default_app();

    let (status, body) = app
        .post_json(
            "/generate-podcast",
            json!({ "specialty": "cardiology", "duration": 15, "frequency": "weekly" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["transcript"], REPLY);

    let podcast_id = body["podcastId"].as_str().unwrap();
    let key = format!("podcasts/{}.mp3", podcast_id);
    assert_eq!(body["audioUrl"], format!("{}/{}", PUBLIC_BASE, key));

    let objects = app.store.objects.lock().unwrap();
    let stored = objects.get(&key).unwrap();
    assert_eq!(stored.body, b"ID3frame-1frame-2".to_vec());
    assert_eq!(stored.content_type, "audio/mpeg");

    let prompts = app.model.calls();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("15-minute"));
    assert!(prompts[0].contains("cardiology"));
    assert_eq!(app.speech.texts.lock().unwrap().as_slice(), [REPLY.to_string()]);
}

#[tokio::test]
async fn test_generate_podcast_transcript_failure() {
    let app = build_app(
        three_papers(),
        MockModel::new(REPLY).failing_on("cardiology"),
        MockSpeech::new(&[b"ID3"]),
    );

    let (status, body) = app
        .post_json("/generate-podcast", json!({ "specialty": "cardiology", "duration": "20" }))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to generate transcript");
    assert!(app.store.objects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_generate_podcast_listing_failure() {
    let app = build_app(
        three_papers().failing_listing(),
        MockModel::new(REPLY),
        MockSpeech::new(&[b"ID3"]),
    );

    let (status, body) = app
        .post_json("/generate-podcast", json!({ "specialty": "cardiology", "duration": 10 }))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch papers");
    assert!(app.model.calls().is_empty());
}

#[tokio::test]
async fn test_generate_podcast_audio_failure() {
    let app = build_app(three_papers(), MockModel::new(REPLY), MockSpeech::failing());

    let (status, body) = app
        .post_json("/generate-podcast", json!({ "specialty": "cardiology", "duration": 10 }))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().starts_with("Error generating audio:"));
    assert!(app.store.objects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_get_podcast_after_generation() {
    let app = default_app();

    let (_, generated) = app
        .post_json("/generate-podcast", json!({ "specialty": "oncology", "duration": 5 }))
        .await;
    let podcast_id = generated["podcastId"].as_str().unwrap();

    let (status, body) = app.get(&format!("/podcast/{}", podcast_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["podcastId"], podcast_id);
    assert_eq!(body["audioUrl"], generated["audioUrl"]);
}

#[tokio::test]
async fn test_get_unknown_podcast() {
    let app = default_app();

    let (status, body) = app.get("/podcast/0b6f1c1e-8d5c-4f9e-9f7a-3c2d1e0f9a8b").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Podcast not found");
    assert!(body.get("audioUrl").is_none());

    let (status, _) = app.get("/podcast/not-a-uuid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.store.lookups.lock().unwrap().len(), 1);
}
