pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers as evaluation;
use crate::generation::handlers as cv;
use crate::media::handlers as media;
use crate::render::handlers as pdf;
use crate::state::AppState;

/// Room for multipart framing and the text fields sent alongside an upload.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // CV generation
        .route("/cv/tailor", post(cv::handle_tailor))
        .route("/cv/tailor-from-file", post(cv::handle_tailor_from_file))
        .route("/cv/extract-cv-data", post(cv::handle_extract_cv_data))
        .route("/cv/rephrase-section", post(cv::handle_rephrase_section))
        // Evaluation
        .route("/evaluation/cv", post(evaluation::handle_evaluate_cv))
        // PDF rendering
        .route("/pdf/templates", get(pdf::handle_list_templates))
        .route("/pdf/generate", post(pdf::handle_generate_pdf))
        // Utilities
        .route(
            "/utility/transcribe-audio",
            post(media::handle_transcribe_audio),
        )
        .route(
            "/utility/analyze-jd-image",
            post(media::handle_analyze_jd_image),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::evaluation::committee::Committee;
    use crate::evaluation::metrics::NullRetrievalScorer;
    use crate::evaluation::orchestrator::Evaluator;
    use crate::generation::tailor::TailorPipeline;
    use crate::llm_client::stubs::{HashEmbedder, ScriptedCompletion};
    use crate::llm_client::{CompletionProvider, LlmClient, ModelSet};
    use crate::render::pdf::PdfConverter;
    use crate::render::templates::TemplateRegistry;
    use crate::render::Renderer;
    use crate::retrieval::splitter::TextSplitter;
    use crate::retrieval::IndexSession;

    fn test_config(templates_dir: &Path) -> Config {
        Config {
            openai_api_key: Some("test-key".to_string()),
            openai_base_url: "http://127.0.0.1:9".to_string(),
            generation_model: "gen".to_string(),
            evaluation_model: "eval".to_string(),
            vision_model: "vision".to_string(),
            transcription_model: "whisper".to_string(),
            embedding_model: "embed".to_string(),
            llm_timeout_secs: 1,
            chunk_size: 1000,
            chunk_overlap: 200,
            retrieval_k: 7,
            evaluation_personas: vec!["Strict Hiring Manager".to_string(), "Creative Recruiter".to_string()],
            enable_retrieval_metrics: false,
            templates_dir: templates_dir.display().to_string(),
            pdf_render_command: "cp".to_string(),
            max_upload_bytes: 1024,
            cors_origins: vec!["*".to_string()],
            port: 0,
            rust_log: "info".to_string(),
        }
    }

    /// State whose model calls all go to `llm`; the real client is never reached.
    fn test_state(llm: ScriptedCompletion, templates_dir: &Path) -> AppState {
        let config = test_config(templates_dir);
        let client = LlmClient::new(
            "test-key".to_string(),
            config.openai_base_url.clone(),
            ModelSet {
                chat: "gen".to_string(),
                embedding: "embed".to_string(),
                transcription: "whisper".to_string(),
                vision: "vision".to_string(),
            },
            Duration::from_secs(1),
        )
        .unwrap();

        let generator: Arc<dyn CompletionProvider> = Arc::new(llm);
        let committee = Committee::new(generator.clone(), config.evaluation_personas.clone());
        let evaluator = Arc::new(Evaluator::new(Arc::new(NullRetrievalScorer), committee));
        let index = Arc::new(IndexSession::new(
            Arc::new(HashEmbedder::default()),
            TextSplitter::default(),
            config.retrieval_k,
        ));
        let pipeline = Arc::new(TailorPipeline::new(generator.clone(), index, evaluator.clone()));
        let renderer = Renderer::new(
            TemplateRegistry::new(templates_dir),
            PdfConverter::new(&config.pdf_render_command),
        );

        AppState {
            config,
            llm: client,
            generator,
            pipeline,
            evaluator,
            renderer,
        }
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn json_body(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(ScriptedCompletion::new(), dir.path()));

        let (status, body) = send(app.clone(), get_request("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["status"], "CV Generator API is online");

        let (status, body) = send(app, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["service"], "cv-api");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_tailor_rejects_short_cv_with_error_body() {
        let dir = tempfile::tempdir().unwrap();
        let llm = ScriptedCompletion::new();
        let app = build_router(test_state(llm, dir.path()));

        let (status, body) = send(
            app,
            post_json(
                "/cv/tailor",
                json!({"job_description": "Senior Rust engineer wanted", "user_cv_text": "too short"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&body)["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_evaluation_route_returns_committee_result() {
        let dir = tempfile::tempdir().unwrap();
        let llm = ScriptedCompletion::new()
            .reply("act as: Strict Hiring Manager", r#"{"persona": "Strict Hiring Manager", "score": 9, "justification": "ok"}"#)
            .reply("act as: Creative Recruiter", r#"{"score": 6, "justification": "meh"}"#);
        let app = build_router(test_state(llm, dir.path()));

        let (status, body) = send(
            app,
            post_json(
                "/evaluation/cv",
                json!({
                    "job_description": "Senior Rust engineer wanted",
                    "cv_json": {"personal": {"name": "Ada"}, "skills": {"technical": ["Rust"]}}
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["average_score"], 7.5);
        assert_eq!(body["individual_evaluations"][1]["persona"], "Creative Recruiter");
    }

    #[tokio::test]
    async fn test_rephrase_route() {
        let dir = tempfile::tempdir().unwrap();
        let llm = ScriptedCompletion::new().reply("Current", "  Led the Rust platform team.  ");
        let app = build_router(test_state(llm, dir.path()));

        let (status, body) = send(
            app,
            post_json(
                "/cv/rephrase-section",
                json!({
                    "section_content": "Did rust stuff",
                    "section_type": "experience",
                    "job_description": "Senior Rust engineer wanted"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["rephrased_content"], "Led the Rust platform team.");
        assert_eq!(body["original_content"], "Did rust stuff");
    }

    #[tokio::test]
    async fn test_pdf_templates_and_generate() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("plain.html"), "<h1>{{ personal.name }}</h1>").unwrap();
        let app = build_router(test_state(ScriptedCompletion::new(), dir.path()));

        let (status, body) = send(app.clone(), get_request("/pdf/templates")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body), json!({"templates": ["plain"]}));

        let response = app
            .clone()
            .oneshot(post_json(
                "/pdf/generate",
                json!({"templateId": "plain", "data": {"personal": {"name": "Ada Lovelace"}}}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"cv_Ada_Lovelace.pdf\""
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"<h1>Ada Lovelace</h1>");

        let (status, body) = send(
            app,
            post_json("/pdf/generate", json!({"templateId": "../plain", "data": {}})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json_body(&body)["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_analyze_image_rejects_invalid_base64() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(ScriptedCompletion::new(), dir.path()));

        let (status, body) = send(
            app,
            post_json("/utility/analyze-jd-image", json!({"image_base_64": "%%% not base64"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&body)["error"]["code"], "VALIDATION_ERROR");
    }

    /// Multipart request with a plain-text `cv_file` and, optionally, a `job_description` field.
    fn upload_request(uri: &str, job_description_field: Option<&str>) -> Request<Body> {
        let boundary = "cvapiboundary";
        let mut body = String::new();
        if let Some(jd) = job_description_field {
            body.push_str(&format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"job_description\"\r\n\r\n{jd}\r\n"
            ));
        }
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"cv_file\"; filename=\"cv.txt\"\r\n\
             Content-Type: text/plain\r\n\r\nplain text is not a CV document\r\n\
             --{boundary}--\r\n"
        ));
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_tailor_from_file_reads_job_description_field() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(ScriptedCompletion::new(), dir.path()));

        let request = upload_request("/cv/tailor-from-file", Some("Senior Rust engineer wanted"));
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&body)["error"]["code"], "UNSUPPORTED_FILE_TYPE");
    }

    #[tokio::test]
    async fn test_tailor_from_file_reads_job_description_query() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(ScriptedCompletion::new(), dir.path()));

        let request = upload_request(
            "/cv/tailor-from-file?job_description=Senior%20Rust%20engineer%20wanted",
            None,
        );
        let (status, body) = send(app, request).await;
        // Past the job description check, stopped at the upload sniffing.
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&body)["error"]["code"], "UNSUPPORTED_FILE_TYPE");
    }

    #[tokio::test]
    async fn test_tailor_from_file_requires_job_description() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(ScriptedCompletion::new(), dir.path()));

        let request = upload_request("/cv/tailor-from-file?job_description=%20", None);
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = json_body(&body);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "job_description is required");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(ScriptedCompletion::new(), dir.path()));
        let (status, _) = send(app, get_request("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
