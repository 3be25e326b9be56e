use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::evaluation::committee::Committee;
use crate::evaluation::metrics::{LlmRetrievalScorer, NullRetrievalScorer, RetrievalScorer};
use crate::evaluation::orchestrator::Evaluator;
use crate::generation::tailor::TailorPipeline;
use crate::llm_client::{CompletionProvider, EmbeddingProvider, LlmClient};
use crate::render::pdf::PdfConverter;
use crate::render::templates::TemplateRegistry;
use crate::render::Renderer;
use crate::retrieval::splitter::TextSplitter;
use crate::retrieval::IndexSession;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Raw client for the media endpoints (transcription, vision).
    pub llm: LlmClient,
    /// Generation model, used for extraction and rephrasing.
    pub generator: Arc<dyn CompletionProvider>,
    pub pipeline: Arc<TailorPipeline>,
    pub evaluator: Arc<Evaluator>,
    pub renderer: Renderer,
}

impl AppState {
    /// Wires every component from one configured client. The evaluation side shares the
    /// connection pool but uses `EVALUATION_MODEL`.
    pub fn from_config(config: Config, llm: LlmClient) -> Self {
        let generator: Arc<dyn CompletionProvider> = Arc::new(llm.clone());
        let judge: Arc<dyn CompletionProvider> =
            Arc::new(llm.with_chat_model(&config.evaluation_model));
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(llm.clone());

        // Swap via ENABLE_RETRIEVAL_METRICS
        let scorer: Arc<dyn RetrievalScorer> = if config.enable_retrieval_metrics {
            Arc::new(LlmRetrievalScorer::new(judge.clone()))
        } else {
            Arc::new(NullRetrievalScorer)
        };
        info!(
            "Evaluation: retrieval scorer={}, personas={:?}",
            scorer.name(),
            config.evaluation_personas
        );

        let committee = Committee::new(judge, config.evaluation_personas.clone());
        let evaluator = Arc::new(Evaluator::new(scorer, committee));

        let index = Arc::new(IndexSession::new(
            embedder,
            TextSplitter::new(config.chunk_size, config.chunk_overlap),
            config.retrieval_k,
        ));
        let pipeline = Arc::new(TailorPipeline::new(
            generator.clone(),
            index,
            evaluator.clone(),
        ));

        let renderer = Renderer::new(
            TemplateRegistry::new(&config.templates_dir),
            PdfConverter::new(&config.pdf_render_command),
        );

        Self {
            config,
            llm,
            generator,
            pipeline,
            evaluator,
            renderer,
        }
    }
}
