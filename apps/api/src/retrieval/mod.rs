// Retrieval: chunking, embedding and top-K similarity search over one source text.
// The index is owned by an `IndexSession`; every caller goes through its lock, so a
// clear/index/retrieve sequence never interleaves with another request's.

pub mod index;
pub mod splitter;

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::EmbeddingProvider;
use crate::retrieval::index::{RetrievedContext, VectorIndex};
use crate::retrieval::splitter::TextSplitter;

/// Maximum number of chunks sent in one embedding request.
const EMBED_BATCH: usize = 64;

pub struct IndexSession {
    index: Mutex<VectorIndex>,
    splitter: TextSplitter,
    embedder: Arc<dyn EmbeddingProvider>,
    default_k: usize,
}

impl IndexSession {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        splitter: TextSplitter,
        default_k: usize,
    ) -> Self {
        Self {
            index: Mutex::new(VectorIndex::new()),
            splitter,
            embedder,
            default_k,
        }
    }

    pub fn default_k(&self) -> usize {
        self.default_k
    }

    /// Waits for exclusive use of the index.
    pub async fn lock(&self) -> IndexGuard<'_> {
        IndexGuard {
            index: self.index.lock().await,
            session: self,
        }
    }

    /// Replaces the index contents with `source` and returns the `default_k` chunks most
    /// similar to `query`, all under one lock acquisition.
    pub async fn index_and_retrieve(
        &self,
        source: &str,
        query: &str,
    ) -> Result<RetrievedContext, AppError> {
        let mut guard = self.lock().await;
        guard.index(source).await?;
        guard.retrieve(query, self.default_k).await
    }
}

/// Exclusive handle on the session's index. Dropping it releases the lock.
pub struct IndexGuard<'a> {
    index: MutexGuard<'a, VectorIndex>,
    session: &'a IndexSession,
}

impl IndexGuard<'_> {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Clears the index, then splits and embeds `text`. Returns the number of chunks stored.
    /// If embedding fails the index is left empty.
    pub async fn index(&mut self, text: &str) -> Result<usize, AppError> {
        self.index.clear();

        let chunks = self.session.splitter.split(text);
        if chunks.is_empty() {
            info!("Indexed 0 chunks (empty source text)");
            return Ok(0);
        }

        let mut embeddings = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(EMBED_BATCH) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            embeddings.extend(self.session.embedder.embed(&texts).await?);
        }

        let count = chunks.len();
        self.index.insert(chunks, embeddings);
        info!(
            "Indexed {count} chunks (size={}, overlap={})",
            self.session.splitter.chunk_size(),
            self.session.splitter.chunk_overlap()
        );
        Ok(count)
    }

    /// Up to `k` chunks ranked by similarity to `query`. An empty index yields an empty
    /// context without contacting the embedding provider.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<RetrievedContext, AppError> {
        if self.index.is_empty() || k == 0 {
            return Ok(RetrievedContext::default());
        }

        let mut vectors = self.session.embedder.embed(&[query.to_string()]).await?;
        let Some(query_vector) = vectors.pop() else {
            return Ok(RetrievedContext::default());
        };

        let context = self.index.search(&query_vector, k);
        info!("Retrieved {} of {} chunks (k={k})", context.len(), self.index.len());
        Ok(context)
    }
}
