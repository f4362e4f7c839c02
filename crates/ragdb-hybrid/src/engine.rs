use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use ragdb_core::chunker::Chunker;
use ragdb_core::config::{SearchSettings, Settings};
use ragdb_core::error::{Error, Result};
use ragdb_core::traits::Embedder;
use ragdb_core::types::SourceDocument;
use ragdb_store::{IndexStore, LoadedIndex, Manifest};
use ragdb_vector::FlatL2Index;

use crate::fusion;
use crate::health::HealthReport;
use crate::metadata::MetadataStore;
use crate::request::{RankedChunk, SearchRequest, SearchResponse};
use crate::snapshot::IndexSnapshot;

/// Hybrid lexical + vector retrieval over one persisted index namespace.
///
/// Readers clone the current `Arc<IndexSnapshot>` and never block on
/// ingestion. Ingestions are serialized by `writer`; each builds a complete
/// new snapshot, persists it, and only then swaps it in. A failed or cancelled
/// ingestion leaves both the published snapshot and the files on disk as they
/// were.
pub struct HybridEngine {
    published: Arc<RwLock<Arc<IndexSnapshot>>>,
    writer: Arc<Mutex<()>>,
    store: Arc<IndexStore>,
    embedder: Arc<dyn Embedder>,
    chunker: Chunker,
    search: SearchSettings,
    embed_timeout: Option<Duration>,
    /// Repairs made at open. Cleared once a save has persisted the repaired state.
    issues: Arc<RwLock<Vec<String>>>,
}

impl HybridEngine {
    /// Load the namespace behind `store`, repairing whatever does not line up.
    ///
    /// Corpus and metadata are cut to their common prefix, surplus vectors are
    /// dropped, and missing trailing vectors are recomputed from the corpus.
    /// Each repair is logged and listed in [`HybridEngine::health`].
    #[instrument(skip_all, fields(dir = %store.dir().display(), embedder = embedder.embedder_id()))]
    pub async fn open(store: IndexStore, embedder: Arc<dyn Embedder>, settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let chunker = Chunker::new(settings.chunking)?;
        let embed_timeout = settings.embedding.timeout_ms.map(Duration::from_millis);
        let store = Arc::new(store);

        let loaded = {
            let store = Arc::clone(&store);
            tokio::task::spawn_blocking(move || store.load()).await.map_err(join_err)?
        };
        let (snapshot, issues) = recover(loaded, &embedder, embed_timeout).await?;
        info!(chunks = snapshot.len(), issues = issues.len(), "engine ready");

        Ok(Self {
            published: Arc::new(RwLock::new(Arc::new(snapshot))),
            writer: Arc::new(Mutex::new(())),
            store,
            embedder,
            chunker,
            search: settings.search.clone(),
            embed_timeout,
            issues: Arc::new(RwLock::new(issues)),
        })
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.published.read().clone()
    }

    /// Chunk, embed, index and persist one document. Returns the number of
    /// chunks added.
    ///
    /// The lexical index is rebuilt over the whole corpus, an O(corpus) cost
    /// per call; vectors are computed only for the new chunks.
    ///
    /// Dropping the returned future before embeddings are in abandons the
    /// ingestion. After that the save and the swap run as one background task
    /// that keeps the writer lock until both are done, so a dropped caller
    /// never leaves disk and memory at different generations.
    #[instrument(skip_all, fields(document_id = %document.document_id, filename = %document.filename))]
    pub async fn ingest(&self, document: SourceDocument, cancel: &CancellationToken) -> Result<usize> {
        if document.text.trim().is_empty() {
            return Err(Error::InvalidInput(format!("document '{}' has no text", document.document_id)));
        }
        let started = Instant::now();
        let guard = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            guard = Arc::clone(&self.writer).lock_owned() => guard,
        };

        let chunks = self.chunker.chunk_document(&document)?;
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embed(texts, cancel).await?;

        let added = chunks.len();
        let current = self.snapshot();
        let store = Arc::clone(&self.store);
        let published = Arc::clone(&self.published);
        let issues = Arc::clone(&self.issues);
        let cancel = cancel.clone();
        let commit = tokio::task::spawn_blocking(move || -> Result<Manifest> {
            let _guard = guard;
            let next = current.extended(&chunks, &embeddings)?;
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let manifest = store.save(&next.corpus, next.metadata.records(), &next.vectors)?;
            *published.write() = Arc::new(next);
            let resolved = std::mem::take(&mut *issues.write());
            if !resolved.is_empty() {
                info!(resolved = resolved.len(), "repaired index persisted");
            }
            Ok(manifest)
        });
        let manifest = commit.await.map_err(join_err)??;
        info!(
            chunks = added,
            generation = manifest.generation,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ingestion committed"
        );
        Ok(added)
    }

    /// Rank every chunk against `request`. Weights are applied as given; use
    /// [`SearchRequest::normalized`] to rescale them first.
    #[instrument(skip_all, fields(query_len = request.query.len(), top_k = request.top_k))]
    pub async fn search(&self, request: &SearchRequest, cancel: &CancellationToken) -> Result<SearchResponse> {
        request.validate()?;
        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            debug!("search against empty index");
            return Ok(SearchResponse::NotIndexed);
        }
        let started = Instant::now();

        let lexical = fusion::normalize_lexical(&snapshot.lexical.score_all(&request.query)?);

        let query_vector = self
            .embed(vec![request.query.clone()], cancel)
            .await?
            .pop()
            .ok_or_else(|| Error::Operation("embedding provider returned no query vector".to_string()))?;
        let k = snapshot.len().min(self.search.candidate_k);
        let neighbors = snapshot.vectors.search(&query_vector, k)?;
        let semantic = fusion::distances_to_similarities(&neighbors);

        let fused = fusion::fuse(&lexical, &semantic, request.lexical_weight, request.semantic_weight, request.top_k);
        let hits: Vec<RankedChunk> = fused
            .into_iter()
            .map(|f| RankedChunk {
                global_index: f.global_index,
                text: snapshot.corpus[f.global_index].clone(),
                score: f.score,
                lexical_score: f.lexical,
                semantic_score: f.semantic,
                metadata: snapshot.metadata.get_by_global_index(f.global_index).cloned(),
            })
            .collect();
        debug!(
            hits = hits.len(),
            neighbors = neighbors.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search complete"
        );
        Ok(SearchResponse::Ranked(hits))
    }

    pub fn health(&self) -> HealthReport {
        let snapshot = self.snapshot();
        let aligned = snapshot.corpus.len() == snapshot.metadata.len() && snapshot.metadata.len() == snapshot.vectors.count();
        let issues = self.issues.read().clone();
        HealthReport {
            chunks: snapshot.corpus.len(),
            metadata_records: snapshot.metadata.len(),
            vectors: snapshot.vectors.count(),
            dim: snapshot.vectors.dim(),
            documents: snapshot.metadata.distinct_documents(),
            generation: self.store.generation(),
            embedder_id: self.embedder.embedder_id().to_string(),
            consistent: aligned && issues.is_empty(),
            issues,
        }
    }

    async fn embed(&self, texts: Vec<String>, cancel: &CancellationToken) -> Result<Vec<Vec<f32>>> {
        embed_texts(&self.embedder, texts, self.embed_timeout, cancel).await
    }
}

/// Run the provider on the blocking pool, racing it against `cancel` and the
/// optional deadline. An abandoned call runs to completion in the background
/// and its output is dropped.
async fn embed_texts(
    embedder: &Arc<dyn Embedder>,
    texts: Vec<String>,
    timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> Result<Vec<Vec<f32>>> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    let expected = texts.len();
    let embedder = Arc::clone(embedder);
    let dim = embedder.dim();
    let task = tokio::task::spawn_blocking(move || embedder.embed_batch(&texts));
    let work = async {
        match task.await {
            Ok(result) => result.map_err(Error::Embedding),
            Err(e) => Err(join_err(e)),
        }
    };
    let bounded = async {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, work).await.unwrap_or(Err(Error::DeadlineExceeded)),
            None => work.await,
        }
    };
    let vectors = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(Error::Cancelled),
        result = bounded => result?,
    };

    if vectors.len() != expected {
        return Err(Error::Operation(format!(
            "embedding provider returned {} vectors for {} texts",
            vectors.len(),
            expected
        )));
    }
    if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
        return Err(Error::DimensionMismatch { expected: dim, found: bad.len() });
    }
    Ok(vectors)
}

async fn recover(
    loaded: LoadedIndex,
    embedder: &Arc<dyn Embedder>,
    timeout: Option<Duration>,
) -> Result<(IndexSnapshot, Vec<String>)> {
    let LoadedIndex { mut corpus, metadata, mut vectors, mut issues, .. } = loaded;
    let mut metadata = MetadataStore::from_records(metadata);

    let aligned = corpus.len().min(metadata.len());
    if corpus.len() != metadata.len() {
        repaired(
            &mut issues,
            format!("corpus holds {} chunks but metadata {}; keeping the first {}", corpus.len(), metadata.len(), aligned),
        );
        corpus.truncate(aligned);
        metadata.truncate(aligned);
    }

    if let Some(dim) = vectors.dim() {
        if dim != embedder.dim() {
            repaired(
                &mut issues,
                format!(
                    "stored vectors have dimension {} but {} produces {}; recomputing them",
                    dim,
                    embedder.embedder_id(),
                    embedder.dim()
                ),
            );
            vectors = FlatL2Index::new();
        }
    }

    if vectors.count() > aligned {
        repaired(&mut issues, format!("dropping {} vectors with no chunk", vectors.count() - aligned));
        vectors.truncate(aligned);
    }

    if vectors.count() < aligned {
        let missing = corpus[vectors.count()..].to_vec();
        repaired(&mut issues, format!("recomputing {} missing vectors", missing.len()));
        let outcome = match embed_texts(embedder, missing, timeout, &CancellationToken::new()).await {
            Ok(embedded) => vectors.add(&embedded),
            Err(e) => Err(e),
        };
        if let Err(e) = outcome {
            let keep = vectors.count();
            repaired(&mut issues, format!("could not recompute vectors ({}); keeping the first {} chunks", e, keep));
            corpus.truncate(keep);
            metadata.truncate(keep);
        }
    }

    let snapshot = tokio::task::spawn_blocking(move || IndexSnapshot::from_parts(corpus, vectors, metadata))
        .await
        .map_err(join_err)??;
    Ok((snapshot, issues))
}

fn repaired(issues: &mut Vec<String>, message: String) {
    warn!("{}", message);
    issues.push(message);
}

fn join_err(e: tokio::task::JoinError) -> Error {
    Error::Operation(format!("background task failed: {}", e))
}
