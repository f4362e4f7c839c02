#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ragdb_core::chunker::ChunkingConfig;
use ragdb_core::config::Settings;
use ragdb_core::traits::Embedder;
use ragdb_embed::HashEmbedder;
use ragdb_hybrid::HybridEngine;
use ragdb_store::IndexStore;

pub fn settings() -> Settings {
    Settings::default()
}

pub fn small_chunk_settings() -> Settings {
    Settings { chunking: ChunkingConfig::new(4, 1).unwrap(), ..Settings::default() }
}

pub async fn open_with(dir: &Path, embedder: Arc<dyn Embedder>, settings: &Settings) -> HybridEngine {
    HybridEngine::open(IndexStore::new(dir), embedder, settings).await.expect("open engine")
}

pub async fn open_hash(dir: &Path) -> HybridEngine {
    open_with(dir, Arc::new(HashEmbedder::new(64)), &settings()).await
}

/// Path of `name` inside the generation the namespace currently publishes.
pub fn live_artifact(dir: &Path, name: &str) -> PathBuf {
    let store = IndexStore::new(dir);
    store.generation_dir(store.generation()).join(name)
}

/// Fixed vectors per exact text; anything else maps to the origin.
pub struct TableEmbedder {
    dim: usize,
    table: HashMap<String, Vec<f32>>,
}

impl TableEmbedder {
    pub fn new(dim: usize, entries: &[(&str, Vec<f32>)]) -> Self {
        let table = entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        Self { dim, table }
    }
}

impl Embedder for TableEmbedder {
    fn embedder_id(&self) -> &str { "table" }
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { usize::MAX }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.table.get(t).cloned().unwrap_or_else(|| vec![0.0; self.dim])).collect())
    }
}

/// Hash embeddings delivered after a fixed delay.
pub struct SlowEmbedder {
    inner: HashEmbedder,
    delay: Duration,
}

impl SlowEmbedder {
    pub fn new(delay: Duration) -> Self { Self { inner: HashEmbedder::new(16), delay } }
}

impl Embedder for SlowEmbedder {
    fn embedder_id(&self) -> &str { "slow" }
    fn dim(&self) -> usize { self.inner.dim() }
    fn max_len(&self) -> usize { usize::MAX }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        std::thread::sleep(self.delay);
        self.inner.embed_batch(texts)
    }
}

/// Embedder whose output dimension can be changed between calls.
pub struct SwitchableEmbedder {
    dim: AtomicUsize,
}

impl SwitchableEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim: AtomicUsize::new(dim) } }
    pub fn set_dim(&self, dim: usize) { self.dim.store(dim, Ordering::SeqCst); }
}

impl Embedder for SwitchableEmbedder {
    fn embedder_id(&self) -> &str { "switchable" }
    fn dim(&self) -> usize { self.dim.load(Ordering::SeqCst) }
    fn max_len(&self) -> usize { usize::MAX }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        HashEmbedder::new(self.dim()).embed_batch(texts)
    }
}

/// Always fails.
pub struct BrokenEmbedder;

impl Embedder for BrokenEmbedder {
    fn embedder_id(&self) -> &str { "broken" }
    fn dim(&self) -> usize { 8 }
    fn max_len(&self) -> usize { usize::MAX }
    fn embed_batch(&self, _texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        anyhow::bail!("provider unreachable")
    }
}
