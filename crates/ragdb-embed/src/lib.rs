//! Embedding providers behind the [`Embedder`] trait.
//!
//! `hash` is a deterministic feature-hashing provider with no model files;
//! `bert` runs a local sentence-transformer checkpoint through candle.
//! `APP_USE_FAKE_EMBEDDINGS=1` forces the hashing provider regardless of
//! settings, which keeps tests and CI free of model downloads.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use tracing::info;

use ragdb_core::config::{EmbeddingProviderKind, EmbeddingSettings};
use ragdb_core::traits::Embedder;

pub mod bert;
pub mod device;
pub mod hash;
pub mod pool;
pub mod tokenize;

pub use bert::BertEmbedder;
pub use hash::HashEmbedder;
pub use pool::masked_mean_l2;

const DEFAULT_MODEL_DIR: &str = "models/all-MiniLM-L6-v2";

pub fn use_fake_embeddings() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Build the provider selected by `settings`.
pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Box<dyn Embedder>> {
    if use_fake_embeddings() || settings.provider == EmbeddingProviderKind::Hash {
        info!(dim = settings.dim, "using hashing embedder");
        return Ok(Box::new(HashEmbedder::new(settings.dim)));
    }
    let model_dir = resolve_model_dir(settings.model_dir.as_deref())?;
    Ok(Box::new(BertEmbedder::from_dir(&model_dir, settings.max_len)?))
}

/// First existing directory among: `configured`, `APP_MODEL_DIR`, `MODEL_DIR`,
/// then `models/all-MiniLM-L6-v2`.
pub fn resolve_model_dir(configured: Option<&str>) -> Result<PathBuf> {
    let candidates = configured
        .map(ragdb_core::config::expand_path)
        .into_iter()
        .chain(std::env::var("APP_MODEL_DIR").ok().map(PathBuf::from))
        .chain(std::env::var("MODEL_DIR").ok().map(PathBuf::from))
        .chain(std::iter::once(Path::new(DEFAULT_MODEL_DIR).to_path_buf()));
    for candidate in candidates {
        if candidate.is_dir() {
            info!(dir = %candidate.display(), "using model dir");
            return Ok(candidate);
        }
    }
    Err(anyhow!("Could not locate an embedding model directory (set embedding.model_dir or APP_MODEL_DIR)"))
}
