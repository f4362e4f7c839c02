use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use ragdb_core::error::{Error, Result};
use ragdb_core::types::ChunkRecord;
use ragdb_vector::FlatL2Index;

use crate::atomic::{sync_dir, write_atomic, StagedFile};
use crate::manifest::Manifest;

pub const CORPUS_FILE: &str = "corpus.json";
pub const METADATA_FILE: &str = "metadata.json";
pub const VECTORS_FILE: &str = "vectors.bin";
pub const MANIFEST_FILE: &str = "manifest.json";
const GENERATION_PREFIX: &str = "gen-";

/// Everything recovered from a namespace. Missing or unreadable artifacts come
/// back empty and are described in `issues`; the three structures are not
/// guaranteed to agree with each other.
#[derive(Debug, Default)]
pub struct LoadedIndex {
    pub corpus: Vec<String>,
    pub metadata: Vec<ChunkRecord>,
    pub vectors: FlatL2Index,
    pub manifest: Option<Manifest>,
    pub issues: Vec<String>,
}

impl LoadedIndex {
    pub fn is_aligned(&self) -> bool {
        self.corpus.len() == self.metadata.len() && self.metadata.len() == self.vectors.count()
    }
}

/// Directory namespace holding the persisted index.
///
/// ```text
/// <dir>/manifest.json          publish point, names the live generation
/// <dir>/gen-00000007/corpus.json
/// <dir>/gen-00000007/metadata.json
/// <dir>/gen-00000007/vectors.bin
/// ```
pub struct IndexStore {
    dir: PathBuf,
    generation: AtomicU64,
}

impl IndexStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let mut store = Self { dir: dir.into(), generation: AtomicU64::new(0) };
        let generation = fs::read(store.path(MANIFEST_FILE))
            .ok()
            .and_then(|b| serde_json::from_slice::<Manifest>(&b).ok())
            .map(|m| m.generation)
            .or_else(|| store.newest_generation())
            .unwrap_or(0);
        *store.generation.get_mut() = generation;
        store
    }

    pub fn dir(&self) -> &Path { &self.dir }

    /// Generation of the last save this store made or observed.
    pub fn generation(&self) -> u64 { self.generation.load(Ordering::SeqCst) }

    /// Directory holding the artifacts of `generation`.
    pub fn generation_dir(&self, generation: u64) -> PathBuf {
        self.dir.join(format!("{}{:08}", GENERATION_PREFIX, generation))
    }

    fn path(&self, name: &str) -> PathBuf { self.dir.join(name) }

    /// True when a manifest or any generation directory is present.
    pub fn exists(&self) -> bool {
        self.path(MANIFEST_FILE).exists() || self.newest_generation().is_some()
    }

    /// Persist the three structures as the next generation.
    ///
    /// The artifacts are written and synced into a new generation directory
    /// that nothing reads yet. Replacing the root manifest is the single step
    /// that publishes it; if anything fails before that, the directory is
    /// removed and the previous generation stays live.
    #[instrument(skip_all, fields(dir = %self.dir.display(), chunks = corpus.len()))]
    pub fn save(&self, corpus: &[String], metadata: &[ChunkRecord], vectors: &FlatL2Index) -> Result<Manifest> {
        if corpus.len() != metadata.len() || metadata.len() != vectors.count() {
            return Err(Error::InvalidInput(format!(
                "refusing to save misaligned index: corpus={} metadata={} vectors={}",
                corpus.len(),
                metadata.len(),
                vectors.count()
            )));
        }
        let corpus_bytes = to_json(corpus)?;
        let metadata_bytes = to_json(metadata)?;
        let vector_bytes = vectors.to_bytes();
        let generation = self.generation() + 1;
        let manifest = Manifest::new(generation, corpus.len(), vectors.dim());
        let manifest_bytes = to_json(&manifest)?;

        let target = self.generation_dir(generation);
        fs::create_dir_all(&target).map_err(|e| Error::persistence(&target, e))?;
        let published = self
            .write_generation(
                &target,
                [(CORPUS_FILE, &corpus_bytes), (METADATA_FILE, &metadata_bytes), (VECTORS_FILE, &vector_bytes)],
            )
            .and_then(|()| write_atomic(&self.path(MANIFEST_FILE), &manifest_bytes));
        if let Err(e) = published {
            warn!(generation, error = %e, "save failed; discarding unpublished generation");
            if let Err(cleanup) = fs::remove_dir_all(&target) {
                warn!(dir = %target.display(), error = %cleanup, "could not remove unpublished generation");
            }
            return Err(e);
        }

        self.generation.store(generation, Ordering::SeqCst);
        self.prune(generation);
        info!(
            generation,
            bytes = corpus_bytes.len() + metadata_bytes.len() + vector_bytes.len(),
            "index saved"
        );
        Ok(manifest)
    }

    fn write_generation(&self, target: &Path, artifacts: [(&str, &Vec<u8>); 3]) -> Result<()> {
        for (name, bytes) in artifacts {
            StagedFile::stage(&target.join(name), bytes)?.commit()?;
        }
        sync_dir(target);
        sync_dir(&self.dir);
        Ok(())
    }

    /// Remove every generation directory except `keep`.
    fn prune(&self, keep: u64) {
        for (generation, path) in self.generation_dirs() {
            if generation == keep {
                continue;
            }
            match fs::remove_dir_all(&path) {
                Ok(()) => debug!(generation, "removed superseded generation"),
                Err(e) => warn!(generation, error = %e, "could not remove superseded generation"),
            }
        }
    }

    fn generation_dirs(&self) -> Vec<(u64, PathBuf)> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|e| parse_generation(&e.file_name().to_string_lossy()).map(|g| (g, e.path())))
            .collect()
    }

    fn newest_generation(&self) -> Option<u64> {
        self.generation_dirs().into_iter().map(|(g, _)| g).max()
    }

    /// Read whatever the namespace holds. Never fails: an artifact that is
    /// missing, unreadable or corrupt is replaced by an empty default.
    ///
    /// The manifest decides which generation is live. Without a usable
    /// manifest the newest generation directory is read instead.
    #[instrument(skip_all, fields(dir = %self.dir.display()))]
    pub fn load(&self) -> LoadedIndex {
        let mut loaded = LoadedIndex::default();
        if !self.exists() {
            info!("no persisted index; starting empty");
            return loaded;
        }

        loaded.manifest = read_json::<Manifest>(&self.path(MANIFEST_FILE), &mut loaded.issues);
        let live = match &loaded.manifest {
            Some(manifest) => Some(manifest.generation),
            None => {
                let newest = self.newest_generation();
                if let Some(generation) = newest {
                    let msg = format!("no usable manifest; falling back to generation {}", generation);
                    warn!("{}", msg);
                    loaded.issues.push(msg);
                }
                newest
            }
        };
        if let Some(generation) = live {
            self.generation.fetch_max(generation, Ordering::SeqCst);
            self.read_generation(generation, &mut loaded);
        }

        info!(
            generation = live.unwrap_or(0),
            chunks = loaded.corpus.len(),
            records = loaded.metadata.len(),
            vectors = loaded.vectors.count(),
            issues = loaded.issues.len(),
            "index loaded"
        );
        loaded
    }

    fn read_generation(&self, generation: u64, loaded: &mut LoadedIndex) {
        let dir = self.generation_dir(generation);
        let issues = &mut loaded.issues;
        loaded.corpus = read_json::<Vec<String>>(&dir.join(CORPUS_FILE), issues).unwrap_or_default();
        loaded.metadata = read_json::<Vec<ChunkRecord>>(&dir.join(METADATA_FILE), issues).unwrap_or_default();
        let vectors_path = dir.join(VECTORS_FILE);
        loaded.vectors = read_bytes(&vectors_path, issues)
            .and_then(|bytes| match FlatL2Index::from_bytes(&bytes) {
                Ok(index) => Some(index),
                Err(e) => {
                    report(issues, Error::corrupt(&vectors_path, e.to_string()));
                    None
                }
            })
            .unwrap_or_default();

        if let Some(pos) = loaded.metadata.iter().enumerate().position(|(i, r)| r.global_index != i) {
            let claimed = loaded.metadata[pos].global_index;
            report(
                &mut loaded.issues,
                Error::corrupt(
                    dir.join(METADATA_FILE),
                    format!("record at position {} claims global index {}; keeping the first {}", pos, claimed, pos),
                ),
            );
            loaded.metadata.truncate(pos);
        }

        if let Some(manifest) = &loaded.manifest {
            if manifest.chunks != loaded.corpus.len() {
                let msg = format!(
                    "manifest generation {} records {} chunks but corpus holds {}",
                    manifest.generation,
                    manifest.chunks,
                    loaded.corpus.len()
                );
                warn!("{}", msg);
                loaded.issues.push(msg);
            }
        }
    }
}

fn parse_generation(name: &str) -> Option<u64> {
    name.strip_prefix(GENERATION_PREFIX)?.parse().ok()
}

fn read_bytes(path: &Path, issues: &mut Vec<String>) -> Option<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let msg = format!("{} missing; starting it empty", path.display());
            warn!("{}", msg);
            issues.push(msg);
            None
        }
        Err(e) => {
            report(issues, Error::persistence(path, e));
            None
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, issues: &mut Vec<String>) -> Option<T> {
    let bytes = read_bytes(path, issues)?;
    match serde_json::from_slice(&bytes) {
        Ok(value) => {
            debug!(artifact = %path.display(), bytes = bytes.len(), "artifact read");
            Some(value)
        }
        Err(e) => {
            report(issues, Error::corrupt(path, e.to_string()));
            None
        }
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| Error::Operation(format!("serialization failed: {}", e)))
}

fn report(issues: &mut Vec<String>, err: Error) {
    warn!(error = %err, "degrading artifact to empty default");
    issues.push(err.to_string());
}
