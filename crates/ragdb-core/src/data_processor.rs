use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::types::SourceDocument;

/// Collects plain-text documents from a directory tree.
///
/// Each `.txt` file becomes one [`SourceDocument`]: the path relative to the
/// root, without its extension and with `/` separators, is the document id,
/// and the relative path itself is the filename.
#[derive(Debug, Default)]
pub struct DataProcessor {
    limit: Option<usize>,
}

impl DataProcessor {
    pub fn new() -> Self { Self::default() }

    /// Only take the first `limit` files (in path order).
    pub fn with_limit(limit: usize) -> Self { Self { limit: Some(limit) } }

    pub fn process_directory(&self, data_dir: &Path) -> Result<Vec<SourceDocument>> {
        let mut files = self.list_txt_files(data_dir);
        if files.is_empty() {
            info!(dir = %data_dir.display(), "no .txt files found");
            return Ok(vec![]);
        }
        if let Some(limit) = self.limit {
            if files.len() > limit {
                files.truncate(limit);
                info!(limit, "limited to first files");
            }
        }
        let mut documents = Vec::with_capacity(files.len());
        for (file_index, file_path) in files.iter().enumerate() {
            debug!(file = %file_path.display(), n = file_index + 1, total = files.len(), "reading");
            let text = self.read_file_content(file_path)?;
            if text.trim().is_empty() {
                debug!(file = %file_path.display(), "skipping blank file");
                continue;
            }
            documents.push(SourceDocument {
                document_id: self.extract_doc_id(file_path, data_dir),
                filename: self.relative_name(file_path, data_dir),
                text,
            });
        }
        info!(files = files.len(), documents = documents.len(), "collected source documents");
        Ok(documents)
    }

    fn read_file_content(&self, file_path: &Path) -> Result<String> {
        match fs::read_to_string(file_path) {
            Ok(content) => Ok(content),
            Err(_) => {
                let bytes = fs::read(file_path).with_context(|| format!("failed to read {}", file_path.display()))?;
                Ok(String::from_utf8_lossy(&bytes).to_string())
            }
        }
    }

    fn extract_doc_id(&self, file_path: &Path, data_dir: &Path) -> String {
        let relative = file_path.strip_prefix(data_dir).unwrap_or(file_path).with_extension("");
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn relative_name(&self, file_path: &Path, data_dir: &Path) -> String {
        file_path.strip_prefix(data_dir).unwrap_or(file_path).to_string_lossy().to_string()
    }

    fn list_txt_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut txt_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path().to_path_buf())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("txt"))
            .collect();
        txt_files.sort();
        txt_files
    }
}
