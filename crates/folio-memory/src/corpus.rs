//! Corpus loading from a directory of text, markdown, and PDF files.

use crate::error::MemoryError;
use crate::Result;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use walkdir::WalkDir;

/// Extensions read by default.
pub const DEFAULT_EXTENSIONS: &[&str] = &["txt", "md", "pdf"];

/// A source file's extracted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Path relative to the corpus root, with `/` separators.
    pub source_id: String,

    /// Extracted text.
    pub text: String,
}

impl Document {
    /// Create a new document.
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            text: text.into(),
        }
    }
}

/// Walks a corpus directory and extracts text from supported files.
#[derive(Debug, Clone)]
pub struct CorpusLoader {
    root: PathBuf,
    extensions: Vec<String>,
}

impl CorpusLoader {
    /// Create a loader for `root` with the default extensions.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Restrict loading to the given extensions (without leading dots).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Corpus root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load every supported file under the root, in path order.
    ///
    /// Unreadable files are logged and skipped. A missing root yields an
    /// empty corpus.
    pub async fn load(&self) -> Vec<Document> {
        if !self.root.is_dir() {
            tracing::warn!(root = %self.root.display(), "Corpus directory not found");
            return Vec::new();
        }

        let mut documents = Vec::new();
        for path in self.discover() {
            match self.load_file(&path).await {
                Ok(doc) if doc.text.trim().is_empty() => {
                    tracing::debug!(source = %doc.source_id, "Skipping empty document");
                }
                Ok(doc) => documents.push(doc),
                Err(e) => tracing::warn!("Skipping corpus file: {}", e),
            }
        }

        tracing::info!(
            root = %self.root.display(),
            documents = documents.len(),
            "Loaded corpus"
        );
        documents
    }

    /// Load a single file.
    pub async fn load_file(&self, path: &Path) -> Result<Document> {
        let extension = extension_of(path)
            .ok_or_else(|| MemoryError::ingestion(path, "file has no extension"))?;

        let text = match extension.as_str() {
            "pdf" => extract_pdf(path).await?,
            _ => read_text(path).await?,
        };

        Ok(Document::new(self.source_id(path), text))
    }

    fn discover(&self) -> Vec<PathBuf> {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Failed to read corpus entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                extension_of(path).map_or(false, |ext| self.extensions.contains(&ext))
            })
            .collect()
    }

    fn source_id(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Load all default-extension documents under `dir`.
pub async fn load_documents(dir: impl Into<PathBuf>) -> Vec<Document> {
    CorpusLoader::new(dir).load().await
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

async fn read_text(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| MemoryError::ingestion(path, e.to_string()))?;

    String::from_utf8(bytes).map_err(|_| MemoryError::ingestion(path, "not valid UTF-8"))
}

async fn extract_pdf(path: &Path) -> Result<String> {
    let output = Command::new("pdftotext")
        .args(["-layout", "-enc", "UTF-8"])
        .arg(path)
        .arg("-")
        .output()
        .await
        .map_err(|e| MemoryError::ingestion(path, format!("failed to run pdftotext: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MemoryError::ingestion(
            path,
            format!("pdftotext exited with {}: {}", output.status, stderr.trim()),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_corpus() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b_bio.txt"), "I design data platforms.").unwrap();
        fs::create_dir(dir.path().join("projects")).unwrap();
        fs::write(dir.path().join("projects").join("a.MD"), "# Projects\nStream processing.").unwrap();
        fs::write(dir.path().join("photo.bin"), [0u8, 1, 2]).unwrap();
        fs::write(dir.path().join("broken.txt"), [0xffu8, 0xfe, 0xfd]).unwrap();
        fs::write(dir.path().join("blank.txt"), "  \n").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_load_supported_files_in_order() {
        let dir = write_corpus();
        let docs = CorpusLoader::new(dir.path()).load().await;

        let ids: Vec<_> = docs.iter().map(|d| d.source_id.as_str()).collect();
        assert_eq!(ids, vec!["b_bio.txt", "projects/a.MD"]);
        assert_eq!(docs[0].text, "I design data platforms.");
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let docs = load_documents(dir.path().join("nope")).await;
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_with_extensions() {
        let dir = write_corpus();
        let docs = CorpusLoader::new(dir.path())
            .with_extensions([".md"])
            .load()
            .await;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source_id, "projects/a.MD");
    }

    #[tokio::test]
    async fn test_load_file_reports_invalid_utf8() {
        let dir = write_corpus();
        let loader = CorpusLoader::new(dir.path());
        let err = loader.load_file(&dir.path().join("broken.txt")).await.unwrap_err();
        assert!(matches!(err, MemoryError::Ingestion { .. }));
    }
}
