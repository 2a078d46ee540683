//! Document loaders and the extension registry used by ingestion

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::parser::FileParser;
use crate::error::{Error, Result};
use crate::types::{Document, DocumentMetadata, FileType};

/// Reads one file into zero or more documents
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Load a file. Every returned document carries `source`/`path` for the file.
    async fn load(&self, path: &Path) -> Result<Vec<Document>>;

    /// Lower-case extensions this loader handles
    fn extensions(&self) -> &[&'static str];
}

/// Loader for one built-in format, backed by [`FileParser`]
pub struct FormatLoader {
    file_type: FileType,
    extensions: [&'static str; 1],
}

impl FormatLoader {
    pub fn new(file_type: FileType) -> Self {
        Self {
            file_type,
            extensions: [file_type.extension()],
        }
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }
}

#[async_trait]
impl DocumentLoader for FormatLoader {
    async fn load(&self, path: &Path) -> Result<Vec<Document>> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| Error::load(path, format!("cannot read file: {}", e)))?;

        let owned_path = path.to_path_buf();
        let file_type = self.file_type;
        let pages = tokio::task::spawn_blocking(move || FileParser::parse(&owned_path, file_type, &data))
            .await
            .map_err(|e| Error::load(path, format!("parser task failed: {}", e)))??;

        let base = DocumentMetadata::for_file(path);
        Ok(pages
            .into_iter()
            .map(|page| {
                let mut metadata = base.clone();
                metadata.page = page.page;
                Document::new(page.text, metadata)
            })
            .collect())
    }

    fn extensions(&self) -> &[&'static str] {
        &self.extensions
    }
}

/// Maps lower-cased file extensions to loaders
#[derive(Clone, Default)]
pub struct LoaderRegistry {
    loaders: HashMap<String, Arc<dyn DocumentLoader>>,
}

impl LoaderRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed set of formats: txt, md, csv, plus pdf and docx when enabled
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(FormatLoader::new(FileType::Txt)));
        registry.register(Arc::new(FormatLoader::new(FileType::Markdown)));
        registry.register(Arc::new(FormatLoader::new(FileType::Csv)));
        #[cfg(feature = "pdf")]
        registry.register(Arc::new(FormatLoader::new(FileType::Pdf)));
        #[cfg(feature = "docx")]
        registry.register(Arc::new(FormatLoader::new(FileType::Docx)));
        registry
    }

    /// Register a loader for every extension it declares, replacing earlier ones
    pub fn register(&mut self, loader: Arc<dyn DocumentLoader>) {
        for ext in loader.extensions() {
            self.loaders.insert(ext.to_ascii_lowercase(), Arc::clone(&loader));
        }
    }

    /// Loader for a path, matched on its lower-cased extension
    pub fn loader_for(&self, path: &Path) -> Option<Arc<dyn DocumentLoader>> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.loaders.get(&ext).cloned()
    }

    /// Registered extensions, sorted
    pub fn extensions(&self) -> Vec<String> {
        let mut exts: Vec<String> = self.loaders.keys().cloned().collect();
        exts.sort();
        exts
    }
}

impl std::fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("extensions", &self.extensions())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_registry_dispatch_is_case_insensitive() {
        let registry = LoaderRegistry::with_defaults();
        assert!(registry.loader_for(&PathBuf::from("docs/FAQ.TXT")).is_some());
        assert!(registry.loader_for(&PathBuf::from("docs/guide.md")).is_some());
        assert!(registry.loader_for(&PathBuf::from("docs/table.xlsx")).is_none());
        assert!(registry.loader_for(&PathBuf::from("docs/Makefile")).is_none());
    }

    #[test]
    fn test_default_extensions() {
        let exts = LoaderRegistry::with_defaults().extensions();
        for ext in ["csv", "md", "txt"] {
            assert!(exts.iter().any(|e| e == ext));
        }
        #[cfg(feature = "pdf")]
        assert!(exts.iter().any(|e| e == "pdf"));
    }

    #[tokio::test]
    async fn test_text_loader_stamps_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shipping.txt");
        std::fs::write(&path, "We ship worldwide.").unwrap();

        let docs = FormatLoader::new(FileType::Txt).load(&path).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "We ship worldwide.");
        assert_eq!(docs[0].metadata.source, "shipping.txt");
        assert_eq!(docs[0].metadata.path, path.to_string_lossy());
        assert_eq!(docs[0].metadata.page, None);
    }

    #[tokio::test]
    async fn test_missing_file_is_load_error() {
        let err = FormatLoader::new(FileType::Txt)
            .load(Path::new("/definitely/not/here.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
    }
}
