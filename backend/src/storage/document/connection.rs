use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// DocumentConnection owns the base directory and the per-collection
/// read/write primitives both repositories are built from.
#[derive(Clone)]
pub struct DocumentConnection {
    base_directory: PathBuf,
}

impl DocumentConnection {
    /// Open (creating if needed) the data directory.
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .with_context(|| format!("creating data directory {:?}", base_path))?;
        }
        Ok(Self {
            base_directory: base_path,
        })
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.base_directory.join(collection)
    }

    fn document_path(&self, collection: &str, id: &str) -> PathBuf {
        self.collection_dir(collection).join(format!("{}.json", id))
    }

    /// Write one document atomically: serialize to a temp file in the same
    /// directory, then rename over the final path.
    pub fn write_document<T: Serialize>(&self, collection: &str, id: &str, doc: &T) -> Result<()> {
        let dir = self.collection_dir(collection);
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let path = self.document_path(collection, id);
        let json = serde_json::to_string_pretty(doc)?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &path)?;
        Ok(())
    }

    /// Read one document by id; missing file means a clean miss.
    pub fn read_document<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<Option<T>> {
        let path = self.document_path(collection, id);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let doc = serde_json::from_str(&content)
            .with_context(|| format!("malformed document {:?}", path))?;
        Ok(Some(doc))
    }

    /// Load every document in a collection. Files that fail to parse are
    /// skipped with a warning rather than poisoning the whole scan.
    pub fn scan_collection<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        let dir = self.collection_dir(collection);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut docs = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            match serde_json::from_str(&content) {
                Ok(doc) => docs.push(doc),
                Err(e) => {
                    warn!("skipping malformed document {:?}: {}", path, e);
                }
            }
        }
        Ok(docs)
    }

    /// Delete one document; returns true if it existed.
    pub fn delete_document(&self, collection: &str, id: &str) -> Result<bool> {
        let path = self.document_path(collection, id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        Ok(true)
    }
}
