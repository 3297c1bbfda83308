use super::{Collection, DocumentStore};
use crate::error::{AuditError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Directory-backed store holding one `<collection>.jsonl` file per collection.
#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn collection_path(&self, collection: Collection) -> PathBuf {
        self.root.join(format!("{}.jsonl", collection.as_str()))
    }
}

#[async_trait]
impl DocumentStore for JsonStore {
    async fn drop_collection(&self, collection: Collection) -> Result<()> {
        match fs::remove_file(self.collection_path(collection)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn insert_many(&self, collection: Collection, documents: Vec<Value>) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        fs::create_dir_all(&self.root).await?;

        let mut buffer = Vec::new();
        for document in &documents {
            serde_json::to_writer(&mut buffer, document)?;
            buffer.push(b'\n');
        }

        let path = self.collection_path(collection);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(&buffer).await?;
        file.flush().await?;
        file.sync_data().await?;

        debug!(path = %path.display(), documents = documents.len(), "appended documents");
        Ok(documents.len())
    }

    async fn find_all(&self, collection: Collection) -> Result<Vec<Value>> {
        let raw = match fs::read_to_string(self.collection_path(collection)).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        raw.lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(position, line)| {
                serde_json::from_str(line).map_err(|source| AuditError::MalformedDocument {
                    collection,
                    position,
                    source,
                })
            })
            .collect()
    }
}
