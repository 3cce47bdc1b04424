//! File-backed layout store.
//!
//! Each owner gets one JSON file holding its namespaced attributes:
//! - Linux: ~/.local/share/quickslot/layouts/<owner>.json
//! - macOS: ~/Library/Application Support/io.quickslot.quickslot/layouts/<owner>.json
//!
//! The layout occupies the `quickslot.layout` key; other keys in the file
//! are preserved. Writes go to a temporary file which is then renamed over
//! the original, so a failed write never leaves a truncated record.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use quickslot_domain::OwnerId;
use serde_json::{Map, Value};

use super::record::{PersistedLayout, LAYOUT_NAMESPACE};
use crate::infrastructure::ports::{LayoutStore, RepoError};

pub struct FileLayoutStore {
    dir: PathBuf,
}

impl FileLayoutStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        tracing::debug!(dir = %dir.display(), "File layout store initialized");
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, owner: &OwnerId) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(owner)))
    }

    async fn read_attributes(&self, path: &Path) -> Result<Map<String, Value>, RepoError> {
        let data = match tokio::fs::read_to_string(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(RepoError::storage("read_layout", e)),
        };
        match serde_json::from_str::<Value>(&data).map_err(RepoError::serialization)? {
            Value::Object(map) => Ok(map),
            _ => Err(RepoError::serialization(format!(
                "{} does not hold an attribute object",
                path.display()
            ))),
        }
    }

    async fn write_attributes(
        &self,
        path: &Path,
        attributes: &Map<String, Value>,
    ) -> Result<(), RepoError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| RepoError::storage("create_layout_dir", e))?;

        let data = serde_json::to_string_pretty(attributes).map_err(RepoError::serialization)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, data)
            .await
            .map_err(|e| RepoError::storage("write_layout", e))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| RepoError::storage("write_layout", e))
    }
}

#[async_trait]
impl LayoutStore for FileLayoutStore {
    async fn load(&self, owner: &OwnerId) -> Result<Option<PersistedLayout>, RepoError> {
        let mut attributes = self.read_attributes(&self.path_for(owner)).await?;
        attributes
            .remove(LAYOUT_NAMESPACE)
            .map(PersistedLayout::from_value)
            .transpose()
    }

    async fn save(&self, owner: &OwnerId, record: &PersistedLayout) -> Result<(), RepoError> {
        let path = self.path_for(owner);
        let mut attributes = self.read_attributes(&path).await?;
        attributes.insert(LAYOUT_NAMESPACE.to_string(), record.to_value()?);
        self.write_attributes(&path, &attributes).await?;
        tracing::debug!(owner = %owner, path = %path.display(), "Layout saved");
        Ok(())
    }

    async fn delete(&self, owner: &OwnerId) -> Result<(), RepoError> {
        let path = self.path_for(owner);
        let mut attributes = self.read_attributes(&path).await?;
        if attributes.remove(LAYOUT_NAMESPACE).is_none() {
            return Ok(());
        }
        if attributes.is_empty() {
            return match tokio::fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(RepoError::storage("delete_layout", e)),
            };
        }
        self.write_attributes(&path, &attributes).await
    }
}

/// Reversible file name for an owner id: `[A-Za-z0-9._-]` is kept, every
/// other byte becomes `%xx`.
fn file_stem(owner: &OwnerId) -> String {
    let mut stem = String::with_capacity(owner.as_str().len());
    for byte in owner.as_str().bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.') {
            stem.push(char::from(byte));
        } else {
            stem.push('%');
            stem.push_str(&hex::encode([byte]));
        }
    }
    stem
}
