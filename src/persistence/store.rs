//! JSON document holding every player ever flushed

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};

use crate::cache::PersistedRecord;
use crate::error::AppError;

/// Full on-disk mapping of SteamID64 to persisted fields.
/// Keys serialize as decimal strings.
pub type DurableDocument = BTreeMap<u64, PersistedRecord>;

/// Reads and rewrites the player data file.
///
/// Does no locking of its own; [`WriteBack`](super::WriteBack) serializes access.
#[derive(Debug, Clone)]
pub struct DurableStore {
    path: PathBuf,
}

impl DurableStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document.
    ///
    /// # Returns
    /// * `Ok(Some(doc))` - File exists and parsed
    /// * `Ok(None)` - File does not exist or is empty
    /// * `Err(AppError::StoreCorrupt)` - File exists but is not a valid document
    /// * `Err(AppError::Io)` - File could not be read
    pub async fn load(&self) -> Result<Option<DurableDocument>, AppError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| AppError::store_corrupt(self.path.display().to_string(), e.to_string()))
    }

    /// Reads the document, treating a missing, unreadable or corrupt file as empty.
    pub async fn load_or_empty(&self) -> DurableDocument {
        match self.load().await {
            Ok(Some(document)) => document,
            Ok(None) => {
                info!("No existing player data found at {}", self.path.display());
                DurableDocument::new()
            }
            Err(e) => {
                error!("Error reading existing player data: {e}");
                DurableDocument::new()
            }
        }
    }

    /// Replaces the file with `document`.
    ///
    /// The JSON is written to a sibling temporary file which is then renamed over
    /// the target, so readers never observe a partially written document.
    pub async fn write(&self, document: &DurableDocument) -> Result<(), AppError> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).await?;
        }

        let json = serde_json::to_vec(document)?;
        let tmp_path = self.tmp_path();

        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(&json).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = fs::rename(&tmp_path, &self.path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        debug!(
            "Wrote {} player records ({} bytes) to {}",
            document.len(),
            json.len(),
            self.path.display()
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
