//! Persistence adapter
//!
//! Each store loads its records once at startup and writes the full
//! collection back after every mutation. Writes are best-effort: a failed
//! save is logged and never reported to the store.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;

/// Load/save boundary between a store and its backing storage
#[async_trait]
pub trait PersistenceAdapter<T>: Send + Sync {
    /// Load all records, falling back to (and writing back) the seed
    /// collection when nothing usable is stored.
    async fn load(&self) -> Vec<T>;

    /// Persist all records. Failures are swallowed.
    async fn save(&self, records: &[T]);
}

/// Stores records as a pretty-printed JSON array in a single file
pub struct JsonFileAdapter<T> {
    path: PathBuf,
    seed: Vec<T>,
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonFileAdapter<T> {
    pub fn new(path: impl Into<PathBuf>, seed: Vec<T>) -> Self {
        Self {
            path: path.into(),
            seed,
            _record: PhantomData,
        }
    }
}

async fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> std::io::Result<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(std::io::Error::other)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(path, bytes).await
}

#[async_trait]
impl<T> PersistenceAdapter<T> for JsonFileAdapter<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    async fn load(&self) -> Vec<T> {
        match fs::read(&self.path).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<T>>(&bytes) {
                Ok(records) => {
                    tracing::debug!(path = ?self.path, count = records.len(), "Loaded records");
                    return records;
                }
                Err(err) => {
                    tracing::warn!(path = ?self.path, error = %err, "Stored records are corrupt, reseeding");
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = ?self.path, "No stored records, seeding");
            }
            Err(err) => {
                tracing::warn!(path = ?self.path, error = %err, "Failed to read stored records, reseeding");
            }
        }

        self.save(&self.seed).await;
        self.seed.clone()
    }

    async fn save(&self, records: &[T]) {
        if let Err(err) = write_json_pretty(&self.path, records).await {
            tracing::warn!(path = ?self.path, error = %err, "Failed to persist records");
        }
    }
}
