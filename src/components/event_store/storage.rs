use crate::error::{storage_error, AppResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// Durable key-value mirror holding the serialized event collection under a single key
#[async_trait]
pub trait EventStorage: Send + Sync + 'static {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Read the snapshot, None when nothing has been stored yet
    async fn load(&self) -> AppResult<Option<String>>;

    /// Replace the snapshot
    async fn save(&self, snapshot: &str) -> AppResult<()>;
}

/// In-memory implementation of the storage (for testing and the `memory` backend)
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    snapshot: RwLock<Option<String>>,
    offline: AtomicBool,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing snapshot
    pub fn with_snapshot(snapshot: impl Into<String>) -> Self {
        Self {
            snapshot: RwLock::new(Some(snapshot.into())),
            offline: AtomicBool::new(false),
        }
    }

    /// Current stored snapshot
    pub async fn snapshot(&self) -> Option<String> {
        self.snapshot.read().await.clone()
    }

    /// Make every load and save fail
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> AppResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(storage_error("In-memory storage offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl EventStorage for InMemoryStorage {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self) -> AppResult<Option<String>> {
        self.check_online()?;
        Ok(self.snapshot.read().await.clone())
    }

    async fn save(&self, snapshot: &str) -> AppResult<()> {
        self.check_online()?;
        *self.snapshot.write().await = Some(snapshot.to_string());
        Ok(())
    }
}

/// JSON file per key inside a data directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(data_dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{}.json", key)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EventStorage for FileStorage {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn load(&self) -> AppResult<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No snapshot at {}", self.path.display());
                Ok(None)
            }
            Err(e) => Err(storage_error(&format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn save(&self, snapshot: &str) -> AppResult<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        // Write aside, then swap in
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, snapshot).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!("Wrote {} bytes to {}", snapshot.len(), self.path.display());
        Ok(())
    }
}
