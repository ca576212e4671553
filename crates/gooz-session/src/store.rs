//! Where the last-known game id lives between runs.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use gooz_protocol::GameId;
use serde::{Deserialize, Serialize};

use crate::SessionError;

/// Loads, saves, and clears the persisted game id.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → the store moves into the client's reducer
///   task and lives as long as the client.
///
/// The futures are `Send` for the same reason: the reducer task may run on
/// any worker thread.
///
/// # Example
///
/// ```rust
/// use gooz_protocol::GameId;
/// use gooz_session::{MemoryStore, SessionStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), gooz_session::SessionError> {
/// let store = MemoryStore::default();
/// assert_eq!(store.load_game_id().await?, None);
///
/// store.save_game_id(&GameId::from("00BF80D3")).await?;
/// assert_eq!(store.load_game_id().await?, Some(GameId::from("00BF80D3")));
/// # Ok(())
/// # }
/// ```
pub trait SessionStore: Send + Sync + 'static {
    /// Returns the stored game id, or `None` if nothing was saved.
    fn load_game_id(
        &self,
    ) -> impl Future<Output = Result<Option<GameId>, SessionError>> + Send;

    /// Replaces the stored game id.
    fn save_game_id(
        &self,
        game_id: &GameId,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Forgets the stored game id. Clearing an empty store is not an error.
    fn clear(&self) -> impl Future<Output = Result<(), SessionError>> + Send;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// A [`SessionStore`] that forgets everything when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    game_id: Mutex<Option<GameId>>,
}

impl MemoryStore {
    /// Creates a store that already holds `game_id`.
    pub fn with_game_id(game_id: GameId) -> Self {
        Self {
            game_id: Mutex::new(Some(game_id)),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<GameId>> {
        // A poisoned lock still holds a valid Option.
        self.game_id
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for MemoryStore {
    async fn load_game_id(&self) -> Result<Option<GameId>, SessionError> {
        Ok(self.slot().clone())
    }

    async fn save_game_id(&self, game_id: &GameId) -> Result<(), SessionError> {
        *self.slot() = Some(game_id.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        *self.slot() = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// On-disk shape: `{"gameId": "00BF80D3"}`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRecord {
    game_id: GameId,
}

/// A [`SessionStore`] backed by a JSON file.
///
/// The file is created on the first save, along with any missing parent
/// directories. A missing file reads as "no game id".
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store that reads and writes `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileStore {
    async fn load_game_id(&self) -> Result<Option<GameId>, SessionError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let record: SessionRecord =
            serde_json::from_slice(&bytes).map_err(|source| {
                SessionError::Corrupt {
                    path: self.path.clone(),
                    source,
                }
            })?;

        tracing::debug!(path = %self.path.display(), game_id = %record.game_id, "session restored");
        Ok(Some(record.game_id))
    }

    async fn save_game_id(&self, game_id: &GameId) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.io_error(e))?;
            }
        }

        let record = SessionRecord {
            game_id: game_id.clone(),
        };
        let bytes = serde_json::to_vec(&record).map_err(|source| {
            SessionError::Encode {
                path: self.path.clone(),
                source,
            }
        })?;

        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| self.io_error(e))?;

        tracing::debug!(path = %self.path.display(), %game_id, "session saved");
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}
