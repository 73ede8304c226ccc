//! Tag persistence: the async store trait and its JSON-file implementation.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};

use crate::state::Unit;

/// What: Error raised while persisting or reading user tags.
///
/// Inputs: Generated by [`TagPersistence`] implementations and [`load_tags`].
///
/// Output: Implements `Display`/`Error` for ergonomic propagation.
#[derive(Debug)]
pub enum PersistError {
    /// Filesystem failure.
    Io(std::io::Error),
    /// Serialization or deserialization failure.
    Json(serde_json::Error),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "tag store I/O error: {err}"),
            Self::Json(err) => write!(f, "tag store JSON error: {err}"),
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for PersistError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// What: External sink for user tag edits.
///
/// Inputs:
/// - `units`: Full record list; implementations persist each record's tags.
///
/// Output:
/// - Future resolving once the tags are stored.
///
/// # Errors
/// - Implementations return `Err(PersistError)` when the store cannot be written.
///
/// Details:
/// - The engine awaits the call and then bumps its tag version so cached tag
///   option names are rebuilt.
pub trait TagPersistence {
    /// Persist the tags of every record in `units`.
    fn save_tags(&self, units: &[Unit]) -> impl Future<Output = Result<(), PersistError>> + Send;
}

/// What: Tag store backed by a JSON file of `{unitName: [tags]}`.
///
/// Inputs:
/// - `path`: Target file; parent directories are created on save.
///
/// Output:
/// - Rewrites the whole file on every save; units without tags are omitted.
#[derive(Debug, Clone)]
pub struct JsonTagStore {
    /// Target file.
    path: PathBuf,
}

impl JsonTagStore {
    /// Store writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TagPersistence for JsonTagStore {
    fn save_tags(&self, units: &[Unit]) -> impl Future<Output = Result<(), PersistError>> + Send {
        let payload: BTreeMap<String, Vec<String>> = units
            .iter()
            .filter(|u| !u.tags.is_empty())
            .map(|u| (u.name.clone(), u.tags.clone()))
            .collect();
        let path = self.path.clone();
        async move {
            let body = serde_json::to_string_pretty(&payload)?;
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
                && let Err(e) = tokio::fs::create_dir_all(parent).await
            {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to create parent directory for tag store"
                );
                return Err(e.into());
            }
            tokio::fs::write(&path, body).await?;
            tracing::debug!(
                path = %path.display(),
                tagged_units = payload.len(),
                "Saved unit tags"
            );
            Ok(())
        }
    }
}

/// What: Read a tag file written by [`JsonTagStore`].
///
/// Inputs:
/// - `path`: Tag file.
///
/// Output:
/// - Unit name → tags; an absent file yields an empty map.
///
/// # Errors
/// - Returns `Err(PersistError::Io)` for read failures other than "not found".
/// - Returns `Err(PersistError::Json)` when the file is not a tag map.
pub fn load_tags(path: &Path) -> Result<BTreeMap<String, Vec<String>>, PersistError> {
    match std::fs::read_to_string(path) {
        Ok(body) => Ok(serde_json::from_str(&body)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e.into()),
    }
}
