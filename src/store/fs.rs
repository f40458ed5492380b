// Filesystem-backed entity store.
// Reads root and dependency entities from JSON files under a base directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use directories::ProjectDirs;
use serde::{Serialize, de::DeserializeOwned};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::entity::{DependencyEntity, RootEntity};
use crate::error::{Result, WarmupError};

use super::EntityStore;

/// Get the default store directory (~/.local/share/warmcache on Linux).
pub fn default_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "warmcache").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Entity store reading `roots/<id>.json` and `dependencies/<id>.json`.
#[derive(Debug, Clone)]
pub struct FsEntityStore {
    base: PathBuf,
}

impl FsEntityStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Open the store at the platform data directory.
    pub fn open_default() -> Result<Self> {
        default_data_dir()
            .map(Self::new)
            .ok_or_else(|| WarmupError::Other("No home directory for entity store".to_string()))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    /// Path to a root entity file.
    pub fn root_path(&self, id: &str) -> PathBuf {
        self.base
            .join("roots")
            .join(format!("{}.json", sanitize_name(id)))
    }

    /// Path to a dependency entity file.
    pub fn dependency_path(&self, id: &str) -> PathBuf {
        self.base
            .join("dependencies")
            .join(format!("{}.json", sanitize_name(id)))
    }

    /// Store a root entity, replacing any previous version.
    pub async fn write_root(&self, root: &RootEntity) -> Result<()> {
        write_json(&self.root_path(&root.id), root).await
    }

    /// Store a dependency entity, replacing any previous version.
    pub async fn write_dependency(&self, dependency: &DependencyEntity) -> Result<()> {
        write_json(&self.dependency_path(&dependency.id), dependency).await
    }
}

#[async_trait]
impl EntityStore for FsEntityStore {
    async fn fetch_root(&self, id: &str) -> Result<Option<RootEntity>> {
        read_json(&self.root_path(id)).await
    }

    async fn fetch_dependency(&self, id: &str) -> Result<Option<DependencyEntity>> {
        read_json(&self.dependency_path(id)).await
    }

    async fn probe(&self) -> Result<()> {
        let metadata = fs::metadata(&self.base).await?;
        if !metadata.is_dir() {
            return Err(WarmupError::Store(format!(
                "{} is not a directory",
                self.base.display()
            )));
        }
        Ok(())
    }
}

/// Read a JSON file, returning None if it does not exist.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&contents)?))
}

/// Write data as JSON.
async fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(data)?;

    // Write atomically via temp file
    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path).await?;
    file.write_all(json.as_bytes()).await?;
    file.sync_all().await?;
    fs::rename(&temp_path, path).await?;

    Ok(())
}

/// Sanitize an identifier for use as a filename.
/// Replaces path separators and reserved characters with underscores.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}
