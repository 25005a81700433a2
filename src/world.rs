//! # Worlds
//!
//! A world is a directory under the data root that owns a set of document collections:
//!
//! ```text
//! <data_root>/worlds/<world-id>/data/<collection>/store.jsonl
//! ```
//!
//! [`World`] is the descriptor the document store works against; [`WorldLocator`] builds
//! descriptors from what is on disk.  Callers that keep worlds somewhere else construct
//! [`World`] values directly.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::WorldError;

/// Directory under the data root that holds every world.
pub const WORLDS_DIR: &str = "worlds";
/// Directory under a world that holds its collections.
pub const DATA_DIR: &str = "data";

/// Describes one world and the collections it exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct World {
    /// The world identifier.
    pub id: String,
    /// Root directory of the world.
    pub path: PathBuf,
    /// Collection names the world exposes.
    pub document_collections: Vec<String>,
}

impl World {
    /// Creates a world descriptor.
    pub fn new<I, S>(id: impl Into<String>, path: impl Into<PathBuf>, collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            path: path.into(),
            document_collections: collections.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the world exposes `collection`.
    pub fn has_collection(&self, collection: &str) -> bool {
        self.document_collections.iter().any(|c| c == collection)
    }

    /// Directory holding the store for `collection`.
    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.path.join(DATA_DIR).join(collection)
    }
}

/// Resolves worlds under a data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldLocator {
    data_root: PathBuf,
}

impl WorldLocator {
    /// Creates a locator rooted at `data_root`.
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    /// The data root.
    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Directory holding every world.
    pub fn worlds_dir(&self) -> PathBuf {
        self.data_root.join(WORLDS_DIR)
    }

    /// Builds the descriptor for world `id`, listing its collection directories.
    pub async fn locate(&self, id: &str) -> Result<World, WorldError> {
        check_world_id(id)?;
        let path = self.worlds_dir().join(id);
        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => return Err(WorldError::NotFound(id.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(WorldError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        }
        let collections = subdirectories(&path.join(DATA_DIR)).await?;
        debug!(world = id, collections = collections.len(), "located world");
        Ok(World {
            id: id.to_string(),
            path,
            document_collections: collections,
        })
    }

    /// Identifiers of every world under the data root, sorted.
    pub async fn list_worlds(&self) -> Result<Vec<String>, WorldError> {
        subdirectories(&self.worlds_dir()).await
    }

    /// Creates the directory for `collection` in world `id`, creating the world if needed.
    pub async fn provision(&self, id: &str, collection: &str) -> Result<World, WorldError> {
        check_world_id(id)?;
        if !is_plain_name(collection) {
            return Err(WorldError::InvalidId(collection.to_string()));
        }
        let path = self.worlds_dir().join(id).join(DATA_DIR).join(collection);
        fs::create_dir_all(&path).await?;
        self.locate(id).await
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}

fn check_world_id(id: &str) -> Result<(), WorldError> {
    if is_plain_name(id) {
        Ok(())
    } else {
        Err(WorldError::InvalidId(id.to_string()))
    }
}

async fn subdirectories(dir: &Path) -> Result<Vec<String>, WorldError> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir()
            && let Some(name) = entry.file_name().to_str()
        {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_path_layout() {
        let world = World::new("test-world", "/srv/worlds/test-world", ["actors", "items"]);
        assert_eq!(
            world.collection_path("actors"),
            PathBuf::from("/srv/worlds/test-world/data/actors")
        );
        assert!(world.has_collection("items"));
        assert!(!world.has_collection("scenes"));
    }

    #[test]
    fn world_serializes_camel_case() {
        let world = World::new("w", "/w", ["actors"]);
        let value = serde_json::to_value(&world).unwrap();
        assert_eq!(value["documentCollections"], serde_json::json!(["actors"]));
    }

    #[tokio::test]
    async fn locate_lists_collections() {
        let root = tempfile::tempdir().unwrap();
        let locator = WorldLocator::new(root.path());
        for collection in ["items", "actors"] {
            fs::create_dir_all(root.path().join("worlds/test-world/data").join(collection))
                .await
                .unwrap();
        }
        fs::write(root.path().join("worlds/test-world/data/stray.txt"), "")
            .await
            .unwrap();

        let world = locator.locate("test-world").await.unwrap();
        assert_eq!(world.id, "test-world");
        assert_eq!(world.document_collections, vec!["actors", "items"]);
        assert_eq!(locator.list_worlds().await.unwrap(), vec!["test-world"]);
    }

    #[tokio::test]
    async fn locate_missing_world() {
        let root = tempfile::tempdir().unwrap();
        let locator = WorldLocator::new(root.path());
        assert_eq!(
            locator.locate("nowhere").await,
            Err(WorldError::NotFound("nowhere".to_string()))
        );
        assert!(locator.list_worlds().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_escaping_ids() {
        let root = tempfile::tempdir().unwrap();
        let locator = WorldLocator::new(root.path());
        for id in ["", "..", "a/b", "a\\b"] {
            assert_eq!(
                locator.locate(id).await,
                Err(WorldError::InvalidId(id.to_string()))
            );
        }
    }

    #[tokio::test]
    async fn provision_creates_layout() {
        let root = tempfile::tempdir().unwrap();
        let locator = WorldLocator::new(root.path());
        let world = locator.provision("fresh", "actors").await.unwrap();
        assert_eq!(world.document_collections, vec!["actors"]);
        assert!(world.collection_path("actors").is_dir());
    }
}
