//! On-disk index persistence
//!
//! An index is a directory holding three files:
//!
//! - `manifest.json`: format version, embedding model, dimensions, chunk
//!   count, HNSW parameters
//! - `docstore.json`: the chunks in index order
//! - `vectors.bin`: bincode-encoded embeddings, parallel to the chunks
//!
//! The HNSW graph is rebuilt from the stored vectors on load with the recorded
//! parameters.
//!
//! Saving writes a complete copy into a staging directory next to the target
//! and swaps it into place, so readers see either the old index or the new one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Chunk;

use super::index::{HnswParams, VectorIndex};

const MANIFEST_FILE: &str = "manifest.json";
const DOCSTORE_FILE: &str = "docstore.json";
const VECTORS_FILE: &str = "vectors.bin";

/// Bumped whenever the on-disk layout changes
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Manifest {
    format_version: u32,
    embedding_model: String,
    dimensions: usize,
    chunk_count: usize,
    #[serde(default)]
    hnsw: HnswParams,
    created_at: DateTime<Utc>,
}

/// Result of trying to open a persisted index
#[derive(Debug)]
pub enum LoadOutcome {
    /// Index loaded
    Found(VectorIndex),
    /// Nothing has been built at this location yet
    NotFound,
    /// Something is there but it cannot be read
    Corrupt(String),
}

impl LoadOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, LoadOutcome::Found(_))
    }
}

/// Reads and writes index directories
pub struct IndexStore;

impl IndexStore {
    /// Whether a complete index appears to exist at `location`
    pub fn exists(location: &Path) -> bool {
        location.join(MANIFEST_FILE).is_file()
    }

    /// Persist `index` at `location`, replacing whatever is there
    pub fn save(index: &VectorIndex, location: &Path) -> Result<()> {
        let parent = parent_dir(location);
        fs::create_dir_all(&parent)?;

        let staging = tempfile::Builder::new()
            .prefix(".index-staging-")
            .tempdir_in(&parent)?;
        Self::write_files(index, staging.path())?;

        // From here on the staging directory is owned by the swap
        let staged = staging.into_path();
        if let Err(e) = swap_into_place(&staged, location) {
            let _ = fs::remove_dir_all(&staged);
            return Err(e);
        }

        tracing::info!(
            "Saved index with {} chunks to {}",
            index.len(),
            location.display()
        );
        Ok(())
    }

    /// Open the index at `location`.
    ///
    /// A model that differs from `expected_model` is logged but the index is
    /// still returned.
    pub fn load(location: &Path, expected_model: &str) -> LoadOutcome {
        if !Self::exists(location) {
            return LoadOutcome::NotFound;
        }

        match Self::read_files(location) {
            Ok((manifest, index)) => {
                if manifest.embedding_model != expected_model {
                    tracing::warn!(
                        "Index at {} was built with '{}' but queries use '{}'",
                        location.display(),
                        manifest.embedding_model,
                        expected_model
                    );
                }
                LoadOutcome::Found(index)
            }
            Err(Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => LoadOutcome::NotFound,
            Err(e) => {
                tracing::warn!("Index at {} is unreadable: {}", location.display(), e);
                LoadOutcome::Corrupt(e.to_string())
            }
        }
    }

    fn write_files(index: &VectorIndex, dir: &Path) -> Result<()> {
        let manifest = Manifest {
            format_version: FORMAT_VERSION,
            embedding_model: index.embedding_model().to_string(),
            dimensions: index.dimensions(),
            chunk_count: index.len(),
            hnsw: index.params(),
            created_at: Utc::now(),
        };

        let vectors = bincode::serde::encode_to_vec(index.vectors(), bincode::config::standard())
            .map_err(|e| Error::index_store(format!("Failed to encode vectors: {}", e)))?;

        fs::write(dir.join(VECTORS_FILE), vectors)?;
        fs::write(
            dir.join(DOCSTORE_FILE),
            serde_json::to_vec(index.chunks())?,
        )?;
        // Manifest last: its presence marks the directory complete
        fs::write(
            dir.join(MANIFEST_FILE),
            serde_json::to_vec_pretty(&manifest)?,
        )?;
        Ok(())
    }

    fn read_files(dir: &Path) -> Result<(Manifest, VectorIndex)> {
        let manifest: Manifest = serde_json::from_slice(&fs::read(dir.join(MANIFEST_FILE))?)?;
        if manifest.format_version != FORMAT_VERSION {
            return Err(Error::index_store(format!(
                "unsupported format version {}",
                manifest.format_version
            )));
        }

        let chunks: Vec<Chunk> = serde_json::from_slice(&fs::read(dir.join(DOCSTORE_FILE))?)?;
        let bytes = fs::read(dir.join(VECTORS_FILE))?;
        let (vectors, _): (Vec<Vec<f32>>, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                .map_err(|e| Error::index_store(format!("Failed to decode vectors: {}", e)))?;

        if chunks.len() != manifest.chunk_count || vectors.len() != manifest.chunk_count {
            return Err(Error::index_store(format!(
                "manifest lists {} chunks, found {} chunks and {} vectors",
                manifest.chunk_count,
                chunks.len(),
                vectors.len()
            )));
        }

        let index = VectorIndex::build_with(
            manifest.hnsw,
            manifest.embedding_model.clone(),
            chunks,
            vectors,
        )?;
        if index.dimensions() != manifest.dimensions && !index.is_empty() {
            return Err(Error::index_store(format!(
                "manifest lists {} dimensions, vectors have {}",
                manifest.dimensions,
                index.dimensions()
            )));
        }

        Ok((manifest, index))
    }
}

fn parent_dir(location: &Path) -> PathBuf {
    match location.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Move `staged` to `location`, keeping the previous index if anything fails
fn swap_into_place(staged: &Path, location: &Path) -> Result<()> {
    if !location.exists() {
        fs::rename(staged, location)?;
        return Ok(());
    }

    let name = location
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "index".to_string());
    let backup = parent_dir(location).join(format!(".{}.old-{}", name, uuid::Uuid::new_v4()));

    fs::rename(location, &backup)?;
    if let Err(e) = fs::rename(staged, location) {
        if let Err(restore) = fs::rename(&backup, location) {
            tracing::error!(
                "Failed to restore previous index from {}: {}",
                backup.display(),
                restore
            );
        }
        return Err(e.into());
    }

    if let Err(e) = fs::remove_dir_all(&backup) {
        tracing::warn!("Could not remove old index {}: {}", backup.display(), e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkSource;

    fn index(words: &[&str]) -> VectorIndex {
        let chunks = words
            .iter()
            .enumerate()
            .map(|(i, w)| {
                Chunk::new(
                    w.to_string(),
                    ChunkSource {
                        filename: "doc.pdf".into(),
                        page: i as u32,
                        page_count: words.len() as u32,
                    },
                    i as u32,
                )
            })
            .collect();
        let vectors = (0..words.len())
            .map(|i| {
                let mut v = vec![0.0; 4];
                v[i % 4] = 1.0;
                v
            })
            .collect();
        VectorIndex::build("test-model", chunks, vectors).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("faiss_index");
        let original = index(&["alpha", "beta", "gamma"]);

        IndexStore::save(&original, &location).unwrap();
        assert!(IndexStore::exists(&location));

        match IndexStore::load(&location, "test-model") {
            LoadOutcome::Found(loaded) => {
                assert_eq!(loaded.len(), 3);
                assert_eq!(loaded.dimensions(), 4);
                assert_eq!(loaded.chunks(), original.chunks());
                let hits = loaded.query(&[0.0, 1.0, 0.0, 0.0], 1);
                assert_eq!(hits[0].chunk.content, "beta");
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_graph_params_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("faiss_index");
        let params = HnswParams {
            m: 8,
            ef_construction: 50,
            ef_search: 20,
        };
        let built = VectorIndex::build_with(
            params,
            "test-model",
            index(&["alpha", "beta"]).chunks().to_vec(),
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        )
        .unwrap();
        IndexStore::save(&built, &location).unwrap();

        let manifest: serde_json::Value =
            serde_json::from_slice(&fs::read(location.join(MANIFEST_FILE)).unwrap()).unwrap();
        assert_eq!(manifest["hnsw"]["m"], 8);
        assert_eq!(manifest["embedding_model"], "test-model");

        match IndexStore::load(&location, "test-model") {
            LoadOutcome::Found(loaded) => {
                assert_eq!(loaded.params(), params);
                assert_eq!(loaded.query(&[0.1, 1.0], 1)[0].chunk.content, "beta");
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = IndexStore::load(&dir.path().join("nothing"), "test-model");
        assert!(matches!(outcome, LoadOutcome::NotFound));
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("faiss_index");
        IndexStore::save(&index(&["alpha"]), &location).unwrap();
        fs::write(location.join(VECTORS_FILE), b"\xff\xff\xff").unwrap();

        let outcome = IndexStore::load(&location, "test-model");
        assert!(matches!(outcome, LoadOutcome::Corrupt(_)));
    }

    #[test]
    fn test_count_mismatch_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("faiss_index");
        IndexStore::save(&index(&["alpha", "beta"]), &location).unwrap();
        fs::write(location.join(DOCSTORE_FILE), b"[]").unwrap();

        assert!(matches!(
            IndexStore::load(&location, "test-model"),
            LoadOutcome::Corrupt(_)
        ));
    }

    #[test]
    fn test_model_mismatch_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("faiss_index");
        IndexStore::save(&index(&["alpha"]), &location).unwrap();

        assert!(IndexStore::load(&location, "other-model").is_found());
    }

    #[test]
    fn test_save_replaces_previous() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("faiss_index");
        IndexStore::save(&index(&["old1", "old2", "old3"]), &location).unwrap();
        IndexStore::save(&index(&["new"]), &location).unwrap();

        match IndexStore::load(&location, "test-model") {
            LoadOutcome::Found(loaded) => {
                assert_eq!(loaded.len(), 1);
                assert_eq!(loaded.chunks()[0].content, "new");
            }
            other => panic!("expected Found, got {:?}", other),
        }

        // Only the live index remains next to it
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("faiss_index")]);
    }
}
