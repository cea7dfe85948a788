//! Level sources and the startup loader.
//!
//! A [`LevelSource`] fetches one level document by identifier. Writes go
//! through [`LevelSink`]. [`load_levels`] walks a playlist sequentially,
//! logging and skipping identifiers that fail so one bad level never aborts
//! the whole load.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::document::{Level, LevelDocument};
use crate::LevelError;

/// Level identifiers loaded at startup when no playlist is given.
pub const DEFAULT_PLAYLIST: [&str; 6] = ["spike1", "level1", "level2", "level3", "floor1", "coin1"];

/// Read access to stored level documents.
pub trait LevelSource {
    /// Fetch the level stored under `id`.
    fn fetch(&self, id: &str) -> Result<Level, LevelError>;
}

/// Write access to stored level documents.
pub trait LevelSink {
    /// Store `document`. With `id = None` a new identifier is allocated
    /// (create); otherwise the stored document is replaced (update).
    /// Returns the identifier the document was stored under.
    fn save(&mut self, id: Option<&str>, document: &LevelDocument) -> Result<String, LevelError>;

    /// Remove the level stored under `id`.
    fn delete(&mut self, id: &str) -> Result<(), LevelError>;
}

/// Fetch every identifier in `ids`, in order.
///
/// Per-level failures are logged at `warn` and skipped. Returns
/// [`LevelError::NoLevels`] only when nothing could be loaded.
pub fn load_levels<S>(source: &S, ids: &[&str]) -> Result<Vec<Level>, LevelError>
where
    S: LevelSource + ?Sized,
{
    let mut loaded = Vec::with_capacity(ids.len());
    for id in ids {
        match source.fetch(id) {
            Ok(level) => {
                debug!(level = %id, blocks = level.blocks().len(), "level loaded");
                loaded.push(level);
            }
            Err(e) => warn!(level = %id, error = %e, "failed to load level, skipping"),
        }
    }

    if loaded.is_empty() {
        return Err(LevelError::NoLevels {
            tried: ids.join(", "),
        });
    }

    info!(count = loaded.len(), requested = ids.len(), "levels loaded");
    Ok(loaded)
}

// ---------------------------------------------------------------------------
// InMemoryLevelSource
// ---------------------------------------------------------------------------

/// A level store held in memory. Used by tests and headless demos.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLevelSource {
    levels: BTreeMap<String, LevelDocument>,
    next_id: u64,
}

impl InMemoryLevelSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_level(mut self, id: &str, document: LevelDocument) -> Self {
        self.levels.insert(id.to_owned(), document);
        self
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl LevelSource for InMemoryLevelSource {
    fn fetch(&self, id: &str) -> Result<Level, LevelError> {
        self.levels
            .get(id)
            .map(|doc| Level::new(id, doc.clone()))
            .ok_or_else(|| LevelError::NotFound { id: id.to_owned() })
    }
}

impl LevelSink for InMemoryLevelSource {
    fn save(&mut self, id: Option<&str>, document: &LevelDocument) -> Result<String, LevelError> {
        let id = match id {
            Some(id) => id.to_owned(),
            None => loop {
                self.next_id += 1;
                let candidate = format!("level-{}", self.next_id);
                if !self.levels.contains_key(&candidate) {
                    break candidate;
                }
            },
        };
        self.levels.insert(id.clone(), document.clone());
        Ok(id)
    }

    fn delete(&mut self, id: &str) -> Result<(), LevelError> {
        self.levels
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| LevelError::NotFound { id: id.to_owned() })
    }
}

// ---------------------------------------------------------------------------
// DirectoryLevelSource
// ---------------------------------------------------------------------------

/// Levels stored as `<root>/<id>.json`, one document per file.
#[derive(Debug, Clone)]
pub struct DirectoryLevelSource {
    root: PathBuf,
}

impl DirectoryLevelSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }
}

impl LevelSource for DirectoryLevelSource {
    fn fetch(&self, id: &str) -> Result<Level, LevelError> {
        let path = self.path_for(id);
        let text = std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LevelError::NotFound { id: id.to_owned() }
            } else {
                LevelError::Io {
                    id: id.to_owned(),
                    source,
                }
            }
        })?;
        let document: LevelDocument =
            serde_json::from_str(&text).map_err(|source| LevelError::Parse {
                id: id.to_owned(),
                source,
            })?;
        Ok(Level::new(id, document))
    }
}

impl LevelSink for DirectoryLevelSource {
    fn save(&mut self, id: Option<&str>, document: &LevelDocument) -> Result<String, LevelError> {
        let id = match id {
            Some(id) => id.to_owned(),
            None => (1u64..)
                .map(|n| format!("level-{n}"))
                .find(|candidate| !self.path_for(candidate).exists())
                .unwrap_or_else(|| "level-0".to_owned()),
        };

        let io_err = |source| LevelError::Io {
            id: id.clone(),
            source,
        };
        std::fs::create_dir_all(&self.root).map_err(io_err)?;
        let json = serde_json::to_string_pretty(document).map_err(|source| LevelError::Parse {
            id: id.clone(),
            source,
        })?;
        std::fs::write(self.path_for(&id), json).map_err(io_err)?;
        debug!(level = %id, blocks = document.blocks.len(), "level saved");
        Ok(id)
    }

    fn delete(&mut self, id: &str) -> Result<(), LevelError> {
        std::fs::remove_file(self.path_for(id)).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LevelError::NotFound { id: id.to_owned() }
            } else {
                LevelError::Io {
                    id: id.to_owned(),
                    source,
                }
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PlacementRecord;

    fn doc_with(kind: &str) -> LevelDocument {
        LevelDocument {
            blocks: vec![PlacementRecord::new(kind, 30.0, 30.0, 30.0, 30.0)],
        }
    }

    #[test]
    fn in_memory_fetch_and_missing() {
        let source = InMemoryLevelSource::new().with_level("level1", doc_with("pig"));
        assert_eq!(source.fetch("level1").unwrap().blocks().len(), 1);
        assert!(matches!(
            source.fetch("nope"),
            Err(LevelError::NotFound { id }) if id == "nope"
        ));
    }

    #[test]
    fn load_levels_skips_failures_in_order() {
        let source = InMemoryLevelSource::new()
            .with_level("b", doc_with("pig"))
            .with_level("a", doc_with("coin"));

        let levels = load_levels(&source, &["a", "missing", "b"]).unwrap();
        let ids: Vec<_> = levels.iter().map(|l| l.id()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn load_levels_with_nothing_loaded_is_an_error() {
        let source = InMemoryLevelSource::new();
        let err = load_levels(&source, &["x", "y"]).unwrap_err();
        assert!(matches!(err, LevelError::NoLevels { ref tried } if tried == "x, y"));
    }

    #[test]
    fn in_memory_create_allocates_fresh_ids() {
        let mut source = InMemoryLevelSource::new().with_level("level-1", doc_with("pig"));
        let id = source.save(None, &doc_with("coin")).unwrap();
        assert_eq!(id, "level-2");
        assert_eq!(source.len(), 2);

        source.delete("level-1").unwrap();
        assert!(source.delete("level-1").is_err());
    }

    #[test]
    fn directory_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = DirectoryLevelSource::new(dir.path());

        let id = source.save(Some("floor1"), &doc_with("block")).unwrap();
        assert_eq!(id, "floor1");
        let level = source.fetch("floor1").unwrap();
        assert_eq!(level.blocks()[0].kind, "block");

        let created = source.save(None, &doc_with("spike")).unwrap();
        assert_eq!(created, "level-1");

        source.delete("floor1").unwrap();
        assert!(matches!(
            source.fetch("floor1"),
            Err(LevelError::NotFound { .. })
        ));
    }

    #[test]
    fn directory_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        let source = DirectoryLevelSource::new(dir.path());
        assert!(matches!(
            source.fetch("broken"),
            Err(LevelError::Parse { .. })
        ));
    }
}
