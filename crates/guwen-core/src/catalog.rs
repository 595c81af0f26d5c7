//! Resource directory browsing: collections, subcollections, audio files.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::error::{Argument, CorpusError, Missing};
use crate::shard::{self, ShardFile};

/// Sidecar file in a collection directory that orders its subcollections.
pub const PROP_FILE: &str = "prop.json";

/// Reject anything that is not a single, plain path component.
///
/// # Errors
///
/// Returns [`CorpusError::InvalidArgument`] for empty names, `.`/`..`, or
/// names containing a path separator or NUL.
pub fn validate_component(name: &str) -> Result<(), CorpusError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(CorpusError::invalid(
            Argument::PathComponent,
            format!("{name:?} is not a plain name"),
        ));
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
struct CollectionProps {
    #[serde(default)]
    sort: Option<Vec<String>>,
}

/// Order `entries` by `sort`: listed names first (only those present),
/// then the rest in their given order.
#[must_use]
pub fn order_by_sort_list(entries: Vec<String>, sort: &[String]) -> Vec<String> {
    let mut ordered: Vec<String> = Vec::with_capacity(entries.len());
    for name in sort {
        if entries.contains(name) && !ordered.contains(name) {
            ordered.push(name.clone());
        }
    }
    ordered.extend(entries.into_iter().filter(|name| !sort.contains(name)));
    ordered
}

/// The root resources directory (`<root>/<collection>/<subcollection>/`).
#[derive(Debug, Clone)]
pub struct ResourceRoot {
    root: PathBuf,
}

impl ResourceRoot {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// # Errors
    ///
    /// See [`validate_component`].
    pub fn collection_dir(&self, collection: &str) -> Result<PathBuf, CorpusError> {
        validate_component(collection)?;
        Ok(self.root.join(collection))
    }

    /// Directory holding the shards of one corpus.
    ///
    /// # Errors
    ///
    /// See [`validate_component`].
    pub fn corpus_dir(&self, collection: &str, subcollection: &str) -> Result<PathBuf, CorpusError> {
        validate_component(subcollection)?;
        Ok(self.collection_dir(collection)?.join(subcollection))
    }

    /// Names of the collection directories, sorted.
    ///
    /// # Errors
    ///
    /// [`Missing::Directory`] if the root is absent; I/O errors otherwise.
    pub fn list_collections(&self) -> Result<Vec<String>, CorpusError> {
        let mut names = subdirectories(&self.root)?;
        names.sort();
        Ok(names)
    }

    /// Subcollection directories of `collection`.
    ///
    /// When the collection has a `prop.json` with a `sort` array, names it
    /// lists come first in that order; the rest follow sorted by name. An
    /// unreadable or malformed `prop.json` is logged and ignored.
    ///
    /// # Errors
    ///
    /// [`Missing::Directory`] if the collection does not exist.
    pub fn list_subcollections(&self, collection: &str) -> Result<Vec<String>, CorpusError> {
        let dir = self.collection_dir(collection)?;
        let mut names = subdirectories(&dir)?;
        names.sort();

        let props_path = dir.join(PROP_FILE);
        match fs::read_to_string(&props_path) {
            Ok(content) => match serde_json::from_str::<CollectionProps>(&content) {
                Ok(CollectionProps { sort: Some(sort) }) => {
                    return Ok(order_by_sort_list(names, &sort));
                }
                Ok(CollectionProps { sort: None }) => {}
                Err(e) => warn!(
                    path = %props_path.display(),
                    error = %e,
                    "ignoring malformed prop.json"
                ),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %props_path.display(),
                error = %e,
                "ignoring unreadable prop.json"
            ),
        }
        Ok(names)
    }

    /// Shard files of one corpus, ordered by ordinal.
    ///
    /// # Errors
    ///
    /// See [`shard::list_shards_sorted`].
    pub fn list_shards(
        &self,
        collection: &str,
        subcollection: &str,
    ) -> Result<Vec<ShardFile>, CorpusError> {
        shard::list_shards_sorted(&self.corpus_dir(collection, subcollection)?)
    }

    /// Pre-rendered audio for one record: `<sub>-<language>_<id>.mp3`.
    ///
    /// # Errors
    ///
    /// [`CorpusError::InvalidArgument`] for bad components;
    /// [`Missing::Resource`] if the file does not exist.
    pub fn voice_path(
        &self,
        collection: &str,
        subcollection: &str,
        language: &str,
        id: &str,
    ) -> Result<PathBuf, CorpusError> {
        validate_component(language)?;
        validate_component(id)?;
        let path = self
            .corpus_dir(collection, subcollection)?
            .join(format!("{subcollection}-{language}_{id}.mp3"));
        if path.is_file() {
            Ok(path)
        } else {
            Err(Missing::Resource(path).into())
        }
    }
}

/// MP3 file names in the background-music directory, sorted.
///
/// # Errors
///
/// [`Missing::Directory`] if `dir` is absent; I/O errors otherwise.
pub fn list_music(dir: &Path) -> Result<Vec<String>, CorpusError> {
    let entries = fs::read_dir(dir).map_err(|e| CorpusError::from_io(dir, e, Missing::Directory))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CorpusError::from_io(dir, e, Missing::Directory))?;
        match entry.file_name().to_str() {
            Some(name) if name.ends_with(".mp3") => names.push(name.to_string()),
            _ => {}
        }
    }
    names.sort();
    Ok(names)
}

fn subdirectories(dir: &Path) -> Result<Vec<String>, CorpusError> {
    shard::ensure_directory(dir)?;
    let entries = fs::read_dir(dir).map_err(|e| CorpusError::from_io(dir, e, Missing::Directory))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CorpusError::from_io(dir, e, Missing::Directory))?;
        let is_dir = fs::metadata(entry.path()).is_ok_and(|m| m.is_dir());
        if let (true, Some(name)) = (is_dir, entry.file_name().to_str()) {
            names.push(name.to_string());
        }
    }
    Ok(names)
}
