//! Favorites persisted as `{ "favorites": [<track id>, ...] }`.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::LibraryError;
use super::model::TrackId;

#[derive(Debug, Default, Serialize, Deserialize)]
struct FavoritesFile {
    #[serde(default)]
    favorites: Vec<TrackId>,
}

/// Set of favorite tracks, written back to disk on every change.
#[derive(Debug)]
pub struct Favorites {
    path: PathBuf,
    data: FavoritesFile,
}

impl Favorites {
    /// Open the store at `path`, creating an empty one if it does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LibraryError> {
        let path = path.into();
        if !path.exists() {
            let store = Self {
                path,
                data: FavoritesFile::default(),
            };
            store.sync()?;
            return Ok(store);
        }

        let bytes = fs::read(&path).map_err(|e| LibraryError::io(&path, e))?;
        let data: FavoritesFile =
            serde_json::from_slice(&bytes).map_err(|e| LibraryError::json(&path, e))?;
        Ok(Self { path, data })
    }

    pub fn is_favorite(&self, id: &TrackId) -> bool {
        self.data.favorites.contains(id)
    }

    /// Returns `false` if the track was already a favorite.
    pub fn add(&mut self, id: &TrackId) -> Result<bool, LibraryError> {
        if self.is_favorite(id) {
            return Ok(false);
        }
        self.data.favorites.push(id.clone());
        self.sync()?;
        Ok(true)
    }

    /// Returns `false` if the track was not a favorite.
    pub fn remove(&mut self, id: &TrackId) -> Result<bool, LibraryError> {
        let before = self.data.favorites.len();
        self.data.favorites.retain(|f| f != id);
        if self.data.favorites.len() == before {
            return Ok(false);
        }
        self.sync()?;
        Ok(true)
    }

    /// Flip membership and return the new state.
    pub fn toggle(&mut self, id: &TrackId) -> Result<bool, LibraryError> {
        if self.is_favorite(id) {
            self.remove(id)?;
        } else {
            self.add(id)?;
        }
        Ok(self.is_favorite(id))
    }

    fn sync(&self) -> Result<(), LibraryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| LibraryError::io(parent, e))?;
            }
        }
        let json = serde_json::to_vec(&self.data).map_err(|e| LibraryError::json(&self.path, e))?;
        fs::write(&self.path, json).map_err(|e| LibraryError::io(&self.path, e))
    }
}
