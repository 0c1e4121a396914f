use std::path::{Path, PathBuf};
use std::sync::Arc;

use hashbrown::HashMap;

use crate::font::{Font, FontFace, FontId, Result};

/// Faces addressable by [`FontId`], in registration order.
#[derive(Debug, Default, Clone)]
pub struct FontCollection {
    faces: Vec<Arc<FontFace>>,
}

impl FontCollection {
    pub fn new() -> Self {
        Self { faces: Vec::new() }
    }

    /// Register a face and return the id attribute runs refer to it by.
    pub fn register(&mut self, face: Arc<FontFace>) -> FontId {
        let id = FontId(self.faces.len() as u32);
        self.faces.push(face);
        id
    }

    pub fn get(&self, id: FontId) -> Option<&Arc<FontFace>> {
        self.faces.get(id.0 as usize)
    }

    /// Convenience for building a [`Font`] attribute value.
    pub fn font(&self, id: FontId, size: f32) -> Option<Font> {
        self.get(id).map(|_| Font::new(id, size))
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

/// Key for identifying a font within the cache.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    /// Path to the font file on disk.
    pub path: PathBuf,
    /// Font index within the file (for collections).
    pub index: u32,
}

impl FontKey {
    pub fn new(path: impl AsRef<Path>, index: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            index: index as u32,
        }
    }
}

/// Loads faces from disk once and registers them into a collection.
#[derive(Debug, Default)]
pub struct FontCache {
    ids: HashMap<FontKey, FontId>,
}

impl FontCache {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
        }
    }

    /// Get the id of an already loaded face or load it from disk into
    /// `collection`.
    pub fn get_or_load(
        &mut self,
        collection: &mut FontCollection,
        path: impl AsRef<Path>,
        index: usize,
    ) -> Result<FontId> {
        let key = FontKey::new(&path, index);
        if let Some(id) = self.ids.get(&key) {
            return Ok(*id);
        }

        let face = Arc::new(FontFace::from_path(&key.path, index)?);
        let id = collection.register(face);
        log::debug!("loaded font {:?} as {:?}", key.path, id);
        self.ids.insert(key, id);
        Ok(id)
    }

    /// Retrieve the id of a previously loaded face.
    pub fn get(&self, key: &FontKey) -> Option<FontId> {
        self.ids.get(key).copied()
    }
}
