//! Palette memoization keyed by image content.
//!
//! Palettes are pure functions of the pixels (and the extractor options),
//! so identical uploads can share one result. The cache is optional and
//! owned by whoever builds the `Vectorizer`.

use super::PaletteSet;
use crate::core::PixelImage;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// blake3 digest of dimensions and pixel bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHash([u8; 32]);

impl ImageHash {
    pub fn of(image: &PixelImage) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&image.width().to_le_bytes());
        hasher.update(&image.height().to_le_bytes());
        hasher.update(image.as_raw());
        Self(*hasher.finalize().as_bytes())
    }

    /// Mix extractor settings into the key so differently configured
    /// extractors never share entries.
    pub fn with_salt(self, salt: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.0);
        hasher.update(salt);
        Self(*hasher.finalize().as_bytes())
    }

    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ImageHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First 16 hex chars are enough to tell entries apart in logs
        write!(f, "{}", &self.to_hex()[..16])
    }
}

struct Entries {
    map: FxHashMap<ImageHash, Arc<PaletteSet>>,
    order: VecDeque<ImageHash>,
}

/// Bounded FIFO cache of extracted palette sets.
pub struct PaletteCache {
    capacity: usize,
    entries: Mutex<Entries>,
}

impl PaletteCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(Entries {
                map: FxHashMap::default(),
                order: VecDeque::new(),
            }),
        }
    }

    pub fn get(&self, key: &ImageHash) -> Option<Arc<PaletteSet>> {
        self.entries.lock().map.get(key).cloned()
    }

    /// Return the cached set or compute it outside the lock and insert it.
    pub fn get_or_insert_with(
        &self,
        key: ImageHash,
        compute: impl FnOnce() -> PaletteSet,
    ) -> Arc<PaletteSet> {
        if let Some(hit) = self.get(&key) {
            crate::debug!("palette"; "cache hit {}", key);
            return hit;
        }
        let value = Arc::new(compute());

        let mut entries = self.entries.lock();
        if let Some(existing) = entries.map.get(&key) {
            return Arc::clone(existing);
        }
        while entries.order.len() >= self.capacity {
            if let Some(oldest) = entries.order.pop_front() {
                entries.map.remove(&oldest);
            }
        }
        entries.order.push_back(key);
        entries.map.insert(key, Arc::clone(&value));
        value
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PaletteCache {
    fn default() -> Self {
        Self::new(64)
    }
}
