use std::collections::BTreeMap;

use crate::config::RenderMode;
use crate::foundation::core::Canvas;
use crate::raster::layer::RasterLayer;

/// Which drawing of a property a cached layer holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerRole {
    Curve,
    Gradient,
}

/// Inputs a cached layer was drawn from. A lookup with a different key is a miss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerKey {
    pub timing: u64,
    pub canvas: Canvas,
    pub mode: RenderMode,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RasterCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub invalidations: u64,
}

#[derive(Clone, Debug)]
struct Entry {
    key: LayerKey,
    layer: RasterLayer,
}

/// Per-property layers of one animation.
///
/// Emptied on every timing edit. Scrubbing and playback only read from it.
#[derive(Clone, Debug, Default)]
pub struct RasterCache {
    entries: BTreeMap<(String, LayerRole), Entry>,
    stats: RasterCacheStats,
}

impl RasterCache {
    pub fn get(&mut self, property: &str, role: LayerRole, key: LayerKey) -> Option<&RasterLayer> {
        match self.entries.get(&(property.to_owned(), role)) {
            Some(e) if e.key == key => {
                self.stats.hits += 1;
                Some(&e.layer)
            }
            _ => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Cached layer regardless of the inputs it was drawn from.
    pub fn peek(&self, property: &str, role: LayerRole) -> Option<&RasterLayer> {
        self.entries
            .get(&(property.to_owned(), role))
            .map(|e| &e.layer)
    }

    pub fn contains(&self, property: &str, role: LayerRole, key: LayerKey) -> bool {
        self.entries
            .get(&(property.to_owned(), role))
            .is_some_and(|e| e.key == key)
    }

    pub fn insert(&mut self, property: &str, role: LayerRole, key: LayerKey, layer: RasterLayer) {
        self.stats.inserts += 1;
        self.entries
            .insert((property.to_owned(), role), Entry { key, layer });
    }

    /// Drop one property's layers, e.g. after its read-back failed.
    pub fn remove_property(&mut self, property: &str) {
        self.entries.retain(|(name, _), _| name != property);
    }

    pub fn invalidate(&mut self) {
        if !self.entries.is_empty() {
            tracing::debug!(layers = self.entries.len(), "raster cache invalidated");
        }
        self.entries.clear();
        self.stats.invalidations += 1;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> RasterCacheStats {
        self.stats
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/cache.rs"]
mod tests;
