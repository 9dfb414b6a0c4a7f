use std::collections::HashMap;
use std::time::Instant;

use parking_lot::RwLock;
use tracing::{debug, trace};
use xxhash_rust::xxh3::xxh3_64;

use crate::error::LayoutError;
use crate::layout::justified::{JustifiedLayout, RowBreak};
use crate::models::{DisplayItem, GalleryItem, RowModel};

/// Width bucket size for cache keys.
/// Row widths are bucketed so small width changes reuse existing layouts.
const WIDTH_BUCKET_SIZE: u32 = 50;

/// Maximum number of cached layouts to keep in memory.
const MAX_CACHE_ENTRIES: usize = 8;

/// Key for the layout cache, combining width bucket and list hash.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct CacheKey {
    width_bucket: u32,
    list_hash: u64,
}

/// Cached layout data: the row breaks that reconstruct the full layout.
#[derive(Debug, Clone)]
struct CachedLayout {
    breaks: Vec<RowBreak>,
    /// Number of items the breaks were computed for, revalidated on hit.
    item_count: usize,
    /// When this entry was last served, for LRU eviction.
    last_used: Instant,
}

/// Cache of computed layouts keyed by `(width_bucket, list_hash)`.
///
/// A hit returns the stored row breaks in O(1); the caller reconstructs
/// display dimensions from them without re-running the packing pass. The
/// list hash covers every item's dimension bytes, so any change to the item
/// list or its order invalidates the entry.
pub(crate) struct LayoutCache {
    cache: RwLock<HashMap<CacheKey, CachedLayout>>,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::with_capacity(MAX_CACHE_ENTRIES)),
        }
    }

    /// Computes the width bucket for a given row width.
    pub fn width_bucket(row_width: f32) -> u32 {
        (row_width as u32) / WIDTH_BUCKET_SIZE
    }

    /// Fast hash of the item list. Dimensions are hashed in order, with a
    /// sentinel for unknown values, so resorting or editing any item changes
    /// the hash.
    pub fn list_hash(items: &[GalleryItem]) -> u64 {
        let mut hasher_input = Vec::with_capacity(items.len() * 8);
        for item in items {
            hasher_input.extend_from_slice(&item.width.unwrap_or(-1.0).to_le_bytes());
            hasher_input.extend_from_slice(&item.height.unwrap_or(-1.0).to_le_bytes());
        }
        xxh3_64(&hasher_input)
    }

    /// Retrieves cached breaks, refreshing their LRU stamp.
    /// Returns None on miss or when the stored item count disagrees.
    pub fn get_breaks(
        &self,
        width_bucket: u32,
        list_hash: u64,
        item_count: usize,
    ) -> Option<Vec<RowBreak>> {
        let key = CacheKey {
            width_bucket,
            list_hash,
        };

        let mut cache = self.cache.write();
        if let Some(entry) = cache.get_mut(&key) {
            if entry.item_count != item_count {
                return None;
            }
            entry.last_used = Instant::now();
            trace!(width_bucket, rows = entry.breaks.len(), "layout cache hit");
            return Some(entry.breaks.clone());
        }

        trace!(width_bucket, "layout cache miss");
        None
    }

    /// Stores row breaks, evicting the least recently used entry at capacity.
    pub fn set(&self, width_bucket: u32, list_hash: u64, breaks: Vec<RowBreak>, item_count: usize) {
        let key = CacheKey {
            width_bucket,
            list_hash,
        };

        let entry = CachedLayout {
            breaks,
            item_count,
            last_used: Instant::now(),
        };

        let mut cache = self.cache.write();
        if cache.len() >= MAX_CACHE_ENTRIES && !cache.contains_key(&key) {
            Self::evict_oldest(&mut cache);
        }
        cache.insert(key, entry);
    }

    /// Clears the entire cache.
    pub fn clear(&self) {
        self.cache.write().clear();
    }

    /// Returns the number of cached layouts.
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    fn evict_oldest(cache: &mut HashMap<CacheKey, CachedLayout>) {
        let oldest_key = cache
            .iter()
            .min_by_key(|(_, v)| v.last_used)
            .map(|(k, _)| k.clone());

        if let Some(key) = oldest_key {
            debug!(width_bucket = key.width_bucket, "evicting cached layout");
            cache.remove(&key);
        }
    }
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Layout computation with automatic cache management.
///
/// Owns the layout parameters plus a [`LayoutCache`]; `row_width` is supplied
/// per call because it follows the viewport while the other parameters stay
/// fixed. A hit in the same width bucket re-justifies the stored break list
/// to the requested width instead of recomputing the packing pass.
pub struct CachedLayoutComputer {
    layout: JustifiedLayout,
    cache: LayoutCache,
}

impl CachedLayoutComputer {
    /// Creates a computer with default layout parameters.
    pub fn new() -> Self {
        Self::with_layout(JustifiedLayout::default())
    }

    /// Creates a computer with custom layout parameters. The `row_width`
    /// carried by `layout` is overridden per [`compute`](Self::compute) call.
    pub fn with_layout(layout: JustifiedLayout) -> Self {
        Self {
            layout,
            cache: LayoutCache::new(),
        }
    }

    /// Computes the flat display list, serving from cache when possible.
    ///
    /// O(1) row-break retrieval on cache hit plus an O(n) reconstruction;
    /// full O(n) packing pass on miss.
    pub fn compute(
        &self,
        items: &[GalleryItem],
        row_width: f32,
    ) -> Result<Vec<DisplayItem>, LayoutError> {
        let layout = JustifiedLayout {
            row_width,
            ..self.layout.clone()
        };

        if items.is_empty() {
            return layout.build_rows(items);
        }

        let width_bucket = LayoutCache::width_bucket(row_width);
        let list_hash = LayoutCache::list_hash(items);

        if let Some(breaks) = self.cache.get_breaks(width_bucket, list_hash, items.len()) {
            let rows = layout.rows_from_breaks(items, &breaks)?;
            return Ok(Self::flatten(rows));
        }

        let rows = layout.compute_rows(items)?;
        let breaks = Self::breaks_of(&rows);
        self.cache.set(width_bucket, list_hash, breaks, items.len());
        debug!(
            width_bucket,
            items = items.len(),
            rows = rows.len(),
            "layout computed and cached"
        );

        Ok(Self::flatten(rows))
    }

    /// Invalidates the cache, forcing recomputation on the next call.
    pub fn invalidate(&self) {
        self.cache.clear();
    }

    /// Number of distinct layouts currently cached.
    pub fn cached_layouts(&self) -> usize {
        self.cache.len()
    }

    fn breaks_of(rows: &[RowModel]) -> Vec<RowBreak> {
        let mut breaks = Vec::with_capacity(rows.len());
        let mut start = 0usize;
        for row in rows {
            let end = start + row.items.len();
            breaks.push(RowBreak {
                start_index: start,
                end_index: end,
                closure: row.closure,
            });
            start = end;
        }
        breaks
    }

    fn flatten(rows: Vec<RowModel>) -> Vec<DisplayItem> {
        let mut flat = Vec::new();
        for row in rows {
            flat.extend(row.items);
        }
        flat
    }
}

impl Default for CachedLayoutComputer {
    fn default() -> Self {
        Self::new()
    }
}
