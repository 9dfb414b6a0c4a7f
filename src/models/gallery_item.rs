/// Lightweight descriptor for one gallery asset.
///
/// The layout engine only needs an aspect ratio, so the descriptor carries the
/// intrinsic dimensions reported by whoever owns the asset (upload metadata,
/// a thumbnail index, a scan pass). Either dimension may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GalleryItem {
    /// Intrinsic width in pixels, if known.
    pub width: Option<f32>,
    /// Intrinsic height in pixels, if known.
    pub height: Option<f32>,
}

impl GalleryItem {
    /// Create an item with known intrinsic dimensions.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    /// Create an item with no known dimensions; it lays out as a square.
    pub fn unknown() -> Self {
        Self {
            width: None,
            height: None,
        }
    }

    /// Create an item from a bare aspect ratio.
    pub fn from_aspect_ratio(aspect_ratio: f32) -> Self {
        Self {
            width: Some(aspect_ratio),
            height: Some(1.0),
        }
    }

    /// Aspect ratio (width / height) used for layout.
    ///
    /// Items missing a dimension, or reporting a zero dimension, fall back to
    /// `1.0` and are displayed as squares. The ratio is returned as stored;
    /// the engine rejects non-finite or non-positive ratios at layout time.
    pub fn aspect_ratio(&self) -> f32 {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w != 0.0 && h != 0.0 => w / h,
            _ => 1.0,
        }
    }
}
