//! Justified gallery layout.
//!
//! Given an ordered list of media descriptors with intrinsic aspect ratios,
//! the engine assigns each item final display dimensions so that every
//! completed row spans a fixed target width, as in photo-gallery "justified"
//! grids. The computation is pure and synchronous; file storage, metadata
//! retrieval, and rendering are the caller's concern.
//!
//! ```
//! use rowfit::{GalleryItem, JustifiedLayout};
//!
//! let items = vec![
//!     GalleryItem::new(1920.0, 1080.0),
//!     GalleryItem::new(1080.0, 1920.0),
//!     GalleryItem::unknown(),
//! ];
//! let layout = JustifiedLayout::new(960.0, 220.0, 4.0);
//! let display = layout.build_rows(&items)?;
//! assert_eq!(display.len(), items.len());
//! # Ok::<(), rowfit::LayoutError>(())
//! ```

pub mod error;
pub mod layout;
pub mod models;

pub use error::LayoutError;
pub use layout::{CachedLayoutComputer, JustifiedLayout};
pub use models::{DisplayItem, GalleryItem};
