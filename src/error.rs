use thiserror::Error;

/// Errors reported by the layout engine.
///
/// Both variants abort the entire layout before any row is built; a partial
/// layout would be misleading because later items can change how earlier rows
/// close.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// Layout options failed validation.
    #[error("invalid layout configuration: {0}")]
    Configuration(String),

    /// An input item carries an aspect ratio the engine cannot lay out.
    #[error("item {index} has invalid aspect ratio {aspect_ratio}")]
    InvalidItem { index: usize, aspect_ratio: f32 },
}
