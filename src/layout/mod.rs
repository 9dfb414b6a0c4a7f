pub mod justified;
pub mod layout_cache;

pub use justified::JustifiedLayout;
pub use layout_cache::CachedLayoutComputer;
