pub mod display;
pub mod gallery_item;

pub use display::*;
pub use gallery_item::*;
