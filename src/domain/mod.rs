pub mod entity;
pub mod entry;

pub use entity::*;
pub use entry::*;
