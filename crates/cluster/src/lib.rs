pub mod adapter;
pub mod config;
pub mod feature;
pub mod grid;
pub mod index;
pub mod spiral;
pub mod viewport;

pub use adapter::*;
pub use config::*;
pub use feature::*;
pub use grid::*;
pub use index::*;
pub use spiral::*;
pub use viewport::*;
