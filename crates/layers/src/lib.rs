pub mod compose;
pub mod element;
pub mod symbology;

pub use compose::*;
pub use element::*;
pub use symbology::*;
