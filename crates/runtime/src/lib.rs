pub mod event_bus;
pub mod frame;
pub mod staging;

pub use event_bus::*;
pub use frame::*;
pub use staging::*;
