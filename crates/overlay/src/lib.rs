pub mod controller;
pub mod events;
pub mod widget;

pub use controller::*;
pub use events::*;
pub use widget::*;
