pub mod events;
pub mod frame;

pub use events::*;
pub use frame::*;
