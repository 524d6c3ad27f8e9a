pub mod display;
pub mod surface;
pub mod symbology;

pub use display::*;
pub use surface::*;
pub use symbology::*;
