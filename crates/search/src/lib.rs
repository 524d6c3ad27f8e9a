pub mod coordinator;
pub mod geolocate;
pub mod postal;
pub mod proximity;

pub use coordinator::*;
pub use geolocate::*;
pub use postal::*;
pub use proximity::*;
