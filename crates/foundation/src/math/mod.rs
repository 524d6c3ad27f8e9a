pub mod geodesy;
pub mod precision;
pub mod projection;
pub mod transform;
pub mod vec;

pub use geodesy::*;
pub use precision::*;
pub use projection::*;
pub use transform::*;
pub use vec::*;
