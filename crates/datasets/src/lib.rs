pub mod manifest;
pub mod package;
pub mod records;

pub use manifest::*;
pub use package::*;
pub use records::*;
