pub mod drawable;
pub mod graph;
pub mod records;

pub use drawable::*;
pub use graph::*;
pub use records::*;
