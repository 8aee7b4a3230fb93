pub mod generator;
pub mod model;
pub mod parser;

pub use generator::M3uGenerator;
pub use model::{GroupSummary, PlaylistEntry};
pub use parser::M3uStreamParser;
