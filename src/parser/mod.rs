pub mod sections;

pub use sections::{ParsedSections, extract_sections};
