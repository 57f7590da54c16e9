//! litdoc-parser — language table and sectionizer for litdoc
//!
//! This crate owns the structural half of the pipeline: the registry that
//! maps file extensions to language descriptors, and the single-pass
//! sectionizer that partitions a source file into ordered comment/code
//! sections. Rendering (highlighting, markdown, page assembly) lives in
//! `litdoc-render`.

pub mod languages;
pub mod sections;

pub use languages::{Language, LanguageRegistry, RegistryError};
pub use sections::{sectionize, Section};
