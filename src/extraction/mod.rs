//! Extraction module
//!
//! Pure extractors over a [`RenderedDocument`](crate::document::RenderedDocument):
//! structure, links, metadata, content and resources. None of them perform
//! I/O, so they can run on any thread against a shared snapshot.

pub mod content;
pub mod links;
pub mod metadata;
pub mod resources;
pub mod structure;

pub use content::ContentAnalyzer;
pub use links::{ExtractedLink, LinkExtractor, LinkType};
pub use metadata::MetadataExtractor;
pub use resources::{ResourceKind, ResourceProfiler};
pub use structure::StructuralExtractor;
