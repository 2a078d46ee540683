//! Document ingestion pipeline with multi-format loading

mod chunker;
mod loader;
mod parser;
mod pipeline;

pub use chunker::{RecursiveCharacterSplitter, DEFAULT_SEPARATORS};
pub use loader::{DocumentLoader, FormatLoader, LoaderRegistry};
pub use parser::{FileParser, ParsedPage};
pub use pipeline::IngestPipeline;
