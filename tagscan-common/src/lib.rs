//! TagScan - Common Types and Utilities
//!
//! This crate contains the shared types used by the TagScan scanners:
//! the file reader, the option store, tag records, and error definitions.

pub mod error;
pub mod options;
pub mod reader;
pub mod tags;

pub use error::ScanError;
pub use options::{ScanOptions, TagLocate};
pub use reader::SourceReader;
pub use tags::{TagEntry, TagKind, TagSink};
