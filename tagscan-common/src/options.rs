//! Scan options
//!
//! Read-only knobs consulted by the scanner while a file is processed.
//! Language-shape flags (brace format, at-literals, raw literals) are not
//! options; they are passed to the scanner constructor by the per-language
//! caller.

use serde::{Deserialize, Serialize};

/// How emitted tags locate their source line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagLocate {
    /// Locate by search pattern (the default)
    Pattern,
    /// Locate by line number
    LineNumber,
}

/// Option store consulted by the scanner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Scan `#if 0` branches for tags anyway
    pub if0: bool,
    /// Record tags that are only visible inside their own file
    pub include_file_scope: bool,
    /// Record tags for `#define` directives
    pub include_define_tags: bool,
    /// Tag locator style
    pub locate: TagLocate,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            if0: false,
            include_file_scope: true,
            include_define_tags: true,
            locate: TagLocate::Pattern,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = ScanOptions::default();
        assert!(!opts.if0);
        assert!(opts.include_file_scope);
        assert!(opts.include_define_tags);
        assert_eq!(opts.locate, TagLocate::Pattern);
    }
}
