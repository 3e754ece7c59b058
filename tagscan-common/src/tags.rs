//! Tag records and the tag sink
//!
//! The scanner reports discovered identifiers through the `TagSink` trait;
//! what the sink does with them (write a tags file, index them, collect
//! them for tests) is up to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a discovered tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagKind {
    /// A preprocessor macro (`#define`, `#undef`, `#pragma weak` alias)
    Macro,
}

impl TagKind {
    /// One-letter kind code used in tag file output
    pub fn letter(self) -> char {
        match self {
            TagKind::Macro => 'd',
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagKind::Macro => write!(f, "macro"),
        }
    }
}

/// A discovered tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagEntry {
    pub name: String,
    pub kind: TagKind,
    /// True when the tag is only visible inside its own file
    pub file_scope: bool,
    /// True when the tag should be located by line number rather than pattern
    pub line_number_entry: bool,
    /// 1-based source line the tag was found on
    pub line: u32,
    /// Argument list for parameterized macros, e.g. `"(a,b)"`
    pub signature: Option<String>,
}

/// Receiver for tags discovered during a scan
pub trait TagSink {
    fn make_tag(&mut self, tag: TagEntry);
}

/// Collecting sink, used by the CLI and by tests
impl TagSink for Vec<TagEntry> {
    fn make_tag(&mut self, tag: TagEntry) {
        self.push(tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_letter_and_display() {
        assert_eq!(TagKind::Macro.letter(), 'd');
        assert_eq!(TagKind::Macro.to_string(), "macro");
    }

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<TagEntry> = Vec::new();
        sink.make_tag(TagEntry {
            name: "FOO".to_string(),
            kind: TagKind::Macro,
            file_scope: false,
            line_number_entry: false,
            line: 1,
            signature: None,
        });
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].name, "FOO");
    }
}
