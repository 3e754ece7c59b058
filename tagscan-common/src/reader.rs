//! Byte-at-a-time source reader
//!
//! `SourceReader` holds the whole file and serves it one byte at a time with
//! unbounded pushback, recent-byte lookback, and position save/restore. The
//! position methods mirror a line-buffered stream: `file_position` is the
//! offset of the current line's start and `tell` is the offset just past the
//! current line's end. The arglist extractor depends on that pair covering
//! the whole directive line it was called from.

use crate::error::ScanError;
use std::fs;
use std::path::{Path, PathBuf};

/// Filename extensions treated as C-family headers
const HEADER_EXTENSIONS: [&str; 6] = ["h", "H", "hh", "hpp", "hxx", "h++"];

/// Byte reader over one source file
pub struct SourceReader {
    path: PathBuf,
    buf: Vec<u8>,
    /// Index of the next unserved byte
    pos: usize,
    /// Pushback stack; last pushed is next read
    ungetch: Vec<u8>,
    /// 1-based line of the byte at `pos`
    line_number: u32,
    /// Offset of the start of the current line
    line_start: usize,
    is_header: bool,
}

impl SourceReader {
    /// Open a file and load its contents
    pub fn from_path(path: &Path) -> Result<Self, ScanError> {
        let buf = fs::read(path).map_err(|e| ScanError::io(path.display(), &e))?;
        Ok(Self::new(path.to_path_buf(), buf))
    }

    /// Build a reader over in-memory text; `name` drives header detection
    pub fn from_str(name: &str, text: &str) -> Self {
        Self::new(PathBuf::from(name), text.as_bytes().to_vec())
    }

    fn new(path: PathBuf, buf: Vec<u8>) -> Self {
        let is_header = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| HEADER_EXTENSIONS.contains(&e))
            .unwrap_or(false);
        Self {
            path,
            buf,
            pos: 0,
            ungetch: Vec::new(),
            line_number: 1,
            line_start: 0,
            is_header,
        }
    }

    /// Read the next byte, draining pushback first
    pub fn getc(&mut self) -> Option<u8> {
        if let Some(c) = self.ungetch.pop() {
            return Some(c);
        }
        let c = self.buf.get(self.pos).copied()?;
        self.pos += 1;
        if c == b'\n' {
            self.line_number += 1;
            self.line_start = self.pos;
        }
        Some(c)
    }

    /// Push one byte back; it will be the next byte read
    pub fn ungetc(&mut self, c: u8) {
        self.ungetch.push(c);
    }

    /// The byte consumed `n` positions before the most recently consumed
    /// byte, or `default` when the history is shorter. Pushed-back bytes are
    /// not tracked; the lookback reads the underlying buffer.
    pub fn nth_prev(&self, n: usize, default: u8) -> u8 {
        if self.pos > n {
            self.buf[self.pos - 1 - n]
        } else {
            default
        }
    }

    /// 1-based line number of the current read position
    pub fn line_number(&self) -> u32 {
        self.line_number
    }

    /// Offset of the start of the current line
    pub fn file_position(&self) -> usize {
        self.line_start
    }

    /// Offset just past the end of the current line: what a line-buffered
    /// stream would report as consumed while reading mid-line
    pub fn tell(&self) -> usize {
        match self.buf.get(self.pos..).and_then(|rest| {
            rest.iter().position(|&b| b == b'\n')
        }) {
            Some(i) => self.pos + i + 1,
            None => self.buf.len(),
        }
    }

    /// Raw read position, for save/restore around a seek
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the raw read position. Line bookkeeping is not rewound; callers
    /// restore the saved position before resuming the scan.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.buf.len());
    }

    /// Read up to `len` bytes from the raw position, bypassing pushback
    pub fn read_bytes(&mut self, len: usize) -> Vec<u8> {
        let end = (self.pos + len).min(self.buf.len());
        let out = self.buf[self.pos..end].to_vec();
        self.pos = end;
        out
    }

    /// True when the file looks like a header (`.h`, `.hpp`, ...)
    pub fn is_header(&self) -> bool {
        self.is_header
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_getc_in_order() {
        let mut r = SourceReader::from_str("t.c", "ab");
        assert_eq!(r.getc(), Some(b'a'));
        assert_eq!(r.getc(), Some(b'b'));
        assert_eq!(r.getc(), None);
        assert_eq!(r.getc(), None);
    }

    #[test]
    fn test_ungetc_is_lifo() {
        let mut r = SourceReader::from_str("t.c", "c");
        r.ungetc(b'a');
        r.ungetc(b'b');
        assert_eq!(r.getc(), Some(b'b'));
        assert_eq!(r.getc(), Some(b'a'));
        assert_eq!(r.getc(), Some(b'c'));
    }

    #[test]
    fn test_nth_prev() {
        let mut r = SourceReader::from_str("t.c", "xyz");
        assert_eq!(r.nth_prev(1, 0), 0);
        r.getc();
        r.getc();
        r.getc();
        // most recently consumed is 'z'
        assert_eq!(r.nth_prev(1, 0), b'y');
        assert_eq!(r.nth_prev(2, 0), b'x');
        assert_eq!(r.nth_prev(3, b'?'), b'?');
    }

    #[test]
    fn test_line_tracking() {
        let mut r = SourceReader::from_str("t.c", "a\nb\nc");
        assert_eq!(r.line_number(), 1);
        r.getc(); // 'a'
        r.getc(); // '\n'
        assert_eq!(r.line_number(), 2);
        assert_eq!(r.file_position(), 2);
        r.getc(); // 'b'
        assert_eq!(r.line_number(), 2);
    }

    #[test]
    fn test_tell_reports_end_of_current_line() {
        let mut r = SourceReader::from_str("t.c", "abc\ndef\n");
        r.getc(); // mid first line
        assert_eq!(r.tell(), 4);
        r.getc();
        r.getc();
        r.getc(); // consumed the newline
        assert_eq!(r.tell(), 8);
    }

    #[test]
    fn test_tell_without_trailing_newline() {
        let mut r = SourceReader::from_str("t.c", "abc");
        r.getc();
        assert_eq!(r.tell(), 3);
    }

    #[test]
    fn test_seek_and_read_bytes() {
        let mut r = SourceReader::from_str("t.c", "0123456789");
        r.getc();
        r.getc();
        let saved = r.position();
        r.seek(4);
        assert_eq!(r.read_bytes(3), b"456".to_vec());
        r.seek(saved);
        assert_eq!(r.getc(), Some(b'2'));
    }

    #[test]
    fn test_read_bytes_clamps_at_eof() {
        let mut r = SourceReader::from_str("t.c", "ab");
        assert_eq!(r.read_bytes(10), b"ab".to_vec());
    }

    #[test]
    fn test_header_detection() {
        assert!(SourceReader::from_str("foo.h", "").is_header());
        assert!(SourceReader::from_str("foo.hpp", "").is_header());
        assert!(!SourceReader::from_str("foo.c", "").is_header());
        assert!(!SourceReader::from_str("foo", "").is_header());
    }
}
