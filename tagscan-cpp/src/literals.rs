//! Literal and comment skippers
//!
//! Each skipper consumes one construct from the reader and returns the
//! single byte that replaces it in the cleaned stream: a space for block
//! comments, the terminating newline for line comments, and a placeholder
//! byte for string and character literals. Unterminated constructs end at
//! EOF but still produce their replacement byte, so the downstream tokenizer
//! always sees a well-formed token boundary.

use crate::{CppScanner, CHAR_SYMBOL, STRING_SYMBOL};

/// Kind of comment introduced by a `/`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Comment {
    None,
    C,
    Cplus,
    D,
}

/// A raw literal delimiter may be anything but whitespace, parens, or `\`
fn is_raw_delimiter(c: u8) -> bool {
    !matches!(
        c,
        b' ' | 0x0c | b'\n' | b'\r' | b'\t' | 0x0b | b'(' | b')' | b'\\'
    )
}

/// Raw literal delimiters are at most 16 bytes long
const MAX_RAW_DELIMITER: usize = 16;

impl CppScanner<'_> {
    /// Classify the comment starting at a just-read `/`, if any
    pub(crate) fn comment_kind(&mut self) -> Comment {
        match self.reader.getc() {
            Some(b'*') => Comment::C,
            Some(b'/') => Comment::Cplus,
            Some(b'+') => Comment::D,
            other => {
                if let Some(next) = other {
                    self.reader.ungetc(next);
                }
                Comment::None
            }
        }
    }

    /// Skip a block comment closed by `marker` + `/`: C `/* */` with `*`,
    /// D `/+ +/` with `+`. D comments do not nest here. A comment reads as
    /// white space, so the replacement byte is a space.
    pub(crate) fn skip_over_block_comment(&mut self, marker: u8) -> Option<u8> {
        let mut c = self.reader.getc();
        while let Some(ch) = c {
            if ch != marker {
                c = self.reader.getc();
            } else {
                match self.reader.getc() {
                    Some(b'/') => return Some(b' '),
                    next => c = next,
                }
            }
        }
        None
    }

    /// Skip a `//` comment through its terminating newline; a backslash
    /// escapes the byte after it, so continued line comments stay comments
    pub(crate) fn skip_over_cplus_comment(&mut self) -> Option<u8> {
        while let Some(c) = self.reader.getc() {
            if c == b'\\' {
                self.reader.getc();
            } else if c == b'\n' {
                return Some(c);
            }
        }
        None
    }

    /// Skip to the closing `"`. With `ignore_backslash` (at-literals) a
    /// backslash is an ordinary byte.
    pub(crate) fn skip_to_end_of_string(&mut self, ignore_backslash: bool) -> u8 {
        while let Some(c) = self.reader.getc() {
            if c == b'\\' && !ignore_backslash {
                self.reader.getc();
            } else if c == b'"' {
                break;
            }
        }
        STRING_SYMBOL
    }

    /// Skip a character literal, or a Vera based number such as `'b1010`.
    /// A newline terminates either form and is pushed back; in Vera-base
    /// mode the first non-alphanumeric byte terminates and is pushed back.
    pub(crate) fn skip_to_end_of_char(&mut self) -> u8 {
        let mut count = 0;
        let mut vera_base = 0u8;
        while let Some(c) = self.reader.getc() {
            count += 1;
            if c == b'\\' {
                self.reader.getc();
            } else if c == b'\'' {
                break;
            } else if c == b'\n' {
                self.reader.ungetc(c);
                break;
            } else if count == 1 && b"DHOB".contains(&c.to_ascii_uppercase()) {
                vera_base = c;
            } else if vera_base != 0 && !c.is_ascii_alphanumeric() {
                self.reader.ungetc(c);
                break;
            }
        }
        CHAR_SYMBOL
    }

    /// Skip a C++ raw literal after its opening `"`. If the next byte can
    /// neither open the parenthesized body nor belong to a delimiter, this
    /// was not a raw literal after all and the byte stream degrades to a
    /// normal string.
    pub(crate) fn skip_to_end_of_raw_literal(&mut self) -> u8 {
        let mut c = self.reader.getc();
        if let Some(first) = c {
            if first != b'(' && !is_raw_delimiter(first) {
                self.reader.ungetc(first);
                return self.skip_to_end_of_string(false);
            }
        }

        let mut delim: Vec<u8> = Vec::with_capacity(MAX_RAW_DELIMITER);
        let mut collect_delim = true;
        while let Some(ch) = c {
            if collect_delim {
                if is_raw_delimiter(ch) && delim.len() < MAX_RAW_DELIMITER {
                    delim.push(ch);
                } else {
                    collect_delim = false;
                }
            } else if ch == b')' {
                let mut matched = 0;
                let mut nc = self.reader.getc();
                while let Some(x) = nc {
                    if matched < delim.len() && delim[matched] == x {
                        matched += 1;
                        nc = self.reader.getc();
                    } else {
                        break;
                    }
                }
                if matched == delim.len() && nc == Some(b'"') {
                    return STRING_SYMBOL;
                }
                if let Some(x) = nc {
                    self.reader.ungetc(x);
                }
            }
            c = self.reader.getc();
        }
        STRING_SYMBOL
    }
}
