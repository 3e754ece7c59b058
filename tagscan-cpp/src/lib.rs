//! C-family sanitizing scanner
//!
//! `CppScanner` consumes the raw bytes of a C/C++/D/Vera/Objective-C-like
//! source file and yields a cleaned stream in which comments, string and
//! character literals, preprocessor directives, line continuations,
//! trigraphs, and digraphs have been elided or normalized. While cleaning it
//! tracks `#if`/`#else`/`#endif` nesting, suppresses branches a single-pass
//! tagger must not see, and reports macro tags for `#define`, `#undef` and
//! `#pragma weak` through the caller's tag sink.

pub mod arglist;
pub mod directives;
pub mod literals;

use directives::{Directive, DirectiveState};
use log::trace;
use tagscan_common::{ScanOptions, SourceReader, TagSink};

pub use arglist::{arglist_from_file_pos, arglist_from_str};

/// Placeholder byte emitted in place of an entire string literal
pub const STRING_SYMBOL: u8 = b'S' | 0x80;
/// Placeholder byte emitted in place of an entire character literal
pub const CHAR_SYMBOL: u8 = b'C' | 0x80;

pub(crate) fn is_ident(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

pub(crate) fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

/// Sanitizing scanner over one source file
pub struct CppScanner<'a> {
    pub(crate) reader: &'a mut SourceReader,
    pub(crate) sink: &'a mut dyn TagSink,
    pub(crate) options: &'a ScanOptions,
    /// Block structure is determined by brace matching
    brace_format: bool,
    /// `@"..."` literals are strings
    has_at_literals: bool,
    /// `R"delim(...)delim"` literals are strings
    has_cxx_raw_literals: bool,
    /// The surrounding parser is inside an incomplete statement
    pub(crate) resolve_required: bool,
    /// Two-slot pushback for bytes produced by the scanner itself
    ungetch: Option<u8>,
    ungetch2: Option<u8>,
    pub(crate) directive: Directive,
}

impl<'a> CppScanner<'a> {
    /// Start a scanning session over `reader`. Discovered tags go to `sink`;
    /// `options` is consulted for branch and tag policy. The three flags
    /// describe the language being scanned.
    pub fn new(
        reader: &'a mut SourceReader,
        sink: &'a mut dyn TagSink,
        options: &'a ScanOptions,
        brace_format: bool,
        has_at_literals: bool,
        has_cxx_raw_literals: bool,
    ) -> Self {
        Self {
            reader,
            sink,
            options,
            brace_format,
            has_at_literals,
            has_cxx_raw_literals,
            resolve_required: false,
            ungetch: None,
            ungetch2: None,
            directive: Directive::new(),
        }
    }

    pub fn is_brace_format(&self) -> bool {
        self.brace_format
    }

    /// Current conditional nesting depth; 0 means outside any `#if`
    pub fn directive_nest_level(&self) -> usize {
        self.directive.nest_level
    }

    /// The surrounding parser has begun a statement
    pub fn begin_statement(&mut self) {
        self.resolve_required = true;
    }

    /// The surrounding parser has completed the statement
    pub fn end_statement(&mut self) {
        self.resolve_required = false;
    }

    /// Push one byte back into the cleaned stream. At most two pushbacks may
    /// be outstanding; a third is a programming error.
    pub fn unget(&mut self, c: u8) {
        debug_assert!(self.ungetch2.is_none(), "more than two outstanding pushbacks");
        self.ungetch2 = self.ungetch.take();
        self.ungetch = Some(c);
    }

    /// Return the next surviving byte of the cleaned stream, or `None` at
    /// end of file.
    ///
    /// Between successive calls no comment text, literal text (beyond the
    /// one placeholder byte), line continuation, or preprocessor directive
    /// body escapes to the caller, and bytes inside an ignored conditional
    /// branch are suppressed.
    pub fn next_char(&mut self) -> Option<u8> {
        if let Some(c) = self.ungetch.take() {
            self.ungetch = self.ungetch2.take();
            return Some(c);
        }

        let mut directive = false;
        let mut ignore = false;
        let mut c: Option<u8>;

        'read: loop {
            c = self.reader.getc();
            // Trigraph and digraph translation can produce a byte that must
            // itself be dispatched ('#', '\\'); re-entering this loop
            // re-dispatches the translated byte.
            'process: loop {
                let mut enter = false;
                match c {
                    None => {
                        ignore = false;
                        directive = false;
                    }

                    // Horizontal whitespace never affects directive.accept
                    Some(b'\t') | Some(b' ') => {}

                    Some(b'\n') => {
                        if directive && !ignore {
                            directive = false;
                        }
                        self.directive.accept = true;
                    }

                    Some(b'"') => {
                        self.directive.accept = false;
                        c = Some(self.skip_to_end_of_string(false));
                    }

                    Some(b'#') => {
                        if self.directive.accept {
                            directive = true;
                            self.directive.state = DirectiveState::Hash;
                            self.directive.accept = false;
                        }
                    }

                    Some(b'\'') => {
                        self.directive.accept = false;
                        c = Some(self.skip_to_end_of_char());
                    }

                    Some(b'/') => match self.comment_kind() {
                        literals::Comment::C => c = self.skip_over_block_comment(b'*'),
                        literals::Comment::Cplus => {
                            c = self.skip_over_cplus_comment();
                            // The newline must stay visible to terminate a
                            // directive and to delimit statements.
                            if c == Some(b'\n') {
                                self.reader.ungetc(b'\n');
                            }
                        }
                        literals::Comment::D => c = self.skip_over_block_comment(b'+'),
                        literals::Comment::None => self.directive.accept = false,
                    },

                    Some(b'\\') => match self.reader.getc() {
                        // Line continuation: both bytes vanish
                        Some(b'\n') => continue 'read,
                        Some(next) => self.reader.ungetc(next),
                        None => {}
                    },

                    Some(b'?') => match self.reader.getc() {
                        Some(b'?') => {
                            let third = self.reader.getc();
                            match third {
                                Some(b'(') => c = Some(b'['),
                                Some(b')') => c = Some(b']'),
                                Some(b'<') => c = Some(b'{'),
                                Some(b'>') => c = Some(b'}'),
                                Some(b'!') => c = Some(b'|'),
                                Some(b'\'') => c = Some(b'^'),
                                Some(b'-') => c = Some(b'~'),
                                Some(b'/') => {
                                    c = Some(b'\\');
                                    continue 'process;
                                }
                                Some(b'=') => {
                                    c = Some(b'#');
                                    continue 'process;
                                }
                                other => {
                                    self.reader.ungetc(b'?');
                                    if let Some(t) = other {
                                        self.reader.ungetc(t);
                                    }
                                }
                            }
                        }
                        Some(next) => self.reader.ungetc(next),
                        None => {}
                    },

                    // digraphs:
                    // input:  <:  :>  <%  %>  %:  %:%:
                    // output: [   ]   {   }   #   ##
                    Some(b'<') => {
                        match self.reader.getc() {
                            Some(b':') => c = Some(b'['),
                            Some(b'%') => c = Some(b'{'),
                            other => {
                                if let Some(next) = other {
                                    self.reader.ungetc(next);
                                }
                            }
                        }
                        enter = true;
                    }

                    Some(b':') => {
                        match self.reader.getc() {
                            Some(b'>') => c = Some(b']'),
                            other => {
                                if let Some(next) = other {
                                    self.reader.ungetc(next);
                                }
                            }
                        }
                        enter = true;
                    }

                    Some(b'%') => match self.reader.getc() {
                        Some(b'>') => {
                            c = Some(b'}');
                            enter = true;
                        }
                        Some(b':') => {
                            c = Some(b'#');
                            continue 'process;
                        }
                        other => {
                            if let Some(next) = other {
                                self.reader.ungetc(next);
                            }
                            enter = true;
                        }
                    },

                    Some(ch) => {
                        let mut literal_consumed = false;
                        if ch == b'@' && self.has_at_literals {
                            match self.reader.getc() {
                                Some(b'"') => {
                                    self.directive.accept = false;
                                    c = Some(self.skip_to_end_of_string(true));
                                    literal_consumed = true;
                                }
                                Some(next) => self.reader.ungetc(next),
                                None => {}
                            }
                        } else if ch == b'R' && self.has_cxx_raw_literals {
                            // An 'R' only opens a raw literal when it is not
                            // the tail of a longer identifier; `FOUR"5"` is
                            // macro concatenation, not a raw string. The
                            // allowed predecessors are the L/u/U/u8 prefixes.
                            let prev = self.reader.nth_prev(1, 0);
                            let prev2 = self.reader.nth_prev(2, 0);
                            let prev3 = self.reader.nth_prev(3, 0);
                            if !is_ident(prev)
                                || (!is_ident(prev2)
                                    && (prev == b'L' || prev == b'u' || prev == b'U'))
                                || (!is_ident(prev3) && prev2 == b'u' && prev == b'8')
                            {
                                match self.reader.getc() {
                                    Some(b'"') => {
                                        self.directive.accept = false;
                                        c = Some(self.skip_to_end_of_raw_literal());
                                        literal_consumed = true;
                                    }
                                    Some(next) => self.reader.ungetc(next),
                                    None => {}
                                }
                            }
                        }
                        if !literal_consumed {
                            enter = true;
                        }
                    }
                }

                if enter {
                    self.directive.accept = false;
                    if directive {
                        if let Some(ch) = c {
                            ignore = self.handle_directive(ch);
                        }
                    }
                }
                break 'process;
            }

            if !directive && !ignore {
                break 'read;
            }
        }

        trace!("cpp: deliver {:?}", c.map(|b| b as char));
        c
    }
}
