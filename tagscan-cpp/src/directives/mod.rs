//! Preprocessor directive handling
//!
//! The directive state machine is fed one byte at a time by the sanitizer
//! loop. It strips every directive from the stream, tracks `#if` nesting in
//! a fixed-depth conditional stack, decides which branches a single-pass
//! tagger may see, and emits macro tags for `#define`, `#undef` and
//! `#pragma weak`.

use crate::{is_ident, is_ident_start, CppScanner};
use log::debug;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tagscan_common::{TagEntry, TagKind, TagLocate};

/// Hard upper bound on conditional nesting; deeper `#if`s are clamped
pub(crate) const MAX_NEST: usize = 20;
/// Directive names are read into a buffer of this size (9 bytes + padding)
pub(crate) const MAX_DIRECTIVE_NAME: usize = 10;

/// Current directive being processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DirectiveState {
    /// No known directive; rest of the line is skipped
    None,
    /// `#define` encountered
    Define,
    /// Initial `#` read; the directive name comes next
    Hash,
    /// `#if`, `#ifdef` or `#ifndef` encountered
    If,
    /// `#pragma` encountered
    Pragma,
    /// `#undef` encountered
    Undef,
}

/// One nesting level of a preprocessor conditional
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Conditional {
    /// The parent conditional branch is already being ignored
    pub ignore_all_branches: bool,
    /// Only one branch of this conditional may be followed
    pub single_branch: bool,
    /// A branch has already been selected
    pub branch_chosen: bool,
    /// Current ignore state
    pub ignoring: bool,
}

/// Directive-processing state of the scanner
pub(crate) struct Directive {
    pub state: DirectiveState,
    /// A `#` at the current position would begin a directive
    pub accept: bool,
    /// Scratch buffer for the identifier after `#define`/`#undef`/`#pragma`
    pub name: String,
    /// Conditional nesting depth; level 0 means outside any `#if`
    pub nest_level: usize,
    pub ifdef: [Conditional; MAX_NEST],
}

impl Directive {
    pub fn new() -> Self {
        Self {
            state: DirectiveState::None,
            accept: true,
            name: String::new(),
            nest_level: 0,
            ifdef: [Conditional::default(); MAX_NEST],
        }
    }
}

/// Recognized directive names; anything starting with `if` is classified
/// separately so that `#if`, `#ifdef` and `#ifndef` share one path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirectiveKind {
    Define,
    Undef,
    Elif,
    Else,
    Endif,
    Pragma,
}

static DIRECTIVE_TABLE: Lazy<HashMap<&'static str, DirectiveKind>> = Lazy::new(|| {
    HashMap::from([
        ("define", DirectiveKind::Define),
        ("undef", DirectiveKind::Undef),
        ("elif", DirectiveKind::Elif),
        ("else", DirectiveKind::Else),
        ("endif", DirectiveKind::Endif),
        ("pragma", DirectiveKind::Pragma),
    ])
});

impl CppScanner<'_> {
    fn is_ignore(&self) -> bool {
        self.directive.ifdef[self.directive.nest_level].ignoring
    }

    fn set_ignore(&mut self, ignore: bool) -> bool {
        self.directive.ifdef[self.directive.nest_level].ignoring = ignore;
        ignore
    }

    /// Decide whether the branch introduced by `#elif`/`#else` is ignored.
    ///
    /// An incomplete statement discovered en route forces a single branch:
    /// earlier branches containing complete statements may have been
    /// followed, but no further branch may be.
    fn is_ignore_branch(&mut self) -> bool {
        if self.resolve_required && !self.is_brace_format() {
            self.directive.ifdef[self.directive.nest_level].single_branch = true;
        }
        let ifdef = &self.directive.ifdef[self.directive.nest_level];
        ifdef.ignore_all_branches || (ifdef.branch_chosen && ifdef.single_branch)
    }

    /// Commit to the `#else` branch when exactly one branch must be followed
    /// or the parser signals active statement resolution
    fn choose_branch(&mut self) {
        if !self.is_brace_format() {
            let resolve = self.resolve_required;
            let ifdef = &mut self.directive.ifdef[self.directive.nest_level];
            ifdef.branch_chosen = ifdef.single_branch || resolve;
        }
    }

    /// Push one nesting level for an `#if` directive. On overflow the push
    /// is silently dropped; outer levels stay intact.
    fn push_conditional(&mut self, first_branch_chosen: bool) -> bool {
        let ignore_all_branches = self.is_ignore();
        let mut ignore_branch = false;
        if self.directive.nest_level < MAX_NEST - 1 {
            self.directive.nest_level += 1;
            let single_branch = self.resolve_required;
            let ignoring = ignore_all_branches
                || (!first_branch_chosen
                    && !self.is_brace_format()
                    && (single_branch || !self.options.if0));
            self.directive.ifdef[self.directive.nest_level] = Conditional {
                ignore_all_branches,
                single_branch,
                branch_chosen: first_branch_chosen,
                ignoring,
            };
            ignore_branch = ignoring;
            debug!(
                "cpp: push conditional to depth {} (ignoring: {})",
                self.directive.nest_level, ignoring
            );
        }
        ignore_branch
    }

    /// Pop one nesting level for an `#endif` directive
    fn pop_conditional(&mut self) -> bool {
        if self.directive.nest_level > 0 {
            self.directive.nest_level -= 1;
            debug!("cpp: pop conditional to depth {}", self.directive.nest_level);
        }
        self.is_ignore()
    }

    /// Read a directive name of at most 9 alphabetic bytes, starting with
    /// the byte already in hand. A longer name is truncated; the surplus
    /// bytes stay in the stream and are skipped as directive body.
    fn read_directive_name(&mut self, first: u8) -> String {
        let mut name = String::new();
        let mut c = first;
        for i in 0..MAX_DIRECTIVE_NAME - 1 {
            if i > 0 {
                match self.reader.getc() {
                    Some(ch) if ch.is_ascii_alphabetic() => c = ch,
                    Some(ch) => {
                        self.reader.ungetc(ch);
                        break;
                    }
                    None => break,
                }
            }
            name.push(c as char);
        }
        name
    }

    /// Read an identifier into the scratch name, starting with the byte
    /// already in hand; the terminating byte is pushed back
    fn read_identifier(&mut self, first: u8) {
        self.directive.name.clear();
        let mut c = first;
        loop {
            self.directive.name.push(c as char);
            match self.reader.getc() {
                Some(ch) if is_ident(ch) => c = ch,
                Some(ch) => {
                    self.reader.ungetc(ch);
                    break;
                }
                None => break,
            }
        }
    }

    /// Emit a macro tag, subject to the define-tag and file-scope policy.
    /// Parameterized macros get their argument list extracted from the
    /// current directive line.
    pub(crate) fn make_define_tag(&mut self, name: &str, parameterized: bool) {
        let file_scope = !self.reader.is_header();
        if self.options.include_define_tags && (!file_scope || self.options.include_file_scope) {
            let signature = if parameterized {
                let start = self.reader.file_position();
                crate::arglist::arglist_from_file_pos(self.reader, start, name)
            } else {
                None
            };
            debug!("cpp: macro tag {} {:?}", name, signature);
            self.sink.make_tag(TagEntry {
                name: name.to_string(),
                kind: TagKind::Macro,
                file_scope,
                line_number_entry: self.options.locate != TagLocate::Pattern,
                line: self.reader.line_number(),
                signature,
            });
        }
    }

    /// `#define` / `#undef`: read the macro name, peek for `(` to detect a
    /// parameterized macro, and emit a tag unless this branch is ignored
    fn directive_define(&mut self, c: u8) {
        if is_ident_start(c) {
            self.read_identifier(c);
            let nc = self.reader.getc();
            if let Some(nc) = nc {
                self.reader.ungetc(nc);
            }
            let parameterized = nc == Some(b'(');
            if !self.is_ignore() {
                let name = self.directive.name.clone();
                self.make_define_tag(&name, parameterized);
            }
        }
        self.directive.state = DirectiveState::None;
    }

    /// `#pragma weak alias`: the alias gets a macro tag
    fn directive_pragma(&mut self, c: u8) {
        if is_ident_start(c) {
            self.read_identifier(c);
            if self.directive.name == "weak" {
                let mut c = self.reader.getc();
                while c == Some(b' ') {
                    c = self.reader.getc();
                }
                if let Some(ch) = c {
                    if is_ident_start(ch) {
                        self.read_identifier(ch);
                        let name = self.directive.name.clone();
                        self.make_define_tag(&name, false);
                    }
                }
            }
        }
        self.directive.state = DirectiveState::None;
    }

    /// `#if`-family: the first byte of the controlling expression chooses
    /// the first branch unless it is `'0'`
    fn directive_if(&mut self, c: u8) -> bool {
        let ignore = self.push_conditional(c != b'0');
        self.directive.state = DirectiveState::None;
        ignore
    }

    /// Classify the directive name after `#` and advance the state machine
    fn directive_hash(&mut self, c: u8) -> bool {
        let mut ignore = false;
        let name = self.read_directive_name(c);
        let kind = DIRECTIVE_TABLE.get(name.as_str()).copied();
        match kind {
            Some(DirectiveKind::Define) => self.directive.state = DirectiveState::Define,
            Some(DirectiveKind::Undef) => self.directive.state = DirectiveState::Undef,
            Some(DirectiveKind::Elif) | Some(DirectiveKind::Else) => {
                let branch_ignored = self.is_ignore_branch();
                ignore = self.set_ignore(branch_ignored);
                if !ignore && kind == Some(DirectiveKind::Else) {
                    self.choose_branch();
                }
                self.directive.state = DirectiveState::None;
            }
            Some(DirectiveKind::Endif) => {
                ignore = self.pop_conditional();
                self.directive.state = DirectiveState::None;
            }
            Some(DirectiveKind::Pragma) => self.directive.state = DirectiveState::Pragma,
            None => {
                if name.starts_with("if") {
                    self.directive.state = DirectiveState::If;
                } else {
                    self.directive.state = DirectiveState::None;
                }
            }
        }
        ignore
    }

    /// Handle one directive-body byte; returns the ignore state the
    /// sanitizer loop must apply
    pub(crate) fn handle_directive(&mut self, c: u8) -> bool {
        let mut ignore = self.is_ignore();
        match self.directive.state {
            DirectiveState::None => ignore = self.is_ignore(),
            DirectiveState::Define => self.directive_define(c),
            DirectiveState::Hash => ignore = self.directive_hash(c),
            DirectiveState::If => ignore = self.directive_if(c),
            DirectiveState::Pragma => self.directive_pragma(c),
            DirectiveState::Undef => self.directive_define(c),
        }
        ignore
    }
}
