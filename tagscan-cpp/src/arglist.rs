//! Macro argument list extraction
//!
//! A parameterized `#define`'s signature is recovered by re-reading the
//! bytes of the directive line from a saved file position and running them
//! through a small stand-alone stripper: comments and whitespace runs
//! collapse to single spaces while string and character literal content is
//! kept verbatim. The stripped text is then searched for `name(` and the
//! balanced parenthesized span is returned.
//!
//! The stripper knows nothing of D comments, raw literals, or trigraphs,
//! and the name search is a plain substring match; a macro whose name is a
//! suffix of an earlier identifier can bind to the wrong argument list.

use tagscan_common::SourceReader;

/// States of the stripper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    None,
    Escape,
    CComment,
    CppComment,
    DoubleQuote,
    SingleQuote,
}

/// Collapse comments and whitespace runs in `buf` in place, preserving
/// string and character literal content. Idempotent on its own output.
fn strip_code_buffer(buf: &mut Vec<u8>) {
    let mut pos = 0;
    let mut state = ParseState::None;
    let mut prev_state = ParseState::None;

    let emit_space = |buf: &mut Vec<u8>, pos: &mut usize| {
        if *pos > 0 && buf[*pos - 1] != b' ' {
            buf[*pos] = b' ';
            *pos += 1;
        }
    };

    let mut i = 0;
    while i < buf.len() {
        let c = buf[i];
        match state {
            ParseState::Escape => {
                if prev_state == ParseState::DoubleQuote || prev_state == ParseState::SingleQuote {
                    buf[pos] = c;
                    pos += 1;
                }
                state = prev_state;
                prev_state = ParseState::None;
            }
            ParseState::CComment => {
                if c == b'/' && i > 0 && buf[i - 1] == b'*' {
                    emit_space(buf, &mut pos);
                    state = ParseState::None;
                }
            }
            ParseState::CppComment => {
                if c == b'\n' {
                    emit_space(buf, &mut pos);
                    state = ParseState::None;
                }
            }
            ParseState::DoubleQuote => {
                buf[pos] = c;
                pos += 1;
                if c == b'\\' {
                    prev_state = state;
                    state = ParseState::Escape;
                } else if c == b'"' {
                    state = ParseState::None;
                }
            }
            ParseState::SingleQuote => {
                buf[pos] = c;
                pos += 1;
                if c == b'\\' {
                    prev_state = state;
                    state = ParseState::Escape;
                } else if c == b'\'' {
                    state = ParseState::None;
                }
            }
            ParseState::None => {
                if c == b'/' {
                    match buf.get(i + 1) {
                        Some(b'*') => state = ParseState::CComment,
                        Some(b'/') => state = ParseState::CppComment,
                        _ => {
                            buf[pos] = b'/';
                            pos += 1;
                        }
                    }
                } else if c == b'"' {
                    buf[pos] = c;
                    pos += 1;
                    state = ParseState::DoubleQuote;
                } else if c == b'\'' {
                    buf[pos] = c;
                    pos += 1;
                    state = ParseState::SingleQuote;
                } else if c == b'\\' {
                    // A backslash outside a literal escapes the next byte;
                    // both vanish, which is how continuations disappear.
                    prev_state = state;
                    state = ParseState::Escape;
                } else if c.is_ascii_whitespace() {
                    emit_space(buf, &mut pos);
                } else {
                    buf[pos] = c;
                    pos += 1;
                }
            }
        }
        i += 1;
    }
    buf.truncate(pos);
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Extract `"(arg1, arg2, ...)"` for `name` from a caller-owned buffer.
/// The buffer is stripped in place first. Returns `None` when the name or
/// its `(` cannot be found. An unbalanced list is returned as-is up to the
/// end of the buffer.
pub fn arglist_from_str(buf: &mut Vec<u8>, name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    strip_code_buffer(buf);
    let start = find_subslice(buf, name.as_bytes())?;
    let open = start + find_subslice(&buf[start..], b"(")?;

    let mut level = 1;
    let mut end = open + 1;
    loop {
        if level == 0 {
            break;
        }
        match buf.get(end).copied() {
            None | Some(0) => break,
            Some(b'(') => level += 1,
            Some(b')') => level -= 1,
            _ => {}
        }
        end += 1;
    }
    Some(String::from_utf8_lossy(&buf[open..end]).into_owned())
}

/// Extract the argument list for `name` from the byte range between a saved
/// file position and the current one. The reader's position is restored
/// before returning. Returns `None` when no list follows the name or the
/// range is empty.
pub fn arglist_from_file_pos(
    reader: &mut SourceReader,
    start: usize,
    name: &str,
) -> Option<String> {
    let pos2 = reader.tell();
    let original = reader.position();

    reader.seek(start);
    let result = if pos2 > start {
        let mut buf = reader.read_bytes(pos2 - start);
        arglist_from_str(&mut buf, name)
    } else {
        None
    };
    reader.seek(original);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(input: &str) -> String {
        let mut buf = input.as_bytes().to_vec();
        strip_code_buffer(&mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_strip_collapses_comments_and_whitespace() {
        assert_eq!(strip("a /* c */ b"), "a b");
        assert_eq!(strip("a  \t b\n c"), "a b c");
        assert_eq!(strip("a // trailing\nb"), "a b");
    }

    #[test]
    fn test_strip_preserves_literals() {
        assert_eq!(strip(r#"f("x /* y */", 'z')"#), r#"f("x /* y */", 'z')"#);
        assert_eq!(strip(r#""he \"said\"""#), r#""he \"said\"""#);
    }

    #[test]
    fn test_strip_drops_continuations() {
        assert_eq!(strip("a \\\n b"), "a b");
    }

    #[test]
    fn test_strip_is_idempotent() {
        let once = strip("f( /*c*/ a,\n   b )  // t\n");
        assert_eq!(strip(&once), once);
    }

    #[test]
    fn test_arglist_simple() {
        let mut buf = b"#define SUM(a,b) ((a)+(b))\n".to_vec();
        assert_eq!(arglist_from_str(&mut buf, "SUM"), Some("(a,b)".to_string()));
    }

    #[test]
    fn test_arglist_nested_parens() {
        let mut buf = b"#define W(x, y) z\nW((1,2), 3)".to_vec();
        assert_eq!(arglist_from_str(&mut buf, "W"), Some("(x, y)".to_string()));
    }

    #[test]
    fn test_arglist_missing_paren() {
        let mut buf = b"#define PLAIN 1\n".to_vec();
        assert_eq!(arglist_from_str(&mut buf, "PLAIN"), None);
        let mut buf = b"no name here".to_vec();
        assert_eq!(arglist_from_str(&mut buf, "SUM"), None);
    }

    #[test]
    fn test_arglist_empty_name() {
        let mut buf = b"F(a)".to_vec();
        assert_eq!(arglist_from_str(&mut buf, ""), None);
    }

    #[test]
    fn test_arglist_unbalanced_runs_to_end() {
        let mut buf = b"F(a, (b".to_vec();
        assert_eq!(arglist_from_str(&mut buf, "F"), Some("(a, (b".to_string()));
    }

    #[test]
    fn test_arglist_balance_is_zero() {
        let mut buf = b"#define M(a, f(b), c) body".to_vec();
        let list = arglist_from_str(&mut buf, "M").unwrap();
        let opens = list.bytes().filter(|&b| b == b'(').count();
        let closes = list.bytes().filter(|&b| b == b')').count();
        assert_eq!(opens, closes);
    }

    #[test]
    fn test_arglist_prefix_match_binds_to_earlier_identifier() {
        // The substring search can bind to a longer identifier containing
        // the name; no word-boundary check is made.
        let mut buf = b"MYSUM(x) SUM(a,b)".to_vec();
        assert_eq!(arglist_from_str(&mut buf, "SUM"), Some("(x)".to_string()));
    }

    #[test]
    fn test_arglist_from_file_pos_restores_position() {
        let mut r = SourceReader::from_str("t.c", "#define ADD(a,b) (a+b)\nrest");
        // consume "#define ADD"
        for _ in 0..11 {
            r.getc();
        }
        let start = r.file_position();
        let before = r.position();
        let list = arglist_from_file_pos(&mut r, start, "ADD");
        assert_eq!(list, Some("(a,b)".to_string()));
        assert_eq!(r.position(), before);
    }

    #[test]
    fn test_arglist_from_file_pos_empty_range() {
        let mut r = SourceReader::from_str("t.c", "x");
        let tell = r.tell();
        assert_eq!(arglist_from_file_pos(&mut r, tell, "x"), None);
    }
}
