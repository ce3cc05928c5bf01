//! Comment and literal blanking.
//!
//! Produces a "code view" of a source text with the same byte length and the
//! same line breaks, where comment bodies and the contents of string and
//! character literals are replaced by spaces. Braces inside them then no
//! longer disturb depth counting, and commented-out declarations are not
//! mistaken for live code. Offsets and line numbers stay valid for the raw
//! text.

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    Str,
    Char,
    RawStr,
}

/// Blank comments and literal contents, keeping newlines and delimiters.
pub fn blank_comments_and_literals(src: &str) -> String {
    let bytes = src.as_bytes();
    let mut out: Vec<u8> = bytes.to_vec();
    let mut state = State::Code;
    let mut raw_close: Vec<u8> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        match state {
            State::Code => match b {
                b'/' if next == Some(b'/') => {
                    state = State::LineComment;
                    blank(&mut out, i, 2);
                    i += 2;
                    continue;
                }
                b'/' if next == Some(b'*') => {
                    state = State::BlockComment;
                    blank(&mut out, i, 2);
                    i += 2;
                    continue;
                }
                b'"' => {
                    if let Some((delim_len, close)) = raw_string_open(bytes, i) {
                        raw_close = close;
                        state = State::RawStr;
                        // keep the quote, blank the delimiter and '('
                        blank(&mut out, i + 1, delim_len + 1);
                        i += delim_len + 2;
                        continue;
                    }
                    state = State::Str;
                }
                b'\'' => {
                    if char_literal_open(bytes, i) {
                        state = State::Char;
                    }
                }
                _ => {}
            },
            State::LineComment => {
                if b == b'\n' {
                    state = State::Code;
                } else {
                    out[i] = b' ';
                }
            }
            State::BlockComment => {
                if b == b'*' && next == Some(b'/') {
                    blank(&mut out, i, 2);
                    state = State::Code;
                    i += 2;
                    continue;
                }
                if b != b'\n' {
                    out[i] = b' ';
                }
            }
            State::Str | State::Char => {
                let quote = if state == State::Str { b'"' } else { b'\'' };
                if b == b'\\' {
                    out[i] = b' ';
                    if let Some(n) = next {
                        if n != b'\n' {
                            out[i + 1] = b' ';
                        }
                    }
                    i += 2;
                    continue;
                }
                if b == quote || b == b'\n' {
                    // unterminated literals end at the line break
                    state = State::Code;
                } else {
                    out[i] = b' ';
                }
            }
            State::RawStr => {
                if bytes[i..].starts_with(&raw_close) {
                    // blank ")delim", keep the closing quote
                    let n = raw_close.len() - 1;
                    blank(&mut out, i, n);
                    i += raw_close.len();
                    state = State::Code;
                    continue;
                }
                if b != b'\n' {
                    out[i] = b' ';
                }
            }
        }
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn blank(out: &mut [u8], start: usize, len: usize) {
    let end = (start + len).min(out.len());
    for b in &mut out[start..end] {
        if *b != b'\n' {
            *b = b' ';
        }
    }
}

/// Whether the `'` at `quote` opens a character literal. It does when no
/// identifier token precedes it, or when that token is an encoding prefix
/// (`L'x'`, `u8'x'`). Any other token means a digit separator: `1'000'000`.
fn char_literal_open(bytes: &[u8], quote: usize) -> bool {
    let start = bytes[..quote]
        .iter()
        .rposition(|b| !(b.is_ascii_alphanumeric() || *b == b'_'))
        .map_or(0, |p| p + 1);
    matches!(&bytes[start..quote], b"" | b"L" | b"u" | b"U" | b"u8")
}

/// Detect `R"delim(` at `quote`. Returns the delimiter length and the
/// closing sequence `)delim"`.
fn raw_string_open(bytes: &[u8], quote: usize) -> Option<(usize, Vec<u8>)> {
    if quote == 0 || bytes[quote - 1] != b'R' {
        return None;
    }
    if quote >= 2 && (bytes[quote - 2].is_ascii_alphanumeric() || bytes[quote - 2] == b'_') {
        // identifier ending in R, unless it is an encoding prefix like u8R / LR
        let prefix_ok = matches!(bytes[quote - 2], b'L' | b'u' | b'U' | b'8');
        if !prefix_ok {
            return None;
        }
    }
    let mut j = quote + 1;
    while j < bytes.len() && j - quote - 1 <= 16 {
        match bytes[j] {
            b'(' => {
                let delim = &bytes[quote + 1..j];
                let mut close = Vec::with_capacity(delim.len() + 2);
                close.push(b')');
                close.extend_from_slice(delim);
                close.push(b'"');
                return Some((delim.len(), close));
            }
            b' ' | b'\\' | b')' | b'\n' | b'"' => return None,
            _ => j += 1,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blanking_preserves_length_and_lines() {
        let src = "int a; // {\n/* }\n } */ int b;\nconst char* s = \"{\";\n";
        let out = blank_comments_and_literals(src);
        assert_eq!(out.len(), src.len());
        assert_eq!(out.lines().count(), src.lines().count());
        assert!(!out.contains('{'));
        assert!(!out.contains('}'));
        assert!(out.contains("int b;"));
        assert!(out.contains("s = \" \";"), "quotes are kept: {out}");
    }

    #[test]
    fn test_char_literals_and_escapes() {
        let src = "char c = '{'; char q = '\\''; const char* s = \"a\\\"}\";";
        let out = blank_comments_and_literals(src);
        assert!(!out.contains('{'));
        assert!(!out.contains('}'));
        assert!(out.ends_with(';'));
    }

    #[test]
    fn test_digit_separators_are_not_char_literals() {
        let src = "int n = 1'000'000; void f() {}";
        let out = blank_comments_and_literals(src);
        assert!(out.contains("void f() {}"));
    }

    #[test]
    fn test_prefixed_char_literals_are_blanked() {
        let src = "wchar_t a = L'{'; char16_t b = u'}'; char32_t c = U'{'; char8_t d = u8'}';";
        let out = blank_comments_and_literals(src);
        assert!(!out.contains('{'), "{out}");
        assert!(!out.contains('}'), "{out}");
        assert_eq!(out.len(), src.len());
    }

    #[test]
    fn test_raw_string_literal() {
        let src = "auto s = R\"x({ \"quoted\" })x\"; int z;";
        let out = blank_comments_and_literals(src);
        assert!(!out.contains('{'));
        assert!(out.contains("int z;"));
        assert_eq!(out.len(), src.len());
    }

    #[test]
    fn test_unterminated_comment_blanks_to_end() {
        let src = "class A { /* never closed\n public: void f(); };";
        let out = blank_comments_and_literals(src);
        assert!(out.starts_with("class A { "));
        assert!(!out.contains("public"));
    }
}
