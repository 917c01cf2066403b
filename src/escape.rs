//! Escape handling for quoted PO fields.
//!
//! Decoding is lenient: unknown escapes keep their backslash. Encoding only
//! produces the escapes the decoder understands.

/// Decodes the first quoted string on `line`.
///
/// Scanning starts after the first `"` and stops at the first unescaped
/// closing quote; anything after it is ignored. Returns an empty string when
/// the line has no quote at all.
pub fn decode_quoted(line: &str) -> String {
    let Some(start) = line.find('"') else {
        return String::new();
    };

    let mut out = String::new();
    let mut chars = line[start + 1..].chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            '"' => break,
            _ => out.push(c),
        }
    }
    out
}

/// Escapes a single-line fragment: backslash, double quote, tab and carriage return.
pub fn encode_fragment(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        match c {
            '\\' => out.push_str(r"\\"),
            '"' => out.push_str(r#"\""#),
            '\t' => out.push_str(r"\t"),
            '\r' => out.push_str(r"\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes a header line. Newlines become `\n`, tabs are left literal.
pub(crate) fn encode_header_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 2);
    for c in line.chars() {
        match c {
            '\\' => out.push_str(r"\\"),
            '"' => out.push_str(r#"\""#),
            '\n' => out.push_str(r"\n"),
            _ => out.push(c),
        }
    }
    out
}
