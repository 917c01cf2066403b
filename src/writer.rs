//! Canonical text emission for [`Document`].
//!
//! Output is deterministic: standard headers in a fixed order, then the rest
//! sorted by key, then every entry in document order.

use std::{
    fmt::{self, Display, Formatter},
    io::Write,
};

use crate::{
    error::Error,
    escape::{encode_fragment, encode_header_line},
    header::STANDARD_HEADERS,
    types::{Document, Entry},
};

/// Writes the canonical text of `doc` to `writer`.
pub fn write_document<W: Write>(doc: &Document, mut writer: W) -> Result<(), Error> {
    writer.write_all(doc.to_string().as_bytes())?;
    Ok(())
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, r#"msgid """#)?;
        writeln!(f, r#"msgstr """#)?;

        let headers = self.headers();
        for key in STANDARD_HEADERS {
            if let Some(value) = headers.get(*key) {
                write_header(f, key, value)?;
            }
        }
        for (key, value) in headers {
            if !STANDARD_HEADERS.contains(&key.as_str()) {
                write_header(f, key, value)?;
            }
        }
        writeln!(f)?;

        for entry in self.entries() {
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for comment in self.comments() {
            writeln!(f, "{}", comment)?;
        }
        if !self.context.is_empty() {
            write_field(f, "msgctxt", &self.context)?;
        }
        write_field(f, "msgid", &self.source)?;
        write_field(f, "msgstr", &self.target)?;
        writeln!(f)
    }
}

fn write_header(f: &mut Formatter<'_>, key: &str, value: &str) -> fmt::Result {
    let line = format!("{}: {}\n", key, value);
    writeln!(f, "\"{}\"", encode_header_line(&line))
}

/// Writes `keyword "value"`, splitting multi-line values into one quoted line
/// per segment. Every segment but the last ends in an escaped newline.
fn write_field(f: &mut Formatter<'_>, keyword: &str, value: &str) -> fmt::Result {
    write!(f, "{} ", keyword)?;
    let segments: Vec<&str> = value.split('\n').collect();
    let last = segments.len() - 1;
    for (idx, segment) in segments.iter().enumerate() {
        if idx > 0 {
            writeln!(f)?;
        }
        write!(f, "\"{}", encode_fragment(segment))?;
        if idx < last {
            write!(f, r"\n")?;
        }
        write!(f, "\"")?;
    }
    writeln!(f)
}
