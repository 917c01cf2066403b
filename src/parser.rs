//! Line-oriented PO/POT parser.
//!
//! Every input line is first classified into a [`Line`], then fed through a
//! single transition function over [`State`]. The machine never fails: lines it
//! does not understand are skipped, and entries without a source text are
//! dropped. Only the underlying reader can produce an error.

use std::{fs::File, io::Read, path::Path};

use log::debug;

use crate::{
    error::Error,
    escape::decode_quoted,
    traits::Parser,
    types::{Document, Entry},
    writer,
};

/// The entry field a keyword or continuation line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// `msgctxt`
    Context,
    /// `msgid`
    Source,
    /// `msgstr`
    Target,
}

impl Field {
    fn of(self, entry: &mut Entry) -> &mut String {
        match self {
            Field::Context => &mut entry.context,
            Field::Source => &mut entry.source,
            Field::Target => &mut entry.target,
        }
    }
}

/// Parser states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Start of input, before any header or entry. Comments here are dropped.
    Preamble,
    /// Between entries.
    SeekingEntry,
    /// After `msgid ""`, waiting for the header `msgstr`.
    InHeaderBlock,
    /// After the header `msgstr`; each quoted line is one `Key: Value` field.
    InHeaderContinuation,
    /// Right after a keyword line for the given field.
    InEntryField(Field),
    /// After at least one continuation line of the given field.
    InEntryContinuation(Field),
}

impl State {
    fn in_header(self) -> bool {
        matches!(self, State::InHeaderBlock | State::InHeaderContinuation)
    }
}

/// A classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// A `#` line, kept raw.
    Comment(&'a str),
    Blank,
    /// `msgid ""`, which opens the header entry.
    HeaderStart,
    /// `msgctxt`, `msgid` or `msgstr` with its decoded value.
    Keyword(Field, String),
    /// A bare quoted line with its decoded value.
    Continuation(String),
    Other,
}

impl<'a> Line<'a> {
    pub fn classify(raw: &'a str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with('#') {
            Line::Comment(raw)
        } else if trimmed.is_empty() {
            Line::Blank
        } else if trimmed.starts_with(r#"msgid """#) {
            Line::HeaderStart
        } else if trimmed.starts_with("msgctxt ") {
            Line::Keyword(Field::Context, decode_quoted(trimmed))
        } else if trimmed.starts_with("msgid ") {
            Line::Keyword(Field::Source, decode_quoted(trimmed))
        } else if trimmed.starts_with("msgstr ") {
            Line::Keyword(Field::Target, decode_quoted(trimmed))
        } else if trimmed.starts_with('"') {
            Line::Continuation(decode_quoted(trimmed))
        } else {
            Line::Other
        }
    }
}

/// The parser state machine and the document it is building.
#[derive(Debug)]
pub struct Machine {
    state: State,
    doc: Document,
    current: Option<Entry>,
    pending_comments: Vec<String>,
    header_buf: String,
    dropped: usize,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    pub fn new() -> Self {
        Machine {
            state: State::Preamble,
            doc: Document::new(),
            current: None,
            pending_comments: Vec::new(),
            header_buf: String::new(),
            dropped: 0,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Feeds one raw line (without its line terminator).
    pub fn feed(&mut self, raw: &str) {
        let line = Line::classify(raw);
        self.state = self.step(line);
    }

    fn step(&mut self, line: Line<'_>) -> State {
        use State::*;

        match (self.state, line) {
            (Preamble, Line::Comment(_)) => Preamble,
            (state, Line::Comment(raw)) if state.in_header() => {
                self.header_buf.push_str(raw.trim());
                self.header_buf.push('\n');
                state
            }
            (state, Line::Comment(raw)) => {
                self.pending_comments.push(raw.to_string());
                state
            }

            (Preamble, Line::Blank) => Preamble,
            (state, Line::Blank) if state.in_header() => {
                self.flush_header();
                SeekingEntry
            }
            (state, Line::Blank) => {
                if self.flush_entry() {
                    self.pending_comments.clear();
                    SeekingEntry
                } else {
                    state
                }
            }

            (_, Line::HeaderStart) => InHeaderBlock,

            (Preamble | InHeaderBlock | InHeaderContinuation, Line::Keyword(Field::Target, value)) => {
                self.header_buf.push_str(&value);
                InHeaderContinuation
            }
            (state, Line::Continuation(value)) if state.in_header() => {
                parse_header_line(&mut self.doc, &value);
                InHeaderContinuation
            }
            (state, Line::Keyword(field, value)) => {
                if state.in_header() {
                    self.flush_header();
                }
                self.open_field(field, value);
                InEntryField(field)
            }

            (InEntryField(field) | InEntryContinuation(field), Line::Continuation(value)) => {
                if let Some(entry) = self.current.as_mut() {
                    field.of(entry).push_str(&value);
                }
                InEntryContinuation(field)
            }
            (state, Line::Continuation(_)) => state,

            (state, Line::Other) => state,
        }
    }

    fn open_field(&mut self, field: Field, value: String) {
        if field == Field::Context && !self.flush_entry() && self.current.take().is_some() {
            self.dropped += 1;
        }
        let pending = &mut self.pending_comments;
        let entry = self
            .current
            .get_or_insert_with(|| Entry::default().with_comments(std::mem::take(pending)));
        *field.of(entry) = value;
    }

    /// Appends the current entry if it has a source. Returns whether it did.
    fn flush_entry(&mut self) -> bool {
        match self.current.take() {
            Some(entry) if !entry.source.is_empty() => {
                self.doc.push_entry(entry);
                true
            }
            other => {
                self.current = other;
                false
            }
        }
    }

    fn flush_header(&mut self) {
        if self.header_buf.is_empty() {
            return;
        }
        let buf = std::mem::take(&mut self.header_buf);
        for line in buf.split('\n').flat_map(|part| part.split(r"\n")) {
            parse_header_line(&mut self.doc, line);
        }
    }

    /// Flushes whatever is still open and returns the finished document.
    pub fn finish(mut self) -> Document {
        if !self.flush_entry() && self.current.is_some() {
            self.dropped += 1;
        }
        if self.state.in_header() {
            self.flush_header();
        }
        debug!(
            "parsed PO document: language={:?}, {} headers, {} entries, {} dropped",
            self.doc.language(),
            self.doc.headers().len(),
            self.doc.len(),
            self.dropped
        );
        self.doc
    }
}

/// Parses one `Key: Value` header line into `doc`.
///
/// The key and value are split on the first colon and trimmed; a trailing
/// escaped newline is removed. Lines without a key are ignored.
pub fn parse_header_line(doc: &mut Document, line: &str) {
    let line = line.trim();
    let line = line.strip_suffix(r"\n").unwrap_or(line);
    if let Some((key, value)) = line.split_once(':') {
        let key = key.trim();
        if !key.is_empty() {
            doc.set_header(key, value.trim());
        }
    }
}

/// Parses PO text given as an iterator of lines.
pub fn parse_lines<'a, I>(lines: I) -> Document
where
    I: IntoIterator<Item = &'a str>,
{
    let mut machine = Machine::new();
    for line in lines {
        machine.feed(line);
    }
    machine.finish()
}

impl Parser for Document {
    fn from_reader<R: std::io::BufRead>(reader: R) -> Result<Self, Error> {
        let mut machine = Machine::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = if idx == 0 {
                line.trim_start_matches('\u{feff}')
            } else {
                line.as_str()
            };
            machine.feed(line);
        }
        Ok(machine.finish())
    }

    fn to_writer<W: std::io::Write>(&self, writer: W) -> Result<(), Error> {
        writer::write_document(self, writer)
    }

    /// Decodes through a BOM sniffer so UTF-16 files and UTF-8 files with a BOM read correctly.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let file = File::open(path).map_err(Error::Io)?;
        let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
            .bom_override(true)
            .strip_bom(true)
            .build(file);

        let mut decoded = String::new();
        decoder.read_to_string(&mut decoded).map_err(Error::Io)?;

        Self::from_str(&decoded)
    }
}
