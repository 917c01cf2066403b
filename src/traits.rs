//! Shared I/O surface for the two file kinds this crate handles.
//!
//! [`Document`](crate::Document) implements [`Parser`] for PO/POT text and
//! [`SourceTable`](crate::SourceTable) for the CSV string table, so both load
//! and save through the same calls.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Cursor, Write},
    path::Path,
};

use crate::error::Error;

/// Reading and writing one catalog file: a PO/POT document or a CSV table.
///
/// # Example
///
/// ```rust,no_run
/// use pocodec::{Document, SourceTable, traits::Parser};
/// let table = SourceTable::read_from("stringtable.csv")?;
/// let doc = Document::read_from("l18n/russian.po")?;
/// println!("{} rows, {} entries", table.len(), doc.len());
/// doc.write_to("l18n/russian.po")?;
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Parser {
    /// Reads the whole input. Documents never fail on malformed lines; only
    /// I/O and CSV errors surface.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse from file path.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let file = File::open(path).map_err(Error::Io)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Writes the canonical serialization.
    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error>;

    /// Creates or truncates `path`, then writes through a buffer.
    fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Parse from a string.
    fn from_str(s: &str) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(s))
    }

    /// Parse from bytes.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(bytes))
    }
}
