//! CSV string tables that drive PO/POT generation.
//!
//! The first row names the columns. In every data row the first column is the
//! translation key and the second the source text; further columns may hold
//! translations named by language. Keys must be unique.
//!
//! Only the first two columns are required; shorter rows are skipped wherever
//! the table is applied to a document.

use std::{
    collections::{BTreeMap, HashMap},
    io::{BufRead, Read, Write},
};

use chrono::{DateTime, Utc};
use log::{debug, info};
use xxhash_rust::xxh64::xxh64;

use crate::{
    error::Error,
    header::{
        HeaderOptions, POT_CREATION_DATE, X_CSV_HASH, format_fingerprint, format_timestamp,
        parse_fingerprint,
    },
    languages::DEFAULT_LANGUAGES,
    traits::Parser,
    types::{Document, Entry},
};

/// A loaded CSV string table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    fingerprint: u64,
}

/// A data row with at least a key and a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRow<'a> {
    pub key: &'a str,
    pub source: &'a str,
    /// 1-based record number; the column header is row 1.
    pub row: usize,
    cells: &'a [String],
}

impl<'a> SourceRow<'a> {
    /// Returns the cell at `index`, or `""` when the row is shorter.
    pub fn cell(&self, index: usize) -> &'a str {
        self.cells.get(index).map(String::as_str).unwrap_or_default()
    }
}

impl SourceTable {
    /// Builds a table from already split records, checking key uniqueness.
    pub fn from_records(records: Vec<Vec<String>>, fingerprint: u64) -> Result<Self, Error> {
        let mut records = records.into_iter();
        let columns = records.next().unwrap_or_default();
        let rows: Vec<Vec<String>> = records.collect();

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (idx, row) in rows.iter().enumerate() {
            let Some(key) = row.first() else {
                continue;
            };
            // Row numbers are 1-based and the column header is row 1.
            if let Some(first_row) = seen.insert(key.as_str(), idx + 2) {
                return Err(Error::DuplicateKey {
                    key: key.clone(),
                    row: idx + 2,
                    first_row,
                });
            }
        }

        Ok(SourceTable {
            columns,
            rows,
            fingerprint,
        })
    }

    /// Column names from the first row.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Language column names, i.e. every column after key and source.
    pub fn language_columns(&self) -> &[String] {
        self.columns.get(2..).unwrap_or_default()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterates data rows that have both a key and a source column.
    pub fn rows(&self) -> impl Iterator<Item = SourceRow<'_>> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(idx, cells)| match cells.as_slice() {
                [key, source, ..] => Some(SourceRow {
                    key,
                    source,
                    row: idx + 2,
                    cells,
                }),
                _ => None,
            })
    }

    /// Number of data rows, including short ones.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// XXH64 of the raw CSV bytes the table was read from.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Whether the table has a row for `(key, source)`.
    pub fn contains(&self, key: &str, source: &str) -> bool {
        self.rows().any(|row| row.key == key && row.source == source)
    }
}

impl Parser for SourceTable {
    fn from_reader<R: BufRead>(mut reader: R) -> Result<Self, Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let fingerprint = xxh64(&bytes, 0);

        let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes[..]);
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(body);
        let mut records = Vec::new();
        for result in rdr.records() {
            let record = result?;
            records.push(record.iter().map(str::to_string).collect());
        }

        let table = Self::from_records(records, fingerprint)?;
        debug!(
            "loaded source table: {} columns, {} rows, fingerprint {:016x}",
            table.columns.len(),
            table.rows.len(),
            fingerprint
        );
        Ok(table)
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Builds the template document for `table`.
///
/// Headers of `existing` are carried over, as are comments of entries whose
/// key and source did not change. `POT-Creation-Date` only moves when the CSV
/// fingerprint differs from the stored `X-CSV-Hash`.
pub fn build_template(
    table: &SourceTable,
    existing: Option<&Document>,
    options: &HeaderOptions,
    now: DateTime<Utc>,
) -> Result<Document, Error> {
    if table.rows().next().is_none() {
        return Err(Error::EmptySourceTable);
    }

    let mut doc = Document::new();
    if let Some(existing) = existing {
        for (key, value) in existing.headers() {
            doc.set_header(key.as_str(), value.as_str());
        }
    }

    for row in table.rows() {
        let mut entry = Entry::new(row.key, row.source, "");
        if let Some(prev) = existing.and_then(|e| e.entry(row.key, row.source)) {
            entry.set_comments(prev.comments().to_vec());
        }
        upsert_entry(&mut doc, entry);
    }

    let csv_changed = existing
        .and_then(|e| parse_fingerprint(e.header(X_CSV_HASH)))
        .is_none_or(|old| old != table.fingerprint());
    // Must precede the lifecycle update: the content hash covers this header.
    doc.set_header(X_CSV_HASH, format_fingerprint(table.fingerprint()));
    doc.update_build_headers_at(options, now);

    if csv_changed {
        info!("source table changed, refreshing {}", POT_CREATION_DATE);
        doc.set_header(POT_CREATION_DATE, format_timestamp(now));
    }

    Ok(doc)
}

/// Rebuilds the `language` document from `table`, keeping existing work.
///
/// Entries follow table order. For every `(key, source)` pair already present
/// in `existing`, its translation and comments are kept; pairs no longer in the
/// table are dropped. Headers of `existing` are carried over before the
/// lifecycle update runs, so an unchanged document keeps its revision date.
pub fn merge_into(
    table: &SourceTable,
    existing: Option<&Document>,
    language: &str,
    options: &HeaderOptions,
    now: DateTime<Utc>,
) -> Document {
    let mut doc = Document::new();
    if let Some(existing) = existing {
        for (key, value) in existing.headers() {
            doc.set_header(key.as_str(), value.as_str());
        }
    }
    doc.set_language(language);

    let mut kept = 0;
    for row in table.rows() {
        let entry = match existing.and_then(|e| e.entry(row.key, row.source)) {
            Some(prev) => {
                kept += usize::from(prev.is_translated());
                Entry::new(row.key, row.source, prev.target.as_str())
                    .with_comments(prev.comments().to_vec())
            }
            None => Entry::new(row.key, row.source, ""),
        };
        upsert_entry(&mut doc, entry);
    }

    doc.update_build_headers_at(options, now);
    debug!(
        "merged {} entries for {}, {} translations kept",
        doc.len(),
        language,
        kept
    );
    doc
}

/// Creates a fresh `language` document whose targets come from the table
/// column named after the language, when there is one.
pub fn seed_language(
    table: &SourceTable,
    language: &str,
    options: &HeaderOptions,
    now: DateTime<Utc>,
) -> Document {
    let column = table.column_index(language);
    let mut doc = Document::with_language(language);
    for row in table.rows() {
        let target = column.map(|idx| row.cell(idx)).unwrap_or_default();
        doc.upsert(row.key, row.source, target);
    }
    doc.update_build_headers_at(options, now);
    doc
}

/// Writes the merged CSV: key, original, then one column per language.
///
/// Only languages from [`DEFAULT_LANGUAGES`] are exported, in that order. Every
/// field is quoted and every row ends with a trailing comma, the layout game
/// string tables expect.
pub fn export_rows<W: Write>(
    table: &SourceTable,
    documents: &BTreeMap<String, Document>,
    mut writer: W,
) -> Result<(), Error> {
    let languages: Vec<&str> = DEFAULT_LANGUAGES
        .iter()
        .copied()
        .filter(|lang| documents.contains_key(*lang))
        .collect();

    let mut header = vec!["Language", "original"];
    header.extend(languages.iter().copied());
    write_quoted_row(&mut writer, &header)?;

    for row in table.rows() {
        let mut record = vec![row.key, row.source];
        for lang in &languages {
            record.push(
                documents
                    .get(*lang)
                    .map(|doc| doc.get(row.key, row.source))
                    .unwrap_or_default(),
            );
        }
        write_quoted_row(&mut writer, &record)?;
    }
    writer.flush()?;
    debug!(
        "exported {} rows for {} languages",
        table.len(),
        languages.len()
    );
    Ok(())
}

/// Writes `"a","b",` followed by a newline, doubling embedded quotes.
fn write_quoted_row<W: Write>(writer: &mut W, fields: &[&str]) -> Result<(), Error> {
    for field in fields {
        write!(writer, "\"{}\",", field.replace('"', "\"\""))?;
    }
    writeln!(writer)?;
    Ok(())
}

fn upsert_entry(doc: &mut Document, entry: Entry) {
    match doc.entry_mut(&entry.context, &entry.source) {
        Some(existing) => existing.target = entry.target,
        None => doc.push_entry(entry),
    }
}
