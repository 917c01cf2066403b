//! Header lifecycle: generator identity, project identity and change-gated
//! timestamps.
//!
//! The content fingerprint ignores the two date headers and the fingerprint
//! header itself, so regenerating an unchanged document reproduces its text
//! byte for byte.

use chrono::{DateTime, Utc};
use log::debug;
use xxhash_rust::xxh64::Xxh64;

use crate::types::Document;

pub const PROJECT_ID_VERSION: &str = "Project-Id-Version";
pub const POT_CREATION_DATE: &str = "POT-Creation-Date";
pub const PO_REVISION_DATE: &str = "PO-Revision-Date";
pub const LAST_TRANSLATOR: &str = "Last-Translator";
pub const LANGUAGE_TEAM: &str = "Language-Team";
pub const LANGUAGE: &str = "Language";
pub const MIME_VERSION: &str = "MIME-Version";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_TRANSFER_ENCODING: &str = "Content-Transfer-Encoding";
pub const X_GENERATOR: &str = "X-Generator";

/// Fingerprint of the document content, as 16 hex digits.
pub const X_CONTENT_HASH: &str = "X-Content-Hash";
/// Fingerprint of the CSV source a template was generated from.
pub const X_CSV_HASH: &str = "X-CSV-Hash";

/// Headers written first, in this order, when present.
pub const STANDARD_HEADERS: &[&str] = &[
    PROJECT_ID_VERSION,
    POT_CREATION_DATE,
    PO_REVISION_DATE,
    LAST_TRANSLATOR,
    LANGUAGE_TEAM,
    LANGUAGE,
    MIME_VERSION,
    CONTENT_TYPE,
    CONTENT_TRANSFER_ENCODING,
    X_GENERATOR,
];

/// Headers that never contribute to the content fingerprint.
pub const VOLATILE_HEADERS: &[&str] = &[PO_REVISION_DATE, POT_CREATION_DATE, X_CONTENT_HASH];

/// Timestamp layout used for the date headers, e.g. `2025-01-31 09:15+0000`.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M%z";

/// Formats `time` the way the date headers store it.
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.format(DATE_FORMAT).to_string()
}

/// Formats a 64-bit fingerprint as stored in the hash headers.
pub fn format_fingerprint(hash: u64) -> String {
    format!("{:016x}", hash)
}

/// Parses a stored fingerprint; `None` when empty or not hexadecimal.
pub fn parse_fingerprint(value: &str) -> Option<u64> {
    u64::from_str_radix(value.trim(), 16).ok()
}

/// Options for [`Document::update_build_headers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderOptions {
    /// Value written to `X-Generator` on every update.
    pub generator: String,
    /// Written to `Project-Id-Version` when non-empty.
    pub project_version: Option<String>,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        HeaderOptions {
            generator: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            project_version: None,
        }
    }
}

impl HeaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the generator identity.
    pub fn with_generator(mut self, generator: impl Into<String>) -> Self {
        self.generator = generator.into();
        self
    }

    /// Sets the project identity. Empty strings are ignored at update time.
    pub fn with_project_version(mut self, project_version: Option<String>) -> Self {
        self.project_version = project_version;
        self
    }
}

impl Document {
    /// Computes the content fingerprint.
    ///
    /// Covers the language, every non-volatile header in key order, and each
    /// entry's context, source, target and comments in document order.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = Xxh64::new(0);
        let mut feed = |s: &str| {
            hasher.update(s.as_bytes());
            hasher.update(b"\n");
        };

        feed(self.language());

        for (key, value) in self.headers() {
            if VOLATILE_HEADERS.contains(&key.as_str()) {
                continue;
            }
            feed(&format!("{}:{}", key, value));
        }

        for entry in self.entries() {
            feed(&entry.context);
            feed(&entry.source);
            feed(&entry.target);
            for comment in entry.comments() {
                feed(comment);
            }
            feed("");
        }

        hasher.digest()
    }

    /// Refreshes build headers using the current time. See
    /// [`Document::update_build_headers_at`].
    pub fn update_build_headers(&mut self, options: &HeaderOptions) -> bool {
        self.update_build_headers_at(options, Utc::now())
    }

    /// Refreshes build headers as of `now`. Returns whether content changed.
    ///
    /// `X-Generator` is always rewritten and `Project-Id-Version` is set when a
    /// non-empty value is given. The date header and `X-Content-Hash` only move
    /// when the fingerprint differs from the stored one. Templates carrying an
    /// `X-CSV-Hash` keep their `POT-Creation-Date`, which is then managed from
    /// the CSV source.
    pub fn update_build_headers_at(&mut self, options: &HeaderOptions, now: DateTime<Utc>) -> bool {
        self.set_header(X_GENERATOR, options.generator.clone());
        if let Some(version) = options.project_version.as_deref()
            && !version.is_empty()
        {
            self.set_header(PROJECT_ID_VERSION, version);
        }

        let new_hash = self.content_hash();
        let changed = parse_fingerprint(self.header(X_CONTENT_HASH)) != Some(new_hash);
        if !changed {
            debug!(
                "content unchanged for language {:?}, keeping date headers",
                self.language()
            );
            return false;
        }

        let timestamp = format_timestamp(now);
        if self.is_template() {
            if !self.has_header(X_CSV_HASH) {
                self.set_header(POT_CREATION_DATE, timestamp);
            }
        } else {
            self.set_header(PO_REVISION_DATE, timestamp);
        }
        self.set_header(X_CONTENT_HASH, format_fingerprint(new_hash));
        debug!(
            "content changed for language {:?}, new hash {:016x}",
            self.language(),
            new_hash
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, hour, 30, 0).unwrap()
    }

    fn sample() -> Document {
        let mut doc = Document::with_language("russian");
        doc.upsert("KEY1", "Hello", "Привет");
        doc.upsert("KEY2", "World", "");
        doc
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(at(9)), "2025-03-14 09:30+0000");
    }

    #[test]
    fn test_fingerprint_format_roundtrip() {
        assert_eq!(format_fingerprint(0xab), "00000000000000ab");
        assert_eq!(parse_fingerprint("00000000000000ab"), Some(0xab));
        assert_eq!(parse_fingerprint(""), None);
        assert_eq!(parse_fingerprint("not-hex"), None);
    }

    #[test]
    fn test_default_generator_names_crate() {
        let options = HeaderOptions::default();
        assert!(options.generator.starts_with("pocodec "));
    }

    #[test]
    fn test_first_update_sets_revision_date_and_hash() {
        let mut doc = sample();
        let changed = doc.update_build_headers_at(&HeaderOptions::new(), at(9));

        assert!(changed);
        assert_eq!(doc.header(PO_REVISION_DATE), "2025-03-14 09:30+0000");
        assert_eq!(doc.header(X_CONTENT_HASH), format_fingerprint(doc.content_hash()));
        assert!(!doc.has_header(POT_CREATION_DATE));
    }

    #[test]
    fn test_second_update_without_changes_is_stable() {
        let mut doc = sample();
        let options = HeaderOptions::new();
        doc.update_build_headers_at(&options, at(9));
        let hash = doc.header(X_CONTENT_HASH).to_string();

        let changed = doc.update_build_headers_at(&options, at(17));
        assert!(!changed);
        assert_eq!(doc.header(PO_REVISION_DATE), "2025-03-14 09:30+0000");
        assert_eq!(doc.header(X_CONTENT_HASH), hash);
    }

    #[test]
    fn test_entry_changes_move_fingerprint() {
        let options = HeaderOptions::new();
        let mutations: Vec<fn(&mut Document)> = vec![
            |d: &mut Document| d.upsert("KEY3", "New", ""),
            |d: &mut Document| d.upsert("KEY2", "World", "Мир"),
            |d: &mut Document| d.retain_entries(|e| e.context != "KEY1"),
            |d: &mut Document| {
                d.entry_mut("KEY1", "Hello")
                    .unwrap()
                    .push_comment("# reviewed")
            },
            |d: &mut Document| d.entry_mut("KEY1", "Hello").unwrap().context = "KEY9".into(),
        ];

        for mutate in mutations {
            let mut doc = sample();
            doc.update_build_headers_at(&options, at(9));
            let before = doc.header(X_CONTENT_HASH).to_string();

            mutate(&mut doc);
            assert!(doc.update_build_headers_at(&options, at(17)));
            assert_ne!(doc.header(X_CONTENT_HASH), before);
            assert_eq!(doc.header(PO_REVISION_DATE), "2025-03-14 17:30+0000");
        }
    }

    #[test]
    fn test_date_headers_do_not_affect_fingerprint() {
        let mut doc = sample();
        let hash = doc.content_hash();
        doc.set_header(PO_REVISION_DATE, "2000-01-01 00:00+0000");
        doc.set_header(POT_CREATION_DATE, "2000-01-01 00:00+0000");
        doc.set_header(X_CONTENT_HASH, "deadbeef");
        assert_eq!(doc.content_hash(), hash);

        doc.set_header(LAST_TRANSLATOR, "someone");
        assert_ne!(doc.content_hash(), hash);
    }

    #[test]
    fn test_template_sets_creation_date() {
        let mut doc = Document::new();
        doc.upsert("KEY1", "Hello", "");
        assert!(doc.update_build_headers_at(&HeaderOptions::new(), at(9)));
        assert_eq!(doc.header(POT_CREATION_DATE), "2025-03-14 09:30+0000");
        assert!(!doc.has_header(PO_REVISION_DATE));
    }

    #[test]
    fn test_template_with_csv_hash_keeps_creation_date() {
        let mut doc = Document::new();
        doc.upsert("KEY1", "Hello", "");
        doc.set_header(X_CSV_HASH, "0123456789abcdef");
        doc.set_header(POT_CREATION_DATE, "2020-01-01 00:00+0000");

        assert!(doc.update_build_headers_at(&HeaderOptions::new(), at(9)));
        assert_eq!(doc.header(POT_CREATION_DATE), "2020-01-01 00:00+0000");
        assert!(doc.has_header(X_CONTENT_HASH));
    }

    #[test]
    fn test_generator_and_project_version() {
        let mut doc = sample();
        let options = HeaderOptions::new()
            .with_generator("tool 9.9")
            .with_project_version(Some("MyMod 1.2".to_string()));
        doc.update_build_headers_at(&options, at(9));
        assert_eq!(doc.header(X_GENERATOR), "tool 9.9");
        assert_eq!(doc.header(PROJECT_ID_VERSION), "MyMod 1.2");

        let options = HeaderOptions::new().with_project_version(Some(String::new()));
        doc.update_build_headers_at(&options, at(10));
        assert_eq!(doc.header(PROJECT_ID_VERSION), "MyMod 1.2");
    }

    #[test]
    fn test_generator_change_counts_as_content_change() {
        let mut doc = sample();
        doc.update_build_headers_at(&HeaderOptions::new().with_generator("tool 1"), at(9));
        assert!(doc.update_build_headers_at(&HeaderOptions::new().with_generator("tool 2"), at(10)));
        assert_eq!(doc.header(PO_REVISION_DATE), "2025-03-14 10:30+0000");
    }

    #[test]
    fn test_unparsable_stored_hash_counts_as_changed() {
        let mut doc = sample();
        doc.set_header(X_CONTENT_HASH, "garbage");
        assert!(doc.update_build_headers_at(&HeaderOptions::new(), at(9)));
    }
}
