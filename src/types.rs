//! Core types for pocodec: the in-memory PO/POT document and its entries.
//! The parser decodes into these; the writer serializes these.

use std::collections::BTreeMap;

use crate::header::LANGUAGE;

/// Flag token marking an entry that must not be machine translated.
pub const NO_TRANSLATE_FLAG: &str = "notranslate";

/// A complete PO or POT document.
///
/// Headers are kept in a sorted map so that non-standard headers serialize in
/// a stable order. The `Language` header and [`Document::language`] are always
/// kept in sync; a document without a language is a template.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    headers: BTreeMap<String, String>,
    language: String,
    entries: Vec<Entry>,
}

impl Document {
    /// Creates an empty template document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty document for `language`.
    pub fn with_language(language: impl Into<String>) -> Self {
        let mut doc = Self::default();
        doc.set_language(language);
        doc
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Sets the language and mirrors it into the `Language` header.
    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
        self.headers
            .insert(LANGUAGE.to_string(), self.language.clone());
    }

    /// Whether this document is a template (no language).
    pub fn is_template(&self) -> bool {
        self.language.is_empty()
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Returns the header value, or an empty string when absent.
    pub fn header(&self, key: &str) -> &str {
        self.headers.get(key).map(String::as_str).unwrap_or_default()
    }

    pub fn has_header(&self, key: &str) -> bool {
        self.headers.contains_key(key)
    }

    /// Sets a header. Setting `Language` also updates the document language.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if key == LANGUAGE {
            self.language = value.clone();
        }
        self.headers.insert(key, value);
    }

    pub fn remove_header(&mut self, key: &str) -> Option<String> {
        if key == LANGUAGE {
            self.language.clear();
        }
        self.headers.remove(key)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [Entry] {
        &mut self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts or updates the entry identified by `(context, source)`.
    ///
    /// An existing entry only gets its target replaced; comments and position
    /// stay as they are. New entries are appended without comments.
    pub fn upsert(
        &mut self,
        context: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) {
        let context = context.into();
        let source = source.into();
        let target = target.into();
        match self.entry_mut(&context, &source) {
            Some(entry) => entry.target = target,
            None => self.entries.push(Entry::new(context, source, target)),
        }
    }

    /// Returns the translation for `(context, source)`, or `""` when absent.
    pub fn get(&self, context: &str, source: &str) -> &str {
        self.entry(context, source)
            .map(|e| e.target.as_str())
            .unwrap_or_default()
    }

    pub fn is_translated(&self, context: &str, source: &str) -> bool {
        !self.get(context, source).is_empty()
    }

    pub fn entry(&self, context: &str, source: &str) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|e| e.context == context && e.source == source)
    }

    pub fn entry_mut(&mut self, context: &str, source: &str) -> Option<&mut Entry> {
        self.entries
            .iter_mut()
            .find(|e| e.context == context && e.source == source)
    }

    /// Appends an entry as-is, without the identity check done by [`upsert`].
    ///
    /// This is the one way to end up with two entries for the same key and
    /// source; the parser uses it so repeated blocks in a file are kept as
    /// written. Lookups then see the first of them. Use [`upsert`] to keep
    /// keys unique.
    ///
    /// [`upsert`]: Document::upsert
    pub fn push_entry(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Keeps only the entries for which `keep` returns true.
    pub fn retain_entries<F>(&mut self, keep: F)
    where
        F: FnMut(&Entry) -> bool,
    {
        self.entries.retain(keep);
    }
}

/// One translation unit: key, source text, translation and its comments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Entry {
    /// Translation key (`msgctxt`).
    pub context: String,

    /// Source text (`msgid`).
    pub source: String,

    /// Translated text (`msgstr`). Empty means untranslated.
    pub target: String,

    /// Raw comment lines, each starting with `#`.
    comments: Vec<String>,

    /// Cached exclusion flag derived from `comments`.
    excluded: bool,
}

impl Entry {
    pub fn new(
        context: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            context: context.into(),
            source: source.into(),
            target: target.into(),
            comments: Vec::new(),
            excluded: false,
        }
    }

    /// Builder-style variant of [`Entry::set_comments`].
    pub fn with_comments(mut self, comments: Vec<String>) -> Self {
        self.set_comments(comments);
        self
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn set_comments(&mut self, comments: Vec<String>) {
        self.comments = comments;
        self.excluded = comments_exclude(&self.comments);
    }

    pub fn push_comment(&mut self, comment: impl Into<String>) {
        self.comments.push(comment.into());
        self.excluded = comments_exclude(&self.comments);
    }

    /// Inserts a comment before all existing ones.
    pub fn prepend_comment(&mut self, comment: impl Into<String>) {
        self.comments.insert(0, comment.into());
        self.excluded = comments_exclude(&self.comments);
    }

    pub fn is_translated(&self) -> bool {
        !self.target.is_empty()
    }

    /// Whether the entry carries the `notranslate` flag.
    pub fn is_excluded(&self) -> bool {
        self.excluded
    }
}

/// Recognizes both `#, fuzzy, notranslate` and the looser `# notranslate`.
pub fn comments_exclude(comments: &[String]) -> bool {
    comments.iter().any(|comment| {
        let trimmed = comment.trim();
        if let Some(flags) = trimmed.strip_prefix("#,") {
            flags.trim().contains(NO_TRANSLATE_FLAG)
        } else {
            trimmed.starts_with('#') && trimmed.contains(NO_TRANSLATE_FLAG)
        }
    })
}
