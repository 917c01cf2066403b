//! Machine translation batching.
//!
//! The engine does not talk to any service itself. A [`Translator`] receives a
//! batch of source strings and must return exactly as many translations, in
//! order. Each batch is applied as a whole or not at all.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{error::Error, types::Document};

/// Strings per request when no batch size is given.
pub const DEFAULT_BATCH_SIZE: usize = 25;

/// One batch handed to a [`Translator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Source language override; `None` lets the provider detect it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_lang: Option<String>,
    pub target_lang: String,
    pub texts: Vec<String>,
}

/// A translation provider.
pub trait Translator {
    /// Translates `request.texts`, returning one string per input in order.
    fn translate(&self, request: &TranslationRequest) -> Result<Vec<String>, Error>;
}

impl<F> Translator for F
where
    F: Fn(&TranslationRequest) -> Result<Vec<String>, Error>,
{
    fn translate(&self, request: &TranslationRequest) -> Result<Vec<String>, Error> {
        self(request)
    }
}

/// Options for [`translate_document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOptions {
    /// Provider language code to translate into.
    pub target_lang: String,
    pub source_lang: Option<String>,
    pub batch_size: usize,
}

impl TranslateOptions {
    pub fn new(target_lang: impl Into<String>) -> Self {
        TranslateOptions {
            target_lang: target_lang.into(),
            source_lang: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_source_lang(mut self, source_lang: Option<String>) -> Self {
        self.source_lang = source_lang.filter(|s| !s.is_empty());
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// Counts of what a translation run would send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PendingSummary {
    pub count: usize,
    /// Total source length in characters.
    pub chars: usize,
}

/// Indices of entries that still need a translation: untranslated, with a
/// source, and not flagged `notranslate`.
pub fn pending_entries(doc: &Document) -> Vec<usize> {
    doc.entries()
        .iter()
        .enumerate()
        .filter(|(_, e)| e.target.is_empty() && !e.source.is_empty() && !e.is_excluded())
        .map(|(idx, _)| idx)
        .collect()
}

/// Summarizes pending work without calling any provider.
pub fn pending_summary(doc: &Document) -> PendingSummary {
    pending_entries(doc)
        .into_iter()
        .fold(PendingSummary::default(), |mut acc, idx| {
            acc.count += 1;
            acc.chars += doc.entries()[idx].source.chars().count();
            acc
        })
}

/// Translates every pending entry of `doc`, batch by batch.
///
/// Returns how many entries received a translation. A failing batch leaves
/// its entries untouched; batches before it stay applied.
pub fn translate_document<T>(
    doc: &mut Document,
    translator: &T,
    options: &TranslateOptions,
) -> Result<usize, Error>
where
    T: Translator + ?Sized,
{
    if options.batch_size == 0 {
        return Err(Error::InvalidBatchSize(options.batch_size));
    }

    let pending = pending_entries(doc);
    if pending.is_empty() {
        debug!("nothing to translate for {:?}", doc.language());
        return Ok(0);
    }

    let mut translated = 0;
    for batch in pending.chunks(options.batch_size) {
        let request = TranslationRequest {
            source_lang: options.source_lang.clone(),
            target_lang: options.target_lang.clone(),
            texts: batch
                .iter()
                .map(|&idx| doc.entries()[idx].source.clone())
                .collect(),
        };

        let out = translator.translate(&request)?;
        if out.len() != batch.len() {
            return Err(Error::BatchSizeMismatch {
                got: out.len(),
                expected: batch.len(),
            });
        }

        let entries = doc.entries_mut();
        for (&idx, text) in batch.iter().zip(out) {
            entries[idx].target = text;
        }
        translated += batch.len();
        debug!("applied batch of {} for {}", batch.len(), options.target_lang);
    }

    info!(
        "translated {} entries into {}",
        translated, options.target_lang
    );
    Ok(translated)
}

/// Extracts a JSON array of strings from a provider response.
///
/// Chat-style providers sometimes wrap the array in prose; in that case the
/// outermost `[...]` span is tried as well.
pub fn parse_json_array(content: &str) -> Result<Vec<String>, Error> {
    match serde_json::from_str::<Vec<String>>(content) {
        Ok(out) => Ok(out),
        Err(err) => {
            if let (Some(start), Some(end)) = (content.find('['), content.rfind(']'))
                && end > start
                && let Ok(out) = serde_json::from_str(&content[start..=end])
            {
                return Ok(out);
            }
            Err(Error::translation_error(
                format!("expected JSON array, got: {}", content),
                Some(Box::new(err)),
            ))
        }
    }
}
