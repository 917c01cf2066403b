//! Language names used for per-language PO files, and their provider codes.
//!
//! Files are named after game language identifiers (`russian.po`,
//! `chinesesimp.po`). Translation providers want their own codes, so each
//! provider gets an immutable table keyed by the lower-cased identifier.

use std::collections::{BTreeSet, HashMap};

use lazy_static::lazy_static;

use crate::error::Error;

/// Languages in their canonical order.
pub const DEFAULT_LANGUAGES: &[&str] = &[
    "english",
    "czech",
    "german",
    "russian",
    "polish",
    "hungarian",
    "italian",
    "spanish",
    "french",
    "chinese",
    "japanese",
    "portuguese",
    "chinesesimp",
];

lazy_static! {
    static ref GOOGLE_CODES: HashMap<&'static str, &'static str> = HashMap::from([
        ("english", "en"),
        ("czech", "cs"),
        ("german", "de"),
        ("russian", "ru"),
        ("polish", "pl"),
        ("hungarian", "hu"),
        ("italian", "it"),
        ("spanish", "es"),
        ("french", "fr"),
        ("chinese", "zh"),
        ("chinesesimp", "zh-CN"),
        ("japanese", "ja"),
        ("portuguese", "pt"),
    ]);
    static ref DEEPL_CODES: HashMap<&'static str, &'static str> = HashMap::from([
        ("english", "EN"),
        ("czech", "CS"),
        ("german", "DE"),
        ("russian", "RU"),
        ("polish", "PL"),
        ("hungarian", "HU"),
        ("italian", "IT"),
        ("spanish", "ES"),
        ("french", "FR"),
        ("chinese", "ZH"),
        ("chinesesimp", "ZH"),
        ("japanese", "JA"),
        ("portuguese", "PT"),
    ]);
    static ref OPENAI_NAMES: HashMap<&'static str, &'static str> = HashMap::from([
        ("english", "English"),
        ("czech", "Czech"),
        ("german", "German"),
        ("russian", "Russian"),
        ("polish", "Polish"),
        ("hungarian", "Hungarian"),
        ("italian", "Italian"),
        ("spanish", "Spanish"),
        ("french", "French"),
        ("chinese", "Chinese"),
        ("chinesesimp", "Simplified Chinese"),
        ("japanese", "Japanese"),
        ("portuguese", "Portuguese"),
    ]);
}

/// A provider-specific language table.
///
/// The built-in tables are static; a custom one can be injected with
/// [`LanguageMap::custom`].
#[derive(Debug, Clone)]
pub struct LanguageMap {
    provider: String,
    codes: HashMap<String, String>,
}

impl LanguageMap {
    fn from_static(provider: &str, table: &HashMap<&'static str, &'static str>) -> Self {
        LanguageMap {
            provider: provider.to_string(),
            codes: table
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Google Translate codes (`ru`, `zh-CN`, ...).
    pub fn google() -> Self {
        Self::from_static("google", &GOOGLE_CODES)
    }

    /// DeepL target codes (`RU`, `ZH`, ...).
    pub fn deepl() -> Self {
        Self::from_static("deepl", &DEEPL_CODES)
    }

    /// Plain English language names for prompt-based providers.
    pub fn openai() -> Self {
        Self::from_static("openai", &OPENAI_NAMES)
    }

    /// Builds a table from arbitrary pairs; keys are lower-cased.
    pub fn custom<I, K, V>(provider: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        LanguageMap {
            provider: provider.into(),
            codes: pairs
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_lowercase(), v.into()))
                .collect(),
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.codes.get(&language.to_lowercase()).map(String::as_str)
    }

    /// Maps `language`, falling back to the input when it is unknown.
    pub fn resolve(&self, language: &str) -> String {
        self.get(language)
            .map(str::to_string)
            .unwrap_or_else(|| language.to_string())
    }

    /// Maps `language`, failing when it is unknown.
    pub fn resolve_strict(&self, language: &str) -> Result<String, Error> {
        self.get(language)
            .map(str::to_string)
            .ok_or_else(|| Error::unsupported_language(&self.provider, language))
    }
}

/// Splits a comma-separated list, trimming items and dropping empty ones.
pub fn parse_language_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Orders the available languages for processing.
///
/// Without a filter, languages from [`DEFAULT_LANGUAGES`] come first in their
/// canonical order, followed by the remaining ones sorted by name. With a
/// filter, the filter order is kept and unavailable names are skipped.
/// Excluded languages are removed in both cases.
pub fn order_languages<S: AsRef<str>>(
    available: &BTreeSet<String>,
    filter: &[S],
    exclude: &[S],
) -> Vec<String> {
    let excluded: BTreeSet<&str> = exclude.iter().map(AsRef::as_ref).collect();

    let ordered: Vec<String> = if filter.is_empty() {
        DEFAULT_LANGUAGES
            .iter()
            .filter(|lang| available.contains(**lang))
            .map(|lang| lang.to_string())
            .chain(
                available
                    .iter()
                    .filter(|lang| !DEFAULT_LANGUAGES.contains(&lang.as_str()))
                    .cloned(),
            )
            .collect()
    } else {
        filter
            .iter()
            .map(AsRef::as_ref)
            .filter(|lang| available.contains(*lang))
            .map(str::to_string)
            .collect()
    };

    ordered
        .into_iter()
        .filter(|lang| !excluded.contains(lang.as_str()))
        .collect()
}
