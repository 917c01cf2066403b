//! Maintenance passes over a single document and its statistics.

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    source_table::SourceTable,
    types::{Document, NO_TRANSLATE_FLAG},
};

/// Comment prepended to entries whose translation was identical to the source.
pub const NO_TRANSLATE_COMMENT: &str = "# notranslate";

/// Clears translations that merely repeat the source text.
///
/// With `mark_excluded`, each cleared entry also gets `# notranslate` unless
/// one of its comments already mentions the flag. Returns the number of
/// cleared entries.
pub fn clean_identical(doc: &mut Document, mark_excluded: bool) -> usize {
    let mut cleaned = 0;
    for entry in doc.entries_mut() {
        if entry.target.is_empty() || entry.target != entry.source {
            continue;
        }
        entry.target.clear();
        if mark_excluded
            && !entry
                .comments()
                .iter()
                .any(|c| c.contains(NO_TRANSLATE_FLAG))
        {
            entry.prepend_comment(NO_TRANSLATE_COMMENT);
        }
        cleaned += 1;
    }
    if cleaned > 0 {
        info!(
            "cleared {} identical translations in {:?}",
            cleaned,
            doc.language()
        );
    }
    cleaned
}

/// Drops entries whose key and source no longer appear in `table`.
pub fn remove_unused(doc: &mut Document, table: &SourceTable) -> usize {
    let before = doc.len();
    doc.retain_entries(|e| table.contains(&e.context, &e.source));
    let removed = before - doc.len();
    if removed > 0 {
        info!("removed {} unused entries from {:?}", removed, doc.language());
    }
    removed
}

/// Translation progress of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub language: String,
    pub total: usize,
    pub translated: usize,
    pub untranslated: usize,
    /// Entries flagged `notranslate`, counted whether translated or not.
    pub excluded: usize,
    /// Share of translated entries, 0 to 100. An empty document reports 0.
    pub percent: f64,
}

pub fn document_stats(doc: &Document) -> DocumentStats {
    let total = doc.len();
    let translated = doc.entries().iter().filter(|e| e.is_translated()).count();
    let excluded = doc.entries().iter().filter(|e| e.is_excluded()).count();
    let percent = if total == 0 {
        0.0
    } else {
        translated as f64 * 100.0 / total as f64
    };
    DocumentStats {
        language: doc.language().to_string(),
        total,
        translated,
        untranslated: total - translated,
        excluded,
        percent,
    }
}

/// Serializes a stats report as pretty JSON.
pub fn stats_to_json(stats: &[DocumentStats]) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(stats)?)
}

/// A source table row that still lacks a translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UntranslatedItem {
    pub key: String,
    pub original: String,
    /// 1-based CSV record number, header included.
    pub row: usize,
}

/// Progress of one language measured against the source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageStats {
    pub language: String,
    pub translated: usize,
    /// Number of data rows in the table.
    pub total: usize,
    pub percentage: f64,
    pub remaining: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub untranslated: Vec<UntranslatedItem>,
}

/// Counts how many table rows `doc` covers.
///
/// Rows are matched by key and source. With `count_excluded_as_done`, an
/// entry flagged `notranslate` counts as translated even with an empty
/// target. Rows missing from `doc` are untranslated.
pub fn table_stats(table: &SourceTable, doc: &Document, count_excluded_as_done: bool) -> LanguageStats {
    let mut stats = LanguageStats {
        language: doc.language().to_string(),
        translated: 0,
        total: table.len(),
        percentage: 0.0,
        remaining: 0,
        untranslated: Vec::new(),
    };

    for row in table.rows() {
        let done = doc.entry(row.key, row.source).is_some_and(|entry| {
            entry.is_translated() || (count_excluded_as_done && entry.is_excluded())
        });
        if done {
            stats.translated += 1;
        } else {
            stats.remaining += 1;
            stats.untranslated.push(UntranslatedItem {
                key: row.key.to_string(),
                original: row.source.to_string(),
                row: row.row,
            });
        }
    }

    if stats.total > 0 {
        stats.percentage = stats.translated as f64 / stats.total as f64 * 100.0;
    }
    stats
}

/// Renders `{"languages": {<language>: {...}}}`.
///
/// The untranslated listing is only included when `verbose` is set.
pub fn stats_report_json(stats: &[LanguageStats], verbose: bool) -> Result<String, Error> {
    let mut languages = serde_json::Map::new();
    for lang in stats {
        let mut value = serde_json::json!({
            "translated": lang.translated,
            "total": lang.total,
            "percentage": lang.percentage,
            "remaining": lang.remaining,
        });
        if verbose {
            value["untranslated"] = serde_json::to_value(&lang.untranslated)?;
        }
        languages.insert(lang.language.clone(), value);
    }
    Ok(serde_json::to_string_pretty(
        &serde_json::json!({ "languages": languages }),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Entry;

    #[test]
    fn test_clean_identical_marks_entries() {
        let mut doc = Document::with_language("german");
        doc.upsert("SAME", "OK", "OK");
        doc.upsert("DIFF", "Yes", "Ja");
        doc.upsert("EMPTY", "No", "");

        assert_eq!(clean_identical(&mut doc, true), 1);

        let same = doc.entry("SAME", "OK").unwrap();
        assert_eq!(same.target, "");
        assert_eq!(same.comments(), [NO_TRANSLATE_COMMENT]);
        assert!(same.is_excluded());
        assert_eq!(doc.get("DIFF", "Yes"), "Ja");
    }

    #[test]
    fn test_clean_identical_does_not_duplicate_flag() {
        let mut doc = Document::with_language("german");
        doc.push_entry(
            Entry::new("SAME", "OK", "OK").with_comments(vec!["#, notranslate".to_string()]),
        );
        clean_identical(&mut doc, true);
        assert_eq!(doc.entries()[0].comments(), ["#, notranslate"]);
    }

    #[test]
    fn test_clean_identical_without_marking() {
        let mut doc = Document::with_language("german");
        doc.upsert("SAME", "OK", "OK");
        assert_eq!(clean_identical(&mut doc, false), 1);
        assert!(doc.entries()[0].comments().is_empty());
        assert!(!doc.entries()[0].is_excluded());
    }

    #[test]
    fn test_remove_unused() {
        let table = SourceTable::from_records(
            vec![
                vec!["Language".into(), "original".into()],
                vec!["KEEP".into(), "kept".into()],
            ],
            0,
        )
        .unwrap();

        let mut doc = Document::with_language("german");
        doc.upsert("KEEP", "kept", "behalten");
        doc.upsert("KEEP", "old text", "alt");
        doc.upsert("GONE", "gone", "weg");

        assert_eq!(remove_unused(&mut doc, &table), 2);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.get("KEEP", "kept"), "behalten");
    }

    #[test]
    fn test_document_stats() {
        let mut doc = Document::with_language("russian");
        doc.upsert("A", "a", "а");
        doc.upsert("B", "b", "");
        doc.push_entry(Entry::new("C", "c", "").with_comments(vec!["# notranslate".into()]));
        doc.upsert("D", "d", "д");

        let stats = document_stats(&doc);
        assert_eq!(stats.language, "russian");
        assert_eq!(stats.total, 4);
        assert_eq!(stats.translated, 2);
        assert_eq!(stats.untranslated, 2);
        assert_eq!(stats.excluded, 1);
        assert!((stats.percent - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_document_stats() {
        let stats = document_stats(&Document::new());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.percent, 0.0);
    }

    #[test]
    fn test_stats_to_json() {
        let mut doc = Document::with_language("german");
        doc.upsert("A", "a", "x");
        let json = stats_to_json(&[document_stats(&doc)]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["language"], "german");
        assert_eq!(value[0]["translated"], 1);
        assert_eq!(value[0]["percent"], 100.0);
    }

    fn stats_table() -> SourceTable {
        SourceTable::from_records(
            vec![
                vec!["Language".into(), "original".into()],
                vec!["STR_YES".into(), "Yes".into()],
                vec!["STR_OK".into(), "OK".into()],
                vec!["STR_NO".into(), "No".into()],
                vec!["STR_MISSING".into(), "Missing".into()],
            ],
            0,
        )
        .unwrap()
    }

    fn stats_doc() -> Document {
        let mut doc = Document::with_language("german");
        doc.upsert("STR_YES", "Yes", "Ja");
        doc.push_entry(Entry::new("STR_OK", "OK", "").with_comments(vec!["# notranslate".into()]));
        doc.upsert("STR_NO", "No", "");
        doc
    }

    #[test]
    fn test_table_stats_excluded_counts_as_done() {
        let stats = table_stats(&stats_table(), &stats_doc(), true);
        assert_eq!(stats.language, "german");
        assert_eq!(stats.total, 4);
        assert_eq!(stats.translated, 2);
        assert_eq!(stats.remaining, 2);
        assert!((stats.percentage - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_table_stats_excluded_pending_when_clearing_only() {
        let stats = table_stats(&stats_table(), &stats_doc(), false);
        assert_eq!(stats.translated, 1);
        assert_eq!(stats.remaining, 3);
        assert_eq!(stats.untranslated[0].key, "STR_OK");
    }

    #[test]
    fn test_table_stats_lists_rows_missing_from_document() {
        let stats = table_stats(&stats_table(), &stats_doc(), true);
        assert_eq!(
            stats.untranslated,
            vec![
                UntranslatedItem {
                    key: "STR_NO".into(),
                    original: "No".into(),
                    row: 4,
                },
                UntranslatedItem {
                    key: "STR_MISSING".into(),
                    original: "Missing".into(),
                    row: 5,
                },
            ]
        );
    }

    #[test]
    fn test_table_stats_matches_source_text() {
        let mut doc = Document::with_language("german");
        doc.upsert("STR_YES", "Yes (old)", "Ja");
        let stats = table_stats(&stats_table(), &doc, true);
        assert_eq!(stats.translated, 0);
        assert_eq!(stats.remaining, 4);
    }

    #[test]
    fn test_notranslate_only_document_is_complete() {
        let table = SourceTable::from_records(
            vec![
                vec!["Language".into(), "original".into()],
                vec!["A".into(), "a".into()],
                vec!["B".into(), "b".into()],
            ],
            0,
        )
        .unwrap();
        let mut doc = Document::with_language("russian");
        doc.upsert("A", "a", "а");
        doc.push_entry(Entry::new("B", "b", "").with_comments(vec!["# notranslate".into()]));

        let stats = table_stats(&table, &doc, true);
        assert_eq!((stats.translated, stats.total), (2, 2));
        assert_eq!(stats.percentage, 100.0);
    }

    #[test]
    fn test_stats_report_json() {
        let stats = table_stats(&stats_table(), &stats_doc(), true);

        let brief: serde_json::Value =
            serde_json::from_str(&stats_report_json(&[stats.clone()], false).unwrap()).unwrap();
        assert_eq!(brief["languages"]["german"]["remaining"], 2);
        assert_eq!(brief["languages"]["german"]["percentage"], 50.0);
        assert!(brief["languages"]["german"].get("untranslated").is_none());

        let verbose: serde_json::Value =
            serde_json::from_str(&stats_report_json(&[stats], true).unwrap()).unwrap();
        assert_eq!(verbose["languages"]["german"]["untranslated"][1]["row"], 5);
        assert_eq!(verbose["languages"]["german"]["untranslated"][0]["key"], "STR_NO");
    }
}
