//! Per-language PO files in a directory.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use log::{debug, warn};

use crate::{error::Error, traits::Parser, types::Document};

/// Extension of per-language translation files.
pub const PO_EXTENSION: &str = "po";

/// Path of the file holding `language` inside `dir`.
pub fn language_path(dir: impl AsRef<Path>, language: &str) -> PathBuf {
    dir.as_ref().join(format!("{}.{}", language, PO_EXTENSION))
}

/// Loads every `*.po` file in `dir`, keyed by file stem.
///
/// Subdirectories and other files are skipped. A document whose `Language`
/// header is missing gets the file stem as its language.
pub fn load_directory(dir: impl AsRef<Path>) -> Result<BTreeMap<String, Document>, Error> {
    let dir = dir.as_ref();
    let mut documents = BTreeMap::new();

    for dir_entry in fs::read_dir(dir)? {
        let path = dir_entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(PO_EXTENSION) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            warn!("skipping file with non UTF-8 name: {}", path.display());
            continue;
        };

        let mut doc = Document::read_from(&path)?;
        if doc.is_template() {
            doc.set_language(stem);
        }
        debug!("loaded {} entries from {}", doc.len(), path.display());
        documents.insert(stem.to_string(), doc);
    }

    Ok(documents)
}

/// Writes `doc` to `path`, creating parent directories.
///
/// Fails with [`Error::FileExists`] when the file exists and `overwrite` is
/// false.
pub fn write_document(path: impl AsRef<Path>, doc: &Document, overwrite: bool) -> Result<(), Error> {
    let path = path.as_ref();
    if !overwrite && path.exists() {
        return Err(Error::FileExists(path.to_path_buf()));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    doc.write_to(path)?;
    debug!("wrote {} entries to {}", doc.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_language_path() {
        assert_eq!(
            language_path("l18n", "russian"),
            Path::new("l18n").join("russian.po")
        );
    }

    #[test]
    fn test_write_then_load_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("l18n");

        let mut ru = Document::with_language("russian");
        ru.upsert("KEY1", "Hello", "Привет");
        let mut de = Document::with_language("german");
        de.upsert("KEY1", "Hello", "Hallo");

        write_document(language_path(&dir, "russian"), &ru, false).unwrap();
        write_document(language_path(&dir, "german"), &de, false).unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();
        fs::write(dir.join("template.pot"), "msgid \"\"\nmsgstr \"\"\n").unwrap();

        let loaded = load_directory(&dir).unwrap();
        assert_eq!(loaded.keys().collect::<Vec<_>>(), vec!["german", "russian"]);
        assert_eq!(loaded["russian"].get("KEY1", "Hello"), "Привет");
        assert_eq!(loaded["german"].language(), "german");
    }

    #[test]
    fn test_missing_language_header_uses_stem() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("polish.po");
        fs::write(&path, "msgctxt \"K\"\nmsgid \"a\"\nmsgstr \"b\"\n").unwrap();

        let loaded = load_directory(tmp.path()).unwrap();
        assert_eq!(loaded["polish"].language(), "polish");
        assert_eq!(loaded["polish"].get("K", "a"), "b");
    }

    #[test]
    fn test_refuses_overwrite() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("german.po");
        let doc = Document::with_language("german");

        write_document(&path, &doc, false).unwrap();
        let err = write_document(&path, &doc, false).unwrap_err();
        assert!(matches!(err, Error::FileExists(ref p) if p == &path));
        write_document(&path, &doc, true).unwrap();
    }

    #[test]
    fn test_load_missing_directory_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_directory(tmp.path().join("absent")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
