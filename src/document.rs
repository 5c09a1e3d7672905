//! Document directories and folio-ordered page files.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

/// One page file of a document, with the folio number embedded in its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFile {
    pub path: PathBuf,
    pub folio: u32,
}

/// A document: a directory of ALTO page files named after the document
/// identifier (e.g. `bpt6k10516302/`), one `*.xml` file per page.
#[derive(Debug, Clone)]
pub struct Document {
    /// Directory name, doubling as the document's ARK identifier.
    pub name: String,
    /// Page files ordered by folio number.
    pub pages: Vec<PageFile>,
}

impl Document {
    /// Enumerate a document directory.
    ///
    /// Pages are ordered numerically by the digits following the last `f`
    /// in the file name, so `f9.xml` sorts before `f10.xml`. Lexical order
    /// is never used. A directory without page files, or a page file
    /// without a folio number, is a malformed-input error.
    pub fn open(dir: &Path) -> Result<Document> {
        let name = dir
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::EmptyDocument(dir.display().to_string()))?
            .to_string();

        let mut pages = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("xml") {
                continue;
            }
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            let folio = folio_number(&file_name).ok_or(Error::BadFolio(file_name))?;
            pages.push(PageFile { path, folio });
        }

        if pages.is_empty() {
            return Err(Error::EmptyDocument(dir.display().to_string()));
        }

        pages.sort_by_key(|p| p.folio);
        Ok(Document { name, pages })
    }
}

/// Extract the folio number from a page file name (`...f12.xml` -> 12).
pub fn folio_number(file_name: &str) -> Option<u32> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"^.*f(\d+)").expect("folio pattern"));
    pattern
        .captures(file_name)
        .and_then(|caps| caps[1].parse().ok())
}
