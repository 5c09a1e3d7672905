//! Error types for alto2tei operations.

use thiserror::Error;

/// Errors that can occur while converting a document.
///
/// Malformed input (an undecodable zone tag, a qualifying zone with no
/// polygon, a page file without a folio number) is fatal for the current
/// document: no partial TEI output is produced. Missing *optional* data
/// (absent line text, a document not found in the catalogue) is never an
/// error; it surfaces as `Option`/[`crate::Catalog::NotFound`] instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed zone tag: {0:?}")]
    MalformedTag(String),

    #[error("Unknown tag reference: {0:?}")]
    UnknownTagRef(String),

    #[error("Missing required element: {0}")]
    MissingElement(String),

    #[error("No folio number in file name: {0}")]
    BadFolio(String),

    #[error("Document directory has no page files: {0}")]
    EmptyDocument(String),

    #[error("Invalid config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
