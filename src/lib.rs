//! # alto2tei
//!
//! Convert per-page ALTO 4 transcriptions of a digitized document into a
//! single XML-TEI file, enriched with metadata fetched from the IIIF
//! Presentation API and the BnF's SRU catalogue API.
//!
//! ## Pipeline
//!
//! 1. Enumerate a document directory and order its page files by folio
//!    number ([`Document`]).
//! 2. Parse each ALTO file into an [`alto::Page`] (blocks, lines, tag table).
//! 3. Build the `<sourceDoc>` facsimile tree: one `<surface>` per page,
//!    nested `<zone>` elements for text blocks and lines.
//! 4. Walk the line sequence once, in reading order, to build the `<body>`
//!    (page breaks, forme-work wrappers, margin notes, `<ab>` blocks) and
//!    the `<standOff>` sentence segments.
//! 5. Serialize the TEI tree with an XML declaration and indentation.
//!
//! ## Quick Start
//!
//! ```no_run
//! use alto2tei::{Config, Document, DocumentMetadata, tei};
//!
//! let config = Config::default();
//! let doc = Document::open("data/bpt6k1".as_ref())?;
//! let metadata = DocumentMetadata::offline();
//! let root = tei::build_document(&config, &doc, &metadata)?;
//! std::fs::write("bpt6k1.xml", tei::xml::serialize(&root))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod alto;
pub mod config;
pub mod document;
pub mod error;
pub mod iiif;
pub mod label;
pub mod sru;
pub mod tei;
pub(crate) mod util;

pub use config::Config;
pub use document::Document;
pub use error::{Error, Result};
pub use iiif::Manifest;
pub use sru::Catalog;
pub use tei::DocumentMetadata;
