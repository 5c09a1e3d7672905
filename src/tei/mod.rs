//! TEI document construction.
//!
//! [`build_document`] assembles the full tree for one document: the
//! `<teiHeader>` from config and catalogue/manifest metadata, the
//! `<sourceDoc>` facsimile from the parsed ALTO pages, the editorial
//! `<text>` rendering, and the `<standOff>` segments. Serialization is
//! a separate step ([`xml::serialize`]).

pub mod body;
pub mod header;
pub mod source_doc;
pub mod standoff;
pub mod xml;

use log::info;

use crate::alto;
use crate::config::Config;
use crate::document::Document;
use crate::error::Result;
use crate::iiif::{self, Manifest};
use crate::sru::{self, Catalog};

use xml::Element;

/// External metadata for one document, resolved before tree construction.
#[derive(Debug, Clone, Default)]
pub struct DocumentMetadata {
    pub manifest: Manifest,
    pub catalog: Catalog,
}

impl DocumentMetadata {
    /// Placeholder metadata; the header gets its not-found text.
    pub fn offline() -> DocumentMetadata {
        DocumentMetadata::default()
    }

    /// Fetch the IIIF manifest and, when it names a catalogue ARK, the
    /// SRU record. Collaborator failures leave the respective field
    /// empty; they never fail the document.
    pub fn fetch(config: &Config, doc_name: &str) -> DocumentMetadata {
        let manifest = iiif::fetch_manifest(&config.iiif, doc_name);
        let catalog = match manifest.catalogue_ark.as_deref() {
            Some(ark) => sru::fetch_record(&config.sru, ark),
            None => Catalog::NotFound,
        };
        DocumentMetadata { manifest, catalog }
    }
}

/// Build the complete TEI tree for one document.
pub fn build_document(
    config: &Config,
    document: &Document,
    metadata: &DocumentMetadata,
) -> Result<Element> {
    let mut pages = Vec::with_capacity(document.pages.len());
    for page_file in &document.pages {
        pages.push((page_file.folio, alto::parse_page_file(&page_file.path)?));
    }

    let mut root = Element::new("TEI")
        .with_attr("xmlns", "http://www.tei-c.org/ns/1.0")
        .with_attr("xml:id", format!("ark_12148_{}", document.name));

    root.push(header::build(
        &config.responsibility,
        &document.name,
        &metadata.manifest,
        &metadata.catalog,
        pages.len(),
    ));

    let source_doc = source_doc::build(&document.name, &pages, &config.iiif)?;
    info!(
        "{}: {} pages, {} text lines",
        document.name,
        pages.len(),
        source_doc.lines.len()
    );

    root.push(source_doc.element);
    root.push(body::build(&source_doc.lines));
    root.push(standoff::build(&source_doc.lines));

    Ok(root)
}
