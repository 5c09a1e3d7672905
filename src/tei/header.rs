//! TEI header builder.
//!
//! Assembles `<teiHeader>` in one pass from three sources: the project
//! configuration (responsibility and publication statements), the IIIF
//! manifest, and the SRU catalogue record. Catalogue data wins over
//! manifest data wherever both cover a field. Missing data becomes a
//! placeholder sentence, never an error.

use chrono::Local;

use crate::config::Responsibility;
use crate::iiif::Manifest;
use crate::sru::{Author, Catalog, Record};

use super::xml::Element;

const NOT_AVAILABLE: &str = "Information not available.";
const NOT_IN_CATALOGUE: &str = "Digitised resource not found in BnF catalogue.";

/// Build the `<teiHeader>` for a document.
///
/// `doc` is the document ARK name and `page_count` the number of ALTO
/// pages, recorded as the extent in images.
pub fn build(
    responsibility: &Responsibility,
    doc: &str,
    manifest: &Manifest,
    catalog: &Catalog,
    page_count: usize,
) -> Element {
    let record = catalog.record();
    let default_text = match record {
        Some(_) => NOT_AVAILABLE,
        None => NOT_IN_CATALOGUE,
    };

    // Shared field resolution: catalogue first, manifest second
    let title = pick(record.and_then(|r| r.title.as_deref()), manifest.title.as_deref());

    let mut header = Element::new("teiHeader");
    let file_desc = header.push(Element::new("fileDesc"));

    let title_stmt = file_desc.push(Element::new("titleStmt"));
    title_stmt.push(text_or(Element::new("title"), title, default_text));
    for author in authors(record, manifest, default_text, true) {
        title_stmt.push(author);
    }
    let resp_stmt = title_stmt.push(Element::new("respStmt"));
    resp_stmt.push(Element::new("resp").with_text(responsibility.text.clone()));
    for person in &responsibility.resp {
        let pers_name = resp_stmt.push(Element::new("persName"));
        pers_name.push(Element::new("forename").with_text(person.forename.clone()));
        pers_name.push(Element::new("surname").with_text(person.surname.clone()));
        pers_name.push(Element::new("ptr").with_attr("target", person.ptr.clone()));
    }

    let extent = file_desc.push(Element::new("extent"));
    extent.push(
        Element::new("measure")
            .with_attr("unit", "images")
            .with_attr("n", page_count.to_string()),
    );

    let publication_stmt = file_desc.push(Element::new("publicationStmt"));
    publication_stmt.push(Element::new("publisher").with_text(responsibility.publisher.clone()));
    publication_stmt.push(Element::new("authority").with_text(responsibility.authority.clone()));
    let availability = publication_stmt.push(
        Element::new("availability").with_attr("status", responsibility.availability_status.clone()),
    );
    availability.push(Element::new("licence").with_attr("target", responsibility.licence_target.clone()));
    let today = Local::now().format("%Y-%m-%d").to_string();
    publication_stmt.push(Element::new("date").with_attr("when", today));

    let source_desc = file_desc.push(Element::new("sourceDesc"));
    let bibl = source_desc.push(Element::new("bibl"));
    if let Some(target) = record.and_then(|r| r.ptr.as_deref()) {
        bibl.push(Element::new("ptr").with_attr("target", target));
    } else {
        bibl.push(Element::new("ptr"));
    }
    for author in authors(record, manifest, default_text, false) {
        bibl.push(author);
    }
    bibl.push(text_or(Element::new("title"), title, default_text));
    let mut pub_place = Element::new("pubPlace");
    if let Some(key) = record.and_then(|r| r.pubplace_key.as_deref()) {
        pub_place.set_attr("key", key);
    }
    bibl.push(text_or(pub_place, record.and_then(|r| r.pubplace.as_deref()), default_text));
    bibl.push(text_or(
        Element::new("publisher"),
        record.and_then(|r| r.publisher.as_deref()),
        default_text,
    ));
    let mut date = Element::new("date");
    if let Some(when) = record.and_then(|r| r.when.as_deref()) {
        date.set_attr("when", when);
    }
    let date_text = pick(record.and_then(|r| r.date.as_deref()), manifest.date.as_deref());
    bibl.push(text_or(date, date_text, default_text));

    let ms_desc = source_desc.push(Element::new("msDesc"));
    let ms_identifier = ms_desc.push(Element::new("msIdentifier"));
    let mut country = Element::new("country");
    if let Some(key) = record.and_then(|r| r.country.as_deref()) {
        country.set_attr("key", key);
    }
    ms_identifier.push(country);
    ms_identifier.push(Element::new("settlement").with_text(default_text));
    ms_identifier.push(text_or(
        Element::new("repository"),
        manifest.repository.as_deref(),
        default_text,
    ));
    let shelfmark = pick(record.and_then(|r| r.idno.as_deref()), manifest.shelfmark.as_deref());
    ms_identifier.push(text_or(Element::new("idno"), shelfmark, default_text));
    let alt_identifier = ms_identifier.push(Element::new("altIdentifier"));
    alt_identifier.push(Element::new("idno").with_attr("type", "ark").with_text(doc));
    let phys_desc = ms_desc.push(Element::new("physDesc"));
    let object_desc = phys_desc.push(Element::new("objectDesc"));
    object_desc.push(text_or(
        Element::new("p"),
        record.and_then(|r| r.objectdesc.as_deref()),
        default_text,
    ));

    let profile_desc = header.push(Element::new("profileDesc"));
    let lang_usage = profile_desc.push(Element::new("langUsage"));
    let mut language =
        Element::new("language").with_attr("ident", record.and_then(|r| r.lang.as_deref()).unwrap_or(""));
    if let Some(text) = manifest.language.as_deref() {
        language.text = Some(text.to_string());
    }
    lang_usage.push(language);

    header
}

/// The `<author>` list for the `<titleStmt>` or the `<bibl>`.
///
/// Catalogue authors carry their generated id as `xml:id` on first
/// presentation and as a `#`-prefixed `ref` afterwards. Without a
/// catalogue record, the manifest's creator yields a single `<author>`
/// with a plain `<name>`; with neither, one placeholder author.
fn authors(
    record: Option<&Record>,
    manifest: &Manifest,
    default_text: &str,
    is_first_id: bool,
) -> Vec<Element> {
    match record {
        Some(record) if !record.authors.is_empty() => record
            .authors
            .iter()
            .map(|author| catalog_author(author, is_first_id))
            .collect(),
        Some(_) => vec![Element::new("author").with_text(default_text)],
        None => match manifest.creator.as_deref() {
            Some(creator) => {
                // First two characters of the creator, kept verbatim
                let id: String = creator.chars().take(2).collect();
                let mut author = if is_first_id {
                    Element::new("author").with_attr("xml:id", id)
                } else {
                    Element::new("author").with_attr("ref", format!("#{id}"))
                };
                author.push(Element::new("name").with_text(creator));
                vec![author]
            }
            None => vec![Element::new("author")],
        },
    }
}

fn catalog_author(author: &Author, is_first_id: bool) -> Element {
    let mut element = if is_first_id {
        Element::new("author").with_attr("xml:id", author.xmlid.clone())
    } else {
        Element::new("author").with_attr("ref", format!("#{}", author.xmlid))
    };
    let pers_name = element.push(Element::new("persName"));
    if let Some(forename) = author.secondary_name.as_deref() {
        pers_name.push(Element::new("forename").with_text(forename));
    }
    if let Some(namelink) = author.namelink.as_deref() {
        pers_name.push(Element::new("nameLink").with_text(namelink));
    }
    if let Some(surname) = author.primary_name.as_deref() {
        pers_name.push(Element::new("surname").with_text(surname));
    }
    if let Some(isni) = author.isni.as_deref() {
        pers_name.push(
            Element::new("ptr")
                .with_attr("type", "isni")
                .with_attr("target", isni),
        );
    }
    element
}

fn pick<'a>(first: Option<&'a str>, second: Option<&'a str>) -> Option<&'a str> {
    first.or(second)
}

fn text_or(mut element: Element, value: Option<&str>, default_text: &str) -> Element {
    element.text = Some(value.unwrap_or(default_text).to_string());
    element
}
