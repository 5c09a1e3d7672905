//! BnF SRU catalogue collaborator.
//!
//! Looks up a bibliographic record by catalogue ARK and parses the
//! UNIMARC-flavored MARCXML response into a [`Record`]. The result is an
//! explicit [`Catalog`] sum type: zero hits, HTTP failure, or a malformed
//! response all collapse to [`Catalog::NotFound`], which the header
//! builder consumes by exhaustive matching.

use std::sync::OnceLock;

use log::warn;
use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;
use serde::Deserialize;

use crate::util;

/// Endpoint parameters for the SRU API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SruEndpoint {
    pub base: String,
}

impl Default for SruEndpoint {
    fn default() -> Self {
        SruEndpoint {
            base: "https://catalogue.bnf.fr/api/SRU".to_string(),
        }
    }
}

impl SruEndpoint {
    /// Query URI for one catalogue ARK.
    pub fn query_uri(&self, ark: &str) -> String {
        format!(
            "{}?version=1.2&operation=searchRetrieve&query=bib.persistentid all \"{}\"",
            self.base, ark
        )
    }
}

/// Outcome of a catalogue lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Catalog {
    Found(Record),
    #[default]
    NotFound,
}

impl Catalog {
    pub fn record(&self) -> Option<&Record> {
        match self {
            Catalog::Found(record) => Some(record),
            Catalog::NotFound => None,
        }
    }
}

/// A cleaned bibliographic record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub authors: Vec<Author>,
    pub title: Option<String>,
    /// Catalogue URL for the `<ptr @target>` in the `<bibl>`.
    pub ptr: Option<String>,
    pub pubplace: Option<String>,
    /// ISO country key for the publication place (from UNIMARC 102$a).
    pub pubplace_key: Option<String>,
    pub publisher: Option<String>,
    /// Publication date as printed (may carry brackets or question marks).
    pub date: Option<String>,
    /// Machine-readable year derived from `date`.
    pub when: Option<String>,
    pub country: Option<String>,
    /// Shelfmark (UNIMARC 930$a).
    pub idno: Option<String>,
    /// Physical description (UNIMARC 215$a).
    pub objectdesc: Option<String>,
    /// Language code (UNIMARC 101$a).
    pub lang: Option<String>,
}

/// One author of the record, split the way TEI `<persName>` wants it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    /// Surname (UNIMARC 7XX$a).
    pub primary_name: Option<String>,
    /// Forename (UNIMARC 7XX$b).
    pub secondary_name: Option<String>,
    /// Name link particle ("de", "van"), when the record carries one.
    pub namelink: Option<String>,
    /// ISNI pointer target (UNIMARC 7XX$o).
    pub isni: Option<String>,
    /// Generated `xml:id`, referenced from the `<bibl>` via `@ref`.
    pub xmlid: String,
}

/// Fetch a bibliographic record for a catalogue ARK.
///
/// Any failure along the way downgrades to [`Catalog::NotFound`].
pub fn fetch_record(endpoint: &SruEndpoint, ark: &str) -> Catalog {
    let uri = endpoint.query_uri(ark);
    let body = match reqwest::blocking::get(uri.as_str())
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.text())
    {
        Ok(body) => body,
        Err(e) => {
            warn!("SRU request for {ark} failed: {e}");
            return Catalog::NotFound;
        }
    };
    parse_response(&body, ark)
}

/// Parse an SRU searchRetrieve response.
pub fn parse_response(xml: &str, ark: &str) -> Catalog {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // (datafield ordinal, datafield tag, subfield code, text) tuples, in
    // document order. The ordinal marks datafield boundaries: two
    // consecutive fields with the same tag are still distinct fields.
    let mut subfields: Vec<(usize, String, String, String)> = Vec::new();
    let mut number_of_records: Option<u32> = None;

    let mut field_ordinal = 0usize;
    let mut current_field: Option<String> = None;
    let mut current_code: Option<String> = None;
    let mut capture: Option<&'static str> = None;
    let mut buf_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"numberOfRecords" => {
                    capture = Some("count");
                    buf_text.clear();
                }
                b"datafield" => {
                    field_ordinal += 1;
                    current_field = attr_value(&e, b"tag");
                }
                b"subfield" if current_field.is_some() => {
                    current_code = attr_value(&e, b"code");
                    capture = Some("subfield");
                    buf_text.clear();
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if capture.is_some() {
                    buf_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if capture.is_some() {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = util::resolve_entity(&entity) {
                        buf_text.push_str(&resolved);
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"numberOfRecords" => {
                    if capture == Some("count") {
                        number_of_records = buf_text.trim().parse().ok();
                        capture = None;
                    }
                }
                b"subfield" => {
                    if capture == Some("subfield")
                        && let (Some(field), Some(code)) =
                            (current_field.clone(), current_code.take())
                    {
                        subfields.push((field_ordinal, field, code, buf_text.clone()));
                    }
                    capture = None;
                }
                b"datafield" => current_field = None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("SRU response for {ark} was not well-formed: {e}");
                return Catalog::NotFound;
            }
            _ => {}
        }
    }

    match number_of_records {
        Some(n) if n > 0 && !subfields.is_empty() => {
            Catalog::Found(build_record(&subfields, ark))
        }
        _ => Catalog::NotFound,
    }
}

/// Assemble a [`Record`] from UNIMARC datafield/subfield tuples.
fn build_record(subfields: &[(usize, String, String, String)], ark: &str) -> Record {
    let mut record = Record {
        ptr: Some(format!("https://catalogue.bnf.fr/{ark}")),
        ..Record::default()
    };

    let mut current_author: Option<Author> = None;
    let mut author_field: Option<usize> = None;
    for (ordinal, field, code, text) in subfields {
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        match (field.as_str(), code.as_str()) {
            ("200", "a") => pick(&mut record.title, text),
            ("210", "a") => pick(&mut record.pubplace, text),
            ("210", "c") => pick(&mut record.publisher, text),
            ("210", "d") => pick(&mut record.date, text),
            ("215", "a") => pick(&mut record.objectdesc, text),
            ("101", "a") => pick(&mut record.lang, text),
            ("102", "a") => {
                pick(&mut record.country, text);
                pick(&mut record.pubplace_key, text);
            }
            ("930", "a") => pick(&mut record.idno, text),
            ("700", _) | ("701", _) | ("702", _) => {
                // Each datafield is one author; crossing into a new
                // field flushes the last even when $4 never came
                if author_field != Some(*ordinal) {
                    finish_author(&mut current_author, &mut record.authors);
                    author_field = Some(*ordinal);
                }
                let author = current_author.get_or_insert_with(Author::default);
                match code.as_str() {
                    "a" => author.primary_name = Some(text.to_string()),
                    "b" => author.secondary_name = Some(text.to_string()),
                    "o" => author.isni = Some(text.to_string()),
                    // End of one author entry: function code closes the field
                    "4" => {
                        finish_author(&mut current_author, &mut record.authors);
                    }
                    _ => {}
                }
            }
            _ => {}
        }
        // A new datafield tag outside 7XX flushes a pending author
        if !field.starts_with('7') {
            finish_author(&mut current_author, &mut record.authors);
        }
    }
    finish_author(&mut current_author, &mut record.authors);

    record.when = record.date.as_deref().and_then(year_of);
    record
}

fn finish_author(current: &mut Option<Author>, authors: &mut Vec<Author>) {
    if let Some(mut author) = current.take() {
        if author.primary_name.is_none() && author.secondary_name.is_none() {
            return;
        }
        author.xmlid = author_xmlid(&author, authors.len());
        authors.push(author);
    }
}

/// Generate a stable `xml:id` for an author: the first two letters of the
/// surname (lowercased), suffixed with an ordinal past the first author.
fn author_xmlid(author: &Author, index: usize) -> String {
    let name = author
        .primary_name
        .as_deref()
        .or(author.secondary_name.as_deref())
        .unwrap_or("anon");
    let prefix: String = name
        .chars()
        .filter(char::is_ascii_alphabetic)
        .take(2)
        .collect::<String>()
        .to_lowercase();
    let prefix = if prefix.is_empty() {
        "au".to_string()
    } else {
        prefix
    };
    if index == 0 {
        prefix
    } else {
        format!("{}{}", prefix, index + 1)
    }
}

/// Extract a four-digit year from a printed date like `[1488]` or `1512?`.
fn year_of(date: &str) -> Option<String> {
    static YEAR: OnceLock<Regex> = OnceLock::new();
    let year = YEAR.get_or_init(|| Regex::new(r"\d{4}").expect("year pattern"));
    year.find(date).map(|m| m.as_str().to_string())
}

fn pick(slot: &mut Option<String>, text: &str) {
    if slot.is_none() {
        *slot = Some(text.to_string());
    }
}

fn attr_value(e: &quick_xml::events::BytesStart, name: &[u8]) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        if a.key.local_name().as_ref() == name {
            Some(String::from_utf8_lossy(&a.value).into_owned())
        } else {
            None
        }
    })
}
