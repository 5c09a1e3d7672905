//! IIIF Image/Presentation API collaborator.
//!
//! Two concerns live here: synthesizing image tile URIs for `@source`
//! attributes (these must be reproduced bit-exact for viewer
//! compatibility), and fetching/cleaning a document's presentation
//! manifest. Manifest failures are downgraded to an empty [`Manifest`];
//! the pipeline proceeds with placeholder metadata.

use std::collections::HashMap;
use std::sync::OnceLock;

use log::warn;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::alto::BoundingBox;

/// Endpoint parameters for a IIIF image server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IiifEndpoint {
    pub scheme: String,
    pub server: String,
    /// Path prefix for image requests, e.g. `/iiif/ark:/12148`.
    pub prefix: String,
    /// Path prefix for manifest requests, e.g. `/iiif/ark:/12148/`.
    pub manifest_prefix: String,
    /// Path suffix for manifest requests, e.g. `/manifest.json`.
    pub manifest_suffix: String,
}

impl Default for IiifEndpoint {
    fn default() -> Self {
        IiifEndpoint {
            scheme: "https".to_string(),
            server: "gallica.bnf.fr".to_string(),
            prefix: "/iiif/ark:/12148".to_string(),
            manifest_prefix: "/iiif/ark:/12148/".to_string(),
            manifest_suffix: "/manifest.json".to_string(),
        }
    }
}

impl IiifEndpoint {
    /// Tile URI for one region of a page image.
    pub fn region_uri(&self, doc: &str, folio: u32, bbox: &BoundingBox) -> String {
        format!(
            "{}://{}{}/{}/f{}/{},{},{},{}/full/0/native.jpg",
            self.scheme,
            self.server,
            self.prefix,
            doc,
            folio,
            bbox.x,
            bbox.y,
            bbox.width,
            bbox.height
        )
    }

    /// URI for the full image of one page.
    pub fn page_uri(&self, doc: &str, folio: u32) -> String {
        format!(
            "{}://{}{}/{}/f{}/full/full/0/native.jpg",
            self.scheme, self.server, self.prefix, doc, folio
        )
    }

    /// Manifest URI for a document.
    pub fn manifest_uri(&self, doc: &str) -> String {
        format!(
            "{}://{}{}{}{}",
            self.scheme, self.server, self.manifest_prefix, doc, self.manifest_suffix
        )
    }
}

/// Cleaned metadata from a document's IIIF manifest.
///
/// Every field is optional; a missing field propagates as a "not
/// available" placeholder in the TEI header, never as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Catalogue ARK derived from the `Relation` field, used to query SRU.
    pub catalogue_ark: Option<String>,
    pub repository: Option<String>,
    pub shelfmark: Option<String>,
    pub title: Option<String>,
    pub language: Option<String>,
    pub creator: Option<String>,
    pub date: Option<String>,
}

/// Fetch and clean a document's manifest.
///
/// Network or parse failures yield an empty manifest; they are caught
/// here at the boundary, not propagated.
pub fn fetch_manifest(endpoint: &IiifEndpoint, doc: &str) -> Manifest {
    let uri = endpoint.manifest_uri(doc);
    let response = match reqwest::blocking::get(uri.as_str()).and_then(|r| r.error_for_status()) {
        Ok(response) => response,
        Err(e) => {
            warn!("IIIF manifest request for {doc} failed: {e}");
            return Manifest::default();
        }
    };
    let value: Value = match response.json() {
        Ok(value) => value,
        Err(e) => {
            warn!("IIIF manifest for {doc} was not valid JSON: {e}");
            return Manifest::default();
        }
    };
    clean_manifest(&value)
}

/// Flatten a manifest's `metadata` array into a [`Manifest`].
///
/// Values are either plain strings or lists of `{"@value": …}` objects;
/// the first `@value` wins. The catalogue ARK is derived from `Relation`,
/// and the `Creator` is stripped of its trailing role qualifier
/// (`". Auteur du texte"` and the like).
pub fn clean_manifest(value: &Value) -> Manifest {
    let mut fields: HashMap<String, String> = HashMap::new();
    if let Some(entries) = value.get("metadata").and_then(Value::as_array) {
        for entry in entries {
            let Some(label) = entry.get("label").and_then(Value::as_str) else {
                continue;
            };
            let Some(raw) = entry.get("value") else {
                continue;
            };
            let text = match raw {
                Value::String(s) => Some(s.clone()),
                Value::Array(items) => items
                    .first()
                    .and_then(|item| item.get("@value"))
                    .and_then(Value::as_str)
                    .map(str::to_owned),
                _ => None,
            };
            if let Some(text) = text {
                fields.insert(label.to_string(), text);
            }
        }
    }

    static ARK: OnceLock<Regex> = OnceLock::new();
    let ark = ARK.get_or_init(|| Regex::new(r"/((?:ark:)/\w+/\w+)").expect("ark pattern"));

    let catalogue_ark = fields
        .get("Relation")
        .and_then(|relation| ark.captures(relation))
        .map(|caps| caps[1].to_string());

    static ROLE: OnceLock<Regex> = OnceLock::new();
    let role = ROLE.get_or_init(|| Regex::new(r"(\s\(|\.).+").expect("role pattern"));

    let creator = fields
        .get("Creator")
        .map(|c| role.replace(c, "").into_owned());

    Manifest {
        catalogue_ark,
        repository: fields.remove("Repository"),
        shelfmark: fields.remove("Shelfmark"),
        title: fields.remove("Title"),
        language: fields.remove("Language"),
        creator,
        date: fields.remove("Date"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_region_uri_exact() {
        let endpoint = IiifEndpoint::default();
        let bbox = BoundingBox {
            x: 10,
            y: 20,
            width: 30,
            height: 40,
        };
        assert_eq!(
            endpoint.region_uri("bpt6k1", 3, &bbox),
            "https://gallica.bnf.fr/iiif/ark:/12148/bpt6k1/f3/10,20,30,40/full/0/native.jpg"
        );
    }

    #[test]
    fn test_page_uri_exact() {
        let endpoint = IiifEndpoint::default();
        assert_eq!(
            endpoint.page_uri("bpt6k1", 3),
            "https://gallica.bnf.fr/iiif/ark:/12148/bpt6k1/f3/full/full/0/native.jpg"
        );
    }

    #[test]
    fn test_manifest_uri() {
        let endpoint = IiifEndpoint::default();
        assert_eq!(
            endpoint.manifest_uri("bpt6k1"),
            "https://gallica.bnf.fr/iiif/ark:/12148/bpt6k1/manifest.json"
        );
    }

    #[test]
    fn test_clean_manifest() {
        let value = json!({
            "metadata": [
                {"label": "Title", "value": "Grandes chroniques de France"},
                {"label": "Creator", "value": "Primat. Auteur du texte"},
                {"label": "Relation", "value": "http://catalogue.bnf.fr/ark:/12148/cb38495131m"},
                {"label": "Language", "value": [{"@value": "fre"}]},
                {"label": "Date", "value": "1301-1400"}
            ]
        });
        let manifest = clean_manifest(&value);
        assert_eq!(
            manifest.title.as_deref(),
            Some("Grandes chroniques de France")
        );
        assert_eq!(manifest.creator.as_deref(), Some("Primat"));
        assert_eq!(
            manifest.catalogue_ark.as_deref(),
            Some("ark:/12148/cb38495131m")
        );
        assert_eq!(manifest.language.as_deref(), Some("fre"));
        assert_eq!(manifest.date.as_deref(), Some("1301-1400"));
        assert_eq!(manifest.repository, None);
    }

    #[test]
    fn test_clean_manifest_empty() {
        assert_eq!(clean_manifest(&json!({})), Manifest::default());
    }

    #[test]
    fn test_creator_paren_qualifier() {
        let value = json!({
            "metadata": [
                {"label": "Creator", "value": "Jean Froissart (1337?-1410?). Auteur du texte"}
            ]
        });
        let manifest = clean_manifest(&value);
        assert_eq!(manifest.creator.as_deref(), Some("Jean Froissart"));
    }
}
