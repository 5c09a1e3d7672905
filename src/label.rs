//! Decoding of SegmOnto zone labels.
//!
//! A label follows the pattern `PrimaryType[:Subtype][#Ordinal]`, for
//! example `MainZone:column#1` or `MarginTextZone`. Missing components
//! decode to the literal `"none"`, which is what the TEI attributes carry.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

/// The three components of a decoded zone label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// Primary type, e.g. `MainZone`.
    pub primary: String,
    /// Subtype, e.g. `column`, or `"none"`.
    pub subtype: String,
    /// Ordinal index as a string, e.g. `"1"`, or `"none"`.
    pub n: String,
}

impl Label {
    /// Decode a raw label string.
    ///
    /// Decoding is total over the documented grammar: absent subtype or
    /// ordinal is the common case, not an error. A string that fails the
    /// primary-type group (e.g. one that starts with punctuation) is a
    /// malformed tag dictionary and fatal for the document.
    pub fn decode(raw: &str) -> Result<Label> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| {
            Regex::new(r"^(\w+)(?::(\w+))?(?:#(\d+))?").expect("label pattern")
        });

        let caps = pattern
            .captures(raw)
            .ok_or_else(|| Error::MalformedTag(raw.to_string()))?;

        Ok(Label {
            primary: caps[1].to_string(),
            subtype: caps
                .get(2)
                .map_or_else(|| "none".to_string(), |m| m.as_str().to_string()),
            n: caps
                .get(3)
                .map_or_else(|| "none".to_string(), |m| m.as_str().to_string()),
        })
    }

    /// The block-level semantic type this label denotes.
    pub fn zone_type(&self) -> ZoneType {
        ZoneType::from_primary(&self.primary)
    }

    /// The line-level typographic role this label denotes.
    pub fn line_role(&self) -> LineRole {
        LineRole::from_primary(&self.primary)
    }
}

/// Semantic type of a block-level zone.
///
/// The vocabulary is closed; anything outside it lands in [`ZoneType::Other`],
/// which the body assembler deliberately skips (with a debug log) rather
/// than falling through silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneType {
    /// Running prose (`MainZone`).
    Main,
    /// Marginal notes (`MarginTextZone`).
    MarginText,
    /// Page numbers (`NumberingZone`).
    Numbering,
    /// Quire signatures (`QuireMarksZone`).
    QuireMarks,
    /// Running titles (`RunningTitleZone`).
    RunningTitle,
    /// Any other zone type, preserved verbatim.
    Other(String),
}

impl ZoneType {
    pub fn from_primary(name: &str) -> ZoneType {
        match name {
            "MainZone" => ZoneType::Main,
            "MarginTextZone" => ZoneType::MarginText,
            "NumberingZone" => ZoneType::Numbering,
            "QuireMarksZone" => ZoneType::QuireMarks,
            "RunningTitleZone" => ZoneType::RunningTitle,
            other => ZoneType::Other(other.to_string()),
        }
    }

    /// The SegmOnto name, as written into TEI `@type` attributes.
    pub fn as_str(&self) -> &str {
        match self {
            ZoneType::Main => "MainZone",
            ZoneType::MarginText => "MarginTextZone",
            ZoneType::Numbering => "NumberingZone",
            ZoneType::QuireMarks => "QuireMarksZone",
            ZoneType::RunningTitle => "RunningTitleZone",
            ZoneType::Other(name) => name,
        }
    }
}

/// Typographic role of a text line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRole {
    /// Ordinary prose line (`DefaultLine`).
    Default,
    /// Heading line (`HeadingLine`).
    Heading,
    /// Drop capital (`DropCapitalLine`).
    DropCapital,
    /// Any other line label, preserved verbatim.
    Other(String),
}

impl LineRole {
    pub fn from_primary(name: &str) -> LineRole {
        match name {
            "DefaultLine" => LineRole::Default,
            "HeadingLine" => LineRole::Heading,
            "DropCapitalLine" => LineRole::DropCapital,
            other => LineRole::Other(other.to_string()),
        }
    }

    /// The label name, as written into `<hi rend="...">`.
    pub fn as_str(&self) -> &str {
        match self {
            LineRole::Default => "DefaultLine",
            LineRole::Heading => "HeadingLine",
            LineRole::DropCapital => "DropCapitalLine",
            LineRole::Other(name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_label() {
        let label = Label::decode("MainZone:column#1").unwrap();
        assert_eq!(label.primary, "MainZone");
        assert_eq!(label.subtype, "column");
        assert_eq!(label.n, "1");
    }

    #[test]
    fn test_decode_primary_only() {
        let label = Label::decode("MarginTextZone").unwrap();
        assert_eq!(label.primary, "MarginTextZone");
        assert_eq!(label.subtype, "none");
        assert_eq!(label.n, "none");
    }

    #[test]
    fn test_decode_with_subtype_no_ordinal() {
        let label = Label::decode("NumberingZone:folio").unwrap();
        assert_eq!(label.primary, "NumberingZone");
        assert_eq!(label.subtype, "folio");
        assert_eq!(label.n, "none");
    }

    #[test]
    fn test_decode_with_ordinal_no_subtype() {
        let label = Label::decode("MainZone#2").unwrap();
        assert_eq!(label.primary, "MainZone");
        assert_eq!(label.subtype, "none");
        assert_eq!(label.n, "2");
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(
            Label::decode(":column"),
            Err(Error::MalformedTag(_))
        ));
        assert!(matches!(Label::decode(""), Err(Error::MalformedTag(_))));
    }

    #[test]
    fn test_zone_type_vocabulary() {
        assert_eq!(ZoneType::from_primary("MainZone"), ZoneType::Main);
        assert_eq!(
            ZoneType::from_primary("RunningTitleZone"),
            ZoneType::RunningTitle
        );
        assert_eq!(
            ZoneType::from_primary("DropCapitalZone"),
            ZoneType::Other("DropCapitalZone".to_string())
        );
        assert_eq!(ZoneType::from_primary("MarginTextZone").as_str(), "MarginTextZone");
    }

    #[test]
    fn test_line_role_vocabulary() {
        assert_eq!(LineRole::from_primary("DefaultLine"), LineRole::Default);
        assert_eq!(LineRole::from_primary("HeadingLine"), LineRole::Heading);
        assert_eq!(
            LineRole::from_primary("InterlinearLine"),
            LineRole::Other("InterlinearLine".to_string())
        );
    }
}
