//! Parsed representation of one ALTO page file.
//!
//! The model is a read-only projection over the source XML: it keeps every
//! `TextBlock`/`TextLine` under `<PrintSpace>` (including untagged ones) so
//! that the filtering rules live with the attribute extraction, not here.

use std::collections::HashMap;

/// Pixel bounding box of a zone-like element.
///
/// ALTO guarantees non-negative integer coordinates, so the non-degeneracy
/// invariant (width >= 0, height >= 0) holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One page of the document: the `<Page>` element of an ALTO file, its
/// qualifying descendants, and the file's tag side-table.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Pixel width of the page image (`@WIDTH`).
    pub width: u32,
    /// Pixel height of the page image (`@HEIGHT`).
    pub height: u32,
    /// Physical image number (`@PHYSICAL_IMG_NR`).
    pub physical_img_nr: String,
    /// Tag reference -> label, from the file's `<OtherTag>` side-table.
    pub tags: HashMap<String, String>,
    /// Text blocks under `<PrintSpace>`, in source order.
    pub blocks: Vec<TextBlock>,
}

/// A block-level region (`<TextBlock>`).
#[derive(Debug, Clone, Default)]
pub struct TextBlock {
    /// Native `@ID` from the ALTO file.
    pub id: String,
    /// `@TAGREFS`, if any. Blocks without one are filtered downstream.
    pub tagrefs: Option<String>,
    pub bbox: BoundingBox,
    /// Raw `<Polygon @POINTS>` boundary, if present.
    pub polygon: Option<String>,
    /// Text lines, in source order.
    pub lines: Vec<TextLine>,
}

/// A line-level region (`<TextLine>`).
#[derive(Debug, Clone, Default)]
pub struct TextLine {
    /// Native `@ID` from the ALTO file.
    pub id: String,
    /// `@TAGREFS`, if any.
    pub tagrefs: Option<String>,
    pub bbox: BoundingBox,
    /// Raw `<Polygon @POINTS>` boundary, if present.
    pub polygon: Option<String>,
    /// Raw `@BASELINE` path, if present.
    pub baseline: Option<String>,
    /// `<String @CONTENT>` text. Absent content is valid, not an error.
    pub content: Option<String>,
}
