//! The `<sourceDoc>` facsimile tree.
//!
//! One `<surface>` per page, one `<zone>` per qualifying text block, one
//! nested `<zone>` per qualifying text line (with its `<path>` baseline
//! and, when the line has text, a `<line>` leaf). Source order is
//! preserved throughout; nothing is re-sorted here.

use crate::alto::{Page, TextBlock, TextLine};
use crate::error::{Error, Result};
use crate::iiif::IiifEndpoint;
use crate::label::{Label, LineRole, ZoneType};

use super::xml::Element;

/// Tag references that mark structural/typographic elements with no
/// semantic region meaning; regions carrying them are excluded outright,
/// as are regions with no tag reference at all.
const IGNORED_TAGREFS: [&str; 2] = ["BT", "LT"];

/// The built facsimile tree plus the flattened line sequence the body
/// assembler consumes. Lines appear in (page, block, line) order, which
/// approximates reading order end-to-end.
#[derive(Debug, Clone)]
pub struct SourceDoc {
    /// The `<sourceDoc>` element.
    pub element: Element,
    /// One record per text line that carries content, in document order.
    pub lines: Vec<LineRecord>,
}

/// Context of one text line, resolved while the facsimile tree is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    /// `xml:id` of the line's `<zone>` (e.g. `f3_z2_l4`).
    pub id: String,
    /// Document-wide line number (not reset per page).
    pub n: usize,
    /// Text content of the line. May be empty, never absent.
    pub text: String,
    /// Typographic role decoded from the line's tag.
    pub role: LineRole,
    /// Semantic type of the enclosing text block.
    pub zone_type: ZoneType,
    /// `xml:id` of the enclosing block `<zone>` (e.g. `f3_z2`).
    pub zone_id: String,
    /// `xml:id` of the enclosing `<surface>` (e.g. `f3`).
    pub page_id: String,
}

/// Build the `<sourceDoc>` for a whole document from its parsed pages,
/// given in folio order.
pub fn build(
    doc_name: &str,
    pages: &[(u32, Page)],
    iiif: &IiifEndpoint,
) -> Result<SourceDoc> {
    let mut source_doc = Element::new("sourceDoc");
    let surface_grp = source_doc.push(Element::new("surfaceGrp"));
    let mut lines = Vec::new();
    // Running line counter across the whole document
    let mut line_count = 0usize;

    for (folio, page) in pages {
        let page_id = format!("f{folio}");
        let surface = surface_grp.push(
            Element::new("surface")
                .with_attr("xml:id", &page_id)
                .with_attr("n", &page.physical_img_nr)
                .with_attr("ulx", "0")
                .with_attr("uly", "0")
                .with_attr("lrx", page.width.to_string())
                .with_attr("lry", page.height.to_string()),
        );
        surface.push(Element::new("graphic").with_attr("url", iiif.page_uri(doc_name, *folio)));

        for (block_index, (block_tag, block)) in qualifying_blocks(page).enumerate() {
            let zone_id = format!("{}_z{}", page_id, block_index + 1);
            let label = decode_tag(page, block_tag, &block.id)?;
            let block_zone = Element::new("zone")
                .with_attr("xml:id", &zone_id)
                .with_attr("type", &label.primary)
                .with_attr("subtype", &label.subtype)
                .with_attr("n", &label.n)
                .with_attr("points", polygon_points(block.polygon.as_deref(), &block.id)?)
                .with_attr("source", iiif.region_uri(doc_name, *folio, &block.bbox));
            let block_zone = surface.push(block_zone);
            let zone_type = label.zone_type();

            // A block with zero qualifying lines still appears as an empty
            // container; it just contributes nothing to the line sequence.
            for (line_index, (line_tag, line)) in qualifying_lines(block).enumerate() {
                line_count += 1;
                let line_id = format!("{}_l{}", zone_id, line_index + 1);
                let line_label = decode_tag(page, line_tag, &line.id)?;

                let mut line_zone = Element::new("zone")
                    .with_attr("xml:id", &line_id)
                    .with_attr("type", &line_label.primary)
                    .with_attr("subtype", &line_label.subtype)
                    .with_attr("n", &line_label.n)
                    .with_attr("points", polygon_points(line.polygon.as_deref(), &line.id)?)
                    .with_attr("source", iiif.region_uri(doc_name, *folio, &line.bbox));
                // The label ordinal gives way to the running line number
                line_zone.set_attr("n", line_count.to_string());

                let baseline = line.baseline.as_deref().ok_or_else(|| {
                    Error::MissingElement(format!("BASELINE on TextLine {}", line.id))
                })?;
                line_zone.push(
                    Element::new("path")
                        .with_attr("xml:id", format!("{line_id}_p"))
                        .with_attr("points", format_points(baseline)),
                );

                if let Some(ref content) = line.content {
                    line_zone.push(
                        Element::new("line")
                            .with_attr("xml:id", format!("{line_id}_t"))
                            .with_text(content.clone()),
                    );
                    lines.push(LineRecord {
                        id: line_id.clone(),
                        n: line_count,
                        text: content.clone(),
                        role: line_label.line_role(),
                        zone_type: zone_type.clone(),
                        zone_id: zone_id.clone(),
                        page_id: page_id.clone(),
                    });
                }

                block_zone.push(line_zone);
            }
        }
    }

    Ok(SourceDoc {
        element: source_doc,
        lines,
    })
}

/// A region qualifies only if it carries a tag reference outside the
/// reserved ignore codes.
fn qualifies(tagref: &str) -> bool {
    !IGNORED_TAGREFS.contains(&tagref)
}

fn qualifying_blocks(page: &Page) -> impl Iterator<Item = (&str, &TextBlock)> {
    page.blocks.iter().filter_map(|block| {
        block
            .tagrefs
            .as_deref()
            .filter(|t| qualifies(t))
            .map(|t| (t, block))
    })
}

fn qualifying_lines(block: &TextBlock) -> impl Iterator<Item = (&str, &TextLine)> {
    block.lines.iter().filter_map(|line| {
        line.tagrefs
            .as_deref()
            .filter(|t| qualifies(t))
            .map(|t| (t, line))
    })
}

fn decode_tag(page: &Page, tagref: &str, element_id: &str) -> Result<Label> {
    let label = page
        .tags
        .get(tagref)
        .ok_or_else(|| Error::UnknownTagRef(format!("{tagref} on {element_id}")))?;
    Label::decode(label)
}

fn polygon_points(polygon: Option<&str>, element_id: &str) -> Result<String> {
    let raw = polygon.ok_or_else(|| {
        Error::MissingElement(format!("Polygon on qualifying region {element_id}"))
    })?;
    Ok(format_points(raw))
}

/// Reformat an ALTO coordinate list into comma-joined pairs:
/// `"2204 4621 2190 4528"` -> `"2204,4621 2190,4528"`.
pub fn format_points(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .chunks_exact(2)
        .map(|pair| format!("{},{}", pair[0], pair[1]))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alto::BoundingBox;
    use std::collections::HashMap;

    fn tag_table() -> HashMap<String, String> {
        HashMap::from([
            ("B1".to_string(), "MainZone:column#1".to_string()),
            ("B2".to_string(), "MarginTextZone".to_string()),
            ("L1".to_string(), "DefaultLine".to_string()),
            ("L2".to_string(), "HeadingLine".to_string()),
        ])
    }

    fn line(id: &str, tagref: &str, content: Option<&str>) -> TextLine {
        TextLine {
            id: id.to_string(),
            tagrefs: Some(tagref.to_string()),
            bbox: BoundingBox {
                x: 10,
                y: 20,
                width: 30,
                height: 40,
            },
            polygon: Some("10 20 40 20 40 60 10 60".to_string()),
            baseline: Some("10 50 40 50".to_string()),
            content: content.map(str::to_owned),
        }
    }

    fn block(id: &str, tagref: Option<&str>, lines: Vec<TextLine>) -> TextBlock {
        TextBlock {
            id: id.to_string(),
            tagrefs: tagref.map(str::to_owned),
            bbox: BoundingBox {
                x: 5,
                y: 6,
                width: 700,
                height: 800,
            },
            polygon: Some("5 6 705 6 705 806 5 806".to_string()),
            lines,
        }
    }

    fn page(blocks: Vec<TextBlock>) -> Page {
        Page {
            width: 2000,
            height: 3000,
            physical_img_nr: "7".to_string(),
            tags: tag_table(),
            blocks,
        }
    }

    #[test]
    fn test_format_points() {
        assert_eq!(format_points("2204 4621 2190 4528"), "2204,4621 2190,4528");
        assert_eq!(format_points("1 2"), "1,2");
        assert_eq!(format_points(""), "");
    }

    #[test]
    fn test_surface_attributes() {
        let pages = vec![(3, page(vec![]))];
        let sd = build("bpt6k1", &pages, &IiifEndpoint::default()).unwrap();
        let surface = sd.element.child("surfaceGrp").unwrap().child("surface").unwrap();
        assert_eq!(surface.attr("xml:id"), Some("f3"));
        assert_eq!(surface.attr("n"), Some("7"));
        assert_eq!(surface.attr("ulx"), Some("0"));
        assert_eq!(surface.attr("lrx"), Some("2000"));
        assert_eq!(surface.attr("lry"), Some("3000"));
        let graphic = surface.child("graphic").unwrap();
        assert_eq!(
            graphic.attr("url"),
            Some("https://gallica.bnf.fr/iiif/ark:/12148/bpt6k1/f3/full/full/0/native.jpg")
        );
    }

    #[test]
    fn test_zone_hierarchy_and_ids() {
        let pages = vec![(
            3,
            page(vec![block(
                "tb1",
                Some("B1"),
                vec![line("tl1", "L1", Some("first")), line("tl2", "L1", Some("second"))],
            )]),
        )];
        let sd = build("bpt6k1", &pages, &IiifEndpoint::default()).unwrap();

        let zones: Vec<&Element> = sd.element.find_all("zone").collect();
        assert_eq!(zones.len(), 3);
        assert_eq!(zones[0].attr("xml:id"), Some("f3_z1"));
        assert_eq!(zones[0].attr("type"), Some("MainZone"));
        assert_eq!(zones[0].attr("subtype"), Some("column"));
        assert_eq!(zones[0].attr("n"), Some("1"));
        assert_eq!(zones[0].attr("points"), Some("5,6 705,6 705,806 5,806"));
        assert_eq!(
            zones[0].attr("source"),
            Some("https://gallica.bnf.fr/iiif/ark:/12148/bpt6k1/f3/5,6,700,800/full/0/native.jpg")
        );

        assert_eq!(zones[1].attr("xml:id"), Some("f3_z1_l1"));
        let path = zones[1].child("path").unwrap();
        assert_eq!(path.attr("xml:id"), Some("f3_z1_l1_p"));
        assert_eq!(path.attr("points"), Some("10,50 40,50"));
        let leaf = zones[1].child("line").unwrap();
        assert_eq!(leaf.attr("xml:id"), Some("f3_z1_l1_t"));
        assert_eq!(leaf.text.as_deref(), Some("first"));

        assert_eq!(zones[2].attr("xml:id"), Some("f3_z1_l2"));
    }

    #[test]
    fn test_running_line_counter_spans_pages() {
        let pages = vec![
            (
                1,
                page(vec![block("a", Some("B1"), vec![line("l", "L1", Some("x"))])]),
            ),
            (
                2,
                page(vec![block("b", Some("B1"), vec![line("m", "L1", Some("y"))])]),
            ),
        ];
        let sd = build("doc", &pages, &IiifEndpoint::default()).unwrap();
        assert_eq!(sd.lines.len(), 2);
        assert_eq!(sd.lines[0].n, 1);
        // Not reset on the page boundary
        assert_eq!(sd.lines[1].n, 2);
        assert_eq!(sd.lines[1].page_id, "f2");

        let line_zones: Vec<&Element> = sd
            .element
            .find_all("zone")
            .filter(|z| z.child("path").is_some())
            .collect();
        assert_eq!(line_zones[1].attr("n"), Some("2"));
    }

    #[test]
    fn test_untagged_and_reserved_regions_excluded() {
        let mut ignored = block("skip", Some("B1"), vec![]);
        ignored.tagrefs = Some("BT".to_string());
        let pages = vec![(
            1,
            page(vec![
                ignored,
                block("none", None, vec![]),
                block("keep", Some("B2"), vec![line("l", "L1", Some("note"))]),
            ]),
        )];
        let sd = build("doc", &pages, &IiifEndpoint::default()).unwrap();
        let blocks: Vec<&Element> = sd
            .element
            .find_all("zone")
            .filter(|z| z.child("path").is_none())
            .collect();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].attr("type"), Some("MarginTextZone"));
        // The surviving block is still numbered z1
        assert_eq!(blocks[0].attr("xml:id"), Some("f1_z1"));
    }

    #[test]
    fn test_empty_block_still_appears() {
        let pages = vec![(1, page(vec![block("empty", Some("B1"), vec![])]))];
        let sd = build("doc", &pages, &IiifEndpoint::default()).unwrap();
        let surface = sd.element.child("surfaceGrp").unwrap().child("surface").unwrap();
        assert!(surface.child("zone").is_some());
        assert!(sd.lines.is_empty());
    }

    #[test]
    fn test_line_without_content_has_no_record() {
        let pages = vec![(
            1,
            page(vec![block("b", Some("B1"), vec![line("l", "L1", None)])]),
        )];
        let sd = build("doc", &pages, &IiifEndpoint::default()).unwrap();
        assert!(sd.lines.is_empty());
        // The zone and its path are still in the facsimile
        let line_zone = sd
            .element
            .find_all("zone")
            .find(|z| z.child("path").is_some())
            .unwrap();
        assert!(line_zone.child("line").is_none());
    }

    #[test]
    fn test_missing_polygon_is_fatal() {
        let mut bad = block("b", Some("B1"), vec![]);
        bad.polygon = None;
        let pages = vec![(1, page(vec![bad]))];
        let err = build("doc", &pages, &IiifEndpoint::default()).unwrap_err();
        assert!(matches!(err, Error::MissingElement(_)));
    }

    #[test]
    fn test_unknown_tagref_is_fatal() {
        let pages = vec![(1, page(vec![block("b", Some("ZZ"), vec![])]))];
        let err = build("doc", &pages, &IiifEndpoint::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownTagRef(_)));
    }
}
