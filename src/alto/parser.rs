//! Event-driven parser for ALTO 4 page files.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};
use crate::util;

use super::page::{BoundingBox, Page, TextBlock, TextLine};

/// Read and parse one ALTO page file from disk.
///
/// Bytes are decoded tolerantly: UTF-8 first, then the encoding named in
/// the XML declaration, then Windows-1252.
pub fn parse_page_file<P: AsRef<Path>>(path: P) -> Result<Page> {
    let bytes = std::fs::read(path)?;
    let hint = util::extract_xml_encoding(&bytes).map(str::to_owned);
    let content = util::decode_text(&bytes, hint.as_deref());
    parse_page(&content)
}

/// Parse one ALTO page document.
///
/// Collects the `<OtherTag>` side-table, the `<Page>` geometry, and every
/// `TextBlock`/`TextLine` under `<PrintSpace>` in source order. Tag-based
/// filtering is *not* applied here; the facsimile builder decides which
/// regions qualify.
pub fn parse_page(content: &str) -> Result<Page> {
    let mut reader = Reader::from_str(content);
    let config = reader.config_mut();
    config.trim_text(true);
    // Self-closing elements become Start/End pairs, so `<Polygon/>` and
    // `<Polygon></Polygon>` take the same path below.
    config.expand_empty_elements = true;

    let mut page = Page::default();
    let mut saw_page = false;
    let mut in_print_space = false;
    let mut current_block: Option<TextBlock> = None;
    let mut current_line: Option<TextLine> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"Page" => {
                    read_page_attrs(&e, &mut page);
                    saw_page = true;
                }
                b"PrintSpace" => in_print_space = true,
                b"TextBlock" if in_print_space => current_block = Some(make_block(&e)),
                b"TextLine" if current_block.is_some() => current_line = Some(make_line(&e)),
                b"OtherTag" => {
                    if let (Some(id), Some(label)) = (attr(&e, b"ID"), attr(&e, b"LABEL")) {
                        page.tags.insert(id, label);
                    }
                }
                b"Polygon" => {
                    let points = attr(&e, b"POINTS");
                    if let Some(line) = current_line.as_mut() {
                        line.polygon = points;
                    } else if let Some(block) = current_block.as_mut() {
                        block.polygon = points;
                    }
                }
                b"String" => {
                    if let Some(line) = current_line.as_mut()
                        && line.content.is_none()
                    {
                        line.content = attr(&e, b"CONTENT");
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"PrintSpace" => in_print_space = false,
                b"TextLine" => {
                    if let (Some(block), Some(line)) =
                        (current_block.as_mut(), current_line.take())
                    {
                        block.lines.push(line);
                    }
                }
                b"TextBlock" => {
                    if let Some(block) = current_block.take() {
                        page.blocks.push(block);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    if !saw_page {
        return Err(Error::MissingElement("Page".to_string()));
    }

    Ok(page)
}

fn read_page_attrs(e: &BytesStart, page: &mut Page) {
    page.width = parse_coord(&attr(e, b"WIDTH").unwrap_or_default());
    page.height = parse_coord(&attr(e, b"HEIGHT").unwrap_or_default());
    page.physical_img_nr = attr(e, b"PHYSICAL_IMG_NR").unwrap_or_default();
}

fn make_block(e: &BytesStart) -> TextBlock {
    TextBlock {
        id: attr(e, b"ID").unwrap_or_default(),
        tagrefs: attr(e, b"TAGREFS"),
        bbox: parse_bbox(e),
        ..TextBlock::default()
    }
}

fn make_line(e: &BytesStart) -> TextLine {
    TextLine {
        id: attr(e, b"ID").unwrap_or_default(),
        tagrefs: attr(e, b"TAGREFS"),
        bbox: parse_bbox(e),
        baseline: attr(e, b"BASELINE"),
        ..TextLine::default()
    }
}

/// Look up an attribute on an element, unescaping entity references.
fn attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        if a.key.local_name().as_ref() == name {
            Some(util::unescape_entities(&String::from_utf8_lossy(&a.value)))
        } else {
            None
        }
    })
}

fn parse_bbox(e: &BytesStart) -> BoundingBox {
    BoundingBox {
        x: parse_coord(&attr(e, b"HPOS").unwrap_or_default()),
        y: parse_coord(&attr(e, b"VPOS").unwrap_or_default()),
        width: parse_coord(&attr(e, b"WIDTH").unwrap_or_default()),
        height: parse_coord(&attr(e, b"HEIGHT").unwrap_or_default()),
    }
}

/// Parse a pixel coordinate. Some segmenters emit floats; round them.
fn parse_coord(s: &str) -> u32 {
    s.parse::<u32>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().map(|f| f.round() as u32))
        .unwrap_or(0)
}
