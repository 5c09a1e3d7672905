//! The `<body>` assembler.
//!
//! A single forward pass over the document's line sequence builds
//! `text/body/div`: page-break markers, forme-work wrappers, margin
//! notes, and `<ab>` text blocks, with `<hi>` runs for heading and
//! drop-capital lines. The only state consulted per line is the kind of
//! the most recently appended top-level sibling and the previous line's
//! page id; the input order already reflects reading order, so no sorting
//! or keyed grouping happens here.

use log::debug;

use crate::label::{LineRole, ZoneType};

use super::source_doc::LineRecord;
use super::xml::Element;

/// Context of one line during assembly: the record itself plus the page
/// id of the line immediately preceding it (None for the first line).
/// This single look-back is the only cross-line dependency in the
/// pipeline; it is what detects page transitions without re-scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineContext<'a> {
    pub line: &'a LineRecord,
    pub previous_page: Option<&'a str>,
}

/// Resolve each line's context from the ordered sequence.
pub fn line_contexts(lines: &[LineRecord]) -> Vec<LineContext<'_>> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| LineContext {
            line,
            previous_page: if i == 0 {
                None
            } else {
                Some(lines[i - 1].page_id.as_str())
            },
        })
        .collect()
}

/// Kind of the most recently appended top-level child of the `<div>`.
///
/// Tracked explicitly instead of re-deriving it from the tree (the
/// grouping decisions below read nothing else). `<hi>` runs and `<lb>`
/// markers are not top-level and never become the last sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastSibling {
    None,
    PageBreak,
    /// A `<fw>` wrapper (page number, quire mark, running title).
    TagWrapper,
    /// A `<note>` margin wrapper.
    Note,
    /// An `<ab>` main-text block.
    TextBlock,
}

/// Build `<text><body><div>…</div></body></text>` from the line sequence.
pub fn build(lines: &[LineRecord]) -> Element {
    let mut text = Element::new("text");
    let body = text.push(Element::new("body"));
    let div = body.push(Element::new("div"));

    let mut last = LastSibling::None;

    for context in line_contexts(lines) {
        let line = context.line;

        // A new page (or the very first line) gets a page-break marker
        if context.previous_page != Some(line.page_id.as_str()) {
            div.push(Element::new("pb").with_attr("corresp", format!("#{}", line.page_id)));
            last = LastSibling::PageBreak;
        }

        let mut lb = Element::new("lb").with_attr("corresp", format!("#{}", line.id));

        match &line.zone_type {
            // Page numbers, quire marks and running titles each get their
            // own wrapper; these never merge, even across adjacent lines
            // of the same type.
            ZoneType::Numbering | ZoneType::QuireMarks | ZoneType::RunningTitle => {
                lb.tail = Some(line.text.clone());
                let mut fw = Element::new("fw")
                    .with_attr("corresp", format!("#{}", line.zone_id))
                    .with_attr("type", line.zone_type.as_str());
                fw.push(lb);
                div.push(fw);
                last = LastSibling::TagWrapper;
            }

            // Adjacent margin lines coalesce into one note; a page break
            // in between resets the last sibling and ends the run.
            ZoneType::MarginText => {
                lb.tail = Some(line.text.clone());
                if last == LastSibling::Note {
                    let note = div.last_child_mut().expect("note is the last sibling");
                    note.push(lb);
                } else {
                    let mut note = Element::new("note")
                        .with_attr("corresp", format!("#{}", line.zone_id))
                        .with_attr("type", line.zone_type.as_str());
                    note.push(lb);
                    div.push(note);
                    last = LastSibling::Note;
                }
            }

            ZoneType::Main => {
                if last != LastSibling::TextBlock {
                    div.push(
                        Element::new("ab")
                            .with_attr("corresp", format!("#{}", line.zone_id))
                            .with_attr("type", line.zone_type.as_str())
                            .with_text("\n"),
                    );
                    last = LastSibling::TextBlock;
                }
                let ab = div.last_child_mut().expect("ab is the last sibling");

                match &line.role {
                    // Consecutive heading/drop-capital lines coalesce into
                    // one <hi> run; no extra newline after their text.
                    LineRole::Heading | LineRole::DropCapital => {
                        lb.tail = Some(line.text.clone());
                        let in_run = matches!(ab.last_child(), Some(child) if child.name == "hi");
                        if in_run {
                            let hi = ab.last_child_mut().expect("hi is the last child");
                            hi.push(lb);
                        } else {
                            let mut hi = Element::new("hi").with_attr("rend", line.role.as_str());
                            hi.tail = Some("\n".to_string());
                            hi.push(lb);
                            ab.push(hi);
                        }
                    }
                    // The trailing newline separates rendered prose lines
                    LineRole::Default => {
                        lb.tail = Some(format!("{}\n", line.text));
                        ab.push(lb);
                    }
                    LineRole::Other(name) => {
                        debug!("line {} has unhandled role {name}; skipped", line.id);
                    }
                }
            }

            // Deliberate no-op: zones outside the recognized vocabulary
            // contribute no markup.
            ZoneType::Other(name) => {
                debug!("line {} in unhandled zone type {name}; skipped", line.id);
            }
        }
    }

    text
}
