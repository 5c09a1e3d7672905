//! Standoff text segmentation.
//!
//! Joins the main-text lines into one running string, repairs words
//! broken across line ends, and cuts the result into short segments at
//! sentence-like boundaries. The segments land in a `<standOff>` as
//! numbered `<seg>` elements, sized for downstream linguistic tooling.

use std::sync::OnceLock;

use regex::Regex;

use crate::label::ZoneType;

use super::source_doc::LineRecord;
use super::xml::Element;

/// Placeholder joining consecutive lines; survives until hyphenation
/// repair has seen every line boundary.
const LINE_JOINT: &str = "%%";

/// Extract the document's main text as a list of segments.
pub fn segments(lines: &[LineRecord]) -> Vec<String> {
    let joined: Vec<&str> = lines
        .iter()
        .filter(|line| line.zone_type == ZoneType::Main)
        .map(|line| line.text.as_str())
        .collect();
    split_segments(&joined.join(LINE_JOINT))
}

/// Build a `<standOff>` with one numbered `<seg>` per segment.
pub fn build(lines: &[LineRecord]) -> Element {
    let mut standoff = Element::new("standOff");
    for (i, segment) in segments(lines).into_iter().enumerate() {
        let n = i + 1;
        standoff.push(
            Element::new("seg")
                .with_attr("n", n.to_string())
                .with_attr("xml:id", format!("s{n}"))
                .with_text(segment),
        );
    }
    standoff
}

/// Insert segment breaks into the cleaned text, in rule order. Every
/// step only ever inserts `\n`; none deletes or reorders characters,
/// which is what keeps [`segments`] a partition of the cleaned text.
fn insert_breaks(text: &str) -> String {
    struct Rules {
        sentence: Regex,
        clause: Regex,
        terminal: Regex,
    }
    static RULES: OnceLock<Rules> = OnceLock::new();
    let rules = RULES.get_or_init(|| Rules {
        // A capital (including the accented ones this corpus prints)
        // after ". " opens a sentence
        sentence: Regex::new(r"(\.\s)([A-ZÉÀ])").expect("sentence rule"),
        // "Et " and the pilcrow open a clause
        clause: Regex::new(r"Et\s|⁋").expect("clause rule"),
        terminal: Regex::new(r"([;?!])").expect("terminal rule"),
    });

    let s = rules.sentence.replace_all(text, "$1\n$2").into_owned();

    // Break before every clause marker not already at a segment start.
    // A scan over the matches keeps adjacent markers independent, where
    // a pattern consuming the preceding character would skip the second
    // of a back-to-back pair.
    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for m in rules.clause.find_iter(&s) {
        out.push_str(&s[last..m.start()]);
        if m.start() > 0 && s.as_bytes()[m.start() - 1] != b'\n' {
            out.push('\n');
        }
        out.push_str(m.as_str());
        last = m.end();
    }
    out.push_str(&s[last..]);

    rules.terminal.replace_all(&out, "$1\n").into_owned()
}

fn split_segments(joined: &str) -> Vec<String> {
    struct Cleanup {
        tironian_et: Regex,
        hyphen_joint: Regex,
    }
    static CLEANUP: OnceLock<Cleanup> = OnceLock::new();
    let cleanup = CLEANUP.get_or_init(|| Cleanup {
        tironian_et: Regex::new("⁊").expect("et pattern"),
        hyphen_joint: Regex::new(r"[¬\-]%%").expect("hyphen pattern"),
    });

    // Expand the Tironian et, rejoin hyphenated words across line ends,
    // then let the remaining joints become plain spaces.
    let s = cleanup.tironian_et.replace_all(joined, "et");
    let s = cleanup.hyphen_joint.replace_all(&s, "");
    let s = s.replace(LINE_JOINT, " ");

    insert_breaks(&s).split('\n').map(str::to_string).collect()
}
