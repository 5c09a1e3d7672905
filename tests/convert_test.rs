//! End-to-end conversion tests.
//!
//! Builds a small two-page ALTO document on disk, runs the offline
//! pipeline, and checks the serialized TEI for the landmarks of each
//! section: header placeholders, facsimile zones and image URIs, the
//! editorial rendering, and the standoff segments.

use std::fs;

use tempfile::TempDir;

use alto2tei::tei::{self, DocumentMetadata};
use alto2tei::{Config, Document};

const PAGE_F2: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<alto xmlns="http://www.loc.gov/standards/alto/ns-v4#">
  <Tags>
    <OtherTag ID="BT1" LABEL="MainZone:column#1"/>
    <OtherTag ID="BT2" LABEL="NumberingZone"/>
    <OtherTag ID="LT1" LABEL="HeadingLine"/>
    <OtherTag ID="LT2" LABEL="DefaultLine"/>
  </Tags>
  <Layout>
    <Page ID="p1" WIDTH="2400" HEIGHT="3600" PHYSICAL_IMG_NR="2">
      <PrintSpace HPOS="0" VPOS="0" WIDTH="2400" HEIGHT="3600">
        <TextBlock ID="tb1" HPOS="100" VPOS="200" WIDTH="1000" HEIGHT="2000" TAGREFS="BT1">
          <Shape><Polygon POINTS="100 200 1100 200 1100 2200 100 2200"/></Shape>
          <TextLine ID="tl1" HPOS="110" VPOS="210" WIDTH="980" HEIGHT="60" BASELINE="110 260 1090 260" TAGREFS="LT1">
            <Shape><Polygon POINTS="110 210 1090 210 1090 270 110 270"/></Shape>
            <String CONTENT="PROLOGUE" HPOS="110" VPOS="210" WIDTH="980" HEIGHT="60"/>
          </TextLine>
          <TextLine ID="tl2" HPOS="110" VPOS="280" WIDTH="980" HEIGHT="60" BASELINE="110 330 1090 330" TAGREFS="LT2">
            <Shape><Polygon POINTS="110 280 1090 280 1090 340 110 340"/></Shape>
            <String CONTENT="le premier chapitre com¬" HPOS="110" VPOS="280" WIDTH="980" HEIGHT="60"/>
          </TextLine>
        </TextBlock>
        <TextBlock ID="tb2" HPOS="1200" VPOS="100" WIDTH="200" HEIGHT="80" TAGREFS="BT2">
          <Shape><Polygon POINTS="1200 100 1400 100 1400 180 1200 180"/></Shape>
          <TextLine ID="tl3" HPOS="1210" VPOS="110" WIDTH="180" HEIGHT="60" BASELINE="1210 160 1390 160" TAGREFS="LT2">
            <Shape><Polygon POINTS="1210 110 1390 110 1390 170 1210 170"/></Shape>
            <String CONTENT=".ii." HPOS="1210" VPOS="110" WIDTH="180" HEIGHT="60"/>
          </TextLine>
        </TextBlock>
      </PrintSpace>
    </Page>
  </Layout>
</alto>"#;

const PAGE_F10: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<alto xmlns="http://www.loc.gov/standards/alto/ns-v4#">
  <Tags>
    <OtherTag ID="BT1" LABEL="MainZone:column#1"/>
    <OtherTag ID="LT2" LABEL="DefaultLine"/>
  </Tags>
  <Layout>
    <Page ID="p2" WIDTH="2400" HEIGHT="3600" PHYSICAL_IMG_NR="10">
      <PrintSpace HPOS="0" VPOS="0" WIDTH="2400" HEIGHT="3600">
        <TextBlock ID="tb1" HPOS="100" VPOS="200" WIDTH="1000" HEIGHT="2000" TAGREFS="BT1">
          <Shape><Polygon POINTS="100 200 1100 200 1100 2200 100 2200"/></Shape>
          <TextLine ID="tl1" HPOS="110" VPOS="210" WIDTH="980" HEIGHT="60" BASELINE="110 260 1090 260" TAGREFS="LT2">
            <Shape><Polygon POINTS="110 210 1090 210 1090 270 110 270"/></Shape>
            <String CONTENT="mence ici" HPOS="110" VPOS="210" WIDTH="980" HEIGHT="60"/>
          </TextLine>
        </TextBlock>
      </PrintSpace>
    </Page>
  </Layout>
</alto>"#;

fn convert_fixture() -> String {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("bpt6k123");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("bpt6k123_f2.xml"), PAGE_F2).unwrap();
    fs::write(dir.join("bpt6k123_f10.xml"), PAGE_F10).unwrap();

    let config = Config::default();
    let document = Document::open(&dir).unwrap();
    let root = tei::build_document(&config, &document, &DocumentMetadata::offline()).unwrap();
    tei::xml::serialize(&root)
}

#[test]
fn test_root_identity() {
    let out = convert_fixture();
    assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
    assert!(out.contains(r#"<TEI xmlns="http://www.tei-c.org/ns/1.0" xml:id="ark_12148_bpt6k123">"#));
}

#[test]
fn test_offline_header_placeholders() {
    let out = convert_fixture();
    assert!(out.contains("Digitised resource not found in BnF catalogue."));
    assert!(out.contains(r#"<measure unit="images" n="2"/>"#));
    assert!(out.contains(r#"<idno type="ark">bpt6k123</idno>"#));
}

#[test]
fn test_surfaces_in_folio_order() {
    let out = convert_fixture();
    let f2 = out.find(r#"<surface xml:id="f2""#).unwrap();
    let f10 = out.find(r#"<surface xml:id="f10""#).unwrap();
    assert!(f2 < f10);
}

#[test]
fn test_image_uris() {
    let out = convert_fixture();
    assert!(out.contains(
        r#"<graphic url="https://gallica.bnf.fr/iiif/ark:/12148/bpt6k123/f2/full/full/0/native.jpg"/>"#
    ));
    assert!(out.contains(
        "https://gallica.bnf.fr/iiif/ark:/12148/bpt6k123/f2/100,200,1000,2000/full/0/native.jpg"
    ));
}

#[test]
fn test_line_zones_numbered_across_pages() {
    let out = convert_fixture();
    // Pages contribute 3 lines, then 1; the counter runs through
    assert!(out.contains(r#"<zone xml:id="f2_z1_l1" type="HeadingLine" subtype="none" n="1""#));
    assert!(out.contains(r#"<zone xml:id="f2_z2_l1" type="DefaultLine" subtype="none" n="3""#));
    assert!(out.contains(r#"<zone xml:id="f10_z1_l1" type="DefaultLine" subtype="none" n="4""#));
}

#[test]
fn test_body_rendering() {
    let out = convert_fixture();
    assert!(out.contains(r##"<pb corresp="#f2"/>"##));
    assert!(out.contains(r##"<pb corresp="#f10"/>"##));
    assert!(out.contains(r##"<hi rend="HeadingLine"><lb corresp="#f2_z1_l1"/>PROLOGUE</hi>"##));
    assert!(out.contains(r##"<fw corresp="#f2_z2" type="NumberingZone"><lb corresp="#f2_z2_l1"/>.ii.</fw>"##));
    assert!(out.contains(r##"<lb corresp="#f10_z1_l1"/>mence ici"##));
}

#[test]
fn test_standoff_rejoins_hyphenated_text() {
    let out = convert_fixture();
    // The numbering line is not main text and the broken word rejoins
    assert!(out.contains(
        r#"<seg n="1" xml:id="s1">PROLOGUE le premier chapitre commence ici</seg>"#
    ));
    assert!(!out.contains("PROLOGUE .ii."));
}
