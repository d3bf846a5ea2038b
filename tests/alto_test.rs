//! Integration tests for ALTO decoding.

use unocr::{
    parse_page_str, parse_str, parse_str_with_options, BoundingBox, Error, LineItem, OcrFormat,
    Page, ParseOptions, Point, Size,
};

fn alto(layout: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <alto xmlns=\"http://www.loc.gov/standards/alto/ns-v4#\">\
         <Description><MeasurementUnit>pixel</MeasurementUnit></Description>\
         <Layout>{}</Layout></alto>",
        layout
    )
}

fn page(layout: &str) -> Page {
    parse_page_str(&alto(layout), OcrFormat::Alto).unwrap()
}

fn word(content: &str, x: u32) -> String {
    format!(
        "<String CONTENT='{}' HPOS='{}' VPOS='10' WIDTH='40' HEIGHT='20'/>",
        content, x
    )
}

fn single_line(children: &str) -> String {
    format!(
        "<Page WIDTH='1000' HEIGHT='800'><PrintSpace>\
         <TextBlock HPOS='0' VPOS='0' WIDTH='1000' HEIGHT='100'>\
         <TextLine HPOS='0' VPOS='10' WIDTH='1000' HEIGHT='20'>{}</TextLine>\
         </TextBlock></PrintSpace></Page>",
        children
    )
}

#[test]
fn test_implicit_spacing() {
    let children = [word("one", 0), word("two", 50), word("three", 100), word("four", 150)].concat();
    let page = page(&single_line(&children));
    let line = page.lines()[0];

    let spaces = line.children.iter().filter(|c| c.is_whitespace()).count();
    assert_eq!(spaces, 3);
    assert!(matches!(line.children.last(), Some(LineItem::Word(_))));
    assert_eq!(page.text(), "one two three four");
}

#[test]
fn test_explicit_spaces_are_kept() {
    let children = format!("{}<SP HPOS='45' VPOS='10' WIDTH='5'/>{}", word("a", 0), word("b", 50));
    let page = page(&single_line(&children));
    let line = page.lines()[0];
    assert_eq!(line.children.len(), 3);
    assert_eq!(line.text(), "a b");
}

#[test]
fn test_word_attributes() {
    let children = "<String ID='w1' CONTENT='Tag' HPOS='1' VPOS='2' WIDTH='3' HEIGHT='4' WC='0.87'>\
                    <ALTERNATIVE>Tog</ALTERNATIVE><ALTERNATIVE>Taq</ALTERNATIVE></String>";
    let page = page(&single_line(children));
    let word = page.words()[0];

    assert_eq!(word.text, "Tag");
    assert_eq!(word.bbox, BoundingBox::new(1.0, 2.0, 3.0, 4.0));
    assert_eq!(word.confidence, Some(0.87));
    let choices: Vec<&str> = word.choices.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(choices, vec!["Tog", "Taq"]);
    assert!(word.choices.iter().all(|c| c.probability.is_none()));
    assert!(page.features.confidence);
    assert!(page.features.alternatives);
}

#[test]
fn test_hyphenation_across_lines() {
    let layout = "<Page WIDTH='1000' HEIGHT='800'>\
        <TextBlock HPOS='0' VPOS='0' WIDTH='1000' HEIGHT='100'>\
        <TextLine HPOS='0' VPOS='0' WIDTH='1000' HEIGHT='20'>\
        <String CONTENT='Hello' HPOS='0' VPOS='0' WIDTH='40' HEIGHT='20'/><SP/>\
        <String CONTENT='won' SUBS_TYPE='HypPart1' SUBS_CONTENT='wonderful' HPOS='50' VPOS='0' WIDTH='40' HEIGHT='20'/>\
        <HYP CONTENT='-'/></TextLine>\
        <TextLine HPOS='0' VPOS='30' WIDTH='1000' HEIGHT='20'>\
        <String CONTENT='derful' SUBS_TYPE='HypPart2' SUBS_CONTENT='wonderful' HPOS='0' VPOS='30' WIDTH='40' HEIGHT='20'/><SP/>\
        <String CONTENT='world' HPOS='50' VPOS='30' WIDTH='40' HEIGHT='20'/>\
        </TextLine></TextBlock></Page>";
    let page = page(layout);
    let words = page.words();
    assert!(words[1].hyphen_start);
    assert!(!words[2].hyphen_start);
    assert_eq!(page.text(), "Hello wonderful world");
    assert!(page.features.hyphenation);
}

#[test]
fn test_shape_and_attributes_agree() {
    let children = "<String CONTENT='box' HPOS='10' VPOS='10' WIDTH='40' HEIGHT='20'>\
                    <Shape><Polygon POINTS='10,10 50,10 50,30 10,30'/></Shape></String>\
                    <String CONTENT='shape'>\
                    <Shape><Polygon POINTS='60 10 100 12 98 30 60 28'/></Shape></String>";
    let page = page(&single_line(children));
    let words = page.words();

    let from_shape = BoundingBox::from_polygon(words[0].polygon.as_ref().unwrap()).unwrap();
    assert_eq!(words[0].bbox, from_shape);
    assert_eq!(words[1].bbox, BoundingBox::new(60.0, 10.0, 40.0, 20.0));
    assert!(page.features.polygons);
}

#[test]
fn test_missing_geometry_is_fatal() {
    let input = alto(&single_line("<String CONTENT='lost'/>"));
    let err = parse_str(&input, OcrFormat::Alto).unwrap_err();
    assert!(matches!(err, Error::MissingGeometry { ref element, .. } if element == "String"));
}

#[test]
fn test_missing_content_is_fatal() {
    let input = alto(&single_line("<String HPOS='0' VPOS='0' WIDTH='1' HEIGHT='1'/>"));
    let err = parse_str(&input, OcrFormat::Alto).unwrap_err();
    assert!(matches!(err, Error::MissingContent { .. }));
}

#[test]
fn test_baseline_single_value() {
    let layout = "<Page WIDTH='1000' HEIGHT='800'>\
        <TextBlock HPOS='0' VPOS='0' WIDTH='1000' HEIGHT='100'>\
        <TextLine HPOS='100' VPOS='10' WIDTH='500' HEIGHT='20' BASELINE='26'>\
        <String CONTENT='x' HPOS='100' VPOS='10' WIDTH='10' HEIGHT='20'/>\
        </TextLine></TextBlock></Page>";
    let page = page(layout);
    assert_eq!(
        page.lines()[0].baseline,
        Some(vec![Point::new(100.0, 26.0), Point::new(600.0, 26.0)])
    );
    assert!(page.features.baselines);
}

#[test]
fn test_reference_size_scales_everything() {
    let input = alto(&single_line(&word("big", 100)));
    let options = ParseOptions::new(OcrFormat::Alto).with_reference_sizes(vec![Size::new(500.0, 400.0)]);
    let pages = parse_str_with_options(&input, options).unwrap();
    assert_eq!(pages[0].dimensions(), (500.0, 400.0));
    assert_eq!(pages[0].words()[0].bbox, BoundingBox::new(50.0, 5.0, 20.0, 10.0));
}

#[test]
fn test_reference_size_equal_to_native_is_identity() {
    let input = alto(&single_line(&[word("a", 0), word("b", 50)].concat()));
    let plain = parse_str(&input, OcrFormat::Alto).unwrap();
    let options = ParseOptions::new(OcrFormat::Alto).with_reference_sizes(vec![Size::new(1000.0, 800.0)]);
    let scaled = parse_str_with_options(&input, options).unwrap();
    assert_eq!(plain, scaled);
}

#[test]
fn test_mm10_needs_reference_size() {
    let input = "<alto><Description><MeasurementUnit>mm10</MeasurementUnit></Description>\
                 <Layout><Page WIDTH='2100' HEIGHT='2970'/></Layout></alto>";
    let err = parse_str(input, OcrFormat::Alto).unwrap_err();
    assert!(matches!(err, Error::MissingReferenceSize { .. }));

    let options = ParseOptions::new(OcrFormat::Alto).with_reference_sizes(vec![Size::new(2480.0, 3508.0)]);
    let pages = parse_str_with_options(input, options).unwrap();
    assert!((pages[0].bbox.width - 2480.0).abs() < 1e-9);
}

#[test]
fn test_namespace_prefixes() {
    let input = "<a:alto xmlns:a='http://www.loc.gov/standards/alto/ns-v3#'><a:Layout>\
                 <a:Page WIDTH='10' HEIGHT='10'><a:TextBlock HPOS='0' VPOS='0' WIDTH='10' HEIGHT='10'>\
                 <a:TextLine HPOS='0' VPOS='0' WIDTH='10' HEIGHT='10'>\
                 <a:String CONTENT='ns' HPOS='0' VPOS='0' WIDTH='10' HEIGHT='10'/>\
                 </a:TextLine></a:TextBlock></a:Page></a:Layout></a:alto>";
    let page = parse_page_str(input, OcrFormat::Alto).unwrap();
    assert_eq!(page.text(), "ns");
}

#[test]
fn test_unknown_elements_are_skipped() {
    let layout = "<Page WIDTH='100' HEIGHT='100'>\
        <TextBlock HPOS='0' VPOS='0' WIDTH='100' HEIGHT='50'>\
        <TextLine HPOS='0' VPOS='0' WIDTH='100' HEIGHT='10'>\
        <Glyph CONTENT='?'><Variant/></Glyph>\
        <String CONTENT='fine' HPOS='0' VPOS='0' WIDTH='10' HEIGHT='10'/>\
        </TextLine><Unknown><TextLine/></Unknown></TextBlock>\
        <GraphicalElement HPOS='0' VPOS='60' WIDTH='10' HEIGHT='10'/>\
        </Page>";
    let page = page(layout);
    assert_eq!(page.lines().len(), 1);
    assert_eq!(page.text(), "fine");
}

#[test]
fn test_page_metadata() {
    let input = "<alto><Description>\
        <MeasurementUnit>pixel</MeasurementUnit>\
        <sourceImageInformation>\
        <fileName>/scans/0001.tif</fileName>\
        <documentIdentifier documentIdentifierLocation='ark'>book-42</documentIdentifier>\
        </sourceImageInformation></Description><Layout>\
        <Page ID='P1' PHYSICAL_IMG_NR='1' PRINTED_IMG_NR='xii' WIDTH='10' HEIGHT='10'/>\
        <Page ID='P2' PHYSICAL_IMG_NR='2' WIDTH='10' HEIGHT='10'/>\
        </Layout></alto>";
    let pages = parse_str(input, OcrFormat::Alto).unwrap();
    assert_eq!(pages.len(), 2);

    let source = pages[0].image_source.as_ref().unwrap();
    assert_eq!(source.file_name.as_deref(), Some("/scans/0001.tif"));
    assert_eq!(source.document_id.as_deref(), Some("ark:book-42"));
    assert_eq!(pages[0].logical_number.as_deref(), Some("xii"));
    assert_eq!(pages[0].id.as_deref(), Some("P1"));

    assert!(pages[1].image_source.is_none());
    assert_eq!(pages[1].physical_number, Some(2));
}

#[test]
fn test_blocks_join_with_newline() {
    let layout = "<Page WIDTH='100' HEIGHT='100'>\
        <TextBlock HPOS='0' VPOS='0' WIDTH='100' HEIGHT='20'>\
        <TextLine HPOS='0' VPOS='0' WIDTH='100' HEIGHT='10'><String CONTENT='first' HPOS='0' VPOS='0' WIDTH='10' HEIGHT='10'/></TextLine>\
        <TextLine HPOS='0' VPOS='10' WIDTH='100' HEIGHT='10'><String CONTENT='block' HPOS='0' VPOS='10' WIDTH='10' HEIGHT='10'/></TextLine>\
        </TextBlock>\
        <TextBlock HPOS='0' VPOS='50' WIDTH='100' HEIGHT='10'>\
        <TextLine HPOS='0' VPOS='50' WIDTH='100' HEIGHT='10'><String CONTENT='second' HPOS='0' VPOS='50' WIDTH='10' HEIGHT='10'/></TextLine>\
        </TextBlock></Page>";
    let page = page(layout);
    assert_eq!(page.blocks().len(), 2);
    assert!(page.paragraphs().is_empty());
    assert_eq!(page.text(), "first block\nsecond");
}
