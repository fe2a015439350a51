use std::io::{self, Cursor, Read, Seek, SeekFrom};

use xens::{Document, Error, Namespaces, Result};

/// A readable source that refuses to rewind, like a network stream.
struct OneShot<'a> {
    cursor: Cursor<&'a str>,
}

impl<'a> OneShot<'a> {
    fn new(text: &'a str) -> OneShot<'a> {
        OneShot {
            cursor: Cursor::new(text),
        }
    }
}

impl Read for OneShot<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Seek for OneShot<'_> {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "this source cannot seek",
        ))
    }
}

#[test]
fn test_parse_captures_declarations() -> Result<()> {
    let document = Document::from_text(
        r#"<root xmlns="urn:d" xmlns:a="urn:a"><leaf xmlns:b="urn:b"/></root>"#,
    )?;

    let namespaces = document.namespaces();
    assert_eq!(namespaces.by_prefix("a"), Some("urn:a"));
    assert_eq!(namespaces.by_prefix("b"), Some("urn:b"));
    assert_eq!(namespaces.default_uri(), Some("urn:d"));
    assert_eq!(namespaces.len(), 3);
    Ok(())
}

#[test]
fn test_parse_reader_matches_from_text() -> Result<()> {
    let text = r#"<root xmlns:x="urn:x"><x:item id="1"/></root>"#;
    let from_reader = Document::parse(Cursor::new(text))?;
    let from_text = Document::from_text(text)?;

    assert_eq!(
        from_reader.namespaces().by_prefix("x"),
        from_text.namespaces().by_prefix("x")
    );
    assert_eq!(
        from_reader.findall(".//x:item")?.len(),
        from_text.findall(".//x:item")?.len()
    );
    Ok(())
}

#[test]
fn test_each_parse_gets_its_own_table() -> Result<()> {
    let text = r#"<root xmlns:x="urn:x"/>"#;
    let first = Document::from_text(text)?;
    let second = Document::from_text(text)?;

    assert!(!std::ptr::eq(first.namespaces(), second.namespaces()));
    Ok(())
}

#[test]
fn test_source_that_cannot_rewind() {
    let result = Document::parse(OneShot::new("<root/>"));
    assert!(matches!(result, Err(Error::Rewind(_))));
}

#[test]
fn test_unclosed_element_rejected() {
    let result = Document::from_text("<root><child></child>");
    assert!(matches!(result, Err(Error::UnclosedElement)));
}

#[test]
fn test_mismatched_end_tag_rejected() {
    let result = Document::from_text("<root></box>");
    assert!(result.is_err());
}

#[test]
fn test_empty_input_rejected() {
    let result = Document::from_text("");
    assert!(matches!(result, Err(Error::NoElement)));
}

#[test]
fn test_input_without_element_rejected() {
    let result = Document::from_text("<?xml version=\"1.0\"?><!-- empty -->");
    assert!(matches!(result, Err(Error::NoElement)));
}

#[test]
fn test_invalid_utf8_rejected() {
    let bytes: &[u8] = b"<root xmlns:a=\"urn:\xff\"/>";
    let result = Document::parse(Cursor::new(bytes));
    assert!(result.is_err());
}

#[test]
fn test_prolog_and_comments_are_skipped() -> Result<()> {
    let document = Document::from_text(
        "<?xml version=\"1.0\"?><!-- prolog --><root xmlns:x=\"urn:x\"/>",
    )?;
    assert_eq!(document.namespaces().by_prefix("x"), Some("urn:x"));
    Ok(())
}

#[test]
fn test_namespaces_scan_alone() -> Result<()> {
    // the table can be built without the tree pass
    let namespaces =
        Namespaces::from_text(r#"<root xmlns:x="urn:x"><x:item/></root>"#)?;
    assert_eq!(namespaces.by_prefix("x"), Some("urn:x"));
    assert!(namespaces.contains_prefix("x"));
    assert!(!namespaces.contains_prefix("y"));
    Ok(())
}

#[test]
fn test_document_debug_shows_table() -> Result<()> {
    let document = Document::from_text(r#"<root xmlns:x="urn:x"/>"#)?;
    let rendered = format!("{document:?}");
    assert!(rendered.starts_with("Document"));
    assert!(rendered.contains("urn:x"));
    Ok(())
}
