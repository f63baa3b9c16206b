use std::io::{Cursor, Read};

use crate::format::{render, OutputFormat};

const SAMPLE: &str = "--- Page 1 ---\nfirst page body\n\n--- Page 2 ---\nsecond page <b>body</b>";

#[test]
fn txt_is_a_byte_for_byte_passthrough() {
    let bytes = render(SAMPLE, OutputFormat::Txt).unwrap();
    assert_eq!(bytes, SAMPLE.as_bytes());
}

#[test]
fn markdown_turns_page_markers_into_headings() {
    let bytes = render(SAMPLE, OutputFormat::Md).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("## Page 1"));
    assert!(text.contains("## Page 2"));
    assert!(text.contains("first page body"));
    assert!(!text.contains("--- Page"));
}

#[test]
fn html_escapes_body_text_and_headlines_pages() {
    let bytes = render(SAMPLE, OutputFormat::Html).unwrap();
    let html = String::from_utf8(bytes).unwrap();
    assert!(html.contains("<h2>Page 1</h2>"));
    assert!(html.contains("&lt;b&gt;body&lt;/b&gt;"));
    assert!(!html.contains("<b>body</b>"));
    assert!(html.starts_with("<!DOCTYPE html>"));
}

#[test]
fn docx_is_a_zip_package_with_a_document_part() {
    let bytes = render(SAMPLE, OutputFormat::Docx).unwrap();
    assert_eq!(&bytes[..2], b"PK");

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut document = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut document)
        .unwrap();
    assert!(document.contains("<w:document"));
    assert!(document.contains("first page body"));
    assert!(document.contains("second page &lt;b&gt;body&lt;/b&gt;"));
}

#[test]
fn format_extensions_match_the_variant() {
    assert_eq!(OutputFormat::Txt.extension(), "txt");
    assert_eq!(OutputFormat::Md.extension(), "md");
    assert_eq!(OutputFormat::Html.extension(), "html");
    assert_eq!(OutputFormat::Docx.extension(), "docx");
}
