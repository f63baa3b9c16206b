//! Output rendering. Format selection is a closed variant type resolved
//! at the boundary; the extraction core only ever produces the plain
//! page-marked text.

use std::io::{Cursor, Write};
use std::sync::OnceLock;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer as XmlWriter;
use regex::Regex;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Failed to build DOCX package: {0}")]
    Docx(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Txt,
    #[value(alias = "markdown")]
    Md,
    Html,
    Docx,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Md => "md",
            OutputFormat::Html => "html",
            OutputFormat::Docx => "docx",
        }
    }
}

fn page_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^--- Page (\d+) ---$").expect("valid marker regex"))
}

/// Render extracted text into the requested format.
pub fn render(text: &str, format: OutputFormat) -> Result<Vec<u8>, FormatError> {
    match format {
        OutputFormat::Txt => Ok(text.as_bytes().to_vec()),
        OutputFormat::Md => Ok(to_markdown(text).into_bytes()),
        OutputFormat::Html => Ok(to_html(text).into_bytes()),
        OutputFormat::Docx => to_docx(text),
    }
}

/// Page markers become second-level headings; everything else passes
/// through untouched.
fn to_markdown(text: &str) -> String {
    text.lines()
        .map(|line| match page_marker_regex().captures(line) {
            Some(caps) => format!("## Page {}", &caps[1]),
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn to_html(text: &str) -> String {
    let mut body = String::new();
    for line in text.lines() {
        if let Some(caps) = page_marker_regex().captures(line) {
            body.push_str(&format!("  <h2>Page {}</h2>\n", &caps[1]));
        } else if line.trim().is_empty() {
            continue;
        } else {
            body.push_str(&format!(
                "  <p>{}</p>\n",
                quick_xml::escape::escape(line)
            ));
        }
    }
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"></head>\n<body>\n{body}</body>\n</html>\n"
    )
}

const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Minimal WordprocessingML package: content types, package relationships,
/// and one document part with a paragraph per line.
fn to_docx(text: &str) -> Result<Vec<u8>, FormatError> {
    let document_xml = document_part(text).map_err(|e| FormatError::Docx(e.to_string()))?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    let content_types = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

    let rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

    let write = |zip: &mut ZipWriter<Cursor<Vec<u8>>>,
                 name: &str,
                 data: &[u8]|
     -> Result<(), FormatError> {
        zip.start_file(name, options)
            .map_err(|e| FormatError::Docx(e.to_string()))?;
        zip.write_all(data)
            .map_err(|e| FormatError::Docx(e.to_string()))?;
        Ok(())
    };

    write(&mut zip, "[Content_Types].xml", content_types.as_bytes())?;
    write(&mut zip, "_rels/.rels", rels.as_bytes())?;
    write(&mut zip, "word/document.xml", &document_xml)?;

    let cursor = zip
        .finish()
        .map_err(|e| FormatError::Docx(e.to_string()))?;
    Ok(cursor.into_inner())
}

fn document_part(text: &str) -> Result<Vec<u8>, quick_xml::Error> {
    let mut writer = XmlWriter::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut document = BytesStart::new("w:document");
    document.push_attribute(("xmlns:w", WORDML_NS));
    writer.write_event(Event::Start(document))?;
    writer.write_event(Event::Start(BytesStart::new("w:body")))?;

    for line in text.lines() {
        writer.write_event(Event::Start(BytesStart::new("w:p")))?;
        if !line.is_empty() {
            writer.write_event(Event::Start(BytesStart::new("w:r")))?;
            let mut text_el = BytesStart::new("w:t");
            text_el.push_attribute(("xml:space", "preserve"));
            writer.write_event(Event::Start(text_el))?;
            writer.write_event(Event::Text(BytesText::new(line)))?;
            writer.write_event(Event::End(BytesEnd::new("w:t")))?;
            writer.write_event(Event::End(BytesEnd::new("w:r")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("w:body")))?;
    writer.write_event(Event::End(BytesEnd::new("w:document")))?;
    Ok(writer.into_inner().into_inner())
}
