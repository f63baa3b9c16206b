//! End-to-end runs through the public API: a scanned-page stand-in goes
//! through extraction with a substitute OCR engine, and the result is
//! rendered in each output format.

use std::path::Path;

use image::{DynamicImage, GrayImage, Luma};
use tempfile::tempdir;

use scantext::format::{render, OutputFormat};
use scantext::ocr::{OcrBackend, OcrError};
use scantext::{ExtractionOptions, Extractor, LanguageSet};

struct CannedOcr(&'static str);

impl OcrBackend for CannedOcr {
    fn name(&self) -> &'static str {
        "canned"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn recognize(&self, _image_path: &Path, _languages: &LanguageSet) -> Result<String, OcrError> {
        Ok(self.0.to_string())
    }
}

fn write_scan(path: &Path) {
    let page = GrayImage::from_fn(600, 400, |x, y| Luma([(((x + y) * 255) / 1000) as u8]));
    DynamicImage::ImageLuma8(page).save(path).unwrap();
}

#[test]
fn scanned_image_to_rendered_output() {
    let dir = tempdir().unwrap();
    let scan = dir.path().join("letter.png");
    write_scan(&scan);

    let options = ExtractionOptions {
        detect_language: false,
        correct_spelling: false,
        image_dir: Some(dir.path().to_path_buf()),
        ..ExtractionOptions::default()
    };
    let extractor = Extractor::with_backend(
        options,
        Box::new(CannedOcr("Dear committee, the annual review is attached.")),
    );

    let result = extractor.extract(&scan, "").unwrap();
    assert!(result.ocr_used);
    assert!(result.text.starts_with("--- Page 1 ---"));
    assert!(result
        .text
        .contains("Dear committee, the annual review is attached."));

    let markdown = String::from_utf8(render(&result.text, OutputFormat::Md).unwrap()).unwrap();
    assert!(markdown.contains("## Page 1"));

    let html = String::from_utf8(render(&result.text, OutputFormat::Html).unwrap()).unwrap();
    assert!(html.contains("<h2>Page 1</h2>"));

    let docx = render(&result.text, OutputFormat::Docx).unwrap();
    assert_eq!(&docx[..2], b"PK");
}

#[test]
fn metadata_reflects_the_run() {
    let dir = tempdir().unwrap();
    let scan = dir.path().join("letter.png");
    write_scan(&scan);

    let options = ExtractionOptions {
        detect_language: false,
        correct_spelling: false,
        manual_languages: Some(LanguageSet::from_codes(["eng", "spa"])),
        image_dir: Some(dir.path().to_path_buf()),
        ..ExtractionOptions::default()
    };
    let extractor = Extractor::with_backend(options, Box::new(CannedOcr("pagina uno")));

    let result = extractor.extract(&scan, "").unwrap();
    let metadata = result.metadata();
    assert_eq!(metadata.total_pages, 1);
    assert!(metadata.ocr_used);
    assert_eq!(
        metadata.languages_detected,
        vec!["eng".to_string(), "spa".to_string()]
    );

    let json = serde_json::to_string(&metadata).unwrap();
    assert!(json.contains("\"total_pages\":1"));
}
