use std::path::Path;
use std::sync::{Arc, Mutex};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::language::LanguageSet;
use crate::ocr::{OcrBackend, OcrError};

/// Build a PDF on disk with one page per entry; `Some(text)` pages carry
/// an embedded text layer, `None` pages are blank (scanned-page stand-ins).
pub fn write_test_pdf(path: &Path, pages: &[Option<&str>]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let operations = match page {
            Some(text) => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
            None => vec![],
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content stream"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    doc.save(path).expect("save test PDF");
}

/// OCR backend returning canned text, so pipeline tests run without the
/// tesseract binary.
pub struct StubOcr {
    pub text: String,
}

impl StubOcr {
    pub fn returning(text: &str) -> Box<Self> {
        Box::new(Self {
            text: text.to_string(),
        })
    }
}

impl OcrBackend for StubOcr {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn recognize(&self, _image_path: &Path, _languages: &LanguageSet) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}

/// Backend that records the bytes of every image handed to it, so tests
/// can assert on what the engine actually receives.
pub struct RecordingOcr {
    text: String,
    images: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl RecordingOcr {
    pub fn returning(text: &str) -> (Box<Self>, Arc<Mutex<Vec<Vec<u8>>>>) {
        let images = Arc::new(Mutex::new(Vec::new()));
        let backend = Box::new(Self {
            text: text.to_string(),
            images: Arc::clone(&images),
        });
        (backend, images)
    }
}

impl OcrBackend for RecordingOcr {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn recognize(&self, image_path: &Path, _languages: &LanguageSet) -> Result<String, OcrError> {
        let bytes = std::fs::read(image_path)?;
        self.images.lock().unwrap().push(bytes);
        Ok(self.text.clone())
    }
}
