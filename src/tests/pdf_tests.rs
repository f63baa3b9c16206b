use tempfile::tempdir;

use crate::pdf::find_page_image;

#[test]
fn page_image_lookup_uses_the_document_page_count_width() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("page-00042.png"), b"png").unwrap();

    let found = find_page_image(dir.path(), 42, 12000).unwrap();
    assert_eq!(found, dir.path().join("page-00042.png"));
}

#[test]
fn page_image_lookup_still_probes_small_widths() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("page-3.png"), b"png").unwrap();

    // A build that doesn't pad is still found for a multi-digit total.
    let found = find_page_image(dir.path(), 3, 500).unwrap();
    assert_eq!(found, dir.path().join("page-3.png"));
}

#[test]
fn missing_page_image_is_reported_as_absent() {
    let dir = tempdir().unwrap();
    assert!(find_page_image(dir.path(), 7, 10).is_none());
}
