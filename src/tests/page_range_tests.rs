use std::collections::BTreeSet;

use crate::page_range::{parse_page_range, PageRangeError};

fn set(indices: &[usize]) -> BTreeSet<usize> {
    indices.iter().copied().collect()
}

#[test]
fn range_and_single_pages_are_zero_based_and_sorted() {
    let pages = parse_page_range("1-3,5", Some(10)).unwrap();
    assert_eq!(pages, set(&[0, 1, 2, 4]));
}

#[test]
fn empty_expression_means_all_pages() {
    let pages = parse_page_range("", Some(5)).unwrap();
    assert_eq!(pages, set(&[0, 1, 2, 3, 4]));
    let pages = parse_page_range("   ", Some(3)).unwrap();
    assert_eq!(pages, set(&[0, 1, 2]));
}

#[test]
fn empty_expression_without_total_defers_to_caller() {
    let pages = parse_page_range("", None).unwrap();
    assert!(pages.is_empty());
}

#[test]
fn unknown_total_leaves_bounds_unclamped() {
    let pages = parse_page_range("1-3,5", None).unwrap();
    assert_eq!(pages, set(&[0, 1, 2, 4]));
}

#[test]
fn out_of_bounds_single_pages_are_dropped_silently() {
    let pages = parse_page_range("2,99", Some(5)).unwrap();
    assert_eq!(pages, set(&[1]));

    // A lone out-of-range token yields an empty selection, not an error.
    let pages = parse_page_range("99", Some(5)).unwrap();
    assert!(pages.is_empty());
}

#[test]
fn range_end_is_clamped_to_total() {
    let pages = parse_page_range("3-99", Some(5)).unwrap();
    assert_eq!(pages, set(&[2, 3, 4]));
}

#[test]
fn duplicates_collapse() {
    let pages = parse_page_range("1,1,1-2,2", Some(10)).unwrap();
    assert_eq!(pages, set(&[0, 1]));
}

#[test]
fn whitespace_inside_expression_is_ignored() {
    let pages = parse_page_range(" 1 - 3 , 5 ", Some(10)).unwrap();
    assert_eq!(pages, set(&[0, 1, 2, 4]));
}

#[test]
fn malformed_token_is_an_error_naming_the_token() {
    let err = parse_page_range("1,abc", Some(10)).unwrap_err();
    match err {
        PageRangeError::MalformedToken(token) => assert_eq!(token, "abc"),
    }
}

#[test]
fn parsing_is_idempotent_over_reserialization() {
    let first = parse_page_range("1-3,5", Some(10)).unwrap();
    let reserialized: Vec<String> = first.iter().map(|i| (i + 1).to_string()).collect();
    let second = parse_page_range(&reserialized.join(","), Some(10)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn page_zero_is_dropped() {
    let pages = parse_page_range("0,2", Some(5)).unwrap();
    assert_eq!(pages, set(&[1]));
}
