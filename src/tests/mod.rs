mod correction_tests;
mod format_tests;
mod helpers;
mod page_range_tests;
mod pdf_tests;
mod spell_tests;
