//! Helpers shared by the integration tests

#![allow(dead_code)]

use fitsheet::prelude::*;

pub fn pos(s: &str) -> CellPosition {
    CellPosition::parse(s).unwrap()
}

/// Set several cells, panicking on the first rejected one
pub fn fill(sheet: &mut Sheet, cells: &[(&str, &str)]) {
    for (id, contents) in cells {
        sheet
            .set_cell(&pos(id), contents)
            .unwrap_or_else(|e| panic!("set {} to {:?}: {}", id, contents, e));
    }
}

/// Whether `value` is a number within a relative tolerance of `expected`
pub fn value_matches(value: &CellValue, expected: f64) -> bool {
    match value.as_number() {
        Some(n) => (n - expected).abs() <= 1e-9 * expected.abs().max(1.0),
        None => false,
    }
}

pub fn assert_number(sheet: &Sheet, id: &str, expected: f64) {
    let value = sheet.get_value(&pos(id));
    assert!(
        value_matches(&value, expected),
        "{}: expected {}, got {:?}",
        id,
        expected,
        value
    );
}

pub fn assert_empty(sheet: &Sheet, id: &str) {
    let value = sheet.get_value(&pos(id));
    assert!(value.is_empty(), "{}: expected empty, got {:?}", id, value);
}
