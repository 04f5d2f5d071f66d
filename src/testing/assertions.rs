//! Row assertions.

use crate::error::Result;
use crate::row::Row;
use crate::value::Value;

/// Drain a stream into a vector, returning the first error instead.
pub fn collect_rows(rows: impl IntoIterator<Item = Result<Row>>) -> Result<Vec<Row>> {
    rows.into_iter().collect()
}

/// Assert that two row lists are equal in order and content. Column order inside a row
/// is ignored.
///
/// # Panics
///
/// Panics if the lists differ in length or in any position.
pub fn assert_rows_equal(actual: &[Row], expected: &[Row]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Row count mismatch:\n  Expected: {}\n  Actual: {}\n  Expected rows: {expected:#?}\n  Actual rows: {actual:#?}",
        expected.len(),
        actual.len()
    );
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert_eq!(
            a, e,
            "Row mismatch at index {i}:\n  Expected: {e:?}\n  Actual: {a:?}"
        );
    }
}

/// Canonical form of a row for order-independent comparison.
fn canonical(row: &Row) -> Vec<(&str, &Value)> {
    let mut cells: Vec<(&str, &Value)> = row.iter().map(|(k, v)| (k.as_str(), v)).collect();
    cells.sort();
    cells
}

/// Assert that two row lists hold the same rows (with multiplicity), in any order.
///
/// # Panics
///
/// Panics listing the rows missing from `actual` and the unexpected extra rows.
pub fn assert_rows_unordered_equal(actual: &[Row], expected: &[Row]) {
    let mut a: Vec<_> = actual.iter().map(canonical).collect();
    let mut e: Vec<_> = expected.iter().map(canonical).collect();
    a.sort();
    e.sort();
    if a == e {
        return;
    }
    let missing: Vec<_> = e.iter().filter(|row| !a.contains(row)).collect();
    let extra: Vec<_> = a.iter().filter(|row| !e.contains(row)).collect();
    panic!(
        "Row content mismatch ({} actual vs {} expected):\n  Missing rows: {missing:?}\n  Extra rows: {extra:?}",
        actual.len(),
        expected.len()
    );
}
