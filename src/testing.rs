//! Helpers for testing graphs.
//!
//! - [`row!`](crate::row) builds a row from `column => value` pairs
//! - [`collect_rows`] drains a stream, surfacing the first error
//! - [`assert_rows_equal`] and [`assert_rows_unordered_equal`] compare results with a
//!   readable diff
//! - [`assert_approx_eq!`](crate::assert_approx_eq) compares floats with a tolerance
//! - [`fixtures`] holds small corpora shared by the pipeline tests
//!
//! ```
//! use rowgraph::testing::*;
//! use rowgraph::{Bindings, Graph, row};
//!
//! # fn main() -> rowgraph::Result<()> {
//! let rows = vec![row! { "a" => 2 }, row! { "a" => 1 }];
//! let sorted = Graph::from_source("xs").sort(&["a"]);
//! let out = collect_rows(sorted.run(&Bindings::new().bind_rows("xs", rows))?)?;
//! assert_rows_equal(&out, &[row! { "a" => 1 }, row! { "a" => 2 }]);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod fixtures;

pub use assertions::{assert_rows_equal, assert_rows_unordered_equal, collect_rows};

/// Build a [`Row`](crate::Row) from `column => value` pairs, keeping their order.
///
/// ```
/// let r = rowgraph::row! { "text" => "a", "count" => 2 };
/// assert_eq!(r.columns().collect::<Vec<_>>(), vec!["text", "count"]);
/// ```
#[macro_export]
macro_rules! row {
    () => {
        $crate::Row::new()
    };
    ($($column:expr => $value:expr),+ $(,)?) => {
        $crate::Row::new()$(.with($column, $value))+
    };
}

/// Check that a floating-point value is within a tolerance (default `1e-10`).
///
/// ```
/// rowgraph::assert_approx_eq!(0.1 + 0.2, 0.3);
/// rowgraph::assert_approx_eq!(1.0, 1.05, 0.1);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($actual:expr, $expected:expr) => {
        $crate::assert_approx_eq!($actual, $expected, 1e-10)
    };
    ($actual:expr, $expected:expr, $epsilon:expr) => {{
        let actual: f64 = $actual;
        let expected: f64 = $expected;
        let epsilon: f64 = $epsilon;
        let diff = (actual - expected).abs();
        assert!(
            diff <= epsilon,
            "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}`,\n   eps: `{:?}`",
            actual,
            expected,
            diff,
            epsilon
        );
    }};
}
