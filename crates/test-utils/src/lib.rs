//! Shared test utilities for the geo-metadata workspace.
//!
//! This crate provides:
//! - Complete sample documents for every supported format
//! - Lookup of optional real-world captures
//! - Approximate float assertions for coordinates and extents
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! ```ignore
//! use test_utils::{documents, require_test_document};
//! ```

pub mod fixtures;
pub mod paths;

pub use fixtures::*;
pub use paths::*;

/// Macro to skip a test if a captured document is not available.
///
/// Evaluates to the document contents as a `String`.
///
/// ```ignore
/// use test_utils::require_test_document;
///
/// #[test]
/// fn test_real_capabilities() {
///     let xml = require_test_document!("geoserver_capabilities_130.xml");
///     // Test code using xml...
/// }
/// ```
#[macro_export]
macro_rules! require_test_document {
    ($name:expr) => {{
        match $crate::read_test_document($name) {
            Some(contents) => contents,
            None => {
                eprintln!(
                    "SKIPPED: Test document '{}' not found. Capture it or set TEST_DATA_DIR.",
                    $name
                );
                return;
            }
        }
    }};
}

/// Macro for approximate floating-point equality assertions.
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro for approximate equality of coordinate pairs.
///
/// ```ignore
/// use test_utils::assert_coords_approx_eq;
///
/// assert_coords_approx_eq!((1.0001, 2.0001), (1.0, 2.0), 0.001);
/// ```
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($x1:expr, $y1:expr), ($x2:expr, $y2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($x1, $x2, $epsilon);
        $crate::assert_approx_eq!($y1, $y2, $epsilon);
    }};
}

/// Macro for approximate equality of `(west, south, east, north)` tuples.
///
/// ```ignore
/// use test_utils::assert_extent_approx_eq;
///
/// assert_extent_approx_eq!(bbox.to_tuple(), (8.97, 47.27, 13.84, 50.56), 1e-9);
/// ```
#[macro_export]
macro_rules! assert_extent_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (w1, s1, e1, n1) = $left;
        let (w2, s2, e2, n2) = $right;
        $crate::assert_coords_approx_eq!((w1, s1), (w2, s2), $epsilon);
        $crate::assert_coords_approx_eq!((e1, n1), (e2, n2), $epsilon);
    }};
}
