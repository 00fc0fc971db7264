//! Version Ordering Tests
//!
//! - Text form round-trips
//! - Comparison is numeric per segment, a strict total order
//! - Malformed text fails with FormatError
//! - Compatibility windows gate columns and tables

use std::collections::BTreeSet;

use ovsdb_txn::notation::{FormatError, Version};
use ovsdb_txn::schema::{AtomicType, ColumnSchema, ColumnType};

// =============================================================================
// Parsing
// =============================================================================

/// Display then parse gives back the same version.
#[test]
fn test_text_round_trip() {
    for (a, b, c) in [(0, 0, 0), (1, 4, 2), (7, 16, 1), (u32::MAX, 0, 10)] {
        let version = Version::new(a, b, c);
        assert_eq!(Version::parse(&version.to_string()).unwrap(), version);
    }
}

/// "1.4.2" parses to its three segments.
#[test]
fn test_parse_segments() {
    let version: Version = "1.4.2".parse().unwrap();
    assert_eq!(
        (version.major(), version.minor(), version.patch()),
        (1, 4, 2)
    );
}

/// Missing segment and non-digit are both format errors.
#[test]
fn test_malformed_text() {
    assert!(matches!(
        Version::parse("1.2"),
        Err(FormatError::MissingSeparator(_))
    ));
    assert!(matches!(
        Version::parse("1.x.2"),
        Err(FormatError::NotADigit { .. })
    ));
    assert!(Version::parse("a.b.c").is_err());
    assert!(Version::parse("1.2.").is_err());
    assert!(Version::parse(".1.2").is_err());
}

/// Text after the patch digits is ignored.
#[test]
fn test_patch_qualifier_ignored() {
    assert_eq!(Version::parse("2.5.1-beta").unwrap(), Version::new(2, 5, 1));
}

// =============================================================================
// Ordering
// =============================================================================

/// Patch segment compares numerically, not as text.
#[test]
fn test_patch_numeric_comparison() {
    let a = Version::parse("1.4.2").unwrap();
    let b = Version::parse("1.4.10").unwrap();
    assert!(a < b);
    assert!(b > a);
}

#[test]
fn test_segment_precedence() {
    let v123 = Version::new(1, 2, 3);
    let v130 = Version::new(1, 3, 0);
    let v200 = Version::new(2, 0, 0);
    assert!(v123 < v130);
    assert!(v130 < v200);
    assert!(v123 < v200);
}

/// Sorting a shuffled list gives the same order regardless of input order.
#[test]
fn test_total_order() {
    let texts = ["2.0.0", "1.10.0", "1.2.10", "1.2.9", "0.0.0", "1.2.9"];
    let sorted: Vec<String> = texts
        .iter()
        .map(|t| Version::parse(t).unwrap())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|v| v.to_string())
        .collect();
    assert_eq!(sorted, vec!["0.0.0", "1.2.9", "1.2.10", "1.10.0", "2.0.0"]);

    let mut reversed: Vec<Version> = texts.iter().rev().map(|t| t.parse().unwrap()).collect();
    reversed.sort();
    reversed.dedup();
    assert_eq!(reversed.len(), 5);
    assert!(reversed.windows(2).all(|w| w[0] < w[1]));
}

// =============================================================================
// Compatibility
// =============================================================================

#[test]
fn test_compatibility_window() {
    let from = Version::new(1, 3, 0);
    let deprecated = Some(Version::new(1, 5, 0));

    assert!(!Version::is_compatible(from, deprecated, Version::new(1, 2, 0)));
    assert!(Version::is_compatible(from, deprecated, Version::new(1, 3, 0)));
    assert!(Version::is_compatible(from, deprecated, Version::new(1, 4, 99)));
    assert!(!Version::is_compatible(from, deprecated, Version::new(1, 5, 0)));
    assert!(Version::is_compatible(from, None, Version::new(40, 0, 0)));
}

/// The null version is always valid as a starting point.
#[test]
fn test_null_from_version() {
    assert!(Version::NULL.is_null());
    assert!(Version::is_compatible(Version::NULL, None, Version::NULL));
    assert!(Version::is_compatible(Version::NULL, None, Version::new(8, 3, 0)));
}

#[test]
fn test_column_availability() {
    let column = ColumnSchema::new("protocols", ColumnType::atom(AtomicType::String))
        .with_version_range(Version::new(6, 11, 1), None);
    assert!(!column.is_available_in(Version::new(6, 10, 0)));
    assert!(column.is_available_in(Version::new(6, 11, 1)));
}
