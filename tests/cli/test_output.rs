//! Tests for CLI output formatting helpers
//!
//! Tests the output formatting utilities:
//! - Duration formatting (ms, s, m)
//! - Relative time formatting (just now, minutes ago, hours ago, days ago)
//! - Character-safe truncation
//! - Print helpers (print_success, print_warning, print_error)

use chrono::{Duration, Utc};
use hister::cli::output::{
    format_duration, format_relative_time, print_error, print_header, print_success,
    print_warning, truncate_chars,
};

// =============================================================================
// format_duration tests
// =============================================================================

/// Test duration formatting across units
#[test]
fn test_format_duration_units() {
    assert_eq!(format_duration(0.0), "0ms");
    assert_eq!(format_duration(0.25), "250ms");
    assert_eq!(format_duration(1.0), "1.00s");
    assert_eq!(format_duration(59.5), "59.50s");
    assert_eq!(format_duration(120.0), "2m 0.0s");
}

// =============================================================================
// format_relative_time tests
// =============================================================================

/// Test relative time formatting
#[test]
fn test_format_relative_time() {
    let now = Utc::now();

    assert_eq!(format_relative_time(now.timestamp()), "just now");
    assert_eq!(
        format_relative_time((now - Duration::minutes(5)).timestamp()),
        "5m ago"
    );
    assert_eq!(
        format_relative_time((now - Duration::hours(3)).timestamp()),
        "3h ago"
    );
    assert_eq!(
        format_relative_time((now - Duration::days(10)).timestamp()),
        "10d ago"
    );
}

/// Test timestamps that cannot be represented
#[test]
fn test_format_relative_time_out_of_range() {
    assert_eq!(format_relative_time(i64::MAX), "unknown");
}

// =============================================================================
// truncate_chars tests
// =============================================================================

/// Test truncation never splits a character
#[test]
fn test_truncate_chars_multibyte() {
    assert_eq!(truncate_chars("abcdef", 6), "abcdef");
    assert_eq!(truncate_chars("abcdefg", 6), "abc...");
    assert_eq!(truncate_chars("🦀🦀🦀🦀🦀", 4), "🦀...");
    assert_eq!(truncate_chars("", 3), "");
}

// =============================================================================
// print helper tests
// =============================================================================

/// Test print helpers do not panic
#[test]
fn test_print_helpers() {
    print_success("done");
    print_warning("careful");
    print_error("failed");
    print_header("Header");
}
