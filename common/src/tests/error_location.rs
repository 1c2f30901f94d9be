use crate::ErrorLocation;
use std::panic::Location;

/// **VALUE**: Verifies that `ErrorLocation::from()` captures file, line, and column.
///
/// **WHY THIS MATTERS**: Every error variant in the workspace carries an ErrorLocation. If it
/// stops capturing accurate positions, every logged failure loses its debugging value.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - `Location::caller()` stops being propagated correctly
/// - File path extraction breaks
/// - Line/column capture fails
#[test]
fn given_location_caller_when_error_location_created_then_captures_file_line_column() {
    // GIVEN: The current position in this file
    let expected_line = line!() + 3;

    // WHEN: Creating ErrorLocation from caller
    let location = ErrorLocation::from(Location::caller());

    // THEN: Should capture file, line, and column
    assert!(
        location.file.contains("error_location.rs"),
        "Should capture file path"
    );
    assert_eq!(location.line, expected_line, "Should capture correct line number");
    assert!(location.column > 0, "Should capture column number");
}

/// **VALUE**: Verifies that ErrorLocation Display produces the bracketed `[file:line:column]` form.
///
/// **WHY THIS MATTERS**: Error messages end with this suffix in logs and user notices. If the
/// format changes, log scraping and manual triage both get harder.
///
/// **BUG THIS CATCHES**: Would catch if the Display implementation drops brackets or fields.
#[test]
fn given_error_location_when_formatted_then_produces_bracketed_format() {
    // GIVEN: An ErrorLocation
    let location = ErrorLocation::from(Location::caller());

    // WHEN: Formatting as string
    let formatted = format!("{location}");

    // THEN: Should produce "[file:line:column]"
    assert!(formatted.starts_with('['), "Should start with '['");
    assert!(formatted.ends_with(']'), "Should end with ']'");
    assert!(formatted.contains(&location.line.to_string()));
    assert!(formatted.contains(&location.column.to_string()));
    assert_eq!(formatted.matches(':').count(), 2, "Should have exactly 2 colons");
}

/// **VALUE**: Verifies that `#[track_caller]` helpers report their caller's line.
///
/// **WHY THIS MATTERS**: Error constructors are `#[track_caller]` so the location points at the
/// failing call site. Without propagation every error would point at the constructor.
///
/// **BUG THIS CATCHES**: Would catch if `#[track_caller]` is removed from a helper chain.
#[test]
fn given_multiple_call_sites_when_capturing_location_then_each_has_unique_line() {
    // GIVEN: A helper function that captures location
    #[track_caller]
    fn capture_location() -> ErrorLocation {
        ErrorLocation::from(Location::caller())
    }

    // WHEN: Capturing location from different call sites
    let first = capture_location();
    let second = capture_location();

    // THEN: Same file, consecutive lines
    assert_eq!(first.file, second.file, "Should have same file");
    assert_eq!(first.line + 1, second.line, "Lines should be sequential");
}
