// Unit tests for error module
// Tests the mapping from failures to process exit codes

use crate::error::DesktopError;
use crate::{EXIT_UNSUPPORTED_OS, EXIT_WORKER_FAILED};

use bus_core::error::CoreError;
use bus_core::error::spawn::SpawnError;
use common::ErrorLocation;

use std::panic::Location;
use std::path::PathBuf;

/// **VALUE**: Tests that an unsupported OS exits with `-1`.
///
/// **WHY THIS MATTERS**: Installers and autostart scripts tell "too old" apart from
/// "player broken" by exit code alone.
///
/// **BUG THIS CATCHES**: Would catch the catch-all arm swallowing `UnsupportedOs`.
#[test]
fn given_unsupported_os_error_when_mapping_exit_code_then_minus_one() {
    // GIVEN: An UnsupportedOs error
    let err = DesktopError::UnsupportedOs {
        message: String::from("Windows Vista"),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN / THEN
    assert_eq!(err.exit_code(), EXIT_UNSUPPORTED_OS);
    assert_eq!(err.exit_code(), -1);
}

/// **VALUE**: Tests that worker and core failures exit with `-2`.
///
/// **WHY THIS MATTERS**: A missing player binary surfaces as a `CoreError` from spawn,
/// and must report the same code as a player that never connects.
///
/// **BUG THIS CATCHES**: Would catch a new variant being mapped to success.
#[test]
fn given_worker_or_core_error_when_mapping_exit_code_then_minus_two() {
    // GIVEN: A worker error and a wrapped spawn error
    let worker = DesktopError::Worker {
        message: String::from("no connection"),
        location: ErrorLocation::from(Location::caller()),
    };
    let core = DesktopError::from(CoreError::from(SpawnError::NotFound {
        path: PathBuf::from("player"),
        location: ErrorLocation::from(Location::caller()),
    }));

    // WHEN / THEN
    assert_eq!(worker.exit_code(), EXIT_WORKER_FAILED);
    assert_eq!(core.exit_code(), -2);
}

/// **VALUE**: Tests that wrapped core errors keep their own message.
///
/// **WHY THIS MATTERS**: The transparent wrapper is the only text the user sees when
/// startup fails; it has to name the real cause.
///
/// **BUG THIS CATCHES**: Would catch removing `#[error(transparent)]`.
#[test]
fn given_core_error_when_displayed_then_shows_inner_message() {
    // GIVEN: A spawn error wrapped twice
    let err = DesktopError::from(CoreError::from(SpawnError::NotFound {
        path: PathBuf::from("/opt/dd/player-missing"),
        location: ErrorLocation::from(Location::caller()),
    }));

    // WHEN
    let text = err.to_string();

    // THEN
    assert!(text.contains("player-missing"), "got: {text}");
}
