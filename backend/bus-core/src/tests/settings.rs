use crate::error::settings::SettingsError;
use crate::settings::{SettingKey, SettingsStore};

use models::{ImageQuality, Renderer, TypedPayload};

use std::fs;

use tempfile::TempDir;

/// **VALUE**: Verifies every key reads as its default in an empty store.
///
/// **WHY THIS MATTERS**: First launch has no settings file. Every getter must still produce a
/// usable value for the initial sync.
///
/// **BUG THIS CATCHES**: Would catch a getter falling back to a zero value instead of the
/// documented default.
#[test]
fn given_empty_store_when_reading_then_defaults_returned() {
    // GIVEN: No settings file
    let dir = TempDir::new().expect("Failed to create temp dir");
    let settings = SettingsStore::load(dir.path()).expect("Missing file should load defaults");

    // THEN: Defaults
    assert_eq!(settings.volume(), 9);
    assert!(!settings.mute());
    assert!(settings.fit());
    assert_eq!(settings.url(), "");
    assert_eq!(settings.renderer(), Renderer::Gl);
    assert_eq!(settings.image_quality(), ImageQuality::Best);
    assert_eq!(settings.charset(), "AutoDetect");
    assert_eq!(settings.decoders().len(), 4);
    for key in SettingKey::ALL {
        assert_eq!(settings.get(key), key.default_value(), "Default of {key:?}");
    }
}

/// **VALUE**: Verifies values survive save and reload, and the save is not left half-written.
///
/// **WHY THIS MATTERS**: Preferences re-sync a restarted worker and the next launch.
///
/// **BUG THIS CATCHES**: Would catch a key written under one name and read under another, or a
/// temp file left behind.
#[test]
fn given_changed_settings_when_saved_and_reloaded_then_values_persist() {
    // GIVEN: A store with changes
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut settings = SettingsStore::with_defaults(dir.path());
    settings.set_url("/videos/rain.mp4");
    settings.set_volume(42);
    settings.set_renderer(Renderer::D2d);
    settings.set_subtitle_enabled(false);

    // WHEN: Flushing and reloading
    settings.flush().expect("Flush should succeed");
    let reloaded = SettingsStore::load(dir.path()).expect("Reload should succeed");

    // THEN: Same values, no temp file, clean
    assert!(!settings.is_dirty());
    assert_eq!(reloaded.url(), "/videos/rain.mp4");
    assert_eq!(reloaded.volume(), 42);
    assert_eq!(reloaded.renderer(), Renderer::D2d);
    assert!(!reloaded.subtitle_enabled());
    assert!(!dir.path().join("settings.json.tmp").exists());
}

/// **VALUE**: Verifies stored volumes above 99 are clamped on write and on read.
///
/// **WHY THIS MATTERS**: The settings file is user-editable. A hand-edited 500 must not reach
/// the engine.
///
/// **BUG THIS CATCHES**: Would catch clamping applied only in the setter.
#[test]
fn given_out_of_range_volume_when_read_then_clamped() {
    // GIVEN: A hand-edited file with volume 500 and a bogus renderer
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(
        dir.path().join("settings.json"),
        r#"{"version":1,"values":{"volume":500,"renderer":"vulkan","mute":"yes"}}"#,
    )
    .expect("Failed to write settings");

    // WHEN: Loading
    let mut settings = SettingsStore::load(dir.path()).expect("Load should succeed");

    // THEN: Clamped, invalid values read as defaults
    assert_eq!(settings.volume(), 99);
    assert_eq!(settings.renderer(), Renderer::Gl);
    assert!(!settings.mute());

    // WHEN: Setting above range
    settings.set_volume(1_000);

    // THEN: Stored clamped
    assert_eq!(settings.get(SettingKey::Volume), TypedPayload::UInt32(99));
}

/// **VALUE**: Verifies `set` rejects a payload of the wrong variant.
///
/// **WHY THIS MATTERS**: Every getter assumes the stored variant. A string volume would read as
/// the default forever.
///
/// **BUG THIS CATCHES**: Would catch the generic setter bypassing the key's type.
#[test]
fn given_wrong_payload_variant_when_set_then_type_mismatch() {
    // GIVEN: A store
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut settings = SettingsStore::with_defaults(dir.path());

    // WHEN: Storing a string under volume
    let result = settings.set(SettingKey::Volume, TypedPayload::from("loud"));

    // THEN: Rejected, nothing stored
    assert!(matches!(result, Err(SettingsError::TypeMismatch { .. })));
    assert!(!settings.is_dirty());
}

/// **VALUE**: Verifies a corrupt settings file is an error from `load` but not from
/// `load_or_default`.
///
/// **WHY THIS MATTERS**: A broken file must never keep the launcher from starting.
///
/// **BUG THIS CATCHES**: Would catch a parse failure propagating into startup.
#[test]
fn given_corrupt_file_when_loaded_then_error_or_defaults() {
    // GIVEN: Invalid JSON
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(dir.path().join("settings.json"), "{not json").expect("Failed to write settings");

    // WHEN / THEN: load fails with ParseError
    assert!(matches!(
        SettingsStore::load(dir.path()),
        Err(SettingsError::ParseError { .. })
    ));

    // WHEN / THEN: load_or_default falls back
    let settings = SettingsStore::load_or_default(dir.path());
    assert_eq!(settings.volume(), 9);
}
