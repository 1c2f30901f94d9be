pub mod keys;

pub use keys::SettingKey;

use crate::error::settings::SettingsError;

use common::ErrorLocation;
use models::{ImageQuality, MAX_VOLUME, PayloadKind, Renderer, TypedPayload};

use std::collections::BTreeMap;
use std::panic::Location;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

const SETTINGS_FILE_NAME: &str = "settings.json";
const SETTINGS_VERSION: u32 = 1;

/// Directory name under the platform config/data dirs.
pub const APP_DIR_NAME: &str = "dynamic-desktop";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default = "default_version")]
    version: u32,

    #[serde(default)]
    values: BTreeMap<String, Value>,
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            values: BTreeMap::new(),
        }
    }
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

/// `<config_dir>/dynamic-desktop`, if the platform has a config dir.
pub fn default_settings_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME))
}

/// Persisted key/value preferences of the controller.
///
/// Passed explicitly to whoever needs it; only the controller writes. Reads never
/// fail: missing keys, values of the wrong type and unparseable choices read as the
/// key's default, and the volume is clamped to `0..=99`.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    dir: PathBuf,
    file: SettingsFile,
    dirty: bool,
}

impl SettingsStore {
    /// Empty store (all defaults) that will be saved under `dir`.
    pub fn with_defaults(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            file: SettingsFile::default(),
            dirty: false,
        }
    }

    /// Load settings from {dir}/settings.json.
    ///
    /// # Returns
    ///
    /// Returns `Ok(SettingsStore)` if loaded successfully or defaults if the file is missing.
    /// Returns `Err(SettingsError)` if the file exists but cannot be read or parsed.
    pub fn load(dir: &Path) -> Result<Self, SettingsError> {
        let path = dir.join(SETTINGS_FILE_NAME);

        if !path.exists() {
            info!("Settings file not found at {}, using defaults", path.display());
            return Ok(Self::with_defaults(dir));
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| SettingsError::ReadError {
            location: ErrorLocation::from(Location::caller()),
            path: path.clone(),
            source: e,
        })?;

        let file: SettingsFile =
            serde_json::from_str(&contents).map_err(|e| SettingsError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: path.clone(),
                reason: e.to_string(),
            })?;

        if file.version > SETTINGS_VERSION {
            warn!(
                "Settings version {} is newer than supported {SETTINGS_VERSION}, unknown keys are kept as-is",
                file.version
            );
        }

        info!("Settings loaded from {}", path.display());
        Ok(Self {
            dir: dir.to_path_buf(),
            file,
            dirty: false,
        })
    }

    /// [`SettingsStore::load`], falling back to defaults with a warning on any error.
    pub fn load_or_default(dir: &Path) -> Self {
        Self::load(dir).unwrap_or_else(|e| {
            warn!("Failed to load settings, using defaults: {e}");
            Self::with_defaults(dir)
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Save to {dir}/settings.json using an atomic temp file + rename.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if directory creation, serialization, write or rename fails.
    pub fn save(&mut self) -> Result<(), SettingsError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| SettingsError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: self.dir.clone(),
            source: e,
        })?;

        let path = self.dir.join(SETTINGS_FILE_NAME);
        let temp_path = self.dir.join(format!("{SETTINGS_FILE_NAME}.tmp"));

        let json =
            serde_json::to_string_pretty(&self.file).map_err(|e| SettingsError::SerializeError {
                location: ErrorLocation::from(Location::caller()),
                reason: e.to_string(),
            })?;

        std::fs::write(&temp_path, json).map_err(|e| SettingsError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &path).map_err(|e| SettingsError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: path.clone(),
            source: e,
        })?;

        self.dirty = false;
        info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Save only if something changed since the last load or save.
    pub fn flush(&mut self) -> Result<(), SettingsError> {
        if !self.dirty {
            debug!("Settings unchanged, nothing to flush");
            return Ok(());
        }
        self.save()
    }

    /// Current value of `key`, or its default.
    pub fn get(&self, key: SettingKey) -> TypedPayload {
        self.file
            .values
            .get(key.as_str())
            .and_then(|value| from_json(key.kind(), value))
            .and_then(|payload| normalize(key, payload))
            .unwrap_or_else(|| key.default_value())
    }

    /// Store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::TypeMismatch`] if the payload variant differs from the
    /// key's default.
    #[track_caller]
    pub fn set(&mut self, key: SettingKey, value: TypedPayload) -> Result<(), SettingsError> {
        if value.kind() != key.kind() {
            return Err(SettingsError::TypeMismatch {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "'{}' expects {:?}, got {:?}",
                    key.as_str(),
                    key.kind(),
                    value.kind()
                ),
            });
        }

        let value = normalize(key, value).unwrap_or_else(|| key.default_value());
        self.store(key, value);
        Ok(())
    }

    fn store(&mut self, key: SettingKey, value: TypedPayload) {
        debug!("Setting '{}' = {value}", key.as_str());
        self.file.values.insert(key.as_str().to_string(), to_json(&value));
        self.dirty = true;
    }

    fn get_bool(&self, key: SettingKey) -> bool {
        self.get(key).as_bool().unwrap_or_default()
    }

    fn get_string(&self, key: SettingKey) -> String {
        self.get(key).as_str().map(str::to_string).unwrap_or_default()
    }

    pub fn url(&self) -> String {
        self.get_string(SettingKey::Url)
    }

    pub fn set_url(&mut self, url: &str) {
        self.store(SettingKey::Url, TypedPayload::from(url));
    }

    pub fn mute(&self) -> bool {
        self.get_bool(SettingKey::Mute)
    }

    pub fn set_mute(&mut self, mute: bool) {
        self.store(SettingKey::Mute, TypedPayload::Bool(mute));
    }

    pub fn volume(&self) -> u32 {
        self.get(SettingKey::Volume)
            .as_u32()
            .unwrap_or(keys::DEFAULT_VOLUME)
    }

    pub fn set_volume(&mut self, volume: u32) {
        self.store(SettingKey::Volume, TypedPayload::UInt32(volume.min(MAX_VOLUME)));
    }

    pub fn autostart(&self) -> bool {
        self.get_bool(SettingKey::Autostart)
    }

    pub fn set_autostart(&mut self, enabled: bool) {
        self.store(SettingKey::Autostart, TypedPayload::Bool(enabled));
    }

    pub fn hwdec(&self) -> bool {
        self.get_bool(SettingKey::Hwdec)
    }

    pub fn decoders(&self) -> Vec<String> {
        self.get(SettingKey::Decoders)
            .as_list()
            .map(<[String]>::to_vec)
            .unwrap_or_default()
    }

    pub fn localize(&self) -> bool {
        self.get_bool(SettingKey::Localize)
    }

    pub fn fit(&self) -> bool {
        self.get_bool(SettingKey::Fit)
    }

    pub fn set_fit(&mut self, fit: bool) {
        self.store(SettingKey::Fit, TypedPayload::Bool(fit));
    }

    pub fn skin(&self) -> String {
        self.get_string(SettingKey::Skin)
    }

    pub fn set_skin(&mut self, skin: &str) {
        self.store(SettingKey::Skin, TypedPayload::from(skin));
    }

    pub fn language(&self) -> String {
        self.get_string(SettingKey::Language)
    }

    pub fn renderer(&self) -> Renderer {
        self.get_string(SettingKey::Renderer)
            .parse()
            .unwrap_or_default()
    }

    pub fn set_renderer(&mut self, renderer: Renderer) {
        self.store(SettingKey::Renderer, TypedPayload::from(renderer.as_str()));
    }

    pub fn image_quality(&self) -> ImageQuality {
        self.get_string(SettingKey::ImageQuality)
            .parse()
            .unwrap_or_default()
    }

    pub fn set_image_quality(&mut self, quality: ImageQuality) {
        self.store(SettingKey::ImageQuality, TypedPayload::from(quality.as_str()));
    }

    pub fn charset(&self) -> String {
        self.get_string(SettingKey::Charset)
    }

    pub fn set_charset(&mut self, charset: &str) {
        self.store(SettingKey::Charset, TypedPayload::from(charset));
    }

    pub fn subtitle_auto_load(&self) -> bool {
        self.get_bool(SettingKey::SubtitleAutoLoad)
    }

    pub fn set_subtitle_auto_load(&mut self, enabled: bool) {
        self.store(SettingKey::SubtitleAutoLoad, TypedPayload::Bool(enabled));
    }

    pub fn subtitle_enabled(&self) -> bool {
        self.get_bool(SettingKey::SubtitleEnabled)
    }

    pub fn set_subtitle_enabled(&mut self, enabled: bool) {
        self.store(SettingKey::SubtitleEnabled, TypedPayload::Bool(enabled));
    }
}

/// Clamp or validate a value of the right variant. `None` means "use the default".
fn normalize(key: SettingKey, value: TypedPayload) -> Option<TypedPayload> {
    match (key, value) {
        (SettingKey::Volume, TypedPayload::UInt32(volume)) => {
            Some(TypedPayload::UInt32(volume.min(MAX_VOLUME)))
        }
        (SettingKey::Renderer, TypedPayload::String(name)) => name
            .parse::<Renderer>()
            .ok()
            .map(|r| TypedPayload::from(r.as_str())),
        (SettingKey::ImageQuality, TypedPayload::String(name)) => name
            .parse::<ImageQuality>()
            .ok()
            .map(|q| TypedPayload::from(q.as_str())),
        (_, value) => Some(value),
    }
}

fn from_json(kind: PayloadKind, value: &Value) -> Option<TypedPayload> {
    match kind {
        PayloadKind::None => value.is_null().then_some(TypedPayload::None),
        PayloadKind::Bool => value.as_bool().map(TypedPayload::Bool),
        PayloadKind::UInt32 => value
            .as_i64()
            .map(|n| TypedPayload::UInt32(n.clamp(0, i64::from(u32::MAX)) as u32)),
        PayloadKind::Int64 => value.as_i64().map(TypedPayload::Int64),
        PayloadKind::Double => value.as_f64().map(TypedPayload::Double),
        PayloadKind::String => value.as_str().map(TypedPayload::from),
        PayloadKind::StringList => value.as_array().map(|items| {
            TypedPayload::StringList(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
            )
        }),
    }
}

fn to_json(value: &TypedPayload) -> Value {
    match value {
        TypedPayload::None => Value::Null,
        TypedPayload::Bool(value) => Value::Bool(*value),
        TypedPayload::UInt32(value) => Value::from(*value),
        TypedPayload::Int64(value) => Value::from(*value),
        TypedPayload::Double(value) => Number::from_f64(*value)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        TypedPayload::String(value) => Value::String(value.clone()),
        TypedPayload::StringList(values) => {
            Value::Array(values.iter().cloned().map(Value::String).collect())
        }
    }
}
