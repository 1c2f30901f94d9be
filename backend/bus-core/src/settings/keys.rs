use models::{ImageQuality, PayloadKind, Renderer, TypedPayload};

/// Persisted preference keys and their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Url,
    Mute,
    Volume,
    Autostart,
    Hwdec,
    Decoders,
    Localize,
    Fit,
    Skin,
    Language,
    Renderer,
    ImageQuality,
    Charset,
    SubtitleAutoLoad,
    SubtitleEnabled,
}

pub const DEFAULT_VOLUME: u32 = 9;
pub const DEFAULT_DECODERS: [&str; 4] = ["CUDA", "D3D11", "DXVA", "FFmpeg"];

impl SettingKey {
    pub const ALL: [SettingKey; 15] = [
        SettingKey::Url,
        SettingKey::Mute,
        SettingKey::Volume,
        SettingKey::Autostart,
        SettingKey::Hwdec,
        SettingKey::Decoders,
        SettingKey::Localize,
        SettingKey::Fit,
        SettingKey::Skin,
        SettingKey::Language,
        SettingKey::Renderer,
        SettingKey::ImageQuality,
        SettingKey::Charset,
        SettingKey::SubtitleAutoLoad,
        SettingKey::SubtitleEnabled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::Url => "url",
            SettingKey::Mute => "mute",
            SettingKey::Volume => "volume",
            SettingKey::Autostart => "autostart",
            SettingKey::Hwdec => "hwdec",
            SettingKey::Decoders => "decoders",
            SettingKey::Localize => "localize",
            SettingKey::Fit => "fit",
            SettingKey::Skin => "skin",
            SettingKey::Language => "language",
            SettingKey::Renderer => "renderer",
            SettingKey::ImageQuality => "imageQuality",
            SettingKey::Charset => "charset",
            SettingKey::SubtitleAutoLoad => "subtitleAutoLoad",
            SettingKey::SubtitleEnabled => "subtitleEnabled",
        }
    }

    pub fn default_value(&self) -> TypedPayload {
        match self {
            SettingKey::Url => TypedPayload::String(String::new()),
            SettingKey::Mute => TypedPayload::Bool(false),
            SettingKey::Volume => TypedPayload::UInt32(DEFAULT_VOLUME),
            SettingKey::Autostart => TypedPayload::Bool(false),
            SettingKey::Hwdec => TypedPayload::Bool(true),
            SettingKey::Decoders => {
                TypedPayload::StringList(DEFAULT_DECODERS.iter().map(|d| d.to_string()).collect())
            }
            SettingKey::Localize => TypedPayload::Bool(true),
            SettingKey::Fit => TypedPayload::Bool(true),
            SettingKey::Skin => TypedPayload::String("none".to_string()),
            SettingKey::Language => TypedPayload::String("auto".to_string()),
            SettingKey::Renderer => TypedPayload::String(Renderer::default().as_str().to_string()),
            SettingKey::ImageQuality => {
                TypedPayload::String(ImageQuality::default().as_str().to_string())
            }
            SettingKey::Charset => TypedPayload::String("AutoDetect".to_string()),
            SettingKey::SubtitleAutoLoad => TypedPayload::Bool(true),
            SettingKey::SubtitleEnabled => TypedPayload::Bool(true),
        }
    }

    pub fn kind(&self) -> PayloadKind {
        self.default_value().kind()
    }
}
