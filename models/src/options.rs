use std::fmt::{Display, Formatter, Result as FormatResult};
use std::str::FromStr;

/// Video output backend. The numeric id is what `setRenderer` carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Renderer {
    OpenGl,
    #[default]
    Gl,
    Qt,
    Gdi,
    D2d,
}

impl Renderer {
    pub const ALL: [Renderer; 5] = [
        Renderer::OpenGl,
        Renderer::Gl,
        Renderer::Qt,
        Renderer::Gdi,
        Renderer::D2d,
    ];

    pub fn id(&self) -> i64 {
        match self {
            Renderer::OpenGl => 1,
            Renderer::Gl => 2,
            Renderer::Qt => 3,
            Renderer::Gdi => 4,
            Renderer::D2d => 5,
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.id() == id)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Renderer::OpenGl => "opengl",
            Renderer::Gl => "gl",
            Renderer::Qt => "qt",
            Renderer::Gdi => "gdi",
            Renderer::D2d => "d2d",
        }
    }
}

impl Display for Renderer {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "{}", self.as_str())
    }
}

impl FromStr for Renderer {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("unknown renderer '{value}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageQuality {
    #[default]
    Best,
    Fastest,
    Default,
}

impl ImageQuality {
    pub const ALL: [ImageQuality; 3] = [ImageQuality::Best, ImageQuality::Fastest, ImageQuality::Default];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageQuality::Best => "best",
            ImageQuality::Fastest => "fastest",
            ImageQuality::Default => "default",
        }
    }
}

impl Display for ImageQuality {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "{}", self.as_str())
    }
}

impl FromStr for ImageQuality {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|q| q.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("unknown image quality '{value}'"))
    }
}

/// Highest volume the player accepts; requests above it are clamped.
pub const MAX_VOLUME: u32 = 99;
