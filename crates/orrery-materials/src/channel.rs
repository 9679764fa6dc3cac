//! The closed set of texture channels a material can carry.

use serde::{Deserialize, Serialize};

/// File extension shared by every channel image.
pub const TEXTURE_EXTENSION: &str = "jpg";

// ---------------------------------------------------------------------------
// ColorSpace
// ---------------------------------------------------------------------------

/// How the rendering backend must decode a channel's stored values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorSpace {
    /// Display-referred color (gamma encoded).
    Srgb,
    /// Linear data map (normals, heights, masks).
    Linear,
}

// ---------------------------------------------------------------------------
// TextureChannel
// ---------------------------------------------------------------------------

/// One named texture input to a material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureChannel {
    Color,
    Displacement,
    Normal,
    AmbientOcclusion,
    Metalness,
    Roughness,
    Emission,
}

impl TextureChannel {
    /// Number of channels.
    pub const COUNT: usize = 7;

    /// Every channel, in declaration order.
    pub const ALL: [TextureChannel; Self::COUNT] = [
        Self::Color,
        Self::Displacement,
        Self::Normal,
        Self::AmbientOcclusion,
        Self::Metalness,
        Self::Roughness,
        Self::Emission,
    ];

    /// Channels fetched when a material asks for "the usual maps".
    pub const STANDARD: [TextureChannel; 6] = [
        Self::Color,
        Self::Displacement,
        Self::Normal,
        Self::AmbientOcclusion,
        Self::Metalness,
        Self::Roughness,
    ];

    /// Dense index in `0..COUNT`.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// File name without extension. The normal map uses the OpenGL
    /// (+Y up) convention, hence `normalGL`.
    pub const fn file_stem(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Displacement => "displacement",
            Self::Normal => "normalGL",
            Self::AmbientOcclusion => "ambientOcclusion",
            Self::Metalness => "metalness",
            Self::Roughness => "roughness",
            Self::Emission => "emission",
        }
    }

    /// File name including [`TEXTURE_EXTENSION`].
    pub fn file_name(self) -> String {
        format!("{}.{TEXTURE_EXTENSION}", self.file_stem())
    }

    /// Only the color map is display-referred.
    pub const fn color_space(self) -> ColorSpace {
        match self {
            Self::Color => ColorSpace::Srgb,
            _ => ColorSpace::Linear,
        }
    }
}

// ---------------------------------------------------------------------------
// ChannelFlags
// ---------------------------------------------------------------------------

/// Per-channel "attach this channel if available" switches.
///
/// Serialized as the list of enabled channels, e.g. `[Color, Normal]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<TextureChannel>", into = "Vec<TextureChannel>")]
pub struct ChannelFlags([bool; TextureChannel::COUNT]);

impl ChannelFlags {
    /// No channel enabled.
    pub const fn none() -> Self {
        Self([false; TextureChannel::COUNT])
    }

    /// Every channel enabled.
    pub const fn all() -> Self {
        Self([true; TextureChannel::COUNT])
    }

    /// [`TextureChannel::STANDARD`] enabled, emission disabled.
    pub fn standard() -> Self {
        TextureChannel::STANDARD.into_iter().collect()
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, channel: TextureChannel, enabled: bool) -> Self {
        self.set(channel, enabled);
        self
    }

    pub fn set(&mut self, channel: TextureChannel, enabled: bool) {
        self.0[channel.index()] = enabled;
    }

    pub fn is_enabled(&self, channel: TextureChannel) -> bool {
        self.0[channel.index()]
    }

    /// Enabled channels in declaration order.
    pub fn enabled(&self) -> impl Iterator<Item = TextureChannel> + '_ {
        TextureChannel::ALL
            .into_iter()
            .filter(|channel| self.is_enabled(*channel))
    }

    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|&enabled| enabled)
    }
}

impl FromIterator<TextureChannel> for ChannelFlags {
    fn from_iter<I: IntoIterator<Item = TextureChannel>>(iter: I) -> Self {
        let mut flags = Self::none();
        for channel in iter {
            flags.set(channel, true);
        }
        flags
    }
}

impl From<Vec<TextureChannel>> for ChannelFlags {
    fn from(channels: Vec<TextureChannel>) -> Self {
        channels.into_iter().collect()
    }
}

impl From<ChannelFlags> for Vec<TextureChannel> {
    fn from(flags: ChannelFlags) -> Self {
        flags.enabled().collect()
    }
}
