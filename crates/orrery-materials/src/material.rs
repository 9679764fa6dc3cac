//! Core material types: [`MaterialDescriptor`], [`ComposedMaterial`] and
//! [`MaterialUniform`].

use bytemuck::{Pod, Zeroable};
use thiserror::Error;

use crate::channel::{ChannelFlags, ColorSpace, TextureChannel};
use crate::resolver::ChannelTextures;
use crate::texture::TextureHandle;

/// Displacement scale used when a body does not override it.
pub const DEFAULT_DISPLACEMENT_SCALE: f32 = 0.1;

/// Convert a `0xRRGGBB` literal into an opaque RGBA color.
pub fn rgba_from_hex(hex: u32) -> [f32; 4] {
    let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
    [channel(16), channel(8), channel(0), 1.0]
}

// ---------------------------------------------------------------------------
// MaterialError
// ---------------------------------------------------------------------------

/// Errors returned during material validation.
#[derive(Debug, Error, PartialEq)]
pub enum MaterialError {
    /// A color component is NaN or infinite.
    #[error("{field} has a non-finite component")]
    NonFiniteColor { field: &'static str },

    /// The displacement scale is NaN or infinite.
    #[error("displacement scale must be finite, got {0}")]
    NonFiniteDisplacement(f32),
}

// ---------------------------------------------------------------------------
// MaterialDescriptor
// ---------------------------------------------------------------------------

/// Surface appearance of one body.
///
/// Channel textures are attached only when the channel's flag is set *and* a
/// handle is present *and* that handle is ready. An enabled channel whose
/// texture never arrives is silently left out.
#[derive(Clone, Debug)]
pub struct MaterialDescriptor {
    /// Base color in linear RGBA. Components are clamped to `[0.0, 1.0]`.
    pub base_color: [f32; 4],

    /// Explicit tint applied on top of the color map.
    pub base_color_override: Option<[f32; 4]>,

    /// Which channels to attach if available.
    pub channel_flags: ChannelFlags,

    /// Handles filled by the texture set resolver.
    pub channel_textures: ChannelTextures,

    /// Height-map displacement scale.
    pub displacement_scale: f32,
}

impl Default for MaterialDescriptor {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            base_color_override: None,
            channel_flags: ChannelFlags::none(),
            channel_textures: ChannelTextures::new(),
            displacement_scale: DEFAULT_DISPLACEMENT_SCALE,
        }
    }
}

impl MaterialDescriptor {
    /// A flat-colored, untextured material.
    pub fn solid(base_color: [f32; 4]) -> Self {
        Self {
            base_color,
            ..Default::default()
        }
    }

    /// Validates and clamps all fields to their legal ranges.
    ///
    /// # Errors
    ///
    /// Returns [`MaterialError`] if any color component or the displacement
    /// scale is not finite.
    pub fn validated(mut self) -> Result<Self, MaterialError> {
        clamp_color(&mut self.base_color, "base color")?;
        if let Some(tint) = self.base_color_override.as_mut() {
            clamp_color(tint, "base color override")?;
        }
        let scale = self.displacement_scale;
        if !scale.is_finite() {
            return Err(MaterialError::NonFiniteDisplacement(scale));
        }
        Ok(self)
    }

    /// Whether `channel` would be attached if the material were composed now.
    pub fn is_attached(&self, channel: TextureChannel) -> bool {
        self.channel_flags.is_enabled(channel)
            && self
                .channel_textures
                .get(channel)
                .is_some_and(|texture| texture.handle.is_ready())
    }

    /// Snapshot of the material with only the attachable channels.
    pub fn compose(&self) -> ComposedMaterial {
        let channels = self
            .channel_textures
            .iter()
            .filter(|(channel, _)| self.is_attached(*channel))
            .map(|(channel, texture)| AttachedChannel {
                channel,
                color_space: texture.color_space,
                handle: texture.handle.clone(),
            })
            .collect();

        ComposedMaterial {
            base_color: self.base_color,
            tint: self.base_color_override,
            channels,
            displacement_scale: self.displacement_scale,
        }
    }
}

fn clamp_color(color: &mut [f32; 4], field: &'static str) -> Result<(), MaterialError> {
    if color.iter().any(|c| !c.is_finite()) {
        return Err(MaterialError::NonFiniteColor { field });
    }
    for c in color.iter_mut() {
        *c = c.clamp(0.0, 1.0);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ComposedMaterial
// ---------------------------------------------------------------------------

/// A channel texture that made it into the composed material.
#[derive(Clone, Debug)]
pub struct AttachedChannel {
    pub channel: TextureChannel,
    pub color_space: ColorSpace,
    pub handle: TextureHandle,
}

/// The material as handed to a rendering backend for one frame.
#[derive(Clone, Debug)]
pub struct ComposedMaterial {
    pub base_color: [f32; 4],
    pub tint: Option<[f32; 4]>,
    pub channels: Vec<AttachedChannel>,
    pub displacement_scale: f32,
}

impl ComposedMaterial {
    pub fn channel(&self, channel: TextureChannel) -> Option<&AttachedChannel> {
        self.channels.iter().find(|a| a.channel == channel)
    }

    pub fn has_channel(&self, channel: TextureChannel) -> bool {
        self.channel(channel).is_some()
    }

    /// Color multiplied into the color map: the tint when present,
    /// the base color otherwise.
    pub fn surface_color(&self) -> [f32; 4] {
        self.tint.unwrap_or(self.base_color)
    }

    /// Bit `i` set when channel with index `i` is attached.
    pub fn channel_mask(&self) -> u32 {
        self.channels
            .iter()
            .fold(0, |mask, attached| mask | 1 << attached.channel.index())
    }
}

// ---------------------------------------------------------------------------
// MaterialUniform
// ---------------------------------------------------------------------------

/// GPU-friendly packed material data, 48 bytes, std140-compatible.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MaterialUniform {
    /// Base color in linear RGBA.
    pub base_color: [f32; 4],
    /// Tint, or opaque white when the material has none.
    pub tint: [f32; 4],
    /// Displacement scale; zero when no displacement map is attached.
    pub displacement_scale: f32,
    /// See [`ComposedMaterial::channel_mask`].
    pub channel_mask: u32,
    pub _pad: [u32; 2],
}

impl From<&ComposedMaterial> for MaterialUniform {
    fn from(m: &ComposedMaterial) -> Self {
        let displacement_scale = if m.has_channel(TextureChannel::Displacement) {
            m.displacement_scale
        } else {
            0.0
        };
        Self {
            base_color: m.base_color,
            tint: m.tint.unwrap_or([1.0; 4]),
            displacement_scale,
            channel_mask: m.channel_mask(),
            _pad: [0; 2],
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn ready(path: &str) -> TextureHandle {
        TextureHandle::ready(path, RgbaImage::new(1, 1))
    }

    #[test]
    fn test_default_descriptor() {
        let mat = MaterialDescriptor::default();
        assert_eq!(mat.displacement_scale, 0.1);
        assert!(mat.channel_flags.is_empty());
        assert!(mat.compose().channels.is_empty());
    }

    #[test]
    fn test_hex_conversion() {
        assert_eq!(rgba_from_hex(0xff0000), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(rgba_from_hex(0x0000ff), [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_enabled_channel_without_handle_is_not_attached() {
        let mat = MaterialDescriptor {
            channel_flags: ChannelFlags::none().with(TextureChannel::Metalness, true),
            ..Default::default()
        };
        let composed = mat.compose();
        assert!(!composed.has_channel(TextureChannel::Metalness));
        assert!(!mat.is_attached(TextureChannel::Metalness));
    }

    #[test]
    fn test_disabled_channel_with_ready_handle_is_not_attached() {
        let mut mat = MaterialDescriptor::default();
        mat.channel_textures
            .insert(TextureChannel::Metalness, ready("m/metalness.jpg"));
        assert!(!mat.compose().has_channel(TextureChannel::Metalness));
    }

    #[test]
    fn test_enabled_channel_attaches_once_ready() {
        let pending = TextureHandle::pending("m/metalness.jpg");
        let mut mat = MaterialDescriptor {
            channel_flags: ChannelFlags::none().with(TextureChannel::Metalness, true),
            ..Default::default()
        };
        mat.channel_textures
            .insert(TextureChannel::Metalness, pending.clone());

        assert!(!mat.compose().has_channel(TextureChannel::Metalness));
        pending.publish(RgbaImage::new(1, 1));
        let composed = mat.compose();
        let attached = composed.channel(TextureChannel::Metalness).unwrap();
        assert_eq!(attached.color_space, ColorSpace::Linear);
        assert!(attached.handle.same_as(&pending));
    }

    #[test]
    fn test_color_channel_keeps_srgb_tag() {
        let mut mat = MaterialDescriptor {
            channel_flags: ChannelFlags::standard(),
            ..Default::default()
        };
        mat.channel_textures
            .insert(TextureChannel::Color, ready("e/color.jpg"));
        let composed = mat.compose();
        assert_eq!(
            composed.channel(TextureChannel::Color).unwrap().color_space,
            ColorSpace::Srgb
        );
        assert_eq!(composed.channel_mask(), 1);
    }

    #[test]
    fn test_tint_supersedes_base_color() {
        let mat = MaterialDescriptor {
            base_color: [0.2, 0.2, 0.2, 1.0],
            base_color_override: Some([1.0, 0.5, 0.0, 1.0]),
            ..Default::default()
        };
        assert_eq!(mat.compose().surface_color(), [1.0, 0.5, 0.0, 1.0]);
        assert_eq!(
            MaterialDescriptor::solid([0.2, 0.2, 0.2, 1.0])
                .compose()
                .surface_color(),
            [0.2, 0.2, 0.2, 1.0]
        );
    }

    #[test]
    fn test_validation_clamps_and_rejects() {
        let mat = MaterialDescriptor {
            base_color: [1.5, -0.3, 0.5, 2.0],
            ..Default::default()
        }
        .validated()
        .unwrap();
        assert_eq!(mat.base_color, [1.0, 0.0, 0.5, 1.0]);

        let nan_tint = MaterialDescriptor {
            base_color_override: Some([f32::NAN, 0.0, 0.0, 1.0]),
            ..Default::default()
        }
        .validated();
        assert_eq!(
            nan_tint.unwrap_err(),
            MaterialError::NonFiniteColor {
                field: "base color override"
            }
        );

        let inf_disp = MaterialDescriptor {
            displacement_scale: f32::INFINITY,
            ..Default::default()
        }
        .validated();
        assert!(matches!(
            inf_disp,
            Err(MaterialError::NonFiniteDisplacement(_))
        ));
    }

    #[test]
    fn test_uniform_layout_and_displacement_gate() {
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 48);

        let mut mat = MaterialDescriptor {
            channel_flags: ChannelFlags::all(),
            displacement_scale: 0.25,
            ..Default::default()
        };
        let without = MaterialUniform::from(&mat.compose());
        assert_eq!(without.displacement_scale, 0.0);
        assert_eq!(without.tint, [1.0; 4]);

        mat.channel_textures
            .insert(TextureChannel::Displacement, ready("d/displacement.jpg"));
        let with = MaterialUniform::from(&mat.compose());
        assert_eq!(with.displacement_scale, 0.25);
        assert_eq!(with.channel_mask, 1 << TextureChannel::Displacement.index());
    }
}
