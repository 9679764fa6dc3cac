//! Texture set resolver: turns a base path and channel flags into load requests.

use tracing::debug;

use crate::channel::{ChannelFlags, ColorSpace, TextureChannel};
use crate::texture::{TextureHandle, TextureLoader};

/// A requested channel texture together with its decode color space.
#[derive(Clone, Debug)]
pub struct ChannelTexture {
    pub handle: TextureHandle,
    pub color_space: ColorSpace,
}

/// Optional texture handle per channel.
#[derive(Clone, Debug, Default)]
pub struct ChannelTextures {
    slots: [Option<ChannelTexture>; TextureChannel::COUNT],
}

impl ChannelTextures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `handle` for `channel`, tagged with the channel's color space.
    /// Replaces any previous handle.
    pub fn insert(&mut self, channel: TextureChannel, handle: TextureHandle) {
        self.slots[channel.index()] = Some(ChannelTexture {
            handle,
            color_space: channel.color_space(),
        });
    }

    pub fn get(&self, channel: TextureChannel) -> Option<&ChannelTexture> {
        self.slots[channel.index()].as_ref()
    }

    /// Present handles in channel order.
    pub fn iter(&self) -> impl Iterator<Item = (TextureChannel, &ChannelTexture)> + '_ {
        TextureChannel::ALL
            .into_iter()
            .filter_map(|channel| self.get(channel).map(|texture| (channel, texture)))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of present handles that have been published.
    pub fn ready_count(&self) -> usize {
        self.iter()
            .filter(|(_, texture)| texture.handle.is_ready())
            .count()
    }
}

/// `base_path + "/" + <channel file name>`.
pub fn texture_path(base_path: &str, channel: TextureChannel) -> String {
    format!("{base_path}/{}", channel.file_name())
}

/// Issue one load request per enabled channel.
///
/// Never blocks and never retries; a handle that never becomes ready simply
/// never contributes to the material.
pub fn resolve<L>(loader: &L, base_path: &str, flags: &ChannelFlags) -> ChannelTextures
where
    L: TextureLoader + ?Sized,
{
    let mut textures = ChannelTextures::new();
    for channel in flags.enabled() {
        let path = texture_path(base_path, channel);
        debug!(?channel, %path, "requesting channel texture");
        textures.insert(channel, loader.load(&path));
    }
    textures
}

/// Resolve the fixed [`TextureChannel::STANDARD`] set regardless of flags.
pub fn resolve_standard<L>(loader: &L, base_path: &str) -> ChannelTextures
where
    L: TextureLoader + ?Sized,
{
    resolve(loader, base_path, &ChannelFlags::standard())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use std::cell::RefCell;

    /// Records requested paths; resolves only paths listed in `present`.
    #[derive(Default)]
    struct RecordingLoader {
        requests: RefCell<Vec<String>>,
        present: Vec<String>,
    }

    impl TextureLoader for RecordingLoader {
        fn load(&self, path: &str) -> TextureHandle {
            self.requests.borrow_mut().push(path.to_string());
            if self.present.iter().any(|p| p == path) {
                TextureHandle::ready(path, RgbaImage::new(2, 2))
            } else {
                TextureHandle::pending(path)
            }
        }
    }

    #[test]
    fn test_one_request_per_enabled_channel() {
        let loader = RecordingLoader::default();
        let flags = ChannelFlags::none()
            .with(TextureChannel::Color, true)
            .with(TextureChannel::Roughness, true);

        let textures = resolve(&loader, "textures/earth", &flags);

        assert_eq!(
            *loader.requests.borrow(),
            vec![
                "textures/earth/color.jpg".to_string(),
                "textures/earth/roughness.jpg".to_string(),
            ]
        );
        assert_eq!(textures.len(), 2);
        assert!(textures.get(TextureChannel::Normal).is_none());
    }

    #[test]
    fn test_no_flags_no_requests() {
        let loader = RecordingLoader::default();
        let textures = resolve(&loader, "textures/sun", &ChannelFlags::none());
        assert!(loader.requests.borrow().is_empty());
        assert!(textures.is_empty());
    }

    #[test]
    fn test_color_tagged_srgb_others_linear() {
        let loader = RecordingLoader::default();
        let textures = resolve(&loader, "t", &ChannelFlags::all());
        assert_eq!(textures.len(), TextureChannel::COUNT);
        for (channel, texture) in textures.iter() {
            assert_eq!(texture.color_space, channel.color_space());
        }
        assert_eq!(
            textures.get(TextureChannel::Color).unwrap().color_space,
            ColorSpace::Srgb
        );
        assert_eq!(
            textures.get(TextureChannel::Normal).unwrap().color_space,
            ColorSpace::Linear
        );
    }

    #[test]
    fn test_standard_set_ignores_emission() {
        let loader = RecordingLoader::default();
        let textures = resolve_standard(&loader, "textures/moon");
        assert_eq!(loader.requests.borrow().len(), 6);
        assert!(textures.get(TextureChannel::Emission).is_none());
        assert_eq!(
            textures.get(TextureChannel::Normal).unwrap().handle.path(),
            "textures/moon/normalGL.jpg"
        );
    }

    #[test]
    fn test_missing_files_are_not_errors() {
        let loader = RecordingLoader {
            present: vec!["p/color.jpg".to_string()],
            ..Default::default()
        };
        let textures = resolve(&loader, "p", &ChannelFlags::standard());
        assert_eq!(textures.len(), 6);
        assert_eq!(textures.ready_count(), 1);
    }
}
