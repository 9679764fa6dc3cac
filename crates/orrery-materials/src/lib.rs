//! Surface materials: texture channels, eventually-ready texture handles, the
//! texture set resolver, and composition of a material from its enabled channels.

mod channel;
mod material;
mod resolver;
mod texture;

pub use channel::{ChannelFlags, ColorSpace, TEXTURE_EXTENSION, TextureChannel};
pub use material::{
    AttachedChannel, ComposedMaterial, DEFAULT_DISPLACEMENT_SCALE, MaterialDescriptor,
    MaterialError, MaterialUniform, rgba_from_hex,
};
pub use resolver::{ChannelTexture, ChannelTextures, resolve, resolve_standard, texture_path};
pub use texture::{NullTextureLoader, TextureHandle, TextureLoader};
