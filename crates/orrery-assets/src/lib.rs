//! Texture loading service backed by the `image` crate.
//!
//! Decoding runs on a small pool of background threads; callers get a
//! [`TextureHandle`](orrery_materials::TextureHandle) immediately and the
//! pixels appear once a worker publishes them.

mod loader;

pub use loader::{ImageTextureLoader, LoaderError};
