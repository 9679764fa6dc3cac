//! Opaque, eventually-populated texture handles and the loading service seam.

use std::fmt;
use std::sync::{Arc, OnceLock};

use image::RgbaImage;

/// Shared reference to a texture that a loader fills in at most once.
///
/// Clones observe the same slot. A handle is either pending or ready; the
/// decoded pixels become visible atomically on [`publish`](Self::publish).
#[derive(Clone)]
pub struct TextureHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    path: String,
    image: OnceLock<RgbaImage>,
}

impl TextureHandle {
    /// A handle whose image has not arrived yet.
    pub fn pending(path: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                path: path.into(),
                image: OnceLock::new(),
            }),
        }
    }

    /// A handle that is ready immediately.
    pub fn ready(path: impl Into<String>, image: RgbaImage) -> Self {
        let handle = Self::pending(path);
        handle.publish(image);
        handle
    }

    /// The path this handle was requested for.
    pub fn path(&self) -> &str {
        &self.inner.path
    }

    /// Store the decoded image. Returns `false` (and drops `image`) if the
    /// handle was already published.
    pub fn publish(&self, image: RgbaImage) -> bool {
        self.inner.image.set(image).is_ok()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.image.get().is_some()
    }

    /// The decoded image, once published.
    pub fn image(&self) -> Option<&RgbaImage> {
        self.inner.image.get()
    }

    /// `(width, height)` once published.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.image().map(RgbaImage::dimensions)
    }

    /// Whether both handles share the same slot.
    pub fn same_as(&self, other: &TextureHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureHandle")
            .field("path", &self.inner.path)
            .field("dimensions", &self.dimensions())
            .finish()
    }
}

/// Texture-loading service.
///
/// `load` must not block and must not fail: a file that is missing or does
/// not decode yields a handle that simply never becomes ready.
pub trait TextureLoader {
    fn load(&self, path: &str) -> TextureHandle;
}

impl<L: TextureLoader + ?Sized> TextureLoader for &L {
    fn load(&self, path: &str) -> TextureHandle {
        (**self).load(path)
    }
}

impl<L: TextureLoader + ?Sized> TextureLoader for Arc<L> {
    fn load(&self, path: &str) -> TextureHandle {
        (**self).load(path)
    }
}

/// Loader whose handles never resolve. Used for untextured scenes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTextureLoader;

impl TextureLoader for NullTextureLoader {
    fn load(&self, path: &str) -> TextureHandle {
        TextureHandle::pending(path)
    }
}
