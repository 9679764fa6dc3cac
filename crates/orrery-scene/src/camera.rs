//! Perspective camera whose aspect ratio follows the viewport.

use glam::{Mat4, Quat, Vec3};
use tracing::debug;

use crate::error::CameraError;

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
}

/// Camera that generates view and projection matrices for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    pub rotation: Quat,
    pub projection: Projection,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
    viewport: (u32, u32),
}

impl Camera {
    /// Camera on +Z at `distance`, looking at the origin.
    pub fn looking_at_origin(
        fov_y_degrees: f32,
        distance: f32,
        viewport: (u32, u32),
        near: f32,
        far: f32,
    ) -> Self {
        let mut camera = Self {
            position: Vec3::new(0.0, 0.0, distance),
            rotation: Quat::IDENTITY,
            projection: Projection {
                fov_y: fov_y_degrees.to_radians(),
                aspect_ratio: 1.0,
            },
            near,
            far,
            viewport: (1, 1),
        };
        camera.set_viewport(viewport.0, viewport.1);
        camera
    }

    /// Like [`Camera::looking_at_origin`], but rejects settings that cannot
    /// form a perspective projection.
    pub fn try_looking_at_origin(
        fov_y_degrees: f32,
        distance: f32,
        viewport: (u32, u32),
        near: f32,
        far: f32,
    ) -> Result<Self, CameraError> {
        if !(fov_y_degrees > 0.0 && fov_y_degrees < 180.0) {
            return Err(CameraError::FieldOfView(fov_y_degrees));
        }
        if !distance.is_finite() {
            return Err(CameraError::Distance(distance));
        }
        if !(near > 0.0 && near < far && far.is_finite()) {
            return Err(CameraError::ClipPlanes { near, far });
        }
        Ok(Self::looking_at_origin(fov_y_degrees, distance, viewport, near, far))
    }

    /// Compute the view matrix (inverse of camera transform).
    pub fn view_matrix(&self) -> Mat4 {
        (Mat4::from_translation(self.position) * Mat4::from_quat(self.rotation)).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.projection.fov_y,
            self.projection.aspect_ratio,
            self.near,
            self.far,
        )
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// The forward direction vector (-Z in camera space).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Recompute the aspect ratio for a new viewport size.
    ///
    /// Zero-sized viewports (minimized windows) are ignored. Returns whether
    /// the projection changed.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            debug!(width, height, "ignoring degenerate viewport");
            return false;
        }
        let aspect_ratio = width as f32 / height as f32;
        let changed = self.viewport != (width, height);
        self.viewport = (width, height);
        self.projection.aspect_ratio = aspect_ratio;
        changed
    }
}

impl Default for Camera {
    /// 75° field of view, five units back, 800×600.
    fn default() -> Self {
        Self::looking_at_origin(75.0, 5.0, (800, 600), 0.1, 100.0)
    }
}
