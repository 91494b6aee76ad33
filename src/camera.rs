//! The camera rig: projection and pose derived from the room geometry.
//!
//! The rig re-applies its projection and pose on every pre-render step.
//! Applying once at setup is not enough: other parts of the engine may
//! touch the camera between frames, and the capture must see the framed
//! composition regardless.
//!
//! # Examples
//! ```
//! use modelshot::camera::CameraRig;
//!
//! let rig = CameraRig::new(800.0 / 600.0, 10.0);
//! assert!((rig.near_plane() - 12.07).abs() < 0.01);
//! ```

use glam::{Mat4, Vec3};

use crate::engine::Camera;
use crate::framing::FRAMED_HEIGHT;

/// Vertical field of view in degrees.
pub const FOV_DEGREES: f32 = 45.0;

/// Far clipping plane distance.
pub const FAR_PLANE: f32 = 100.0;

/// Derives the camera projection and pose for the framed room.
///
/// The near plane sits where the room height exactly fills the vertical
/// field of view; the camera is lifted to half the room height and pulled
/// back by half the room depth plus the near distance. No rotation is ever
/// applied; the camera looks down the default axis.
///
/// # Examples
/// ```
/// use modelshot::camera::CameraRig;
/// use modelshot::framing::FRAMED_HEIGHT;
///
/// let rig = CameraRig::new(1.0, 10.0);
/// assert_eq!(rig.eye().y, FRAMED_HEIGHT / 2.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CameraRig {
    aspect: f32,
    room_depth: f32,
}

impl CameraRig {
    /// Creates a rig for the given output aspect ratio and room depth.
    pub fn new(aspect: f32, room_depth: f32) -> Self {
        Self { aspect, room_depth }
    }

    /// Returns the near-plane distance at which the room height fills the
    /// vertical field of view.
    pub fn near_plane(&self) -> f32 {
        (FRAMED_HEIGHT / 2.0) / (FOV_DEGREES.to_radians() / 2.0).tan()
    }

    /// Returns the camera position.
    pub fn eye(&self) -> Vec3 {
        Vec3::new(
            0.0,
            FRAMED_HEIGHT / 2.0,
            self.room_depth / 2.0 + self.near_plane(),
        )
    }

    /// Re-applies projection and pose to the engine camera.
    ///
    /// Called every pre-render step.
    pub fn apply(&self, camera: &mut Camera) {
        camera.set_projection(FOV_DEGREES, self.aspect, self.near_plane(), FAR_PLANE);
        camera.set_model_matrix(Mat4::from_translation(self.eye()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_near_plane_fills_fov_with_room_height() {
        // 800x600: near = (10/2) / tan(22.5 deg)
        let rig = CameraRig::new(800.0 / 600.0, 10.0);
        let expected = 5.0 / (22.5f32.to_radians()).tan();
        assert!((rig.near_plane() - expected).abs() < 1e-4);
        assert!((rig.near_plane() - 12.07).abs() < 0.01);
    }

    #[test]
    fn test_eye_is_pure_translation_from_room() {
        let rig = CameraRig::new(1.0, 6.0);
        let eye = rig.eye();
        assert_eq!(eye.x, 0.0);
        assert_eq!(eye.y, FRAMED_HEIGHT / 2.0);
        assert!((eye.z - (3.0 + rig.near_plane())).abs() < 1e-5);
    }

    #[test]
    fn test_apply_centers_room_in_clip_space() {
        let rig = CameraRig::new(1.0, 10.0);
        let mut camera = Camera::default();
        rig.apply(&mut camera);

        // The room center projects onto the view axis
        let room_center = Vec3::new(0.0, FRAMED_HEIGHT / 2.0, 0.0);
        let clip = camera.view_projection() * room_center.extend(1.0);
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        assert!(ndc_x.abs() < 1e-5);
        assert!(ndc_y.abs() < 1e-5);
    }

    #[test]
    fn test_room_height_spans_vertical_fov_at_near_plane() {
        let rig = CameraRig::new(1.0, 0.0);
        let mut camera = Camera::default();
        rig.apply(&mut camera);

        // With zero room depth the near plane passes through z = 0; the
        // room's top edge lands on the top of the viewport.
        let top = Vec3::new(0.0, FRAMED_HEIGHT, 0.0);
        let clip = camera.view_projection() * top.extend(1.0);
        assert!((clip.y / clip.w - 1.0).abs() < 1e-3);
    }
}
