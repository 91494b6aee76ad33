//! Fits a model's bounding box into a fixed-size virtual room.
//!
//! The room has a fixed height and a width/depth derived from the output
//! aspect ratio, matching the framing convention of the web viewer this tool
//! generates previews for. The framer produces a uniform scale and a
//! translation that center the model inside the room with a small margin.
//!
//! # Examples
//! ```
//! use glam::Vec3;
//! use modelshot::framing::{FrameTransform, RoomVolume};
//!
//! let room = RoomVolume::from_aspect(1.0);
//! let fit = FrameTransform::fit(Vec3::splat(-1.0), Vec3::splat(1.0), &room).unwrap();
//! assert!((fit.scale - 4.9504).abs() < 1e-3);
//! ```

use glam::{Mat4, Vec3};

use crate::error::{Error, Result};

/// Height of the virtual room the model is framed into.
pub const FRAMED_HEIGHT: f32 = 10.0;

/// Margin factor applied to the fit so the model never touches the room
/// bounds. Must stay above 1.0.
pub const ROOM_PADDING_SCALE: f32 = 1.01;

/// The axis-aligned room volume a model is framed into.
///
/// The floor sits at `y = 0` and the ceiling at [`FRAMED_HEIGHT`]; each
/// horizontal half-extent is `aspect * FRAMED_HEIGHT / 2`.
///
/// # Examples
/// ```
/// use modelshot::framing::{RoomVolume, FRAMED_HEIGHT};
///
/// let room = RoomVolume::from_aspect(1.0);
/// assert_eq!(room.size().y, FRAMED_HEIGHT);
/// assert_eq!(room.size().x, 10.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RoomVolume {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl RoomVolume {
    /// Builds the room for a given output aspect ratio.
    pub fn from_aspect(aspect: f32) -> Self {
        let half_width = aspect * FRAMED_HEIGHT / 2.0;
        Self {
            min: Vec3::new(-half_width, 0.0, -half_width),
            max: Vec3::new(half_width, FRAMED_HEIGHT, half_width),
        }
    }

    /// Returns the per-axis size of the room.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns the center point of the room.
    pub fn center(&self) -> Vec3 {
        self.min + self.size() / 2.0
    }
}

/// A uniform scale and translation that place a model inside the room.
///
/// Applied to the scene root as `translate * scale`.
///
/// # Examples
/// ```
/// use glam::Vec3;
/// use modelshot::framing::{FrameTransform, RoomVolume};
///
/// let room = RoomVolume::from_aspect(1.0);
/// let fit = FrameTransform::fit(Vec3::ZERO, Vec3::splat(2.0), &room).unwrap();
/// let matrix = fit.matrix();
/// let center = matrix.transform_point3(Vec3::splat(1.0));
/// assert!((center - room.center()).length() < 1e-4);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FrameTransform {
    /// Uniform scale factor.
    pub scale: f32,
    /// Translation applied after scaling.
    pub translation: Vec3,
}

impl FrameTransform {
    /// Computes the fit for a model bounding box inside `room`.
    ///
    /// The scale is the smallest per-axis room/model size ratio, shrunk by
    /// [`ROOM_PADDING_SCALE`]; the translation moves the scaled model center
    /// onto the room center. Invariant: the scaled model extent never
    /// exceeds the room extent on any axis.
    ///
    /// # Errors
    /// Returns [`Error::DegenerateBounds`] when any model axis has a
    /// non-positive extent, since no finite scale can frame it.
    pub fn fit(model_min: Vec3, model_max: Vec3, room: &RoomVolume) -> Result<Self> {
        let model_size = model_max - model_min;

        for (axis, extent) in [('x', model_size.x), ('y', model_size.y), ('z', model_size.z)] {
            if !(extent.is_finite() && extent > 0.0) {
                return Err(Error::DegenerateBounds { axis });
            }
        }

        let room_size = room.size();

        let mut scale = (room_size.x / model_size.x).min(room_size.y / model_size.y);
        scale = scale.min(room_size.z / model_size.z);
        scale /= ROOM_PADDING_SCALE;

        let model_center = model_min + model_size / 2.0;
        let translation = room.center() - model_center * scale;

        Ok(Self { scale, translation })
    }

    /// Returns the root-node transform matrix for this fit.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translation) * Mat4::from_scale(Vec3::splat(self.scale))
    }
}

/// Derives the room depth used for camera placement.
///
/// A model that is taller than both of its horizontal extents gets a depth
/// based on its own (scaled, padded) footprint; anything else uses the
/// room's nominal depth.
///
/// # Examples
/// ```
/// use glam::Vec3;
/// use modelshot::framing::{room_depth, RoomVolume};
///
/// let room = RoomVolume::from_aspect(1.0);
/// let depth = room_depth(Vec3::new(2.0, 2.0, 2.0), 1.0, &room);
/// assert_eq!(depth, room.size().z);
/// ```
pub fn room_depth(model_size: Vec3, scale: f32, room: &RoomVolume) -> f32 {
    if model_size.y >= model_size.x && model_size.y >= model_size.z {
        model_size.x.max(model_size.z) * scale * ROOM_PADDING_SCALE
    } else {
        room.size().z.abs()
    }
}
