//! Integration tests for the framing, camera, and capture contracts.
//!
//! These pin down the composition rules the generated previews share with
//! the sibling web viewer: the fit scale, the near-plane derivation, and
//! the one-shot capture gating.

use glam::Vec3;

use modelshot::camera::CameraRig;
use modelshot::capture::{CaptureController, Phase, FRAME_TO_SKIP};
use modelshot::encode;
use modelshot::error::Error;
use modelshot::framing::{room_depth, FrameTransform, RoomVolume, ROOM_PADDING_SCALE};

// ===========================================================================
// Framing
// ===========================================================================

#[test]
fn test_square_output_frames_unit_cube_at_documented_scale() {
    // width=600, height=600: aspect 1, half-width 5, room 10x10x10; a
    // 2x2x2 model lands at min(10/2, 10/2, 10/2) / 1.01.
    let room = RoomVolume::from_aspect(600.0 / 600.0);
    let fit = FrameTransform::fit(Vec3::splat(-1.0), Vec3::splat(1.0), &room).unwrap();
    assert!((fit.scale - 4.95).abs() < 0.01);
}

#[test]
fn test_any_positive_bounds_stay_inside_room() {
    let boxes = [
        (Vec3::new(-0.01, 0.0, -0.01), Vec3::new(0.01, 0.02, 0.01)),
        (Vec3::new(-50.0, -1.0, -3.0), Vec3::new(20.0, 1.0, 3.0)),
        (Vec3::new(5.0, 5.0, 5.0), Vec3::new(5.5, 25.0, 6.0)),
    ];
    let aspects = [0.5, 1.0, 4.0 / 3.0, 16.0 / 9.0];

    for (min, max) in boxes {
        for aspect in aspects {
            let room = RoomVolume::from_aspect(aspect);
            let fit = FrameTransform::fit(min, max, &room).unwrap();
            assert!(fit.scale > 0.0);
            assert!(fit.scale.is_finite());

            let scaled = (max - min) * fit.scale;
            let room_size = room.size();
            assert!(
                scaled.x <= room_size.x && scaled.y <= room_size.y && scaled.z <= room_size.z,
                "model {scaled} vs room {room_size} at aspect {aspect}"
            );
        }
    }
}

#[test]
fn test_flat_model_is_rejected_not_infinite() {
    let room = RoomVolume::from_aspect(1.0);
    let result = FrameTransform::fit(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0), &room);
    assert!(matches!(result, Err(Error::DegenerateBounds { axis: 'z' })));
}

#[test]
fn test_tall_model_drives_room_depth_from_footprint() {
    let room = RoomVolume::from_aspect(1.0);
    let model_size = Vec3::new(2.0, 9.0, 1.0);
    let scale = 1.1;
    let depth = room_depth(model_size, scale, &room);
    assert!((depth - 2.0 * scale * ROOM_PADDING_SCALE).abs() < 1e-5);
}

// ===========================================================================
// Camera rig
// ===========================================================================

#[test]
fn test_near_plane_for_800_by_600() {
    let rig = CameraRig::new(800.0 / 600.0, 10.0);
    // (10/2) / tan(22.5 deg)
    assert!((rig.near_plane() - 12.0710678).abs() < 1e-3);
}

#[test]
fn test_camera_sits_behind_half_room_depth() {
    let rig = CameraRig::new(1.0, 8.0);
    let eye = rig.eye();
    assert_eq!(eye.x, 0.0);
    assert_eq!(eye.y, 5.0);
    assert!((eye.z - (4.0 + rig.near_plane())).abs() < 1e-4);
}

// ===========================================================================
// Capture gating
// ===========================================================================

#[test]
fn test_one_capture_per_run_at_skip_plus_one() {
    let mut controller = CaptureController::new(FRAME_TO_SKIP);
    let mut capture_frames = Vec::new();
    for frame in 0..50 {
        if controller.end_frame() {
            capture_frames.push(frame);
        }
    }
    assert_eq!(capture_frames, vec![FRAME_TO_SKIP + 1]);
}

#[test]
fn test_controller_closes_only_after_completion() {
    let mut controller = CaptureController::new(FRAME_TO_SKIP);
    for _ in 0..=FRAME_TO_SKIP + 5 {
        controller.end_frame();
        assert!(!controller.should_close());
    }
    assert_eq!(controller.phase(), Phase::Capturing);
    controller.complete();
    assert!(controller.should_close());
}

// ===========================================================================
// Pixel normalization
// ===========================================================================

#[test]
fn test_saturated_capture_normalizes_to_unit_channels() {
    let width = 8;
    let height = 4;
    let stride = width as usize * 3;
    let pixels = vec![255u8; stride * height as usize];

    let image = encode::normalize_rgb8(width, height, stride, &pixels);
    for y in 0..height {
        for x in 0..width {
            assert_eq!(image.pixel(x, y), [1.0, 1.0, 1.0]);
        }
    }
}
