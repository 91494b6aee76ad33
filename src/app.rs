//! The one-shot render loop driver.
//!
//! Wires the whole pipeline together: load the models, fit them into the
//! room, then run the engine's frame loop (pre-render, render, post-render)
//! until the gated readback completes, and write the PNG.
//!
//! All run state lives in locals here rather than process-wide globals, so
//! the lifecycle is visible in one place.
//!
//! # Examples
//! ```no_run
//! use modelshot::config::Config;
//!
//! let config = Config {
//!     inputs: vec!["model.glb".into()],
//!     ..Config::default()
//! };
//! modelshot::app::run(&config).unwrap();
//! ```

use std::path::PathBuf;
use std::sync::mpsc::Receiver;

use log::{debug, info};

use crate::camera::CameraRig;
use crate::capture::{CaptureController, FRAME_TO_SKIP};
use crate::config::Config;
use crate::encode;
use crate::engine::{CaptureBuffer, Engine, Scene};
use crate::error::Result;
use crate::formats::{self, LoadError, SceneData};
use crate::framing::{room_depth, FrameTransform, RoomVolume};
use crate::lighting::IblEnvironment;

/// Renders the configured scene once and writes the PNG.
///
/// # Errors
/// Fails when a model cannot be loaded, its bounds cannot be framed, the
/// IBL directory is unusable, or the output cannot be written.
pub fn run(config: &Config) -> Result<()> {
    let scene_data = load_inputs(&config.inputs)?;

    // Scale and translate the model the way the web viewer frames one
    let aspect = config.aspect();
    let room = RoomVolume::from_aspect(aspect);
    let fit = FrameTransform::fit(scene_data.min, scene_data.max, &room)?;
    let depth = room_depth(scene_data.size(), fit.scale, &room);
    let rig = CameraRig::new(aspect, depth);

    debug!(
        "framed scene: scale {:.4}, translation {}, room depth {:.4}",
        fit.scale, fit.translation, depth
    );

    let mut scene = Scene::new(scene_data);
    scene.root_transform = fit.matrix();
    if let Some(dir) = &config.ibl {
        scene.ibl = Some(IblEnvironment::load(dir)?);
    }

    let mut engine = Engine::new(config.width, config.height, scene);
    let mut controller = CaptureController::new(FRAME_TO_SKIP);
    let mut pending: Option<Receiver<CaptureBuffer>> = None;

    let capture = loop {
        // Pre-render: the rig re-applies projection and pose every frame
        rig.apply(engine.camera_mut());

        engine.render();

        // Post-render: advance the gate, then poll the pending readback
        if controller.end_frame() {
            info!("rendering");
            pending = Some(engine.read_pixels());
        }

        if let Some(rx) = &pending {
            if let Ok(capture) = rx.try_recv() {
                controller.complete();
                break capture;
            }
        }
    };

    debug!(
        "captured frame after {} rendered frames",
        engine.frames_rendered()
    );

    let image = encode::normalize_rgb8(
        capture.width,
        capture.height,
        capture.stride,
        &capture.pixels,
    );
    encode::write_png(&image, &config.output)?;
    info!("wrote {}", config.output.display());

    Ok(())
}

/// Loads every input file and merges the results into one scene.
fn load_inputs(paths: &[PathBuf]) -> Result<SceneData> {
    let mut merged: Option<SceneData> = None;
    for path in paths {
        debug!("loading {}", path.display());
        let scene = formats::load_scene_from_path(path)?;
        match &mut merged {
            Some(existing) => existing.merge(scene),
            None => merged = Some(scene),
        }
    }
    Ok(merged.ok_or(LoadError::NoGeometry)?)
}
