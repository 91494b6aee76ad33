//! Renders fixed-framing PNG preview thumbnails of glTF/GLB models.
//!
//! modelshot loads one or more models, fits their combined bounding box
//! into a virtual room whose proportions follow the output aspect ratio,
//! lets the rendering engine settle for a fixed number of frames, captures
//! exactly one framebuffer readback, and writes it out as a PNG. The
//! framing matches the composition rules of the sibling web viewer so
//! generated previews line up with what users see there.
//!
//! The rendering engine is an in-crate CPU rasterizer; no GPU or window
//! system is required, which keeps the tool usable from batch jobs.
//!
//! # Examples
//! ```no_run
//! use modelshot::config::Config;
//!
//! let config = Config {
//!     width: 512,
//!     height: 512,
//!     output: "preview.png".into(),
//!     inputs: vec!["model.glb".into()],
//!     ..Config::default()
//! };
//! modelshot::app::run(&config).unwrap();
//! ```

pub mod app;
pub mod camera;
pub mod capture;
pub mod config;
pub mod encode;
pub mod engine;
pub mod error;
pub mod formats;
pub mod framing;
pub mod lighting;
