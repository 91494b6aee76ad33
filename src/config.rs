//! Provides the run configuration parsed from the command line.
//!
//! A [`Config`] is built once at startup and stays immutable for the rest of
//! the process.
//!
//! # Examples
//! ```
//! use modelshot::config::Config;
//!
//! let config = Config::default();
//! assert_eq!((config.width, config.height), (800, 600));
//! ```

use std::path::PathBuf;

/// Immutable settings for a single render run.
///
/// # Examples
/// ```
/// use modelshot::config::Config;
///
/// let config = Config {
///     width: 640,
///     height: 480,
///     ..Config::default()
/// };
/// assert!((config.aspect() - 4.0 / 3.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Destination path for the rendered PNG.
    pub output: PathBuf,
    /// Optional directory of precomputed IBL assets (cmgen deploy layout).
    pub ibl: Option<PathBuf>,
    /// Model files to load into the scene (glTF/GLB).
    pub inputs: Vec<PathBuf>,
}

impl Config {
    /// Returns the output aspect ratio (width over height).
    ///
    /// # Examples
    /// ```
    /// use modelshot::config::Config;
    ///
    /// let config = Config { width: 600, height: 600, ..Config::default() };
    /// assert_eq!(config.aspect(), 1.0);
    /// ```
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            output: PathBuf::from("output.png"),
            ibl: None,
            inputs: Vec::new(),
        }
    }
}
