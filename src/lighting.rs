//! Scene lighting: the sun light and the optional image-based ambient term.
//!
//! The sun is a fixed white directional light pointing straight down. When
//! an IBL directory is supplied, the ambient term comes from the
//! spherical-harmonics irradiance coefficients cmgen writes alongside its
//! environment maps (`sh.txt`); the environment is rotated a quarter turn
//! about +Y so it lines up with the skybox orientation.
//!
//! # Examples
//! ```
//! use modelshot::lighting::SunLight;
//!
//! let sun = SunLight::default();
//! assert_eq!(sun.direction.y, -1.0);
//! ```

use std::f32::consts::FRAC_PI_2;
use std::fs;
use std::path::Path;

use glam::{Mat3, Vec3};

use crate::error::{Error, Result};

/// cmgen irradiance coefficients are unbounded; this brings them into the
/// shader's ambient range.
const IBL_AMBIENT_SCALE: f32 = 0.25;

/// A directional light in the scene.
///
/// # Examples
/// ```
/// use glam::Vec3;
/// use modelshot::lighting::SunLight;
///
/// let sun = SunLight { direction: Vec3::NEG_Y, color: [1.0, 0.9, 0.8] };
/// assert_eq!(sun.color[0], 1.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SunLight {
    /// Direction the light travels (normalized).
    pub direction: Vec3,
    /// RGB color of the light.
    pub color: [f32; 3],
}

impl Default for SunLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.0, -1.0, 0.0),
            color: [1.0, 1.0, 1.0],
        }
    }
}

/// Precomputed image-based lighting, reduced to an irradiance term.
///
/// Holds the nine RGB spherical-harmonics coefficients from a cmgen deploy
/// directory, plus the fixed environment rotation.
pub struct IblEnvironment {
    sh: [[f32; 3]; 9],
    rotation: Mat3,
}

impl IblEnvironment {
    /// Loads the environment from a cmgen deploy directory.
    ///
    /// Only `sh.txt` is consumed; the KTX environment maps target GPU
    /// samplers and carry nothing a CPU ambient term can use.
    ///
    /// # Errors
    /// Returns [`Error::Ibl`] when `sh.txt` is missing or malformed.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join("sh.txt");
        let text = fs::read_to_string(&path).map_err(|e| Error::Ibl {
            path: path.clone(),
            message: format!("cannot read sh.txt: {e}"),
        })?;
        let sh = parse_sh(&text).map_err(|message| Error::Ibl {
            path: path.clone(),
            message,
        })?;
        log::debug!("loaded IBL irradiance coefficients from {}", path.display());
        Ok(Self::from_coefficients(sh))
    }

    /// Builds an environment directly from SH coefficients.
    ///
    /// # Examples
    /// ```
    /// use glam::Vec3;
    /// use modelshot::lighting::IblEnvironment;
    ///
    /// let mut sh = [[0.0; 3]; 9];
    /// sh[0] = [0.5, 0.5, 0.5];
    /// let ibl = IblEnvironment::from_coefficients(sh);
    /// let ambient = ibl.ambient(Vec3::Y);
    /// assert!(ambient[0] > 0.0);
    /// ```
    pub fn from_coefficients(sh: [[f32; 3]; 9]) -> Self {
        Self {
            sh,
            rotation: Mat3::from_rotation_y(FRAC_PI_2),
        }
    }

    /// Evaluates the ambient color for a surface normal.
    ///
    /// Sampling the rotated environment at `n` is sampling the original at
    /// the inverse-rotated normal.
    pub fn ambient(&self, normal: Vec3) -> [f32; 3] {
        let n = self.rotation.transpose() * normal;
        let (x, y, z) = (n.x, n.y, n.z);

        // Coefficients are pre-scaled by cmgen for direct polynomial
        // evaluation, band 0 through band 2.
        let basis = [
            1.0,
            y,
            z,
            x,
            x * y,
            y * z,
            3.0 * z * z - 1.0,
            x * z,
            x * x - y * y,
        ];

        let mut out = [0.0f32; 3];
        for (sh, b) in self.sh.iter().zip(basis) {
            out[0] += sh[0] * b;
            out[1] += sh[1] * b;
            out[2] += sh[2] * b;
        }
        [
            (out[0] * IBL_AMBIENT_SCALE).clamp(0.0, 1.0),
            (out[1] * IBL_AMBIENT_SCALE).clamp(0.0, 1.0),
            (out[2] * IBL_AMBIENT_SCALE).clamp(0.0, 1.0),
        ]
    }
}

/// Parses the nine RGB coefficient rows out of a cmgen `sh.txt`.
///
/// cmgen formats each row as a parenthesized triple with a trailing
/// comment; the parser just pulls the first three numbers from each
/// non-empty line.
fn parse_sh(text: &str) -> std::result::Result<[[f32; 3]; 9], String> {
    let mut rows = Vec::new();

    for line in text.lines() {
        let floats = extract_floats(line);
        if floats.len() >= 3 {
            rows.push([floats[0], floats[1], floats[2]]);
        }
    }

    if rows.len() < 9 {
        return Err(format!(
            "expected 9 SH coefficient rows, found {}",
            rows.len()
        ));
    }

    let mut sh = [[0.0f32; 3]; 9];
    sh.copy_from_slice(&rows[..9]);
    Ok(sh)
}

/// Pulls leading numeric tokens out of a line, stopping at a comment.
fn extract_floats(line: &str) -> Vec<f32> {
    let line = line.split("//").next().unwrap_or("");
    line.split(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
        .filter(|tok| !tok.is_empty())
        .filter_map(|tok| tok.parse::<f32>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_SH: &str = "\
( 0.592,  0.580,  0.544); // L00, irradiance, pre-scaled base
( 0.104,  0.120,  0.140); // L1-1, irradiance, pre-scaled base
( 0.215,  0.215,  0.200); // L10, irradiance, pre-scaled base
(-0.018, -0.019, -0.020); // L11, irradiance, pre-scaled base
(-0.008, -0.008, -0.009); // L2-2, irradiance, pre-scaled base
( 0.035,  0.041,  0.050); // L2-1, irradiance, pre-scaled base
( 0.020,  0.019,  0.016); // L20, irradiance, pre-scaled base
(-0.009, -0.010, -0.011); // L21, irradiance, pre-scaled base
(-0.037, -0.036, -0.032); // L22, irradiance, pre-scaled base
";

    #[test]
    fn test_parse_sh_reads_nine_rows() {
        let sh = parse_sh(SAMPLE_SH).unwrap();
        assert!((sh[0][0] - 0.592).abs() < 1e-6);
        assert!((sh[3][0] + 0.018).abs() < 1e-6);
        assert!((sh[8][2] + 0.032).abs() < 1e-6);
    }

    #[test]
    fn test_parse_sh_rejects_short_files() {
        let err = parse_sh("( 1.0, 1.0, 1.0);\n").unwrap_err();
        assert!(err.contains("expected 9"));
    }

    #[test]
    fn test_constant_band_is_direction_independent() {
        let mut sh = [[0.0; 3]; 9];
        sh[0] = [1.0, 2.0, 3.0];
        let ibl = IblEnvironment::from_coefficients(sh);

        let up = ibl.ambient(Vec3::Y);
        let side = ibl.ambient(Vec3::X);
        assert_eq!(up, side);
        assert!((up[0] - 1.0 * IBL_AMBIENT_SCALE).abs() < 1e-6);
    }

    #[test]
    fn test_ambient_is_clamped() {
        let mut sh = [[0.0; 3]; 9];
        sh[0] = [100.0, -100.0, 0.5];
        let ibl = IblEnvironment::from_coefficients(sh);

        let ambient = ibl.ambient(Vec3::Z);
        assert_eq!(ambient[0], 1.0);
        assert_eq!(ambient[1], 0.0);
    }

    #[test]
    fn test_environment_rotation_quarter_turn() {
        // Band-1 x lobe only: after the quarter-turn about +Y, sampling
        // along -Z sees what +X saw before.
        let mut sh = [[0.0; 3]; 9];
        sh[3] = [1.0, 1.0, 1.0];
        let ibl = IblEnvironment::from_coefficients(sh);

        let rotated = ibl.ambient(Vec3::NEG_Z);
        let unrotated = IblEnvironment {
            sh,
            rotation: Mat3::IDENTITY,
        }
        .ambient(Vec3::X);
        assert!((rotated[0] - unrotated[0]).abs() < 1e-6);
    }
}
