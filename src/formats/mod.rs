//! Model import: loaders and the unified scene representation.
//!
//! Loaders turn model files into a flat triangle soup with axis-aligned
//! bounds, which is all the rasterizer and the framer need. The loader
//! seam is a trait so detection stays uniform (extension first, then
//! content sniffing); the CLI contract only admits glTF/GLB, so that is
//! the one registered format.
//!
//! # Examples
//! ```
//! use modelshot::formats;
//!
//! let result = formats::load_scene(b"invalid", None);
//! assert!(result.is_err());
//! ```

pub mod gltf;

use std::path::Path;
use std::sync::Arc;

use glam::Vec3;

/// Represents loaded texture data for sampling.
///
/// # Examples
/// ```
/// use modelshot::formats::TextureData;
///
/// let tex = TextureData {
///     width: 1,
///     height: 1,
///     data: vec![255, 255, 255, 255],
/// };
/// assert_eq!(tex.sample(0.5, 0.5), [1.0, 1.0, 1.0, 1.0]);
/// ```
#[derive(Clone)]
pub struct TextureData {
    /// The texture width in pixels.
    pub width: u32,
    /// The texture height in pixels.
    pub height: u32,
    /// RGBA pixel data stored row-major.
    pub data: Vec<u8>,
}

impl TextureData {
    /// Samples the texture at UV coordinates (with wrapping).
    pub fn sample(&self, u: f32, v: f32) -> [f32; 4] {
        // Wrap UVs to [0, 1)
        let u = u.fract();
        let v = v.fract();
        let u = if u < 0.0 { u + 1.0 } else { u };
        let v = if v < 0.0 { v + 1.0 } else { v };

        let x = ((u * self.width as f32) as u32).min(self.width.saturating_sub(1));
        let y = ((v * self.height as f32) as u32).min(self.height.saturating_sub(1));
        let idx = ((y * self.width + x) * 4) as usize;

        if idx + 3 < self.data.len() {
            [
                self.data[idx] as f32 / 255.0,
                self.data[idx + 1] as f32 / 255.0,
                self.data[idx + 2] as f32 / 255.0,
                self.data[idx + 3] as f32 / 255.0,
            ]
        } else {
            [1.0, 1.0, 1.0, 1.0]
        }
    }
}

/// A world-space triangle with UVs, base color, and optional texture.
pub struct Triangle {
    /// Vertex positions.
    pub verts: [[f32; 3]; 3],
    /// UV coordinates per vertex.
    pub uvs: [[f32; 2]; 3],
    /// Base RGB color.
    pub color: [f32; 3],
    /// Optional base-color texture.
    pub texture: Option<Arc<TextureData>>,
}

/// A loaded scene: triangle soup plus its axis-aligned bounds.
///
/// Bounds are computed by the importer over the world-space vertices, so
/// the framer can consume them without another pass.
///
/// # Examples
/// ```
/// use modelshot::formats::{SceneData, Triangle};
///
/// let tri = Triangle {
///     verts: [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 2.0, 0.0]],
///     uvs: [[0.0, 0.0]; 3],
///     color: [1.0, 1.0, 1.0],
///     texture: None,
/// };
/// let scene = SceneData::from_triangles(vec![tri]).unwrap();
/// assert_eq!(scene.size().y, 2.0);
/// ```
pub struct SceneData {
    /// Triangles ready for rasterization.
    pub triangles: Vec<Triangle>,
    /// Minimum corner of the bounding box.
    pub min: Vec3,
    /// Maximum corner of the bounding box.
    pub max: Vec3,
}

impl SceneData {
    /// Builds a scene from triangles, computing bounds.
    ///
    /// # Errors
    /// Returns [`LoadError::NoGeometry`] for an empty triangle list.
    pub fn from_triangles(triangles: Vec<Triangle>) -> Result<Self, LoadError> {
        if triangles.is_empty() {
            return Err(LoadError::NoGeometry);
        }

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for tri in &triangles {
            for v in &tri.verts {
                let p = Vec3::from_array(*v);
                min = min.min(p);
                max = max.max(p);
            }
        }

        Ok(Self { triangles, min, max })
    }

    /// Folds another scene into this one, merging triangles and bounds.
    pub fn merge(&mut self, other: SceneData) {
        self.triangles.extend(other.triangles);
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Returns the per-axis size of the bounding box.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// The result type for format loading.
pub type LoadResult = Result<SceneData, LoadError>;

/// Errors that can occur during model loading.
///
/// # Examples
/// ```
/// use modelshot::formats::LoadError;
///
/// let err = LoadError::NoGeometry;
/// assert_eq!(format!("{}", err), "no geometry found");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Represents invalid or corrupted file data.
    #[error("invalid data: {0}")]
    InvalidData(String),
    /// Indicates the file format is not recognized.
    #[error("unrecognized format")]
    UnrecognizedFormat,
    /// Represents an IO error reading the file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Indicates no geometry was found in the model.
    #[error("no geometry found")]
    NoGeometry,
}

/// A trait for format-specific model loaders.
///
/// # Examples
/// ```
/// use modelshot::formats::{self, FormatLoader};
///
/// let loader = formats::gltf::GltfLoader;
/// assert_eq!(loader.name(), "glTF");
/// ```
pub trait FormatLoader: Send + Sync {
    /// Returns the human-readable name for this format.
    fn name(&self) -> &'static str;

    /// Returns the file extensions this loader handles (lowercase, without
    /// dot).
    fn extensions(&self) -> &'static [&'static str];

    /// Checks whether this loader can handle the given data.
    ///
    /// This should be a quick check (magic bytes, initial JSON structure)
    /// without fully parsing the file.
    fn can_load(&self, data: &[u8], extension: Option<&str>) -> bool;

    /// Loads a scene from raw bytes.
    ///
    /// # Errors
    /// Returns an error if the data cannot be parsed or contains no
    /// geometry.
    fn load_from_bytes(&self, data: &[u8]) -> LoadResult;

    /// Loads a scene from a file path.
    ///
    /// Default implementation reads the file and calls `load_from_bytes`,
    /// but loaders can override this to resolve external resources.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    fn load_from_path(&self, path: &Path) -> LoadResult {
        let data = std::fs::read(path)?;
        self.load_from_bytes(&data)
    }
}

/// Returns all registered format loaders.
///
/// # Examples
/// ```
/// use modelshot::formats;
///
/// assert!(!formats::get_loaders().is_empty());
/// ```
pub fn get_loaders() -> Vec<Box<dyn FormatLoader>> {
    vec![Box::new(gltf::GltfLoader)]
}

/// Finds a loader that can handle the given data and extension.
///
/// # Examples
/// ```
/// use modelshot::formats;
///
/// assert!(formats::find_loader(b"glTF", Some("glb")).is_some());
/// ```
pub fn find_loader(data: &[u8], extension: Option<&str>) -> Option<Box<dyn FormatLoader>> {
    let mut loaders = get_loaders();

    // First, try to match by extension if provided
    if let Some(ext) = extension {
        let ext_lower = ext.to_lowercase();
        if let Some(idx) = loaders.iter().position(|loader| {
            loader.extensions().contains(&ext_lower.as_str())
                && loader.can_load(data, Some(&ext_lower))
        }) {
            return Some(loaders.swap_remove(idx));
        }
    }

    // Fall back to content-based detection
    loaders
        .into_iter()
        .find(|loader| loader.can_load(data, extension))
}

/// Loads a scene from bytes, auto-detecting the format.
///
/// # Errors
/// Returns an error if no loader recognizes the data or parsing fails.
pub fn load_scene(data: &[u8], extension: Option<&str>) -> LoadResult {
    find_loader(data, extension)
        .ok_or(LoadError::UnrecognizedFormat)?
        .load_from_bytes(data)
}

/// Loads a scene from a file path, auto-detecting the format.
///
/// # Errors
/// Returns an error if the file cannot be read or the format is
/// unrecognized.
///
/// # Examples
/// ```
/// use std::path::Path;
///
/// use modelshot::formats;
///
/// let result = formats::load_scene_from_path(Path::new("does_not_exist.gltf"));
/// assert!(result.is_err());
/// ```
pub fn load_scene_from_path(path: &Path) -> LoadResult {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase());

    let data = std::fs::read(path)?;

    let loader = find_loader(&data, extension.as_deref()).ok_or(LoadError::UnrecognizedFormat)?;

    // Use path-based loading for formats that resolve external resources
    loader.load_from_path(path)
}
