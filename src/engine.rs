//! The CPU rendering engine that stands in for a GPU renderer.
//!
//! Owns the scene, the camera, and a double-buffered framebuffer. Each
//! [`Engine::render`] call rasterizes the scene into the back buffer
//! (perspective projection, z-buffer, flat shading, base-color textures
//! with alpha cutoff) and presents it. Framebuffer readbacks requested via
//! [`Engine::read_pixels`] complete asynchronously: the pixels arrive
//! through a single-shot channel on a later frame, mirroring how a GPU
//! readback signals completion after the fact.
//!
//! No GPU is required; everything runs on the CPU.

use std::sync::mpsc::{self, Receiver, Sender};

use glam::{Mat4, Vec3, Vec4};

use crate::formats::{SceneData, Triangle};
use crate::lighting::{IblEnvironment, SunLight};

/// Ambient term used when no IBL is loaded.
const DEFAULT_AMBIENT: f32 = 0.15;

/// The raw result of a framebuffer readback.
///
/// Tightly packed RGB8 rows, top-to-bottom.
///
/// # Examples
/// ```
/// use modelshot::engine::CaptureBuffer;
///
/// let capture = CaptureBuffer {
///     width: 2,
///     height: 1,
///     stride: 6,
///     pixels: vec![0; 6],
/// };
/// assert_eq!(capture.pixels.len(), capture.stride * capture.height as usize);
/// ```
pub struct CaptureBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bytes per row.
    pub stride: usize,
    /// RGB8 pixel data.
    pub pixels: Vec<u8>,
}

/// The engine-side camera: a projection and a pose.
///
/// The pose is the camera's model matrix (camera-to-world); the view matrix
/// is its inverse. Both start at identity and are expected to be driven by
/// the rig every frame.
///
/// # Examples
/// ```
/// use glam::Mat4;
/// use modelshot::engine::Camera;
///
/// let mut camera = Camera::default();
/// camera.set_projection(45.0, 1.0, 0.1, 100.0);
/// camera.set_model_matrix(Mat4::IDENTITY);
/// ```
#[derive(Debug, Default)]
pub struct Camera {
    projection: Mat4,
    model: Mat4,
}

impl Camera {
    /// Sets a perspective projection from a vertical field of view in
    /// degrees.
    pub fn set_projection(&mut self, fov_degrees: f32, aspect: f32, near: f32, far: f32) {
        self.projection = Mat4::perspective_rh_gl(fov_degrees.to_radians(), aspect, near, far);
    }

    /// Sets the camera pose (camera-to-world transform).
    pub fn set_model_matrix(&mut self, model: Mat4) {
        self.model = model;
    }

    /// Returns the combined view-projection matrix.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.model.inverse()
    }
}

/// Everything the engine draws: geometry, its root transform, and lights.
pub struct Scene {
    /// World-space triangle soup from the importer.
    pub triangles: Vec<Triangle>,
    /// Transform applied to every vertex (the framer's fit).
    pub root_transform: Mat4,
    /// The directional sun light.
    pub sun: SunLight,
    /// Optional image-based ambient term.
    pub ibl: Option<IblEnvironment>,
}

impl Scene {
    /// Wraps imported scene data with default lighting and an identity
    /// root transform.
    pub fn new(data: SceneData) -> Self {
        Self {
            triangles: data.triangles,
            root_transform: Mat4::IDENTITY,
            sun: SunLight::default(),
            ibl: None,
        }
    }
}

/// The software rendering engine.
pub struct Engine {
    width: u32,
    height: u32,
    scene: Scene,
    camera: Camera,
    // Back buffer
    color: Vec<[f32; 3]>,
    depth: Vec<f32>,
    // Last presented frame, RGB8
    front: Option<Vec<u8>>,
    pending: Vec<Sender<CaptureBuffer>>,
    frames: u64,
}

impl Engine {
    /// Creates an engine with an empty framebuffer of the given size.
    pub fn new(width: u32, height: u32, scene: Scene) -> Self {
        let pixel_count = width as usize * height as usize;
        Self {
            width,
            height,
            scene,
            camera: Camera::default(),
            color: vec![[0.0; 3]; pixel_count],
            depth: vec![f32::INFINITY; pixel_count],
            front: None,
            pending: Vec::new(),
            frames: 0,
        }
    }

    /// Returns the output dimensions.
    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the scene for mutation (root transform, lights).
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Returns the camera for the rig to drive.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Returns the number of frames rendered so far.
    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    /// Requests an asynchronous readback of the presented framebuffer.
    ///
    /// The pixels are delivered through the returned single-shot channel
    /// once the engine presents its next frame; each request completes
    /// exactly once.
    pub fn read_pixels(&mut self) -> Receiver<CaptureBuffer> {
        let (tx, rx) = mpsc::channel();
        self.pending.push(tx);
        rx
    }

    /// Renders one frame: completes queued readbacks against the last
    /// presented frame, rasterizes the scene, and presents.
    pub fn render(&mut self) {
        self.complete_readbacks();
        self.clear();
        self.rasterize();
        self.present();
        self.frames += 1;
    }

    fn complete_readbacks(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        if let Some(front) = &self.front {
            let stride = self.width as usize * 3;
            for tx in self.pending.drain(..) {
                // A dropped receiver just means nobody wants the pixels
                let _ = tx.send(CaptureBuffer {
                    width: self.width,
                    height: self.height,
                    stride,
                    pixels: front.clone(),
                });
            }
        }
    }

    fn clear(&mut self) {
        self.color.fill([0.0; 3]);
        self.depth.fill(f32::INFINITY);
    }

    fn rasterize(&mut self) {
        let w = self.width as usize;
        let h = self.height as usize;
        let width = self.width as f32;
        let height = self.height as f32;

        let view_proj = self.camera.view_projection();
        let scene = &self.scene;
        let root = scene.root_transform;
        let color_buf = &mut self.color;
        let depth_buf = &mut self.depth;

        for tri in &scene.triangles {
            let mut clip = [Vec4::ZERO; 3];
            let mut screen = [Vec3::ZERO; 3];
            let mut world = [Vec3::ZERO; 3];
            let mut visible = true;

            for i in 0..3 {
                world[i] = root.transform_point3(Vec3::from_array(tri.verts[i]));
                clip[i] = view_proj * world[i].extend(1.0);

                if clip[i].w <= 0.0 {
                    visible = false;
                    break;
                }

                let inv_w = 1.0 / clip[i].w;
                screen[i] = Vec3::new(
                    (clip[i].x * inv_w * 0.5 + 0.5) * width,
                    (0.5 - clip[i].y * inv_w * 0.5) * height,
                    clip[i].z * inv_w,
                );
            }

            if !visible {
                continue;
            }

            // Face normal in world space (flat shading)
            let e1 = world[1] - world[0];
            let e2 = world[2] - world[0];
            let normal = e1.cross(e2).normalize_or_zero();

            let ndl = normal.dot(-scene.sun.direction).abs();
            let ambient = match &scene.ibl {
                Some(ibl) => ibl.ambient(normal),
                None => [DEFAULT_AMBIENT; 3],
            };
            let specular = ndl.powf(32.0) * 0.10;
            let shade = [
                (ambient[0] + ndl * 0.60 * scene.sun.color[0] + specular).min(1.0),
                (ambient[1] + ndl * 0.60 * scene.sun.color[1] + specular).min(1.0),
                (ambient[2] + ndl * 0.60 * scene.sun.color[2] + specular).min(1.0),
            ];

            // Screen-space bounding box
            let min_x = screen[0].x.min(screen[1].x).min(screen[2].x).max(0.0) as usize;
            let max_x = (screen[0].x.max(screen[1].x).max(screen[2].x).ceil() as usize).min(w);
            let min_y = screen[0].y.min(screen[1].y).min(screen[2].y).max(0.0) as usize;
            let max_y = (screen[0].y.max(screen[1].y).max(screen[2].y).ceil() as usize).min(h);

            for y in min_y..max_y {
                for x in min_x..max_x {
                    let px = x as f32 + 0.5;
                    let py = y as f32 + 0.5;

                    let (u_bary, v_bary, w_bary) = barycentric(screen, px, py);

                    if u_bary >= 0.0 && v_bary >= 0.0 && w_bary >= 0.0 {
                        let z = u_bary * screen[0].z + v_bary * screen[1].z + w_bary * screen[2].z;
                        let idx = y * w + x;

                        if z < depth_buf[idx] {
                            depth_buf[idx] = z;

                            let tex_u = u_bary * tri.uvs[0][0]
                                + v_bary * tri.uvs[1][0]
                                + w_bary * tri.uvs[2][0];
                            let tex_v = u_bary * tri.uvs[0][1]
                                + v_bary * tri.uvs[1][1]
                                + w_bary * tri.uvs[2][1];

                            // Sample texture if available, otherwise base color
                            let (base, alpha) = if let Some(ref tex) = tri.texture {
                                let sampled = tex.sample(tex_u, tex_v);
                                (
                                    [
                                        sampled[0] * tri.color[0],
                                        sampled[1] * tri.color[1],
                                        sampled[2] * tri.color[2],
                                    ],
                                    sampled[3],
                                )
                            } else {
                                (tri.color, 1.0)
                            };

                            // Alpha cutoff - skip fully transparent texels
                            if alpha < 0.5 {
                                continue;
                            }

                            color_buf[idx] = [
                                (base[0] * shade[0]).min(1.0),
                                (base[1] * shade[1]).min(1.0),
                                (base[2] * shade[2]).min(1.0),
                            ];
                        }
                    }
                }
            }
        }
    }

    fn present(&mut self) {
        let mut pixels = vec![0u8; self.color.len() * 3];
        for (i, texel) in self.color.iter().enumerate() {
            pixels[i * 3] = (texel[0].clamp(0.0, 1.0) * 255.0) as u8;
            pixels[i * 3 + 1] = (texel[1].clamp(0.0, 1.0) * 255.0) as u8;
            pixels[i * 3 + 2] = (texel[2].clamp(0.0, 1.0) * 255.0) as u8;
        }
        self.front = Some(pixels);
    }
}

fn barycentric(tri: [Vec3; 3], px: f32, py: f32) -> (f32, f32, f32) {
    let v0x = tri[1].x - tri[0].x;
    let v0y = tri[1].y - tri[0].y;
    let v1x = tri[2].x - tri[0].x;
    let v1y = tri[2].y - tri[0].y;
    let v2x = px - tri[0].x;
    let v2y = py - tri[0].y;

    let d00 = v0x * v0x + v0y * v0y;
    let d01 = v0x * v1x + v0y * v1y;
    let d11 = v1x * v1x + v1y * v1y;
    let d20 = v2x * v0x + v2y * v0y;
    let d21 = v2x * v1x + v2y * v1y;

    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < 1e-10 {
        return (-1.0, -1.0, -1.0);
    }

    let inv = 1.0 / denom;
    let v = (d11 * d20 - d01 * d21) * inv;
    let w = (d00 * d21 - d01 * d20) * inv;
    let u = 1.0 - v - w;

    (u, v, w)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_scene() -> Scene {
        // One triangle facing the camera, a couple units out
        let tri = Triangle {
            verts: [[-1.0, -1.0, -3.0], [1.0, -1.0, -3.0], [0.0, 1.0, -3.0]],
            uvs: [[0.0, 0.0]; 3],
            color: [1.0, 0.0, 0.0],
            texture: None,
        };
        Scene::new(crate::formats::SceneData::from_triangles(vec![tri]).unwrap())
    }

    fn framed_engine() -> Engine {
        let mut engine = Engine::new(32, 32, test_scene());
        engine
            .camera_mut()
            .set_projection(45.0, 1.0, 0.1, 100.0);
        engine.camera_mut().set_model_matrix(Mat4::IDENTITY);
        engine
    }

    #[test]
    fn test_render_produces_nonempty_frame() {
        let mut engine = framed_engine();
        engine.render();

        let rx = engine.read_pixels();
        engine.render();
        let capture = rx.try_recv().unwrap();

        assert_eq!(capture.width, 32);
        assert_eq!(capture.stride, 32 * 3);
        assert_eq!(capture.pixels.len(), 32 * 32 * 3);
        assert!(capture.pixels.iter().any(|&b| b > 0));
    }

    #[test]
    fn test_readback_completes_on_later_frame() {
        let mut engine = framed_engine();
        engine.render();

        let rx = engine.read_pixels();
        // Nothing arrives until the engine presents another frame
        assert!(rx.try_recv().is_err());

        engine.render();
        assert!(rx.try_recv().is_ok());
        // Single-shot: the channel never fires twice
        engine.render();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_behind_camera_geometry_is_culled() {
        let tri = Triangle {
            verts: [[-1.0, -1.0, 3.0], [1.0, -1.0, 3.0], [0.0, 1.0, 3.0]],
            uvs: [[0.0, 0.0]; 3],
            color: [1.0, 1.0, 1.0],
            texture: None,
        };
        let scene = Scene::new(crate::formats::SceneData::from_triangles(vec![tri]).unwrap());
        let mut engine = Engine::new(16, 16, scene);
        engine.camera_mut().set_projection(45.0, 1.0, 0.1, 100.0);

        engine.render();
        let rx = engine.read_pixels();
        engine.render();
        let capture = rx.try_recv().unwrap();
        assert!(capture.pixels.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_root_transform_moves_geometry() {
        let mut engine = framed_engine();
        // Push the triangle far outside the frustum
        engine.scene_mut().root_transform = Mat4::from_translation(glam::Vec3::X * 1000.0);

        engine.render();
        let rx = engine.read_pixels();
        engine.render();
        let capture = rx.try_recv().unwrap();
        assert!(capture.pixels.iter().all(|&b| b == 0));
    }
}
