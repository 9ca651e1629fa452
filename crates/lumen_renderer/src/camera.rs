//! Thin-lens camera for ray generation.
//!
//! The pinhole direction through a pixel comes from the vertical field of
//! view, the aspect ratio and the zoom (focal length). With a non-zero
//! aperture the ray origin is jittered over a lens disk and re-aimed at the
//! point the pinhole ray reaches after `focus_distance`, giving depth of
//! field.

use lumen_math::{Quat, Vec2, Vec3};
use rand::RngCore;

use crate::sampling::{random_in_unit_disk, sample_square};
use crate::Ray;

const MIN_FOCAL_LENGTH: f32 = 0.1;
const MAX_FOCAL_LENGTH: f32 = 20.0;
const MIN_FOCUS_DISTANCE: f32 = 1e-3;

/// Camera for generating rays into the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    image_width: u32,
    image_height: u32,

    // Orthonormal basis
    position: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,

    // Lens settings
    vfov: f32,           // Vertical field of view in degrees at focal length 1
    aperture: f32,       // Lens disk radius
    focal_length: f32,   // Zoom factor
    focus_distance: f32, // Distance along the pinhole ray that stays sharp
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            image_width: 640,
            image_height: 480,
            position: Vec3::ZERO,
            forward: -Vec3::Z,
            right: Vec3::X,
            up: Vec3::Y,
            vfov: 45.0,
            aperture: 0.0,
            focal_length: 1.0,
            focus_distance: 1.0,
        }
    }

    /// Camera at `look_from` aimed at `look_at` with default lens settings.
    pub fn look_at(look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        Self::new().with_position(look_from, look_at, vup)
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width.max(1);
        self.image_height = height.max(1);
        self
    }

    /// Place the camera at `look_from` looking towards `look_at`.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.position = look_from;
        self.forward = (look_at - look_from).normalize_or_zero();
        if self.forward == Vec3::ZERO {
            self.forward = -Vec3::Z;
        }
        self.orthonormalize(vup);
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, aperture: f32, focus_distance: f32) -> Self {
        self.vfov = vfov.clamp(1.0, 179.0);
        self.aperture = aperture.max(0.0);
        self.focus_distance = focus_distance.max(MIN_FOCUS_DISTANCE);
        self
    }

    /// Set zoom.
    pub fn with_focal_length(mut self, focal_length: f32) -> Self {
        self.focal_length = focal_length.clamp(MIN_FOCAL_LENGTH, MAX_FOCAL_LENGTH);
        self
    }

    /// Rebuild `right` and `up` from `forward` and an up hint.
    fn orthonormalize(&mut self, up_hint: Vec3) {
        let mut right = self.forward.cross(up_hint);
        if right.length_squared() < 1e-12 {
            // Looking straight along the hint; pick any perpendicular
            right = self.forward.any_orthonormal_vector();
        }
        self.right = right.normalize();
        self.up = self.right.cross(self.forward).normalize();
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn aperture(&self) -> f32 {
        self.aperture
    }

    pub fn focal_length(&self) -> f32 {
        self.focal_length
    }

    pub fn focus_distance(&self) -> f32 {
        self.focus_distance
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.image_width as f32 / self.image_height as f32
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    /// Vertical field of view in degrees after zoom.
    pub fn effective_vfov(&self) -> f32 {
        2.0 * (self.half_height()).atan().to_degrees()
    }

    /// Half height of the image plane at unit distance.
    fn half_height(&self) -> f32 {
        (self.vfov.to_radians() / 2.0).tan() / self.focal_length
    }

    /// Unit pinhole direction through image position (`px`, `py`) in pixels.
    fn pinhole_direction(&self, px: f32, py: f32) -> Vec3 {
        let half_height = self.half_height();
        let half_width = half_height * self.aspect_ratio();
        let ndc_x = 2.0 * px / self.image_width as f32 - 1.0;
        let ndc_y = 1.0 - 2.0 * py / self.image_height as f32;

        (self.forward + self.right * (ndc_x * half_width) + self.up * (ndc_y * half_height)).normalize()
    }

    /// Thin-lens ray through image position (`px`, `py`) leaving the lens at
    /// `lens`, a point in the unit disk.
    pub fn ray_through(&self, px: f32, py: f32, lens: Vec2) -> Ray {
        let direction = self.pinhole_direction(px, py);
        if self.aperture <= 0.0 {
            return Ray::new(self.position, direction);
        }

        let focal_point = self.position + direction * self.focus_distance;
        let lens = lens * self.aperture;
        let origin = self.position + self.right * lens.x + self.up * lens.y;
        Ray::new(origin, focal_point - origin)
    }

    /// Generate a ray for pixel (x, y) with random pixel and lens sampling.
    pub fn get_ray(&self, x: u32, y: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = sample_square(rng);
        let lens = if self.aperture > 0.0 {
            random_in_unit_disk(rng)
        } else {
            Vec2::ZERO
        };
        self.ray_through(x as f32 + offset.x, y as f32 + offset.y, lens)
    }

    /// Central, unjittered ray used for auto-focus.
    pub fn focus_ray(&self) -> Ray {
        Ray::new(self.position, self.forward)
    }

    /// Move the camera in its own frame: x = right, y = up, z = forward.
    pub fn move_by(&mut self, delta: Vec3) {
        self.position += self.right * delta.x + self.up * delta.y + self.forward * delta.z;
    }

    /// Rotate by (yaw, pitch, roll) in radians about the camera's up, right
    /// and forward axes.
    pub fn rotate(&mut self, delta: Vec3) {
        let rotation = Quat::from_axis_angle(self.up, delta.x)
            * Quat::from_axis_angle(self.right, delta.y)
            * Quat::from_axis_angle(self.forward, delta.z);

        self.forward = (rotation * self.forward).normalize();
        let up_hint = rotation * self.up;
        self.orthonormalize(up_hint);
    }

    /// Change the zoom factor by `delta`.
    pub fn zoom(&mut self, delta: f32) {
        self.focal_length = (self.focal_length + delta).clamp(MIN_FOCAL_LENGTH, MAX_FOCAL_LENGTH);
    }

    /// Change the lens radius by `delta`; never below zero.
    pub fn change_aperture(&mut self, delta: f32) {
        self.aperture = (self.aperture + delta).max(0.0);
    }

    pub fn set_focus_distance(&mut self, distance: f32) {
        self.focus_distance = distance.max(MIN_FOCUS_DISTANCE);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
