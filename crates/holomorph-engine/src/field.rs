//! The morphing particle field.
//!
//! The field owns two persistent buffers, `current` and `target`. Each tick
//! every particle moves a rate-limited fraction toward its target, position
//! and color alike. Gesture scale and rotation never touch those buffers:
//! they are applied as a pure displacement at emission time, so `current`
//! always holds untransformed model-space positions and a shape switch or
//! gesture release never has to undo anything.

use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};

use holomorph_core::{Error, PresentedTransform, Result};

use crate::shapes::ShapeTarget;

/// Tuning for morphing and the idle animation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Fraction of the remaining distance covered per second.
    pub morph_rate: f32,
    /// Idle breathing amplitude per axis, in world units.
    pub idle_amplitude: f32,
    /// Idle bulk rotation about the vertical axis, radians per second.
    pub idle_yaw_rate: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            morph_rate: 3.0,
            idle_amplitude: 0.002,
            idle_yaw_rate: 0.05,
        }
    }
}

/// Rigid transform plus breathing amplitude applied at emission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldTransform {
    pub scale: f32,
    pub rotation_x: f32,
    pub rotation_y: f32,
    /// Breathing amplitude. Zero while a gesture is active.
    pub breathing: f32,
}

impl FieldTransform {
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
            breathing: 0.0,
        }
    }

    /// Rotation about x applied first, then about y.
    pub fn matrix(&self) -> Mat3 {
        Mat3::from_rotation_y(self.rotation_y) * Mat3::from_rotation_x(self.rotation_x)
    }
}

impl Default for FieldTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Low-amplitude oscillation with phase taken from the particle's own
/// coordinates, so neighbors shimmer out of step instead of in lockstep.
pub fn idle_offset(position: Vec3, elapsed: f32, amplitude: f32) -> Vec3 {
    Vec3::new(
        (elapsed + position.x).sin(),
        (elapsed + position.y).cos(),
        (elapsed + position.z).sin(),
    ) * amplitude
}

/// Full displacement for one particle: breathing, rotation, then scale.
pub fn displaced_position(position: Vec3, elapsed: f32, transform: &FieldTransform) -> Vec3 {
    let wobbled = position + idle_offset(position, elapsed, transform.breathing);
    transform.matrix() * wobbled * transform.scale
}

/// One finished frame for a render sink, flat triples per particle.
#[derive(Debug, Clone, Default)]
pub struct FieldFrame {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
}

impl FieldFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Particle population morphing toward a replaceable target.
pub struct ParticleField {
    current: Vec<Vec3>,
    current_colors: Vec<Vec3>,
    target: ShapeTarget,
    idle_yaw: f32,
    config: FieldConfig,
}

impl ParticleField {
    /// Seeds the live buffers from the initial target, so the field starts
    /// fully formed instead of morphing out of nothing.
    pub fn new(target: ShapeTarget, config: FieldConfig) -> Self {
        Self {
            current: target.positions.clone(),
            current_colors: target.colors.clone(),
            target,
            idle_yaw: 0.0,
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.current
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.current_colors
    }

    pub fn target(&self) -> &ShapeTarget {
        &self.target
    }

    pub fn idle_yaw(&self) -> f32 {
        self.idle_yaw
    }

    /// Replaces the morph target wholesale. The live buffers keep their
    /// values, so morphing continues from whatever is on screen.
    ///
    /// The population is fixed at construction. A target of any other size
    /// is rejected.
    pub fn set_target(&mut self, target: ShapeTarget) -> Result<()> {
        if target.len() != self.current.len() {
            return Err(Error::BufferSize {
                expected: self.current.len(),
                actual: target.len(),
            });
        }
        self.target = target;
        Ok(())
    }

    /// Advances morphing by `dt` seconds. The idle yaw accumulates only
    /// while no gesture is active; an active gesture freezes it in place.
    pub fn step(&mut self, dt: f32, active: bool) {
        let f = (self.config.morph_rate * dt).min(1.0);
        for (current, target) in self.current.iter_mut().zip(&self.target.positions) {
            *current += (*target - *current) * f;
        }
        for (current, target) in self.current_colors.iter_mut().zip(&self.target.colors) {
            *current += (*target - *current) * f;
        }
        if !active {
            self.idle_yaw += self.config.idle_yaw_rate * dt;
        }
    }

    /// Combines the smoothed gesture transform with the field's own idle
    /// state into the transform for this tick's emission.
    pub fn transform_for(&self, presented: &PresentedTransform, active: bool) -> FieldTransform {
        FieldTransform {
            scale: presented.scale as f32,
            rotation_x: presented.rotation_x as f32,
            rotation_y: presented.rotation_y as f32 + self.idle_yaw,
            breathing: if active { 0.0 } else { self.config.idle_amplitude },
        }
    }

    /// Writes the displaced frame into `frame`, reusing its allocations.
    pub fn emit_into(&self, frame: &mut FieldFrame, elapsed: f32, transform: &FieldTransform) {
        let count = self.current.len();
        frame.positions.resize(count, [0.0; 3]);
        frame.colors.resize(count, [0.0; 3]);

        let matrix = transform.matrix();
        for i in 0..count {
            let p = self.current[i];
            let wobbled = p + idle_offset(p, elapsed, transform.breathing);
            let out = matrix * wobbled * transform.scale;
            frame.positions[i] = out.to_array();
            frame.colors[i] = self.current_colors[i].to_array();
        }
    }
}
