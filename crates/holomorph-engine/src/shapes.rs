//! Target shape generation for the particle field.
//!
//! Every generator call produces exactly the configured particle count, so
//! morphing between shapes is a pointwise interpolation with no particle
//! churn. Geometry is randomized per call; seeding the generator makes a
//! run reproducible.

use std::f32::consts::TAU;

use glam::{Mat3, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::color::hsl_to_rgb;
use crate::glyph::{GlyphRasterizer, RasterConfig};

/// Default particle population.
pub const PARTICLE_COUNT: usize = 8000;

/// Identifiers for the built-in shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeId {
    Universe,
    /// Flat box of stars. The identifier spelling is historical.
    #[serde(rename = "starFieled")]
    StarField,
    Heart,
    Flower,
    Saturn,
    Fireworks,
    Text,
}

impl ShapeId {
    pub const ALL: [ShapeId; 7] = [
        ShapeId::Universe,
        ShapeId::StarField,
        ShapeId::Heart,
        ShapeId::Flower,
        ShapeId::Saturn,
        ShapeId::Fireworks,
        ShapeId::Text,
    ];

    /// Resolves an identifier string. Unknown strings return `None`; the
    /// generator maps those to the fallback shape rather than an error.
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "universe" => Some(ShapeId::Universe),
            "starFieled" => Some(ShapeId::StarField),
            "heart" => Some(ShapeId::Heart),
            "flower" => Some(ShapeId::Flower),
            "saturn" => Some(ShapeId::Saturn),
            "fireworks" => Some(ShapeId::Fireworks),
            "text" => Some(ShapeId::Text),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeId::Universe => "universe",
            ShapeId::StarField => "starFieled",
            ShapeId::Heart => "heart",
            ShapeId::Flower => "flower",
            ShapeId::Saturn => "saturn",
            ShapeId::Fireworks => "fireworks",
            ShapeId::Text => "text",
        }
    }
}

/// What the field should morph toward next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeRequest {
    /// A named shape, resolved leniently at generation time.
    Id(String),
    /// A text string rendered through the glyph rasterizer.
    Text(String),
}

impl Default for ShapeRequest {
    fn default() -> Self {
        ShapeRequest::Id("universe".to_string())
    }
}

/// Generated per-particle positions and colors in model space.
#[derive(Debug, Clone, Default)]
pub struct ShapeTarget {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
}

impl ShapeTarget {
    fn with_capacity(count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(count),
            colors: Vec::with_capacity(count),
        }
    }

    fn push(&mut self, position: Vec3, color: Vec3) {
        self.positions.push(position);
        self.colors.push(color);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Samples target geometry for each supported shape.
pub struct ShapeGenerator {
    count: usize,
    raster: RasterConfig,
    rasterizer: Box<dyn GlyphRasterizer>,
    rng: StdRng,
}

impl ShapeGenerator {
    pub fn new(count: usize, rasterizer: Box<dyn GlyphRasterizer>, raster: RasterConfig) -> Self {
        Self {
            count,
            raster,
            rasterizer,
            rng: StdRng::from_entropy(),
        }
    }

    /// Fixes the random stream, making generation reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Produces a target with exactly `count` positions and colors.
    pub fn generate(&mut self, request: &ShapeRequest) -> ShapeTarget {
        match request {
            ShapeRequest::Text(text) => self.text(text),
            ShapeRequest::Id(id) => match ShapeId::parse(id) {
                Some(ShapeId::Universe) => self.universe(),
                Some(ShapeId::StarField) => self.star_field(),
                Some(ShapeId::Heart) => self.heart(),
                Some(ShapeId::Flower) => self.flower(),
                Some(ShapeId::Saturn) => self.saturn(),
                Some(ShapeId::Fireworks) => self.fireworks(),
                Some(ShapeId::Text) => self.text(""),
                None => {
                    tracing::debug!("unknown shape id {:?}, using fallback cube", id);
                    self.fallback_cube()
                }
            },
        }
    }

    fn universe(&mut self) -> ShapeTarget {
        let mut target = ShapeTarget::with_capacity(self.count);
        for _ in 0..self.count {
            let position = self.ball_point(10.0);
            let hue = self.rng.gen::<f32>();
            target.push(position, hsl_to_rgb(hue, 0.8, 0.8));
        }
        target
    }

    fn star_field(&mut self) -> ShapeTarget {
        let mut target = ShapeTarget::with_capacity(self.count);
        let color = hsl_to_rgb(0.6, 0.8, 0.9);
        for _ in 0..self.count {
            let position = Vec3::new(self.jitter(30.0), self.jitter(30.0), self.jitter(10.0));
            target.push(position, color);
        }
        target
    }

    fn heart(&mut self) -> ShapeTarget {
        let mut target = ShapeTarget::with_capacity(self.count);
        let color = hsl_to_rgb(0.95, 1.0, 0.6);
        let scale = 0.3;
        for _ in 0..self.count {
            let t = self.rng.gen::<f32>() * TAU;
            let x = scale * 16.0 * t.sin().powi(3);
            let y = scale
                * (13.0 * t.cos()
                    - 5.0 * (2.0 * t).cos()
                    - 2.0 * (3.0 * t).cos()
                    - (4.0 * t).cos());
            let position = Vec3::new(x + self.jitter(0.5), y + self.jitter(0.5), self.jitter(2.0));
            target.push(position, color);
        }
        target
    }

    fn flower(&mut self) -> ShapeTarget {
        let mut target = ShapeTarget::with_capacity(self.count);
        let petals = 5.0;
        let scale = 3.0;
        for _ in 0..self.count {
            let u = self.rng.gen::<f32>() * TAU;
            let r = (petals * u).cos();
            let position = Vec3::new(scale * r * u.cos(), scale * r * u.sin(), self.jitter(2.0));
            target.push(position, hsl_to_rgb(u / TAU, 0.8, 0.6));
        }
        target
    }

    fn saturn(&mut self) -> ShapeTarget {
        let mut target = ShapeTarget::with_capacity(self.count);
        let tilt = Mat3::from_rotation_x(0.4);
        let ring_color = hsl_to_rgb(0.1, 0.8, 0.6);
        let body_color = hsl_to_rgb(0.08, 0.9, 0.5);
        for _ in 0..self.count {
            // 60% of the population lands in the ring.
            let (position, color) = if self.rng.gen::<f32>() > 0.4 {
                let angle = self.rng.gen::<f32>() * TAU;
                let dist = 3.0 + self.rng.gen::<f32>() * 3.0;
                let p = Vec3::new(angle.cos() * dist, self.jitter(0.2), angle.sin() * dist);
                (p, ring_color)
            } else {
                (self.ball_point(2.0), body_color)
            };
            target.push(tilt * position, color);
        }
        target
    }

    fn fireworks(&mut self) -> ShapeTarget {
        let mut target = ShapeTarget::with_capacity(self.count);
        for _ in 0..self.count {
            let position = self.ball_point(5.0);
            let hue = self.rng.gen::<f32>();
            target.push(position, hsl_to_rgb(hue, 1.0, 0.6));
        }
        target
    }

    fn text(&mut self, text: &str) -> ShapeTarget {
        let bitmap = self.rasterizer.rasterize(text);
        let lit = bitmap.lit_points(self.raster.intensity_threshold, self.raster.sample_stride);
        let mut target = ShapeTarget::with_capacity(self.count);
        let color = hsl_to_rgb(0.55, 0.9, 0.7);

        if lit.is_empty() {
            // Nothing legible to show. Collapse the field to the origin
            // rather than failing the request.
            for _ in 0..self.count {
                target.push(Vec3::ZERO, color);
            }
            return target;
        }

        let width = bitmap.width() as f32;
        let height = bitmap.height() as f32;
        for i in 0..self.count {
            let (px, py) = lit[i % lit.len()];
            let x = (px as f32 / width - 0.5) * 10.0 + self.jitter(0.1);
            let y = -(py as f32 / height - 0.5) * 5.0 + self.jitter(0.1);
            let position = Vec3::new(x, y, self.jitter(0.5));
            target.push(position, color);
        }
        target
    }

    fn fallback_cube(&mut self) -> ShapeTarget {
        let mut target = ShapeTarget::with_capacity(self.count);
        for _ in 0..self.count {
            let position = Vec3::new(self.jitter(10.0), self.jitter(10.0), self.jitter(10.0));
            let hue = self.rng.gen::<f32>();
            target.push(position, hsl_to_rgb(hue, 0.5, 0.7));
        }
        target
    }

    /// Uniform sample over a solid ball. The cube root keeps density even
    /// instead of clustering at the center.
    fn ball_point(&mut self, radius: f32) -> Vec3 {
        let r = radius * self.rng.gen::<f32>().cbrt();
        let theta = self.rng.gen::<f32>() * TAU;
        let phi = (2.0 * self.rng.gen::<f32>() - 1.0).acos();
        Vec3::new(
            r * phi.sin() * theta.cos(),
            r * phi.sin() * theta.sin(),
            r * phi.cos(),
        )
    }

    /// Uniform sample centered on zero spanning the given width.
    fn jitter(&mut self, span: f32) -> f32 {
        (self.rng.gen::<f32>() - 0.5) * span
    }
}
