//! HSL to RGB conversion for particle coloring.
//!
//! Shape palettes are authored in HSL because hue sweeps (rainbow spheres,
//! petal gradients) are a single varying channel there. Render sinks want
//! linear RGB triples, so conversion happens once at generation time.

use glam::Vec3;

/// Converts an HSL color to an RGB vector with all channels in `[0, 1]`.
///
/// Hue is expressed as a fraction of a full turn rather than degrees, so
/// `h = 0.5` is cyan. Values outside `[0, 1)` wrap around the hue circle.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Vec3 {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return Vec3::splat(l);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    Vec3::new(
        hue_channel(p, q, h + 1.0 / 3.0),
        hue_channel(p, q, h),
        hue_channel(p, q, h - 1.0 / 3.0),
    )
}

fn hue_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}
