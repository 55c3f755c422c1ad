//! # Holomorph-Gesture
//!
//! Gesture interpretation pipeline turning noisy, intermittent hand
//! landmark frames into stable incremental transform state.
//!
//! ## Pipeline Stages
//!
//! 1. **Source**: async acquisition of [`HandFrame`]s from a
//!    pose-estimation backend (`source`)
//! 2. **Classification**: discrete pinch state plus raw distance and
//!    anchor measurements per frame (`classifier`)
//! 3. **Accumulation**: persistent scale/rotation state updated from
//!    frame-to-frame deltas with outlier rejection (`accumulator`)
//! 4. **Smoothing**: exponential presentation filter consumed by the
//!    render side (`smoother`)
//!
//! The streaming pipeline (`pipeline`) drains a source on a tokio task
//! and publishes classified signals and accumulated state through
//! last-value-wins shared cells (`state`), so a stalled detector never
//! blocks a renderer.
//!
//! [`HandFrame`]: holomorph_core::HandFrame

pub mod accumulator;
pub mod classifier;
pub mod pipeline;
pub mod smoother;
pub mod source;
pub mod state;

pub use accumulator::*;
pub use classifier::*;
pub use pipeline::*;
pub use smoother::*;
pub use source::*;
pub use state::*;
