//! # Holomorph-Engine
//!
//! Morphing particle field engine driven by gesture interaction state.
//!
//! This crate implements the visual half of the holomorph pipeline: a fixed
//! population of particles that continuously morphs between target shapes
//! while a rigid transform (scale and rotation accumulated from pinch
//! gestures) and an idle breathing animation are applied on top.
//!
//! ## Pipeline Stages
//!
//! 1. **Shape Generation**: Produce target positions and colors for a named
//!    shape or a rasterized text string
//! 2. **Morphing**: Move every particle a rate-limited fraction toward its
//!    target each tick, independent of user interaction
//! 3. **Displacement**: Apply breathing, rotation and scale at emission time
//!    without mutating the morph state
//! 4. **Emission**: Hand the finished frame to a [`RenderSink`]
//!
//! The engine never talks to the landmark source directly. It reads the
//! latest [`GestureSignal`](holomorph_gesture::GestureSignal) and
//! [`InteractionState`](holomorph_core::InteractionState) published through
//! shared cells by the detection task, smooths them, and renders.

pub mod color;
pub mod field;
pub mod glyph;
pub mod scheduler;
pub mod session;
pub mod shapes;
pub mod sink;

pub use color::*;
pub use field::*;
pub use glyph::*;
pub use scheduler::*;
pub use session::*;
pub use shapes::*;
pub use sink::*;
