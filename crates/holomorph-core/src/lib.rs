//! # Holomorph-Core
//!
//! Core types for the holomorph system: hand landmark frames coming in
//! from a pose-estimation service, and the persistent interaction state
//! a gesture session accumulates from them.

pub mod error;
pub mod hand;
pub mod transform;
pub mod types;

pub use error::{Error, Result};
pub use hand::*;
pub use transform::*;
pub use types::*;
