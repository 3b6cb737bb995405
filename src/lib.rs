//! GPU-animated ocean surface.
//!
//! Two interchangeable surface models write the same output textures:
//! a Phillips-spectrum surface synthesized every frame with a radix-2 IFFT,
//! and a closed-form sum of Gerstner waves.

pub mod config;
pub mod gpu;
pub mod mesh;
pub mod simulation;
