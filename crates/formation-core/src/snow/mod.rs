//! Snow field: static per-particle data plus the data-parallel kernel that
//! places every particle from a shared clock and attractor point.
//!
//! The kernel is written so each particle depends only on its own static
//! data and the uniforms; the GPU shader and the CPU reference path in
//! `kernel` compute the same thing.

pub mod field;
pub mod kernel;
