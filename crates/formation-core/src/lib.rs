//! Particle formation and transition engine.
//!
//! Computes, every frame, the pose of a small set of photo elements that
//! coalesce from a scattered configuration into a tree, and the placement of
//! a large snow field that reacts to the pointer.
pub mod camera;
pub mod config;
pub mod element;
pub mod error;
pub mod layout;
pub mod math;
pub mod pointer;
pub mod pose;
pub mod quality;
pub mod scene;
pub mod snow;
pub mod timeline;

pub use error::{FormationError, Result};
