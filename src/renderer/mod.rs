//! WebGPU rendering module
//!
//! Draws the simulation geometry as flat-colored boxes.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderError, RenderState, field_to_ndc};
pub use vertex::Vertex;
