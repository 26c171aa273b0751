//! Vertex types for flat 2D rendering

use bytemuck::{Pod, Zeroable};

use crate::sim::ObstacleKind;

/// 2D vertex with position and color
///
/// Shapes are built in field pixels; the pipeline rewrites positions to NDC
/// before upload.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const SUBMARINE: [f32; 4] = [0.980, 0.800, 0.082, 1.0]; // #facc15
    pub const SHARK: [f32; 4] = [0.612, 0.639, 0.686, 1.0]; // #9ca3af
    pub const PUFFER: [f32; 4] = [0.984, 0.749, 0.141, 1.0]; // #fbbf24
    pub const MINE: [f32; 4] = [0.937, 0.267, 0.267, 1.0]; // #ef4444
    pub const JELLYFISH: [f32; 4] = [0.753, 0.518, 0.988, 1.0]; // #c084fc
    pub const HITBOX: [f32; 4] = [1.0, 1.0, 1.0, 0.6];
    pub const WATER: [f32; 4] = [0.059, 0.090, 0.165, 1.0]; // #0f172a
    pub const SURFACE: [f32; 4] = [0.055, 0.455, 0.565, 1.0]; // #0e7490
}

/// Fill color for an obstacle kind
pub fn obstacle_color(kind: ObstacleKind) -> [f32; 4] {
    match kind {
        ObstacleKind::Shark => colors::SHARK,
        ObstacleKind::Puffer => colors::PUFFER,
        ObstacleKind::Mine => colors::MINE,
        ObstacleKind::Jellyfish => colors::JELLYFISH,
    }
}
