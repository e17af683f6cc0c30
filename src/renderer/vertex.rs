//! Vertex types for 2D debug drawing

use bytemuck::{Pod, Zeroable};
use glam::DVec2;

/// Simple 2D vertex with position and color
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

    /// Narrow a simulation point to GPU precision
    pub fn at(point: DVec2, color: [f32; 4]) -> Self {
        Self::new(point.x as f32, point.y as f32, color)
    }
}

/// Colors for debug overlays
pub mod colors {
    pub const DYNAMIC_BODY: [f32; 4] = [0.4, 0.7, 1.0, 1.0];
    pub const STATIC_BODY: [f32; 4] = [0.7, 0.7, 0.8, 1.0];
    pub const GHOST_BODY: [f32; 4] = [0.6, 0.2, 0.8, 0.5];
    pub const CONTACT_POINT: [f32; 4] = [1.0, 0.4, 0.2, 1.0];
    pub const CONTACT_NORMAL: [f32; 4] = [0.9, 0.85, 0.3, 1.0];
}
