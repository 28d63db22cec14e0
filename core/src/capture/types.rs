//! Reconstruction output types.

use std::path::PathBuf;

use super::indices::Primitives;

/// Renderable geometry reconstructed from one mesh record.
///
/// Everything a host needs to build its own mesh object: positions are
/// always present; the remaining vertex data is whatever the capture
/// carried and the options asked for.
#[derive(Debug, Clone)]
pub struct ReconstructedGeometry {
    /// One object-space (or NDC, see `Reprojection::None`) position per vertex.
    pub positions: Vec<[f32; 3]>,
    /// Per-vertex normals, absent when the capture carries none.
    pub normals: Option<Vec<[f32; 3]>>,
    /// UV sets in discovery order.
    pub uv_sets: Vec<Vec<[f32; 2]>>,
    /// Vertex-color sets (rgba) in discovery order.
    pub color_sets: Vec<Vec<[f32; 4]>>,
    /// Decoded connectivity.
    pub primitives: Primitives,
    /// Resolved texture paths in slot order.
    pub textures: Vec<PathBuf>,
}

impl ReconstructedGeometry {
    /// Number of reconstructed vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Positions as a flat `x y z x y z …` scalar slice, handy for host
    /// uploads.
    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }
}
