//! Pre-reconstruction mesh filters.
//!
//! Capture sessions record plenty of screen-space junk: fullscreen quads,
//! skybox boxes, untextured UI geometry. These checks run on the raw mesh
//! record before any reconstruction work is spent on it.

/// Which filters are active for this run.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterOptions {
    pub skip_untextured: bool,
    pub skip_quads: bool,
    pub skip_boxes: bool,
}

/// Reason to skip the mesh, if any filter matches.
pub fn filter_reason(
    options: &FilterOptions,
    vertex_count: u32,
    index_count: u32,
    texture_count: usize,
) -> Option<String> {
    if options.skip_untextured && texture_count == 0 {
        return Some("mesh has no textures".to_string());
    }
    if options.skip_quads && vertex_count == 4 && index_count == 6 {
        return Some("4-vertex quad".to_string());
    }
    if options.skip_boxes && matches!(vertex_count, 8 | 24 | 36) && index_count == 36 {
        return Some(format!("{vertex_count}-vertex box"));
    }
    None
}
