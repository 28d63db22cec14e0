//! Import configuration.
//!
//! [`ImportOptions`] is an immutable snapshot built once per import batch
//! and passed by reference into every core operation. The core never reads
//! configuration from the environment.

use std::path::PathBuf;

use crate::math::Mat4;

use super::layout::AttrComp;

/// How position addresses are chosen for pre-transform captures.
///
/// Post-transform captures always read the homogeneous position from
/// attribute 0; explicit addresses apply to pre-transform data only.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PositionMode {
    /// Attribute 0, components 0/1/2.
    #[default]
    Auto,
    /// Explicit (attribute, component) addresses for x/y/z.
    Explicit([AttrComp; 3]),
}

/// How normal-vector addresses are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum NormalMode {
    /// Name search ("NORMAL"), then the fixed fallback attribute.
    #[default]
    Auto,
    /// Explicit addresses for x/y/z.
    Explicit([AttrComp; 3]),
    /// Do not load normals; the host falls back to computed shading normals.
    Disabled,
}

/// Normal-vector loading options.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalOptions {
    pub mode: NormalMode,
    /// Attribute tried when no name matches in Auto mode.
    pub fallback_attr: u16,
}

impl Default for NormalOptions {
    fn default() -> Self {
        Self {
            mode: NormalMode::Auto,
            fallback_attr: 1,
        }
    }
}

/// How texture-coordinate addresses are chosen.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TexCoordMode {
    /// Name search with the configured token.
    #[default]
    Auto,
    /// Explicit (u, v) address pairs, one per UV set.
    Explicit(Vec<[AttrComp; 2]>),
    /// Do not load texture coordinates.
    Disabled,
}

/// Texture-coordinate loading options.
#[derive(Debug, Clone, PartialEq)]
pub struct TexCoordOptions {
    pub mode: TexCoordMode,
    /// Attribute-name token matched in Auto mode.
    pub name_token: String,
    /// Load only this UV set (discovery order), or all sets when `None`.
    pub set: Option<usize>,
    /// Read UVs from vertex stream 1 when the capture carries one.
    pub use_extra_stream: bool,
}

impl Default for TexCoordOptions {
    fn default() -> Self {
        Self {
            mode: TexCoordMode::Auto,
            name_token: "TEXCOORD".to_string(),
            set: None,
            use_extra_stream: false,
        }
    }
}

/// Vertex-color loading options. Never enabled by default: not all captures
/// carry reliable color data.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorOptions {
    pub enabled: bool,
    /// Consider only this attribute instead of searching by name.
    pub fixed_attr: Option<u16>,
    /// Component indices for r/g/b/a (BGRA captures use `[2, 1, 0, 3]`).
    pub swizzle: [u16; 4],
}

impl Default for ColorOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            fixed_attr: None,
            swizzle: [0, 1, 2, 3],
        }
    }
}

/// Coordinate-system handedness of the un-projected output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Handedness {
    #[default]
    RightHanded,
    /// Negate Z after un-projection.
    LeftHanded,
}

/// Parameters for FOV-based un-projection of post-transform captures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FovParams {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Aspect ratio used when the capture carries no width/height metadata.
    pub fallback_aspect: f32,
    /// Near plane of the assumed projection.
    pub znear: f32,
    /// Far plane of the assumed projection.
    pub zfar: f32,
    pub handedness: Handedness,
}

impl Default for FovParams {
    fn default() -> Self {
        Self {
            fov_y_degrees: 60.0,
            fallback_aspect: 16.0 / 9.0,
            znear: 0.1,
            zfar: 1000.0,
            handedness: Handedness::RightHanded,
        }
    }
}

/// Parameters for orthographic un-projection of post-transform captures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoParams {
    /// View-volume width; 0 means use the capture's width metadata.
    pub width: f32,
    /// View-volume height; 0 means use the capture's height metadata.
    pub height: f32,
    pub znear: f32,
    pub zfar: f32,
    pub handedness: Handedness,
}

impl Default for OrthoParams {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            znear: 0.1,
            zfar: 1000.0,
            handedness: Handedness::RightHanded,
        }
    }
}

/// How clip-space positions are mapped back to object/view space.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Reprojection {
    /// Perspective divide only; output stays in normalized device coordinates.
    #[default]
    None,
    /// Apply a user-supplied inverse-projection matrix before the divide.
    Matrix(Mat4),
    /// Build and invert a perspective projection from a field of view.
    Fov(FovParams),
    /// Build and invert a symmetric orthographic projection.
    Orthographic(OrthoParams),
}

/// Mesh-deduplication options.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DedupOptions {
    pub enabled: bool,
    /// Fingerprint store persisted across runs, if set.
    pub store_path: Option<PathBuf>,
}

/// Immutable configuration snapshot for one import batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportOptions {
    pub position: PositionMode,
    pub normals: NormalOptions,
    pub texcoords: TexCoordOptions,
    pub colors: ColorOptions,
    pub reprojection: Reprojection,
    pub dedup: DedupOptions,
    /// Texture slot rotated to the front of each resolved texture list
    /// (slot 0 binds as base color).
    pub primary_texture_slot: usize,
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, position: PositionMode) -> Self {
        self.position = position;
        self
    }

    pub fn with_normals(mut self, normals: NormalOptions) -> Self {
        self.normals = normals;
        self
    }

    pub fn with_texcoords(mut self, texcoords: TexCoordOptions) -> Self {
        self.texcoords = texcoords;
        self
    }

    pub fn with_colors(mut self, colors: ColorOptions) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_reprojection(mut self, reprojection: Reprojection) -> Self {
        self.reprojection = reprojection;
        self
    }

    pub fn with_dedup(mut self, dedup: DedupOptions) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn with_primary_texture_slot(mut self, slot: usize) -> Self {
        self.primary_texture_slot = slot;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ImportOptions::default();
        assert_eq!(options.position, PositionMode::Auto);
        assert_eq!(options.normals.mode, NormalMode::Auto);
        assert_eq!(options.normals.fallback_attr, 1);
        assert_eq!(options.texcoords.name_token, "TEXCOORD");
        assert!(!options.colors.enabled);
        assert_eq!(options.reprojection, Reprojection::None);
        assert!(!options.dedup.enabled);
    }

    #[test]
    fn test_builder_chain() {
        let options = ImportOptions::new()
            .with_reprojection(Reprojection::Fov(FovParams::default()))
            .with_primary_texture_slot(2)
            .with_colors(ColorOptions {
                enabled: true,
                fixed_attr: None,
                swizzle: [2, 1, 0, 3],
            });
        assert!(matches!(options.reprojection, Reprojection::Fov(_)));
        assert_eq!(options.primary_texture_slot, 2);
        assert!(options.colors.enabled);
    }
}
