//! Position-space reconstruction.
//!
//! Pre-transform captures already hold object-space positions and pass
//! through untouched. Post-transform captures hold homogeneous clip-space
//! coordinates: an optional inverse projection is applied to the
//! homogeneous coordinate first, then the perspective divide maps it down
//! to three components.

use crate::math::{inverse_orthographic_rh, inverse_perspective_rh, Mat4, Vec4};

use super::options::{Handedness, Reprojection};

/// Homogeneous W magnitudes below this are degenerate; such vertices are
/// passed through un-divided so a few malformed vertices cannot break the
/// mesh's topology.
pub const MIN_HOMOGENEOUS_W: f32 = 1e-6;

/// Pre-transform passthrough: rows of resolved x/y/z scalars.
pub fn positions_from_object_space(rows: &[Vec<f32>]) -> Vec<[f32; 3]> {
    rows.iter().map(|row| [row[0], row[1], row[2]]).collect()
}

/// Post-transform reconstruction: rows of clip-space x/y/z/w scalars.
///
/// `width`/`height` is the capture's render-target metadata, used to derive
/// the aspect ratio (FOV mode) or view-volume extents (orthographic mode).
pub fn positions_from_clip_space(
    rows: &[Vec<f32>],
    width: u32,
    height: u32,
    reprojection: &Reprojection,
) -> Vec<[f32; 3]> {
    let (matrix, flip_z) = unprojection_matrix(width, height, reprojection);

    rows.iter()
        .map(|row| {
            let mut v = Vec4::new(row[0], row[1], row[2], row[3]);
            if let Some(m) = &matrix {
                v = m * v;
            }
            let mut out = if v.w.abs() < MIN_HOMOGENEOUS_W {
                [v.x, v.y, v.z]
            } else {
                [v.x / v.w, v.y / v.w, v.z / v.w]
            };
            if flip_z {
                out[2] = -out[2];
            }
            out
        })
        .collect()
}

/// The matrix applied to homogeneous coordinates before the divide, plus
/// whether Z flips afterwards.
fn unprojection_matrix(
    width: u32,
    height: u32,
    reprojection: &Reprojection,
) -> (Option<Mat4>, bool) {
    match reprojection {
        Reprojection::None => (None, false),
        Reprojection::Matrix(m) => (Some(*m), false),
        Reprojection::Fov(p) => {
            let aspect = if width > 0 && height > 0 {
                width as f32 / height as f32
            } else {
                p.fallback_aspect
            };
            let m = inverse_perspective_rh(p.fov_y_degrees.to_radians(), aspect, p.znear, p.zfar);
            (Some(m), p.handedness == Handedness::LeftHanded)
        }
        Reprojection::Orthographic(p) => {
            let (w, h) = if p.width > 0.0 && p.height > 0.0 {
                (p.width, p.height)
            } else if width > 0 && height > 0 {
                (width as f32, height as f32)
            } else {
                (2.0, 2.0)
            };
            let m = inverse_orthographic_rh(w, h, p.znear, p.zfar);
            (Some(m), p.handedness == Handedness::LeftHanded)
        }
    }
}
