//! Math type aliases and projection helpers.
//!
//! Provides f32 types used throughout the reconstruction pipeline and the
//! projection matrices needed to undo a capture's vertex-shader transform.
//! The inverse builders are closed-form: inverting a symmetric projection
//! matrix analytically keeps the small near-plane terms exact instead of
//! funneling them through a general 4x4 elimination.

pub use nalgebra;

/// 2D vector (f32).
pub type Vec2 = nalgebra::Vector2<f32>;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 4D vector (f32).
pub type Vec4 = nalgebra::Vector4<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// Build a right-handed perspective projection with depth range [0, 1].
pub fn perspective_rh(yfov: f32, aspect: f32, znear: f32, zfar: f32) -> Mat4 {
    let f = 1.0 / (yfov / 2.0).tan();
    let nf = 1.0 / (znear - zfar);
    #[rustfmt::skip]
    let result = Mat4::new(
        f / aspect, 0.0,  0.0,              0.0,
        0.0,        f,    0.0,              0.0,
        0.0,        0.0,  zfar * nf,        znear * zfar * nf,
        0.0,        0.0,  -1.0,             0.0,
    );
    result
}

/// Closed-form inverse of [`perspective_rh`] for the same parameters.
///
/// Maps clip space back to view space when applied to a homogeneous
/// coordinate before the perspective divide.
pub fn inverse_perspective_rh(yfov: f32, aspect: f32, znear: f32, zfar: f32) -> Mat4 {
    let f = 1.0 / (yfov / 2.0).tan();
    #[rustfmt::skip]
    let result = Mat4::new(
        aspect / f, 0.0,      0.0,                              0.0,
        0.0,        1.0 / f,  0.0,                              0.0,
        0.0,        0.0,      0.0,                              -1.0,
        0.0,        0.0,      (znear - zfar) / (znear * zfar),  1.0 / znear,
    );
    result
}

/// Build a symmetric right-handed orthographic projection with depth
/// range [0, 1]. `width` and `height` are the view-volume extents.
pub fn orthographic_rh(width: f32, height: f32, znear: f32, zfar: f32) -> Mat4 {
    let fmn = zfar - znear;
    #[rustfmt::skip]
    let result = Mat4::new(
        2.0 / width, 0.0,          0.0,        0.0,
        0.0,         2.0 / height, 0.0,        0.0,
        0.0,         0.0,          -1.0 / fmn, -znear / fmn,
        0.0,         0.0,          0.0,        1.0,
    );
    result
}

/// Closed-form inverse of [`orthographic_rh`] for the same parameters.
pub fn inverse_orthographic_rh(width: f32, height: f32, znear: f32, zfar: f32) -> Mat4 {
    let fmn = zfar - znear;
    #[rustfmt::skip]
    let result = Mat4::new(
        width / 2.0, 0.0,          0.0,   0.0,
        0.0,         height / 2.0, 0.0,   0.0,
        0.0,         0.0,          -fmn,  -znear,
        0.0,         0.0,          0.0,   1.0,
    );
    result
}
