//! Matrix and normal helpers, computed in f64

use glam::{DMat4, DVec3};

/// Below this determinant magnitude a transform is treated as singular
pub const DETERMINANT_EPSILON: f64 = 1e-10;

const NORMAL_EPSILON: f64 = 1e-8;

/// Fallback normal for degenerate triangles
pub const UP: [f32; 3] = [0.0, 1.0, 0.0];

pub const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
];

/// Legacy matrices are stored row-major; glTF wants column-major
pub fn transpose(m: &[f32; 16]) -> [f32; 16] {
    let mut out = [0.0; 16];
    for row in 0..4 {
        for col in 0..4 {
            out[col * 4 + row] = m[row * 4 + col];
        }
    }
    out
}

/// Inverse of a column-major matrix, or `None` if it is singular
pub fn try_inverse(m: &[f32; 16]) -> Option<[f32; 16]> {
    let mat = DMat4::from_cols_array(&m.map(f64::from));
    if mat.determinant().abs() < DETERMINANT_EPSILON {
        return None;
    }
    Some(mat.inverse().to_cols_array().map(|v| v as f32))
}

/// Unit normal of triangle (p0, p1, p2), or [`UP`] when degenerate
pub fn flat_normal(p0: [f32; 3], p1: [f32; 3], p2: [f32; 3]) -> [f32; 3] {
    let a = DVec3::from(p0.map(f64::from));
    let b = DVec3::from(p1.map(f64::from));
    let c = DVec3::from(p2.map(f64::from));
    let n = (b - a).cross(c - a);
    let len = n.length();
    if len < NORMAL_EPSILON {
        return UP;
    }
    (n / len).to_array().map(|v| v as f32)
}
