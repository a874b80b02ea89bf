// Copyright @yucwang 2026

use crate::math::aabb::AABB;
use crate::math::constants::{EPSILON, Float, Vector2f, Vector3f};

/// One side of a box. The discriminant is the layer offset of the face inside
/// the box's six cache layers (cubemap order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    PosX = 0,
    NegX = 1,
    PosY = 2,
    NegY = 3,
    PosZ = 4,
    NegZ = 5,
}

/// Which component of a hit point feeds a texture axis, and whether that
/// axis runs backwards across the face.
#[derive(Debug, Clone, Copy)]
struct TexAxis {
    axis: usize,
    flip: bool,
}

const fn tex_axis(axis: usize, flip: bool) -> TexAxis {
    TexAxis { axis, flip }
}

const NORMALS: [[Float; 3]; 6] = [
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
];

// (u, v) per face, v pointing up.
const TEX_AXES: [[TexAxis; 2]; 6] = [
    [tex_axis(2, true), tex_axis(1, false)],
    [tex_axis(2, false), tex_axis(1, false)],
    [tex_axis(0, false), tex_axis(2, true)],
    [tex_axis(0, false), tex_axis(2, false)],
    [tex_axis(0, false), tex_axis(1, false)],
    [tex_axis(0, true), tex_axis(1, false)],
];

impl Face {
    pub const ALL: [Face; 6] = [Face::PosX, Face::NegX, Face::PosY, Face::NegY, Face::PosZ, Face::NegZ];

    pub const COUNT: usize = 6;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Face::PosX => "+X",
            Face::NegX => "-X",
            Face::PosY => "+Y",
            Face::NegY => "-Y",
            Face::PosZ => "+Z",
            Face::NegZ => "-Z",
        }
    }

    /// Outward unit normal.
    pub fn normal(self) -> Vector3f {
        let n = NORMALS[self.index()];
        Vector3f::new(n[0], n[1], n[2])
    }

    /// Face of `bbox` struck at `p`.
    ///
    /// Tested in a fixed order so edge and corner points always resolve the
    /// same way: -X, +X, -Y, +Y, -Z, and +Z when nothing else matched.
    pub fn classify(p: &Vector3f, bbox: &AABB) -> Face {
        if (p.x - bbox.p_min.x).abs() < EPSILON {
            Face::NegX
        } else if (p.x - bbox.p_max.x).abs() < EPSILON {
            Face::PosX
        } else if (p.y - bbox.p_min.y).abs() < EPSILON {
            Face::NegY
        } else if (p.y - bbox.p_max.y).abs() < EPSILON {
            Face::PosY
        } else if (p.z - bbox.p_min.z).abs() < EPSILON {
            Face::NegZ
        } else {
            Face::PosZ
        }
    }

    /// Surface coordinate of `p` on this face of `bbox`, in `[0, 1]^2` for
    /// points inside the box.
    pub fn tex_coord(self, p: &Vector3f, bbox: &AABB) -> Vector2f {
        let extent = bbox.extent();
        let mut uv = [0.0; 2];
        for (slot, tex) in uv.iter_mut().zip(TEX_AXES[self.index()].iter()) {
            let t = (p[tex.axis] - bbox.p_min[tex.axis]) / extent[tex.axis];
            let t = t.max(0.0).min(1.0);
            *slot = if tex.flip { 1.0 - t } else { t };
        }
        Vector2f::new(uv[0], uv[1])
    }
}
