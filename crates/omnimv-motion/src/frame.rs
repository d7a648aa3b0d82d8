//! Local tangent frames at block centers.

use omnimv_core::{Mat3, Projection, Pt2, SphereProjection, Vec2, Vec3};

/// Orthonormal frame whose third axis is the sphere direction of a block
/// center and whose first two axes follow the planar `x` and `y` directions
/// of the base projection at that center.
#[derive(Clone, Copy, Debug)]
pub struct TangentFrame {
    basis: Mat3,
}

impl TangentFrame {
    /// Build the frame from one-pixel planar derivatives (Gram–Schmidt).
    ///
    /// Degenerate centers (outside the image circle, or at a pole of the
    /// projection) give NaN entries.
    pub fn at(projection: &Projection, center: &Pt2) -> Self {
        let n = projection.to_sphere_point(center);
        let dx = projection.to_sphere_point(&(center + Vec2::new(1.0, 0.0))) - n;
        let dy = projection.to_sphere_point(&(center + Vec2::new(0.0, 1.0))) - n;
        let ex = (dx - n * n.dot(&dx)).normalize();
        let ey = (dy - n * n.dot(&dy) - ex * ex.dot(&dy)).normalize();
        Self {
            basis: Mat3::from_columns(&[ex, ey, n]),
        }
    }

    /// Express a world direction in the frame.
    pub fn to_local(&self, v: &Vec3) -> Vec3 {
        self.basis.transpose() * v
    }

    /// Express a frame-local direction in the world.
    pub fn to_world(&self, l: &Vec3) -> Vec3 {
        self.basis * l
    }

    pub fn basis(&self) -> &Mat3 {
        &self.basis
    }
}
