//! Dense coordinate grids.
//!
//! A grid stores one logical set of points (e.g. all sub-block centers of a
//! prediction block) as one [`Grid`] per coordinate component. All component
//! grids of one value always share the same shape.

use crate::{
    cartesian_to_spherical_grid, spherical_to_cartesian_grid, Grid, Pt2, Real, Vec3,
};

/// Planar pixel-grid coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanarGrid {
    pub x: Grid,
    pub y: Grid,
}

impl PlanarGrid {
    /// Build a grid from its components.
    ///
    /// Panics if the component shapes differ.
    pub fn new(x: Grid, y: Grid) -> Self {
        assert_eq!(x.shape(), y.shape(), "planar grid components differ in shape");
        Self { x, y }
    }

    /// A 1×1 grid holding a single point.
    pub fn from_point(p: Pt2) -> Self {
        Self {
            x: Grid::from_element(1, 1, p.x),
            y: Grid::from_element(1, 1, p.y),
        }
    }

    /// Regular lattice `x = x0 + col * step_x`, `y = y0 + row * step_y`.
    ///
    /// # Arguments
    /// * `rows`, `cols` - Grid shape; rows follow the vertical axis
    /// * `x0`, `y0` - Coordinates of the point at `(0, 0)`
    /// * `step_x`, `step_y` - Spacing between neighbouring columns and rows
    ///
    /// # Example
    /// ```
    /// use omnimv_core::PlanarGrid;
    ///
    /// // Motion positions of the 4x4 sub-blocks of a 16x8 block at (64, 32).
    /// let g = PlanarGrid::lattice(2, 4, 66.0, 34.0, 4.0, 4.0);
    /// assert_eq!(g.shape(), (2, 4));
    /// assert_eq!((g.x[(1, 3)], g.y[(1, 3)]), (78.0, 38.0));
    /// ```
    pub fn lattice(rows: usize, cols: usize, x0: Real, y0: Real, step_x: Real, step_y: Real) -> Self {
        Self {
            x: Grid::from_fn(rows, cols, |_, c| x0 + c as Real * step_x),
            y: Grid::from_fn(rows, cols, |r, _| y0 + r as Real * step_y),
        }
    }

    /// `(rows, cols)` shared by both components.
    pub fn shape(&self) -> (usize, usize) {
        self.x.shape()
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Point at linear (column-major) index `i`.
    pub fn point(&self, i: usize) -> Pt2 {
        Pt2::new(self.x[i], self.y[i])
    }

    /// Copy of the `rows × cols` window starting at `(row, col)`.
    ///
    /// # Panics
    /// Panics if the window does not fit inside the grid.
    pub fn window(&self, row: usize, col: usize, rows: usize, cols: usize) -> Self {
        Self {
            x: self.x.view((row, col), (rows, cols)).into_owned(),
            y: self.y.view((row, col), (rows, cols)).into_owned(),
        }
    }

    /// Add a constant offset to every point.
    pub fn translated(&self, dx: Real, dy: Real) -> Self {
        Self {
            x: self.x.add_scalar(dx),
            y: self.y.add_scalar(dy),
        }
    }

    /// Apply `f` to every point.
    pub fn map_points(&self, mut f: impl FnMut(Pt2) -> Pt2) -> Self {
        let (rows, cols) = self.shape();
        let mut out = Self {
            x: Grid::zeros(rows, cols),
            y: Grid::zeros(rows, cols),
        };
        for i in 0..self.len() {
            let p = f(self.point(i));
            out.x[i] = p.x;
            out.y[i] = p.y;
        }
        out
    }
}

/// 3D cartesian coordinates, normally directions on the unit sphere.
#[derive(Clone, Debug, PartialEq)]
pub struct CartesianGrid {
    pub x: Grid,
    pub y: Grid,
    pub z: Grid,
}

impl CartesianGrid {
    /// Build a grid from its components.
    ///
    /// Panics if the component shapes differ.
    pub fn new(x: Grid, y: Grid, z: Grid) -> Self {
        assert!(
            x.shape() == y.shape() && x.shape() == z.shape(),
            "cartesian grid components differ in shape"
        );
        Self { x, y, z }
    }

    /// A 1×1 grid holding a single direction.
    pub fn from_point(v: Vec3) -> Self {
        Self {
            x: Grid::from_element(1, 1, v.x),
            y: Grid::from_element(1, 1, v.y),
            z: Grid::from_element(1, 1, v.z),
        }
    }

    /// `(rows, cols)` shared by all three components.
    pub fn shape(&self) -> (usize, usize) {
        self.x.shape()
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Direction at linear (column-major) index `i`.
    pub fn point(&self, i: usize) -> Vec3 {
        Vec3::new(self.x[i], self.y[i], self.z[i])
    }

    /// Copy of the `rows × cols` window starting at `(row, col)`, as for
    /// [`PlanarGrid::window`].
    pub fn window(&self, row: usize, col: usize, rows: usize, cols: usize) -> Self {
        Self {
            x: self.x.view((row, col), (rows, cols)).into_owned(),
            y: self.y.view((row, col), (rows, cols)).into_owned(),
            z: self.z.view((row, col), (rows, cols)).into_owned(),
        }
    }

    /// Apply `f` to every point.
    pub fn map_points(&self, mut f: impl FnMut(Vec3) -> Vec3) -> Self {
        let (rows, cols) = self.shape();
        let mut out = Self {
            x: Grid::zeros(rows, cols),
            y: Grid::zeros(rows, cols),
            z: Grid::zeros(rows, cols),
        };
        for i in 0..self.len() {
            let v = f(self.point(i));
            out.x[i] = v.x;
            out.y[i] = v.y;
            out.z[i] = v.z;
        }
        out
    }

    /// Element-wise [`crate::cartesian_to_spherical`].
    pub fn to_spherical(&self) -> SphericalGrid {
        let (r, theta, phi) = cartesian_to_spherical_grid(&self.x, &self.y, &self.z);
        SphericalGrid { r, theta, phi }
    }
}

/// Spherical coordinates `(r, θ, φ)`.
#[derive(Clone, Debug, PartialEq)]
pub struct SphericalGrid {
    pub r: Grid,
    pub theta: Grid,
    pub phi: Grid,
}

impl SphericalGrid {
    pub fn shape(&self) -> (usize, usize) {
        self.r.shape()
    }

    /// Element-wise [`crate::spherical_to_cartesian`].
    pub fn to_cartesian(&self) -> CartesianGrid {
        let (x, y, z) = spherical_to_cartesian_grid(&self.r, &self.theta, &self.phi);
        CartesianGrid { x, y, z }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_is_row_major_in_meaning() {
        let g = PlanarGrid::lattice(2, 3, 1.5, 5.5, 4.0, 4.0);
        assert_eq!(g.shape(), (2, 3));
        assert_eq!(g.x[(1, 2)], 9.5);
        assert_eq!(g.y[(1, 2)], 9.5);
        assert_eq!(g.x[(0, 1)], 5.5);
        assert_eq!(g.y[(0, 1)], 5.5);
    }

    #[test]
    fn window_copies_sub_block() {
        let g = PlanarGrid::lattice(4, 4, 0.0, 0.0, 1.0, 1.0);
        let w = g.window(1, 2, 2, 2);
        assert_eq!(w.shape(), (2, 2));
        assert_eq!(w.x[(0, 0)], 2.0);
        assert_eq!(w.y[(0, 0)], 1.0);
        assert_eq!(w.x[(1, 1)], 3.0);
        assert_eq!(w.y[(1, 1)], 2.0);
    }

    #[test]
    #[should_panic(expected = "differ in shape")]
    fn mismatched_components_are_rejected() {
        let _ = PlanarGrid::new(Grid::zeros(2, 2), Grid::zeros(2, 3));
    }
}
