use crate::util::linspace;
use crate::{Scalar, Vec2};
use itertools::iproduct;
use na::DMatrix;
use std::ops::Range;

/// Default number of samples along each axis of a generated grid.
pub const GRID_RESOLUTION: usize = 30;

/// A velocity field sampled on a regular grid: positions and velocity
/// components as four same-shaped matrices. Rows follow the y axis, columns
/// the x axis, so `x[(i, j)] == xs[j]` and `y[(i, j)] == ys[i]`.
#[derive(Debug, Clone)]
pub struct FlowGrid {
    pub x: DMatrix<Scalar>,
    pub y: DMatrix<Scalar>,
    pub u: DMatrix<Scalar>,
    pub v: DMatrix<Scalar>,
}

impl FlowGrid {
    pub fn shape(&self) -> (usize, usize) {
        self.x.shape()
    }

    /// Euclidean speed at every grid point.
    pub fn speed(&self) -> DMatrix<Scalar> {
        self.u.zip_map(&self.v, Scalar::hypot)
    }

    pub fn x_bounds(&self) -> Range<Scalar> {
        let (_, ncols) = self.shape();
        self.x[(0, 0)]..self.x[(0, ncols - 1)]
    }

    pub fn y_bounds(&self) -> Range<Scalar> {
        let (nrows, _) = self.shape();
        self.y[(0, 0)]..self.y[(nrows - 1, 0)]
    }

    /// Grid spacing along x and y. Requires at least a 2x2 grid.
    pub fn spacing(&self) -> (Scalar, Scalar) {
        (
            self.x[(0, 1)] - self.x[(0, 0)],
            self.y[(1, 0)] - self.y[(0, 0)],
        )
    }

    /// Bilinearly interpolated velocity at `p`, or `None` outside the grid.
    pub fn velocity_at(&self, p: Vec2) -> Option<Vec2> {
        let (nrows, ncols) = self.shape();
        if nrows < 2 || ncols < 2 {
            return None;
        }

        let (dx, dy) = self.spacing();
        let fx = (p.x - self.x[(0, 0)]) / dx;
        let fy = (p.y - self.y[(0, 0)]) / dy;
        if fx < 0. || fy < 0. {
            return None;
        }

        let j = fx.floor() as usize;
        let i = fy.floor() as usize;
        if j + 1 >= ncols || i + 1 >= nrows {
            return None;
        }

        let tx = fx - j as Scalar;
        let ty = fy - i as Scalar;
        let corners = |m: &DMatrix<Scalar>| {
            let bottom = (1. - tx) * m[(i, j)] + tx * m[(i, j + 1)];
            let top = (1. - tx) * m[(i + 1, j)] + tx * m[(i + 1, j + 1)];
            (1. - ty) * bottom + ty * top
        };

        Some(Vec2::new(corners(&self.u), corners(&self.v)))
    }
}

/// A 2-D velocity field as a function of space and time.
pub trait VelocityField {
    fn velocity(&self, p: Vec2, t: Scalar) -> Vec2;

    /// Samples the field at time `t` on a regular grid over the given spatial
    /// ranges, producing position and velocity-component grids.
    fn generate_streamlines(
        &self,
        x_range: &Range<Scalar>,
        y_range: &Range<Scalar>,
        t: Scalar,
    ) -> FlowGrid {
        self.generate_streamlines_with_resolution(x_range, y_range, t, GRID_RESOLUTION)
    }

    fn generate_streamlines_with_resolution(
        &self,
        x_range: &Range<Scalar>,
        y_range: &Range<Scalar>,
        t: Scalar,
        resolution: usize,
    ) -> FlowGrid {
        let xs = linspace(x_range, resolution);
        let ys = linspace(y_range, resolution);

        let x = DMatrix::from_fn(resolution, resolution, |_, j| xs[j]);
        let y = DMatrix::from_fn(resolution, resolution, |i, _| ys[i]);

        let mut u = DMatrix::zeros(resolution, resolution);
        let mut v = DMatrix::zeros(resolution, resolution);
        for (i, j) in iproduct!(0..resolution, 0..resolution) {
            let vel = self.velocity(Vec2::new(xs[j], ys[i]), t);
            u[(i, j)] = vel.x;
            v[(i, j)] = vel.y;
        }

        FlowGrid { x, y, u, v }
    }
}

/// Simple shear: horizontal velocity proportional to height.
#[derive(Debug, Clone)]
pub struct ShearFlow {
    pub rate: Scalar,
}

impl Default for ShearFlow {
    fn default() -> Self {
        ShearFlow { rate: 0.35 }
    }
}

impl VelocityField for ShearFlow {
    fn velocity(&self, p: Vec2, _t: Scalar) -> Vec2 {
        Vec2::new(self.rate * p.y, 0.)
    }
}

/// Rigid rotation about a center; speed grows linearly with the radius.
#[derive(Debug, Clone)]
pub struct VortexFlow {
    pub strength: Scalar,
    pub center: Vec2,
}

impl Default for VortexFlow {
    fn default() -> Self {
        VortexFlow {
            strength: 1.,
            center: Vec2::new(0., 0.),
        }
    }
}

impl VelocityField for VortexFlow {
    fn velocity(&self, p: Vec2, _t: Scalar) -> Vec2 {
        let r = p - self.center;
        self.strength * Vec2::new(-r.y, r.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct Constant(Vec2);

    impl VelocityField for Constant {
        fn velocity(&self, _p: Vec2, _t: Scalar) -> Vec2 {
            self.0
        }
    }

    fn unit_grid(resolution: usize, vel: Vec2) -> FlowGrid {
        Constant(vel).generate_streamlines_with_resolution(&(0.0..1.0), &(0.0..1.0), 0., resolution)
    }

    #[test]
    fn test_generated_grids_are_same_shaped() {
        let grid = unit_grid(7, Vec2::new(1., 0.));
        assert_eq!(grid.shape(), (7, 7));
        assert_eq!(grid.y.shape(), (7, 7));
        assert_eq!(grid.u.shape(), (7, 7));
        assert_eq!(grid.v.shape(), (7, 7));
        assert_eq!(grid.x[(0, 6)], 1.0);
        assert_eq!(grid.y[(6, 0)], 1.0);
    }

    #[test]
    fn test_speed_is_euclidean_norm() {
        // U = 3, V = 4 everywhere gives speed 5 everywhere.
        let grid = unit_grid(5, Vec2::new(3., 4.));
        let speed = grid.speed();
        assert!(speed.iter().all(|&s| (s - 5.).abs() < 1e-12));
    }

    #[test]
    fn test_bilinear_interpolation_inside_cell() {
        let grid = ShearFlow { rate: 2. }.generate_streamlines_with_resolution(
            &(0.0..1.0),
            &(0.0..1.0),
            0.,
            11,
        );

        // The field is linear in y, so interpolation reproduces it exactly.
        let vel = grid.velocity_at(Vec2::new(0.33, 0.47)).unwrap();
        assert!((vel.x - 2. * 0.47).abs() < 1e-12);
        assert!(vel.y.abs() < 1e-12);
    }

    #[test]
    fn test_velocity_at_outside_grid() {
        let grid = unit_grid(5, Vec2::new(1., 1.));
        assert!(grid.velocity_at(Vec2::new(-0.1, 0.5)).is_none());
        assert!(grid.velocity_at(Vec2::new(0.5, 1.5)).is_none());
    }

    #[test]
    fn test_vortex_is_tangential() {
        let vortex = VortexFlow::default();
        let vel = vortex.velocity(Vec2::new(1., 0.), 0.);
        assert_eq!(vel, Vec2::new(0., 1.));

        let p = Vec2::new(0.3, -0.8);
        assert!(vortex.velocity(p, 0.).dot(&p).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_speed_matches_hypot(u in -1e3..1e3f64, v in -1e3..1e3f64) {
            let grid = unit_grid(4, Vec2::new(u, v));
            let speed = grid.speed();
            let expected = u.hypot(v);
            prop_assert!(speed.iter().all(|&s| (s - expected).abs() <= 1e-9 * expected.max(1.)));
        }
    }
}
