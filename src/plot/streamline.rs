//! Streamline tracing over a sampled velocity grid. Seeds are placed on a
//! uniform lattice and integrated through the normalized direction field with
//! midpoint (RK2) steps, forward and backward. A coarse occupancy grid keeps
//! line density roughly uniform, matching the look of a streamplot.

use crate::field::FlowGrid;
use crate::util::RangeExt;
use crate::{Scalar, Vec2};
use itertools::iproduct;

const SEEDS_PER_AXIS: usize = 12;
const MASK_CELLS: usize = 24;
const MAX_STEPS: usize = 500;
const MIN_SPEED: Scalar = 1e-12;

/// Traces streamlines through `grid`. Each returned polyline is ordered from
/// its upstream end to its downstream end.
pub fn trace_streamlines(grid: &FlowGrid) -> Vec<Vec<(Scalar, Scalar)>> {
    let (nrows, ncols) = grid.shape();
    if nrows < 2 || ncols < 2 {
        return Vec::new();
    }

    let x_bounds = grid.x_bounds();
    let y_bounds = grid.y_bounds();
    let (dx, dy) = grid.spacing();
    let step = 0.5 * dx.min(dy);

    let mut mask = OccupancyMask::new(x_bounds.clone(), y_bounds.clone());
    let mut lines = Vec::new();

    for (si, sj) in iproduct!(0..SEEDS_PER_AXIS, 0..SEEDS_PER_AXIS) {
        let seed = Vec2::new(
            x_bounds.lerp((sj as Scalar + 0.5) / SEEDS_PER_AXIS as Scalar),
            y_bounds.lerp((si as Scalar + 0.5) / SEEDS_PER_AXIS as Scalar),
        );

        if mask.occupied(seed) {
            continue;
        }

        let mut visited = Vec::new();
        let mut backward = integrate(grid, seed, -step, &mask, &mut visited);
        let forward = integrate(grid, seed, step, &mask, &mut visited);

        // Points alone don't make a line.
        if backward.len() + forward.len() < 2 {
            continue;
        }

        backward.reverse();
        backward.push((seed.x, seed.y));
        backward.extend(forward);

        mask.commit(&visited);
        lines.push(backward);
    }

    lines
}

/// Walks one half of a streamline. Stops on domain exit, stagnation, the step
/// cap, or a cell another line already claimed. Cells crossed along the way
/// are collected into `visited` but not committed yet.
fn integrate(
    grid: &FlowGrid,
    start: Vec2,
    step: Scalar,
    mask: &OccupancyMask,
    visited: &mut Vec<usize>,
) -> Vec<(Scalar, Scalar)> {
    let mut points = Vec::new();
    let mut p = start;

    for _ in 0..MAX_STEPS {
        let k1 = match direction(grid, p) {
            Some(d) => d,
            None => break,
        };
        let midpoint = p + 0.5 * step * k1;
        let k2 = match direction(grid, midpoint) {
            Some(d) => d,
            None => break,
        };

        p += step * k2;

        let cell = match mask.cell(p) {
            Some(cell) => cell,
            None => break,
        };
        if mask.cells[cell] && !visited.contains(&cell) {
            break;
        }
        if !visited.contains(&cell) {
            visited.push(cell);
        }

        points.push((p.x, p.y));
    }

    points
}

fn direction(grid: &FlowGrid, p: Vec2) -> Option<Vec2> {
    let vel = grid.velocity_at(p)?;
    let speed = vel.norm();
    if speed < MIN_SPEED {
        return None;
    }
    Some(vel / speed)
}

struct OccupancyMask {
    cells: Vec<bool>,
    x_bounds: std::ops::Range<Scalar>,
    y_bounds: std::ops::Range<Scalar>,
}

impl OccupancyMask {
    fn new(x_bounds: std::ops::Range<Scalar>, y_bounds: std::ops::Range<Scalar>) -> Self {
        OccupancyMask {
            cells: vec![false; MASK_CELLS * MASK_CELLS],
            x_bounds,
            y_bounds,
        }
    }

    fn cell(&self, p: Vec2) -> Option<usize> {
        if !self.x_bounds.contains_point(p.x) || !self.y_bounds.contains_point(p.y) {
            return None;
        }

        let index = |f: Scalar| ((f * MASK_CELLS as Scalar) as usize).min(MASK_CELLS - 1);
        let i = index((p.y - self.y_bounds.start) / self.y_bounds.size());
        let j = index((p.x - self.x_bounds.start) / self.x_bounds.size());
        Some(i * MASK_CELLS + j)
    }

    fn occupied(&self, p: Vec2) -> bool {
        match self.cell(p) {
            Some(cell) => self.cells[cell],
            None => true,
        }
    }

    fn commit(&mut self, visited: &[usize]) {
        for &cell in visited {
            self.cells[cell] = true;
        }
    }
}
