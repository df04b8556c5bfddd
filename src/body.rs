use crate::{Scalar, Vec2};
use eyre::ensure;
use serde::{Deserialize, Serialize};

/// Time-ordered positions of one tracked material point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trajectory {
    points: Vec<Vec2>,
}

impl Trajectory {
    pub fn with_start(start: Vec2) -> Self {
        Trajectory {
            points: vec![start],
        }
    }

    pub fn push(&mut self, point: Vec2) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Paired x/y coordinate sequences across all time steps.
    pub fn coordinates(&self) -> (Vec<Scalar>, Vec<Scalar>) {
        self.points.iter().map(|p| (p.x, p.y)).unzip()
    }
}

/// Ordered polygon outline of the body at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    points: Vec<Vec2>,
}

impl Shape {
    pub fn new(points: Vec<Vec2>) -> Self {
        Shape { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn coordinates(&self) -> (Vec<Scalar>, Vec<Scalar>) {
        self.points.iter().map(|p| (p.x, p.y)).unzip()
    }
}

/// A deforming 2-D body: one trajectory per tracked material point, plus the
/// outline at the first and most recent recorded instants. The plotter only
/// reads this state; mutation happens through `advance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialBody {
    pub trajectories: Vec<Trajectory>,
    initial_shape: Shape,
    current_shape: Shape,
}

impl MaterialBody {
    /// Creates a body with one trajectory seeded per tracked point. The
    /// current shape starts out identical to the initial one.
    pub fn new(initial_shape: Shape, tracked: &[Vec2]) -> Self {
        MaterialBody {
            trajectories: tracked.iter().map(|&p| Trajectory::with_start(p)).collect(),
            current_shape: initial_shape.clone(),
            initial_shape,
        }
    }

    pub fn initial_shape(&self) -> &Shape {
        &self.initial_shape
    }

    pub fn current_shape(&self) -> &Shape {
        &self.current_shape
    }

    /// Records one time step: the new position of every tracked point and the
    /// deformed outline at that instant.
    pub fn advance(&mut self, positions: &[Vec2], shape: Shape) -> eyre::Result<()> {
        ensure!(
            positions.len() == self.trajectories.len(),
            "expected {} tracked positions, got {}",
            self.trajectories.len(),
            positions.len()
        );

        for (trajectory, &p) in self.trajectories.iter_mut().zip(positions) {
            trajectory.push(p);
        }
        self.current_shape = shape;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Shape {
        Shape::new(vec![
            Vec2::new(0., 0.),
            Vec2::new(1., 0.),
            Vec2::new(0., 1.),
        ])
    }

    #[test]
    fn test_trajectory_coordinates_are_paired() {
        let mut trajectory = Trajectory::with_start(Vec2::new(1., 2.));
        trajectory.push(Vec2::new(3., 4.));
        trajectory.push(Vec2::new(5., 6.));

        let (x, y) = trajectory.coordinates();
        assert_eq!(x, vec![1., 3., 5.]);
        assert_eq!(y, vec![2., 4., 6.]);
    }

    #[test]
    fn test_advance_records_positions_and_shape() {
        let tracked = [Vec2::new(0., 0.), Vec2::new(1., 1.)];
        let mut body = MaterialBody::new(triangle(), &tracked);

        body.advance(&[Vec2::new(0.1, 0.), Vec2::new(1.1, 1.)], triangle())
            .unwrap();

        assert_eq!(body.trajectories.len(), 2);
        assert_eq!(body.trajectories[0].len(), 2);
        assert_eq!(body.trajectories[0].points()[1], Vec2::new(0.1, 0.));
        assert_eq!(body.current_shape().len(), 3);
    }

    #[test]
    fn test_advance_rejects_mismatched_point_count() {
        let mut body = MaterialBody::new(triangle(), &[Vec2::new(0., 0.)]);
        let result = body.advance(&[Vec2::new(0., 0.), Vec2::new(1., 1.)], triangle());
        assert!(result.is_err());
    }

    #[test]
    fn test_new_body_starts_undeformed() {
        let body = MaterialBody::new(triangle(), &[]);
        assert_eq!(
            body.initial_shape().coordinates(),
            body.current_shape().coordinates()
        );
    }
}
