mod body;
mod field;
mod plot;
mod util;

extern crate nalgebra as na;

use crate::body::{MaterialBody, Shape};
use crate::field::ShearFlow;
use crate::plot::{Plotter, RasterSurface};

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Deserialize;
use structopt::StructOpt;

pub type Scalar = f64;
pub type Vec2 = na::Vector2<Scalar>;

/// Demo scenario: a circular body carried by a steady shear flow. The motion
/// is the analytic deformation map of that flow evaluated at the sample
/// times, so the body and the plotted velocity field agree.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct Scenario {
    boundary_points: usize,
    tracked_points: usize,
    shear_rate: Scalar,
    times: Vec<Scalar>,
    x_range: (Scalar, Scalar),
    y_range: (Scalar, Scalar),
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario {
            boundary_points: 48,
            tracked_points: 200,
            shear_rate: 0.35,
            times: vec![0., 1., 2.],
            x_range: (-2., 2.),
            y_range: (-2., 2.),
        }
    }
}

#[derive(StructOpt, Debug)]
#[structopt(name = "continuum_plotter")]
struct Opt {
    /// JSON scenario file; the built-in demo scenario is used when omitted.
    #[structopt(short, long)]
    scenario: Option<std::path::PathBuf>,
    /// Directory the rendered figures are written to. Without it the figures
    /// are only rendered, not saved.
    #[structopt(short, long)]
    output_dir: Option<std::path::PathBuf>,
}

/// Shear deformation map: x = X + rate * t * Y, y = Y.
fn sheared(p: Vec2, rate: Scalar, t: Scalar) -> Vec2 {
    Vec2::new(p.x + rate * t * p.y, p.y)
}

fn circle_outline(n: usize) -> Vec<Vec2> {
    (0..n)
        .map(|i| {
            let theta = 2. * std::f64::consts::PI * i as Scalar / n as Scalar;
            Vec2::new(theta.cos(), theta.sin())
        })
        .collect()
}

fn build_body(scenario: &Scenario) -> eyre::Result<MaterialBody> {
    let mut rng = StdRng::from_seed([0; 32]);

    let outline = circle_outline(scenario.boundary_points);

    // Tracked material points scattered over the unit disk.
    let mut tracked = Vec::with_capacity(scenario.tracked_points);
    while tracked.len() < scenario.tracked_points {
        let p = Vec2::new(rng.gen::<Scalar>() * 2. - 1., rng.gen::<Scalar>() * 2. - 1.);
        if p.magnitude_squared() < 1. {
            tracked.push(p);
        }
    }

    let mut body = MaterialBody::new(Shape::new(outline.clone()), &tracked);
    for &t in &scenario.times {
        let positions: Vec<Vec2> = tracked
            .iter()
            .map(|&p| sheared(p, scenario.shear_rate, t))
            .collect();
        let shape = Shape::new(
            outline
                .iter()
                .map(|&p| sheared(p, scenario.shear_rate, t))
                .collect(),
        );
        body.advance(&positions, shape)?;
    }

    Ok(body)
}

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt::init();

    let opt = Opt::from_args();

    use eyre::WrapErr;

    let scenario = match &opt.scenario {
        Some(path) => std::fs::read(path)
            .wrap_err_with(|| format!("Failed to read JSON scenario file: {:?}", path))
            .and_then(|json| {
                serde_json::from_slice(&json).wrap_err("Serde failed to deserialize JSON.")
            })?,
        None => Scenario::default(),
    };

    if let Some(dir) = &opt.output_dir {
        std::fs::create_dir_all(dir)
            .wrap_err_with(|| format!("Failed to create output directory: {:?}", dir))?;
    }
    let path_for = |name: &str| opt.output_dir.as_ref().map(|dir| dir.join(name));

    tracing::info!(?scenario, "rendering diagnostic figures");

    let body = build_body(&scenario)?;
    let field = ShearFlow {
        rate: scenario.shear_rate,
    };

    let mut plotter = Plotter::new(RasterSurface::new());
    plotter.plot_trajectories(&body, path_for("trajectories.png").as_deref())?;
    plotter.plot_body_shapes(&body, path_for("body_shapes.png").as_deref())?;
    plotter.plot_velocity_fields(
        &field,
        &scenario.times,
        &(scenario.x_range.0..scenario.x_range.1),
        &(scenario.y_range.0..scenario.y_range.1),
        path_for("velocity_fields.png").as_deref(),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_body_is_deterministic() {
        let scenario = Scenario::default();
        let a = build_body(&scenario).unwrap();
        let b = build_body(&scenario).unwrap();

        assert_eq!(a.trajectories.len(), scenario.tracked_points);
        assert_eq!(a.trajectories[0].points(), b.trajectories[0].points());
        // One recorded step per sample time, plus the seed position.
        assert_eq!(a.trajectories[0].len(), scenario.times.len() + 1);
    }

    #[test]
    fn test_shear_map_fixes_the_axis() {
        let p = Vec2::new(0.7, 0.);
        assert_eq!(sheared(p, 0.35, 2.), p);

        let q = Vec2::new(0., 1.);
        assert_eq!(sheared(q, 0.5, 2.), Vec2::new(1., 1.));
    }

    #[test]
    fn test_scenario_json_round_trip() {
        let json = r#"{ "shear_rate": 0.5, "times": [0.0, 0.5] }"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();
        assert_eq!(scenario.shear_rate, 0.5);
        assert_eq!(scenario.times, vec![0.0, 0.5]);
        // Unspecified fields fall back to the defaults.
        assert_eq!(scenario.boundary_points, 48);
    }
}
