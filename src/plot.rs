//! Diagnostic plots for a deforming material body: point trajectories,
//! initial vs. deformed outlines, and velocity-field panels. The drawing
//! target is injected through `PlotSurface`, so everything here is layout
//! and ordering; the raster machinery lives in the submodules.

mod backend;
mod colormap;
mod raster;
mod streamline;

pub use backend::{Color, FillStyle, LineStyle, PanelDecor, PanelId, PlotSurface};
pub use raster::RasterSurface;

use crate::body::{MaterialBody, Shape};
use crate::field::VelocityField;
use crate::Scalar;
use eyre::{bail, Result};
use std::ops::Range;
use std::path::Path;

/// Pixels per inch of figure; output resolution is fixed at 150 DPI.
const DPI: u32 = 150;

const TRAJECTORY_FIGURE: (u32, u32) = (10 * DPI, 8 * DPI);
const SHAPES_FIGURE: (u32, u32) = (12 * DPI, 5 * DPI);
const VELOCITY_ROW: (u32, u32) = (15 * DPI, 5 * DPI);

const TRAJECTORY_ALPHA: Scalar = 0.5;
const FILL_ALPHA: Scalar = 0.3;

// The streamline overlay stays hairline-thin so the contour reads through
// it; the streamlines-only panel gets the heavier stroke.
const OVERLAY_STREAMLINE_WIDTH: u32 = 1;
const STREAMLINE_WIDTH: u32 = 2;

pub struct Plotter<S> {
    surface: S,
}

impl<S: PlotSurface> Plotter<S> {
    pub fn new(surface: S) -> Self {
        Plotter { surface }
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Draws every tracked point's path, overlaid with the initial and final
    /// outlines of the body. Trajectories go down first so the outlines sit
    /// on top.
    pub fn plot_trajectories(
        &mut self,
        body: &MaterialBody,
        save_path: Option<&Path>,
    ) -> Result<()> {
        let initial = outline(body.initial_shape())?;
        let current = outline(body.current_shape())?;

        tracing::debug!(trajectories = body.trajectories.len(), "plotting trajectories");

        self.surface.begin_figure(1, 1, TRAJECTORY_FIGURE)?;
        let panel = PanelId::new(0, 0);

        for trajectory in &body.trajectories {
            let (x, y) = trajectory.coordinates();
            let points: Vec<_> = x.into_iter().zip(y).collect();
            self.surface.draw_line(
                panel,
                &points,
                LineStyle::new(Color::BLUE).alpha(TRAJECTORY_ALPHA),
                None,
            )?;
        }

        self.surface.draw_line(
            panel,
            &initial,
            LineStyle::new(Color::RED).markers(),
            Some("Initial shape"),
        )?;
        self.surface.draw_line(
            panel,
            &current,
            LineStyle::new(Color::GREEN).markers(),
            Some("Final shape"),
        )?;
        self.surface.decorate(
            panel,
            &PanelDecor::new("Material point trajectories").with_legend(),
        )?;

        self.finish(save_path)
    }

    /// Side-by-side comparison of the initial and deformed outlines, each as
    /// an outlined and semi-transparently filled polygon.
    pub fn plot_body_shapes(&mut self, body: &MaterialBody, save_path: Option<&Path>) -> Result<()> {
        let initial = outline(body.initial_shape())?;
        let current = outline(body.current_shape())?;

        self.surface.begin_figure(1, 2, SHAPES_FIGURE)?;

        let panels = [
            (PanelId::new(0, 0), &initial, Color::BLUE, "Initial body shape"),
            (PanelId::new(0, 1), &current, Color::RED, "Deformed body shape"),
        ];
        for &(panel, points, color, title) in &panels {
            self.surface
                .draw_line(panel, points, LineStyle::new(color).markers(), None)?;
            self.surface.fill_polygon(
                panel,
                points,
                FillStyle {
                    color,
                    alpha: FILL_ALPHA,
                },
            )?;
            self.surface.decorate(panel, &PanelDecor::new(title))?;
        }

        self.finish(save_path)
    }

    /// One row of panels per requested time: the speed contour with white
    /// streamlines on the left, streamlines alone on the right. A single
    /// requested time still produces a 1x2 panel grid.
    pub fn plot_velocity_fields<F: VelocityField>(
        &mut self,
        field: &F,
        times: &[Scalar],
        x_range: &Range<Scalar>,
        y_range: &Range<Scalar>,
        save_path: Option<&Path>,
    ) -> Result<()> {
        if times.is_empty() {
            bail!("velocity-field plot needs at least one sample time");
        }

        let rows = times.len();
        self.surface
            .begin_figure(rows, 2, (VELOCITY_ROW.0, VELOCITY_ROW.1 * rows as u32))?;

        for (row, &t) in times.iter().enumerate() {
            let grid = field.generate_streamlines(x_range, y_range, t);
            let speed = grid.speed();

            let left = PanelId::new(row, 0);
            self.surface.contour_fill(left, &grid, &speed)?;
            self.surface.streamlines(
                left,
                &grid,
                LineStyle::new(Color::WHITE).width(OVERLAY_STREAMLINE_WIDTH),
            )?;
            self.surface.decorate(
                left,
                &PanelDecor::new(format!("Velocity field at t = {:.2}", t)),
            )?;

            let right = PanelId::new(row, 1);
            self.surface.streamlines(
                right,
                &grid,
                LineStyle::new(Color::BLUE).width(STREAMLINE_WIDTH),
            )?;
            self.surface.decorate(
                right,
                &PanelDecor::new(format!("Streamlines at t = {:.2}", t)),
            )?;
        }

        self.finish(save_path)
    }

    fn finish(&mut self, save_path: Option<&Path>) -> Result<()> {
        if let Some(path) = save_path {
            self.surface.save(path)?;
        }
        self.surface.show()
    }
}

/// The outline as paired coordinates. Fewer than 3 points cannot form a
/// polygon and is rejected rather than silently rendered.
fn outline(shape: &Shape) -> Result<Vec<(Scalar, Scalar)>> {
    if shape.len() < 3 {
        bail!(
            "degenerate shape: {} point(s), a polygon needs at least 3",
            shape.len()
        );
    }

    let (x, y) = shape.coordinates();
    Ok(x.into_iter().zip(y).collect())
}
