//! The real `PlotSurface`: buffered drawing over `plotters`. Every call is
//! recorded against its panel; nothing touches a backend until `save` or
//! `show`, when the whole figure is laid out and rendered in one pass.

use super::backend::{Color, FillStyle, LineStyle, PanelDecor, PanelId, PlotSurface};
use super::{colormap, streamline};
use crate::field::FlowGrid;
use crate::util::RangeExt;
use crate::Scalar;
use eyre::{ensure, Result};
use itertools::iproduct;
use na::DMatrix;
use plotters::coord::Shift;
use plotters::prelude::*;
// The domain `Color` struct above shadows the prelude's `Color` trait; keep
// the trait in scope anonymously so the style methods resolve.
use plotters::style::Color as _;
use std::ops::Range;
use std::path::Path;

const MARGIN: u32 = 10;
const CAPTION_HEIGHT: u32 = 30;
const X_LABEL_AREA: u32 = 35;
const Y_LABEL_AREA: u32 = 50;
const COLORBAR_WIDTH: u32 = 60;
const CONTOUR_LEVELS: usize = 10;
const MARKER_SIZE: u32 = 3;
const CAPTION_FONT: (&str, u32) = ("sans-serif", 20);
const LABEL_FONT: (&str, u32) = ("sans-serif", 12);

enum PanelOp {
    Line {
        points: Vec<(Scalar, Scalar)>,
        style: LineStyle,
        label: Option<String>,
    },
    Polygon {
        points: Vec<(Scalar, Scalar)>,
        style: FillStyle,
    },
    Contour {
        grid: FlowGrid,
        values: DMatrix<Scalar>,
    },
    Streamlines {
        grid: FlowGrid,
        style: LineStyle,
    },
}

#[derive(Default)]
struct Panel {
    ops: Vec<PanelOp>,
    decor: Option<PanelDecor>,
}

/// The axis ranges and plot-box pixel size a panel was rendered with. Kept
/// around after rendering so tests can check aspect-ratio guarantees.
#[derive(Debug, Clone)]
pub struct PanelExtent {
    pub x_range: Range<Scalar>,
    pub y_range: Range<Scalar>,
    pub plot_size: (u32, u32),
}

#[derive(Default)]
pub struct RasterSurface {
    rows: usize,
    cols: usize,
    size: (u32, u32),
    panels: Vec<Panel>,
    extents: Vec<PanelExtent>,
    frame: Option<Vec<u8>>,
}

impl RasterSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-panel render geometry of the most recently rendered figure,
    /// row-major.
    pub fn panel_extents(&self) -> &[PanelExtent] {
        &self.extents
    }

    /// RGB pixels of the last `show`n figure.
    pub fn last_frame(&self) -> Option<&[u8]> {
        self.frame.as_deref()
    }

    fn panel_mut(&mut self, id: PanelId) -> Result<&mut Panel> {
        ensure!(
            id.row < self.rows && id.col < self.cols,
            "panel ({}, {}) outside the {}x{} figure",
            id.row,
            id.col,
            self.rows,
            self.cols
        );
        Ok(&mut self.panels[id.row * self.cols + id.col])
    }

    fn render_figure<DB>(&self, root: &DrawingArea<DB, Shift>) -> Result<Vec<PanelExtent>>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        ensure!(self.rows > 0, "no figure begun");

        root.fill(&WHITE)?;

        let areas = root.split_evenly((self.rows, self.cols));
        self.panels
            .iter()
            .zip(&areas)
            .map(|(panel, area)| render_panel(area, panel))
            .collect()
    }
}

impl PlotSurface for RasterSurface {
    fn begin_figure(&mut self, rows: usize, cols: usize, pixel_size: (u32, u32)) -> Result<()> {
        ensure!(rows > 0 && cols > 0, "figure needs at least one panel");
        ensure!(
            pixel_size.0 > 0 && pixel_size.1 > 0,
            "figure needs a nonzero pixel size"
        );

        self.rows = rows;
        self.cols = cols;
        self.size = pixel_size;
        self.panels = (0..rows * cols).map(|_| Panel::default()).collect();
        self.extents.clear();
        self.frame = None;
        Ok(())
    }

    fn draw_line(
        &mut self,
        panel: PanelId,
        points: &[(Scalar, Scalar)],
        style: LineStyle,
        label: Option<&str>,
    ) -> Result<()> {
        self.panel_mut(panel)?.ops.push(PanelOp::Line {
            points: points.to_vec(),
            style,
            label: label.map(String::from),
        });
        Ok(())
    }

    fn fill_polygon(
        &mut self,
        panel: PanelId,
        points: &[(Scalar, Scalar)],
        style: FillStyle,
    ) -> Result<()> {
        self.panel_mut(panel)?.ops.push(PanelOp::Polygon {
            points: points.to_vec(),
            style,
        });
        Ok(())
    }

    fn contour_fill(
        &mut self,
        panel: PanelId,
        grid: &FlowGrid,
        values: &DMatrix<Scalar>,
    ) -> Result<()> {
        ensure!(
            grid.shape() == values.shape(),
            "contour values {:?} do not match the grid {:?}",
            values.shape(),
            grid.shape()
        );
        self.panel_mut(panel)?.ops.push(PanelOp::Contour {
            grid: grid.clone(),
            values: values.clone(),
        });
        Ok(())
    }

    fn streamlines(&mut self, panel: PanelId, grid: &FlowGrid, style: LineStyle) -> Result<()> {
        self.panel_mut(panel)?.ops.push(PanelOp::Streamlines {
            grid: grid.clone(),
            style,
        });
        Ok(())
    }

    fn decorate(&mut self, panel: PanelId, decor: &PanelDecor) -> Result<()> {
        self.panel_mut(panel)?.decor = Some(decor.clone());
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        let svg = path.extension().and_then(|e| e.to_str()) == Some("svg");

        let extents = if svg {
            let root = SVGBackend::new(path, self.size).into_drawing_area();
            let extents = self.render_figure(&root)?;
            root.present()?;
            extents
        } else {
            let root = BitMapBackend::new(path, self.size).into_drawing_area();
            let extents = self.render_figure(&root)?;
            root.present()?;
            extents
        };

        self.extents = extents;
        tracing::info!(path = %path.display(), "figure saved");
        Ok(())
    }

    fn show(&mut self) -> Result<()> {
        let (w, h) = self.size;
        let mut frame = vec![0u8; (w as usize) * (h as usize) * 3];

        let extents = {
            let root = BitMapBackend::with_buffer(&mut frame, self.size).into_drawing_area();
            let extents = self.render_figure(&root)?;
            root.present()?;
            extents
        };

        self.extents = extents;
        self.frame = Some(frame);
        tracing::debug!(width = w, height = h, "figure presented");
        Ok(())
    }
}

fn rgb(c: Color) -> RGBColor {
    RGBColor(c.r, c.g, c.b)
}

fn render_panel<DB>(area: &DrawingArea<DB, Shift>, panel: &Panel) -> Result<PanelExtent>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let has_contour = panel
        .ops
        .iter()
        .any(|op| matches!(op, PanelOp::Contour { .. }));

    let (chart_area, bar_area) = if has_contour {
        let (w, _) = area.dim_in_pixel();
        let (left, right) = area.split_horizontally(w.saturating_sub(COLORBAR_WIDTH) as i32);
        (left, Some(right))
    } else {
        (area.clone(), None)
    };

    let has_caption = panel
        .decor
        .as_ref()
        .map(|d| !d.title.is_empty())
        .unwrap_or(false);
    let (area_w, area_h) = chart_area.dim_in_pixel();
    let plot_size = (
        area_w.saturating_sub(Y_LABEL_AREA + 2 * MARGIN).max(1),
        area_h
            .saturating_sub(X_LABEL_AREA + 2 * MARGIN + if has_caption { CAPTION_HEIGHT } else { 0 })
            .max(1),
    );

    let (x_data, y_data) = data_bounds(&panel.ops);
    let (x_range, y_range) = fit_equal_aspect(x_data, y_data, plot_size);

    let mut builder = ChartBuilder::on(&chart_area);
    builder
        .margin(MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA);
    if let Some(decor) = &panel.decor {
        if !decor.title.is_empty() {
            builder.caption(&decor.title, CAPTION_FONT);
        }
    }
    let mut chart = builder.build_cartesian_2d(x_range.clone(), y_range.clone())?;

    {
        let mut mesh = chart.configure_mesh();
        if let Some(decor) = &panel.decor {
            mesh.x_desc(decor.x_label.as_str())
                .y_desc(decor.y_label.as_str());
            if !decor.grid {
                mesh.disable_mesh();
            }
        }
        mesh.light_line_style(BLACK.mix(0.1)).draw()?;
    }

    let mut has_labels = false;
    for op in &panel.ops {
        match op {
            PanelOp::Line {
                points,
                style,
                label,
            } => {
                let color = rgb(style.color);
                let series = chart.draw_series(LineSeries::new(
                    points.iter().cloned(),
                    color.mix(style.alpha).stroke_width(style.width),
                ))?;
                if let Some(label) = label {
                    has_labels = true;
                    series.label(label.as_str()).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color)
                    });
                }
                if style.markers {
                    chart.draw_series(
                        points
                            .iter()
                            .map(|&(x, y)| Circle::new((x, y), MARKER_SIZE, color.filled())),
                    )?;
                }
            }
            PanelOp::Polygon { points, style } => {
                chart.draw_series(std::iter::once(Polygon::new(
                    points.clone(),
                    rgb(style.color).mix(style.alpha).filled(),
                )))?;
            }
            PanelOp::Contour { grid, values } => {
                let (nrows, ncols) = grid.shape();
                if nrows >= 2 && ncols >= 2 {
                    let min = values.min();
                    let max = values.max();
                    chart.draw_series(iproduct!(0..nrows - 1, 0..ncols - 1).map(|(i, j)| {
                        let value = 0.25
                            * (values[(i, j)]
                                + values[(i + 1, j)]
                                + values[(i, j + 1)]
                                + values[(i + 1, j + 1)]);
                        let level = colormap::level_index(
                            colormap::normalize(value, min, max),
                            CONTOUR_LEVELS,
                        );
                        let color =
                            colormap::viridis(colormap::level_value(level, CONTOUR_LEVELS));
                        Rectangle::new(
                            [
                                (grid.x[(i, j)], grid.y[(i, j)]),
                                (grid.x[(i + 1, j + 1)], grid.y[(i + 1, j + 1)]),
                            ],
                            rgb(color).mix(0.8).filled(),
                        )
                    }))?;

                    if let Some(bar) = &bar_area {
                        draw_colorbar(bar, min, max)?;
                    }
                }
            }
            PanelOp::Streamlines { grid, style } => {
                let color = rgb(style.color).mix(style.alpha);
                for line in streamline::trace_streamlines(grid) {
                    chart.draw_series(LineSeries::new(line, color.stroke_width(style.width)))?;
                }
            }
        }
    }

    let legend = panel.decor.as_ref().map(|d| d.legend).unwrap_or(false);
    if legend && has_labels {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    Ok(PanelExtent {
        x_range,
        y_range,
        plot_size,
    })
}

/// Smallest x/y ranges covering everything drawn in the panel.
fn data_bounds(ops: &[PanelOp]) -> (Range<Scalar>, Range<Scalar>) {
    let mut x: Option<Range<Scalar>> = None;
    let mut y: Option<Range<Scalar>> = None;

    let cover = |range: &mut Option<Range<Scalar>>, value: Scalar| {
        if !value.is_finite() {
            return;
        }
        *range = Some(match range.take() {
            Some(r) => r.start.min(value)..r.end.max(value),
            None => value..value,
        });
    };

    for op in ops {
        match op {
            PanelOp::Line { points, .. } | PanelOp::Polygon { points, .. } => {
                for &(px, py) in points {
                    cover(&mut x, px);
                    cover(&mut y, py);
                }
            }
            PanelOp::Contour { grid, .. } | PanelOp::Streamlines { grid, .. } => {
                let xb = grid.x_bounds();
                let yb = grid.y_bounds();
                cover(&mut x, xb.start);
                cover(&mut x, xb.end);
                cover(&mut y, yb.start);
                cover(&mut y, yb.end);
            }
        }
    }

    (x.unwrap_or(0.0..1.0), y.unwrap_or(0.0..1.0))
}

/// Pads the data ranges, then widens the narrower axis until both map to the
/// same data-units-per-pixel, giving an equal-aspect panel.
fn fit_equal_aspect(
    x: Range<Scalar>,
    y: Range<Scalar>,
    plot_size: (u32, u32),
) -> (Range<Scalar>, Range<Scalar>) {
    let pad = |r: Range<Scalar>| {
        if r.size() > 0. {
            r.thickened(0.05 * r.size())
        } else {
            r.thickened(0.5)
        }
    };
    let x = pad(x);
    let y = pad(y);

    let (w, h) = (plot_size.0 as Scalar, plot_size.1 as Scalar);
    let units_per_pixel = (x.size() / w).max(y.size() / h);

    let fit = |r: Range<Scalar>, extent: Scalar| {
        let half = 0.5 * units_per_pixel * extent;
        r.center() - half..r.center() + half
    };

    (fit(x, w), fit(y, h))
}

fn draw_colorbar<DB>(area: &DrawingArea<DB, Shift>, min: Scalar, max: Scalar) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (_, h) = area.dim_in_pixel();
    let top = (CAPTION_HEIGHT + MARGIN) as i32;
    let bottom = h.saturating_sub(X_LABEL_AREA + MARGIN) as i32;
    if bottom <= top + CONTOUR_LEVELS as i32 {
        return Ok(());
    }

    let band = (bottom - top) as Scalar / CONTOUR_LEVELS as Scalar;
    for level in 0..CONTOUR_LEVELS {
        let color = colormap::viridis(colormap::level_value(level, CONTOUR_LEVELS));
        // Lowest level sits at the bottom of the strip.
        let band_top = bottom - ((level + 1) as Scalar * band) as i32;
        let band_bottom = bottom - (level as Scalar * band) as i32;
        area.draw(&Rectangle::new(
            [(8, band_top), (24, band_bottom)],
            rgb(color).filled(),
        ))?;
    }

    area.draw(&Text::new(format!("{:.2}", max), (2, top - 16), LABEL_FONT))?;
    area.draw(&Text::new(format!("{:.2}", min), (2, bottom + 4), LABEL_FONT))?;
    Ok(())
}
