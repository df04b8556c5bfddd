use crate::field::FlowGrid;
use crate::Scalar;
use eyre::Result;
use na::DMatrix;
use std::path::Path;

/// One cell of a figure's panel grid, addressed row-major. Panels are always
/// 2-D coordinates, even in single-row figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelId {
    pub row: usize,
    pub col: usize,
}

impl PanelId {
    pub fn new(row: usize, col: usize) -> Self {
        PanelId { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLUE: Color = Color::new(0, 0, 255);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const GREEN: Color = Color::new(0, 128, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    pub width: u32,
    pub alpha: Scalar,
    pub markers: bool,
}

impl LineStyle {
    pub fn new(color: Color) -> Self {
        LineStyle {
            color,
            width: 1,
            alpha: 1.,
            markers: false,
        }
    }

    pub fn alpha(mut self, alpha: Scalar) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn markers(mut self) -> Self {
        self.markers = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillStyle {
    pub color: Color,
    pub alpha: Scalar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelDecor {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub grid: bool,
    pub legend: bool,
}

impl PanelDecor {
    pub fn new(title: impl Into<String>) -> Self {
        PanelDecor {
            title: title.into(),
            x_label: "x".to_string(),
            y_label: "y".to_string(),
            grid: true,
            legend: false,
        }
    }

    pub fn with_legend(mut self) -> Self {
        self.legend = true;
        self
    }
}

/// The injected plotting capability. `Plotter` only talks to this trait, so
/// the presentation logic can be exercised without a raster target.
///
/// Figures are multi-panel; every drawing call addresses one panel. Nothing
/// is rendered until `save` or `show`.
pub trait PlotSurface {
    fn begin_figure(&mut self, rows: usize, cols: usize, pixel_size: (u32, u32)) -> Result<()>;

    fn draw_line(
        &mut self,
        panel: PanelId,
        points: &[(Scalar, Scalar)],
        style: LineStyle,
        label: Option<&str>,
    ) -> Result<()>;

    fn fill_polygon(
        &mut self,
        panel: PanelId,
        points: &[(Scalar, Scalar)],
        style: FillStyle,
    ) -> Result<()>;

    /// Filled contour of `values` over the grid positions, with a color scale.
    fn contour_fill(&mut self, panel: PanelId, grid: &FlowGrid, values: &DMatrix<Scalar>)
        -> Result<()>;

    fn streamlines(&mut self, panel: PanelId, grid: &FlowGrid, style: LineStyle) -> Result<()>;

    fn decorate(&mut self, panel: PanelId, decor: &PanelDecor) -> Result<()>;

    fn save(&mut self, path: &Path) -> Result<()>;

    fn show(&mut self) -> Result<()>;
}

#[cfg(test)]
pub use recording::{RecordedOp, RecordingSurface};

#[cfg(test)]
mod recording {
    use super::*;
    use std::path::PathBuf;

    /// Structural test double: appends every surface call to an op log.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub ops: Vec<RecordedOp>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Figure {
            rows: usize,
            cols: usize,
            pixel_size: (u32, u32),
        },
        Line {
            panel: PanelId,
            points: usize,
            label: Option<String>,
        },
        Polygon {
            panel: PanelId,
            points: usize,
        },
        Contour {
            panel: PanelId,
            shape: (usize, usize),
        },
        Streamlines {
            panel: PanelId,
            width: u32,
        },
        Decor {
            panel: PanelId,
            title: String,
            grid: bool,
            legend: bool,
        },
        Save(PathBuf),
        Show,
    }

    impl PlotSurface for RecordingSurface {
        fn begin_figure(
            &mut self,
            rows: usize,
            cols: usize,
            pixel_size: (u32, u32),
        ) -> Result<()> {
            self.ops.push(RecordedOp::Figure {
                rows,
                cols,
                pixel_size,
            });
            Ok(())
        }

        fn draw_line(
            &mut self,
            panel: PanelId,
            points: &[(Scalar, Scalar)],
            _style: LineStyle,
            label: Option<&str>,
        ) -> Result<()> {
            self.ops.push(RecordedOp::Line {
                panel,
                points: points.len(),
                label: label.map(String::from),
            });
            Ok(())
        }

        fn fill_polygon(
            &mut self,
            panel: PanelId,
            points: &[(Scalar, Scalar)],
            _style: FillStyle,
        ) -> Result<()> {
            self.ops.push(RecordedOp::Polygon {
                panel,
                points: points.len(),
            });
            Ok(())
        }

        fn contour_fill(
            &mut self,
            panel: PanelId,
            grid: &FlowGrid,
            values: &DMatrix<Scalar>,
        ) -> Result<()> {
            debug_assert_eq!(grid.shape(), values.shape());
            self.ops.push(RecordedOp::Contour {
                panel,
                shape: values.shape(),
            });
            Ok(())
        }

        fn streamlines(
            &mut self,
            panel: PanelId,
            _grid: &FlowGrid,
            style: LineStyle,
        ) -> Result<()> {
            self.ops.push(RecordedOp::Streamlines {
                panel,
                width: style.width,
            });
            Ok(())
        }

        fn decorate(&mut self, panel: PanelId, decor: &PanelDecor) -> Result<()> {
            self.ops.push(RecordedOp::Decor {
                panel,
                title: decor.title.clone(),
                grid: decor.grid,
                legend: decor.legend,
            });
            Ok(())
        }

        fn save(&mut self, path: &Path) -> Result<()> {
            self.ops.push(RecordedOp::Save(path.to_path_buf()));
            Ok(())
        }

        fn show(&mut self) -> Result<()> {
            self.ops.push(RecordedOp::Show);
            Ok(())
        }
    }
}
