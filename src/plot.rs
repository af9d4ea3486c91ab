//! Bar chart of successful transactions per service.
//!
//! The chart is drawn with [`plotters`] on a bitmap backend and saved as a PNG
//! sized like a 10x6 inch figure at 300 DPI. Saving problems are reported but
//! never stop the run.

use crate::{compute::SuccessTable, config::DisplayMode, data::Record};
use log::{error, info, warn};
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const TITLE: &str = "Distribuição de Transações de Sucesso por Serviço";
pub const X_DESC: &str = "Nome do Serviço";
pub const Y_DESC: &str = "Número de Transações";

/// 10x6 inches at 300 DPI.
const CHART_SIZE: (u32, u32) = (3000, 1800);
const BAR_COLOR: RGBColor = RGBColor(135, 206, 235);
const FONT: &str = "sans-serif";
const LABEL_FONT_SIZE: u32 = 44;
const MAX_Y_LABELS: u32 = 10;

/// Errors that can occur while drawing or saving the chart
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Failed to save plot to file: {0}")]
    FileSave(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, PlotError>;

/// Number of successful transactions for one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServiceCount {
    pub service: String,
    pub count: u32,
}

/// What `render_chart` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RenderOutcome {
    pub path: PathBuf,
    pub saved: bool,
    pub counts: Vec<ServiceCount>,
}

/// Counts rows per service, highest count first. Services with the same
/// count keep the order in which they first appear.
pub(crate) fn service_counts<'a>(rows: impl IntoIterator<Item = &'a Record>) -> Vec<ServiceCount> {
    let mut counts: Vec<ServiceCount> = Vec::new();
    for row in rows {
        match counts.iter_mut().find(|c| c.service == row.service_name) {
            Some(c) => c.count += 1,
            None => counts.push(ServiceCount {
                service: row.service_name.clone(),
                count: 1,
            }),
        }
    }
    // sort_by is stable, ties stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Draws the per-service chart into `dir/file_name`, then hands it to the
/// display sink. A failed save is logged and reflected in
/// `RenderOutcome::saved`.
pub(crate) fn render_chart(
    successes: &SuccessTable<'_>,
    dir: &Path,
    file_name: &str,
    display: DisplayMode,
) -> RenderOutcome {
    let path = dir.join(file_name);
    let counts = service_counts(successes.rows());
    let saved = match draw_bar_chart(&counts, &path) {
        Ok(()) => {
            info!("Sucesso: Gráfico salvo em: '{}'", path.display());
            true
        }
        Err(e) => {
            error!("ERRO: Não foi possível salvar o gráfico. Detalhe: {e}");
            false
        }
    };
    show(display, &path, saved);
    RenderOutcome {
        path,
        saved,
        counts,
    }
}

/// Smallest step of the form 1, 2 or 5 times a power of ten that splits
/// `0..=max` into at most `MAX_Y_LABELS` intervals.
fn tick_step(max: u32) -> u32 {
    let mut magnitude = 1u32;
    loop {
        for factor in [1, 2, 5] {
            let step = factor * magnitude;
            if max.div_ceil(step) <= MAX_Y_LABELS {
                return step;
            }
        }
        magnitude = magnitude.saturating_mul(10);
    }
}

/// Height reserved under the plot for the rotated service names and the
/// axis description.
fn x_label_area(counts: &[ServiceCount]) -> u32 {
    let longest = counts
        .iter()
        .map(|c| c.service.chars().count() as u32)
        .max()
        .unwrap_or(0);
    (140 + longest * LABEL_FONT_SIZE * 6 / 10).min(CHART_SIZE.1 / 2)
}

fn draw_bar_chart(counts: &[ServiceCount], output_path: &Path) -> Result<()> {
    if counts.is_empty() {
        return Err(PlotError::InvalidData(
            "no successful transactions to plot".to_string(),
        ));
    }

    let root = BitMapBackend::new(output_path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let bars = counts.len() as u32;
    let max_count = counts.iter().map(|c| c.count).max().unwrap_or(0);
    let step = tick_step(max_count);
    // one empty tick of headroom above the tallest bar
    let y_max = (max_count / step + 1) * step;

    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, (FONT, 80))
        .margin(40)
        .x_label_area_size(x_label_area(counts))
        .y_label_area_size(200)
        .build_cartesian_2d((0u32..bars).into_segmented(), 0u32..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    let service_label = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => counts
            .get(*i as usize)
            .map(|c| c.service.clone())
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(counts.len())
        .y_labels((y_max / step + 1) as usize)
        .x_label_formatter(&service_label)
        .y_label_formatter(&|y| y.to_string())
        .x_label_style(
            (FONT, LABEL_FONT_SIZE)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .y_label_style((FONT, LABEL_FONT_SIZE))
        .x_desc(X_DESC)
        .y_desc(Y_DESC)
        .axis_desc_style((FONT, 56))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let grid = BLACK.mix(0.3).stroke_width(3);
    for y in (step..=y_max).step_by(step as usize) {
        chart
            .draw_series(DashedLineSeries::new(
                [(SegmentValue::Exact(0), y), (SegmentValue::Last, y)],
                24,
                16,
                grid,
            ))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BAR_COLOR.filled())
                .margin(30)
                .data(
                    counts
                        .iter()
                        .enumerate()
                        .map(|(i, c)| (i as u32, c.count)),
                ),
        )
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| PlotError::FileSave(e.to_string()))?;

    Ok(())
}

/// Display sink. `Interactive` waits for the viewer command to exit; on Linux
/// `xdg-open` usually exits once the viewer is launched.
fn show(display: DisplayMode, path: &Path, saved: bool) {
    if display == DisplayMode::Headless {
        return;
    }
    if !saved {
        warn!("Nada a exibir: '{}' não foi gerado.", path.display());
        return;
    }
    match viewer_command(path).status() {
        Ok(status) if status.success() => {}
        Ok(status) => warn!("Visualizador terminou com {status}"),
        Err(e) => warn!("Não foi possível abrir o visualizador. Detalhe: {e}"),
    }
}

fn viewer_command(path: &Path) -> std::process::Command {
    let mut cmd;
    if cfg!(target_os = "windows") {
        cmd = std::process::Command::new("cmd");
        cmd.args(["/C", "start", "/WAIT", ""]);
    } else if cfg!(target_os = "macos") {
        cmd = std::process::Command::new("open");
        cmd.arg("-W");
    } else {
        cmd = std::process::Command::new("xdg-open");
    }
    cmd.arg(path);
    cmd
}
