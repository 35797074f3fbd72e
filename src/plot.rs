use std::path::Path;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::info;

use crate::error::PipelineError;
use crate::fs_util;
use crate::pca::PcaScores;

const BAR_SIZE: (u32, u32) = (1000, 400);
const SCATTER_SIZE: (u32, u32) = (600, 600);
const PLACEHOLDER_SIZE: (u32, u32) = (600, 400);

fn plot_err(err: impl std::fmt::Display) -> PipelineError {
    PipelineError::Plot(err.to_string())
}

/// One bar per sample, in the given order.
pub fn library_size_barplot(sizes: &[(String, f64)], out_path: &Path) -> Result<(), PipelineError> {
    fs_util::ensure_parent_dir(out_path)?;
    let root = BitMapBackend::new(out_path, BAR_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let max_size = sizes
        .iter()
        .map(|(_, size)| *size)
        .fold(f64::MIN, f64::max)
        .max(1.0);

    let mut chart = ChartBuilder::on(&root)
        .caption("Library Size per Sample", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(70)
        .y_label_area_size(80)
        .build_cartesian_2d(0..sizes.len(), 0.0..max_size * 1.1)
        .map_err(plot_err)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(sizes.len())
        .x_label_formatter(&|index: &usize| {
            sizes
                .get(*index)
                .map(|(sample, _)| sample.clone())
                .unwrap_or_default()
        })
        .x_desc("Sample")
        .y_desc("Total mapped reads")
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(sizes.iter().enumerate().map(|(index, (_, size))| {
            Rectangle::new([(index, 0.0), (index + 1, *size)], BLUE.mix(0.6).filled())
        }))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    info!(path = %out_path.display(), "saved library size barplot");
    Ok(())
}

/// Scatter of the first two PC scores, one labeled point per sample.
pub fn pca_scatter_plot(pca: &PcaScores, out_path: &Path) -> Result<(), PipelineError> {
    fs_util::ensure_parent_dir(out_path)?;
    let root = BitMapBackend::new(out_path, SCATTER_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let (x_range, y_range) = score_ranges(&pca.scores);
    let mut chart = ChartBuilder::on(&root)
        .caption("PCA of log1p(TPM)", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .map_err(plot_err)?;
    chart
        .configure_mesh()
        .x_desc("PC1")
        .y_desc("PC2")
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(
            pca.scores
                .iter()
                .map(|score| Circle::new((score[0], score[1]), 4, BLUE.filled())),
        )
        .map_err(plot_err)?;
    chart
        .draw_series(
            pca.samples
                .iter()
                .zip(&pca.scores)
                .map(|(sample, score)| {
                    Text::new(
                        sample.clone(),
                        (score[0], score[1]),
                        ("sans-serif", 14).into_font().color(&BLACK),
                    )
                }),
        )
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    info!(path = %out_path.display(), "saved PCA plot");
    Ok(())
}

/// Written in place of the PCA scatter when PCA is disabled, so that
/// downstream consumers still find the file.
pub fn placeholder_pca(out_path: &Path) -> Result<(), PipelineError> {
    fs_util::ensure_parent_dir(out_path)?;
    let root = BitMapBackend::new(out_path, PLACEHOLDER_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    let style = ("sans-serif", 22)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    root.draw_text(
        "PCA disabled (see config)",
        &style,
        (
            PLACEHOLDER_SIZE.0 as i32 / 2,
            PLACEHOLDER_SIZE.1 as i32 / 2,
        ),
    )
    .map_err(plot_err)?;
    root.present().map_err(plot_err)?;
    info!(path = %out_path.display(), "PCA disabled; wrote placeholder");
    Ok(())
}

fn score_ranges(scores: &[[f64; 2]]) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let axis_range = |axis: usize| {
        let min = scores.iter().map(|s| s[axis]).fold(f64::MAX, f64::min);
        let max = scores.iter().map(|s| s[axis]).fold(f64::MIN, f64::max);
        let span = (max - min).max(1e-6);
        let pad = span * 0.15;
        (min - pad)..(max + pad)
    };
    (axis_range(0), axis_range(1))
}
