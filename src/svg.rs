//! SVG export of the schedule diagram.
//!
//! The document is assembled by plain string concatenation: a background,
//! axis labels, one translucent occupancy area per GPU, one `class="cell"`
//! rectangle per populated cell, and an arrowed line per flow edge. The
//! `class="cell"` marker is load-bearing: consumers (and our round-trip
//! test) count those rects to match them against populated cells.

use std::fmt::Write as _;
use std::io;
use std::path::Path;

use crate::color::batch_color;
use crate::flow::flow_edges;
use crate::grid::{Cell, Grid};
use crate::timeline::{occupancy, peak};

/// File name offered for download/export.
pub const EXPORT_FILE_NAME: &str = "gpu-visualization.svg";

const CELL_W: f32 = 56.0;
const CELL_H: f32 = 36.0;
const GAP: f32 = 8.0;
const LABEL_W: f32 = 64.0;
const HEADER_H: f32 = 28.0;
const PAD: f32 = 12.0;
const OCCUPANCY_FILL: &str = "#1f6feb";

fn cell_left(time: usize) -> f32 {
    PAD + LABEL_W + time as f32 * (CELL_W + GAP)
}

fn cell_top(gpu: usize) -> f32 {
    PAD + HEADER_H + gpu as f32 * (CELL_H + GAP)
}

fn cell_center(gpu: usize, time: usize) -> (f32, f32) {
    (cell_left(time) + CELL_W / 2.0, cell_top(gpu) + CELL_H / 2.0)
}

/// Render the grid's flow diagram and memory timeline as a standalone SVG
/// document string.
pub fn render_document(grid: &Grid) -> String {
    let width = cell_left(grid.num_timesteps()) - GAP + PAD;
    let height = cell_top(grid.num_gpus()) - GAP + PAD;

    let mut svg = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" \
         width=\"{width:.0}\" height=\"{height:.0}\" viewBox=\"0 0 {width:.0} {height:.0}\">"
    );
    let _ = write!(
        svg,
        "<rect x=\"0\" y=\"0\" width=\"{width:.0}\" height=\"{height:.0}\" fill=\"#ffffff\"/>"
    );

    write_axes(&mut svg, grid);
    write_occupancy(&mut svg, grid);
    write_cells(&mut svg, grid);
    write_edges(&mut svg, grid);

    svg.push_str("</svg>");
    svg
}

/// Write the current diagram to `path`. Callers treat failure as a no-op
/// beyond logging.
pub fn export(grid: &Grid, path: &Path) -> io::Result<()> {
    std::fs::write(path, render_document(grid))
}

fn write_axes(svg: &mut String, grid: &Grid) {
    for time in 0..grid.num_timesteps() {
        let (x, _) = cell_center(0, time);
        let y = PAD + HEADER_H - 8.0;
        let _ = write!(
            svg,
            "<text x=\"{x:.1}\" y=\"{y:.1}\" fill=\"#57606a\" font-size=\"11\" \
             text-anchor=\"middle\">t{time}</text>"
        );
    }
    for gpu in 0..grid.num_gpus() {
        let x = PAD + LABEL_W - 10.0;
        let (_, y) = cell_center(gpu, 0);
        let _ = write!(
            svg,
            "<text x=\"{x:.1}\" y=\"{y:.1}\" fill=\"#57606a\" font-size=\"12\" \
             text-anchor=\"end\" dominant-baseline=\"middle\">GPU {gpu}</text>"
        );
    }
}

/// One step-shaped area per GPU row, scaled against the grid-wide peak so
/// rows are comparable.
fn write_occupancy(svg: &mut String, grid: &Grid) {
    let table = occupancy(grid);
    let peak_count = peak(&table).max(1) as f32;

    for (gpu, row) in table.iter().enumerate() {
        if row.iter().all(|&count| count == 0) {
            continue;
        }

        let base = cell_top(gpu) + CELL_H + GAP / 2.0;
        let mut points = format!("{:.1},{:.1}", cell_left(0), base);
        for (time, &count) in row.iter().enumerate() {
            let y = base - (count as f32 / peak_count) * (CELL_H + GAP / 2.0);
            let x0 = cell_left(time);
            let x1 = x0 + CELL_W + GAP;
            let _ = write!(points, " {x0:.1},{y:.1} {x1:.1},{y:.1}");
        }
        let _ = write!(points, " {:.1},{base:.1}", cell_left(row.len()));

        let _ = write!(
            svg,
            "<polygon points=\"{points}\" fill=\"{OCCUPANCY_FILL}\" fill-opacity=\"0.15\" \
             stroke=\"{OCCUPANCY_FILL}\" stroke-opacity=\"0.4\" stroke-width=\"1\"/>"
        );
    }
}

fn write_cells(svg: &mut String, grid: &Grid) {
    for (gpu, time, cell) in grid.iter() {
        let Cell::Filled { batch, pass } = cell else {
            continue;
        };
        let color = batch_color(batch, pass);
        let x = cell_left(time);
        let y = cell_top(gpu);
        let _ = write!(
            svg,
            "<rect class=\"cell\" x=\"{x:.1}\" y=\"{y:.1}\" width=\"{CELL_W:.0}\" \
             height=\"{CELL_H:.0}\" rx=\"4\" fill=\"{fill}\" stroke=\"#24292f\" \
             stroke-width=\"1\"/>",
            fill = color.css()
        );
        let (cx, cy) = cell_center(gpu, time);
        let _ = write!(
            svg,
            "<text x=\"{cx:.1}\" y=\"{cy:.1}\" fill=\"#ffffff\" font-size=\"13\" \
             text-anchor=\"middle\" dominant-baseline=\"central\">{batch}</text>"
        );
    }
}

fn write_edges(svg: &mut String, grid: &Grid) {
    for edge in flow_edges(grid) {
        let (x0, y0) = cell_center(edge.from_gpu, edge.from_time);
        let (x1, y1) = cell_center(edge.to_gpu, edge.to_time);

        let (dx, dy) = (x1 - x0, y1 - y0);
        let len = (dx * dx + dy * dy).sqrt().max(1.0);
        let (ux, uy) = (dx / len, dy / len);

        // Pull both endpoints out of the cell boxes so arrows sit between
        // them rather than underneath.
        let inset = CELL_H / 2.0 + 2.0;
        let (sx, sy) = (x0 + ux * inset, y0 + uy * inset);
        let (ex, ey) = (x1 - ux * inset, y1 - uy * inset);

        let color = batch_color(edge.batch, edge.pass).css();
        let _ = write!(
            svg,
            "<line x1=\"{sx:.1}\" y1=\"{sy:.1}\" x2=\"{ex:.1}\" y2=\"{ey:.1}\" \
             stroke=\"{color}\" stroke-width=\"2\"/>"
        );

        // Arrowhead: a small triangle with its tip at the line end.
        let (px, py) = (-uy, ux);
        let (bx, by) = (ex - ux * 8.0, ey - uy * 8.0);
        let _ = write!(
            svg,
            "<polygon points=\"{ex:.1},{ey:.1} {:.1},{:.1} {:.1},{:.1}\" fill=\"{color}\"/>",
            bx + px * 4.0,
            by + py * 4.0,
            bx - px * 4.0,
            by - py * 4.0,
        );
    }
}
