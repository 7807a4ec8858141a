use eframe::egui::{
    self, pos2, vec2, Align2, Rect, Response, Sense, Shape, Stroke, TextStyle, Ui, Vec2, Widget,
};

use crate::color::{batch_color, text_color_on};
use crate::flow::flow_edges;
use crate::grid::{Cell, Grid};
use crate::themes::DiagramStyle;
use crate::timeline::{occupancy, peak};

/// The schedule diagram: grid slots, batch flow arrows and the per-GPU
/// memory occupancy overlay, painted directly.
#[must_use = "You should put this widget in a ui with `ui.add(widget);`"]
pub struct ScheduleDiagram<'a> {
    grid: &'a Grid,
    cell_size: Vec2,
    gap: f32,
    show_occupancy: bool,
    style: Option<DiagramStyle>,
}

impl<'a> ScheduleDiagram<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self {
            grid,
            cell_size: vec2(48.0, 32.0),
            gap: 6.0,
            show_occupancy: true,
            style: None,
        }
    }

    pub fn cell_size(mut self, cell_size: Vec2) -> Self {
        self.cell_size = cell_size.max(vec2(16.0, 12.0));
        self
    }

    pub fn gap(mut self, gap: f32) -> Self {
        self.gap = gap.max(0.0);
        self
    }

    pub fn show_occupancy(mut self, show: bool) -> Self {
        self.show_occupancy = show;
        self
    }
}

impl Widget for ScheduleDiagram<'_> {
    fn ui(self, ui: &mut Ui) -> Response {
        let Self {
            grid,
            cell_size,
            gap,
            show_occupancy,
            style,
        } = self;

        let gstyle = style.unwrap_or_else(|| DiagramStyle::from(ui.style().as_ref()));

        let rows = grid.num_gpus();
        let cols = grid.num_timesteps();

        let font_id = TextStyle::Small.resolve(ui.style());
        let text_height = ui.fonts_mut(|fonts| fonts.row_height(&font_id));
        let label_w = 56.0;
        let header_h = text_height + 6.0;

        let pitch = cell_size + vec2(gap, gap);
        let desired_size = vec2(
            label_w + cols as f32 * pitch.x,
            header_h + rows as f32 * pitch.y,
        );
        let (outer_rect, response) = ui.allocate_exact_size(desired_size, Sense::hover());
        if !ui.is_rect_visible(outer_rect) {
            return response;
        }

        let painter = ui.painter().with_clip_rect(outer_rect);
        let origin = pos2(outer_rect.left() + label_w, outer_rect.top() + header_h);

        let slot_rect = |gpu: usize, time: usize| {
            Rect::from_min_size(
                pos2(
                    origin.x + time as f32 * pitch.x,
                    origin.y + gpu as f32 * pitch.y,
                ),
                cell_size,
            )
        };

        // Axis labels. Timestep labels are thinned out on wide grids.
        let label_step = cols.div_ceil(16).max(1);
        for time in (0..cols).step_by(label_step) {
            painter.text(
                pos2(slot_rect(0, time).center().x, outer_rect.top()),
                Align2::CENTER_TOP,
                format!("t{time}"),
                font_id.clone(),
                gstyle.ink,
            );
        }
        for gpu in 0..rows {
            painter.text(
                pos2(outer_rect.left() + label_w - 8.0, slot_rect(gpu, 0).center().y),
                Align2::RIGHT_CENTER,
                format!("GPU {gpu}"),
                font_id.clone(),
                gstyle.ink,
            );
        }

        let table = occupancy(grid);
        let peak_count = peak(&table).max(1) as f32;

        // Bubble slots first so the lattice is visible under everything.
        for gpu in 0..rows {
            for time in 0..cols {
                if grid.cell(gpu, time).is_empty() {
                    let rect = slot_rect(gpu, time);
                    painter.rect_filled(rect, 2.0, gstyle.bubble);
                    painter.rect_stroke(
                        rect,
                        2.0,
                        Stroke::new(1.0, gstyle.grid),
                        egui::StrokeKind::Inside,
                    );
                }
            }
        }

        // Occupancy: translucent bars behind the cells, plus a step line on
        // top so the level stays readable where cells cover the bars.
        if show_occupancy {
            let bar_fill = gstyle.occupancy.gamma_multiply(0.2);
            for (gpu, row) in table.iter().enumerate() {
                for (time, &count) in row.iter().enumerate() {
                    if count == 0 {
                        continue;
                    }
                    let slot = slot_rect(gpu, time);
                    let h = (count as f32 / peak_count) * cell_size.y;
                    let bar = Rect::from_min_max(
                        pos2(slot.left() - gap * 0.5, slot.bottom() - h),
                        pos2(slot.right() + gap * 0.5, slot.bottom()),
                    );
                    painter.rect_filled(bar, 0.0, bar_fill);
                }
            }
        }

        // Populated cells.
        for (gpu, time, cell) in grid.iter() {
            let Cell::Filled { batch, pass } = cell else {
                continue;
            };
            let rect = slot_rect(gpu, time);
            let fill = batch_color(batch, pass).color32();
            painter.rect_filled(rect, 2.0, fill);
            painter.rect_stroke(
                rect,
                2.0,
                Stroke::new(1.0, gstyle.outline),
                egui::StrokeKind::Inside,
            );
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                batch.to_string(),
                font_id.clone(),
                text_color_on(fill),
            );
        }

        // Occupancy step line over the cells.
        if show_occupancy {
            let line = Stroke::new(1.5, gstyle.occupancy);
            for (gpu, row) in table.iter().enumerate() {
                if row.iter().all(|&count| count == 0) {
                    continue;
                }
                let mut previous: Option<egui::Pos2> = None;
                for (time, &count) in row.iter().enumerate() {
                    let slot = slot_rect(gpu, time);
                    let y = slot.bottom() - (count as f32 / peak_count) * cell_size.y;
                    let left = pos2(slot.left() - gap * 0.5, y);
                    let right = pos2(slot.right() + gap * 0.5, y);
                    if let Some(previous) = previous {
                        painter.line_segment([previous, left], line);
                    }
                    painter.line_segment([left, right], line);
                    previous = Some(right);
                }
            }
        }

        // Flow arrows between consecutive same-batch cells.
        for edge in flow_edges(grid) {
            let from = slot_rect(edge.from_gpu, edge.from_time).center();
            let to = slot_rect(edge.to_gpu, edge.to_time).center();

            let delta = to - from;
            let len = delta.length().max(1.0);
            let dir = delta / len;
            let inset = cell_size.min_elem() * 0.5 + 2.0;
            let start = from + dir * inset;
            let end = to - dir * inset;

            let color = batch_color(edge.batch, edge.pass).color32();
            painter.line_segment([start, end], Stroke::new(2.0, color));

            let perp = vec2(-dir.y, dir.x);
            let base = end - dir * 7.0;
            painter.add(Shape::convex_polygon(
                vec![end, base + perp * 3.5, base - perp * 3.5],
                color,
                Stroke::NONE,
            ));
        }

        // Hover details per slot.
        for gpu in 0..rows {
            for time in 0..cols {
                let rect = slot_rect(gpu, time);
                let id = response.id.with(("slot", gpu, time));
                let resp = ui.interact(rect, id, Sense::hover());
                if !resp.hovered() {
                    continue;
                }
                let resident = table[gpu][time];
                let text = match grid.cell(gpu, time) {
                    Cell::Filled { batch, pass } => format!(
                        "GPU {gpu}, t{time}: batch {batch} {}\nresident batches: {resident}",
                        pass.label()
                    ),
                    Cell::Empty => {
                        format!("GPU {gpu}, t{time}: bubble\nresident batches: {resident}")
                    }
                };
                let _ = resp.on_hover_text(text);
            }
        }

        response
    }
}

impl crate::themes::Styled for ScheduleDiagram<'_> {
    type Style = DiagramStyle;

    fn set_style(&mut self, style: Option<Self::Style>) {
        self.style = style;
    }
}
