//! Application state and the editor UI.
//!
//! State is immutable: every user interaction becomes an [`Action`] fed
//! through the pure [`reduce`] function, which returns a replacement
//! [`AppState`]. The eframe `App` impl is just rendering plus dispatch.

use std::path::Path;

use eframe::egui;
use egui_extras::{Column, TableBuilder};

use crate::color::batch_color;
use crate::grid::{parse_batch, Cell, Grid, Pass, MAX_GPUS, MAX_TIMESTEPS};
use crate::svg;
use crate::widgets::ScheduleDiagram;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppState {
    pub grid: Grid,
    pub num_gpus: usize,
    pub num_timesteps: usize,
    /// Pass direction stamped onto subsequently edited cells.
    pub pass: Pass,
}

impl AppState {
    pub fn new() -> Self {
        let (num_gpus, num_timesteps) = (4, 12);
        Self {
            grid: Grid::pipeline_demo(num_gpus, num_timesteps),
            num_gpus,
            num_timesteps,
            pass: Pass::Forward,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    SetGpus(usize),
    SetTimesteps(usize),
    SetPass(Pass),
    EditCell {
        gpu: usize,
        time: usize,
        text: String,
    },
    Clear,
    LoadDemo,
}

/// Pure state transition. Dimension changes clamp to the grid bounds and
/// rebuild the grid preserving the overlap; cell edits coerce unparsable
/// text to an empty cell rather than erroring.
pub fn reduce(state: &AppState, action: Action) -> AppState {
    let mut next = state.clone();
    match action {
        Action::SetGpus(count) => {
            next.num_gpus = count.clamp(1, MAX_GPUS);
            next.grid = state.grid.resized(next.num_gpus, next.num_timesteps);
        }
        Action::SetTimesteps(count) => {
            next.num_timesteps = count.clamp(1, MAX_TIMESTEPS);
            next.grid = state.grid.resized(next.num_gpus, next.num_timesteps);
        }
        Action::SetPass(pass) => {
            next.pass = pass;
        }
        Action::EditCell { gpu, time, text } => {
            if gpu < next.num_gpus && time < next.num_timesteps {
                let cell = match parse_batch(&text) {
                    Some(batch) => Cell::filled(batch, state.pass),
                    None => Cell::Empty,
                };
                next.grid = state.grid.with_cell(gpu, time, cell);
            }
        }
        Action::Clear => {
            next.grid = Grid::empty(next.num_gpus, next.num_timesteps);
        }
        Action::LoadDemo => {
            next.grid = Grid::pipeline_demo(next.num_gpus, next.num_timesteps);
        }
    }
    next
}

pub struct ScheduleApp {
    state: AppState,
    /// Per-cell text buffers for the editor table. Kept separate from the
    /// grid so half-typed input isn't snapped back mid-edit.
    drafts: Vec<Vec<String>>,
}

impl Default for ScheduleApp {
    fn default() -> Self {
        let state = AppState::new();
        let drafts = drafts_for(&state.grid);
        Self { state, drafts }
    }
}

fn drafts_for(grid: &Grid) -> Vec<Vec<String>> {
    grid.rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Cell::Filled { batch, .. } => batch.to_string(),
                    Cell::Empty => String::new(),
                })
                .collect()
        })
        .collect()
}

impl ScheduleApp {
    fn dispatch(&mut self, action: Action) {
        // Cell edits keep the user's text buffer; structural actions
        // rebuild the drafts from the new grid.
        let rebuild = !matches!(action, Action::EditCell { .. });
        self.state = reduce(&self.state, action);
        if rebuild {
            self.drafts = drafts_for(&self.state.grid);
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        let mut pending = Vec::new();

        ui.horizontal_wrapped(|ui| {
            ui.label("GPUs");
            let mut num_gpus = self.state.num_gpus;
            if ui
                .add(egui::DragValue::new(&mut num_gpus).range(1..=MAX_GPUS))
                .changed()
            {
                pending.push(Action::SetGpus(num_gpus));
            }

            ui.label("Timesteps");
            let mut num_timesteps = self.state.num_timesteps;
            if ui
                .add(egui::DragValue::new(&mut num_timesteps).range(1..=MAX_TIMESTEPS))
                .changed()
            {
                pending.push(Action::SetTimesteps(num_timesteps));
            }

            ui.separator();

            ui.label("Pass");
            let mut pass = self.state.pass;
            ui.selectable_value(&mut pass, Pass::Forward, "forward");
            ui.selectable_value(&mut pass, Pass::Backward, "backward");
            if pass != self.state.pass {
                pending.push(Action::SetPass(pass));
            }

            ui.separator();

            if ui.button("Demo schedule").clicked() {
                pending.push(Action::LoadDemo);
            }
            if ui.button("Clear").clicked() {
                pending.push(Action::Clear);
            }
            if ui.button("Export SVG").clicked() {
                self.export();
            }

            ui.separator();
            ui.label(format!("{} bubbles", self.state.grid.count_empty()));
        });

        for action in pending {
            self.dispatch(action);
        }
    }

    /// Write the diagram next to the process working directory. Failure is
    /// logged and otherwise ignored.
    fn export(&self) {
        match svg::export(&self.state.grid, Path::new(svg::EXPORT_FILE_NAME)) {
            Ok(()) => log::info!("wrote {}", svg::EXPORT_FILE_NAME),
            Err(err) => log::warn!("svg export failed: {err}"),
        }
    }

    fn editor(&mut self, ui: &mut egui::Ui) {
        let mut pending = Vec::new();

        let state = &self.state;
        let drafts = &mut self.drafts;
        let cols = state.num_timesteps;

        TableBuilder::new(ui)
            .id_salt("schedule_editor")
            .column(Column::exact(56.0))
            .columns(Column::exact(44.0), cols)
            .striped(true)
            .header(22.0, |mut header| {
                header.col(|_ui| {});
                for time in 0..cols {
                    header.col(|ui| {
                        ui.label(egui::RichText::new(format!("t{time}")).small());
                    });
                }
            })
            .body(|body| {
                body.rows(26.0, state.num_gpus, |mut row| {
                    let gpu = row.index();
                    row.col(|ui| {
                        ui.label(egui::RichText::new(format!("GPU {gpu}")).small());
                    });
                    for time in 0..cols {
                        row.col(|ui| {
                            let draft = &mut drafts[gpu][time];
                            let fill = match state.grid.cell(gpu, time) {
                                Cell::Filled { batch, pass } => Some(
                                    batch_color(batch, pass).color32().gamma_multiply(0.35),
                                ),
                                Cell::Empty => None,
                            };
                            let response = ui
                                .scope(|ui| {
                                    if let Some(fill) = fill {
                                        let visuals = ui.visuals_mut();
                                        visuals.text_edit_bg_color = Some(fill);
                                        visuals.extreme_bg_color = fill;
                                    }
                                    ui.add(
                                        egui::TextEdit::singleline(draft)
                                            .desired_width(36.0)
                                            .horizontal_align(egui::Align::Center),
                                    )
                                })
                                .inner;
                            if response.changed() {
                                pending.push(Action::EditCell {
                                    gpu,
                                    time,
                                    text: draft.clone(),
                                });
                            }
                            if response.lost_focus() {
                                *draft = parse_batch(draft)
                                    .map(|batch| batch.to_string())
                                    .unwrap_or_default();
                            }
                        });
                    }
                });
            });

        for action in pending {
            self.dispatch(action);
        }
    }
}

impl eframe::App for ScheduleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            self.controls(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().auto_shrink(false).show(ui, |ui| {
                self.editor(ui);
                ui.separator();
                ui.add(ScheduleDiagram::new(&self.state.grid));
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(state: &AppState, gpu: usize, time: usize, text: &str) -> AppState {
        reduce(
            state,
            Action::EditCell {
                gpu,
                time,
                text: text.to_owned(),
            },
        )
    }

    #[test]
    fn dimension_actions_clamp_to_bounds() {
        let state = AppState::new();
        assert_eq!(reduce(&state, Action::SetGpus(0)).num_gpus, 1);
        assert_eq!(reduce(&state, Action::SetGpus(999)).num_gpus, MAX_GPUS);
        assert_eq!(reduce(&state, Action::SetTimesteps(0)).num_timesteps, 1);
        assert_eq!(
            reduce(&state, Action::SetTimesteps(999)).num_timesteps,
            MAX_TIMESTEPS
        );
    }

    #[test]
    fn resizing_preserves_the_overlap() {
        let state = edit(&reduce(&AppState::new(), Action::Clear), 2, 3, "8");
        let grown = reduce(&state, Action::SetTimesteps(40));
        assert_eq!(grown.grid.cell(2, 3), Cell::filled(8, Pass::Forward));
        assert_eq!(grown.grid.num_timesteps(), 40);

        let shrunk = reduce(&state, Action::SetGpus(2));
        assert_eq!(shrunk.grid.num_gpus(), 2);
    }

    #[test]
    fn cell_edits_stamp_the_current_pass() {
        let state = reduce(&AppState::new(), Action::Clear);
        assert_eq!(
            edit(&state, 0, 0, "5").grid.cell(0, 0),
            Cell::filled(5, Pass::Forward)
        );

        let backward = reduce(&state, Action::SetPass(Pass::Backward));
        assert_eq!(
            edit(&backward, 0, 0, "5").grid.cell(0, 0),
            Cell::filled(5, Pass::Backward)
        );
    }

    #[test]
    fn garbage_input_empties_the_cell() {
        let state = edit(&reduce(&AppState::new(), Action::Clear), 1, 1, "4");
        let cleared = edit(&state, 1, 1, "four");
        assert_eq!(cleared.grid.cell(1, 1), Cell::Empty);
    }

    #[test]
    fn out_of_range_edits_are_ignored() {
        let state = AppState::new();
        let unchanged = edit(&state, state.num_gpus, 0, "1");
        assert_eq!(unchanged.grid, state.grid);
    }

    #[test]
    fn clear_and_demo_rebuild_at_the_current_dimensions() {
        let state = reduce(&AppState::new(), Action::SetGpus(6));
        let cleared = reduce(&state, Action::Clear);
        assert_eq!(cleared.grid.count_empty(), 6 * cleared.num_timesteps);

        let demo = reduce(&cleared, Action::LoadDemo);
        assert_eq!(demo.grid, Grid::pipeline_demo(6, demo.num_timesteps));
    }

    #[test]
    fn grid_dimensions_always_agree_with_the_state() {
        let actions = [
            Action::SetGpus(10),
            Action::SetTimesteps(3),
            Action::LoadDemo,
            Action::SetGpus(2),
            Action::EditCell {
                gpu: 1,
                time: 2,
                text: "7".to_owned(),
            },
            Action::SetTimesteps(80),
            Action::Clear,
        ];
        let mut state = AppState::new();
        for action in actions {
            state = reduce(&state, action);
            assert_eq!(state.grid.num_gpus(), state.num_gpus);
            assert_eq!(state.grid.num_timesteps(), state.num_timesteps);
        }
    }

    #[test]
    fn reduce_leaves_the_input_state_untouched() {
        let state = AppState::new();
        let before = state.clone();
        let _ = reduce(&state, Action::Clear);
        assert_eq!(state, before);
    }
}
