//! gpuviz: an interactive editor and renderer for pipeline-parallel GPU
//! execution schedules.
//!
//! A schedule is a grid of GPUs by timesteps whose cells carry a batch id
//! and a pass direction. Everything else is derived from that grid on each
//! change: per-GPU memory occupancy ([`timeline`]), the batch flow graph
//! ([`flow`]), deterministic batch colors ([`color`]) and the exported SVG
//! document ([`svg`]).

pub mod app;
pub mod color;
pub mod flow;
pub mod grid;
pub mod svg;
pub mod themes;
pub mod timeline;
pub mod widgets;

pub use app::{reduce, Action, AppState, ScheduleApp};
pub use color::{batch_color, BatchColor};
pub use flow::{flow_edges, FlowEdge};
pub use grid::{parse_batch, Cell, Grid, Pass};
pub use timeline::occupancy;

use dark_light::Mode;
use eframe::egui;

/// Open the editor window and run until closed.
pub fn run() -> eframe::Result {
    let mut native_options = eframe::NativeOptions::default();
    native_options.persist_window = true;

    eframe::run_native(
        "GPU Pipeline Visualizer",
        native_options,
        Box::new(|cc| {
            let ctx = cc.egui_ctx.clone();
            ctrlc::set_handler(move || ctx.send_viewport_cmd(egui::ViewportCommand::Close))
                .expect("failed to set exit signal handler");

            cc.egui_ctx
                .set_style_of(egui::Theme::Light, themes::industrial_light());
            cc.egui_ctx
                .set_style_of(egui::Theme::Dark, themes::industrial_dark());
            let theme = match dark_light::detect() {
                Ok(Mode::Light) => egui::ThemePreference::Light,
                Ok(Mode::Dark) => egui::ThemePreference::Dark,
                Ok(Mode::Unspecified) | Err(_) => egui::ThemePreference::Light,
            };
            cc.egui_ctx.set_theme(theme);

            Ok(Box::new(ScheduleApp::default()))
        }),
    )
}
