//! Application theme: a flat, industrial look in light and dark variants,
//! plus semantic per-widget styles derived from the active `egui::Style`.

use egui::style::{Selection, WidgetVisuals, Widgets};
use egui::{Color32, Stroke, Style, Visuals};

// Base tokens. The batch palette itself lives in `crate::color`; these only
// cover chrome around the diagram.
const PAPER_LIGHT: Color32 = Color32::from_rgb(0xf1, 0xf0, 0xea);
const INK_LIGHT: Color32 = Color32::from_rgb(0x1c, 0x1c, 0x1c);
const PAPER_DARK: Color32 = Color32::from_rgb(0x26, 0x29, 0x2c);
const INK_DARK: Color32 = Color32::from_rgb(0xf2, 0xf2, 0xf0);
const ACCENT: Color32 = Color32::from_rgb(0xff, 0x5e, 0x00);
const OCCUPANCY: Color32 = Color32::from_rgb(0x1f, 0x6f, 0xeb);

/// Simple sRGB linear interpolation for quick palette derivation.
pub fn blend(a: Color32, b: Color32, t: f32) -> Color32 {
    let r = (a.r() as f32 * (1.0 - t) + b.r() as f32 * t).round() as u8;
    let g = (a.g() as f32 * (1.0 - t) + b.g() as f32 * t).round() as u8;
    let bch = (a.b() as f32 * (1.0 - t) + b.b() as f32 * t).round() as u8;
    Color32::from_rgb(r, g, bch)
}

/// Per-widget override API: widgets resolve their style from the theme
/// unless one is supplied explicitly.
pub trait Styled {
    type Style: Clone;
    fn set_style(&mut self, style: Option<Self::Style>);
}

/// Semantic style for the `ScheduleDiagram` widget.
#[derive(Clone, Debug)]
pub struct DiagramStyle {
    pub outline: Color32,
    pub grid: Color32,
    pub ink: Color32,
    pub bubble: Color32,
    pub occupancy: Color32,
    pub accent: Color32,
}

impl From<&Style> for DiagramStyle {
    fn from(style: &Style) -> Self {
        let visuals = &style.visuals;
        let (ink, paper) = if visuals.dark_mode {
            (INK_DARK, PAPER_DARK)
        } else {
            (INK_LIGHT, PAPER_LIGHT)
        };
        Self {
            outline: blend(ink, paper, 0.4),
            grid: blend(ink, paper, 0.82),
            ink,
            bubble: blend(ink, paper, 0.94),
            occupancy: OCCUPANCY,
            accent: visuals.selection.stroke.color,
        }
    }
}

fn industrial(foreground: Color32, background: Color32, mut base_visuals: Visuals) -> Visuals {
    let border = blend(foreground, background, 0.4);
    let control_fill = background;
    let control_fill_hover = blend(background, foreground, 0.05);
    let control_fill_active = blend(control_fill_hover, foreground, 0.12);

    base_visuals.window_fill = background;
    base_visuals.panel_fill = background;
    base_visuals.override_text_color = None;
    base_visuals.faint_bg_color = blend(background, foreground, 0.04);
    base_visuals.extreme_bg_color = control_fill_hover;
    base_visuals.selection = Selection {
        bg_fill: blend(background, foreground, 0.12),
        stroke: Stroke::new(1.5, ACCENT),
    };
    base_visuals.window_stroke = Stroke::new(1.0, border);
    base_visuals.menu_corner_radius = 0.0.into();

    let border_stroke = Stroke::new(1.0, border);
    let active_stroke = Stroke::new(1.4, ACCENT);
    let text_stroke = Stroke::new(1.0, foreground);

    base_visuals.widgets = Widgets {
        noninteractive: WidgetVisuals {
            bg_fill: background,
            weak_bg_fill: background,
            bg_stroke: border_stroke,
            fg_stroke: text_stroke,
            corner_radius: 0.0.into(),
            expansion: 0.0,
        },
        inactive: WidgetVisuals {
            bg_fill: control_fill,
            weak_bg_fill: control_fill,
            bg_stroke: border_stroke,
            fg_stroke: text_stroke,
            corner_radius: 2.0.into(),
            expansion: 0.0,
        },
        hovered: WidgetVisuals {
            bg_fill: control_fill_hover,
            weak_bg_fill: control_fill_hover,
            bg_stroke: Stroke::new(1.4, border),
            fg_stroke: text_stroke,
            corner_radius: 2.0.into(),
            expansion: 0.0,
        },
        active: WidgetVisuals {
            bg_fill: control_fill_active,
            weak_bg_fill: control_fill_active,
            bg_stroke: active_stroke,
            fg_stroke: text_stroke,
            corner_radius: 2.0.into(),
            expansion: 0.0,
        },
        open: WidgetVisuals {
            bg_fill: control_fill_hover,
            weak_bg_fill: control_fill_hover,
            bg_stroke: active_stroke,
            fg_stroke: text_stroke,
            corner_radius: 2.0.into(),
            expansion: 0.0,
        },
    };

    base_visuals.window_shadow = egui::epaint::Shadow::NONE;
    base_visuals
}

pub fn industrial_light() -> Style {
    let mut style = Style::default();
    style.visuals = industrial(INK_LIGHT, PAPER_LIGHT, Visuals::light());
    tune_spacing(&mut style);
    style
}

pub fn industrial_dark() -> Style {
    let mut style = Style::default();
    style.visuals = industrial(INK_DARK, PAPER_DARK, Visuals::dark());
    tune_spacing(&mut style);
    style
}

fn tune_spacing(style: &mut Style) {
    style.spacing.item_spacing = egui::vec2(10.0, 8.0);
    style.spacing.button_padding = egui::vec2(10.0, 6.0);
    style.spacing.interact_size = egui::vec2(32.0, 24.0);
    style.animation_time = 0.12;
}
