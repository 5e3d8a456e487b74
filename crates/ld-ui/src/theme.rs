use egui::{Color32, Context, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};
use ld_core::settings::ThemeSettings;
use std::collections::BTreeMap;

/// Apply the application theme
pub fn apply_theme(ctx: &Context, theme: &ThemeSettings) {
    let mut style = Style::default();
    let mut visuals = if theme.dark_mode {
        dark_visuals()
    } else {
        Visuals::light()
    };

    visuals.selection.bg_fill = accent_color().linear_multiply(0.3);
    visuals.selection.stroke = Stroke::new(1.0, accent_color());
    visuals.hyperlink_color = accent_color();
    visuals.window_shadow.extrusion = 8.0;
    visuals.popup_shadow.extrusion = 4.0;

    style.spacing.item_spacing = egui::vec2(8.0, 4.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    style.spacing.menu_margin = egui::Margin::same(8.0);
    style.spacing.indent = 20.0;

    let mut font_sizes = BTreeMap::new();
    font_sizes.insert(TextStyle::Small, FontId::new(11.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Body, FontId::new(13.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Button, FontId::new(13.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Heading, FontId::new(18.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Monospace, FontId::new(12.0, FontFamily::Monospace));
    style.text_styles = font_sizes;

    style.visuals = visuals;
    ctx.set_style(style);

    // 1.0 keeps the native scale
    if (theme.scale_factor - 1.0).abs() > f32::EPSILON {
        ctx.set_pixels_per_point(theme.scale_factor.max(0.5));
    }
}

fn dark_visuals() -> Visuals {
    let mut visuals = Visuals::dark();

    let bg_color = Color32::from_rgb(23, 23, 23);
    let panel_bg = Color32::from_rgb(31, 31, 31);
    let widget_bg = Color32::from_rgb(40, 40, 40);
    let hover_color = Color32::from_rgb(50, 50, 50);
    let active_color = Color32::from_rgb(60, 60, 60);
    let text_color = Color32::from_rgb(220, 220, 220);

    visuals.window_fill = panel_bg;
    visuals.panel_fill = panel_bg;
    visuals.extreme_bg_color = bg_color;
    visuals.faint_bg_color = widget_bg;
    visuals.code_bg_color = Color32::from_rgb(35, 35, 35);

    let widgets = &mut visuals.widgets;
    for (state, fill, border) in [
        (&mut widgets.noninteractive, widget_bg, Color32::from_rgb(60, 60, 60)),
        (&mut widgets.inactive, widget_bg, Color32::from_rgb(70, 70, 70)),
        (&mut widgets.hovered, hover_color, Color32::from_rgb(80, 80, 80)),
        (&mut widgets.active, active_color, accent_color()),
    ] {
        state.bg_fill = fill;
        state.bg_stroke = Stroke::new(1.0, border);
        state.fg_stroke = Stroke::new(1.0, text_color);
        state.rounding = Rounding::same(4.0);
    }

    visuals
}

pub fn accent_color() -> Color32 {
    Color32::from_rgb(100, 150, 250)
}

pub fn error_color() -> Color32 {
    Color32::from_rgb(230, 80, 80)
}

pub fn warning_color() -> Color32 {
    Color32::from_rgb(230, 180, 80)
}

pub fn success_color() -> Color32 {
    Color32::from_rgb(80, 200, 120)
}

/// Bordered, tinted frame for inline notices
pub fn notice_frame(color: Color32) -> egui::Frame {
    egui::Frame::none()
        .fill(color.linear_multiply(0.15))
        .stroke(Stroke::new(1.0, color))
        .rounding(4.0)
        .inner_margin(8.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ld_core::AppSettings;

    #[test]
    fn dark_and_light_modes() {
        let ctx = Context::default();
        let mut settings = AppSettings::default();

        apply_theme(&ctx, &settings.theme);
        assert!(ctx.style().visuals.dark_mode);
        assert_eq!(ctx.style().visuals.panel_fill, Color32::from_rgb(31, 31, 31));

        settings.theme.dark_mode = false;
        apply_theme(&ctx, &settings.theme);
        assert!(!ctx.style().visuals.dark_mode);
        assert_eq!(ctx.style().visuals.selection.stroke.color, accent_color());
    }
}
