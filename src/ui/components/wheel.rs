use egui::{Align2, Color32, Pos2, Sense, Stroke, Ui, Vec2};

use crate::core::layout::RingLayout;
use crate::core::pitch::{PitchClass, Rgb};
use crate::core::synth::plain_frequency;
use crate::core::visualization::IndicatorFrame;
use crate::utils::helpers::format_frequency;

const GLOW_RINGS: usize = 6;

pub fn to_color32(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.r, rgb.g, rgb.b)
}

/// The ring of pads with the level indicator in the middle
pub struct WheelView<'a> {
    layout: &'a RingLayout,
    indicator: IndicatorFrame,
    enabled: bool,
}

impl<'a> WheelView<'a> {
    pub fn new(layout: &'a RingLayout, indicator: IndicatorFrame) -> Self {
        Self {
            layout,
            indicator,
            enabled: true,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Paint the wheel; returns the pad clicked this frame, if any.
    pub fn show(self, ui: &mut Ui) -> Option<PitchClass> {
        let geometry = self.layout.geometry;
        let box_size = Vec2::new(geometry.center_x as f32 * 2.0, geometry.center_y as f32 * 2.0);
        let available = ui.available_size();
        let scale = (available.x / box_size.x).min(available.y / box_size.y).clamp(0.5, 3.0);

        let (rect, _) = ui.allocate_exact_size(box_size * scale, Sense::hover());
        if !ui.is_rect_visible(rect) {
            return None;
        }
        let to_screen = |x: f64, y: f64| rect.min + Vec2::new(x as f32, y as f32) * scale;
        let painter = ui.painter_at(rect);

        painter.circle_stroke(
            to_screen(geometry.center_x, geometry.center_y),
            geometry.radius as f32 * scale,
            Stroke::new(1.0, Color32::from_gray(70)),
        );

        self.paint_indicator(&painter, to_screen(geometry.center_x, geometry.center_y), scale);

        let pad_radius = geometry.pad_radius as f32 * scale;
        let mut clicked = None;
        for pad in self.layout.pads() {
            let center = to_screen(pad.x, pad.y);
            let pad_rect = egui::Rect::from_center_size(center, Vec2::splat(pad_radius * 2.0));
            let id = ui.id().with(("pad", pad.pitch.index()));
            let response = ui
                .interact(pad_rect, id, Sense::click())
                .on_hover_text(format_frequency(plain_frequency(pad.pitch)));

            let fill = to_color32(pad.pitch.color());
            let stroke = if response.hovered() {
                Stroke::new(3.0, Color32::WHITE)
            } else {
                Stroke::new(1.0, Color32::from_gray(40))
            };
            painter.circle(center, pad_radius, fill, stroke);
            painter.text(
                center,
                Align2::CENTER_CENTER,
                pad.pitch.name(),
                egui::TextStyle::Button.resolve(ui.style()),
                label_color(pad.pitch.color()),
            );

            if self.enabled && response.clicked() {
                clicked = Some(pad.pitch);
            }
        }

        clicked
    }

    fn paint_indicator(&self, painter: &egui::Painter, center: Pos2, scale: f32) {
        let color = to_color32(self.indicator.color());
        let radius = self.indicator.size() / 2.0 * scale;
        let glow = self.indicator.glow_radius() * scale;

        if glow > 0.0 {
            for ring in (1..=GLOW_RINGS).rev() {
                let t = ring as f32 / GLOW_RINGS as f32;
                let alpha = ((1.0 - t) * 90.0) as u8;
                painter.circle_filled(
                    center,
                    radius + glow * t,
                    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha),
                );
            }
        }
        painter.circle_filled(center, radius, color);
    }
}

/// Dark text on light pads, white on dark ones.
fn label_color(rgb: Rgb) -> Color32 {
    let luma = 0.299 * rgb.r as f32 + 0.587 * rgb.g as f32 + 0.114 * rgb.b as f32;
    if luma > 140.0 {
        Color32::from_gray(20)
    } else {
        Color32::WHITE
    }
}
