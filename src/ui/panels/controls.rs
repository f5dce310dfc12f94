use crossbeam_channel::Sender;
use egui::Ui;

use crate::core::layout::RotateDirection;
use crate::core::session::Readiness;
use crate::core::synth::ToneType;
use crate::messaging::WheelMessage;

/// Tone selector and rotation buttons
pub struct ControlsPanel {
    sender: Sender<WheelMessage>,
}

impl ControlsPanel {
    pub fn new(sender: Sender<WheelMessage>) -> Self {
        Self { sender }
    }

    pub fn show(&self, ui: &mut Ui, tone: &mut ToneType, protected: bool) {
        ui.horizontal(|ui| {
            ui.label("Tone:");
            egui::ComboBox::new("tone_selector", "")
                .selected_text(tone.label())
                .show_ui(ui, |ui| {
                    for option in ToneType::ALL {
                        ui.selectable_value(tone, option, option.label());
                    }
                });

            ui.separator();
            if ui.button("⟲").on_hover_text("Rotate left").clicked() {
                self.sender.send(WheelMessage::Rotate(RotateDirection::Left)).ok();
            }
            if ui.button("⟳").on_hover_text("Rotate right").clicked() {
                self.sender.send(WheelMessage::Rotate(RotateDirection::Right)).ok();
            }

            if !protected {
                ui.separator();
                ui.colored_label(egui::Color32::YELLOW, "limiter off");
            }
        });
    }
}

/// Covers the wheel until the user starts audio; shows activation failures.
pub struct StartOverlay {
    sender: Sender<WheelMessage>,
}

impl StartOverlay {
    pub fn new(sender: Sender<WheelMessage>) -> Self {
        Self { sender }
    }

    /// Returns true while the overlay should stay up.
    pub fn show(&self, ctx: &egui::Context, readiness: &Readiness) -> bool {
        if *readiness == Readiness::Ready {
            return false;
        }

        egui::Window::new("Chroma Wheel")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    if let Readiness::Failed(reason) = readiness {
                        ui.colored_label(egui::Color32::LIGHT_RED, format!("Audio unavailable: {}", reason));
                        ui.add_space(6.0);
                    }
                    let label = match readiness {
                        Readiness::Failed(_) => "Retry",
                        _ => "Start",
                    };
                    if ui.button(label).clicked() {
                        self.sender.send(WheelMessage::Activate).ok();
                    }
                });
            });
        true
    }
}
