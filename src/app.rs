use crossbeam_channel::{unbounded, Receiver, Sender};
use eframe::egui;
use log::info;

use crate::config::WheelConfig;
use crate::core::audio::CpalBackend;
use crate::core::layout::{RingLayout, RotateDirection};
use crate::core::pitch::{PitchClass, Rgb};
use crate::core::session::{Readiness, WheelSession};
use crate::core::synth::ToneType;
use crate::core::visualization::IndicatorFrame;
use crate::messaging::{DisplayEvent, MessageBus, WheelMessage};
use crate::ui::components::{to_color32, WheelView};
use crate::ui::panels::{ControlsPanel, StartOverlay};

/// Messages handled per frame
const MAX_MESSAGES_PER_FRAME: usize = 64;

/// Computer-keyboard row mapped onto C..B
const PAD_KEYS: [egui::Key; 12] = [
    egui::Key::A,
    egui::Key::W,
    egui::Key::S,
    egui::Key::E,
    egui::Key::D,
    egui::Key::F,
    egui::Key::T,
    egui::Key::G,
    egui::Key::Y,
    egui::Key::H,
    egui::Key::U,
    egui::Key::J,
];

pub fn pitch_for_key(key: egui::Key) -> Option<PitchClass> {
    PAD_KEYS
        .iter()
        .position(|&k| k == key)
        .and_then(|i| PitchClass::new(i as u8))
}

// Main app state
pub struct WheelApp {
    session: WheelSession<CpalBackend>,
    message_bus: MessageBus,
    display_rx: Receiver<DisplayEvent>,
    indicator_rx: Receiver<IndicatorFrame>,
    layout: RingLayout,
    tone: ToneType,
    indicator: IndicatorFrame,
    active_color: Rgb,
    readiness: Readiness,
    protected: bool,
    controls: ControlsPanel,
    overlay: StartOverlay,
}

impl WheelApp {
    pub fn new(config: WheelConfig) -> Self {
        let (display_tx, display_rx): (Sender<DisplayEvent>, _) = unbounded();
        let message_bus = MessageBus::new();
        let session = WheelSession::new(CpalBackend::new(), &config, display_tx);
        info!(
            "Wheel ready for activation ({}, tone {})",
            if config.is_protected() { "limiter" } else { "unprotected" },
            config.synth.default_tone
        );

        Self {
            indicator_rx: session.indicator_frames(),
            controls: ControlsPanel::new(message_bus.sender()),
            overlay: StartOverlay::new(message_bus.sender()),
            session,
            message_bus,
            display_rx,
            layout: RingLayout::new(config.layout),
            tone: config.synth.default_tone,
            indicator: IndicatorFrame::Idle,
            active_color: Rgb::WHITE,
            readiness: Readiness::Pending,
            protected: config.is_protected(),
        }
    }

    fn drain_display_events(&mut self) {
        for event in self.display_rx.try_iter() {
            match event {
                DisplayEvent::ColorUpdate(color) => self.active_color = color,
                DisplayEvent::Readiness(readiness) => self.readiness = readiness,
            }
        }
        if let Some(frame) = self.indicator_rx.try_iter().last() {
            self.indicator = frame;
        }
    }

    fn handle_keyboard(&self, ctx: &egui::Context) {
        let sender = self.message_bus.sender();
        ctx.input(|i| {
            for event in &i.events {
                let egui::Event::Key {
                    key,
                    pressed: true,
                    repeat: false,
                    ..
                } = event
                else {
                    continue;
                };
                let msg = match key {
                    egui::Key::ArrowLeft => Some(WheelMessage::Rotate(RotateDirection::Left)),
                    egui::Key::ArrowRight => Some(WheelMessage::Rotate(RotateDirection::Right)),
                    other => pitch_for_key(*other).map(|p| WheelMessage::trigger(p, self.tone)),
                };
                if let Some(msg) = msg {
                    sender.send(msg).ok();
                }
            }
        });
    }
}

impl eframe::App for WheelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.message_bus
            .process_messages(&mut self.session, &mut self.layout, MAX_MESSAGES_PER_FRAME);
        self.drain_display_events();

        let overlay_up = self.overlay.show(ctx, &self.readiness);
        if !overlay_up {
            self.handle_keyboard(ctx);
        }

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Chroma Wheel");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.colored_label(to_color32(self.active_color), "●");
                });
            });
            self.controls.show(ui, &mut self.tone, self.protected);
        });

        let mut clicked = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                clicked = WheelView::new(&self.layout, self.indicator)
                    .enabled(!overlay_up)
                    .show(ui);
            });
        });
        if let Some(pitch) = clicked {
            self.message_bus.send(WheelMessage::trigger(pitch, self.tone)).ok();
        }

        // The indicator animates from the meter thread
        ctx.request_repaint();
    }
}
