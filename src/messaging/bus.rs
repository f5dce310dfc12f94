use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, warn};

use super::WheelMessage;
use crate::core::audio::AudioBackend;
use crate::core::layout::RingLayout;
use crate::core::session::WheelSession;

/// MessageBus carries input events from the UI to the session
pub struct MessageBus {
    pub(crate) sender: Sender<WheelMessage>,
    pub(crate) receiver: Receiver<WheelMessage>,
}

impl MessageBus {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();

        MessageBus { sender, receiver }
    }

    /// Get a sender that can be cloned and passed to UI components
    pub fn sender(&self) -> Sender<WheelMessage> {
        self.sender.clone()
    }

    /// Process pending messages, at most `max_messages` per call.
    ///
    /// Returns how many were handled.
    pub fn process_messages<B: AudioBackend>(
        &self,
        session: &mut WheelSession<B>,
        layout: &mut RingLayout,
        max_messages: usize,
    ) -> usize {
        let mut count = 0;

        while count < max_messages {
            let Ok(msg) = self.receiver.try_recv() else {
                break;
            };
            count += 1;

            self.handle_message(msg, session, layout);
        }

        count
    }

    fn handle_message<B: AudioBackend>(
        &self,
        msg: WheelMessage,
        session: &mut WheelSession<B>,
        layout: &mut RingLayout,
    ) {
        match msg {
            WheelMessage::Activate => {
                if let Err(e) = session.activate() {
                    warn!("Activation failed: {}", e);
                }
            }
            WheelMessage::Trigger { pitch, tone, color } => {
                if session.trigger_with_color(pitch, tone, color).is_none() {
                    debug!("trigger {} ({}) not honored", pitch, tone);
                }
            }
            WheelMessage::Rotate(direction) => layout.rotate(direction),
        }
    }

    pub fn send(&self, msg: WheelMessage) -> Result<(), crossbeam_channel::SendError<WheelMessage>> {
        self.sender.send(msg)
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
