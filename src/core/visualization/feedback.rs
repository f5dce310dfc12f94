use std::sync::{Arc, Mutex, OnceLock};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, Receiver, Sender, TrySendError};
use log::{debug, info};

use crate::core::analyzer::AnalyzerTap;
use crate::core::audio::lock;
use crate::core::visualization::{IndicatorFrame, LevelMeter, VisualState};
use crate::error::WheelError;

/// Single-slot channel carrying the most recent indicator frame.
///
/// The meter never queues more than one frame for a display that is not drawing.
pub fn indicator_channel() -> (Sender<IndicatorFrame>, Receiver<IndicatorFrame>) {
    bounded(1)
}

/// Periodic task sampling the analyser once per display frame
pub struct FeedbackLoop {
    meter: LevelMeter,
    visual: Arc<Mutex<VisualState>>,
    analyzer: Arc<OnceLock<AnalyzerTap>>,
    frames: Sender<IndicatorFrame>,
    interval: Duration,
}

impl FeedbackLoop {
    pub fn new(
        meter: LevelMeter,
        visual: Arc<Mutex<VisualState>>,
        analyzer: Arc<OnceLock<AnalyzerTap>>,
        frames: Sender<IndicatorFrame>,
        interval: Duration,
    ) -> Self {
        Self {
            meter,
            visual,
            analyzer,
            frames,
            interval,
        }
    }

    /// One frame. Returns `None` while the analyser does not exist yet.
    pub fn tick(&self) -> Option<IndicatorFrame> {
        let analyzer = self.analyzer.get()?;
        let buffer = analyzer.snapshot();
        let mut visual = lock(&self.visual);
        Some(self.meter.step(&mut visual, &buffer))
    }

    /// Run on a dedicated thread until stopped or the frame receiver is dropped.
    pub fn spawn(self) -> Result<FeedbackHandle, WheelError> {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let ticker = tick(self.interval);

        let thread = thread::Builder::new()
            .name("level-meter".to_string())
            .spawn(move || {
                debug!("level meter running every {:?}", self.interval);
                loop {
                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(ticker) -> _ => {
                            if let Some(frame) = self.tick() {
                                match self.frames.try_send(frame) {
                                    // The display has not taken the last frame yet
                                    Ok(()) | Err(TrySendError::Full(_)) => {}
                                    Err(TrySendError::Disconnected(_)) => break,
                                }
                            }
                        }
                    }
                }
                debug!("level meter stopped");
            })
            .map_err(|e| WheelError::FeedbackLoop(e.to_string()))?;

        info!("Level meter started");
        Ok(FeedbackHandle {
            stop: Some(stop_tx),
            thread: Some(thread),
        })
    }
}

/// Stops the level-meter thread when asked or when dropped
pub struct FeedbackHandle {
    stop: Option<Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl FeedbackHandle {
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the sender also wakes the select.
        if let Some(stop) = self.stop.take() {
            let _ = stop.try_send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for FeedbackHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analyzer::Analyzer;
    use crate::core::visualization::MeterConfig;

    fn feedback(slot: Arc<OnceLock<AnalyzerTap>>, frames: Sender<IndicatorFrame>) -> FeedbackLoop {
        FeedbackLoop::new(
            LevelMeter::new(&MeterConfig::default()),
            Arc::new(Mutex::new(VisualState::default())),
            slot,
            frames,
            Duration::from_millis(2),
        )
    }

    fn ready_slot() -> Arc<OnceLock<AnalyzerTap>> {
        let slot = Arc::new(OnceLock::new());
        let _ = slot.set(AnalyzerTap::new(Analyzer::new(256)));
        slot
    }

    #[test]
    fn test_tick_skips_without_analyzer() {
        let (tx, _rx) = indicator_channel();
        let feedback = feedback(Arc::new(OnceLock::new()), tx);
        assert_eq!(feedback.tick(), None);
    }

    #[test]
    fn test_tick_reads_analyzer() {
        let slot = Arc::new(OnceLock::new());
        let tap = AnalyzerTap::new(Analyzer::new(256));
        tap.push_samples(&[0.5; 256]);
        let _ = slot.set(tap);

        let (tx, _rx) = indicator_channel();
        let feedback = feedback(slot, tx);
        // 0.5 reads as byte 192, 64 above center; smoothed to 6.4
        match feedback.tick() {
            Some(IndicatorFrame::Pulse { size, .. }) => assert!((size - 69.2).abs() < 1e-3),
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn test_spawned_loop_pushes_frames_until_stopped() {
        let (tx, rx) = indicator_channel();

        let handle = feedback(ready_slot(), tx).spawn().unwrap();
        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first, IndicatorFrame::Idle);
        assert!(handle.is_running());

        handle.stop();
        // At most the one frame in flight, then the channel disconnects.
        while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_undrained_display_holds_one_frame() {
        let (tx, rx) = indicator_channel();
        let handle = feedback(ready_slot(), tx).spawn().unwrap();

        // About fifty ticks with nobody reading
        thread::sleep(Duration::from_millis(100));
        assert!(handle.is_running());
        assert!(rx.len() <= 1, "queued frames: {}", rx.len());
        assert_eq!(rx.capacity(), Some(1));

        // The meter keeps publishing fresh frames once the display reads again
        rx.recv_timeout(Duration::from_secs(2)).unwrap();
        rx.recv_timeout(Duration::from_secs(2)).unwrap();
        handle.stop();
    }

    #[test]
    fn test_loop_ends_when_display_goes_away() {
        let (tx, rx) = indicator_channel();
        let handle = feedback(ready_slot(), tx).spawn().unwrap();
        drop(rx);

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while handle.is_running() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!handle.is_running());
    }
}
