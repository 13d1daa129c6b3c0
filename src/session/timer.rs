//! The 1 Hz countdown tick.
//!
//! A background thread posts [`SessionEvent::Tick`] once per second onto the
//! controller's channel; the controller applies the decrement, so ticks and
//! user commands serialize through the same dispatch. The thread's lifetime
//! is tied to load/submit transitions only — answer edits never touch it, so
//! the countdown cannot stutter or restart mid-session.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crate::engine::results::SessionResults;

/// Events delivered asynchronously to the session controller.
pub enum SessionEvent {
    /// One second has elapsed.
    Tick,
    /// A background grading pass finished.
    Graded(SessionResults),
}

pub struct TimerDriver {
    stop: Arc<AtomicBool>,
}

impl TimerDriver {
    /// Spawn the ticking thread. It exits on [`TimerDriver::stop`], on drop,
    /// or when the receiving side of the channel goes away.
    pub fn spawn(tx: Sender<SessionEvent>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        thread::spawn(move || {
            loop {
                thread::sleep(Duration::from_secs(1));
                if stop_flag.load(Ordering::Relaxed) {
                    return;
                }
                if tx.send(SessionEvent::Tick).is_err() {
                    return;
                }
            }
        });
        Self { stop }
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Format remaining seconds as `mm:ss` for the countdown display.
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
