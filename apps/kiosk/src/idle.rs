//! # Idle Monitor
//!
//! Returns an abandoned kiosk to the home screen.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  leave home ──► arm(epoch) ──► ticker task ── 1 s ──► IdleTick{epoch}   │
//! │                                                          │              │
//! │                                   controller loop ◄──────┘              │
//! │                                          │                              │
//! │                          on_tick(): remaining -= 1                      │
//! │                                          │                              │
//! │              shopper input ──► touch(): remaining = timeout             │
//! │                                          │                              │
//! │                          remaining == 0 ──► expired (once) ──► reset    │
//! │                                                                         │
//! │  back home ──► disarm() ──► ticker aborted, no timeout pressure         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only one ticker exists at a time: `arm` replaces the previous one.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::events::InternalEvent;
use crate::timer::ScheduledTask;

const TICK: Duration = Duration::from_secs(1);

// =============================================================================
// Countdown
// =============================================================================

/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Running { remaining_secs: u64 },
    /// The timeout was reached on this tick.
    Expired,
    /// Already expired; nothing more will fire until restarted.
    Stopped,
}

/// Pure idle countdown, one tick per second.
#[derive(Debug, Clone)]
pub struct IdleCountdown {
    timeout_secs: u64,
    remaining_secs: u64,
    expired: bool,
}

impl IdleCountdown {
    pub fn new(timeout: Duration) -> Self {
        let timeout_secs = timeout.as_secs().max(1);
        IdleCountdown {
            timeout_secs,
            remaining_secs: timeout_secs,
            expired: false,
        }
    }

    pub fn tick(&mut self) -> Countdown {
        if self.expired {
            return Countdown::Stopped;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.expired = true;
            Countdown::Expired
        } else {
            Countdown::Running {
                remaining_secs: self.remaining_secs,
            }
        }
    }

    /// User activity: back to the full timeout. No effect once expired.
    pub fn touch(&mut self) {
        if !self.expired {
            self.remaining_secs = self.timeout_secs;
        }
    }

    /// Full timeout again, ready to expire once more.
    pub fn restart(&mut self) {
        self.remaining_secs = self.timeout_secs;
        self.expired = false;
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Seconds since the last activity.
    pub fn idle_secs(&self) -> u64 {
        self.timeout_secs - self.remaining_secs
    }

    /// Remaining time as `m:ss`.
    pub fn display(&self) -> String {
        format!("{}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }
}

// =============================================================================
// Monitor
// =============================================================================

/// Countdown plus the single ticker task feeding it.
#[derive(Debug)]
pub struct IdleMonitor {
    countdown: IdleCountdown,
    ticker: Option<ScheduledTask>,
}

impl IdleMonitor {
    pub fn new(timeout: Duration) -> Self {
        IdleMonitor {
            countdown: IdleCountdown::new(timeout),
            ticker: None,
        }
    }

    /// Starts ticking for the session `epoch`, replacing any running ticker.
    pub fn arm(&mut self, epoch: u64, events: UnboundedSender<InternalEvent>) {
        self.countdown.restart();
        self.ticker = Some(ScheduledTask::spawn(tick_loop(epoch, events)));
        debug!(epoch, "Idle monitor armed");
    }

    /// Stops ticking. The countdown shows the full timeout again.
    pub fn disarm(&mut self) {
        if self.ticker.take().is_some() {
            debug!("Idle monitor disarmed");
        }
        self.countdown.restart();
    }

    /// Applies one tick. Returns true exactly once, when the timeout is hit.
    pub fn on_tick(&mut self) -> bool {
        match self.countdown.tick() {
            Countdown::Expired => {
                info!(timeout_secs = self.countdown.timeout_secs, "Idle timeout reached");
                self.ticker = None;
                true
            }
            Countdown::Running { .. } | Countdown::Stopped => false,
        }
    }

    pub fn touch(&mut self) {
        self.countdown.touch();
    }

    pub fn is_armed(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn countdown(&self) -> &IdleCountdown {
        &self.countdown
    }
}

async fn tick_loop(epoch: u64, events: UnboundedSender<InternalEvent>) {
    let mut interval = tokio::time::interval_at(Instant::now() + TICK, TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        if events.send(InternalEvent::IdleTick { epoch }).is_err() {
            break;
        }
    }
}
