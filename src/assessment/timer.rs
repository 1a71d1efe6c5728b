// src/assessment/timer.rs

use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::URGENT_THRESHOLD_SECS;

/// Whole-second countdown. Driven externally, one `tick` per elapsed second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    duration: u64,
    remaining: u64,
}

impl Countdown {
    pub fn new(duration_secs: u64) -> Self {
        Countdown {
            duration: duration_secs,
            remaining: duration_secs,
        }
    }

    pub fn from_minutes(minutes: u32) -> Self {
        Countdown::new(u64::from(minutes) * 60)
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn elapsed(&self) -> u64 {
        self.duration - self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    pub fn is_urgent(&self) -> bool {
        self.remaining < URGENT_THRESHOLD_SECS
    }

    pub fn display(&self) -> String {
        format_remaining(self.remaining)
    }

    /// Advances one second. Returns `true` only on the tick that reaches zero.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }
}

/// `H:MM:SS` from one hour up, `M:SS` below.
pub fn format_remaining(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// One-shot flag for the expiry handler.
#[derive(Debug, Default)]
pub struct ExpiryLatch {
    fired: AtomicBool,
}

impl ExpiryLatch {
    /// Returns `true` for the first caller only.
    pub fn fire(&self) -> bool {
        !self.fired.swap(true, Ordering::AcqRel)
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}
