//! Step pulse generation.
//!
//! A fixed-rate timer interrupt drives [`PulseEngine::tick`]. The tick
//! counter and the current output level live inside the engine; the only
//! state shared with the configuration side is the threshold cell, a single
//! machine word written with [`set_step_threshold`] and re-read on every
//! tick. A transiently stale read costs at most one irregular half cycle.
//! If the tick source stops firing the engine silently stops with it, there
//! is no detection path.

use core::sync::atomic::{AtomicU16, Ordering};

use embedded_hal::digital::v2::OutputPin;

/// Threshold value that disables stepping. Thresholds at or above this one
/// never toggle the step line.
pub const COUNT_STOP: u16 = u16::MAX;

/// Threshold in effect at power up.
pub const DEFAULT_THRESHOLD: u16 = 12;

static STEP_THRESHOLD: AtomicU16 = AtomicU16::new(DEFAULT_THRESHOLD);

/// Sets the tick count between step edges. `ticks + 1` ticks pass between
/// two edges, so a full step period is `2 * (ticks + 1)` ticks. Writing
/// [`COUNT_STOP`] freezes the step line on the next tick.
pub fn set_step_threshold(ticks: u16) {
    STEP_THRESHOLD.store(ticks, Ordering::Relaxed);
}

/// Threshold the engine will see on its next tick.
pub fn step_threshold() -> u16 {
    STEP_THRESHOLD.load(Ordering::Relaxed)
}

/// Toggle state machine behind the step line.
pub struct PulseEngine {
    count: u16,
    high: bool,
}

impl PulseEngine {
    pub const fn new() -> Self {
        Self {
            count: 0,
            high: false,
        }
    }

    /// Advances the engine by one tick. Once the counter passes `threshold`
    /// the step line is toggled and the counter restarts. A threshold change
    /// takes effect on the tick that first sees it, even mid count; stopping
    /// freezes counter and level, re-arming resumes from both unchanged.
    ///
    /// Must stay allocation free and bounded, it runs inside the tick
    /// interrupt.
    pub fn tick<S: OutputPin>(&mut self, threshold: u16, step: &mut S) -> Result<(), S::Error> {
        if threshold < COUNT_STOP {
            self.count += 1;
            if self.count > threshold {
                if self.high {
                    step.set_low()?;
                } else {
                    step.set_high()?;
                }
                self.high = !self.high;
                self.count = 0;
            }
        }
        Ok(())
    }
}
