//! Current setpoint to VREF level mapping.
//!
//! The DRV8825 regulates winding current to `VREF / (5 * Rsense)`, so the
//! reference voltage for a desired current is `amps * 5 * Rsense`. There is
//! no feedback path from the chip, the mapping is open loop.

use libm::{fmaxf, fminf, roundf};

pub const CURRENT_MIN_AMPS: f32 = 0.0;
pub const CURRENT_MAX_AMPS: f32 = 2.0;

/// Winding sense resistors on the carrier board.
pub const SENSE_RESISTOR_OHMS: f32 = 0.2;

/// Current regulation gain of the chopper, fixed by the chip.
const CHOPPER_GAIN: f32 = 5.0;

/// Full scale of the analog output stage feeding the VREF pin.
const FULL_SCALE_VOLTS: f32 = 5.0;

/// Maps a current setpoint in amps onto the 8 bit VREF output level.
/// Out of range setpoints are clamped, never rejected.
pub fn level_for_current(amps: f32) -> u8 {
    let amps = fminf(fmaxf(amps, CURRENT_MIN_AMPS), CURRENT_MAX_AMPS);
    let volts = amps * CHOPPER_GAIN * SENSE_RESISTOR_OHMS;
    roundf(volts / FULL_SCALE_VOLTS * 255.0) as u8
}
