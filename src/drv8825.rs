//! Control-line plumbing for the DRV8825 stepper driver chip.
//!
//! Only a single chip is supported. The step line is deliberately not owned
//! here, it belongs to the pulse engine task (see [`crate::pulse`]). All
//! setters clamp out-of-range inputs instead of rejecting them; the only
//! error type flowing out is the pin error of the HAL, which is infallible
//! on the target.

use embedded_hal::digital::v2::{InputPin, OutputPin};
use embedded_hal::PwmPin;

use crate::vref;

/// Finest microstepping setting (1/32). Higher requests collapse to it.
pub const MODE_MAX: u8 = 5;

/// Mode applied when the driver is brought up (full steps).
pub const DEFAULT_MODE: u8 = 0;

/// Current setpoint applied when the driver is brought up.
pub const DEFAULT_CURRENT_AMPS: f32 = 1.0;

#[derive(Clone, Copy, Debug, Eq, PartialEq, defmt::Format)]
pub enum Direction {
    Forward,
    Reverse,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, defmt::Format)]
pub enum Decay {
    Slow,
    Fast,
}

/// The three microstepping select lines.
pub struct ModePins<M0, M1, M2> {
    mode0: M0,
    mode1: M1,
    mode2: M2,
}

impl<E, M0, M1, M2> ModePins<M0, M1, M2>
where
    M0: OutputPin<Error = E>,
    M1: OutputPin<Error = E>,
    M2: OutputPin<Error = E>,
{
    pub fn new(mode0: M0, mode1: M1, mode2: M2) -> Self {
        Self {
            mode0,
            mode1,
            mode2,
        }
    }

    /// Writes `level` onto the select lines bit by bit, 0 through 5 for
    /// 1/1 through 1/32 microstepping.
    fn apply(&mut self, level: u8) -> Result<(), E> {
        let level = level.min(MODE_MAX);
        write_level(&mut self.mode0, level & 0b001 != 0)?;
        write_level(&mut self.mode1, level & 0b010 != 0)?;
        write_level(&mut self.mode2, level & 0b100 != 0)?;
        Ok(())
    }
}

fn write_level<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), P::Error> {
    if high {
        pin.set_high()
    } else {
        pin.set_low()
    }
}

pub struct Drv8825<Dir, Rst, Slp, En, Dec, M0, M1, M2, Flt, Hm, Vref> {
    direction: Dir,
    reset: Rst,
    sleep: Slp,
    enable: En,
    decay: Dec,
    mode: ModePins<M0, M1, M2>,
    fault: Flt,
    home: Hm,
    vref: Vref,
}

impl<E, Dir, Rst, Slp, En, Dec, M0, M1, M2, Flt, Hm, Vref>
    Drv8825<Dir, Rst, Slp, En, Dec, M0, M1, M2, Flt, Hm, Vref>
where
    Dir: OutputPin<Error = E>,
    Rst: OutputPin<Error = E>,
    Slp: OutputPin<Error = E>,
    En: OutputPin<Error = E>,
    Dec: OutputPin<Error = E>,
    M0: OutputPin<Error = E>,
    M1: OutputPin<Error = E>,
    M2: OutputPin<Error = E>,
    Flt: InputPin<Error = E>,
    Hm: InputPin<Error = E>,
    Vref: PwmPin<Duty = u16>,
{
    /// Brings the chip into a known state: powered (reset and sleep
    /// deasserted) but with the output stage disabled, forward direction,
    /// slow decay, default mode and default current applied. Call
    /// [`Drv8825::set_enable`] before stepping.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        direction: Dir,
        reset: Rst,
        sleep: Slp,
        enable: En,
        decay: Dec,
        mode: ModePins<M0, M1, M2>,
        fault: Flt,
        home: Hm,
        vref: Vref,
    ) -> Result<Self, E> {
        let mut drv = Self {
            direction,
            reset,
            sleep,
            enable,
            decay,
            mode,
            fault,
            home,
            vref,
        };
        drv.reset.set_high()?;
        drv.sleep.set_high()?;
        drv.enable.set_high()?;
        drv.direction.set_high()?;
        drv.decay.set_low()?;
        drv.vref.enable();
        drv.set_mode(DEFAULT_MODE)?;
        drv.set_current(DEFAULT_CURRENT_AMPS);
        Ok(drv)
    }

    /// Selects the microstepping mode, 0 through 5 for 1/1 through 1/32.
    /// Levels above 5 all select 1/32.
    pub fn set_mode(&mut self, level: u8) -> Result<(), E> {
        self.mode.apply(level)
    }

    /// Sets the winding current limit. The setpoint is clamped to
    /// `[0, 2] A` and written open loop as a VREF duty cycle.
    pub fn set_current(&mut self, amps: f32) {
        let level = vref::level_for_current(amps);
        let max = self.vref.get_max_duty();
        let duty = (u32::from(max) * u32::from(level) / 255) as u16;
        self.vref.set_duty(duty);
    }

    /// Gates the output stage. The chip enable line is active low, so
    /// `true` drives the line low.
    pub fn set_enable(&mut self, state: bool) -> Result<(), E> {
        if state {
            self.enable.set_low()
        } else {
            self.enable.set_high()
        }
    }

    pub fn set_direction(&mut self, direction: Direction) -> Result<(), E> {
        match direction {
            Direction::Forward => self.direction.set_high(),
            Direction::Reverse => self.direction.set_low(),
        }
    }

    pub fn set_decay(&mut self, decay: Decay) -> Result<(), E> {
        match decay {
            Decay::Slow => self.decay.set_low(),
            Decay::Fast => self.decay.set_high(),
        }
    }

    /// Raw level of the nFAULT line, active low. No debouncing and no
    /// interpretation, a caller decides what a fault means.
    pub fn is_fault(&self) -> Result<bool, E> {
        self.fault.is_low()
    }

    /// Raw level of the home switch, closed to ground.
    pub fn is_home(&self) -> Result<bool, E> {
        self.home.is_low()
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;
    use core::convert::Infallible;
    use std::rc::Rc;

    use super::*;

    /// A pin the test keeps a second handle on after the driver takes it.
    #[derive(Clone, Default)]
    struct Line(Rc<Cell<bool>>);

    impl Line {
        fn level(&self) -> bool {
            self.0.get()
        }

        fn drive(&self, high: bool) {
            self.0.set(high)
        }
    }

    impl OutputPin for Line {
        type Error = Infallible;

        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.set(true);
            Ok(())
        }
    }

    impl InputPin for Line {
        type Error = Infallible;

        fn is_high(&self) -> Result<bool, Infallible> {
            Ok(self.0.get())
        }

        fn is_low(&self) -> Result<bool, Infallible> {
            Ok(!self.0.get())
        }
    }

    #[derive(Clone)]
    struct VrefOut {
        duty: Rc<Cell<u16>>,
        enabled: Rc<Cell<bool>>,
        max: u16,
    }

    impl VrefOut {
        fn with_max(max: u16) -> Self {
            Self {
                duty: Rc::default(),
                enabled: Rc::default(),
                max,
            }
        }
    }

    impl PwmPin for VrefOut {
        type Duty = u16;

        fn disable(&mut self) {
            self.enabled.set(false)
        }

        fn enable(&mut self) {
            self.enabled.set(true)
        }

        fn get_duty(&self) -> u16 {
            self.duty.get()
        }

        fn get_max_duty(&self) -> u16 {
            self.max
        }

        fn set_duty(&mut self, duty: u16) {
            self.duty.set(duty)
        }
    }

    struct Rig {
        reset: Line,
        sleep: Line,
        enable: Line,
        direction: Line,
        decay: Line,
        mode: [Line; 3],
        fault: Line,
        home: Line,
        vref: VrefOut,
        drv: Drv8825<Line, Line, Line, Line, Line, Line, Line, Line, Line, Line, VrefOut>,
    }

    fn rig_with_max_duty(max: u16) -> Rig {
        let direction = Line::default();
        let reset = Line::default();
        let sleep = Line::default();
        let enable = Line::default();
        let decay = Line::default();
        let mode = [Line::default(), Line::default(), Line::default()];
        let fault = Line::default();
        let home = Line::default();
        let vref = VrefOut::with_max(max);

        // Sense lines idle pulled up.
        fault.drive(true);
        home.drive(true);

        let drv = Drv8825::new(
            direction.clone(),
            reset.clone(),
            sleep.clone(),
            enable.clone(),
            decay.clone(),
            ModePins::new(mode[0].clone(), mode[1].clone(), mode[2].clone()),
            fault.clone(),
            home.clone(),
            vref.clone(),
        )
        .unwrap();

        Rig {
            reset,
            sleep,
            enable,
            direction,
            decay,
            mode,
            fault,
            home,
            vref,
            drv,
        }
    }

    fn rig() -> Rig {
        rig_with_max_duty(255)
    }

    fn mode_lines(r: &Rig) -> u8 {
        (r.mode[0].level() as u8) | (r.mode[1].level() as u8) << 1 | (r.mode[2].level() as u8) << 2
    }

    #[test]
    fn powers_up_disabled_with_defaults() {
        let r = rig();
        assert!(r.reset.level());
        assert!(r.sleep.level());
        assert!(r.enable.level()); // active low, so high means disabled
        assert!(r.direction.level());
        assert!(!r.decay.level());
        assert_eq!(mode_lines(&r), DEFAULT_MODE);
        assert!(r.vref.enabled.get());
        assert_eq!(r.vref.duty.get(), 51); // 1 A on a 255-wide duty range
    }

    #[test]
    fn mode_levels_encode_onto_select_lines() {
        let mut r = rig();
        for level in 0..=MODE_MAX {
            r.drv.set_mode(level).unwrap();
            assert_eq!(mode_lines(&r), level);
        }
    }

    #[test]
    fn mode_levels_above_max_collapse_to_finest() {
        let mut r = rig();
        r.drv.set_mode(9).unwrap();
        assert_eq!(mode_lines(&r), MODE_MAX);
        r.drv.set_mode(255).unwrap();
        assert_eq!(mode_lines(&r), MODE_MAX);
    }

    #[test]
    fn enable_line_is_active_low_both_ways() {
        let mut r = rig();
        r.drv.set_enable(true).unwrap();
        assert!(!r.enable.level());
        r.drv.set_enable(false).unwrap();
        assert!(r.enable.level());
    }

    #[test]
    fn current_rescales_onto_the_duty_range() {
        let mut r = rig_with_max_duty(1_000);
        r.drv.set_current(2.0);
        // level 102 of 255 on a 1000-wide range
        assert_eq!(r.vref.duty.get(), 400);
    }

    #[test]
    fn current_setpoints_clamp_instead_of_failing() {
        let mut r = rig();
        r.drv.set_current(-3.0);
        assert_eq!(r.vref.duty.get(), 0);
        r.drv.set_current(99.0);
        assert_eq!(r.vref.duty.get(), 102);
    }

    #[test]
    fn direction_and_decay_drive_their_lines() {
        let mut r = rig();
        r.drv.set_direction(Direction::Reverse).unwrap();
        assert!(!r.direction.level());
        r.drv.set_direction(Direction::Forward).unwrap();
        assert!(r.direction.level());

        r.drv.set_decay(Decay::Fast).unwrap();
        assert!(r.decay.level());
        r.drv.set_decay(Decay::Slow).unwrap();
        assert!(!r.decay.level());
    }

    #[test]
    fn fault_and_home_read_active_low() {
        let r = rig();
        assert!(!r.drv.is_fault().unwrap());
        assert!(!r.drv.is_home().unwrap());

        r.fault.drive(false);
        r.home.drive(false);
        assert!(r.drv.is_fault().unwrap());
        assert!(r.drv.is_home().unwrap());
    }
}
