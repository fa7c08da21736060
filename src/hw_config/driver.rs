//! Configurateion of the HW for the DRV8825 carrier
//!
//! One type alias per control line of the chip. The step line is listed
//! with the rest but is owned by the pulse engine task, not by the driver
//! struct.

#![allow(dead_code)]

use stm32f1xx_hal::gpio::{Alternate, Input, Output, PullUp, PushPull};
use stm32f1xx_hal::pwm::{C1, PwmChannel};

pub type PinStep = crate::arduino_shield::D8<Output<PushPull>>;
pub type PinDirection = crate::arduino_shield::D10<Output<PushPull>>;
pub type PinEnable = crate::arduino_shield::D9<Output<PushPull>>;
pub type PinReset = crate::arduino_shield::A3<Output<PushPull>>;
pub type PinSleep = crate::arduino_shield::A2<Output<PushPull>>;
pub type PinDecay = crate::arduino_shield::A0<Output<PushPull>>;
pub type PinMode0 = crate::arduino_shield::D7<Output<PushPull>>;
pub type PinMode1 = crate::arduino_shield::D6<Output<PushPull>>;
pub type PinMode2 = crate::arduino_shield::D5<Output<PushPull>>;
pub type PinFault = crate::arduino_shield::A1<Input<PullUp>>;
pub type PinHome = crate::arduino_shield::A5<Input<PullUp>>;
pub type PinVref = crate::arduino_shield::D12<Alternate<PushPull>>;

pub type VrefChannel = PwmChannel<stm32f1xx_hal::pac::TIM3, C1>;

pub type Driver = drv8825_stepper::drv8825::Drv8825<
    PinDirection,
    PinReset,
    PinSleep,
    PinEnable,
    PinDecay,
    PinMode0,
    PinMode1,
    PinMode2,
    PinFault,
    PinHome,
    VrefChannel,
>;
