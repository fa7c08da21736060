//! Shield header positions on the nucleo board that the DRV8825 carrier
//! occupies. VREF sits on D12 so it lands on a PWM capable timer channel.
#![allow(dead_code)]

pub type A0<T> = stm32f1xx_hal::gpio::gpioa::PA0<T>; // decay
pub type A1<T> = stm32f1xx_hal::gpio::gpioa::PA1<T>; // fault, pulled up
pub type A2<T> = stm32f1xx_hal::gpio::gpioa::PA4<T>; // sleep
pub type A3<T> = stm32f1xx_hal::gpio::gpiob::PB0<T>; // reset
pub type A5<T> = stm32f1xx_hal::gpio::gpioc::PC0<T>; // home, pulled up

pub type D5<T> = stm32f1xx_hal::gpio::gpiob::PB4<T>; // mode 2, freed from JTAG
pub type D6<T> = stm32f1xx_hal::gpio::gpiob::PB10<T>; // mode 1
pub type D7<T> = stm32f1xx_hal::gpio::gpioa::PA8<T>; // mode 0
pub type D8<T> = stm32f1xx_hal::gpio::gpioa::PA9<T>; // step
pub type D9<T> = stm32f1xx_hal::gpio::gpioc::PC7<T>; // enable
pub type D10<T> = stm32f1xx_hal::gpio::gpiob::PB6<T>; // direction
pub type D12<T> = stm32f1xx_hal::gpio::gpioa::PA6<T>; // vref (TIM3_CH1)
