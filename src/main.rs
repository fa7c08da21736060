#![no_std]
#![no_main]

const VERSION: &str = env!("CARGO_PKG_VERSION");

use defmt_rtt as _; // global logger
use panic_probe as _;

use rtic::app;

mod arduino_shield;
mod hw_config;

/// Rate of the step tick interrupt. One timer update is one tick of the
/// pulse engine, so the shortest full step period is 2 ticks worth.
const STEP_TICK_HZ: u32 = 20_000;

#[app(device = stm32f1xx_hal::device, dispatchers = [SPI1])]
mod app {

    use defmt::{debug, info, warn};
    use drv8825_stepper::drv8825::ModePins;
    use drv8825_stepper::pulse::{self, PulseEngine};
    use dwt_systick_monotonic::DwtSystick;
    use rtic::rtic_monotonic::Milliseconds;
    use stm32f1xx_hal::prelude::*;
    use stm32f1xx_hal::timer::{CountDownTimer, Event, Tim3NoRemap, Timer};

    use crate::hw_config;

    #[resources]
    struct Resources {
        driver: hw_config::driver::Driver,
        #[task_local]
        tick_timer: CountDownTimer<stm32f1xx_hal::pac::TIM2>,
        #[task_local]
        step_pin: hw_config::driver::PinStep,
        #[task_local]
        pulse_engine: PulseEngine,
    }

    #[monotonic(binds = SysTick, default = true)]
    type MyMono = DwtSystick<32_000_000>;

    #[init]
    fn init(mut cx: init::Context) -> (init::LateResources, init::Monotonics) {
        // Get Peripherals
        let device: stm32f1xx_hal::device::Peripherals = cx.device;

        let mut rcc = device.RCC.constrain();
        let mut flash = device.FLASH.constrain();
        let mut afio = device.AFIO.constrain(&mut rcc.apb2);

        let clocks = rcc
            .cfgr
            .sysclk(32.mhz())
            .pclk1(16.mhz())
            .pclk2(32.mhz())
            .freeze(&mut flash.acr);

        // Activate GPIOs
        let mut gpioa = device.GPIOA.split(&mut rcc.apb2);
        let mut gpiob = device.GPIOB.split(&mut rcc.apb2);
        let mut gpioc = device.GPIOC.split(&mut rcc.apb2);

        // Free PB4 for the MODE2 line (ST-Link V2 is enough for debugging)
        let (_pa15, _pb3, pb4) = afio.mapr.disable_jtag(gpioa.pa15, gpiob.pb3, gpiob.pb4);

        // Control lines of the DRV8825 carrier
        let step = gpioa.pa9.into_push_pull_output(&mut gpioa.crh);
        let direction = gpiob.pb6.into_push_pull_output(&mut gpiob.crl);
        let enable = gpioc.pc7.into_push_pull_output(&mut gpioc.crl);
        let reset = gpiob.pb0.into_push_pull_output(&mut gpiob.crl);
        let sleep = gpioa.pa4.into_push_pull_output(&mut gpioa.crl);
        let decay = gpioa.pa0.into_push_pull_output(&mut gpioa.crl);
        let mode0 = gpioa.pa8.into_push_pull_output(&mut gpioa.crh);
        let mode1 = gpiob.pb10.into_push_pull_output(&mut gpiob.crh);
        let mode2 = pb4.into_push_pull_output(&mut gpiob.crl);
        let fault = gpioa.pa1.into_pull_up_input(&mut gpioa.crl);
        let home = gpioc.pc0.into_pull_up_input(&mut gpioc.crl);

        // VREF is an RC filtered PWM output on TIM3 channel 1
        let vref_pin = gpioa.pa6.into_alternate_push_pull(&mut gpioa.crl);
        let vref = Timer::tim3(device.TIM3, &clocks, &mut rcc.apb1)
            .pwm::<Tim3NoRemap, _, _, _>(vref_pin, &mut afio.mapr, 25.khz())
            .split();

        let driver = hw_config::driver::Driver::new(
            direction,
            reset,
            sleep,
            enable,
            decay,
            ModePins::new(mode0, mode1, mode2),
            fault,
            home,
            vref,
        )
        .unwrap();

        // Arm the step tick
        let mut tick_timer = Timer::tim2(device.TIM2, &clocks, &mut rcc.apb1)
            .start_count_down(crate::STEP_TICK_HZ.hz());
        tick_timer.listen(Event::Update);

        // Create Systic Timer
        let mono = DwtSystick::new(
            &mut cx.core.DCB,
            cx.core.DWT,
            cx.core.SYST,
            clocks.sysclk().0,
        );

        supervisor::spawn().unwrap();

        info!(
            "drv8825-stepper {:?} up, step tick at {:?} Hz",
            crate::VERSION,
            crate::STEP_TICK_HZ
        );

        (
            init::LateResources {
                driver,
                pulse_engine: PulseEngine::new(),
                step_pin: step,
                tick_timer,
            },
            init::Monotonics(mono),
        )
    }

    #[idle(resources = [driver])]
    fn idle(mut cx: idle::Context) -> ! {
        // Bring-up jog: quarter stepping at 1 A, outputs on, constant rate.
        cx.resources.driver.lock(|driver| {
            driver.set_mode(2).unwrap();
            driver.set_current(1.0);
            driver.set_enable(true).unwrap();
        });
        pulse::set_step_threshold(24);

        loop {
            cortex_m::asm::wfi();
        }
    }

    /// One tick of the pulse engine. Highest priority, so a step edge never
    /// waits on configuration work.
    #[task(binds = TIM2, priority = 15, resources = [tick_timer, step_pin, pulse_engine])]
    fn step_tick(cx: step_tick::Context) {
        cx.resources.tick_timer.clear_update_interrupt_flag();
        cx.resources
            .pulse_engine
            .tick(pulse::step_threshold(), cx.resources.step_pin)
            .unwrap();
    }

    #[task(priority = 5, resources = [driver])]
    fn supervisor(mut cx: supervisor::Context) {
        supervisor::spawn_after(Milliseconds(500_u32)).unwrap();

        let (fault, home) = cx
            .resources
            .driver
            .lock(|driver| (driver.is_fault().unwrap(), driver.is_home().unwrap()));
        if fault {
            warn!("driver reports a fault");
        }
        if home {
            debug!("home switch closed");
        }
    }
}
