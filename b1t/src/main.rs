#![cfg_attr(not(test), no_std)]
#![no_main]

#[cfg(feature = "serial")]
mod debugger;
pub(crate) mod keyboard;
pub(crate) mod runtime;

// The macro for our start-up function
use liatris::{entry, Pins};

// A shorter alias for the Peripheral Access Crate, which provides low-level
// register access
use liatris::hal::pac;

// A shorter alias for the Hardware Abstraction Layer, which provides
// higher-level drivers.
use liatris::hal;

use crate::keyboard::{ExpanderBus, KeyboardBoard};
use b1t_lib::expander::Expander;
use b1t_lib::local::LocalMatrix;
use b1t_lib::Board;
use liatris::pac::I2C1;
use rp2040_hal::clocks::PeripheralClock;
use fugit::RateExtU32;
use rp2040_hal::gpio::bank0::{Gpio2, Gpio3};
use rp2040_hal::gpio::{FunctionI2C, InOutPin, Pin, PullDown};

/// Entry point to our bare-metal application.
///
/// The `#[entry]` macro ensures the Cortex-M start-up code calls this function
/// as soon as all global variables are initialised.
#[entry]
fn main() -> ! {
    setup_kbd()
}

fn setup_kbd() -> ! {
    // Grab our singleton objects
    let mut pac = pac::Peripherals::take().unwrap();

    // Set up the watchdog driver - needed by the clock setup code
    let mut watchdog = hal::Watchdog::new(pac.WATCHDOG);

    let clocks = hal::clocks::init_clocks_and_plls(
        liatris::XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    #[cfg(feature = "serial")]
    debugger::init_logger();

    let timer = hal::Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);
    let sio = hal::Sio::new(pac.SIO);
    let pins = Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let sda_pin = pins.gpio2.into_function::<hal::gpio::FunctionI2C>();
    let scl_pin = pins.gpio3.into_function::<hal::gpio::FunctionI2C>();
    let i2c = setup_i2c(
        pac.I2C1,
        &mut pac.RESETS,
        sda_pin,
        scl_pin,
        &clocks.peripheral_clock,
    );

    // Pro Micro footprint, rows F4 F5 F6 C6 D7 and columns B5 B4 B6 B2 B3 B1 F7
    let local = LocalMatrix::new(
        [
            InOutPin::new(pins.gpio29.into_floating_input().into_dyn_pin()),
            InOutPin::new(pins.gpio28.into_floating_input().into_dyn_pin()),
            InOutPin::new(pins.gpio27.into_floating_input().into_dyn_pin()),
            InOutPin::new(pins.gpio5.into_floating_input().into_dyn_pin()),
            InOutPin::new(pins.gpio6.into_floating_input().into_dyn_pin()),
        ],
        [
            pins.gpio9.into_pull_up_input().into_dyn_pin(),
            pins.gpio8.into_pull_up_input().into_dyn_pin(),
            pins.gpio21.into_pull_up_input().into_dyn_pin(),
            pins.gpio22.into_pull_up_input().into_dyn_pin(),
            pins.gpio20.into_pull_up_input().into_dyn_pin(),
            pins.gpio23.into_pull_up_input().into_dyn_pin(),
            pins.gpio26.into_pull_up_input().into_dyn_pin(),
        ],
    );

    let board: KeyboardBoard = Board::new(
        Expander::new(i2c, timer),
        local,
        pins.gpio4.into_push_pull_output().into_dyn_pin(),
        pins.gpio7.into_push_pull_output().into_dyn_pin(),
    );

    // Set up the USB driver
    #[cfg(feature = "serial")]
    let usb_bus = usb_device::bus::UsbBusAllocator::new(hal::usb::UsbBus::new(
        pac.USBCTRL_REGS,
        pac.USBCTRL_DPRAM,
        clocks.usb_clock,
        true,
        &mut pac.RESETS,
    ));

    runtime::run(
        board,
        timer,
        watchdog,
        #[cfg(feature = "serial")]
        &usb_bus,
    )
}

fn setup_i2c(
    i2c: I2C1,
    r: &mut pac::RESETS,
    sda: Pin<Gpio2, FunctionI2C, PullDown>,
    scl: Pin<Gpio3, FunctionI2C, PullDown>,
    clock: &PeripheralClock,
) -> ExpanderBus {
    hal::I2C::i2c1(
        i2c,
        sda.reconfigure(),
        scl.reconfigure(),
        keyboard::I2C_FREQ_KHZ.kHz(),
        r,
        clock,
    )
}

#[panic_handler]
#[inline(never)]
fn halt(_info: &core::panic::PanicInfo) -> ! {
    loop {
        core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
    }
}
