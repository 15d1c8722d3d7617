#[cfg(feature = "serial")]
pub mod usb_serial;

use b1t_lib::Board;
use liatris::pac::I2C1;
use rp2040_hal::gpio::bank0::{Gpio2, Gpio3};
use rp2040_hal::gpio::{
    DynPinId, FunctionI2C, FunctionSioInput, FunctionSioOutput, InOutPin, Pin, PullDown, PullNone,
    PullUp,
};
use rp2040_hal::{Timer, I2C};

pub const I2C_FREQ_KHZ: u32 = 400;

pub type ExpanderBus =
    I2C<I2C1, (Pin<Gpio2, FunctionI2C, PullUp>, Pin<Gpio3, FunctionI2C, PullUp>)>;

/// Driven low when selected, floating otherwise.
pub type RowPin = InOutPin<Pin<DynPinId, FunctionSioInput, PullNone>>;
pub type ColPin = Pin<DynPinId, FunctionSioInput, PullUp>;
pub type LedPin = Pin<DynPinId, FunctionSioOutput, PullDown>;

pub type KeyboardBoard = Board<ExpanderBus, Timer, RowPin, ColPin, LedPin>;
