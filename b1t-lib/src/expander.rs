//! MCP23018 on the right half.
//!
//! Port B drives the rows, ports A and B read the columns, A0 sinks the
//! space-bar LED. Every register sequence is a single I2C transaction so the
//! bus is always released with a stop, even when a byte is not acknowledged.
use crate::link::{BusFault, LinkStatus};
use crate::matrix::{RowIndex, RowWord, EXPANDER_COLS, NUM_ROWS};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error, I2c, SevenBitAddress};
use fugit::MillisDurationU32;
use log::{debug, warn};

/// A0-A2 strapped to ground.
pub const EXPANDER_ADDR: SevenBitAddress = 0b010_0000;

/// Time the expander gets to power up after the bus is first opened.
pub const EXPANDER_SETTLE: MillisDurationU32 = MillisDurationU32::millis(1000);

/// Register map with IOCON.BANK = 0, A/B pairs are adjacent so one write
/// covers both ports.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Register {
    IoDirA = 0x00,
    IoDirB = 0x01,
    GpPuA = 0x0C,
    GpPuB = 0x0D,
    /// Writes land in the output latch
    GpioA = 0x12,
    GpioB = 0x13,
    OLatA = 0x14,
    OLatB = 0x15,
}

impl Register {
    #[inline]
    #[must_use]
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Port {
    A,
    B,
}

impl Port {
    #[inline]
    #[must_use]
    pub const fn gpio(self) -> Register {
        match self {
            Port::A => Register::GpioA,
            Port::B => Register::GpioB,
        }
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Port::A => 0,
            Port::B => 1,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ExpanderPin {
    pub port: Port,
    pub bit: u8,
}

impl ExpanderPin {
    /// # Panics
    /// If `bit` is outside the 8-bit port.
    #[must_use]
    pub const fn new(port: Port, bit: u8) -> Self {
        assert!(bit < 8, "Expander ports are 8 bits wide");
        Self { port, bit }
    }

    #[inline]
    #[must_use]
    pub const fn mask(self) -> u8 {
        1 << self.bit
    }

    #[inline]
    #[must_use]
    pub const fn is_low(self, ports: [u8; 2]) -> bool {
        ports[self.port.index()] & self.mask() == 0
    }
}

/// Row index -> driving pin.
pub const EXPANDER_ROW_PINS: [ExpanderPin; NUM_ROWS as usize] = [
    ExpanderPin::new(Port::B, 2),
    ExpanderPin::new(Port::B, 1),
    ExpanderPin::new(Port::B, 0),
    ExpanderPin::new(Port::B, 3),
    ExpanderPin::new(Port::B, 4),
];

/// Column index -> reading pin. The board routes these in reverse, and only
/// six of them live on port A since A0 belongs to the LED.
pub const EXPANDER_COL_PINS: [ExpanderPin; EXPANDER_COLS as usize] = [
    ExpanderPin::new(Port::A, 7),
    ExpanderPin::new(Port::A, 6),
    ExpanderPin::new(Port::A, 5),
    ExpanderPin::new(Port::A, 4),
    ExpanderPin::new(Port::A, 3),
    ExpanderPin::new(Port::A, 2),
    ExpanderPin::new(Port::B, 7),
    ExpanderPin::new(Port::B, 6),
];

pub const EXPANDER_LED_PIN: ExpanderPin = ExpanderPin::new(Port::A, 0);

/// IODIR for ports A and B, 0 = output. Rows and the LED drive, unused and
/// column pins read.
pub const DIRECTION: [u8; 2] = [0b1111_1110, 0b1110_0000];

/// GPPU for ports A and B, pull-up on every input, off on the driving pins.
pub const PULL_UP: [u8; 2] = [0b1111_1110, 0b1110_0000];

/// Turns raw GPIOA/GPIOB levels into a row word, 1 = pressed.
#[must_use]
pub fn decode_columns(ports: [u8; 2]) -> RowWord {
    EXPANDER_COL_PINS
        .iter()
        .enumerate()
        .fold(0, |word, (col, pin)| {
            if pin.is_low(ports) {
                word | (1 << col)
            } else {
                word
            }
        })
}

pub struct Expander<I2C, D> {
    i2c: I2C,
    delay: D,
    bus_opened: bool,
    status: LinkStatus,
}

impl<I2C, D> Expander<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub const fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            delay,
            bus_opened: false,
            status: LinkStatus::Unknown,
        }
    }

    #[inline]
    #[must_use]
    pub const fn status(&self) -> LinkStatus {
        self.status
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Configures direction and pull-ups, status is `Ok` only if both land.
    ///
    /// # Errors
    /// The fault of the first transaction that failed, the rest are skipped.
    pub fn init(&mut self) -> Result<(), BusFault> {
        self.status = LinkStatus::Unknown;
        if !self.bus_opened {
            debug!("opening expander bus");
            self.delay.delay_ms(EXPANDER_SETTLE.to_millis());
            self.bus_opened = true;
        }
        debug!("setting expander pin direction");
        self.write_pair(Register::IoDirA, DIRECTION)?;
        debug!("setting expander pin pull-ups");
        self.write_pair(Register::GpPuA, PULL_UP)
    }

    /// Pulls the row low, every other row pin is released.
    pub fn select_row(&mut self, row: RowIndex) {
        if !self.status.is_ok() {
            return;
        }
        let pin = EXPANDER_ROW_PINS[row.index()];
        let reg = pin.port.gpio().addr();
        if let Err(fault) = self.record(|i2c| i2c.write(EXPANDER_ADDR, &[reg, !pin.mask()])) {
            debug!("expander row {} select failed: {fault:?}", row.value());
        }
    }

    /// Reads both ports, nothing counts as pressed while the link is down.
    pub fn read_columns(&mut self) -> RowWord {
        if !self.status.is_ok() {
            return 0;
        }
        let mut ports = [0u8; 2];
        match self.record(|i2c| {
            i2c.write_read(EXPANDER_ADDR, &[Register::GpioA.addr()], &mut ports)
        }) {
            Ok(()) => decode_columns(ports),
            Err(fault) => {
                debug!("expander column read failed: {fault:?}");
                0
            }
        }
    }

    pub fn set_indicator(&mut self, on: bool) {
        if !self.status.is_ok() {
            debug!("expander down, indicator left as is");
            return;
        }
        // The LED sinks into the pin
        let level = if on { 0 } else { EXPANDER_LED_PIN.mask() };
        let reg = EXPANDER_LED_PIN.port.gpio().addr();
        if let Err(fault) = self.record(|i2c| i2c.write(EXPANDER_ADDR, &[reg, level])) {
            warn!("expander indicator write failed: {fault:?}");
        }
    }

    fn write_pair(&mut self, first: Register, values: [u8; 2]) -> Result<(), BusFault> {
        self.record(|i2c| i2c.write(EXPANDER_ADDR, &[first.addr(), values[0], values[1]]))
    }

    fn record<T>(
        &mut self,
        op: impl FnOnce(&mut I2C) -> Result<T, I2C::Error>,
    ) -> Result<T, BusFault> {
        let res = op(&mut self.i2c).map_err(|e| BusFault::from(e.kind()));
        self.status = LinkStatus::from_result(&res);
        res
    }
}
