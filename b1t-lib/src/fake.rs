//! Host stand-ins for the board: an MCP23018 register file and instrumented
//! pins, sharing state with the test through `Rc<RefCell<_>>`.
use crate::expander::{
    Register, EXPANDER_ADDR, EXPANDER_COL_PINS, EXPANDER_LED_PIN, EXPANDER_ROW_PINS,
};
use crate::matrix::{EXPANDER_COLS, NUM_ROWS, ONBOARD_COLS};
use core::convert::Infallible;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::i2c::{self, ErrorKind, NoAcknowledgeSource, Operation, SevenBitAddress};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

const ROWS: usize = NUM_ROWS as usize;

#[derive(Debug, Default)]
pub struct CountingDelay {
    pub total_ns: u64,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ns += u64::from(ms) * 1_000_000;
    }
}

#[derive(Debug)]
pub struct ExpanderState {
    pub regs: [u8; 0x16],
    /// `pressed[row][col]` for the expander's columns
    pub pressed: [[bool; EXPANDER_COLS as usize]; ROWS],
    pub fail_with: Option<ErrorKind>,
    pub transactions: usize,
    /// Rows driven low at every column read
    pub driven_at_read: Vec<Vec<usize>>,
}

impl Default for ExpanderState {
    fn default() -> Self {
        let mut regs = [0u8; 0x16];
        // Power-on: everything an input
        regs[Register::IoDirA.addr() as usize] = 0xFF;
        regs[Register::IoDirB.addr() as usize] = 0xFF;
        Self {
            regs,
            pressed: [[false; EXPANDER_COLS as usize]; ROWS],
            fail_with: None,
            transactions: 0,
            driven_at_read: Vec::new(),
        }
    }
}

impl ExpanderState {
    fn latch(&self, port: usize) -> u8 {
        self.regs[Register::OLatA.addr() as usize + port]
    }

    fn direction(&self, port: usize) -> u8 {
        self.regs[Register::IoDirA.addr() as usize + port]
    }

    pub fn driven_rows(&self) -> Vec<usize> {
        EXPANDER_ROW_PINS
            .iter()
            .enumerate()
            .filter(|(_, pin)| {
                let port = pin.port.index();
                self.direction(port) & pin.mask() == 0 && self.latch(port) & pin.mask() == 0
            })
            .map(|(row, _)| row)
            .collect()
    }

    /// Open drain with the LED sinking, a low latch means lit.
    pub fn led_lit(&self) -> bool {
        let port = EXPANDER_LED_PIN.port.index();
        self.direction(port) & EXPANDER_LED_PIN.mask() == 0
            && self.latch(port) & EXPANDER_LED_PIN.mask() == 0
    }

    fn port_level(&mut self, port: usize) -> u8 {
        let driven = self.driven_rows();
        if port == 0 {
            self.driven_at_read.push(driven.clone());
        }
        let mut level = 0xFF;
        for bit in 0..8u8 {
            let mask = 1 << bit;
            if self.direction(port) & mask == 0 {
                level &= !mask | self.latch(port);
                continue;
            }
            let col = EXPANDER_COL_PINS
                .iter()
                .position(|pin| pin.port.index() == port && pin.bit == bit);
            if let Some(col) = col {
                if driven.iter().any(|&row| self.pressed[row][col]) {
                    level &= !mask;
                }
            }
        }
        level
    }

    fn write_reg(&mut self, reg: u8, value: u8) {
        let reg = match reg {
            0x12 => 0x14,
            0x13 => 0x15,
            other => other,
        };
        if let Some(slot) = self.regs.get_mut(reg as usize) {
            *slot = value;
        }
    }

    fn read_reg(&mut self, reg: u8) -> u8 {
        match reg {
            0x12 => self.port_level(0),
            0x13 => self.port_level(1),
            other => self.regs.get(other as usize).copied().unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExpanderHandle(Rc<RefCell<ExpanderState>>);

impl ExpanderHandle {
    pub fn state(&self) -> Ref<'_, ExpanderState> {
        self.0.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, ExpanderState> {
        self.0.borrow_mut()
    }
}

impl i2c::ErrorType for ExpanderHandle {
    type Error = ErrorKind;
}

impl i2c::I2c for ExpanderHandle {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut state = self.0.borrow_mut();
        state.transactions += 1;
        if let Some(err) = state.fail_with {
            return Err(err);
        }
        if address != EXPANDER_ADDR {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        let mut pointer: Option<u8> = None;
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    for byte in bytes.iter() {
                        match pointer {
                            None => pointer = Some(*byte),
                            Some(reg) => {
                                state.write_reg(reg, *byte);
                                pointer = Some(reg + 1);
                            }
                        }
                    }
                }
                Operation::Read(buf) => {
                    for slot in buf.iter_mut() {
                        let reg = pointer.unwrap_or(0);
                        *slot = state.read_reg(reg);
                        pointer = Some(reg + 1);
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct LocalState {
    pub low_rows: [bool; ROWS],
    pub pressed: [[bool; ONBOARD_COLS as usize]; ROWS],
    /// Rows driven low at every column read
    pub low_at_read: Vec<Vec<usize>>,
}

impl LocalState {
    pub fn selected_rows(&self) -> Vec<usize> {
        (0..ROWS).filter(|&row| self.low_rows[row]).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LocalHandle(Rc<RefCell<LocalState>>);

impl LocalHandle {
    pub fn state(&self) -> Ref<'_, LocalState> {
        self.0.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, LocalState> {
        self.0.borrow_mut()
    }

    pub fn rows(&self) -> [FakeRow; ROWS] {
        core::array::from_fn(|idx| FakeRow {
            idx,
            state: self.0.clone(),
        })
    }

    pub fn cols(&self) -> [FakeCol; ONBOARD_COLS as usize] {
        core::array::from_fn(|idx| FakeCol {
            idx,
            state: self.0.clone(),
        })
    }
}

pub struct FakeRow {
    idx: usize,
    state: Rc<RefCell<LocalState>>,
}

impl digital::ErrorType for FakeRow {
    type Error = Infallible;
}

impl OutputPin for FakeRow {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.state.borrow_mut().low_rows[self.idx] = true;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.state.borrow_mut().low_rows[self.idx] = false;
        Ok(())
    }
}

pub struct FakeCol {
    idx: usize,
    state: Rc<RefCell<LocalState>>,
}

impl digital::ErrorType for FakeCol {
    type Error = Infallible;
}

impl InputPin for FakeCol {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.is_low().map(|low| !low)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        let mut state = self.state.borrow_mut();
        let low = state.selected_rows();
        let pulled = low.iter().any(|&row| state.pressed[row][self.idx]);
        state.low_at_read.push(low);
        Ok(pulled)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeLed(Rc<RefCell<Option<bool>>>);

impl FakeLed {
    /// Last level written, `None` if never driven.
    pub fn level(&self) -> Option<bool> {
        *self.0.borrow()
    }
}

impl digital::ErrorType for FakeLed {
    type Error = Infallible;
}

impl OutputPin for FakeLed {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        *self.0.borrow_mut() = Some(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        *self.0.borrow_mut() = Some(true);
        Ok(())
    }
}
