use embedded_hal::i2c::ErrorKind;

/// Why the last expander transaction failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BusFault {
    /// Address or data byte not acknowledged, usually the right half is unplugged.
    Nack,
    ArbitrationLoss,
    Bus,
    Overrun,
    /// Anything the HAL can't classify, timeouts included.
    ///
    /// `embedded-hal` has no timeout kind, and a blocking driver without its
    /// own deadline never returns on a stalled bus. Such a stall hangs the
    /// scan, so the firmware bounds it with a watchdog reset.
    Other,
}

impl From<ErrorKind> for BusFault {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoAcknowledge(_) => Self::Nack,
            ErrorKind::ArbitrationLoss => Self::ArbitrationLoss,
            ErrorKind::Bus => Self::Bus,
            ErrorKind::Overrun => Self::Overrun,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum LinkStatus {
    /// Before the first successful init, the expander is presumed absent.
    #[default]
    Unknown,
    Ok,
    Failed(BusFault),
}

impl LinkStatus {
    #[inline]
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    #[inline]
    #[must_use]
    pub fn from_result<T>(res: &Result<T, BusFault>) -> Self {
        match res {
            Ok(_) => Self::Ok,
            Err(fault) => Self::Failed(*fault),
        }
    }
}

/// Counts scan passes while the link is down, a re-init is due on every wrap.
#[derive(Debug, Copy, Clone, Default)]
pub struct RetryCounter(u8);

impl RetryCounter {
    pub const PERIOD: u32 = u8::MAX as u32 + 1;

    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    #[inline]
    pub fn tick(&mut self) -> bool {
        self.0 = self.0.wrapping_add(1);
        self.0 == 0
    }
}
