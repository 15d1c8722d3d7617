use core::cell::RefCell;
use core::fmt::Write;
use critical_section::Mutex;
use log::{LevelFilter, Metadata, Record};

const DEBUG_BUFFER_SIZE: usize = 4096;

static DEBUG_BUFFER: Mutex<RefCell<DebugBuffer>> = Mutex::new(RefCell::new(DebugBuffer::new()));

static LOGGER: BufferLogger = BufferLogger;

/// Log lines waiting for the serial console, dropped when full.
pub(crate) struct DebugBuffer {
    inner: [u8; DEBUG_BUFFER_SIZE],
    offset: usize,
}

impl Write for DebugBuffer {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let buf = s.as_bytes();
        let avail = &mut self.inner[self.offset..];
        if avail.len() >= buf.len() {
            avail[..buf.len()].copy_from_slice(buf);
            self.offset += buf.len();
        }
        Ok(())
    }
}

impl DebugBuffer {
    pub(crate) const fn new() -> Self {
        Self {
            inner: [0u8; DEBUG_BUFFER_SIZE],
            offset: 0,
        }
    }

    /// Hands the buffered bytes to `func`, which returns how many it consumed.
    #[inline]
    pub(crate) fn use_content<F: FnOnce(&[u8]) -> usize>(&mut self, func: F) {
        let used = func(&self.inner[..self.offset]).min(self.offset);
        self.inner.copy_within(used..self.offset, 0);
        self.offset -= used;
    }
}

struct BufferLogger;

impl log::Log for BufferLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        critical_section::with(|cs| {
            let mut buf = DEBUG_BUFFER.borrow_ref_mut(cs);
            let _ = buf.write_fmt(format_args!("[{}] {}\r\n", record.level(), record.args()));
        });
    }

    fn flush(&self) {}
}

pub(crate) fn init_logger() {
    // Single core, called once before anything logs
    unsafe {
        let _ = log::set_logger_racy(&LOGGER);
        log::set_max_level_racy(LevelFilter::Debug);
    }
}

/// Moves as much buffered output as `sink` accepts.
pub(crate) fn drain<F: FnOnce(&[u8]) -> usize>(sink: F) {
    critical_section::with(|cs| DEBUG_BUFFER.borrow_ref_mut(cs).use_content(sink));
}
