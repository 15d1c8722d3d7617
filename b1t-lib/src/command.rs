//! Debug console commands, picked out of a raw serial byte stream.

const TAIL_LEN: usize = 16;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Command {
    /// Start streaming log lines.
    Output,
    /// Reset into the USB bootloader.
    Boot,
    /// Show layer `n` as the top layer.
    Layer(u8),
    /// Flip caps lock.
    Caps,
}

/// Keeps the last few received bytes and matches commands against their tail.
///
/// There is no line discipline, a command is recognised as soon as its last
/// byte arrives.
pub struct CommandReader {
    last_chars: [u8; TAIL_LEN],
}

impl CommandReader {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_chars: [0; TAIL_LEN],
        }
    }

    pub fn push(&mut self, byte: u8) -> Option<Command> {
        self.last_chars.copy_within(1..TAIL_LEN, 0);
        self.last_chars[TAIL_LEN - 1] = byte;
        let cmd = if self.last_chars.ends_with(b"boot") {
            Command::Boot
        } else if self.last_chars.ends_with(b"output") {
            Command::Output
        } else if self.last_chars.ends_with(b"caps") {
            Command::Caps
        } else if byte.is_ascii_digit() && self.last_chars[..TAIL_LEN - 1].ends_with(b"layer") {
            Command::Layer(byte - b'0')
        } else {
            return None;
        };
        // Don't let the same bytes match twice
        self.last_chars = [0; TAIL_LEN];
        Some(cmd)
    }
}
