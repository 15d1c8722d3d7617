#[cfg(feature = "serial")]
mod console;

use crate::keyboard::KeyboardBoard;
use b1t_lib::rate::ScanRate;
use b1t_lib::{LayerState, LedState, NoUserHooks};
use fugit::MicrosDurationU32;
use log::{debug, info};
use rp2040_hal::{Timer, Watchdog};

/// Base layer only.
const DEFAULT_LAYERS: LayerState = 0b1;

/// Covers the expander's power-up settle, a pass that blows it is stuck on the bus.
const WATCHDOG_PERIOD: MicrosDurationU32 = MicrosDurationU32::millis(2_000);

#[inline(never)]
pub fn run(
    mut board: KeyboardBoard,
    timer: Timer,
    mut watchdog: Watchdog,
    #[cfg(feature = "serial")] usb_bus: &usb_device::bus::UsbBusAllocator<
        rp2040_hal::usb::UsbBus,
    >,
) -> ! {
    // The blocking I2C driver has no timeout, a held-down SCL resets the chip instead
    watchdog.start(WATCHDOG_PERIOD);
    let mut user = NoUserHooks;

    // Settles the expander before USB comes up, so enumeration is polled from the start
    board.init();
    board.on_layer_change(DEFAULT_LAYERS, &mut user);
    board.on_lock_change(LedState::default(), &mut user);
    info!("b1t running, link {:?}", board.link_status());

    #[cfg(feature = "serial")]
    let mut console = console::Console::new(usb_bus, DEFAULT_LAYERS);

    let mut previous = *board.matrix();
    let mut rate: ScanRate<10_000> = ScanRate::new(timer.get_counter());
    loop {
        watchdog.feed();
        if board.scan() {
            for change in board.matrix().changes_since(&previous) {
                debug!(
                    "key {}/{} {}",
                    change.index.row().value(),
                    change.index.col().value(),
                    if change.pressed { "down" } else { "up" }
                );
            }
            previous = *board.matrix();
        }
        if let Some(report) = rate.record(timer.get_counter()) {
            info!(
                "{} scans/s, {}us each",
                report.scans_per_second(),
                report.micros_per_scan()
            );
        }
        #[cfg(feature = "serial")]
        console.service(&mut board, &mut user);
    }
}
