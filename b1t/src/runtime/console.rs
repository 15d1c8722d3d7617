use crate::keyboard::usb_serial::{UsbSerial, UsbSerialDevice};
use crate::keyboard::KeyboardBoard;
use b1t_lib::{Command, CommandReader, LayerState, LedState, UserHooks};
use log::info;
use rp2040_hal::rom_data::reset_to_usb_boot;
use rp2040_hal::usb::UsbBus;
use usb_device::bus::UsbBusAllocator;

pub struct Console<'a> {
    serial: UsbSerial<'a>,
    dev: UsbSerialDevice<'a>,
    reader: CommandReader,
    output: bool,
    layers: LayerState,
    leds: LedState,
}

impl<'a> Console<'a> {
    pub fn new(usb_bus: &'a UsbBusAllocator<UsbBus>, layers: LayerState) -> Self {
        // Ordering here is extremely important, serial before device.
        let serial = UsbSerial::new(usb_bus);
        let dev = UsbSerialDevice::new(usb_bus);
        Self {
            serial,
            dev,
            reader: CommandReader::new(),
            output: false,
            layers,
            leds: LedState::default(),
        }
    }

    pub fn service(&mut self, board: &mut KeyboardBoard, user: &mut impl UserHooks) {
        if self.dev.poll(&mut self.serial) {
            let mut buf = [0u8; 64];
            let count = self.serial.read(&mut buf);
            for byte in &buf[..count] {
                if let Some(cmd) = self.reader.push(*byte) {
                    self.apply(cmd, board, user);
                }
            }
        }
        if self.output {
            crate::debugger::drain(|content| self.serial.write_some(content));
        }
    }

    fn apply(&mut self, cmd: Command, board: &mut KeyboardBoard, user: &mut impl UserHooks) {
        match cmd {
            Command::Output => {
                self.output = true;
                info!("output on");
            }
            Command::Boot => {
                reset_to_usb_boot(0, 0);
            }
            Command::Layer(layer) => {
                let state: LayerState = 1 | (1 << layer);
                self.layers = board.on_layer_change(state, user);
                info!("layer {layer}, state {:#b}", self.layers);
            }
            Command::Caps => {
                self.leds = self.leds.with_caps_lock(!self.leds.caps_lock());
                let handled = board.on_lock_change(self.leds, user);
                info!("caps lock {}, handled {handled}", self.leds.caps_lock());
            }
        }
    }
}
