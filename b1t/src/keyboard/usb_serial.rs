use rp2040_hal::usb::UsbBus;
use usb_device::bus::UsbBusAllocator;
use usb_device::device::{UsbDevice, UsbDeviceBuilder, UsbVidPid};
use usbd_serial::SerialPort;

pub struct UsbSerial<'a> {
    pub(crate) inner: SerialPort<'a, UsbBus>,
}

impl<'a> UsbSerial<'a> {
    pub fn new(usb_bus: &'a UsbBusAllocator<UsbBus>) -> Self {
        // Set up the USB Communications Class Device driver
        let inner = SerialPort::new(usb_bus);
        Self { inner }
    }

    /// Writes what the host will take right now, returns how much that was.
    pub fn write_some(&mut self, buf: &[u8]) -> usize {
        // WouldBlock included, the bytes stay with the caller
        self.inner.write(buf).unwrap_or(0)
    }

    #[inline]
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        self.inner.read(buf).unwrap_or(0)
    }
}

pub struct UsbSerialDevice<'a> {
    pub(crate) inner: UsbDevice<'a, UsbBus>,
}

impl<'a> UsbSerialDevice<'a> {
    pub fn new(usb_bus: &'a UsbBusAllocator<UsbBus>) -> Self {
        let inner = UsbDeviceBuilder::new(usb_bus, UsbVidPid(0x16c0, 0x27dd))
            .manufacturer("b1t")
            .product("b1t debug console")
            .serial_number("1")
            .device_class(usbd_serial::USB_CLASS_CDC)
            .build();
        Self { inner }
    }

    /// Services the bus, true if the serial port may have data.
    #[inline]
    pub fn poll(&mut self, serial: &mut UsbSerial) -> bool {
        self.inner.poll(&mut [&mut serial.inner])
    }
}
