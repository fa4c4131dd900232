/// Hardware-access boundary for the SPI host driver
///
/// The wrapper never talks to registers itself; it builds the raw bus and
/// device records below and calls through [`SpiHostDriver`]. A production
/// build implements the trait over the vendor driver (on ESP-IDF,
/// `spi_bus_initialize` / `spi_bus_add_device` / `spi_device_transmit`);
/// tests and the demo binary implement it in software.

use std::fmt;

use crate::config::SpiHost;
use crate::transaction::SpiTransaction;

/// GPIO number, or -1 for an unused line.
pub const GPIO_UNUSED: i32 = -1;

/// Raw status code from the host driver. The wrapper passes these through
/// unmodified; interpreting non-zero codes is the caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalStatus(pub i32);

impl HalStatus {
    pub const OK: HalStatus = HalStatus(0);

    pub fn is_ok(self) -> bool {
        self == Self::OK
    }
}

impl fmt::Display for HalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw bus record handed to `bus_initialize`. One bus is shared by every
/// device attached to the same host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusConfig {
    pub mosi_io_num: i32,
    pub miso_io_num: i32,
    pub sclk_io_num: i32,
    /// Quad-SPI write-protect line; not used by this wrapper.
    pub quadwp_io_num: i32,
    /// Quad-SPI hold line; not used by this wrapper.
    pub quadhd_io_num: i32,
    /// 0 lets the driver pick its default maximum transfer size.
    pub max_transfer_sz: usize,
}

/// Raw device record handed to `device_attach`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub command_bits: u8,
    pub address_bits: u8,
    pub dummy_bits: u8,
    pub mode: u8,
    pub duty_cycle_pos: u16,
    pub cs_ena_pretrans: u16,
    pub cs_ena_posttrans: u8,
    pub clock_speed_hz: u32,
    pub spics_io_num: i32,
    /// Device-specific flags byte, passed through uninterpreted.
    pub flags: u8,
    /// Number of transactions that may be in flight. The wrapper always
    /// sets 1: every submit blocks until the hardware is done.
    pub queue_size: usize,
}

/// The peripheral driver, consumed as an opaque service.
///
/// `transmit_blocking` must not return until the electrical transfer has
/// completed (success or failure); the wrapper adds no timeout of its own.
/// Interleaved calls from multiple threads are not serialized here.
pub trait SpiHostDriver {
    /// Opaque handle for an attached device.
    type Device;

    fn bus_initialize(&mut self, host: SpiHost, config: &BusConfig) -> HalStatus;

    fn device_attach(
        &mut self,
        host: SpiHost,
        config: &DeviceConfig,
    ) -> Result<Self::Device, HalStatus>;

    fn device_detach(&mut self, device: &mut Self::Device) -> HalStatus;

    fn transmit_blocking(
        &mut self,
        device: &mut Self::Device,
        transaction: &mut SpiTransaction<'_>,
    ) -> HalStatus;
}
