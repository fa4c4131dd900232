/// SPI device handle
///
/// `SpiDevice` owns the claim on one device slot of a shared bus for its
/// whole lifetime: construction performs exactly one bus-initialize and one
/// device-attach against the host driver, `submit` forwards transactions to
/// the driver's blocking transmit, and `detach` releases the slot.

use log::{debug, info, warn};
use thiserror::Error;

use crate::config::SpiConfig;
use crate::hal::{BusConfig, DeviceConfig, HalStatus, SpiHostDriver, GPIO_UNUSED};
use crate::transaction::SpiTransaction;

/// Hook invoked around each transfer, e.g. for GPIO bit-banging before the
/// clock starts or after it stops.
pub type TransferHook = Box<dyn for<'t> FnMut(&mut SpiTransaction<'t>)>;

/// Construction failure. A half-claimed peripheral cannot be used, so there
/// is no handle to recover; callers must treat this as fatal for the device.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("SPI bus initialization failed with status {0}")]
    BusInit(HalStatus),
    #[error("attaching the SPI device failed with status {0}")]
    DeviceAttach(HalStatus),
}

pub struct SpiDevice<D: SpiHostDriver> {
    driver: D,
    /// Always `Some` until `detach` consumes the handle; `None` only while
    /// `Drop` runs after an explicit detach.
    device: Option<D::Device>,
    pre_transfer: Option<TransferHook>,
    post_transfer: Option<TransferHook>,
}

impl<D: SpiHostDriver> std::fmt::Debug for SpiDevice<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpiDevice")
            .field("attached", &self.device.is_some())
            .field("pre_transfer", &self.pre_transfer.is_some())
            .field("post_transfer", &self.post_transfer.is_some())
            .finish_non_exhaustive()
    }
}

impl<D: SpiHostDriver> SpiDevice<D> {
    /// Initialize the bus and attach one device to it.
    ///
    /// Both driver calls must succeed. On failure nothing usable remains:
    /// the error carries the driver's raw status and no handle exists that
    /// later operations could reach.
    pub fn new(mut driver: D, config: &SpiConfig) -> Result<Self, SetupError> {
        let bus = Self::bus_record(config);
        let dev = Self::device_record(config);

        info!(
            "Initializing SPI bus on {:?} (sclk={}, miso={}, mosi={})",
            config.host, config.pins.sclk, config.pins.miso, config.pins.mosi
        );
        let status = driver.bus_initialize(config.host, &bus);
        if !status.is_ok() {
            return Err(SetupError::BusInit(status));
        }

        info!(
            "Attaching SPI device (cs={}, clock={} Hz, mode {})",
            config.pins.cs,
            config.clock_hz,
            config.mode.as_u8()
        );
        let device = driver
            .device_attach(config.host, &dev)
            .map_err(SetupError::DeviceAttach)?;

        Ok(Self {
            driver,
            device: Some(device),
            pre_transfer: None,
            post_transfer: None,
        })
    }

    fn bus_record(config: &SpiConfig) -> BusConfig {
        BusConfig {
            mosi_io_num: config.pins.mosi as i32,
            miso_io_num: config.pins.miso as i32,
            sclk_io_num: config.pins.sclk as i32,
            quadwp_io_num: GPIO_UNUSED,
            quadhd_io_num: GPIO_UNUSED,
            max_transfer_sz: 0,
        }
    }

    fn device_record(config: &SpiConfig) -> DeviceConfig {
        DeviceConfig {
            command_bits: 0,
            address_bits: 0,
            dummy_bits: 0,
            mode: config.mode.as_u8(),
            duty_cycle_pos: 0,
            cs_ena_pretrans: 0,
            cs_ena_posttrans: 0,
            clock_speed_hz: config.clock_hz,
            spics_io_num: config.pins.cs as i32,
            flags: config.device_flags,
            queue_size: 1,
        }
    }

    /// Install a hook that runs immediately before each transfer.
    pub fn set_pre_transfer_hook<F>(&mut self, hook: F)
    where
        F: for<'t> FnMut(&mut SpiTransaction<'t>) + 'static,
    {
        self.pre_transfer = Some(Box::new(hook));
    }

    /// Install a hook that runs immediately after each transfer.
    pub fn set_post_transfer_hook<F>(&mut self, hook: F)
    where
        F: for<'t> FnMut(&mut SpiTransaction<'t>) + 'static,
    {
        self.post_transfer = Some(Box::new(hook));
    }

    /// Submit one transaction and block until the hardware completes it.
    ///
    /// The descriptor is taken by value: the driver needs a stable record
    /// for the duration of the blocking call, and a per-call copy never
    /// aliases the caller's own descriptor. The driver's status comes back
    /// unmodified; no retry, no translation, no timeout at this layer.
    pub fn submit(&mut self, mut transaction: SpiTransaction<'_>) -> HalStatus {
        debug!(
            "Submitting SPI transaction, length field {}",
            transaction.length()
        );

        if let Some(hook) = self.pre_transfer.as_mut() {
            hook(&mut transaction);
        }
        let status = match self.device.as_mut() {
            Some(device) => self.driver.transmit_blocking(device, &mut transaction),
            None => HalStatus::OK,
        };
        if let Some(hook) = self.post_transfer.as_mut() {
            hook(&mut transaction);
        }
        status
    }

    /// Release the device from the bus. Consuming the handle makes double
    /// detach and submit-after-detach unrepresentable. Bus teardown is not
    /// performed: other devices may share the bus.
    pub fn detach(mut self) -> HalStatus {
        match self.device.take() {
            Some(mut device) => {
                info!("Detaching SPI device");
                self.driver.device_detach(&mut device)
            }
            None => HalStatus::OK,
        }
    }
}

impl<D: SpiHostDriver> Drop for SpiDevice<D> {
    fn drop(&mut self) {
        if let Some(mut device) = self.device.take() {
            let status = self.driver.device_detach(&mut device);
            if !status.is_ok() {
                warn!("Detach on drop failed with status {}", status);
            }
        }
    }
}
