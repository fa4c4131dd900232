/// Software loopback driver
///
/// Completes every transaction instantly by echoing the transmit bytes into
/// whichever receive sink the transaction configured. Useful for exercising
/// the wrapper without hardware; also what the demo binary runs against.

use log::debug;

use crate::config::SpiHost;
use crate::hal::{BusConfig, DeviceConfig, HalStatus, SpiHostDriver};
use crate::transaction::SpiTransaction;

#[derive(Debug, Default)]
pub struct LoopbackDriver {
    bus_ready: bool,
    next_handle: u32,
}

impl LoopbackDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpiHostDriver for LoopbackDriver {
    type Device = u32;

    fn bus_initialize(&mut self, host: SpiHost, _config: &BusConfig) -> HalStatus {
        debug!("Loopback bus up on {:?}", host);
        self.bus_ready = true;
        HalStatus::OK
    }

    fn device_attach(
        &mut self,
        _host: SpiHost,
        _config: &DeviceConfig,
    ) -> Result<u32, HalStatus> {
        if !self.bus_ready {
            return Err(HalStatus(-1));
        }
        self.next_handle += 1;
        Ok(self.next_handle)
    }

    fn device_detach(&mut self, _device: &mut u32) -> HalStatus {
        HalStatus::OK
    }

    fn transmit_blocking(
        &mut self,
        _device: &mut u32,
        transaction: &mut SpiTransaction<'_>,
    ) -> HalStatus {
        // The length field counts bytes on the inline path and bits on the
        // buffer path; honor both.
        let byte_count = if transaction.uses_inline_tx() {
            transaction.length()
        } else {
            transaction.length() / 8
        };

        let tx: Vec<u8> = transaction
            .inline_tx_data()
            .or(transaction.tx_buffer())
            .unwrap_or(&[])
            .iter()
            .copied()
            .take(byte_count)
            .collect();

        if let Some(rx) = transaction.rx_buffer_mut() {
            let n = tx.len().min(rx.len());
            rx[..n].copy_from_slice(&tx[..n]);
        }
        if let Some(inline) = transaction.inline_rx_data_mut() {
            let n = tx.len().min(inline.len());
            inline[..n].copy_from_slice(&tx[..n]);
        }
        HalStatus::OK
    }
}
