use anyhow::Result;
use log::info;

use esp_spi_wrapper::loopback::LoopbackDriver;
use esp_spi_wrapper::{SpiConfig, SpiDevice, SpiTransaction};

fn main() -> Result<()> {
    init_logger();

    // Optional YAML config as the first argument; defaults otherwise.
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            SpiConfig::from_yaml_file(&path)?
        }
        None => SpiConfig::default(),
    };

    let mut device = SpiDevice::new(LoopbackDriver::new(), &config)?;

    // Buffer-mode full-duplex exchange.
    let tx = [0xDE, 0xAD, 0xBE, 0xEF, 0x42];
    let mut rx = [0u8; 5];
    let mut transaction = SpiTransaction::new();
    transaction.set_transmit_buffer(&tx);
    transaction.set_receive_buffer(&mut rx);
    let status = device.submit(transaction);
    info!("Buffer transfer finished with status {}, rx={:02x?}", status, rx);

    // Inline short transfer through the controller's data registers.
    let mut short_rx = [0u8; 2];
    let mut transaction = SpiTransaction::new();
    transaction.set_transmit_inline(&[0xAB, 0xCD])?;
    transaction.set_receive_buffer(&mut short_rx);
    let status = device.submit(transaction);
    info!(
        "Inline transfer finished with status {}, rx={:02x?}",
        status, short_rx
    );

    let status = device.detach();
    info!("Device detached with status {}", status);
    Ok(())
}

fn init_logger() {
    // Use `env_logger` for logging.
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
}
