/// SPI master wrapper
///
/// A thin blocking abstraction over a microcontroller SPI master peripheral:
/// one shared bus, one logical device per [`SpiDevice`] with its own clock,
/// mode and chip-select, and synchronous transactions described by
/// [`SpiTransaction`]. The peripheral driver itself is consumed through the
/// [`hal::SpiHostDriver`] trait; [`loopback::LoopbackDriver`] provides a
/// software implementation for tests and demos.

pub mod config;
pub mod device;
pub mod hal;
pub mod loopback;
pub mod transaction;

// Re-export main types for convenience
pub use config::{SpiConfig, SpiHost, SpiMode, SpiPins};
pub use device::{SetupError, SpiDevice};
pub use hal::{HalStatus, SpiHostDriver};
pub use transaction::{SpiTransaction, TransactionError, INLINE_CAPACITY};
