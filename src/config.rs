use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// SPI clock polarity/phase, modes 0 through 3.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpiMode {
    #[default]
    Mode0,
    Mode1,
    Mode2,
    Mode3,
}

impl SpiMode {
    pub fn as_u8(self) -> u8 {
        match self {
            SpiMode::Mode0 => 0,
            SpiMode::Mode1 => 1,
            SpiMode::Mode2 => 2,
            SpiMode::Mode3 => 3,
        }
    }
}

impl TryFrom<u8> for SpiMode {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(SpiMode::Mode0),
            1 => Ok(SpiMode::Mode1),
            2 => Ok(SpiMode::Mode2),
            3 => Ok(SpiMode::Mode3),
            other => Err(anyhow::anyhow!("invalid SPI mode: {}", other)),
        }
    }
}

/// Host SPI peripheral instance. SPI1 is usually claimed by flash on these
/// controllers; the secondary host is the default for external devices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpiHost {
    Spi1,
    #[default]
    Spi2,
    Spi3,
}

/// GPIO assignments for the bus lines plus the device's chip-select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpiPins {
    pub sclk: u32,
    pub miso: u32,
    pub mosi: u32,
    pub cs: u32,
}

/// Electrical configuration for one device on a shared bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiConfig {
    pub clock_hz: u32,
    pub mode: SpiMode,
    pub pins: SpiPins,
    pub host: SpiHost,
    /// Opaque device-flags byte handed to the host driver uninterpreted.
    pub device_flags: u8,
}

impl SpiConfig {
    /// Load a configuration from a YAML file.
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path))?;
        serde_yaml::from_str(&content).context("Failed to parse configuration file")
    }
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            clock_hz: 1_000_000,
            mode: SpiMode::Mode0,
            pins: SpiPins {
                sclk: 18,
                miso: 19,
                mosi: 23,
                cs: 5,
            },
            host: SpiHost::Spi2,
            device_flags: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SpiConfig::default();
        assert_eq!(config.clock_hz, 1_000_000);
        assert_eq!(config.mode, SpiMode::Mode0);
        assert_eq!(config.host, SpiHost::Spi2);
        assert_eq!(config.device_flags, 0);
    }

    #[test]
    fn test_mode_round_trip() {
        for raw in 0..=3u8 {
            let mode = SpiMode::try_from(raw).unwrap();
            assert_eq!(mode.as_u8(), raw);
        }
        assert!(SpiMode::try_from(4).is_err());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
clock_hz: 8000000
mode: Mode3
pins:
  sclk: 14
  miso: 12
  mosi: 13
  cs: 15
host: Spi3
device_flags: 4
"#;
        let config: SpiConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.clock_hz, 8_000_000);
        assert_eq!(config.mode, SpiMode::Mode3);
        assert_eq!(config.pins.cs, 15);
        assert_eq!(config.host, SpiHost::Spi3);
        assert_eq!(config.device_flags, 4);
    }
}
