//! I2C backends for the PCF8574 backpack: rppal on Linux, a stub elsewhere.

use crate::{lcd_driver::I2cBus, Error, Result};

/// Backpack addresses tried in order at startup: PCF8574 then PCF8574A.
pub const ADDR_CANDIDATES: [u8; 2] = [0x27, 0x3F];

#[cfg(target_os = "linux")]
fn map_i2c_err(err: rppal::i2c::Error) -> Error {
    Error::Io(std::io::Error::other(err.to_string()))
}

/// Linux implementation using rppal's I2C.
#[cfg(target_os = "linux")]
pub struct RppalBus {
    inner: rppal::i2c::I2c,
}

#[cfg(target_os = "linux")]
impl RppalBus {
    /// Open the default I2C bus (e.g., /dev/i2c-1).
    pub fn new_default() -> Result<Self> {
        let inner = rppal::i2c::I2c::new().map_err(map_i2c_err)?;
        Ok(Self { inner })
    }

    /// Probe `candidates` in order and return the first address that
    /// acknowledges a write. Exhausting the list is a hard error: without a
    /// responding backpack the display is unusable.
    pub fn probe_address(&mut self, candidates: &[u8]) -> Result<u8> {
        for &addr in candidates {
            if self.inner.set_slave_address(addr as u16).is_ok()
                && self.inner.block_write(0, &[]).is_ok()
            {
                return Ok(addr);
            }
        }
        Err(Error::Device(format!(
            "no PCF8574 responded at {}",
            candidates
                .iter()
                .map(|a| format!("{a:#04x}"))
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }
}

#[cfg(target_os = "linux")]
impl I2cBus for RppalBus {
    fn write_byte(&mut self, addr: u8, byte: u8) -> Result<()> {
        self.inner
            .set_slave_address(addr.into())
            .map_err(map_i2c_err)?;
        self.inner.block_write(byte, &[]).map_err(map_i2c_err)
    }
}

/// Non-Linux stub to satisfy builds on dev hosts; returns errors at runtime.
#[cfg(not(target_os = "linux"))]
pub struct RppalBus;

#[cfg(not(target_os = "linux"))]
impl RppalBus {
    pub fn new_default() -> Result<Self> {
        Err(Error::Device(
            "RppalBus is only available on Linux targets".into(),
        ))
    }

    pub fn probe_address(&mut self, _candidates: &[u8]) -> Result<u8> {
        Err(Error::Device(
            "RppalBus is only available on Linux targets".into(),
        ))
    }
}

#[cfg(not(target_os = "linux"))]
impl I2cBus for RppalBus {
    fn write_byte(&mut self, _addr: u8, _byte: u8) -> Result<()> {
        Err(Error::Device(
            "RppalBus is only available on Linux targets".into(),
        ))
    }
}
