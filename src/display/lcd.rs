//! LCD facade that drives the HD44780 over I2C on Linux and falls back to
//! an in-memory stub on other platforms.

use crate::{config::Pcf8574Addr, display::TextDisplay, Result};

#[cfg(target_os = "linux")]
use crate::lcd_driver::{
    self,
    pcf8574::{RppalBus, ADDR_CANDIDATES},
};

pub struct Lcd {
    cols: u8,
    rows: u8,
    #[cfg(target_os = "linux")]
    driver: lcd_driver::Hd44780<RppalBus>,
    #[cfg(not(target_os = "linux"))]
    lines: Vec<String>,
    #[cfg(not(target_os = "linux"))]
    backlight_on: bool,
    #[cfg(not(target_os = "linux"))]
    clears: usize,
}

impl Lcd {
    /// Open the display. With `Pcf8574Addr::Auto` the backpack address
    /// candidates are probed in order; failure to find any is fatal.
    pub fn new(cols: u8, rows: u8, pcf_addr: Pcf8574Addr) -> Result<Self> {
        #[cfg(target_os = "linux")]
        {
            let mut bus = RppalBus::new_default()?;
            let addr = match pcf_addr {
                Pcf8574Addr::Auto => bus.probe_address(&ADDR_CANDIDATES)?,
                Pcf8574Addr::Addr(a) => bus.probe_address(&[a])?,
            };
            eprintln!("pcf8574 addr: 0x{addr:02x}");
            let driver = lcd_driver::Hd44780::new(bus, addr, cols, rows)?;
            Ok(Self { cols, rows, driver })
        }

        #[cfg(not(target_os = "linux"))]
        {
            let _ = pcf_addr;
            Ok(Self {
                cols,
                rows,
                lines: vec![String::new(); rows as usize],
                backlight_on: true,
                clears: 0,
            })
        }
    }

    #[cfg(not(target_os = "linux"))]
    pub fn last_lines(&self) -> &[String] {
        &self.lines
    }

    #[cfg(not(target_os = "linux"))]
    pub fn clear_count(&self) -> usize {
        self.clears
    }

    #[cfg(not(target_os = "linux"))]
    pub fn last_backlight(&self) -> bool {
        self.backlight_on
    }
}

impl TextDisplay for Lcd {
    fn cols(&self) -> u8 {
        self.cols
    }

    fn rows(&self) -> u8 {
        self.rows
    }

    fn clear(&mut self) -> Result<()> {
        #[cfg(target_os = "linux")]
        {
            self.driver.clear()
        }
        #[cfg(not(target_os = "linux"))]
        {
            self.clears += 1;
            self.lines.iter_mut().for_each(String::clear);
            Ok(())
        }
    }

    fn set_backlight(&mut self, on: bool) -> Result<()> {
        #[cfg(target_os = "linux")]
        {
            if on {
                self.driver.backlight_on()
            } else {
                self.driver.backlight_off()
            }
        }
        #[cfg(not(target_os = "linux"))]
        {
            self.backlight_on = on;
            Ok(())
        }
    }

    fn write_row(&mut self, row: u8, text: &str) -> Result<()> {
        if row >= self.rows {
            return Err(crate::Error::Device(format!(
                "row {row} out of bounds for display with {} rows",
                self.rows
            )));
        }

        #[cfg(target_os = "linux")]
        {
            self.driver.write_row(row, text)
        }
        #[cfg(not(target_os = "linux"))]
        {
            self.lines[row as usize] = text.chars().take(self.cols as usize).collect();
            Ok(())
        }
    }
}
