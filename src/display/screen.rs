//! Row-level renderer over a [`TextDisplay`].
//!
//! Every write pads or truncates to exactly the display width so a shorter
//! new string fully overwrites a longer previous one. Device failures are
//! swallowed: an unplugged display must never take the control loop down.

use crate::display::TextDisplay;

pub struct Screen<D: TextDisplay> {
    device: D,
}

impl<D: TextDisplay> Screen<D> {
    pub fn new(device: D) -> Self {
        Self { device }
    }

    pub fn cols(&self) -> usize {
        self.device.cols() as usize
    }

    pub fn rows(&self) -> usize {
        self.device.rows() as usize
    }

    /// Write one row, padded/truncated to exactly the display width.
    /// Device errors make this a no-op.
    pub fn write_row(&mut self, row: u8, text: &str) {
        if usize::from(row) >= self.rows() {
            return;
        }
        let padded = pad_to_width(text, self.cols());
        let _ = self.device.write_row(row, &padded);
    }

    pub fn clear(&mut self) {
        let _ = self.device.clear();
    }

    pub fn backlight_on(&mut self) {
        let _ = self.device.set_backlight(true);
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn into_device(self) -> D {
        self.device
    }
}

fn pad_to_width(text: &str, width: usize) -> String {
    let mut padded: String = text.chars().take(width).collect();
    let len = padded.chars().count();
    padded.extend(std::iter::repeat(' ').take(width - len));
    padded
}

/// In-memory display used across the crate's tests: records every write so
/// change-skipping and session flows can be asserted on.
#[cfg(test)]
pub(crate) struct FakeDisplay {
    pub cols: u8,
    pub rows: u8,
    pub writes: Vec<(u8, String)>,
    pub clears: usize,
    pub backlight: Vec<bool>,
    pub fail_writes: bool,
}

#[cfg(test)]
impl FakeDisplay {
    pub fn new() -> Self {
        Self {
            cols: 20,
            rows: 4,
            writes: Vec::new(),
            clears: 0,
            backlight: Vec::new(),
            fail_writes: false,
        }
    }

    pub fn writes_to_row(&self, row: u8) -> Vec<&str> {
        self.writes
            .iter()
            .filter(|(r, _)| *r == row)
            .map(|(_, text)| text.as_str())
            .collect()
    }
}

#[cfg(test)]
impl TextDisplay for FakeDisplay {
    fn cols(&self) -> u8 {
        self.cols
    }

    fn rows(&self) -> u8 {
        self.rows
    }

    fn clear(&mut self) -> crate::Result<()> {
        self.clears += 1;
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> crate::Result<()> {
        self.backlight.push(on);
        Ok(())
    }

    fn write_row(&mut self, row: u8, text: &str) -> crate::Result<()> {
        if self.fail_writes {
            return Err(crate::Error::Device("simulated device failure".into()));
        }
        self.writes.push((row, text.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_short_text_to_exact_width() {
        let mut screen = Screen::new(FakeDisplay::new());
        screen.write_row(1, "hi");
        let device = screen.into_device();
        assert_eq!(device.writes.len(), 1);
        let written = &device.writes[0].1;
        assert_eq!(written.chars().count(), 20);
        assert!(written.starts_with("hi "));
    }

    #[test]
    fn truncates_long_text_to_exact_width() {
        let mut screen = Screen::new(FakeDisplay::new());
        screen.write_row(0, "this text is far too long for a twenty column row");
        let device = screen.into_device();
        assert_eq!(device.writes[0].1.chars().count(), 20);
        assert_eq!(device.writes[0].1, "this text is far too");
    }

    #[test]
    fn exact_width_text_is_untouched() {
        let mut screen = Screen::new(FakeDisplay::new());
        screen.write_row(0, "exactly--twenty--ch!");
        let device = screen.into_device();
        assert_eq!(device.writes[0].1, "exactly--twenty--ch!");
    }

    #[test]
    fn out_of_bounds_row_is_a_noop() {
        let mut screen = Screen::new(FakeDisplay::new());
        screen.write_row(4, "nope");
        assert!(screen.device().writes.is_empty());
    }

    #[test]
    fn device_failure_is_swallowed() {
        let mut display = FakeDisplay::new();
        display.fail_writes = true;
        let mut screen = Screen::new(display);
        screen.write_row(0, "doomed");
        screen.clear();
        assert_eq!(screen.device().clears, 1);
    }
}
