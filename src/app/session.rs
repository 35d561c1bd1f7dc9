//! One message on screen for a bounded hold, lights running, then back to
//! the countdown header.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::Duration;

use super::Logger;
use crate::{
    display::{screen::Screen, TextDisplay},
    format::format_to_lines,
    lights::LightEffect,
};

pub(super) struct MessageSession<'a, D: TextDisplay> {
    pub screen: &'a mut Screen<D>,
    pub lights: &'a mut LightEffect,
    pub header: &'a str,
    pub logger: &'a Logger,
    pub tick: Duration,
}

impl<D: TextDisplay> MessageSession<'_, D> {
    /// Clear, render the message across all rows, hold, then restore the
    /// header. Device trouble cannot abort the sequence: writes are
    /// best-effort and the lights/header steps always run.
    pub(super) fn show(&mut self, text: &str, hold_secs: u64, running: &Arc<AtomicBool>) {
        let lines = format_to_lines(text, self.screen.cols(), self.screen.rows());
        self.screen.clear();
        for (idx, line) in lines.iter().enumerate() {
            self.screen.write_row(idx as u8, line);
        }

        self.lights.start(self.logger);
        self.logger.debug(format!(
            "holding message for {}",
            humantime::format_duration(Duration::from_secs(hold_secs))
        ));
        for _ in 0..hold_secs {
            if !running.load(Ordering::SeqCst) {
                break;
            }
            thread::sleep(self.tick);
        }
        self.lights.stop(self.logger);

        self.screen.write_row(0, self.header);
    }
}
