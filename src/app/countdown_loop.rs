//! The countdown renderer: header on row 0, live values on rows 1-3,
//! updated once per second with unchanged rows skipped.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::{
    countdown::{self, CountdownValue},
    display::{screen::Screen, TextDisplay},
    host,
};

/// Tracks what rows 1-3 last showed so identical ticks issue no writes.
pub(super) struct CountdownView {
    prev: [Option<String>; 3],
}

impl CountdownView {
    pub(super) fn new() -> Self {
        Self {
            prev: [None, None, None],
        }
    }

    /// Compose and write the variable rows for one tick, skipping rows
    /// whose content matches the previous tick.
    pub(super) fn render_tick<D: TextDisplay>(
        &mut self,
        screen: &mut Screen<D>,
        now: NaiveDateTime,
        cpu: &str,
    ) {
        let value = countdown::time_to_christmas(now);
        let lines = compose_rows(&value, now, cpu);
        for (idx, line) in lines.iter().enumerate() {
            let slot = &mut self.prev[idx];
            if slot.as_deref() != Some(line.as_str()) {
                screen.write_row(idx as u8 + 1, line);
                *slot = Some(line.clone());
            }
        }
    }
}

pub(super) fn compose_rows(value: &CountdownValue, now: NaiveDateTime, cpu: &str) -> [String; 3] {
    [
        format!("{} days {} hours", value.days, value.hours),
        format!("{} minutes to xmas", value.minutes),
        format!("Time: {} CPU: {}", now.format("%H:%M"), cpu),
    ]
}

/// Run the countdown indefinitely at 1-second granularity. Returns once the
/// shutdown flag drops.
pub(super) fn run_countdown_loop<D: TextDisplay>(
    screen: &mut Screen<D>,
    header: &str,
    tick: Duration,
    running: &Arc<AtomicBool>,
) {
    screen.backlight_on();
    screen.write_row(0, header);
    let mut view = CountdownView::new();
    while running.load(Ordering::SeqCst) {
        view.render_tick(screen, chrono::Local::now().naive_local(), &host::cpu_temp());
        thread::sleep(tick);
    }
}

/// Countdown bounded to `secs` ticks, used between polls. Returns the number
/// of ticks actually rendered (short when shutdown interrupts).
pub(super) fn run_countdown_window<D: TextDisplay>(
    screen: &mut Screen<D>,
    header: &str,
    secs: u64,
    tick: Duration,
    running: &Arc<AtomicBool>,
) -> u64 {
    screen.write_row(0, header);
    let mut view = CountdownView::new();
    let mut ticks = 0;
    for _ in 0..secs {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        view.render_tick(screen, chrono::Local::now().naive_local(), &host::cpu_temp());
        ticks += 1;
        thread::sleep(tick);
    }
    ticks
}
