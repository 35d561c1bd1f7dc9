//! Time-to-Christmas math. Pure; callers supply "now" so the rollover
//! behavior is testable at fixed instants.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Remaining time until the next Dec 25 00:00:00, split for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownValue {
    pub days: i64,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl CountdownValue {
    pub fn total_seconds(&self) -> i64 {
        self.days * 86_400 + i64::from(self.hours) * 3_600 + i64::from(self.minutes) * 60
            + i64::from(self.seconds)
    }
}

/// Countdown to the next Christmas relative to `now`. Targets Dec 25 of the
/// current year, rolling to next year once the current moment is past it.
pub fn time_to_christmas(now: NaiveDateTime) -> CountdownValue {
    let mut target = christmas_of(now.year());
    if now > target {
        target = christmas_of(now.year() + 1);
    }

    let remaining = target - now;
    let days = remaining.num_days();
    let intra_day = remaining.num_seconds() - days * 86_400;
    CountdownValue {
        days,
        hours: (intra_day / 3_600) as u32,
        minutes: (intra_day % 3_600 / 60) as u32,
        seconds: (intra_day % 60) as u32,
    }
}

fn christmas_of(year: i32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, 12, 25)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .expect("Dec 25 midnight exists in every year")
}
