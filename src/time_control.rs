use std::fmt;

use chrono::{Datelike, Days, NaiveDate};
use serde::Deserialize;

use crate::data::filter::Cutoff;

/// How the slider value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimeMode {
    /// One slider step per day between 1990-01-01 and 2024-12-31.
    #[default]
    Date,
    /// The slider value is the year itself, 2010..=2024.
    Year,
}

impl fmt::Display for TimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeMode::Date => write!(f, "date"),
            TimeMode::Year => write!(f, "year"),
        }
    }
}

pub const DATE_MIN: (i32, u32, u32) = (1990, 1, 1);
pub const DATE_MAX: (i32, u32, u32) = (2024, 12, 31);
pub const YEAR_MIN: i32 = 2010;
pub const YEAR_MAX: i32 = 2024;

fn ymd((y, m, d): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// The slider behind the time cutoff.
///
/// Only the range and the current value are stored; the cutoff is derived.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeControl {
    mode: TimeMode,
    origin: NaiveDate,
    min: i64,
    max: i64,
    value: i64,
}

impl TimeControl {
    /// A control of the given mode, initialised to its maximum.
    pub fn new(mode: TimeMode) -> Self {
        match mode {
            TimeMode::Date => {
                let origin = ymd(DATE_MIN);
                let max = (ymd(DATE_MAX) - origin).num_days();
                TimeControl {
                    mode,
                    origin,
                    min: 0,
                    max,
                    value: max,
                }
            }
            TimeMode::Year => TimeControl {
                mode,
                origin: ymd(DATE_MIN),
                min: YEAR_MIN as i64,
                max: YEAR_MAX as i64,
                value: YEAR_MAX as i64,
            },
        }
    }

    pub fn mode(&self) -> TimeMode {
        self.mode
    }

    pub fn range(&self) -> std::ops::RangeInclusive<i64> {
        self.min..=self.max
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// Move the slider; out-of-range positions are clamped.
    pub fn set_value(&mut self, value: i64) {
        self.value = value.clamp(self.min, self.max);
    }

    /// Move the slider to a calendar date (date mode) or that date's year.
    pub fn set_date(&mut self, date: NaiveDate) {
        match self.mode {
            TimeMode::Date => self.set_value((date - self.origin).num_days()),
            TimeMode::Year => self.set_value(date.year() as i64),
        }
    }

    pub fn cutoff(&self) -> Cutoff {
        match self.mode {
            TimeMode::Date => Cutoff::Date(self.date_at(self.value)),
            TimeMode::Year => Cutoff::Year(self.value as i32),
        }
    }

    /// Heading above the slider. The date cutoff is inclusive.
    pub fn title(&self) -> &'static str {
        match self.mode {
            TimeMode::Date => "Opened on or before",
            TimeMode::Year => "Year",
        }
    }

    /// Text shown next to the slider.
    pub fn label(&self) -> String {
        match self.cutoff() {
            Cutoff::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cutoff::Year(y) => y.to_string(),
        }
    }

    fn date_at(&self, days: i64) -> NaiveDate {
        u64::try_from(days)
            .ok()
            .and_then(|d| self.origin.checked_add_days(Days::new(d)))
            .unwrap_or(self.origin)
    }
}
