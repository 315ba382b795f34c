use chrono::{Local, NaiveDate};

/// Source of "today", used both as chart metadata and in output file names
pub trait Clock {
    /// Current calendar date
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always returns the same date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
