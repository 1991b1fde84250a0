//! Calendar clock used for day-rollover checks

use chrono::{Local, NaiveDate};

/// Source of "today" for the progress state machine.
///
/// `Fixed` keeps tests and scripted runs deterministic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Fixed(NaiveDate),
}

impl Clock {
    /// Clock pinned to a single date
    pub fn fixed(date: NaiveDate) -> Self {
        Clock::Fixed(date)
    }

    /// Today's date in the local timezone
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::System => Local::now().date_naive(),
            Clock::Fixed(date) => *date,
        }
    }

    /// Move a fixed clock forward by whole days. No effect on `System`.
    pub fn advance_days(&mut self, days: u64) {
        if let Clock::Fixed(date) = self {
            if let Some(next) = date.checked_add_days(chrono::Days::new(days)) {
                *date = next;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_advances() {
        let start = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let mut clock = Clock::fixed(start);
        assert_eq!(clock.today(), start);
        clock.advance_days(1);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());
    }

    #[test]
    fn test_system_clock_ignores_advance() {
        let mut clock = Clock::System;
        clock.advance_days(3);
        assert_eq!(clock, Clock::System);
    }
}
