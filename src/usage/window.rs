//! Month-to-date billing window.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

/// Half-open interval `[start, end)` covering the first day of the month through `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BillingWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    today: NaiveDate,
}

impl BillingWindow {
    /// Window for the month containing `today`, including `today` itself.
    pub fn month_to_date(today: NaiveDate) -> Self {
        let first = today.with_day(1).unwrap_or(today);
        let next_day = today.succ_opt().unwrap_or(today);
        Self {
            start: first.and_time(NaiveTime::MIN).and_utc(),
            end: next_day.and_time(NaiveTime::MIN).and_utc(),
            today,
        }
    }

    /// Window for the current UTC date.
    pub fn current() -> Self {
        Self::month_to_date(Utc::now().date_naive())
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }
}
