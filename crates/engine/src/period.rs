//! Calendar periods and the date windows spend is computed over.
//!
//! All comparisons use calendar dates only; a window is inclusive on both
//! ends (`first day ..= last day`).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// A budget month.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> ResultEngine<Self> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::Validation(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(EngineError::Validation(format!("year out of range: {year}")));
        }
        Ok(Self { year, month })
    }

    /// The period containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(self) -> ResultEngine<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .ok_or_else(|| EngineError::Validation(format!("invalid period {self:?}")))
    }

    pub fn last_day(self) -> ResultEngine<NaiveDate> {
        self.next()
            .first_day()?
            .pred_opt()
            .ok_or_else(|| EngineError::Validation(format!("invalid period {self:?}")))
    }

    #[must_use]
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    #[must_use]
    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Which budget a window belongs to; selects the exclusion flag honoured
/// by the aggregator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetKind {
    Monthly,
    Yearly,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// The selected month only.
    Monthly,
    /// January 1 through the end of the selected month.
    Yearly,
    /// January 1 through the end of the month before the selected one.
    YearlyPreviousMonths,
}

impl WindowMode {
    pub fn budget_kind(self) -> BudgetKind {
        match self {
            Self::Monthly => BudgetKind::Monthly,
            Self::Yearly | Self::YearlyPreviousMonths => BudgetKind::Yearly,
        }
    }
}

/// Inclusive calendar date range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub kind: BudgetKind,
}

impl DateWindow {
    /// Builds the window for `period` in `mode`.
    ///
    /// Returns `None` for `YearlyPreviousMonths` in January, where no earlier
    /// month of the same year exists.
    pub fn for_period(period: Period, mode: WindowMode) -> ResultEngine<Option<Self>> {
        let year_start = Period {
            year: period.year,
            month: 1,
        }
        .first_day()?;
        let (start, end) = match mode {
            WindowMode::Monthly => (period.first_day()?, period.last_day()?),
            WindowMode::Yearly => (year_start, period.last_day()?),
            WindowMode::YearlyPreviousMonths => {
                if period.month == 1 {
                    return Ok(None);
                }
                (year_start, period.previous().last_day()?)
            }
        };
        Ok(Some(Self {
            start,
            end,
            kind: mode.budget_kind(),
        }))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn last_day_handles_leap_years_and_december() {
        assert_eq!(Period::new(2024, 2).unwrap().last_day().unwrap(), date(2024, 2, 29));
        assert_eq!(Period::new(2023, 2).unwrap().last_day().unwrap(), date(2023, 2, 28));
        assert_eq!(Period::new(2024, 12).unwrap().last_day().unwrap(), date(2024, 12, 31));
    }

    #[test]
    fn rejects_invalid_month() {
        assert!(Period::new(2024, 0).is_err());
        assert!(Period::new(2024, 13).is_err());
    }

    #[test]
    fn next_and_previous_wrap_years() {
        let jan = Period::new(2025, 1).unwrap();
        assert_eq!(jan.previous(), Period::new(2024, 12).unwrap());
        assert_eq!(jan.previous().next(), jan);
    }

    #[test]
    fn monthly_window_is_inclusive() {
        let window = DateWindow::for_period(Period::new(2024, 3).unwrap(), WindowMode::Monthly)
            .unwrap()
            .unwrap();
        assert!(window.contains(date(2024, 3, 1)));
        assert!(window.contains(date(2024, 3, 31)));
        assert!(!window.contains(date(2024, 4, 1)));
        assert!(!window.contains(date(2024, 2, 29)));
        assert_eq!(window.kind, BudgetKind::Monthly);
    }

    #[test]
    fn yearly_windows_start_in_january() {
        let period = Period::new(2024, 5).unwrap();
        let yearly = DateWindow::for_period(period, WindowMode::Yearly)
            .unwrap()
            .unwrap();
        assert_eq!(yearly.start, date(2024, 1, 1));
        assert_eq!(yearly.end, date(2024, 5, 31));
        assert_eq!(yearly.kind, BudgetKind::Yearly);

        let previous = DateWindow::for_period(period, WindowMode::YearlyPreviousMonths)
            .unwrap()
            .unwrap();
        assert_eq!(previous.end, date(2024, 4, 30));
    }

    #[test]
    fn previous_months_window_is_empty_in_january() {
        let window = DateWindow::for_period(
            Period::new(2024, 1).unwrap(),
            WindowMode::YearlyPreviousMonths,
        )
        .unwrap();
        assert!(window.is_none());
    }
}
