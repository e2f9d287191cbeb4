//! Which budget month is on screen.
//!
//! Selecting the current calendar month makes sure it has budgets, copying
//! them forward from the last month that has some. Browsing any other month
//! never writes anything.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{CarryForward, Engine, Period, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodController {
    selected: Period,
    periods_with_data: Vec<Period>,
}

impl PeriodController {
    /// Starts on the month containing `today` and loads the month list.
    pub async fn load(engine: &Engine, today: NaiveDate) -> ResultEngine<Self> {
        let mut controller = Self {
            selected: Period::containing(today),
            periods_with_data: Vec::new(),
        };
        controller.select(engine, Period::containing(today), today).await?;
        Ok(controller)
    }

    pub fn selected(&self) -> Period {
        self.selected
    }

    pub fn periods_with_data(&self) -> &[Period] {
        &self.periods_with_data
    }

    /// Moves the selection to `period`.
    ///
    /// A failed carry-forward is logged and ignored: the month then shows no
    /// budgets. Only reading the month list can fail.
    pub async fn select(
        &mut self,
        engine: &Engine,
        period: Period,
        today: NaiveDate,
    ) -> ResultEngine<Option<CarryForward>> {
        self.selected = period;
        let mut outcome = None;
        if period == Period::containing(today) {
            match engine.ensure_period_has_data(period).await {
                Ok(result) => outcome = Some(result),
                Err(err) => tracing::warn!("carry-forward into {period} failed: {err}"),
            }
        }
        self.periods_with_data = engine.periods_with_data().await?;
        Ok(outcome)
    }
}
