//! Sector budget containment.
//!
//! For every sector with a manual budget, the category budgets inside it
//! (same month) may not add up to more than the sector's amount. Auto-rollup
//! sectors derive their amount from those same category budgets and have no
//! ceiling.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

/// A sector containing the category being budgeted, as seen for one month.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorCeiling {
    pub sector_id: Uuid,
    pub sector_name: String,
    /// Effective sector budget.
    pub limit: Money,
    pub auto_rollup: bool,
    /// Budgets of the other categories of the sector, the edited one excluded.
    pub sibling_budgets: Vec<Money>,
}

impl SectorCeiling {
    /// `None` when the sum does not fit in [`Money`].
    pub fn sibling_total(&self) -> Option<Money> {
        self.sibling_budgets
            .iter()
            .copied()
            .try_fold(Money::ZERO, Money::checked_add)
    }
}

/// Rejects `proposed` if it would push any manual sector over its limit.
///
/// Sectors are checked in the given order and the first violation is
/// reported.
pub fn check_category_budget(proposed: Money, sectors: &[SectorCeiling]) -> ResultEngine<()> {
    for sector in sectors.iter().filter(|s| !s.auto_rollup) {
        let total = sector
            .sibling_total()
            .and_then(|total| total.checked_add(proposed))
            .ok_or_else(|| EngineError::Validation("budget amount too large".to_string()))?;
        if total > sector.limit {
            return Err(EngineError::Containment {
                sector: sector.sector_name.clone(),
                limit: sector.limit,
            });
        }
    }
    Ok(())
}

/// Rejects a manual sector budget below what its categories already use.
pub fn check_sector_budget(
    sector_name: &str,
    limit: Money,
    category_total: Money,
) -> ResultEngine<()> {
    if category_total > limit {
        return Err(EngineError::Containment {
            sector: sector_name.to_string(),
            limit,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sector(name: &str, limit: i64, auto_rollup: bool, siblings: &[i64]) -> SectorCeiling {
        SectorCeiling {
            sector_id: Uuid::new_v4(),
            sector_name: name.to_string(),
            limit: Money::new(limit),
            auto_rollup,
            sibling_budgets: siblings.iter().copied().map(Money::new).collect(),
        }
    }

    #[test]
    fn rejects_budget_over_sector_limit() {
        let sectors = [sector("Living", 50_000, false, &[30_000])];

        let err = check_category_budget(Money::new(25_000), &sectors).unwrap_err();
        assert_eq!(
            err,
            EngineError::Containment {
                sector: "Living".to_string(),
                limit: Money::new(50_000),
            }
        );
        assert!(check_category_budget(Money::new(20_000), &sectors).is_ok());
    }

    #[test]
    fn exact_fit_is_allowed() {
        let sectors = [sector("Living", 50_000, false, &[30_000, 10_000])];
        assert!(check_category_budget(Money::new(10_000), &sectors).is_ok());
        assert!(check_category_budget(Money::new(10_001), &sectors).is_err());
    }

    #[test]
    fn auto_rollup_sectors_are_exempt() {
        let sectors = [sector("Fun", 0, true, &[90_000])];
        assert!(check_category_budget(Money::new(1_000_000), &sectors).is_ok());
    }

    #[test]
    fn reports_first_violated_sector() {
        let sectors = [
            sector("Roomy", 100_000, false, &[]),
            sector("Tight", 1_000, false, &[500]),
            sector("Tighter", 100, false, &[]),
        ];
        let err = check_category_budget(Money::new(600), &sectors).unwrap_err();
        assert!(matches!(err, EngineError::Containment { ref sector, .. } if sector == "Tight"));
    }

    #[test]
    fn overflowing_sibling_total_is_rejected() {
        let sectors = [sector("Living", i64::MAX, false, &[i64::MAX, 1])];
        assert_eq!(sectors[0].sibling_total(), None);
        assert_eq!(
            check_category_budget(Money::ZERO, &sectors),
            Err(EngineError::Validation("budget amount too large".to_string()))
        );
    }

    #[test]
    fn sector_budget_below_categories_is_rejected() {
        assert!(check_sector_budget("Living", Money::new(40_000), Money::new(50_000)).is_err());
        assert!(check_sector_budget("Living", Money::new(50_000), Money::new(50_000)).is_ok());
    }
}
