mod common;

use common::{date, engine_with_db};
use engine::{
    BudgetAmount, CarryForward, EngineError, Money, Period, PeriodController, SectorBudgetSpec,
    SpendScope, SplitType, TransactionInput, TransactionType, WindowMode,
};
use rust_decimal::Decimal;

fn absolute(cents: i64) -> BudgetAmount {
    BudgetAmount::Absolute {
        amount: Money::new(cents),
    }
}

fn dec(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

#[tokio::test]
async fn category_budgets_must_fit_the_manual_sector() {
    let (engine, _db) = engine_with_db().await;
    let rent = engine.create_category("Rent").await.unwrap();
    let power = engine.create_category("Power").await.unwrap();
    let living = engine
        .create_sector("Living", &[rent.id, power.id])
        .await
        .unwrap();
    let march = Period::new(2024, 3).unwrap();

    engine
        .create_sector_budget(living.id, march, SectorBudgetSpec::manual(absolute(50_000)))
        .await
        .unwrap();
    engine
        .create_category_budget(rent.id, march, absolute(30_000))
        .await
        .unwrap();

    let err = engine
        .create_category_budget(power.id, march, absolute(25_000))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Containment {
            sector: "Living".to_string(),
            limit: Money::new(50_000),
        }
    );
    assert!(engine.category_budget(power.id, march).await.unwrap().is_none());

    let power_budget = engine
        .create_category_budget(power.id, march, absolute(20_000))
        .await
        .unwrap();

    let err = engine
        .update_category_budget(power_budget.id, absolute(20_001))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Containment { .. }));
    let stored = engine.category_budget(power.id, march).await.unwrap().unwrap();
    assert_eq!(stored.amount, absolute(20_000));
}

#[tokio::test]
async fn split_budget_too_large_to_sum_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let rent = engine.create_category("Rent").await.unwrap();
    let living = engine.create_sector("Living", &[rent.id]).await.unwrap();
    let march = Period::new(2024, 3).unwrap();
    engine
        .create_sector_budget(living.id, march, SectorBudgetSpec::manual(absolute(50_000)))
        .await
        .unwrap();
    let huge = BudgetAmount::Split {
        user1: Money::new(i64::MAX),
        user2: Money::new(1),
    };

    let err = engine
        .create_category_budget(rent.id, march, huge)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert!(engine.category_budget(rent.id, march).await.unwrap().is_none());

    let budget = engine
        .create_category_budget(rent.id, march, absolute(10_000))
        .await
        .unwrap();
    let err = engine
        .update_category_budget(budget.id, huge)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn auto_rollup_sector_sums_its_categories() {
    let (engine, _db) = engine_with_db().await;
    let games = engine.create_category("Games").await.unwrap();
    let books = engine.create_category("Books").await.unwrap();
    let fun = engine.create_sector("Fun", &[games.id, books.id]).await.unwrap();
    let march = Period::new(2024, 3).unwrap();

    engine
        .create_sector_budget(fun.id, march, SectorBudgetSpec::auto_rollup())
        .await
        .unwrap();
    engine
        .create_category_budget(games.id, march, absolute(9_000))
        .await
        .unwrap();
    engine
        .create_category_budget(
            books.id,
            march,
            BudgetAmount::Split {
                user1: Money::new(2_000),
                user2: Money::new(1_500),
            },
        )
        .await
        .unwrap();

    let budget = engine.sector_budget(fun.id, march).await.unwrap().unwrap();
    assert!(budget.auto_rollup);
    assert_eq!(budget.effective_amount, Money::new(12_500));
}

#[tokio::test]
async fn manual_sector_budget_cannot_undercut_its_categories() {
    let (engine, _db) = engine_with_db().await;
    let rent = engine.create_category("Rent").await.unwrap();
    let living = engine.create_sector("Living", &[rent.id]).await.unwrap();
    let march = Period::new(2024, 3).unwrap();
    engine
        .create_category_budget(rent.id, march, absolute(30_000))
        .await
        .unwrap();

    let err = engine
        .create_sector_budget(living.id, march, SectorBudgetSpec::manual(absolute(20_000)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Containment { .. }));

    let dup = engine
        .create_category_budget(rent.id, march, absolute(1_000))
        .await
        .unwrap_err();
    assert!(matches!(dup, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn adding_a_category_to_a_full_sector_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let rent = engine.create_category("Rent").await.unwrap();
    let power = engine.create_category("Power").await.unwrap();
    let living = engine.create_sector("Living", &[rent.id]).await.unwrap();
    let march = Period::new(2024, 3).unwrap();
    engine
        .create_sector_budget(living.id, march, SectorBudgetSpec::manual(absolute(30_000)))
        .await
        .unwrap();
    engine
        .create_category_budget(rent.id, march, absolute(30_000))
        .await
        .unwrap();
    engine
        .create_category_budget(power.id, march, absolute(5_000))
        .await
        .unwrap();

    let err = engine
        .set_sector_categories(living.id, &[rent.id, power.id])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Containment { .. }));
    assert_eq!(engine.sector(living.id).await.unwrap().category_ids, vec![rent.id]);
}

#[tokio::test]
async fn spend_nets_reimbursements_per_user() {
    let (engine, _db) = engine_with_db().await;
    let dining = engine.create_category("Dining").await.unwrap();
    let march = Period::new(2024, 3).unwrap();

    let dinner = engine
        .create_transaction(TransactionInput::expense(
            date(2024, 3, 9),
            "Dinner",
            Money::new(10_000),
            dining.id,
            SplitType::SplitEqually,
            "Ana",
        ))
        .await
        .unwrap();
    engine
        .create_transaction(
            TransactionInput::new(
                date(2024, 4, 2),
                "Friend paid back",
                Money::new(4_000),
                TransactionType::Reimbursement,
            )
            .paid_to("Ana")
            .reimburses(dinner.id),
        )
        .await
        .unwrap();
    engine
        .create_transaction(TransactionInput::expense(
            date(2024, 4, 1),
            "Next month lunch",
            Money::new(2_000),
            dining.id,
            SplitType::User1Only,
            "Ana",
        ))
        .await
        .unwrap();

    let spend = engine
        .spend(SpendScope::Category(dining.id), march, WindowMode::Monthly)
        .await
        .unwrap();
    assert_eq!(spend.total, dec(6_000));
    assert_eq!(spend.user1, dec(1_000));
    assert_eq!(spend.user2, dec(1_000));

    engine
        .create_category_budget(dining.id, march, absolute(30_000))
        .await
        .unwrap();
    let status = engine
        .budget_status(SpendScope::Category(dining.id), march, WindowMode::Monthly)
        .await
        .unwrap();
    assert_eq!(status.comparison.remaining, Some(dec(24_000)));
    assert_eq!(status.comparison.remaining_pct, Some(dec(8_000)));
}

#[tokio::test]
async fn budget_status_without_budget_has_no_remaining() {
    let (engine, _db) = engine_with_db().await;
    let dining = engine.create_category("Dining").await.unwrap();
    let status = engine
        .budget_status(
            SpendScope::Category(dining.id),
            Period::new(2024, 1).unwrap(),
            WindowMode::YearlyPreviousMonths,
        )
        .await
        .unwrap();
    assert_eq!(status.spend.total, Decimal::ZERO);
    assert_eq!(status.comparison.remaining, None);
    assert_eq!(status.comparison.remaining_pct, None);
}

#[tokio::test]
async fn invalid_entries_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let dining = engine.create_category("Dining").await.unwrap();

    let zero = engine
        .create_transaction(TransactionInput::expense(
            date(2024, 3, 9),
            "Nothing",
            Money::ZERO,
            dining.id,
            SplitType::SplitEqually,
            "Ana",
        ))
        .await
        .unwrap_err();
    assert_eq!(zero, EngineError::Validation("amount must be > 0".to_string()));

    let stranger = engine
        .create_transaction(
            TransactionInput::new(
                date(2024, 3, 9),
                "Pay back",
                Money::new(500),
                TransactionType::Settlement,
            )
            .paid_by("Ana")
            .paid_to("Carl"),
        )
        .await
        .unwrap_err();
    assert!(matches!(stranger, EngineError::Validation(_)));

    let income = engine
        .create_transaction(
            TransactionInput::new(date(2024, 3, 1), "Salary", Money::new(1), TransactionType::Income)
                .paid_to("Ben"),
        )
        .await
        .unwrap();
    let bad_link = engine
        .create_transaction(
            TransactionInput::new(
                date(2024, 3, 9),
                "Refund",
                Money::new(500),
                TransactionType::Reimbursement,
            )
            .paid_to("Ana")
            .reimburses(income.id),
        )
        .await
        .unwrap_err();
    assert!(matches!(bad_link, EngineError::Validation(_)));

    let dup = engine.create_category(" dining ").await.unwrap_err();
    assert!(matches!(dup, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn selecting_the_current_month_carries_budgets_forward_once() {
    let (engine, _db) = engine_with_db().await;
    let rent = engine.create_category("Rent").await.unwrap();
    let living = engine.create_sector("Living", &[rent.id]).await.unwrap();
    let january = Period::new(2024, 1).unwrap();
    engine
        .create_category_budget(rent.id, january, absolute(80_000))
        .await
        .unwrap();
    engine
        .create_sector_budget(living.id, january, SectorBudgetSpec::auto_rollup())
        .await
        .unwrap();

    let today = date(2024, 3, 15);
    let mut controller = PeriodController::load(&engine, today).await.unwrap();
    let march = Period::new(2024, 3).unwrap();
    assert_eq!(controller.selected(), march);
    assert_eq!(controller.periods_with_data(), &[january, march]);

    let again = controller.select(&engine, march, today).await.unwrap();
    assert_eq!(again, Some(CarryForward::AlreadyPopulated));

    let budgets = engine.budgets_for_period(march).await.unwrap();
    assert_eq!(budgets.categories.len(), 1);
    assert_eq!(budgets.sectors.len(), 1);
    assert_eq!(budgets.categories[0].amount, absolute(80_000));
    assert_eq!(budgets.sectors[0].effective_amount, Money::new(80_000));

    let february = Period::new(2024, 2).unwrap();
    let browsed = controller.select(&engine, february, today).await.unwrap();
    assert_eq!(browsed, None);
    assert!(!engine.has_budget_data(february).await.unwrap());
}

#[tokio::test]
async fn carry_forward_reports_its_source() {
    let (engine, _db) = engine_with_db().await;
    let rent = engine.create_category("Rent").await.unwrap();
    let april = Period::new(2024, 4).unwrap();

    assert_eq!(
        engine.ensure_period_has_data(april).await.unwrap(),
        CarryForward::NothingToCopy
    );

    let february = Period::new(2024, 2).unwrap();
    engine
        .create_category_budget(rent.id, february, absolute(80_000))
        .await
        .unwrap();
    assert_eq!(
        engine.ensure_period_has_data(april).await.unwrap(),
        CarryForward::Copied {
            from: february,
            categories: 1,
            sectors: 0,
        }
    );
    assert_eq!(
        engine.ensure_period_has_data(april).await.unwrap(),
        CarryForward::AlreadyPopulated
    );
}
