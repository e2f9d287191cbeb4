//! Initial schema migration.
//!
//! Creates the complete household ledger schema:
//!
//! - `categories`: spending buckets
//! - `sectors` / `sector_categories`: named groups of categories
//! - `transactions`: confirmed ledger entries
//! - `category_budgets` / `sector_budgets`: one row per entity and month
//! - `connected_accounts`: bank account links used by the import feed
//! - `pending_transactions`: imported candidates waiting for approval

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    NameNorm,
}

#[derive(Iden)]
enum Sectors {
    Table,
    Id,
    Name,
    NameNorm,
}

#[derive(Iden)]
enum SectorCategories {
    Table,
    SectorId,
    CategoryId,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    Date,
    Description,
    AmountMinor,
    Kind,
    CategoryId,
    SplitType,
    PaidBy,
    PaidTo,
    ReimbursesTransactionId,
    ExcludeFromMonthly,
    ExcludeFromYearly,
    CreatedAt,
}

#[derive(Iden)]
enum CategoryBudgets {
    Table,
    Id,
    CategoryId,
    Year,
    Month,
    BudgetType,
    AbsoluteAmount,
    User1Amount,
    User2Amount,
}

#[derive(Iden)]
enum SectorBudgets {
    Table,
    Id,
    SectorId,
    Year,
    Month,
    BudgetType,
    AbsoluteAmount,
    User1Amount,
    User2Amount,
    AutoRollup,
}

#[derive(Iden)]
enum ConnectedAccounts {
    Table,
    Id,
    Name,
    InstitutionName,
    ExternalAccountId,
    AccessToken,
    LastSyncedAt,
    Active,
    CreatedAt,
}

#[derive(Iden)]
enum PendingTransactions {
    Table,
    Id,
    ExternalTransactionId,
    ConnectedAccountId,
    Date,
    Description,
    AmountMinor,
    TransactionType,
    Status,
    ApprovedAt,
    RejectedAt,
    TransactionId,
    CategoryId,
    SplitType,
    PaidBy,
    PaidTo,
    ReimbursesTransactionId,
    RawPayload,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Categories and sectors
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::NameNorm).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-name_norm-unique")
                    .table(Categories::Table)
                    .col(Categories::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sectors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sectors::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Sectors::Name).string().not_null())
                    .col(ColumnDef::new(Sectors::NameNorm).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sectors-name_norm-unique")
                    .table(Sectors::Table)
                    .col(Sectors::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SectorCategories::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SectorCategories::SectorId).blob().not_null())
                    .col(
                        ColumnDef::new(SectorCategories::CategoryId)
                            .blob()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(SectorCategories::SectorId)
                            .col(SectorCategories::CategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sector_categories-sector_id")
                            .from(SectorCategories::Table, SectorCategories::SectorId)
                            .to(Sectors::Table, Sectors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sector_categories-category_id")
                            .from(SectorCategories::Table, SectorCategories::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sector_categories-category_id")
                    .table(SectorCategories::Table)
                    .col(SectorCategories::CategoryId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::Date).date().not_null())
                    .col(ColumnDef::new(Transactions::Description).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(ColumnDef::new(Transactions::CategoryId).blob())
                    .col(ColumnDef::new(Transactions::SplitType).string())
                    .col(ColumnDef::new(Transactions::PaidBy).string())
                    .col(ColumnDef::new(Transactions::PaidTo).string())
                    .col(ColumnDef::new(Transactions::ReimbursesTransactionId).blob())
                    .col(
                        ColumnDef::new(Transactions::ExcludeFromMonthly)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Transactions::ExcludeFromYearly)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-category_id")
                            .from(Transactions::Table, Transactions::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-reimburses_transaction_id")
                            .from(Transactions::Table, Transactions::ReimbursesTransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-kind-date")
                    .table(Transactions::Table)
                    .col(Transactions::Kind)
                    .col(Transactions::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-reimburses_transaction_id")
                    .table(Transactions::Table)
                    .col(Transactions::ReimbursesTransactionId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Budgets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CategoryBudgets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CategoryBudgets::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CategoryBudgets::CategoryId).blob().not_null())
                    .col(ColumnDef::new(CategoryBudgets::Year).integer().not_null())
                    .col(ColumnDef::new(CategoryBudgets::Month).integer().not_null())
                    .col(ColumnDef::new(CategoryBudgets::BudgetType).string().not_null())
                    .col(ColumnDef::new(CategoryBudgets::AbsoluteAmount).big_integer())
                    .col(ColumnDef::new(CategoryBudgets::User1Amount).big_integer())
                    .col(ColumnDef::new(CategoryBudgets::User2Amount).big_integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-category_budgets-category_id")
                            .from(CategoryBudgets::Table, CategoryBudgets::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-category_budgets-category_id-year-month")
                    .table(CategoryBudgets::Table)
                    .col(CategoryBudgets::CategoryId)
                    .col(CategoryBudgets::Year)
                    .col(CategoryBudgets::Month)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SectorBudgets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SectorBudgets::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SectorBudgets::SectorId).blob().not_null())
                    .col(ColumnDef::new(SectorBudgets::Year).integer().not_null())
                    .col(ColumnDef::new(SectorBudgets::Month).integer().not_null())
                    .col(ColumnDef::new(SectorBudgets::BudgetType).string().not_null())
                    .col(ColumnDef::new(SectorBudgets::AbsoluteAmount).big_integer())
                    .col(ColumnDef::new(SectorBudgets::User1Amount).big_integer())
                    .col(ColumnDef::new(SectorBudgets::User2Amount).big_integer())
                    .col(
                        ColumnDef::new(SectorBudgets::AutoRollup)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sector_budgets-sector_id")
                            .from(SectorBudgets::Table, SectorBudgets::SectorId)
                            .to(Sectors::Table, Sectors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-sector_budgets-sector_id-year-month")
                    .table(SectorBudgets::Table)
                    .col(SectorBudgets::SectorId)
                    .col(SectorBudgets::Year)
                    .col(SectorBudgets::Month)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Connected accounts and pending imports
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ConnectedAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConnectedAccounts::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ConnectedAccounts::Name).string().not_null())
                    .col(ColumnDef::new(ConnectedAccounts::InstitutionName).string())
                    .col(
                        ColumnDef::new(ConnectedAccounts::ExternalAccountId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConnectedAccounts::AccessToken)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ConnectedAccounts::LastSyncedAt).timestamp())
                    .col(
                        ColumnDef::new(ConnectedAccounts::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ConnectedAccounts::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PendingTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PendingTransactions::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PendingTransactions::ExternalTransactionId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingTransactions::ConnectedAccountId)
                            .blob()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PendingTransactions::Date).date().not_null())
                    .col(
                        ColumnDef::new(PendingTransactions::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingTransactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingTransactions::TransactionType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingTransactions::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(PendingTransactions::ApprovedAt).timestamp())
                    .col(ColumnDef::new(PendingTransactions::RejectedAt).timestamp())
                    .col(ColumnDef::new(PendingTransactions::TransactionId).blob())
                    .col(ColumnDef::new(PendingTransactions::CategoryId).blob())
                    .col(ColumnDef::new(PendingTransactions::SplitType).string())
                    .col(ColumnDef::new(PendingTransactions::PaidBy).string())
                    .col(ColumnDef::new(PendingTransactions::PaidTo).string())
                    .col(ColumnDef::new(PendingTransactions::ReimbursesTransactionId).blob())
                    .col(ColumnDef::new(PendingTransactions::RawPayload).text())
                    .col(
                        ColumnDef::new(PendingTransactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-pending_transactions-connected_account_id")
                            .from(
                                PendingTransactions::Table,
                                PendingTransactions::ConnectedAccountId,
                            )
                            .to(ConnectedAccounts::Table, ConnectedAccounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-pending_transactions-transaction_id")
                            .from(PendingTransactions::Table, PendingTransactions::TransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-pending_transactions-status")
                    .table(PendingTransactions::Table)
                    .col(PendingTransactions::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PendingTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ConnectedAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SectorBudgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CategoryBudgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SectorCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sectors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        Ok(())
    }
}
