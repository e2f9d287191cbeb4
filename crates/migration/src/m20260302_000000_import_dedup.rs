use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum PendingTransactions {
    Table,
    ExternalTransactionId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One pending row per feed transaction, whatever the number of sync runs.
        manager
            .create_index(
                Index::create()
                    .name("uidx-pending_transactions-external_transaction_id")
                    .table(PendingTransactions::Table)
                    .col(PendingTransactions::ExternalTransactionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("uidx-pending_transactions-external_transaction_id")
                    .table(PendingTransactions::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
