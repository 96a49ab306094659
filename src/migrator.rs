use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_products_table::Migration),
            Box::new(m20240101_000002_create_lorries_table::Migration),
            Box::new(m20240101_000003_create_stock_ledger_table::Migration),
            Box::new(m20240101_000004_create_inventory_transactions_table::Migration),
            Box::new(m20240101_000005_create_loading_tables::Migration),
            Box::new(m20240101_000006_create_unloading_tables::Migration),
            Box::new(m20240101_000007_create_daily_sales_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_products_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create products table aligned with entities::product Model
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Size).string().null())
                        .col(
                            ColumnDef::new(Products::BottlesPerCase)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::UnitPrice)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::SellingPrice)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::CreatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_name")
                        .table(Products::Table)
                        .col(Products::Name)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Products {
        Table,
        Id,
        Name,
        Size,
        BottlesPerCase,
        UnitPrice,
        SellingPrice,
        CreatedAt,
    }
}

mod m20240101_000002_create_lorries_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_lorries_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Lorries::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Lorries::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Lorries::LorryNumber).string().not_null())
                        .col(ColumnDef::new(Lorries::DriverName).string().null())
                        .col(
                            ColumnDef::new(Lorries::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Lorries::CreatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_lorries_lorry_number")
                        .table(Lorries::Table)
                        .col(Lorries::LorryNumber)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Lorries::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Lorries {
        Table,
        Id,
        LorryNumber,
        DriverName,
        Active,
        CreatedAt,
    }
}

mod m20240101_000003_create_stock_ledger_table {

    use sea_orm_migration::prelude::*;

    use super::m20240101_000001_create_products_table::Products;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_stock_ledger_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // One ledger row per product; the unique index enforces it.
            manager
                .create_table(
                    Table::create()
                        .table(StockLedger::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockLedger::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(StockLedger::ProductId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockLedger::CasesQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(StockLedger::BottlesQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(StockLedger::TotalBottles)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(StockLedger::TotalValue)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(StockLedger::Version)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(StockLedger::LastUpdated)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_ledger_product_id")
                                .from(StockLedger::Table, StockLedger::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_ledger_product_id")
                        .table(StockLedger::Table)
                        .col(StockLedger::ProductId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockLedger::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum StockLedger {
        Table,
        Id,
        ProductId,
        CasesQty,
        BottlesQty,
        TotalBottles,
        TotalValue,
        Version,
        LastUpdated,
    }
}

mod m20240101_000004_create_inventory_transactions_table {

    use sea_orm_migration::prelude::*;

    use super::m20240101_000001_create_products_table::Products;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_inventory_transactions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryTransactions::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::ProductId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::TransactionType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::CasesQty)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::BottlesQty)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::TotalBottles)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::TotalValue)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryTransactions::Notes).string().null())
                        .col(
                            ColumnDef::new(InventoryTransactions::TransactionDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_transactions_product_id")
                                .from(
                                    InventoryTransactions::Table,
                                    InventoryTransactions::ProductId,
                                )
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_transactions_product_id")
                        .table(InventoryTransactions::Table)
                        .col(InventoryTransactions::ProductId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_transactions_transaction_date")
                        .table(InventoryTransactions::Table)
                        .col(InventoryTransactions::TransactionDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryTransactions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum InventoryTransactions {
        Table,
        Id,
        ProductId,
        TransactionType,
        CasesQty,
        BottlesQty,
        TotalBottles,
        TotalValue,
        Notes,
        TransactionDate,
    }
}

mod m20240101_000005_create_loading_tables {

    use sea_orm_migration::prelude::*;

    use super::m20240101_000001_create_products_table::Products;
    use super::m20240101_000002_create_lorries_table::Lorries;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_loading_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(LoadingTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(LoadingTransactions::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(LoadingTransactions::LorryId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LoadingTransactions::LoadingDate)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LoadingTransactions::LoadingTime)
                                .time()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LoadingTransactions::LoadedBy)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(LoadingTransactions::Status)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LoadingTransactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_loading_transactions_lorry_id")
                                .from(LoadingTransactions::Table, LoadingTransactions::LorryId)
                                .to(Lorries::Table, Lorries::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_loading_transactions_lorry_date")
                        .table(LoadingTransactions::Table)
                        .col(LoadingTransactions::LorryId)
                        .col(LoadingTransactions::LoadingDate)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_loading_transactions_status")
                        .table(LoadingTransactions::Table)
                        .col(LoadingTransactions::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(LoadingDetails::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(LoadingDetails::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(LoadingDetails::LoadingId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LoadingDetails::ProductId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LoadingDetails::CasesLoaded)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LoadingDetails::BottlesLoaded)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LoadingDetails::TotalBottlesLoaded)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LoadingDetails::Value)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_loading_details_loading_id")
                                .from(LoadingDetails::Table, LoadingDetails::LoadingId)
                                .to(LoadingTransactions::Table, LoadingTransactions::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_loading_details_product_id")
                                .from(LoadingDetails::Table, LoadingDetails::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_loading_details_loading_id")
                        .table(LoadingDetails::Table)
                        .col(LoadingDetails::LoadingId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(LoadingDetails::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(LoadingTransactions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum LoadingTransactions {
        Table,
        Id,
        LorryId,
        LoadingDate,
        LoadingTime,
        LoadedBy,
        Status,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum LoadingDetails {
        Table,
        Id,
        LoadingId,
        ProductId,
        CasesLoaded,
        BottlesLoaded,
        TotalBottlesLoaded,
        Value,
    }
}

mod m20240101_000006_create_unloading_tables {

    use sea_orm_migration::prelude::*;

    use super::m20240101_000001_create_products_table::Products;
    use super::m20240101_000002_create_lorries_table::Lorries;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_unloading_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(UnloadingTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(UnloadingTransactions::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(UnloadingTransactions::LorryId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(UnloadingTransactions::UnloadingDate)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(UnloadingTransactions::UnloadingTime)
                                .time()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(UnloadingTransactions::UnloadedBy)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(UnloadingTransactions::Status)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(UnloadingTransactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_unloading_transactions_lorry_id")
                                .from(UnloadingTransactions::Table, UnloadingTransactions::LorryId)
                                .to(Lorries::Table, Lorries::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_unloading_transactions_lorry_date")
                        .table(UnloadingTransactions::Table)
                        .col(UnloadingTransactions::LorryId)
                        .col(UnloadingTransactions::UnloadingDate)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(UnloadingDetails::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(UnloadingDetails::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(UnloadingDetails::UnloadingId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(UnloadingDetails::ProductId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(UnloadingDetails::CasesReturned)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(UnloadingDetails::BottlesReturned)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(UnloadingDetails::TotalBottlesReturned)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(UnloadingDetails::Value)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_unloading_details_unloading_id")
                                .from(UnloadingDetails::Table, UnloadingDetails::UnloadingId)
                                .to(UnloadingTransactions::Table, UnloadingTransactions::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_unloading_details_product_id")
                                .from(UnloadingDetails::Table, UnloadingDetails::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_unloading_details_unloading_id")
                        .table(UnloadingDetails::Table)
                        .col(UnloadingDetails::UnloadingId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(UnloadingDetails::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(UnloadingTransactions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum UnloadingTransactions {
        Table,
        Id,
        LorryId,
        UnloadingDate,
        UnloadingTime,
        UnloadedBy,
        Status,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum UnloadingDetails {
        Table,
        Id,
        UnloadingId,
        ProductId,
        CasesReturned,
        BottlesReturned,
        TotalBottlesReturned,
        Value,
    }
}

mod m20240101_000007_create_daily_sales_tables {

    use sea_orm_migration::prelude::*;

    use super::m20240101_000001_create_products_table::Products;
    use super::m20240101_000002_create_lorries_table::Lorries;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_daily_sales_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Reconciliation upserts keyed by (lorry_id, sales_date); the unique
            // index is what makes the upsert idempotent.
            manager
                .create_table(
                    Table::create()
                        .table(DailySales::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DailySales::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(DailySales::LorryId).big_integer().not_null())
                        .col(ColumnDef::new(DailySales::SalesDate).date().not_null())
                        .col(
                            ColumnDef::new(DailySales::UnitsSold)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DailySales::SalesIncome)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DailySales::GrossProfit)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(DailySales::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(DailySales::UpdatedAt).timestamp_with_time_zone().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_daily_sales_lorry_id")
                                .from(DailySales::Table, DailySales::LorryId)
                                .to(Lorries::Table, Lorries::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_daily_sales_lorry_date")
                        .table(DailySales::Table)
                        .col(DailySales::LorryId)
                        .col(DailySales::SalesDate)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DailySalesDetails::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DailySalesDetails::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(DailySalesDetails::SalesId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DailySalesDetails::ProductId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DailySalesDetails::UnitsSold)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DailySalesDetails::SalesIncome)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DailySalesDetails::GrossProfit)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_daily_sales_details_sales_id")
                                .from(DailySalesDetails::Table, DailySalesDetails::SalesId)
                                .to(DailySales::Table, DailySales::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_daily_sales_details_product_id")
                                .from(DailySalesDetails::Table, DailySalesDetails::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_daily_sales_details_sales_product")
                        .table(DailySalesDetails::Table)
                        .col(DailySalesDetails::SalesId)
                        .col(DailySalesDetails::ProductId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DailySalesDetails::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DailySales::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum DailySales {
        Table,
        Id,
        LorryId,
        SalesDate,
        UnitsSold,
        SalesIncome,
        GrossProfit,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum DailySalesDetails {
        Table,
        Id,
        SalesId,
        ProductId,
        UnitsSold,
        SalesIncome,
        GrossProfit,
    }
}
