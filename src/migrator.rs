use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240801_000001_create_tenants_and_users::Migration),
            Box::new(m20240801_000002_create_registry_tables::Migration),
            Box::new(m20240801_000003_create_input_tables::Migration),
            Box::new(m20240801_000004_create_machinery_tables::Migration),
            Box::new(m20240801_000005_create_commercial_tables::Migration),
            Box::new(m20240801_000006_create_seed_tables::Migration),
            Box::new(m20240801_000007_create_finance_tables::Migration),
        ]
    }
}

/// Column helpers shared by the migrations below.
mod cols {
    use sea_orm_migration::prelude::*;

    pub fn id<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name).uuid().not_null().primary_key().to_owned()
    }

    pub fn uuid<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name).uuid().not_null().to_owned()
    }

    pub fn uuid_null<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name).uuid().null().to_owned()
    }

    pub fn text<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name).string().not_null().to_owned()
    }

    pub fn text_null<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name).string().null().to_owned()
    }

    pub fn quantity<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name)
            .decimal_len(16, 4)
            .not_null()
            .default(0)
            .to_owned()
    }

    pub fn quantity_null<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name).decimal_len(16, 4).null().to_owned()
    }

    pub fn money<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name)
            .decimal_len(16, 2)
            .not_null()
            .default(0)
            .to_owned()
    }

    pub fn money_null<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name).decimal_len(16, 2).null().to_owned()
    }

    pub fn date<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name).date().not_null().to_owned()
    }

    pub fn date_null<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name).date().null().to_owned()
    }

    pub fn timestamp<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name)
            .timestamp_with_time_zone()
            .not_null()
            .to_owned()
    }

    /// Line order inside its document.
    pub fn position<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name).integer().not_null().default(0).to_owned()
    }

    pub fn flag<T: IntoIden>(name: T, default: bool) -> ColumnDef {
        ColumnDef::new(name)
            .boolean()
            .not_null()
            .default(default)
            .to_owned()
    }

    pub fn fk<T, C, R, RC>(name: &str, table: T, column: C, ref_table: R, ref_column: RC) -> ForeignKeyCreateStatement
    where
        T: IntoTableRef + Clone,
        C: IntoIden,
        R: IntoTableRef,
        RC: IntoIden,
    {
        ForeignKey::create()
            .name(name)
            .from(table, column)
            .to(ref_table, ref_column)
            .on_delete(ForeignKeyAction::Restrict)
            .to_owned()
    }
}

mod m20240801_000001_create_tenants_and_users {
    use super::cols;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240801_000001_create_tenants_and_users"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Tenants::Table)
                        .if_not_exists()
                        .col(cols::id(Tenants::Id))
                        .col(cols::text(Tenants::Name))
                        .col(cols::text_null(Tenants::Document))
                        .col(cols::timestamp(Tenants::CreatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(cols::id(Users::Id))
                        .col(cols::uuid(Users::TenantId))
                        .col(cols::text(Users::Name))
                        .col(cols::text(Users::Email))
                        .col(cols::text(Users::PasswordHash))
                        .col(cols::text(Users::Role))
                        .col(cols::flag(Users::Active, true))
                        .col(cols::timestamp(Users::CreatedAt))
                        .col(cols::timestamp(Users::UpdatedAt))
                        .foreign_key(&mut cols::fk(
                            "fk_users_tenant",
                            Users::Table,
                            Users::TenantId,
                            Tenants::Table,
                            Tenants::Id,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_email")
                        .table(Users::Table)
                        .col(Users::Email)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Tenants::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub enum Tenants {
        Table,
        Id,
        Name,
        Document,
        CreatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Users {
        Table,
        Id,
        TenantId,
        Name,
        Email,
        PasswordHash,
        Role,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240801_000002_create_registry_tables {
    use super::cols;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240801_000002_create_registry_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(cols::id(Customers::Id))
                        .col(cols::uuid(Customers::TenantId))
                        .col(cols::text(Customers::Name))
                        .col(cols::text(Customers::Document))
                        .col(cols::text(Customers::Kind))
                        .col(cols::text_null(Customers::Email))
                        .col(cols::text_null(Customers::Phone))
                        .col(cols::text_null(Customers::City))
                        .col(cols::text_null(Customers::State))
                        .col(cols::text_null(Customers::Notes))
                        .col(cols::timestamp(Customers::CreatedAt))
                        .col(cols::timestamp(Customers::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customers_tenant_document")
                        .table(Customers::Table)
                        .col(Customers::TenantId)
                        .col(Customers::Document)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Farms::Table)
                        .if_not_exists()
                        .col(cols::id(Farms::Id))
                        .col(cols::uuid(Farms::TenantId))
                        .col(cols::text(Farms::Name))
                        .col(cols::text_null(Farms::City))
                        .col(cols::text_null(Farms::State))
                        .col(cols::quantity_null(Farms::TotalAreaHa))
                        .col(cols::text_null(Farms::Notes))
                        .col(cols::timestamp(Farms::CreatedAt))
                        .col(cols::timestamp(Farms::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Plots::Table)
                        .if_not_exists()
                        .col(cols::id(Plots::Id))
                        .col(cols::uuid(Plots::TenantId))
                        .col(cols::uuid(Plots::FarmId))
                        .col(cols::text(Plots::Name))
                        .col(cols::quantity(Plots::AreaHa))
                        .col(cols::text_null(Plots::SoilType))
                        .col(cols::text_null(Plots::Notes))
                        .col(cols::timestamp(Plots::CreatedAt))
                        .col(cols::timestamp(Plots::UpdatedAt))
                        .foreign_key(&mut cols::fk(
                            "fk_plots_farm",
                            Plots::Table,
                            Plots::FarmId,
                            Farms::Table,
                            Farms::Id,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Cultivars::Table)
                        .if_not_exists()
                        .col(cols::id(Cultivars::Id))
                        .col(cols::uuid(Cultivars::TenantId))
                        .col(cols::text(Cultivars::Name))
                        .col(cols::text(Cultivars::Crop))
                        .col(cols::text_null(Cultivars::MaturityGroup))
                        .col(cols::text(Cultivars::Unit))
                        .col(cols::quantity(Cultivars::Stock))
                        .col(cols::quantity_null(Cultivars::MinStock))
                        .col(cols::text_null(Cultivars::Notes))
                        .col(cols::timestamp(Cultivars::CreatedAt))
                        .col(cols::timestamp(Cultivars::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            for (name, table, column) in [
                (
                    "idx_farms_tenant",
                    Farms::Table.into_iden(),
                    Farms::TenantId.into_iden(),
                ),
                (
                    "idx_plots_farm",
                    Plots::Table.into_iden(),
                    Plots::FarmId.into_iden(),
                ),
                (
                    "idx_cultivars_tenant",
                    Cultivars::Table.into_iden(),
                    Cultivars::TenantId.into_iden(),
                ),
            ] {
                manager
                    .create_index(
                        Index::create()
                            .if_not_exists()
                            .name(name)
                            .table(table)
                            .col(column)
                            .to_owned(),
                    )
                    .await?;
            }

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Cultivars::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Plots::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Farms::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub enum Customers {
        Table,
        Id,
        TenantId,
        Name,
        Document,
        Kind,
        Email,
        Phone,
        City,
        State,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub enum Farms {
        Table,
        Id,
        TenantId,
        Name,
        City,
        State,
        TotalAreaHa,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub enum Plots {
        Table,
        Id,
        TenantId,
        FarmId,
        Name,
        AreaHa,
        SoilType,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub enum Cultivars {
        Table,
        Id,
        TenantId,
        Name,
        Crop,
        MaturityGroup,
        Unit,
        Stock,
        MinStock,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240801_000003_create_input_tables {
    use super::cols;
    use super::m20240801_000002_create_registry_tables::{Customers, Farms, Plots};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240801_000003_create_input_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(cols::id(Products::Id))
                        .col(cols::uuid(Products::TenantId))
                        .col(cols::text(Products::Name))
                        .col(cols::text(Products::Category))
                        .col(cols::text(Products::Unit))
                        .col(cols::text_null(Products::ActiveIngredient))
                        .col(cols::text_null(Products::Notes))
                        .col(cols::timestamp(Products::CreatedAt))
                        .col(cols::timestamp(Products::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProductStocks::Table)
                        .if_not_exists()
                        .col(cols::id(ProductStocks::Id))
                        .col(cols::uuid(ProductStocks::TenantId))
                        .col(cols::uuid(ProductStocks::ProductId))
                        .col(cols::uuid(ProductStocks::FarmId))
                        .col(cols::quantity(ProductStocks::Quantity))
                        .col(cols::timestamp(ProductStocks::UpdatedAt))
                        .foreign_key(&mut cols::fk(
                            "fk_product_stocks_product",
                            ProductStocks::Table,
                            ProductStocks::ProductId,
                            Products::Table,
                            Products::Id,
                        ))
                        .foreign_key(&mut cols::fk(
                            "fk_product_stocks_farm",
                            ProductStocks::Table,
                            ProductStocks::FarmId,
                            Farms::Table,
                            Farms::Id,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_product_stocks_product_farm")
                        .table(ProductStocks::Table)
                        .col(ProductStocks::ProductId)
                        .col(ProductStocks::FarmId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Transfers::Table)
                        .if_not_exists()
                        .col(cols::id(Transfers::Id))
                        .col(cols::uuid(Transfers::TenantId))
                        .col(cols::uuid(Transfers::ProductId))
                        .col(cols::uuid(Transfers::OriginFarmId))
                        .col(cols::uuid(Transfers::DestinationFarmId))
                        .col(cols::quantity(Transfers::Quantity))
                        .col(cols::date(Transfers::TransferDate))
                        .col(cols::text_null(Transfers::Notes))
                        .col(cols::timestamp(Transfers::CreatedAt))
                        .col(cols::timestamp(Transfers::UpdatedAt))
                        .foreign_key(&mut cols::fk(
                            "fk_transfers_product",
                            Transfers::Table,
                            Transfers::ProductId,
                            Products::Table,
                            Products::Id,
                        ))
                        .foreign_key(&mut cols::fk(
                            "fk_transfers_origin",
                            Transfers::Table,
                            Transfers::OriginFarmId,
                            Farms::Table,
                            Farms::Id,
                        ))
                        .foreign_key(&mut cols::fk(
                            "fk_transfers_destination",
                            Transfers::Table,
                            Transfers::DestinationFarmId,
                            Farms::Table,
                            Farms::Id,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Applications::Table)
                        .if_not_exists()
                        .col(cols::id(Applications::Id))
                        .col(cols::uuid(Applications::TenantId))
                        .col(cols::uuid(Applications::ProductId))
                        .col(cols::uuid(Applications::FarmId))
                        .col(cols::uuid(Applications::PlotId))
                        .col(cols::uuid_null(Applications::MachineId))
                        .col(cols::quantity(Applications::Quantity))
                        .col(cols::quantity_null(Applications::AreaHa))
                        .col(cols::date(Applications::ApplicationDate))
                        .col(cols::text_null(Applications::Notes))
                        .col(cols::timestamp(Applications::CreatedAt))
                        .col(cols::timestamp(Applications::UpdatedAt))
                        .foreign_key(&mut cols::fk(
                            "fk_applications_product",
                            Applications::Table,
                            Applications::ProductId,
                            Products::Table,
                            Products::Id,
                        ))
                        .foreign_key(&mut cols::fk(
                            "fk_applications_plot",
                            Applications::Table,
                            Applications::PlotId,
                            Plots::Table,
                            Plots::Id,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrders::Table)
                        .if_not_exists()
                        .col(cols::id(PurchaseOrders::Id))
                        .col(cols::uuid(PurchaseOrders::TenantId))
                        .col(cols::uuid(PurchaseOrders::SupplierId))
                        .col(cols::text(PurchaseOrders::OrderNumber))
                        .col(cols::date(PurchaseOrders::OrderDate))
                        .col(cols::date_null(PurchaseOrders::ExpectedDate))
                        .col(cols::text(PurchaseOrders::Status))
                        .col(cols::text_null(PurchaseOrders::Notes))
                        .col(cols::timestamp(PurchaseOrders::CreatedAt))
                        .col(cols::timestamp(PurchaseOrders::UpdatedAt))
                        .foreign_key(&mut cols::fk(
                            "fk_purchase_orders_supplier",
                            PurchaseOrders::Table,
                            PurchaseOrders::SupplierId,
                            Customers::Table,
                            Customers::Id,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_orders_tenant_number")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::TenantId)
                        .col(PurchaseOrders::OrderNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrderItems::Table)
                        .if_not_exists()
                        .col(cols::id(PurchaseOrderItems::Id))
                        .col(cols::uuid(PurchaseOrderItems::TenantId))
                        .col(cols::uuid(PurchaseOrderItems::OrderId))
                        .col(cols::uuid(PurchaseOrderItems::ProductId))
                        .col(cols::quantity(PurchaseOrderItems::Quantity))
                        .col(cols::quantity(PurchaseOrderItems::FulfilledQuantity))
                        .col(cols::quantity(PurchaseOrderItems::UnitPrice))
                        .col(cols::position(PurchaseOrderItems::Position))
                        .foreign_key(&mut cols::fk(
                            "fk_purchase_order_items_order",
                            PurchaseOrderItems::Table,
                            PurchaseOrderItems::OrderId,
                            PurchaseOrders::Table,
                            PurchaseOrders::Id,
                        ))
                        .foreign_key(&mut cols::fk(
                            "fk_purchase_order_items_product",
                            PurchaseOrderItems::Table,
                            PurchaseOrderItems::ProductId,
                            Products::Table,
                            Products::Id,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Purchases::Table)
                        .if_not_exists()
                        .col(cols::id(Purchases::Id))
                        .col(cols::uuid(Purchases::TenantId))
                        .col(cols::uuid(Purchases::ProductId))
                        .col(cols::uuid(Purchases::FarmId))
                        .col(cols::uuid(Purchases::SupplierId))
                        .col(cols::quantity(Purchases::Quantity))
                        .col(cols::quantity(Purchases::UnitPrice))
                        .col(cols::money(Purchases::TotalValue))
                        .col(cols::date(Purchases::PurchaseDate))
                        .col(cols::text_null(Purchases::InvoiceNumber))
                        .col(cols::text(Purchases::Payment))
                        .col(cols::date_null(Purchases::DueDate))
                        .col(cols::uuid_null(Purchases::PurchaseOrderItemId))
                        .col(cols::text_null(Purchases::Notes))
                        .col(cols::timestamp(Purchases::CreatedAt))
                        .col(cols::timestamp(Purchases::UpdatedAt))
                        .foreign_key(&mut cols::fk(
                            "fk_purchases_product",
                            Purchases::Table,
                            Purchases::ProductId,
                            Products::Table,
                            Products::Id,
                        ))
                        .foreign_key(&mut cols::fk(
                            "fk_purchases_farm",
                            Purchases::Table,
                            Purchases::FarmId,
                            Farms::Table,
                            Farms::Id,
                        ))
                        .foreign_key(&mut cols::fk(
                            "fk_purchases_supplier",
                            Purchases::Table,
                            Purchases::SupplierId,
                            Customers::Table,
                            Customers::Id,
                        ))
                        .foreign_key(&mut cols::fk(
                            "fk_purchases_order_item",
                            Purchases::Table,
                            Purchases::PurchaseOrderItemId,
                            PurchaseOrderItems::Table,
                            PurchaseOrderItems::Id,
                        ))
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in [
                Purchases::Table.into_iden(),
                PurchaseOrderItems::Table.into_iden(),
                PurchaseOrders::Table.into_iden(),
                Applications::Table.into_iden(),
                Transfers::Table.into_iden(),
                ProductStocks::Table.into_iden(),
                Products::Table.into_iden(),
            ] {
                manager
                    .drop_table(Table::drop().table(table).to_owned())
                    .await?;
            }
            Ok(())
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub enum Products {
        Table,
        Id,
        TenantId,
        Name,
        Category,
        Unit,
        ActiveIngredient,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum ProductStocks {
        Table,
        Id,
        TenantId,
        ProductId,
        FarmId,
        Quantity,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Transfers {
        Table,
        Id,
        TenantId,
        ProductId,
        OriginFarmId,
        DestinationFarmId,
        Quantity,
        TransferDate,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Applications {
        Table,
        Id,
        TenantId,
        ProductId,
        FarmId,
        PlotId,
        MachineId,
        Quantity,
        AreaHa,
        ApplicationDate,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub enum Purchases {
        Table,
        Id,
        TenantId,
        ProductId,
        FarmId,
        SupplierId,
        Quantity,
        UnitPrice,
        TotalValue,
        PurchaseDate,
        InvoiceNumber,
        Payment,
        DueDate,
        PurchaseOrderItemId,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum PurchaseOrders {
        Table,
        Id,
        TenantId,
        SupplierId,
        OrderNumber,
        OrderDate,
        ExpectedDate,
        Status,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum PurchaseOrderItems {
        Table,
        Id,
        TenantId,
        OrderId,
        ProductId,
        Quantity,
        FulfilledQuantity,
        UnitPrice,
        Position,
    }
}

mod m20240801_000004_create_machinery_tables {
    use super::cols;
    use super::m20240801_000002_create_registry_tables::Farms;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240801_000004_create_machinery_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Machines::Table)
                        .if_not_exists()
                        .col(cols::id(Machines::Id))
                        .col(cols::uuid(Machines::TenantId))
                        .col(cols::uuid_null(Machines::FarmId))
                        .col(cols::text(Machines::Name))
                        .col(cols::text(Machines::Kind))
                        .col(cols::text_null(Machines::Brand))
                        .col(cols::text_null(Machines::Model))
                        .col(ColumnDef::new(Machines::Year).integer().null())
                        .col(cols::text_null(Machines::Identifier))
                        .col(cols::money(Machines::HourMeter))
                        .col(cols::flag(Machines::Active, true))
                        .col(cols::text_null(Machines::Notes))
                        .col(cols::timestamp(Machines::CreatedAt))
                        .col(cols::timestamp(Machines::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(FuelTanks::Table)
                        .if_not_exists()
                        .col(cols::id(FuelTanks::Id))
                        .col(cols::uuid(FuelTanks::TenantId))
                        .col(cols::uuid(FuelTanks::FarmId))
                        .col(cols::text(FuelTanks::Name))
                        .col(cols::money(FuelTanks::CapacityLiters))
                        .col(cols::money(FuelTanks::StockLiters))
                        .col(cols::timestamp(FuelTanks::CreatedAt))
                        .col(cols::timestamp(FuelTanks::UpdatedAt))
                        .foreign_key(&mut cols::fk(
                            "fk_fuel_tanks_farm",
                            FuelTanks::Table,
                            FuelTanks::FarmId,
                            Farms::Table,
                            Farms::Id,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Refuels::Table)
                        .if_not_exists()
                        .col(cols::id(Refuels::Id))
                        .col(cols::uuid(Refuels::TenantId))
                        .col(cols::uuid(Refuels::MachineId))
                        .col(cols::uuid(Refuels::TankId))
                        .col(cols::money(Refuels::Liters))
                        .col(cols::money(Refuels::HourMeter))
                        .col(cols::money(Refuels::PreviousHourMeter))
                        .col(cols::date(Refuels::RefuelDate))
                        .col(cols::text_null(Refuels::Notes))
                        .col(cols::timestamp(Refuels::CreatedAt))
                        .col(cols::timestamp(Refuels::UpdatedAt))
                        .foreign_key(&mut cols::fk(
                            "fk_refuels_machine",
                            Refuels::Table,
                            Refuels::MachineId,
                            Machines::Table,
                            Machines::Id,
                        ))
                        .foreign_key(&mut cols::fk(
                            "fk_refuels_tank",
                            Refuels::Table,
                            Refuels::TankId,
                            FuelTanks::Table,
                            FuelTanks::Id,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Maintenances::Table)
                        .if_not_exists()
                        .col(cols::id(Maintenances::Id))
                        .col(cols::uuid(Maintenances::TenantId))
                        .col(cols::uuid(Maintenances::MachineId))
                        .col(cols::text(Maintenances::Kind))
                        .col(cols::text(Maintenances::Description))
                        .col(cols::date(Maintenances::MaintenanceDate))
                        .col(cols::money_null(Maintenances::HourMeter))
                        .col(cols::money(Maintenances::Cost))
                        .col(cols::uuid_null(Maintenances::SupplierId))
                        .col(cols::text(Maintenances::Payment))
                        .col(cols::date_null(Maintenances::DueDate))
                        .col(cols::timestamp(Maintenances::CreatedAt))
                        .col(cols::timestamp(Maintenances::UpdatedAt))
                        .foreign_key(&mut cols::fk(
                            "fk_maintenances_machine",
                            Maintenances::Table,
                            Maintenances::MachineId,
                            Machines::Table,
                            Machines::Id,
                        ))
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in [
                Maintenances::Table.into_iden(),
                Refuels::Table.into_iden(),
                FuelTanks::Table.into_iden(),
                Machines::Table.into_iden(),
            ] {
                manager
                    .drop_table(Table::drop().table(table).to_owned())
                    .await?;
            }
            Ok(())
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Machines {
        Table,
        Id,
        TenantId,
        FarmId,
        Name,
        Kind,
        Brand,
        Model,
        Year,
        Identifier,
        HourMeter,
        Active,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum FuelTanks {
        Table,
        Id,
        TenantId,
        FarmId,
        Name,
        CapacityLiters,
        StockLiters,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Refuels {
        Table,
        Id,
        TenantId,
        MachineId,
        TankId,
        Liters,
        HourMeter,
        PreviousHourMeter,
        RefuelDate,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub enum Maintenances {
        Table,
        Id,
        TenantId,
        MachineId,
        Kind,
        Description,
        MaintenanceDate,
        HourMeter,
        Cost,
        SupplierId,
        Payment,
        DueDate,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240801_000005_create_commercial_tables {
    use super::cols;
    use super::m20240801_000002_create_registry_tables::{Cultivars, Customers};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240801_000005_create_commercial_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SaleContracts::Table)
                        .if_not_exists()
                        .col(cols::id(SaleContracts::Id))
                        .col(cols::uuid(SaleContracts::TenantId))
                        .col(cols::uuid(SaleContracts::CustomerId))
                        .col(cols::text(SaleContracts::ContractNumber))
                        .col(cols::date(SaleContracts::SignedDate))
                        .col(cols::date_null(SaleContracts::DeliveryDeadline))
                        .col(cols::text(SaleContracts::Status))
                        .col(cols::text_null(SaleContracts::Notes))
                        .col(cols::timestamp(SaleContracts::CreatedAt))
                        .col(cols::timestamp(SaleContracts::UpdatedAt))
                        .foreign_key(&mut cols::fk(
                            "fk_sale_contracts_customer",
                            SaleContracts::Table,
                            SaleContracts::CustomerId,
                            Customers::Table,
                            Customers::Id,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sale_contracts_tenant_number")
                        .table(SaleContracts::Table)
                        .col(SaleContracts::TenantId)
                        .col(SaleContracts::ContractNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SaleContractItems::Table)
                        .if_not_exists()
                        .col(cols::id(SaleContractItems::Id))
                        .col(cols::uuid(SaleContractItems::TenantId))
                        .col(cols::uuid(SaleContractItems::ContractId))
                        .col(cols::uuid(SaleContractItems::CultivarId))
                        .col(cols::quantity(SaleContractItems::Quantity))
                        .col(cols::quantity(SaleContractItems::FulfilledQuantity))
                        .col(cols::quantity(SaleContractItems::UnitPrice))
                        .col(cols::position(SaleContractItems::Position))
                        .foreign_key(&mut cols::fk(
                            "fk_sale_contract_items_contract",
                            SaleContractItems::Table,
                            SaleContractItems::ContractId,
                            SaleContracts::Table,
                            SaleContracts::Id,
                        ))
                        .foreign_key(&mut cols::fk(
                            "fk_sale_contract_items_cultivar",
                            SaleContractItems::Table,
                            SaleContractItems::CultivarId,
                            Cultivars::Table,
                            Cultivars::Id,
                        ))
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SaleContractItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SaleContracts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum SaleContracts {
        Table,
        Id,
        TenantId,
        CustomerId,
        ContractNumber,
        SignedDate,
        DeliveryDeadline,
        Status,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub enum SaleContractItems {
        Table,
        Id,
        TenantId,
        ContractId,
        CultivarId,
        Quantity,
        FulfilledQuantity,
        UnitPrice,
        Position,
    }
}

mod m20240801_000006_create_seed_tables {
    use super::cols;
    use super::m20240801_000002_create_registry_tables::{Cultivars, Customers, Plots};
    use super::m20240801_000005_create_commercial_tables::SaleContractItems;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240801_000006_create_seed_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Buys::Table)
                        .if_not_exists()
                        .col(cols::id(Buys::Id))
                        .col(cols::uuid(Buys::TenantId))
                        .col(cols::uuid(Buys::CultivarId))
                        .col(cols::uuid(Buys::SupplierId))
                        .col(cols::quantity(Buys::Quantity))
                        .col(cols::quantity(Buys::UnitPrice))
                        .col(cols::money(Buys::TotalValue))
                        .col(cols::date(Buys::BuyDate))
                        .col(cols::text_null(Buys::InvoiceNumber))
                        .col(cols::text(Buys::Payment))
                        .col(cols::date_null(Buys::DueDate))
                        .col(cols::text_null(Buys::Notes))
                        .col(cols::timestamp(Buys::CreatedAt))
                        .col(cols::timestamp(Buys::UpdatedAt))
                        .foreign_key(&mut cols::fk(
                            "fk_buys_cultivar",
                            Buys::Table,
                            Buys::CultivarId,
                            Cultivars::Table,
                            Cultivars::Id,
                        ))
                        .foreign_key(&mut cols::fk(
                            "fk_buys_supplier",
                            Buys::Table,
                            Buys::SupplierId,
                            Customers::Table,
                            Customers::Id,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Plantings::Table)
                        .if_not_exists()
                        .col(cols::id(Plantings::Id))
                        .col(cols::uuid(Plantings::TenantId))
                        .col(cols::uuid(Plantings::CultivarId))
                        .col(cols::uuid(Plantings::PlotId))
                        .col(cols::text(Plantings::Season))
                        .col(cols::quantity(Plantings::Quantity))
                        .col(cols::quantity_null(Plantings::AreaHa))
                        .col(cols::date(Plantings::PlantingDate))
                        .col(cols::text_null(Plantings::Notes))
                        .col(cols::timestamp(Plantings::CreatedAt))
                        .col(cols::timestamp(Plantings::UpdatedAt))
                        .foreign_key(&mut cols::fk(
                            "fk_plantings_cultivar",
                            Plantings::Table,
                            Plantings::CultivarId,
                            Cultivars::Table,
                            Cultivars::Id,
                        ))
                        .foreign_key(&mut cols::fk(
                            "fk_plantings_plot",
                            Plantings::Table,
                            Plantings::PlotId,
                            Plots::Table,
                            Plots::Id,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Harvests::Table)
                        .if_not_exists()
                        .col(cols::id(Harvests::Id))
                        .col(cols::uuid(Harvests::TenantId))
                        .col(cols::uuid(Harvests::CultivarId))
                        .col(cols::uuid(Harvests::PlotId))
                        .col(cols::text(Harvests::Season))
                        .col(cols::quantity(Harvests::Quantity))
                        .col(cols::date(Harvests::HarvestDate))
                        .col(cols::text_null(Harvests::Notes))
                        .col(cols::timestamp(Harvests::CreatedAt))
                        .col(cols::timestamp(Harvests::UpdatedAt))
                        .foreign_key(&mut cols::fk(
                            "fk_harvests_cultivar",
                            Harvests::Table,
                            Harvests::CultivarId,
                            Cultivars::Table,
                            Cultivars::Id,
                        ))
                        .foreign_key(&mut cols::fk(
                            "fk_harvests_plot",
                            Harvests::Table,
                            Harvests::PlotId,
                            Plots::Table,
                            Plots::Id,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Discards::Table)
                        .if_not_exists()
                        .col(cols::id(Discards::Id))
                        .col(cols::uuid(Discards::TenantId))
                        .col(cols::uuid(Discards::CultivarId))
                        .col(cols::quantity(Discards::Quantity))
                        .col(cols::text(Discards::Reason))
                        .col(cols::date(Discards::DiscardDate))
                        .col(cols::timestamp(Discards::CreatedAt))
                        .col(cols::timestamp(Discards::UpdatedAt))
                        .foreign_key(&mut cols::fk(
                            "fk_discards_cultivar",
                            Discards::Table,
                            Discards::CultivarId,
                            Cultivars::Table,
                            Cultivars::Id,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SaleExits::Table)
                        .if_not_exists()
                        .col(cols::id(SaleExits::Id))
                        .col(cols::uuid(SaleExits::TenantId))
                        .col(cols::uuid(SaleExits::CultivarId))
                        .col(cols::uuid(SaleExits::CustomerId))
                        .col(cols::uuid_null(SaleExits::ContractItemId))
                        .col(cols::quantity(SaleExits::Quantity))
                        .col(cols::quantity(SaleExits::UnitPrice))
                        .col(cols::money(SaleExits::TotalValue))
                        .col(cols::date(SaleExits::SaleDate))
                        .col(cols::text_null(SaleExits::InvoiceNumber))
                        .col(cols::text(SaleExits::Payment))
                        .col(cols::date_null(SaleExits::DueDate))
                        .col(cols::text_null(SaleExits::Notes))
                        .col(cols::timestamp(SaleExits::CreatedAt))
                        .col(cols::timestamp(SaleExits::UpdatedAt))
                        .foreign_key(&mut cols::fk(
                            "fk_sale_exits_cultivar",
                            SaleExits::Table,
                            SaleExits::CultivarId,
                            Cultivars::Table,
                            Cultivars::Id,
                        ))
                        .foreign_key(&mut cols::fk(
                            "fk_sale_exits_customer",
                            SaleExits::Table,
                            SaleExits::CustomerId,
                            Customers::Table,
                            Customers::Id,
                        ))
                        .foreign_key(&mut cols::fk(
                            "fk_sale_exits_contract_item",
                            SaleExits::Table,
                            SaleExits::ContractItemId,
                            SaleContractItems::Table,
                            SaleContractItems::Id,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(IndustrySales::Table)
                        .if_not_exists()
                        .col(cols::id(IndustrySales::Id))
                        .col(cols::uuid(IndustrySales::TenantId))
                        .col(cols::uuid(IndustrySales::CultivarId))
                        .col(cols::uuid(IndustrySales::CustomerId))
                        .col(cols::quantity(IndustrySales::Quantity))
                        .col(cols::quantity(IndustrySales::UnitPrice))
                        .col(cols::money(IndustrySales::DiscountPercent))
                        .col(cols::money(IndustrySales::TotalValue))
                        .col(cols::date(IndustrySales::SaleDate))
                        .col(cols::text_null(IndustrySales::InvoiceNumber))
                        .col(cols::text(IndustrySales::Payment))
                        .col(cols::date_null(IndustrySales::DueDate))
                        .col(cols::text_null(IndustrySales::Notes))
                        .col(cols::timestamp(IndustrySales::CreatedAt))
                        .col(cols::timestamp(IndustrySales::UpdatedAt))
                        .foreign_key(&mut cols::fk(
                            "fk_industry_sales_cultivar",
                            IndustrySales::Table,
                            IndustrySales::CultivarId,
                            Cultivars::Table,
                            Cultivars::Id,
                        ))
                        .foreign_key(&mut cols::fk(
                            "fk_industry_sales_customer",
                            IndustrySales::Table,
                            IndustrySales::CustomerId,
                            Customers::Table,
                            Customers::Id,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sale_exits_tenant_date")
                        .table(SaleExits::Table)
                        .col(SaleExits::TenantId)
                        .col(SaleExits::SaleDate)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in [
                IndustrySales::Table.into_iden(),
                SaleExits::Table.into_iden(),
                Discards::Table.into_iden(),
                Harvests::Table.into_iden(),
                Plantings::Table.into_iden(),
                Buys::Table.into_iden(),
            ] {
                manager
                    .drop_table(Table::drop().table(table).to_owned())
                    .await?;
            }
            Ok(())
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub enum Buys {
        Table,
        Id,
        TenantId,
        CultivarId,
        SupplierId,
        Quantity,
        UnitPrice,
        TotalValue,
        BuyDate,
        InvoiceNumber,
        Payment,
        DueDate,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Plantings {
        Table,
        Id,
        TenantId,
        CultivarId,
        PlotId,
        Season,
        Quantity,
        AreaHa,
        PlantingDate,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Harvests {
        Table,
        Id,
        TenantId,
        CultivarId,
        PlotId,
        Season,
        Quantity,
        HarvestDate,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Discards {
        Table,
        Id,
        TenantId,
        CultivarId,
        Quantity,
        Reason,
        DiscardDate,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub enum SaleExits {
        Table,
        Id,
        TenantId,
        CultivarId,
        CustomerId,
        ContractItemId,
        Quantity,
        UnitPrice,
        TotalValue,
        SaleDate,
        InvoiceNumber,
        Payment,
        DueDate,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub enum IndustrySales {
        Table,
        Id,
        TenantId,
        CultivarId,
        CustomerId,
        Quantity,
        UnitPrice,
        DiscountPercent,
        TotalValue,
        SaleDate,
        InvoiceNumber,
        Payment,
        DueDate,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240801_000007_create_finance_tables {
    use super::cols;
    use super::m20240801_000002_create_registry_tables::Customers;
    use super::m20240801_000003_create_input_tables::Purchases;
    use super::m20240801_000004_create_machinery_tables::Maintenances;
    use super::m20240801_000006_create_seed_tables::{Buys, IndustrySales, SaleExits};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240801_000007_create_finance_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AccountsReceivable::Table)
                        .if_not_exists()
                        .col(cols::id(AccountsReceivable::Id))
                        .col(cols::uuid(AccountsReceivable::TenantId))
                        .col(cols::uuid(AccountsReceivable::CustomerId))
                        .col(cols::text(AccountsReceivable::Description))
                        .col(cols::money(AccountsReceivable::Amount))
                        .col(cols::date(AccountsReceivable::DueDate))
                        .col(cols::text(AccountsReceivable::Status))
                        .col(cols::date_null(AccountsReceivable::PaidAt))
                        .col(cols::uuid_null(AccountsReceivable::SaleExitId))
                        .col(cols::uuid_null(AccountsReceivable::IndustrySaleId))
                        .col(cols::timestamp(AccountsReceivable::CreatedAt))
                        .col(cols::timestamp(AccountsReceivable::UpdatedAt))
                        .foreign_key(&mut cols::fk(
                            "fk_receivables_customer",
                            AccountsReceivable::Table,
                            AccountsReceivable::CustomerId,
                            Customers::Table,
                            Customers::Id,
                        ))
                        .foreign_key(&mut cols::fk(
                            "fk_receivables_sale_exit",
                            AccountsReceivable::Table,
                            AccountsReceivable::SaleExitId,
                            SaleExits::Table,
                            SaleExits::Id,
                        ))
                        .foreign_key(&mut cols::fk(
                            "fk_receivables_industry_sale",
                            AccountsReceivable::Table,
                            AccountsReceivable::IndustrySaleId,
                            IndustrySales::Table,
                            IndustrySales::Id,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AccountsPayable::Table)
                        .if_not_exists()
                        .col(cols::id(AccountsPayable::Id))
                        .col(cols::uuid(AccountsPayable::TenantId))
                        .col(cols::uuid_null(AccountsPayable::SupplierId))
                        .col(cols::text(AccountsPayable::Description))
                        .col(cols::money(AccountsPayable::Amount))
                        .col(cols::date(AccountsPayable::DueDate))
                        .col(cols::text(AccountsPayable::Status))
                        .col(cols::date_null(AccountsPayable::PaidAt))
                        .col(cols::uuid_null(AccountsPayable::PurchaseId))
                        .col(cols::uuid_null(AccountsPayable::BuyId))
                        .col(cols::uuid_null(AccountsPayable::MaintenanceId))
                        .col(cols::timestamp(AccountsPayable::CreatedAt))
                        .col(cols::timestamp(AccountsPayable::UpdatedAt))
                        .foreign_key(&mut cols::fk(
                            "fk_payables_supplier",
                            AccountsPayable::Table,
                            AccountsPayable::SupplierId,
                            Customers::Table,
                            Customers::Id,
                        ))
                        .foreign_key(&mut cols::fk(
                            "fk_payables_purchase",
                            AccountsPayable::Table,
                            AccountsPayable::PurchaseId,
                            Purchases::Table,
                            Purchases::Id,
                        ))
                        .foreign_key(&mut cols::fk(
                            "fk_payables_buy",
                            AccountsPayable::Table,
                            AccountsPayable::BuyId,
                            Buys::Table,
                            Buys::Id,
                        ))
                        .foreign_key(&mut cols::fk(
                            "fk_payables_maintenance",
                            AccountsPayable::Table,
                            AccountsPayable::MaintenanceId,
                            Maintenances::Table,
                            Maintenances::Id,
                        ))
                        .to_owned(),
                )
                .await?;

            for (name, table, status, due) in [
                (
                    "idx_receivables_status_due",
                    AccountsReceivable::Table.into_iden(),
                    AccountsReceivable::Status.into_iden(),
                    AccountsReceivable::DueDate.into_iden(),
                ),
                (
                    "idx_payables_status_due",
                    AccountsPayable::Table.into_iden(),
                    AccountsPayable::Status.into_iden(),
                    AccountsPayable::DueDate.into_iden(),
                ),
            ] {
                manager
                    .create_index(
                        Index::create()
                            .if_not_exists()
                            .name(name)
                            .table(table)
                            .col(status)
                            .col(due)
                            .to_owned(),
                    )
                    .await?;
            }

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AccountsPayable::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(AccountsReceivable::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum AccountsReceivable {
        Table,
        Id,
        TenantId,
        CustomerId,
        Description,
        Amount,
        DueDate,
        Status,
        PaidAt,
        SaleExitId,
        IndustrySaleId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum AccountsPayable {
        Table,
        Id,
        TenantId,
        SupplierId,
        Description,
        Amount,
        DueDate,
        Status,
        PaidAt,
        PurchaseId,
        BuyId,
        MaintenanceId,
        CreatedAt,
        UpdatedAt,
    }
}
