use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240105_000001_create_registry_tables::Migration),
            Box::new(m20240105_000002_create_lookup_tables::Migration),
            Box::new(m20240105_000003_create_offers_table::Migration),
            Box::new(m20240105_000004_create_articles_tables::Migration),
            Box::new(m20240105_000005_create_production_tables::Migration),
            Box::new(m20240105_000006_create_employees_tables::Migration),
            Box::new(m20240105_000007_create_users_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240105_000001_create_registry_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240105_000001_create_registry_tables"
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
                        .col(ColumnDef::new(Customers::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Customers::BusinessName).string().not_null())
                        .col(ColumnDef::new(Customers::VatNumber).string().not_null())
                        .col(ColumnDef::new(Customers::TaxCode).string().null())
                        .col(ColumnDef::new(Customers::Address).string().null())
                        .col(ColumnDef::new(Customers::City).string().null())
                        .col(ColumnDef::new(Customers::PostalCode).string().null())
                        .col(ColumnDef::new(Customers::Province).string().null())
                        .col(ColumnDef::new(Customers::Email).string().null())
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(ColumnDef::new(Customers::Notes).string().null())
                        .col(
                            ColumnDef::new(Customers::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Customers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Customers::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customers_vat_number")
                        .table(Customers::Table)
                        .col(Customers::VatNumber)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customers_business_name")
                        .table(Customers::Table)
                        .col(Customers::BusinessName)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CustomerDivisions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CustomerDivisions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerDivisions::CustomerId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CustomerDivisions::Name).string().not_null())
                        .col(ColumnDef::new(CustomerDivisions::ContactName).string().null())
                        .col(ColumnDef::new(CustomerDivisions::Email).string().null())
                        .col(ColumnDef::new(CustomerDivisions::Phone).string().null())
                        .col(
                            ColumnDef::new(CustomerDivisions::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(CustomerDivisions::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CustomerDivisions::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customer_divisions_customer_id")
                        .table(CustomerDivisions::Table)
                        .col(CustomerDivisions::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CustomerShippingAddresses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CustomerShippingAddresses::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerShippingAddresses::DivisionId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerShippingAddresses::Label)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerShippingAddresses::Address)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerShippingAddresses::City)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerShippingAddresses::PostalCode)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerShippingAddresses::Province)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerShippingAddresses::IsDefault)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(CustomerShippingAddresses::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(CustomerShippingAddresses::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerShippingAddresses::UpdatedAt)
                                .timestamp()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customer_shipping_addresses_division_id")
                        .table(CustomerShippingAddresses::Table)
                        .col(CustomerShippingAddresses::DivisionId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Suppliers::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Suppliers::BusinessName).string().not_null())
                        .col(ColumnDef::new(Suppliers::VatNumber).string().not_null())
                        .col(ColumnDef::new(Suppliers::Email).string().null())
                        .col(ColumnDef::new(Suppliers::Phone).string().null())
                        .col(
                            ColumnDef::new(Suppliers::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Suppliers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Suppliers::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CustomerShippingAddresses::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CustomerDivisions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Customers {
        Table,
        Id,
        BusinessName,
        VatNumber,
        TaxCode,
        Address,
        City,
        PostalCode,
        Province,
        Email,
        Phone,
        Notes,
        Removed,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum CustomerDivisions {
        Table,
        Id,
        CustomerId,
        Name,
        ContactName,
        Email,
        Phone,
        Removed,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum CustomerShippingAddresses {
        Table,
        Id,
        DivisionId,
        Label,
        Address,
        City,
        PostalCode,
        Province,
        IsDefault,
        Removed,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Suppliers {
        Table,
        Id,
        BusinessName,
        VatNumber,
        Email,
        Phone,
        Removed,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240105_000002_create_lookup_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240105_000002_create_lookup_tables"
        }
    }

    /// Plain name registries share one shape; the richer lookups get their
    /// own table definitions below.
    const NAME_REGISTRIES: [&str; 9] = [
        "activities",
        "sectors",
        "seasonalities",
        "order_types",
        "las_work_lines",
        "ls_resources",
        "article_categories",
        "materials",
        "machineries",
    ];

    async fn create_name_registry(manager: &SchemaManager<'_>, table: &str) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new(table))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("name")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("removed"))
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("updated_at")).timestamp().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(&format!("idx_{}_name", table))
                    .table(Alias::new(table))
                    .col(Alias::new("name"))
                    .to_owned(),
            )
            .await
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in NAME_REGISTRIES {
                create_name_registry(manager, table).await?;
            }

            manager
                .create_table(
                    Table::create()
                        .table(LasFamilies::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(LasFamilies::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(LasFamilies::Name).string().not_null())
                        .col(ColumnDef::new(LasFamilies::Code).string().not_null())
                        .col(
                            ColumnDef::new(LasFamilies::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(LasFamilies::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(LasFamilies::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_las_families_code")
                        .table(LasFamilies::Table)
                        .col(LasFamilies::Code)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PalletTypes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PalletTypes::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PalletTypes::Name).string().not_null())
                        .col(ColumnDef::new(PalletTypes::LengthMm).integer().not_null())
                        .col(ColumnDef::new(PalletTypes::WidthMm).integer().not_null())
                        .col(ColumnDef::new(PalletTypes::HeightMm).integer().not_null())
                        .col(ColumnDef::new(PalletTypes::TechnicalSheet).string().null())
                        .col(
                            ColumnDef::new(PalletTypes::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(PalletTypes::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(PalletTypes::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CriticalIssues::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CriticalIssues::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CriticalIssues::Name).string().not_null())
                        .col(ColumnDef::new(CriticalIssues::Description).string().null())
                        .col(
                            ColumnDef::new(CriticalIssues::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(CriticalIssues::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CriticalIssues::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in NAME_REGISTRIES {
                manager
                    .drop_table(Table::drop().table(Alias::new(table)).to_owned())
                    .await?;
            }
            manager
                .drop_table(Table::drop().table(LasFamilies::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PalletTypes::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CriticalIssues::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum LasFamilies {
        Table,
        Id,
        Name,
        Code,
        Removed,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum PalletTypes {
        Table,
        Id,
        Name,
        LengthMm,
        WidthMm,
        HeightMm,
        TechnicalSheet,
        Removed,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum CriticalIssues {
        Table,
        Id,
        Name,
        Description,
        Removed,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240105_000003_create_offers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240105_000003_create_offers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Offers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Offers::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Offers::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Offers::CustomerDivisionId).uuid().not_null())
                        .col(ColumnDef::new(Offers::ActivityId).uuid().null())
                        .col(ColumnDef::new(Offers::SectorId).uuid().null())
                        .col(ColumnDef::new(Offers::SeasonalityId).uuid().null())
                        .col(ColumnDef::new(Offers::OrderTypeId).uuid().null())
                        .col(ColumnDef::new(Offers::LasFamilyId).uuid().not_null())
                        .col(ColumnDef::new(Offers::LasWorkLineId).uuid().null())
                        .col(ColumnDef::new(Offers::LsResourceId).uuid().null())
                        .col(ColumnDef::new(Offers::OfferNumber).string().not_null())
                        .col(ColumnDef::new(Offers::OfferDate).date().not_null())
                        .col(ColumnDef::new(Offers::Status).string().null())
                        .col(ColumnDef::new(Offers::Notes).string().null())
                        .col(
                            ColumnDef::new(Offers::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Offers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Offers::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_offers_offer_number")
                        .table(Offers::Table)
                        .col(Offers::OfferNumber)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_offers_customer_id")
                        .table(Offers::Table)
                        .col(Offers::CustomerId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Offers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Offers {
        Table,
        Id,
        CustomerId,
        CustomerDivisionId,
        ActivityId,
        SectorId,
        SeasonalityId,
        OrderTypeId,
        LasFamilyId,
        LasWorkLineId,
        LsResourceId,
        OfferNumber,
        OfferDate,
        Status,
        Notes,
        Removed,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240105_000004_create_articles_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240105_000004_create_articles_tables"
        }
    }

    async fn create_pivot(
        manager: &SchemaManager<'_>,
        table: &str,
        other_column: &str,
    ) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new(table))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("article_id")).uuid().not_null())
                    .col(ColumnDef::new(Alias::new(other_column)).uuid().not_null())
                    .col(
                        ColumnDef::new(Alias::new("removed"))
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(&format!("idx_{}_article_id", table))
                    .table(Alias::new(table))
                    .col(Alias::new("article_id"))
                    .to_owned(),
            )
            .await
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Articles::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Articles::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Articles::OfferId).uuid().not_null())
                        .col(ColumnDef::new(Articles::CategoryId).uuid().null())
                        .col(ColumnDef::new(Articles::PalletTypeId).uuid().null())
                        .col(ColumnDef::new(Articles::CodArticleLas).string().not_null())
                        .col(ColumnDef::new(Articles::Description).string().not_null())
                        .col(
                            ColumnDef::new(Articles::UnitPrice)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Articles::PiecesPerPallet).integer().null())
                        .col(ColumnDef::new(Articles::LineLayout).string().null())
                        .col(
                            ColumnDef::new(Articles::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Articles::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Articles::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_articles_cod_article_las")
                        .table(Articles::Table)
                        .col(Articles::CodArticleLas)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_articles_offer_id")
                        .table(Articles::Table)
                        .col(Articles::OfferId)
                        .to_owned(),
                )
                .await?;

            create_pivot(manager, "article_materials", "material_id").await?;
            create_pivot(manager, "article_machineries", "machinery_id").await?;
            create_pivot(manager, "article_critical_issues", "critical_issue_id").await?;

            manager
                .create_table(
                    Table::create()
                        .table(ArticleInstructions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ArticleInstructions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ArticleInstructions::ArticleId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ArticleInstructions::Kind).string().not_null())
                        .col(ColumnDef::new(ArticleInstructions::Code).string().not_null())
                        .col(ColumnDef::new(ArticleInstructions::Title).string().not_null())
                        .col(ColumnDef::new(ArticleInstructions::Document).string().null())
                        .col(ColumnDef::new(ArticleInstructions::Notes).string().null())
                        .col(
                            ColumnDef::new(ArticleInstructions::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(ArticleInstructions::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ArticleInstructions::UpdatedAt)
                                .timestamp()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_article_instructions_article_id")
                        .table(ArticleInstructions::Table)
                        .col(ArticleInstructions::ArticleId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_article_instructions_code")
                        .table(ArticleInstructions::Table)
                        .col(ArticleInstructions::Code)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in [
                "article_materials",
                "article_machineries",
                "article_critical_issues",
            ] {
                manager
                    .drop_table(Table::drop().table(Alias::new(table)).to_owned())
                    .await?;
            }
            manager
                .drop_table(Table::drop().table(ArticleInstructions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Articles::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Articles {
        Table,
        Id,
        OfferId,
        CategoryId,
        PalletTypeId,
        CodArticleLas,
        Description,
        UnitPrice,
        PiecesPerPallet,
        LineLayout,
        Removed,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum ArticleInstructions {
        Table,
        Id,
        ArticleId,
        Kind,
        Code,
        Title,
        Document,
        Notes,
        Removed,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240105_000005_create_production_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240105_000005_create_production_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductionOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductionOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionOrders::ArticleId).uuid().not_null())
                        .col(
                            ColumnDef::new(ProductionOrders::ShippingAddressId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrders::OrderProductionNumber)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionOrders::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(ProductionOrders::WorkedQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(ProductionOrders::DeliveryDate).date().null())
                        .col(ColumnDef::new(ProductionOrders::Status).string().not_null())
                        .col(
                            ColumnDef::new(ProductionOrders::StatusSemaforo)
                                .json()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionOrders::Notes).string().null())
                        .col(
                            ColumnDef::new(ProductionOrders::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(ProductionOrders::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionOrders::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_production_orders_number")
                        .table(ProductionOrders::Table)
                        .col(ProductionOrders::OrderProductionNumber)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_production_orders_article_id")
                        .table(ProductionOrders::Table)
                        .col(ProductionOrders::ArticleId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_production_orders_status")
                        .table(ProductionOrders::Table)
                        .col(ProductionOrders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProductionLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductionLogs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionLogs::OrderId).uuid().not_null())
                        .col(ColumnDef::new(ProductionLogs::EmployeeId).uuid().not_null())
                        .col(ColumnDef::new(ProductionLogs::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(ProductionLogs::LoggedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionLogs::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_production_logs_order_id")
                        .table(ProductionLogs::Table)
                        .col(ProductionLogs::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductionLogs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ProductionOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ProductionOrders {
        Table,
        Id,
        ArticleId,
        ShippingAddressId,
        OrderProductionNumber,
        Quantity,
        WorkedQuantity,
        DeliveryDate,
        Status,
        StatusSemaforo,
        Notes,
        Removed,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum ProductionLogs {
        Table,
        Id,
        OrderId,
        EmployeeId,
        Quantity,
        LoggedAt,
        Removed,
    }
}

mod m20240105_000006_create_employees_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240105_000006_create_employees_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Employees::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Employees::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Employees::FirstName).string().not_null())
                        .col(ColumnDef::new(Employees::LastName).string().not_null())
                        .col(ColumnDef::new(Employees::EmployeeCode).string().not_null())
                        .col(ColumnDef::new(Employees::Email).string().null())
                        .col(ColumnDef::new(Employees::Phone).string().null())
                        .col(
                            ColumnDef::new(Employees::PortalEnabled)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Employees::PortalPinHash).text().null())
                        .col(
                            ColumnDef::new(Employees::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Employees::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Employees::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_employees_employee_code")
                        .table(Employees::Table)
                        .col(Employees::EmployeeCode)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(EmployeeContracts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(EmployeeContracts::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EmployeeContracts::EmployeeId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(EmployeeContracts::SupplierId).uuid().null())
                        .col(
                            ColumnDef::new(EmployeeContracts::ContractType)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(EmployeeContracts::StartDate).date().not_null())
                        .col(ColumnDef::new(EmployeeContracts::EndDate).date().null())
                        .col(
                            ColumnDef::new(EmployeeContracts::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(EmployeeContracts::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(EmployeeContracts::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(EmployeePortalTokens::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(EmployeePortalTokens::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EmployeePortalTokens::EmployeeId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EmployeePortalTokens::TokenHash)
                                .text()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EmployeePortalTokens::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EmployeePortalTokens::ExpiresAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EmployeePortalTokens::Revoked)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_employee_portal_tokens_token_hash")
                        .table(EmployeePortalTokens::Table)
                        .col(EmployeePortalTokens::TokenHash)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderAssignments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderAssignments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderAssignments::EmployeeId).uuid().not_null())
                        .col(ColumnDef::new(OrderAssignments::OrderId).uuid().not_null())
                        .col(
                            ColumnDef::new(OrderAssignments::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(OrderAssignments::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_assignments_employee_id")
                        .table(OrderAssignments::Table)
                        .col(OrderAssignments::EmployeeId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_assignments_order_id")
                        .table(OrderAssignments::Table)
                        .col(OrderAssignments::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderAssignments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(EmployeePortalTokens::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(EmployeeContracts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Employees::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Employees {
        Table,
        Id,
        FirstName,
        LastName,
        EmployeeCode,
        Email,
        Phone,
        PortalEnabled,
        PortalPinHash,
        Removed,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum EmployeeContracts {
        Table,
        Id,
        EmployeeId,
        SupplierId,
        ContractType,
        StartDate,
        EndDate,
        Removed,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum EmployeePortalTokens {
        Table,
        Id,
        EmployeeId,
        TokenHash,
        CreatedAt,
        ExpiresAt,
        Revoked,
    }

    #[derive(DeriveIden)]
    pub(super) enum OrderAssignments {
        Table,
        Id,
        EmployeeId,
        OrderId,
        Removed,
        CreatedAt,
    }
}

mod m20240105_000007_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240105_000007_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::Username).string().not_null())
                        .col(ColumnDef::new(Users::Email).string().not_null())
                        .col(ColumnDef::new(Users::PasswordHash).text().not_null())
                        .col(ColumnDef::new(Users::FullName).string().null())
                        .col(
                            ColumnDef::new(Users::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Users::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_username")
                        .table(Users::Table)
                        .col(Users::Username)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Users {
        Table,
        Id,
        Username,
        Email,
        PasswordHash,
        FullName,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}
