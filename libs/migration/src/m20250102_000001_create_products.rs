use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250101_000000_bootstrap::{drop_touch_trigger_sql, touch_trigger_sql};
use crate::m20250102_000000_create_categories::{Categories, CategoryAttributes};

#[derive(DeriveMigrationName)]
pub struct Migration;

const CHILD_TABLES: [&str; 3] = [
    "product_images",
    "product_models",
    "product_attribute_values",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(ProductStatus::Enum)
                    .values([
                        ProductStatus::Available,
                        ProductStatus::LowStock,
                        ProductStatus::Unavailable,
                        ProductStatus::Featured,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(pk_uuid(Products::Id))
                    .col(string(Products::Name))
                    .col(string(Products::Slug).unique_key())
                    .col(text_null(Products::Description))
                    .col(text_null(Products::ShortDescription))
                    .col(string_null(Products::Sku).unique_key())
                    .col(decimal_len(Products::BasePrice, 10, 2))
                    .col(boolean(Products::TrackQuantity).default(true))
                    .col(boolean(Products::AllowBackorders).default(false))
                    .col(
                        ColumnDef::new(Products::Status)
                            .enumeration(
                                ProductStatus::Enum,
                                [
                                    ProductStatus::Available,
                                    ProductStatus::LowStock,
                                    ProductStatus::Unavailable,
                                    ProductStatus::Featured,
                                ],
                            )
                            .not_null()
                            .default("available"),
                    )
                    .col(
                        ColumnDef::new(Products::Tags)
                            .array(ColumnType::Text)
                            .not_null()
                            .default(Expr::cust("ARRAY[]::TEXT[]")),
                    )
                    .col(uuid(Products::CategoryId))
                    .col(
                        timestamp_with_time_zone(Products::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Products::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_category_id")
                            .from(Products::Table, Products::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductImages::Table)
                    .if_not_exists()
                    .col(pk_uuid(ProductImages::Id))
                    .col(uuid(ProductImages::ProductId))
                    .col(text(ProductImages::Url))
                    .col(string(ProductImages::Alt).default("Product Image"))
                    .col(text(ProductImages::ThumbnailUrl))
                    .col(integer(ProductImages::DisplayOrder).default(0))
                    .col(
                        timestamp_with_time_zone(ProductImages::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(ProductImages::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_images_product_id")
                            .from(ProductImages::Table, ProductImages::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductModels::Table)
                    .if_not_exists()
                    .col(pk_uuid(ProductModels::Id))
                    .col(uuid(ProductModels::ProductId))
                    .col(text(ProductModels::Url))
                    .col(text_null(ProductModels::ThumbnailUrl))
                    .col(integer(ProductModels::DisplayOrder).default(0))
                    .col(
                        timestamp_with_time_zone(ProductModels::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(ProductModels::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_models_product_id")
                            .from(ProductModels::Table, ProductModels::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductAttributeValues::Table)
                    .if_not_exists()
                    .col(pk_uuid(ProductAttributeValues::Id))
                    .col(uuid(ProductAttributeValues::ProductId))
                    .col(uuid(ProductAttributeValues::AttributeId))
                    .col(text(ProductAttributeValues::Value))
                    .col(
                        timestamp_with_time_zone(ProductAttributeValues::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(ProductAttributeValues::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_attribute_values_product_id")
                            .from(
                                ProductAttributeValues::Table,
                                ProductAttributeValues::ProductId,
                            )
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_attribute_values_attribute_id")
                            .from(
                                ProductAttributeValues::Table,
                                ProductAttributeValues::AttributeId,
                            )
                            .to(CategoryAttributes::Table, CategoryAttributes::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_category_id")
                    .table(Products::Table)
                    .col(Products::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_base_price")
                    .table(Products::Table)
                    .col(Products::BasePrice)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_product_images_product_id")
                    .table(ProductImages::Table)
                    .col(ProductImages::ProductId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_product_models_product_id")
                    .table(ProductModels::Table)
                    .col(ProductModels::ProductId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_product_attribute_values_product_id")
                    .table(ProductAttributeValues::Table)
                    .col(ProductAttributeValues::ProductId)
                    .to_owned(),
            )
            .await?;

        let db = manager.get_connection();
        db.execute_unprepared(&touch_trigger_sql("products"))
            .await?;
        for table in CHILD_TABLES {
            db.execute_unprepared(&touch_trigger_sql(table)).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for table in CHILD_TABLES {
            db.execute_unprepared(&drop_touch_trigger_sql(table))
                .await?;
        }
        db.execute_unprepared(&drop_touch_trigger_sql("products"))
            .await?;

        manager
            .drop_table(Table::drop().table(ProductAttributeValues::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductModels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(ProductStatus::Enum).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    Slug,
    Description,
    ShortDescription,
    Sku,
    BasePrice,
    TrackQuantity,
    AllowBackorders,
    Status,
    Tags,
    CategoryId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProductImages {
    Table,
    Id,
    ProductId,
    Url,
    Alt,
    ThumbnailUrl,
    DisplayOrder,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProductModels {
    Table,
    Id,
    ProductId,
    Url,
    ThumbnailUrl,
    DisplayOrder,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProductAttributeValues {
    Table,
    Id,
    ProductId,
    AttributeId,
    Value,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProductStatus {
    #[sea_orm(iden = "product_status")]
    Enum,
    #[sea_orm(iden = "available")]
    Available,
    #[sea_orm(iden = "low_stock")]
    LowStock,
    #[sea_orm(iden = "unavailable")]
    Unavailable,
    #[sea_orm(iden = "featured")]
    Featured,
}
