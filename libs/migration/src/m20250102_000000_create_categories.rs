use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250101_000000_bootstrap::{drop_touch_trigger_sql, touch_trigger_sql};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(pk_uuid(Categories::Id))
                    .col(string(Categories::Name).unique_key())
                    .col(string(Categories::Slug).unique_key())
                    .col(text_null(Categories::Description))
                    .col(text_null(Categories::Logo))
                    .col(uuid_null(Categories::ParentId))
                    .col(
                        timestamp_with_time_zone(Categories::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Categories::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_categories_parent_id")
                            .from(Categories::Table, Categories::ParentId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CategoryAttributes::Table)
                    .if_not_exists()
                    .col(pk_uuid(CategoryAttributes::Id))
                    .col(uuid(CategoryAttributes::CategoryId))
                    .col(string(CategoryAttributes::AttributeName))
                    .col(string(CategoryAttributes::AttributeType).default("text"))
                    .col(boolean(CategoryAttributes::IsRequired).default(false))
                    .col(
                        ColumnDef::new(CategoryAttributes::Options)
                            .array(ColumnType::Text)
                            .not_null()
                            .default(Expr::cust("ARRAY[]::TEXT[]")),
                    )
                    .col(integer(CategoryAttributes::DisplayOrder).default(0))
                    .col(
                        timestamp_with_time_zone(CategoryAttributes::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(CategoryAttributes::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_category_attributes_category_id")
                            .from(CategoryAttributes::Table, CategoryAttributes::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_category_attributes_category_id")
                    .table(CategoryAttributes::Table)
                    .col(CategoryAttributes::CategoryId)
                    .to_owned(),
            )
            .await?;

        let db = manager.get_connection();
        db.execute_unprepared(&touch_trigger_sql("categories"))
            .await?;
        db.execute_unprepared(&touch_trigger_sql("category_attributes"))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(&drop_touch_trigger_sql("category_attributes"))
            .await?;
        db.execute_unprepared(&drop_touch_trigger_sql("categories"))
            .await?;

        manager
            .drop_table(Table::drop().table(CategoryAttributes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Categories {
    Table,
    Id,
    Name,
    Slug,
    Description,
    Logo,
    ParentId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum CategoryAttributes {
    Table,
    Id,
    CategoryId,
    AttributeName,
    AttributeType,
    IsRequired,
    Options,
    DisplayOrder,
    CreatedAt,
    UpdatedAt,
}
