use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// SQL creating the `BEFORE UPDATE` trigger that keeps `updated_at` current.
pub(crate) fn touch_trigger_sql(table: &str) -> String {
    format!(
        "CREATE TRIGGER {table}_touch_updated_at \
         BEFORE UPDATE ON {table} \
         FOR EACH ROW EXECUTE FUNCTION util.touch_updated_at()"
    )
}

pub(crate) fn drop_touch_trigger_sql(table: &str) -> String {
    format!("DROP TRIGGER IF EXISTS {table}_touch_updated_at ON {table}")
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("CREATE EXTENSION IF NOT EXISTS pgcrypto")
            .await?;
        db.execute_unprepared("CREATE SCHEMA IF NOT EXISTS util")
            .await?;
        db.execute_unprepared(
            r#"
            CREATE OR REPLACE FUNCTION util.touch_updated_at()
            RETURNS TRIGGER AS $$
            BEGIN
                NEW.updated_at = NOW();
                RETURN NEW;
            END;
            $$ LANGUAGE plpgsql
            "#,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // pgcrypto stays installed; other schemas in the cluster may use it
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS util CASCADE")
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_trigger_sql_names_trigger_after_table() {
        let sql = touch_trigger_sql("products");
        assert!(sql.starts_with("CREATE TRIGGER products_touch_updated_at"));
        assert!(sql.contains("BEFORE UPDATE ON products"));
        assert_eq!(
            drop_touch_trigger_sql("products"),
            "DROP TRIGGER IF EXISTS products_touch_updated_at ON products"
        );
    }
}
