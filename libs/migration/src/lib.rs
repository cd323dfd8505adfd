pub use sea_orm_migration::prelude::*;

mod m20250101_000000_bootstrap;
mod m20250101_000001_create_users;
mod m20250102_000000_create_categories;
mod m20250102_000001_create_products;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000000_bootstrap::Migration),
            Box::new(m20250101_000001_create_users::Migration),
            Box::new(m20250102_000000_create_categories::Migration),
            Box::new(m20250102_000001_create_products::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_ordered_by_name() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();

        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.first().map(String::as_str), Some("m20250101_000000_bootstrap"));
    }
}
