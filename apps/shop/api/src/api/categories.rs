use axum::Router;
use domain_categories::{CategoryService, PgCategoryRepository, handlers};

pub fn router(state: &crate::state::AppState) -> Router {
    let repository =
        PgCategoryRepository::new(state.db.clone(), state.config.missing_child_policy);
    handlers::router(CategoryService::new(repository))
}
