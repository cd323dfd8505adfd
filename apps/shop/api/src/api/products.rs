use axum::Router;
use domain_products::{PgProductRepository, ProductService, handlers};

pub fn router(state: &crate::state::AppState) -> Router {
    let repository =
        PgProductRepository::new(state.db.clone(), state.config.missing_child_policy);
    handlers::router(ProductService::new(repository))
}
