use axum::{Router, middleware, routing::get};
use axum_helpers::{Role, RoleGuard, require_roles};

use crate::state::AppState;

pub mod categories;
pub mod health;
pub mod products;
pub mod users;

/// Creates the API routes without the `/api` prefix, which `create_router`
/// adds.
///
/// Catalog routes need `admin` or `manager`. The users router only requires
/// a verified caller here and checks roles per route.
pub fn routes(state: &AppState) -> Router {
    let catalog_guard = RoleGuard::new(state.jwt.clone(), [Role::Admin, Role::Manager]);
    let users_guard = RoleGuard::authenticated(state.jwt.clone());

    Router::new()
        .nest(
            "/products",
            products::router(state).route_layer(middleware::from_fn_with_state(
                catalog_guard.clone(),
                require_roles,
            )),
        )
        .nest(
            "/categories",
            categories::router(state).route_layer(middleware::from_fn_with_state(
                catalog_guard,
                require_roles,
            )),
        )
        .nest(
            "/users",
            users::router(state)
                .route_layer(middleware::from_fn_with_state(users_guard, require_roles)),
        )
}

/// `/ready`, merged next to `/health` outside the `/api` prefix.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
