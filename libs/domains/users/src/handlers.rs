use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AuthUser, Role, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, EmptyPatchResponse,
        ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{UserError, UserResult};
use crate::models::{UpdateUser, User, UserListQuery, UserPage};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const TAG: &str = "Users";

/// OpenAPI documentation for the users API
#[derive(OpenApi)]
#[openapi(
    paths(list_users, get_user, update_user, delete_user),
    components(
        schemas(User, UpdateUser, UserPage),
        responses(
            NotFoundResponse,
            EmptyPatchResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "User account management")
    )
)]
pub struct ApiDoc;

/// Create the users router.
///
/// Every route reads the caller from request extensions, so the router must
/// sit behind an authenticating layer.
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_users))
        .route(
            "/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .with_state(shared_service)
}

fn require_any(caller: &AuthUser, roles: &[Role]) -> UserResult<()> {
    if caller.0.has_any_role(roles) {
        Ok(())
    } else {
        Err(UserError::Forbidden)
    }
}

/// List users (admin)
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(UserListQuery),
    responses(
        (status = 200, description = "One page of users", body = UserPage),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    caller: AuthUser,
    Query(query): Query<UserListQuery>,
) -> UserResult<Json<UserPage>> {
    require_any(&caller, &[Role::Admin])?;
    let page = service.list_users(query).await?;
    Ok(Json(page))
}

/// Get a user by ID (admin, manager)
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 400, response = BadRequestUuidResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    caller: AuthUser,
    UuidPath(id): UuidPath,
) -> UserResult<Json<User>> {
    require_any(&caller, &[Role::Admin, Role::Manager])?;
    let user = service.get_user(id).await?;
    Ok(Json(user))
}

/// Update a profile (the account owner, or an admin)
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, response = EmptyPatchResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    AuthUser(claims): AuthUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> UserResult<Json<User>> {
    let user = service.update_user(&claims, id, input).await?;
    Ok(Json(user))
}

/// Delete a user (admin)
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    caller: AuthUser,
    UuidPath(id): UuidPath,
) -> UserResult<impl IntoResponse> {
    require_any(&caller, &[Role::Admin])?;
    service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
