use super::jwt::JwtAuth;
use super::role::Role;
use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Extract the token from `Authorization: Bearer` or the `access_token` cookie.
fn extract_token_from_request(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        cookie
                            .trim()
                            .split_once('=')
                            .filter(|(name, _)| *name == "access_token")
                            .map(|(_, value)| value.to_string())
                    })
                })
        })
        .filter(|t| !t.is_empty())
}

/// State for [`require_roles`]: the verifier plus the roles a route accepts.
#[derive(Clone)]
pub struct RoleGuard {
    auth: JwtAuth,
    /// `None` admits any verified user.
    allowed: Option<Arc<[Role]>>,
}

impl RoleGuard {
    pub fn new(auth: JwtAuth, allowed: impl IntoIterator<Item = Role>) -> Self {
        Self {
            auth,
            allowed: Some(allowed.into_iter().collect()),
        }
    }

    pub fn authenticated(auth: JwtAuth) -> Self {
        Self {
            auth,
            allowed: None,
        }
    }
}

/// Rejects the request unless it carries a valid token for a verified user
/// holding one of the guard's roles.
///
/// - missing or invalid token: 401
/// - `email_verified == false`: 403
/// - none of the required roles: 403
///
/// On success the claims are inserted into request extensions, where
/// [`AuthUser`](super::AuthUser) picks them up.
pub async fn require_roles(
    State(guard): State<RoleGuard>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token_from_request(request.headers()) else {
        tracing::debug!("No bearer token on request");
        return AppError::Unauthorized("Authentication required".to_string()).into_response();
    };

    let claims = match guard.auth.verify(&token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("JWT verification failed: {}", e);
            return AppError::Unauthorized("Invalid or expired token".to_string())
                .into_response();
        }
    };

    if !claims.email_verified {
        tracing::info!(user_id = %claims.sub, "Rejected unverified user");
        return AppError::Forbidden("Email address is not verified".to_string()).into_response();
    }

    if let Some(allowed) = &guard.allowed
        && !claims.has_any_role(allowed)
    {
        tracing::info!(user_id = %claims.sub, roles = ?claims.roles, "Missing required role");
        return AppError::Forbidden("Insufficient permissions".to_string()).into_response();
    }

    request.extensions_mut().insert(claims);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthUser, JwtConfig};
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    fn jwt() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("test-secret-that-is-at-least-32-characters"))
    }

    fn app(guard: RoleGuard) -> Router {
        Router::new()
            .route(
                "/",
                get(|AuthUser(claims): AuthUser| async move { claims.email }),
            )
            .layer(middleware::from_fn_with_state(guard, require_roles))
    }

    async fn call(app: Router, token: Option<String>) -> StatusCode {
        let mut builder = Request::builder().uri("/");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        app.oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    fn token(roles: &[&str], verified: bool) -> String {
        let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        jwt()
            .issue(Uuid::now_v7(), "u@example.com", &roles, verified)
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let guard = RoleGuard::new(jwt(), [Role::Admin]);
        assert_eq!(call(app(guard), None).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let guard = RoleGuard::new(jwt(), [Role::Admin]);
        assert_eq!(
            call(app(guard), Some("not.a.jwt".into())).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_unverified_email_is_forbidden() {
        let guard = RoleGuard::new(jwt(), [Role::Admin]);
        assert_eq!(
            call(app(guard), Some(token(&["admin"], false))).await,
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_wrong_role_is_forbidden() {
        let guard = RoleGuard::new(jwt(), [Role::Admin, Role::Manager]);
        assert_eq!(
            call(app(guard), Some(token(&["customer"], true))).await,
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_matching_role_passes() {
        let guard = RoleGuard::new(jwt(), [Role::Admin, Role::Manager]);
        assert_eq!(
            call(app(guard), Some(token(&["manager"], true))).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_authenticated_guard_accepts_any_role() {
        let guard = RoleGuard::authenticated(jwt());
        assert_eq!(
            call(app(guard), Some(token(&["customer"], true))).await,
            StatusCode::OK
        );
    }

    #[test]
    fn test_cookie_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "theme=dark; access_token=abc.def.ghi".parse().unwrap(),
        );
        assert_eq!(
            extract_token_from_request(&headers).as_deref(),
            Some("abc.def.ghi")
        );
    }
}
