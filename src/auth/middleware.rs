// Authentication middleware for protected routes

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{header, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::auth::{error::AuthError, models::Role, token::TokenService};

/// Authenticated user extractor for protected routes
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub email: String,
    pub role: Role,
}

fn bearer_token(value: &str) -> Result<&str, AuthError> {
    value.strip_prefix("Bearer ").ok_or(AuthError::InvalidToken)
}

fn validate_header_token(auth_header: &str) -> Result<AuthenticatedUser, AuthError> {
    let token = bearer_token(auth_header)?;

    let jwt_secret = std::env::var("JWT_SECRET")
        .map_err(|_| AuthError::ConfigError("JWT_SECRET not configured".to_string()))?;

    let token_service = TokenService::new(jwt_secret);
    let claims = token_service.validate_access_token(token)?;
    let role = Role::from_str(&claims.role).map_err(AuthError::InvalidRole)?;

    Ok(AuthenticatedUser {
        user_id: claims.sub,
        email: claims.email,
        role,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidToken)?;

        validate_header_token(auth_header)
    }
}

/// Authorization middleware that requires a role at or above a threshold
///
/// Validates the bearer token and checks the claimed role against the
/// requirement before the request reaches the handler.
#[derive(Debug, Clone)]
pub struct RequireRole {
    required_role: Role,
}

impl RequireRole {
    /// Create a new RequireRole middleware with the specified role requirement
    pub fn new(required_role: Role) -> Self {
        Self { required_role }
    }

    /// Create a middleware that requires Admin role
    pub fn admin() -> Self {
        Self::new(Role::Admin)
    }

    /// Create a middleware that requires Manager role (or higher)
    pub fn manager() -> Self {
        Self::new(Role::Manager)
    }

    /// Middleware function that validates role-based access
    pub async fn middleware(
        self,
        request: Request<Body>,
        next: Next,
    ) -> Result<Response, AuthError> {
        let endpoint = request.uri().path().to_string();

        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .ok_or_else(|| {
                warn!(
                    "Missing Authorization header in request to protected endpoint: {}",
                    endpoint
                );
                AuthError::MissingToken
            })?
            .to_str()
            .map_err(|_| {
                warn!(
                    "Invalid Authorization header format for endpoint: {}",
                    endpoint
                );
                AuthError::InvalidToken
            })?;

        let user = validate_header_token(auth_header)?;

        if !user.role.satisfies(self.required_role) {
            return Err(AuthError::InsufficientPermissions {
                required: self.required_role,
                actual: user.role,
            });
        }

        Ok(next.run(request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
        assert!(bearer_token("Basic abc").is_err());
        assert!(bearer_token("bearer abc").is_err());
    }

    #[test]
    fn test_validate_header_token_round_trip() {
        std::env::set_var("JWT_SECRET", "middleware_test_secret");

        let token_service = TokenService::new("middleware_test_secret".to_string());
        let token = token_service
            .generate_access_token(7, "manager@example.com", "MANAGER")
            .unwrap();

        let user = validate_header_token(&format!("Bearer {}", token)).unwrap();
        assert_eq!(user.user_id, 7);
        assert_eq!(user.role, Role::Manager);
    }

    #[test]
    fn test_validate_header_token_rejects_unknown_role() {
        std::env::set_var("JWT_SECRET", "middleware_test_secret");

        let token_service = TokenService::new("middleware_test_secret".to_string());
        let token = token_service
            .generate_access_token(7, "user@example.com", "SUPERVISOR")
            .unwrap();

        let result = validate_header_token(&format!("Bearer {}", token));
        assert!(result.is_err());
    }
}
