use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use service::auth::{AuthError, AuthService, CredentialStore};

use crate::errors::ApiError;

/// What the handlers need from the auth core. Implemented by [`AuthService`]
/// for every store; tests may plug in anything else.
#[async_trait]
pub trait Auth: Send + Sync {
    async fn login(&self, email: &str, password: &str, app_id: i32) -> Result<String, AuthError>;
    async fn register_new_user(&self, email: &str, password: &str) -> Result<i64, AuthError>;
    async fn is_admin(&self, user_id: i64) -> Result<bool, AuthError>;
}

#[async_trait]
impl<S: CredentialStore + 'static> Auth for AuthService<S> {
    async fn login(&self, email: &str, password: &str, app_id: i32) -> Result<String, AuthError> {
        AuthService::login(self, email, password, app_id).await
    }

    async fn register_new_user(&self, email: &str, password: &str) -> Result<i64, AuthError> {
        AuthService::register_new_user(self, email, password).await
    }

    async fn is_admin(&self, user_id: i64) -> Result<bool, AuthError> {
        AuthService::is_admin(self, user_id).await
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<dyn Auth>,
}

// Absent fields deserialize to ""/0 and are reported as "<field> is required".

#[derive(Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest { pub email: String, pub password: String, pub app_id: i32 }

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse { pub token: String }

#[derive(Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct RegisterRequest { pub email: String, pub password: String }

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse { pub user_id: i64 }

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct IsAdminRequest { pub user_id: i64 }

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IsAdminResponse { pub is_admin: bool }

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(v)) => Ok(v),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "malformed request body");
            Err(ApiError::invalid_argument("malformed request body"))
        }
    }
}

fn validate_login(req: &LoginRequest) -> Result<(), ApiError> {
    if req.email.is_empty() { return Err(ApiError::invalid_argument("email is required")); }
    if req.password.is_empty() { return Err(ApiError::invalid_argument("password is required")); }
    if req.app_id == 0 { return Err(ApiError::invalid_argument("app_id is required")); }
    Ok(())
}

fn validate_register(req: &RegisterRequest) -> Result<(), ApiError> {
    if req.email.is_empty() { return Err(ApiError::invalid_argument("email is required")); }
    if req.password.is_empty() { return Err(ApiError::invalid_argument("password is required")); }
    Ok(())
}

fn validate_is_admin(req: &IsAdminRequest) -> Result<(), ApiError> {
    if req.user_id == 0 { return Err(ApiError::invalid_argument("user_id is required")); }
    Ok(())
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = LoginRequest, responses((status = 200, description = "Token issued", body = LoginResponse), (status = 400, description = "Missing field or invalid credentials", body = crate::errors::ErrorBody), (status = 500, description = "Internal", body = crate::errors::ErrorBody)))]
pub async fn login(State(state): State<ServerState>, payload: Result<Json<LoginRequest>, JsonRejection>) -> Result<Json<LoginResponse>, ApiError> {
    let req = body(payload)?;
    validate_login(&req)?;
    let token = state
        .auth
        .login(&req.email, &req.password, req.app_id)
        .await
        .map_err(|e| ApiError::login(&e))?;
    Ok(Json(LoginResponse { token }))
}

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = RegisterRequest, responses((status = 200, description = "Registered", body = RegisterResponse), (status = 400, description = "Missing field", body = crate::errors::ErrorBody), (status = 409, description = "Conflict", body = crate::errors::ErrorBody), (status = 500, description = "Internal", body = crate::errors::ErrorBody)))]
pub async fn register(State(state): State<ServerState>, payload: Result<Json<RegisterRequest>, JsonRejection>) -> Result<Json<RegisterResponse>, ApiError> {
    let req = body(payload)?;
    validate_register(&req)?;
    let user_id = state
        .auth
        .register_new_user(&req.email, &req.password)
        .await
        .map_err(|e| ApiError::register(&e))?;
    Ok(Json(RegisterResponse { user_id }))
}

#[utoipa::path(post, path = "/auth/is_admin", tag = "auth", request_body = IsAdminRequest, responses((status = 200, description = "Admin flag", body = IsAdminResponse), (status = 400, description = "Missing user_id", body = crate::errors::ErrorBody), (status = 404, description = "User not found", body = crate::errors::ErrorBody), (status = 500, description = "Internal", body = crate::errors::ErrorBody)))]
pub async fn is_admin(State(state): State<ServerState>, payload: Result<Json<IsAdminRequest>, JsonRejection>) -> Result<Json<IsAdminResponse>, ApiError> {
    let req = body(payload)?;
    validate_is_admin(&req)?;
    let is_admin = state
        .auth
        .is_admin(req.user_id)
        .await
        .map_err(|e| ApiError::is_admin(&e))?;
    Ok(Json(IsAdminResponse { is_admin }))
}
