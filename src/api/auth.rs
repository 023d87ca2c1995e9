//! Authentication gateway: `/api/auth/*`.

use serde::Deserialize;

use crate::Result;
use crate::transport::ApiClient;
use crate::types::{LoginRequest, RegisterRequest, User};

/// Payload of a successful login or registration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthData {
    pub token: String,
    pub user: User,
}

pub async fn login(api: &ApiClient, req: &LoginRequest) -> Result<AuthData> {
    api.post("/api/auth/login", Some(req), "log in").await
}

pub async fn register(api: &ApiClient, req: &RegisterRequest) -> Result<AuthData> {
    api.post("/api/auth/register", Some(req), "register").await
}
