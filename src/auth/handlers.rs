use actix_web::{web, HttpResponse, HttpRequest};
use serde::{Deserialize, Serialize};
use crate::auth::identity::bearer_token;
use crate::error::{AppError, AuthError};
use crate::AppState;
use tracing::{info, error, warn};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received login request for email: {}", req.email);

    if !state.login_limiter.check_rate_limit(&req.email).await {
        warn!("Login rate limit exceeded for email: {}", req.email);
        return Err(AuthError::RateLimited.into());
    }

    match state.auth_service.authenticate(&req.email, &req.password).await {
        Ok(token) => {
            info!("Login successful for email: {}", req.email);
            Ok(HttpResponse::Ok().json(AuthResponse { token }))
        }
        Err(e) => {
            error!("Login failed for email: {}: {}", req.email, e);
            Err(e)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

pub async fn register(
    req: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received registration request for email: {}", req.email);

    // Attempt registration
    match state.auth_service.register(&req.email, &req.password).await {
        Ok(_) => {
            info!("Registration successful for email: {}", req.email);
        }
        Err(e) => {
            error!("Registration failed for email: {}: {}", req.email, e);
            return Err(e); // Return early if registration fails
        }
    }

    // Attempt login immediately after successful registration
    match state.auth_service.authenticate(&req.email, &req.password).await {
        Ok(token) => {
            info!("Post-registration login successful for email: {}", req.email);
            Ok(HttpResponse::Created().json(AuthResponse { token }))
        }
        Err(e) => {
            // This case should ideally not happen if registration succeeded and password validation is consistent
            error!("Post-registration login failed unexpectedly for email: {}: {}", req.email, e);
            Err(e)
        }
    }
}

pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    // Get token from Authorization header
    let token = bearer_token(&req).ok_or(AuthError::Unauthorized)?;

    // Invalidate the token
    state.auth_service.invalidate_token(token).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Successfully logged out"
    })))
}
