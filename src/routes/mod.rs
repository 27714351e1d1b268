// Route exports
pub mod decisions;
pub mod errors;
pub mod health;
pub mod introductions;
pub mod matches;
pub mod people;

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::Matcher;
use crate::services::{bearer_token, AuthError, Authenticator, SupabaseClient};
pub use errors::ApiError;

/// Result size bounds for the matches endpoint
#[derive(Debug, Clone, Copy)]
pub struct MatchLimits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for MatchLimits {
    fn default() -> Self {
        Self {
            default_limit: 3,
            max_limit: 20,
        }
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub supabase: Arc<SupabaseClient>,
    pub auth: Arc<Authenticator>,
    pub matcher: Matcher,
    pub limits: MatchLimits,
}

/// The matchmaker behind a verified bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedMatchmaker(pub Uuid);

impl AuthenticatedMatchmaker {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl FromRequest for AuthenticatedMatchmaker {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let header = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Box::pin(async move {
            let state = state.ok_or_else(|| ApiError::internal("Server misconfigured", "Missing application state"))?;
            let token = bearer_token(header.as_deref()).map_err(|e| ApiError::unauthorized(e.to_string()))?;

            match state.auth.verify(token).await {
                Ok(matchmaker_id) => Ok(AuthenticatedMatchmaker(matchmaker_id)),
                Err(AuthError::Upstream(e)) => {
                    tracing::error!("Auth service failure: {}", e);
                    Err(ApiError::internal("Auth service unavailable", e.to_string()))
                }
                Err(e) => {
                    tracing::debug!("Rejected token: {}", e);
                    Err(ApiError::unauthorized(e.to_string()))
                }
            }
        })
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(errors::handle_json_payload_error))
        .app_data(web::QueryConfig::default().error_handler(errors::handle_query_payload_error))
        .app_data(web::PathConfig::default().error_handler(errors::handle_path_error))
        .configure(health::configure)
        .service(
            web::scope("/api")
                .service(web::scope("/people").configure(people::configure))
                .service(web::scope("/match-decisions").configure(decisions::configure))
                .service(web::scope("/introductions").configure(introductions::configure))
                .service(web::scope("/matches").configure(matches::configure)),
        );
}
