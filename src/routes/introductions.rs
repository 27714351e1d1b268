use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::models::{CreateIntroductionRequest, UpdateIntroductionRequest};
use crate::routes::errors::{storage_failure, ApiError};
use crate::routes::{AppState, AuthenticatedMatchmaker};

const INTRODUCTION_NOT_FOUND: &str = "Introduction not found";

/// Configure introduction routes under `/api/introductions`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::post().to(create_introduction))
            .route(web::get().to(list_introductions)),
    )
    .service(
        web::resource("/{id}")
            .route(web::get().to(get_introduction))
            .route(web::put().to(update_introduction)),
    );
}

/// POST /api/introductions
///
/// The caller must own at least one side; the other may belong to any matchmaker.
async fn create_introduction(
    state: web::Data<AppState>,
    auth: AuthenticatedMatchmaker,
    req: web::Json<CreateIntroductionRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate().map_err(ApiError::validation)?;

    let owns_either = state
        .supabase
        .owns_any_person(&[req.person_a_id, req.person_b_id], auth.id())
        .await
        .map_err(|e| storage_failure("Failed to fetch people", e))?;
    if !owns_either {
        return Err(ApiError::not_found("Person not found"));
    }

    let introduction = state
        .supabase
        .create_introduction(auth.id(), &req)
        .await
        .map_err(|e| storage_failure("Failed to create introduction", e))?;

    tracing::info!(
        "Introduced {} and {} ({})",
        introduction.person_a_id,
        introduction.person_b_id,
        introduction.id
    );

    Ok(HttpResponse::Created().json(introduction))
}

/// GET /api/introductions
async fn list_introductions(
    state: web::Data<AppState>,
    auth: AuthenticatedMatchmaker,
) -> Result<HttpResponse, ApiError> {
    let introductions = state
        .supabase
        .list_introductions(auth.id())
        .await
        .map_err(|e| storage_failure("Failed to list introductions", e))?;

    Ok(HttpResponse::Ok().json(introductions))
}

/// GET /api/introductions/{id}
async fn get_introduction(
    state: web::Data<AppState>,
    auth: AuthenticatedMatchmaker,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let introduction = state
        .supabase
        .get_introduction(path.into_inner(), auth.id())
        .await
        .map_err(|e| storage_failure("Failed to fetch introduction", e))?
        .ok_or_else(|| ApiError::not_found(INTRODUCTION_NOT_FOUND))?;

    Ok(HttpResponse::Ok().json(introduction))
}

/// PUT /api/introductions/{id}
async fn update_introduction(
    state: web::Data<AppState>,
    auth: AuthenticatedMatchmaker,
    path: web::Path<Uuid>,
    req: web::Json<UpdateIntroductionRequest>,
) -> Result<HttpResponse, ApiError> {
    let introduction = state
        .supabase
        .update_introduction(path.into_inner(), auth.id(), &req)
        .await
        .map_err(|e| storage_failure("Failed to update introduction", e))?
        .ok_or_else(|| ApiError::not_found(INTRODUCTION_NOT_FOUND))?;

    Ok(HttpResponse::Ok().json(introduction))
}
