use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::models::{CreatePersonRequest, UpdatePersonRequest};
use crate::routes::errors::{storage_failure, ApiError};
use crate::routes::{AppState, AuthenticatedMatchmaker};

const PERSON_NOT_FOUND: &str = "Person not found";

/// Configure roster routes under `/api/people`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::post().to(create_person))
            .route(web::get().to(list_people)),
    )
    .service(
        web::resource("/{id}")
            .route(web::get().to(get_person))
            .route(web::put().to(update_person))
            .route(web::delete().to(delete_person)),
    );
}

/// POST /api/people
async fn create_person(
    state: web::Data<AppState>,
    auth: AuthenticatedMatchmaker,
    req: web::Json<CreatePersonRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate().map_err(ApiError::validation)?;

    let person = state
        .supabase
        .create_person(auth.id(), &req)
        .await
        .map_err(|e| storage_failure("Failed to create person", e))?;

    tracing::info!("Matchmaker {} added person {}", auth.id(), person.id);

    Ok(HttpResponse::Created().json(person))
}

/// GET /api/people
async fn list_people(
    state: web::Data<AppState>,
    auth: AuthenticatedMatchmaker,
) -> Result<HttpResponse, ApiError> {
    let people = state
        .supabase
        .list_people(auth.id())
        .await
        .map_err(|e| storage_failure("Failed to list people", e))?;

    Ok(HttpResponse::Ok().json(people))
}

/// GET /api/people/{id}
async fn get_person(
    state: web::Data<AppState>,
    auth: AuthenticatedMatchmaker,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let person = state
        .supabase
        .get_person(path.into_inner(), auth.id())
        .await
        .map_err(|e| storage_failure("Failed to fetch person", e))?
        .ok_or_else(|| ApiError::not_found(PERSON_NOT_FOUND))?;

    Ok(HttpResponse::Ok().json(person))
}

/// PUT /api/people/{id}
async fn update_person(
    state: web::Data<AppState>,
    auth: AuthenticatedMatchmaker,
    path: web::Path<Uuid>,
    req: web::Json<UpdatePersonRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate().map_err(ApiError::validation)?;

    let person = state
        .supabase
        .update_person(path.into_inner(), auth.id(), &req)
        .await
        .map_err(|e| storage_failure("Failed to update person", e))?
        .ok_or_else(|| ApiError::not_found(PERSON_NOT_FOUND))?;

    Ok(HttpResponse::Ok().json(person))
}

/// DELETE /api/people/{id}
///
/// Soft delete: the person stays on the roster but leaves every match pool.
async fn delete_person(
    state: web::Data<AppState>,
    auth: AuthenticatedMatchmaker,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let person = state
        .supabase
        .deactivate_person(path.into_inner(), auth.id())
        .await
        .map_err(|e| storage_failure("Failed to deactivate person", e))?
        .ok_or_else(|| ApiError::not_found(PERSON_NOT_FOUND))?;

    tracing::info!("Matchmaker {} deactivated person {}", auth.id(), person.id);

    Ok(HttpResponse::Ok().json(person))
}
