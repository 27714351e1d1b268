use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::models::CreateDecisionRequest;
use crate::routes::errors::{storage_failure, ApiError};
use crate::routes::{AppState, AuthenticatedMatchmaker};

/// Configure decision routes under `/api/match-decisions`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::post().to(record_decision))
        .route("/{person_id}", web::get().to(list_decisions));
}

/// Record a match decision
///
/// POST /api/match-decisions
///
/// Request body:
/// ```json
/// {
///   "person_id": "uuid",
///   "candidate_id": "uuid",
///   "decision": "accepted|declined",
///   "decline_reason": "string"
/// }
/// ```
async fn record_decision(
    state: web::Data<AppState>,
    auth: AuthenticatedMatchmaker,
    req: web::Json<CreateDecisionRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate().map_err(ApiError::validation)?;

    // Verify person belongs to this matchmaker
    state
        .supabase
        .get_person(req.person_id, auth.id())
        .await
        .map_err(|e| storage_failure("Failed to fetch person", e))?
        .ok_or_else(|| ApiError::not_found("Person not found"))?;

    let decision = state
        .supabase
        .create_decision(auth.id(), &req)
        .await
        .map_err(|e| storage_failure("Failed to record decision", e))?;

    tracing::info!(
        "Recorded {:?} for person {} on candidate {}",
        decision.decision,
        decision.person_id,
        decision.candidate_id
    );

    Ok(HttpResponse::Created().json(decision))
}

/// GET /api/match-decisions/{person_id}
async fn list_decisions(
    state: web::Data<AppState>,
    auth: AuthenticatedMatchmaker,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let person_id = path.into_inner();

    state
        .supabase
        .get_person(person_id, auth.id())
        .await
        .map_err(|e| storage_failure("Failed to fetch person", e))?
        .ok_or_else(|| ApiError::not_found("Person not found"))?;

    let decisions = state
        .supabase
        .list_decisions(person_id, auth.id())
        .await
        .map_err(|e| storage_failure("Failed to list decisions", e))?;

    Ok(HttpResponse::Ok().json(decisions))
}
