use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::core::{build_exclusion_set, extract_decline_reasons};
use crate::models::{MatchesQuery, SelectOptions};
use crate::routes::errors::{storage_failure, ApiError};
use crate::routes::{AppState, AuthenticatedMatchmaker, MatchLimits};

/// Configure match routes under `/api/matches`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/{person_id}", web::get().to(find_matches));
}

/// Clamp the requested result size; zero or negative yields no results
pub fn resolve_limit(requested: Option<i64>, limits: &MatchLimits) -> usize {
    match requested {
        None => limits.default_limit.min(limits.max_limit),
        Some(n) if n <= 0 => 0,
        Some(n) => usize::try_from(n).unwrap_or(usize::MAX).min(limits.max_limit),
    }
}

/// Find match candidates for one of the caller's people
///
/// GET /api/matches/{person_id}?limit=3
///
/// Candidates come from every matchmaker's active roster. Anyone already
/// decided on for this person, or already introduced to them, is skipped.
async fn find_matches(
    state: web::Data<AppState>,
    auth: AuthenticatedMatchmaker,
    path: web::Path<Uuid>,
    query: web::Query<MatchesQuery>,
) -> Result<HttpResponse, ApiError> {
    let person_id = path.into_inner();
    let matchmaker_id = auth.id();
    let limit = resolve_limit(query.limit, &state.limits);

    tracing::info!("Finding matches for person: {}, limit: {}", person_id, limit);

    // Verify person exists and belongs to matchmaker
    let subject = state
        .supabase
        .get_person(person_id, matchmaker_id)
        .await
        .map_err(|e| storage_failure("Failed to fetch person", e))?
        .ok_or_else(|| ApiError::not_found("Person not found"))?;

    let (pool, decisions, introductions) = tokio::try_join!(
        state.supabase.list_match_pool(person_id),
        state.supabase.list_decisions(person_id, matchmaker_id),
        state.supabase.list_introductions_for_person(person_id),
    )
    .map_err(|e| storage_failure("Failed to fetch match inputs", e))?;

    let options = SelectOptions {
        exclude_ids: build_exclusion_set(person_id, &decisions, &introductions),
        decline_reasons: extract_decline_reasons(&decisions),
        limit,
    };

    tracing::debug!(
        "Pool of {} for {}, excluding {}",
        pool.len(),
        person_id,
        options.exclude_ids.len()
    );

    let matches = state
        .matcher
        .select_matches(&subject, &pool, matchmaker_id, &options);

    tracing::info!(
        "Returning {} matches for person {} (from {} candidates)",
        matches.len(),
        person_id,
        pool.len()
    );

    Ok(HttpResponse::Ok().json(matches))
}
