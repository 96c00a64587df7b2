use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::{MatchError, MatchService};
use crate::models::{
    CandidateKind, CreateGroupMatchRequest, CreateMatchRequest, ErrorResponse, HealthResponse,
    MatchListQuery, MatchStatus, RecommendationsResponse, ScoredCandidate, UpdateMatchRequest,
};
use crate::routes::auth::AuthenticatedPerson;
use crate::services::{CacheKey, CacheManager, DirectoryClient, PostgresMatchStore};

/// Production wiring of the lifecycle service: the directory backs both the
/// profile and candidate stores, Postgres backs the match records.
pub type AppMatchService = MatchService<DirectoryClient, DirectoryClient, PostgresMatchStore>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AppMatchService>,
    pub matches: PostgresMatchStore,
    pub cache: Arc<CacheManager>,
}

/// Configure all matching routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/matching/counselors", web::get().to(list_counselors))
        .route(
            "/matching/counselors/recommended",
            web::get().to(recommended_counselors),
        )
        .route("/matching/counselors/{id}", web::get().to(get_counselor))
        .route(
            "/matching/groups/recommended",
            web::get().to(recommended_groups),
        )
        .service(
            web::resource("/matching/groups")
                .route(web::get().to(list_groups))
                .route(web::post().to(create_group_match)),
        )
        .route("/matching/groups/{id}", web::get().to(get_group))
        .route("/matching/mine", web::get().to(my_matches))
        .route("/matching", web::post().to(create_counselor_match))
        .route("/matching/{id}", web::put().to(update_match));
}

/// Health check endpoint.
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = state.matches.health_check().await.unwrap_or(false);
    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// List the eligible counselor pool.
///
/// GET /api/v1/matching/counselors
async fn list_counselors(state: web::Data<AppState>) -> Result<HttpResponse, MatchError> {
    let pool = state.service.list_all(CandidateKind::Counselor).await?;
    Ok(HttpResponse::Ok().json(pool))
}

/// List the eligible support group pool.
///
/// GET /api/v1/matching/groups
async fn list_groups(state: web::Data<AppState>) -> Result<HttpResponse, MatchError> {
    let pool = state.service.list_all(CandidateKind::Group).await?;
    Ok(HttpResponse::Ok().json(pool))
}

/// Recommended counselors for the authenticated person.
///
/// GET /api/v1/matching/counselors/recommended
async fn recommended_counselors(
    state: web::Data<AppState>,
    person: AuthenticatedPerson,
) -> Result<HttpResponse, MatchError> {
    recommend(&state, &person.person_id, CandidateKind::Counselor).await
}

/// Recommended support groups for the authenticated person.
///
/// GET /api/v1/matching/groups/recommended
async fn recommended_groups(
    state: web::Data<AppState>,
    person: AuthenticatedPerson,
) -> Result<HttpResponse, MatchError> {
    recommend(&state, &person.person_id, CandidateKind::Group).await
}

/// Cache-assisted recommendation lookup.
///
/// Shortlists are advisory, so a cached entry within the TTL is served
/// as-is; cache failures degrade to a direct computation.
async fn recommend(
    state: &web::Data<AppState>,
    person_id: &str,
    kind: CandidateKind,
) -> Result<HttpResponse, MatchError> {
    let cache_key = CacheKey::recommendations(person_id, kind);

    if let Ok(cached) = state.cache.get::<Vec<ScoredCandidate>>(&cache_key).await {
        tracing::debug!("Serving cached {:?} shortlist for {}", kind, person_id);
        return Ok(HttpResponse::Ok().json(RecommendationsResponse {
            count: cached.len(),
            matches: cached,
        }));
    }

    let matches = state.service.recommend(person_id, kind).await?;

    if let Err(e) = state.cache.set(&cache_key, &matches).await {
        tracing::warn!("Failed to cache shortlist for {}: {}", person_id, e);
    }

    tracing::info!(
        "Returning {} recommended {:?} candidates for person {}",
        matches.len(),
        kind,
        person_id
    );

    Ok(HttpResponse::Ok().json(RecommendationsResponse {
        count: matches.len(),
        matches,
    }))
}

/// Fetch one counselor.
///
/// GET /api/v1/matching/counselors/{id}
async fn get_counselor(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, MatchError> {
    let candidate = state
        .service
        .get_candidate(&path.into_inner(), CandidateKind::Counselor)
        .await?;
    Ok(HttpResponse::Ok().json(candidate))
}

/// Fetch one support group.
///
/// GET /api/v1/matching/groups/{id}
async fn get_group(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, MatchError> {
    let candidate = state
        .service
        .get_candidate(&path.into_inner(), CandidateKind::Group)
        .await?;
    Ok(HttpResponse::Ok().json(candidate))
}

/// Create a match request with a counselor.
///
/// POST /api/v1/matching
///
/// Request body:
/// ```json
/// { "counselorId": "string" }
/// ```
async fn create_counselor_match(
    state: web::Data<AppState>,
    person: AuthenticatedPerson,
    req: web::Json<CreateMatchRequest>,
) -> Result<HttpResponse, MatchError> {
    if let Err(errors) = req.validate() {
        return Ok(validation_failed(errors));
    }

    let record = state
        .service
        .create_match(&person.person_id, &req.counselor_id, CandidateKind::Counselor)
        .await?;

    invalidate_shortlists(&state, &person.person_id).await;

    Ok(HttpResponse::Created().json(record))
}

/// Apply to join a support group.
///
/// POST /api/v1/matching/groups
///
/// Request body:
/// ```json
/// { "groupId": "string" }
/// ```
async fn create_group_match(
    state: web::Data<AppState>,
    person: AuthenticatedPerson,
    req: web::Json<CreateGroupMatchRequest>,
) -> Result<HttpResponse, MatchError> {
    if let Err(errors) = req.validate() {
        return Ok(validation_failed(errors));
    }

    let record = state
        .service
        .create_match(&person.person_id, &req.group_id, CandidateKind::Group)
        .await?;

    invalidate_shortlists(&state, &person.person_id).await;

    Ok(HttpResponse::Created().json(record))
}

/// Move a match request to a new status.
///
/// PUT /api/v1/matching/{id}
///
/// Request body:
/// ```json
/// { "status": "ACCEPTED|REJECTED|CANCELLED|COMPLETED", "notes": "...", "rejectionReason": "..." }
/// ```
async fn update_match(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<UpdateMatchRequest>,
) -> Result<HttpResponse, MatchError> {
    let status = match MatchStatus::parse(&req.status) {
        Some(status) => status,
        None => {
            return Ok(HttpResponse::BadRequest().json(ErrorResponse {
                error: "invalid_status".to_string(),
                message: "Status must be one of: PENDING, ACCEPTED, REJECTED, CANCELLED, COMPLETED"
                    .to_string(),
                status_code: 400,
            }));
        }
    };

    let record = state
        .service
        .update_status(
            path.into_inner(),
            status,
            req.notes.clone(),
            req.rejection_reason.clone(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(record))
}

/// Match requests of the authenticated person, newest first.
///
/// GET /api/v1/matching/mine?kind=COUNSELOR|GROUP
async fn my_matches(
    state: web::Data<AppState>,
    person: AuthenticatedPerson,
    query: web::Query<MatchListQuery>,
) -> Result<HttpResponse, MatchError> {
    let kind = match &query.kind {
        Some(raw) => match CandidateKind::parse(raw) {
            Some(kind) => Some(kind),
            None => {
                return Ok(HttpResponse::BadRequest().json(ErrorResponse {
                    error: "invalid_kind".to_string(),
                    message: "Kind must be COUNSELOR or GROUP".to_string(),
                    status_code: 400,
                }));
            }
        },
        None => None,
    };

    let records = state.service.list_matches(&person.person_id, kind).await?;
    Ok(HttpResponse::Ok().json(records))
}

fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    tracing::info!("Request validation failed: {:?}", errors);
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Best-effort cache invalidation after a state change.
async fn invalidate_shortlists(state: &web::Data<AppState>, person_id: &str) {
    if let Err(e) = state.cache.invalidate_recommendations(person_id).await {
        tracing::warn!("Failed to invalidate shortlists for {}: {}", person_id, e);
    }
}
