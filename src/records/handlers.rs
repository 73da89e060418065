use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::ApiError,
    records::{
        aggregate::{aggregate_by_day, DayBucket},
        dto::{CreateRecordRequest, DayQuery, MonthQuery, RecordView, UpdateRecordRequest},
        repo,
        repo::{NewRecord, Record},
    },
    state::AppState,
    users::dto::MessageResponse,
    validate::Validate,
};

/// A malformed id gets the same response as a missing one.
fn parse_record_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::NotFound)
}

#[instrument(skip(state, user))]
pub async fn get_all(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<DayBucket>>, ApiError> {
    query.validate()?;
    let records = repo::list_by_month(&state.db, user.id, &query.month, query.year).await?;
    Ok(Json(aggregate_by_day(&records)))
}

#[instrument(skip(state, user))]
pub async fn get_today(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<DayQuery>,
) -> Result<Json<Vec<RecordView>>, ApiError> {
    query.validate()?;
    let records =
        repo::list_by_day(&state.db, user.id, query.day, &query.month, query.year).await?;

    let mut views: Vec<RecordView> = records.into_iter().map(RecordView::from).collect();
    // "HH:MM" sorts correctly as text.
    views.sort_by(|a, b| a.time.cmp(&b.time));
    Ok(Json(views))
}

#[instrument(skip(state, user))]
pub async fn get_by_id(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<RecordView>, ApiError> {
    let id = parse_record_id(&id)?;
    let record = repo::find_by_id(&state.db, user.id, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(RecordView::from(record)))
}

#[instrument(skip(state, user, payload))]
pub async fn add(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateRecordRequest>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    payload.validate()?;
    let record = repo::create(
        &state.db,
        user.id,
        NewRecord {
            dosage: payload.dosage,
            time: &payload.time,
            day: payload.day,
            month: &payload.month,
            year: payload.year,
        },
    )
    .await?;

    info!(user_id = %user.id, record_id = %record.id, "record created");
    Ok((StatusCode::CREATED, Json(record)))
}

#[instrument(skip(state, user, payload))]
pub async fn update_by_id(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRecordRequest>,
) -> Result<Json<Record>, ApiError> {
    let id = parse_record_id(&id)?;
    payload.validate()?;

    let record = repo::update(&state.db, user.id, id, payload.dosage, &payload.time)
        .await?
        .ok_or(ApiError::NotFound)?;

    info!(user_id = %user.id, record_id = %record.id, "record updated");
    Ok(Json(record))
}

#[instrument(skip(state, user))]
pub async fn delete_by_id(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_record_id(&id)?;

    if !repo::delete(&state.db, user.id, id).await? {
        return Err(ApiError::NotFound);
    }

    info!(user_id = %user.id, record_id = %id, "record deleted");
    Ok(Json(MessageResponse {
        message: "Record deleted".into(),
    }))
}
