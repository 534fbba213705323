use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{EmployeeId, GradeCriteriaEntry, Level, LevelCriteria};
use super::recalc::{RecalculationQueue, RecalculationTrigger};
use super::repository::PromotionRepository;
use super::service::{PromotionSelectionService, SelectionError};
use crate::config::PromotionConfig;

/// Shared state for the promotion endpoints.
pub struct PromotionApi<R> {
    pub service: Arc<PromotionSelectionService<R>>,
    pub queue: RecalculationQueue,
    pub config: PromotionConfig,
}

impl<R> PromotionApi<R> {
    fn year(&self, requested: Option<i32>) -> i32 {
        requested.unwrap_or_else(|| self.config.target_year())
    }
}

/// Level criteria as entered for one year; the year comes from the path.
#[derive(Debug, Clone, Deserialize)]
pub struct LevelCriteriaInput {
    pub level: Level,
    pub required_points: f64,
    #[serde(default)]
    pub special_required_points: Option<f64>,
    #[serde(default)]
    pub required_credits: f64,
    #[serde(default)]
    pub min_tenure: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

/// Router builder exposing criteria saves, candidate selection and point breakdowns.
pub fn promotion_router<R>(api: Arc<PromotionApi<R>>) -> Router
where
    R: PromotionRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/promotion/criteria/grades",
            put(save_grade_criteria_handler::<R>),
        )
        .route(
            "/api/v1/promotion/criteria/levels/:year",
            put(save_level_criteria_handler::<R>),
        )
        .route(
            "/api/v1/promotion/candidates/auto-select",
            post(auto_select_handler::<R>),
        )
        .route(
            "/api/v1/promotion/recalculate",
            post(recalculate_handler::<R>),
        )
        .route(
            "/api/v1/promotion/candidates/:year",
            get(list_candidates_handler::<R>),
        )
        .route(
            "/api/v1/promotion/employees/:employee_id/points",
            get(employee_points_handler::<R>),
        )
        .with_state(api)
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Saving never reports recalculation problems; the job runs after the response.
pub(crate) async fn save_grade_criteria_handler<R>(
    State(api): State<Arc<PromotionApi<R>>>,
    Json(entries): Json<Vec<GradeCriteriaEntry>>,
) -> Response
where
    R: PromotionRepository + 'static,
{
    let saved = entries.len();
    if let Err(err) = api.service.repository().save_grade_criteria(entries) {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
    }

    api.queue
        .notify(RecalculationTrigger::GradeCriteriaChanged, api.year(None));
    (StatusCode::OK, Json(json!({ "saved": saved }))).into_response()
}

pub(crate) async fn save_level_criteria_handler<R>(
    State(api): State<Arc<PromotionApi<R>>>,
    Path(year): Path<i32>,
    Json(rows): Json<Vec<LevelCriteriaInput>>,
) -> Response
where
    R: PromotionRepository + 'static,
{
    let rows: Vec<LevelCriteria> = rows
        .into_iter()
        .map(|input| LevelCriteria {
            level: input.level,
            year,
            required_points: input.required_points,
            special_required_points: input.special_required_points,
            required_credits: input.required_credits,
            min_tenure: input.min_tenure,
        })
        .collect();
    let saved = rows.len();

    if let Err(err) = api.service.repository().save_level_criteria(year, rows) {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
    }

    api.queue.notify(
        RecalculationTrigger::LevelCriteriaChanged { year },
        api.year(None),
    );
    (
        StatusCode::OK,
        Json(json!({ "year": year, "saved": saved })),
    )
        .into_response()
}

pub(crate) async fn auto_select_handler<R>(
    State(api): State<Arc<PromotionApi<R>>>,
    Query(query): Query<YearQuery>,
) -> Response
where
    R: PromotionRepository + 'static,
{
    match api.service.auto_select(api.year(query.year)) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

pub(crate) async fn recalculate_handler<R>(
    State(api): State<Arc<PromotionApi<R>>>,
    Query(query): Query<YearQuery>,
) -> Response
where
    R: PromotionRepository + 'static,
{
    let year = api.year(query.year);
    match api.queue.submit(RecalculationTrigger::Manual, year) {
        Ok(job_id) => (
            StatusCode::ACCEPTED,
            Json(json!({ "job_id": job_id, "year": year })),
        )
            .into_response(),
        Err(err) => error_response(StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
    }
}

pub(crate) async fn list_candidates_handler<R>(
    State(api): State<Arc<PromotionApi<R>>>,
    Path(year): Path<i32>,
) -> Response
where
    R: PromotionRepository + 'static,
{
    match api.service.repository().candidates(year) {
        Ok(candidates) => (StatusCode::OK, Json(candidates)).into_response(),
        Err(err) => error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

pub(crate) async fn employee_points_handler<R>(
    State(api): State<Arc<PromotionApi<R>>>,
    Path(employee_id): Path<String>,
    Query(query): Query<YearQuery>,
) -> Response
where
    R: PromotionRepository + 'static,
{
    let id = EmployeeId(employee_id);
    match api.service.employee_points(&id, api.year(query.year)) {
        Ok(breakdown) => (StatusCode::OK, Json(breakdown)).into_response(),
        Err(SelectionError::EmployeeNotFound(_)) => error_response(
            StatusCode::NOT_FOUND,
            format!("employee {id} not found"),
        ),
        Err(other) => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}
