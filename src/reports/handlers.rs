use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, instrument};

use super::{dto::GenerateQuery, repo_types::DailyReport, services};
use crate::{auth::AuthUser, meals::dto::DateRange, state::AppState};

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/reports", get(list_reports))
        .route("/reports/generate", post(generate_report))
        .route("/reports/today", get(today_report))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "report request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[instrument(skip(state))]
pub async fn generate_report(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<GenerateQuery>,
) -> Result<(StatusCode, Json<DailyReport>), (StatusCode, String)> {
    let at = q.report_date.unwrap_or_else(OffsetDateTime::now_utc);
    let report = services::generate_daily_report(&state, user_id, at)
        .await
        .map_err(internal)?;
    Ok((StatusCode::CREATED, Json(report)))
}

#[instrument(skip(state))]
pub async fn list_reports(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(range): Query<DateRange>,
) -> Result<Json<Vec<DailyReport>>, (StatusCode, String)> {
    if let (Some(start), Some(end)) = (range.start_date, range.end_date) {
        if end < start {
            return Err((StatusCode::BAD_REQUEST, "end_date precedes start_date".into()));
        }
    }
    let reports = services::list_reports(&state, user_id, range.start_date, range.end_date)
        .await
        .map_err(internal)?;
    Ok(Json(reports))
}

#[instrument(skip(state))]
pub async fn today_report(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<DailyReport>, (StatusCode, String)> {
    let report = services::generate_daily_report(&state, user_id, OffsetDateTime::now_utc())
        .await
        .map_err(internal)?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use uuid::Uuid;

    #[tokio::test]
    async fn inverted_range_is_bad_request() {
        let state = AppState::fake();
        let range = DateRange {
            start_date: Some(datetime!(2024-03-10 00:00 UTC)),
            end_date: Some(datetime!(2024-03-09 00:00 UTC)),
        };
        let err = list_reports(State(state), AuthUser(Uuid::new_v4()), Query(range))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn generate_query_accepts_offset_dates() {
        let q: GenerateQuery =
            serde_json::from_str(r#"{"report_date":"2024-03-10T18:45:00+02:00"}"#).unwrap();
        assert_eq!(q.report_date, Some(datetime!(2024-03-10 18:45 +02:00)));
        let q: GenerateQuery = serde_json::from_str("{}").unwrap();
        assert!(q.report_date.is_none());
    }

    #[test]
    fn report_serializes_without_owner() {
        let report = DailyReport {
            id: Uuid::nil(),
            user_id: Uuid::new_v4(),
            report_date: datetime!(2024-03-10 00:00 UTC),
            total_calories: 1850.0,
            total_protein: 120.5,
            total_carbs: 200.0,
            total_fats: 60.0,
            total_fiber: 25.0,
            total_sugar: 40.0,
            total_sodium: 1500.0,
            analysis: "You consumed 1850 calories today.".into(),
            recommendations: String::new(),
            motivation_message: "Keep it up!".into(),
            created_at: datetime!(2024-03-10 21:00 UTC),
            updated_at: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("user_id").is_none());
        assert_eq!(json["report_date"], "2024-03-10T00:00:00Z");
        assert_eq!(json["total_protein"], 120.5);
    }
}
