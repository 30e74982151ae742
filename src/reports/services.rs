use time::{Duration, OffsetDateTime, Time};
use tracing::{debug, info};
use uuid::Uuid;

use super::{repo, repo_types::DailyReport};
use crate::{
    meals::{dto::MealResponse, services as meal_services},
    nutrition::{aggregate_day, derive_report, DayTotals, MealLine, NutritionError},
    preferences::load_preferences,
    state::AppState,
};

/// Calendar day containing `at`, as `[00:00, next 00:00)` in `at`'s offset.
pub fn day_range(at: OffsetDateTime) -> (OffsetDateTime, OffsetDateTime) {
    let start = at.replace_time(Time::MIDNIGHT);
    (start, start + Duration::days(1))
}

/// Sums every line of every meal into day totals.
pub fn day_totals(meals: &[MealResponse]) -> Result<DayTotals, NutritionError> {
    let profiles: Vec<_> = meals
        .iter()
        .flat_map(|m| m.meal_foods.iter())
        .map(|mf| (mf.food.profile(), mf.quantity_g))
        .collect();
    let lines: Vec<MealLine<'_>> = profiles
        .iter()
        .map(|(profile, quantity_g)| MealLine::new(profile, *quantity_g))
        .collect();
    aggregate_day(&lines)
}

/// Builds (or rebuilds) the user's report for the day containing `at`.
pub async fn generate_daily_report(
    state: &AppState,
    user_id: Uuid,
    at: OffsetDateTime,
) -> anyhow::Result<DailyReport> {
    let (start, end) = day_range(at);
    let meals = meal_services::list_meals(state, user_id, Some(start), Some(end)).await?;
    let totals = day_totals(&meals)?;
    debug!(%user_id, meals = meals.len(), calories = totals.total_calories, "day aggregated");

    let targets = load_preferences(state, user_id).await?.map(|p| p.targets());
    let text = derive_report(&totals, targets.as_ref(), &mut rand::thread_rng());

    let report = repo::upsert_for_day(&state.db, user_id, start, end, &totals, &text).await?;
    info!(%user_id, report_id = %report.id, day = %start.date(), "daily report generated");
    Ok(report)
}

pub async fn list_reports(
    state: &AppState,
    user_id: Uuid,
    start: Option<OffsetDateTime>,
    end: Option<OffsetDateTime>,
) -> anyhow::Result<Vec<DailyReport>> {
    repo::list_by_user(&state.db, user_id, start, end).await
}
