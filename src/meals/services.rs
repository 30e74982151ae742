use std::collections::HashMap;

use anyhow::Context;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    dto::{CreateMealRequest, MealFoodResponse, MealResponse},
    repo,
    repo_types::{MealFoodRow, MealRow, MealType},
};
use crate::{
    foods::{repo as foods_repo, repo_types::Food},
    nutrition::{aggregate_meal, MealLine, NutritionError},
    state::AppState,
};

#[derive(Debug, Error)]
pub enum MealError {
    #[error("{0}")]
    InvalidMealType(String),
    #[error(transparent)]
    Nutrition(#[from] NutritionError),
    #[error("unknown food id {0}")]
    UnknownFood(Uuid),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

fn check_quantities(body: &CreateMealRequest) -> Result<(), NutritionError> {
    for item in &body.foods {
        if !item.quantity_g.is_finite() || item.quantity_g < 0.0 {
            return Err(NutritionError::InvalidQuantity {
                food: item.food_id.to_string(),
                quantity_g: item.quantity_g,
            });
        }
    }
    Ok(())
}

/// Joins meals with their lines and foods and computes meal totals.
///
/// Meals keep their input order; lines keep their stored order.
pub fn assemble(
    meals: Vec<MealRow>,
    lines: Vec<MealFoodRow>,
    foods: &HashMap<Uuid, Food>,
) -> Result<Vec<MealResponse>, MealError> {
    let mut by_meal: HashMap<Uuid, Vec<MealFoodRow>> = HashMap::new();
    for line in lines {
        by_meal.entry(line.meal_id).or_default().push(line);
    }

    let mut out = Vec::with_capacity(meals.len());
    for meal in meals {
        let meal_type: MealType = meal.meal_type.parse().map_err(MealError::InvalidMealType)?;
        let rows = by_meal.remove(&meal.id).unwrap_or_default();

        let mut meal_foods = Vec::with_capacity(rows.len());
        for row in rows {
            let food = foods
                .get(&row.food_id)
                .cloned()
                .ok_or(MealError::UnknownFood(row.food_id))?;
            meal_foods.push(MealFoodResponse {
                id: row.id,
                food_id: row.food_id,
                quantity_g: row.quantity_g,
                food,
            });
        }

        let profiles: Vec<_> = meal_foods.iter().map(|mf| mf.food.profile()).collect();
        let lines: Vec<MealLine<'_>> = profiles
            .iter()
            .zip(&meal_foods)
            .map(|(p, mf)| MealLine::new(p, mf.quantity_g))
            .collect();
        let totals = aggregate_meal(&lines)?;

        out.push(MealResponse {
            id: meal.id,
            meal_type,
            meal_date: meal.meal_date,
            notes: meal.notes,
            meal_foods,
            totals,
        });
    }
    Ok(out)
}

async fn food_map(state: &AppState, lines: &[MealFoodRow]) -> anyhow::Result<HashMap<Uuid, Food>> {
    let mut ids: Vec<Uuid> = lines.iter().map(|l| l.food_id).collect();
    ids.sort_unstable();
    ids.dedup();
    let foods = foods_repo::get_many(&state.db, &ids).await?;
    Ok(foods.into_iter().map(|f| (f.id, f)).collect())
}

async fn hydrate(state: &AppState, meals: Vec<MealRow>) -> Result<Vec<MealResponse>, MealError> {
    if meals.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = meals.iter().map(|m| m.id).collect();
    let lines = repo::lines_for_meals(&state.db, &ids).await?;
    let foods = food_map(state, &lines).await?;
    assemble(meals, lines, &foods)
}

pub async fn create_meal(
    state: &AppState,
    user_id: Uuid,
    body: CreateMealRequest,
) -> Result<MealResponse, MealError> {
    let meal_type: MealType = body.meal_type.parse().map_err(MealError::InvalidMealType)?;
    check_quantities(&body)?;

    let mut wanted: Vec<Uuid> = body.foods.iter().map(|f| f.food_id).collect();
    wanted.sort_unstable();
    wanted.dedup();
    let foods: HashMap<Uuid, Food> = foods_repo::get_many(&state.db, &wanted)
        .await?
        .into_iter()
        .map(|f| (f.id, f))
        .collect();
    if let Some(missing) = wanted.iter().find(|id| !foods.contains_key(id)) {
        return Err(MealError::UnknownFood(*missing));
    }

    let mut tx = state.db.begin().await.context("begin tx")?;
    let meal = repo::insert_meal_tx(
        &mut tx,
        user_id,
        meal_type,
        body.meal_date,
        body.notes.as_deref(),
    )
    .await?;
    let mut lines = Vec::with_capacity(body.foods.len());
    for (position, item) in body.foods.iter().enumerate() {
        let row =
            repo::insert_meal_food_tx(&mut tx, meal.id, position as i32, item.food_id, item.quantity_g)
                .await?;
        lines.push(row);
    }
    tx.commit().await.context("commit tx")?;

    info!(meal_id = %meal.id, %user_id, lines = lines.len(), "meal created");
    let mut assembled = assemble(vec![meal], lines, &foods)?;
    assembled
        .pop()
        .ok_or_else(|| MealError::Internal(anyhow::anyhow!("created meal vanished")))
}

pub async fn list_meals(
    state: &AppState,
    user_id: Uuid,
    start: Option<OffsetDateTime>,
    end: Option<OffsetDateTime>,
) -> Result<Vec<MealResponse>, MealError> {
    let meals = repo::list_by_user(&state.db, user_id, start, end).await?;
    debug!(%user_id, count = meals.len(), "meals loaded");
    hydrate(state, meals).await
}

pub async fn get_meal(
    state: &AppState,
    user_id: Uuid,
    meal_id: Uuid,
) -> Result<Option<MealResponse>, MealError> {
    let Some(meal) = repo::get_for_user(&state.db, user_id, meal_id).await? else {
        return Ok(None);
    };
    Ok(hydrate(state, vec![meal]).await?.pop())
}
