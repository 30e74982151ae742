use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{MealFoodRow, MealRow, MealType};

const MEAL_COLUMNS: &str = "id, user_id, meal_type, meal_date, notes, created_at";

pub async fn insert_meal_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    meal_type: MealType,
    meal_date: OffsetDateTime,
    notes: Option<&str>,
) -> anyhow::Result<MealRow> {
    let meal = sqlx::query_as::<_, MealRow>(&format!(
        r#"
        INSERT INTO meals (user_id, meal_type, meal_date, notes)
        VALUES ($1, $2, $3, $4)
        RETURNING {MEAL_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(meal_type.as_str())
    .bind(meal_date)
    .bind(notes)
    .fetch_one(&mut **tx)
    .await
    .context("insert meal")?;
    Ok(meal)
}

pub async fn insert_meal_food_tx(
    tx: &mut Transaction<'_, Postgres>,
    meal_id: Uuid,
    position: i32,
    food_id: Uuid,
    quantity_g: f64,
) -> anyhow::Result<MealFoodRow> {
    let row = sqlx::query_as::<_, MealFoodRow>(
        r#"
        INSERT INTO meal_foods (meal_id, position, food_id, quantity_g)
        VALUES ($1, $2, $3, $4)
        RETURNING id, meal_id, food_id, quantity_g
        "#,
    )
    .bind(meal_id)
    .bind(position)
    .bind(food_id)
    .bind(quantity_g)
    .fetch_one(&mut **tx)
    .await
    .context("insert meal food")?;
    Ok(row)
}

/// A user's meals, newest first, optionally bounded to `[start, end)`.
pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    start: Option<OffsetDateTime>,
    end: Option<OffsetDateTime>,
) -> anyhow::Result<Vec<MealRow>> {
    let rows = sqlx::query_as::<_, MealRow>(&format!(
        r#"
        SELECT {MEAL_COLUMNS}
          FROM meals
         WHERE user_id = $1
           AND ($2::timestamptz IS NULL OR meal_date >= $2)
           AND ($3::timestamptz IS NULL OR meal_date < $3)
         ORDER BY meal_date DESC
        "#
    ))
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await
    .context("list meals by user")?;
    Ok(rows)
}

pub async fn get_for_user(db: &PgPool, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<Option<MealRow>> {
    let row = sqlx::query_as::<_, MealRow>(&format!(
        "SELECT {MEAL_COLUMNS} FROM meals WHERE id = $1 AND user_id = $2"
    ))
    .bind(meal_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get meal")?;
    Ok(row)
}

pub async fn lines_for_meals(db: &PgPool, meal_ids: &[Uuid]) -> anyhow::Result<Vec<MealFoodRow>> {
    let rows = sqlx::query_as::<_, MealFoodRow>(
        r#"
        SELECT id, meal_id, food_id, quantity_g
          FROM meal_foods
         WHERE meal_id = ANY($1)
         ORDER BY meal_id, position
        "#,
    )
    .bind(meal_ids)
    .fetch_all(db)
    .await
    .context("list meal foods")?;
    Ok(rows)
}
