use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::{dto::CreateFoodRequest, repo_types::Food};

const FOOD_COLUMNS: &str = "id, name, description, calories_per_100g, protein_per_100g, \
                            carbs_per_100g, fats_per_100g, fiber_per_100g, sugar_per_100g, \
                            sodium_per_100g, created_at";

pub async fn insert(db: &PgPool, body: &CreateFoodRequest) -> anyhow::Result<Food> {
    let food = sqlx::query_as::<_, Food>(&format!(
        r#"
        INSERT INTO foods (name, description, calories_per_100g, protein_per_100g,
                           carbs_per_100g, fats_per_100g, fiber_per_100g, sugar_per_100g,
                           sodium_per_100g)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {FOOD_COLUMNS}
        "#
    ))
    .bind(body.name.trim())
    .bind(body.description.as_deref())
    .bind(body.calories_per_100g)
    .bind(body.protein_per_100g)
    .bind(body.carbs_per_100g)
    .bind(body.fats_per_100g)
    .bind(body.fiber_per_100g)
    .bind(body.sugar_per_100g)
    .bind(body.sodium_per_100g)
    .fetch_one(db)
    .await
    .context("insert food")?;
    Ok(food)
}

pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Food>> {
    let food = sqlx::query_as::<_, Food>(&format!("SELECT {FOOD_COLUMNS} FROM foods WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("get food")?;
    Ok(food)
}

/// Returns the foods among `ids` that exist, in no particular order.
pub async fn get_many(db: &PgPool, ids: &[Uuid]) -> anyhow::Result<Vec<Food>> {
    let foods = sqlx::query_as::<_, Food>(&format!(
        "SELECT {FOOD_COLUMNS} FROM foods WHERE id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(db)
    .await
    .context("get foods by ids")?;
    Ok(foods)
}

pub async fn list(db: &PgPool, skip: i64, limit: i64) -> anyhow::Result<Vec<Food>> {
    let foods = sqlx::query_as::<_, Food>(&format!(
        "SELECT {FOOD_COLUMNS} FROM foods ORDER BY name ASC, id ASC LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(skip)
    .fetch_all(db)
    .await
    .context("list foods")?;
    Ok(foods)
}

pub async fn search(db: &PgPool, query: &str, limit: i64) -> anyhow::Result<Vec<Food>> {
    let pattern = format!("%{}%", escape_like(query));
    let foods = sqlx::query_as::<_, Food>(&format!(
        "SELECT {FOOD_COLUMNS} FROM foods WHERE name ILIKE $1 ORDER BY name ASC LIMIT $2"
    ))
    .bind(pattern)
    .bind(limit)
    .fetch_all(db)
    .await
    .context("search foods")?;
    Ok(foods)
}

/// High-protein, moderate-calorie foods, the recommender's candidate pool.
pub async fn lean_protein_candidates(
    db: &PgPool,
    min_protein: f64,
    max_calories: f64,
) -> anyhow::Result<Vec<Food>> {
    let foods = sqlx::query_as::<_, Food>(&format!(
        r#"
        SELECT {FOOD_COLUMNS}
          FROM foods
         WHERE protein_per_100g >= $1
           AND calories_per_100g <= $2
         ORDER BY protein_per_100g DESC, name ASC
        "#
    ))
    .bind(min_protein)
    .bind(max_calories)
    .fetch_all(db)
    .await
    .context("list recommendation candidates")?;
    Ok(foods)
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
