use anyhow::Context;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Goal, GoalType};

const GOAL_COLUMNS: &str = "id, user_id, goal_type, target_weight_kg, current_weight_kg, \
                            target_date, is_active, created_at, updated_at";

pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    goal_type: GoalType,
    target_weight_kg: Option<f64>,
    current_weight_kg: Option<f64>,
    target_date: Option<OffsetDateTime>,
) -> anyhow::Result<Goal> {
    let goal = sqlx::query_as::<_, Goal>(&format!(
        r#"
        INSERT INTO goals (user_id, goal_type, target_weight_kg, current_weight_kg, target_date)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {GOAL_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(goal_type.as_str())
    .bind(target_weight_kg)
    .bind(current_weight_kg)
    .bind(target_date)
    .fetch_one(db)
    .await
    .context("insert goal")?;
    Ok(goal)
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Goal>> {
    let goals = sqlx::query_as::<_, Goal>(&format!(
        "SELECT {GOAL_COLUMNS} FROM goals WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list goals")?;
    Ok(goals)
}

/// Most recently created active goal.
pub async fn active_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Goal>> {
    let goal = sqlx::query_as::<_, Goal>(&format!(
        r#"
        SELECT {GOAL_COLUMNS} FROM goals
         WHERE user_id = $1 AND is_active
         ORDER BY created_at DESC
         LIMIT 1
        "#
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get active goal")?;
    Ok(goal)
}
