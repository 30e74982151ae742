use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{
    dto::{PreferenceRequest, RestrictionRequest},
    repo_types::{DietaryRestriction, PreferenceRow},
};

const PREFERENCE_COLUMNS: &str = "id, user_id, target_calories, target_protein, target_carbs, \
                                  target_fats, preferred_meal_times, created_at, updated_at";

pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<PreferenceRow>> {
    let row = sqlx::query_as::<_, PreferenceRow>(&format!(
        "SELECT {PREFERENCE_COLUMNS} FROM user_preferences WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get preferences")?;
    Ok(row)
}

pub async fn restrictions(db: &PgPool, preference_id: Uuid) -> anyhow::Result<Vec<DietaryRestriction>> {
    let rows = sqlx::query_as::<_, DietaryRestriction>(
        r#"
        SELECT id, restriction_type, severity
          FROM dietary_restrictions
         WHERE preference_id = $1
         ORDER BY created_at ASC, restriction_type ASC
        "#,
    )
    .bind(preference_id)
    .fetch_all(db)
    .await
    .context("list dietary restrictions")?;
    Ok(rows)
}

/// Inserts preferences or overwrites only the fields present in `body`.
pub async fn upsert_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    body: &PreferenceRequest,
) -> anyhow::Result<PreferenceRow> {
    let row = sqlx::query_as::<_, PreferenceRow>(&format!(
        r#"
        INSERT INTO user_preferences
               (user_id, target_calories, target_protein, target_carbs, target_fats, preferred_meal_times)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id) DO UPDATE SET
            target_calories      = COALESCE(EXCLUDED.target_calories, user_preferences.target_calories),
            target_protein       = COALESCE(EXCLUDED.target_protein, user_preferences.target_protein),
            target_carbs         = COALESCE(EXCLUDED.target_carbs, user_preferences.target_carbs),
            target_fats          = COALESCE(EXCLUDED.target_fats, user_preferences.target_fats),
            preferred_meal_times = COALESCE(EXCLUDED.preferred_meal_times, user_preferences.preferred_meal_times),
            updated_at           = now()
        RETURNING {PREFERENCE_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(body.target_calories)
    .bind(body.target_protein)
    .bind(body.target_carbs)
    .bind(body.target_fats)
    .bind(body.preferred_meal_times.as_deref())
    .fetch_one(&mut **tx)
    .await
    .context("upsert preferences")?;
    Ok(row)
}

pub async fn replace_restrictions_tx(
    tx: &mut Transaction<'_, Postgres>,
    preference_id: Uuid,
    restrictions: &[RestrictionRequest],
) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM dietary_restrictions WHERE preference_id = $1")
        .bind(preference_id)
        .execute(&mut **tx)
        .await
        .context("clear dietary restrictions")?;

    for r in restrictions {
        sqlx::query(
            r#"
            INSERT INTO dietary_restrictions (preference_id, restriction_type, severity)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(preference_id)
        .bind(&r.restriction_type)
        .bind(&r.severity)
        .execute(&mut **tx)
        .await
        .context("insert dietary restriction")?;
    }
    Ok(())
}
