use anyhow::Context;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::DailyReport;
use crate::nutrition::{DayTotals, ReportText};

const REPORT_COLUMNS: &str = "id, user_id, report_date, total_calories, total_protein, total_carbs, \
                              total_fats, total_fiber, total_sugar, total_sodium, analysis, \
                              recommendations, motivation_message, created_at, updated_at";

// Serializes report writes per user for the rest of the transaction. Row locks
// cannot cover a day that has no report yet.
pub(crate) const USER_REPORT_LOCK: &str =
    "SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))";

/// Overwrites the report whose date falls in `[start, end)`, or inserts one dated `start`.
pub async fn upsert_for_day(
    db: &PgPool,
    user_id: Uuid,
    start: OffsetDateTime,
    end: OffsetDateTime,
    totals: &DayTotals,
    text: &ReportText,
) -> anyhow::Result<DailyReport> {
    let mut tx = db.begin().await.context("begin report tx")?;

    sqlx::query(USER_REPORT_LOCK)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context("lock user reports")?;

    let existing: Option<(Uuid,)> = sqlx::query_as(
        r#"
        SELECT id FROM daily_reports
         WHERE user_id = $1 AND report_date >= $2 AND report_date < $3
         ORDER BY report_date ASC
         LIMIT 1
         FOR UPDATE
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_optional(&mut *tx)
    .await
    .context("find report for day")?;

    let sql = match existing {
        Some(_) => format!(
            r#"
            UPDATE daily_reports SET
                total_calories = $2, total_protein = $3, total_carbs = $4, total_fats = $5,
                total_fiber = $6, total_sugar = $7, total_sodium = $8,
                analysis = $9, recommendations = $10, motivation_message = $11,
                updated_at = now()
             WHERE id = $1 AND user_id = $12
            RETURNING {REPORT_COLUMNS}
            "#
        ),
        None => format!(
            r#"
            INSERT INTO daily_reports
                   (user_id, report_date, total_calories, total_protein, total_carbs, total_fats,
                    total_fiber, total_sugar, total_sodium, analysis, recommendations,
                    motivation_message)
            VALUES ($12, $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {REPORT_COLUMNS}
            "#
        ),
    };

    // $1 is the existing row id on update, the day start on insert
    let query = sqlx::query_as::<_, DailyReport>(&sql);
    let query = match existing {
        Some((id,)) => query.bind(id),
        None => query.bind(start),
    };

    let report = query
        .bind(totals.total_calories)
        .bind(totals.total_protein)
        .bind(totals.total_carbs)
        .bind(totals.total_fats)
        .bind(totals.total_fiber)
        .bind(totals.total_sugar)
        .bind(totals.total_sodium)
        .bind(&text.analysis)
        .bind(&text.recommendations)
        .bind(&text.motivation)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .context("write daily report")?;

    tx.commit().await.context("commit report tx")?;
    Ok(report)
}

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    start: Option<OffsetDateTime>,
    end: Option<OffsetDateTime>,
) -> anyhow::Result<Vec<DailyReport>> {
    let reports = sqlx::query_as::<_, DailyReport>(&format!(
        r#"
        SELECT {REPORT_COLUMNS} FROM daily_reports
         WHERE user_id = $1
           AND ($2::timestamptz IS NULL OR report_date >= $2)
           AND ($3::timestamptz IS NULL OR report_date < $3)
         ORDER BY report_date DESC
        "#
    ))
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await
    .context("list daily reports")?;
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lock_is_transaction_scoped_and_keyed_by_user() {
        assert!(USER_REPORT_LOCK.contains("pg_advisory_xact_lock"));
        assert!(USER_REPORT_LOCK.contains("$1::text"));
        assert!(!USER_REPORT_LOCK.contains("$2"));
    }

    #[tokio::test]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn concurrent_generation_keeps_one_report_per_day() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL");
        let db = PgPool::connect(&url).await.unwrap();
        sqlx::migrate!("./migrations").run(&db).await.unwrap();

        let tag = Uuid::new_v4().simple().to_string();
        let (user_id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO users (email, username, password_hash) VALUES ($1, $2, 'x') RETURNING id",
        )
        .bind(format!("{tag}@nutribite.test"))
        .bind(&tag[..20])
        .fetch_one(&db)
        .await
        .unwrap();

        let start = time::macros::datetime!(2024-03-10 00:00 UTC);
        let end = start + time::Duration::days(1);
        let totals = DayTotals::default();
        let text = ReportText {
            analysis: "Today you consumed 0 calories and 0g of protein.".into(),
            recommendations: String::new(),
            motivation: String::new(),
        };

        let (a, b) = tokio::join!(
            upsert_for_day(&db, user_id, start, end, &totals, &text),
            upsert_for_day(&db, user_id, start, end, &totals, &text),
        );
        assert_eq!(a.unwrap().id, b.unwrap().id);
        assert_eq!(list_by_user(&db, user_id, Some(start), Some(end)).await.unwrap().len(), 1);
    }
}
