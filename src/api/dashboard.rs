//! HR dashboard summary.
//!
//! The SPA polls this every 30 seconds per signed-in tab, so the assembled
//! summary sits in a short-TTL cache and most polls never touch the
//! database.

use std::time::Duration;

use actix_web::{Responder, web};
use moka::future::Cache;
use once_cell::sync::Lazy;
use serde_json::{Value, json};
use sqlx::MySqlPool;

use crate::api::response;
use crate::auth::auth::AuthUser;
use crate::config::Config;

const SUMMARY_KEY: &str = "hr_summary";

static SUMMARY_CACHE: Lazy<Cache<&'static str, Value>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(8)
        .time_to_live(Duration::from_secs(30))
        .build()
});

async fn scalar(pool: &MySqlPool, sql: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(sql).fetch_one(pool).await
}

async fn build_summary(pool: &MySqlPool, config: &Config) -> Result<Value, sqlx::Error> {
    let active_employees = scalar(
        pool,
        "SELECT COUNT(*) FROM employees WHERE status = 'active'",
    )
    .await?;
    let applicants = scalar(
        pool,
        "SELECT COUNT(*) FROM employees WHERE status = 'applicant'",
    )
    .await?;

    let present_today = scalar(
        pool,
        "SELECT COUNT(*) FROM attendance WHERE date = CURDATE() AND check_in IS NOT NULL",
    )
    .await?;

    let late_today = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM attendance WHERE date = CURDATE() AND check_in > ?",
    )
    .bind(config.work_day_start)
    .fetch_one(pool)
    .await?;

    let upcoming_holidays = scalar(
        pool,
        "SELECT COUNT(*) FROM holidays \
         WHERE date BETWEEN CURDATE() AND CURDATE() + INTERVAL 30 DAY",
    )
    .await?;

    let latest_period = sqlx::query_as::<_, (u64, chrono::NaiveDate, chrono::NaiveDate, i64)>(
        r#"
        SELECT p.id, p.date_from, p.date_to,
               (SELECT COUNT(*) FROM benefit_records br
                WHERE br.period_id = p.id AND br.status = 'released') AS released_count
        FROM payroll_periods p
        ORDER BY p.date_from DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    let latest_period = latest_period.map(|(id, date_from, date_to, released_count)| {
        json!({
            "id": id,
            "date_from": date_from,
            "date_to": date_to,
            "released_count": released_count,
            "active_employees": active_employees,
        })
    });

    Ok(json!({
        "active_employees": active_employees,
        "applicants": applicants,
        "present_today": present_today,
        "late_today": late_today,
        "upcoming_holidays": upcoming_holidays,
        "latest_period": latest_period,
    }))
}

/// HR dashboard summary
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/hr",
    responses(
        (status = 200, description = "Headcount, attendance and benefit summary", body = Object, example = json!({
            "success": true,
            "data": {
                "active_employees": 42,
                "applicants": 3,
                "present_today": 39,
                "late_today": 4,
                "upcoming_holidays": 2,
                "latest_period": {"id": 7, "date_from": "2024-01-01", "date_to": "2024-01-16", "released_count": 30, "active_employees": 42}
            }
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn hr_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if let Some(cached) = SUMMARY_CACHE.get(SUMMARY_KEY).await {
        return Ok(response::ok(cached));
    }

    let summary = build_summary(pool.get_ref(), &config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to build dashboard summary");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    SUMMARY_CACHE.insert(SUMMARY_KEY, summary.clone()).await;

    Ok(response::ok(summary))
}
