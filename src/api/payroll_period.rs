use actix_web::{Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::api::{audit, response};
use crate::auth::auth::AuthUser;
use crate::model::holiday::Holiday;
use crate::model::payroll_period::PayrollPeriod;
use crate::rules::period::{default_date_to, select_holidays};

#[derive(Deserialize, ToSchema)]
pub struct CreatePeriod {
    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub date_from: NaiveDate,

    /// Derived from `date_from` when omitted: +15 days in a 31-day month,
    /// otherwise +14 days.
    #[schema(example = "2024-01-16", value_type = String, format = "date", nullable = true)]
    pub date_to: Option<NaiveDate>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePeriod {
    #[schema(value_type = Option<String>, format = "date", nullable = true)]
    pub date_from: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date", nullable = true)]
    pub date_to: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PeriodQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 10)]
    pub per_page: Option<u32>,
}

/// Recomputes a period's holiday selection from the full holiday list and
/// overwrites whatever was selected before. Runs on every range change, so
/// manual deselections never survive one.
async fn replace_period_holidays(
    pool: &MySqlPool,
    period_id: u64,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> Result<Vec<u64>, sqlx::Error> {
    let holidays =
        sqlx::query_as::<_, Holiday>("SELECT id, name, holiday_type, date FROM holidays")
            .fetch_all(pool)
            .await?;

    let selected = select_holidays(&holidays, date_from, date_to);

    sqlx::query("DELETE FROM period_holidays WHERE period_id = ?")
        .bind(period_id)
        .execute(pool)
        .await?;

    for holiday_id in &selected {
        sqlx::query("INSERT INTO period_holidays (period_id, holiday_id) VALUES (?, ?)")
            .bind(period_id)
            .bind(holiday_id)
            .execute(pool)
            .await?;
    }

    Ok(selected)
}

/// Create payroll period
#[utoipa::path(
    post,
    path = "/api/v1/payroll/periods",
    request_body = CreatePeriod,
    responses(
        (status = 201, description = "Period created with auto-selected holidays", body = Object, example = json!({
            "success": true,
            "data": {"id": 3, "date_from": "2024-01-01", "date_to": "2024-01-16", "selected_holidays": [1]}
        })),
        (status = 400, description = "Invalid range")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll Periods"
)]
pub async fn create_period(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreatePeriod>,
) -> actix_web::Result<impl Responder> {
    auth.require_accountant_or_admin()?;

    let date_from = payload.date_from;
    let date_to = payload.date_to.unwrap_or_else(|| default_date_to(date_from));

    if date_from > date_to {
        return Ok(response::bad_request("date_from cannot be after date_to"));
    }

    let result = sqlx::query("INSERT INTO payroll_periods (date_from, date_to) VALUES (?, ?)")
        .bind(date_from)
        .bind(date_to)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create payroll period");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let period_id = result.last_insert_id();

    let selected = replace_period_holidays(pool.get_ref(), period_id, date_from, date_to)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, period_id, "Failed to select period holidays");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    audit::record(
        pool.get_ref(),
        &auth,
        "create",
        "payroll_period",
        Some(period_id),
        Some(format!("Created period {} to {}", date_from, date_to)),
    )
    .await;

    Ok(response::created(json!({
        "id": period_id,
        "date_from": date_from,
        "date_to": date_to,
        "selected_holidays": selected,
    })))
}

/// Update payroll period
///
/// Changing either bound re-derives the holiday selection. A `date_from`
/// change without an explicit `date_to` re-derives the closing date too.
#[utoipa::path(
    put,
    path = "/api/v1/payroll/periods/{period_id}",
    request_body = UpdatePeriod,
    params(("period_id", description = "Payroll period ID")),
    responses(
        (status = 200, description = "Period updated"),
        (status = 400, description = "Invalid range"),
        (status = 404, description = "Period not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll Periods"
)]
pub async fn update_period(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdatePeriod>,
) -> actix_web::Result<impl Responder> {
    auth.require_accountant_or_admin()?;

    let period_id = path.into_inner();

    let current = sqlx::query_as::<_, PayrollPeriod>(
        "SELECT id, date_from, date_to FROM payroll_periods WHERE id = ?",
    )
    .bind(period_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, period_id, "Failed to fetch payroll period");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let current = match current {
        Some(p) => p,
        None => return Ok(response::not_found("Payroll period not found")),
    };

    let date_from = body.date_from.unwrap_or(current.date_from);
    let date_to = match (body.date_from, body.date_to) {
        (_, Some(to)) => to,
        (Some(from), None) => default_date_to(from),
        (None, None) => current.date_to,
    };

    if date_from > date_to {
        return Ok(response::bad_request("date_from cannot be after date_to"));
    }

    sqlx::query("UPDATE payroll_periods SET date_from = ?, date_to = ? WHERE id = ?")
        .bind(date_from)
        .bind(date_to)
        .bind(period_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, period_id, "Failed to update payroll period");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let range_changed = date_from != current.date_from || date_to != current.date_to;
    let selected = if range_changed {
        replace_period_holidays(pool.get_ref(), period_id, date_from, date_to)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, period_id, "Failed to reselect period holidays");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?
    } else {
        sqlx::query_scalar::<_, u64>(
            "SELECT holiday_id FROM period_holidays WHERE period_id = ?",
        )
        .bind(period_id)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, period_id, "Failed to fetch period holidays");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
    };

    audit::record(
        pool.get_ref(),
        &auth,
        "update",
        "payroll_period",
        Some(period_id),
        Some(format!("Period now {} to {}", date_from, date_to)),
    )
    .await;

    Ok(response::ok(json!({
        "id": period_id,
        "date_from": date_from,
        "date_to": date_to,
        "selected_holidays": selected,
    })))
}

/// List payroll periods
#[utoipa::path(
    get,
    path = "/api/v1/payroll/periods",
    params(PeriodQuery),
    responses((status = 200, description = "Paginated period list")),
    security(("bearer_auth" = [])),
    tag = "Payroll Periods"
)]
pub async fn list_periods(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PeriodQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_staff()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM payroll_periods")
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to count payroll periods");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let periods = sqlx::query_as::<_, PayrollPeriod>(
        r#"
        SELECT id, date_from, date_to
        FROM payroll_periods
        ORDER BY date_from DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(per_page as i64)
    .bind(offset as i64)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch payroll periods");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(response::ok(json!({
        "data": periods,
        "page": page,
        "per_page": per_page,
        "total": total
    })))
}

/// Get payroll period by ID
#[utoipa::path(
    get,
    path = "/api/v1/payroll/periods/{period_id}",
    params(("period_id", description = "Payroll period ID")),
    responses(
        (status = 200, body = PayrollPeriod),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll Periods"
)]
pub async fn get_period(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_staff()?;

    let period_id = path.into_inner();

    let period = sqlx::query_as::<_, PayrollPeriod>(
        "SELECT id, date_from, date_to FROM payroll_periods WHERE id = ?",
    )
    .bind(period_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, period_id, "Failed to fetch payroll period");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match period {
        Some(p) => Ok(response::ok(p)),
        None => Ok(response::not_found("Payroll period not found")),
    }
}

/// Payroll period details: the period plus its selected holidays
#[utoipa::path(
    get,
    path = "/api/v1/payroll/periods/{period_id}/details",
    params(("period_id", description = "Payroll period ID")),
    responses(
        (status = 200, description = "Period with selected holidays"),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll Periods"
)]
pub async fn period_details(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_staff()?;

    let period_id = path.into_inner();

    let period = sqlx::query_as::<_, PayrollPeriod>(
        "SELECT id, date_from, date_to FROM payroll_periods WHERE id = ?",
    )
    .bind(period_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, period_id, "Failed to fetch payroll period");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let period = match period {
        Some(p) => p,
        None => return Ok(response::not_found("Payroll period not found")),
    };

    let holidays = sqlx::query_as::<_, Holiday>(
        r#"
        SELECT h.id, h.name, h.holiday_type, h.date
        FROM holidays h
        INNER JOIN period_holidays ph ON ph.holiday_id = h.id
        WHERE ph.period_id = ?
        ORDER BY h.date
        "#,
    )
    .bind(period_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, period_id, "Failed to fetch period holidays");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(response::ok(json!({
        "period": period,
        "holidays": holidays,
    })))
}

/// Delete payroll period
#[utoipa::path(
    delete,
    path = "/api/v1/payroll/periods/{period_id}",
    params(("period_id", description = "Payroll period ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Period not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll Periods"
)]
pub async fn delete_period(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_accountant_or_admin()?;

    let period_id = path.into_inner();

    sqlx::query("DELETE FROM period_holidays WHERE period_id = ?")
        .bind(period_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, period_id, "Failed to delete period holidays");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let result = sqlx::query("DELETE FROM payroll_periods WHERE id = ?")
        .bind(period_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, period_id, "Failed to delete payroll period");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(response::not_found("Payroll period not found"));
    }

    audit::record(
        pool.get_ref(),
        &auth,
        "delete",
        "payroll_period",
        Some(period_id),
        None,
    )
    .await;

    Ok(response::ok_message("Payroll period deleted"))
}
