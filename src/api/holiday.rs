use actix_web::{Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::api::{audit, response};
use crate::auth::auth::AuthUser;
use crate::model::holiday::Holiday;
use crate::utils::db_utils::{build_update_sql, execute_update};

const HOLIDAY_COLUMNS: &[&str] = &["name", "holiday_type", "date"];

fn validate_holiday_type(value: &str) -> bool {
    matches!(value, "Regular" | "Special")
}

#[derive(Deserialize, ToSchema)]
pub struct CreateHoliday {
    #[schema(example = "Araw ng Kagitingan")]
    pub name: String,

    /// `Regular` or `Special`
    #[schema(example = "Regular")]
    pub holiday_type: String,

    #[schema(example = "2024-04-09", value_type = String, format = "date")]
    pub date: NaiveDate,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct HolidayQuery {
    /// Restrict to a calendar year
    #[schema(example = 2024)]
    pub year: Option<i32>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AvailableHolidaysQuery {
    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub date_from: NaiveDate,
    #[schema(example = "2024-01-16", value_type = String, format = "date")]
    pub date_to: NaiveDate,
}

/// Create holiday
#[utoipa::path(
    post,
    path = "/api/v1/payroll/holidays",
    request_body = CreateHoliday,
    responses(
        (status = 201, description = "Holiday created"),
        (status = 400, description = "Invalid holiday type"),
        (status = 409, description = "A holiday already exists on that date")
    ),
    security(("bearer_auth" = [])),
    tag = "Holidays"
)]
pub async fn create_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateHoliday>,
) -> actix_web::Result<impl Responder> {
    auth.require_accountant_or_admin()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Ok(response::bad_request("Holiday name is required"));
    }

    if !validate_holiday_type(&payload.holiday_type) {
        return Ok(response::bad_request(
            "Holiday type must be Regular or Special",
        ));
    }

    let result = sqlx::query("INSERT INTO holidays (name, holiday_type, date) VALUES (?, ?, ?)")
        .bind(name)
        .bind(&payload.holiday_type)
        .bind(payload.date)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(res) => {
            let id = res.last_insert_id();
            audit::record(
                pool.get_ref(),
                &auth,
                "create",
                "holiday",
                Some(id),
                Some(format!("Created holiday '{}' on {}", name, payload.date)),
            )
            .await;

            Ok(response::created(json!({"id": id})))
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(response::conflict("A holiday already exists on that date"));
                }
            }

            tracing::error!(error = %e, "Failed to create holiday");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// List holidays
#[utoipa::path(
    get,
    path = "/api/v1/payroll/holidays",
    params(HolidayQuery),
    responses((status = 200, description = "Holidays ordered by date")),
    security(("bearer_auth" = [])),
    tag = "Holidays"
)]
pub async fn list_holidays(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<HolidayQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_staff()?;

    let holidays = match query.year {
        Some(year) => {
            sqlx::query_as::<_, Holiday>(
                "SELECT id, name, holiday_type, date FROM holidays WHERE YEAR(date) = ? ORDER BY date",
            )
            .bind(year)
            .fetch_all(pool.get_ref())
            .await
        }
        None => {
            sqlx::query_as::<_, Holiday>(
                "SELECT id, name, holiday_type, date FROM holidays ORDER BY date",
            )
            .fetch_all(pool.get_ref())
            .await
        }
    }
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch holidays");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(response::ok(holidays))
}

/// Get holiday by ID
#[utoipa::path(
    get,
    path = "/api/v1/payroll/holidays/{holiday_id}",
    params(("holiday_id", description = "Holiday ID")),
    responses(
        (status = 200, body = Holiday),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Holidays"
)]
pub async fn get_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_staff()?;

    let holiday_id = path.into_inner();

    let holiday = sqlx::query_as::<_, Holiday>(
        "SELECT id, name, holiday_type, date FROM holidays WHERE id = ?",
    )
    .bind(holiday_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, holiday_id, "Failed to fetch holiday");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match holiday {
        Some(h) => Ok(response::ok(h)),
        None => Ok(response::not_found("Holiday not found")),
    }
}

/// Update holiday
#[utoipa::path(
    put,
    path = "/api/v1/payroll/holidays/{holiday_id}",
    params(("holiday_id", description = "Holiday ID")),
    responses(
        (status = 200, description = "Holiday updated"),
        (status = 400, description = "Invalid field or value"),
        (status = 404, description = "Holiday not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Holidays"
)]
pub async fn update_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_accountant_or_admin()?;

    let holiday_id = path.into_inner();

    if let Some(holiday_type) = body.get("holiday_type").and_then(Value::as_str) {
        if !validate_holiday_type(holiday_type) {
            return Ok(response::bad_request(
                "Holiday type must be Regular or Special",
            ));
        }
    }

    let update = build_update_sql("holidays", &body, HOLIDAY_COLUMNS, "id", holiday_id)?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        tracing::error!(error = %e, holiday_id, "Failed to update holiday");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if affected == 0 {
        return Ok(response::not_found("Holiday not found"));
    }

    audit::record(
        pool.get_ref(),
        &auth,
        "update",
        "holiday",
        Some(holiday_id),
        None,
    )
    .await;

    Ok(response::ok_message("Holiday updated successfully"))
}

/// Delete holiday
#[utoipa::path(
    delete,
    path = "/api/v1/payroll/holidays/{holiday_id}",
    params(("holiday_id", description = "Holiday ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Holiday not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Holidays"
)]
pub async fn delete_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_accountant_or_admin()?;

    let holiday_id = path.into_inner();

    let result = sqlx::query("DELETE FROM holidays WHERE id = ?")
        .bind(holiday_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, holiday_id, "Failed to delete holiday");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(response::not_found("Holiday not found"));
    }

    audit::record(
        pool.get_ref(),
        &auth,
        "delete",
        "holiday",
        Some(holiday_id),
        None,
    )
    .await;

    Ok(response::ok_message("Holiday deleted"))
}

/// Holidays within a candidate period range
#[utoipa::path(
    get,
    path = "/api/v1/payroll/holidays/available",
    params(AvailableHolidaysQuery),
    responses(
        (status = 200, description = "Holidays inside [date_from, date_to]"),
        (status = 400, description = "date_from after date_to")
    ),
    security(("bearer_auth" = [])),
    tag = "Holidays"
)]
pub async fn available_holidays(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AvailableHolidaysQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_staff()?;

    if query.date_from > query.date_to {
        return Ok(response::bad_request("date_from cannot be after date_to"));
    }

    let holidays = sqlx::query_as::<_, Holiday>(
        "SELECT id, name, holiday_type, date FROM holidays WHERE date BETWEEN ? AND ? ORDER BY date",
    )
    .bind(query.date_from)
    .bind(query.date_to)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch available holidays");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(response::ok(holidays))
}
