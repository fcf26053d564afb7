use crate::api::response;
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::model::role::Role;
use actix_web::{Responder, web};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    /// Defaults to today when omitted
    #[schema(example = "2024-01-15", value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
    #[schema(example = 12)]
    pub employee_id: Option<u64>,
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 20)]
    pub per_page: Option<u32>,
}

#[derive(sqlx::FromRow)]
struct AttendanceRow {
    id: u64,
    employee_id: u64,
    employee_code: String,
    first_name: String,
    last_name: String,
    date: NaiveDate,
    check_in: Option<NaiveTime>,
    check_out: Option<NaiveTime>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceView {
    pub id: u64,
    pub employee_id: u64,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = Option<String>, nullable = true)]
    pub check_in: Option<NaiveTime>,
    #[schema(value_type = Option<String>, nullable = true)]
    pub check_out: Option<NaiveTime>,
    /// Minutes checked in after the configured work-day start
    pub late_minutes: i64,
    /// Minutes between check-in and check-out, once both exist
    #[schema(nullable = true)]
    pub worked_minutes: Option<i64>,
}

fn late_minutes(check_in: Option<NaiveTime>, work_day_start: NaiveTime) -> i64 {
    match check_in {
        Some(t) if t > work_day_start => (t - work_day_start).num_minutes(),
        _ => 0,
    }
}

fn worked_minutes(check_in: Option<NaiveTime>, check_out: Option<NaiveTime>) -> Option<i64> {
    match (check_in, check_out) {
        (Some(start), Some(end)) if end >= start => Some((end - start).num_minutes()),
        _ => None,
    }
}

/// Attendance listing with derived lateness
///
/// Employees see only their own rows; HR and admin see everyone.
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Attendance rows for the requested day", body = [AttendanceView]),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_staff()?;

    // Employees are pinned to their own records regardless of the filter.
    let employee_filter = if auth.role == Role::Employee {
        let own = auth
            .employee_id
            .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;
        Some(own)
    } else {
        query.employee_id
    };

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    if query.date.is_some() {
        where_sql.push_str(" AND a.date = ?");
    } else {
        where_sql.push_str(" AND a.date = CURDATE()");
    }
    if employee_filter.is_some() {
        where_sql.push_str(" AND a.employee_id = ?");
    }

    let count_sql = format!(
        "SELECT COUNT(*) FROM attendance a{}",
        where_sql
    );
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(date) = query.date {
        count_q = count_q.bind(date);
    }
    if let Some(employee_id) = employee_filter {
        count_q = count_q.bind(employee_id);
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT a.id, a.employee_id, e.employee_code, e.first_name, e.last_name,
               a.date, a.check_in, a.check_out
        FROM attendance a
        INNER JOIN employees e ON e.id = a.employee_id
        {}
        ORDER BY a.check_in IS NULL, a.check_in
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, AttendanceRow>(&data_sql);
    if let Some(date) = query.date {
        data_q = data_q.bind(date);
    }
    if let Some(employee_id) = employee_filter {
        data_q = data_q.bind(employee_id);
    }

    let rows = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch attendance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let views: Vec<AttendanceView> = rows
        .into_iter()
        .map(|r| AttendanceView {
            late_minutes: late_minutes(r.check_in, config.work_day_start),
            worked_minutes: worked_minutes(r.check_in, r.check_out),
            id: r.id,
            employee_id: r.employee_id,
            employee_code: r.employee_code,
            first_name: r.first_name,
            last_name: r.last_name,
            date: r.date,
            check_in: r.check_in,
            check_out: r.check_out,
        })
        .collect();

    Ok(response::ok(json!({
        "data": views,
        "page": page,
        "per_page": per_page,
        "total": total
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(s: &str) -> NaiveTime {
        s.parse().unwrap()
    }

    #[test]
    fn test_on_time_check_in_has_no_late_minutes() {
        assert_eq!(late_minutes(Some(time("08:55:00")), time("09:00:00")), 0);
        assert_eq!(late_minutes(Some(time("09:00:00")), time("09:00:00")), 0);
    }

    #[test]
    fn test_late_check_in_counts_minutes_past_start() {
        assert_eq!(late_minutes(Some(time("09:17:00")), time("09:00:00")), 17);
    }

    #[test]
    fn test_missing_check_in_is_not_late() {
        assert_eq!(late_minutes(None, time("09:00:00")), 0);
    }

    #[test]
    fn test_worked_minutes_requires_both_stamps() {
        assert_eq!(worked_minutes(Some(time("09:00:00")), None), None);
        assert_eq!(worked_minutes(None, Some(time("17:00:00"))), None);
        assert_eq!(
            worked_minutes(Some(time("09:00:00")), Some(time("17:30:00"))),
            Some(510)
        );
    }
}
