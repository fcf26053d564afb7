use std::path::Path as FsPath;
use std::str::FromStr;

use actix_multipart::Multipart;
use actix_web::{Responder, web};
use chrono::{DateTime, NaiveDate, Utc};
use futures_util::StreamExt as _;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::api::{audit, response};
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::model::benefit::{BenefitFile, BenefitRecord, BenefitSlot};
use strum::IntoEnumIterator;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PeriodScopedQuery {
    #[schema(example = 3)]
    pub period_id: u64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct RecordScopeQuery {
    #[schema(example = 12)]
    pub employee_id: u64,
    #[schema(example = 3)]
    pub period_id: u64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct UploadQuery {
    #[schema(example = 12)]
    pub employee_id: u64,
    #[schema(example = 3)]
    pub period_id: u64,
    /// One of `SSS`, `Tax`, `PhilHealth`, `PAG-IBIG`
    #[schema(example = "SSS")]
    pub slot: String,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct BenefitPeriodSummary {
    pub id: u64,
    #[schema(value_type = String, format = "date")]
    pub date_from: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub date_to: NaiveDate,
    /// Released records in this period
    pub released_count: i64,
    /// Active employees expected to have a record
    pub active_employees: i64,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct PendingEmployee {
    pub employee_id: u64,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(nullable = true)]
    pub record_id: Option<u64>,
    /// Documents uploaded so far, out of the four slots
    pub files_uploaded: i64,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct CompletedEmployee {
    pub employee_id: u64,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub record_id: u64,
    pub files_uploaded: i64,
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub released_at: Option<DateTime<Utc>>,
}

/// Fetches the benefit record for (employee, period), creating it lazily on
/// first access. A racing create is resolved by re-reading; a record that
/// still cannot be found means the employee or period does not exist.
async fn get_or_create_record(
    pool: &MySqlPool,
    employee_id: u64,
    period_id: u64,
) -> Result<Option<BenefitRecord>, sqlx::Error> {
    let fetch = || {
        sqlx::query_as::<_, BenefitRecord>(
            r#"
            SELECT id, employee_id, period_id, status, released_at
            FROM benefit_records
            WHERE employee_id = ? AND period_id = ?
            "#,
        )
        .bind(employee_id)
        .bind(period_id)
        .fetch_optional(pool)
    };

    if let Some(record) = fetch().await? {
        return Ok(Some(record));
    }

    let inserted = sqlx::query(
        "INSERT INTO benefit_records (employee_id, period_id, status) VALUES (?, ?, 'pending')",
    )
    .bind(employee_id)
    .bind(period_id)
    .execute(pool)
    .await;

    match inserted {
        Ok(_) => {}
        // Duplicate (lost a race) or missing foreign key; the re-read
        // below distinguishes the two.
        Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23000") => {}
        Err(e) => return Err(e),
    }

    fetch().await
}

async fn count_files(pool: &MySqlPool, record_id: u64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM benefit_files WHERE record_id = ?")
        .bind(record_id)
        .fetch_one(pool)
        .await
}

/// Periods with benefit completion counts
#[utoipa::path(
    get,
    path = "/api/v1/benefits/periods",
    responses((status = 200, description = "Periods with release progress", body = [BenefitPeriodSummary])),
    security(("bearer_auth" = [])),
    tag = "Benefits"
)]
pub async fn benefit_periods(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_accountant_or_admin()?;

    let summaries = sqlx::query_as::<_, BenefitPeriodSummary>(
        r#"
        SELECT p.id, p.date_from, p.date_to,
               (SELECT COUNT(*) FROM benefit_records br
                WHERE br.period_id = p.id AND br.status = 'released') AS released_count,
               (SELECT COUNT(*) FROM employees e WHERE e.status = 'active') AS active_employees
        FROM payroll_periods p
        ORDER BY p.date_from DESC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch benefit periods");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(response::ok(summaries))
}

/// Employees without a released record for a period
#[utoipa::path(
    get,
    path = "/api/v1/benefits/pending",
    params(PeriodScopedQuery),
    responses((status = 200, description = "Employees still pending", body = [PendingEmployee])),
    security(("bearer_auth" = [])),
    tag = "Benefits"
)]
pub async fn pending_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PeriodScopedQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_accountant_or_admin()?;

    let rows = sqlx::query_as::<_, PendingEmployee>(
        r#"
        SELECT e.id AS employee_id, e.employee_code, e.first_name, e.last_name,
               b.id AS record_id,
               COALESCE(f.uploaded, 0) AS files_uploaded
        FROM employees e
        LEFT JOIN benefit_records b
               ON b.employee_id = e.id AND b.period_id = ?
        LEFT JOIN (SELECT record_id, COUNT(*) AS uploaded
                   FROM benefit_files GROUP BY record_id) f
               ON f.record_id = b.id
        WHERE e.status = 'active'
          AND (b.id IS NULL OR b.status = 'pending')
        ORDER BY e.last_name, e.first_name
        "#,
    )
    .bind(query.period_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, period_id = query.period_id, "Failed to fetch pending employees");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(response::ok(rows))
}

/// Employees whose payslip is released for a period
#[utoipa::path(
    get,
    path = "/api/v1/benefits/completed",
    params(PeriodScopedQuery),
    responses((status = 200, description = "Released employees", body = [CompletedEmployee])),
    security(("bearer_auth" = [])),
    tag = "Benefits"
)]
pub async fn completed_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PeriodScopedQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_accountant_or_admin()?;

    let rows = sqlx::query_as::<_, CompletedEmployee>(
        r#"
        SELECT e.id AS employee_id, e.employee_code, e.first_name, e.last_name,
               b.id AS record_id,
               COALESCE(f.uploaded, 0) AS files_uploaded,
               b.released_at
        FROM benefit_records b
        INNER JOIN employees e ON e.id = b.employee_id
        LEFT JOIN (SELECT record_id, COUNT(*) AS uploaded
                   FROM benefit_files GROUP BY record_id) f
               ON f.record_id = b.id
        WHERE b.period_id = ? AND b.status = 'released'
        ORDER BY b.released_at DESC
        "#,
    )
    .bind(query.period_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, period_id = query.period_id, "Failed to fetch completed employees");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(response::ok(rows))
}

/// Benefit record details for one employee and period
///
/// Creates the record lazily on first access. Employees may view their own
/// record; everything else is accountant/admin.
#[utoipa::path(
    get,
    path = "/api/v1/benefits/details",
    params(RecordScopeQuery),
    responses(
        (status = 200, description = "Record with one entry per document slot"),
        (status = 404, description = "Employee or period not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Benefits"
)]
pub async fn benefit_details(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<RecordScopeQuery>,
) -> actix_web::Result<impl Responder> {
    if auth.require_accountant_or_admin().is_err() && auth.employee_id != Some(query.employee_id) {
        return Err(actix_web::error::ErrorForbidden("Accountant/Admin only"));
    }

    let record = get_or_create_record(pool.get_ref(), query.employee_id, query.period_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to load benefit record");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let record = match record {
        Some(r) => r,
        None => return Ok(response::not_found("Employee or payroll period not found")),
    };

    let files = sqlx::query_as::<_, BenefitFile>(
        r#"
        SELECT id, record_id, slot, original_name, file_type, file_size, storage_path
        FROM benefit_files
        WHERE record_id = ?
        "#,
    )
    .bind(record.id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, record_id = record.id, "Failed to load benefit files");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let mut slots = serde_json::Map::new();
    for slot in BenefitSlot::iter() {
        let file = files.iter().find(|f| f.slot == slot.label());
        slots.insert(
            slot.label().to_string(),
            file.map(|f| json!(f)).unwrap_or(serde_json::Value::Null),
        );
    }

    Ok(response::ok(json!({
        "record": record,
        "slots": slots,
    })))
}

fn sanitized_extension(original_name: &str) -> String {
    FsPath::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()) && e.len() <= 8)
        .map(str::to_lowercase)
        .unwrap_or_else(|| "bin".to_string())
}

/// Upload a benefit document into a slot
///
/// The slot must be empty and the record still pending. Re-uploading means
/// deleting the existing document first.
#[utoipa::path(
    post,
    path = "/api/v1/benefits/files",
    params(UploadQuery),
    responses(
        (status = 201, description = "Document stored"),
        (status = 400, description = "Bad slot, oversized file or released record"),
        (status = 409, description = "Slot already holds a document")
    ),
    security(("bearer_auth" = [])),
    tag = "Benefits"
)]
pub async fn upload_file(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<UploadQuery>,
    mut payload: Multipart,
) -> actix_web::Result<impl Responder> {
    auth.require_accountant_or_admin()?;

    let slot = match BenefitSlot::from_str(&query.slot) {
        Ok(s) => s,
        Err(_) => {
            return Ok(response::bad_request(
                "Slot must be one of SSS, Tax, PhilHealth, PAG-IBIG",
            ));
        }
    };

    let record = get_or_create_record(pool.get_ref(), query.employee_id, query.period_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to load benefit record");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let record = match record {
        Some(r) => r,
        None => return Ok(response::not_found("Employee or payroll period not found")),
    };

    if record.status != "pending" {
        return Ok(response::bad_request(
            "Payslip already released; documents can no longer be changed",
        ));
    }

    // Pull the first file field out of the multipart body.
    let mut uploaded: Option<(String, String, Vec<u8>)> = None;
    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| actix_web::error::ErrorBadRequest(format!("Bad multipart: {}", e)))?;

        let filename = field
            .content_disposition()
            .get_filename()
            .map(str::to_string);

        let Some(filename) = filename else {
            // Not a file field; drain and move on.
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| {
                    actix_web::error::ErrorBadRequest(format!("Bad multipart: {}", e))
                })?;
            }
            continue;
        };

        let file_type = field
            .content_type()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk
                .map_err(|e| actix_web::error::ErrorBadRequest(format!("Bad multipart: {}", e)))?;
            if bytes.len() + data.len() > config.max_upload_bytes {
                return Ok(response::bad_request("File is too large"));
            }
            bytes.extend_from_slice(&data);
        }

        uploaded = Some((filename, file_type, bytes));
        break;
    }

    let Some((original_name, file_type, bytes)) = uploaded else {
        return Ok(response::bad_request("No file in request"));
    };

    if bytes.is_empty() {
        return Ok(response::bad_request("Uploaded file is empty"));
    }

    let file_size = bytes.len() as u64;
    let storage_name = format!("{}.{}", Uuid::new_v4(), sanitized_extension(&original_name));
    let storage_path = format!("{}/{}", config.upload_dir, storage_name);

    let dir = config.upload_dir.clone();
    let path_for_write = storage_path.clone();
    web::block(move || {
        std::fs::create_dir_all(&dir)?;
        std::fs::write(&path_for_write, &bytes)
    })
    .await
    .map_err(actix_web::error::ErrorInternalServerError)?
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to store uploaded file");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let result = sqlx::query(
        r#"
        INSERT INTO benefit_files (record_id, slot, original_name, file_type, file_size, storage_path)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.id)
    .bind(slot.label())
    .bind(&original_name)
    .bind(&file_type)
    .bind(file_size)
    .bind(&storage_path)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(res) => {
            audit::record(
                pool.get_ref(),
                &auth,
                "upload",
                "benefit_file",
                Some(res.last_insert_id()),
                Some(format!(
                    "Uploaded {} document for employee {}, period {}",
                    slot.label(),
                    query.employee_id,
                    query.period_id
                )),
            )
            .await;

            Ok(response::created(json!({
                "id": res.last_insert_id(),
                "record_id": record.id,
                "slot": slot.label(),
                "original_name": original_name,
                "file_type": file_type,
                "file_size": file_size,
            })))
        }
        Err(e) => {
            // Roll back the stored file; the row never landed.
            if let Err(rm) = std::fs::remove_file(&storage_path) {
                tracing::warn!(error = %rm, path = %storage_path, "Orphaned upload not removed");
            }

            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(response::conflict(
                        "A document is already uploaded for this slot; delete it first",
                    ));
                }
            }

            tracing::error!(error = %e, "Failed to record uploaded file");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Delete an uploaded benefit document
#[utoipa::path(
    delete,
    path = "/api/v1/benefits/files/{file_id}",
    params(("file_id", description = "Benefit file ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 400, description = "Record already released"),
        (status = 404, description = "File not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Benefits"
)]
pub async fn delete_file(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_accountant_or_admin()?;

    let file_id = path.into_inner();

    let row = sqlx::query_as::<_, (String, String)>(
        r#"
        SELECT b.status, f.storage_path
        FROM benefit_files f
        INNER JOIN benefit_records b ON b.id = f.record_id
        WHERE f.id = ?
        "#,
    )
    .bind(file_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, file_id, "Failed to fetch benefit file");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let (record_status, storage_path) = match row {
        Some(r) => r,
        None => return Ok(response::not_found("File not found")),
    };

    if record_status != "pending" {
        return Ok(response::bad_request(
            "Payslip already released; documents can no longer be changed",
        ));
    }

    sqlx::query("DELETE FROM benefit_files WHERE id = ?")
        .bind(file_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, file_id, "Failed to delete benefit file");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if let Err(e) = std::fs::remove_file(&storage_path) {
        tracing::warn!(error = %e, path = %storage_path, "Stored file not removed");
    }

    audit::record(
        pool.get_ref(),
        &auth,
        "delete",
        "benefit_file",
        Some(file_id),
        None,
    )
    .await;

    Ok(response::ok_message("Document deleted"))
}

/// Release a payslip
///
/// Requires at least one uploaded document. Terminal: a released record
/// refuses further uploads, deletes and releases. The conditional update
/// makes racing releases harmless — the loser affects zero rows.
#[utoipa::path(
    post,
    path = "/api/v1/benefits/release/{record_id}",
    params(("record_id", description = "Benefit record ID")),
    responses(
        (status = 200, description = "Released"),
        (status = 400, description = "No documents uploaded, or already released"),
        (status = 404, description = "Record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Benefits"
)]
pub async fn release_payslip(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_accountant_or_admin()?;

    let record_id = path.into_inner();

    let status = sqlx::query_scalar::<_, String>(
        "SELECT status FROM benefit_records WHERE id = ?",
    )
    .bind(record_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, record_id, "Failed to fetch benefit record");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let status = match status {
        Some(s) => s,
        None => return Ok(response::not_found("Benefit record not found")),
    };

    if status != "pending" {
        return Ok(response::bad_request("Payslip already released"));
    }

    // Guard before any write: zero documents means no release and no state
    // change at all.
    let files = count_files(pool.get_ref(), record_id).await.map_err(|e| {
        tracing::error!(error = %e, record_id, "Failed to count benefit files");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if files == 0 {
        return Ok(response::bad_request(
            "At least one benefit document must be uploaded before release",
        ));
    }

    let result = sqlx::query(
        r#"
        UPDATE benefit_records
        SET status = 'released', released_at = NOW()
        WHERE id = ? AND status = 'pending'
        "#,
    )
    .bind(record_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, record_id, "Failed to release payslip");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(response::bad_request("Payslip already released"));
    }

    audit::record(
        pool.get_ref(),
        &auth,
        "release",
        "benefit_record",
        Some(record_id),
        Some(format!("Released payslip for record {}", record_id)),
    )
    .await;

    Ok(response::ok_message("Payslip released"))
}
