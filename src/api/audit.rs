use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::api::response;
use crate::auth::auth::AuthUser;
use crate::model::audit::AuditEntry;

/// Writes an audit row for a mutating action. Failures are logged and never
/// fail the request that triggered them.
pub async fn record(
    pool: &MySqlPool,
    actor: &AuthUser,
    action: &str,
    entity: &str,
    entity_id: Option<u64>,
    detail: Option<String>,
) {
    let result = sqlx::query(
        r#"
        INSERT INTO audit_trail (user_id, username, action, entity, entity_id, detail)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(actor.user_id)
    .bind(&actor.username)
    .bind(action)
    .bind(entity)
    .bind(entity_id)
    .bind(detail)
    .execute(pool)
    .await;

    if let Err(e) = result {
        tracing::warn!(error = %e, action, entity, "Audit write failed");
    }
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AuditQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 20)]
    pub per_page: Option<u32>,
    /// Filter by entity kind, e.g. `pay_component`
    pub entity: Option<String>,
    /// Filter by acting username
    pub username: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AuditListResponse {
    pub data: Vec<AuditEntry>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

enum FilterValue<'a> {
    Str(&'a str),
}

/// Audit trail listing
#[utoipa::path(
    get,
    path = "/api/v1/audit",
    params(AuditQuery),
    responses(
        (status = 200, description = "Paginated audit trail", body = AuditListResponse),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Audit"
)]
pub async fn list_audit(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AuditQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(entity) = query.entity.as_deref() {
        where_sql.push_str(" AND entity = ?");
        args.push(FilterValue::Str(entity));
    }

    if let Some(username) = query.username.as_deref() {
        where_sql.push_str(" AND username = ?");
        args.push(FilterValue::Str(username));
    }

    let count_sql = format!("SELECT COUNT(*) FROM audit_trail{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count audit entries");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, user_id, username, action, entity, entity_id, detail, created_at
        FROM audit_trail
        {}
        ORDER BY id DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, AuditEntry>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let entries = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch audit trail");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(response::ok(AuditListResponse {
        data: entries,
        page,
        per_page,
        total,
    }))
}
