use std::str::FromStr;

use actix_web::{Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::api::{audit, response};
use crate::auth::auth::AuthUser;
use crate::model::pay_component::PayComponent;
use crate::rules::amount::{
    AmountCalculationType, amount_options, default_amount_option, shows_amount_calculation,
};
use crate::rules::formula::validate_formula;
use crate::rules::preview::component_preview;
use crate::rules::rate::{BaseRateType, RateMultiplier, RateType, fixed_rate_formula};
use crate::rules::{ComponentInput, resolve};

#[derive(Deserialize, ToSchema)]
pub struct SavePayComponent {
    #[schema(example = "Regular OT Pay")]
    pub name: String,

    #[schema(example = "Regular Overtime")]
    pub rate_type: String,

    #[schema(example = "Rate Per Hour")]
    pub base_rate_type: String,

    /// One of the fixed multiplier labels or `custom`. Ignored for
    /// deduction rate types.
    #[schema(example = "1.25", nullable = true)]
    pub rate_multiplier: Option<String>,

    /// Required when `rate_multiplier` is `custom`.
    #[schema(nullable = true)]
    pub custom_rate_formula: Option<String>,

    /// Defaults per rate type when omitted.
    #[schema(example = "rate_times_hours", nullable = true)]
    pub amount_calculation_type: Option<String>,

    /// Required when `amount_calculation_type` is `custom`.
    #[schema(nullable = true)]
    pub custom_amount_formula: Option<String>,

    #[schema(example = "Active", nullable = true)]
    pub status: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePayComponent {
    pub name: Option<String>,
    pub rate_type: Option<String>,
    pub base_rate_type: Option<String>,
    pub rate_multiplier: Option<String>,
    pub custom_rate_formula: Option<String>,
    pub amount_calculation_type: Option<String>,
    pub custom_amount_formula: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ComponentQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 10)]
    pub per_page: Option<u32>,
    #[schema(example = "Active")]
    pub status: Option<String>,
    #[schema(example = "Regular Overtime")]
    pub rate_type: Option<String>,
    /// Search by component name
    pub search: Option<String>,
}

/// Draft field values for live rule evaluation; nothing is persisted.
#[derive(Deserialize, ToSchema)]
pub struct EvaluateComponent {
    #[schema(example = "Regular Overtime")]
    pub rate_type: String,
    #[schema(example = "Rate Per Hour", nullable = true)]
    pub base_rate_type: Option<String>,
    #[schema(example = "1.50", nullable = true)]
    pub rate_multiplier: Option<String>,
    #[schema(nullable = true)]
    pub custom_rate_formula: Option<String>,
    #[schema(nullable = true)]
    pub amount_calculation_type: Option<String>,
    #[schema(nullable = true)]
    pub custom_amount_formula: Option<String>,
}

fn validate_status(status: &str) -> bool {
    matches!(status, "Active" | "Inactive")
}

/// Create pay component
#[utoipa::path(
    post,
    path = "/api/v1/payroll/components",
    request_body = SavePayComponent,
    responses(
        (status = 201, description = "Component created", body = Object, example = json!({
            "success": true, "data": {"id": 7}
        })),
        (status = 400, description = "Rule violation", body = Object, example = json!({
            "success": false, "message": "Invalid rate formula: Formula cannot contain repeated operators"
        })),
        (status = 409, description = "Component name already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Pay Components"
)]
pub async fn create_component(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<SavePayComponent>,
) -> actix_web::Result<impl Responder> {
    auth.require_accountant_or_admin()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Ok(response::bad_request("Component name is required"));
    }

    let status = payload.status.as_deref().unwrap_or("Active");
    if !validate_status(status) {
        return Ok(response::bad_request("Status must be Active or Inactive"));
    }

    let resolved = match resolve(&ComponentInput {
        rate_type: &payload.rate_type,
        base_rate_type: &payload.base_rate_type,
        rate_multiplier: payload.rate_multiplier.as_deref(),
        custom_rate_formula: payload.custom_rate_formula.as_deref(),
        amount_calculation_type: payload.amount_calculation_type.as_deref(),
        custom_amount_formula: payload.custom_amount_formula.as_deref(),
    }) {
        Ok(r) => r,
        Err(e) => return Ok(response::bad_request(&e.to_string())),
    };

    let result = sqlx::query(
        r#"
        INSERT INTO pay_components
        (name, rate_type, base_rate_type, rate_multiplier, rate_formula,
         amount_calculation_type, amount_formula, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(resolved.rate_type.label())
    .bind(resolved.base_rate_type.label())
    .bind(resolved.rate_multiplier.map(|m| m.label()))
    .bind(&resolved.rate_formula)
    .bind(resolved.amount_calculation_type.map(|c| c.label()))
    .bind(&resolved.amount_formula)
    .bind(status)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(res) => {
            let id = res.last_insert_id();
            audit::record(
                pool.get_ref(),
                &auth,
                "create",
                "pay_component",
                Some(id),
                Some(format!("Created pay component '{}'", name)),
            )
            .await;

            Ok(response::created(json!({"id": id})))
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(response::conflict("Component name already exists"));
                }
            }

            tracing::error!(error = %e, "Failed to create pay component");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Update pay component
///
/// Partial update: omitted fields keep their stored values, then the whole
/// component is re-run through the rules before anything is written.
#[utoipa::path(
    put,
    path = "/api/v1/payroll/components/{component_id}",
    request_body = UpdatePayComponent,
    params(("component_id", description = "Pay component ID")),
    responses(
        (status = 200, description = "Component updated"),
        (status = 400, description = "Rule violation"),
        (status = 404, description = "Component not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Pay Components"
)]
pub async fn update_component(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdatePayComponent>,
) -> actix_web::Result<impl Responder> {
    auth.require_accountant_or_admin()?;

    let component_id = path.into_inner();

    let current = sqlx::query_as::<_, PayComponent>(
        r#"
        SELECT id, name, rate_type, base_rate_type, rate_multiplier, rate_formula,
               amount_calculation_type, amount_formula, status
        FROM pay_components
        WHERE id = ?
        "#,
    )
    .bind(component_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, component_id, "Failed to fetch pay component");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let current = match current {
        Some(c) => c,
        None => return Ok(response::not_found("Pay component not found")),
    };

    let name = body.name.as_deref().unwrap_or(&current.name).trim();
    if name.is_empty() {
        return Ok(response::bad_request("Component name is required"));
    }

    let status = body.status.as_deref().unwrap_or(&current.status);
    if !validate_status(status) {
        return Ok(response::bad_request("Status must be Active or Inactive"));
    }

    let rate_type = body.rate_type.as_deref().unwrap_or(&current.rate_type);
    let base_rate_type = body
        .base_rate_type
        .as_deref()
        .unwrap_or(&current.base_rate_type);
    let rate_multiplier = body
        .rate_multiplier
        .as_deref()
        .or(current.rate_multiplier.as_deref());

    // A stored custom component keeps its formula text in rate_formula, so
    // that text is the fallback when the update does not replace it.
    let custom_rate_fallback = if current.rate_multiplier.as_deref() == Some("custom") {
        Some(current.rate_formula.as_str())
    } else {
        None
    };
    let custom_rate_formula = body.custom_rate_formula.as_deref().or(custom_rate_fallback);

    let amount_calculation_type = body
        .amount_calculation_type
        .as_deref()
        .or(current.amount_calculation_type.as_deref());
    let custom_amount_fallback = if current.amount_calculation_type.as_deref() == Some("custom") {
        current.amount_formula.as_deref()
    } else {
        None
    };
    let custom_amount_formula = body
        .custom_amount_formula
        .as_deref()
        .or(custom_amount_fallback);

    let resolved = match resolve(&ComponentInput {
        rate_type,
        base_rate_type,
        rate_multiplier,
        custom_rate_formula,
        amount_calculation_type,
        custom_amount_formula,
    }) {
        Ok(r) => r,
        Err(e) => return Ok(response::bad_request(&e.to_string())),
    };

    let result = sqlx::query(
        r#"
        UPDATE pay_components
        SET name = ?, rate_type = ?, base_rate_type = ?, rate_multiplier = ?,
            rate_formula = ?, amount_calculation_type = ?, amount_formula = ?, status = ?
        WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(resolved.rate_type.label())
    .bind(resolved.base_rate_type.label())
    .bind(resolved.rate_multiplier.map(|m| m.label()))
    .bind(&resolved.rate_formula)
    .bind(resolved.amount_calculation_type.map(|c| c.label()))
    .bind(&resolved.amount_formula)
    .bind(status)
    .bind(component_id)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => {
            audit::record(
                pool.get_ref(),
                &auth,
                "update",
                "pay_component",
                Some(component_id),
                Some(format!("Updated pay component '{}'", name)),
            )
            .await;

            Ok(response::ok_message("Pay component updated successfully"))
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(response::conflict("Component name already exists"));
                }
            }

            tracing::error!(error = %e, component_id, "Failed to update pay component");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Get pay component by ID
#[utoipa::path(
    get,
    path = "/api/v1/payroll/components/{component_id}",
    params(("component_id", description = "Pay component ID")),
    responses(
        (status = 200, body = PayComponent),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Pay Components"
)]
pub async fn get_component(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_accountant_or_admin()?;

    let component_id = path.into_inner();

    let component = sqlx::query_as::<_, PayComponent>(
        r#"
        SELECT id, name, rate_type, base_rate_type, rate_multiplier, rate_formula,
               amount_calculation_type, amount_formula, status
        FROM pay_components
        WHERE id = ?
        "#,
    )
    .bind(component_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, component_id, "Failed to fetch pay component");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match component {
        Some(c) => Ok(response::ok(c)),
        None => Ok(response::not_found("Pay component not found")),
    }
}

/// List pay components
#[utoipa::path(
    get,
    path = "/api/v1/payroll/components",
    params(ComponentQuery),
    responses((status = 200, description = "Paginated component list")),
    security(("bearer_auth" = [])),
    tag = "Pay Components"
)]
pub async fn list_components(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ComponentQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_accountant_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut conditions = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if let Some(status) = &query.status {
        conditions.push("status = ?");
        bindings.push(status.clone());
    }

    if let Some(rate_type) = &query.rate_type {
        conditions.push("rate_type = ?");
        bindings.push(rate_type.clone());
    }

    if let Some(search) = &query.search {
        conditions.push("name LIKE ?");
        bindings.push(format!("%{}%", search));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM pay_components {}", where_clause);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_q = count_q.bind(b);
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count pay components");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, name, rate_type, base_rate_type, rate_multiplier, rate_formula,
               amount_calculation_type, amount_formula, status
        FROM pay_components
        {}
        ORDER BY name ASC
        LIMIT ? OFFSET ?
        "#,
        where_clause
    );

    let mut data_q = sqlx::query_as::<_, PayComponent>(&data_sql);
    for b in &bindings {
        data_q = data_q.bind(b);
    }

    let components = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch pay components");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(response::ok(json!({
        "data": components,
        "page": page,
        "per_page": per_page,
        "total": total
    })))
}

/// Delete pay component
#[utoipa::path(
    delete,
    path = "/api/v1/payroll/components/{component_id}",
    params(("component_id", description = "Pay component ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Component not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Pay Components"
)]
pub async fn delete_component(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_accountant_or_admin()?;

    let component_id = path.into_inner();

    let result = sqlx::query("DELETE FROM pay_components WHERE id = ?")
        .bind(component_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, component_id, "Failed to delete pay component");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(response::not_found("Pay component not found"));
    }

    audit::record(
        pool.get_ref(),
        &auth,
        "delete",
        "pay_component",
        Some(component_id),
        None,
    )
    .await;

    Ok(response::ok_message("Pay component deleted"))
}

/// Evaluate a component draft
///
/// Answers the form's questions for the current selections: whether a
/// multiplier applies, the legal amount options and default, the derived
/// formulas, formula validation verdicts, and the preview lines. Formula
/// problems are reported in the verdicts, not as request failures.
#[utoipa::path(
    post,
    path = "/api/v1/payroll/components/evaluate",
    request_body = EvaluateComponent,
    responses(
        (status = 200, description = "Rule evaluation", body = Object, example = json!({
            "success": true,
            "data": {
                "is_deduction": false,
                "multiplier_applies": true,
                "multiplier_options": ["1.0", "1.25", "1.30", "1.50", "2.0", "2.50", "custom"],
                "amount_visible": true,
                "amount_options": [
                    {"value": "rate_times_hours", "formula": "RATE * HOURS", "default": true}
                ],
                "rate_formula": "Rate Per Hour * 1.50",
                "preview": {
                    "rate_line": "Rate Formula: Rate Per Hour * 1.50",
                    "example_line": "Example: ₱100 → ₱150"
                }
            }
        })),
        (status = 400, description = "Unknown rate type or base rate type")
    ),
    security(("bearer_auth" = [])),
    tag = "Pay Components"
)]
pub async fn evaluate_component(
    auth: AuthUser,
    payload: web::Json<EvaluateComponent>,
) -> actix_web::Result<impl Responder> {
    auth.require_accountant_or_admin()?;

    let rate_type = match RateType::from_str(&payload.rate_type) {
        Ok(r) => r,
        Err(_) => {
            return Ok(response::bad_request(&format!(
                "Unknown rate type '{}'",
                payload.rate_type
            )));
        }
    };

    let base_rate_type = match payload.base_rate_type.as_deref() {
        None => None,
        Some(raw) => match BaseRateType::from_str(raw) {
            Ok(b) => Some(b),
            Err(_) => {
                return Ok(response::bad_request(&format!(
                    "Unknown base rate type '{}'",
                    raw
                )));
            }
        },
    };

    let multiplier = match payload.rate_multiplier.as_deref() {
        None => None,
        Some(raw) => match RateMultiplier::from_str(raw) {
            Ok(m) => Some(m),
            Err(_) => {
                return Ok(response::bad_request(&format!(
                    "Unknown rate multiplier '{}'",
                    raw
                )));
            }
        },
    };

    let is_deduction = rate_type.is_deduction();

    let multiplier_options: Vec<&str> = if is_deduction {
        Vec::new()
    } else {
        RateMultiplier::FIXED
            .iter()
            .map(|m| m.label())
            .chain(std::iter::once("custom"))
            .collect()
    };

    let rate_formula = if is_deduction {
        base_rate_type.map(|b| b.label().to_string())
    } else {
        match (base_rate_type, multiplier) {
            (_, Some(RateMultiplier::Custom)) => payload
                .custom_rate_formula
                .as_deref()
                .map(|t| t.trim().to_string()),
            (Some(base), Some(m)) => Some(fixed_rate_formula(base, m)),
            _ => None,
        }
    };

    let rate_formula_check = match (multiplier, payload.custom_rate_formula.as_deref()) {
        (Some(RateMultiplier::Custom), Some(text)) => Some(validate_formula(text)),
        _ => None,
    };

    let amount_visible = shows_amount_calculation(rate_type);
    let default_option = default_amount_option(rate_type);
    let amount_option_views: Vec<serde_json::Value> = if amount_visible {
        amount_options(rate_type)
            .iter()
            .map(|opt| {
                json!({
                    "value": opt.label(),
                    "formula": opt.default_formula(),
                    "default": *opt == default_option,
                })
            })
            .collect()
    } else {
        Vec::new()
    };

    let chosen_amount = payload
        .amount_calculation_type
        .as_deref()
        .and_then(|raw| AmountCalculationType::from_str(raw).ok())
        .unwrap_or(default_option);

    let amount_formula = if !amount_visible {
        None
    } else if chosen_amount == AmountCalculationType::Custom {
        payload
            .custom_amount_formula
            .as_deref()
            .map(|t| t.trim().to_string())
    } else {
        chosen_amount.default_formula().map(str::to_string)
    };

    let amount_formula_check = match (chosen_amount, payload.custom_amount_formula.as_deref()) {
        (AmountCalculationType::Custom, Some(text)) => Some(validate_formula(text)),
        _ => None,
    };

    let preview = rate_formula.as_deref().map(|formula| {
        let p = component_preview(rate_type, multiplier, formula, amount_formula.as_deref());
        json!({
            "rate_line": p.rate_line,
            "example_line": p.example_line,
            "amount_line": p.amount_line,
        })
    });

    Ok(response::ok(json!({
        "is_deduction": is_deduction,
        "multiplier_applies": !is_deduction,
        "multiplier_options": multiplier_options,
        "amount_visible": amount_visible,
        "amount_options": amount_option_views,
        "rate_formula": rate_formula,
        "amount_formula": amount_formula,
        "rate_formula_check": rate_formula_check,
        "amount_formula_check": amount_formula_check,
        "preview": preview,
    })))
}
