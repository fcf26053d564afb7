use crate::{
    api::{audit, response},
    auth::auth::AuthUser,
    model::{employee::Employee, role::Role},
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

const EMPLOYEE_COLUMNS: &[&str] = &[
    "employee_code",
    "first_name",
    "last_name",
    "email",
    "phone",
    "department",
    "position",
    "hire_date",
    "status",
];

const EMPLOYEE_SELECT: &str = r#"
    SELECT id, employee_code, first_name, last_name, email, phone,
           department, position, hire_date, status
    FROM employees
"#;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "EMP-003")]
    pub employee_code: String,
    #[schema(example = "Maria")]
    pub first_name: String,
    #[schema(example = "Santos")]
    pub last_name: String,
    #[schema(example = "maria.santos@company.com", format = "email")]
    pub email: String,
    #[schema(example = "+639171234567", nullable = true)]
    pub phone: Option<String>,
    #[schema(example = "Accounting", nullable = true)]
    pub department: Option<String>,
    #[schema(example = "Payroll Officer", nullable = true)]
    pub position: Option<String>,
    #[schema(example = "2024-01-15", format = "date", value_type = String)]
    pub hire_date: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub department: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ChangeRole {
    /// 1=admin, 2=hr, 3=accountant, 4=employee, 5=applicant
    #[schema(example = 4)]
    pub role_id: u8,
}

#[derive(Deserialize, ToSchema)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(format = "email")]
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created"),
        (status = 409, description = "Employee code or email already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let result = sqlx::query(
        r#"
        INSERT INTO employees
        (employee_code, first_name, last_name, email, phone, department, position, hire_date, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'active')
        "#,
    )
    .bind(&payload.employee_code)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.department)
    .bind(&payload.position)
    .bind(payload.hire_date)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(res) => {
            let id = res.last_insert_id();
            audit::record(
                pool.get_ref(),
                &auth,
                "create",
                "employee",
                Some(id),
                Some(format!("Created employee {}", payload.employee_code)),
            )
            .await;

            Ok(response::created(json!({"id": id})))
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(response::conflict(
                        "Employee code or email already exists",
                    ));
                }
            }

            error!(error = %e, "Failed to create employee");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// List employees
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if let Some(department) = &query.department {
        conditions.push("department = ?");
        bindings.push(department.clone());
    }

    if let Some(status) = &query.status {
        conditions.push("status = ?");
        bindings.push(status.clone());
    }

    if let Some(search) = &query.search {
        conditions.push("(first_name LIKE ? OR last_name LIKE ? OR email LIKE ?)");
        let like = format!("%{}%", search);
        bindings.push(like.clone());
        bindings.push(like.clone());
        bindings.push(like);
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM employees {}", where_clause);
    debug!(sql = %count_sql, "Counting employees");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count employees");
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    let data_sql = format!(
        "{} {} ORDER BY id DESC LIMIT ? OFFSET ?",
        EMPLOYEE_SELECT, where_clause
    );
    debug!(sql = %data_sql, page, per_page, offset, "Fetching employees");

    let mut data_query = sqlx::query_as::<_, Employee>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let employees = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch employees");
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    Ok(response::ok(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id", description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    // Staff can read their own profile; anything else needs HR/admin.
    if auth.employee_id != Some(employee_id) {
        auth.require_hr_or_admin()?;
    }

    let sql = format!("{} WHERE id = ?", EMPLOYEE_SELECT);
    let employee = sqlx::query_as::<_, Employee>(&sql)
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to fetch employee");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match employee {
        Some(emp) => Ok(response::ok(emp)),
        None => Ok(response::not_found("Employee not found")),
    }
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id", description = "Employee ID")),
    responses(
        (status = 200, description = "Employee updated"),
        (status = 400, description = "Unknown field"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let employee_id = path.into_inner();

    let update = build_update_sql("employees", &body, EMPLOYEE_COLUMNS, "id", employee_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(response::not_found("Employee not found"));
    }

    audit::record(
        pool.get_ref(),
        &auth,
        "update",
        "employee",
        Some(employee_id),
        None,
    )
    .await;

    Ok(response::ok_message("Employee updated successfully"))
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id", description = "Employee ID")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employee_id = path.into_inner();

    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(res) => {
            if res.rows_affected() == 0 {
                return Ok(response::not_found("Employee not found"));
            }

            audit::record(
                pool.get_ref(),
                &auth,
                "delete",
                "employee",
                Some(employee_id),
                None,
            )
            .await;

            Ok(response::ok_message("Successfully deleted"))
        }

        Err(e) => {
            error!(error = %e, employee_id, "Failed to delete employee");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Change the role of the account linked to an employee
///
/// Promoting an applicant to a staff role also activates the employee row
/// and stamps the hire date.
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}/role",
    request_body = ChangeRole,
    params(("employee_id", description = "Employee ID")),
    responses(
        (status = 200, description = "Role changed"),
        (status = 400, description = "Unknown role"),
        (status = 404, description = "No account linked to this employee")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn change_role(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<ChangeRole>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employee_id = path.into_inner();

    let role = match Role::from_id(body.role_id) {
        Some(r) => r,
        None => return Ok(response::bad_request("Unknown role")),
    };

    let result = sqlx::query("UPDATE users SET role_id = ? WHERE employee_id = ?")
        .bind(role.id())
        .bind(employee_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to change role");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(response::not_found("No account linked to this employee"));
    }

    if role != Role::Applicant {
        if let Err(e) = sqlx::query(
            "UPDATE employees SET status = 'active', hire_date = COALESCE(hire_date, CURDATE()) \
             WHERE id = ? AND status = 'applicant'",
        )
        .bind(employee_id)
        .execute(pool.get_ref())
        .await
        {
            error!(error = %e, employee_id, "Failed to activate promoted applicant");
        }
    }

    audit::record(
        pool.get_ref(),
        &auth,
        "role_change",
        "employee",
        Some(employee_id),
        Some(format!("Role set to {}", role.id())),
    )
    .await;

    Ok(response::ok_message("Role changed"))
}

/// List applicants
#[utoipa::path(
    get,
    path = "/api/v1/applicants",
    params(EmployeeQuery),
    responses((status = 200, description = "Paginated applicant list", body = EmployeeListResponse)),
    tag = "Applicants",
    security(("bearer_auth" = []))
)]
pub async fn list_applicants(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let total =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE status = 'applicant'")
            .fetch_one(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to count applicants");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    let sql = format!(
        "{} WHERE status = 'applicant' ORDER BY id DESC LIMIT ? OFFSET ?",
        EMPLOYEE_SELECT
    );
    let applicants = sqlx::query_as::<_, Employee>(&sql)
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch applicants");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(response::ok(EmployeeListResponse {
        data: applicants,
        page,
        per_page,
        total,
    }))
}

fn profile_completion(employee: &Employee) -> u32 {
    let fields = [
        !employee.first_name.trim().is_empty(),
        !employee.last_name.trim().is_empty(),
        !employee.email.trim().is_empty(),
        employee.phone.as_deref().is_some_and(|p| !p.trim().is_empty()),
    ];

    let filled = fields.iter().filter(|f| **f).count() as u32;
    filled * 100 / fields.len() as u32
}

/// Own application status
///
/// For the signed-in applicant: application status plus how complete the
/// profile is.
#[utoipa::path(
    get,
    path = "/api/v1/applicants/status",
    responses(
        (status = 200, description = "Application status", body = Object, example = json!({
            "success": true,
            "data": {"status": "applicant", "profile_complete_percent": 75}
        })),
        (status = 404, description = "No profile yet")
    ),
    tag = "Applicants",
    security(("bearer_auth" = []))
)]
pub async fn applicant_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id = match auth.employee_id {
        Some(id) => id,
        None => {
            return Ok(response::ok(json!({
                "status": "no_profile",
                "profile_complete_percent": 0
            })));
        }
    };

    let sql = format!("{} WHERE id = ?", EMPLOYEE_SELECT);
    let employee = sqlx::query_as::<_, Employee>(&sql)
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to fetch applicant profile");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match employee {
        Some(emp) => {
            let percent = profile_completion(&emp);
            Ok(response::ok(json!({
                "status": emp.status,
                "profile_complete_percent": percent
            })))
        }
        None => Ok(response::not_found("Profile not found")),
    }
}

/// Set up or update the signed-in user's own profile
///
/// First call creates the employee row (applicant status) and links it to
/// the account; later calls update the contact fields.
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Profile saved", body = Employee),
        (status = 400, description = "Missing required fields on first setup")
    ),
    tag = "Applicants",
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    body: web::Json<ProfileUpdate>,
) -> actix_web::Result<impl Responder> {
    let employee_id = match auth.employee_id {
        Some(id) => {
            let mut fields = serde_json::Map::new();
            if let Some(v) = &body.first_name {
                fields.insert("first_name".into(), json!(v));
            }
            if let Some(v) = &body.last_name {
                fields.insert("last_name".into(), json!(v));
            }
            if let Some(v) = &body.email {
                fields.insert("email".into(), json!(v));
            }
            if let Some(v) = &body.phone {
                fields.insert("phone".into(), json!(v));
            }

            let update = build_update_sql(
                "employees",
                &Value::Object(fields),
                EMPLOYEE_COLUMNS,
                "id",
                id,
            )?;
            execute_update(pool.get_ref(), update)
                .await
                .map_err(actix_web::error::ErrorInternalServerError)?;

            id
        }
        None => {
            // First setup: all three identity fields are required.
            let (Some(first_name), Some(last_name), Some(email)) = (
                body.first_name.as_deref(),
                body.last_name.as_deref(),
                body.email.as_deref(),
            ) else {
                return Ok(response::bad_request(
                    "first_name, last_name and email are required",
                ));
            };

            let employee_code = format!("APP-{:05}", auth.user_id);

            let result = sqlx::query(
                r#"
                INSERT INTO employees
                (employee_code, first_name, last_name, email, phone, status)
                VALUES (?, ?, ?, ?, ?, 'applicant')
                "#,
            )
            .bind(&employee_code)
            .bind(first_name)
            .bind(last_name)
            .bind(email)
            .bind(&body.phone)
            .execute(pool.get_ref())
            .await;

            let new_id = match result {
                Ok(res) => res.last_insert_id(),
                Err(e) => {
                    if let sqlx::Error::Database(db_err) = &e {
                        if db_err.code().as_deref() == Some("23000") {
                            return Ok(response::conflict("Email already in use"));
                        }
                    }

                    error!(error = %e, "Failed to create applicant profile");
                    return Err(actix_web::error::ErrorInternalServerError(
                        "Internal Server Error",
                    ));
                }
            };

            sqlx::query("UPDATE users SET employee_id = ? WHERE id = ?")
                .bind(new_id)
                .bind(auth.user_id)
                .execute(pool.get_ref())
                .await
                .map_err(|e| {
                    error!(error = %e, "Failed to link applicant profile");
                    actix_web::error::ErrorInternalServerError("Internal Server Error")
                })?;

            new_id
        }
    };

    let sql = format!("{} WHERE id = ?", EMPLOYEE_SELECT);
    let employee = sqlx::query_as::<_, Employee>(&sql)
        .bind(employee_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to reload profile");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    audit::record(
        pool.get_ref(),
        &auth,
        "update",
        "profile",
        Some(employee_id),
        None,
    )
    .await;

    Ok(response::ok(employee))
}
