use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_code": "EMP-001",
        "first_name": "Maria",
        "last_name": "Santos",
        "email": "maria.santos@company.com",
        "phone": "+639171234567",
        "department": "Accounting",
        "position": "Payroll Officer",
        "hire_date": "2024-01-15",
        "status": "active"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "EMP-001")]
    pub employee_code: String,

    #[schema(example = "Maria")]
    pub first_name: String,

    #[schema(example = "Santos")]
    pub last_name: String,

    #[schema(example = "maria.santos@company.com")]
    pub email: String,

    #[schema(example = "+639171234567", nullable = true)]
    pub phone: Option<String>,

    #[schema(example = "Accounting", nullable = true)]
    pub department: Option<String>,

    #[schema(example = "Payroll Officer", nullable = true)]
    pub position: Option<String>,

    /// Not yet set while the row is still an applicant.
    #[schema(example = "2024-01-15", value_type = String, format = "date", nullable = true)]
    pub hire_date: Option<NaiveDate>,

    /// One of `applicant`, `active`, `inactive`.
    #[schema(example = "active")]
    pub status: String,
}
