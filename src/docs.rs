use crate::api::attendance::{AttendanceQuery, AttendanceView};
use crate::api::audit::{AuditListResponse, AuditQuery};
use crate::api::benefit::{
    BenefitPeriodSummary, CompletedEmployee, PendingEmployee, PeriodScopedQuery, RecordScopeQuery,
    UploadQuery,
};
use crate::api::employee::{
    ChangeRole, CreateEmployee, EmployeeListResponse, EmployeeQuery, ProfileUpdate,
};
use crate::api::holiday::{AvailableHolidaysQuery, CreateHoliday, HolidayQuery};
use crate::api::pay_component::{
    ComponentQuery, EvaluateComponent, SavePayComponent, UpdatePayComponent,
};
use crate::api::payroll_period::{CreatePeriod, PeriodQuery, UpdatePeriod};
use crate::model::audit::AuditEntry;
use crate::model::benefit::{BenefitFile, BenefitRecord};
use crate::model::employee::Employee;
use crate::model::holiday::Holiday;
use crate::model::pay_component::PayComponent;
use crate::model::payroll_period::PayrollPeriod;
use crate::models::{LoginReqDto, RegisterReq};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "HR Payroll API",
        version = "1.0.0",
        description = r#"
## HR/Payroll Management API

Backend for the multi-role HR/payroll dashboards (admin, HR, accountant,
employee, applicant).

### Key Features
- **Pay Component Configuration**
  - Rate-type driven rules: multiplier applicability, amount-calculation
    options, custom formula validation, live previews
- **Payroll Periods & Holidays**
  - Semi-monthly period derivation and automatic holiday selection
- **Benefit Documents**
  - Per-period SSS / Tax / PhilHealth / PAG-IBIG uploads and payslip release
- **Employee & Applicant Management**
  - Profiles, role changes, application status
- **Attendance & Dashboards**
  - Daily attendance with lateness, HR summary

### Security
Endpoints under `/api/v1` require **JWT Bearer authentication**; role gates
apply per operation.

### Response Format
Every endpoint answers `{"success": bool, "data" | "message": ...}`.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,
        crate::api::employee::change_role,
        crate::api::employee::list_applicants,
        crate::api::employee::applicant_status,
        crate::api::employee::update_profile,

        crate::api::pay_component::create_component,
        crate::api::pay_component::list_components,
        crate::api::pay_component::get_component,
        crate::api::pay_component::update_component,
        crate::api::pay_component::delete_component,
        crate::api::pay_component::evaluate_component,

        crate::api::holiday::create_holiday,
        crate::api::holiday::list_holidays,
        crate::api::holiday::get_holiday,
        crate::api::holiday::update_holiday,
        crate::api::holiday::delete_holiday,
        crate::api::holiday::available_holidays,

        crate::api::payroll_period::create_period,
        crate::api::payroll_period::list_periods,
        crate::api::payroll_period::get_period,
        crate::api::payroll_period::update_period,
        crate::api::payroll_period::delete_period,
        crate::api::payroll_period::period_details,

        crate::api::benefit::benefit_periods,
        crate::api::benefit::pending_employees,
        crate::api::benefit::completed_employees,
        crate::api::benefit::benefit_details,
        crate::api::benefit::upload_file,
        crate::api::benefit::delete_file,
        crate::api::benefit::release_payslip,

        crate::api::attendance::list_attendance,
        crate::api::dashboard::hr_summary,
        crate::api::audit::list_audit
    ),
    components(
        schemas(
            RegisterReq,
            LoginReqDto,
            Employee,
            CreateEmployee,
            EmployeeQuery,
            EmployeeListResponse,
            ChangeRole,
            ProfileUpdate,
            PayComponent,
            SavePayComponent,
            UpdatePayComponent,
            ComponentQuery,
            EvaluateComponent,
            Holiday,
            CreateHoliday,
            HolidayQuery,
            AvailableHolidaysQuery,
            PayrollPeriod,
            CreatePeriod,
            UpdatePeriod,
            PeriodQuery,
            BenefitRecord,
            BenefitFile,
            BenefitPeriodSummary,
            PendingEmployee,
            CompletedEmployee,
            PeriodScopedQuery,
            RecordScopeQuery,
            UploadQuery,
            AttendanceQuery,
            AttendanceView,
            AuditEntry,
            AuditQuery,
            AuditListResponse
        )
    ),
    tags(
        (name = "Auth", description = "Account and token APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Applicants", description = "Applicant and profile APIs"),
        (name = "Pay Components", description = "Pay component configuration APIs"),
        (name = "Holidays", description = "Holiday management APIs"),
        (name = "Payroll Periods", description = "Payroll period APIs"),
        (name = "Benefits", description = "Benefit document and payslip release APIs"),
        (name = "Attendance", description = "Attendance display APIs"),
        (name = "Dashboard", description = "Dashboard summary APIs"),
        (name = "Audit", description = "Audit trail APIs"),
    )
)]
pub struct ApiDoc;
