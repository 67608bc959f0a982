use crate::api::attendance::{AttendanceSummary, MarkAttendance, TodayStatus};
use crate::api::staff::{RegisterStaff, RegisteredResponse};
use crate::api::timetable::{GeneratedTimetable, PersonalSchedule};
use crate::model::attendance::{AttendanceRecord, Location};
use crate::model::staff::{Staff, StaffRole};
use crate::model::timetable::PersonalEntry;
use crate::models::{LoginResponse, OfficeLoginReq, StaffLoginReq};
use crate::scheduling::rules::RuleViolation;
use crate::scheduling::{PresentTeacher, TimetableRequest};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "School Staff Portal API",
        version = "1.0.0",
        description = r#"
## School Staff Attendance & Timetable Portal

### 🔹 Key Features
- **Staff Directory**
  - Self registration with an issued staff id, admin registration and lookup
- **Attendance**
  - One selfie check-in per staff member per day, daily summary and CSV export
- **Timetable**
  - Build today's generator input from attendance, generate a candidate, review and publish
  - Per-teacher view of a published day

### 🔐 Security
Staff log in with their staff id; the admin and vice-principal log in with email and password.
Protected endpoints take a **JWT Bearer** token.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::staff_login,
        crate::auth::handlers::admin_login,
        crate::auth::handlers::vice_principal_login,

        crate::api::staff::me,
        crate::api::staff::create_staff,
        crate::api::staff::list_staff,
        crate::api::staff::get_staff,

        crate::api::attendance::today_status,
        crate::api::attendance::mark_attendance,
        crate::api::attendance::list_attendance,
        crate::api::attendance::attendance_summary,
        crate::api::attendance::export_attendance,

        crate::api::timetable::timetable_request,
        crate::api::timetable::generate_timetable,
        crate::api::timetable::publish_timetable,
        crate::api::timetable::get_timetable,
        crate::api::timetable::my_timetable
    ),
    components(
        schemas(
            StaffLoginReq,
            OfficeLoginReq,
            LoginResponse,
            RegisterStaff,
            RegisteredResponse,
            Staff,
            StaffRole,
            Location,
            AttendanceRecord,
            MarkAttendance,
            TodayStatus,
            AttendanceSummary,
            PresentTeacher,
            TimetableRequest,
            RuleViolation,
            GeneratedTimetable,
            PersonalEntry,
            PersonalSchedule
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Staff", description = "Staff directory APIs"),
        (name = "Attendance", description = "Daily attendance APIs"),
        (name = "Timetable", description = "Timetable generation and publishing APIs"),
    )
)]
pub struct ApiDoc;

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
