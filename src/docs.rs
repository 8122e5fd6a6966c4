use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use matricula_core::FieldError;
use matricula_models::{
    Address, AdmissionApplication, ApplicationInput, ApplicationStatus, ApproveFullDto,
    ChildAttendance, ChildGrades, CreateStudentDto, FullApprovalResponse, Gender, IdentityProfile,
    LoginRequest, LoginResponse, Parent, ParentInfo, RecordAttendanceDto, RecordMarksDto,
    RejectDto, ReviewDto, SchoolStatistics, Student, StudentInfo, SubmitApplicationResponse,
    UpdateProfileDto, UpdateStudentDto,
};

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::Role;
use crate::modules::enrollment::model::Enrollment;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::admissions::controller::submit_application,
        crate::modules::admissions::controller::list_applications,
        crate::modules::admissions::controller::get_application,
        crate::modules::admissions::controller::approve_application,
        crate::modules::admissions::controller::approve_application_full,
        crate::modules::admissions::controller::review_application,
        crate::modules::admissions::controller::reject_application,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::me,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_orphan_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::students::controller::record_attendance,
        crate::modules::students::controller::record_marks,
        crate::modules::students::controller::get_profile,
        crate::modules::students::controller::update_profile,
        crate::modules::parents::controller::get_children,
        crate::modules::parents::controller::get_child_attendance,
        crate::modules::parents::controller::get_child_grades,
        crate::modules::dashboard::controller::get_statistics,
    ),
    components(
        schemas(
            ErrorResponse,
            FieldError,
            ApplicationInput,
            ApplicationStatus,
            AdmissionApplication,
            StudentInfo,
            ParentInfo,
            Address,
            Gender,
            SubmitApplicationResponse,
            ApproveFullDto,
            ReviewDto,
            RejectDto,
            FullApprovalResponse,
            LoginRequest,
            LoginResponse,
            IdentityProfile,
            Role,
            Student,
            Parent,
            Enrollment,
            CreateStudentDto,
            UpdateStudentDto,
            RecordAttendanceDto,
            RecordMarksDto,
            UpdateProfileDto,
            ChildAttendance,
            ChildGrades,
            SchoolStatistics,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Admissions", description = "Admission applications and their review"),
        (name = "Authentication", description = "Login for staff, students and parents"),
        (name = "Students", description = "Enrolled student administration and self-service"),
        (name = "Parents", description = "Parent view of their own children"),
        (name = "Dashboard", description = "Administrator head counts")
    ),
    info(
        title = "Matricula API",
        version = "0.1.0",
        description = "Admission-to-enrollment workflow for a school, built with Rust, Axum, and PostgreSQL.",
        contact(
            name = "API Support",
            email = "support@matricula.dev"
        ),
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/admission/apply",
            "/api/admission/applications/{id}/approve-full",
            "/api/login",
            "/api/me",
            "/api/admin/students/orphans",
            "/api/admin/students/{id}/marks",
            "/api/admin/dashboard",
            "/api/parents/children/{id}/grades",
            "/api/students/profile",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        assert!(
            doc.components
                .as_ref()
                .is_some_and(|c| c.security_schemes.contains_key("bearer_auth"))
        );
    }
}
