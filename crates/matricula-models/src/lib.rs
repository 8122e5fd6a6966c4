//! # Matricula Models
//!
//! Domain models and DTOs for the Matricula API.
//!
//! # Modules
//!
//! - [`admissions`]: admission applications, their lifecycle and review DTOs
//! - [`students`]: enrolled students and their academic record
//! - [`parents`]: parent accounts and child links
//! - [`staff`]: admin and teacher accounts
//! - [`auth`]: login request/response and identity profiles
//! - [`dashboard`]: head counts for administrators
//! - [`numbering`]: `ADM<year><seq>` number generation
//! - [`ids`]: typed entity ids
//!
//! # Example
//!
//! ```ignore
//! use matricula_models::admissions::ApplicationInput;
//!
//! let input: ApplicationInput = serde_json::from_value(body)?;
//! let application = input.into_new_application("India")?;
//! ```

pub mod admissions;
pub mod auth;
pub mod dashboard;
pub mod ids;
pub mod numbering;
pub mod parents;
pub mod staff;
pub mod students;
pub mod value_types;

pub use admissions::{
    Address, AdmissionApplication, ApplicationInput, ApplicationStatus, ApproveFullDto,
    FullApprovalResponse, Gender, NewApplication, ParentInfo, RejectDto, ReviewDto, ReviewUpdate,
    StudentInfo, SubmitApplicationResponse,
};

pub use auth::{IdentityProfile, LoginRequest, LoginResponse};

pub use dashboard::SchoolStatistics;

pub use ids::{ApplicationId, ParentId, StaffId, StudentId};

pub use parents::{ChildAttendance, ChildGrades, ChildLink, NewParent, Parent};

pub use staff::{NewStaff, StaffAccount};

pub use students::{
    AcademicInfo, Attendance, AttendanceStatus, CreateStudentDto, ExamType, FeeLedger,
    GuardianInfo, Marks, NewStudent, PersonalInfo, RecordAttendanceDto, RecordMarksDto, Student,
    StudentStatus, UpdateProfileDto, UpdateStudentDto,
};

pub use value_types::Email;
