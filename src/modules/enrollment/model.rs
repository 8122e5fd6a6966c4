use serde::Serialize;
use utoipa::ToSchema;

use chrono::NaiveDate;
use matricula_models::{
    Address, AdmissionApplication, ApproveFullDto, CreateStudentDto, Gender, Parent, Student,
};

/// Fallback father name for quick-add students entered without one.
pub const DEFAULT_PARENT_NAME: &str = "Parent";

/// Guardian details the provisioner writes on the student and, for a new
/// parent account, on the parent.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardianDraft {
    pub father_name: String,
    pub mother_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub occupation: Option<String>,
    pub address: Option<Address>,
}

/// Everything needed to provision one student. Passwords are already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrollmentRequest {
    pub roll_number: String,
    /// Generated from the yearly sequence when absent
    pub admission_number: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub address: Option<Address>,
    pub class_name: String,
    pub section: Option<String>,
    pub previous_school: Option<String>,
    pub medical_conditions: Option<String>,
    pub guardian: GuardianDraft,
    pub student_password_hash: String,
    pub parent_password_hash: String,
}

impl EnrollmentRequest {
    pub fn from_application(
        application: &AdmissionApplication,
        dto: &ApproveFullDto,
        student_password_hash: String,
        parent_password_hash: String,
    ) -> Self {
        let student = &application.student_info;
        let parent = &application.parent_info;

        Self {
            roll_number: dto.roll_number.clone(),
            admission_number: None,
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            date_of_birth: Some(student.date_of_birth),
            gender: Some(student.gender),
            address: Some(parent.address.clone()),
            class_name: dto.class_name.clone(),
            section: Some(dto.section.clone()),
            previous_school: student.previous_school.clone(),
            medical_conditions: student.medical_conditions.clone(),
            guardian: GuardianDraft {
                father_name: parent.father_name.clone(),
                mother_name: Some(parent.mother_name.clone()),
                email: parent.email.clone(),
                phone: Some(parent.phone.clone()),
                occupation: parent.occupation.clone(),
                address: Some(parent.address.clone()),
            },
            student_password_hash,
            parent_password_hash,
        }
    }

    /// `parent_email` must already be normalized.
    pub fn from_quick_add(
        dto: CreateStudentDto,
        parent_email: String,
        student_password_hash: String,
        parent_password_hash: String,
    ) -> Self {
        Self {
            roll_number: dto.roll_number,
            admission_number: dto.admission_number,
            first_name: dto.first_name,
            last_name: dto.last_name,
            date_of_birth: dto.date_of_birth,
            gender: dto.gender,
            address: None,
            class_name: dto.class_name,
            section: dto.section,
            previous_school: None,
            medical_conditions: None,
            guardian: GuardianDraft {
                father_name: dto
                    .parent_name
                    .unwrap_or_else(|| DEFAULT_PARENT_NAME.to_string()),
                mother_name: dto.mother_name,
                email: parent_email,
                phone: dto.parent_phone,
                occupation: None,
                address: None,
            },
            student_password_hash,
            parent_password_hash,
        }
    }
}

/// The pair of accounts a provisioning run leaves behind.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Enrollment {
    pub student: Student,
    pub parent: Parent,
}
