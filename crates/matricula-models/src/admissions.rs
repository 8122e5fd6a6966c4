//! Admission application models and DTOs.
//!
//! An application moves `pending → under_review → approved | rejected`.
//! `approved` and `rejected` are terminal; an approved application may still
//! receive its account provisioning exactly once (see `is_provisioned`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use matricula_core::errors::{FieldError, field_errors};
use matricula_core::serde::{deserialize_optional_trimmed, deserialize_trimmed};

use crate::ids::{ApplicationId, StaffId};
use crate::parents::Parent;
use crate::students::Student;
use crate::value_types::Email;

/// Remark stamped on a simple (acknowledge-only) approval.
pub const SIMPLE_APPROVAL_REMARK: &str =
    "Approved - Please visit school with original documents within one week";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(format!("Unknown gender: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Approved | ApplicationStatus::Rejected
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "under_review" => Ok(ApplicationStatus::UnderReview),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(format!("Unknown application status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    #[serde(rename = "class")]
    pub class_name: String,
    pub previous_school: Option<String>,
    pub medical_conditions: Option<String>,
}

impl StudentInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParentInfo {
    pub father_name: String,
    pub mother_name: String,
    /// Trimmed and lower-cased contact email
    pub email: String,
    pub phone: String,
    pub occupation: Option<String>,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionApplication {
    pub id: ApplicationId,
    /// `ADM<year><4-digit sequence>`
    pub application_number: String,
    pub student_info: StudentInfo,
    pub parent_info: ParentInfo,
    pub status: ApplicationStatus,
    pub submission_date: DateTime<Utc>,
    pub reviewed_by: Option<StaffId>,
    pub review_date: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
    pub assigned_roll_number: Option<String>,
    pub assigned_class: Option<String>,
    pub assigned_section: Option<String>,
    pub admission_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdmissionApplication {
    /// Whether a Student and Parent were already created from this application.
    pub fn is_provisioned(&self) -> bool {
        self.assigned_roll_number.is_some()
    }
}

/// A validated, normalized application ready to be numbered and stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub student_info: StudentInfo,
    pub parent_info: ParentInfo,
}

/// Fields written by a review transition.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewUpdate {
    pub status: ApplicationStatus,
    pub reviewed_by: Option<StaffId>,
    pub review_date: DateTime<Utc>,
    pub remarks: Option<String>,
    pub assigned_roll_number: Option<String>,
    pub assigned_class: Option<String>,
    pub assigned_section: Option<String>,
    pub admission_date: Option<DateTime<Utc>>,
}

impl ReviewUpdate {
    pub fn status_change(
        status: ApplicationStatus,
        reviewed_by: Option<StaffId>,
        remarks: Option<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            status,
            reviewed_by,
            review_date: at,
            remarks,
            assigned_roll_number: None,
            assigned_class: None,
            assigned_section: None,
            admission_date: None,
        }
    }

    /// Applies the update to an in-memory copy. Assignment fields are only
    /// overwritten when the update carries them.
    pub fn apply_to(&self, application: &mut AdmissionApplication) {
        application.status = self.status;
        application.reviewed_by = self.reviewed_by.or(application.reviewed_by);
        application.review_date = Some(self.review_date);
        if self.remarks.is_some() {
            application.remarks = self.remarks.clone();
        }
        if self.assigned_roll_number.is_some() {
            application.assigned_roll_number = self.assigned_roll_number.clone();
            application.assigned_class = self.assigned_class.clone();
            application.assigned_section = self.assigned_section.clone();
            application.admission_date = self.admission_date;
        }
        application.updated_at = self.review_date;
    }
}

// ============================================================================
// Submission input
// ============================================================================

fn required(field_message: &'static str) -> ValidationError {
    let mut err = ValidationError::new("invalid");
    err.message = Some(Cow::Borrowed(field_message));
    err
}

fn valid_date_of_birth(value: &str) -> Result<(), ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| required("Valid date of birth is required"))
}

fn valid_gender(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Gender>()
        .map(|_| ())
        .map_err(|_| required("Valid gender is required"))
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfoInput {
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "Student first name is required"))]
    pub first_name: String,
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "Student last name is required"))]
    pub last_name: String,
    /// ISO date, `YYYY-MM-DD`
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(custom(function = "valid_date_of_birth"))]
    pub date_of_birth: String,
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(custom(function = "valid_gender"))]
    pub gender: String,
    #[serde(rename = "class", default, deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "Class is required"))]
    pub class_name: String,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub previous_school: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub medical_conditions: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "Address is required"))]
    pub street: String,
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "Zip code is required"))]
    pub zip_code: String,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParentInfoInput {
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "Father name is required"))]
    pub father_name: String,
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "Mother name is required"))]
    pub mother_name: String,
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(email(message = "Valid parent email is required"))]
    pub email: String,
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "Parent phone is required"))]
    pub phone: String,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub occupation: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub address: AddressInput,
}

/// Public admission form as submitted.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationInput {
    #[serde(default)]
    #[validate(nested)]
    pub student_info: StudentInfoInput,
    #[serde(default)]
    #[validate(nested)]
    pub parent_info: ParentInfoInput,
}

impl ApplicationInput {
    /// Validates every field and, when all pass, returns the normalized
    /// application. All violations are reported together.
    pub fn into_new_application(
        self,
        default_country: &str,
    ) -> Result<NewApplication, Vec<FieldError>> {
        if let Err(errors) = self.validate() {
            return Err(field_errors(&errors));
        }

        let student = self.student_info;
        let parent = self.parent_info;

        let date_of_birth = NaiveDate::parse_from_str(&student.date_of_birth, "%Y-%m-%d")
            .map_err(|_| {
                vec![FieldError::new(
                    "studentInfo.dateOfBirth",
                    "Valid date of birth is required",
                )]
            })?;
        let gender = student.gender.parse::<Gender>().map_err(|_| {
            vec![FieldError::new(
                "studentInfo.gender",
                "Valid gender is required",
            )]
        })?;
        let email = Email::new(&parent.email).map_err(|_| {
            vec![FieldError::new(
                "parentInfo.email",
                "Valid parent email is required",
            )]
        })?;

        Ok(NewApplication {
            student_info: StudentInfo {
                first_name: student.first_name,
                last_name: student.last_name,
                date_of_birth,
                gender,
                class_name: student.class_name,
                previous_school: student.previous_school,
                medical_conditions: student.medical_conditions,
            },
            parent_info: ParentInfo {
                father_name: parent.father_name,
                mother_name: parent.mother_name,
                email: email.into_inner(),
                phone: parent.phone,
                occupation: parent.occupation,
                address: Address {
                    street: parent.address.street,
                    city: parent.address.city,
                    state: parent.address.state,
                    zip_code: parent.address.zip_code,
                    country: parent
                        .address
                        .country
                        .unwrap_or_else(|| default_country.to_string()),
                },
            },
        })
    }
}

// ============================================================================
// Review DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationResponse {
    pub application_number: String,
    pub status: ApplicationStatus,
}

/// Full approval: assigns placement and creates the student and parent logins.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveFullDto {
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(
        length(min = 1, message = "Roll number is required"),
        custom(function = "crate::value_types::valid_roll_number")
    )]
    pub roll_number: String,
    #[serde(rename = "class", default, deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "Class is required"))]
    pub class_name: String,
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "Section is required"))]
    pub section: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Student password must be at least 6 characters"))]
    pub student_password: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Parent password must be at least 6 characters"))]
    pub parent_password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectDto {
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "Remarks are required when rejecting an application"))]
    pub remarks: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FullApprovalResponse {
    pub application: AdmissionApplication,
    pub student: Student,
    pub parent: Parent,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_input() -> ApplicationInput {
        serde_json::from_value(serde_json::json!({
            "studentInfo": {
                "firstName": "Rahul",
                "lastName": "Sharma",
                "dateOfBirth": "2012-04-15",
                "gender": "male",
                "class": "9th"
            },
            "parentInfo": {
                "fatherName": "Suresh Kumar Sharma",
                "motherName": "Anita Sharma",
                "email": "  Suresh.Sharma@Example.com ",
                "phone": "9876543210",
                "address": {
                    "street": "12 MG Road",
                    "city": "Patna",
                    "state": "Bihar",
                    "zipCode": "800001"
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_input_is_normalized() {
        let app = complete_input().into_new_application("India").unwrap();
        assert_eq!(app.parent_info.email, "suresh.sharma@example.com");
        assert_eq!(app.parent_info.address.country, "India");
        assert_eq!(app.student_info.gender, Gender::Male);
        assert_eq!(app.student_info.class_name, "9th");
    }

    #[test]
    fn test_missing_email_is_reported_by_path() {
        let mut input = complete_input();
        input.parent_info.email = String::new();
        let errors = input.into_new_application("India").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "parentInfo.email");
        assert_eq!(errors[0].message, "Valid parent email is required");
    }

    #[test]
    fn test_all_violations_reported_together() {
        let errors = ApplicationInput::default()
            .into_new_application("India")
            .unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        for expected in [
            "studentInfo.firstName",
            "studentInfo.lastName",
            "studentInfo.dateOfBirth",
            "studentInfo.gender",
            "studentInfo.class",
            "parentInfo.fatherName",
            "parentInfo.motherName",
            "parentInfo.email",
            "parentInfo.phone",
            "parentInfo.address.street",
            "parentInfo.address.city",
            "parentInfo.address.state",
            "parentInfo.address.zipCode",
        ] {
            assert!(fields.contains(&expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_invalid_gender_and_date() {
        let mut input = complete_input();
        input.student_info.gender = "unknown".to_string();
        input.student_info.date_of_birth = "15/04/2012".to_string();
        let errors = input.into_new_application("India").unwrap_err();
        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert!(messages.contains(&"Valid gender is required"));
        assert!(messages.contains(&"Valid date of birth is required"));
    }

    #[test]
    fn test_status_terminal() {
        assert!(ApplicationStatus::Approved.is_terminal());
        assert!(ApplicationStatus::Rejected.is_terminal());
        assert!(!ApplicationStatus::UnderReview.is_terminal());
        assert_eq!(
            serde_json::to_string(&ApplicationStatus::UnderReview).unwrap(),
            r#""under_review""#
        );
    }

    #[test]
    fn test_approve_full_dto_validation() {
        let dto = ApproveFullDto {
            roll_number: "101".to_string(),
            class_name: "9th".to_string(),
            section: String::new(),
            student_password: "short".to_string(),
            parent_password: "longenough".to_string(),
        };
        let errors = field_errors(&dto.validate().unwrap_err());
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["section", "studentPassword"]);
    }
}
