//! Student domain models and DTOs.
//!
//! A student carries a denormalized academic record (attendance, marks,
//! timetable, teachers, assignments, parent meetings, transport, fees) that
//! is stored with the student and recomputed in place when new entries are
//! recorded.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

use matricula_core::errors::FieldError;
use matricula_core::serde::{deserialize_optional_trimmed, deserialize_trimmed};

use crate::admissions::{Address, Gender};
use crate::ids::{ParentId, StudentId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    Active,
    Inactive,
    Graduated,
    Transferred,
}

impl StudentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Active => "active",
            StudentStatus::Inactive => "inactive",
            StudentStatus::Graduated => "graduated",
            StudentStatus::Transferred => "transferred",
        }
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(StudentStatus::Active),
            "inactive" => Ok(StudentStatus::Inactive),
            "graduated" => Ok(StudentStatus::Graduated),
            "transferred" => Ok(StudentStatus::Transferred),
            other => Err(format!("Unknown student status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    /// Institutional email, `<rollNumber>@<school domain>`
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcademicInfo {
    #[serde(rename = "class")]
    pub class_name: String,
    pub section: Option<String>,
    pub academic_year: String,
    pub admission_date: DateTime<Utc>,
    pub previous_school: Option<String>,
    pub medical_conditions: Option<String>,
}

/// Academic year label for a date, e.g. `2026-2027`.
pub fn academic_year_for(date: DateTime<Utc>) -> String {
    format!("{}-{}", date.year(), date.year() + 1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuardianInfo {
    pub father_name: String,
    pub mother_name: Option<String>,
    pub parent_email: String,
    pub parent_phone: Option<String>,
    /// Set once the parent account is linked; null marks an orphan.
    pub parent_id: Option<ParentId>,
}

// ============================================================================
// Attendance
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    HalfDay,
}

impl AttendanceStatus {
    /// Share of a school day credited as present.
    pub fn credit(&self) -> f64 {
        match self {
            AttendanceStatus::Present | AttendanceStatus::Late => 1.0,
            AttendanceStatus::HalfDay => 0.5,
            AttendanceStatus::Absent => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Attendance {
    pub total_days: u32,
    pub present_days: f64,
    pub percentage: f64,
    pub records: Vec<AttendanceRecord>,
}

impl Attendance {
    /// Adds a record, replacing any earlier record for the same date.
    pub fn record(&mut self, record: AttendanceRecord) {
        self.records.retain(|r| r.date != record.date);
        self.records.push(record);
        self.records.sort_by_key(|r| r.date);
        self.recompute();
    }

    fn recompute(&mut self) {
        self.total_days = self.records.len() as u32;
        self.present_days = self.records.iter().map(|r| r.status.credit()).sum();
        self.percentage = if self.total_days == 0 {
            0.0
        } else {
            round2(self.present_days / self.total_days as f64 * 100.0)
        };
    }
}

// ============================================================================
// Marks
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ExamType {
    UnitTest,
    MidTerm,
    Final,
    Assignment,
    Project,
}

/// Letter grade for a percentage score.
pub fn grade_for(percentage: f64) -> &'static str {
    match percentage {
        p if p >= 90.0 => "A+",
        p if p >= 80.0 => "A",
        p if p >= 70.0 => "B+",
        p if p >= 60.0 => "B",
        p if p >= 50.0 => "C",
        p if p >= 40.0 => "D",
        _ => "F",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExamRecord {
    pub exam_type: ExamType,
    pub marks: f64,
    pub total_marks: f64,
    pub grade: String,
    pub date: Option<NaiveDate>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectMarks {
    pub name: String,
    pub code: Option<String>,
    pub teacher: Option<String>,
    pub exams: Vec<ExamRecord>,
    pub obtained_marks: f64,
    pub total_marks: f64,
    pub percentage: f64,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Marks {
    pub subjects: Vec<SubjectMarks>,
    pub overall_percentage: f64,
    pub overall_grade: Option<String>,
    pub rank: Option<u32>,
}

impl Marks {
    /// Appends an exam to the named subject (created on first use, matched
    /// case-insensitively) and recomputes subject and overall totals.
    pub fn record_exam(
        &mut self,
        subject: &str,
        code: Option<String>,
        teacher: Option<String>,
        exam: ExamRecord,
    ) {
        let index = match self
            .subjects
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(subject))
        {
            Some(index) => index,
            None => {
                self.subjects.push(SubjectMarks {
                    name: subject.to_string(),
                    code: None,
                    teacher: None,
                    exams: Vec::new(),
                    obtained_marks: 0.0,
                    total_marks: 0.0,
                    percentage: 0.0,
                    grade: None,
                });
                self.subjects.len() - 1
            }
        };

        let entry = &mut self.subjects[index];
        if code.is_some() {
            entry.code = code;
        }
        if teacher.is_some() {
            entry.teacher = teacher;
        }
        entry.exams.push(exam);
        entry.obtained_marks = entry.exams.iter().map(|e| e.marks).sum();
        entry.total_marks = entry.exams.iter().map(|e| e.total_marks).sum();
        entry.percentage = percentage_of(entry.obtained_marks, entry.total_marks);
        entry.grade = Some(grade_for(entry.percentage).to_string());

        let obtained: f64 = self.subjects.iter().map(|s| s.obtained_marks).sum();
        let total: f64 = self.subjects.iter().map(|s| s.total_marks).sum();
        self.overall_percentage = percentage_of(obtained, total);
        self.overall_grade = Some(grade_for(self.overall_percentage).to_string());
    }
}

fn percentage_of(obtained: f64, total: f64) -> f64 {
    if total <= 0.0 {
        0.0
    } else {
        round2(obtained / total * 100.0)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// Schedule, staff and logistics
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub period: u8,
    pub subject: String,
    pub teacher: Option<String>,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimetableDay {
    /// Weekday name, e.g. `Monday`
    pub day: String,
    pub periods: Vec<Period>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherAssignment {
    pub name: String,
    pub subject: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub is_class_teacher: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub title: String,
    pub subject: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    /// `pending`, `submitted` or `graded`
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParentMeeting {
    pub date: NaiveDate,
    pub purpose: String,
    pub notes: Option<String>,
    #[serde(default)]
    pub attended: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transport {
    pub route: String,
    pub pickup_point: String,
    pub vehicle_number: Option<String>,
    pub driver_contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeePayment {
    pub date: NaiveDate,
    pub amount: f64,
    pub method: String,
    pub receipt_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct FeeLedger {
    pub total_fees: f64,
    pub paid_amount: f64,
    pub pending_amount: f64,
    pub payments: Vec<FeePayment>,
}

impl FeeLedger {
    /// Paid and pending amounts follow the payment history.
    pub fn recompute(&mut self) {
        self.paid_amount = round2(self.payments.iter().map(|p| p.amount).sum());
        self.pending_amount = round2((self.total_fees - self.paid_amount).max(0.0));
    }
}

// ============================================================================
// Student
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    /// `ADM<year><seq>`, fixed once assigned
    pub admission_number: String,
    pub roll_number: String,
    pub personal_info: PersonalInfo,
    pub academic_info: AcademicInfo,
    pub parent_info: GuardianInfo,
    pub status: StudentStatus,
    pub attendance: Attendance,
    pub marks: Marks,
    pub timetable: Vec<TimetableDay>,
    pub teachers: Vec<TeacherAssignment>,
    pub assignments: Vec<Assignment>,
    pub parent_meetings: Vec<ParentMeeting>,
    pub transport: Option<Transport>,
    pub fees: FeeLedger,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.personal_info.first_name, self.personal_info.last_name
        )
    }
}

/// Student row to insert. The academic record starts empty.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub admission_number: String,
    pub roll_number: String,
    pub personal_info: PersonalInfo,
    pub academic_info: AcademicInfo,
    pub parent_info: GuardianInfo,
    pub password_hash: String,
}

// ============================================================================
// DTOs
// ============================================================================

/// Direct enrollment by an admin, bypassing the application workflow.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentDto {
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(
        length(min = 1, message = "Roll number is required"),
        custom(function = "crate::value_types::valid_roll_number")
    )]
    pub roll_number: String,
    /// Generated when omitted
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub admission_number: Option<String>,
    #[serde(rename = "class", default, deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "Class is required"))]
    pub class_name: String,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub section: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub parent_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub mother_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(email(message = "Valid parent email is required"))]
    pub parent_email: String,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub parent_phone: Option<String>,
    #[serde(default)]
    #[validate(length(min = 6, message = "Student password must be at least 6 characters"))]
    pub student_password: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Parent password must be at least 6 characters"))]
    pub parent_password: String,
}

/// Staff edit of a student record. Roll and admission numbers are fixed.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentDto {
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    #[validate(length(min = 1, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub phone: Option<String>,
    pub address: Option<Address>,
    #[serde(rename = "class", default, deserialize_with = "deserialize_optional_trimmed")]
    pub class_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub section: Option<String>,
    pub status: Option<StudentStatus>,
    pub timetable: Option<Vec<TimetableDay>>,
    pub teachers: Option<Vec<TeacherAssignment>>,
    pub assignments: Option<Vec<Assignment>>,
    pub parent_meetings: Option<Vec<ParentMeeting>>,
    pub transport: Option<Transport>,
    #[validate(range(min = 0.0, message = "Total fees cannot be negative"))]
    pub total_fees: Option<f64>,
    pub fee_payments: Option<Vec<FeePayment>>,
}

impl UpdateStudentDto {
    /// Applies the provided fields to `student`.
    pub fn apply_to(self, student: &mut Student) {
        if let Some(first_name) = self.first_name {
            student.personal_info.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            student.personal_info.last_name = last_name;
        }
        if self.phone.is_some() {
            student.personal_info.phone = self.phone;
        }
        if self.address.is_some() {
            student.personal_info.address = self.address;
        }
        if let Some(class_name) = self.class_name {
            student.academic_info.class_name = class_name;
        }
        if self.section.is_some() {
            student.academic_info.section = self.section;
        }
        if let Some(status) = self.status {
            student.status = status;
        }
        if let Some(timetable) = self.timetable {
            student.timetable = timetable;
        }
        if let Some(teachers) = self.teachers {
            student.teachers = teachers;
        }
        if let Some(assignments) = self.assignments {
            student.assignments = assignments;
        }
        if let Some(meetings) = self.parent_meetings {
            student.parent_meetings = meetings;
        }
        if self.transport.is_some() {
            student.transport = self.transport;
        }
        if let Some(total) = self.total_fees {
            student.fees.total_fees = total;
        }
        if let Some(payments) = self.fee_payments {
            student.fees.payments = payments;
        }
        student.fees.recompute();
    }
}

/// Contact details a student may change on their own record.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileDto {
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub phone: Option<String>,
    pub address: Option<Address>,
}

impl UpdateProfileDto {
    pub fn apply_to(self, student: &mut Student) {
        if self.phone.is_some() {
            student.personal_info.phone = self.phone;
        }
        if self.address.is_some() {
            student.personal_info.address = self.address;
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordAttendanceDto {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordMarksDto {
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    #[validate(length(min = 1, message = "Subject is required"))]
    pub subject: String,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub subject_code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub teacher: Option<String>,
    pub exam_type: ExamType,
    #[validate(range(min = 0.0, message = "Marks cannot be negative"))]
    pub marks: f64,
    #[validate(range(exclusive_min = 0.0, message = "Total marks must be positive"))]
    pub total_marks: f64,
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub remarks: Option<String>,
}

impl RecordMarksDto {
    /// Cross-field check run after the derived validation.
    pub fn check_within_total(&self) -> Result<(), FieldError> {
        if self.marks > self.total_marks {
            return Err(FieldError::new("marks", "Marks cannot exceed total marks"));
        }
        Ok(())
    }

    pub fn exam_record(&self) -> ExamRecord {
        ExamRecord {
            exam_type: self.exam_type,
            marks: self.marks,
            total_marks: self.total_marks,
            grade: grade_for(percentage_of(self.marks, self.total_marks)).to_string(),
            date: self.date,
            remarks: self.remarks.clone(),
        }
    }
}
