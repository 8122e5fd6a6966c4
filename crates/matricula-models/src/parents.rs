//! Parent accounts and their embedded child links.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::admissions::Address;
use crate::ids::{ParentId, StudentId};
use crate::students::{Attendance, Marks, Student};

/// Denormalized summary of a child, kept on the parent record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChildLink {
    pub student_id: StudentId,
    pub roll_number: String,
    pub admission_number: String,
    pub student_name: String,
    #[serde(rename = "class")]
    pub class_name: String,
}

impl ChildLink {
    pub fn for_student(student: &Student) -> Self {
        Self {
            student_id: student.id,
            roll_number: student.roll_number.clone(),
            admission_number: student.admission_number.clone(),
            student_name: student.full_name(),
            class_name: student.academic_info.class_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Parent {
    pub id: ParentId,
    pub first_name: String,
    pub last_name: String,
    /// Natural key, trimmed and lower-cased
    pub email: String,
    pub phone: Option<String>,
    pub relationship: String,
    pub occupation: Option<String>,
    pub address: Option<Address>,
    pub children: Vec<ChildLink>,
    pub is_active: bool,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Parent {
    pub fn full_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }

    pub fn has_child(&self, student_id: StudentId) -> bool {
        self.children.iter().any(|c| c.student_id == student_id)
    }
}

/// A child's attendance as shown to their parent.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChildAttendance {
    pub student_id: StudentId,
    pub student_name: String,
    pub attendance: Attendance,
}

impl From<Student> for ChildAttendance {
    fn from(student: Student) -> Self {
        Self {
            student_id: student.id,
            student_name: student.full_name(),
            attendance: student.attendance,
        }
    }
}

/// A child's marks as shown to their parent.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChildGrades {
    pub student_id: StudentId,
    pub student_name: String,
    pub marks: Marks,
}

impl From<Student> for ChildGrades {
    fn from(student: Student) -> Self {
        Self {
            student_id: student.id,
            student_name: student.full_name(),
            marks: student.marks,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewParent {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub relationship: String,
    pub occupation: Option<String>,
    pub address: Option<Address>,
    pub password_hash: String,
}

impl NewParent {
    /// Splits a father's full name into first name and the remainder.
    /// A single-word name is kept whole as the first name.
    pub fn from_father_name(father_name: &str, email: String, password_hash: String) -> Self {
        let trimmed = father_name.trim();
        let (first_name, last_name) = match trimmed.split_once(char::is_whitespace) {
            Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
            None => (trimmed.to_string(), String::new()),
        };

        Self {
            first_name,
            last_name,
            email,
            phone: None,
            relationship: "father".to_string(),
            occupation: None,
            address: None,
            password_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_father_name_split() {
        let parent = NewParent::from_father_name(
            "Suresh Kumar Sharma",
            "suresh@example.com".to_string(),
            "hash".to_string(),
        );
        assert_eq!(parent.first_name, "Suresh");
        assert_eq!(parent.last_name, "Kumar Sharma");
        assert_eq!(parent.relationship, "father");
    }

    #[test]
    fn test_single_word_father_name() {
        let parent =
            NewParent::from_father_name("Ramesh", "r@example.com".to_string(), String::new());
        assert_eq!(parent.first_name, "Ramesh");
        assert_eq!(parent.last_name, "");
    }
}
