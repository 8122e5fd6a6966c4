use uuid::Uuid;

use matricula_models::{Parent, StaffAccount, Student, StudentStatus};

pub use matricula_models::auth::{IdentityProfile, LoginRequest, LoginResponse, Role};

/// An account able to sign in, whichever collection it lives in.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub role: Role,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub roll_number: Option<String>,
    pub children: Vec<String>,
}

impl Identity {
    pub fn profile(&self) -> IdentityProfile {
        IdentityProfile {
            id: self.id,
            role: self.role,
            name: self.name.clone(),
            email: self.email.clone(),
            roll_number: self.roll_number.clone(),
            children: self.children.clone(),
        }
    }
}

impl From<StaffAccount> for Identity {
    fn from(staff: StaffAccount) -> Self {
        Self {
            id: staff.id.into_inner(),
            role: staff.role,
            name: format!("{} {}", staff.first_name, staff.last_name),
            email: staff.email,
            password_hash: staff.password_hash,
            is_active: staff.is_active,
            roll_number: None,
            children: Vec::new(),
        }
    }
}

impl From<Student> for Identity {
    fn from(student: Student) -> Self {
        Self {
            id: student.id.into_inner(),
            role: Role::Student,
            name: student.full_name(),
            is_active: student.status == StudentStatus::Active,
            email: student.personal_info.email,
            password_hash: student.password_hash,
            roll_number: Some(student.roll_number),
            children: Vec::new(),
        }
    }
}

impl From<Parent> for Identity {
    fn from(parent: Parent) -> Self {
        Self {
            id: parent.id.into_inner(),
            role: Role::Parent,
            name: parent.full_name(),
            is_active: parent.is_active,
            children: parent
                .children
                .into_iter()
                .map(|child| child.roll_number)
                .collect(),
            email: parent.email,
            password_hash: parent.password_hash,
            roll_number: None,
        }
    }
}
