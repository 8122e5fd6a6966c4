use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write. `field` is the wire name of
    /// the offending value, e.g. `rollNumber`.
    #[error("Duplicate value for {field}")]
    Duplicate { field: &'static str },

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("Stored record is invalid: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    pub fn is_duplicate_of(&self, name: &str) -> bool {
        matches!(self, StoreError::Duplicate { field } if *field == name)
    }
}

/// Maps unique constraint names to the field they protect.
fn field_for_constraint(constraint: &str) -> Option<&'static str> {
    match constraint {
        "admission_applications_number_key" => Some("applicationNumber"),
        "students_roll_number_key" => Some("rollNumber"),
        "students_admission_number_key" => Some("admissionNumber"),
        "students_email_key" => Some("email"),
        "parents_email_key" => Some("parentEmail"),
        "staff_email_key" => Some("email"),
        _ => None,
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                if let Some(field) = db_err.constraint().and_then(field_for_constraint) {
                    return StoreError::Duplicate { field };
                }
            }
        }
        StoreError::Database(err)
    }
}
