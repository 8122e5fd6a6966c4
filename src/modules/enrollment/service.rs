use std::future::Future;

use chrono::{DateTime, Datelike, Utc};
use tracing::{info, instrument, warn};

use matricula_config::SchoolConfig;
use matricula_db::{StoreError, StoreTx};
use matricula_models::numbering::{MAX_NUMBER_ATTEMPTS, next_number};
use matricula_models::students::academic_year_for;
use matricula_models::{
    AcademicInfo, ChildLink, GuardianInfo, NewParent, NewStudent, PersonalInfo,
};

use super::model::{Enrollment, EnrollmentRequest};
use crate::error::{ServiceError, ServiceResult};

pub struct EnrollmentService;

impl EnrollmentService {
    /// Creates the student and links it to a new or existing parent.
    ///
    /// Runs entirely inside `tx`; the caller commits. A roll number that is
    /// already taken fails before anything is written.
    #[instrument(skip(tx, school, request), fields(roll_number = %request.roll_number))]
    pub async fn provision(
        tx: &mut dyn StoreTx,
        school: &SchoolConfig,
        request: &EnrollmentRequest,
        now: DateTime<Utc>,
    ) -> ServiceResult<Enrollment> {
        if tx
            .find_student_by_roll_number(&request.roll_number)
            .await?
            .is_some()
        {
            return Err(ServiceError::DuplicateRollNumber(request.roll_number.clone()));
        }

        let admission_number = match &request.admission_number {
            Some(number) => {
                if tx.admission_number_exists(number).await? {
                    return Err(ServiceError::Duplicate {
                        field: "admissionNumber",
                    });
                }
                number.clone()
            }
            None => {
                let year = now.year();
                next_number(year, tx.max_admission_sequence(year).await?)
            }
        };

        let guardian = &request.guardian;
        let new_student = NewStudent {
            admission_number,
            roll_number: request.roll_number.clone(),
            personal_info: PersonalInfo {
                first_name: request.first_name.clone(),
                last_name: request.last_name.clone(),
                date_of_birth: request.date_of_birth,
                gender: request.gender,
                email: school.student_email(&request.roll_number),
                phone: None,
                address: request.address.clone(),
            },
            academic_info: AcademicInfo {
                class_name: request.class_name.clone(),
                section: request.section.clone(),
                academic_year: academic_year_for(now),
                admission_date: now,
                previous_school: request.previous_school.clone(),
                medical_conditions: request.medical_conditions.clone(),
            },
            parent_info: GuardianInfo {
                father_name: guardian.father_name.clone(),
                mother_name: guardian.mother_name.clone(),
                parent_email: guardian.email.clone(),
                parent_phone: guardian.phone.clone(),
                parent_id: None,
            },
            password_hash: request.student_password_hash.clone(),
        };

        let student = tx
            .insert_student(&new_student)
            .await
            .map_err(|err| roll_number_conflict(err, &request.roll_number))?;

        let parent = match tx.find_parent_by_email(&guardian.email).await? {
            Some(parent) => parent,
            None => {
                let mut new_parent = NewParent::from_father_name(
                    &guardian.father_name,
                    guardian.email.clone(),
                    request.parent_password_hash.clone(),
                );
                new_parent.phone = guardian.phone.clone();
                new_parent.occupation = guardian.occupation.clone();
                new_parent.address = guardian.address.clone();
                tx.insert_parent(&new_parent).await?
            }
        };

        let parent = tx
            .add_child(parent.id, &ChildLink::for_student(&student))
            .await?;
        let student = tx.link_parent(student.id, parent.id).await?;

        info!(
            student_id = %student.id,
            parent_id = %parent.id,
            admission_number = %student.admission_number,
            children = parent.children.len(),
            "Student provisioned"
        );

        Ok(Enrollment { student, parent })
    }
}

/// The student email is derived from the roll number, so a clash on either
/// means the roll number is taken.
fn roll_number_conflict(err: StoreError, roll_number: &str) -> ServiceError {
    if err.is_duplicate_of("rollNumber") || err.is_duplicate_of("email") {
        ServiceError::DuplicateRollNumber(roll_number.to_string())
    } else {
        ServiceError::Store(err)
    }
}

fn is_number_collision(err: &ServiceError) -> bool {
    matches!(
        err,
        ServiceError::Store(store_err)
            if store_err.is_duplicate_of("admissionNumber") || store_err.is_duplicate_of("parentEmail")
    )
}

/// Re-runs a whole provisioning transaction when a concurrent one claimed
/// the same admission number or created the same parent first.
pub async fn with_number_retry<T, F, Fut>(mut run: F) -> ServiceResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ServiceResult<T>>,
{
    let mut attempt = 1;

    loop {
        match run().await {
            Err(err) if is_number_collision(&err) && attempt < MAX_NUMBER_ATTEMPTS => {
                warn!(attempt, error = %err, "Provisioning collided, retrying");
                attempt += 1;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use matricula_db::{MemoryStore, Store};

    use crate::modules::enrollment::model::GuardianDraft;

    fn request(roll_number: &str, parent_email: &str) -> EnrollmentRequest {
        EnrollmentRequest {
            roll_number: roll_number.to_string(),
            admission_number: None,
            first_name: "Aarav".to_string(),
            last_name: "Gupta".to_string(),
            date_of_birth: None,
            gender: None,
            address: None,
            class_name: "5th".to_string(),
            section: Some("A".to_string()),
            previous_school: None,
            medical_conditions: None,
            guardian: GuardianDraft {
                father_name: "Rohit Gupta".to_string(),
                mother_name: None,
                email: parent_email.to_string(),
                phone: None,
                occupation: None,
                address: None,
            },
            student_password_hash: "student-hash".to_string(),
            parent_password_hash: "parent-hash".to_string(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 10, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_provision_creates_linked_pair() {
        let store = MemoryStore::new();
        let school = SchoolConfig::default();

        let mut tx = store.begin().await.unwrap();
        let enrollment =
            EnrollmentService::provision(tx.as_mut(), &school, &request("501", "rohit@example.com"), now())
                .await
                .unwrap();
        tx.commit().await.unwrap();

        let student = &enrollment.student;
        assert_eq!(student.admission_number, "ADM20260001");
        assert_eq!(student.personal_info.email, "501@nalandaschool.edu");
        assert_eq!(student.academic_info.academic_year, "2026-2027");
        assert_eq!(student.parent_info.parent_id, Some(enrollment.parent.id));
        assert!(enrollment.parent.has_child(student.id));
        assert_eq!(enrollment.parent.first_name, "Rohit");
    }

    #[tokio::test]
    async fn test_second_child_joins_existing_parent() {
        let store = MemoryStore::new();
        let school = SchoolConfig::default();

        let mut tx = store.begin().await.unwrap();
        let first =
            EnrollmentService::provision(tx.as_mut(), &school, &request("501", "rohit@example.com"), now())
                .await
                .unwrap();
        let second =
            EnrollmentService::provision(tx.as_mut(), &school, &request("502", "rohit@example.com"), now())
                .await
                .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(first.parent.id, second.parent.id);
        assert_eq!(second.parent.children.len(), 2);
        assert_eq!(second.student.admission_number, "ADM20260002");
    }

    #[tokio::test]
    async fn test_taken_roll_number_writes_nothing() {
        let store = MemoryStore::new();
        let school = SchoolConfig::default();

        let mut tx = store.begin().await.unwrap();
        EnrollmentService::provision(tx.as_mut(), &school, &request("501", "a@example.com"), now())
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let err =
            EnrollmentService::provision(tx.as_mut(), &school, &request("501", "b@example.com"), now())
                .await
                .unwrap_err();
        drop(tx);

        assert!(matches!(err, ServiceError::DuplicateRollNumber(ref roll) if roll == "501"));
        assert!(store.find_parent_by_email("b@example.com").await.unwrap().is_none());
        assert_eq!(store.list_students().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_explicit_admission_number_must_be_unique() {
        let store = MemoryStore::new();
        let school = SchoolConfig::default();

        let mut first = request("501", "a@example.com");
        first.admission_number = Some("NS-100".to_string());
        let mut second = request("502", "b@example.com");
        second.admission_number = Some("NS-100".to_string());

        let mut tx = store.begin().await.unwrap();
        EnrollmentService::provision(tx.as_mut(), &school, &first, now())
            .await
            .unwrap();
        let err = EnrollmentService::provision(tx.as_mut(), &school, &second, now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Duplicate {
                field: "admissionNumber"
            }
        ));
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_bound() {
        let mut calls = 0;
        let result: ServiceResult<()> = with_number_retry(|| {
            calls += 1;
            async {
                Err(ServiceError::Store(StoreError::Duplicate {
                    field: "admissionNumber",
                }))
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, MAX_NUMBER_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_retry_does_not_repeat_roll_conflicts() {
        let mut calls = 0;
        let result: ServiceResult<()> = with_number_retry(|| {
            calls += 1;
            async { Err(ServiceError::DuplicateRollNumber("501".to_string())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
