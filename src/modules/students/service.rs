use chrono::Utc;
use tracing::{info, instrument};

use matricula_core::FieldError;
use matricula_db::Store;
use matricula_models::{Email, StudentId};

use super::model::{
    AttendanceRecord, CreateStudentDto, RecordAttendanceDto, RecordMarksDto, Student,
    UpdateProfileDto, UpdateStudentDto,
};
use crate::error::{ServiceError, ServiceResult};
use crate::modules::enrollment::model::{Enrollment, EnrollmentRequest};
use crate::modules::enrollment::service::{EnrollmentService, with_number_retry};
use crate::state::AppState;

pub struct StudentService;

impl StudentService {
    #[instrument(skip(store))]
    pub async fn list_students(store: &dyn Store) -> ServiceResult<Vec<Student>> {
        Ok(store.list_students().await?)
    }

    /// Students left without a parent link.
    #[instrument(skip(store))]
    pub async fn list_orphans(store: &dyn Store) -> ServiceResult<Vec<Student>> {
        Ok(store.list_orphan_students().await?)
    }

    #[instrument(skip(store))]
    pub async fn get_student(store: &dyn Store, id: StudentId) -> ServiceResult<Student> {
        store
            .get_student(id)
            .await?
            .ok_or(ServiceError::NotFound("Student"))
    }

    /// Enrolls a student directly, without an admission application.
    #[instrument(skip(state, dto), fields(roll_number = %dto.roll_number))]
    pub async fn quick_add(state: &AppState, dto: CreateStudentDto) -> ServiceResult<Enrollment> {
        let parent_email = Email::new(&dto.parent_email)
            .map_err(|_| {
                ServiceError::Validation(vec![FieldError::new(
                    "parentEmail",
                    "Valid parent email is required",
                )])
            })?
            .into_inner();

        let student_password_hash = state.hasher.hash(&dto.student_password)?;
        let parent_password_hash = state.hasher.hash(&dto.parent_password)?;
        let request = EnrollmentRequest::from_quick_add(
            dto,
            parent_email,
            student_password_hash,
            parent_password_hash,
        );
        let request = &request;

        let enrollment = with_number_retry(|| async move {
            let mut tx = state.store.begin().await?;
            let enrollment =
                EnrollmentService::provision(tx.as_mut(), &state.school_config, request, Utc::now())
                    .await?;
            tx.commit().await?;
            Ok(enrollment)
        })
        .await?;

        info!(student_id = %enrollment.student.id, "Student added directly");
        Ok(enrollment)
    }

    #[instrument(skip(store, dto))]
    pub async fn update_student(
        store: &dyn Store,
        id: StudentId,
        dto: UpdateStudentDto,
    ) -> ServiceResult<Student> {
        Self::edit(store, id, |student| dto.apply_to(student)).await
    }

    /// Self-service edit of the student's own contact details.
    #[instrument(skip(store, dto))]
    pub async fn update_profile(
        store: &dyn Store,
        id: StudentId,
        dto: UpdateProfileDto,
    ) -> ServiceResult<Student> {
        let student = Self::edit(store, id, |student| dto.apply_to(student)).await?;
        info!(student_id = %id, "Student updated own profile");
        Ok(student)
    }

    /// Removes the student and its entry on the parent's child list.
    #[instrument(skip(store))]
    pub async fn delete_student(store: &dyn Store, id: StudentId) -> ServiceResult<()> {
        let mut tx = store.begin().await?;

        let student = tx
            .lock_student(id)
            .await?
            .ok_or(ServiceError::NotFound("Student"))?;

        if let Some(parent_id) = student.parent_info.parent_id {
            tx.remove_child(parent_id, id).await?;
        }
        if !tx.delete_student(id).await? {
            return Err(ServiceError::NotFound("Student"));
        }
        tx.commit().await?;

        info!(student_id = %id, roll_number = %student.roll_number, "Student deleted");
        Ok(())
    }

    #[instrument(skip(store, dto))]
    pub async fn record_attendance(
        store: &dyn Store,
        id: StudentId,
        dto: RecordAttendanceDto,
    ) -> ServiceResult<Student> {
        let record = AttendanceRecord {
            date: dto.date,
            status: dto.status,
            remarks: dto.remarks,
        };
        Self::edit(store, id, |student| student.attendance.record(record)).await
    }

    #[instrument(skip(store, dto))]
    pub async fn record_marks(
        store: &dyn Store,
        id: StudentId,
        dto: RecordMarksDto,
    ) -> ServiceResult<Student> {
        dto.check_within_total()
            .map_err(|err| ServiceError::Validation(vec![err]))?;

        let exam = dto.exam_record();
        Self::edit(store, id, |student| {
            student
                .marks
                .record_exam(&dto.subject, dto.subject_code, dto.teacher, exam)
        })
        .await
    }

    /// Applies `change` to the student while holding its row, so concurrent
    /// edits cannot overwrite each other.
    async fn edit<F>(store: &dyn Store, id: StudentId, change: F) -> ServiceResult<Student>
    where
        F: FnOnce(&mut Student) + Send,
    {
        let mut tx = store.begin().await?;
        let mut student = tx
            .lock_student(id)
            .await?
            .ok_or(ServiceError::NotFound("Student"))?;
        change(&mut student);
        let student = tx.update_student(&student).await?;
        tx.commit().await?;
        Ok(student)
    }
}
