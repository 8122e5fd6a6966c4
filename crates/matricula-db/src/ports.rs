//! Storage ports.
//!
//! [`Store`] covers single-statement reads and writes. Multi-record writes
//! (provisioning, student deletion) and read-modify-write edits of a student
//! go through a [`StoreTx`] obtained from [`Store::begin`]; dropping a
//! transaction without committing rolls it back.
//!
//! Callers must not issue [`Store`] calls while holding an open [`StoreTx`]:
//! the in-memory adapter serializes transactions against all other access.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use matricula_models::{
    AdmissionApplication, ApplicationId, ApplicationStatus, ChildLink, NewApplication, NewParent,
    NewStaff, NewStudent, Parent, ParentId, ReviewUpdate, SchoolStatistics, StaffAccount, StaffId,
    Student, StudentId,
};

use crate::error::StoreResult;

#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>>;

    // Applications

    /// Highest sequence issued for `year`, if any.
    async fn max_application_sequence(&self, year: i32) -> StoreResult<Option<u32>>;

    /// Fails with `Duplicate { field: "applicationNumber" }` when `number` is taken.
    async fn insert_application(
        &self,
        number: &str,
        application: &NewApplication,
        submitted_at: DateTime<Utc>,
    ) -> StoreResult<AdmissionApplication>;

    /// Newest submission first.
    async fn list_applications(&self) -> StoreResult<Vec<AdmissionApplication>>;

    async fn get_application(&self, id: ApplicationId)
    -> StoreResult<Option<AdmissionApplication>>;

    /// Applies `update` only while the application is still in `expected`.
    /// Returns `None` when the application is missing or has moved on.
    async fn update_review(
        &self,
        id: ApplicationId,
        expected: ApplicationStatus,
        update: &ReviewUpdate,
    ) -> StoreResult<Option<AdmissionApplication>>;

    // Students

    async fn list_students(&self) -> StoreResult<Vec<Student>>;
    async fn get_student(&self, id: StudentId) -> StoreResult<Option<Student>>;
    async fn find_student_by_roll_number(&self, roll_number: &str)
    -> StoreResult<Option<Student>>;
    async fn find_student_by_email(&self, email: &str) -> StoreResult<Option<Student>>;

    /// Students without a linked parent, oldest first.
    async fn list_orphan_students(&self) -> StoreResult<Vec<Student>>;

    // Parents

    async fn get_parent(&self, id: ParentId) -> StoreResult<Option<Parent>>;
    async fn find_parent_by_email(&self, email: &str) -> StoreResult<Option<Parent>>;
    async fn find_parent_by_child_roll_number(
        &self,
        roll_number: &str,
    ) -> StoreResult<Option<Parent>>;

    // Staff

    async fn find_staff_by_email(&self, email: &str) -> StoreResult<Option<StaffAccount>>;
    async fn get_staff(&self, id: StaffId) -> StoreResult<Option<StaffAccount>>;
    async fn insert_staff(&self, staff: &NewStaff) -> StoreResult<StaffAccount>;

    async fn statistics(&self) -> StoreResult<SchoolStatistics>;
}

#[async_trait]
pub trait StoreTx: Send {
    /// Reads the application and holds it against concurrent review until
    /// commit or rollback.
    async fn lock_application(
        &mut self,
        id: ApplicationId,
    ) -> StoreResult<Option<AdmissionApplication>>;

    async fn record_approval(
        &mut self,
        id: ApplicationId,
        update: &ReviewUpdate,
    ) -> StoreResult<AdmissionApplication>;

    /// Reads the student and holds it against concurrent edits until commit
    /// or rollback.
    async fn lock_student(&mut self, id: StudentId) -> StoreResult<Option<Student>>;

    /// Persists editable fields. Roll and admission numbers are never written.
    async fn update_student(&mut self, student: &Student) -> StoreResult<Student>;

    async fn find_student_by_roll_number(
        &mut self,
        roll_number: &str,
    ) -> StoreResult<Option<Student>>;
    async fn admission_number_exists(&mut self, number: &str) -> StoreResult<bool>;
    async fn max_admission_sequence(&mut self, year: i32) -> StoreResult<Option<u32>>;
    async fn insert_student(&mut self, student: &NewStudent) -> StoreResult<Student>;
    async fn link_parent(
        &mut self,
        student_id: StudentId,
        parent_id: ParentId,
    ) -> StoreResult<Student>;
    async fn delete_student(&mut self, id: StudentId) -> StoreResult<bool>;

    async fn find_parent_by_email(&mut self, email: &str) -> StoreResult<Option<Parent>>;
    async fn insert_parent(&mut self, parent: &NewParent) -> StoreResult<Parent>;

    /// Appends `child` unless the parent already lists that student.
    async fn add_child(&mut self, parent_id: ParentId, child: &ChildLink) -> StoreResult<Parent>;
    async fn remove_child(&mut self, parent_id: ParentId, student_id: StudentId)
    -> StoreResult<()>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
