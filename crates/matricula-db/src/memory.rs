//! In-memory store with the same uniqueness and transaction semantics as the
//! Postgres adapter. Used by tests and the `test-utils` feature.
//!
//! A transaction takes the table lock for its whole lifetime and works on a
//! copy; commit writes the copy back, drop discards it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use matricula_models::numbering::parse_sequence;
use matricula_models::{
    AdmissionApplication, ApplicationId, ApplicationStatus, Attendance, ChildLink, FeeLedger,
    Marks, NewApplication, NewParent, NewStaff, NewStudent, Parent, ParentId, ReviewUpdate,
    SchoolStatistics, StaffAccount, StaffId, Student, StudentId, StudentStatus,
};
use matricula_models::auth::Role;

use crate::error::{StoreError, StoreResult};
use crate::ports::{Store, StoreTx};

#[derive(Debug, Clone, Default)]
struct Tables {
    applications: Vec<AdmissionApplication>,
    students: Vec<Student>,
    parents: Vec<Parent>,
    staff: Vec<StaffAccount>,
}

impl Tables {
    fn application_mut(&mut self, id: ApplicationId) -> StoreResult<&mut AdmissionApplication> {
        self.applications
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::NotFound {
                entity: "Application",
            })
    }

    fn student(&self, id: StudentId) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    fn student_mut(&mut self, id: StudentId) -> StoreResult<&mut Student> {
        self.students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound { entity: "Student" })
    }

    fn student_by_roll_number(&self, roll_number: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.roll_number == roll_number)
    }

    fn parent(&self, id: ParentId) -> Option<&Parent> {
        self.parents.iter().find(|p| p.id == id)
    }

    fn parent_mut(&mut self, id: ParentId) -> StoreResult<&mut Parent> {
        self.parents
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound { entity: "Parent" })
    }

    fn parent_by_email(&self, email: &str) -> Option<&Parent> {
        self.parents.iter().find(|p| p.email == email)
    }

    fn max_admission_sequence(&self, year: i32) -> Option<u32> {
        self.students
            .iter()
            .filter_map(|s| parse_sequence(&s.admission_number, year))
            .max()
    }

    /// Overwrites the editable fields of a stored student.
    fn update_student(&mut self, student: &Student) -> StoreResult<Student> {
        let existing = self.student_mut(student.id)?;

        let mut next = student.clone();
        next.admission_number = existing.admission_number.clone();
        next.roll_number = existing.roll_number.clone();
        next.personal_info.email = existing.personal_info.email.clone();
        next.parent_info.parent_id = existing.parent_info.parent_id;
        next.password_hash = existing.password_hash.clone();
        next.created_at = existing.created_at;
        next.updated_at = Utc::now();
        *existing = next;
        Ok(existing.clone())
    }

    fn insert_student(&mut self, new: &NewStudent) -> StoreResult<Student> {
        if self.student_by_roll_number(&new.roll_number).is_some() {
            return Err(StoreError::Duplicate {
                field: "rollNumber",
            });
        }
        if self
            .students
            .iter()
            .any(|s| s.admission_number == new.admission_number)
        {
            return Err(StoreError::Duplicate {
                field: "admissionNumber",
            });
        }
        if self
            .students
            .iter()
            .any(|s| s.personal_info.email == new.personal_info.email)
        {
            return Err(StoreError::Duplicate { field: "email" });
        }

        let now = Utc::now();
        let student = Student {
            id: StudentId::new(),
            admission_number: new.admission_number.clone(),
            roll_number: new.roll_number.clone(),
            personal_info: new.personal_info.clone(),
            academic_info: new.academic_info.clone(),
            parent_info: new.parent_info.clone(),
            status: StudentStatus::Active,
            attendance: Attendance::default(),
            marks: Marks::default(),
            timetable: Vec::new(),
            teachers: Vec::new(),
            assignments: Vec::new(),
            parent_meetings: Vec::new(),
            transport: None,
            fees: FeeLedger::default(),
            password_hash: new.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        self.students.push(student.clone());
        Ok(student)
    }

    fn insert_parent(&mut self, new: &NewParent) -> StoreResult<Parent> {
        if self.parent_by_email(&new.email).is_some() {
            return Err(StoreError::Duplicate {
                field: "parentEmail",
            });
        }

        let now = Utc::now();
        let parent = Parent {
            id: ParentId::new(),
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            email: new.email.clone(),
            phone: new.phone.clone(),
            relationship: new.relationship.clone(),
            occupation: new.occupation.clone(),
            address: new.address.clone(),
            children: Vec::new(),
            is_active: true,
            password_hash: new.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        self.parents.push(parent.clone());
        Ok(parent)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }

    async fn max_application_sequence(&self, year: i32) -> StoreResult<Option<u32>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .applications
            .iter()
            .filter_map(|a| parse_sequence(&a.application_number, year))
            .max())
    }

    async fn insert_application(
        &self,
        number: &str,
        application: &NewApplication,
        submitted_at: DateTime<Utc>,
    ) -> StoreResult<AdmissionApplication> {
        let mut tables = self.tables.lock().await;
        if tables
            .applications
            .iter()
            .any(|a| a.application_number == number)
        {
            return Err(StoreError::Duplicate {
                field: "applicationNumber",
            });
        }

        let record = AdmissionApplication {
            id: ApplicationId::new(),
            application_number: number.to_string(),
            student_info: application.student_info.clone(),
            parent_info: application.parent_info.clone(),
            status: ApplicationStatus::Pending,
            submission_date: submitted_at,
            reviewed_by: None,
            review_date: None,
            remarks: None,
            assigned_roll_number: None,
            assigned_class: None,
            assigned_section: None,
            admission_date: None,
            created_at: submitted_at,
            updated_at: submitted_at,
        };
        tables.applications.push(record.clone());
        Ok(record)
    }

    async fn list_applications(&self) -> StoreResult<Vec<AdmissionApplication>> {
        let tables = self.tables.lock().await;
        let mut applications = tables.applications.clone();
        // Later inserts first among equal timestamps.
        applications.reverse();
        applications.sort_by(|a, b| b.submission_date.cmp(&a.submission_date));
        Ok(applications)
    }

    async fn get_application(
        &self,
        id: ApplicationId,
    ) -> StoreResult<Option<AdmissionApplication>> {
        let tables = self.tables.lock().await;
        Ok(tables.applications.iter().find(|a| a.id == id).cloned())
    }

    async fn update_review(
        &self,
        id: ApplicationId,
        expected: ApplicationStatus,
        update: &ReviewUpdate,
    ) -> StoreResult<Option<AdmissionApplication>> {
        let mut tables = self.tables.lock().await;
        match tables.applications.iter_mut().find(|a| a.id == id) {
            Some(application) if application.status == expected => {
                update.apply_to(application);
                Ok(Some(application.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list_students(&self) -> StoreResult<Vec<Student>> {
        let tables = self.tables.lock().await;
        let mut students = tables.students.clone();
        students.sort_by(|a, b| a.roll_number.cmp(&b.roll_number));
        Ok(students)
    }

    async fn get_student(&self, id: StudentId) -> StoreResult<Option<Student>> {
        Ok(self.tables.lock().await.student(id).cloned())
    }

    async fn find_student_by_roll_number(
        &self,
        roll_number: &str,
    ) -> StoreResult<Option<Student>> {
        Ok(self
            .tables
            .lock()
            .await
            .student_by_roll_number(roll_number)
            .cloned())
    }

    async fn find_student_by_email(&self, email: &str) -> StoreResult<Option<Student>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .students
            .iter()
            .find(|s| s.personal_info.email == email)
            .cloned())
    }

    async fn list_orphan_students(&self) -> StoreResult<Vec<Student>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .students
            .iter()
            .filter(|s| s.parent_info.parent_id.is_none())
            .cloned()
            .collect())
    }

    async fn get_parent(&self, id: ParentId) -> StoreResult<Option<Parent>> {
        Ok(self.tables.lock().await.parent(id).cloned())
    }

    async fn find_parent_by_email(&self, email: &str) -> StoreResult<Option<Parent>> {
        Ok(self.tables.lock().await.parent_by_email(email).cloned())
    }

    async fn find_parent_by_child_roll_number(
        &self,
        roll_number: &str,
    ) -> StoreResult<Option<Parent>> {
        let tables = self.tables.lock().await;
        let Some(student) = tables.student_by_roll_number(roll_number) else {
            return Ok(None);
        };
        Ok(tables
            .parents
            .iter()
            .find(|p| p.has_child(student.id))
            .cloned())
    }

    async fn find_staff_by_email(&self, email: &str) -> StoreResult<Option<StaffAccount>> {
        let tables = self.tables.lock().await;
        Ok(tables.staff.iter().find(|s| s.email == email).cloned())
    }

    async fn get_staff(&self, id: StaffId) -> StoreResult<Option<StaffAccount>> {
        let tables = self.tables.lock().await;
        Ok(tables.staff.iter().find(|s| s.id == id).cloned())
    }

    async fn insert_staff(&self, staff: &NewStaff) -> StoreResult<StaffAccount> {
        let mut tables = self.tables.lock().await;
        if tables.staff.iter().any(|s| s.email == staff.email) {
            return Err(StoreError::Duplicate { field: "email" });
        }

        let now = Utc::now();
        let account = StaffAccount {
            id: StaffId::new(),
            first_name: staff.first_name.clone(),
            last_name: staff.last_name.clone(),
            email: staff.email.clone(),
            role: staff.role,
            is_active: true,
            password_hash: staff.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.staff.push(account.clone());
        Ok(account)
    }

    async fn statistics(&self) -> StoreResult<SchoolStatistics> {
        let tables = self.tables.lock().await;
        let count = |n: usize| n as u64;
        Ok(SchoolStatistics {
            total_students: count(
                tables
                    .students
                    .iter()
                    .filter(|s| s.status == StudentStatus::Active)
                    .count(),
            ),
            total_teachers: count(
                tables
                    .staff
                    .iter()
                    .filter(|s| s.role == Role::Teacher)
                    .count(),
            ),
            total_parents: count(tables.parents.len()),
            total_users: count(tables.staff.len() + tables.students.len() + tables.parents.len()),
            open_applications: count(
                tables
                    .applications
                    .iter()
                    .filter(|a| {
                        matches!(
                            a.status,
                            ApplicationStatus::Pending | ApplicationStatus::UnderReview
                        )
                    })
                    .count(),
            ),
        })
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn lock_application(
        &mut self,
        id: ApplicationId,
    ) -> StoreResult<Option<AdmissionApplication>> {
        Ok(self
            .working
            .applications
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn record_approval(
        &mut self,
        id: ApplicationId,
        update: &ReviewUpdate,
    ) -> StoreResult<AdmissionApplication> {
        let application = self.working.application_mut(id)?;
        update.apply_to(application);
        Ok(application.clone())
    }

    async fn lock_student(&mut self, id: StudentId) -> StoreResult<Option<Student>> {
        Ok(self.working.student(id).cloned())
    }

    async fn update_student(&mut self, student: &Student) -> StoreResult<Student> {
        self.working.update_student(student)
    }

    async fn find_student_by_roll_number(
        &mut self,
        roll_number: &str,
    ) -> StoreResult<Option<Student>> {
        Ok(self.working.student_by_roll_number(roll_number).cloned())
    }

    async fn admission_number_exists(&mut self, number: &str) -> StoreResult<bool> {
        Ok(self
            .working
            .students
            .iter()
            .any(|s| s.admission_number == number))
    }

    async fn max_admission_sequence(&mut self, year: i32) -> StoreResult<Option<u32>> {
        Ok(self.working.max_admission_sequence(year))
    }

    async fn insert_student(&mut self, student: &NewStudent) -> StoreResult<Student> {
        self.working.insert_student(student)
    }

    async fn link_parent(
        &mut self,
        student_id: StudentId,
        parent_id: ParentId,
    ) -> StoreResult<Student> {
        if self.working.parent(parent_id).is_none() {
            return Err(StoreError::NotFound { entity: "Parent" });
        }
        let student = self.working.student_mut(student_id)?;
        student.parent_info.parent_id = Some(parent_id);
        student.updated_at = Utc::now();
        Ok(student.clone())
    }

    async fn delete_student(&mut self, id: StudentId) -> StoreResult<bool> {
        let before = self.working.students.len();
        self.working.students.retain(|s| s.id != id);
        if self.working.students.len() == before {
            return Ok(false);
        }
        for parent in &mut self.working.parents {
            parent.children.retain(|c| c.student_id != id);
        }
        Ok(true)
    }

    async fn find_parent_by_email(&mut self, email: &str) -> StoreResult<Option<Parent>> {
        Ok(self.working.parent_by_email(email).cloned())
    }

    async fn insert_parent(&mut self, parent: &NewParent) -> StoreResult<Parent> {
        self.working.insert_parent(parent)
    }

    async fn add_child(&mut self, parent_id: ParentId, child: &ChildLink) -> StoreResult<Parent> {
        let parent = self.working.parent_mut(parent_id)?;
        if !parent.has_child(child.student_id) {
            parent.children.push(child.clone());
            parent.updated_at = Utc::now();
        }
        Ok(parent.clone())
    }

    async fn remove_child(
        &mut self,
        parent_id: ParentId,
        student_id: StudentId,
    ) -> StoreResult<()> {
        let parent = self.working.parent_mut(parent_id)?;
        parent.children.retain(|c| c.student_id != student_id);
        parent.updated_at = Utc::now();
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
