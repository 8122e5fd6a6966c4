//! PostgreSQL adapter.
//!
//! Query helpers take a bare `PgConnection` so the pooled [`PgStore`] and the
//! transactional [`PgTx`] share them.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, Transaction};

use matricula_models::auth::Role;
use matricula_models::students::{
    Assignment, ParentMeeting, TeacherAssignment, TimetableDay, Transport,
};
use matricula_models::{
    AcademicInfo, Address, AdmissionApplication, ApplicationId, ApplicationStatus, Attendance,
    ChildLink, FeeLedger, Gender, GuardianInfo, Marks, NewApplication, NewParent, NewStaff,
    NewStudent, Parent, ParentId, ParentInfo, PersonalInfo, ReviewUpdate, SchoolStatistics,
    StaffAccount, StaffId, Student, StudentId, StudentInfo,
};

use crate::error::{StoreError, StoreResult};
use crate::ports::{Store, StoreTx};

// ============================================================================
// Rows
// ============================================================================

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: ApplicationId,
    application_number: String,
    student_first_name: String,
    student_last_name: String,
    date_of_birth: NaiveDate,
    gender: String,
    class_name: String,
    previous_school: Option<String>,
    medical_conditions: Option<String>,
    father_name: String,
    mother_name: String,
    parent_email: String,
    parent_phone: String,
    occupation: Option<String>,
    street: String,
    city: String,
    state: String,
    zip_code: String,
    country: String,
    status: String,
    submission_date: DateTime<Utc>,
    reviewed_by: Option<StaffId>,
    review_date: Option<DateTime<Utc>>,
    remarks: Option<String>,
    assigned_roll_number: Option<String>,
    assigned_class: Option<String>,
    assigned_section: Option<String>,
    admission_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for AdmissionApplication {
    type Error = StoreError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        Ok(AdmissionApplication {
            id: row.id,
            application_number: row.application_number,
            student_info: StudentInfo {
                first_name: row.student_first_name,
                last_name: row.student_last_name,
                date_of_birth: row.date_of_birth,
                gender: row.gender.parse::<Gender>().map_err(StoreError::Corrupt)?,
                class_name: row.class_name,
                previous_school: row.previous_school,
                medical_conditions: row.medical_conditions,
            },
            parent_info: ParentInfo {
                father_name: row.father_name,
                mother_name: row.mother_name,
                email: row.parent_email,
                phone: row.parent_phone,
                occupation: row.occupation,
                address: Address {
                    street: row.street,
                    city: row.city,
                    state: row.state,
                    zip_code: row.zip_code,
                    country: row.country,
                },
            },
            status: row
                .status
                .parse::<ApplicationStatus>()
                .map_err(StoreError::Corrupt)?,
            submission_date: row.submission_date,
            reviewed_by: row.reviewed_by,
            review_date: row.review_date,
            remarks: row.remarks,
            assigned_roll_number: row.assigned_roll_number,
            assigned_class: row.assigned_class,
            assigned_section: row.assigned_section,
            admission_date: row.admission_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct StudentRow {
    id: StudentId,
    admission_number: String,
    roll_number: String,
    first_name: String,
    last_name: String,
    date_of_birth: Option<NaiveDate>,
    gender: Option<String>,
    email: String,
    phone: Option<String>,
    address: Option<Json<Address>>,
    class_name: String,
    section: Option<String>,
    academic_year: String,
    admission_date: DateTime<Utc>,
    previous_school: Option<String>,
    medical_conditions: Option<String>,
    father_name: String,
    mother_name: Option<String>,
    parent_email: String,
    parent_phone: Option<String>,
    parent_id: Option<ParentId>,
    status: String,
    attendance: Json<Attendance>,
    marks: Json<Marks>,
    timetable: Json<Vec<TimetableDay>>,
    teachers: Json<Vec<TeacherAssignment>>,
    assignments: Json<Vec<Assignment>>,
    parent_meetings: Json<Vec<ParentMeeting>>,
    transport: Option<Json<Transport>>,
    fees: Json<FeeLedger>,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StudentRow> for Student {
    type Error = StoreError;

    fn try_from(row: StudentRow) -> Result<Self, Self::Error> {
        let gender = row
            .gender
            .map(|g| g.parse::<Gender>())
            .transpose()
            .map_err(StoreError::Corrupt)?;

        Ok(Student {
            id: row.id,
            admission_number: row.admission_number,
            roll_number: row.roll_number,
            personal_info: PersonalInfo {
                first_name: row.first_name,
                last_name: row.last_name,
                date_of_birth: row.date_of_birth,
                gender,
                email: row.email,
                phone: row.phone,
                address: row.address.map(|a| a.0),
            },
            academic_info: AcademicInfo {
                class_name: row.class_name,
                section: row.section,
                academic_year: row.academic_year,
                admission_date: row.admission_date,
                previous_school: row.previous_school,
                medical_conditions: row.medical_conditions,
            },
            parent_info: GuardianInfo {
                father_name: row.father_name,
                mother_name: row.mother_name,
                parent_email: row.parent_email,
                parent_phone: row.parent_phone,
                parent_id: row.parent_id,
            },
            status: row.status.parse().map_err(StoreError::Corrupt)?,
            attendance: row.attendance.0,
            marks: row.marks.0,
            timetable: row.timetable.0,
            teachers: row.teachers.0,
            assignments: row.assignments.0,
            parent_meetings: row.parent_meetings.0,
            transport: row.transport.map(|t| t.0),
            fees: row.fees.0,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ParentRow {
    id: ParentId,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    relationship: String,
    occupation: Option<String>,
    address: Option<Json<Address>>,
    is_active: bool,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ChildRow {
    student_id: StudentId,
    roll_number: String,
    admission_number: String,
    student_name: String,
    class_name: String,
}

#[derive(Debug, FromRow)]
struct StaffRow {
    id: StaffId,
    first_name: String,
    last_name: String,
    email: String,
    role: String,
    is_active: bool,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StaffRow> for StaffAccount {
    type Error = StoreError;

    fn try_from(row: StaffRow) -> Result<Self, Self::Error> {
        Ok(StaffAccount {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            role: row.role.parse::<Role>().map_err(StoreError::Corrupt)?,
            is_active: row.is_active,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct StatisticsRow {
    active_students: i64,
    students: i64,
    teachers: i64,
    staff: i64,
    parents: i64,
    open_applications: i64,
}

impl From<StatisticsRow> for SchoolStatistics {
    fn from(row: StatisticsRow) -> Self {
        let count = |n: i64| n.max(0) as u64;
        SchoolStatistics {
            total_students: count(row.active_students),
            total_teachers: count(row.teachers),
            total_parents: count(row.parents),
            total_users: count(row.staff + row.students + row.parents),
            open_applications: count(row.open_applications),
        }
    }
}

// ============================================================================
// Query helpers
// ============================================================================

async fn fetch_application(
    conn: &mut PgConnection,
    id: ApplicationId,
    for_update: bool,
) -> StoreResult<Option<AdmissionApplication>> {
    let sql = if for_update {
        "SELECT * FROM admission_applications WHERE id = $1 FOR UPDATE"
    } else {
        "SELECT * FROM admission_applications WHERE id = $1"
    };
    sqlx::query_as::<_, ApplicationRow>(sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .map(AdmissionApplication::try_from)
        .transpose()
}

/// Writes review fields, optionally only while the status is `expected`.
async fn write_review(
    conn: &mut PgConnection,
    id: ApplicationId,
    expected: Option<ApplicationStatus>,
    update: &ReviewUpdate,
) -> StoreResult<Option<AdmissionApplication>> {
    sqlx::query_as::<_, ApplicationRow>(
        r#"
        UPDATE admission_applications
        SET status = $3,
            reviewed_by = COALESCE($4, reviewed_by),
            review_date = $5,
            remarks = COALESCE($6, remarks),
            assigned_roll_number = COALESCE($7, assigned_roll_number),
            assigned_class = COALESCE($8, assigned_class),
            assigned_section = COALESCE($9, assigned_section),
            admission_date = COALESCE($10, admission_date),
            updated_at = $5
        WHERE id = $1 AND ($2::TEXT IS NULL OR status = $2::TEXT)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(expected.map(|s| s.as_str()))
    .bind(update.status.as_str())
    .bind(update.reviewed_by)
    .bind(update.review_date)
    .bind(&update.remarks)
    .bind(&update.assigned_roll_number)
    .bind(&update.assigned_class)
    .bind(&update.assigned_section)
    .bind(update.admission_date)
    .fetch_optional(&mut *conn)
    .await?
    .map(AdmissionApplication::try_from)
    .transpose()
}

async fn fetch_student_by(
    conn: &mut PgConnection,
    column: StudentKey,
    value: &str,
) -> StoreResult<Option<Student>> {
    let sql = match column {
        StudentKey::RollNumber => "SELECT * FROM students WHERE roll_number = $1",
        StudentKey::Email => "SELECT * FROM students WHERE email = $1",
    };
    sqlx::query_as::<_, StudentRow>(sql)
        .bind(value)
        .fetch_optional(&mut *conn)
        .await?
        .map(Student::try_from)
        .transpose()
}

#[derive(Clone, Copy)]
enum StudentKey {
    RollNumber,
    Email,
}

async fn fetch_student(
    conn: &mut PgConnection,
    id: StudentId,
    for_update: bool,
) -> StoreResult<Option<Student>> {
    let sql = if for_update {
        "SELECT * FROM students WHERE id = $1 FOR UPDATE"
    } else {
        "SELECT * FROM students WHERE id = $1"
    };
    sqlx::query_as::<_, StudentRow>(sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .map(Student::try_from)
        .transpose()
}

/// Overwrites the editable columns. Roll number, admission number, email and
/// parent link are left alone.
async fn write_student(conn: &mut PgConnection, student: &Student) -> StoreResult<Student> {
    let personal = &student.personal_info;
    let academic = &student.academic_info;
    let guardian = &student.parent_info;
    let row = sqlx::query_as::<_, StudentRow>(
        r#"
        UPDATE students
        SET first_name = $2, last_name = $3, date_of_birth = $4, gender = $5,
            phone = $6, address = $7,
            class_name = $8, section = $9, academic_year = $10,
            previous_school = $11, medical_conditions = $12,
            father_name = $13, mother_name = $14, parent_email = $15, parent_phone = $16,
            status = $17,
            attendance = $18, marks = $19, timetable = $20, teachers = $21,
            assignments = $22, parent_meetings = $23, transport = $24, fees = $25,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(student.id)
    .bind(&personal.first_name)
    .bind(&personal.last_name)
    .bind(personal.date_of_birth)
    .bind(personal.gender.map(|g| g.as_str()))
    .bind(&personal.phone)
    .bind(personal.address.as_ref().map(Json))
    .bind(&academic.class_name)
    .bind(&academic.section)
    .bind(&academic.academic_year)
    .bind(&academic.previous_school)
    .bind(&academic.medical_conditions)
    .bind(&guardian.father_name)
    .bind(&guardian.mother_name)
    .bind(&guardian.parent_email)
    .bind(&guardian.parent_phone)
    .bind(student.status.as_str())
    .bind(Json(&student.attendance))
    .bind(Json(&student.marks))
    .bind(Json(&student.timetable))
    .bind(Json(&student.teachers))
    .bind(Json(&student.assignments))
    .bind(Json(&student.parent_meetings))
    .bind(student.transport.as_ref().map(Json))
    .bind(Json(&student.fees))
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(StoreError::NotFound { entity: "Student" })?;

    Student::try_from(row)
}

async fn with_children(conn: &mut PgConnection, row: ParentRow) -> StoreResult<Parent> {
    let children = sqlx::query_as::<_, ChildRow>(
        r#"
        SELECT student_id, roll_number, admission_number, student_name, class_name
        FROM parent_children
        WHERE parent_id = $1
        ORDER BY linked_at
        "#,
    )
    .bind(row.id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Parent {
        id: row.id,
        first_name: row.first_name,
        last_name: row.last_name,
        email: row.email,
        phone: row.phone,
        relationship: row.relationship,
        occupation: row.occupation,
        address: row.address.map(|a| a.0),
        children: children
            .into_iter()
            .map(|c| ChildLink {
                student_id: c.student_id,
                roll_number: c.roll_number,
                admission_number: c.admission_number,
                student_name: c.student_name,
                class_name: c.class_name,
            })
            .collect(),
        is_active: row.is_active,
        password_hash: row.password_hash,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

async fn fetch_parent(conn: &mut PgConnection, id: ParentId) -> StoreResult<Option<Parent>> {
    let row = sqlx::query_as::<_, ParentRow>("SELECT * FROM parents WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    match row {
        Some(row) => Ok(Some(with_children(conn, row).await?)),
        None => Ok(None),
    }
}

async fn fetch_parent_by_email(
    conn: &mut PgConnection,
    email: &str,
) -> StoreResult<Option<Parent>> {
    let row = sqlx::query_as::<_, ParentRow>("SELECT * FROM parents WHERE email = $1")
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?;
    match row {
        Some(row) => Ok(Some(with_children(conn, row).await?)),
        None => Ok(None),
    }
}

// ============================================================================
// Pooled store
// ============================================================================

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn max_application_sequence(&self, year: i32) -> StoreResult<Option<u32>> {
        let prefix = matricula_models::numbering::year_prefix(year);
        let max: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT MAX(CAST(SUBSTRING(application_number FROM length($1) + 1) AS INTEGER))
            FROM admission_applications
            WHERE application_number ~ ('^' || $1 || '[0-9]+$')
            "#,
        )
        .bind(&prefix)
        .fetch_one(&self.pool)
        .await?;
        Ok(max.map(|v| v as u32))
    }

    async fn insert_application(
        &self,
        number: &str,
        application: &NewApplication,
        submitted_at: DateTime<Utc>,
    ) -> StoreResult<AdmissionApplication> {
        let student = &application.student_info;
        let parent = &application.parent_info;
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            INSERT INTO admission_applications (
                id, application_number,
                student_first_name, student_last_name, date_of_birth, gender, class_name,
                previous_school, medical_conditions,
                father_name, mother_name, parent_email, parent_phone, occupation,
                street, city, state, zip_code, country,
                status, submission_date, created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, 'pending', $20, $20, $20
            )
            RETURNING *
            "#,
        )
        .bind(ApplicationId::new())
        .bind(number)
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(student.date_of_birth)
        .bind(student.gender.as_str())
        .bind(&student.class_name)
        .bind(&student.previous_school)
        .bind(&student.medical_conditions)
        .bind(&parent.father_name)
        .bind(&parent.mother_name)
        .bind(&parent.email)
        .bind(&parent.phone)
        .bind(&parent.occupation)
        .bind(&parent.address.street)
        .bind(&parent.address.city)
        .bind(&parent.address.state)
        .bind(&parent.address.zip_code)
        .bind(&parent.address.country)
        .bind(submitted_at)
        .fetch_one(&self.pool)
        .await?;

        AdmissionApplication::try_from(row)
    }

    async fn list_applications(&self) -> StoreResult<Vec<AdmissionApplication>> {
        sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM admission_applications ORDER BY submission_date DESC, application_number DESC",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(AdmissionApplication::try_from)
        .collect()
    }

    async fn get_application(
        &self,
        id: ApplicationId,
    ) -> StoreResult<Option<AdmissionApplication>> {
        let mut conn = self.pool.acquire().await?;
        fetch_application(&mut conn, id, false).await
    }

    async fn update_review(
        &self,
        id: ApplicationId,
        expected: ApplicationStatus,
        update: &ReviewUpdate,
    ) -> StoreResult<Option<AdmissionApplication>> {
        let mut conn = self.pool.acquire().await?;
        write_review(&mut conn, id, Some(expected), update).await
    }

    async fn list_students(&self) -> StoreResult<Vec<Student>> {
        sqlx::query_as::<_, StudentRow>("SELECT * FROM students ORDER BY roll_number")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Student::try_from)
            .collect()
    }

    async fn get_student(&self, id: StudentId) -> StoreResult<Option<Student>> {
        let mut conn = self.pool.acquire().await?;
        fetch_student(&mut conn, id, false).await
    }

    async fn find_student_by_roll_number(
        &self,
        roll_number: &str,
    ) -> StoreResult<Option<Student>> {
        let mut conn = self.pool.acquire().await?;
        fetch_student_by(&mut conn, StudentKey::RollNumber, roll_number).await
    }

    async fn find_student_by_email(&self, email: &str) -> StoreResult<Option<Student>> {
        let mut conn = self.pool.acquire().await?;
        fetch_student_by(&mut conn, StudentKey::Email, email).await
    }

    async fn list_orphan_students(&self) -> StoreResult<Vec<Student>> {
        sqlx::query_as::<_, StudentRow>(
            "SELECT * FROM students WHERE parent_id IS NULL ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Student::try_from)
        .collect()
    }

    async fn get_parent(&self, id: ParentId) -> StoreResult<Option<Parent>> {
        let mut conn = self.pool.acquire().await?;
        fetch_parent(&mut conn, id).await
    }

    async fn find_parent_by_email(&self, email: &str) -> StoreResult<Option<Parent>> {
        let mut conn = self.pool.acquire().await?;
        fetch_parent_by_email(&mut conn, email).await
    }

    async fn find_parent_by_child_roll_number(
        &self,
        roll_number: &str,
    ) -> StoreResult<Option<Parent>> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, ParentRow>(
            r#"
            SELECT p.*
            FROM parents p
            JOIN parent_children pc ON pc.parent_id = p.id
            JOIN students s ON s.id = pc.student_id
            WHERE s.roll_number = $1
            LIMIT 1
            "#,
        )
        .bind(roll_number)
        .fetch_optional(&mut *conn)
        .await?;
        match row {
            Some(row) => Ok(Some(with_children(&mut conn, row).await?)),
            None => Ok(None),
        }
    }

    async fn find_staff_by_email(&self, email: &str) -> StoreResult<Option<StaffAccount>> {
        sqlx::query_as::<_, StaffRow>("SELECT * FROM staff WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(StaffAccount::try_from)
            .transpose()
    }

    async fn get_staff(&self, id: StaffId) -> StoreResult<Option<StaffAccount>> {
        sqlx::query_as::<_, StaffRow>("SELECT * FROM staff WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(StaffAccount::try_from)
            .transpose()
    }

    async fn insert_staff(&self, staff: &NewStaff) -> StoreResult<StaffAccount> {
        let row = sqlx::query_as::<_, StaffRow>(
            r#"
            INSERT INTO staff (id, first_name, last_name, email, role, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(StaffId::new())
        .bind(&staff.first_name)
        .bind(&staff.last_name)
        .bind(&staff.email)
        .bind(staff.role.as_str())
        .bind(&staff.password_hash)
        .fetch_one(&self.pool)
        .await?;

        StaffAccount::try_from(row)
    }

    async fn statistics(&self) -> StoreResult<SchoolStatistics> {
        let row = sqlx::query_as::<_, StatisticsRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM students WHERE status = 'active') AS active_students,
                (SELECT COUNT(*) FROM students) AS students,
                (SELECT COUNT(*) FROM staff WHERE role = 'teacher') AS teachers,
                (SELECT COUNT(*) FROM staff) AS staff,
                (SELECT COUNT(*) FROM parents) AS parents,
                (SELECT COUNT(*) FROM admission_applications
                    WHERE status IN ('pending', 'under_review')) AS open_applications
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}

// ============================================================================
// Transaction
// ============================================================================

pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn lock_application(
        &mut self,
        id: ApplicationId,
    ) -> StoreResult<Option<AdmissionApplication>> {
        fetch_application(&mut self.tx, id, true).await
    }

    async fn record_approval(
        &mut self,
        id: ApplicationId,
        update: &ReviewUpdate,
    ) -> StoreResult<AdmissionApplication> {
        write_review(&mut self.tx, id, None, update)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "Application",
            })
    }

    async fn lock_student(&mut self, id: StudentId) -> StoreResult<Option<Student>> {
        fetch_student(&mut self.tx, id, true).await
    }

    async fn update_student(&mut self, student: &Student) -> StoreResult<Student> {
        write_student(&mut self.tx, student).await
    }

    async fn find_student_by_roll_number(
        &mut self,
        roll_number: &str,
    ) -> StoreResult<Option<Student>> {
        fetch_student_by(&mut self.tx, StudentKey::RollNumber, roll_number).await
    }

    async fn admission_number_exists(&mut self, number: &str) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM students WHERE admission_number = $1)",
        )
        .bind(number)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(exists)
    }

    async fn max_admission_sequence(&mut self, year: i32) -> StoreResult<Option<u32>> {
        let prefix = matricula_models::numbering::year_prefix(year);
        let max: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT MAX(CAST(SUBSTRING(admission_number FROM length($1) + 1) AS INTEGER))
            FROM students
            WHERE admission_number ~ ('^' || $1 || '[0-9]+$')
            "#,
        )
        .bind(&prefix)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(max.map(|v| v as u32))
    }

    async fn insert_student(&mut self, student: &NewStudent) -> StoreResult<Student> {
        let personal = &student.personal_info;
        let academic = &student.academic_info;
        let guardian = &student.parent_info;
        let row = sqlx::query_as::<_, StudentRow>(
            r#"
            INSERT INTO students (
                id, admission_number, roll_number,
                first_name, last_name, date_of_birth, gender, email, phone, address,
                class_name, section, academic_year, admission_date,
                previous_school, medical_conditions,
                father_name, mother_name, parent_email, parent_phone, parent_id,
                password_hash
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22
            )
            RETURNING *
            "#,
        )
        .bind(StudentId::new())
        .bind(&student.admission_number)
        .bind(&student.roll_number)
        .bind(&personal.first_name)
        .bind(&personal.last_name)
        .bind(personal.date_of_birth)
        .bind(personal.gender.map(|g| g.as_str()))
        .bind(&personal.email)
        .bind(&personal.phone)
        .bind(personal.address.as_ref().map(Json))
        .bind(&academic.class_name)
        .bind(&academic.section)
        .bind(&academic.academic_year)
        .bind(academic.admission_date)
        .bind(&academic.previous_school)
        .bind(&academic.medical_conditions)
        .bind(&guardian.father_name)
        .bind(&guardian.mother_name)
        .bind(&guardian.parent_email)
        .bind(&guardian.parent_phone)
        .bind(guardian.parent_id)
        .bind(&student.password_hash)
        .fetch_one(&mut *self.tx)
        .await?;

        Student::try_from(row)
    }

    async fn link_parent(
        &mut self,
        student_id: StudentId,
        parent_id: ParentId,
    ) -> StoreResult<Student> {
        sqlx::query_as::<_, StudentRow>(
            "UPDATE students SET parent_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(student_id)
        .bind(parent_id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(StoreError::NotFound { entity: "Student" })
        .and_then(Student::try_from)
    }

    async fn delete_student(&mut self, id: StudentId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_parent_by_email(&mut self, email: &str) -> StoreResult<Option<Parent>> {
        fetch_parent_by_email(&mut self.tx, email).await
    }

    async fn insert_parent(&mut self, parent: &NewParent) -> StoreResult<Parent> {
        let row = sqlx::query_as::<_, ParentRow>(
            r#"
            INSERT INTO parents (
                id, first_name, last_name, email, phone, relationship, occupation, address,
                password_hash
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(ParentId::new())
        .bind(&parent.first_name)
        .bind(&parent.last_name)
        .bind(&parent.email)
        .bind(&parent.phone)
        .bind(&parent.relationship)
        .bind(&parent.occupation)
        .bind(parent.address.as_ref().map(Json))
        .bind(&parent.password_hash)
        .fetch_one(&mut *self.tx)
        .await?;

        with_children(&mut self.tx, row).await
    }

    async fn add_child(&mut self, parent_id: ParentId, child: &ChildLink) -> StoreResult<Parent> {
        sqlx::query(
            r#"
            INSERT INTO parent_children
                (parent_id, student_id, roll_number, admission_number, student_name, class_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (parent_id, student_id) DO NOTHING
            "#,
        )
        .bind(parent_id)
        .bind(child.student_id)
        .bind(&child.roll_number)
        .bind(&child.admission_number)
        .bind(&child.student_name)
        .bind(&child.class_name)
        .execute(&mut *self.tx)
        .await?;

        sqlx::query("UPDATE parents SET updated_at = NOW() WHERE id = $1")
            .bind(parent_id)
            .execute(&mut *self.tx)
            .await?;

        fetch_parent(&mut self.tx, parent_id)
            .await?
            .ok_or(StoreError::NotFound { entity: "Parent" })
    }

    async fn remove_child(
        &mut self,
        parent_id: ParentId,
        student_id: StudentId,
    ) -> StoreResult<()> {
        sqlx::query("DELETE FROM parent_children WHERE parent_id = $1 AND student_id = $2")
            .bind(parent_id)
            .bind(student_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
