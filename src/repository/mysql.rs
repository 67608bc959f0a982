use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{FromRow, MySqlPool};

use super::{
    AttendanceRepository, RepositoryError, RepositoryResult, StaffRepository, TimetableRepository,
    UniqueKey,
};
use crate::model::{
    attendance::{AttendanceRecord, Location},
    staff::{Staff, StaffRole},
    timetable::Timetable,
};

pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct StaffRow {
    id: String,
    full_name: String,
    email: String,
    role: String,
    registration_date: DateTime<Utc>,
    education_qualification: Option<String>,
    post: Option<String>,
    teaching_classes: Option<String>, // JSON array
}

impl TryFrom<StaffRow> for Staff {
    type Error = RepositoryError;

    fn try_from(row: StaffRow) -> Result<Self, Self::Error> {
        let role = StaffRole::from_str(&row.role)
            .map_err(|_| RepositoryError::Corrupt(format!("unknown role '{}'", row.role)))?;
        let teaching_classes = row
            .teaching_classes
            .as_deref()
            .map(serde_json::from_str::<Vec<String>>)
            .transpose()?;

        Ok(Staff {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            role,
            registration_date: row.registration_date,
            education_qualification: row.education_qualification,
            post: row.post,
            teaching_classes,
        })
    }
}

#[derive(FromRow)]
struct AttendanceRow {
    id: String,
    staff_id: String,
    staff_name: String,
    staff_role: String,
    date: NaiveDate,
    time: NaiveTime,
    latitude: Option<f64>,
    longitude: Option<f64>,
    selfie_url: String,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = RepositoryError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let staff_role = StaffRole::from_str(&row.staff_role)
            .map_err(|_| RepositoryError::Corrupt(format!("unknown role '{}'", row.staff_role)))?;
        let location = match (row.latitude, row.longitude) {
            (Some(latitude), Some(longitude)) => Some(Location { latitude, longitude }),
            _ => None,
        };

        Ok(AttendanceRecord {
            id: row.id,
            staff_id: row.staff_id,
            staff_name: row.staff_name,
            staff_role,
            date: row.date,
            time: row.time,
            location,
            selfie_url: row.selfie_url,
        })
    }
}

const STAFF_COLUMNS: &str = "id, full_name, email, role, registration_date, education_qualification, post, teaching_classes";
const ATTENDANCE_COLUMNS: &str = "id, staff_id, staff_name, staff_role, date, time, latitude, longitude, selfie_url";

fn query_error(e: sqlx::Error) -> RepositoryError {
    tracing::error!(error = %e, "MySQL query failed");
    RepositoryError::Query(e.to_string())
}

/// Maps MySQL integrity violations (SQLSTATE 23000) onto the unique key that was hit.
/// Violations of anything else, such as a foreign key, stay query errors.
fn insert_error(e: sqlx::Error, classify: fn(&str) -> Option<UniqueKey>) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some("23000") {
            if let Some(key) = classify(db_err.message()) {
                return RepositoryError::Duplicate(key);
            }
        }
    }
    query_error(e)
}

fn staff_key(message: &str) -> Option<UniqueKey> {
    if message.contains("uq_staff_email") {
        Some(UniqueKey::StaffEmail)
    } else if message.contains("PRIMARY") {
        Some(UniqueKey::StaffId)
    } else {
        None
    }
}

fn attendance_key(message: &str) -> Option<UniqueKey> {
    message
        .contains("uq_attendance_staff_day")
        .then_some(UniqueKey::AttendancePerDay)
}

#[async_trait]
impl StaffRepository for MySqlRepository {
    async fn insert_staff(&self, staff: &Staff) -> RepositoryResult<()> {
        let classes = staff
            .teaching_classes
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO staff
            (id, full_name, email, role, registration_date, education_qualification, post, teaching_classes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&staff.id)
        .bind(&staff.full_name)
        .bind(&staff.email)
        .bind(staff.role.as_ref())
        .bind(staff.registration_date)
        .bind(&staff.education_qualification)
        .bind(&staff.post)
        .bind(classes)
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, staff_key))?;

        Ok(())
    }

    async fn find_staff(&self, id: &str) -> RepositoryResult<Option<Staff>> {
        // the default collation compares case-insensitively
        let sql = format!("SELECT {STAFF_COLUMNS} FROM staff WHERE id = ?");
        sqlx::query_as::<_, StaffRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?
            .map(Staff::try_from)
            .transpose()
    }

    async fn email_exists(&self, email: &str) -> RepositoryResult<bool> {
        let found = sqlx::query_scalar::<_, i64>("SELECT EXISTS(SELECT 1 FROM staff WHERE email = ? LIMIT 1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(query_error)?;
        Ok(found != 0)
    }

    async fn list_staff(&self) -> RepositoryResult<Vec<Staff>> {
        let sql = format!("SELECT {STAFF_COLUMNS} FROM staff ORDER BY seq ASC");
        sqlx::query_as::<_, StaffRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?
            .into_iter()
            .map(Staff::try_from)
            .collect()
    }

    async fn list_emails(&self) -> RepositoryResult<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT email FROM staff")
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)
    }

    async fn count_staff(&self) -> RepositoryResult<u64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM staff")
            .fetch_one(&self.pool)
            .await
            .map_err(query_error)?;
        Ok(total.max(0) as u64)
    }
}

#[async_trait]
impl AttendanceRepository for MySqlRepository {
    async fn insert_attendance(&self, record: &AttendanceRecord) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO attendance
            (id, staff_id, staff_name, staff_role, date, time, latitude, longitude, selfie_url)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.staff_id)
        .bind(&record.staff_name)
        .bind(record.staff_role.as_ref())
        .bind(record.date)
        .bind(record.time)
        .bind(record.location.map(|l| l.latitude))
        .bind(record.location.map(|l| l.longitude))
        .bind(&record.selfie_url)
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, attendance_key))?;

        Ok(())
    }

    async fn find_attendance(
        &self,
        staff_id: &str,
        date: NaiveDate,
    ) -> RepositoryResult<Option<AttendanceRecord>> {
        let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE staff_id = ? AND date = ?");
        sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(staff_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?
            .map(AttendanceRecord::try_from)
            .transpose()
    }

    async fn list_attendance(&self) -> RepositoryResult<Vec<AttendanceRecord>> {
        let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance ORDER BY seq DESC");
        sqlx::query_as::<_, AttendanceRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?
            .into_iter()
            .map(AttendanceRecord::try_from)
            .collect()
    }

    async fn list_attendance_for_date(&self, date: NaiveDate) -> RepositoryResult<Vec<AttendanceRecord>> {
        let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE date = ? ORDER BY seq DESC");
        sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(date)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?
            .into_iter()
            .map(AttendanceRecord::try_from)
            .collect()
    }
}

#[async_trait]
impl TimetableRepository for MySqlRepository {
    async fn put_timetable(&self, date: NaiveDate, timetable: &Timetable) -> RepositoryResult<()> {
        let document = serde_json::to_string(timetable)?;

        sqlx::query(
            r#"
            INSERT INTO timetables (date, document)
            VALUES (?, ?)
            ON DUPLICATE KEY UPDATE document = VALUES(document), published_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(date)
        .bind(document)
        .execute(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn get_timetable(&self, date: NaiveDate) -> RepositoryResult<Option<Timetable>> {
        let document = sqlx::query_scalar::<_, String>("SELECT document FROM timetables WHERE date = ?")
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;

        Ok(document.as_deref().map(serde_json::from_str).transpose()?)
    }
}
