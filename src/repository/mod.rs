//! Persistence interfaces.
//!
//! Business logic talks to these traits only; `MySqlRepository` backs production and
//! `MemoryRepository` backs tests and local development. Uniqueness (staff id, staff email,
//! one attendance record per staff per day) is enforced inside each implementation so callers
//! never rely on a check-then-insert sequence.

pub mod error;
pub mod memory;
pub mod mysql;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

pub use error::{RepositoryError, RepositoryResult, UniqueKey};
pub use memory::MemoryRepository;
pub use mysql::MySqlRepository;

use crate::model::{attendance::AttendanceRecord, staff::Staff, timetable::Timetable};

#[async_trait]
pub trait StaffRepository: Send + Sync {
    /// Fails with `Duplicate(StaffId | StaffEmail)` when either key is taken.
    async fn insert_staff(&self, staff: &Staff) -> RepositoryResult<()>;

    /// Case-insensitive lookup by staff id.
    async fn find_staff(&self, id: &str) -> RepositoryResult<Option<Staff>>;

    async fn email_exists(&self, email: &str) -> RepositoryResult<bool>;

    /// All staff in registration order.
    async fn list_staff(&self) -> RepositoryResult<Vec<Staff>>;

    async fn list_emails(&self) -> RepositoryResult<Vec<String>>;

    async fn count_staff(&self) -> RepositoryResult<u64>;
}

#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Insert-if-absent on `(staff_id, date)`; fails with `Duplicate(AttendancePerDay)`.
    async fn insert_attendance(&self, record: &AttendanceRecord) -> RepositoryResult<()>;

    async fn find_attendance(
        &self,
        staff_id: &str,
        date: NaiveDate,
    ) -> RepositoryResult<Option<AttendanceRecord>>;

    /// Most recent first.
    async fn list_attendance(&self) -> RepositoryResult<Vec<AttendanceRecord>>;

    /// Most recent first.
    async fn list_attendance_for_date(&self, date: NaiveDate) -> RepositoryResult<Vec<AttendanceRecord>>;
}

#[async_trait]
pub trait TimetableRepository: Send + Sync {
    /// Replaces whatever was stored for `date`.
    async fn put_timetable(&self, date: NaiveDate, timetable: &Timetable) -> RepositoryResult<()>;

    async fn get_timetable(&self, date: NaiveDate) -> RepositoryResult<Option<Timetable>>;
}

/// Shared handles registered as app data.
#[derive(Clone)]
pub struct Repositories {
    pub staff: Arc<dyn StaffRepository>,
    pub attendance: Arc<dyn AttendanceRepository>,
    pub timetables: Arc<dyn TimetableRepository>,
}

impl Repositories {
    pub fn memory() -> Self {
        let repo = Arc::new(MemoryRepository::new());
        Self {
            staff: repo.clone(),
            attendance: repo.clone(),
            timetables: repo,
        }
    }

    pub fn mysql(pool: sqlx::MySqlPool) -> Self {
        let repo = Arc::new(MySqlRepository::new(pool));
        Self {
            staff: repo.clone(),
            attendance: repo.clone(),
            timetables: repo,
        }
    }
}
