//! In-memory repository for tests and local development.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{
    AttendanceRepository, RepositoryError, RepositoryResult, StaffRepository, TimetableRepository,
    UniqueKey,
};
use crate::model::{attendance::AttendanceRecord, staff::Staff, timetable::Timetable};

#[derive(Default)]
struct MemoryData {
    staff: Vec<Staff>,
    // most recent first
    attendance: Vec<AttendanceRecord>,
    timetables: HashMap<NaiveDate, Timetable>,
}

/// Every operation runs under a single lock, so the uniqueness checks and the inserts
/// they guard are atomic.
#[derive(Default)]
pub struct MemoryRepository {
    data: RwLock<MemoryData>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, MemoryData>> {
        self.data
            .read()
            .map_err(|_| RepositoryError::Internal("memory store poisoned".into()))
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, MemoryData>> {
        self.data
            .write()
            .map_err(|_| RepositoryError::Internal("memory store poisoned".into()))
    }
}

#[async_trait]
impl StaffRepository for MemoryRepository {
    async fn insert_staff(&self, staff: &Staff) -> RepositoryResult<()> {
        let mut data = self.write()?;
        if data.staff.iter().any(|s| s.id.eq_ignore_ascii_case(&staff.id)) {
            return Err(RepositoryError::Duplicate(UniqueKey::StaffId));
        }
        if data.staff.iter().any(|s| s.email.eq_ignore_ascii_case(&staff.email)) {
            return Err(RepositoryError::Duplicate(UniqueKey::StaffEmail));
        }
        data.staff.push(staff.clone());
        Ok(())
    }

    async fn find_staff(&self, id: &str) -> RepositoryResult<Option<Staff>> {
        Ok(self
            .read()?
            .staff
            .iter()
            .find(|s| s.id.eq_ignore_ascii_case(id))
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> RepositoryResult<bool> {
        Ok(self.read()?.staff.iter().any(|s| s.email.eq_ignore_ascii_case(email)))
    }

    async fn list_staff(&self) -> RepositoryResult<Vec<Staff>> {
        Ok(self.read()?.staff.clone())
    }

    async fn list_emails(&self) -> RepositoryResult<Vec<String>> {
        Ok(self.read()?.staff.iter().map(|s| s.email.clone()).collect())
    }

    async fn count_staff(&self) -> RepositoryResult<u64> {
        Ok(self.read()?.staff.len() as u64)
    }
}

#[async_trait]
impl AttendanceRepository for MemoryRepository {
    async fn insert_attendance(&self, record: &AttendanceRecord) -> RepositoryResult<()> {
        let mut data = self.write()?;
        if data
            .attendance
            .iter()
            .any(|r| r.staff_id == record.staff_id && r.date == record.date)
        {
            return Err(RepositoryError::Duplicate(UniqueKey::AttendancePerDay));
        }
        data.attendance.insert(0, record.clone());
        Ok(())
    }

    async fn find_attendance(
        &self,
        staff_id: &str,
        date: NaiveDate,
    ) -> RepositoryResult<Option<AttendanceRecord>> {
        Ok(self
            .read()?
            .attendance
            .iter()
            .find(|r| r.staff_id == staff_id && r.date == date)
            .cloned())
    }

    async fn list_attendance(&self) -> RepositoryResult<Vec<AttendanceRecord>> {
        Ok(self.read()?.attendance.clone())
    }

    async fn list_attendance_for_date(&self, date: NaiveDate) -> RepositoryResult<Vec<AttendanceRecord>> {
        Ok(self
            .read()?
            .attendance
            .iter()
            .filter(|r| r.date == date)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TimetableRepository for MemoryRepository {
    async fn put_timetable(&self, date: NaiveDate, timetable: &Timetable) -> RepositoryResult<()> {
        self.write()?.timetables.insert(date, timetable.clone());
        Ok(())
    }

    async fn get_timetable(&self, date: NaiveDate) -> RepositoryResult<Option<Timetable>> {
        Ok(self.read()?.timetables.get(&date).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::staff::StaffRole;
    use crate::model::timetable::{SlotAssignment, LUNCH_SLOT};
    use chrono::{NaiveTime, Utc};

    fn staff(id: &str, email: &str) -> Staff {
        Staff {
            id: id.into(),
            full_name: "Someone".into(),
            email: email.into(),
            role: StaffRole::Peon,
            registration_date: Utc::now(),
            education_qualification: None,
            post: None,
            teaching_classes: None,
        }
    }

    fn record(staff_id: &str, date: NaiveDate, n: u32) -> AttendanceRecord {
        AttendanceRecord {
            id: format!("{staff_id}-{n}"),
            staff_id: staff_id.into(),
            staff_name: "Someone".into(),
            staff_role: StaffRole::Peon,
            date,
            time: NaiveTime::from_hms_opt(8, 0, n).unwrap(),
            location: None,
            selfie_url: format!("data:image/jpeg;base64,{n}"),
        }
    }

    #[actix_web::test]
    async fn staff_keys_are_unique() {
        let repo = MemoryRepository::new();
        repo.insert_staff(&staff("PEON-000001", "a@school.edu")).await.unwrap();

        let dup_id = repo.insert_staff(&staff("peon-000001", "b@school.edu")).await;
        assert!(matches!(dup_id, Err(RepositoryError::Duplicate(UniqueKey::StaffId))));

        let dup_email = repo.insert_staff(&staff("PEON-000002", "A@School.edu")).await;
        assert!(matches!(dup_email, Err(RepositoryError::Duplicate(UniqueKey::StaffEmail))));

        assert_eq!(repo.count_staff().await.unwrap(), 1);
        assert!(repo.find_staff("peon-000001").await.unwrap().is_some());
        assert!(repo.email_exists("a@school.edu").await.unwrap());
    }

    #[actix_web::test]
    async fn attendance_is_once_per_day_and_newest_first() {
        let repo = MemoryRepository::new();
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let next = day.succ_opt().unwrap();

        repo.insert_attendance(&record("PEON-000001", day, 1)).await.unwrap();
        repo.insert_attendance(&record("PEON-000002", day, 2)).await.unwrap();
        repo.insert_attendance(&record("PEON-000001", next, 3)).await.unwrap();

        let again = repo.insert_attendance(&record("PEON-000001", day, 4)).await;
        assert!(matches!(again, Err(RepositoryError::Duplicate(UniqueKey::AttendancePerDay))));

        let all: Vec<_> = repo.list_attendance().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(all, vec!["PEON-000001-3", "PEON-000002-2", "PEON-000001-1"]);

        let stored = repo.find_attendance("PEON-000001", day).await.unwrap().unwrap();
        assert_eq!(stored.selfie_url, "data:image/jpeg;base64,1");
        assert_eq!(repo.list_attendance_for_date(day).await.unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn timetable_put_overwrites() {
        let repo = MemoryRepository::new();
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let mut first = Timetable::default();
        first.0.entry("Class 1".into()).or_default().insert(LUNCH_SLOT.into(), SlotAssignment::lunch());
        let second = Timetable::default();

        repo.put_timetable(day, &first).await.unwrap();
        repo.put_timetable(day, &second).await.unwrap();
        assert_eq!(repo.get_timetable(day).await.unwrap(), Some(second));
        assert_eq!(repo.get_timetable(day.succ_opt().unwrap()).await.unwrap(), None);
    }
}
