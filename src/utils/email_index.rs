use std::sync::RwLock;
use std::time::Duration;

use anyhow::Result;
use autoscale_cuckoo_filter::CuckooFilter;
use moka::future::Cache;

use crate::repository::{RepositoryResult, StaffRepository};

/// Expected capacity and false-positive rate.
const FILTER_CAPACITY: usize = 10_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

#[inline]
pub fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

/// In-memory front for registered emails.
///
/// The cuckoo filter answers "definitely free" without touching storage; the moka cache
/// answers "taken" for recently seen addresses. Anything else falls through to the
/// repository, and the repository's unique key stays the final word on insert.
pub struct EmailIndex {
    filter: RwLock<CuckooFilter<String>>,
    taken: Cache<String, ()>,
}

impl Default for EmailIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailIndex {
    pub fn new() -> Self {
        Self {
            filter: RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)),
            taken: Cache::builder()
                .max_capacity(50_000)
                .time_to_live(Duration::from_secs(86400)) // 24h TTL
                .build(),
        }
    }

    fn might_exist(&self, email: &String) -> bool {
        match self.filter.read() {
            Ok(filter) => filter.contains(email),
            // a poisoned filter can't rule anything out
            Err(_) => true,
        }
    }

    /// Record an email that now belongs to a staff member.
    pub async fn mark_taken(&self, email: &str) {
        let email = normalize(email);
        if let Ok(mut filter) = self.filter.write() {
            filter.add(&email);
        }
        self.taken.insert(email, ()).await;
    }

    /// true  => email AVAILABLE
    /// false => email TAKEN
    pub async fn is_available(&self, email: &str, repo: &dyn StaffRepository) -> RepositoryResult<bool> {
        let email = normalize(email);

        // 1. cuckoo filter: fast negative
        if !self.might_exist(&email) {
            return Ok(true);
        }

        // 2. moka cache: fast positive
        if self.taken.get(&email).await.is_some() {
            return Ok(false);
        }

        // 3. storage fallback
        let exists = repo.email_exists(&email).await?;
        if exists {
            self.taken.insert(email, ()).await;
        }
        Ok(!exists)
    }

    /// Load every registered email, `batch_size` at a time.
    pub async fn warmup(&self, repo: &dyn StaffRepository, batch_size: usize) -> Result<usize> {
        let emails = repo.list_emails().await?;
        let total = emails.len();

        for batch in emails.chunks(batch_size.max(1)) {
            let normalized: Vec<String> = batch.iter().map(|e| normalize(e)).collect();
            if let Ok(mut filter) = self.filter.write() {
                for email in &normalized {
                    filter.add(email);
                }
            }
            futures::future::join_all(normalized.into_iter().map(|e| self.taken.insert(e, ()))).await;
        }

        log::info!("Email index warmup complete: {} staff", total);
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::staff::{Staff, StaffRole};
    use crate::repository::MemoryRepository;
    use chrono::Utc;

    fn staff(id: &str, email: &str) -> Staff {
        Staff {
            id: id.into(),
            full_name: "Someone".into(),
            email: email.into(),
            role: StaffRole::GroupC,
            registration_date: Utc::now(),
            education_qualification: None,
            post: None,
            teaching_classes: None,
        }
    }

    #[actix_web::test]
    async fn unknown_email_is_available() {
        let repo = MemoryRepository::new();
        let index = EmailIndex::new();
        assert!(index.is_available("new@school.edu", &repo).await.unwrap());
    }

    #[actix_web::test]
    async fn warmup_and_mark_taken_are_seen() {
        let repo = MemoryRepository::new();
        repo.insert_staff(&staff("GROUP-000001", "old@school.edu")).await.unwrap();

        let index = EmailIndex::new();
        assert_eq!(index.warmup(&repo, 1).await.unwrap(), 1);
        assert!(!index.is_available("OLD@school.edu ", &repo).await.unwrap());

        index.mark_taken("fresh@school.edu").await;
        assert!(!index.is_available("fresh@school.edu", &repo).await.unwrap());
    }
}
