#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tenant_resolver_sdk::{
    TenantDirectory, TenantDirectoryError, TenantPatch, TenantRecord, TenantStatus,
};
use uuid::Uuid;

pub fn record(slug: &str, active: bool) -> TenantRecord {
    let now = Utc::now();
    TenantRecord {
        id: Uuid::new_v4(),
        name: format!("Tenant {slug}"),
        slug: slug.to_owned(),
        active,
        status: TenantStatus::Trial,
        trial_ends_at: None,
        subscription_ends_at: None,
        created_at: now,
        updated_at: now,
    }
}

type Rows = HashMap<String, TenantRecord>;
type Hook = Box<dyn FnOnce(&mut Rows) + Send>;

/// In-memory directory counting lookups, with a switch to simulate outages.
#[derive(Default)]
pub struct MockDirectory {
    rows: Mutex<Rows>,
    lookups: AtomicUsize,
    failing: AtomicBool,
    after_read: Mutex<Option<Hook>>,
}

impl MockDirectory {
    pub fn with(records: impl IntoIterator<Item = TenantRecord>) -> Self {
        let dir = Self::default();
        {
            let mut rows = dir.rows.lock().unwrap();
            for r in records {
                rows.insert(r.slug.clone(), r);
            }
        }
        dir
    }

    pub fn insert_raw(&self, key: &str, record: TenantRecord) {
        self.rows.lock().unwrap().insert(key.to_owned(), record);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Run `hook` on the stored rows right after the next `find_by_slug` or
    /// `list_lapsed` has taken its snapshot, as a concurrent writer would.
    pub fn after_next_read(&self, hook: impl FnOnce(&mut Rows) + Send + 'static) {
        *self.after_read.lock().unwrap() = Some(Box::new(hook));
    }

    fn fire_after_read(&self, rows: &mut Rows) {
        if let Some(hook) = self.after_read.lock().unwrap().take() {
            hook(rows);
        }
    }

    pub fn get(&self, slug: &str) -> Option<TenantRecord> {
        self.rows.lock().unwrap().get(slug).cloned()
    }

    fn check(&self) -> Result<(), TenantDirectoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TenantDirectoryError::Storage(
                "connection refused (10.0.0.7:5432)".to_owned(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl TenantDirectory for MockDirectory {
    async fn find_active_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<TenantRecord>, TenantDirectoryError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows.get(slug).filter(|r| r.active).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<TenantRecord>, TenantDirectoryError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let found = rows.get(slug).cloned();
        self.fire_after_read(&mut rows);
        Ok(found)
    }

    async fn insert(&self, record: TenantRecord) -> Result<TenantRecord, TenantDirectoryError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&record.slug) {
            return Err(TenantDirectoryError::SlugTaken { slug: record.slug });
        }
        rows.insert(record.slug.clone(), record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: TenantPatch,
        now: DateTime<Utc>,
    ) -> Result<TenantRecord, TenantDirectoryError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .values_mut()
            .find(|r| r.id == id)
            .ok_or(TenantDirectoryError::NotFound {
                slug: id.to_string(),
            })?;
        patch.apply_to(row);
        row.updated_at = now;
        Ok(row.clone())
    }

    async fn list_lapsed(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<TenantRecord>, TenantDirectoryError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let lapsed = rows
            .values()
            .filter(|r| r.active && r.is_lapsed(now))
            .cloned()
            .collect();
        self.fire_after_read(&mut rows);
        Ok(lapsed)
    }

    async fn mark_expired(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<TenantRecord>, TenantDirectoryError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .values_mut()
            .find(|r| r.id == id && r.active && r.is_lapsed(now))
            .map(|row| {
                row.status = TenantStatus::Expired;
                row.updated_at = now;
                row.clone()
            }))
    }
}
