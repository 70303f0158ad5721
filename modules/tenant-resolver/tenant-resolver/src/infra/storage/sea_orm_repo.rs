use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    SqlErr,
};
use tenant_resolver_sdk::{
    TenantDirectory, TenantDirectoryError, TenantPatch, TenantRecord, TenantStatus,
};
use uuid::Uuid;

use super::entity::{self, Column, Entity as TenantEntity};

/// Tenant directory backed by the `tenants` table.
#[derive(Clone)]
pub struct SeaOrmTenantDirectory {
    db: DatabaseConnection,
}

impl SeaOrmTenantDirectory {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<TenantRecord>, TenantDirectoryError> {
        TenantEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(storage)?
            .map(TenantRecord::try_from)
            .transpose()
    }
}

// Trial or paid tenants whose current period ended before `now`.
fn lapsed_at(now: DateTime<Utc>) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(Column::Status.eq(TenantStatus::Trial.as_str()))
                .add(Column::TrialEndsAt.lt(now)),
        )
        .add(
            Condition::all()
                .add(Column::Status.eq(TenantStatus::Paid.as_str()))
                .add(Column::SubscriptionEndsAt.lt(now)),
        )
}

fn storage(e: DbErr) -> TenantDirectoryError {
    tracing::error!(
        category = "tenant_directory",
        event = "directory.storage_error",
        error = %e,
        "tenant directory query failed"
    );
    TenantDirectoryError::Storage(e.to_string())
}

impl TryFrom<entity::Model> for TenantRecord {
    type Error = TenantDirectoryError;

    fn try_from(m: entity::Model) -> Result<Self, Self::Error> {
        let status = m
            .status
            .parse::<TenantStatus>()
            .map_err(TenantDirectoryError::Storage)?;
        Ok(Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
            active: m.active,
            status,
            trial_ends_at: m.trial_ends_at,
            subscription_ends_at: m.subscription_ends_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

fn to_active_model(r: &TenantRecord) -> entity::ActiveModel {
    entity::ActiveModel {
        id: ActiveValue::Set(r.id),
        name: ActiveValue::Set(r.name.clone()),
        slug: ActiveValue::Set(r.slug.clone()),
        active: ActiveValue::Set(r.active),
        status: ActiveValue::Set(r.status.as_str().to_owned()),
        trial_ends_at: ActiveValue::Set(r.trial_ends_at),
        subscription_ends_at: ActiveValue::Set(r.subscription_ends_at),
        created_at: ActiveValue::Set(r.created_at),
        updated_at: ActiveValue::Set(r.updated_at),
    }
}

#[async_trait]
impl TenantDirectory for SeaOrmTenantDirectory {
    async fn find_active_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<TenantRecord>, TenantDirectoryError> {
        TenantEntity::find()
            .filter(Column::Slug.eq(slug))
            .filter(Column::Active.eq(true))
            .one(&self.db)
            .await
            .map_err(storage)?
            .map(TenantRecord::try_from)
            .transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<TenantRecord>, TenantDirectoryError> {
        TenantEntity::find()
            .filter(Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(storage)?
            .map(TenantRecord::try_from)
            .transpose()
    }

    async fn insert(&self, record: TenantRecord) -> Result<TenantRecord, TenantDirectoryError> {
        match TenantEntity::insert(to_active_model(&record))
            .exec_without_returning(&self.db)
            .await
        {
            Ok(_) => Ok(record),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(TenantDirectoryError::SlugTaken { slug: record.slug })
            }
            Err(e) => Err(storage(e)),
        }
    }

    async fn update(
        &self,
        id: Uuid,
        patch: TenantPatch,
        now: DateTime<Utc>,
    ) -> Result<TenantRecord, TenantDirectoryError> {
        let mut am = entity::ActiveModel {
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        if let Some(active) = patch.active {
            am.active = ActiveValue::Set(active);
        }
        if let Some(status) = patch.status {
            am.status = ActiveValue::Set(status.as_str().to_owned());
        }
        if let Some(until) = patch.subscription_ends_at {
            am.subscription_ends_at = ActiveValue::Set(Some(until));
        }

        let res = TenantEntity::update_many()
            .set(am)
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(storage)?;
        if res.rows_affected == 0 {
            return Err(TenantDirectoryError::NotFound {
                slug: id.to_string(),
            });
        }
        self.fetch(id).await?.ok_or(TenantDirectoryError::NotFound {
            slug: id.to_string(),
        })
    }

    async fn list_lapsed(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<TenantRecord>, TenantDirectoryError> {
        TenantEntity::find()
            .filter(Column::Active.eq(true))
            .filter(lapsed_at(now))
            .all(&self.db)
            .await
            .map_err(storage)?
            .into_iter()
            .map(TenantRecord::try_from)
            .collect()
    }

    async fn mark_expired(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<TenantRecord>, TenantDirectoryError> {
        let am = entity::ActiveModel {
            status: ActiveValue::Set(TenantStatus::Expired.as_str().to_owned()),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        let res = TenantEntity::update_many()
            .set(am)
            .filter(Column::Id.eq(id))
            .filter(Column::Active.eq(true))
            .filter(lapsed_at(now))
            .exec(&self.db)
            .await
            .map_err(storage)?;
        if res.rows_affected == 0 {
            return Ok(None);
        }
        self.fetch(id).await
    }
}
