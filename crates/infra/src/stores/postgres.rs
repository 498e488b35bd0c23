//! Postgres-backed port implementations.
//!
//! The tables are owned by other systems; these adapters only read them.
//!
//! | Table | Columns read |
//! |-------|--------------|
//! | `admin_accounts` | `id BIGINT`, `principal_id UUID`, `email TEXT` |
//! | `tenant_assignments` | `account_id BIGINT`, `partition_id BIGINT`, `status TEXT`, `updated_at TIMESTAMPTZ` |
//! | `partitions` | `id BIGINT`, `code TEXT`, `token TEXT`, `locale TEXT`, `currency TEXT`, `is_default BOOLEAN` |
//!
//! ## Error Mapping
//!
//! | SQLx Error | Port error |
//! |------------|------------|
//! | `ColumnDecode`, `ColumnNotFound`, `Decode`, `TypeNotFound` | `Malformed` |
//! | anything else (pool, IO, TLS, database) | `Unavailable` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use tenantfence_auth::{Account, PrincipalId};
use tenantfence_core::{AccountId, Partition, PartitionId};
use tenantfence_scope::{
    AssignmentLookup, AssignmentStatus, DirectoryError, IdentityError, IdentityResolver,
    LookupError, PartitionDirectory, TenantAssignment,
};

fn is_malformed(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::Decode(_)
            | sqlx::Error::TypeNotFound { .. }
    )
}

fn lookup_error(err: sqlx::Error) -> LookupError {
    if is_malformed(&err) {
        LookupError::Malformed(err.to_string())
    } else {
        LookupError::Unavailable(err.to_string())
    }
}

fn identity_error(err: sqlx::Error) -> IdentityError {
    if is_malformed(&err) {
        IdentityError::Malformed(err.to_string())
    } else {
        IdentityError::Unavailable(err.to_string())
    }
}

fn directory_error(err: sqlx::Error) -> DirectoryError {
    if is_malformed(&err) {
        DirectoryError::Malformed(err.to_string())
    } else {
        DirectoryError::Unavailable(err.to_string())
    }
}

/// Account lookup against `admin_accounts`.
#[derive(Debug, Clone)]
pub struct PgIdentityResolver {
    pool: Arc<PgPool>,
}

impl PgIdentityResolver {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    #[instrument(skip(self), fields(principal = %principal), err)]
    pub async fn fetch_account(&self, principal: PrincipalId) -> Result<Option<Account>, IdentityError> {
        let row = sqlx::query(
            r#"
            SELECT id, principal_id, email
            FROM admin_accounts
            WHERE principal_id = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(principal.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(identity_error)?;

        row.map(|row| -> Result<Account, IdentityError> {
            Ok(Account {
                id: AccountId::new(row.try_get::<i64, _>("id").map_err(identity_error)?),
                principal_id: PrincipalId::from_uuid(
                    row.try_get::<uuid::Uuid, _>("principal_id").map_err(identity_error)?,
                ),
                contact: row.try_get::<String, _>("email").map_err(identity_error)?,
            })
        })
        .transpose()
    }
}

#[async_trait]
impl IdentityResolver for PgIdentityResolver {
    async fn resolve_account(&self, principal: PrincipalId) -> Result<Option<Account>, IdentityError> {
        self.fetch_account(principal).await
    }
}

/// Active-assignment lookup against `tenant_assignments`.
///
/// Several active rows for one account are tolerated; the most recently
/// updated row wins.
#[derive(Debug, Clone)]
pub struct PgAssignmentLookup {
    pool: Arc<PgPool>,
}

impl PgAssignmentLookup {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    #[instrument(skip(self), fields(account = %account), err)]
    pub async fn fetch_active(&self, account: AccountId) -> Result<Option<TenantAssignment>, LookupError> {
        let row = sqlx::query(
            r#"
            SELECT account_id, partition_id, status, updated_at
            FROM tenant_assignments
            WHERE account_id = $1 AND status = 'active'
            ORDER BY updated_at DESC, partition_id DESC
            LIMIT 1
            "#,
        )
        .bind(account.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(lookup_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let status: String = row.try_get("status").map_err(lookup_error)?;
        let status = AssignmentStatus::parse(&status)
            .ok_or_else(|| LookupError::Malformed(format!("unknown assignment status '{status}'")))?;

        Ok(Some(TenantAssignment {
            account_id: AccountId::new(row.try_get::<i64, _>("account_id").map_err(lookup_error)?),
            partition_id: PartitionId::new(row.try_get::<i64, _>("partition_id").map_err(lookup_error)?),
            status,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(lookup_error)?,
        }))
    }
}

#[async_trait]
impl AssignmentLookup for PgAssignmentLookup {
    async fn find_active_assignment(
        &self,
        account: AccountId,
    ) -> Result<Option<TenantAssignment>, LookupError> {
        self.fetch_active(account).await
    }
}

/// Read-only partition queries against `partitions`.
#[derive(Debug, Clone)]
pub struct PgPartitionDirectory {
    pool: Arc<PgPool>,
}

const PARTITION_COLUMNS: &str = "id, code, token, locale, currency, is_default";

fn partition_from_row(row: &PgRow) -> Result<Partition, DirectoryError> {
    Ok(Partition {
        id: PartitionId::new(row.try_get::<i64, _>("id").map_err(directory_error)?),
        code: row.try_get("code").map_err(directory_error)?,
        token: row.try_get("token").map_err(directory_error)?,
        locale: row.try_get("locale").map_err(directory_error)?,
        currency: row.try_get("currency").map_err(directory_error)?,
        is_default: row.try_get("is_default").map_err(directory_error)?,
    })
}

impl PgPartitionDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    #[instrument(skip(self), fields(partition = %id), err)]
    pub async fn fetch_partition(&self, id: PartitionId) -> Result<Option<Partition>, DirectoryError> {
        let sql = format!("SELECT {PARTITION_COLUMNS} FROM partitions WHERE id = $1");
        sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(directory_error)?
            .as_ref()
            .map(partition_from_row)
            .transpose()
    }

    #[instrument(skip(self), err)]
    pub async fn fetch_all(&self) -> Result<Vec<Partition>, DirectoryError> {
        let sql = format!("SELECT {PARTITION_COLUMNS} FROM partitions ORDER BY id");
        sqlx::query(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(directory_error)?
            .iter()
            .map(partition_from_row)
            .collect()
    }

    #[instrument(skip(self), err)]
    pub async fn fetch_default(&self) -> Result<Option<Partition>, DirectoryError> {
        let sql = format!(
            "SELECT {PARTITION_COLUMNS} FROM partitions WHERE is_default ORDER BY id LIMIT 1"
        );
        sqlx::query(&sql)
            .fetch_optional(&*self.pool)
            .await
            .map_err(directory_error)?
            .as_ref()
            .map(partition_from_row)
            .transpose()
    }
}

#[async_trait]
impl PartitionDirectory for PgPartitionDirectory {
    async fn get_partition(&self, id: PartitionId) -> Result<Option<Partition>, DirectoryError> {
        self.fetch_partition(id).await
    }

    async fn list_partitions(&self) -> Result<Vec<Partition>, DirectoryError> {
        self.fetch_all().await
    }

    async fn default_partition(&self) -> Result<Option<Partition>, DirectoryError> {
        self.fetch_default().await
    }
}
