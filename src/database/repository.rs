use async_trait::async_trait;
use thiserror::Error;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Account, AccountStatus, FieldError, OwnerId, ProfileUpdate, Whiskey, WhiskeyData, WhiskeyId,
    WhiskeyType,
};
use crate::types::{Permission, Role};

/// Errors raised by any `WhiskeyStore` or `AccountStore` implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(#[from] FieldError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(DatabaseError::Sqlx(err))
    }
}

/// Filters for `find_all`. The owner is mandatory; there is no unscoped listing.
#[derive(Debug, Clone, PartialEq)]
pub struct WhiskeyFilters {
    pub owner: OwnerId,
    pub whiskey_type: Option<WhiskeyType>,
    /// Case-insensitive substring match on distillery
    pub distillery: Option<String>,
}

impl WhiskeyFilters {
    pub fn owner(owner: OwnerId) -> Self {
        Self {
            owner,
            whiskey_type: None,
            distillery: None,
        }
    }

    pub fn matches(&self, whiskey: &Whiskey) -> bool {
        if whiskey.created_by != self.owner {
            return false;
        }
        if let Some(t) = self.whiskey_type {
            if whiskey.fields.whiskey_type != t {
                return false;
            }
        }
        if let Some(distillery) = &self.distillery {
            let needle = distillery.to_lowercase();
            if !whiskey.fields.distillery.to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }
}

/// Proof that the caller holds the admin panel permission.
///
/// Only obtainable from a role, so the cross-owner listing cannot be reached
/// from an ordinary request path.
#[derive(Debug, Clone, Copy)]
pub struct AdminScope {
    _sealed: (),
}

impl AdminScope {
    pub fn for_role(role: Role) -> Option<Self> {
        role.has_permission(Permission::AdminPanel)
            .then_some(AdminScope { _sealed: () })
    }
}

/// Ownership-scoped access to whiskey records.
///
/// Records owned by someone else are reported exactly like missing ones:
/// `None` from lookups and updates, `false` from deletes.
#[async_trait]
pub trait WhiskeyStore: Send + Sync {
    /// Records owned by `filters.owner` matching the optional predicates, ordered by id
    async fn find_all(&self, filters: &WhiskeyFilters) -> Result<Vec<Whiskey>, StoreError>;

    /// Owned records whose searchable text contains `query`, ignoring case
    async fn search(&self, query: &str, owner: OwnerId) -> Result<Vec<Whiskey>, StoreError>;

    async fn find_by_id(&self, id: WhiskeyId, owner: OwnerId) -> Result<Option<Whiskey>, StoreError>;

    /// Validate `data`, assign an id and stamp `created_by = owner`
    async fn create(&self, owner: OwnerId, data: WhiskeyData) -> Result<Whiskey, StoreError>;

    /// Apply the supplied fields to an owned record
    async fn update(
        &self,
        id: WhiskeyId,
        owner: OwnerId,
        data: WhiskeyData,
    ) -> Result<Option<Whiskey>, StoreError>;

    /// Hard delete; `true` only when an owned record was removed
    async fn delete(&self, id: WhiskeyId, owner: OwnerId) -> Result<bool, StoreError>;

    /// Every record across owners, for the admin view
    async fn find_all_owners(&self, scope: &AdminScope) -> Result<Vec<Whiskey>, StoreError>;

    /// Remove every record owned by `owner`, returning how many went
    async fn delete_all_owned_by(&self, scope: &AdminScope, owner: OwnerId) -> Result<u64, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;

    /// Short backend name for health output and logs
    fn backend(&self) -> &'static str;
}

/// Directory of accounts behind the bearer tokens
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Account for a verified token, registering it with `username` and
    /// `role` the first time `id` is seen. Removed accounts stay removed.
    async fn resolve(&self, id: OwnerId, username: &str, role: Role) -> Result<AccountStatus, StoreError>;

    /// Active account by id
    async fn find(&self, id: OwnerId) -> Result<Option<Account>, StoreError>;

    async fn update_profile(&self, id: OwnerId, profile: ProfileUpdate) -> Result<Option<Account>, StoreError>;

    /// Active accounts ordered by id
    async fn list(&self, scope: &AdminScope) -> Result<Vec<Account>, StoreError>;

    async fn set_role(&self, scope: &AdminScope, id: OwnerId, role: Role) -> Result<Option<Account>, StoreError>;

    /// Mark an active account removed; `false` when there was none
    async fn remove(&self, scope: &AdminScope, id: OwnerId) -> Result<bool, StoreError>;
}
