use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;

use crate::database::models::{
    Account, AccountStatus, OwnerId, ProfileUpdate, Whiskey, WhiskeyData, WhiskeyId,
};
use crate::database::repository::{AccountStore, AdminScope, StoreError, WhiskeyFilters, WhiskeyStore};
use crate::types::Role;

/// Process-local store used without `DATABASE_URL`, in tests and for CLI dry runs
#[derive(Debug, Default)]
pub struct MemoryWhiskeyStore {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: WhiskeyId,
    // BTreeMap keeps id order stable for listings
    records: BTreeMap<WhiskeyId, Whiskey>,
}

impl MemoryWhiskeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WhiskeyStore for MemoryWhiskeyStore {
    async fn find_all(&self, filters: &WhiskeyFilters) -> Result<Vec<Whiskey>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .records
            .values()
            .filter(|w| filters.matches(w))
            .cloned()
            .collect())
    }

    async fn search(&self, query: &str, owner: OwnerId) -> Result<Vec<Whiskey>, StoreError> {
        let needle = query.trim().to_lowercase();
        let state = self.state.read().await;
        Ok(state
            .records
            .values()
            .filter(|w| w.created_by == owner && w.fields.matches_text(&needle))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: WhiskeyId, owner: OwnerId) -> Result<Option<Whiskey>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .records
            .get(&id)
            .filter(|w| w.created_by == owner)
            .cloned())
    }

    async fn create(&self, owner: OwnerId, data: WhiskeyData) -> Result<Whiskey, StoreError> {
        let fields = data.into_fields()?;

        let mut state = self.state.write().await;
        state.last_id += 1;
        let now = Utc::now();
        let whiskey = Whiskey {
            id: state.last_id,
            fields,
            created_by: owner,
            created_at: now,
            updated_at: now,
        };
        state.records.insert(whiskey.id, whiskey.clone());

        tracing::debug!("Created whiskey {} for user {}", whiskey.id, owner);
        Ok(whiskey)
    }

    async fn update(
        &self,
        id: WhiskeyId,
        owner: OwnerId,
        data: WhiskeyData,
    ) -> Result<Option<Whiskey>, StoreError> {
        let mut state = self.state.write().await;
        let Some(existing) = state.records.get_mut(&id).filter(|w| w.created_by == owner) else {
            return Ok(None);
        };

        existing.fields = existing.fields.merged(data)?;
        existing.updated_at = Utc::now();
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: WhiskeyId, owner: OwnerId) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let owned = state.records.get(&id).is_some_and(|w| w.created_by == owner);
        if owned {
            state.records.remove(&id);
        }
        Ok(owned)
    }

    async fn find_all_owners(&self, _scope: &AdminScope) -> Result<Vec<Whiskey>, StoreError> {
        let state = self.state.read().await;
        Ok(state.records.values().cloned().collect())
    }

    async fn delete_all_owned_by(&self, _scope: &AdminScope, owner: OwnerId) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let before = state.records.len();
        state.records.retain(|_, w| w.created_by != owner);
        Ok((before - state.records.len()) as u64)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// Process-local account directory paired with `MemoryWhiskeyStore`
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    state: RwLock<AccountState>,
}

#[derive(Debug, Default)]
struct AccountState {
    accounts: BTreeMap<OwnerId, Account>,
    removed: HashSet<OwnerId>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn resolve(&self, id: OwnerId, username: &str, role: Role) -> Result<AccountStatus, StoreError> {
        let mut state = self.state.write().await;
        if state.removed.contains(&id) {
            return Ok(AccountStatus::Removed);
        }
        let account = state
            .accounts
            .entry(id)
            .or_insert_with(|| Account::new(id, username, role));
        Ok(AccountStatus::Active(account.clone()))
    }

    async fn find(&self, id: OwnerId) -> Result<Option<Account>, StoreError> {
        let state = self.state.read().await;
        Ok(state.accounts.get(&id).cloned())
    }

    async fn update_profile(&self, id: OwnerId, profile: ProfileUpdate) -> Result<Option<Account>, StoreError> {
        profile.validate()?;
        let mut state = self.state.write().await;
        let Some(account) = state.accounts.get_mut(&id) else {
            return Ok(None);
        };
        account.apply_profile(profile);
        Ok(Some(account.clone()))
    }

    async fn list(&self, _scope: &AdminScope) -> Result<Vec<Account>, StoreError> {
        let state = self.state.read().await;
        Ok(state.accounts.values().cloned().collect())
    }

    async fn set_role(&self, _scope: &AdminScope, id: OwnerId, role: Role) -> Result<Option<Account>, StoreError> {
        let mut state = self.state.write().await;
        let Some(account) = state.accounts.get_mut(&id) else {
            return Ok(None);
        };
        account.role = role;
        account.updated_at = Utc::now();
        Ok(Some(account.clone()))
    }

    async fn remove(&self, _scope: &AdminScope, id: OwnerId) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if state.accounts.remove(&id).is_none() {
            return Ok(false);
        }
        state.removed.insert(id);
        Ok(true)
    }
}
