use async_trait::async_trait;
use once_cell::sync::Lazy;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{FromRow, PgPool, Postgres};

use crate::database::manager::DatabaseManager;
use crate::database::models::whiskey::SEARCHABLE_COLUMNS;
use crate::database::models::{
    Account, AccountStatus, OwnerId, ProfileUpdate, Whiskey, WhiskeyData, WhiskeyFields, WhiskeyId,
};
use crate::database::repository::{AccountStore, AdminScope, StoreError, WhiskeyFilters, WhiskeyStore};
use crate::types::Role;

/// Editable columns, in the order `bind_fields` binds them
const DATA_COLUMNS: [&str; 50] = [
    "name",
    "type",
    "distillery",
    "region",
    "country",
    "age",
    "abv",
    "proof",
    "size",
    "quantity",
    "msrp",
    "secondary_price",
    "purchase_date",
    "purchase_price",
    "purchase_location",
    "bottle_code",
    "current_market_value",
    "value_gain_loss",
    "is_investment_bottle",
    "asking_price",
    "is_for_sale",
    "is_for_trade",
    "rating",
    "description",
    "tasting_notes",
    "nose_notes",
    "palate_notes",
    "finish_notes",
    "color",
    "food_pairings",
    "times_tasted",
    "last_tasted_date",
    "cask_type",
    "cask_finish",
    "barrel_number",
    "bottle_number",
    "vintage_year",
    "bottled_date",
    "mash_bill",
    "awards",
    "limited_edition",
    "chill_filtered",
    "natural_color",
    "status",
    "is_opened",
    "date_opened",
    "remaining_volume",
    "storage_location",
    "shared_with",
    "private_notes",
];

const LOCK_OWNED_SQL: &str = "SELECT * FROM whiskeys WHERE id = $1 AND created_by = $2 FOR UPDATE";

// $1 is created_by, data columns start at $2
static INSERT_SQL: Lazy<String> = Lazy::new(|| {
    let columns = DATA_COLUMNS.map(quote_identifier).join(", ");
    let placeholders = (0..DATA_COLUMNS.len())
        .map(|i| format!("${}", i + 2))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO whiskeys (created_by, {}) VALUES ($1, {}) RETURNING *",
        columns, placeholders
    )
});

// $1 is id, $2 is the owner, data columns start at $3
static UPDATE_SQL: Lazy<String> = Lazy::new(|| {
    let assignments = DATA_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ${}", quote_identifier(column), i + 3))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE whiskeys SET {}, updated_at = NOW() WHERE id = $1 AND created_by = $2 RETURNING *",
        assignments
    )
});

static SEARCH_SQL: Lazy<String> = Lazy::new(|| {
    let predicates = SEARCHABLE_COLUMNS
        .iter()
        .map(|column| format!("{} ILIKE $2", quote_identifier(column)))
        .collect::<Vec<_>>()
        .join(" OR ");
    format!(
        "SELECT * FROM whiskeys WHERE created_by = $1 AND ({}) ORDER BY id",
        predicates
    )
});

/// `WhiskeyStore` backed by the `whiskeys` table
#[derive(Clone)]
pub struct PgWhiskeyStore {
    pool: PgPool,
}

impl PgWhiskeyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WhiskeyStore for PgWhiskeyStore {
    async fn find_all(&self, filters: &WhiskeyFilters) -> Result<Vec<Whiskey>, StoreError> {
        let mut qb = sqlx::QueryBuilder::<Postgres>::new("SELECT * FROM whiskeys WHERE created_by = ");
        qb.push_bind(filters.owner);

        if let Some(whiskey_type) = filters.whiskey_type {
            qb.push(" AND \"type\" = ").push_bind(whiskey_type.as_str());
        }
        if let Some(distillery) = &filters.distillery {
            qb.push(" AND distillery ILIKE ").push_bind(contains_pattern(distillery));
        }
        qb.push(" ORDER BY id");

        let rows = qb.build_query_as::<Whiskey>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn search(&self, query: &str, owner: OwnerId) -> Result<Vec<Whiskey>, StoreError> {
        let rows = sqlx::query_as::<_, Whiskey>(&SEARCH_SQL)
            .bind(owner)
            .bind(contains_pattern(query.trim()))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: WhiskeyId, owner: OwnerId) -> Result<Option<Whiskey>, StoreError> {
        let row = sqlx::query_as::<_, Whiskey>("SELECT * FROM whiskeys WHERE id = $1 AND created_by = $2")
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create(&self, owner: OwnerId, data: WhiskeyData) -> Result<Whiskey, StoreError> {
        let fields = data.into_fields()?;

        let query = sqlx::query_as::<_, Whiskey>(&INSERT_SQL).bind(owner);
        let whiskey = bind_fields(query, &fields).fetch_one(&self.pool).await?;

        tracing::debug!("Created whiskey {} for user {}", whiskey.id, owner);
        Ok(whiskey)
    }

    async fn update(
        &self,
        id: WhiskeyId,
        owner: OwnerId,
        data: WhiskeyData,
    ) -> Result<Option<Whiskey>, StoreError> {
        // Row is locked from the read until commit
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Whiskey>(LOCK_OWNED_SQL)
            .bind(id)
            .bind(owner)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(existing) = existing else {
            return Ok(None);
        };
        let fields = existing.fields.merged(data)?;

        let query = sqlx::query_as::<_, Whiskey>(&UPDATE_SQL).bind(id).bind(owner);
        let updated = bind_fields(query, &fields).fetch_optional(&mut *tx).await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, id: WhiskeyId, owner: OwnerId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM whiskeys WHERE id = $1 AND created_by = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_all_owners(&self, _scope: &AdminScope) -> Result<Vec<Whiskey>, StoreError> {
        let rows = sqlx::query_as::<_, Whiskey>("SELECT * FROM whiskeys ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn delete_all_owned_by(&self, _scope: &AdminScope, owner: OwnerId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM whiskeys WHERE created_by = $1")
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        DatabaseManager::health_check(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

const ACTIVE_ACCOUNT_SQL: &str = "SELECT * FROM accounts WHERE id = $1 AND deleted_at IS NULL";

/// Account row along with its removal marker
#[derive(FromRow)]
struct AccountRow {
    #[sqlx(flatten)]
    account: Account,
    removed: bool,
}

/// `AccountStore` backed by the `accounts` table; removal sets `deleted_at`
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn resolve(&self, id: OwnerId, username: &str, role: Role) -> Result<AccountStatus, StoreError> {
        sqlx::query(
            "INSERT INTO accounts (id, username, role) VALUES ($1, $2, $3) ON CONFLICT (id) DO NOTHING",
        )
        .bind(id)
        .bind(username)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT *, deleted_at IS NOT NULL AS removed FROM accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if row.removed {
            return Ok(AccountStatus::Removed);
        }
        Ok(AccountStatus::Active(row.account))
    }

    async fn find(&self, id: OwnerId) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, Account>(ACTIVE_ACCOUNT_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_profile(&self, id: OwnerId, profile: ProfileUpdate) -> Result<Option<Account>, StoreError> {
        profile.validate()?;
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Account>(&format!("{} FOR UPDATE", ACTIVE_ACCOUNT_SQL))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(mut account) = existing else {
            return Ok(None);
        };
        account.apply_profile(profile);

        let updated = sqlx::query_as::<_, Account>(
            "UPDATE accounts SET email = $2, first_name = $3, last_name = $4, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&account.email)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn list(&self, _scope: &AdminScope) -> Result<Vec<Account>, StoreError> {
        let rows = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE deleted_at IS NULL ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn set_role(&self, _scope: &AdminScope, id: OwnerId, role: Role) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, Account>(
            "UPDATE accounts SET role = $2, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(id)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn remove(&self, _scope: &AdminScope, id: OwnerId) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE accounts SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn bind_fields<'q>(
    query: QueryAs<'q, Postgres, Whiskey, PgArguments>,
    f: &'q WhiskeyFields,
) -> QueryAs<'q, Postgres, Whiskey, PgArguments> {
    query
        .bind(&f.name)
        .bind(f.whiskey_type.as_str())
        .bind(&f.distillery)
        .bind(&f.region)
        .bind(&f.country)
        .bind(f.age)
        .bind(f.abv)
        .bind(f.proof)
        .bind(&f.size)
        .bind(f.quantity)
        .bind(f.msrp)
        .bind(f.secondary_price)
        .bind(&f.purchase_date)
        .bind(f.purchase_price)
        .bind(&f.purchase_location)
        .bind(&f.bottle_code)
        .bind(f.current_market_value)
        .bind(f.value_gain_loss)
        .bind(f.is_investment_bottle)
        .bind(f.asking_price)
        .bind(f.is_for_sale)
        .bind(f.is_for_trade)
        .bind(f.rating)
        .bind(&f.description)
        .bind(&f.tasting_notes)
        .bind(&f.nose_notes)
        .bind(&f.palate_notes)
        .bind(&f.finish_notes)
        .bind(&f.color)
        .bind(&f.food_pairings)
        .bind(f.times_tasted)
        .bind(&f.last_tasted_date)
        .bind(&f.cask_type)
        .bind(&f.cask_finish)
        .bind(&f.barrel_number)
        .bind(&f.bottle_number)
        .bind(&f.vintage_year)
        .bind(&f.bottled_date)
        .bind(&f.mash_bill)
        .bind(&f.awards)
        .bind(f.limited_edition)
        .bind(f.chill_filtered)
        .bind(f.natural_color)
        .bind(&f.status)
        .bind(f.is_opened)
        .bind(&f.date_opened)
        .bind(f.remaining_volume)
        .bind(&f.storage_location)
        .bind(&f.shared_with)
        .bind(&f.private_notes)
}

/// Quote SQL identifier to prevent injection
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// ILIKE pattern matching `needle` anywhere, with wildcards escaped
fn contains_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
