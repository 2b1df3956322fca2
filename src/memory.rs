//! In-process store backend, selected with `STORAGE_BACKEND=memory`.
//!
//! Enforces the schema's username uniqueness and column lengths so batch
//! writes fail the way they would against Postgres. The
//! `uploaded_by_user_id` foreign key is only checked by Postgres.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{
        repo::UserStore,
        repo_types::{NewUser, User},
    },
    countries::{
        repo::CountryStore,
        repo_types::{Country, CAPITAL_MAX, NAME_MAX, POPULATION_MAX, REGION_MAX},
    },
    error::{StoreError, StoreResult},
};

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn exists(&self, username: &str) -> StoreResult<bool> {
        let users = self.users.read().await;
        Ok(users.values().any(|u| u.username == username))
    }

    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == user.username) {
            return Err(StoreError::UsernameTaken);
        }
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(created.id, created.clone());
        Ok(created)
    }
}

#[derive(Default)]
pub struct MemoryCountryStore {
    rows: RwLock<Vec<Country>>,
}

fn check_columns(c: &Country) -> StoreResult<()> {
    let limits = [
        ("name", &c.name, NAME_MAX),
        ("capital", &c.capital, CAPITAL_MAX),
        ("region", &c.region, REGION_MAX),
        ("population", &c.population, POPULATION_MAX),
    ];
    for (column, value, max) in limits {
        if value.chars().count() > max {
            return Err(StoreError::Other(anyhow::anyhow!(
                "value too long for countries.{} ({} > {})",
                column,
                value.chars().count(),
                max
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl CountryStore for MemoryCountryStore {
    async fn add_batch(&self, countries: &[Country]) -> StoreResult<()> {
        let mut rows = self.rows.write().await;

        // Validate the whole batch before touching the table.
        let mut ids: HashSet<Uuid> = rows.iter().map(|c| c.id).collect();
        for c in countries {
            check_columns(c)?;
            if !ids.insert(c.id) {
                return Err(StoreError::Other(anyhow::anyhow!(
                    "duplicate key countries.id = {}",
                    c.id
                )));
            }
        }

        rows.extend(countries.iter().cloned());
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Country>> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|c| c.uploaded_by_user_id == owner_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> StoreResult<Vec<Country>> {
        Ok(self.rows.read().await.clone())
    }
}
