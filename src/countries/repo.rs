use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::countries::repo_types::Country;
use crate::error::StoreResult;

#[async_trait]
pub trait CountryStore: Send + Sync {
    /// Persists every row or none of them.
    async fn add_batch(&self, countries: &[Country]) -> StoreResult<()>;
    async fn list_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Country>>;
    async fn list_all(&self) -> StoreResult<Vec<Country>>;
}

#[derive(Clone)]
pub struct PgCountryStore {
    db: PgPool,
}

impl PgCountryStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

async fn insert_country_tx(tx: &mut Transaction<'_, Postgres>, c: &Country) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO countries
            (id, name, capital, region, population, uploaded_by_user_id, uploaded_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(c.id)
    .bind(&c.name)
    .bind(&c.capital)
    .bind(&c.region)
    .bind(&c.population)
    .bind(c.uploaded_by_user_id)
    .bind(c.uploaded_at)
    .execute(&mut **tx)
    .await
    .with_context(|| format!("insert country {}", c.id))?;
    Ok(())
}

#[async_trait]
impl CountryStore for PgCountryStore {
    async fn add_batch(&self, countries: &[Country]) -> StoreResult<()> {
        // Dropping the transaction without commit rolls back.
        let mut tx = self.db.begin().await.context("begin tx")?;
        for c in countries {
            insert_country_tx(&mut tx, c).await?;
        }
        tx.commit().await.context("commit tx")?;
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Country>> {
        let rows = sqlx::query_as::<_, Country>(
            r#"
            SELECT id, name, capital, region, population, uploaded_by_user_id, uploaded_at
              FROM countries
             WHERE uploaded_by_user_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn list_all(&self) -> StoreResult<Vec<Country>> {
        let rows = sqlx::query_as::<_, Country>(
            r#"
            SELECT id, name, capital, region, population, uploaded_by_user_id, uploaded_at
              FROM countries
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
