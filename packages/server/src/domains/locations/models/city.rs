use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{CityId, FindParams};

/// A city sellers can be located in. Owns its neighborhoods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl City {
    pub async fn find_by_id(id: &CityId, pool: &PgPool) -> Result<Option<Self>> {
        let city = sqlx::query_as::<_, Self>(
            "SELECT id, name, created_at, updated_at FROM city WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(city)
    }

    pub async fn find_page(params: FindParams, pool: &PgPool) -> Result<(Vec<Self>, i64)> {
        let cities = sqlx::query_as::<_, Self>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM city
            WHERE deleted_at IS NULL
            ORDER BY name ASC, id ASC
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(params.offset)
        .bind(params.limit)
        .fetch_all(pool)
        .await?;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM city WHERE deleted_at IS NULL")
            .fetch_one(pool)
            .await?;

        Ok((cities, count))
    }

    pub async fn create(id: &CityId, name: &str, pool: &PgPool) -> Result<Self> {
        let city = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO city (id, name)
            VALUES ($1, $2)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_one(pool)
        .await?;
        Ok(city)
    }

    pub async fn rename(id: &CityId, name: &str, pool: &PgPool) -> Result<Option<Self>> {
        let city = sqlx::query_as::<_, Self>(
            r#"
            UPDATE city SET name = $2, updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(pool)
        .await?;
        Ok(city)
    }

    /// Soft-deletes the city together with its neighborhoods.
    /// Returns `false` when the city was already gone.
    pub async fn soft_delete(id: &CityId, pool: &PgPool) -> Result<bool> {
        let mut tx = pool.begin().await?;

        let deleted = sqlx::query(
            "UPDATE city SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if deleted > 0 {
            sqlx::query(
                "UPDATE neighborhood SET deleted_at = now() WHERE city_id = $1 AND deleted_at IS NULL",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(deleted > 0)
    }
}
