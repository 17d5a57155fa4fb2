use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{CityId, FindParams, NeighborhoodId};

/// A neighborhood. Belongs to exactly one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Neighborhood {
    pub id: NeighborhoodId,
    pub name: String,
    pub city_id: CityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Neighborhood {
    pub async fn find_by_id(id: &NeighborhoodId, pool: &PgPool) -> Result<Option<Self>> {
        let neighborhood = sqlx::query_as::<_, Self>(
            r#"
            SELECT id, name, city_id, created_at, updated_at
            FROM neighborhood
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(neighborhood)
    }

    /// Lists neighborhoods, optionally restricted to one city.
    pub async fn find_page(
        city_id: Option<&CityId>,
        params: FindParams,
        pool: &PgPool,
    ) -> Result<(Vec<Self>, i64)> {
        let neighborhoods = sqlx::query_as::<_, Self>(
            r#"
            SELECT id, name, city_id, created_at, updated_at
            FROM neighborhood
            WHERE deleted_at IS NULL
              AND ($1::text IS NULL OR city_id = $1)
            ORDER BY name ASC, id ASC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(city_id)
        .bind(params.offset)
        .bind(params.limit)
        .fetch_all(pool)
        .await?;

        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM neighborhood
            WHERE deleted_at IS NULL
              AND ($1::text IS NULL OR city_id = $1)
            "#,
        )
        .bind(city_id)
        .fetch_one(pool)
        .await?;

        Ok((neighborhoods, count))
    }

    pub async fn create(
        id: &NeighborhoodId,
        name: &str,
        city_id: &CityId,
        pool: &PgPool,
    ) -> Result<Self> {
        let neighborhood = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO neighborhood (id, name, city_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, city_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(city_id)
        .fetch_one(pool)
        .await?;
        Ok(neighborhood)
    }

    /// Applies whichever of `name` / `city_id` is set.
    pub async fn update(
        id: &NeighborhoodId,
        name: Option<&str>,
        city_id: Option<&CityId>,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let neighborhood = sqlx::query_as::<_, Self>(
            r#"
            UPDATE neighborhood SET
                name = COALESCE($2, name),
                city_id = COALESCE($3, city_id),
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, city_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(city_id)
        .fetch_optional(pool)
        .await?;
        Ok(neighborhood)
    }

    pub async fn soft_delete(id: &NeighborhoodId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE neighborhood SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
