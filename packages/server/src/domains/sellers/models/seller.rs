use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use typed_builder::TypedBuilder;

use crate::common::{CityId, FindParams, MemberId, NeighborhoodId, SellerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "subscription_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SubscriptionStatus {
    Active,
    #[default]
    Inactive,
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "store_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum StoreStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

/// A marketplace vendor.
///
/// `city_id` / `neighborhood_id` are only ever written through the location
/// workflow, which guarantees that a set neighborhood lies in the set city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, TypedBuilder)]
pub struct Seller {
    #[builder(default)]
    pub id: SellerId,
    #[builder(setter(into))]
    pub name: String,
    #[builder(setter(into))]
    pub handle: String,
    #[builder(default, setter(strip_option, into))]
    pub description: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub photo: Option<String>,
    #[builder(default)]
    pub email: Option<String>,
    #[builder(default)]
    pub phone: Option<String>,
    #[builder(default)]
    pub address_line: Option<String>,
    #[builder(default)]
    pub state: Option<String>,
    #[builder(default)]
    pub postal_code: Option<String>,
    #[builder(default)]
    pub country_code: Option<String>,
    #[builder(default)]
    pub tax_id: Option<String>,
    #[builder(default)]
    pub store_status: StoreStatus,
    #[builder(default)]
    pub approved: bool,
    #[builder(default)]
    pub subscription_status: SubscriptionStatus,
    #[builder(default)]
    pub city_id: Option<CityId>,
    #[builder(default)]
    pub neighborhood_id: Option<NeighborhoodId>,
    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
    #[builder(default = Utc::now())]
    pub updated_at: DateTime<Utc>,
}

impl Seller {
    /// The index-membership predicate.
    pub fn is_publishable(&self) -> bool {
        is_publishable(self.approved, self.subscription_status)
    }
}

pub fn is_publishable(approved: bool, subscription_status: SubscriptionStatus) -> bool {
    approved && subscription_status == SubscriptionStatus::Active
}

/// Minimal projection used to decide index membership.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SellerStatusRecord {
    pub id: SellerId,
    pub approved: bool,
    pub subscription_status: SubscriptionStatus,
}

impl SellerStatusRecord {
    pub fn is_publishable(&self) -> bool {
        is_publishable(self.approved, self.subscription_status)
    }
}

impl From<&Seller> for SellerStatusRecord {
    fn from(seller: &Seller) -> Self {
        Self {
            id: seller.id.clone(),
            approved: seller.approved,
            subscription_status: seller.subscription_status,
        }
    }
}

/// `{id, name}` of a related city or neighborhood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRef {
    pub id: String,
    pub name: String,
}

/// A seller with its city and neighborhood names resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SellerWithLocation {
    #[serde(flatten)]
    pub seller: Seller,
    pub city: Option<LocationRef>,
    pub neighborhood: Option<LocationRef>,
}

#[derive(sqlx::FromRow)]
struct SellerLocationRow {
    #[sqlx(flatten)]
    seller: Seller,
    city_name: Option<String>,
    neighborhood_name: Option<String>,
}

impl From<SellerLocationRow> for SellerWithLocation {
    fn from(row: SellerLocationRow) -> Self {
        let city = match (&row.seller.city_id, row.city_name) {
            (Some(id), Some(name)) => Some(LocationRef {
                id: id.to_string(),
                name,
            }),
            _ => None,
        };
        let neighborhood = match (&row.seller.neighborhood_id, row.neighborhood_name) {
            (Some(id), Some(name)) => Some(LocationRef {
                id: id.to_string(),
                name,
            }),
            _ => None,
        };
        Self {
            seller: row.seller,
            city,
            neighborhood,
        }
    }
}

/// Storefront view of a published seller.
///
/// Contact details, address, tax id and approval state stay private.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSeller {
    pub id: SellerId,
    pub name: String,
    pub handle: String,
    pub description: Option<String>,
    pub photo: Option<String>,
    pub store_status: StoreStatus,
    pub city_id: Option<CityId>,
    pub neighborhood_id: Option<NeighborhoodId>,
    pub city: Option<LocationRef>,
    pub neighborhood: Option<LocationRef>,
}

impl From<SellerWithLocation> for StoreSeller {
    fn from(listed: SellerWithLocation) -> Self {
        let seller = listed.seller;
        Self {
            id: seller.id,
            name: seller.name,
            handle: seller.handle,
            description: seller.description,
            photo: seller.photo,
            store_status: seller.store_status,
            city_id: seller.city_id,
            neighborhood_id: seller.neighborhood_id,
            city: listed.city,
            neighborhood: listed.neighborhood,
        }
    }
}

const SELLER_COLUMNS: &str = "s.id, s.name, s.handle, s.description, s.photo, s.email, s.phone, \
     s.address_line, s.state, s.postal_code, s.country_code, s.tax_id, s.store_status, \
     s.approved, s.subscription_status, s.city_id, s.neighborhood_id, s.created_at, s.updated_at";

const LOCATION_JOINS: &str = "LEFT JOIN city c ON c.id = s.city_id AND c.deleted_at IS NULL \
     LEFT JOIN neighborhood n ON n.id = s.neighborhood_id AND n.deleted_at IS NULL";

/// Filters for the public seller listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishedSellerFilter {
    pub city_id: Option<CityId>,
    pub neighborhood_id: Option<NeighborhoodId>,
}

impl Seller {
    pub async fn find_by_id(id: &SellerId, pool: &PgPool) -> Result<Option<Self>> {
        let sql = format!("SELECT {SELLER_COLUMNS} FROM seller s WHERE s.id = $1 AND s.deleted_at IS NULL");
        let seller = sqlx::query_as::<_, Self>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(seller)
    }

    /// Seller a member acts for.
    pub async fn find_by_member(member_id: &MemberId, pool: &PgPool) -> Result<Option<Self>> {
        let sql = format!(
            "SELECT {SELLER_COLUMNS} FROM seller s \
             INNER JOIN member m ON m.seller_id = s.id \
             WHERE m.id = $1 AND m.deleted_at IS NULL AND s.deleted_at IS NULL"
        );
        let seller = sqlx::query_as::<_, Self>(&sql)
            .bind(member_id)
            .fetch_optional(pool)
            .await?;
        Ok(seller)
    }

    /// Status projection for the given ids, ordered by id. Ids that do not
    /// resolve are simply absent.
    pub async fn find_statuses(ids: &[SellerId], pool: &PgPool) -> Result<Vec<SellerStatusRecord>> {
        let rows = sqlx::query_as::<_, SellerStatusRecord>(
            r#"
            SELECT id, approved, subscription_status
            FROM seller
            WHERE id = ANY($1) AND deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_with_location(
        ids: &[SellerId],
        pool: &PgPool,
    ) -> Result<Vec<SellerWithLocation>> {
        let sql = format!(
            "SELECT {SELLER_COLUMNS}, c.name AS city_name, n.name AS neighborhood_name \
             FROM seller s {LOCATION_JOINS} \
             WHERE s.id = ANY($1) AND s.deleted_at IS NULL \
             ORDER BY s.id"
        );
        let rows = sqlx::query_as::<_, SellerLocationRow>(&sql)
            .bind(ids)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(SellerWithLocation::from).collect())
    }

    /// Approved sellers with an active subscription, optionally filtered by
    /// location.
    pub async fn find_published(
        filter: &PublishedSellerFilter,
        params: FindParams,
        pool: &PgPool,
    ) -> Result<(Vec<SellerWithLocation>, i64)> {
        const PUBLISHED: &str = "s.deleted_at IS NULL AND s.approved = true \
             AND s.subscription_status = 'ACTIVE' \
             AND ($1::text IS NULL OR s.city_id = $1) \
             AND ($2::text IS NULL OR s.neighborhood_id = $2)";

        let sql = format!(
            "SELECT {SELLER_COLUMNS}, c.name AS city_name, n.name AS neighborhood_name \
             FROM seller s {LOCATION_JOINS} \
             WHERE {PUBLISHED} \
             ORDER BY s.name ASC, s.id ASC \
             OFFSET $3 LIMIT $4"
        );
        let rows = sqlx::query_as::<_, SellerLocationRow>(&sql)
            .bind(filter.city_id.as_ref())
            .bind(filter.neighborhood_id.as_ref())
            .bind(params.offset)
            .bind(params.limit)
            .fetch_all(pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM seller s WHERE {PUBLISHED}");
        let (count,): (i64,) = sqlx::query_as(&count_sql)
            .bind(filter.city_id.as_ref())
            .bind(filter.neighborhood_id.as_ref())
            .fetch_one(pool)
            .await?;

        Ok((rows.into_iter().map(SellerWithLocation::from).collect(), count))
    }

    /// Keyset page of all seller ids, for full reindexing.
    pub async fn find_ids_after(
        after: Option<&SellerId>,
        limit: i64,
        pool: &PgPool,
    ) -> Result<Vec<SellerId>> {
        let ids: Vec<(SellerId,)> = sqlx::query_as(
            r#"
            SELECT id FROM seller
            WHERE deleted_at IS NULL AND ($1::text IS NULL OR id > $1)
            ORDER BY id
            LIMIT $2
            "#,
        )
        .bind(after)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    pub async fn find_ids_by_city(city_id: &CityId, pool: &PgPool) -> Result<Vec<SellerId>> {
        let ids: Vec<(SellerId,)> = sqlx::query_as(
            "SELECT id FROM seller WHERE city_id = $1 AND deleted_at IS NULL ORDER BY id",
        )
        .bind(city_id)
        .fetch_all(pool)
        .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    pub async fn find_ids_by_neighborhood(
        neighborhood_id: &NeighborhoodId,
        pool: &PgPool,
    ) -> Result<Vec<SellerId>> {
        let ids: Vec<(SellerId,)> = sqlx::query_as(
            "SELECT id FROM seller WHERE neighborhood_id = $1 AND deleted_at IS NULL ORDER BY id",
        )
        .bind(neighborhood_id)
        .fetch_all(pool)
        .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    /// Single-statement location write.
    pub async fn update_location(
        id: &SellerId,
        city_id: Option<&CityId>,
        neighborhood_id: Option<&NeighborhoodId>,
        pool: &PgPool,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "UPDATE seller s SET city_id = $2, neighborhood_id = $3, updated_at = now() \
             WHERE s.id = $1 AND s.deleted_at IS NULL \
             RETURNING {SELLER_COLUMNS}"
        );
        sqlx::query_as::<_, Self>(&sql)
            .bind(id)
            .bind(city_id)
            .bind(neighborhood_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn update_status(
        id: &SellerId,
        approved: Option<bool>,
        subscription_status: Option<SubscriptionStatus>,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let sql = format!(
            "UPDATE seller s SET \
                approved = COALESCE($2, approved), \
                subscription_status = COALESCE($3, subscription_status), \
                updated_at = now() \
             WHERE s.id = $1 AND s.deleted_at IS NULL \
             RETURNING {SELLER_COLUMNS}"
        );
        let seller = sqlx::query_as::<_, Self>(&sql)
            .bind(id)
            .bind(approved)
            .bind(subscription_status)
            .fetch_optional(pool)
            .await?;
        Ok(seller)
    }

    /// Clears both location fields of every seller in `city_id`.
    pub async fn clear_city(city_id: &CityId, pool: &PgPool) -> Result<Vec<SellerId>> {
        let ids: Vec<(SellerId,)> = sqlx::query_as(
            r#"
            UPDATE seller SET city_id = NULL, neighborhood_id = NULL, updated_at = now()
            WHERE city_id = $1 AND deleted_at IS NULL
            RETURNING id
            "#,
        )
        .bind(city_id)
        .fetch_all(pool)
        .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    pub async fn clear_neighborhood(
        neighborhood_id: &NeighborhoodId,
        pool: &PgPool,
    ) -> Result<Vec<SellerId>> {
        let ids: Vec<(SellerId,)> = sqlx::query_as(
            r#"
            UPDATE seller SET neighborhood_id = NULL, updated_at = now()
            WHERE neighborhood_id = $1 AND deleted_at IS NULL
            RETURNING id
            "#,
        )
        .bind(neighborhood_id)
        .fetch_all(pool)
        .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    /// Clears `neighborhood_id` on sellers whose city no longer contains it.
    pub async fn clear_mismatched_neighborhood(
        neighborhood_id: &NeighborhoodId,
        city_id: &CityId,
        pool: &PgPool,
    ) -> Result<Vec<SellerId>> {
        let ids: Vec<(SellerId,)> = sqlx::query_as(
            r#"
            UPDATE seller SET neighborhood_id = NULL, updated_at = now()
            WHERE neighborhood_id = $1
              AND city_id IS DISTINCT FROM $2
              AND deleted_at IS NULL
            RETURNING id
            "#,
        )
        .bind(neighborhood_id)
        .bind(city_id)
        .fetch_all(pool)
        .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    pub async fn create(seller: &Seller, pool: &PgPool) -> Result<Self> {
        let sql = format!(
            "INSERT INTO seller AS s (id, name, handle, description, photo, email, phone, \
                address_line, state, postal_code, country_code, tax_id, store_status, \
                approved, subscription_status, city_id, neighborhood_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             RETURNING {SELLER_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Self>(&sql)
            .bind(&seller.id)
            .bind(&seller.name)
            .bind(&seller.handle)
            .bind(&seller.description)
            .bind(&seller.photo)
            .bind(&seller.email)
            .bind(&seller.phone)
            .bind(&seller.address_line)
            .bind(&seller.state)
            .bind(&seller.postal_code)
            .bind(&seller.country_code)
            .bind(&seller.tax_id)
            .bind(seller.store_status)
            .bind(seller.approved)
            .bind(seller.subscription_status)
            .bind(&seller.city_id)
            .bind(&seller.neighborhood_id)
            .fetch_one(pool)
            .await?;
        Ok(created)
    }
}
