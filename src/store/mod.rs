// Durable CRUD over listings. Every operation is a single statement against
// one row; the database's per-statement atomicity is the only consistency
// guarantee needed. Concurrent creates serialize sequential_id assignment
// through the BIGSERIAL sequence and its uniqueness constraint.

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::listing::{Listing, ListingFilter, ListingPatch, NewListing};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Listing not found: {0}")]
    NotFound(Uuid),

    #[error("Uniqueness conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Handle to the listings table. Cheap to clone (wraps a pool); constructed
/// once at startup and passed into the router as state.
#[derive(Clone)]
pub struct ListingStore {
    pool: PgPool,
}

impl ListingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the listings table if it does not exist. Run once at process
    /// start. The CHECK constraint enforces the area/area_unit pairing at
    /// the storage layer as well.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS listings (
                id UUID PRIMARY KEY,
                sequential_id BIGSERIAL NOT NULL UNIQUE,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                price DOUBLE PRECISION NOT NULL,
                location TEXT NOT NULL,
                area DOUBLE PRECISION,
                area_unit TEXT,
                facing TEXT NOT NULL,
                image_urls TEXT[] NOT NULL DEFAULT '{}',
                features TEXT[] NOT NULL DEFAULT '{}',
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                CHECK ((area IS NULL) = (area_unit IS NULL))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Pings the database to confirm connectivity.
    pub async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// All listings, newest first. No pagination.
    pub async fn list(&self) -> Result<Vec<Listing>, StoreError> {
        self.search(&ListingFilter::default()).await
    }

    /// Filtered listings, newest first. Absent criteria bind as NULL and
    /// impose no constraint, so the empty filter is the unfiltered list.
    /// The location needle is escaped so it matches as a literal substring,
    /// never as a LIKE pattern.
    pub async fn search(&self, filter: &ListingFilter) -> Result<Vec<Listing>, StoreError> {
        let listings = sqlx::query_as::<_, Listing>(
            r#"
            SELECT * FROM listings
            WHERE ($1::float8 IS NULL OR price <= $1)
              AND ($2::text IS NULL OR facing = $2)
              AND ($3::text IS NULL OR location ILIKE '%' || $3 || '%' ESCAPE '\')
              AND ($4::float8 IS NULL OR area <= $4)
            ORDER BY created_at DESC, sequential_id DESC
            "#,
        )
        .bind(filter.max_price)
        .bind(filter.facing.map(|f| f.as_str()))
        .bind(filter.location.as_deref().map(escape_like))
        .bind(filter.max_area)
        .fetch_all(&self.pool)
        .await?;
        Ok(listings)
    }

    /// Insert a validated listing. The database assigns sequential_id (from
    /// the sequence) and created_at; a uniqueness violation surfaces as
    /// Conflict with no internal retry.
    pub async fn create(&self, new: NewListing) -> Result<Listing, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Listing>(
            r#"
            INSERT INTO listings
                (id, title, description, price, location, area, area_unit, facing, image_urls, features)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.price)
        .bind(&new.location)
        .bind(new.area.map(|a| a.value))
        .bind(new.area.map(|a| a.unit.as_str()))
        .bind(new.facing.as_str())
        .bind(&new.image_urls)
        .bind(&new.features)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            _ => StoreError::Sqlx(e),
        })
    }

    /// Apply only the supplied fields. id, sequential_id and created_at are
    /// never part of the SET clause.
    pub async fn update(&self, id: Uuid, patch: ListingPatch) -> Result<Listing, StoreError> {
        if patch.is_empty() {
            // Nothing to set; behave like a read so the caller still gets
            // 404 semantics for an unknown id.
            return self.fetch(id).await;
        }

        let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new("UPDATE listings SET ");
        let mut fields = qb.separated(", ");

        if let Some(title) = &patch.title {
            fields.push("title = ").push_bind_unseparated(title);
        }
        if let Some(description) = &patch.description {
            fields.push("description = ").push_bind_unseparated(description);
        }
        if let Some(price) = patch.price {
            fields.push("price = ").push_bind_unseparated(price);
        }
        if let Some(location) = &patch.location {
            fields.push("location = ").push_bind_unseparated(location);
        }
        if let Some(facing) = patch.facing {
            fields.push("facing = ").push_bind_unseparated(facing.as_str());
        }
        match patch.area {
            Some(Some(area)) => {
                fields.push("area = ").push_bind_unseparated(area.value);
                fields.push("area_unit = ").push_bind_unseparated(area.unit.as_str());
            }
            Some(None) => {
                // Explicit clear takes the pair out together.
                fields.push("area = NULL");
                fields.push("area_unit = NULL");
            }
            None => {}
        }
        if let Some(image_urls) = &patch.image_urls {
            fields.push("image_urls = ").push_bind_unseparated(image_urls);
        }
        if let Some(features) = &patch.features {
            fields.push("features = ").push_bind_unseparated(features);
        }

        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<Listing>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    /// Hard delete. Deleting an id that is already gone is NotFound.
    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Listing, StoreError> {
        sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))
    }
}

/// Neutralize LIKE metacharacters in a user-supplied needle. `%` and `_`
/// would otherwise act as wildcards inside the ILIKE pattern.
fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
