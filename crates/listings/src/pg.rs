use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::store::{ListingStore, ReviewStore, StoreError};
use crate::types::*;

/// Postgres-backed listing store.
pub struct PgListingStore {
    pool: PgPool,
}

impl PgListingStore {
    /// Creates a new store over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn listing_from_row(row: &sqlx::postgres::PgRow) -> Listing {
    Listing {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        price: row.get("price"),
        location: row.get("location"),
        longitude: row.get("longitude"),
        latitude: row.get("latitude"),
        author_id: row.get("author_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait::async_trait]
impl ListingStore for PgListingStore {
    async fn list(&self) -> Result<Vec<ListingSummary>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
                l.id, l.title, l.location, l.price,
                (SELECT li.url FROM listing_images li
                 WHERE li.listing_id = l.id
                 ORDER BY li.position LIMIT 1) AS image_url
            FROM listings l
            ORDER BY l.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ListingSummary {
                id: row.get("id"),
                title: row.get("title"),
                location: row.get("location"),
                price: row.get("price"),
                image_url: row.get("image_url"),
            })
            .collect())
    }

    async fn create(&self, new: NewListing) -> Result<Listing, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO listings (
                title, description, price, location, longitude, latitude, author_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
                id, title, description, price, location, longitude, latitude,
                author_id, created_at, updated_at
            "#,
        )
        .bind(new.title.trim())
        .bind(&new.description)
        .bind(new.price)
        .bind(new.location.trim())
        .bind(new.longitude)
        .bind(new.latitude)
        .bind(new.author_id)
        .fetch_one(&mut *tx)
        .await?;

        let listing = listing_from_row(&row);

        for (position, image) in new.images.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO listing_images (listing_id, filename, url, position)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(listing.id)
            .bind(&image.filename)
            .bind(&image.url)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(listing)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Listing>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, description, price, location, longitude, latitude,
                   author_id, created_at, updated_at
            FROM listings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| listing_from_row(&row)))
    }

    async fn get_detail(&self, id: &Uuid) -> Result<Option<ListingDetail>, StoreError> {
        // Explicit hydration: one fetch per relation, joined on the way out.
        let row = sqlx::query(
            r#"
            SELECT l.id, l.title, l.description, l.price, l.location,
                   l.longitude, l.latitude, l.author_id, l.created_at,
                   l.updated_at, u.username AS author_username
            FROM listings l
            JOIN users u ON l.author_id = u.id
            WHERE l.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let listing = listing_from_row(&row);
        let author_username: String = row.get("author_username");

        let image_rows = sqlx::query(
            r#"
            SELECT filename, url, position
            FROM listing_images
            WHERE listing_id = $1
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let images = image_rows
            .into_iter()
            .map(|row| ListingImage {
                filename: row.get("filename"),
                url: row.get("url"),
                position: row.get("position"),
            })
            .collect();

        let review_rows = sqlx::query(
            r#"
            SELECT r.id, r.body, r.rating, r.author_id, r.created_at,
                   u.username AS author_username
            FROM reviews r
            JOIN users u ON r.author_id = u.id
            WHERE r.listing_id = $1
            ORDER BY r.created_at
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let reviews = review_rows
            .into_iter()
            .map(|row| ReviewWithAuthor {
                id: row.get("id"),
                body: row.get("body"),
                rating: row.get("rating"),
                author_id: row.get("author_id"),
                author_username: row.get("author_username"),
                created_at: row.get("created_at"),
            })
            .collect();

        Ok(Some(ListingDetail {
            listing,
            author_username,
            images,
            reviews,
        }))
    }

    async fn update(
        &self,
        id: &Uuid,
        patch: ListingPatch,
    ) -> Result<Option<UpdateOutcome>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE listings
            SET title = $1, description = $2, price = $3, location = $4,
                longitude = $5, latitude = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING id
            "#,
        )
        .bind(patch.title.trim())
        .bind(&patch.description)
        .bind(patch.price)
        .bind(patch.location.trim())
        .bind(patch.longitude)
        .bind(patch.latitude)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Ok(None);
        }

        let removed_rows = sqlx::query(
            r#"
            DELETE FROM listing_images
            WHERE listing_id = $1 AND filename = ANY($2)
            RETURNING filename
            "#,
        )
        .bind(id)
        .bind(&patch.remove_filenames)
        .fetch_all(&mut *tx)
        .await?;

        let removed_filenames = removed_rows
            .into_iter()
            .map(|row| row.get("filename"))
            .collect();

        let next_position: i32 = sqlx::query(
            "SELECT COALESCE(MAX(position) + 1, 0) AS next FROM listing_images WHERE listing_id = $1",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?
        .get("next");

        for (offset, image) in patch.append_images.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO listing_images (listing_id, filename, url, position)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(id)
            .bind(&image.filename)
            .bind(&image.url)
            .bind(next_position + offset as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Some(UpdateOutcome { removed_filenames }))
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, StoreError> {
        // TODO: cascade cleanup of this listing's reviews and hosted images;
        // today both are left behind (the original application's behavior).
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Postgres-backed review store.
pub struct PgReviewStore {
    pool: PgPool,
}

impl PgReviewStore {
    /// Creates a new store over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ReviewStore for PgReviewStore {
    async fn create(&self, listing_id: &Uuid, new: NewReview) -> Result<Review, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO reviews (listing_id, author_id, body, rating)
            VALUES ($1, $2, $3, $4)
            RETURNING id, listing_id, author_id, body, rating, created_at
            "#,
        )
        .bind(listing_id)
        .bind(new.author_id)
        .bind(&new.body)
        .bind(new.rating)
        .fetch_one(&self.pool)
        .await?;

        Ok(Review {
            id: row.get("id"),
            listing_id: row.get("listing_id"),
            author_id: row.get("author_id"),
            body: row.get("body"),
            rating: row.get("rating"),
            created_at: row.get("created_at"),
        })
    }

    async fn delete(&self, listing_id: &Uuid, review_id: &Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1 AND listing_id = $2")
            .bind(review_id)
            .bind(listing_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_listing(
        &self,
        listing_id: &Uuid,
    ) -> Result<Vec<ReviewWithAuthor>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.body, r.rating, r.author_id, r.created_at,
                   u.username AS author_username
            FROM reviews r
            JOIN users u ON r.author_id = u.id
            WHERE r.listing_id = $1
            ORDER BY r.created_at
            "#,
        )
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ReviewWithAuthor {
                id: row.get("id"),
                body: row.get("body"),
                rating: row.get("rating"),
                author_id: row.get("author_id"),
                author_username: row.get("author_username"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}
