use async_trait::async_trait;
use uuid::Uuid;

use crate::types::{
    Listing, ListingDetail, ListingPatch, ListingSummary, NewListing, NewReview, Review,
    ReviewWithAuthor, UpdateOutcome,
};

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An internal database error occurred
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence operations for campground listings.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Fetches all listings for the index page, newest first.
    async fn list(&self) -> Result<Vec<ListingSummary>, StoreError>;

    /// Persists a new listing with its images in upload order.
    async fn create(&self, new: NewListing) -> Result<Listing, StoreError>;

    /// Fetches a listing without its relations.
    async fn get(&self, id: &Uuid) -> Result<Option<Listing>, StoreError>;

    /// Fetches a listing hydrated with author, images, and reviews.
    async fn get_detail(&self, id: &Uuid) -> Result<Option<ListingDetail>, StoreError>;

    /// Overwrites scalar fields, appends new images, and removes the images
    /// whose filenames are marked for deletion. Returns `None` when the
    /// listing does not exist; otherwise reports which filenames were
    /// actually removed so the caller can destroy them remotely.
    async fn update(
        &self,
        id: &Uuid,
        patch: ListingPatch,
    ) -> Result<Option<UpdateOutcome>, StoreError>;

    /// Deletes a listing (and, via the schema, its local image rows).
    /// Returns whether a row was deleted.
    async fn delete(&self, id: &Uuid) -> Result<bool, StoreError>;
}

/// Persistence operations for reviews nested under a listing.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Persists a review under the given listing.
    async fn create(&self, listing_id: &Uuid, new: NewReview) -> Result<Review, StoreError>;

    /// Deletes a review from a listing. Returns whether a row was deleted.
    async fn delete(&self, listing_id: &Uuid, review_id: &Uuid) -> Result<bool, StoreError>;

    /// Fetches all reviews for a listing with authors resolved, oldest first.
    async fn list_for_listing(
        &self,
        listing_id: &Uuid,
    ) -> Result<Vec<ReviewWithAuthor>, StoreError>;
}
