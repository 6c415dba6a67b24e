use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A campground listing as stored in the database.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Listing {
    /// Unique identifier for the listing
    pub id: Uuid,
    /// Title shown on the index and detail pages
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Price per night
    pub price: f64,
    /// Human-readable location
    pub location: String,
    /// Longitude of the campground
    pub longitude: f64,
    /// Latitude of the campground
    pub latitude: f64,
    /// Owning user; immutable after creation
    pub author_id: Uuid,
    /// Timestamp when the listing was created
    pub created_at: DateTime<Utc>,
    /// Timestamp when the listing was last updated
    pub updated_at: DateTime<Utc>,
}

/// One hosted image attached to a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingImage {
    /// Provider-side filename; unique within the listing
    pub filename: String,
    /// Public URL serving the image
    pub url: String,
    /// Upload-order position within the listing
    pub position: i32,
}

/// An image to attach, as returned by the image host.
#[derive(Debug, Clone)]
pub struct NewImage {
    /// Public URL serving the image
    pub url: String,
    /// Provider-side filename
    pub filename: String,
}

/// Row shown on the listings index page.
#[derive(Debug, Clone, Serialize)]
pub struct ListingSummary {
    /// Unique identifier for the listing
    pub id: Uuid,
    /// Title of the listing
    pub title: String,
    /// Human-readable location
    pub location: String,
    /// Price per night
    pub price: f64,
    /// URL of the first image, if any
    pub image_url: Option<String>,
}

/// Fields for creating a listing.
#[derive(Debug, Clone)]
pub struct NewListing {
    /// Title of the listing
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Price per night
    pub price: f64,
    /// Human-readable location
    pub location: String,
    /// Longitude of the campground
    pub longitude: f64,
    /// Latitude of the campground
    pub latitude: f64,
    /// Owning user
    pub author_id: Uuid,
    /// Images in upload order
    pub images: Vec<NewImage>,
}

/// Fields for updating a listing: scalar overwrites plus image edits.
#[derive(Debug, Clone)]
pub struct ListingPatch {
    /// New title
    pub title: String,
    /// New description
    pub description: String,
    /// New price per night
    pub price: f64,
    /// New location
    pub location: String,
    /// New longitude
    pub longitude: f64,
    /// New latitude
    pub latitude: f64,
    /// Newly uploaded images, appended after the existing sequence
    pub append_images: Vec<NewImage>,
    /// Provider filenames to remove from the image sequence
    pub remove_filenames: Vec<String>,
}

/// Result of a listing update.
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    /// Filenames actually removed from the local image sequence; the caller
    /// is responsible for destroying these at the image host.
    pub removed_filenames: Vec<String>,
}

/// A review as stored in the database.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Review {
    /// Unique identifier for the review
    pub id: Uuid,
    /// Listing the review was posted under
    pub listing_id: Uuid,
    /// Authoring user
    pub author_id: Uuid,
    /// Review text
    pub body: String,
    /// Rating from 1 to 5
    pub rating: i32,
    /// Timestamp when the review was created
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a review.
#[derive(Debug, Clone)]
pub struct NewReview {
    /// Authoring user
    pub author_id: Uuid,
    /// Review text
    pub body: String,
    /// Rating from 1 to 5
    pub rating: i32,
}

/// A review joined with its author's username.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewWithAuthor {
    /// Unique identifier for the review
    pub id: Uuid,
    /// Review text
    pub body: String,
    /// Rating from 1 to 5
    pub rating: i32,
    /// Authoring user
    pub author_id: Uuid,
    /// Username of the author
    pub author_username: String,
    /// Timestamp when the review was created
    pub created_at: DateTime<Utc>,
}

/// A listing hydrated with everything its detail page needs: author name,
/// ordered images, and reviews with their authors resolved. Built by one
/// explicit fetch step instead of lazy reference resolution.
#[derive(Debug, Clone, Serialize)]
pub struct ListingDetail {
    /// The listing itself
    pub listing: Listing,
    /// Username of the owning user
    pub author_username: String,
    /// Images in upload order
    pub images: Vec<ListingImage>,
    /// Reviews in posting order
    pub reviews: Vec<ReviewWithAuthor>,
}
