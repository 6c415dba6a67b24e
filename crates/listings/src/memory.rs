//! In-memory listing and review stores used by tests. One struct implements
//! both traits so hydration can see the reviews, mirroring the shared
//! database underneath the Postgres stores.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use crate::store::{ListingStore, ReviewStore, StoreError};
use crate::types::*;

#[derive(Default)]
struct State {
    listings: Vec<(Listing, Vec<ListingImage>)>,
    reviews: Vec<Review>,
    usernames: HashMap<Uuid, String>,
}

/// Listing + review store holding everything in a mutex-guarded state.
pub struct InMemoryListings {
    state: Mutex<State>,
}

impl InMemoryListings {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// Registers a username so hydration can resolve author references.
    pub fn register_username(&self, user_id: Uuid, username: &str) {
        self.state
            .lock()
            .unwrap()
            .usernames
            .insert(user_id, username.to_string());
    }

    fn username_of(state: &State, user_id: &Uuid) -> String {
        state
            .usernames
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| "camper".to_string())
    }
}

#[async_trait::async_trait]
impl ListingStore for InMemoryListings {
    async fn list(&self) -> Result<Vec<ListingSummary>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut summaries: Vec<ListingSummary> = state
            .listings
            .iter()
            .map(|(listing, images)| ListingSummary {
                id: listing.id,
                title: listing.title.clone(),
                location: listing.location.clone(),
                price: listing.price,
                image_url: images.first().map(|image| image.url.clone()),
            })
            .collect();
        summaries.reverse(); // newest first
        Ok(summaries)
    }

    async fn create(&self, new: NewListing) -> Result<Listing, StoreError> {
        let now = Utc::now();
        let listing = Listing {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            price: new.price,
            location: new.location,
            longitude: new.longitude,
            latitude: new.latitude,
            author_id: new.author_id,
            created_at: now,
            updated_at: now,
        };

        let images = new
            .images
            .into_iter()
            .enumerate()
            .map(|(position, image)| ListingImage {
                filename: image.filename,
                url: image.url,
                position: position as i32,
            })
            .collect();

        self.state
            .lock()
            .unwrap()
            .listings
            .push((listing.clone(), images));
        Ok(listing)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Listing>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .listings
            .iter()
            .find(|(listing, _)| listing.id == *id)
            .map(|(listing, _)| listing.clone()))
    }

    async fn get_detail(&self, id: &Uuid) -> Result<Option<ListingDetail>, StoreError> {
        let state = self.state.lock().unwrap();
        let Some((listing, images)) = state
            .listings
            .iter()
            .find(|(listing, _)| listing.id == *id)
        else {
            return Ok(None);
        };

        let reviews = state
            .reviews
            .iter()
            .filter(|review| review.listing_id == *id)
            .map(|review| ReviewWithAuthor {
                id: review.id,
                body: review.body.clone(),
                rating: review.rating,
                author_id: review.author_id,
                author_username: Self::username_of(&state, &review.author_id),
                created_at: review.created_at,
            })
            .collect();

        Ok(Some(ListingDetail {
            listing: listing.clone(),
            author_username: Self::username_of(&state, &listing.author_id),
            images: images.clone(),
            reviews,
        }))
    }

    async fn update(
        &self,
        id: &Uuid,
        patch: ListingPatch,
    ) -> Result<Option<UpdateOutcome>, StoreError> {
        let mut state = self.state.lock().unwrap();
        let Some((listing, images)) = state
            .listings
            .iter_mut()
            .find(|(listing, _)| listing.id == *id)
        else {
            return Ok(None);
        };

        listing.title = patch.title;
        listing.description = patch.description;
        listing.price = patch.price;
        listing.location = patch.location;
        listing.longitude = patch.longitude;
        listing.latitude = patch.latitude;
        listing.updated_at = Utc::now();

        let mut removed_filenames = Vec::new();
        images.retain(|image| {
            if patch.remove_filenames.contains(&image.filename) {
                removed_filenames.push(image.filename.clone());
                false
            } else {
                true
            }
        });

        let mut next_position = images.iter().map(|image| image.position + 1).max().unwrap_or(0);
        for image in patch.append_images {
            images.push(ListingImage {
                filename: image.filename,
                url: image.url,
                position: next_position,
            });
            next_position += 1;
        }

        Ok(Some(UpdateOutcome { removed_filenames }))
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        let before = state.listings.len();
        // Reviews are intentionally left in place, like the real schema.
        state.listings.retain(|(listing, _)| listing.id != *id);
        Ok(state.listings.len() < before)
    }
}

#[async_trait::async_trait]
impl ReviewStore for InMemoryListings {
    async fn create(&self, listing_id: &Uuid, new: NewReview) -> Result<Review, StoreError> {
        let review = Review {
            id: Uuid::new_v4(),
            listing_id: *listing_id,
            author_id: new.author_id,
            body: new.body,
            rating: new.rating,
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().reviews.push(review.clone());
        Ok(review)
    }

    async fn delete(&self, listing_id: &Uuid, review_id: &Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        let before = state.reviews.len();
        state
            .reviews
            .retain(|review| !(review.id == *review_id && review.listing_id == *listing_id));
        Ok(state.reviews.len() < before)
    }

    async fn list_for_listing(
        &self,
        listing_id: &Uuid,
    ) -> Result<Vec<ReviewWithAuthor>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .reviews
            .iter()
            .filter(|review| review.listing_id == *listing_id)
            .map(|review| ReviewWithAuthor {
                id: review.id,
                body: review.body.clone(),
                rating: review.rating,
                author_id: review.author_id,
                author_username: Self::username_of(&state, &review.author_id),
                created_at: review.created_at,
            })
            .collect())
    }
}
