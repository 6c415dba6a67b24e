//! Shared fixtures for handler tests: in-memory stores, a signed session
//! cookie factory, and a multipart body builder.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_web::cookie::Cookie;
use uuid::Uuid;

use auth_services::cookie::SessionCookie;
use auth_services::memory::InMemorySessionStore;
use auth_services::session::SessionStore;
use image_store::memory::InMemoryImageStore;
use listings::memory::InMemoryListings;
use listings::{
    Listing, ListingDetail, ListingStore, ListingSummary, NewListing, NewReview, Review,
    ReviewStore, ReviewWithAuthor,
};

/// Everything a handler test needs, wired to in-memory stores.
pub(crate) struct TestWorld {
    pub listings: Arc<InMemoryListings>,
    pub sessions: Arc<InMemorySessionStore>,
    pub images: Arc<InMemoryImageStore>,
    pub codec: SessionCookie,
    users: Mutex<HashMap<String, Uuid>>,
}

impl TestWorld {
    pub fn new() -> Self {
        Self {
            listings: Arc::new(InMemoryListings::new()),
            sessions: Arc::new(InMemorySessionStore::new()),
            images: Arc::new(InMemoryImageStore::new()),
            codec: SessionCookie::new("test-secret"),
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a stable user id for a username, creating it on first use.
    pub fn user_id(&self, username: &str) -> Uuid {
        let mut users = self.users.lock().unwrap();
        *users.entry(username.to_string()).or_insert_with(|| {
            let id = Uuid::new_v4();
            self.listings.register_username(id, username);
            id
        })
    }

    /// Creates an anonymous session and its signed cookie.
    pub async fn anonymous(&self) -> (Uuid, Cookie<'static>) {
        let session = self.sessions.create().await.unwrap();
        let cookie = self.codec.build_cookie(&session.id).unwrap();
        (session.id, cookie)
    }

    /// Creates a session logged in as `username` and its signed cookie.
    pub async fn logged_in(&self, username: &str) -> (Uuid, Cookie<'static>) {
        let user_id = self.user_id(username);
        let session = self.sessions.create().await.unwrap();
        self.sessions
            .set_user(&session.id, Some(user_id))
            .await
            .unwrap();
        let cookie = self.codec.build_cookie(&session.id).unwrap();
        (session.id, cookie)
    }

    // Store shortcuts, named so tests never need both `create`-bearing
    // traits in scope at once.

    pub async fn seed_listing(&self, new: NewListing) -> Listing {
        ListingStore::create(&*self.listings, new).await.unwrap()
    }

    pub async fn seed_review(
        &self,
        listing_id: &Uuid,
        author_id: Uuid,
        body: &str,
        rating: i32,
    ) -> Review {
        ReviewStore::create(
            &*self.listings,
            listing_id,
            NewReview {
                author_id,
                body: body.to_string(),
                rating,
            },
        )
        .await
        .unwrap()
    }

    pub async fn index(&self) -> Vec<ListingSummary> {
        ListingStore::list(&*self.listings).await.unwrap()
    }

    pub async fn detail(&self, id: &Uuid) -> Option<ListingDetail> {
        ListingStore::get_detail(&*self.listings, id).await.unwrap()
    }

    pub async fn get_listing(&self, id: &Uuid) -> Option<Listing> {
        ListingStore::get(&*self.listings, id).await.unwrap()
    }

    pub async fn reviews_for(&self, listing_id: &Uuid) -> Vec<ReviewWithAuthor> {
        ReviewStore::list_for_listing(&*self.listings, listing_id)
            .await
            .unwrap()
    }
}

/// Builds a `multipart/form-data` body from text fields and file parts.
/// Returns the content-type header value and the body bytes.
pub(crate) fn multipart_body(
    fields: &[(&str, &str)],
    files: &[(&str, &str, &[u8])],
) -> (String, Vec<u8>) {
    let boundary = "----trailside-test-boundary";
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                boundary, name, value
            )
            .as_bytes(),
        );
    }

    for (name, filename, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                boundary, name, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    (
        format!("multipart/form-data; boundary={}", boundary),
        body,
    )
}

/// Builds and initializes the full page app over a [`TestWorld`]'s stores.
/// A macro so the unnameable `init_service` type never has to be written.
macro_rules! spawn_app {
    ($world:expr) => {{
        let world = $world;
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::from(
                    world.listings.clone() as std::sync::Arc<dyn listings::ListingStore>
                ))
                .app_data(actix_web::web::Data::from(
                    world.listings.clone() as std::sync::Arc<dyn listings::ReviewStore>
                ))
                .app_data(actix_web::web::Data::from(
                    world.images.clone() as std::sync::Arc<dyn image_store::ImageStore>
                ))
                .app_data(actix_web::web::Data::from(world.sessions.clone()
                    as std::sync::Arc<dyn auth_services::session::SessionStore>))
                .app_data(actix_web::web::Data::new(
                    sqlx::postgres::PgPoolOptions::new()
                        .connect_lazy("postgres://localhost/trailside_test")
                        .expect("lazy pool"),
                ))
                .wrap(auth_services::middleware::SessionMiddleware::new(
                    world.sessions.clone(),
                    world.codec.clone(),
                ))
                .configure($crate::routes::pages),
        )
        .await
    }};
}
pub(crate) use spawn_app;
