use actix_web::{HttpResponse, web};
use uuid::Uuid;
use validator::Validate;

use auth_services::middleware::CurrentUser;
use auth_services::session::{FlashKind, SessionStore};
use listings::{ListingStore, NewReview, ReviewStore};

use crate::error::PageError;
use crate::forms::ReviewForm;
use crate::views::redirect;

/// Creates a review under a listing and redirects back to its detail view.
pub async fn create_review(
    user: CurrentUser,
    path: web::Path<Uuid>,
    form: web::Form<ReviewForm>,
    listings_store: web::Data<dyn ListingStore>,
    reviews: web::Data<dyn ReviewStore>,
    sessions: web::Data<dyn SessionStore>,
) -> Result<HttpResponse, PageError> {
    let listing_id = path.into_inner();

    form.validate()
        .map_err(|e| PageError::Validation(format!("Validation error: {}", e)))?;

    if listings_store.get(&listing_id).await?.is_none() {
        sessions
            .push_flash(&user.session_id, FlashKind::Error, "Campground not found!")
            .await?;
        return Ok(redirect("/campgrounds"));
    }

    reviews
        .create(
            &listing_id,
            NewReview {
                author_id: user.user_id,
                body: form.body.clone(),
                rating: form.rating,
            },
        )
        .await?;

    sessions
        .push_flash(&user.session_id, FlashKind::Success, "Created new review!")
        .await?;

    Ok(redirect(&format!("/campgrounds/{}", listing_id)))
}

/// Deletes a review from a listing and redirects back to its detail view.
pub async fn delete_review(
    user: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
    reviews: web::Data<dyn ReviewStore>,
    sessions: web::Data<dyn SessionStore>,
) -> Result<HttpResponse, PageError> {
    let (listing_id, review_id) = path.into_inner();

    reviews.delete(&listing_id, &review_id).await?;

    sessions
        .push_flash(
            &user.session_id,
            FlashKind::Success,
            "Successfully deleted review!",
        )
        .await?;

    Ok(redirect(&format!("/campgrounds/{}", listing_id)))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use listings::NewListing;
    use uuid::Uuid;

    use crate::test_support::{TestWorld, spawn_app};

    fn seeded_listing(author_id: Uuid) -> NewListing {
        NewListing {
            title: "Dusty Flats".to_string(),
            description: "A quiet spot by the river".to_string(),
            price: 20.0,
            location: "Moab, Utah".to_string(),
            longitude: -109.5,
            latitude: 38.6,
            author_id,
            images: vec![],
        }
    }

    #[actix_web::test]
    async fn test_create_review_appears_in_detail() {
        let world = TestWorld::new();
        let app = spawn_app!(&world);
        let (_, cookie) = world.logged_in("sam").await;

        let listing = world
            .seed_listing(seeded_listing(world.user_id("sam")))
            .await;

        let req = test::TestRequest::post()
            .uri(&format!("/campgrounds/{}/reviews", listing.id))
            .cookie(cookie)
            .set_form([("body", "Great stars at night"), ("rating", "5")])
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers().get("location").unwrap(),
            &format!("/campgrounds/{}", listing.id)
        );

        let detail = world.detail(&listing.id).await.unwrap();
        assert_eq!(detail.reviews.len(), 1);
        assert_eq!(detail.reviews[0].body, "Great stars at night");
        assert_eq!(detail.reviews[0].author_username, "sam");
    }

    #[actix_web::test]
    async fn test_review_on_missing_listing_redirects() {
        let world = TestWorld::new();
        let app = spawn_app!(&world);
        let (session_id, cookie) = world.logged_in("sam").await;

        let req = test::TestRequest::post()
            .uri(&format!("/campgrounds/{}/reviews", Uuid::new_v4()))
            .cookie(cookie)
            .set_form([("body", "Nice"), ("rating", "4")])
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers().get("location").unwrap(), "/campgrounds");
        assert_eq!(
            world.sessions.peek_flash(&session_id).error.as_deref(),
            Some("Campground not found!")
        );
    }

    #[actix_web::test]
    async fn test_out_of_range_rating_is_rejected() {
        let world = TestWorld::new();
        let app = spawn_app!(&world);
        let (_, cookie) = world.logged_in("sam").await;

        let listing = world
            .seed_listing(seeded_listing(world.user_id("sam")))
            .await;

        let req = test::TestRequest::post()
            .uri(&format!("/campgrounds/{}/reviews", listing.id))
            .cookie(cookie)
            .set_form([("body", "Nice"), ("rating", "9")])
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(world.reviews_for(&listing.id).await.is_empty());
    }

    #[actix_web::test]
    async fn test_delete_review() {
        let world = TestWorld::new();
        let app = spawn_app!(&world);
        let (_, cookie) = world.logged_in("sam").await;

        let listing = world
            .seed_listing(seeded_listing(world.user_id("sam")))
            .await;
        let review = world
            .seed_review(&listing.id, world.user_id("sam"), "Windy", 3)
            .await;

        let req = test::TestRequest::delete()
            .uri(&format!("/campgrounds/{}/reviews/{}", listing.id, review.id))
            .cookie(cookie)
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert!(world.reviews_for(&listing.id).await.is_empty());
    }
}
